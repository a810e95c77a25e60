//! # Seed Data Generator
//!
//! Populates a development database with demo products and customers.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products and 20 customers (default)
//! cargo run -p tally-db --bin seed
//!
//! # Custom amounts and database path
//! cargo run -p tally-db --bin seed -- --count 1000 --customers 50 --db ./data/tally.db
//! ```
//!
//! Products get a random-looking but deterministic price ($1.99 - $9.99
//! plus a size addon), stock 0 - 100 and a minimum stock of 5. Customers
//! get 0 - 50.00 of store credit.

use chrono::Utc;
use std::env;
use tally_core::{Customer, Product};
use tally_db::repository::product::generate_product_id;
use tally_db::{Database, DbConfig};
use uuid::Uuid;

/// Product categories for demo data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "beverages",
        &["Cold Brew", "Sparkling Water", "Orange Juice", "Iced Tea", "Lemonade", "Oat Milk"],
    ),
    (
        "bakery",
        &["Sourdough Loaf", "Croissant", "Bagel", "Cinnamon Roll", "Baguette"],
    ),
    (
        "snacks",
        &["Sea Salt Chips", "Trail Mix", "Granola Bar", "Dark Chocolate", "Pretzels"],
    ),
    (
        "grocery",
        &["Basmati Rice", "Penne Pasta", "Olive Oil", "Canned Tomatoes", "Black Beans"],
    ),
];

/// Size variants with price addon in cents
const SIZES: &[(&str, i64)] = &[("Small", 0), ("Regular", 100), ("Large", 200), ("Family", 450)];

const FIRST_NAMES: &[&str] = &["Ana", "Bram", "Chen", "Dana", "Eli", "Farah", "Gus", "Hana", "Ivo", "Jo"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut customers: usize = 20;
    let mut db_path = String::from("./tally_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--count" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(count);
                    i += 1;
                }
            }
            "--customers" => {
                if i + 1 < args.len() {
                    customers = args[i + 1].parse().unwrap_or(customers);
                    i += 1;
                }
            }
            "-d" | "--db" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "-h" | "--help" => {
                println!("Tally POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>      Number of products to generate (default: 200)");
                println!("      --customers <N>  Number of customers to generate (default: 20)");
                println!("  -d, --db <PATH>      Database file path (default: ./tally_dev.db)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Tally POS Seed Data Generator");
    println!("================================");
    println!("Database:  {}", db_path);
    println!("Products:  {}", count);
    println!("Customers: {}", customers);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let start = std::time::Instant::now();
    let mut generated = 0;

    'outer: for (category, names) in CATEGORIES {
        for name in names.iter() {
            for (size, addon) in SIZES {
                if generated >= count {
                    break 'outer;
                }

                let product = generate_product(category, name, size, *addon, generated);
                if let Err(e) = db.products().insert(&product).await {
                    eprintln!("Failed to insert {}: {}", product.name, e);
                    continue;
                }
                generated += 1;
            }
        }
    }

    println!("✓ Generated {} products in {:?}", generated, start.elapsed());

    println!();
    println!("Generating customers...");

    for seed in 0..customers {
        let customer = generate_customer(seed);
        if let Err(e) = db.customers().insert(&customer).await {
            eprintln!("Failed to insert customer {}: {}", customer.name, e);
        }
    }

    let low = db.products().list_low_stock().await?;
    println!("✓ Generated {} customers", customers);
    println!("  {} products start at or below minimum stock", low.len());

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Generates a single product with deterministic demo data.
fn generate_product(category: &str, name: &str, size: &str, price_addon: i64, seed: usize) -> Product {
    let now = Utc::now();

    let price_cents = 199 + ((seed * 17) % 800) as i64 + price_addon;
    let cost_pct = 60 + (seed % 20) as i64;

    Product {
        id: generate_product_id(),
        name: format!("{} {}", name, size),
        category: Some(category.to_string()),
        is_active: true,
        price_cents,
        cost_cents: price_cents * cost_pct / 100,
        stock: (seed % 101) as i64,
        min_stock: 5,
        created_at: now,
        updated_at: now,
    }
}

fn generate_customer(seed: usize) -> Customer {
    let now = Utc::now();
    let first = FIRST_NAMES[seed % FIRST_NAMES.len()];

    Customer {
        id: Uuid::new_v4().to_string(),
        name: format!("{} #{}", first, seed + 1),
        credit_balance_cents: ((seed * 731) % 5001) as i64,
        created_at: now,
        updated_at: now,
    }
}
