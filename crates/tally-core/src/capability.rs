//! # Capabilities
//!
//! Authorization is decided outside the engine (the server validates the
//! bearer token). What reaches the engine is a [`Capability`]: who is
//! acting and with which role. The coordinator and the status processor
//! check it; the ledgers never see it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, ValidationError};

/// Role carried by an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Read-only access (receipts, lookups).
    Viewer,
    /// May ring up sales.
    Seller,
    /// May ring up sales and change payment status.
    Admin,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Seller => "seller",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "viewer" => Ok(Role::Viewer),
            "seller" => Ok(Role::Seller),
            "admin" => Ok(Role::Admin),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec!["viewer".into(), "seller".into(), "admin".into()],
            }),
        }
    }
}

/// The acting user and what they are allowed to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    pub user_id: String,
    pub role: Role,
}

impl Capability {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Capability {
            user_id: user_id.into(),
            role,
        }
    }

    /// Seller or admin.
    pub fn require_seller(&self) -> CoreResult<()> {
        match self.role {
            Role::Seller | Role::Admin => Ok(()),
            Role::Viewer => Err(CoreError::Forbidden {
                required: Role::Seller.to_string(),
            }),
        }
    }

    /// Admin only.
    pub fn require_admin(&self) -> CoreResult<()> {
        match self.role {
            Role::Admin => Ok(()),
            _ => Err(CoreError::Forbidden {
                required: Role::Admin.to_string(),
            }),
        }
    }
}
