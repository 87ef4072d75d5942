//! Role model and related functionality

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three identity roles of the booking system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Requests court slots
    Student,
    /// Views the approved schedule for a day
    Guard,
    /// Approves, rejects and cancels requests; provisions guards
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "STUDENT",
            Role::Guard => "GUARD",
            Role::Admin => "ADMIN",
        }
    }

    /// Whether accounts of this role must prove control of their email
    pub fn requires_email_verification(self) -> bool {
        match self {
            Role::Student => true,
            Role::Guard | Role::Admin => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STUDENT" => Ok(Role::Student),
            "GUARD" => Ok(Role::Guard),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}
