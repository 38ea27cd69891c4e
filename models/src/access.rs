// models/src/access.rs
use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed set of operator roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "recepcao")]
    FrontDesk,
    #[serde(rename = "call_center")]
    CallCenter,
    #[serde(rename = "cliente")]
    Client,
    #[serde(rename = "guest")]
    Guest,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::FrontDesk => "recepcao",
            Role::CallCenter => "call_center",
            Role::Client => "cliente",
            Role::Guest => "guest",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated principal together with its resolved role. Every engine
/// operation receives one; its email is what gets recorded as the acting staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub email: String,
    pub role: Role,
}

impl Actor {
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Actor { email: email.into(), role }
    }
}
