//! Organizational category lookup entities.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A department principals belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub name: String,
}

impl Department {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
        }
    }
}

/// A professional title. The compliance target is keyed off the title's
/// display name by [`CompliancePolicy`](crate::model::CompliancePolicy);
/// the title document itself stays a plain lookup entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title {
    pub id: String,
    pub name: String,
}

impl Title {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
        }
    }
}
