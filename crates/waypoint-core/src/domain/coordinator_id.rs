use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Value object: Coordinator ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoordinatorId(pub String);

impl CoordinatorId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        CoordinatorId(Uuid::new_v4().to_string())
    }

    /// Borrow the identifier as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CoordinatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CoordinatorId {
    fn from(id: &str) -> Self {
        CoordinatorId(id.to_string())
    }
}
