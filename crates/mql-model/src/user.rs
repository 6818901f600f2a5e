//! Project team members

use serde::{Deserialize, Serialize};

/// A member of the project team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    /// Login, the identity user properties store
    pub login: String,
    /// Display name
    pub name: String,
}

impl TeamMember {
    /// Create a team member
    pub fn new(login: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            name: name.into(),
        }
    }
}
