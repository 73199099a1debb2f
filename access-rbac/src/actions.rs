//! # Actions
//!
//! Defines the action classes that can be attempted on the protected resource.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Actions that can be attempted on the protected resource.
///
/// - **Read**: View the resource and its contents
/// - **Modify**: Change the resource or its contents
/// - **Delete**: Permanently remove the resource
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Read/view the resource.
    Read,

    /// Modify the resource.
    Modify,

    /// Delete the resource.
    ///
    /// Destructive; callers confirm before acting on an allow decision.
    Delete,
}

impl Action {
    /// Get the string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Modify => "modify",
            Action::Delete => "delete",
        }
    }

    /// All actions, in the order a simulation attempts them.
    pub fn all() -> [Self; 3] {
        [Action::Read, Action::Modify, Action::Delete]
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
