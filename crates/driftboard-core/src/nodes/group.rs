//! Group node payload.
//!
//! A group is a labelled background region. It does not own its children;
//! nodes that should travel with it are attached through locks.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Background image reference, resolved by the host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

impl GroupNode {
    pub fn new(label: Option<String>) -> Self {
        Self {
            label,
            background: None,
        }
    }
}
