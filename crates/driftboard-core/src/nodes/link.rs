//! Link node payload.

use serde::{Deserialize, Serialize};

/// A web link card. URL classification and metadata fetching belong to the host.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LinkNode {
    pub url: String,
}

impl LinkNode {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}
