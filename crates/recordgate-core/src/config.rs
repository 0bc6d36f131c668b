//! Engine configuration.

use crate::error::{Error, Result};
use serde::Deserialize;

/// Id of the parent type of all binary record types.
pub const DEFAULT_BINARY_TYPE: &str = "binary";

/// Id of the type search records are stored under.
pub const DEFAULT_SEARCH_TYPE: &str = "search";

/// Name of the links in a search record naming the types it searches.
pub const DEFAULT_SEARCH_TARGET_LINK: &str = "recordTypeToSearchIn";

/// Default number of link hops the decorator materializes.
pub const DEFAULT_DECORATION_DEPTH: usize = 2;

/// Well-known names the enhancer branches on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnhancerConfig {
    /// Binary family id (`binary`).
    pub binary_type: String,
    /// Type search records are stored under (`search`).
    pub search_type: String,
    /// Search target link name (`recordTypeToSearchIn`).
    pub search_target_link: String,
    /// Link hops the decorator follows when no depth is given.
    pub decoration_depth: usize,
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            binary_type: DEFAULT_BINARY_TYPE.to_string(),
            search_type: DEFAULT_SEARCH_TYPE.to_string(),
            search_target_link: DEFAULT_SEARCH_TARGET_LINK.to_string(),
            decoration_depth: DEFAULT_DECORATION_DEPTH,
        }
    }
}

impl EnhancerConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON document. Missing keys use defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Set the binary family id.
    pub fn with_binary_type(mut self, id: impl Into<String>) -> Self {
        self.binary_type = id.into();
        self
    }

    /// Set the type search records are stored under.
    pub fn with_search_type(mut self, id: impl Into<String>) -> Self {
        self.search_type = id.into();
        self
    }

    /// Set the search target link name.
    pub fn with_search_target_link(mut self, name: impl Into<String>) -> Self {
        self.search_target_link = name.into();
        self
    }

    /// Set the default decoration depth.
    pub fn with_decoration_depth(mut self, depth: usize) -> Self {
        self.decoration_depth = depth;
        self
    }
}
