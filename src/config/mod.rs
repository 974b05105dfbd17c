//! Filter editing settings
//!
//! Settings are plain serde structures so hosts can keep them next to
//! their own configuration and load them from JSON.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tree::Combinator;

/// Behaviour switches for filter editing sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSettings {
    /// Whether the host offers live preview at all
    #[serde(default = "default_true")]
    pub allow_live_preview: bool,
    /// Whether live preview starts switched on
    #[serde(default = "default_true")]
    pub enable_live_preview: bool,
    /// Keep at least one top-level node in every tree
    #[serde(default = "default_true")]
    pub require_root_condition: bool,
    /// Combinator of newly added groups
    #[serde(default)]
    pub default_combinator: Combinator,
}

fn default_true() -> bool {
    true
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            allow_live_preview: true,
            enable_live_preview: true,
            require_root_condition: true,
            default_combinator: Combinator::And,
        }
    }
}

impl FilterSettings {
    /// Parse settings from JSON; missing keys take their defaults
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Live preview runs only when both allowed and enabled
    pub fn live_preview(&self) -> bool {
        self.allow_live_preview && self.enable_live_preview
    }
}
