//! Global settings shared across profiles.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// Default log filter when neither `-v`/`-q` nor `RUST_LOG` is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// `compact` (default) or `full`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_format: Option<String>,
}
