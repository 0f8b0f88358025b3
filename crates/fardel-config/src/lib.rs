pub mod bundle;
pub mod config;
pub mod discovery;
pub mod error;
pub mod loading;
pub mod settings;
pub mod validation;

// Re-export main types
pub use bundle::*;
pub use config::*;
pub use error::*;
pub use settings::*;

// Re-export discovery, loading and validation
pub use discovery::{discover, discover_with_profile, ConfigDiscovery, CONFIG_FILE_NAMES};
pub use loading::{load_config, ConfigOverrides, ENV_PREFIX};
pub use validation::{validate_fs, validate_schema, ConfigValidator, FsValidator, SchemaValidator};
