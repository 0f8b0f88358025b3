//! Command implementations.

pub mod build;
pub mod check;
pub mod init;
pub mod templates;
pub mod utils;
pub mod watch;

pub use build::execute as build_execute;
pub use check::execute as check_execute;
pub use init::execute as init_execute;
pub use utils::peek_settings;
pub use watch::execute as watch_execute;
