//! Writing build output to disk.

pub mod writer;

pub use writer::{validate_output_path, write_assets};
