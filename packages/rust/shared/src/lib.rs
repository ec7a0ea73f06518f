//! Shared types, error model, and configuration for kmimport.
//!
//! This crate is the foundation depended on by all other kmimport crates.
//! It provides:
//! - [`ImportError`] — the unified error type
//! - Reply-tree types ([`ReplyPath`], [`ReplyValue`])
//! - Configuration ([`AppConfig`], [`CrawlConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AnnotationsConfig, AppConfig, CrawlConfig, OutputConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, validate_config,
};
pub use error::{ImportError, Result};
pub use types::{ReplyPath, ReplyValue};
