//! Configuration module for es-backup
//!
//! This module provides configuration management including:
//! - Config file location
//! - Typed settings loaded once at startup

pub mod paths;
pub mod settings;

pub use paths::ConfigPaths;
pub use settings::Settings;
