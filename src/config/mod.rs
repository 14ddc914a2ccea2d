// src/config/mod.rs

//! Configuration loading and validation for runhook.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and layer CLI values on top (`loader.rs`).
//! - Validate and resolve into typed [`Settings`] (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_from_path, load_settings};
pub use model::{
    CommandSection, ConfigOverrides, RawConfigFile, ServerSection, ServerSettings, Settings,
    SupervisorSection,
};
