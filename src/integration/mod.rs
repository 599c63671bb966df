//! Integration layer tying the state, services and simulator together
//!
//! This module provides:
//! - Application configuration loaded from TOML
//! - The [`CallWhisperer`] facade a front end drives

pub mod config;
pub mod whisperer;

pub use config::WhispererConfig;
pub use whisperer::CallWhisperer;
