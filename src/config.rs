//! Configuration for relayrpc
//!
//! Centralized configuration with sensible defaults.

use crate::protocol::MAX_PAYLOAD_SIZE;

/// Main configuration for a relayrpc server
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Codec Configuration
    // -------------------------------------------------------------------------
    /// Largest envelope payload accepted or produced by the default codec
    /// (in bytes)
    pub max_payload_size: u32,

    // -------------------------------------------------------------------------
    // Logging Configuration
    // -------------------------------------------------------------------------
    /// Log every dispatched call through the built-in logging interceptor
    pub log_calls: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD_SIZE, // 16 MB
            log_calls: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the maximum payload size (in bytes)
    pub fn max_payload_size(mut self, size: u32) -> Self {
        self.config.max_payload_size = size;
        self
    }

    /// Enable or disable per-call logging
    pub fn log_calls(mut self, enabled: bool) -> Self {
        self.config.log_calls = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
