//! Configuration for the repository
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::keys::KeySpace;

/// Main configuration for a `MemberPointRepository`
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Store Partition
    // -------------------------------------------------------------------------
    /// Logical database index every call selects
    pub database: u32,

    // -------------------------------------------------------------------------
    // Key Layout
    // -------------------------------------------------------------------------
    /// Namespace per structure kind
    pub keyspace: KeySpace,

    // -------------------------------------------------------------------------
    // Script Configuration
    // -------------------------------------------------------------------------
    /// Expiry applied by `add_if_not_exist`
    pub script_ttl: Duration,

    // -------------------------------------------------------------------------
    // Scan Configuration
    // -------------------------------------------------------------------------
    /// COUNT hint used when a caller passes a page size of 0
    pub scan_page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: 0,
            keyspace: KeySpace::default(),
            script_ttl: Duration::from_secs(60 * 60), // 1 hour
            scan_page_size: 10,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the values a store cannot reject on its own
    pub fn validate(&self) -> Result<()> {
        if self.script_ttl.is_zero() {
            return Err(Error::Config("script_ttl must be greater than zero".to_string()));
        }
        Ok(())
    }

    /// Page size to send, substituting the default for 0
    pub(crate) fn page_size(&self, requested: usize) -> usize {
        if requested == 0 {
            self.scan_page_size.max(1)
        } else {
            requested
        }
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the logical database index
    pub fn database(mut self, index: u32) -> Self {
        self.config.database = index;
        self
    }

    /// Set the keyspace (namespace per structure kind)
    pub fn keyspace(mut self, keyspace: KeySpace) -> Self {
        self.config.keyspace = keyspace;
        self
    }

    /// Set the expiry used by `add_if_not_exist`
    pub fn script_ttl(mut self, ttl: Duration) -> Self {
        self.config.script_ttl = ttl;
        self
    }

    /// Set the default scan COUNT hint
    pub fn scan_page_size(mut self, size: usize) -> Self {
        self.config.scan_page_size = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
