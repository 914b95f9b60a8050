//! Host configuration.

use crate::host::Host;

/// Tunables of a [`Host`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Maximum nesting of library calls below a top-level invocation.
    pub max_call_depth: usize,
    /// First address handed out by deployments.
    pub address_base: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_call_depth: 64,
            address_base: 0x1000,
        }
    }
}

/// Builder for a [`Host`].
///
/// # Example
/// ```ignore
/// let host = Host::builder()
///     .max_call_depth(16)
///     .address_base(0x10_0000)
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct HostBuilder {
    config: HostConfig,
}

impl HostBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the depth of nested calls.
    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.config.max_call_depth = depth;
        self
    }

    /// Set the first address handed out by deployments.
    pub fn address_base(mut self, base: u64) -> Self {
        self.config.address_base = base;
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: HostConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the host.
    pub fn build(self) -> Host {
        Host::with_config(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let host = HostBuilder::new().max_call_depth(3).address_base(7).build();
        assert_eq!(
            host.config(),
            &HostConfig {
                max_call_depth: 3,
                address_base: 7
            }
        );
    }
}
