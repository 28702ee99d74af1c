//! Configuration validation
//!
//! Explicit ports are checked against the reserved control range and
//! against each other before any pipeline is built. Collisions that
//! only appear once plugin defaults are resolved are caught later by
//! the pipeline builder.

use std::collections::HashSet;

use recon_protocol::MessageId;

use crate::{Config, ConfigError, PluginConfig, Result};

pub(crate) fn validate(config: &Config) -> Result<()> {
    check_ports("reader", &config.readers)?;
    check_ports("writer", &config.writers)?;

    for gadget in &config.stream.gadgets {
        if gadget.name.is_empty() {
            return Err(ConfigError::missing("gadget", "name"));
        }
    }

    Ok(())
}

fn check_ports(component: &'static str, plugins: &[PluginConfig]) -> Result<()> {
    let mut seen = HashSet::new();

    for plugin in plugins {
        let Some(port) = plugin.port else { continue };

        if MessageId::is_reserved(port) {
            return Err(ConfigError::ReservedPort { component, port });
        }

        if !seen.insert(port) {
            return Err(ConfigError::DuplicatePort { component, port });
        }
    }

    Ok(())
}
