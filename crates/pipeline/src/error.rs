//! Pipeline error types

use recon_registry::RegistryError;
use thiserror::Error;

/// A one-shot cell was assigned twice
#[derive(Debug, Error, PartialEq, Eq)]
#[error("one-shot value set twice")]
pub struct OneShotError;

/// The receiving side of a message channel is gone
#[derive(Debug, Error, PartialEq, Eq)]
#[error("message channel closed")]
pub struct ChannelClosed;

/// Errors that abort pipeline construction
///
/// All of these are fatal to the connection; none are retried.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A configured plugin could not be resolved
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A resolved data-message id falls in the reserved control range
    ///
    /// Explicit ports are validated at parse time; this catches ids
    /// that only appear once plugin default slots are resolved.
    #[error("resolved {component} id {port} collides with a reserved control message id")]
    ReservedPort {
        component: &'static str,
        port: u16,
    },

    /// Two plugins resolved to the same data-message id
    #[error("resolved {component} id {port} is assigned to more than one plugin")]
    PortCollision {
        component: &'static str,
        port: u16,
    },

    /// A pipeline promise was fulfilled twice
    #[error("pipeline {stage} promise set twice")]
    PromiseAlreadySet { stage: &'static str },
}
