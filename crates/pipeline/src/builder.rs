//! Pipeline builder - the connection's background construction task
//!
//! Runs concurrently with the input loop from the moment a connection
//! opens. Awaits the config one-shot, resolves the reader and writer
//! tables against the plugin registry, then awaits the header one-shot
//! and assembles the stream description. The reader table deliberately
//! depends on the configuration alone: data messages can arrive (and
//! must be decodable) before the client sends its header.

use std::collections::HashMap;
use std::sync::Arc;

use recon_config::{Config, Paths, PluginConfig};
use recon_protocol::{AcquisitionHeader, MessageId};
use recon_registry::{Reader, Registry, Writer};
use tokio_util::sync::CancellationToken;

use crate::{BuildError, Context, OneShot, ReconStream, Result};

/// Resolved data-message decoders, keyed by wire id
pub type ReaderTable = HashMap<u16, Arc<dyn Reader>>;

/// Resolved data-message serializers, keyed by wire id
pub type WriterTable = HashMap<u16, Arc<dyn Writer>>;

/// The one-shot bundle a connection shares with its builder task
///
/// Control handlers fulfill `config` and `header`; the builder fulfills
/// the rest; the input and output loops consume them.
#[derive(Clone, Debug, Default)]
pub struct PipelinePromises {
    pub config: OneShot<Config>,
    pub header: OneShot<AcquisitionHeader>,
    pub readers: OneShot<ReaderTable>,
    pub writers: OneShot<WriterTable>,
    pub stream: OneShot<ReconStream>,
}

impl PipelinePromises {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Run pipeline construction for one connection
///
/// Suspends on the config and header one-shots independently - the two
/// control messages may arrive in either order. Exits early (without
/// error) when `cancel` fires while an input is still outstanding,
/// which is how a connection that closes before configuring is torn
/// down instead of leaking a forever-blocked task.
pub async fn build_pipeline(
    registry: Arc<Registry>,
    paths: Paths,
    promises: PipelinePromises,
    cancel: CancellationToken,
) -> Result<()> {
    let config = tokio::select! {
        _ = cancel.cancelled() => {
            tracing::debug!("pipeline builder cancelled before configuration");
            return Ok(());
        }
        config = promises.config.get() => config,
    };

    let readers = resolve_readers(&registry, &config.readers)?;
    tracing::debug!(readers = readers.len(), "reader table resolved");
    promises
        .readers
        .set(readers)
        .map_err(|_| BuildError::PromiseAlreadySet { stage: "readers" })?;

    let writers = resolve_writers(&registry, &config.writers)?;
    tracing::debug!(writers = writers.len(), "writer table resolved");
    promises
        .writers
        .set(writers)
        .map_err(|_| BuildError::PromiseAlreadySet { stage: "writers" })?;

    let header = tokio::select! {
        _ = cancel.cancelled() => {
            tracing::debug!("pipeline builder cancelled before header");
            return Ok(());
        }
        header = promises.header.get() => header,
    };

    let context = Context::new(header, paths);
    let stream = ReconStream::from_config(&config.stream, context);
    tracing::info!(stages = stream.stages().len(), "reconstruction stream assembled");
    promises
        .stream
        .set(stream)
        .map_err(|_| BuildError::PromiseAlreadySet { stage: "stream" })?;

    Ok(())
}

/// Resolve configured readers into an id-keyed table
pub fn resolve_readers(registry: &Registry, entries: &[PluginConfig]) -> Result<ReaderTable> {
    let mut table = ReaderTable::new();

    for entry in entries {
        let reader = registry.load_reader(&entry.dll, &entry.classname)?;
        let id = entry.port.unwrap_or_else(|| reader.slot());
        check_resolved_id("reader", id, table.contains_key(&id))?;
        table.insert(id, reader);
    }

    Ok(table)
}

/// Resolve configured writers into an id-keyed table
pub fn resolve_writers(registry: &Registry, entries: &[PluginConfig]) -> Result<WriterTable> {
    let mut table = WriterTable::new();

    for entry in entries {
        let writer = registry.load_writer(&entry.dll, &entry.classname)?;
        let id = entry.port.unwrap_or_else(|| writer.slot());
        check_resolved_id("writer", id, table.contains_key(&id))?;
        table.insert(id, writer);
    }

    Ok(table)
}

/// Reject resolved ids that validation could not see (default slots)
fn check_resolved_id(component: &'static str, id: u16, occupied: bool) -> Result<()> {
    if MessageId::is_reserved(id) {
        return Err(BuildError::ReservedPort {
            component,
            port: id,
        });
    }
    if occupied {
        return Err(BuildError::PortCollision {
            component,
            port: id,
        });
    }
    Ok(())
}
