//! Per-id message handlers for the connection input loop
//!
//! One handler is installed per message id in the connection's dispatch
//! table: the five control handlers at connection start, one data
//! handler per resolved reader once the table merge happens. Each
//! handler consumes exactly its message's body from the stream, which
//! for CLOSE and QUERY is nothing at all.

use std::sync::Arc;

use recon_config::{Config, Paths};
use recon_pipeline::{MessageSender, OneShot};
use recon_protocol::{read_filename, read_text_blob, AcquisitionHeader, Message, MessageId};
use recon_registry::Reader;
use tokio::io::AsyncRead;
use tracing::{debug, info};

use crate::error::ConnectionError;

/// What the input loop does after a handler completes
pub(crate) enum Flow {
    Continue,
    Close,
}

/// A dispatch-table entry
///
/// Handlers are cloned out of the table before being awaited, so they
/// carry shared handles (one-shots, channel senders) rather than
/// borrowed state.
#[derive(Clone)]
pub(crate) enum Handler {
    /// FILENAME: load the configuration from a file under the config dir
    ConfigFile {
        config: OneShot<Config>,
        paths: Paths,
    },
    /// CONFIG: parse the configuration from an inline text blob
    ConfigInline { config: OneShot<Config> },
    /// HEADER: parse the acquisition header from a text blob
    Header { header: OneShot<AcquisitionHeader> },
    /// CLOSE: stop input processing
    Close,
    /// QUERY: carries no body; answered over the output channel
    Query { output: MessageSender },
    /// A resolved data reader, bound to its assigned wire id
    Data {
        id: u16,
        reader: Arc<dyn Reader>,
        input: MessageSender,
    },
}

impl Handler {
    /// Consume one message body and act on it
    pub(crate) async fn handle(
        &self,
        stream: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<Flow, ConnectionError> {
        match self {
            Self::ConfigFile { config, paths } => {
                let name = read_filename(stream).await?;
                let path = paths.resolve_config(&name)?;
                debug!(name = %name, path = %path.display(), "loading configuration file");
                let parsed = Config::from_file(&path)?;
                config
                    .set(parsed)
                    .map_err(|_| ConnectionError::DuplicateConfig)?;
                Ok(Flow::Continue)
            }
            Self::ConfigInline { config } => {
                let text = read_text_blob(stream).await?;
                debug!(bytes = text.len(), "parsing inline configuration");
                let parsed: Config = text.parse()?;
                config
                    .set(parsed)
                    .map_err(|_| ConnectionError::DuplicateConfig)?;
                Ok(Flow::Continue)
            }
            Self::Header { header } => {
                let text = read_text_blob(stream).await?;
                debug!(bytes = text.len(), "parsing acquisition header");
                let parsed = AcquisitionHeader::from_xml(&text)?;
                header
                    .set(parsed)
                    .map_err(|_| ConnectionError::DuplicateHeader)?;
                Ok(Flow::Continue)
            }
            Self::Close => {
                info!("client requested close");
                Ok(Flow::Close)
            }
            Self::Query { output } => {
                let reply = query_reply();
                debug!(reply = %reply, "answering query");
                output.send(Message::new(MessageId::Text.into(), reply))?;
                Ok(Flow::Continue)
            }
            Self::Data { id, reader, input } => {
                let payload = reader.read(stream).await?;
                input.send(Message::from_boxed(*id, payload))?;
                Ok(Flow::Continue)
            }
        }
    }
}

/// The fixed QUERY reply: the server identifies itself by version
fn query_reply() -> String {
    env!("CARGO_PKG_VERSION").to_owned()
}
