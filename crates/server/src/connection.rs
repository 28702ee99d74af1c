//! Connection driver - one client, three concurrent tasks
//!
//! Each accepted socket is split and driven by three tasks sharing a
//! [`PipelinePromises`] bundle:
//!
//! * the input loop (this task) reads message ids and dispatches their
//!   bodies through a per-connection handler table,
//! * the builder task awaits the config and header one-shots and
//!   resolves the reader/writer tables and stream description,
//! * the output loop awaits the writer table and serializes messages
//!   from the output channel back onto the socket.
//!
//! The handler table starts with the five control handlers. The first
//! time an id misses, the loop suspends on the reader-table one-shot,
//! merges the resolved readers in (control entries win), and retries; a
//! second miss is fatal. All failure paths fire the connection's
//! cancellation token so no task is left blocked on a one-shot that
//! will never resolve.

use std::sync::Arc;

use recon_config::Paths;
use recon_pipeline::{
    build_pipeline, message_channel, DispatchTable, MessageReceiver, MessageSender, OneShot,
    PipelinePromises, WriterTable,
};
use recon_protocol::{
    read_message_id, write_text_blob, write_u16, Message, MessageId, ProtocolError,
};
use recon_registry::Registry;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::ConnectionError;
use crate::handlers::{Flow, Handler};
use crate::metrics::ServerMetrics;

/// Shared state the input loop threads through its handlers
pub(crate) struct InputContext {
    pub paths: Paths,
    pub promises: PipelinePromises,
    pub input: MessageSender,
    pub output: MessageSender,
    pub metrics: Arc<ServerMetrics>,
}

/// Drives one client connection to completion
pub struct Connection {
    paths: Paths,
    registry: Arc<Registry>,
    metrics: Arc<ServerMetrics>,
}

impl Connection {
    pub fn new(paths: Paths, registry: Arc<Registry>, metrics: Arc<ServerMetrics>) -> Self {
        Self {
            paths,
            registry,
            metrics,
        }
    }

    /// Run the connection until the client closes, the stream fails, or
    /// `cancel` fires
    ///
    /// Decoded data messages queue on the connection's input channel for
    /// the reconstruction stages; the queue is dropped with the
    /// connection. Returns the first fatal error among the three tasks,
    /// with input-loop errors taking precedence.
    pub async fn run<S>(&self, stream: S, cancel: CancellationToken) -> Result<(), ConnectionError>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let promises = PipelinePromises::new();
        let (input_tx, input_rx) = message_channel();
        let (output_tx, output_rx) = message_channel();
        let cancel = cancel.child_token();

        let (mut read_half, write_half) = tokio::io::split(stream);

        let builder = {
            let registry = Arc::clone(&self.registry);
            let paths = self.paths.clone();
            let promises = promises.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let result = build_pipeline(registry, paths, promises, cancel.clone()).await;
                if result.is_err() {
                    cancel.cancel();
                }
                result
            })
        };

        let output = {
            let writers = promises.writers.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let result = output_loop(write_half, writers, output_rx, cancel.clone()).await;
                if result.is_err() {
                    cancel.cancel();
                }
                result
            })
        };

        let ctx = InputContext {
            paths: self.paths.clone(),
            promises,
            input: input_tx,
            output: output_tx,
            metrics: Arc::clone(&self.metrics),
        };
        let input_result = input_loop(&mut read_half, &ctx, &cancel).await;

        // Dropping the context drops the last output sender; the output
        // loop drains anything still queued (its drain is biased toward
        // the channel) and the builder unblocks via the token.
        drop(ctx);
        cancel.cancel();

        let build_result = builder.await?;
        let output_result = output.await?;
        drop(input_rx);

        input_result?;
        build_result?;
        output_result
    }
}

/// The connection's input task: read an id, dispatch its body, repeat
///
/// Exits cleanly on CLOSE, on cancellation, or when the peer
/// disconnects between messages; any other failure is fatal.
pub(crate) async fn input_loop<R>(
    stream: &mut R,
    ctx: &InputContext,
    cancel: &CancellationToken,
) -> Result<(), ConnectionError>
where
    R: AsyncRead + Send + Unpin,
{
    let table = control_handlers(ctx);

    loop {
        let id = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("input loop cancelled");
                return Ok(());
            }
            id = read_message_id(stream) => match id {
                Ok(Some(id)) => id,
                // EOF on a message boundary; a partial id or a body cut
                // short stays fatal
                Ok(None) => {
                    debug!("client disconnected without CLOSE");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            },
        };

        let handler = match table.lookup(id) {
            Some(handler) => handler,
            None => {
                debug!(id, "unassigned message id, waiting for the reader table");
                let readers = tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("input loop cancelled");
                        return Ok(());
                    }
                    readers = ctx.promises.readers.get() => readers,
                };
                table.merge(readers.iter().map(|(&wire, reader)| {
                    let handler = Handler::Data {
                        id: wire,
                        reader: Arc::clone(reader),
                        input: ctx.input.clone(),
                    };
                    (wire, handler)
                }));
                table
                    .lookup(id)
                    .ok_or(ProtocolError::UnknownMessageId(id))?
            }
        };

        ctx.metrics.message_received();
        match handler.handle(stream).await? {
            Flow::Continue => {}
            Flow::Close => return Ok(()),
        }
    }
}

/// The connection's output task: serialize queued messages in order
///
/// Suspends until the writer table resolves, then drains the output
/// channel. The drain is biased toward the channel so messages queued
/// before shutdown still reach the client.
pub(crate) async fn output_loop<W>(
    mut stream: W,
    writers: OneShot<WriterTable>,
    mut messages: MessageReceiver,
    cancel: CancellationToken,
) -> Result<(), ConnectionError>
where
    W: AsyncWrite + Send + Unpin,
{
    let writers = tokio::select! {
        _ = cancel.cancelled() => {
            debug!("output loop cancelled before the writer table resolved");
            return Ok(());
        }
        writers = writers.get() => writers,
    };

    loop {
        let message = tokio::select! {
            biased;
            message = messages.recv() => match message {
                Some(message) => message,
                None => break,
            },
            _ = cancel.cancelled() => break,
        };
        write_message(&mut stream, &writers, message).await?;
    }

    stream.shutdown().await?;
    Ok(())
}

/// Write one outbound message: u16 id, then the serialized body
///
/// Takes the message by value: payloads are `Send` but not `Sync`, so
/// the output task must own the message across its writes to stay
/// spawnable.
async fn write_message<W>(
    stream: &mut W,
    writers: &WriterTable,
    message: Message,
) -> Result<(), ConnectionError>
where
    W: AsyncWrite + Send + Unpin,
{
    let id = message.id();

    // TEXT is reserved for the server itself (query replies); it never
    // goes through the writer table
    if id == u16::from(MessageId::Text) {
        let text = message
            .downcast_ref::<String>()
            .ok_or(ConnectionError::NoWriterForMessage { id })?;
        write_u16(stream, id).await?;
        write_text_blob(stream, text).await?;
        stream.flush().await?;
        return Ok(());
    }

    let writer = writers
        .get(&id)
        .ok_or(ConnectionError::NoWriterForMessage { id })?;
    let body = writer.serialize(&message)?;
    write_u16(stream, id).await?;
    stream.write_all(&body).await?;
    stream.flush().await?;
    Ok(())
}

/// The handler table every connection starts with
fn control_handlers(ctx: &InputContext) -> DispatchTable<Handler> {
    let table = DispatchTable::new();
    table.insert(
        MessageId::Filename.into(),
        Handler::ConfigFile {
            config: ctx.promises.config.clone(),
            paths: ctx.paths.clone(),
        },
    );
    table.insert(
        MessageId::Config.into(),
        Handler::ConfigInline {
            config: ctx.promises.config.clone(),
        },
    );
    table.insert(
        MessageId::Header.into(),
        Handler::Header {
            header: ctx.promises.header.clone(),
        },
    );
    table.insert(MessageId::Close.into(), Handler::Close);
    table.insert(
        MessageId::Query.into(),
        Handler::Query {
            output: ctx.output.clone(),
        },
    );
    table
}
