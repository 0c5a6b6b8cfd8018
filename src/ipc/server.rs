// Aora - A short-video sharing client
// Copyright (C) 2025 Aora Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! IPC Server implementation using named pipes / Unix sockets

use anyhow::{Context, Result};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::api::Backend;
use crate::config::IpcConfig;
use crate::models::{error_codes, IpcError, IpcMessage, MessageType};

use super::handler::MessageHandler;

type SharedWriter<W> = Arc<Mutex<W>>;

/// Run the IPC server until a shutdown request arrives
pub async fn run_server<B: Backend + 'static>(
    handler: Arc<MessageHandler<B>>,
    config: &IpcConfig,
) -> Result<()> {
    info!("Starting IPC server on {}", config.socket_path);

    let shutdown = handler.shutdown_signal();

    #[cfg(windows)]
    {
        run_windows_pipe_server(handler, &config.socket_path, shutdown).await
    }

    #[cfg(not(windows))]
    {
        run_unix_socket_server(handler, &config.socket_path, shutdown).await
    }
}

#[cfg(windows)]
async fn run_windows_pipe_server<B: Backend + 'static>(
    handler: Arc<MessageHandler<B>>,
    pipe_name: &str,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    use tokio::net::windows::named_pipe::{PipeMode, ServerOptions};

    let mut connections = JoinSet::new();

    loop {
        // Create a new pipe instance
        let pipe = ServerOptions::new()
            .first_pipe_instance(false)
            .pipe_mode(PipeMode::Message)
            .create(pipe_name)
            .context("Failed to create named pipe")?;

        debug!("Pipe instance ready for the UI host");

        tokio::select! {
            result = pipe.connect() => {
                match result {
                    Ok(()) => {
                        let (reader, writer) = tokio::io::split(pipe);
                        spawn_client(&mut connections, reader, writer, &handler);
                    }
                    Err(e) => error!("Pipe connect failed: {}", e),
                }
            }
            _ = shutdown.recv() => {
                info!("Shutdown requested, closing IPC endpoint");
                break;
            }
        }
    }

    drain_connections(connections).await;
    Ok(())
}

#[cfg(not(windows))]
async fn run_unix_socket_server<B: Backend + 'static>(
    handler: Arc<MessageHandler<B>>,
    socket_path: &str,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    use tokio::net::UnixListener;

    // Remove existing socket file
    let _ = std::fs::remove_file(socket_path);

    let listener = UnixListener::bind(socket_path)
        .with_context(|| format!("Failed to bind Unix socket {}", socket_path))?;

    info!("Listening on {}", socket_path);

    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, _)) => {
                        let (reader, writer) = stream.into_split();
                        spawn_client(&mut connections, reader, writer, &handler);
                    }
                    Err(e) => error!("Socket accept failed: {}", e),
                }
            }
            _ = shutdown.recv() => {
                info!("Shutdown requested, closing IPC endpoint");
                break;
            }
        }
    }

    drain_connections(connections).await;

    // Cleanup
    let _ = std::fs::remove_file(socket_path);

    Ok(())
}

fn spawn_client<R, W, B>(
    connections: &mut JoinSet<()>,
    reader: R,
    writer: W,
    handler: &Arc<MessageHandler<B>>,
) where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
    B: Backend + 'static,
{
    info!("UI host connected");
    let handler = Arc::clone(handler);
    // Subscribe before spawning so a shutdown sent right after accept is seen
    let shutdown = handler.shutdown_signal();
    connections.spawn(async move {
        if let Err(e) = serve_connection(reader, writer, handler, shutdown).await {
            error!("IPC connection failed: {}", e);
        }
    });
}

/// Wait for every connection to finish its in-flight replies
async fn drain_connections(mut connections: JoinSet<()>) {
    while let Some(finished) = connections.join_next().await {
        if let Err(e) = finished {
            warn!("IPC connection task ended abnormally: {}", e);
        }
    }
}

/// Serve one client: one JSON message per line in each direction
///
/// Requests are handled concurrently, so responses may come back out of
/// order; clients match them by `id`. Events are interleaved as they occur.
/// On shutdown the connection stops reading and returns once every request
/// already received has been answered.
async fn serve_connection<R, W, B>(
    reader: R,
    writer: W,
    handler: Arc<MessageHandler<B>>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
    B: Backend + 'static,
{
    let mut reader = BufReader::new(reader);
    let writer: SharedWriter<W> = Arc::new(Mutex::new(writer));

    let forwarder = tokio::spawn(forward_events(handler.subscribe_events(), writer.clone()));
    let mut requests = JoinSet::new();

    let mut line = String::new();

    loop {
        line.clear();
        let read = tokio::select! {
            read = reader.read_line(&mut line) => read,
            _ = shutdown.recv() => {
                debug!("Closing IPC connection for shutdown");
                break;
            }
        };

        // Reap replies that already went out
        while let Some(finished) = requests.try_join_next() {
            if let Err(e) = finished {
                warn!("IPC request task ended abnormally: {}", e);
            }
        }

        match read {
            Ok(0) => {
                info!("UI host disconnected");
                break;
            }
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                debug!("Received message: {}", trimmed);

                match serde_json::from_str::<IpcMessage>(trimmed) {
                    Ok(msg) if msg.message_type != MessageType::Request => {
                        warn!("Ignoring {:?} message {} from client", msg.message_type, msg.id);
                        let error_response = IpcMessage::response_err(
                            &msg.id,
                            IpcError::new(error_codes::INVALID_REQUEST, "Only requests are accepted"),
                        );
                        write_message(&writer, &error_response).await?;
                    }
                    Ok(msg) => {
                        let handler = handler.clone();
                        let writer = writer.clone();
                        requests.spawn(async move {
                            let response = handler.handle_message(msg).await;
                            if let Err(e) = write_message(&writer, &response).await {
                                warn!("Failed to send response {}: {}", response.id, e);
                            }
                        });
                    }
                    Err(e) => {
                        warn!("Malformed IPC line: {}", e);
                        let rejection = IpcMessage::response_err(
                            &request_id(trimmed),
                            IpcError::new(
                                error_codes::PARSE_ERROR,
                                format!("Failed to parse message: {}", e),
                            ),
                        );
                        write_message(&writer, &rejection).await?;
                    }
                }
            }
            Err(e) => {
                error!("IPC read failed: {}", e);
                break;
            }
        }
    }

    while let Some(finished) = requests.join_next().await {
        if let Err(e) = finished {
            warn!("IPC request task ended abnormally: {}", e);
        }
    }

    forwarder.abort();
    Ok(())
}

/// Copy broadcast events onto one client's stream
async fn forward_events<W>(mut events: broadcast::Receiver<IpcMessage>, writer: SharedWriter<W>)
where
    W: AsyncWrite + Unpin,
{
    loop {
        match events.recv().await {
            Ok(event) => {
                if let Err(e) = write_message(&writer, &event).await {
                    warn!("Failed to send event: {}", e);
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Client fell behind, {} events dropped", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn write_message<W>(writer: &SharedWriter<W>, message: &IpcMessage) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(message)?;
    line.push(b'\n');

    let mut out = writer.lock().await;
    out.write_all(&line).await?;
    out.flush().await?;

    debug!("Sent {:?} {}", message.message_type, message.id);
    Ok(())
}

/// Best-effort id of a request line that failed to parse as a message
fn request_id(line: &str) -> String {
    serde_json::from_str::<Value>(line)
        .ok()
        .and_then(|v| v.get("id").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}
