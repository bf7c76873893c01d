//! Stdio transport
//!
//! Newline-delimited JSON-RPC. Requests are handled concurrently so a slow
//! Teamleader call does not block `ping` or `tools/list`; responses go
//! through a single writer so lines never interleave.

use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse, PARSE_ERROR};
use crate::mcp::server::TeamleaderMcpServer;
use bytes::BytesMut;
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::{Decoder, FramedRead, FramedWrite, LinesCodec, LinesCodecError};

/// Upper bound on a single incoming message
const MAX_LINE_BYTES: usize = 8 * 1024 * 1024;

/// Requests handled at the same time
const MAX_CONCURRENT_REQUESTS: usize = 16;

/// Transport errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write response: {0}")]
    Write(#[from] LinesCodecError),

    #[error("Failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Response writer stopped: {0}")]
    Writer(#[from] tokio::task::JoinError),
}

/// One framed input line
#[derive(Debug, PartialEq, Eq)]
enum Frame {
    Line(String),
    /// Line longer than the limit; its bytes are skipped up to the next newline
    Oversized,
}

/// `LinesCodec` that reports oversized lines as a frame instead of an error.
/// `FramedRead` ends the stream after any decoder error.
struct MessageCodec {
    lines: LinesCodec,
}

impl MessageCodec {
    fn new(max_length: usize) -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(max_length),
        }
    }

    fn frame(
        decoded: Result<Option<String>, LinesCodecError>,
    ) -> Result<Option<Frame>, LinesCodecError> {
        match decoded {
            Ok(line) => Ok(line.map(Frame::Line)),
            Err(LinesCodecError::MaxLineLengthExceeded) => Ok(Some(Frame::Oversized)),
            Err(e) => Err(e),
        }
    }
}

impl Decoder for MessageCodec {
    type Item = Frame;
    type Error = LinesCodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, LinesCodecError> {
        Self::frame(self.lines.decode(src))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, LinesCodecError> {
        Self::frame(self.lines.decode_eof(src))
    }
}

/// Serve MCP over the process stdin/stdout until stdin closes
pub async fn run_stdio(server: TeamleaderMcpServer) -> Result<(), TransportError> {
    serve(server, tokio::io::stdin(), tokio::io::stdout()).await
}

/// Serve MCP over any line-oriented byte stream. Returns once the reader is
/// exhausted and every in-flight request has been answered.
pub async fn serve<R, W>(
    server: TeamleaderMcpServer,
    reader: R,
    writer: W,
) -> Result<(), TransportError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<JsonRpcResponse>();

    let writer_task = tokio::spawn(async move {
        let mut sink = FramedWrite::new(writer, LinesCodec::new());
        while let Some(response) = rx.recv().await {
            let json = serde_json::to_string(&response)?;
            tracing::debug!("Sending: {}", json);
            sink.send(json).await?;
        }
        Ok::<_, TransportError>(())
    });

    let lines = FramedRead::new(reader, MessageCodec::new(MAX_LINE_BYTES));

    lines
        .for_each_concurrent(MAX_CONCURRENT_REQUESTS, |line| {
            let server = server.clone();
            let tx = tx.clone();
            async move {
                let line = match line {
                    Ok(Frame::Line(line)) => line,
                    Ok(Frame::Oversized) => {
                        tracing::warn!("Dropped input line over {} bytes", MAX_LINE_BYTES);
                        let _ = tx.send(JsonRpcResponse::error(
                            None,
                            PARSE_ERROR,
                            "Parse error: message too large",
                        ));
                        return;
                    }
                    Err(e) => {
                        tracing::error!("Failed to read from stdin: {}", e);
                        return;
                    }
                };

                if line.trim().is_empty() {
                    return;
                }

                tracing::debug!("Received: {}", line);

                let request: JsonRpcRequest = match serde_json::from_str(&line) {
                    Ok(req) => req,
                    Err(e) => {
                        let _ = tx.send(JsonRpcResponse::error(
                            None,
                            PARSE_ERROR,
                            &format!("Parse error: {}", e),
                        ));
                        return;
                    }
                };

                if let Some(response) = server.handle_request(request).await {
                    let _ = tx.send(response);
                }
            }
        })
        .await;

    tracing::info!("Input closed, shutting down");

    drop(tx);
    writer_task.await??;
    Ok(())
}
