use std::io;

use futures::stream::FuturesUnordered;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};
use tracing::{debug, info, warn};

use super::RpcHandler;
use super::rpc::{RpcError, RpcResponse};
use crate::error::PillBuddyError;

/// Longest accepted request line.
const MAX_LINE_LENGTH: usize = 1024 * 1024;

/// Serves newline-delimited JSON-RPC on the process's stdin and stdout.
pub async fn serve_stdio(handler: &RpcHandler) -> Result<(), PillBuddyError> {
    info!("{} is serving on stdio", handler.metadata().title);
    serve_lines(tokio::io::stdin(), tokio::io::stdout(), handler).await
}

/// Reads one JSON-RPC message per line from `reader` and writes one
/// response per line to `writer`, until `reader` is exhausted and every
/// request in flight has been answered.
///
/// Requests are handled concurrently, so responses are written in
/// completion order. Clients match them up by `id`.
pub async fn serve_lines<R, W>(
    reader: R,
    writer: W,
    handler: &RpcHandler,
) -> Result<(), PillBuddyError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_LINE_LENGTH));
    let mut responses = FramedWrite::new(writer, LinesCodec::new());
    let mut in_flight = FuturesUnordered::new();
    let mut input_open = true;
    // The framed reader yields a single `None` after a decode error
    // before it resumes reading.
    let mut resuming = false;

    loop {
        tokio::select! {
            line = lines.next(), if input_open => match line {
                Some(Ok(line)) => {
                    let line = line.trim().to_string();
                    // Skip empty lines
                    if !line.is_empty() {
                        in_flight.push(async move { handler.handle_str(&line).await });
                    }
                }
                Some(Err(e)) if is_malformed_line(&e) => {
                    warn!("Rejecting malformed input line: {}", e);
                    let response =
                        RpcResponse::failure(Value::Null, RpcError::parse_error(e.to_string()));
                    send(&mut responses, &response).await?;
                    resuming = true;
                }
                Some(Err(e)) => return Err(codec_error(e).into()),
                None if resuming => resuming = false,
                None => input_open = false,
            },
            Some(response) = in_flight.next(), if !in_flight.is_empty() => {
                if let Some(response) = response {
                    send(&mut responses, &response).await?;
                }
            }
            else => break,
        }
    }

    debug!("Stdio input closed");
    Ok(())
}

async fn send<W>(
    responses: &mut FramedWrite<W, LinesCodec>,
    response: &RpcResponse,
) -> Result<(), PillBuddyError>
where
    W: AsyncWrite + Unpin,
{
    let encoded = serde_json::to_string(response)?;
    responses.send(encoded).await.map_err(codec_error)?;
    Ok(())
}

/// A line that is too long or not UTF-8 is consumed by the codec, so
/// reading can carry on with the next one.
fn is_malformed_line(error: &LinesCodecError) -> bool {
    match error {
        LinesCodecError::MaxLineLengthExceeded => true,
        LinesCodecError::Io(e) => e.kind() == io::ErrorKind::InvalidData,
    }
}

fn codec_error(error: LinesCodecError) -> io::Error {
    match error {
        LinesCodecError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogStore, PillRecord};
    use crate::config::ServiceConfig;
    use crate::service::build_handler;
    use serde_json::json;
    use std::sync::Arc;

    fn handler(config: &ServiceConfig) -> RpcHandler {
        let store = CatalogStore::from_records(vec![PillRecord::new(
            "Advil", "brown", "round", "I2", "http://x/1",
        )])
        .unwrap();
        build_handler(config, Arc::new(store))
    }

    async fn serve(input: &[u8], handler: &RpcHandler) -> Vec<RpcResponse> {
        let mut output = Vec::new();
        serve_lines(input, &mut output, handler).await.unwrap();

        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    const PING: &str = r#"{"jsonrpc": "2.0", "id": 9, "method": "ping"}"#;

    #[tokio::test]
    async fn test_serve_lines() {
        let handler = handler(&ServiceConfig::default());
        let call = json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "tools/call",
            "params": {
                "name": "pill_buddy",
                "arguments": {"color": "brown", "shape": "round", "imprint": "ZZZ"}
            }
        });
        let input = format!(
            "{}\n\n{}\n{}\n",
            r#"{"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}"#,
            r#"{"jsonrpc": "2.0", "method": "notifications/initialized"}"#,
            call,
        );

        let mut responses = serve(input.as_bytes(), &handler).await;
        responses.sort_by_key(|r| r.id.as_u64());

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].id, json!(1));
        assert_eq!(responses[1].id, json!(2));

        let result = responses[1].clone().into_result().unwrap();
        assert_eq!(result["text"], "No matching pill found in the database.");
        assert!(result["data"].is_null());
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_is_answered_and_skipped() {
        let handler = handler(&ServiceConfig::default());
        let mut input = b"\xff\xfe{}\n".to_vec();
        input.extend_from_slice(PING.as_bytes());
        input.push(b'\n');

        let responses = serve(&input, &handler).await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].id, Value::Null);
        assert_eq!(
            responses[0].error.as_ref().map(|e| e.code),
            Some(RpcError::PARSE_ERROR)
        );
        assert_eq!(responses[1].id, json!(9));
        assert!(responses[1].error.is_none());
    }

    #[tokio::test]
    async fn test_oversized_line_is_answered_and_skipped() {
        let handler = handler(&ServiceConfig::default());
        let input = format!("{}\n{}\n", "x".repeat(MAX_LINE_LENGTH + 1), PING);

        let responses = serve(input.as_bytes(), &handler).await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].id, Value::Null);
        assert_eq!(
            responses[0].error.as_ref().map(|e| e.code),
            Some(RpcError::PARSE_ERROR)
        );
        assert_eq!(responses[1].id, json!(9));
    }

    #[tokio::test]
    async fn test_retrying_call_does_not_hold_up_later_requests() {
        let mut config = ServiceConfig::default();
        config.retry.enabled = true;
        config.retry.max_attempts = 3;
        config.retry.delay_ms = 100;
        let handler = handler(&config);

        let call = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {
                "name": "pill_buddy",
                "arguments": {"color": "green", "shape": "square"}
            }
        });
        let input = format!("{}\n{}\n", call, PING);

        let responses = serve(input.as_bytes(), &handler).await;

        let ids: Vec<_> = responses.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![json!(9), json!(1)]);
    }
}
