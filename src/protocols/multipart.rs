use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

use bytes::Bytes;
use bytes::BytesMut;
use futures::Stream;
use serde_json_bytes::Value;

use crate::error::ProtocolError;
use crate::graphql;
use crate::protocols::SubProtocol;

const CRLF: &[u8] = b"\r\n";
const HEADER_SEPARATOR: &[u8] = b"\r\n\r\n";
const CLOSE_MARKER: &[u8] = b"--";

const APPLICATION_JSON: &str = "application/json";
const APPLICATION_GRAPHQL_RESPONSE_JSON: &str = "application/graphql-response+json";

/// Splits a multipart byte stream into its parts.
///
/// Bytes accumulate until the delimiter (`CRLF "--" boundary`) is found;
/// everything before it is emitted as one part, a single CRLF following the
/// delimiter is consumed, and a bare `--` after the delimiter closes the
/// stream. A boundary split across two upstream items is handled by the
/// buffering. Empty parts (the opening boundary line, back-to-back
/// delimiters) are skipped.
pub struct MultipartFramer<S> {
    stream: S,
    buffer: BytesMut,
    delimiter: Vec<u8>,
    at_start: bool,
    /// A delimiter was consumed but its trailer (`--` or CRLF) has not been
    /// examined yet; the trailer may still be split across upstream items.
    pending_trailer: bool,
    closed: bool,
}

impl<S> MultipartFramer<S> {
    pub fn new(stream: S, boundary: &str) -> Self {
        Self {
            stream,
            buffer: BytesMut::new(),
            delimiter: format!("\r\n--{boundary}").into_bytes(),
            at_start: true,
            pending_trailer: false,
            closed: false,
        }
    }

    fn find_delimiter(&self) -> Option<usize> {
        self.buffer
            .windows(self.delimiter.len())
            .position(|window| window == self.delimiter)
    }

    /// Consume the delimiter's trailer once enough bytes are buffered to
    /// tell `--` (stream close) from a CRLF ending the boundary line.
    /// Returns `false` while the trailer cannot be classified yet.
    fn consume_boundary_trailer(&mut self) -> bool {
        if self.buffer.len() < CRLF.len() {
            return false;
        }
        if self.buffer.starts_with(CLOSE_MARKER) {
            self.closed = true;
        } else if self.buffer.starts_with(CRLF) {
            let _ = self.buffer.split_to(CRLF.len());
        }
        self.pending_trailer = false;
        true
    }

    /// Extract the next complete part from the buffer, or `None` if more
    /// bytes are needed (or the stream has closed).
    fn next_part(&mut self) -> Option<Bytes> {
        loop {
            if self.closed {
                return None;
            }
            if self.pending_trailer && !self.consume_boundary_trailer() {
                return None;
            }
            if self.at_start {
                // The stream opens with a bare boundary line that has no
                // preceding CRLF.
                let opening = &self.delimiter[CRLF.len()..];
                if self.buffer.starts_with(opening) {
                    let opening_len = opening.len();
                    let _ = self.buffer.split_to(opening_len);
                    self.at_start = false;
                    self.pending_trailer = true;
                    continue;
                } else if opening.starts_with(&self.buffer[..]) {
                    // Not enough bytes to tell yet.
                    return None;
                }
                self.at_start = false;
            }
            let position = self.find_delimiter()?;
            let part = self.buffer.split_to(position).freeze();
            let _ = self.buffer.split_to(self.delimiter.len());
            self.pending_trailer = true;
            if !part.is_empty() {
                return Some(part);
            }
        }
    }
}

impl<S> Stream for MultipartFramer<S>
where
    S: Stream<Item = Bytes> + Unpin,
{
    type Item = Bytes;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(part) = this.next_part() {
                return Poll::Ready(Some(part));
            }
            if this.closed {
                return Poll::Ready(None);
            }
            match Pin::new(&mut this.stream).poll_next(cx) {
                Poll::Ready(Some(bytes)) => this.buffer.extend_from_slice(&bytes),
                // Trailing bytes without a closing delimiter are an
                // incomplete part and are dropped.
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Split one part into its content-type line and JSON body, validating the
/// directive against the content types the protocols allow.
fn split_part(part: &[u8]) -> Result<&[u8], ProtocolError> {
    let separator = part
        .windows(HEADER_SEPARATOR.len())
        .position(|window| window == HEADER_SEPARATOR)
        .ok_or_else(|| ProtocolError::MalformedChunk {
            reason: "part has no blank line separating headers from the body".to_string(),
        })?;
    let (header, body) = part.split_at(separator);
    let body = &body[HEADER_SEPARATOR.len()..];

    let header = std::str::from_utf8(header).map_err(|_| ProtocolError::MalformedChunk {
        reason: "part headers are not valid utf-8".to_string(),
    })?;
    let value = header
        .strip_prefix("content-type: ")
        .or_else(|| header.strip_prefix("Content-Type: "))
        .ok_or_else(|| ProtocolError::MalformedChunk {
            reason: format!("part headers carry no content-type line: '{header}'"),
        })?;
    // An optional `; `-separated directive suffix is allowed.
    let media = value.split("; ").next().unwrap_or(value);
    if media != APPLICATION_JSON && media != APPLICATION_GRAPHQL_RESPONSE_JSON {
        return Err(ProtocolError::UnsupportedChunkContentType {
            content_type: value.to_string(),
        });
    }
    Ok(body)
}

/// Classify one framed part under the negotiated sub-protocol.
///
/// `Ok(None)` means the part carried nothing for the caller: a subscription
/// heartbeat or a transport envelope without a payload.
pub fn parse_chunk(
    protocol: SubProtocol,
    part: &Bytes,
) -> Result<Option<graphql::Response>, ProtocolError> {
    let body = split_part(part)?;
    let value: Value =
        serde_json::from_slice(body).map_err(|err| ProtocolError::MalformedChunk {
            reason: format!("part body is not valid JSON: {err}"),
        })?;
    match protocol {
        SubProtocol::Subscription => parse_subscription_message(value),
        SubProtocol::Defer => parse_defer_message(value),
    }
}

fn parse_subscription_message(value: Value) -> Result<Option<graphql::Response>, ProtocolError> {
    let Value::Object(mut object) = value else {
        return Err(ProtocolError::MalformedChunk {
            reason: "subscription message is not a JSON object".to_string(),
        });
    };
    // The empty object is the transport heartbeat; it never surfaces.
    if object.is_empty() {
        return Ok(None);
    }
    if let Some(errors) = object.remove("errors") {
        let errors = match errors {
            Value::Array(errors) => errors
                .into_iter()
                .map(graphql::Error::from_value)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|reason| ProtocolError::MalformedChunk { reason })?,
            _ => {
                return Err(ProtocolError::MalformedChunk {
                    reason: "subscription errors field is not an array".to_string(),
                });
            }
        };
        return Err(ProtocolError::IrrecoverableServerError { errors });
    }
    match object.remove("payload") {
        Some(Value::Null) | None => Ok(None),
        Some(payload) => graphql::Response::from_value(payload).map(Some),
    }
}

fn parse_defer_message(value: Value) -> Result<Option<graphql::Response>, ProtocolError> {
    let is_object = matches!(&value, Value::Object(_));
    let (has_data, has_incremental, has_next) = match &value {
        Value::Object(object) => (
            object.contains_key("data"),
            object.contains_key("incremental"),
            object.contains_key("hasNext"),
        ),
        _ => (false, false, false),
    };
    if !is_object || !has_next || !(has_data || has_incremental) {
        return Err(ProtocolError::MalformedChunk {
            reason: "defer message must carry data+hasNext or incremental+hasNext".to_string(),
        });
    }
    graphql::Response::from_value(value).map(Some)
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use futures::stream;
    use pretty_assertions::assert_eq;
    use serde_json_bytes::json;

    use super::*;

    async fn frame(items: Vec<&'static [u8]>, boundary: &str) -> Vec<Bytes> {
        MultipartFramer::new(
            stream::iter(items.into_iter().map(Bytes::from_static)),
            boundary,
        )
        .collect()
        .await
    }

    #[tokio::test]
    async fn frames_a_complete_two_part_stream() {
        let parts = frame(
            vec![
                b"--B\r\ncontent-type: application/json\r\n\r\n{\"a\":1}\r\n--B\r\ncontent-type: application/json\r\n\r\n{\"b\":2}\r\n--B--",
            ],
            "B",
        )
        .await;
        assert_eq!(parts.len(), 2);
        assert_eq!(split_part(&parts[0]).unwrap(), b"{\"a\":1}");
        assert_eq!(split_part(&parts[1]).unwrap(), b"{\"b\":2}");
    }

    #[tokio::test]
    async fn reassembles_boundaries_split_across_items() {
        let parts = frame(
            vec![
                b"--graphql\r\ncontent-type: application/json\r\n\r\n{\"a\":1}\r\n--gra",
                b"phql\r\ncontent-type: application/json\r\n\r\n{\"b\":2}\r\n--graphql--",
            ],
            "graphql",
        )
        .await;
        assert_eq!(parts.len(), 2);
        assert_eq!(split_part(&parts[1]).unwrap(), b"{\"b\":2}");
    }

    #[tokio::test]
    async fn a_stream_split_right_after_a_boundary_keeps_parts_intact() {
        // The boundary line's trailing CRLF arrives in a later item.
        let parts = frame(
            vec![
                b"--B",
                b"\r\ncontent-type: application/json\r\n\r\n{\"a\":1}\r\n--B",
                b"\r\ncontent-type: application/json\r\n\r\n{\"b\":2}\r\n--B",
                b"--",
            ],
            "B",
        )
        .await;
        assert_eq!(parts.len(), 2);
        assert_eq!(split_part(&parts[0]).unwrap(), b"{\"a\":1}");
        assert_eq!(split_part(&parts[1]).unwrap(), b"{\"b\":2}");
    }

    #[tokio::test]
    async fn leading_crlf_boundary_and_heartbeat_parts_are_framed() {
        // The shape a server producing heartbeats emits: a leading CRLF
        // before the first boundary, then one part per delimiter.
        let parts = frame(
            vec![
                b"\r\n--graphql\r\ncontent-type: application/json\r\n\r\n{}\r\n--graphql\r\ncontent-type: application/json\r\n\r\n{\"payload\":null}\r\n--graphql--",
            ],
            "graphql",
        )
        .await;
        assert_eq!(parts.len(), 2);
        assert_eq!(
            parse_chunk(SubProtocol::Subscription, &parts[0]).unwrap(),
            None
        );
        assert_eq!(
            parse_chunk(SubProtocol::Subscription, &parts[1]).unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn nothing_is_emitted_after_the_close_delimiter() {
        let parts = frame(
            vec![
                b"--B\r\ncontent-type: application/json\r\n\r\n{\"a\":1}\r\n--B--\r\nignored trailing bytes",
            ],
            "B",
        )
        .await;
        assert_eq!(parts.len(), 1);
    }

    fn part(body: &str) -> Bytes {
        Bytes::from(format!("content-type: application/json\r\n\r\n{body}"))
    }

    #[test]
    fn subscription_payloads_are_unwrapped() {
        let response = parse_chunk(
            SubProtocol::Subscription,
            &part(r#"{"payload":{"data":{"n":1},"hasNext":true}}"#),
        )
        .unwrap()
        .unwrap();
        assert_eq!(response.data, Some(json!({ "n": 1 })));
    }

    #[test]
    fn subscription_errors_are_irrecoverable() {
        let result = parse_chunk(
            SubProtocol::Subscription,
            &part(r#"{"errors":[{"message":"subscription is over"}]}"#),
        );
        match result {
            Err(ProtocolError::IrrecoverableServerError { errors }) => {
                assert_eq!(errors[0].message, "subscription is over");
            }
            other => panic!("expected irrecoverable error, got {other:?}"),
        }
    }

    #[test]
    fn defer_messages_must_be_shaped_like_defer_messages() {
        let response = parse_chunk(
            SubProtocol::Defer,
            &part(r#"{"data":{"n":1},"hasNext":true}"#),
        )
        .unwrap()
        .unwrap();
        assert_eq!(response.has_next, Some(true));

        let response = parse_chunk(
            SubProtocol::Defer,
            &part(r#"{"incremental":[{"data":{"m":2},"path":["n"]}],"hasNext":false}"#),
        )
        .unwrap()
        .unwrap();
        assert_eq!(response.incremental.len(), 1);

        assert!(matches!(
            parse_chunk(SubProtocol::Defer, &part(r#"{"data":{"n":1}}"#)),
            Err(ProtocolError::MalformedChunk { .. })
        ));
    }

    #[test]
    fn graphql_response_content_type_is_accepted_and_others_rejected() {
        let chunk = Bytes::from_static(
            b"Content-Type: application/graphql-response+json\r\n\r\n{\"payload\":null}",
        );
        assert_eq!(
            parse_chunk(SubProtocol::Subscription, &chunk).unwrap(),
            None
        );

        let chunk = Bytes::from_static(b"content-type: text/html\r\n\r\n{}");
        assert!(matches!(
            parse_chunk(SubProtocol::Subscription, &chunk),
            Err(ProtocolError::UnsupportedChunkContentType { .. })
        ));
    }
}
