//! Relay of Ollama's NDJSON token stream.
//!
//! Two stream adapters, stacked:
//! - [`NdjsonLines`] reassembles complete lines from arbitrary byte chunks.
//! - [`EventRelay`] turns those lines into [`StreamEvent`]s.
//!
//! A relay yields zero or more `Token` events and then exactly one `Done`
//! or `Error` event, after which it is exhausted. The underlying byte
//! stream is dropped as soon as the terminal event is queued, which closes
//! the backend connection.

use crate::error::GatewayError;
use crate::proxy::ByteStream;
use crate::types::api::StreamEvent;
use crate::types::ollama::GenerateResponse;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tracing::{debug, warn};

/// Error text when Ollama closes the stream without `done: true`
pub const INCOMPLETE_STREAM_MESSAGE: &str = "Ollama stream ended before completion";

/// Longest NDJSON line buffered before the stream is given up
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Build the full relay for a streaming generate response
pub fn relay(bytes: ByteStream, model: impl Into<String>) -> EventRelay<NdjsonLines<ByteStream>> {
    EventRelay::new(NdjsonLines::new(bytes), model)
}

/// Splits a byte stream into newline-delimited lines.
///
/// Lines may arrive split across several chunks; they are buffered until
/// the newline shows up. A trailing line without newline is yielded when
/// the input ends. A partial line longer than the limit ends the stream
/// with [`GatewayError::MalformedResponse`].
pub struct NdjsonLines<S> {
    inner: S,
    buffer: Vec<u8>,
    max_line: usize,
    exhausted: bool,
}

impl<S> NdjsonLines<S> {
    pub fn new(inner: S) -> Self {
        Self::with_max_line(inner, MAX_LINE_BYTES)
    }

    pub fn with_max_line(inner: S, max_line: usize) -> Self {
        Self { inner, buffer: Vec::new(), max_line, exhausted: false }
    }

    fn take_line(&mut self) -> Option<String> {
        let pos = memchr::memchr(b'\n', &self.buffer)?;
        let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }
}

impl<S, E> Stream for NdjsonLines<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Into<GatewayError>,
{
    type Item = Result<String, GatewayError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(line) = this.take_line() {
                return Poll::Ready(Some(Ok(line)));
            }

            if this.exhausted {
                if this.buffer.is_empty() {
                    return Poll::Ready(None);
                }
                let rest = std::mem::take(&mut this.buffer);
                return Poll::Ready(Some(Ok(String::from_utf8_lossy(&rest).into_owned())));
            }

            if this.buffer.len() > this.max_line {
                this.exhausted = true;
                this.buffer.clear();
                return Poll::Ready(Some(Err(GatewayError::MalformedResponse(format!(
                    "NDJSON line exceeds {} bytes",
                    this.max_line
                )))));
            }

            match ready!(this.inner.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => this.buffer.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    this.exhausted = true;
                    this.buffer.clear();
                    return Poll::Ready(Some(Err(e.into())));
                }
                None => this.exhausted = true,
            }
        }
    }
}

/// Converts Ollama NDJSON lines into gateway stream events.
pub struct EventRelay<S> {
    /// `None` once the terminal event has been queued
    lines: Option<S>,
    model: String,
    pending: VecDeque<StreamEvent>,
}

impl<S> EventRelay<S> {
    pub fn new(lines: S, model: impl Into<String>) -> Self {
        Self { lines: Some(lines), model: model.into(), pending: VecDeque::new() }
    }

    fn finish(&mut self, event: StreamEvent) {
        self.pending.push_back(event);
        self.lines = None;
    }

    fn handle_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        let chunk: GenerateResponse = match serde_json::from_str(line) {
            Ok(chunk) => chunk,
            Err(e) => {
                debug!(error = %e, line = %line, "Skipping unparsable Ollama chunk");
                return;
            }
        };

        if !chunk.response.is_empty() {
            self.pending.push_back(StreamEvent::Token(chunk.response));
        }

        if chunk.done {
            let model = self.model.clone();
            self.finish(StreamEvent::Done { model });
        }
    }
}

impl<S> Stream for EventRelay<S>
where
    S: Stream<Item = Result<String, GatewayError>> + Unpin,
{
    type Item = StreamEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(event) = this.pending.pop_front() {
                return Poll::Ready(Some(event));
            }

            let Some(lines) = this.lines.as_mut() else {
                return Poll::Ready(None);
            };

            match ready!(lines.poll_next_unpin(cx)) {
                Some(Ok(line)) => this.handle_line(&line),
                Some(Err(e)) => {
                    warn!(error = %e, model = %this.model, "Ollama stream failed");
                    this.finish(StreamEvent::Error(e.stream_message()));
                }
                None => {
                    warn!(model = %this.model, "Ollama stream closed without done flag");
                    this.finish(StreamEvent::Error(INCOMPLETE_STREAM_MESSAGE.to_string()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TIMEOUT_MESSAGE;
    use futures::stream;

    fn chunks(parts: &[&str]) -> impl Stream<Item = Result<Bytes, GatewayError>> + Unpin {
        let items: Vec<Result<Bytes, GatewayError>> =
            parts.iter().map(|p| Ok(Bytes::from(p.to_string()))).collect();
        stream::iter(items)
    }

    async fn run(parts: &[&str]) -> Vec<StreamEvent> {
        EventRelay::new(NdjsonLines::new(chunks(parts)), "llama3.2:3b").collect().await
    }

    fn token(text: &str) -> StreamEvent {
        StreamEvent::Token(text.to_string())
    }

    fn done() -> StreamEvent {
        StreamEvent::Done { model: "llama3.2:3b".to_string() }
    }

    #[tokio::test]
    async fn test_lines_reassembled_across_chunks() {
        let lines: Vec<String> = NdjsonLines::new(chunks(&["{\"a\":", "1}\r\n{\"b\"", ":2}\n", "tail"]))
            .map(|line| line.unwrap())
            .collect()
            .await;

        assert_eq!(lines, vec!["{\"a\":1}", "{\"b\":2}", "tail"]);
    }

    #[tokio::test]
    async fn test_oversized_line_ends_stream() {
        let lines = NdjsonLines::with_max_line(
            chunks(&["{\"response\":\"a\"}\n{\"response\":", "\"bbbbbbbbbbbbbbbb", "bbbb"]),
            16,
        );
        let events: Vec<StreamEvent> = EventRelay::new(lines, "m").collect().await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[0], token("a"));
        match &events[1] {
            StreamEvent::Error(message) => assert!(message.contains("exceeds 16 bytes")),
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_tokens_then_done() {
        let events = run(&[
            "{\"response\":\"a\",\"done\":false}\n",
            "{\"response\":\"b\",\"done\":false}\n",
            "{\"done\":true}\n",
        ])
        .await;

        assert_eq!(events, vec![token("a"), token("b"), done()]);
    }

    #[tokio::test]
    async fn test_blank_and_garbage_lines_skipped() {
        let events = run(&[
            "\n",
            "{\"response\":\"a\",\"done\":false}\n",
            "not json at all\n",
            "   \n",
            "[1,2,3]\n",
            "{\"response\":\"b\",\"done\":false}\n{\"done\":true}\n",
        ])
        .await;

        assert_eq!(events, vec![token("a"), token("b"), done()]);
    }

    #[tokio::test]
    async fn test_empty_fragments_produce_no_token() {
        let events = run(&["{\"response\":\"\",\"done\":false}\n{\"response\":\"x\",\"done\":false}\n{\"done\":true}\n"]).await;
        assert_eq!(events, vec![token("x"), done()]);
    }

    #[tokio::test]
    async fn test_final_chunk_with_text() {
        let events = run(&["{\"response\":\"end\",\"done\":true}"]).await;
        assert_eq!(events, vec![token("end"), done()]);
    }

    #[tokio::test]
    async fn test_lines_after_done_ignored() {
        let events = run(&[
            "{\"response\":\"a\",\"done\":false}\n{\"done\":true}\n",
            "{\"response\":\"late\",\"done\":false}\n{\"done\":true}\n",
        ])
        .await;

        assert_eq!(events, vec![token("a"), done()]);
    }

    #[tokio::test]
    async fn test_transport_error_ends_stream() {
        let items: Vec<Result<Bytes, GatewayError>> = vec![
            Ok(Bytes::from("{\"response\":\"a\",\"done\":false}\n")),
            Err(GatewayError::Timeout),
            Ok(Bytes::from("{\"response\":\"b\",\"done\":false}\n")),
        ];
        let events: Vec<StreamEvent> =
            EventRelay::new(NdjsonLines::new(stream::iter(items)), "m").collect().await;

        assert_eq!(events, vec![token("a"), StreamEvent::Error(TIMEOUT_MESSAGE.to_string())]);
    }

    #[tokio::test]
    async fn test_missing_done_reports_error() {
        let events = run(&["{\"response\":\"a\",\"done\":false}\n"]).await;
        assert_eq!(
            events,
            vec![token("a"), StreamEvent::Error(INCOMPLETE_STREAM_MESSAGE.to_string())]
        );
    }

    #[tokio::test]
    async fn test_exactly_one_terminal_event() {
        let events = run(&["{\"done\":true}\n"]).await;
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
        assert!(events.last().unwrap().is_terminal());
    }
}
