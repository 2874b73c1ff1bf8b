//! Decoder for the newline-delimited JSON filter stream.
//!
//! The endpoint writes one JSON object per line and sends blank lines as
//! keep-alives. Control messages (`delete`, `limit`, `warning`, ...) carry
//! no `user` and are skipped.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tracing::debug;

use crate::domain::{RawItem, SourceError};
use crate::ports::ItemStream;

type ByteStream<E> = Pin<Box<dyn Stream<Item = Result<Bytes, E>> + Send>>;

pub struct LineItemStream<E> {
    body: ByteStream<E>,
    buffer: Vec<u8>,
    finished: bool,
}

impl<E> LineItemStream<E>
where
    E: std::error::Error + Send + 'static,
{
    pub fn new<S>(body: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    {
        Self {
            body: Box::pin(body),
            buffer: Vec::new(),
            finished: false,
        }
    }

    fn next_buffered_line(&mut self) -> Option<Vec<u8>> {
        let pos = self.buffer.iter().position(|b| *b == b'\n')?;
        let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
        line.pop();
        Some(line)
    }
}

/// Parse one line. `Ok(None)` for keep-alives and control messages.
pub fn parse_line(line: &[u8]) -> Result<Option<RawItem>, SourceError> {
    let text = std::str::from_utf8(line)
        .map_err(|e| SourceError::Decode(format!("stream line is not UTF-8: {e}")))?
        .trim();
    if text.is_empty() {
        return Ok(None);
    }

    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| SourceError::Decode(format!("invalid stream message: {e}")))?;
    if value.get("user").is_none() || value.get("id_str").is_none() {
        debug!(message = %text, "skipping control message");
        return Ok(None);
    }

    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| SourceError::Decode(format!("invalid streamed item: {e}")))
}

#[async_trait]
impl<E> ItemStream for LineItemStream<E>
where
    E: std::error::Error + Send + 'static,
{
    async fn next_item(&mut self) -> Result<Option<RawItem>, SourceError> {
        loop {
            if let Some(line) = self.next_buffered_line() {
                if let Some(item) = parse_line(&line)? {
                    return Ok(Some(item));
                }
                continue;
            }
            if self.finished {
                // 末尾に改行のない最後の行
                let rest = std::mem::take(&mut self.buffer);
                return parse_line(&rest);
            }
            match self.body.next().await {
                Some(Ok(chunk)) => self.buffer.extend_from_slice(&chunk),
                Some(Err(e)) => return Err(SourceError::Transport(e.to_string())),
                None => self.finished = true,
            }
        }
    }
}
