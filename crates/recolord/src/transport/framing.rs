//! Newline-delimited JSON framing over a byte stream.

use std::io::{self, BufRead, BufReader, Read, Write};

use serde_json::Value;

use super::TransportError;

/// Upper bound on a single inbound line, newline excluded.
pub const MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// Bidirectional message channel for one peer.
pub trait Transport {
    /// Blocks until the next message arrives.
    ///
    /// Returns `Ok(None)` once the peer has closed the channel. Errors for
    /// which [`TransportError::is_recoverable`] holds leave the channel usable.
    fn receive(&mut self) -> Result<Option<Value>, TransportError>;

    /// Writes one message and flushes it to the peer.
    fn send(&mut self, message: &Value) -> Result<(), TransportError>;
}

/// [`Transport`] that exchanges one JSON document per line.
///
/// Blank lines are skipped. Lines longer than [`MAX_MESSAGE_BYTES`] are
/// discarded up to the next newline and reported as
/// [`TransportError::RequestTooLarge`].
pub struct JsonLineTransport<S> {
    stream: BufReader<S>,
    max_line_bytes: usize,
}

impl<S: Read + Write> JsonLineTransport<S> {
    pub fn new(stream: S) -> Self {
        Self::with_limit(stream, MAX_MESSAGE_BYTES)
    }

    pub fn with_limit(stream: S, max_line_bytes: usize) -> Self {
        Self {
            stream: BufReader::new(stream),
            max_line_bytes,
        }
    }

    pub fn into_inner(self) -> S {
        self.stream.into_inner()
    }

    fn read_line(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let limit = self.max_line_bytes;
        let mut line = Vec::new();
        let mut oversized = false;
        loop {
            let available = match self.stream.fill_buf() {
                Ok(available) => available,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error.into()),
            };
            if available.is_empty() {
                return match (oversized, line.is_empty()) {
                    (true, _) => Err(TransportError::RequestTooLarge { max_size: limit }),
                    (false, true) => Ok(None),
                    (false, false) => Ok(Some(line)),
                };
            }

            let newline = available.iter().position(|byte| *byte == b'\n');
            let (chunk, consumed) = match newline {
                Some(position) => (available.split_at(position).0, position + 1),
                None => (available, available.len()),
            };
            if !oversized {
                if line.len() + chunk.len() > limit {
                    oversized = true;
                    line = Vec::new();
                } else {
                    line.extend_from_slice(chunk);
                }
            }
            self.stream.consume(consumed);

            if newline.is_some() {
                return if oversized {
                    Err(TransportError::RequestTooLarge { max_size: limit })
                } else {
                    Ok(Some(line))
                };
            }
        }
    }
}

impl<S: Read + Write> Transport for JsonLineTransport<S> {
    fn receive(&mut self) -> Result<Option<Value>, TransportError> {
        loop {
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            let trimmed = line.trim_ascii();
            if trimmed.is_empty() {
                continue;
            }
            return serde_json::from_slice(trimmed)
                .map(Some)
                .map_err(TransportError::Decode);
        }
    }

    fn send(&mut self, message: &Value) -> Result<(), TransportError> {
        let mut payload = serde_json::to_vec(message).map_err(TransportError::Encode)?;
        payload.push(b'\n');
        let stream = self.stream.get_mut();
        stream.write_all(&payload)?;
        stream.flush()?;
        Ok(())
    }
}
