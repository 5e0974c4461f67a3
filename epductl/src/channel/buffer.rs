//! Reply accumulation buffer with tail-anchored prompt detection.
//!
//! Device output arrives in arbitrary fragments. The buffer collects them
//! (with terminal escapes removed) until the prompt reappears at the tail,
//! which is what marks a reply as complete.

use bytes::{Buf, BytesMut};

use super::filter::EscapeFilter;
use super::prompt::Prompt;

/// Buffer for accumulating shell output until the prompt is seen.
#[derive(Debug)]
pub struct PromptBuffer {
    /// The accumulated, filtered output.
    buffer: BytesMut,

    /// Escape sequence filter; keeps parser state across chunks.
    filter: EscapeFilter,
}

impl PromptBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            filter: EscapeFilter::new(),
        }
    }

    /// Append a chunk of raw channel output.
    pub fn extend(&mut self, data: &[u8]) {
        let cleaned = self.filter.filter(data);
        self.buffer.extend_from_slice(&cleaned);
    }

    /// Where the reply body ends, if the prompt is at the tail.
    pub fn prompt_offset(&self, prompt: &Prompt) -> Option<usize> {
        prompt.find_at_end(&self.buffer)
    }

    /// Check if the tail of the buffer is the prompt.
    pub fn ends_with_prompt(&self, prompt: &Prompt) -> bool {
        self.prompt_offset(prompt).is_some()
    }

    /// Take ownership of the buffer contents and reset.
    pub fn take(&mut self) -> Vec<u8> {
        self.buffer.split().to_vec()
    }

    /// Drop everything but the last `limit` bytes.
    pub fn keep_tail(&mut self, limit: usize) {
        let excess = self.buffer.len().saturating_sub(limit);
        self.buffer.advance(excess);
    }

    /// Get the current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Discard buffered output and reset the escape parser.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.filter = EscapeFilter::new();
    }
}

impl Default for PromptBuffer {
    fn default() -> Self {
        Self::new()
    }
}
