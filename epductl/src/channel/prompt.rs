//! Prompt marker captured at login.

/// The byte sequence the device shell prints when it is ready for input.
///
/// Captured once from the login banner and used for the lifetime of the
/// session, both as the reply terminator and as the text to strip from the
/// tail of every reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// The prompt line as received, surrounding whitespace removed.
    marker: Vec<u8>,
}

impl Prompt {
    /// Create a prompt from an explicit marker.
    ///
    /// Returns `None` if the marker is blank.
    pub fn new(marker: impl AsRef<[u8]>) -> Option<Self> {
        let marker = marker.as_ref().trim_ascii();
        if marker.is_empty() {
            return None;
        }
        Some(Self {
            marker: marker.to_vec(),
        })
    }

    /// Extract the prompt from a login banner: the last non-blank line.
    pub fn from_banner(banner: &[u8]) -> Option<Self> {
        let banner = banner.trim_ascii_end();
        let line_start = memchr::memrchr2(b'\r', b'\n', banner).map_or(0, |i| i + 1);
        Self::new(&banner[line_start..])
    }

    /// The marker bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.marker
    }

    /// The marker as text (lossy UTF-8).
    pub fn as_str_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.marker)
    }

    /// Find the prompt at the very end of `data`.
    ///
    /// The prompt only counts when it sits on a line of its own at the tail
    /// (trailing whitespace ignored). Returns the offset of the start of that
    /// line, i.e. where the reply body ends.
    pub fn find_at_end(&self, data: &[u8]) -> Option<usize> {
        let data = data.trim_ascii_end();
        if !data.ends_with(&self.marker) {
            return None;
        }

        let start = data.len() - self.marker.len();
        let indent = data[..start]
            .iter()
            .rev()
            .take_while(|b| matches!(b, b' ' | b'\t'))
            .count();
        let line_start = start - indent;

        match line_start.checked_sub(1).map(|i| data[i]) {
            None | Some(b'\r' | b'\n') => Some(line_start),
            Some(_) => None,
        }
    }
}

impl std::fmt::Display for Prompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str_lossy())
    }
}
