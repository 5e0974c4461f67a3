//! Terminal escape sequence removal.

use vte::{Parser, Perform};

/// Streaming filter that drops ANSI/VT100 control sequences from shell output.
///
/// Printable text, carriage returns, line feeds and tabs pass through; every
/// other control byte and escape sequence is discarded. The parser keeps its
/// state between calls, so a sequence split across two chunks is still
/// recognized.
pub struct EscapeFilter {
    parser: Parser,
}

impl EscapeFilter {
    /// Create a filter in the ground state.
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
        }
    }

    /// Filter one chunk of output.
    pub fn filter(&mut self, data: &[u8]) -> Vec<u8> {
        let mut collector = Collector {
            out: Vec::with_capacity(data.len()),
        };
        self.parser.advance(&mut collector, data);
        collector.out
    }
}

impl Default for EscapeFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EscapeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscapeFilter").finish_non_exhaustive()
    }
}

struct Collector {
    out: Vec<u8>,
}

impl Perform for Collector {
    fn print(&mut self, c: char) {
        let mut utf8 = [0u8; 4];
        self.out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        if matches!(byte, b'\r' | b'\n' | b'\t') {
            self.out.push(byte);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passes_through() {
        let mut filter = EscapeFilter::new();
        let data = b"get PDU.OutletSystem.Outlet.Count\r\n24\r\n";
        assert_eq!(filter.filter(data), data);
    }

    #[test]
    fn test_color_codes_removed() {
        let mut filter = EscapeFilter::new();
        assert_eq!(filter.filter(b"\x1b[32mpdu#>\x1b[0m "), b"pdu#> ");
    }

    #[test]
    fn test_sequence_split_across_chunks() {
        let mut filter = EscapeFilter::new();
        let mut out = filter.filter(b"EILB\x1b[");
        out.extend(filter.filter(b"0m13"));
        assert_eq!(out, b"EILB13");
    }

    #[test]
    fn test_bell_and_backspace_dropped() {
        let mut filter = EscapeFilter::new();
        assert_eq!(filter.filter(b"\x07ok\x08"), b"ok");
    }
}
