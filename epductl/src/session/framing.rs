//! Reply framing: separating the payload from echo and prompt.
//!
//! A complete reply on the wire looks like
//!
//! ```text
//! <echoed command>\r\n<payload>\r\n<prompt>
//! ```
//!
//! Both the echo and the prompt are removed by anchored matching only: the
//! echo at the head, the prompt as the last line. Text in the payload that
//! merely contains the command or the prompt somewhere else is untouched.

use crate::channel::Prompt;

/// Strip echo and prompt from a complete raw reply and join it into one line.
///
/// `echo` is the command as sent, without the line terminator. Line breaks
/// inside the payload are removed, so a multi-line reply comes back as a
/// single line.
pub fn strip_reply(raw: &[u8], echo: &[u8], prompt: &Prompt) -> String {
    let body = match prompt.find_at_end(raw) {
        Some(end) => &raw[..end],
        None => raw,
    };

    let body = trim_leading_line_breaks(body);
    let body = body.strip_prefix(echo).unwrap_or(body);

    let single_line: Vec<u8> = body
        .iter()
        .copied()
        .filter(|b| !matches!(b, b'\r' | b'\n'))
        .collect();

    String::from_utf8_lossy(&single_line).into_owned()
}

fn trim_leading_line_breaks(data: &[u8]) -> &[u8] {
    let skip = data
        .iter()
        .take_while(|b| matches!(b, b'\r' | b'\n'))
        .count();
    &data[skip..]
}
