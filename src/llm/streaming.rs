//! SSE parsing and reply cleanup shared by the Gemini client and pipeline.

use regex::Regex;
use std::sync::OnceLock;

/// Drain complete `data:`-only SSE events from `buffer`.
///
/// Events are separated by a blank line. An incomplete trailing event stays
/// in the buffer for the next chunk. Multi-line `data:` fields are joined
/// with `\n`; comment lines and other fields are ignored.
pub fn parse_data_only_sse_events(buffer: &mut String) -> Vec<String> {
    if buffer.contains('\r') {
        *buffer = buffer.replace("\r\n", "\n");
    }

    let mut events = Vec::new();
    while let Some(end) = buffer.find("\n\n") {
        let raw: String = buffer.drain(..end + 2).collect();
        let data: Vec<&str> = raw
            .lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .map(|d| d.strip_prefix(' ').unwrap_or(d))
            .collect();
        if data.is_empty() {
            continue;
        }
        let joined = data.join("\n");
        if joined.trim() == "[DONE]" {
            continue;
        }
        events.push(joined);
    }
    events
}

/// Append `chunk` to `out` as UTF-8, holding back an incomplete trailing
/// sequence in `pending` until the next chunk completes it.
///
/// Invalid bytes that can never become valid are replaced with U+FFFD.
pub fn push_utf8_chunk(pending: &mut Vec<u8>, out: &mut String, chunk: &[u8]) {
    pending.extend_from_slice(chunk);
    let mut consumed = 0;
    loop {
        match std::str::from_utf8(&pending[consumed..]) {
            Ok(valid) => {
                out.push_str(valid);
                consumed = pending.len();
                break;
            }
            Err(e) => {
                let valid_end = consumed + e.valid_up_to();
                // Checked by from_utf8 above.
                out.push_str(std::str::from_utf8(&pending[consumed..valid_end]).unwrap_or_default());
                match e.error_len() {
                    Some(bad) => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        consumed = valid_end + bad;
                    }
                    None => {
                        consumed = valid_end;
                        break;
                    }
                }
            }
        }
    }
    pending.drain(..consumed);
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)^```[A-Za-z0-9_+-]*\.?[ \t]*\n(.*?)\n?```$").expect("valid fence regex")
    })
}

/// Remove a wrapping markdown code fence (```` ```html ... ``` ````).
///
/// Text that is not fully fenced is returned trimmed but otherwise intact.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    match fence_regex().captures(trimmed) {
        Some(caps) => caps[1].trim().to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_complete_events_and_keeps_remainder() {
        let mut buf = String::from("data: {\"a\":1}\n\ndata: {\"b\":2}\n\ndata: {\"c\"");
        let events = parse_data_only_sse_events(&mut buf);
        assert_eq!(events, vec!["{\"a\":1}", "{\"b\":2}"]);
        assert_eq!(buf, "data: {\"c\"");

        buf.push_str(":3}\n\n");
        assert_eq!(parse_data_only_sse_events(&mut buf), vec!["{\"c\":3}"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn handles_crlf_and_comments() {
        let mut buf = String::from(": keep-alive\r\n\r\ndata: {\"x\":true}\r\n\r\n");
        assert_eq!(parse_data_only_sse_events(&mut buf), vec!["{\"x\":true}"]);
    }

    #[test]
    fn joins_multiline_data_and_skips_done() {
        let mut buf = String::from("data: line1\ndata: line2\n\ndata: [DONE]\n\n");
        assert_eq!(parse_data_only_sse_events(&mut buf), vec!["line1\nline2"]);
    }

    #[test]
    fn split_multibyte_char_is_carried_to_next_chunk() {
        let bytes = "Café 👨".as_bytes();
        let split = "Caf".len() + 1;
        let mut pending = Vec::new();
        let mut out = String::new();

        push_utf8_chunk(&mut pending, &mut out, &bytes[..split]);
        assert_eq!(out, "Caf");
        assert_eq!(pending, vec![0xC3]);

        push_utf8_chunk(&mut pending, &mut out, &bytes[split..bytes.len() - 2]);
        push_utf8_chunk(&mut pending, &mut out, &bytes[bytes.len() - 2..]);
        assert_eq!(out, "Café 👨");
        assert!(pending.is_empty());
    }

    #[test]
    fn invalid_bytes_become_replacement_chars() {
        let mut pending = Vec::new();
        let mut out = String::new();
        push_utf8_chunk(&mut pending, &mut out, b"a\xFFb");
        assert_eq!(out, "a\u{FFFD}b");
        assert!(pending.is_empty());
    }

    #[test]
    fn strips_html_fence() {
        let fenced = "```html\n<!DOCTYPE html>\n<html></html>\n```";
        assert_eq!(strip_code_fences(fenced), "<!DOCTYPE html>\n<html></html>");
    }

    #[test]
    fn strips_bare_and_dotted_fences() {
        assert_eq!(strip_code_fences("```\n<p>x</p>\n```\n"), "<p>x</p>");
        assert_eq!(strip_code_fences("```html.\n<p>x</p>\n```"), "<p>x</p>");
    }

    #[test]
    fn unfenced_text_is_only_trimmed() {
        assert_eq!(strip_code_fences("  <div>```</div>\n"), "<div>```</div>");
        assert_eq!(strip_code_fences("```html\n<p>unterminated"), "```html\n<p>unterminated");
    }
}
