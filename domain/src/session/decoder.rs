//! Newline framing for streamed response bodies.
//!
//! The model server writes one JSON object per line, but the transport hands
//! the body over in arbitrary byte chunks: a line may be split across chunks,
//! a chunk may hold several lines, and a multi-byte UTF-8 character may be cut
//! in half. [`LineDecoder`] turns that chunk sequence into complete lines.
//!
//! ```text
//! chunk 1: {"message":{"content":"Ri
//! chunk 2: sk "}}\n{"message":{"content":"is"}}\n{"do
//! chunk 3: ne":true}
//! ```
//!
//! yields `{"message":{"content":"Risk "}}` and `{"message":{"content":"is"}}`
//! from chunk 2, nothing from chunk 3, and `{"done":true}` from
//! [`finish`](LineDecoder::finish).

/// Incremental line decoder with byte-level carry-over.
///
/// The carry-over is kept as raw bytes and only complete lines are converted
/// to text, so the output is identical for every way of splitting the same
/// input into chunks.
#[derive(Debug, Default)]
pub struct LineDecoder {
    carry: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every line it completes, in order.
    ///
    /// Bytes after the last `\n` are retained and prepended to the next chunk.
    /// A trailing `\r` is stripped; blank lines are dropped.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        if chunk.is_empty() {
            return Vec::new();
        }

        // Carry-over never contains '\n', so only the new bytes need scanning.
        let mut cursor = self.carry.len();
        self.carry.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.carry[cursor..].iter().position(|&b| b == b'\n') {
            let end = cursor + offset;
            if let Some(line) = decode_line(&self.carry[start..end]) {
                lines.push(line);
            }
            start = end + 1;
            cursor = start;
        }
        self.carry.drain(..start);
        lines
    }

    /// Flush the carry-over as a final line.
    ///
    /// Handles a body whose last line has no trailing newline. Returns `None`
    /// when nothing (or only whitespace) is pending. The decoder is empty
    /// afterwards and can be reused.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.carry);
        decode_line(&rest)
    }

    /// Number of bytes waiting for a newline.
    pub fn pending_bytes(&self) -> usize {
        self.carry.len()
    }
}

fn decode_line(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    let text = String::from_utf8_lossy(bytes);
    if text.trim().is_empty() {
        None
    } else {
        Some(text.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn decode_all(chunks: &[&[u8]]) -> Vec<String> {
        let mut decoder = LineDecoder::new();
        let mut lines: Vec<String> = chunks.iter().flat_map(|c| decoder.feed(c)).collect();
        lines.extend(decoder.finish());
        lines
    }

    #[test]
    fn empty_chunk_yields_nothing() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.feed(b"").is_empty());
        assert_eq!(decoder.pending_bytes(), 0);
    }

    #[test]
    fn partial_line_is_carried_over() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.feed(b"{\"message\":").is_empty());
        assert_eq!(decoder.pending_bytes(), 11);
        let lines = decoder.feed(b"{\"content\":\"hi\"}}\n");
        assert_eq!(lines, vec!["{\"message\":{\"content\":\"hi\"}}"]);
        assert_eq!(decoder.pending_bytes(), 0);
    }

    #[test]
    fn multiple_lines_in_one_chunk_keep_order_and_remainder() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.feed(b"a\nb\nc\npartial");
        assert_eq!(lines, vec!["a", "b", "c"]);
        assert_eq!(decoder.finish().as_deref(), Some("partial"));
    }

    #[test]
    fn finish_flushes_unterminated_last_line_once() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.feed(b"{\"done\":true}").is_empty());
        assert_eq!(decoder.finish().as_deref(), Some("{\"done\":true}"));
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn finish_on_whitespace_only_is_none() {
        let mut decoder = LineDecoder::new();
        decoder.feed(b"line\n  ");
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn crlf_and_blank_lines() {
        assert_eq!(decode_all(&[b"one\r\n\r\n\ntwo\r\n"]), vec!["one", "two"]);
    }

    #[test]
    fn split_inside_multibyte_character() {
        let text = "{\"message\":{\"content\":\"€ risk\"}}\n".as_bytes();
        // '€' is bytes 23..26; split between its second and third byte
        let (a, b) = text.split_at(25);
        assert_eq!(
            decode_all(&[a, b]),
            vec!["{\"message\":{\"content\":\"€ risk\"}}"]
        );
    }

    #[test]
    fn one_byte_at_a_time() {
        let body = b"{\"message\":{\"content\":\"Risk \"}}\n{\"done\":true}\n";
        let chunks: Vec<&[u8]> = body.chunks(1).collect();
        assert_eq!(
            decode_all(&chunks),
            vec!["{\"message\":{\"content\":\"Risk \"}}", "{\"done\":true}"]
        );
    }

    fn arb_lines() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec("[a-zA-Z0-9 {}:,\"é€🚀]{1,40}", 0..12).prop_map(|lines| {
            lines
                .into_iter()
                .filter(|l| !l.trim().is_empty())
                .collect()
        })
    }

    proptest! {
        #[test]
        fn output_is_independent_of_chunk_boundaries(
            lines in arb_lines(),
            cuts in proptest::collection::vec(any::<prop::sample::Index>(), 0..16),
            trailing_newline in any::<bool>(),
        ) {
            let mut body = lines.join("\n");
            if trailing_newline && !lines.is_empty() {
                body.push('\n');
            }
            let bytes = body.as_bytes();

            let mut points: Vec<usize> = cuts.iter().map(|i| i.index(bytes.len() + 1)).collect();
            points.sort_unstable();
            points.dedup();

            let mut chunks = Vec::new();
            let mut prev = 0;
            for p in points {
                chunks.push(&bytes[prev..p]);
                prev = p;
            }
            chunks.push(&bytes[prev..]);

            prop_assert_eq!(decode_all(&chunks), lines.clone());
            prop_assert_eq!(decode_all(&[bytes]), lines);
        }
    }
}
