//! Line reassembly for newline-delimited JSON streams.
//!
//! Network chunks do not respect line (or UTF-8) boundaries, so bytes are
//! buffered until a full line is available.

#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buffer: Vec<u8>,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every completed, non-blank line
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line).trim().to_string();
            if !text.is_empty() {
                lines.push(text);
            }
        }
        lines
    }

    /// Whatever is left once the stream ends without a trailing newline
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        let text = String::from_utf8_lossy(&rest).trim().to_string();
        (!text.is_empty()).then_some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_split_across_chunks() {
        let mut decoder = NdjsonDecoder::new();

        assert!(decoder.push(b"{\"response\":\"He").is_empty());
        assert_eq!(
            decoder.push(b"llo\"}\n{\"response\":\" world\"}\n\n"),
            vec![r#"{"response":"Hello"}"#, r#"{"response":" world"}"#]
        );
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_multibyte_character_split() {
        let mut decoder = NdjsonDecoder::new();
        let bytes = "{\"response\":\"é\"}\n".as_bytes();

        assert!(decoder.push(&bytes[..14]).is_empty());
        assert_eq!(decoder.push(&bytes[14..]), vec!["{\"response\":\"é\"}"]);
    }

    #[test]
    fn test_finish_returns_trailing_line() {
        let mut decoder = NdjsonDecoder::new();

        decoder.push(b"{\"done\":true}");

        assert_eq!(decoder.finish(), Some("{\"done\":true}".to_string()));
        assert_eq!(decoder.finish(), None);
    }
}
