//! Incremental JSON tokenizer
//!
//! Turns arbitrarily chunked bytes into [`JsonEvent`]s. Input is buffered in a
//! `BytesMut` and a token is only consumed once it is complete, so chunk
//! boundaries may fall inside strings, escapes, multi-byte characters,
//! numbers or literals. `Ok(None)` from [`JsonTokenizer::next_event`] means
//! more input is needed.

use super::error::{JsonLdError, JsonLdResult};
use super::event::{JsonEvent, Scalar};
use bytes::{Buf, BytesMut};
use serde_json::Number;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

/// What the grammar allows next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// The top-level value
    Value,
    /// After '{': a key or '}'
    FirstKey,
    /// After ',' inside an object
    Key,
    /// After a key
    Colon,
    /// After ':'
    MemberValue,
    /// After '[': a value or ']'
    FirstArrayValue,
    /// After ',' inside an array
    ArrayValue,
    /// After a value inside a container
    CommaOrClose,
    /// After the top-level value
    End,
}

/// Streaming JSON tokenizer
#[derive(Debug)]
pub struct JsonTokenizer {
    buffer: BytesMut,
    containers: Vec<Container>,
    expect: Expect,
    closed: bool,
    allow_trailing_commas: bool,
    max_depth: usize,
    line: usize,
    column: usize,
    /// Bytes of the incomplete token at the front of the buffer already scanned
    scanned: usize,
    /// The scan of an incomplete string stopped right after a backslash
    escaped: bool,
}

impl JsonTokenizer {
    /// Create a tokenizer
    pub fn new(allow_trailing_commas: bool, max_depth: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            containers: Vec::new(),
            expect: Expect::Value,
            closed: false,
            allow_trailing_commas,
            max_depth,
            line: 1,
            column: 1,
            scanned: 0,
            escaped: false,
        }
    }

    /// Append a chunk of input
    pub fn feed(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Signal that no more input will arrive
    pub fn finish(&mut self) {
        self.closed = true;
    }

    /// True once the single top-level value has been fully read
    pub fn is_complete(&self) -> bool {
        self.expect == Expect::End
    }

    /// 1-based (line, column) of the next unread character
    pub fn position(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    /// Decode the next event
    ///
    /// Returns `Ok(None)` when more input is needed, or when the document is
    /// complete and the input has been closed.
    pub fn next_event(&mut self) -> JsonLdResult<Option<JsonEvent>> {
        loop {
            self.skip_whitespace();

            let byte = match self.buffer.first() {
                Some(&byte) => byte,
                None => {
                    if self.closed && self.expect != Expect::End {
                        return Err(self.error("unexpected end of input"));
                    }
                    return Ok(None);
                }
            };

            match self.expect {
                Expect::End => {
                    return Err(self.error(format!(
                        "unexpected {} after the top-level value",
                        describe_byte(byte)
                    )));
                }
                Expect::Colon => {
                    if byte != b':' {
                        return Err(self.error(format!("expected ':', found {}", describe_byte(byte))));
                    }
                    self.advance(1);
                    self.expect = Expect::MemberValue;
                }
                Expect::CommaOrClose => {
                    let container = match self.containers.last() {
                        Some(container) => *container,
                        None => return Err(self.error("value separator outside of a container")),
                    };
                    match (byte, container) {
                        (b',', Container::Object) => {
                            self.advance(1);
                            self.expect = Expect::Key;
                        }
                        (b',', Container::Array) => {
                            self.advance(1);
                            self.expect = Expect::ArrayValue;
                        }
                        (b'}', Container::Object) => return Ok(Some(self.close(JsonEvent::ObjectEnd))),
                        (b']', Container::Array) => return Ok(Some(self.close(JsonEvent::ArrayEnd))),
                        (_, Container::Object) => {
                            return Err(self.error(format!("expected ',' or '}}', found {}", describe_byte(byte))));
                        }
                        (_, Container::Array) => {
                            return Err(self.error(format!("expected ',' or ']', found {}", describe_byte(byte))));
                        }
                    }
                }
                Expect::FirstKey | Expect::Key => {
                    if byte == b'"' {
                        return match self.scan_string()? {
                            Some(key) => {
                                self.expect = Expect::Colon;
                                Ok(Some(JsonEvent::Key(key)))
                            }
                            None => Ok(None),
                        };
                    }
                    if byte == b'}' && (self.expect == Expect::FirstKey || self.allow_trailing_commas) {
                        return Ok(Some(self.close(JsonEvent::ObjectEnd)));
                    }
                    return Err(self.error(format!("expected a string key, found {}", describe_byte(byte))));
                }
                Expect::Value | Expect::MemberValue | Expect::FirstArrayValue | Expect::ArrayValue => {
                    let may_close = self.expect == Expect::FirstArrayValue
                        || (self.expect == Expect::ArrayValue && self.allow_trailing_commas);
                    if byte == b']' && may_close {
                        return Ok(Some(self.close(JsonEvent::ArrayEnd)));
                    }
                    return self.scan_value(byte);
                }
            }
        }
    }

    fn scan_value(&mut self, byte: u8) -> JsonLdResult<Option<JsonEvent>> {
        match byte {
            b'{' => self.open(Container::Object).map(Some),
            b'[' => self.open(Container::Array).map(Some),
            b'"' => Ok(self.scan_string()?.map(|s| {
                self.after_value();
                JsonEvent::Scalar(Scalar::String(s))
            })),
            b'-' | b'0'..=b'9' => self.scan_number(),
            b't' => self.scan_literal(b"true", Scalar::Boolean(true)),
            b'f' => self.scan_literal(b"false", Scalar::Boolean(false)),
            b'n' => self.scan_literal(b"null", Scalar::Null),
            _ => Err(self.error(format!("unexpected {}", describe_byte(byte)))),
        }
    }

    fn open(&mut self, container: Container) -> JsonLdResult<JsonEvent> {
        if self.containers.len() >= self.max_depth {
            return Err(self.error(format!("maximum nesting depth {} exceeded", self.max_depth)));
        }
        self.containers.push(container);
        self.advance(1);
        Ok(match container {
            Container::Object => {
                self.expect = Expect::FirstKey;
                JsonEvent::ObjectBegin
            }
            Container::Array => {
                self.expect = Expect::FirstArrayValue;
                JsonEvent::ArrayBegin
            }
        })
    }

    fn close(&mut self, event: JsonEvent) -> JsonEvent {
        self.containers.pop();
        self.advance(1);
        self.after_value();
        event
    }

    fn after_value(&mut self) {
        self.expect = if self.containers.is_empty() {
            Expect::End
        } else {
            Expect::CommaOrClose
        };
    }

    /// Scan a complete string token starting at the opening quote
    ///
    /// An incomplete string is resumed where the previous call stopped, so a
    /// long string split over many chunks is scanned once.
    fn scan_string(&mut self) -> JsonLdResult<Option<String>> {
        let mut escaped = self.escaped;
        let mut end = None;
        for (i, &b) in self.buffer.iter().enumerate().skip(self.scanned.max(1)) {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                end = Some(i);
                break;
            } else if b < 0x20 {
                return Err(self.error("unescaped control character in string"));
            }
        }

        let end = match end {
            Some(end) => end,
            None if self.closed => return Err(self.error("unterminated string")),
            None => {
                self.scanned = self.buffer.len();
                self.escaped = escaped;
                return Ok(None);
            }
        };

        let value: String = serde_json::from_slice(&self.buffer[..=end])
            .map_err(|e| self.error(format!("invalid string: {}", e)))?;
        self.advance(end + 1);
        Ok(Some(value))
    }

    fn scan_number(&mut self) -> JsonLdResult<Option<JsonEvent>> {
        let len = self.buffer[self.scanned..]
            .iter()
            .position(|b| !matches!(b, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E'))
            .map_or(self.buffer.len(), |i| self.scanned + i);
        if len == self.buffer.len() && !self.closed {
            self.scanned = len;
            return Ok(None);
        }

        // Only ASCII bytes were accepted above
        let text = String::from_utf8_lossy(&self.buffer[..len]).into_owned();
        let number: Number = text
            .parse()
            .map_err(|_| self.error(format!("invalid number {}", text)))?;
        self.advance(len);
        self.after_value();
        Ok(Some(JsonEvent::Scalar(Scalar::Number(number))))
    }

    fn scan_literal(&mut self, word: &[u8], scalar: Scalar) -> JsonLdResult<Option<JsonEvent>> {
        let available = self.buffer.len().min(word.len());
        if self.buffer[..available] != word[..available] {
            return Err(self.error("invalid literal"));
        }
        if available < word.len() {
            if self.closed {
                return Err(self.error("unexpected end of input in literal"));
            }
            return Ok(None);
        }
        if let Some(next) = self.buffer.get(word.len()) {
            if next.is_ascii_alphanumeric() {
                return Err(self.error("invalid literal"));
            }
        }
        self.advance(word.len());
        self.after_value();
        Ok(Some(JsonEvent::Scalar(scalar)))
    }

    fn skip_whitespace(&mut self) {
        let n = self
            .buffer
            .iter()
            .take_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
            .count();
        if n > 0 {
            self.advance(n);
        }
    }

    /// Consume `n` bytes, tracking the position
    ///
    /// Consuming input ends any partially scanned token.
    fn advance(&mut self, n: usize) {
        self.scanned = 0;
        self.escaped = false;
        for &b in &self.buffer[..n] {
            if b == b'\n' {
                self.line += 1;
                self.column = 1;
            } else if b & 0xC0 != 0x80 {
                self.column += 1;
            }
        }
        self.buffer.advance(n);
    }

    fn error(&self, message: impl Into<String>) -> JsonLdError {
        JsonLdError::syntax(message, self.line, self.column)
    }
}

fn describe_byte(byte: u8) -> String {
    if byte.is_ascii_graphic() {
        format!("'{}'", byte as char)
    } else {
        format!("byte 0x{:02x}", byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize_chunks(chunks: &[&[u8]], trailing: bool) -> JsonLdResult<Vec<JsonEvent>> {
        let mut tokenizer = JsonTokenizer::new(trailing, 64);
        let mut events = Vec::new();
        for chunk in chunks {
            tokenizer.feed(chunk);
            while let Some(event) = tokenizer.next_event()? {
                events.push(event);
            }
        }
        tokenizer.finish();
        while let Some(event) = tokenizer.next_event()? {
            events.push(event);
        }
        assert!(tokenizer.is_complete());
        Ok(events)
    }

    fn tokenize(input: &str) -> JsonLdResult<Vec<JsonEvent>> {
        tokenize_chunks(&[input.as_bytes()], true)
    }

    fn key(k: &str) -> JsonEvent {
        JsonEvent::Key(k.to_string())
    }

    fn string(s: &str) -> JsonEvent {
        JsonEvent::Scalar(Scalar::String(s.to_string()))
    }

    #[test]
    fn test_simple_object() {
        let events = tokenize(r#"{"@id": "http://ex.org/a", "p": [1, true, null]}"#).unwrap();
        assert_eq!(
            events,
            vec![
                JsonEvent::ObjectBegin,
                key("@id"),
                string("http://ex.org/a"),
                key("p"),
                JsonEvent::ArrayBegin,
                JsonEvent::Scalar(Scalar::from(1i64)),
                JsonEvent::Scalar(Scalar::Boolean(true)),
                JsonEvent::Scalar(Scalar::Null),
                JsonEvent::ArrayEnd,
                JsonEvent::ObjectEnd,
            ]
        );
    }

    #[test]
    fn test_byte_by_byte_matches_whole_input() {
        let input = "{\"k\\u00e9y\": \"v\\\"al\u{1F600}ue\", \"n\": -12.5e3, \"b\": false, \"a\": [[], {}]}";
        let whole = tokenize(input).unwrap();
        let bytes = input.as_bytes();
        let chunks: Vec<&[u8]> = bytes.chunks(1).collect();
        let split = tokenize_chunks(&chunks, true).unwrap();
        assert_eq!(whole, split);
        assert_eq!(whole[1], key("k\u{e9}y"));
        assert_eq!(whole[2], string("v\"al\u{1F600}ue"));
    }

    #[test]
    fn test_incomplete_string_resumes_scan() {
        let mut tokenizer = JsonTokenizer::new(true, 8);
        tokenizer.feed(br#"["ab"#);
        assert_eq!(tokenizer.next_event().unwrap(), Some(JsonEvent::ArrayBegin));
        assert_eq!(tokenizer.next_event().unwrap(), None);
        assert_eq!(tokenizer.scanned, 3);

        tokenizer.feed(b"c\\");
        assert_eq!(tokenizer.next_event().unwrap(), None);
        assert_eq!(tokenizer.scanned, 5);
        assert!(tokenizer.escaped);

        tokenizer.feed(br#""d"]"#);
        assert_eq!(tokenizer.next_event().unwrap(), Some(string("abc\"d")));
        assert_eq!(tokenizer.scanned, 0);
        assert_eq!(tokenizer.next_event().unwrap(), Some(JsonEvent::ArrayEnd));
    }

    #[test]
    fn test_long_string_in_small_chunks() {
        let value = "x".repeat(1 << 20);
        let input = format!(r#"["{}", 12345]"#, value);
        let chunks: Vec<&[u8]> = input.as_bytes().chunks(1024).collect();
        let events = tokenize_chunks(&chunks, true).unwrap();
        assert_eq!(
            events,
            vec![
                JsonEvent::ArrayBegin,
                string(&value),
                JsonEvent::Scalar(Scalar::from(12345i64)),
                JsonEvent::ArrayEnd,
            ]
        );
    }

    #[test]
    fn test_number_split_across_chunks() {
        let events = tokenize_chunks(&[b"[12", b"34", b".5", b"e1]"], true).unwrap();
        match &events[1] {
            JsonEvent::Scalar(Scalar::Number(n)) => assert_eq!(n.as_f64(), Some(12345.0)),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_number_at_end_of_input() {
        let events = tokenize_chunks(&[b"4", b"2"], true).unwrap();
        assert_eq!(events, vec![JsonEvent::Scalar(Scalar::from(42i64))]);
    }

    #[test]
    fn test_waits_for_complete_literal() {
        let mut tokenizer = JsonTokenizer::new(true, 8);
        tokenizer.feed(b"[tr");
        assert_eq!(tokenizer.next_event().unwrap(), Some(JsonEvent::ArrayBegin));
        assert_eq!(tokenizer.next_event().unwrap(), None);
        tokenizer.feed(b"ue]");
        assert_eq!(
            tokenizer.next_event().unwrap(),
            Some(JsonEvent::Scalar(Scalar::Boolean(true)))
        );
        assert_eq!(tokenizer.next_event().unwrap(), Some(JsonEvent::ArrayEnd));
        assert!(tokenizer.is_complete());
    }

    #[test]
    fn test_trailing_commas() {
        let events = tokenize(r#"{"a": ["x", ], "b": 1, }"#).unwrap();
        assert_eq!(events.len(), 8);

        let strict = tokenize_chunks(&[br#"{"a": 1, }"#], false);
        assert!(matches!(strict, Err(JsonLdError::Syntax { .. })));
    }

    #[test]
    fn test_missing_comma_reports_position() {
        let err = tokenize("{\n  \"@id\": \"x\"\n  \"b\": \"y\"\n}").unwrap_err();
        match err {
            JsonLdError::Syntax { line, column, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column, 3);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unexpected_end_of_input() {
        assert!(matches!(tokenize(r#"{"a": "#), Err(JsonLdError::Syntax { .. })));
        assert!(matches!(tokenize(r#"{"a": "unterminated"#), Err(JsonLdError::Syntax { .. })));
        assert!(matches!(tokenize(""), Err(JsonLdError::Syntax { .. })));
    }

    #[test]
    fn test_trailing_content_rejected() {
        assert!(matches!(tokenize("{} {}"), Err(JsonLdError::Syntax { .. })));
    }

    #[test]
    fn test_invalid_tokens() {
        assert!(tokenize("{\"a\": tru }").is_err());
        assert!(tokenize("{\"a\": nulls}").is_err());
        assert!(tokenize("{\"a\": 1.}").is_err());
        assert!(tokenize("{\"a\": 'single'}").is_err());
        assert!(tokenize("{\"a\" 1}").is_err());
        assert!(tokenize("{1: 2}").is_err());
        assert!(tokenize("[1 2]").is_err());
    }

    #[test]
    fn test_control_character_in_string() {
        assert!(tokenize("[\"a\tb\"]").is_err());
    }

    #[test]
    fn test_max_depth() {
        let mut tokenizer = JsonTokenizer::new(true, 2);
        tokenizer.feed(b"[[[");
        assert!(tokenizer.next_event().is_ok());
        assert!(tokenizer.next_event().is_ok());
        assert_eq!(tokenizer.containers.len(), 2);
        assert!(matches!(tokenizer.next_event(), Err(JsonLdError::Syntax { .. })));
    }
}
