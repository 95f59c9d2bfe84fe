use bytes::Bytes;

/// Outbound payload handed to the relay by the pipeline
///
/// The relay never interprets content: structured values are serialized by
/// the caller, and both variants are sent as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Bytes(Bytes),
    Text(String),
}

impl Payload {
    /// Normalize to the text form that goes on the wire
    ///
    /// Invalid UTF-8 is replaced with U+FFFD rather than rejected.
    pub fn into_text(self) -> String {
        match self {
            Payload::Text(text) => text,
            Payload::Bytes(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// Size in bytes before normalization
    pub fn len(&self) -> usize {
        match self {
            Payload::Bytes(bytes) => bytes.len(),
            Payload::Text(text) => text.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(Bytes::from(bytes))
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Bytes(Bytes::copy_from_slice(bytes))
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Payload::Bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_passes_through() {
        let text = "{\"id\":1, \"note\":\"héllo\"}";
        assert_eq!(Payload::from(text).into_text(), text);
    }

    #[test]
    fn test_bytes_are_decoded() {
        assert_eq!(Payload::from(b"hello".to_vec()).into_text(), "hello");
        assert_eq!(
            Payload::from(Bytes::from_static("ünïcode".as_bytes())).into_text(),
            "ünïcode"
        );
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let payload = Payload::from(&[b'o', b'k', 0xff][..]);
        assert_eq!(payload.len(), 3);
        assert_eq!(payload.into_text(), "ok\u{fffd}");
    }

    #[test]
    fn test_empty_payload() {
        let payload = Payload::from(Vec::new());
        assert!(payload.is_empty());
        assert_eq!(payload.into_text(), "");
    }
}
