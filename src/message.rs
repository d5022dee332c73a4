use std::fmt;

use thiserror::Error;

/// Separator between the sender name and the content on the wire.
const SEPARATOR: char = ',';

/// Characters stripped from the end of every raw line read off a socket or
/// terminal before it is interpreted.
pub(crate) const LINE_ENDINGS: &[char] = &['\r', '\n'];

/// One chat line exchanged between the two peers.
///
/// A `Message` is built either when the local user types a line or when a
/// raw wire line decodes successfully. It is immutable after construction:
/// the sender is never blank and the content, while possibly empty, is
/// always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    sender: String,
    content: String,
}

/// Reasons a raw line is rejected by the codec.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidMessage {
    #[error("message line has no ',' separator")]
    MissingSeparator,
    #[error("message sender is blank")]
    BlankSender,
}

impl Message {
    pub fn new(
        sender: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, InvalidMessage> {
        let sender = sender.into();
        if sender.trim().is_empty() {
            return Err(InvalidMessage::BlankSender);
        }
        Ok(Self {
            sender,
            content: content.into(),
        })
    }

    /// Decodes one raw wire line.
    ///
    /// The line is split on the FIRST separator only, so content is free to
    /// contain commas; they simply become part of `content`. A line with no
    /// separator, or one whose sender part is blank, is rejected.
    pub fn decode(line: &str) -> Result<Self, InvalidMessage> {
        let (sender, content) = line
            .split_once(SEPARATOR)
            .ok_or(InvalidMessage::MissingSeparator)?;
        Self::new(sender, content)
    }

    /// Encodes to the raw wire form `sender,content` (no trailing newline).
    ///
    /// Sender names are kept comma-free by configuration validation, so no
    /// escaping is performed here.
    pub fn encode(&self) -> String {
        format!("{}{SEPARATOR}{}", self.sender, self.content)
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.sender, self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_joins_sender_and_content() {
        let message = Message::new("alice", "hi").expect("valid message");
        assert_eq!(message.encode(), "alice,hi");
        assert_eq!(message.to_string(), "alice: hi");
    }

    #[test]
    fn decode_splits_on_first_separator_only() {
        let message = Message::decode("alice,hi, and more, commas").expect("valid line");
        assert_eq!(message.sender(), "alice");
        assert_eq!(message.content(), "hi, and more, commas");
    }

    #[test]
    fn decode_allows_empty_content() {
        let message = Message::decode("alice,").expect("valid line");
        assert_eq!(message.sender(), "alice");
        assert_eq!(message.content(), "");
    }

    #[test]
    fn decode_rejects_line_without_separator() {
        assert_eq!(Message::decode(""), Err(InvalidMessage::MissingSeparator));
        assert_eq!(
            Message::decode("noSeparatorHere"),
            Err(InvalidMessage::MissingSeparator)
        );
    }

    #[test]
    fn decode_rejects_blank_sender() {
        assert_eq!(Message::decode(",hello"), Err(InvalidMessage::BlankSender));
        assert_eq!(
            Message::decode("   ,hello"),
            Err(InvalidMessage::BlankSender)
        );
    }

    #[test]
    fn new_rejects_blank_sender() {
        assert_eq!(
            Message::new("  ", "hi"),
            Err(InvalidMessage::BlankSender)
        );
    }

    #[test]
    fn roundtrip_preserves_comma_free_and_comma_bearing_content() {
        for content in ["hi", "", "a,b,c", "trailing,"] {
            let original = Message::new("bob", content).expect("valid message");
            let decoded = Message::decode(&original.encode()).expect("roundtrip");
            assert_eq!(decoded, original);
        }
    }
}
