//! The transcript: an append-only, ordered list of chat messages.

use std::fmt;

use time::OffsetDateTime;

/// Identifies a message within one transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    /// The person chatting.
    User,
    /// The sales agent.
    Agent,
}

/// One chat message. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    id: MessageId,
    sender: Sender,
    text: String,
    timestamp: OffsetDateTime,
}

impl Message {
    /// Identifier, unique within the transcript that created the message.
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Who wrote the message.
    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// The raw message text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// When the message was created, in UTC.
    pub fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }
}

/// Messages in display order, oldest first.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: u64,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return it.
    pub fn push(&mut self, sender: Sender, text: impl Into<String>) -> &Message {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        let timestamp = OffsetDateTime::now_utc();
        self.messages.push(Message {
            id,
            sender,
            text: text.into(),
            timestamp,
        });
        &self.messages[self.messages.len() - 1]
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recent message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if there are no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of messages from `sender`.
    pub fn count(&self, sender: Sender) -> usize {
        self.messages.iter().filter(|m| m.sender == sender).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_ordered() {
        let mut transcript = Transcript::new();
        let a = transcript.push(Sender::Agent, "hello").id();
        let b = transcript.push(Sender::User, "hi").id();
        let c = transcript.push(Sender::Agent, "welcome").id();
        assert!(a < b && b < c);
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.count(Sender::Agent), 2);
        assert_eq!(transcript.last().unwrap().text(), "welcome");
    }

    #[test]
    fn messages_keep_insertion_order() {
        let mut transcript = Transcript::new();
        for text in ["one", "two", "three"] {
            transcript.push(Sender::User, text);
        }
        let texts: Vec<&str> = transcript.messages().iter().map(Message::text).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn timestamps_do_not_go_backwards() {
        let mut transcript = Transcript::new();
        let first = transcript.push(Sender::User, "a").timestamp();
        let second = transcript.push(Sender::Agent, "b").timestamp();
        assert!(second.unix_timestamp() >= first.unix_timestamp());
    }
}
