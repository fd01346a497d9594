//! Narrative message sink.

/// Receives formatted narration. Purely observational: nothing in the
/// engine reads messages back.
pub trait MessageSink {
    fn emit(&mut self, message: &str);
}

/// Collects messages in memory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageLog {
    pub messages: Vec<String>,
}

impl MessageSink for MessageLog {
    fn emit(&mut self, message: &str) {
        self.messages.push(message.to_owned());
    }
}

/// Discards every message.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullMessages;

impl MessageSink for NullMessages {
    fn emit(&mut self, _message: &str) {}
}
