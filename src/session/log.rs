//! Conversation log

use crate::gateway::AudioPayload;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    /// The person at the microphone or keyboard
    User,
    /// The chat backend
    Bot,
}

/// One entry in the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    sender: Sender,
    text: String,
    audio: Option<AudioPayload>,
}

impl Message {
    /// A user utterance
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            audio: None,
        }
    }

    /// A bot reply, optionally with its synthesized audio
    #[must_use]
    pub fn bot(text: impl Into<String>, audio: Option<AudioPayload>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
            audio,
        }
    }

    /// Author of the message
    #[must_use]
    pub const fn sender(&self) -> Sender {
        self.sender
    }

    /// Message text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cached synthesized audio, if any
    #[must_use]
    pub const fn audio(&self) -> Option<&AudioPayload> {
        self.audio.as_ref()
    }

    /// Whether this is a bot message
    #[must_use]
    pub fn is_bot(&self) -> bool {
        self.sender == Sender::Bot
    }
}

/// Append-only, ordered message list; a message's index is its identity
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    /// Create an empty log
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Append a message and return its index
    pub fn push(&mut self, message: Message) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    /// Message at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    /// Attach synthesized audio to a bot message that has none yet
    ///
    /// Returns `false` (and leaves the log untouched) if the index is out of
    /// range, the message is not a bot message, or audio is already cached.
    pub fn cache_audio(&mut self, index: usize, audio: AudioPayload) -> bool {
        match self.messages.get_mut(index) {
            Some(message) if message.is_bot() && message.audio.is_none() => {
                message.audio = Some(audio);
                true
            }
            _ => false,
        }
    }

    /// Number of messages
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages in display order
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Messages as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio() -> AudioPayload {
        AudioPayload::new("audio/mpeg", vec![1u8, 2, 3])
    }

    #[test]
    fn test_push_returns_index() {
        let mut log = ConversationLog::new();
        assert_eq!(log.push(Message::user("hello")), 0);
        assert_eq!(log.push(Message::bot("hi", None)), 1);
        assert_eq!(log.len(), 2);
        assert_eq!(log.get(1).unwrap().text(), "hi");
    }

    #[test]
    fn test_cache_audio_once() {
        let mut log = ConversationLog::new();
        log.push(Message::bot("hi", None));

        assert!(log.cache_audio(0, audio()));
        let other = AudioPayload::new("audio/wav", vec![9u8]);
        assert!(!log.cache_audio(0, other));
        assert_eq!(log.get(0).unwrap().audio(), Some(&audio()));
    }

    #[test]
    fn test_cache_audio_rejects_user_and_missing() {
        let mut log = ConversationLog::new();
        log.push(Message::user("hello"));

        assert!(!log.cache_audio(0, audio()));
        assert!(!log.cache_audio(5, audio()));
        assert!(log.get(0).unwrap().audio().is_none());
    }
}
