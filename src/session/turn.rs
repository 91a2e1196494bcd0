//! Conversation turn pipeline

use super::{Effect, Message, Session, TurnId};
use crate::gateway::AudioPayload;
use crate::{Language, Result};

/// Bot message appended when the chat request fails
pub const CHAT_ERROR_TEXT: &str = "Error contacting chatbot.";

/// Bot message used when the backend answers without a reply
pub const NO_REPLY_TEXT: &str = "Sorry, no reply.";

impl Session {
    /// Append the user message and request a reply
    pub(super) fn begin_turn(&mut self, text: &str, language: Language) -> Vec<Effect> {
        let text = text.trim();
        if text.is_empty() {
            tracing::debug!("ignoring empty utterance");
            return Vec::new();
        }

        let turn = TurnId(self.next_turn);
        self.next_turn += 1;

        tracing::info!(%turn, language = %language, message = %text, "sending user message");
        let index = self.log.push(Message::user(text));

        vec![
            Effect::MessageAppended(index),
            Effect::RequestChat {
                turn,
                text: text.to_string(),
                language,
            },
        ]
    }

    pub(super) fn on_chat_replied(
        &mut self,
        turn: TurnId,
        language: Language,
        result: Result<Option<String>>,
    ) -> Vec<Effect> {
        match result {
            Ok(reply) => {
                let reply = reply
                    .filter(|r| !r.trim().is_empty())
                    .unwrap_or_else(|| NO_REPLY_TEXT.to_string());
                tracing::debug!(%turn, reply = %reply, "chat reply received");
                vec![Effect::SynthesizeReply {
                    turn,
                    reply,
                    language,
                }]
            }
            Err(e) => {
                tracing::error!(%turn, error = %e, "chat error");
                let index = self.log.push(Message::bot(CHAT_ERROR_TEXT, None));
                vec![Effect::MessageAppended(index)]
            }
        }
    }

    pub(super) fn on_reply_synthesized(
        &mut self,
        turn: TurnId,
        reply: String,
        result: Result<AudioPayload>,
    ) -> Vec<Effect> {
        let audio = match result {
            Ok(audio) if audio.is_audio() => {
                tracing::debug!(%turn, bytes = audio.len(), "reply audio generated");
                Some(audio)
            }
            Ok(audio) => {
                tracing::warn!(%turn, content_type = %audio.content_type, "reply synthesis returned non-audio");
                None
            }
            Err(e) => {
                tracing::warn!(%turn, error = %e, "reply synthesis failed");
                None
            }
        };

        let index = self.log.push(Message::bot(reply, audio));
        vec![Effect::MessageAppended(index)]
    }
}
