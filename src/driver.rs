//! Session runtime
//!
//! The driver feeds events into the [`Session`] one at a time and carries out
//! the resulting effects. Backend requests run as tokio tasks and report back
//! through the event channel, so every state transition happens on the
//! driver's own task.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::Language;
use crate::audio::AudioOutput;
use crate::capture::Capture;
use crate::gateway::Backend;
use crate::session::{Effect, Event, EventReceiver, EventSender, Session};

/// Receives the session's notices (appended messages, now-playing changes, ...)
pub trait SessionView {
    /// Called after the transition that produced `notice` has been applied
    fn notify(&mut self, notice: &Effect, session: &Session);
}

/// A view that ignores every notice
impl SessionView for () {
    fn notify(&mut self, _notice: &Effect, _session: &Session) {}
}

/// Owns a session together with its backend, devices and view
pub struct Driver<V> {
    session: Session,
    backend: Arc<dyn Backend>,
    capture: Capture,
    output: Box<dyn AudioOutput>,
    view: V,
    tx: EventSender,
    rx: EventReceiver,
    pending: usize,
}

impl<V: SessionView> Driver<V> {
    /// Create a driver; the session's strategy follows `capture`
    #[must_use]
    pub fn new(
        language: Language,
        backend: Arc<dyn Backend>,
        capture: Capture,
        output: Box<dyn AudioOutput>,
        view: V,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session: Session::new(capture.strategy(), language),
            backend,
            capture,
            output,
            view,
            tx,
            rx,
            pending: 0,
        }
    }

    /// Sender for user intents and device events
    #[must_use]
    pub fn sender(&self) -> EventSender {
        self.tx.clone()
    }

    /// The session being driven
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// The attached view
    #[must_use]
    pub const fn view(&self) -> &V {
        &self.view
    }

    /// Backend requests issued but not yet applied
    #[must_use]
    pub const fn pending(&self) -> usize {
        self.pending
    }

    /// Run the session's startup effects
    pub fn start(&mut self) {
        tracing::debug!(
            strategy = ?self.session.strategy(),
            language = %self.session.language(),
            "session starting"
        );
        for effect in self.session.start() {
            if let Some(event) = self.execute(effect) {
                self.handle(event);
            }
        }
    }

    /// Apply one event plus any events its effects produce synchronously
    pub fn handle(&mut self, event: Event) {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            if event.is_completion() {
                self.pending = self.pending.saturating_sub(1);
            }
            for effect in self.session.update(event) {
                if let Some(follow_up) = self.execute(effect) {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    /// Process events until [`Event::Shutdown`] arrives
    pub async fn run(&mut self) {
        while let Some(event) = self.rx.recv().await {
            if matches!(event, Event::Shutdown) {
                tracing::debug!("session shutting down");
                break;
            }
            self.handle(event);
        }
        self.output.stop();
    }

    /// Process events until every issued backend request has been applied
    pub async fn settle(&mut self) {
        while self.pending > 0 {
            let Some(event) = self.rx.recv().await else {
                break;
            };
            self.handle(event);
        }
    }

    /// Apply every event already waiting in the channel without blocking
    pub fn process_ready(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.handle(event);
        }
    }

    /// Carry out one effect, returning an event it produced synchronously
    fn execute(&mut self, effect: Effect) -> Option<Event> {
        let backend = Arc::clone(&self.backend);
        match effect {
            Effect::PushLanguage(language) => {
                self.spawn(async move {
                    let result = backend.set_language(language).await;
                    Event::LanguagePushed { language, result }
                });
                None
            }
            Effect::RequestChat {
                turn,
                text,
                language,
            } => {
                self.spawn(async move {
                    let result = backend.send_chat_message(&text, language).await;
                    Event::ChatReplied {
                        turn,
                        language,
                        result,
                    }
                });
                None
            }
            Effect::SynthesizeReply {
                turn,
                reply,
                language,
            } => {
                self.spawn(async move {
                    let result = backend.synthesize_speech(&reply, language).await;
                    Event::ReplySynthesized {
                        turn,
                        reply,
                        result,
                    }
                });
                None
            }
            Effect::SynthesizeForPlayback {
                request,
                index,
                text,
                language,
            } => {
                self.spawn(async move {
                    let result = backend.synthesize_speech(&text, language).await;
                    Event::PlaybackSynthesized {
                        request,
                        index,
                        result,
                    }
                });
                None
            }
            Effect::Transcribe(recording) => {
                self.spawn(async move { Event::Transcribed(backend.transcribe_audio(recording).await) });
                None
            }

            Effect::StartRecognition { locale } => match &mut self.capture {
                Capture::NativeRecognition(recognizer) => recognizer
                    .start(locale, self.tx.clone())
                    .err()
                    .map(|e| Event::CaptureFailed(e.to_string())),
                Capture::FallbackRecording(_) => {
                    Some(Event::CaptureFailed("no speech recognizer".to_string()))
                }
            },
            Effect::StopRecognition => match &mut self.capture {
                Capture::NativeRecognition(recognizer) => recognizer
                    .stop()
                    .err()
                    .map(|e| Event::CaptureFailed(e.to_string())),
                Capture::FallbackRecording(_) => None,
            },
            Effect::StartRecording => match &mut self.capture {
                Capture::FallbackRecording(recorder) => recorder
                    .start()
                    .err()
                    .map(|e| Event::CaptureFailed(e.to_string())),
                Capture::NativeRecognition(_) => {
                    Some(Event::CaptureFailed("no audio recorder".to_string()))
                }
            },
            Effect::StopRecording => match &mut self.capture {
                Capture::FallbackRecording(recorder) => Some(match recorder.stop() {
                    Ok(recording) => Event::RecordingFinished(recording),
                    Err(e) => Event::CaptureFailed(e.to_string()),
                }),
                Capture::NativeRecognition(_) => None,
            },

            Effect::StartPlayback { id, index, audio } => {
                tracing::debug!(%id, index, bytes = audio.len(), "playing message audio");
                self.output
                    .play(id, audio, self.tx.clone())
                    .err()
                    .map(|e| Event::PlaybackFailed {
                        id,
                        error: e.to_string(),
                    })
            }
            Effect::StopPlayback => {
                self.output.stop();
                None
            }

            notice => {
                self.view.notify(&notice, &self.session);
                None
            }
        }
    }

    fn spawn<F>(&mut self, request: F)
    where
        F: Future<Output = Event> + Send + 'static,
    {
        self.pending += 1;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            // The driver may already be gone; late completions are dropped
            let _ = tx.send(request.await);
        });
    }
}
