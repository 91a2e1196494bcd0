//! Line-oriented terminal front-end
//!
//! Reads commands from stdin and prints the conversation as it grows.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::Language;
use crate::driver::SessionView;
use crate::session::{CaptureMode, Effect, Event, EventSender, Sender, Session};

/// Help text shown for `/help`
pub const HELP: &str = "\
Type a message and press enter to send it.
  /mic          start or stop voice capture
  /play N       play or stop the voice of message N
  /lang CODE    switch language (en, hi, ta, te)
  /languages    list supported languages
  /quit         exit";

/// A parsed line of terminal input
#[derive(Debug)]
pub enum Input {
    /// Forward to the session
    Event(Event),
    /// Print the language table
    Languages,
    /// Print help
    Help,
    /// Leave the session
    Quit,
    /// Blank line
    Nothing,
    /// Unusable command, with the reason
    Invalid(String),
}

/// Parse one line of input
#[must_use]
pub fn parse_line(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Nothing;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Event(Event::Submit(line.to_string()));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();

    match (name, arg) {
        ("mic", None) => Input::Event(Event::ToggleMic),
        ("play", Some(n)) => match n.parse::<usize>() {
            Ok(n) if n > 0 => Input::Event(Event::Play(n - 1)),
            _ => Input::Invalid(format!("not a message number: {n}")),
        },
        ("play", None) => Input::Invalid("usage: /play N".to_string()),
        ("lang", Some(code)) => match code.parse::<Language>() {
            Ok(language) => Input::Event(Event::SetLanguage(language)),
            Err(e) => Input::Invalid(e.to_string()),
        },
        ("lang", None) => Input::Invalid("usage: /lang CODE".to_string()),
        ("languages", None) => Input::Languages,
        ("help", None) => Input::Help,
        ("quit" | "exit", None) => Input::Quit,
        _ => Input::Invalid(format!("unknown command: /{command}")),
    }
}

/// Render the language table, marking `current`
#[must_use]
pub fn language_table(current: Option<Language>) -> String {
    Language::ALL
        .iter()
        .map(|&lang| {
            let marker = if Some(lang) == current { '*' } else { ' ' };
            format!("{marker} {:<3} {}", lang.code(), lang.label())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Forward stdin lines to the session until `/quit` or end of input
pub async fn read_commands(events: EventSender) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "failed to read stdin");
                break;
            }
        };

        match parse_line(&line) {
            Input::Event(event) => {
                if events.send(event).is_err() {
                    return;
                }
            }
            Input::Languages => println!("{}", language_table(None)),
            Input::Help => println!("{HELP}"),
            Input::Quit => break,
            Input::Nothing => {}
            Input::Invalid(reason) => println!("{reason}"),
        }
    }

    let _ = events.send(Event::Shutdown);
}

/// Prints session notices to a writer
pub struct TerminalView<W> {
    out: W,
}

impl<W: Write> TerminalView<W> {
    /// Create a view writing to `out`
    #[must_use]
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    /// The underlying writer
    #[must_use]
    pub const fn get_ref(&self) -> &W {
        &self.out
    }

    fn render(notice: &Effect, session: &Session) -> Option<String> {
        match notice {
            Effect::MessageAppended(index) => {
                let message = session.log().get(*index)?;
                let line = match message.sender() {
                    Sender::User => format!("[{}] you: {}", index + 1, message.text()),
                    Sender::Bot if message.audio().is_some() => {
                        format!("[{}] bot: {} (voice ready)", index + 1, message.text())
                    }
                    Sender::Bot => format!("[{}] bot: {}", index + 1, message.text()),
                };
                Some(line)
            }
            Effect::NowPlayingChanged(Some(index)) => Some(format!("playing [{}]", index + 1)),
            Effect::NowPlayingChanged(None) => Some("playback stopped".to_string()),
            Effect::CaptureModeChanged(CaptureMode::Listening) => Some("listening...".to_string()),
            Effect::CaptureModeChanged(CaptureMode::RecordingFallback) => {
                Some("recording... (/mic to stop)".to_string())
            }
            Effect::CaptureModeChanged(CaptureMode::Idle) => Some("mic off".to_string()),
            Effect::LanguageChanged(language) => Some(format!("language: {}", language.label())),
            _ => None,
        }
    }
}

impl<W: Write> SessionView for TerminalView<W> {
    fn notify(&mut self, notice: &Effect, session: &Session) {
        if let Some(line) = Self::render(notice, session) {
            if let Err(e) = writeln!(self.out, "{line}") {
                tracing::warn!(error = %e, "failed to write to terminal");
            }
        }
    }
}
