use std::{
    io::{self, BufRead, Write},
    time::{Duration, Instant},
};

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::{
    logger::{timestamp_now, SessionLogger},
    selector::{prompt_selection, read_input_line, SelectionError},
    ssml,
    tts::{SpeechEngine, SpeechError},
    voices::{Voice, VoiceCatalog},
};

pub const TEXT_PROMPT: &str =
    "Enter text to speak (type 'voice' to change the voice, 'exit' or 'quit' to leave):";

const ERROR_BANNER: &str = "==================== Error while speaking ====================";
const ERROR_BANNER_END: &str = "==============================================================";

/// What a line typed at the text prompt means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    SwitchVoice,
    Speak(String),
}

impl Command {
    /// Commands must make up the whole line, apart from its terminator, and are matched
    /// case-insensitively. Everything else is text to speak.
    pub fn classify(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            Command::Exit
        } else if line.eq_ignore_ascii_case("voice") {
            Command::SwitchVoice
        } else {
            Command::Speak(line.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    SelectingVoice,
    AwaitingInput,
    Speaking(String),
    Terminated,
}

impl Phase {
    /// Transition out of `AwaitingInput` for a classified line.
    pub fn after(command: Command) -> Self {
        match command {
            Command::Exit => Phase::Terminated,
            Command::SwitchVoice => Phase::SelectingVoice,
            Command::Speak(text) => Phase::Speaking(text),
        }
    }
}

/// State that lives for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub current_voice: Voice,
    pub logging_enabled: bool,
}

/// One pass through the speaking phase. `started`/`finished` are wall-clock times, `elapsed` is
/// measured on the monotonic clock.
#[derive(Debug)]
pub struct Utterance {
    pub raw_input: String,
    pub prepared_ssml: String,
    pub started: DateTime<Local>,
    pub finished: DateTime<Local>,
    pub elapsed: Duration,
    pub outcome: Result<(), SpeechError>,
}

impl Utterance {
    pub fn elapsed_secs(&self) -> f64 {
        elapsed_secs(self.elapsed)
    }
}

/// Duration in seconds, rounded to milliseconds.
pub fn elapsed_secs(elapsed: Duration) -> f64 {
    (elapsed.as_micros() as f64 / 1_000.0).round() / 1_000.0
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub final_voice: Voice,
    pub spoken: usize,
    pub failed: usize,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to select a voice")]
    Selection(#[from] SelectionError),
    #[error("Failed to read input")]
    Input(#[from] io::Error),
}

/// The interactive loop: read a line, switch voice, speak it or leave.
pub struct SpeechSession<'a, E, R, W> {
    catalog: &'a VoiceCatalog,
    engine: E,
    input: R,
    logger: SessionLogger<W>,
    state: SessionState,
    spoken: usize,
    failed: usize,
}

impl<'a, E, R, W> SpeechSession<'a, E, R, W>
where
    E: SpeechEngine,
    R: BufRead,
    W: Write,
{
    /// Log the start of the run and ask for the initial voice.
    pub fn start(
        catalog: &'a VoiceCatalog,
        engine: E,
        mut input: R,
        mut logger: SessionLogger<W>,
    ) -> Result<Self, SessionError> {
        logger.start("speech session");
        let current_voice = prompt_selection(catalog, &mut input, &mut logger)?;
        let state = SessionState {
            current_voice,
            logging_enabled: logger.is_enabled(),
        };
        Ok(Self {
            catalog,
            engine,
            input,
            logger,
            state,
            spoken: 0,
            failed: 0,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Run until `exit`/`quit` or the end of input.
    pub fn run(mut self) -> Result<SessionSummary, SessionError> {
        let mut phase = Phase::AwaitingInput;
        loop {
            phase = match phase {
                Phase::AwaitingInput => self.read_command()?,
                Phase::SelectingVoice => {
                    self.state.current_voice =
                        prompt_selection(self.catalog, &mut self.input, &mut self.logger)?;
                    Phase::AwaitingInput
                }
                Phase::Speaking(text) => {
                    let utterance = self.speak(text);
                    self.report(&utterance);
                    Phase::AwaitingInput
                }
                Phase::Terminated => break,
            };
        }

        self.logger.write(
            &format!(
                "Goodbye! Session ended at {} ({} spoken, {} failed).",
                timestamp_now(),
                self.spoken,
                self.failed
            ),
            true,
        );
        Ok(SessionSummary {
            final_voice: self.state.current_voice,
            spoken: self.spoken,
            failed: self.failed,
        })
    }

    fn read_command(&mut self) -> Result<Phase, SessionError> {
        let console = self.logger.console();
        writeln!(console, "{TEXT_PROMPT}")?;
        console.flush()?;

        match read_input_line(&mut self.input)? {
            Some(line) => Ok(Phase::after(Command::classify(&line))),
            None => {
                tracing::debug!("end of input");
                Ok(Phase::Terminated)
            }
        }
    }

    fn speak(&mut self, raw_input: String) -> Utterance {
        let voice = &self.state.current_voice;
        let fragment = ssml::prepare(&raw_input);
        let prepared_ssml = ssml::envelope(&fragment, voice);
        tracing::debug!(ssml = %prepared_ssml, "prepared utterance");

        self.logger.write(&format!("Text: {raw_input}"), false);
        self.logger.write(&format!("Speaking with voice: {voice}..."), true);

        let started = Local::now();
        let clock = Instant::now();
        let outcome = self.engine.speak(voice, &prepared_ssml);
        let elapsed = clock.elapsed();
        let finished = Local::now();

        Utterance {
            raw_input,
            prepared_ssml,
            started,
            finished,
            elapsed,
            outcome,
        }
    }

    fn report(&mut self, utterance: &Utterance) {
        match &utterance.outcome {
            Ok(()) => {
                self.spoken += 1;
                let elapsed = utterance.elapsed_secs();
                tracing::debug!(elapsed, "utterance finished");
                let message = format!("Speech finished within {elapsed:.3} seconds.");
                self.logger.write(&message, true);
            }
            Err(e) => {
                self.failed += 1;
                tracing::debug!(error = ?e, input = %utterance.raw_input, "speech failed");
                self.logger.write(ERROR_BANNER, true);
                self.logger.write(&format!("Error: {}", e.message), true);
                if let Some(detail) = &e.detail {
                    self.logger.write(&format!("Details: {detail}"), true);
                }
                self.logger.write(ERROR_BANNER_END, true);
            }
        }
    }
}
