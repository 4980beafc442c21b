use std::fmt;

use thiserror::Error;

/// An installed voice as reported by the speech backend. The position of a voice inside a
/// [VoiceCatalog] is what the user selects by, so voices are never mutated after listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    name: String,
    locale: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locale: locale.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Language tag of the voice, e.g. `en-US`.
    pub fn locale(&self) -> &str {
        &self.locale
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.locale)
    }
}

#[derive(Error, Debug)]
#[error("Failed to enumerate installed voices: {message}")]
pub struct EnumerationError {
    pub message: String,
}

impl EnumerationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("No voices are installed")]
pub struct NoVoicesAvailable;

/// Anything that can enumerate installed voices. Implemented by the `tts` backed engine and by
/// in-memory fakes in tests.
pub trait VoiceSource {
    fn list_voices(&mut self) -> Result<Vec<Voice>, EnumerationError>;
}

/// Ordered list of selectable voices. Built once per run; the numbering shown to the user is the
/// 1-based position in this list.
#[derive(Debug, Clone, Default)]
pub struct VoiceCatalog {
    voices: Vec<Voice>,
}

impl VoiceCatalog {
    /// Query the source once and keep the result in backend order.
    pub fn load(source: &mut impl VoiceSource) -> Result<Self, EnumerationError> {
        let voices = source.list_voices()?;
        tracing::debug!(count = voices.len(), "voice catalog loaded");
        Ok(Self { voices })
    }

    pub fn from_voices(voices: Vec<Voice>) -> Self {
        Self { voices }
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// Look up a voice by its 1-based number.
    pub fn get(&self, number: usize) -> Option<&Voice> {
        number.checked_sub(1).and_then(|idx| self.voices.get(idx))
    }

    /// The voice used whenever a selection is invalid.
    pub fn default_voice(&self) -> Result<&Voice, NoVoicesAvailable> {
        self.voices.first().ok_or(NoVoicesAvailable)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Voice> {
        self.voices.iter()
    }

    /// One line per voice in the form `{number}) {name} [{locale}]`.
    pub fn render(&self) -> Vec<String> {
        self.voices
            .iter()
            .enumerate()
            .map(|(idx, voice)| format!("{}) {}", idx + 1, voice))
            .collect()
    }
}
