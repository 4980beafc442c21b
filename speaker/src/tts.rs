use std::{thread, time::Duration};

use thiserror::Error;
use tts::Tts;

pub use tts::Error as TtsError;

use crate::{
    ssml,
    voices::{EnumerationError, Voice, VoiceSource},
};

/// Failure of a single speak call. `detail` carries the backend's debug output when there is one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SpeechError {
    pub message: String,
    pub detail: Option<String>,
}

impl SpeechError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl From<TtsError> for SpeechError {
    fn from(e: TtsError) -> Self {
        SpeechError::new(e.to_string()).with_detail(format!("{e:?}"))
    }
}

/// Synchronous speech output. `speak` returns once the utterance has been fully spoken or failed.
pub trait SpeechEngine {
    fn speak(&mut self, voice: &Voice, ssml: &str) -> Result<(), SpeechError>;
}

impl<E: SpeechEngine + ?Sized> SpeechEngine for &mut E {
    fn speak(&mut self, voice: &Voice, ssml: &str) -> Result<(), SpeechError> {
        (**self).speak(voice, ssml)
    }
}

/// Speech engine backed by the platform's native synthesizer through the `tts` crate.
pub struct TtsEngine {
    tts: Tts,
    voices: Vec<tts::Voice>,
    warned_no_voice_select: bool,
}

impl TtsEngine {
    pub fn new() -> Result<Self, TtsError> {
        let tts = Tts::default()?;
        Ok(Self {
            tts,
            voices: Vec::new(),
            warned_no_voice_select: false,
        })
    }

    fn select_voice(&mut self, voice: &Voice) -> Result<(), TtsError> {
        if !self.tts.supported_features().voice {
            if !self.warned_no_voice_select {
                self.warned_no_voice_select = true;
                tracing::warn!("speech backend cannot switch voices, using its default voice");
            }
            return Ok(());
        }

        let backend_voice = self
            .voices
            .iter()
            .find(|v| v.name() == voice.name() && v.language().to_string() == voice.locale());
        match backend_voice {
            Some(v) => self.tts.set_voice(v),
            None => {
                tracing::warn!(voice = %voice, "voice not known to the backend");
                Ok(())
            }
        }
    }

    fn finish_speaking(&self) -> Result<(), TtsError> {
        if !self.tts.supported_features().is_speaking {
            return Ok(());
        }
        while self.tts.is_speaking()? {
            thread::sleep(Duration::from_millis(100));
        }
        Ok(())
    }
}

impl VoiceSource for TtsEngine {
    fn list_voices(&mut self) -> Result<Vec<Voice>, EnumerationError> {
        self.voices = self
            .tts
            .voices()
            .map_err(|e| EnumerationError::new(e.to_string()))?;
        Ok(self
            .voices
            .iter()
            .map(|v| Voice::new(v.name(), v.language().to_string()))
            .collect())
    }
}

impl SpeechEngine for TtsEngine {
    fn speak(&mut self, voice: &Voice, ssml: &str) -> Result<(), SpeechError> {
        self.select_voice(voice)?;
        // the tts backends read markup aloud, so only the text goes out
        let text = ssml::strip_markup(ssml);
        self.tts.speak(text, true)?;
        self.finish_speaking()?;
        Ok(())
    }
}
