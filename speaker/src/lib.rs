//! Interactive text-to-speech sessions: pick an installed voice, type text, hear it spoken.
//!
//! A run is built from a [VoiceCatalog] (loaded once from a [VoiceSource]), a [SpeechEngine] and
//! a [SessionLogger], and driven by [SpeechSession]. [TtsEngine] provides both the voice source
//! and the engine on top of the platform synthesizer.

pub mod logger;
pub mod selector;
pub mod session;
pub mod ssml;
pub mod tts;
pub mod voices;

pub use logger::{DailyFileSink, LogSink, SessionLogger};
pub use selector::{prompt_selection, InvalidSelectionInput, Selection, SelectionError};
pub use session::{Command, Phase, SessionError, SessionState, SessionSummary, SpeechSession};
pub use self::tts::{SpeechEngine, SpeechError, TtsEngine, TtsError};
pub use voices::{EnumerationError, NoVoicesAvailable, Voice, VoiceCatalog, VoiceSource};
