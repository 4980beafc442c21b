use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::{
    logger::SessionLogger,
    voices::{NoVoicesAvailable, Voice, VoiceCatalog},
};

/// Why a typed selection was not used. Never fatal: the default voice is picked instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidSelectionInput {
    #[error("'{0}' is not a valid number")]
    NotANumber(String),
    #[error("{choice} is out of range (1-{max})")]
    OutOfRange { choice: String, max: usize },
}

/// Result of resolving a line of input against the catalog.
#[derive(Debug, PartialEq, Eq)]
pub enum Selection<'a> {
    Chosen(&'a Voice),
    Fallback {
        voice: &'a Voice,
        reason: InvalidSelectionInput,
    },
}

impl<'a> Selection<'a> {
    pub fn voice(&self) -> &'a Voice {
        match self {
            Selection::Chosen(voice) => voice,
            Selection::Fallback { voice, .. } => voice,
        }
    }
}

#[derive(Error, Debug)]
pub enum SelectionError {
    #[error(transparent)]
    NoVoicesAvailable(#[from] NoVoicesAvailable),
    #[error("Failed to read voice selection")]
    Input(#[from] io::Error),
}

/// Resolve the input to a voice. Only a plain run of ASCII digits counts as a number; anything
/// else, and any number outside `1..=len`, falls back to the first voice.
pub fn resolve<'a>(
    catalog: &'a VoiceCatalog,
    input: &str,
) -> Result<Selection<'a>, NoVoicesAvailable> {
    let default = catalog.default_voice()?;
    let input = input.trim_end_matches(['\r', '\n']);

    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(Selection::Fallback {
            voice: default,
            reason: InvalidSelectionInput::NotANumber(input.to_string()),
        });
    }

    // digits that overflow usize are out of range as well
    match input.parse::<usize>().ok().and_then(|n| catalog.get(n)) {
        Some(voice) => Ok(Selection::Chosen(voice)),
        None => Ok(Selection::Fallback {
            voice: default,
            reason: InvalidSelectionInput::OutOfRange {
                choice: input.to_string(),
                max: catalog.len(),
            },
        }),
    }
}

/// Read one line, decoding invalid UTF-8 lossily. `None` at the end of input.
pub(crate) fn read_input_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut buf = Vec::new();
    if input.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

/// Show the catalog, read one line and return the chosen voice. Invalid input is not re-prompted;
/// the default voice is used and a warning printed.
pub fn prompt_selection<R: BufRead, W: Write>(
    catalog: &VoiceCatalog,
    input: &mut R,
    logger: &mut SessionLogger<W>,
) -> Result<Voice, SelectionError> {
    if catalog.is_empty() {
        return Err(NoVoicesAvailable.into());
    }

    logger.write("Available voices:", true);
    for line in catalog.render() {
        logger.write(&line, true);
    }
    logger.write(
        &format!(
            "Enter the number corresponding to your choice (1-{})",
            catalog.len()
        ),
        true,
    );

    let line = read_input_line(input)?.unwrap_or_default();

    let selection = resolve(catalog, &line)?;
    if let Selection::Fallback { voice, reason } = &selection {
        tracing::debug!(%reason, "invalid voice selection, using default");
        logger.write(&format!("Warning: {reason}. Using default voice: {voice}"), true);
    }

    let voice = selection.voice().clone();
    logger.write(&format!("Selected voice: {voice}"), true);
    Ok(voice)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> VoiceCatalog {
        VoiceCatalog::from_voices(vec![
            Voice::new("David", "en-US"),
            Voice::new("Hedda", "de-DE"),
            Voice::new("Zira", "en-US"),
        ])
    }

    #[test]
    fn every_valid_number_selects_that_voice() {
        let catalog = catalog();
        for (idx, expected) in catalog.iter().enumerate() {
            let input = format!("{}\n", idx + 1);
            assert_eq!(resolve(&catalog, &input).unwrap(), Selection::Chosen(expected));
        }
    }

    #[test]
    fn invalid_inputs_fall_back_to_first_voice() {
        let catalog = catalog();
        let first = catalog.get(1).unwrap();
        let inputs = [
            "", "\n", "abc", "-1", "+2", "0", "4", "2.0", " 2", "2 ", "1e3",
            "99999999999999999999999",
        ];
        for input in inputs {
            let selection = resolve(&catalog, input).unwrap();
            assert!(matches!(selection, Selection::Fallback { .. }), "input {input:?}");
            assert_eq!(selection.voice(), first, "input {input:?}");
            // same input, same outcome
            assert_eq!(resolve(&catalog, input).unwrap(), selection);
        }
    }

    #[test]
    fn fallback_reason_distinguishes_range_from_junk() {
        let catalog = catalog();
        match resolve(&catalog, "7").unwrap() {
            Selection::Fallback { reason, .. } => assert_eq!(
                reason,
                InvalidSelectionInput::OutOfRange {
                    choice: "7".to_string(),
                    max: 3
                }
            ),
            other => panic!("unexpected {other:?}"),
        }
        match resolve(&catalog, "two").unwrap() {
            Selection::Fallback { reason, .. } => {
                assert_eq!(reason, InvalidSelectionInput::NotANumber("two".to_string()))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_catalog_is_an_error() {
        let catalog = VoiceCatalog::default();
        assert_eq!(resolve(&catalog, "1"), Err(NoVoicesAvailable));

        let mut logger = SessionLogger::disabled(Vec::new());
        let err = prompt_selection(&catalog, &mut "1\n".as_bytes(), &mut logger).unwrap_err();
        assert!(matches!(err, SelectionError::NoVoicesAvailable(_)));
    }

    #[test]
    fn prompt_lists_voices_and_reads_choice() {
        let catalog = catalog();
        let mut logger = SessionLogger::disabled(Vec::new());
        let voice = prompt_selection(&catalog, &mut "2\n".as_bytes(), &mut logger).unwrap();
        assert_eq!(voice, Voice::new("Hedda", "de-DE"));

        let console = String::from_utf8(logger.into_console()).unwrap();
        assert!(console.contains("1) David [en-US]\n2) Hedda [de-DE]\n3) Zira [en-US]\n"));
        assert!(console.contains("Enter the number corresponding to your choice (1-3)"));
        assert!(!console.contains("Warning"));
    }

    #[test]
    fn prompt_warns_and_uses_default_on_bad_input() {
        let catalog = catalog();
        let mut logger = SessionLogger::disabled(Vec::new());
        let voice = prompt_selection(&catalog, &mut "nope\n".as_bytes(), &mut logger).unwrap();
        assert_eq!(voice.name(), "David");

        let console = String::from_utf8(logger.into_console()).unwrap();
        assert!(console.contains(
            "Warning: 'nope' is not a valid number. Using default voice: David [en-US]"
        ));
    }

    #[test]
    fn invalid_utf8_selection_falls_back() {
        let catalog = catalog();
        let mut logger = SessionLogger::disabled(Vec::new());
        let mut input: &[u8] = b"\xff2\nrest\n";
        let voice = prompt_selection(&catalog, &mut input, &mut logger).unwrap();
        assert_eq!(voice.name(), "David");
        assert_eq!(input, b"rest\n");
    }

    #[test]
    fn read_input_line_is_lossy() {
        let mut input: &[u8] = b"Gr\xfc\xdfe\nok";
        assert_eq!(
            read_input_line(&mut input).unwrap().as_deref(),
            Some("Gr\u{fffd}\u{fffd}e\n")
        );
        assert_eq!(read_input_line(&mut input).unwrap().as_deref(), Some("ok"));
        assert_eq!(read_input_line(&mut input).unwrap(), None);
    }

    #[test]
    fn prompt_at_end_of_input_uses_default() {
        let catalog = catalog();
        let mut logger = SessionLogger::disabled(Vec::new());
        let voice = prompt_selection(&catalog, &mut "".as_bytes(), &mut logger).unwrap();
        assert_eq!(voice.name(), "David");
    }
}
