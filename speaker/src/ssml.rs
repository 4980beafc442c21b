use crate::voices::Voice;

pub const FRAGMENT_OPEN: &str = "<p><s>";
pub const FRAGMENT_CLOSE: &str = "</s></p>";

/// Trim the raw text and add whichever of the `<p><s>` / `</s></p>` wrapper tags is missing.
/// Text that already carries both tags is returned trimmed but otherwise untouched.
///
/// The text is not escaped, so markup typed by the user is passed through to the engine.
pub fn prepare(raw: &str) -> String {
    let text = raw.trim();
    let mut fragment =
        String::with_capacity(text.len() + FRAGMENT_OPEN.len() + FRAGMENT_CLOSE.len());
    if !text.starts_with(FRAGMENT_OPEN) {
        fragment.push_str(FRAGMENT_OPEN);
    }
    fragment.push_str(text);
    if !text.ends_with(FRAGMENT_CLOSE) {
        fragment.push_str(FRAGMENT_CLOSE);
    }
    fragment
}

/// Embed a prepared fragment into a complete `<speak>` document for the given voice.
pub fn envelope(fragment: &str, voice: &Voice) -> String {
    format!(
        concat!(
            "<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' xml:lang='{}'>",
            "<voice name='{}'>{}</voice></speak>"
        ),
        voice.locale(),
        voice.name(),
        fragment
    )
}

/// Drop markup tags, leaving the spoken text. Used for backends that only accept plain text.
///
/// Only a `<` followed by a letter, `/`, `?` or `!` opens a tag, so text like `I <3 you` or
/// `a < b` is kept. A tag that is never closed swallows the rest of the document.
pub fn strip_markup(document: &str) -> String {
    let mut text = String::with_capacity(document.len());
    let mut chars = document.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '<' || !chars.peek().copied().is_some_and(starts_tag) {
            text.push(c);
            continue;
        }
        for c in chars.by_ref() {
            if c == '>' {
                break;
            }
        }
        // tags like </s><s> separate sentences
        text.push(' ');
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn starts_tag(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '/' | '?' | '!')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_plain_text() {
        assert_eq!(prepare("Hello"), "<p><s>Hello</s></p>");
    }

    #[test]
    fn trims_before_checking_anchors() {
        assert_eq!(prepare("   <p><s>Hi</s></p>  \n"), "<p><s>Hi</s></p>");
        assert_eq!(prepare("\t Hello there \r\n"), "<p><s>Hello there</s></p>");
    }

    #[test]
    fn adds_only_missing_close_tag() {
        assert_eq!(prepare("<p><s>Hello"), "<p><s>Hello</s></p>");
    }

    #[test]
    fn adds_only_missing_open_tag() {
        assert_eq!(prepare("Hello</s></p>"), "<p><s>Hello</s></p>");
    }

    #[test]
    fn does_not_double_wrap() {
        for raw in ["Hello", "<p><s>Hello", "Hello</s></p>", "  spaced  ", ""] {
            let once = prepare(raw);
            assert_eq!(prepare(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn tags_in_the_middle_do_not_count() {
        assert_eq!(
            prepare("say <p><s>this</s></p> now"),
            "<p><s>say <p><s>this</s></p> now</s></p>"
        );
    }

    #[test]
    fn special_characters_are_not_escaped() {
        assert_eq!(prepare("Tom & Jerry's"), "<p><s>Tom & Jerry's</s></p>");
    }

    #[test]
    fn envelope_has_single_root_and_voice() {
        let voice = Voice::new("Hedda", "de-DE");
        let fragment = prepare("Hello");
        let document = envelope(&fragment, &voice);
        assert_eq!(
            document,
            concat!(
                "<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' ",
                "xml:lang='de-DE'><voice name='Hedda'><p><s>Hello</s></p></voice></speak>"
            )
        );
        assert_eq!(document.matches("<speak ").count(), 1);
        assert_eq!(document.matches("</speak>").count(), 1);
        assert_eq!(document.matches("<voice ").count(), 1);
        assert!(document.contains(&fragment));
    }

    #[test]
    fn strip_markup_leaves_spoken_text() {
        let voice = Voice::new("David", "en-US");
        let document = envelope(&prepare("Hello <break/>world"), &voice);
        assert_eq!(strip_markup(&document), "Hello world");
        assert_eq!(strip_markup("<p><s>One.</s><s>Two.</s></p>"), "One. Two.");
    }

    #[test]
    fn strip_markup_keeps_lone_angle_brackets() {
        let voice = Voice::new("David", "en-US");
        let document = envelope(&prepare("I <3 you"), &voice);
        assert_eq!(strip_markup(&document), "I <3 you");
        assert_eq!(strip_markup("<p><s>a < b and c > d</s></p>"), "a < b and c > d");
        assert_eq!(strip_markup("<?xml version='1.0'?><speak>Hi</speak>"), "Hi");
    }
}
