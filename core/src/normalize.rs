//! Persian text normalization.
//!
//! Transcription engines frequently emit Arabic codepoints for letters
//! that have distinct Persian forms. Normalization maps those to their
//! Persian equivalents, strips diacritics, and tidies whitespace so that
//! output files are consistent regardless of engine.

use crate::engine::Transcription;

/// Normalize Persian text.
///
/// Rules applied, in one pass:
/// - Arabic kaf (ك) to Persian keheh (ک)
/// - Arabic yeh (ي) and alef maksura (ى) to Persian yeh (ی)
/// - Teh marbuta (ة) to heh (ه)
/// - Tatweel (ـ) removed
/// - Harakat (fathatan through sukun) removed
/// - Arabic-Indic digits (٠-٩) to Extended Arabic-Indic digits (۰-۹)
/// - Whitespace runs collapsed to a single space, ends trimmed
pub fn normalize_fa(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for ch in text.chars() {
        let mapped = match ch {
            '\u{0643}' => Some('\u{06A9}'),
            '\u{064A}' | '\u{0649}' => Some('\u{06CC}'),
            '\u{0629}' => Some('\u{0647}'),
            '\u{0640}' => None,
            '\u{064B}'..='\u{0652}' => None,
            '\u{0660}'..='\u{0669}' => {
                char::from_u32(0x06F0 + (ch as u32 - 0x0660)).or(Some(ch))
            }
            c if c.is_whitespace() => {
                pending_space = true;
                continue;
            }
            c => Some(c),
        };

        if let Some(c) = mapped {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        }
    }

    out
}

/// Normalize a transcription in place, covering the full text and every
/// segment.
pub fn normalize_transcription(transcription: &mut Transcription) {
    transcription.text = normalize_fa(&transcription.text);
    for segment in &mut transcription.segments {
        segment.text = normalize_fa(&segment.text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Segment;

    #[test]
    fn test_arabic_kaf_and_yeh_become_persian() {
        assert_eq!(normalize_fa("\u{064A}\u{0643}"), "\u{06CC}\u{06A9}");
    }

    #[test]
    fn test_alef_maksura_becomes_persian_yeh() {
        assert_eq!(normalize_fa("موس\u{0649}"), "موس\u{06CC}");
    }

    #[test]
    fn test_teh_marbuta_becomes_heh() {
        assert_eq!(normalize_fa("مدرس\u{0629}"), "مدرس\u{0647}");
    }

    #[test]
    fn test_tatweel_is_removed() {
        assert_eq!(normalize_fa("سل\u{0640}\u{0640}\u{0640}ام"), "سلام");
    }

    #[test]
    fn test_harakat_are_removed() {
        assert_eq!(normalize_fa("س\u{064E}لام\u{064B}"), "سلام");
    }

    #[test]
    fn test_arabic_digits_become_persian_digits() {
        assert_eq!(normalize_fa("٠١٢٣٤٥٦٧٨٩"), "۰۱۲۳۴۵۶۷۸۹");
    }

    #[test]
    fn test_whitespace_is_collapsed_and_trimmed() {
        assert_eq!(normalize_fa("  سلام \t\n دنیا  "), "سلام دنیا");
    }

    #[test]
    fn test_persian_text_passes_through() {
        assert_eq!(normalize_fa("سلام دنیا"), "سلام دنیا");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_fa(""), "");
    }

    #[test]
    fn test_transcription_segments_are_normalized_too() {
        let mut transcription = Transcription {
            text: "\u{064A}\u{0643} دو".to_string(),
            segments: vec![
                Segment {
                    start: 0.0,
                    end: 1.0,
                    text: "\u{064A}\u{0643}".to_string(),
                },
                Segment {
                    start: 1.0,
                    end: 2.0,
                    text: "دو".to_string(),
                },
            ],
            language: Some("fa".to_string()),
            duration: 2.0,
            processing_time: 0.1,
        };

        normalize_transcription(&mut transcription);

        assert_eq!(transcription.text, "\u{06CC}\u{06A9} دو");
        assert_eq!(transcription.segments[0].text, "\u{06CC}\u{06A9}");
        assert_eq!(transcription.segments[1].text, "دو");
    }
}
