//! Text preparation: joining OCR spans and folding confusable characters.

use crate::constants::{MAX_MATCH_TEXT_CHARS, truncate_chars};

/// Raw and confusable-folded views of the recognized text, both length-capped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedText {
    pub raw: String,
    pub normalized: String,
}

impl PreparedText {
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = texts
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let raw = truncate_chars(&joined, MAX_MATCH_TEXT_CHARS);
        let normalized = fold_confusables(&raw);
        Self { raw, normalized }
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// Maps look-alike letters to the digit they imitate (`O/o → 0`, `I/l/| → 1`) and full-width
/// digits to ASCII, so obfuscated contact numbers match the numeric patterns.
pub fn fold_confusables(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

#[inline]
fn fold_char(c: char) -> char {
    match c {
        'O' | 'o' | '〇' | 'Ｏ' | 'ｏ' | '○' => '0',
        'I' | 'l' | '|' | 'Ｉ' | 'ｌ' | '丨' => '1',
        '０'..='９' => {
            let offset = c as u32 - '０' as u32;
            char::from_digit(offset, 10).unwrap_or(c)
        }
        _ => c,
    }
}
