//! Character classification used by the tokenizer and the character scope.

use crate::line_ending::LineEnding;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum CharCategory {
  Whitespace,
  Eol,
  Word,
  Punctuation,
  Unknown,
}

impl CharCategory {
  /// Rank used when a zero-width position touches two characters: word
  /// characters beat symbols, symbols beat whitespace, whitespace beats line
  /// breaks.
  #[inline]
  #[must_use]
  pub const fn preference(self) -> u8 {
    match self {
      Self::Word => 4,
      Self::Punctuation | Self::Unknown => 3,
      Self::Whitespace => 2,
      Self::Eol => 1,
    }
  }
}

pub fn categorize_char(ch: char) -> CharCategory {
  match ch {
    c if char_is_line_ending(c) => CharCategory::Eol,
    c if c.is_whitespace() => CharCategory::Whitespace,
    c if char_is_word(c) => CharCategory::Word,
    c if char_is_punctuation(c) => CharCategory::Punctuation,
    _ => CharCategory::Unknown,
  }
}

/// Categorizes a grapheme cluster by its first scalar value.
pub fn categorize_grapheme(grapheme: &str) -> CharCategory {
  if grapheme == "\r\n" {
    return CharCategory::Eol;
  }

  grapheme
    .chars()
    .next()
    .map_or(CharCategory::Unknown, categorize_char)
}

#[inline]
pub fn char_is_line_ending(ch: char) -> bool {
  LineEnding::from_char(ch).is_some()
}

#[inline]
pub fn char_is_whitespace(ch: char) -> bool {
  match ch {
    '\u{0009}' | // Character Tabulation
    '\u{0020}' | // Space
    '\u{00A0}' | // No-break Space
    '\u{180E}' | // Mongolian Vowel Separator
    '\u{202F}' | // Narrow No-break Space
    '\u{205F}' | // Medium Mathematical Space
    '\u{3000}' | // Ideographic Space
    '\u{FEFF}'   // Zero Width No-break Space
    => true,

    // En Quad through Zero Width Space.
    ch if ('\u{2000}'..='\u{200B}').contains(&ch) => true,

    _ => false,
  }
}

#[inline]
pub fn char_is_punctuation(ch: char) -> bool {
  use unicode_general_category::{
    GeneralCategory,
    get_general_category,
  };

  matches!(
    get_general_category(ch),
    GeneralCategory::OtherPunctuation
      | GeneralCategory::OpenPunctuation
      | GeneralCategory::ClosePunctuation
      | GeneralCategory::InitialPunctuation
      | GeneralCategory::FinalPunctuation
      | GeneralCategory::ConnectorPunctuation
      | GeneralCategory::DashPunctuation
      | GeneralCategory::MathSymbol
      | GeneralCategory::CurrencySymbol
      | GeneralCategory::ModifierSymbol
  )
}

#[inline]
pub fn char_is_word(ch: char) -> bool {
  ch.is_alphanumeric() || ch == '_'
}
