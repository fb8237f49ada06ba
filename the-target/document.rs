//! Read-only document snapshots.
//!
//! Resolution never edits text. A [`Document`] wraps a [`Rope`] taken at the
//! time the command was issued together with the language it is written in,
//! and converts between char offsets and [`Position`]s.
//!
//! # Example
//!
//! ```
//! use the_target::{
//!   document::{Document, DocumentId},
//!   position::Position,
//! };
//!
//! let doc = Document::from_str(DocumentId::new(1), "plaintext", "hello\nworld");
//! assert_eq!(doc.line_count(), 2);
//! assert_eq!(doc.position_at(7), Position::new(1, 1));
//! assert_eq!(doc.line_at(1).text, "world");
//! ```

use std::fmt;

use ropey::Rope;
use the_core::{
  chars::char_is_whitespace,
  line_ending::line_end_char_index,
};

use crate::{
  Tendril,
  position::{
    Position,
    Range,
  },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
  pub const fn new(id: u64) -> Self {
    Self(id)
  }

  pub const fn get(self) -> u64 {
    self.0
  }
}

impl fmt::Display for DocumentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "document#{}", self.0)
  }
}

/// One line of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
  pub line_number: usize,
  /// Line text without its line ending.
  pub text: String,
  pub range: Range,
  /// Extends to the start of the next line, or equals `range` on the last
  /// line.
  pub range_including_line_break: Range,
  pub first_non_whitespace_character_index: usize,
  pub is_empty_or_whitespace: bool,
}

impl Line {
  /// The range from the first to the last non-whitespace character.
  #[must_use]
  pub fn trimmed_range(&self) -> Range {
    let trailing = self
      .text
      .chars()
      .rev()
      .take_while(|&ch| char_is_whitespace(ch))
      .count();
    let end = self.text.chars().count() - trailing;
    let start = self.first_non_whitespace_character_index.min(end);
    Range::from_coords(self.line_number, start, self.line_number, end)
  }
}

#[derive(Debug, Clone)]
pub struct Document {
  id:          DocumentId,
  language_id: Tendril,
  text:        Rope,
}

impl Document {
  pub fn new(id: DocumentId, language_id: impl Into<Tendril>, text: Rope) -> Self {
    Self {
      id,
      language_id: language_id.into(),
      text,
    }
  }

  #[allow(clippy::should_implement_trait)]
  pub fn from_str(id: DocumentId, language_id: impl Into<Tendril>, text: &str) -> Self {
    Self::new(id, language_id, Rope::from_str(text))
  }

  #[inline]
  pub fn id(&self) -> DocumentId {
    self.id
  }

  #[inline]
  pub fn language_id(&self) -> &str {
    &self.language_id
  }

  #[inline]
  pub fn line_count(&self) -> usize {
    self.text.len_lines()
  }

  #[inline]
  pub fn len_chars(&self) -> usize {
    self.text.len_chars()
  }

  /// Char length of `line` without its line ending.
  pub fn line_len(&self, line: usize) -> usize {
    let line = line.min(self.line_count().saturating_sub(1));
    let slice = self.text.slice(..);
    line_end_char_index(&slice, line) - self.text.line_to_char(line)
  }

  /// The whole document.
  pub fn range(&self) -> Range {
    let last = self.line_count().saturating_sub(1);
    Range::from_coords(0, 0, last, self.line_len(last))
  }

  /// Clamps `position` into the document.
  pub fn clamp(&self, position: Position) -> Position {
    let last = self.line_count().saturating_sub(1);
    if position.line > last {
      return Position::new(last, self.line_len(last));
    }
    position.with_character(position.character.min(self.line_len(position.line)))
  }

  pub fn offset_at(&self, position: Position) -> usize {
    let position = self.clamp(position);
    self.text.line_to_char(position.line) + position.character
  }

  pub fn position_at(&self, offset: usize) -> Position {
    let offset = offset.min(self.len_chars());
    let line = self.text.char_to_line(offset);
    let character = offset - self.text.line_to_char(line);
    // An offset inside a CRLF pair clamps to the end of the line.
    Position::new(line, character.min(self.line_len(line)))
  }

  /// Text covered by `range`.
  pub fn text_in(&self, range: Range) -> String {
    let start = self.offset_at(range.start);
    let end = self.offset_at(range.end);
    self.text.slice(start..end).to_string()
  }

  /// The whole text.
  pub fn text(&self) -> String {
    self.text.to_string()
  }

  pub fn line_at(&self, line: usize) -> Line {
    let last = self.line_count().saturating_sub(1);
    let line_number = line.min(last);
    let len = self.line_len(line_number);
    let start = self.text.line_to_char(line_number);
    let text = self.text.slice(start..start + len).to_string();
    let range = Range::from_coords(line_number, 0, line_number, len);
    let range_including_line_break = if line_number < last {
      Range::from_coords(line_number, 0, line_number + 1, 0)
    } else {
      range
    };
    let first_non_whitespace_character_index = text
      .chars()
      .position(|ch| !char_is_whitespace(ch))
      .unwrap_or(len);

    Line {
      line_number,
      is_empty_or_whitespace: first_non_whitespace_character_index == len,
      text,
      range,
      range_including_line_break,
      first_non_whitespace_character_index,
    }
  }

  /// The char following `position`, if any.
  pub fn char_at(&self, position: Position) -> Option<char> {
    let offset = self.offset_at(position);
    self.text.get_char(offset)
  }
}
