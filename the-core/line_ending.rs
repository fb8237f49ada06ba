use ropey::RopeSlice;

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum LineEnding {
  /// CarriageReturn followed by LineFeed.
  Crlf,

  /// U+000A -- LineFeed
  LF,

  #[cfg(feature = "unicode-lines")]
  /// U+000B -- VerticalTab
  VT,

  #[cfg(feature = "unicode-lines")]
  /// U+000C -- FormFeed
  FF,

  #[cfg(feature = "unicode-lines")]
  /// U+000D -- CarriageReturn
  CR,

  #[cfg(feature = "unicode-lines")]
  /// U+0085 -- NextLine
  Nel,

  /// U+2028 -- Line Separator
  #[cfg(feature = "unicode-lines")]
  LS,

  /// U+2029 -- ParagraphSeparator
  #[cfg(feature = "unicode-lines")]
  PS,
}

impl LineEnding {
  #[inline]
  pub const fn len_chars(&self) -> usize {
    match self {
      Self::Crlf => 2,
      _ => 1,
    }
  }

  #[inline]
  pub const fn from_char(ch: char) -> Option<LineEnding> {
    match ch {
      '\u{000A}' => Some(LineEnding::LF),
      #[cfg(feature = "unicode-lines")]
      '\u{000B}' => Some(LineEnding::VT),
      #[cfg(feature = "unicode-lines")]
      '\u{000C}' => Some(LineEnding::FF),
      #[cfg(feature = "unicode-lines")]
      '\u{000D}' => Some(LineEnding::CR),
      #[cfg(feature = "unicode-lines")]
      '\u{0085}' => Some(LineEnding::Nel),
      #[cfg(feature = "unicode-lines")]
      '\u{2028}' => Some(LineEnding::LS),
      #[cfg(feature = "unicode-lines")]
      '\u{2029}' => Some(LineEnding::PS),
      _ => None,
    }
  }
}

/// Returns the line ending that terminates `line`, if any.
pub fn get_line_ending(line: &RopeSlice) -> Option<LineEnding> {
  let len = line.len_chars();
  if len >= 2 && line.char(len - 2) == '\r' && line.char(len - 1) == '\n' {
    return Some(LineEnding::Crlf);
  }

  len
    .checked_sub(1)
    .and_then(|last| LineEnding::from_char(line.char(last)))
}

/// Returns the char index of the end of the given line, not including its line
/// ending.
pub fn line_end_char_index(slice: &RopeSlice, line: usize) -> usize {
  let line_start = slice.line_to_char(line);
  let line_slice = slice.line(line);
  line_start + line_slice.len_chars()
    - get_line_ending(&line_slice).map_or(0, |ending| ending.len_chars())
}

#[cfg(test)]
mod test {
  use ropey::Rope;

  use super::*;

  #[test]
  fn line_ending_chars() {
    assert_eq!(LineEnding::from_char('\n'), Some(LineEnding::LF));
    #[cfg(feature = "unicode-lines")]
    assert_eq!(LineEnding::from_char('\u{2028}'), Some(LineEnding::LS));
    assert_eq!(LineEnding::from_char('x'), None);
    assert_eq!(LineEnding::Crlf.len_chars(), 2);
  }

  #[test]
  fn line_endings_of_rope_lines() {
    let rope = Rope::from_str("one\r\ntwo\nthree");
    assert_eq!(get_line_ending(&rope.line(0)), Some(LineEnding::Crlf));
    assert_eq!(get_line_ending(&rope.line(1)), Some(LineEnding::LF));
    assert_eq!(get_line_ending(&rope.line(2)), None);
  }

  #[test]
  fn line_end_excludes_line_ending() {
    let rope = Rope::from_str("one\r\ntwo\nthree");
    let slice = rope.slice(..);
    assert_eq!(line_end_char_index(&slice, 0), 3);
    assert_eq!(line_end_char_index(&slice, 1), 8);
    assert_eq!(line_end_char_index(&slice, 2), 14);
  }
}
