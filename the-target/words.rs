//! Splitting identifiers into their component words.
//!
//! `camelCase`, `PascalCase`, `snake_case`, `SCREAMING_CASE` and digit runs
//! all split the way a reader would say them; anything that is not a letter or
//! a digit separates words.
//!
//! ```
//! use the_target::words::WordSplitter;
//!
//! let splitter = WordSplitter::new();
//! assert_eq!(splitter.words("parseHTMLDocument2"), ["parse", "HTML", "Document", "2"]);
//! ```

use std::sync::OnceLock;

use regex::Regex;

const WORD: &str = r"\p{Lu}+[\p{Ll}\p{Lo}\p{Lm}\p{M}]*|[\p{Ll}\p{Lo}\p{Lm}\p{M}]+|\p{N}+";
static WORD_REGEX: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Clone, Copy, Default)]
pub struct WordSplitter;

impl WordSplitter {
  pub const fn new() -> Self {
    Self
  }

  /// Char ranges `(start, end)` of each word in `text`.
  pub fn word_ranges(&self, text: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();

    let regex = WORD_REGEX.get_or_init(|| Regex::new(WORD).unwrap());

    for found in regex.find_iter(text) {
      let start = text[..found.start()].chars().count();
      let word = found.as_str();
      let upper = word
        .chars()
        .take_while(|ch| ch.is_uppercase())
        .count();
      let len = word.chars().count();

      // "HTMLParser": the last capital starts the next word.
      if upper > 1 && upper < len {
        ranges.push((start, start + upper - 1));
        ranges.push((start + upper - 1, start + len));
      } else {
        ranges.push((start, start + len));
      }
    }

    ranges
  }

  pub fn words<'a>(&self, text: &'a str) -> Vec<&'a str> {
    let offsets: Vec<usize> = text
      .char_indices()
      .map(|(byte, _)| byte)
      .chain(std::iter::once(text.len()))
      .collect();
    self
      .word_ranges(text)
      .into_iter()
      .map(|(start, end)| &text[offsets[start]..offsets[end]])
      .collect()
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn splits_common_conventions() {
    let splitter = WordSplitter::new();
    assert_eq!(splitter.words("myVariableName"), ["my", "Variable", "Name"]);
    assert_eq!(splitter.words("MyVariable"), ["My", "Variable"]);
    assert_eq!(splitter.words("my_variable"), ["my", "variable"]);
    assert_eq!(splitter.words("MY_VARIABLE"), ["MY", "VARIABLE"]);
    assert_eq!(splitter.words("kebab-case-2"), ["kebab", "case", "2"]);
    assert_eq!(splitter.words("HTMLParser"), ["HTML", "Parser"]);
    assert_eq!(splitter.words("ABC"), ["ABC"]);
    assert_eq!(splitter.words("__"), Vec::<&str>::new());
  }

  #[test]
  fn ranges_count_chars() {
    let splitter = WordSplitter::new();
    assert_eq!(splitter.word_ranges("ñandúLargo"), [(0, 5), (5, 10)]);
  }

  quickcheck::quickcheck! {
    fn ranges_are_disjoint_and_ordered(text: String) -> bool {
      let len = text.chars().count();
      let mut last_end = 0;
      WordSplitter::new().word_ranges(&text).into_iter().all(|(start, end)| {
        let ok = last_end <= start && start < end && end <= len;
        last_end = end;
        ok
      })
    }
  }
}
