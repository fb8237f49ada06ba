//! Grapheme cluster helpers for token text.
//!
//! Character offsets everywhere in the target crates count `char`s, so the
//! helpers here translate grapheme boundaries into char offsets instead of
//! byte offsets.
//!
//! # Example
//!
//! ```
//! use the_core::grapheme::graphemes;
//!
//! let pieces: Vec<_> = graphemes("n\u{0303}a").collect();
//! assert_eq!(pieces, vec![(0, "n\u{0303}"), (2, "a")]);
//! ```

use unicode_segmentation::UnicodeSegmentation;

/// Iterates the extended grapheme clusters of `text` together with the char
/// offset each one starts at.
pub fn graphemes(text: &str) -> impl Iterator<Item = (usize, &str)> + '_ {
  let mut char_offset = 0;
  text.graphemes(true).map(move |grapheme| {
    let start = char_offset;
    char_offset += grapheme.chars().count();
    (start, grapheme)
  })
}

/// Char ranges `(start, end)` of every grapheme in `text`.
pub fn grapheme_char_ranges(text: &str) -> Vec<(usize, usize)> {
  graphemes(text)
    .map(|(start, grapheme)| (start, start + grapheme.chars().count()))
    .collect()
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn graphemes_report_char_offsets() {
    let pieces: Vec<_> = graphemes("a\u{0301}b😀c").collect();
    assert_eq!(pieces, vec![(0, "a\u{0301}"), (2, "b"), (3, "😀"), (4, "c")]);
    assert_eq!(grapheme_char_ranges("ab"), vec![(0, 1), (1, 2)]);
    assert_eq!(grapheme_char_ranges("x\r\ny"), vec![(0, 1), (1, 3), (3, 4)]);
    assert!(grapheme_char_ranges("").is_empty());
  }

  quickcheck::quickcheck! {
    fn grapheme_ranges_tile_the_text(text: String) -> bool {
      let ranges = grapheme_char_ranges(&text);
      let mut expected_start = 0;
      for (start, end) in &ranges {
        if *start != expected_start || end <= start {
          return false;
        }
        expected_start = *end;
      }
      expected_start == text.chars().count()
    }
  }
}
