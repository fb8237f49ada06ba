//! Comma separated items inside a collection, found from the text alone.
//!
//! The collection is the interior of the innermost bracket pair around the
//! selection, or the selection's line when there is none. Its text is cut at
//! brackets, quotes and commas, bracketed runs are glued back together, and
//! what is left between top-level commas is an item.
//!
//! ```
//! use the_target::items::{ItemTokenKind, lex};
//!
//! let kinds: Vec<_> = lex("foo(a, b), bar").into_iter().map(|token| token.kind).collect();
//! assert_eq!(kinds, [ItemTokenKind::Item, ItemTokenKind::Separator, ItemTokenKind::Item]);
//! ```

use std::sync::OnceLock;

use regex::Regex;
use the_core::chars::char_is_whitespace;

use crate::{
  context::ResolveContext,
  descriptor::SurroundingPairName,
  document::{
    Document,
    Line,
  },
  editor::Editor,
  pair::{
    PairFinder,
    PairMatch,
  },
  position::{
    Position,
    Range,
  },
};

const LEXEME: &str = r#"[,(){}<>\[\]"'`]|\\"|\\'|\\`"#;
const SEPARATOR: &str = ",";
static LEXEME_REGEX: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemTokenKind {
  Item,
  Separator,
  Boundary,
}

/// A lexed item or separator. Offsets count chars from the start of the
/// lexed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemToken {
  pub kind:  ItemTokenKind,
  pub start: usize,
  pub end:   usize,
}

fn closing(lexeme: &str) -> Option<&'static str> {
  match lexeme {
    "(" => Some(")"),
    "{" => Some("}"),
    "<" => Some(">"),
    "[" => Some("]"),
    "\"" => Some("\""),
    "'" => Some("'"),
    "`" => Some("`"),
    _ => None,
  }
}

/// Byte spans of the delimiters in `text` and of the text between them.
fn lexemes(text: &str) -> Vec<(usize, usize)> {
  let regex = LEXEME_REGEX.get_or_init(|| Regex::new(LEXEME).unwrap());
  let mut lexemes = Vec::new();
  let mut last = 0;

  for found in regex.find_iter(text) {
    if found.start() > last {
      lexemes.push((last, found.start()));
    }
    lexemes.push((found.start(), found.end()));
    last = found.end();
  }
  if last < text.len() {
    lexemes.push((last, text.len()));
  }

  lexemes
}

/// Glues lexemes into alternating items and separators. Separators nested
/// in a bracket or quote pair are part of the item around them; an opening
/// delimiter without a later closing one is plain text.
fn join_skipping_pairs(text: &str, lexemes: &[(usize, usize)]) -> Vec<(usize, usize)> {
  let mut joined = Vec::new();
  let mut balance = 0usize;
  let mut pair: Option<(&str, &str)> = None;
  let mut first: Option<usize> = None;

  for (index, &(start, end)) in lexemes.iter().enumerate() {
    let lexeme = &text[start..end];

    if balance > 0 {
      match pair {
        Some((_, close)) if lexeme == close => balance -= 1,
        Some((open, _)) if lexeme == open => balance += 1,
        _ => (),
      }
    } else if let Some(close) = closing(lexeme)
      && lexemes[index + 1..]
        .iter()
        .any(|&(start, end)| &text[start..end] == close)
    {
      pair = Some((lexeme, close));
      balance = 1;
      first.get_or_insert(index);
    } else if first.is_none() {
      first = Some(index);
    }

    let is_separator = lexeme == SEPARATOR && balance == 0;
    if is_separator || index + 1 == lexemes.len() {
      let end_index = if is_separator { index } else { index + 1 };
      if let Some(first) = first.take()
        && first < end_index
      {
        joined.push((lexemes[first].0, lexemes[end_index - 1].1));
      }
      if is_separator {
        joined.push((start, end));
      }
    }
  }

  joined
}

/// Items and separators of `text`, items trimmed of surrounding whitespace.
pub fn lex(text: &str) -> Vec<ItemToken> {
  let chars_before = |byte: usize| text[..byte].chars().count();

  join_skipping_pairs(text, &lexemes(text))
    .into_iter()
    .filter_map(|(start, end)| {
      let lexeme = &text[start..end];
      let trimmed = lexeme.trim();
      if trimmed.is_empty() {
        return None;
      }
      if lexeme == SEPARATOR {
        return Some(ItemToken {
          kind:  ItemTokenKind::Separator,
          start: chars_before(start),
          end:   chars_before(end),
        });
      }
      let leading = lexeme.len() - lexeme.trim_start().len();
      let start = chars_before(start + leading);
      Some(ItemToken {
        kind: ItemTokenKind::Item,
        start,
        end: start + trimmed.chars().count(),
      })
    })
    .collect()
}

/// One item with the ranges around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemInfo {
  pub content:  Range,
  /// From the end of the preceding separator or boundary to the start of
  /// the following one.
  pub domain:   Range,
  pub leading:  Option<Range>,
  pub trailing: Option<Range>,
}

/// The text an item search runs over: a pair interior with its delimiters,
/// or a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collection {
  pub range:    Range,
  pub boundary: Option<[Range; 2]>,
}

/// The items of `collection`.
pub fn items(document: &Document, collection: Collection) -> Vec<ItemInfo> {
  let base = document.offset_at(collection.range.start);
  let at = |offset: usize| document.position_at(base + offset);

  let mut tokens: Vec<(ItemTokenKind, Range)> = Vec::new();
  if let Some([open, _]) = collection.boundary {
    tokens.push((ItemTokenKind::Boundary, open));
  }
  tokens.extend(
    lex(&document.text_in(collection.range))
      .into_iter()
      .map(|token| (token.kind, Range::new(at(token.start), at(token.end)))),
  );
  if let Some([_, close]) = collection.boundary {
    tokens.push((ItemTokenKind::Boundary, close));
  }

  let kind_at = |index: Option<usize>| index.and_then(|index| tokens.get(index)).map(|(kind, _)| *kind);
  let range_at = |index: usize| tokens[index].1;

  tokens
    .iter()
    .enumerate()
    .filter(|(_, (kind, _))| *kind == ItemTokenKind::Item)
    .map(|(i, &(_, content))| {
      let before = |n: usize| i.checked_sub(n);
      let after = |n: usize| Some(i + n);

      let leading = match (kind_at(before(2)), kind_at(before(1))) {
        (Some(ItemTokenKind::Item), _) => Some(Range::new(range_at(i - 2).end, content.start)),
        (_, Some(ItemTokenKind::Separator)) => Some(Range::new(range_at(i - 1).start, content.start)),
        _ => None,
      };
      let trailing = match (kind_at(after(2)), kind_at(after(1))) {
        (Some(ItemTokenKind::Item), _) => Some(Range::new(content.end, range_at(i + 2).start)),
        (_, Some(ItemTokenKind::Separator)) => Some(Range::new(content.end, range_at(i + 1).end)),
        _ => None,
      };

      let domain_start = match kind_at(before(1)) {
        Some(ItemTokenKind::Boundary | ItemTokenKind::Separator) => range_at(i - 1).end,
        _ => content.start,
      };
      let domain_end = match kind_at(after(1)) {
        Some(ItemTokenKind::Boundary | ItemTokenKind::Separator) => range_at(i + 1).start,
        _ => content.end,
      };

      ItemInfo {
        content,
        domain: Range::new(domain_start, domain_end),
        leading,
        trailing,
      }
    })
    .collect()
}

/// The collection around `range`: the innermost bracket pair whose interior
/// is a sensible place to look for items, else the trimmed lines of `range`.
pub fn collection(cx: &ResolveContext, editor: &Editor, range: Range) -> Collection {
  let document = editor.document();
  let finder = PairFinder::new(SurroundingPairName::CollectionBoundary, document.language_id())
    .with_strong_containment(true);
  let mut pair = finder.find(cx, editor, range);

  while let Some(found) = pair {
    if use_interior(cx, editor, range, &found) {
      return Collection {
        range:    found.interior(),
        boundary: Some([found.open, found.close]),
      };
    }

    let offset = document.offset_at(found.open.start);
    pair = offset
      .checked_sub(1)
      .and_then(|offset| finder.find(cx, editor, Range::point(document.position_at(offset))));
  }

  let first = document.line_at(range.start.line);
  let last = document.line_at(range.end.line);
  Collection {
    range:    Range::new(
      Position::new(first.line_number, first.first_non_whitespace_character_index),
      last.trimmed_range().end,
    ),
    boundary: None,
  }
}

fn use_interior(cx: &ResolveContext, editor: &Editor, range: Range, pair: &PairMatch) -> bool {
  let document = editor.document();
  let (open, close) = (pair.open, pair.close);

  if range.is_empty() {
    let position = range.start;
    if position == open.start || position == close.end {
      return false;
    }
    let line = document.line_at(position.line);
    if position == open.end && is_whitespace_or_missing(&line, Some(position.character)) {
      return false;
    }
    if position == close.start && is_whitespace_or_missing(&line, position.character.checked_sub(1)) {
      return false;
    }
  } else if range == pair.content() || range == open || range == close {
    return false;
  }

  // Items are not searched for inside strings.
  let string = PairFinder::new(SurroundingPairName::String, document.language_id())
    .with_strong_containment(true)
    .find(cx, editor, pair.content());
  !string.is_some_and(|string| open.start <= string.open.start)
}

fn is_whitespace_or_missing(line: &Line, index: Option<usize>) -> bool {
  index
    .and_then(|index| line.text.chars().nth(index))
    .is_none_or(|ch| char_is_whitespace(ch) || ch == '\n' || ch == '\r')
}

/// The text to insert between items next to one with these delimiters.
pub fn insertion_delimiter(document: &Document, leading: Option<Range>, trailing: Option<Range>) -> String {
  [leading, trailing]
    .into_iter()
    .flatten()
    .map(|range| document.text_in(range))
    .max_by_key(String::len)
    .unwrap_or_else(|| String::from(", "))
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    config::TargetConfig,
    target::test::editor,
  };

  fn texts(text: &str) -> Vec<&str> {
    lex(text)
      .into_iter()
      .map(|token| {
        let start = text.char_indices().nth(token.start).map_or(text.len(), |(byte, _)| byte);
        let end = text.char_indices().nth(token.end).map_or(text.len(), |(byte, _)| byte);
        &text[start..end]
      })
      .collect()
  }

  #[test]
  fn nested_pairs_stay_in_one_item() {
    assert_eq!(texts("foo(hello), bar, whatever"), [
      "foo(hello)",
      ",",
      "bar",
      ",",
      "whatever"
    ]);
    assert_eq!(texts(r#"a, "b, c", [d, e]"#), ["a", ",", r#""b, c""#, ",", "[d, e]"]);
    // An unmatched opening bracket does not swallow the rest.
    assert_eq!(texts("a < b, c"), ["a < b", ",", "c"]);
    assert_eq!(texts(" , "), [","]);
  }

  #[test]
  fn delimiters_cover_separator_and_space() {
    let editor = editor("foo(hello), bar, whatever");
    let document = editor.document();
    let infos = items(document, Collection {
      range:    document.range(),
      boundary: None,
    });
    assert_eq!(infos.len(), 3);

    let bar = infos[1];
    assert_eq!(bar.content, Range::from_coords(0, 12, 0, 15));
    assert_eq!(bar.leading, Some(Range::from_coords(0, 10, 0, 12)));
    assert_eq!(bar.trailing, Some(Range::from_coords(0, 15, 0, 17)));
    assert_eq!(bar.domain, Range::from_coords(0, 11, 0, 15));

    let first = infos[0];
    assert_eq!(first.leading, None);
    assert_eq!(first.domain, Range::from_coords(0, 0, 0, 10));
    assert_eq!(insertion_delimiter(document, first.leading, first.trailing), ", ");
  }

  #[test]
  fn collection_is_the_surrounding_brackets() {
    let cx = ResolveContext::new(TargetConfig::default()).unwrap();
    let editor = editor("call(a, [b, c])");

    let outer = collection(&cx, &editor, Range::from_coords(0, 6, 0, 6));
    assert_eq!(outer.range, Range::from_coords(0, 5, 0, 14));

    let inner = collection(&cx, &editor, Range::from_coords(0, 10, 0, 10));
    assert_eq!(inner.range, Range::from_coords(0, 9, 0, 13));
    assert_eq!(
      inner.boundary,
      Some([Range::from_coords(0, 8, 0, 9), Range::from_coords(0, 13, 0, 14)])
    );

    // Just outside the brackets the enclosing call is the collection.
    let beside = collection(&cx, &editor, Range::from_coords(0, 8, 0, 8));
    assert_eq!(beside.range, Range::from_coords(0, 5, 0, 14));
  }

  #[test]
  fn falls_back_to_the_line() {
    let cx = ResolveContext::new(TargetConfig::default()).unwrap();
    let editor = editor("  a, b  ");
    let found = collection(&cx, &editor, Range::from_coords(0, 3, 0, 3));
    assert_eq!(found.range, Range::from_coords(0, 2, 0, 6));
    assert_eq!(found.boundary, None);
  }
}
