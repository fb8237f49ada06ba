//! Finding delimiter pairs around a selection.
//!
//! Pairs are found three ways, in order:
//!
//! 1. When the document has a parse tree and the selection sits inside a
//!    string or comment, the text of that fragment is scanned on its own.
//! 2. Otherwise the ancestors of the selection's node are searched for a node
//!    whose first and last children are a delimiter pair.
//! 3. Without a tree, or when the tree has no such node, the document text is
//!    scanned in a window around the selection that grows until a pair turns
//!    up or the configured maximum is reached.
//!
//! Symmetric delimiters such as quotes are sided by parity: a quote is a
//! closing quote when an unmatched quote of the same kind precedes it on its
//! line. Delimiters preceded by a backslash are ignored.
//!
//! ```
//! use std::sync::Arc;
//!
//! use the_target::{
//!   config::TargetConfig,
//!   context::ResolveContext,
//!   descriptor::SurroundingPairName,
//!   document::{Document, DocumentId},
//!   editor::{Editor, EditorId},
//!   pair::PairFinder,
//!   position::Range,
//! };
//!
//! let document = Arc::new(Document::from_str(DocumentId::new(1), "plaintext", "f(a, [b])"));
//! let editor = Arc::new(Editor::new(EditorId::new(1), document));
//! let cx = ResolveContext::new(TargetConfig::default()).unwrap();
//!
//! let finder = PairFinder::new(SurroundingPairName::Any, "plaintext");
//! let pair = finder.find(&cx, &editor, Range::from_coords(0, 2, 0, 2)).unwrap();
//! assert_eq!(pair.content(), Range::from_coords(0, 1, 0, 9));
//! ```

use std::{
  collections::HashMap,
  sync::Arc,
};

use smallvec::SmallVec;

use crate::{
  context::ResolveContext,
  descriptor::{
    SurroundingPairDirection,
    SurroundingPairName,
  },
  document::Document,
  editor::Editor,
  position::Range,
  syntax::{
    NodeId,
    SyntaxTree,
    languages,
  },
  target::Target,
};

/// One concrete opening/closing text pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiter {
  pub name:  SurroundingPairName,
  pub open:  &'static str,
  pub close: &'static str,
}

impl Delimiter {
  const fn new(name: SurroundingPairName, open: &'static str, close: &'static str) -> Self {
    Self { name, open, close }
  }

  #[inline]
  pub fn is_symmetric(&self) -> bool {
    self.open == self.close
  }

  /// Quotes other than backticks and triple quotes never span lines.
  pub fn is_single_line(&self) -> bool {
    matches!(
      self.name,
      SurroundingPairName::DoubleQuotes
        | SurroundingPairName::SingleQuotes
        | SurroundingPairName::EscapedDoubleQuotes
        | SurroundingPairName::EscapedSingleQuotes
    )
  }

  fn len(&self) -> usize {
    self.open.chars().count().max(self.close.chars().count())
  }
}

const DELIMITERS: &[Delimiter] = &[
  Delimiter::new(SurroundingPairName::AngleBrackets, "<", ">"),
  Delimiter::new(SurroundingPairName::BacktickQuotes, "`", "`"),
  Delimiter::new(SurroundingPairName::CurlyBrackets, "{", "}"),
  Delimiter::new(SurroundingPairName::DoubleQuotes, "\"", "\""),
  Delimiter::new(SurroundingPairName::EscapedDoubleQuotes, "\\\"", "\\\""),
  Delimiter::new(SurroundingPairName::EscapedParentheses, "\\(", "\\)"),
  Delimiter::new(SurroundingPairName::EscapedSingleQuotes, "\\'", "\\'"),
  Delimiter::new(SurroundingPairName::EscapedSquareBrackets, "\\[", "\\]"),
  Delimiter::new(SurroundingPairName::Parentheses, "(", ")"),
  Delimiter::new(SurroundingPairName::SingleQuotes, "'", "'"),
  Delimiter::new(SurroundingPairName::SquareBrackets, "[", "]"),
  Delimiter::new(SurroundingPairName::TripleDoubleQuotes, "\"\"\"", "\"\"\""),
  Delimiter::new(SurroundingPairName::TripleSingleQuotes, "'''", "'''"),
];

/// The concrete delimiters `name` stands for in `language_id`, longest
/// first. Triple quotes only exist in python.
pub fn delimiters(name: SurroundingPairName, language_id: &str) -> Vec<Delimiter> {
  use SurroundingPairName as Name;

  let names: &[Name] = match name {
    Name::Any => &[Name::Parentheses, Name::SquareBrackets, Name::CurlyBrackets, Name::AngleBrackets],
    Name::String => {
      &[
        Name::TripleDoubleQuotes,
        Name::TripleSingleQuotes,
        Name::DoubleQuotes,
        Name::SingleQuotes,
        Name::BacktickQuotes,
      ]
    },
    Name::CollectionBoundary => &[Name::Parentheses, Name::SquareBrackets, Name::CurlyBrackets],
    _ => std::slice::from_ref(&name),
  };

  let mut delimiters: Vec<Delimiter> = DELIMITERS
    .iter()
    .filter(|delimiter| names.contains(&delimiter.name))
    .filter(|delimiter| {
      language_id == "python"
        || !matches!(delimiter.name, Name::TripleDoubleQuotes | Name::TripleSingleQuotes)
    })
    .copied()
    .collect();
  delimiters.sort_by_key(|delimiter| std::cmp::Reverse(delimiter.len()));
  delimiters
}

/// A matched pair of delimiter occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairMatch {
  pub open:  Range,
  pub close: Range,
}

impl PairMatch {
  /// From the start of the opening delimiter to the end of the closing one.
  #[inline]
  pub fn content(&self) -> Range {
    Range::new(self.open.start, self.close.end)
  }

  #[inline]
  pub fn interior(&self) -> Range {
    Range::new(self.open.end, self.close.start)
  }

  fn contains(&self, range: Range, strong: bool) -> bool {
    if strong {
      self.interior().contains_range(&range)
    } else {
      self.content().contains_range(&range)
    }
  }

  pub fn target(&self, editor: Arc<Editor>, is_reversed: bool) -> Target {
    Target::surrounding_pair(
      editor,
      self.content(),
      self.interior(),
      [self.open, self.close],
      is_reversed,
    )
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
  Left,
  Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Occurrence {
  /// Char offsets into the scanned text.
  start:     usize,
  end:       usize,
  delimiter: usize,
  side:      Side,
}

/// Searches for pairs of one delimiter set.
#[derive(Debug, Clone)]
pub struct PairFinder {
  delimiters:                 Vec<Delimiter>,
  force_direction:            Option<SurroundingPairDirection>,
  require_strong_containment: bool,
}

impl PairFinder {
  pub fn new(name: SurroundingPairName, language_id: &str) -> Self {
    Self {
      delimiters:                 delimiters(name, language_id),
      force_direction:            None,
      require_strong_containment: false,
    }
  }

  #[must_use]
  pub fn with_force_direction(mut self, force_direction: Option<SurroundingPairDirection>) -> Self {
    self.force_direction = force_direction;
    self
  }

  /// Only accept pairs whose interior contains the selection.
  #[must_use]
  pub fn with_strong_containment(mut self, strong: bool) -> Self {
    self.require_strong_containment = strong;
    self
  }

  /// The innermost pair around `range`.
  pub fn find(&self, cx: &ResolveContext, editor: &Editor, range: Range) -> Option<PairMatch> {
    let document = editor.document();

    if let Some(tree) = cx.syntax_tree(editor) {
      let node = tree.node_at(range);
      let language = languages::language(document.language_id());
      if let Some(fragment) = language.text_fragment(&tree, node)
        && fragment.contains_range(&range)
        && let Some(pair) = self.find_in_window(document, fragment, range)
      {
        return Some(pair);
      }
      if let Some(pair) = self.find_in_tree(&tree, node, range) {
        return Some(pair);
      }
      tracing::debug!(?range, "no delimiter node, scanning text");
    }

    self.find_in_text(cx, document, range)
  }

  /// Every pair in the document, ordered by opening position.
  pub fn find_all(&self, document: &Document) -> Vec<PairMatch> {
    let window = document.range();
    let text = document.text_in(window);
    let mut pairs = self.pairs(&text, None);
    pairs.sort_by_key(|(open, _)| open.start);

    let base = document.offset_at(window.start);
    pairs
      .into_iter()
      .map(|(open, close)| to_match(document, base, open, close))
      .collect()
  }

  fn find_in_tree(&self, tree: &SyntaxTree, node: NodeId, range: Range) -> Option<PairMatch> {
    tree.ancestors(node).find_map(|ancestor| {
      let [first, .., last] = tree.children(ancestor) else {
        return None;
      };
      let (open, close) = (tree.kind(*first), tree.kind(*last));
      self
        .delimiters
        .iter()
        .any(|delimiter| delimiter.open == open && delimiter.close == close)
        .then(|| {
          PairMatch {
            open:  tree.range(*first),
            close: tree.range(*last),
          }
        })
        .filter(|pair| pair.contains(range, self.require_strong_containment))
    })
  }

  fn find_in_text(&self, cx: &ResolveContext, document: &Document, range: Range) -> Option<PairMatch> {
    let config = &cx.config().surrounding_pair;
    let total = document.len_chars();
    let selection_start = document.offset_at(range.start);
    let selection_end = document.offset_at(range.end);
    let mut length = config.initial_scan_length.max(1);

    loop {
      let start = selection_start.saturating_sub(length);
      let end = (selection_end + length).min(total);
      let window = Range::new(document.position_at(start), document.position_at(end));

      let truncated = start > 0 || end < total;
      let found = self.find_in_window(document, window, range).filter(|pair| {
        // A pair ending on a truncated edge may have been cut short.
        !(start > 0 && document.offset_at(pair.open.start) == start)
          && !(end < total && document.offset_at(pair.close.end) == end)
      });

      if found.is_some() || !truncated || length >= config.max_scan_length {
        return found;
      }
      length = (length * config.scan_expansion_factor.max(2)).min(config.max_scan_length);
    }
  }

  fn find_in_window(&self, document: &Document, window: Range, range: Range) -> Option<PairMatch> {
    let text = document.text_in(window);
    let base = document.offset_at(window.start);
    let selection = (
      document.offset_at(range.start) - base,
      document.offset_at(range.end) - base,
    );

    self
      .pairs(&text, Some(selection))
      .into_iter()
      .filter(|(open, close)| {
        if self.require_strong_containment {
          open.end <= selection.0 && close.start >= selection.1
        } else {
          open.start <= selection.0 && close.end >= selection.1
        }
      })
      .max_by_key(|(open, close)| (open.start, std::cmp::Reverse(close.end)))
      .map(|(open, close)| to_match(document, base, open, close))
  }

  /// Matched occurrence pairs in `text`. `selection` is needed when the
  /// direction of symmetric delimiters is forced.
  fn pairs(&self, text: &str, selection: Option<(usize, usize)>) -> Vec<(Occurrence, Occurrence)> {
    let occurrences = self.occurrences(text);
    let mut pairs = Vec::new();

    match (self.force_direction, selection) {
      (Some(direction), Some(selection)) => {
        for (index, delimiter) in self.delimiters.iter().enumerate() {
          let same: Vec<Occurrence> = occurrences
            .iter()
            .filter(|occurrence| occurrence.delimiter == index)
            .copied()
            .collect();
          if delimiter.is_symmetric() {
            pairs.extend(forced_pair(&same, direction, selection));
          } else {
            pairs.extend(stack_pairs(&same));
          }
        }
      },
      _ => pairs.extend(stack_pairs(&occurrences)),
    }

    pairs
  }

  fn occurrences(&self, text: &str) -> Vec<Occurrence> {
    let chars: Vec<char> = text.chars().collect();
    let mut occurrences = Vec::new();
    // Unmatched symmetric openings on the current line, per delimiter.
    let mut open_quotes: SmallVec<[bool; 8]> = SmallVec::from_elem(false, self.delimiters.len());
    let mut i = 0;

    while i < chars.len() {
      if chars[i] == '\n' {
        for (index, delimiter) in self.delimiters.iter().enumerate() {
          if delimiter.is_single_line() {
            open_quotes[index] = false;
          }
        }
        i += 1;
        continue;
      }

      let escaped = i > 0 && chars[i - 1] == '\\';
      let found = self.delimiters.iter().enumerate().find_map(|(index, delimiter)| {
        if escaped {
          None
        } else if starts_with(&chars[i..], delimiter.open) {
          Some((index, delimiter.open, Side::Left))
        } else if starts_with(&chars[i..], delimiter.close) {
          Some((index, delimiter.close, Side::Right))
        } else {
          None
        }
      });

      let Some((index, text, side)) = found else {
        i += 1;
        continue;
      };

      let side = if self.delimiters[index].is_symmetric() {
        let side = if open_quotes[index] { Side::Right } else { Side::Left };
        open_quotes[index] = side == Side::Left;
        side
      } else {
        side
      };

      let len = text.chars().count();
      occurrences.push(Occurrence {
        start: i,
        end: i + len,
        delimiter: index,
        side,
      });
      i += len;
    }

    occurrences
  }
}

fn starts_with(chars: &[char], text: &str) -> bool {
  let mut count = 0;
  for (expected, actual) in text.chars().zip(chars) {
    if expected != *actual {
      return false;
    }
    count += 1;
  }
  count == text.chars().count()
}

/// Pairs each closing occurrence with the nearest unmatched opening of the
/// same delimiter.
fn stack_pairs(occurrences: &[Occurrence]) -> Vec<(Occurrence, Occurrence)> {
  let mut stacks: HashMap<usize, Vec<Occurrence>> = HashMap::new();
  let mut pairs = Vec::new();

  for occurrence in occurrences {
    let stack = stacks.entry(occurrence.delimiter).or_default();
    match occurrence.side {
      Side::Left => stack.push(*occurrence),
      Side::Right => {
        if let Some(open) = stack.pop() {
          pairs.push((open, *occurrence));
        }
      },
    }
  }

  pairs
}

/// With a forced direction the quote nearest the selection on that side
/// opens or closes the pair, whatever its parity.
fn forced_pair(
  same: &[Occurrence],
  direction: SurroundingPairDirection,
  selection: (usize, usize),
) -> Option<(Occurrence, Occurrence)> {
  match direction {
    SurroundingPairDirection::Left => {
      let index = same.iter().rposition(|occurrence| occurrence.start <= selection.0)?;
      let open = same[index];
      let close = same[index + 1..]
        .iter()
        .find(|occurrence| occurrence.end >= selection.1)?;
      Some((open, *close))
    },
    SurroundingPairDirection::Right => {
      let index = same.iter().position(|occurrence| occurrence.end >= selection.1)?;
      let close = same[index];
      let open = same[..index]
        .iter()
        .rev()
        .find(|occurrence| occurrence.start <= selection.0)?;
      Some((*open, close))
    },
  }
}

fn to_match(document: &Document, base: usize, open: Occurrence, close: Occurrence) -> PairMatch {
  let range = |occurrence: Occurrence| {
    Range::new(
      document.position_at(base + occurrence.start),
      document.position_at(base + occurrence.end),
    )
  };
  PairMatch {
    open:  range(open),
    close: range(close),
  }
}
