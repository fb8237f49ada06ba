//! The resolved unit of output.
//!
//! A [`Target`] is a content range plus everything an action needs to edit
//! around it without re-deriving structure: the delimiter to use when
//! inserting a sibling, the range to delete on removal, the leading and
//! trailing delimiter ranges, and for pairs the interior and boundary.
//!
//! Targets are immutable. Stages build new targets, and a target that was
//! inferred from another keeps a [`TargetId`] pointing back at it through the
//! [`TargetArena`] of the current resolution.
//!
//! Kind-specific behavior lives in the constructors ([`Target::token`],
//! [`Target::line`], ...) and in [`merge`].

use std::{
  fmt,
  sync::Arc,
};

use bitflags::bitflags;
use the_core::chars::char_is_whitespace;

use crate::{
  Tendril,
  descriptor::ScopeType,
  document::Document,
  editor::Editor,
  position::{
    Position,
    Range,
  },
  selection::Selection,
};

mod arena;
pub mod merge;

pub use arena::{
  TargetArena,
  TargetId,
};

bitflags! {
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
  pub struct TargetFlags: u8 {
    /// Inferred from a bare selection and eligible for upgrade.
    const WEAK                = 1 << 0;
    const RAW                 = 1 << 1;
    const LINE                = 1 << 2;
    const NOTEBOOK_CELL       = 1 << 3;
    const EXPLICIT_RANGE      = 1 << 4;
    const EXPLICIT_SCOPE_TYPE = 1 << 5;
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertionSide {
  Before,
  After,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetKind {
  /// A selection with no type information.
  Untyped,
  Plain,
  Raw,
  Token,
  Line,
  Paragraph,
  Document,
  /// Produced by a syntactic or regex scope.
  Scope(ScopeType),
  SurroundingPair,
  Interior,
  CollectionItem,
  SubTokenWord,
  /// An empty insertion point next to another target.
  Position(InsertionSide),
}

#[derive(Clone)]
pub struct Target {
  editor:             Arc<Editor>,
  kind:               TargetKind,
  content_range:      Range,
  is_reversed:        bool,
  flags:              TargetFlags,
  delimiter:          Option<Tendril>,
  removal_range:      Range,
  leading_delimiter:  Option<Range>,
  trailing_delimiter: Option<Range>,
  interior:           Option<Range>,
  boundary:           Option<[Range; 2]>,
  that_target:        Option<TargetId>,
}

impl Target {
  fn bare(editor: Arc<Editor>, kind: TargetKind, content_range: Range, is_reversed: bool) -> Self {
    let flags = if kind == TargetKind::Untyped {
      TargetFlags::empty()
    } else {
      TargetFlags::EXPLICIT_SCOPE_TYPE
    };

    Self {
      editor,
      kind,
      content_range,
      is_reversed,
      flags,
      delimiter: None,
      removal_range: content_range,
      leading_delimiter: None,
      trailing_delimiter: None,
      interior: None,
      boundary: None,
      that_target: None,
    }
  }

  /// Fills in whitespace delimiters and token-style removal.
  fn with_whitespace_delimiters(mut self) -> Self {
    let document = self.editor.document.clone();
    self.leading_delimiter = whitespace_before(&document, self.content_range.start);
    self.trailing_delimiter = whitespace_after(&document, self.content_range.end);
    self.removal_range = token_removal_range(
      &document,
      self.content_range,
      self.leading_delimiter,
      self.trailing_delimiter,
    );
    self
  }

  /// A selection without type information. Inserts with a space and removes
  /// like a token.
  pub fn untyped(
    editor: Arc<Editor>,
    content_range: Range,
    is_reversed: bool,
    has_explicit_range: bool,
  ) -> Self {
    let mut target =
      Self::bare(editor, TargetKind::Untyped, content_range, is_reversed).with_whitespace_delimiters();
    target.delimiter = Some(Tendril::from(" "));
    target.flags.set(TargetFlags::EXPLICIT_RANGE, has_explicit_range);
    target
  }

  /// The weak target for a cursor selection.
  pub fn from_selection(editor: Arc<Editor>, selection: Selection) -> Self {
    let range = selection.range();
    let mut target = Self::untyped(editor, range, selection.is_reversed(), !range.is_empty());
    target.flags.insert(TargetFlags::WEAK);
    target
  }

  pub fn plain(editor: Arc<Editor>, content_range: Range, is_reversed: bool) -> Self {
    let mut target = Self::bare(editor, TargetKind::Plain, content_range, is_reversed);
    target.flags.insert(TargetFlags::EXPLICIT_RANGE);
    target
  }

  pub fn raw(editor: Arc<Editor>, content_range: Range, is_reversed: bool) -> Self {
    let mut target = Self::bare(editor, TargetKind::Raw, content_range, is_reversed);
    target.flags.insert(TargetFlags::RAW | TargetFlags::EXPLICIT_RANGE);
    target
  }

  pub fn token(editor: Arc<Editor>, content_range: Range, is_reversed: bool) -> Self {
    let mut target =
      Self::bare(editor, TargetKind::Token, content_range, is_reversed).with_whitespace_delimiters();
    target.delimiter = Some(Tendril::from(" "));
    target
  }

  /// Whole lines `content_range.start.line..=content_range.end.line`.
  pub fn line(editor: Arc<Editor>, content_range: Range, is_reversed: bool) -> Self {
    let document = editor.document.clone();
    let content_range = full_lines(&document, content_range.start.line, content_range.end.line);
    let mut target = Self::bare(editor, TargetKind::Line, content_range, is_reversed);
    target.flags.insert(TargetFlags::LINE);
    target.delimiter = Some(Tendril::from("\n"));
    target.leading_delimiter = (content_range.start.line > 0).then(|| {
      let previous = content_range.start.line - 1;
      Range::new(
        Position::new(previous, document.line_len(previous)),
        content_range.start,
      )
    });
    target.trailing_delimiter = (content_range.end.line + 1 < document.line_count())
      .then(|| Range::new(content_range.end, Position::new(content_range.end.line + 1, 0)));
    target.removal_range = line_removal_range(&document, content_range);
    target
  }

  /// A run of non-blank lines.
  pub fn paragraph(editor: Arc<Editor>, content_range: Range, is_reversed: bool) -> Self {
    let document = editor.document.clone();
    let mut target = Self::bare(editor, TargetKind::Paragraph, content_range, is_reversed);
    target.flags.insert(TargetFlags::LINE);
    target.delimiter = Some(Tendril::from("\n\n"));

    target.leading_delimiter = (0..content_range.start.line)
      .rev()
      .find(|&line| !document.line_at(line).is_empty_or_whitespace)
      .map(|line| Range::new(Position::new(line, document.line_len(line)), content_range.start))
      .filter(|range| range.start.line + 1 < content_range.start.line);
    target.trailing_delimiter = (content_range.end.line + 1..document.line_count())
      .find(|&line| !document.line_at(line).is_empty_or_whitespace)
      .map(|line| Range::new(content_range.end, Position::new(line, 0)))
      .filter(|range| range.end.line > content_range.end.line + 1);

    target.removal_range = match (target.leading_delimiter, target.trailing_delimiter) {
      (_, Some(trailing)) => content_range.union(&trailing),
      (Some(leading), None) => content_range.union(&leading),
      (None, None) => line_removal_range(&document, content_range),
    };
    target
  }

  pub fn whole_document(editor: Arc<Editor>) -> Self {
    let range = editor.document.range();
    let mut target = Self::bare(editor, TargetKind::Document, range, false);
    target.delimiter = Some(Tendril::from("\n"));
    target
  }

  /// A target for an instance of `scope_type`. Scopes that occupy whole
  /// lines and insert with a newline remove like lines.
  pub fn scope(
    editor: Arc<Editor>,
    scope_type: ScopeType,
    content_range: Range,
    is_reversed: bool,
  ) -> Self {
    let document = editor.document.clone();
    let delimiter = scope_type_delimiter(&scope_type);
    let mut target = Self::bare(editor, TargetKind::Scope(scope_type), content_range, is_reversed);
    target.delimiter = Some(Tendril::from(delimiter));

    if delimiter.contains('\n') && occupies_full_lines(&document, content_range) {
      let lines = full_lines(&document, content_range.start.line, content_range.end.line);
      target.leading_delimiter = (lines.start.line > 0).then(|| {
        let previous = lines.start.line - 1;
        Range::new(Position::new(previous, document.line_len(previous)), content_range.start)
      });
      target.trailing_delimiter = (lines.end.line + 1 < document.line_count()).then(|| {
        let next = document.line_at(lines.end.line + 1);
        Range::new(
          content_range.end,
          Position::new(next.line_number, next.first_non_whitespace_character_index),
        )
      });
      target.removal_range = line_removal_range(&document, lines);
      target
    } else {
      target.with_whitespace_delimiters()
    }
  }

  pub fn surrounding_pair(
    editor: Arc<Editor>,
    content_range: Range,
    interior: Range,
    boundary: [Range; 2],
    is_reversed: bool,
  ) -> Self {
    let mut target = Self::bare(editor, TargetKind::SurroundingPair, content_range, is_reversed)
      .with_whitespace_delimiters();
    target.delimiter = Some(Tendril::from(" "));
    target.interior = Some(interior);
    target.boundary = Some(boundary);
    target
  }

  pub fn interior_target(editor: Arc<Editor>, content_range: Range, is_reversed: bool) -> Self {
    let mut target = Self::bare(editor, TargetKind::Interior, content_range, is_reversed);
    target.delimiter = Some(Tendril::from(" "));
    target
  }

  /// An element of a delimited sequence, e.g. a collection item or a word of
  /// a compound identifier. Removal swallows the trailing delimiter, or the
  /// leading one for the last element.
  pub fn delimited(
    editor: Arc<Editor>,
    kind: TargetKind,
    content_range: Range,
    delimiters: (Option<Range>, Option<Range>),
    delimiter: impl Into<Tendril>,
    is_reversed: bool,
  ) -> Self {
    let (leading, trailing) = delimiters;
    let mut target = Self::bare(editor, kind, content_range, is_reversed);
    target.delimiter = Some(delimiter.into());
    target.leading_delimiter = leading;
    target.trailing_delimiter = trailing;
    target.removal_range = match (leading, trailing) {
      (_, Some(trailing)) => content_range.union(&trailing),
      (Some(leading), None) => content_range.union(&leading),
      (None, None) => content_range,
    };
    target
  }

  /// An empty insertion point before or after `target`.
  pub fn insertion_point(target: &Target, side: InsertionSide) -> Self {
    let position = match side {
      InsertionSide::Before => target.content_range.start,
      InsertionSide::After => target.content_range.end,
    };
    let mut result = Self::bare(
      target.editor.clone(),
      TargetKind::Position(side),
      Range::point(position),
      false,
    );
    result.delimiter = target.delimiter.clone();
    result.flags.insert(TargetFlags::EXPLICIT_RANGE);
    result.flags.set(TargetFlags::LINE, target.is_line());
    result
  }

  #[must_use]
  pub fn with_that_target(mut self, id: TargetId) -> Self {
    self.that_target = Some(id);
    self
  }

  #[must_use]
  pub fn with_is_reversed(mut self, is_reversed: bool) -> Self {
    self.is_reversed = is_reversed;
    self
  }

  #[must_use]
  pub fn with_flags(mut self, flags: TargetFlags) -> Self {
    self.flags.insert(flags);
    self
  }

  #[must_use]
  pub fn with_removal_range(mut self, removal_range: Range) -> Self {
    self.removal_range = removal_range;
    self
  }

  #[inline]
  pub fn editor(&self) -> &Arc<Editor> {
    &self.editor
  }

  #[inline]
  pub fn document(&self) -> &Document {
    &self.editor.document
  }

  #[inline]
  pub fn kind(&self) -> &TargetKind {
    &self.kind
  }

  #[inline]
  pub fn content_range(&self) -> Range {
    self.content_range
  }

  #[inline]
  pub fn is_reversed(&self) -> bool {
    self.is_reversed
  }

  /// The content range as a selection, honoring orientation.
  pub fn content_selection(&self) -> Selection {
    Selection::from_range(self.content_range, self.is_reversed)
  }

  pub fn content_text(&self) -> String {
    self.document().text_in(self.content_range)
  }

  #[inline]
  pub fn flags(&self) -> TargetFlags {
    self.flags
  }

  /// Text inserted between this target and a new sibling.
  pub fn delimiter(&self) -> Option<&str> {
    self.delimiter.as_deref()
  }

  /// Always contains the content range.
  #[inline]
  pub fn removal_range(&self) -> Range {
    self.removal_range
  }

  #[inline]
  pub fn leading_delimiter(&self) -> Option<Range> {
    self.leading_delimiter
  }

  #[inline]
  pub fn trailing_delimiter(&self) -> Option<Range> {
    self.trailing_delimiter
  }

  #[inline]
  pub fn interior(&self) -> Option<Range> {
    self.interior
  }

  #[inline]
  pub fn boundary(&self) -> Option<[Range; 2]> {
    self.boundary
  }

  #[inline]
  pub fn that_target(&self) -> Option<TargetId> {
    self.that_target
  }

  #[inline]
  pub fn is_weak(&self) -> bool {
    self.flags.contains(TargetFlags::WEAK)
  }

  #[inline]
  pub fn is_raw(&self) -> bool {
    self.flags.contains(TargetFlags::RAW)
  }

  #[inline]
  pub fn is_line(&self) -> bool {
    self.flags.contains(TargetFlags::LINE)
  }

  #[inline]
  pub fn is_notebook_cell(&self) -> bool {
    self.flags.contains(TargetFlags::NOTEBOOK_CELL)
  }

  #[inline]
  pub fn has_explicit_range(&self) -> bool {
    self.flags.contains(TargetFlags::EXPLICIT_RANGE)
  }

  #[inline]
  pub fn has_explicit_scope_type(&self) -> bool {
    self.flags.contains(TargetFlags::EXPLICIT_SCOPE_TYPE)
  }

  /// Whether both targets live in the same editor.
  pub fn same_editor(&self, other: &Target) -> bool {
    self.editor.id == other.editor.id
  }
}

/// Identity ignores the `that` back-reference: two targets over the same
/// text with the same metadata are the same target.
impl PartialEq for Target {
  fn eq(&self, other: &Self) -> bool {
    self.editor.id == other.editor.id
      && self.kind == other.kind
      && self.content_range == other.content_range
      && self.is_reversed == other.is_reversed
      && self.flags == other.flags
      && self.delimiter == other.delimiter
      && self.removal_range == other.removal_range
      && self.leading_delimiter == other.leading_delimiter
      && self.trailing_delimiter == other.trailing_delimiter
      && self.interior == other.interior
      && self.boundary == other.boundary
  }
}

impl Eq for Target {}

impl fmt::Debug for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Target")
      .field("editor", &self.editor.id)
      .field("kind", &self.kind)
      .field("content_range", &self.content_range)
      .field("is_reversed", &self.is_reversed)
      .field("flags", &self.flags)
      .field("delimiter", &self.delimiter)
      .field("removal_range", &self.removal_range)
      .field("interior", &self.interior)
      .field("boundary", &self.boundary)
      .field("that_target", &self.that_target)
      .finish_non_exhaustive()
  }
}

/// Orientation of a range from `anchor` to `active`.
pub fn calc_is_reversed(anchor: Range, active: Range) -> bool {
  if anchor.start != active.start {
    return anchor.start > active.start;
  }
  anchor.end > active.end
}

/// Insertion delimiter for instances of `scope_type`.
pub fn scope_type_delimiter(scope_type: &ScopeType) -> &'static str {
  match scope_type {
    ScopeType::Class | ScopeType::NamedFunction | ScopeType::Section => "\n\n",
    ScopeType::AnonymousFunction
    | ScopeType::Statement
    | ScopeType::IfStatement
    | ScopeType::Comment
    | ScopeType::XmlElement
    | ScopeType::Branch
    | ScopeType::Line => "\n",
    ScopeType::Paragraph => "\n\n",
    ScopeType::CollectionItem | ScopeType::ArgumentOrParameter => ", ",
    ScopeType::Character | ScopeType::Word => "",
    _ => " ",
  }
}

/// Lines `first..=last` without the final line break.
pub fn full_lines(document: &Document, first: usize, last: usize) -> Range {
  Range::new(
    Position::new(first, 0),
    Position::new(last, document.line_len(last)),
  )
}

fn occupies_full_lines(document: &Document, range: Range) -> bool {
  let first = document.line_at(range.start.line);
  let last = document.line_at(range.end.line);
  range.start.character <= first.first_non_whitespace_character_index
    && range.end.character >= last.trimmed_range().end.character
}

/// Horizontal whitespace ending at `position`, if any.
pub fn whitespace_before(document: &Document, position: Position) -> Option<Range> {
  let line = document.line_at(position.line);
  let prefix: Vec<char> = line.text.chars().take(position.character).collect();
  let count = prefix
    .iter()
    .rev()
    .take_while(|ch| char_is_whitespace(**ch))
    .count();
  (count > 0).then(|| Range::new(Position::new(position.line, position.character - count), position))
}

/// Horizontal whitespace starting at `position`, if any.
pub fn whitespace_after(document: &Document, position: Position) -> Option<Range> {
  let line = document.line_at(position.line);
  let count = line
    .text
    .chars()
    .skip(position.character)
    .take_while(|ch| char_is_whitespace(*ch))
    .count();
  (count > 0).then(|| Range::new(position, Position::new(position.line, position.character + count)))
}

fn token_removal_range(
  document: &Document,
  content: Range,
  leading: Option<Range>,
  trailing: Option<Range>,
) -> Range {
  let line_end = document.line_len(content.end.line);
  match (leading, trailing) {
    // Trailing whitespace at the end of a line is not worth keeping either.
    (_, Some(trailing)) if trailing.end.character < line_end || leading.is_none() => {
      content.union(&trailing)
    },
    (Some(leading), _) if leading.start.character > 0 => content.union(&leading),
    (_, Some(trailing)) => content.union(&trailing),
    _ => content,
  }
}

/// Removal range of whole lines: swallows the following line break, or the
/// preceding one on the last line.
pub fn line_removal_range(document: &Document, lines: Range) -> Range {
  if lines.end.line + 1 < document.line_count() {
    lines.union(&Range::point(Position::new(lines.end.line + 1, 0)))
  } else if lines.start.line > 0 {
    let previous = lines.start.line - 1;
    lines.union(&Range::point(Position::new(previous, document.line_len(previous))))
  } else {
    lines
  }
}
