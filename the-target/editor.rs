use std::sync::Arc;

use smallvec::SmallVec;

use crate::{
  document::Document,
  position::Range,
  selection::Selection,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditorId(u64);

impl EditorId {
  pub const fn new(id: u64) -> Self {
    Self(id)
  }

  pub const fn get(self) -> u64 {
    self.0
  }
}

/// Snapshot of one editor pane: the document it shows, its selections and
/// the ranges currently scrolled into view.
///
/// The first selection is the primary one.
#[derive(Debug, Clone)]
pub struct Editor {
  pub id:             EditorId,
  pub document:       Arc<Document>,
  pub selections:     SmallVec<[Selection; 1]>,
  pub visible_ranges: SmallVec<[Range; 1]>,
}

impl Editor {
  /// An editor showing the whole of `document` with a single cursor at its
  /// start.
  pub fn new(id: EditorId, document: Arc<Document>) -> Self {
    let visible = document.range();
    Self {
      id,
      document,
      selections: SmallVec::from_buf([Selection::point(visible.start)]),
      visible_ranges: SmallVec::from_buf([visible]),
    }
  }

  pub fn with_selections(mut self, selections: impl IntoIterator<Item = Selection>) -> Self {
    self.selections = selections.into_iter().collect();
    self
  }

  pub fn with_visible_ranges(mut self, ranges: impl IntoIterator<Item = Range>) -> Self {
    self.visible_ranges = ranges.into_iter().collect();
    self
  }

  #[inline]
  pub fn document(&self) -> &Document {
    &self.document
  }

  pub fn primary_selection(&self) -> Option<&Selection> {
    self.selections.first()
  }
}
