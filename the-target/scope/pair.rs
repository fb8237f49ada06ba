use std::sync::Arc;

use super::{
  ScopeHandler,
  TargetScope,
};
use crate::{
  context::ResolveContext,
  descriptor::{
    ScopeType,
    SurroundingPairName,
  },
  editor::Editor,
  error::Result,
  pair::PairFinder,
  position::Range,
  target::Target,
};

/// Delimiter pairs. Containment goes through [`PairFinder::find`] so that
/// parse trees and text fragments are honoured; walks and iteration use a
/// scan of the whole document.
#[derive(Debug, Clone)]
pub struct SurroundingPairScopeHandler {
  scope_type: ScopeType,
}

impl SurroundingPairScopeHandler {
  pub fn new(scope_type: ScopeType) -> Self {
    Self { scope_type }
  }

  fn finder(&self, language_id: &str) -> PairFinder {
    match &self.scope_type {
      ScopeType::SurroundingPair {
        delimiter,
        force_direction,
        require_strong_containment,
      } => {
        PairFinder::new(*delimiter, language_id)
          .with_force_direction(*force_direction)
          .with_strong_containment(*require_strong_containment)
      },
      _ => PairFinder::new(SurroundingPairName::Any, language_id),
    }
  }
}

impl ScopeHandler for SurroundingPairScopeHandler {
  fn scope_type(&self) -> &ScopeType {
    &self.scope_type
  }

  fn iteration_scope_type(&self) -> ScopeType {
    ScopeType::surrounding_pair(SurroundingPairName::Any)
  }

  fn is_hierarchical(&self) -> bool {
    true
  }

  fn candidates(
    &self,
    _cx: &ResolveContext,
    editor: &Arc<Editor>,
    range: Range,
  ) -> Result<Vec<TargetScope>> {
    let document = editor.document();
    Ok(
      self
        .finder(document.language_id())
        .find_all(document)
        .into_iter()
        .filter(|pair| pair.content().intersection(&range).is_some())
        .map(|pair| TargetScope::new(pair.content(), pair.target(editor.clone(), false)))
        .collect(),
    )
  }

  fn containing_scope(
    &self,
    cx: &ResolveContext,
    editor: &Arc<Editor>,
    range: Range,
    is_reversed: bool,
  ) -> Result<Option<Target>> {
    Ok(
      self
        .finder(editor.document.language_id())
        .find(cx, editor, range)
        .map(|pair| pair.target(editor.clone(), is_reversed)),
    )
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    config::TargetConfig,
    descriptor::Direction,
    position::Position,
    scope::{
      Containment,
      ScopeRequirements,
      generate_scopes,
    },
    target::test::editor,
  };

  #[test]
  fn next_pair_skips_nested_ones() {
    let cx = ResolveContext::new(TargetConfig::default()).unwrap();
    let editor = editor("a (b (c)) [d]");
    let handler = SurroundingPairScopeHandler::new(ScopeType::surrounding_pair(SurroundingPairName::Any));
    let scopes = generate_scopes(
      &handler,
      &cx,
      &editor,
      Position::new(0, 1),
      Direction::Forward,
      ScopeRequirements {
        containment: Some(Containment::Disallowed),
      },
    )
    .unwrap();
    let texts: Vec<String> = scopes
      .iter()
      .map(|scope| scope.target(false).content_text())
      .collect();
    assert_eq!(texts, ["(b (c))", "[d]"]);
  }

  #[test]
  fn containing_pair_exposes_interior() {
    let cx = ResolveContext::new(TargetConfig::default()).unwrap();
    let editor = editor("x = [1, 2]");
    let handler = SurroundingPairScopeHandler::new(ScopeType::surrounding_pair(SurroundingPairName::SquareBrackets));
    let target = handler
      .containing_scope(&cx, &editor, Range::from_coords(0, 6, 0, 6), false)
      .unwrap()
      .unwrap();
    assert_eq!(target.content_range(), Range::from_coords(0, 4, 0, 10));
    assert_eq!(target.interior(), Some(Range::from_coords(0, 5, 0, 9)));
    assert_eq!(
      target.boundary(),
      Some([Range::from_coords(0, 4, 0, 5), Range::from_coords(0, 9, 0, 10)])
    );
  }
}
