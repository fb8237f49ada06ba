use super::ModifierStage;
use crate::{
  context::ResolveContext,
  descriptor::{
    DelimiterInclusion,
    ScopeType,
    SurroundingPairDirection,
    SurroundingPairName,
  },
  error::{
    Result,
    TargetError,
  },
  pair::PairFinder,
  scope::scope_handler,
  target::{
    Target,
    TargetArena,
  },
};

/// The innermost pair of `delimiter` around the target, or one of its parts.
pub struct SurroundingPairStage {
  delimiter:           SurroundingPairName,
  delimiter_inclusion: Option<DelimiterInclusion>,
  force_direction:     Option<SurroundingPairDirection>,
}

impl SurroundingPairStage {
  pub fn new(
    delimiter: SurroundingPairName,
    delimiter_inclusion: Option<DelimiterInclusion>,
    force_direction: Option<SurroundingPairDirection>,
  ) -> Self {
    Self {
      delimiter,
      delimiter_inclusion,
      force_direction,
    }
  }
}

impl ModifierStage for SurroundingPairStage {
  fn run(&self, cx: &ResolveContext, _arena: &mut TargetArena, target: &Target) -> Result<Vec<Target>> {
    let editor = target.editor();
    let pair = PairFinder::new(self.delimiter, target.document().language_id())
      .with_force_direction(self.force_direction)
      .find(cx, editor, target.content_range())
      .ok_or_else(|| TargetError::no_containing_scope(ScopeType::surrounding_pair(self.delimiter)))?;

    let is_reversed = target.is_reversed();
    Ok(match self.delimiter_inclusion {
      None => vec![pair.target(editor.clone(), is_reversed)],
      Some(DelimiterInclusion::InteriorOnly) => {
        vec![Target::interior_target(editor.clone(), pair.interior(), is_reversed)]
      },
      Some(DelimiterInclusion::ExcludeInterior) => {
        [pair.open, pair.close]
          .into_iter()
          .map(|boundary| Target::plain(editor.clone(), boundary, is_reversed))
          .collect()
      },
    })
  }
}

/// The target itself when it is a pair, else the innermost pair whose
/// interior holds it.
fn pair_target(cx: &ResolveContext, target: &Target) -> Result<Target> {
  if target.interior().is_some() || target.boundary().is_some() {
    return Ok(target.clone());
  }

  let scope_type = ScopeType::SurroundingPair {
    delimiter:                  SurroundingPairName::Any,
    force_direction:            None,
    require_strong_containment: true,
  };
  scope_handler(cx, &scope_type, target.document().language_id())?
    .containing_scope(cx, target.editor(), target.content_range(), target.is_reversed())?
    .ok_or_else(|| TargetError::no_containing_scope(&scope_type))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InteriorOnlyStage;

impl ModifierStage for InteriorOnlyStage {
  fn run(&self, cx: &ResolveContext, _arena: &mut TargetArena, target: &Target) -> Result<Vec<Target>> {
    let pair = pair_target(cx, target)?;
    let interior = pair.interior().ok_or(TargetError::NoInterior)?;
    Ok(vec![Target::interior_target(
      pair.editor().clone(),
      interior,
      pair.is_reversed(),
    )])
  }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExcludeInteriorStage;

impl ModifierStage for ExcludeInteriorStage {
  fn run(&self, cx: &ResolveContext, _arena: &mut TargetArena, target: &Target) -> Result<Vec<Target>> {
    let pair = pair_target(cx, target)?;
    let boundary = pair.boundary().ok_or(TargetError::NoBoundary)?;
    Ok(
      boundary
        .into_iter()
        .map(|range| Target::plain(pair.editor().clone(), range, pair.is_reversed()))
        .collect(),
    )
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    config::TargetConfig,
    position::Range,
    target::{
      TargetKind,
      test::editor,
    },
  };

  fn cx() -> ResolveContext {
    ResolveContext::new(TargetConfig::default()).unwrap()
  }

  fn texts(targets: &[Target]) -> Vec<String> {
    targets.iter().map(Target::content_text).collect()
  }

  #[test]
  fn pair_parts() {
    let editor = editor("call(a, [b])");
    let cursor = Target::from_selection(editor, Range::from_coords(0, 9, 0, 9).into());
    let mut arena = TargetArena::default();

    let stage = SurroundingPairStage::new(SurroundingPairName::Parentheses, None, None);
    let pair = stage.run(&cx(), &mut arena, &cursor).unwrap();
    assert_eq!(texts(&pair), ["(a, [b])"]);
    assert_eq!(pair[0].kind(), &TargetKind::SurroundingPair);

    let stage = SurroundingPairStage::new(
      SurroundingPairName::Any,
      Some(DelimiterInclusion::InteriorOnly),
      None,
    );
    assert_eq!(texts(&stage.run(&cx(), &mut arena, &cursor).unwrap()), ["b"]);

    let stage = SurroundingPairStage::new(
      SurroundingPairName::Parentheses,
      Some(DelimiterInclusion::ExcludeInterior),
      None,
    );
    assert_eq!(texts(&stage.run(&cx(), &mut arena, &cursor).unwrap()), [
      "(", ")"
    ]);
  }

  #[test]
  fn interior_of_the_nearest_pair() {
    let editor = editor("{ [x] }");
    let mut arena = TargetArena::default();

    let inside = Target::from_selection(editor.clone(), Range::from_coords(0, 3, 0, 3).into());
    let interior = InteriorOnlyStage.run(&cx(), &mut arena, &inside).unwrap();
    assert_eq!(texts(&interior), ["x"]);
    assert_eq!(interior[0].kind(), &TargetKind::Interior);

    // Sitting on the bracket itself is not strongly inside it.
    let on_bracket = Target::plain(editor, Range::from_coords(0, 2, 0, 5), false);
    let boundary = ExcludeInteriorStage
      .run(&cx(), &mut arena, &on_bracket)
      .unwrap();
    assert_eq!(texts(&boundary), ["{", "}"]);
  }

  #[test]
  fn no_pair_is_recoverable() {
    let editor = editor("plain words");
    let cursor = Target::from_selection(editor, Range::from_coords(0, 2, 0, 2).into());
    let err = InteriorOnlyStage
      .run(&cx(), &mut TargetArena::default(), &cursor)
      .unwrap_err();
    assert!(err.is_recoverable());
  }
}
