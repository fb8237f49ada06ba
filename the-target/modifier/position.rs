use super::{
  ModifierStage,
  apply_modifiers,
};
use crate::{
  context::ResolveContext,
  descriptor::{
    Modifier,
    PositionKind,
    ScopeType,
  },
  error::{
    Result,
    TargetError,
  },
  position::Range,
  target::{
    InsertionSide,
    Target,
    TargetArena,
    merge::continuous_target,
  },
};

/// Before/after give insertion points that keep the target's delimiter;
/// start/end give empty plain targets.
pub struct PositionStage {
  position: PositionKind,
}

impl PositionStage {
  pub fn new(position: PositionKind) -> Self {
    Self { position }
  }
}

impl ModifierStage for PositionStage {
  fn run(&self, _cx: &ResolveContext, _arena: &mut TargetArena, target: &Target) -> Result<Vec<Target>> {
    let range = target.content_range();
    let editor = target.editor().clone();
    Ok(vec![match self.position {
      PositionKind::Before => Target::insertion_point(target, InsertionSide::Before),
      PositionKind::After => Target::insertion_point(target, InsertionSide::After),
      PositionKind::Start => Target::plain(editor, Range::point(range.start), false),
      PositionKind::End => Target::plain(editor, Range::point(range.end), false),
    }])
  }
}

pub struct LeadingTrailingStage {
  leading: bool,
}

impl LeadingTrailingStage {
  pub fn leading() -> Self {
    Self { leading: true }
  }

  pub fn trailing() -> Self {
    Self { leading: false }
  }
}

impl ModifierStage for LeadingTrailingStage {
  fn run(&self, _cx: &ResolveContext, _arena: &mut TargetArena, target: &Target) -> Result<Vec<Target>> {
    let (delimiter, name) = if self.leading {
      (target.leading_delimiter(), "leading")
    } else {
      (target.trailing_delimiter(), "trailing")
    };
    let range = delimiter.ok_or(TargetError::NoDelimiter(name))?;
    Ok(vec![Target::plain(
      target.editor().clone(),
      range,
      target.is_reversed(),
    )])
  }
}

/// Extends the target back to the start (head) or on to the end (tail) of
/// what `modifiers` give, the containing line by default.
pub struct HeadTailStage<'a> {
  modifiers: &'a [Modifier],
  is_head:   bool,
}

impl<'a> HeadTailStage<'a> {
  pub fn head(modifiers: &'a [Modifier]) -> Self {
    Self {
      modifiers,
      is_head: true,
    }
  }

  pub fn tail(modifiers: &'a [Modifier]) -> Self {
    Self {
      modifiers,
      is_head: false,
    }
  }
}

impl ModifierStage for HeadTailStage<'_> {
  fn run(&self, cx: &ResolveContext, arena: &mut TargetArena, target: &Target) -> Result<Vec<Target>> {
    let line = [Modifier::containing(ScopeType::Line)];
    let modifiers = if self.modifiers.is_empty() {
      &line[..]
    } else {
      self.modifiers
    };

    let extents = apply_modifiers(cx, arena, modifiers, target)?;
    Ok(
      extents
        .iter()
        .map(|extent| {
          if self.is_head {
            continuous_target(extent, target, true, true, true)
          } else {
            continuous_target(target, extent, true, true, false)
          }
        })
        .collect(),
    )
  }
}

/// The bare content range, with no delimiters or removal behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawSelectionStage;

impl ModifierStage for RawSelectionStage {
  fn run(&self, _cx: &ResolveContext, _arena: &mut TargetArena, target: &Target) -> Result<Vec<Target>> {
    Ok(vec![Target::raw(
      target.editor().clone(),
      target.content_range(),
      target.is_reversed(),
    )])
  }
}

/// One plain target per range scrolled into view.
pub struct VisibleStage;

impl ModifierStage for VisibleStage {
  fn run(&self, _cx: &ResolveContext, _arena: &mut TargetArena, target: &Target) -> Result<Vec<Target>> {
    let editor = target.editor();
    Ok(
      editor
        .visible_ranges
        .iter()
        .map(|range| Target::plain(editor.clone(), *range, target.is_reversed()))
        .collect(),
    )
  }
}
