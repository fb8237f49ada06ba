use super::{
  ModifierStage,
  stage_for,
};
use crate::{
  context::ResolveContext,
  descriptor::Modifier,
  error::{
    Result,
    TargetError,
  },
  target::{
    Target,
    TargetArena,
    merge::range_target,
  },
};

/// The first of `modifiers` that finds something. Scope lookups that come up
/// empty move on to the next one; any other error aborts.
pub struct CascadingStage<'a> {
  modifiers: &'a [Modifier],
}

impl<'a> CascadingStage<'a> {
  pub fn new(modifiers: &'a [Modifier]) -> Self {
    Self { modifiers }
  }
}

impl ModifierStage for CascadingStage<'_> {
  fn run(&self, cx: &ResolveContext, arena: &mut TargetArena, target: &Target) -> Result<Vec<Target>> {
    let mut last_error = None;
    for modifier in self.modifiers {
      match stage_for(modifier).run(cx, arena, target) {
        Ok(targets) => return Ok(targets),
        Err(err) if err.is_recoverable() => {
          tracing::debug!(%err, ?modifier, "cascading to next modifier");
          last_error = Some(err);
        },
        Err(err) => return Err(err),
      }
    }
    Err(last_error.unwrap_or_else(|| TargetError::no_containing_scope("cascading")))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Condition {
  Untyped,
  Weak,
}

/// Applies `modifier` only to targets that carry no scope type (or are
/// weak). The result remembers the target it was inferred from.
pub struct ModifyIfStage<'a> {
  modifier:  &'a Modifier,
  condition: Condition,
}

impl<'a> ModifyIfStage<'a> {
  pub fn untyped(modifier: &'a Modifier) -> Self {
    Self {
      modifier,
      condition: Condition::Untyped,
    }
  }

  pub fn weak(modifier: &'a Modifier) -> Self {
    Self {
      modifier,
      condition: Condition::Weak,
    }
  }
}

impl ModifierStage for ModifyIfStage<'_> {
  fn run(&self, cx: &ResolveContext, arena: &mut TargetArena, target: &Target) -> Result<Vec<Target>> {
    let applies = match self.condition {
      Condition::Untyped => !target.has_explicit_scope_type(),
      Condition::Weak => target.is_weak(),
    };
    if !applies {
      return Ok(vec![target.clone()]);
    }

    let outputs = stage_for(self.modifier).run(cx, arena, target)?;
    let that = arena.alloc(target.clone());
    Ok(
      outputs
        .into_iter()
        .map(|output| output.with_that_target(that))
        .collect(),
    )
  }
}

/// The continuous range between what `anchor` and `active` give for the
/// same input.
pub struct RangeModifierStage<'a> {
  pub anchor:         &'a Modifier,
  pub active:         &'a Modifier,
  pub exclude_anchor: bool,
  pub exclude_active: bool,
}

fn single(targets: Vec<Target>) -> Result<Target> {
  let count = targets.len();
  let mut targets = targets.into_iter();
  match (targets.next(), targets.next()) {
    (Some(target), None) => Ok(target),
    _ => Err(TargetError::ExpectedSingleTarget { count }),
  }
}

impl ModifierStage for RangeModifierStage<'_> {
  fn run(&self, cx: &ResolveContext, arena: &mut TargetArena, target: &Target) -> Result<Vec<Target>> {
    let anchor = single(stage_for(self.anchor).run(cx, arena, target)?)?;
    let active = single(stage_for(self.active).run(cx, arena, target)?)?;
    Ok(vec![range_target(
      &anchor,
      &active,
      self.exclude_anchor,
      self.exclude_active,
    )])
  }
}

/// Drops targets whose content is only whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepContentFilterStage;

impl ModifierStage for KeepContentFilterStage {
  fn run(&self, _cx: &ResolveContext, _arena: &mut TargetArena, target: &Target) -> Result<Vec<Target>> {
    if target.content_text().trim().is_empty() {
      Ok(Vec::new())
    } else {
      Ok(vec![target.clone()])
    }
  }
}

/// Keeps only empty targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepEmptyFilterStage;

impl ModifierStage for KeepEmptyFilterStage {
  fn run(&self, _cx: &ResolveContext, _arena: &mut TargetArena, target: &Target) -> Result<Vec<Target>> {
    if target.content_range().is_empty() {
      Ok(vec![target.clone()])
    } else {
      Ok(Vec::new())
    }
  }
}
