//! Modifier stages.
//!
//! Each [`Modifier`] becomes a [`ModifierStage`] that maps one input target
//! to zero or more output targets. The pipeline folds the stages of a
//! primitive descriptor over the targets of its mark, innermost modifier
//! first.
//!
//! Stages never mutate their input. When a stage infers a new target from a
//! weak or untyped one, it stores the input in the [`TargetArena`] and links
//! the output back to it, so `that` later sees what the user actually had
//! selected.

use crate::{
  context::ResolveContext,
  descriptor::{
    Modifier,
    ScopeType,
  },
  error::Result,
  target::{
    Target,
    TargetArena,
  },
};

mod combinator;
mod instance;
mod pair;
mod position;
mod scope;
mod subpiece;

pub use combinator::{
  CascadingStage,
  KeepContentFilterStage,
  KeepEmptyFilterStage,
  ModifyIfStage,
  RangeModifierStage,
};
pub use instance::InstanceStage;
pub use pair::{
  ExcludeInteriorStage,
  InteriorOnlyStage,
  SurroundingPairStage,
};
pub use position::{
  HeadTailStage,
  LeadingTrailingStage,
  PositionStage,
  RawSelectionStage,
  VisibleStage,
};
pub use scope::{
  ContainingScopeStage,
  ContainingTokenIfUntypedEmptyStage,
  ContiguousScopeStage,
  EveryScopeStage,
  OrdinalScopeStage,
  PreferredScopeStage,
  RelativeScopeStage,
};
pub use subpiece::SubpieceStage;

pub trait ModifierStage {
  fn run(&self, cx: &ResolveContext, arena: &mut TargetArena, target: &Target) -> Result<Vec<Target>>;
}

/// The stage that applies `modifier`.
pub fn stage_for(modifier: &Modifier) -> Box<dyn ModifierStage + '_> {
  match modifier {
    Modifier::Position { position } => Box::new(PositionStage::new(*position)),
    Modifier::ContainingScope { scope_type } => Box::new(ContainingScopeStage::new(scope_type)),
    Modifier::EveryScope {
      scope_type: ScopeType::Instance,
    } => Box::new(InstanceStage::every()),
    Modifier::EveryScope { scope_type } => Box::new(EveryScopeStage::new(scope_type)),
    Modifier::PreferredScope { scope_type } => Box::new(PreferredScopeStage::new(scope_type)),
    Modifier::ContiguousScope { scope_type } => Box::new(ContiguousScopeStage::new(scope_type)),
    Modifier::OrdinalScope {
      scope_type: ScopeType::Instance,
      start,
      length,
      ..
    } => Box::new(InstanceStage::ordinal(*start, *length)),
    Modifier::OrdinalScope {
      scope_type,
      start,
      length,
      is_every,
    } => Box::new(OrdinalScopeStage::new(scope_type, *start, *length, *is_every)),
    Modifier::RelativeScope {
      scope_type: ScopeType::Instance,
      offset,
      length,
      direction,
      ..
    } => Box::new(InstanceStage::relative(*offset, *length, *direction)),
    Modifier::RelativeScope {
      scope_type,
      offset,
      length,
      direction,
      is_every,
    } => {
      Box::new(RelativeScopeStage::new(
        scope_type, *offset, *length, *direction, *is_every,
      ))
    },
    Modifier::SurroundingPair {
      delimiter,
      delimiter_inclusion,
      force_direction,
    } => {
      Box::new(SurroundingPairStage::new(
        *delimiter,
        *delimiter_inclusion,
        *force_direction,
      ))
    },
    Modifier::InteriorOnly => Box::new(InteriorOnlyStage),
    Modifier::ExcludeInterior => Box::new(ExcludeInteriorStage),
    Modifier::Leading => Box::new(LeadingTrailingStage::leading()),
    Modifier::Trailing => Box::new(LeadingTrailingStage::trailing()),
    Modifier::Head { modifiers } => Box::new(HeadTailStage::head(modifiers)),
    Modifier::Tail { modifiers } => Box::new(HeadTailStage::tail(modifiers)),
    Modifier::Subpiece {
      piece_type,
      anchor,
      active,
      exclude_anchor,
      exclude_active,
    } => {
      Box::new(SubpieceStage {
        piece_type:     *piece_type,
        anchor:         *anchor,
        active:         *active,
        exclude_anchor: *exclude_anchor,
        exclude_active: *exclude_active,
      })
    },
    Modifier::ToRawSelection => Box::new(RawSelectionStage),
    Modifier::ModifyIfUntyped { modifier } => Box::new(ModifyIfStage::untyped(modifier)),
    Modifier::ModifyIfWeak { modifier } => Box::new(ModifyIfStage::weak(modifier)),
    Modifier::Cascading { modifiers } => Box::new(CascadingStage::new(modifiers)),
    Modifier::Range {
      anchor,
      active,
      exclude_anchor,
      exclude_active,
    } => {
      Box::new(RangeModifierStage {
        anchor:         anchor.as_ref(),
        active:         active.as_ref(),
        exclude_anchor: *exclude_anchor,
        exclude_active: *exclude_active,
      })
    },
    Modifier::KeepContentFilter => Box::new(KeepContentFilterStage),
    Modifier::KeepEmptyFilter => Box::new(KeepEmptyFilterStage),
    Modifier::Visible => Box::new(VisibleStage),
  }
}

/// Runs `stages` in order, each over every output of the one before.
pub fn run_stages(
  cx: &ResolveContext,
  arena: &mut TargetArena,
  stages: &[Box<dyn ModifierStage + '_>],
  targets: Vec<Target>,
) -> Result<Vec<Target>> {
  stages.iter().try_fold(targets, |targets, stage| {
    let mut output = Vec::with_capacity(targets.len());
    for target in &targets {
      output.extend(stage.run(cx, arena, target)?);
    }
    Ok(output)
  })
}

/// Applies `modifiers` to `target`, innermost (last) first.
pub fn apply_modifiers(
  cx: &ResolveContext,
  arena: &mut TargetArena,
  modifiers: &[Modifier],
  target: &Target,
) -> Result<Vec<Target>> {
  let stages: Vec<_> = modifiers.iter().rev().map(stage_for).collect();
  run_stages(cx, arena, &stages, vec![target.clone()])
}
