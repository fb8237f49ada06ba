//! Resolution of whole target descriptors.
//!
//! A primitive descriptor resolves its mark and then folds its modifiers
//! over the result, innermost first. Commands contribute extra stages
//! through [`ResolveOptions`]: `pre_position_modifiers` run before the
//! descriptor's own position modifier and `final_modifiers` after it.
//! Unless disabled, an empty untyped result is finally widened to the token
//! it sits in.
//!
//! Ranges resolve both ends independently and pair them up; lists resolve
//! each element and drop duplicates. Any error aborts the whole descriptor.

use crate::{
  context::ResolveContext,
  descriptor::{
    Modifier,
    PrimitiveTargetDescriptor,
    RangeTargetDescriptor,
    RangeType,
    TargetDescriptor,
  },
  error::{
    Result,
    TargetError,
  },
  mark::resolve_mark,
  modifier::{
    ContainingTokenIfUntypedEmptyStage,
    ModifierStage,
    run_stages,
    stage_for,
  },
  position::{
    Position,
    Range,
  },
  target::{
    Target,
    TargetArena,
    calc_is_reversed,
    merge::range_target,
  },
};

/// Stages a command adds around every primitive target it resolves.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
  pub pre_position_modifiers: Vec<Modifier>,
  pub final_modifiers:        Vec<Modifier>,
  /// Widen empty untyped targets to their containing token.
  pub infer_containing_token: bool,
}

impl Default for ResolveOptions {
  fn default() -> Self {
    Self {
      pre_position_modifiers: Vec::new(),
      final_modifiers:        Vec::new(),
      infer_containing_token: true,
    }
  }
}

/// Resolves the descriptors of one command.
///
/// The arena collects the targets that inferred targets were derived from;
/// it is dropped with the resolver.
pub struct Resolver<'a> {
  cx:      &'a ResolveContext,
  options: ResolveOptions,
  arena:   TargetArena,
}

impl<'a> Resolver<'a> {
  pub fn new(cx: &'a ResolveContext) -> Self {
    Self::with_options(cx, ResolveOptions::default())
  }

  pub fn with_options(cx: &'a ResolveContext, options: ResolveOptions) -> Self {
    Self {
      cx,
      options,
      arena: TargetArena::default(),
    }
  }

  #[inline]
  pub fn arena(&self) -> &TargetArena {
    &self.arena
  }

  /// Every descriptor in order. The first failure aborts the rest.
  pub fn resolve_all(&mut self, descriptors: &[TargetDescriptor]) -> Result<Vec<Vec<Target>>> {
    descriptors
      .iter()
      .map(|descriptor| self.resolve(descriptor))
      .collect()
  }

  pub fn resolve(&mut self, descriptor: &TargetDescriptor) -> Result<Vec<Target>> {
    let targets = match descriptor {
      TargetDescriptor::Primitive(primitive) => self.resolve_primitive(primitive)?,
      TargetDescriptor::Range(range) => self.resolve_range(range)?,
      TargetDescriptor::List { elements } => {
        let mut targets: Vec<Target> = Vec::new();
        for element in elements {
          for target in self.resolve(element)? {
            if !targets.contains(&target) {
              targets.push(target);
            }
          }
        }
        targets
      },
    };
    tracing::debug!(count = targets.len(), "resolved descriptor");
    Ok(targets)
  }

  fn resolve_primitive(&mut self, descriptor: &PrimitiveTargetDescriptor) -> Result<Vec<Target>> {
    let targets = resolve_mark(self.cx, &descriptor.mark)?;

    // Only the outermost modifier can be the position modifier; it runs
    // after the command's pre-position stages.
    let (position, inner) = match descriptor.modifiers.split_first() {
      Some((first @ Modifier::Position { .. }, rest)) => (Some(first), rest),
      _ => (None, &descriptor.modifiers[..]),
    };

    let mut stages: Vec<Box<dyn ModifierStage + '_>> = inner.iter().rev().map(stage_for).collect();
    stages.extend(self.options.pre_position_modifiers.iter().map(stage_for));
    stages.extend(position.map(stage_for));
    stages.extend(self.options.final_modifiers.iter().map(stage_for));
    if self.options.infer_containing_token {
      stages.push(Box::new(ContainingTokenIfUntypedEmptyStage));
    }

    tracing::trace!(
      mark = ?descriptor.mark,
      stages = stages.len(),
      "running modifier stages"
    );
    run_stages(self.cx, &mut self.arena, &stages, targets)
  }

  fn resolve_range(&mut self, descriptor: &RangeTargetDescriptor) -> Result<Vec<Target>> {
    let anchors = self.resolve_primitive(&descriptor.anchor)?;
    let actives = self.resolve_primitive(&descriptor.active)?;
    if anchors.len() != actives.len() {
      return Err(TargetError::RangeLengthMismatch {
        anchor: anchors.len(),
        active: actives.len(),
      });
    }

    let mut targets = Vec::with_capacity(anchors.len());
    for (anchor, active) in anchors.iter().zip(&actives) {
      let (anchor_document, active_document) = (anchor.document().id(), active.document().id());
      if !anchor.same_editor(active) || anchor_document != active_document {
        return Err(TargetError::CrossDocumentRange {
          anchor: anchor_document,
          active: active_document,
        });
      }

      match descriptor.range_type {
        RangeType::Continuous => {
          targets.push(range_target(
            anchor,
            active,
            descriptor.exclude_anchor,
            descriptor.exclude_active,
          ));
        },
        RangeType::Vertical => {
          targets.extend(vertical_targets(
            anchor,
            active,
            descriptor.exclude_anchor,
            descriptor.exclude_active,
          ));
        },
      }
    }
    Ok(targets)
  }
}

/// One target per line from `anchor` to `active`, each spanning the
/// anchor's columns. The anchor line keeps the anchor itself.
fn vertical_targets(
  anchor: &Target,
  active: &Target,
  exclude_anchor: bool,
  exclude_active: bool,
) -> Vec<Target> {
  let columns = anchor.content_range();
  let first = columns.start.line;
  let last = active.content_range().start.line;
  let mut lines: Vec<usize> = (first.min(last)..=first.max(last)).collect();
  if calc_is_reversed(anchor.content_range(), active.content_range()) {
    lines.reverse();
  }

  let document = anchor.document();
  let mut targets = Vec::new();
  for line in lines {
    if exclude_anchor && line == first {
      continue;
    }
    if exclude_active && line == last {
      break;
    }
    if line == first {
      targets.push(anchor.clone());
      continue;
    }
    let range = Range::new(
      document.clamp(Position::new(line, columns.start.character)),
      document.clamp(Position::new(line, columns.end.character)),
    );
    targets.push(Target::plain(anchor.editor().clone(), range, anchor.is_reversed()));
  }
  targets
}
