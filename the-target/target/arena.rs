use super::Target;

/// Index of a target in the [`TargetArena`] of one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(u32);

impl TargetId {
  #[inline]
  pub const fn index(self) -> usize {
    self.0 as usize
  }
}

/// Targets that others were derived from. Lives exactly as long as the
/// resolution that filled it.
#[derive(Debug, Default, Clone)]
pub struct TargetArena {
  targets: Vec<Target>,
}

impl TargetArena {
  pub fn alloc(&mut self, target: Target) -> TargetId {
    let id = TargetId(self.targets.len() as u32);
    self.targets.push(target);
    id
  }

  pub fn get(&self, id: TargetId) -> Option<&Target> {
    self.targets.get(id.index())
  }

  pub fn len(&self) -> usize {
    self.targets.len()
  }

  pub fn is_empty(&self) -> bool {
    self.targets.is_empty()
  }

  /// The literal target `target` was inferred from, following the chain to
  /// its root. Returns `target` itself when it was not inferred.
  pub fn that_root<'a>(&'a self, target: &'a Target) -> &'a Target {
    let mut current = target;
    while let Some(parent) = current.that_target().and_then(|id| self.get(id)) {
      current = parent;
    }
    current
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    position::Range,
    target::test::editor,
  };

  #[test]
  fn that_root_follows_the_chain() {
    let editor = editor("foo bar");
    let mut arena = TargetArena::default();

    let cursor = Target::from_selection(editor.clone(), Range::from_coords(0, 1, 0, 1).into());
    let cursor_id = arena.alloc(cursor.clone());
    let token = Target::token(editor.clone(), Range::from_coords(0, 0, 0, 3), false)
      .with_that_target(cursor_id);
    let token_id = arena.alloc(token.clone());
    let line = Target::line(editor, Range::from_coords(0, 0, 0, 0), false).with_that_target(token_id);

    assert_eq!(arena.len(), 2);
    assert_eq!(arena.that_root(&line), &cursor);
    assert_eq!(arena.that_root(&cursor), &cursor);
    assert_eq!(arena.get(token_id), Some(&token));
  }
}
