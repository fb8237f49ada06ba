use std::sync::Arc;

use super::{
  IterationScope,
  ScopeHandler,
  TargetScope,
  compare_size,
  scopes_in_domain,
};
use crate::{
  context::ResolveContext,
  descriptor::ScopeType,
  editor::Editor,
  error::Result,
  position::Range,
  target::Target,
};

/// Instances of any of several scope types, treated as one nested family.
pub struct OneOfScopeHandler {
  scope_type: ScopeType,
  handlers:   Vec<Box<dyn ScopeHandler>>,
}

impl OneOfScopeHandler {
  pub fn new(scope_type: ScopeType, handlers: Vec<Box<dyn ScopeHandler>>) -> Self {
    Self {
      scope_type,
      handlers,
    }
  }
}

impl ScopeHandler for OneOfScopeHandler {
  fn scope_type(&self) -> &ScopeType {
    &self.scope_type
  }

  fn iteration_scope_type(&self) -> ScopeType {
    ScopeType::Document
  }

  fn is_hierarchical(&self) -> bool {
    true
  }

  fn candidates(
    &self,
    cx: &ResolveContext,
    editor: &Arc<Editor>,
    range: Range,
  ) -> Result<Vec<TargetScope>> {
    let mut scopes = Vec::new();
    for handler in &self.handlers {
      match handler.candidates(cx, editor, range) {
        Ok(found) => scopes.extend(found),
        Err(err) if err.is_recoverable() => {
          tracing::trace!(%err, scope_type = %handler.scope_type(), "skipping alternative");
        },
        Err(err) => return Err(err),
      }
    }
    scopes.sort_by(|a, b| {
      a.domain
        .start
        .cmp(&b.domain.start)
        .then(b.domain.end.cmp(&a.domain.end))
    });
    scopes.dedup_by_key(|scope| scope.domain);
    Ok(scopes)
  }

  fn iteration_scopes(
    &self,
    cx: &ResolveContext,
    editor: &Arc<Editor>,
    range: Range,
  ) -> Result<Vec<IterationScope>> {
    let mut domains = Vec::new();
    for handler in &self.handlers {
      match handler.iteration_scopes(cx, editor, range) {
        Ok(scopes) => domains.extend(scopes.into_iter().map(|scope| scope.domain)),
        Err(err) if err.is_recoverable() => (),
        Err(err) => return Err(err),
      }
    }
    domains.push(editor.document.range());
    domains.sort_by(|a, b| compare_size(*a, *b));
    domains.dedup();

    domains
      .into_iter()
      .map(|domain| {
        Ok(IterationScope {
          domain,
          scopes: scopes_in_domain(self, cx, editor, domain)?,
        })
      })
      .collect()
  }

  /// The smallest of the alternatives' containing scopes.
  fn containing_scope(
    &self,
    cx: &ResolveContext,
    editor: &Arc<Editor>,
    range: Range,
    is_reversed: bool,
  ) -> Result<Option<Target>> {
    let mut best: Option<Target> = None;
    for handler in &self.handlers {
      let target = match handler.containing_scope(cx, editor, range, is_reversed) {
        Ok(Some(target)) => target,
        Ok(None) => continue,
        Err(err) if err.is_recoverable() => continue,
        Err(err) => return Err(err),
      };
      let smaller = best
        .as_ref()
        .is_none_or(|best| best.content_range().strictly_contains_range(&target.content_range()));
      if smaller {
        best = Some(target);
      }
    }
    Ok(best)
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    config::TargetConfig,
    descriptor::SurroundingPairName,
    scope::scope_handler,
    target::test::editor,
  };

  #[test]
  fn smallest_alternative_wins() {
    let cx = ResolveContext::new(TargetConfig::default()).unwrap();
    let editor = editor("call(foo, bar)");
    let scope_type = ScopeType::OneOf {
      scope_types: vec![
        ScopeType::surrounding_pair(SurroundingPairName::Parentheses),
        ScopeType::Token,
      ],
    };
    let handler = scope_handler(&cx, &scope_type, "plaintext").unwrap();

    let target = handler
      .containing_scope(&cx, &editor, Range::from_coords(0, 6, 0, 6), false)
      .unwrap()
      .unwrap();
    assert_eq!(target.content_text(), "foo");

    let target = handler
      .containing_scope(&cx, &editor, Range::from_coords(0, 4, 0, 14), false)
      .unwrap()
      .unwrap();
    assert_eq!(target.content_text(), "(foo, bar)");
  }
}
