use std::sync::Arc;

use super::{
  IterationScope,
  ScopeHandler,
  TargetScope,
  scopes_in_domain,
};
use crate::{
  context::ResolveContext,
  descriptor::ScopeType,
  editor::Editor,
  error::{
    Result,
    TargetError,
  },
  position::Range,
  syntax::{
    SyntaxTree,
    languages::{
      self,
      Matcher,
      NodeMatch,
    },
  },
  target::{
    Target,
    TargetKind,
    scope_type_delimiter,
  },
};

/// Scopes read off the parse tree through the language's matcher table.
#[derive(Debug, Clone)]
pub struct SyntaxScopeHandler {
  scope_type:  ScopeType,
  language_id: String,
  matcher:     &'static Matcher,
}

impl SyntaxScopeHandler {
  /// `None` when `language_id` has no matcher for `scope_type`.
  pub fn new(scope_type: ScopeType, language_id: &str) -> Option<Self> {
    let matcher = languages::language(language_id).matcher(&scope_type)?;
    Some(Self {
      scope_type,
      language_id: language_id.to_string(),
      matcher,
    })
  }

  fn tree(&self, cx: &ResolveContext, editor: &Editor) -> Result<Arc<SyntaxTree>> {
    cx.syntax_tree(editor).ok_or_else(|| {
      TargetError::UnsupportedLanguage {
        language_id: self.language_id.clone(),
      }
    })
  }

  fn scope(&self, tree: &SyntaxTree, editor: &Arc<Editor>, found: &NodeMatch) -> TargetScope {
    let target = match found.delimiters {
      Some(delimiters) => {
        Target::delimited(
          editor.clone(),
          TargetKind::Scope(self.scope_type.clone()),
          found.content,
          delimiters,
          scope_type_delimiter(&self.scope_type),
          false,
        )
      },
      None => Target::scope(editor.clone(), self.scope_type.clone(), found.content, false),
    };
    TargetScope::new(tree.range(found.node), target)
  }
}

impl ScopeHandler for SyntaxScopeHandler {
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
    let tree = self.tree(cx, editor)?;
    Ok(
      self
        .matcher
        .find_all(&tree)
        .iter()
        .filter(|found| tree.range(found.node).intersection(&range).is_some())
        .map(|found| self.scope(&tree, editor, found))
        .collect(),
    )
  }

  /// Siblings are the matches directly under the node that holds the
  /// containing match, then under each of its ancestors in turn.
  fn iteration_scopes(
    &self,
    cx: &ResolveContext,
    editor: &Arc<Editor>,
    range: Range,
  ) -> Result<Vec<IterationScope>> {
    let tree = self.tree(cx, editor)?;
    let node = tree.node_at(range);

    let containing = tree.ancestors(node).find(|&ancestor| {
      self
        .matcher
        .find(&tree, ancestor)
        .is_some_and(|found| tree.range(found.node).contains_range(&range))
    });
    let start = match containing.and_then(|ancestor| self.matcher.find(&tree, ancestor)) {
      Some(found) => tree.parent(found.node),
      None => Some(node),
    };

    let mut domains: Vec<Range> = start
      .into_iter()
      .flat_map(|start| tree.ancestors(start))
      .filter(|&ancestor| tree.node(ancestor).is_named)
      .map(|ancestor| tree.range(ancestor))
      .collect();
    domains.push(editor.document.range());
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
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    config::TargetConfig,
    document::DocumentId,
    syntax::{
      SyntaxTrees,
      test::function_tree,
    },
    target::test::editor_in,
  };

  fn cx() -> ResolveContext {
    let mut trees = SyntaxTrees::default();
    trees.insert(DocumentId::new(1), function_tree());
    ResolveContext::new(TargetConfig::default())
      .unwrap()
      .with_syntax(trees)
  }

  #[test]
  fn containing_statement_and_function() {
    let cx = cx();
    let editor = editor_in("typescript", "function foo() {\n  return 1;\n}");
    let at = Range::from_coords(1, 9, 1, 9);

    let statement = SyntaxScopeHandler::new(ScopeType::Statement, "typescript").unwrap();
    let target = statement
      .containing_scope(&cx, &editor, at, false)
      .unwrap()
      .unwrap();
    assert_eq!(target.content_range(), Range::from_coords(1, 2, 1, 11));
    assert_eq!(target.delimiter(), Some("\n"));

    let function = SyntaxScopeHandler::new(ScopeType::NamedFunction, "typescript").unwrap();
    let target = function
      .containing_scope(&cx, &editor, at, false)
      .unwrap()
      .unwrap();
    assert_eq!(target.content_range(), Range::from_coords(0, 0, 2, 1));
  }

  #[test]
  fn statements_iterate_within_their_block() {
    let cx = cx();
    let editor = editor_in("typescript", "function foo() {\n  return 1;\n}");
    let statement = SyntaxScopeHandler::new(ScopeType::Statement, "typescript").unwrap();
    let scopes = statement
      .iteration_scopes(&cx, &editor, Range::from_coords(1, 9, 1, 9))
      .unwrap();
    assert_eq!(scopes[0].domain, Range::from_coords(0, 15, 2, 1));
    assert_eq!(scopes[0].scopes.len(), 1);
    assert_eq!(scopes.last().unwrap().scopes.len(), 1);
  }

  #[test]
  fn missing_tree_is_unsupported_language() {
    let cx = ResolveContext::new(TargetConfig::default()).unwrap();
    let editor = editor_in("typescript", "let a = 1;");
    let statement = SyntaxScopeHandler::new(ScopeType::Statement, "typescript").unwrap();
    let err = statement
      .containing_scope(&cx, &editor, Range::from_coords(0, 0, 0, 0), false)
      .unwrap_err();
    assert!(matches!(err, TargetError::UnsupportedLanguage { .. }));
    assert!(err.is_recoverable());
  }
}
