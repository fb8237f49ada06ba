use std::sync::Arc;

use super::{
  ScopeHandler,
  TargetScope,
};
use crate::{
  context::ResolveContext,
  descriptor::ScopeType,
  editor::Editor,
  error::Result,
  position::{
    Position,
    Range,
  },
  target::Target,
};

/// Tokens, or only the identifier tokens.
#[derive(Debug, Clone)]
pub struct TokenScopeHandler {
  scope_type:       ScopeType,
  identifiers_only: bool,
}

impl TokenScopeHandler {
  pub fn tokens() -> Self {
    Self {
      scope_type:       ScopeType::Token,
      identifiers_only: false,
    }
  }

  pub fn identifiers() -> Self {
    Self {
      scope_type:       ScopeType::Identifier,
      identifiers_only: true,
    }
  }
}

/// Token ranges on lines `range.start.line..=range.end.line`, with
/// whether each token is an identifier.
pub(crate) fn line_tokens(cx: &ResolveContext, editor: &Editor, range: Range) -> Vec<(Range, bool)> {
  let document = editor.document();
  let language_id = document.language_id();
  let last = range.end.line.min(document.line_count().saturating_sub(1));

  (range.start.line..=last)
    .flat_map(|line| {
      let text = document.line_at(line).text;
      cx.tokenizer()
        .tokens(&text, language_id)
        .into_iter()
        .map(move |token| {
          (
            Range::new(Position::new(line, token.start), Position::new(line, token.end)),
            cx.tokenizer().is_identifier(&token.text, language_id),
          )
        })
        .collect::<Vec<_>>()
    })
    .collect()
}

impl ScopeHandler for TokenScopeHandler {
  fn scope_type(&self) -> &ScopeType {
    &self.scope_type
  }

  fn iteration_scope_type(&self) -> ScopeType {
    ScopeType::Line
  }

  fn candidates(
    &self,
    cx: &ResolveContext,
    editor: &Arc<Editor>,
    range: Range,
  ) -> Result<Vec<TargetScope>> {
    Ok(
      line_tokens(cx, editor, range)
        .into_iter()
        .filter(|(_, is_identifier)| *is_identifier || !self.identifiers_only)
        .map(|(token, _)| token)
        .filter(|token| token.intersection(&range).is_some())
        .map(|token| TargetScope::from_target(Target::token(editor.clone(), token, false)))
        .collect(),
    )
  }

  fn is_preferred_over(&self, cx: &ResolveContext, a: &TargetScope, b: &TargetScope) -> Option<bool> {
    let language_id = a.editor().document.language_id();
    let is_identifier = |scope: &TargetScope| {
      let text = scope.editor().document.text_in(scope.domain);
      cx.tokenizer().is_identifier(&text, language_id)
    };
    match (is_identifier(a), is_identifier(b)) {
      (true, false) => Some(true),
      (false, true) => Some(false),
      _ => None,
    }
  }
}
