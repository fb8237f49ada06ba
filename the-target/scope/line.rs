use std::sync::Arc;

use super::{
  IterationScope,
  ScopeHandler,
  TargetScope,
};
use crate::{
  context::ResolveContext,
  descriptor::ScopeType,
  editor::Editor,
  error::Result,
  position::Range,
  target::{
    Target,
    full_lines,
  },
};

#[derive(Debug, Clone, Copy, Default)]
pub struct LineScopeHandler;

impl ScopeHandler for LineScopeHandler {
  fn scope_type(&self) -> &ScopeType {
    &ScopeType::Line
  }

  fn iteration_scope_type(&self) -> ScopeType {
    ScopeType::Document
  }

  fn candidates(
    &self,
    _cx: &ResolveContext,
    editor: &Arc<Editor>,
    range: Range,
  ) -> Result<Vec<TargetScope>> {
    let document = editor.document();
    let last = range.end.line.min(document.line_count().saturating_sub(1));
    Ok(
      (range.start.line..=last)
        .map(|line| {
          let line = document.line_at(line);
          TargetScope::new(line.range, Target::line(editor.clone(), line.range, false))
        })
        .collect(),
    )
  }

  fn include_in_every(&self, scope: &TargetScope) -> bool {
    let document = scope.editor().document();
    !document.line_at(scope.domain.start.line).is_empty_or_whitespace
  }
}

/// Runs of non-blank lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParagraphScopeHandler;

impl ScopeHandler for ParagraphScopeHandler {
  fn scope_type(&self) -> &ScopeType {
    &ScopeType::Paragraph
  }

  fn iteration_scope_type(&self) -> ScopeType {
    ScopeType::Document
  }

  fn candidates(
    &self,
    _cx: &ResolveContext,
    editor: &Arc<Editor>,
    range: Range,
  ) -> Result<Vec<TargetScope>> {
    let document = editor.document();
    let mut scopes = Vec::new();
    let mut first = None;

    for line in 0..=document.line_count() {
      let blank = line == document.line_count() || document.line_at(line).is_empty_or_whitespace;
      match (first, blank) {
        (None, false) => first = Some(line),
        (Some(start), true) => {
          first = None;
          let domain = full_lines(document, start, line - 1);
          if domain.intersection(&range).is_none() {
            continue;
          }
          let content = Range::new(
            document.line_at(start).trimmed_range().start,
            document.line_at(line - 1).trimmed_range().end,
          );
          scopes.push(TargetScope::new(
            domain,
            Target::paragraph(editor.clone(), content, false),
          ));
        },
        _ => (),
      }
    }

    Ok(scopes)
  }
}

/// The whole document, as a single scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentScopeHandler;

impl ScopeHandler for DocumentScopeHandler {
  fn scope_type(&self) -> &ScopeType {
    &ScopeType::Document
  }

  fn iteration_scope_type(&self) -> ScopeType {
    ScopeType::Document
  }

  fn candidates(
    &self,
    _cx: &ResolveContext,
    editor: &Arc<Editor>,
    _range: Range,
  ) -> Result<Vec<TargetScope>> {
    Ok(vec![TargetScope::from_target(Target::whole_document(editor.clone()))])
  }

  fn iteration_scopes(
    &self,
    cx: &ResolveContext,
    editor: &Arc<Editor>,
    range: Range,
  ) -> Result<Vec<IterationScope>> {
    Ok(vec![IterationScope {
      domain: editor.document.range(),
      scopes: self.candidates(cx, editor, range)?,
    }])
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    config::TargetConfig,
    scope::top_level,
    target::test::editor,
  };

  #[test]
  fn paragraphs_trim_indentation() {
    let cx = ResolveContext::new(TargetConfig::default()).unwrap();
    let editor = editor("  a\nb  \n\n\nc");
    let scopes = ParagraphScopeHandler
      .candidates(&cx, &editor, editor.document.range())
      .unwrap();
    assert_eq!(scopes.len(), 2);
    assert_eq!(scopes[0].domain, Range::from_coords(0, 0, 1, 3));
    assert_eq!(scopes[0].target(false).content_range(), Range::from_coords(0, 2, 1, 1));
    assert_eq!(scopes[1].domain, Range::from_coords(4, 0, 4, 1));
  }

  #[test]
  fn blank_lines_are_left_out_of_every() {
    let cx = ResolveContext::new(TargetConfig::default()).unwrap();
    let editor = editor("a\n\nb");
    let scopes = LineScopeHandler
      .candidates(&cx, &editor, editor.document.range())
      .unwrap();
    assert_eq!(scopes.len(), 3);
    let kept: Vec<_> = top_level(scopes)
      .into_iter()
      .filter(|scope| LineScopeHandler.include_in_every(scope))
      .map(|scope| scope.domain.start.line)
      .collect();
    assert_eq!(kept, [0, 2]);
  }
}
