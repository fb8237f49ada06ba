use std::sync::Arc;

use the_core::{
  chars::categorize_grapheme,
  grapheme::graphemes,
};

use super::{
  ScopeHandler,
  TargetScope,
  token::line_tokens,
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
  target::{
    Target,
    TargetKind,
  },
};

/// Grapheme clusters, line breaks excluded.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharacterScopeHandler;

impl ScopeHandler for CharacterScopeHandler {
  fn scope_type(&self) -> &ScopeType {
    &ScopeType::Character
  }

  fn iteration_scope_type(&self) -> ScopeType {
    ScopeType::Token
  }

  fn candidates(
    &self,
    _cx: &ResolveContext,
    editor: &Arc<Editor>,
    range: Range,
  ) -> Result<Vec<TargetScope>> {
    let document = editor.document();
    let last = range.end.line.min(document.line_count().saturating_sub(1));
    let mut scopes = Vec::new();

    for line in range.start.line..=last {
      let text = document.line_at(line).text;
      for (start, grapheme) in graphemes(&text) {
        let domain = Range::from_coords(line, start, line, start + grapheme.chars().count());
        if domain.intersection(&range).is_some() {
          scopes.push(TargetScope::new(domain, Target::plain(editor.clone(), domain, false)));
        }
      }
    }

    Ok(scopes)
  }

  fn is_preferred_over(&self, _cx: &ResolveContext, a: &TargetScope, b: &TargetScope) -> Option<bool> {
    let category = |scope: &TargetScope| {
      categorize_grapheme(&scope.editor().document.text_in(scope.domain)).preference()
    };
    let (a, b) = (category(a), category(b));
    (a != b).then_some(a > b)
  }
}

/// The words of identifiers, split on case changes and separators.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordScopeHandler;

impl ScopeHandler for WordScopeHandler {
  fn scope_type(&self) -> &ScopeType {
    &ScopeType::Word
  }

  fn iteration_scope_type(&self) -> ScopeType {
    ScopeType::Token
  }

  fn candidates(
    &self,
    cx: &ResolveContext,
    editor: &Arc<Editor>,
    range: Range,
  ) -> Result<Vec<TargetScope>> {
    let mut scopes = Vec::new();

    for (token, _) in line_tokens(cx, editor, range) {
      if token.intersection(&range).is_none() {
        continue;
      }
      let text = editor.document.text_in(token);
      let words = cx.words().word_ranges(&text);
      for index in 0..words.len() {
        let target = word_target(editor, token, &words, index, index, false);
        if target.content_range().intersection(&range).is_some() {
          scopes.push(TargetScope::from_target(target));
        }
      }
    }

    Ok(scopes)
  }
}

/// Words `first..=last` of `words`, char spans inside the single line
/// `token`, as one target. The gaps to the neighbouring words become its
/// delimiters.
pub(crate) fn word_target(
  editor: &Arc<Editor>,
  token: Range,
  words: &[(usize, usize)],
  first: usize,
  last: usize,
  is_reversed: bool,
) -> Target {
  let line = token.start.line;
  let at = |offset: usize| Position::new(line, token.start.character + offset);
  let (start, end) = (words[first].0, words[last].1);

  let leading = first
    .checked_sub(1)
    .map(|previous| Range::new(at(words[previous].1), at(start)))
    .filter(|gap| !gap.is_empty());
  let trailing = words
    .get(last + 1)
    .map(|next| Range::new(at(end), at(next.0)))
    .filter(|gap| !gap.is_empty());

  let delimiter = leading
    .or(trailing)
    .map(|gap| editor.document.text_in(gap))
    .unwrap_or_default();

  Target::delimited(
    editor.clone(),
    TargetKind::SubTokenWord,
    Range::new(at(start), at(end)),
    (leading, trailing),
    delimiter,
    is_reversed,
  )
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    config::TargetConfig,
    target::test::editor,
  };

  #[test]
  fn snake_case_words_remove_one_separator() {
    let cx = ResolveContext::new(TargetConfig::default()).unwrap();
    let editor = editor("x = my_long_name");
    let scopes = WordScopeHandler
      .candidates(&cx, &editor, Range::from_coords(0, 4, 0, 16))
      .unwrap();
    let texts: Vec<String> = scopes
      .iter()
      .map(|scope| scope.target(false).content_text())
      .collect();
    assert_eq!(texts, ["my", "long", "name"]);

    let long = scopes[1].target(false);
    assert_eq!(long.delimiter(), Some("_"));
    assert_eq!(long.removal_range(), Range::from_coords(0, 7, 0, 12));
    let name = scopes[2].target(false);
    assert_eq!(name.removal_range(), Range::from_coords(0, 11, 0, 16));
  }

  #[test]
  fn camel_case_words_have_no_delimiter() {
    let editor = editor("fooBar");
    let target = word_target(&editor, Range::from_coords(0, 0, 0, 6), &[(0, 3), (3, 6)], 1, 1, false);
    assert_eq!(target.content_text(), "Bar");
    assert_eq!(target.delimiter(), Some(""));
    assert_eq!(target.leading_delimiter(), None);
  }

  #[test]
  fn characters_prefer_word_characters() {
    let cx = ResolveContext::new(TargetConfig::default()).unwrap();
    let editor = editor("a.b");
    let target = CharacterScopeHandler
      .containing_scope(&cx, &editor, Range::from_coords(0, 1, 0, 1), false)
      .unwrap()
      .unwrap();
    assert_eq!(target.content_text(), "a");
  }
}
