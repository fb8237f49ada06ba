use std::sync::Arc;

use regex::Regex;

use super::{
  ScopeHandler,
  TargetScope,
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
  target::Target,
};

const NON_WHITESPACE_SEQUENCE: &str = r"\S+";
const URL: &str = r"(?i)(?:https?|ftp|file)://[-\w+&@#/%?=~|!:,.;']*[-\w+&@#/%=~|]|www\.[-\w+&@#/%?=~|!:,.;']*[-\w+&@#/%=~|]";

/// Scopes found by matching a regex against each line.
#[derive(Debug, Clone)]
pub struct RegexScopeHandler {
  scope_type: ScopeType,
  regex:      Regex,
}

impl RegexScopeHandler {
  pub fn new(scope_type: ScopeType) -> Result<Self> {
    let pattern = match &scope_type {
      ScopeType::Url => URL,
      ScopeType::CustomRegex { regex } => regex.as_str(),
      _ => NON_WHITESPACE_SEQUENCE,
    };
    let regex = Regex::new(pattern).map_err(|err| {
      TargetError::InvalidPattern {
        pattern: pattern.to_string(),
        reason:  err.to_string(),
      }
    })?;
    Ok(Self { scope_type, regex })
  }
}

impl ScopeHandler for RegexScopeHandler {
  fn scope_type(&self) -> &ScopeType {
    &self.scope_type
  }

  fn iteration_scope_type(&self) -> ScopeType {
    ScopeType::Line
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
      for found in self.regex.find_iter(&text) {
        if found.is_empty() {
          continue;
        }
        let start = text[..found.start()].chars().count();
        let end = start + found.as_str().chars().count();
        let domain = Range::from_coords(line, start, line, end);
        if domain.intersection(&range).is_some() {
          scopes.push(TargetScope::new(
            domain,
            Target::scope(editor.clone(), self.scope_type.clone(), domain, false),
          ));
        }
      }
    }

    Ok(scopes)
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    config::TargetConfig,
    target::test::editor,
  };

  fn texts(scope_type: ScopeType, text: &str) -> Vec<String> {
    let cx = ResolveContext::new(TargetConfig::default()).unwrap();
    let editor = editor(text);
    RegexScopeHandler::new(scope_type)
      .unwrap()
      .candidates(&cx, &editor, editor.document.range())
      .unwrap()
      .into_iter()
      .map(|scope| scope.target(false).content_text())
      .collect()
  }

  #[test]
  fn finds_urls_and_sequences() {
    assert_eq!(
      texts(ScopeType::Url, "see https://example.com/a?b=1, or www.rust-lang.org."),
      ["https://example.com/a?b=1", "www.rust-lang.org"]
    );
    assert_eq!(texts(ScopeType::NonWhitespaceSequence, "a.b  c\nd"), ["a.b", "c", "d"]);
  }

  #[test]
  fn custom_regex() {
    let scope_type = ScopeType::CustomRegex {
      regex: "[0-9]+".into(),
    };
    assert_eq!(texts(scope_type, "a1 b22"), ["1", "22"]);
    assert!(matches!(
      RegexScopeHandler::new(ScopeType::CustomRegex { regex: "(".into() }),
      Err(TargetError::InvalidPattern { .. })
    ));
  }
}
