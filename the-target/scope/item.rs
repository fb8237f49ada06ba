use std::sync::Arc;

use super::{
  IterationScope,
  ScopeHandler,
  TargetScope,
};
use crate::{
  context::ResolveContext,
  descriptor::ScopeType,
  document::Document,
  editor::Editor,
  error::Result,
  items::{
    self,
    ItemInfo,
  },
  position::Range,
  target::{
    Target,
    TargetKind,
  },
};

/// Comma separated items of the collection around the selection.
#[derive(Debug, Clone)]
pub struct CollectionItemScopeHandler {
  language_id: String,
}

impl CollectionItemScopeHandler {
  pub fn new(language_id: &str) -> Self {
    Self {
      language_id: language_id.to_string(),
    }
  }

  fn target(editor: &Arc<Editor>, item: &ItemInfo, is_reversed: bool) -> Target {
    let delimiter = items::insertion_delimiter(editor.document(), item.leading, item.trailing);
    Target::delimited(
      editor.clone(),
      TargetKind::CollectionItem,
      item.content,
      (item.leading, item.trailing),
      delimiter,
      is_reversed,
    )
  }

  fn scopes(editor: &Arc<Editor>, infos: &[ItemInfo]) -> Vec<TargetScope> {
    infos
      .iter()
      .map(|item| TargetScope::new(item.domain, Self::target(editor, item, false)))
      .collect()
  }
}

fn length(document: &Document, range: Range) -> usize {
  document.offset_at(range.end) - document.offset_at(range.start)
}

impl ScopeHandler for CollectionItemScopeHandler {
  fn scope_type(&self) -> &ScopeType {
    &ScopeType::CollectionItem
  }

  fn iteration_scope_type(&self) -> ScopeType {
    ScopeType::Line
  }

  /// Items of the collections around both ends of `range`.
  fn candidates(
    &self,
    cx: &ResolveContext,
    editor: &Arc<Editor>,
    range: Range,
  ) -> Result<Vec<TargetScope>> {
    let document = editor.document();
    let mut collections = vec![items::collection(cx, editor, Range::point(range.start))];
    let end = items::collection(cx, editor, Range::point(range.end));
    if !collections.contains(&end) {
      collections.push(end);
    }

    let mut scopes: Vec<TargetScope> = collections
      .into_iter()
      .flat_map(|collection| Self::scopes(editor, &items::items(document, collection)))
      .filter(|scope| scope.domain.intersection(&range).is_some())
      .collect();
    scopes.sort_by_key(|scope| (scope.domain.start, scope.domain.end));
    scopes.dedup_by_key(|scope| scope.domain);
    Ok(scopes)
  }

  fn iteration_scopes(
    &self,
    cx: &ResolveContext,
    editor: &Arc<Editor>,
    range: Range,
  ) -> Result<Vec<IterationScope>> {
    let collection = items::collection(cx, editor, range);
    let infos = items::items(editor.document(), collection);
    Ok(vec![IterationScope {
      domain: collection.range,
      scopes: Self::scopes(editor, &infos),
    }])
  }

  /// Every item whose domain touches `range`, merged into one. When the
  /// leading delimiter is the longer one it is removed instead of the
  /// trailing one.
  fn containing_scope(
    &self,
    cx: &ResolveContext,
    editor: &Arc<Editor>,
    range: Range,
    is_reversed: bool,
  ) -> Result<Option<Target>> {
    let document = editor.document();
    let collection = items::collection(cx, editor, range);
    let infos: Vec<ItemInfo> = items::items(document, collection)
      .into_iter()
      .filter(|item| item.domain.intersection(&range).is_some())
      .collect();

    let (Some(first), Some(last)) = (infos.first(), infos.last()) else {
      tracing::trace!(language_id = %self.language_id, ?range, "no collection item");
      return Ok(None);
    };

    let merged = ItemInfo {
      content:  first.content.union(&last.content),
      domain:   first.domain.union(&last.domain),
      leading:  first.leading,
      trailing: last.trailing,
    };
    let target = Self::target(editor, &merged, is_reversed);

    Ok(Some(match (merged.leading, merged.trailing) {
      (Some(leading), Some(trailing)) if length(document, leading) > length(document, trailing) => {
        target.with_removal_range(merged.content.union(&leading))
      },
      _ => target,
    }))
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    config::TargetConfig,
    target::test::editor,
  };

  fn cx() -> ResolveContext {
    ResolveContext::new(TargetConfig::default()).unwrap()
  }

  #[test]
  fn containing_item_in_a_call() {
    let editor = editor("foo(hello), bar, whatever");
    let target = CollectionItemScopeHandler::new("plaintext")
      .containing_scope(&cx(), &editor, Range::from_coords(0, 13, 0, 13), false)
      .unwrap()
      .unwrap();
    assert_eq!(target.content_text(), "bar");
    assert_eq!(target.delimiter(), Some(", "));
    assert_eq!(target.leading_delimiter(), Some(Range::from_coords(0, 10, 0, 12)));
    assert_eq!(target.trailing_delimiter(), Some(Range::from_coords(0, 15, 0, 17)));
    assert_eq!(target.removal_range(), Range::from_coords(0, 12, 0, 17));
  }

  #[test]
  fn longer_leading_delimiter_is_removed() {
    let editor = editor("[a,   b, c]");
    let target = CollectionItemScopeHandler::new("plaintext")
      .containing_scope(&cx(), &editor, Range::from_coords(0, 6, 0, 6), false)
      .unwrap()
      .unwrap();
    assert_eq!(target.content_text(), "b");
    assert_eq!(target.delimiter(), Some(",   "));
    assert_eq!(target.removal_range(), Range::from_coords(0, 2, 0, 7));
  }

  #[test]
  fn every_item_of_the_collection() {
    let editor = editor("f(a, (b, c), d)");
    let scopes = CollectionItemScopeHandler::new("plaintext")
      .iteration_scopes(&cx(), &editor, Range::from_coords(0, 2, 0, 2))
      .unwrap();
    let texts: Vec<String> = scopes[0]
      .scopes
      .iter()
      .map(|scope| scope.target(false).content_text())
      .collect();
    assert_eq!(texts, ["a", "(b, c)", "d"]);
  }
}
