//! Everything a resolution reads from the host.
//!
//! A [`ResolveContext`] is built once per host session. The host swaps in its
//! own collaborators with the `with_*` builders and keeps the active editor
//! current with [`ResolveContext::set_active_editor`] before each command.

use std::sync::Arc;

use crate::{
  config::TargetConfig,
  editor::Editor,
  error::Result,
  hats::{
    HatMap,
    HatTokenMap,
    StoredTargetMap,
    StoredTargets,
  },
  syntax::{
    NoSyntax,
    SyntaxProvider,
    SyntaxTree,
  },
  tokenizer::{
    RegexTokenizer,
    Tokenizer,
  },
  words::WordSplitter,
};

pub struct ResolveContext {
  config:         TargetConfig,
  tokenizer:      Box<dyn Tokenizer>,
  syntax:         Box<dyn SyntaxProvider>,
  hats:           Box<dyn HatTokenMap>,
  stored_targets: Box<dyn StoredTargets>,
  words:          WordSplitter,
  active_editor:  Option<Arc<Editor>>,
}

impl ResolveContext {
  /// A context with the default tokenizer for `config`, no parser, no hats
  /// and nothing stored.
  pub fn new(config: TargetConfig) -> Result<Self> {
    let tokenizer = RegexTokenizer::new(&config)?;
    Ok(Self {
      config,
      tokenizer: Box::new(tokenizer),
      syntax: Box::new(NoSyntax),
      hats: Box::new(HatMap::default()),
      stored_targets: Box::new(StoredTargetMap::default()),
      words: WordSplitter::new(),
      active_editor: None,
    })
  }

  #[must_use]
  pub fn with_tokenizer(mut self, tokenizer: impl Tokenizer + 'static) -> Self {
    self.tokenizer = Box::new(tokenizer);
    self
  }

  #[must_use]
  pub fn with_syntax(mut self, syntax: impl SyntaxProvider + 'static) -> Self {
    self.syntax = Box::new(syntax);
    self
  }

  #[must_use]
  pub fn with_hats(mut self, hats: impl HatTokenMap + 'static) -> Self {
    self.hats = Box::new(hats);
    self
  }

  #[must_use]
  pub fn with_stored_targets(mut self, stored_targets: impl StoredTargets + 'static) -> Self {
    self.stored_targets = Box::new(stored_targets);
    self
  }

  #[must_use]
  pub fn with_active_editor(mut self, editor: Arc<Editor>) -> Self {
    self.active_editor = Some(editor);
    self
  }

  pub fn set_active_editor(&mut self, editor: Option<Arc<Editor>>) {
    self.active_editor = editor;
  }

  #[inline]
  pub fn config(&self) -> &TargetConfig {
    &self.config
  }

  #[inline]
  pub fn tokenizer(&self) -> &dyn Tokenizer {
    self.tokenizer.as_ref()
  }

  #[inline]
  pub fn syntax(&self) -> &dyn SyntaxProvider {
    self.syntax.as_ref()
  }

  #[inline]
  pub fn hats(&self) -> &dyn HatTokenMap {
    self.hats.as_ref()
  }

  #[inline]
  pub fn stored_targets(&self) -> &dyn StoredTargets {
    self.stored_targets.as_ref()
  }

  #[inline]
  pub fn words(&self) -> &WordSplitter {
    &self.words
  }

  #[inline]
  pub fn active_editor(&self) -> Option<&Arc<Editor>> {
    self.active_editor.as_ref()
  }

  /// The parse tree of `editor`'s document, or `None` when its language has
  /// no grammar and callers should scan text instead.
  pub fn syntax_tree(&self, editor: &Editor) -> Option<Arc<SyntaxTree>> {
    match self.syntax.syntax_tree(&editor.document) {
      Ok(tree) => Some(tree),
      Err(err) => {
        tracing::trace!(%err, "falling back to text scanning");
        None
      },
    }
  }
}
