//! Read-only views of host state that outlives a single command: the hats
//! currently drawn over tokens and the targets of the previous command.

use std::{
  collections::HashMap,
  fmt,
  sync::Arc,
};

use crate::{
  Tendril,
  editor::Editor,
  position::Range,
  target::Target,
};

/// A token the host decorated with a hat.
#[derive(Debug, Clone)]
pub struct Token {
  pub editor: Arc<Editor>,
  pub range:  Range,
}

pub trait HatTokenMap {
  /// The token wearing the hat of `style` over `grapheme`.
  fn token(&self, style: &str, grapheme: &str) -> Option<Token>;
}

/// Hats kept in memory, keyed by `(style, grapheme)`.
#[derive(Debug, Default, Clone)]
pub struct HatMap {
  tokens: HashMap<(Tendril, Tendril), Token>,
}

impl HatMap {
  pub fn insert(&mut self, style: &str, grapheme: &str, token: Token) -> Option<Token> {
    self
      .tokens
      .insert((Tendril::from(style), Tendril::from(grapheme)), token)
  }

  pub fn clear(&mut self) {
    self.tokens.clear();
  }
}

impl HatTokenMap for HatMap {
  fn token(&self, style: &str, grapheme: &str) -> Option<Token> {
    self
      .tokens
      .get(&(Tendril::from(style), Tendril::from(grapheme)))
      .cloned()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoredTargetKey {
  That,
  Source,
  /// Ranges that instance modifiers search in.
  InstanceReference,
}

impl StoredTargetKey {
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::That => "that",
      Self::Source => "source",
      Self::InstanceReference => "instanceReference",
    }
  }
}

impl fmt::Display for StoredTargetKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

pub trait StoredTargets {
  /// `None` until the host has stored something under `key`.
  fn get(&self, key: StoredTargetKey) -> Option<Vec<Target>>;
}

#[derive(Debug, Default, Clone)]
pub struct StoredTargetMap {
  targets: HashMap<StoredTargetKey, Vec<Target>>,
}

impl StoredTargetMap {
  pub fn set(&mut self, key: StoredTargetKey, targets: Vec<Target>) {
    self.targets.insert(key, targets);
  }
}

impl StoredTargets for StoredTargetMap {
  fn get(&self, key: StoredTargetKey) -> Option<Vec<Target>> {
    self.targets.get(&key).cloned()
  }
}
