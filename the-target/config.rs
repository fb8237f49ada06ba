//! User-tunable resolution settings.
//!
//! ```toml
//! word-separators = ["_"]
//! visible-line-modulo = 100
//!
//! [surrounding-pair]
//! initial-scan-length = 200
//! max-scan-length = 50000
//! scan-expansion-factor = 3
//!
//! [language.css]
//! word-separators = ["-", "_"]
//! ```

use std::{
  collections::HashMap,
  fs,
  path::Path,
};

use serde::{
  Deserialize,
  Serialize,
};
use thiserror::Error;

use crate::Tendril;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
  #[error("failed to read {path}: {message}")]
  Io { path: String, message: String },
  #[error("failed to parse target config: {0}")]
  Parse(String),
  #[error("invalid target config: {0}")]
  Invalid(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct TargetConfig {
  /// Characters that join the parts of an identifier, e.g. `_` in
  /// `snake_case`.
  pub word_separators:     Vec<Tendril>,
  pub surrounding_pair:    SurroundingPairConfig,
  /// Rows in a visible line-number mark are spoken modulo this value.
  pub visible_line_modulo: usize,
  pub language:            HashMap<String, LanguageConfig>,
}

impl Default for TargetConfig {
  fn default() -> Self {
    Self {
      word_separators:     vec![Tendril::from("_")],
      surrounding_pair:    SurroundingPairConfig::default(),
      visible_line_modulo: 100,
      language:            HashMap::new(),
    }
  }
}

/// Window used when scanning plain text for a delimiter pair. The window
/// starts at `initial_scan_length` chars around the selection and grows by
/// `scan_expansion_factor` until it covers `max_scan_length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct SurroundingPairConfig {
  pub initial_scan_length:   usize,
  pub max_scan_length:       usize,
  pub scan_expansion_factor: usize,
}

impl Default for SurroundingPairConfig {
  fn default() -> Self {
    Self {
      initial_scan_length:   200,
      max_scan_length:       50_000,
      scan_expansion_factor: 3,
    }
  }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct LanguageConfig {
  pub word_separators: Option<Vec<Tendril>>,
}

impl TargetConfig {
  pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
    let config: TargetConfig =
      toml::from_str(source).map_err(|err| ConfigError::Parse(err.to_string()))?;
    config.validate()?;
    Ok(config)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|err| {
      ConfigError::Io {
        path:    path.display().to_string(),
        message: err.to_string(),
      }
    })?;
    let config = Self::from_toml_str(&source)?;
    tracing::debug!(path = %path.display(), "loaded target config");
    Ok(config)
  }

  fn validate(&self) -> Result<(), ConfigError> {
    if self.visible_line_modulo == 0 {
      return Err(ConfigError::Invalid("visible-line-modulo must be positive"));
    }
    let pair = &self.surrounding_pair;
    if pair.initial_scan_length == 0 || pair.scan_expansion_factor < 2 {
      return Err(ConfigError::Invalid(
        "surrounding-pair scan window must start non-empty and grow",
      ));
    }
    Ok(())
  }

  /// Word separators in effect for `language_id`.
  pub fn word_separators(&self, language_id: &str) -> &[Tendril] {
    self
      .language
      .get(language_id)
      .and_then(|language| language.word_separators.as_deref())
      .unwrap_or(&self.word_separators)
  }
}

#[cfg(test)]
mod test {
  use std::io::Write;

  use super::*;

  fn separators<'a>(config: &'a TargetConfig, language_id: &str) -> Vec<&'a str> {
    config
      .word_separators(language_id)
      .iter()
      .map(|separator| separator.as_str())
      .collect()
  }

  #[test]
  fn empty_source_is_default() {
    assert_eq!(TargetConfig::from_toml_str("").unwrap(), TargetConfig::default());
  }

  #[test]
  fn language_overrides_word_separators() {
    let config = TargetConfig::from_toml_str(
      r#"
        visible-line-modulo = 10

        [surrounding-pair]
        max-scan-length = 1000

        [language.css]
        word-separators = ["-", "_"]
      "#,
    )
    .unwrap();

    assert_eq!(config.visible_line_modulo, 10);
    assert_eq!(config.surrounding_pair.max_scan_length, 1000);
    assert_eq!(config.surrounding_pair.initial_scan_length, 200);
    assert_eq!(separators(&config, "css"), ["-", "_"]);
    assert_eq!(separators(&config, "rust"), ["_"]);
  }

  #[test]
  fn rejects_unknown_keys_and_bad_values() {
    assert!(matches!(
      TargetConfig::from_toml_str("word-seperators = []"),
      Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
      TargetConfig::from_toml_str("visible-line-modulo = 0"),
      Err(ConfigError::Invalid(_))
    ));
  }

  #[test]
  fn loads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "word-separators = [\"-\"]").unwrap();
    let config = TargetConfig::load(file.path()).unwrap();
    assert_eq!(separators(&config, "anything"), ["-"]);

    assert!(matches!(
      TargetConfig::load(file.path().with_extension("missing")),
      Err(ConfigError::Io { .. })
    ));
  }
}
