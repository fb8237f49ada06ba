//! Splitting a line of text into tokens.
//!
//! The default [`RegexTokenizer`] tries, at each non-whitespace position and
//! in order:
//!
//! 1. a fixed multi-character operator (`!==`, `=>`, `/*`, `<!--`, ...),
//! 2. a decimal number such as `2.5` that is not part of a dotted version,
//! 3. an identifier: letters, marks and digits joined by the configured word
//!    separators,
//! 4. a run of one repeatable symbol (`---`, `::`, `|||`),
//! 5. a single grapheme.
//!
//! ```
//! use the_target::{config::TargetConfig, tokenizer::{RegexTokenizer, Tokenizer}};
//!
//! let tokenizer = RegexTokenizer::new(&TargetConfig::default()).unwrap();
//! let tokens: Vec<_> = tokenizer
//!   .tokens("my::variable != 1.22.4", "rust")
//!   .into_iter()
//!   .map(|token| token.text)
//!   .collect();
//! assert_eq!(tokens, ["my", "::", "variable", "!=", "1", ".", "22", ".", "4"]);
//! ```

use std::collections::HashMap;

use regex::Regex;
use the_core::chars::{
  char_is_line_ending,
  char_is_whitespace,
};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
  Tendril,
  config::TargetConfig,
  error::{
    Result,
    TargetError,
  },
};

const FIXED_TOKENS: &[&str] = &[
  "!==", "!=", "+=", "-=", "*=", "/=", "%=", "<=", ">=", "=>", "->", "??", "\"\"\"", "```", "/*",
  "*/", "<!--", "-->",
];

const REPEATABLE_SYMBOLS: &[char] = &['-', '+', '*', '/', '=', '<', '>', '_', '#', '.', '|', '&', ':'];

/// A token found on a single line. Offsets count chars from the line start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatch {
  pub start: usize,
  pub end:   usize,
  pub text:  String,
}

pub trait Tokenizer: Send + Sync {
  /// Tokens of one line of `language_id` text, left to right.
  fn tokens(&self, line: &str, language_id: &str) -> Vec<TokenMatch>;

  /// Whether `text` is a single identifier in `language_id`.
  fn is_identifier(&self, text: &str, language_id: &str) -> bool;
}

#[derive(Debug, Clone)]
struct LanguageMatcher {
  identifier:      Regex,
  full_identifier: Regex,
}

impl LanguageMatcher {
  fn new(separators: &[Tendril]) -> Result<Self> {
    let body = identifier_pattern(separators);
    let compile = |pattern: String| {
      Regex::new(&pattern).map_err(|err| {
        TargetError::InvalidPattern {
          pattern,
          reason: err.to_string(),
        }
      })
    };

    Ok(Self {
      identifier:      compile(format!("^{body}"))?,
      full_identifier: compile(format!("^{body}$"))?,
    })
  }
}

fn identifier_pattern(separators: &[Tendril]) -> String {
  const WORD: &str = r"[\p{L}\p{M}\p{N}]+";

  if separators.is_empty() {
    return WORD.to_string();
  }

  let separator = separators
    .iter()
    .map(|separator| regex::escape(separator))
    .collect::<Vec<_>>()
    .join("|");
  format!("(?:{separator})*{WORD}(?:(?:{separator})+{WORD})*")
}

#[derive(Debug, Clone)]
pub struct RegexTokenizer {
  default:   LanguageMatcher,
  languages: HashMap<String, LanguageMatcher>,
  decimal:   Regex,
}

impl RegexTokenizer {
  pub fn new(config: &TargetConfig) -> Result<Self> {
    let default = LanguageMatcher::new(&config.word_separators)?;
    let languages = config
      .language
      .iter()
      .filter_map(|(language_id, language)| {
        language
          .word_separators
          .as_deref()
          .map(|separators| (language_id, separators))
      })
      .map(|(language_id, separators)| {
        LanguageMatcher::new(separators).map(|matcher| (language_id.clone(), matcher))
      })
      .collect::<Result<_>>()?;

    Ok(Self {
      default,
      languages,
      decimal: Regex::new(r"^[0-9]+\.[0-9]+").map_err(|err| {
        TargetError::InvalidPattern {
          pattern: "decimal".into(),
          reason:  err.to_string(),
        }
      })?,
    })
  }

  fn matcher(&self, language_id: &str) -> &LanguageMatcher {
    self.languages.get(language_id).unwrap_or(&self.default)
  }

  /// Byte length of the token starting at `rest`. `previous` is the char
  /// right before it.
  fn token_len(&self, matcher: &LanguageMatcher, rest: &str, previous: Option<char>) -> usize {
    if let Some(fixed) = FIXED_TOKENS.iter().find(|fixed| rest.starts_with(**fixed)) {
      return fixed.len();
    }

    if !previous.is_some_and(|ch| ch == '.' || ch.is_ascii_digit())
      && let Some(number) = self.decimal.find(rest)
      && !rest[number.end()..]
        .chars()
        .next()
        .is_some_and(|ch| ch == '.' || ch.is_ascii_digit())
    {
      return number.end();
    }

    if let Some(identifier) = matcher.identifier.find(rest) {
      return identifier.end();
    }

    let mut chars = rest.chars();
    if let Some(first) = chars.next()
      && REPEATABLE_SYMBOLS.contains(&first)
    {
      return first.len_utf8() * (1 + chars.take_while(|&ch| ch == first).count());
    }

    rest.graphemes(true).next().map_or(0, str::len)
  }
}

impl Tokenizer for RegexTokenizer {
  fn tokens(&self, line: &str, language_id: &str) -> Vec<TokenMatch> {
    let matcher = self.matcher(language_id);
    let mut tokens = Vec::new();
    let mut byte = 0;
    let mut char_offset = 0;
    let mut previous = None;

    while let Some(ch) = line[byte..].chars().next() {
      if char_is_whitespace(ch) || char_is_line_ending(ch) {
        byte += ch.len_utf8();
        char_offset += 1;
        previous = Some(ch);
        continue;
      }

      let len = self.token_len(matcher, &line[byte..], previous).max(ch.len_utf8());
      let text = &line[byte..byte + len];
      let chars = text.chars().count();
      tokens.push(TokenMatch {
        start: char_offset,
        end:   char_offset + chars,
        text:  text.to_string(),
      });

      previous = text.chars().next_back();
      byte += len;
      char_offset += chars;
    }

    tokens
  }

  fn is_identifier(&self, text: &str, language_id: &str) -> bool {
    self.matcher(language_id).full_identifier.is_match(text)
  }
}
