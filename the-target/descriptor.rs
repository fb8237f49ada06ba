//! The descriptor schema: what a command says it wants to act on.
//!
//! Descriptors come from the grammar layer as JSON-style tagged unions. The
//! `type` field selects the variant and all keys are camelCase:
//!
//! ```
//! use the_target::descriptor::{Mark, Modifier, ScopeType, TargetDescriptor};
//!
//! let json = r#"{
//!   "type": "primitive",
//!   "mark": { "type": "cursor" },
//!   "modifiers": [{ "type": "containingScope", "scopeType": { "type": "namedFunction" } }]
//! }"#;
//! let descriptor: TargetDescriptor = serde_json::from_str(json).unwrap();
//! let TargetDescriptor::Primitive(primitive) = descriptor else { panic!() };
//! assert_eq!(primitive.mark, Mark::Cursor);
//! assert_eq!(primitive.modifiers, vec![Modifier::ContainingScope {
//!   scope_type: ScopeType::NamedFunction,
//! }]);
//! ```

use std::fmt;

use serde::{
  Deserialize,
  Serialize,
};

use crate::Tendril;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mark {
  /// One target per current selection.
  #[default]
  Cursor,
  /// The token under the primary cursor.
  CursorToken,
  /// The token decorated with a hat of the given style.
  DecoratedSymbol {
    #[serde(alias = "hatStyle")]
    symbol_color: Tendril,
    character:    Tendril,
  },
  That,
  Source,
  LineNumber {
    anchor: LineNumber,
    active: LineNumber,
  },
  Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineNumber {
  #[serde(rename = "type")]
  pub kind:        LineNumberType,
  pub line_number: isize,
}

impl LineNumber {
  pub const fn absolute(line_number: isize) -> Self {
    Self {
      kind: LineNumberType::Absolute,
      line_number,
    }
  }

  pub const fn relative(line_number: isize) -> Self {
    Self {
      kind: LineNumberType::Relative,
      line_number,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineNumberType {
  Absolute,
  /// Relative to the active line of the primary selection.
  Relative,
  /// The visible row whose line number ends in the given digits.
  #[serde(rename = "modulo100")]
  Modulo100,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SurroundingPairName {
  AngleBrackets,
  BacktickQuotes,
  CurlyBrackets,
  DoubleQuotes,
  EscapedDoubleQuotes,
  EscapedParentheses,
  EscapedSingleQuotes,
  EscapedSquareBrackets,
  Parentheses,
  SingleQuotes,
  SquareBrackets,
  TripleDoubleQuotes,
  TripleSingleQuotes,
  /// Any quote.
  String,
  /// Any bracket.
  Any,
  /// The brackets that enclose collections: parens, squares and curlies.
  CollectionBoundary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SurroundingPairDirection {
  Left,
  Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DelimiterInclusion {
  InteriorOnly,
  ExcludeInterior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
  Forward,
  Backward,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ScopeType {
  ArgumentOrParameter,
  AnonymousFunction,
  Attribute,
  Branch,
  Class,
  ClassName,
  CollectionItem,
  CollectionKey,
  Comment,
  FunctionCall,
  FunctionCallee,
  FunctionName,
  IfStatement,
  Instance,
  List,
  Map,
  Name,
  NamedFunction,
  RegularExpression,
  Statement,
  String,
  Type,
  Value,
  Condition,
  Section,
  Selector,
  Unit,
  XmlBothTags,
  XmlElement,
  XmlEndTag,
  XmlStartTag,

  Character,
  Word,
  Token,
  Identifier,
  Line,
  Paragraph,
  Document,
  NonWhitespaceSequence,
  Url,

  SurroundingPair {
    delimiter:                  SurroundingPairName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    force_direction:            Option<SurroundingPairDirection>,
    #[serde(default)]
    require_strong_containment: bool,
  },
  CustomRegex {
    regex: String,
  },
  OneOf {
    scope_types: Vec<ScopeType>,
  },
}

impl ScopeType {
  pub const fn surrounding_pair(delimiter: SurroundingPairName) -> Self {
    Self::SurroundingPair {
      delimiter,
      force_direction: None,
      require_strong_containment: false,
    }
  }

  /// The `type` tag.
  pub const fn name(&self) -> &'static str {
    match self {
      Self::ArgumentOrParameter => "argumentOrParameter",
      Self::AnonymousFunction => "anonymousFunction",
      Self::Attribute => "attribute",
      Self::Branch => "branch",
      Self::Class => "class",
      Self::ClassName => "className",
      Self::CollectionItem => "collectionItem",
      Self::CollectionKey => "collectionKey",
      Self::Comment => "comment",
      Self::FunctionCall => "functionCall",
      Self::FunctionCallee => "functionCallee",
      Self::FunctionName => "functionName",
      Self::IfStatement => "ifStatement",
      Self::Instance => "instance",
      Self::List => "list",
      Self::Map => "map",
      Self::Name => "name",
      Self::NamedFunction => "namedFunction",
      Self::RegularExpression => "regularExpression",
      Self::Statement => "statement",
      Self::String => "string",
      Self::Type => "type",
      Self::Value => "value",
      Self::Condition => "condition",
      Self::Section => "section",
      Self::Selector => "selector",
      Self::Unit => "unit",
      Self::XmlBothTags => "xmlBothTags",
      Self::XmlElement => "xmlElement",
      Self::XmlEndTag => "xmlEndTag",
      Self::XmlStartTag => "xmlStartTag",
      Self::Character => "character",
      Self::Word => "word",
      Self::Token => "token",
      Self::Identifier => "identifier",
      Self::Line => "line",
      Self::Paragraph => "paragraph",
      Self::Document => "document",
      Self::NonWhitespaceSequence => "nonWhitespaceSequence",
      Self::Url => "url",
      Self::SurroundingPair { .. } => "surroundingPair",
      Self::CustomRegex { .. } => "customRegex",
      Self::OneOf { .. } => "oneOf",
    }
  }

  /// Scope types answered by the parse tree rather than by the text.
  pub const fn is_syntactic(&self) -> bool {
    !matches!(
      self,
      Self::CollectionItem
        | Self::Character
        | Self::Word
        | Self::Token
        | Self::Identifier
        | Self::Line
        | Self::Paragraph
        | Self::Document
        | Self::NonWhitespaceSequence
        | Self::Url
        | Self::SurroundingPair { .. }
        | Self::CustomRegex { .. }
        | Self::OneOf { .. }
    )
  }
}

impl fmt::Display for ScopeType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::SurroundingPair { delimiter, .. } => write!(f, "surroundingPair({delimiter:?})"),
      Self::CustomRegex { regex } => write!(f, "customRegex({regex})"),
      _ => f.write_str(self.name()),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PositionKind {
  Before,
  After,
  Start,
  End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PieceType {
  Word,
  Character,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Modifier {
  Position {
    position: PositionKind,
  },
  ContainingScope {
    scope_type: ScopeType,
  },
  EveryScope {
    scope_type: ScopeType,
  },
  /// The containing scope, else the nearest one.
  PreferredScope {
    scope_type: ScopeType,
  },
  ContiguousScope {
    scope_type: ScopeType,
  },
  OrdinalScope {
    scope_type: ScopeType,
    /// Counts from the end of the iteration scope when negative.
    start:      isize,
    length:     usize,
    #[serde(default)]
    is_every:   bool,
  },
  RelativeScope {
    scope_type: ScopeType,
    offset:     usize,
    length:     usize,
    direction:  Direction,
    #[serde(default)]
    is_every:   bool,
  },
  SurroundingPair {
    delimiter:           SurroundingPairName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    delimiter_inclusion: Option<DelimiterInclusion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    force_direction:     Option<SurroundingPairDirection>,
  },
  InteriorOnly,
  ExcludeInterior,
  Leading,
  Trailing,
  #[serde(rename = "extendThroughStartOf", alias = "head")]
  Head {
    #[serde(default)]
    modifiers: Vec<Modifier>,
  },
  #[serde(rename = "extendThroughEndOf", alias = "tail")]
  Tail {
    #[serde(default)]
    modifiers: Vec<Modifier>,
  },
  Subpiece {
    piece_type:     PieceType,
    anchor:         isize,
    active:         isize,
    #[serde(default)]
    exclude_anchor: bool,
    #[serde(default)]
    exclude_active: bool,
  },
  ToRawSelection,
  ModifyIfUntyped {
    modifier: Box<Modifier>,
  },
  ModifyIfWeak {
    modifier: Box<Modifier>,
  },
  Cascading {
    modifiers: Vec<Modifier>,
  },
  Range {
    anchor:         Box<Modifier>,
    active:         Box<Modifier>,
    #[serde(default)]
    exclude_anchor: bool,
    #[serde(default)]
    exclude_active: bool,
  },
  KeepContentFilter,
  KeepEmptyFilter,
  Visible,
}

impl Modifier {
  pub fn containing(scope_type: ScopeType) -> Self {
    Self::ContainingScope { scope_type }
  }

  pub fn every(scope_type: ScopeType) -> Self {
    Self::EveryScope { scope_type }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RangeType {
  #[default]
  Continuous,
  /// One target per line, keeping the anchor's columns.
  Vertical,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimitiveTargetDescriptor {
  #[serde(default)]
  pub mark:      Mark,
  /// Outermost first, as spoken.
  #[serde(default)]
  pub modifiers: Vec<Modifier>,
}

impl PrimitiveTargetDescriptor {
  pub fn new(mark: Mark, modifiers: Vec<Modifier>) -> Self {
    Self { mark, modifiers }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeTargetDescriptor {
  pub anchor:         PrimitiveTargetDescriptor,
  pub active:         PrimitiveTargetDescriptor,
  #[serde(default)]
  pub exclude_anchor: bool,
  #[serde(default)]
  pub exclude_active: bool,
  #[serde(default)]
  pub range_type:     RangeType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TargetDescriptor {
  Primitive(PrimitiveTargetDescriptor),
  Range(RangeTargetDescriptor),
  List { elements: Vec<TargetDescriptor> },
}

impl From<PrimitiveTargetDescriptor> for TargetDescriptor {
  fn from(value: PrimitiveTargetDescriptor) -> Self {
    Self::Primitive(value)
  }
}

impl From<RangeTargetDescriptor> for TargetDescriptor {
  fn from(value: RangeTargetDescriptor) -> Self {
    Self::Range(value)
  }
}

#[cfg(test)]
mod test {
  use serde_json::json;

  use super::*;

  #[test]
  fn parses_nested_modifiers() {
    let modifier: Modifier = serde_json::from_value(json!({
      "type": "cascading",
      "modifiers": [
        { "type": "ordinalScope", "scopeType": { "type": "token" }, "start": -1, "length": 1 },
        {
          "type": "modifyIfUntyped",
          "modifier": {
            "type": "containingScope",
            "scopeType": { "type": "surroundingPair", "delimiter": "any" }
          }
        }
      ]
    }))
    .unwrap();

    assert_eq!(modifier, Modifier::Cascading {
      modifiers: vec![
        Modifier::OrdinalScope {
          scope_type: ScopeType::Token,
          start:      -1,
          length:     1,
          is_every:   false,
        },
        Modifier::ModifyIfUntyped {
          modifier: Box::new(Modifier::containing(ScopeType::surrounding_pair(
            SurroundingPairName::Any,
          ))),
        },
      ],
    });
  }

  #[test]
  fn parses_marks_and_ranges() {
    let descriptor: TargetDescriptor = serde_json::from_value(json!({
      "type": "list",
      "elements": [
        {
          "type": "range",
          "anchor": { "mark": { "type": "decoratedSymbol", "symbolColor": "blue", "character": "a" } },
          "active": {
            "mark": {
              "type": "lineNumber",
              "anchor": { "type": "modulo100", "lineNumber": 12 },
              "active": { "type": "relative", "lineNumber": -2 }
            }
          },
          "excludeActive": true,
          "rangeType": "vertical"
        },
        { "type": "primitive", "mark": { "type": "that" }, "modifiers": [{ "type": "head" }] }
      ]
    }))
    .unwrap();

    let TargetDescriptor::List { elements } = descriptor else {
      panic!("expected list");
    };
    let TargetDescriptor::Range(range) = &elements[0] else {
      panic!("expected range");
    };
    assert_eq!(range.range_type, RangeType::Vertical);
    assert!(range.exclude_active && !range.exclude_anchor);
    assert_eq!(range.active.mark, Mark::LineNumber {
      anchor: LineNumber {
        kind:        LineNumberType::Modulo100,
        line_number: 12,
      },
      active: LineNumber::relative(-2),
    });
    assert_eq!(
      elements[1],
      TargetDescriptor::Primitive(PrimitiveTargetDescriptor::new(Mark::That, vec![
        Modifier::Head { modifiers: vec![] }
      ]))
    );
  }

  #[test]
  fn scope_type_names_match_tags() {
    for scope_type in [
      ScopeType::NamedFunction,
      ScopeType::NonWhitespaceSequence,
      ScopeType::XmlBothTags,
      ScopeType::surrounding_pair(SurroundingPairName::Parentheses),
    ] {
      let value = serde_json::to_value(&scope_type).unwrap();
      assert_eq!(value["type"], scope_type.name());
    }
    assert!(ScopeType::Statement.is_syntactic());
    assert!(!ScopeType::Line.is_syntactic());
  }
}
