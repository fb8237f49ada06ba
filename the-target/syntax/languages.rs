//! Per-language tables mapping scope types to node matchers.

use std::{
  collections::HashMap,
  sync::OnceLock,
};

use super::{
  NodeId,
  SyntaxTree,
  pattern::PatternFinder,
};
use crate::{
  descriptor::ScopeType,
  position::Range,
};

/// A scope instance found in a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeMatch {
  /// The node the matcher accepted. Its range is the scope's domain.
  pub node:       NodeId,
  pub content:    Range,
  /// Separator ranges around list elements such as arguments.
  pub delimiters: Option<(Option<Range>, Option<Range>)>,
}

#[derive(Debug, Clone)]
pub enum Matcher {
  Patterns(PatternFinder),
  /// A named element of a bracketed, comma separated list whose parent is
  /// one of `parents`.
  Argument { parents: &'static [&'static str] },
  /// Like `Patterns`, dropping one layer of parentheses around the result.
  Condition(PatternFinder),
}

const BRACKETS: &[&str] = &["(", ")", "{", "}", "[", "]", "<", ">", ","];

impl Matcher {
  fn patterns(patterns: &[&str]) -> Self {
    Self::Patterns(PatternFinder::new(patterns))
  }

  /// Tries the matcher with `node` as the innermost node.
  pub fn find(&self, tree: &SyntaxTree, node: NodeId) -> Option<NodeMatch> {
    match self {
      Self::Patterns(finder) => {
        let found = finder.find(tree, node)?;
        Some(NodeMatch {
          node:       found.node,
          content:    tree.range(found.target),
          delimiters: None,
        })
      },
      Self::Condition(finder) => {
        let found = finder.find(tree, node)?;
        let target = if tree.kind(found.target) == "parenthesized_expression" {
          tree.named_child(found.target, 0).unwrap_or(found.target)
        } else {
          found.target
        };
        Some(NodeMatch {
          node:       found.node,
          content:    tree.range(target),
          delimiters: None,
        })
      },
      Self::Argument { parents } => {
        let parent = tree.parent(node)?;
        let syntax = tree.node(node);
        if !syntax.is_named || !parents.contains(&tree.kind(parent)) {
          return None;
        }

        let items: Vec<NodeId> = tree
          .named_children(parent)
          .filter(|&child| !BRACKETS.contains(&tree.kind(child)))
          .collect();
        let index = items.iter().position(|&item| item == node)?;
        let leading = index
          .checked_sub(1)
          .map(|previous| Range::new(tree.range(items[previous]).end, syntax.range.start));
        let trailing = items
          .get(index + 1)
          .map(|&next| Range::new(syntax.range.end, tree.range(next).start));

        Some(NodeMatch {
          node,
          content: syntax.range,
          delimiters: Some((leading, trailing)),
        })
      },
    }
  }

  /// Every distinct match in `tree`, ordered by domain start with outer
  /// matches first.
  pub fn find_all(&self, tree: &SyntaxTree) -> Vec<NodeMatch> {
    let mut matches: Vec<NodeMatch> = tree
      .nodes()
      .filter_map(|node| self.find(tree, node))
      .collect();
    matches.sort_by(|a, b| {
      let (a_range, b_range) = (tree.range(a.node), tree.range(b.node));
      a_range
        .start
        .cmp(&b_range.start)
        .then(b_range.end.cmp(&a_range.end))
        .then(a.content.start.cmp(&b.content.start))
        .then(a.content.end.cmp(&b.content.end))
    });
    matches.dedup_by(|a, b| tree.range(a.node) == tree.range(b.node) && a.content == b.content);
    matches
  }
}

/// Matchers for one language family.
#[derive(Debug, Default)]
pub struct Language {
  matchers:       HashMap<ScopeType, Matcher>,
  fragment_kinds: &'static [(&'static str, FragmentKind)],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FragmentKind {
  /// Delimited by its first and last child.
  String,
  Comment,
}

impl Language {
  pub fn matcher(&self, scope_type: &ScopeType) -> Option<&Matcher> {
    self.matchers.get(scope_type)
  }

  /// The string or comment surrounding `node`, if any. For strings this is
  /// the text between the quotes.
  pub fn text_fragment(&self, tree: &SyntaxTree, node: NodeId) -> Option<Range> {
    tree.ancestors(node).find_map(|ancestor| {
      let kind = self
        .fragment_kinds
        .iter()
        .find(|(fragment, _)| *fragment == tree.kind(ancestor))
        .map(|(_, kind)| *kind)?;
      let range = tree.range(ancestor);
      match (kind, tree.children(ancestor)) {
        (FragmentKind::String, [open, .., close]) => {
          Some(Range::new(tree.range(*open).end, tree.range(*close).start))
        },
        _ => Some(range),
      }
    })
  }
}

const GENERIC_FRAGMENTS: &[(&str, FragmentKind)] = &[
  ("string", FragmentKind::String),
  ("comment", FragmentKind::Comment),
];

const JAVASCRIPT_FRAGMENTS: &[(&str, FragmentKind)] = &[
  ("string", FragmentKind::String),
  ("template_string", FragmentKind::String),
  ("comment", FragmentKind::Comment),
  ("regex", FragmentKind::String),
];

const JAVASCRIPT_STATEMENTS: &[&str] = &[
  "abstract_class_declaration",
  "ambient_declaration",
  "break_statement",
  "class_declaration",
  "continue_statement",
  "debugger_statement",
  "declaration",
  "do_statement",
  "empty_statement",
  "enum_declaration",
  "expression_statement",
  "for_in_statement",
  "for_statement",
  "function_declaration",
  "function_signature",
  "generator_function_declaration",
  "if_statement",
  "import_alias",
  "import_statement",
  "interface_declaration",
  "internal_module",
  "labeled_statement",
  "lexical_declaration",
  "module",
  "return_statement",
  "switch_statement",
  "throw_statement",
  "try_statement",
  "type_alias_declaration",
  "variable_declaration",
  "while_statement",
  "with_statement",
];

const PYTHON_STATEMENTS: &[&str] = &[
  "assert_statement",
  "break_statement",
  "continue_statement",
  "delete_statement",
  "exec_statement",
  "expression_statement",
  "for_statement",
  "future_import_statement",
  "global_statement",
  "if_statement",
  "import_from_statement",
  "import_statement",
  "match_statement",
  "nonlocal_statement",
  "pass_statement",
  "print_statement",
  "raise_statement",
  "return_statement",
  "try_statement",
  "while_statement",
  "with_statement",
];

fn javascript() -> Language {
  let statements: Vec<String> = JAVASCRIPT_STATEMENTS
    .iter()
    .map(|kind| format!("export_statement?.{kind}"))
    .chain(std::iter::once("export_statement".to_string()))
    .collect();
  let statements: Vec<&str> = statements.iter().map(String::as_str).collect();

  let matchers = HashMap::from([
    (ScopeType::Statement, Matcher::patterns(&statements)),
    (
      ScopeType::Class,
      Matcher::patterns(&[
        "export_statement?.class_declaration",
        "export_statement?.abstract_class_declaration",
        "export_statement.class",
        "class",
      ]),
    ),
    (
      ScopeType::ClassName,
      Matcher::patterns(&[
        "class_declaration[name]",
        "abstract_class_declaration[name]",
        "class[name]",
      ]),
    ),
    (
      ScopeType::NamedFunction,
      Matcher::patterns(&[
        "export_statement?.function_declaration",
        "export_statement?.generator_function_declaration",
        "export_statement.function",
        "export_statement.arrow_function",
        "method_definition",
        "public_field_definition.arrow_function",
        "export_statement?.lexical_declaration.variable_declarator.function",
        "export_statement?.lexical_declaration.variable_declarator.arrow_function",
        "assignment_expression.function",
        "assignment_expression.arrow_function",
      ]),
    ),
    (
      ScopeType::FunctionName,
      Matcher::patterns(&[
        "function_declaration[name]",
        "generator_function_declaration[name]",
        "method_definition[name]",
        "function[name]",
      ]),
    ),
    (
      ScopeType::AnonymousFunction,
      Matcher::patterns(&["arrow_function", "function", "function_expression"]),
    ),
    (ScopeType::IfStatement, Matcher::patterns(&["if_statement"])),
    (ScopeType::Comment, Matcher::patterns(&["comment"])),
    (ScopeType::String, Matcher::patterns(&["string", "template_string"])),
    (ScopeType::RegularExpression, Matcher::patterns(&["regex"])),
    (ScopeType::Map, Matcher::patterns(&["object", "object_pattern"])),
    (ScopeType::List, Matcher::patterns(&["array", "array_pattern"])),
    (
      ScopeType::FunctionCall,
      Matcher::patterns(&["call_expression", "new_expression"]),
    ),
    (
      ScopeType::FunctionCallee,
      Matcher::patterns(&["call_expression[function]", "new_expression[constructor]"]),
    ),
    (ScopeType::Condition, Matcher::Condition(PatternFinder::new(&["*[condition]"]))),
    (
      ScopeType::Name,
      Matcher::patterns(&[
        "*[name]",
        "optional_parameter.identifier!",
        "required_parameter.identifier!",
        "augmented_assignment_expression[left]",
        "assignment_expression[left]",
      ]),
    ),
    (
      ScopeType::Value,
      Matcher::patterns(&[
        "assignment_expression[right]",
        "augmented_assignment_expression[right]",
        "*[value]",
        "return_statement.~return!",
      ]),
    ),
    (
      ScopeType::Type,
      Matcher::patterns(&[
        "export_statement?.type_alias_declaration",
        "export_statement?.interface_declaration",
        "*[type]",
      ]),
    ),
    (
      ScopeType::ArgumentOrParameter,
      Matcher::Argument {
        parents: &["formal_parameters", "arguments"],
      },
    ),
    (ScopeType::CollectionKey, Matcher::patterns(&["pair[key]"])),
    (
      ScopeType::Branch,
      Matcher::patterns(&["switch_case", "switch_default", "else_clause"]),
    ),
    (ScopeType::Attribute, Matcher::patterns(&["jsx_attribute"])),
    (
      ScopeType::XmlElement,
      Matcher::patterns(&["jsx_element", "jsx_self_closing_element"]),
    ),
    (
      ScopeType::XmlStartTag,
      Matcher::patterns(&["jsx_element.jsx_opening_element!"]),
    ),
    (
      ScopeType::XmlEndTag,
      Matcher::patterns(&["jsx_element.jsx_closing_element!"]),
    ),
  ]);

  Language {
    matchers,
    fragment_kinds: JAVASCRIPT_FRAGMENTS,
  }
}

fn python() -> Language {
  let statements: Vec<&str> = PYTHON_STATEMENTS
    .iter()
    .copied()
    .chain([
      "decorated_definition?.function_definition",
      "decorated_definition?.class_definition",
    ])
    .collect();

  let matchers = HashMap::from([
    (ScopeType::Statement, Matcher::patterns(&statements)),
    (
      ScopeType::Class,
      Matcher::patterns(&["decorated_definition?.class_definition"]),
    ),
    (ScopeType::ClassName, Matcher::patterns(&["class_definition[name]"])),
    (
      ScopeType::NamedFunction,
      Matcher::patterns(&["decorated_definition?.function_definition"]),
    ),
    (
      ScopeType::FunctionName,
      Matcher::patterns(&["function_definition[name]"]),
    ),
    (ScopeType::AnonymousFunction, Matcher::patterns(&["lambda?.lambda"])),
    (ScopeType::IfStatement, Matcher::patterns(&["if_statement"])),
    (ScopeType::Comment, Matcher::patterns(&["comment"])),
    (ScopeType::String, Matcher::patterns(&["string"])),
    (
      ScopeType::Map,
      Matcher::patterns(&["dictionary", "dictionary_comprehension"]),
    ),
    (
      ScopeType::List,
      Matcher::patterns(&["list", "list_comprehension", "set"]),
    ),
    (ScopeType::FunctionCall, Matcher::patterns(&["call"])),
    (ScopeType::FunctionCallee, Matcher::patterns(&["call[function]"])),
    (
      ScopeType::Condition,
      Matcher::Condition(PatternFinder::new(&["*[condition]", "conditional_expression[1]"])),
    ),
    (
      ScopeType::Name,
      Matcher::patterns(&[
        "assignment[left]",
        "augmented_assignment[left]",
        "typed_parameter.identifier!",
        "parameters.identifier!",
        "*[name]",
      ]),
    ),
    (
      ScopeType::Value,
      Matcher::patterns(&[
        "assignment[right]",
        "augmented_assignment[right]",
        "~subscript[value]",
        "return_statement.~return!",
      ]),
    ),
    (
      ScopeType::Type,
      Matcher::patterns(&["function_definition[return_type]", "*[type]"]),
    ),
    (
      ScopeType::ArgumentOrParameter,
      Matcher::Argument {
        parents: &["parameters", "argument_list", "lambda_parameters"],
      },
    ),
    (ScopeType::CollectionKey, Matcher::patterns(&["pair[key]"])),
    (
      ScopeType::Branch,
      Matcher::patterns(&[
        "elif_clause",
        "else_clause",
        "except_clause",
        "finally_clause",
        "case_clause",
      ]),
    ),
  ]);

  Language {
    matchers,
    fragment_kinds: GENERIC_FRAGMENTS,
  }
}

fn generic() -> Language {
  Language {
    matchers:       HashMap::new(),
    fragment_kinds: GENERIC_FRAGMENTS,
  }
}

static JAVASCRIPT: OnceLock<Language> = OnceLock::new();
static PYTHON: OnceLock<Language> = OnceLock::new();
static GENERIC: OnceLock<Language> = OnceLock::new();

/// The matcher table for `language_id`. Languages without a table still get
/// string and comment detection.
pub fn language(language_id: &str) -> &'static Language {
  match language_id {
    "javascript" | "javascriptreact" | "typescript" | "typescriptreact" => {
      JAVASCRIPT.get_or_init(javascript)
    },
    "python" => PYTHON.get_or_init(python),
    _ => GENERIC.get_or_init(generic),
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::syntax::{
    NodeSpec,
    test::function_tree,
  };

  fn kinds(tree: &SyntaxTree, matches: &[NodeMatch]) -> Vec<String> {
    matches
      .iter()
      .map(|found| tree.kind(found.node).to_string())
      .collect()
  }

  #[test]
  fn statements_and_functions() {
    let tree = function_tree();
    let javascript = language("typescript");

    let statements = javascript
      .matcher(&ScopeType::Statement)
      .unwrap()
      .find_all(&tree);
    assert_eq!(kinds(&tree, &statements), ["function_declaration", "return_statement"]);

    let functions = javascript
      .matcher(&ScopeType::NamedFunction)
      .unwrap()
      .find_all(&tree);
    assert_eq!(functions.len(), 1);
    assert_eq!(functions[0].content, Range::from_coords(0, 0, 2, 1));

    let names = javascript
      .matcher(&ScopeType::FunctionName)
      .unwrap()
      .find_all(&tree);
    assert_eq!(names[0].content, Range::from_coords(0, 9, 0, 12));
  }

  #[test]
  fn arguments_carry_separators() {
    let r = Range::from_coords;
    // f(a, b)
    let tree = SyntaxTree::from_spec(
      NodeSpec::new("call_expression", r(0, 0, 0, 7))
        .child(NodeSpec::new("identifier", r(0, 0, 0, 1)).field("function"))
        .child(
          NodeSpec::new("arguments", r(0, 1, 0, 7))
            .field("arguments")
            .child(NodeSpec::new("(", r(0, 1, 0, 2)).named(false))
            .child(NodeSpec::new("identifier", r(0, 2, 0, 3)))
            .child(NodeSpec::new(",", r(0, 3, 0, 4)).named(false))
            .child(NodeSpec::new("identifier", r(0, 5, 0, 6)))
            .child(NodeSpec::new(")", r(0, 6, 0, 7)).named(false)),
        ),
    );
    let arguments = language("javascript")
      .matcher(&ScopeType::ArgumentOrParameter)
      .unwrap()
      .find_all(&tree);

    assert_eq!(arguments.len(), 2);
    assert_eq!(arguments[0].content, r(0, 2, 0, 3));
    assert_eq!(arguments[0].delimiters, Some((None, Some(r(0, 3, 0, 5)))));
    assert_eq!(arguments[1].delimiters, Some((Some(r(0, 3, 0, 5)), None)));
  }

  #[test]
  fn string_fragment_is_the_interior() {
    let r = Range::from_coords;
    let tree = SyntaxTree::from_spec(
      NodeSpec::new("program", r(0, 0, 0, 7)).child(
        NodeSpec::new("string", r(0, 0, 0, 7))
          .child(NodeSpec::new("\"", r(0, 0, 0, 1)).named(false))
          .child(NodeSpec::new("string_fragment", r(0, 1, 0, 6)))
          .child(NodeSpec::new("\"", r(0, 6, 0, 7)).named(false)),
      ),
    );
    let node = tree.node_at(r(0, 3, 0, 3));
    assert_eq!(language("rust").text_fragment(&tree, node), Some(r(0, 1, 0, 6)));
    assert_eq!(language("python").text_fragment(&tree, tree.root()), None);
  }
}
