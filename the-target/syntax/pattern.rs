//! A small pattern language over node kinds.
//!
//! A pattern is a dot separated chain of node kinds read from ancestor to
//! descendant, e.g. `export_statement?.class_declaration`. Each part may carry:
//!
//! - `*` to accept any named node, or a `~` prefix to accept any named node
//!   but the given kind,
//! - a `?` suffix when the part is optional,
//! - a `!` suffix to return that node rather than the topmost one,
//! - `[field]` or `[n]` to return the named field or the `n`th named child of
//!   the matched node.
//!
//! Only named nodes ever match; punctuation and keywords are skipped by the
//! caller's ancestor walk.

use smallvec::SmallVec;

use super::{
  NodeId,
  SyntaxTree,
};
use crate::Tendril;

#[derive(Debug, Clone, PartialEq, Eq)]
enum KindMatch {
  Any,
  Is(Tendril),
  Not(Tendril),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Field {
  Index(usize),
  Name(Tendril),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Part {
  kind:         KindMatch,
  fields:       SmallVec<[Field; 1]>,
  is_important: bool,
  is_optional:  bool,
}

impl Part {
  fn parse(source: &str) -> Self {
    let head_len = source
      .find(|ch: char| !(ch.is_alphanumeric() || ch == '_' || ch == '*' || ch == '~'))
      .unwrap_or(source.len());
    let head = &source[..head_len];

    let kind = if head == "*" {
      KindMatch::Any
    } else if let Some(kind) = head.strip_prefix('~') {
      KindMatch::Not(Tendril::from(kind))
    } else {
      KindMatch::Is(Tendril::from(head))
    };

    let fields = source[head_len..]
      .split('[')
      .skip(1)
      .filter_map(|rest| rest.split_once(']').map(|(field, _)| field))
      .map(|field| {
        field
          .parse()
          .map_or_else(|_| Field::Name(Tendril::from(field)), Field::Index)
      })
      .collect();

    Self {
      kind,
      fields,
      is_important: source.contains('!'),
      is_optional: source.contains('?'),
    }
  }

  fn accepts(&self, tree: &SyntaxTree, node: NodeId) -> bool {
    let node = tree.node(node);
    node.is_named
      && match &self.kind {
        KindMatch::Any => true,
        KindMatch::Is(kind) => node.kind == *kind,
        KindMatch::Not(kind) => node.kind != *kind,
      }
  }
}

/// Result of matching a pattern at a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternMatch {
  /// The node the pattern matched, before field selection.
  pub node:   NodeId,
  /// The node to target after applying `[field]` selectors.
  pub target: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
  parts: Vec<Part>,
}

impl Pattern {
  pub fn new(source: &str) -> Self {
    Self {
      parts: source.split('.').map(Part::parse).collect(),
    }
  }

  /// Matches the pattern with its last part at `node`, walking up through
  /// the ancestors for the earlier parts. Chains that do not fit upwards are
  /// tried downwards from `node` through uniquely matching children.
  pub fn find(&self, tree: &SyntaxTree, node: NodeId) -> Option<PatternMatch> {
    let (matched, part) = self.search_ascending(tree, node).or_else(|| {
      (self.parts.len() > 1)
        .then(|| self.search_descending(tree, node))
        .flatten()
    })?;

    let mut target = matched;
    for field in &part.fields {
      target = match field {
        Field::Index(n) => tree.named_child(target, *n)?,
        Field::Name(name) => tree.child_by_field(target, name)?,
      };
    }

    Some(PatternMatch {
      node: matched,
      target,
    })
  }

  fn search_ascending<'a>(&'a self, tree: &SyntaxTree, node: NodeId) -> Option<(NodeId, &'a Part)> {
    let mut result: Option<(NodeId, &Part)> = None;
    let mut current = Some(node);

    for part in self.parts.iter().rev() {
      match current {
        Some(node) if part.accepts(tree, node) => {
          if !result.is_some_and(|(_, found)| found.is_important) {
            result = Some((node, part));
          }
          current = tree.parent(node);
        },
        _ if part.is_optional => continue,
        _ => return None,
      }
    }

    result
  }

  fn search_descending<'a>(&'a self, tree: &SyntaxTree, node: NodeId) -> Option<(NodeId, &'a Part)> {
    let mut result: Option<(NodeId, &Part)> = None;
    let mut current = Some(node);

    for (i, part) in self.parts.iter().enumerate() {
      let node = match current {
        Some(node) if part.accepts(tree, node) => node,
        _ if part.is_optional => continue,
        _ => return None,
      };

      if result.is_none() || part.is_important {
        result = Some((node, part));
      }

      if let Some(next) = self.parts.get(i + 1) {
        let mut children = tree
          .named_children(node)
          .filter(|&child| next.accepts(tree, child));
        current = match (children.next(), children.next()) {
          (Some(only), None) => Some(only),
          _ => None,
        };
      }
    }

    result
  }
}

/// Several alternative patterns. The first one to match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternFinder {
  patterns: Vec<Pattern>,
}

impl PatternFinder {
  pub fn new(patterns: &[&str]) -> Self {
    Self {
      patterns: patterns.iter().map(|source| Pattern::new(source)).collect(),
    }
  }

  pub fn find(&self, tree: &SyntaxTree, node: NodeId) -> Option<PatternMatch> {
    self
      .patterns
      .iter()
      .find_map(|pattern| pattern.find(tree, node))
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    position::Range,
    syntax::{
      NodeSpec,
      test::function_tree,
    },
  };

  fn find_kind(tree: &SyntaxTree, kind: &str) -> NodeId {
    tree.nodes().find(|&node| tree.kind(node) == kind).unwrap()
  }

  #[test]
  fn parses_flags_and_fields() {
    let part = Part::parse("~subscript[value]");
    assert_eq!(part.kind, KindMatch::Not("subscript".into()));
    assert_eq!(part.fields.as_slice(), [Field::Name("value".into())]);

    let part = Part::parse("identifier!");
    assert!(part.is_important);
    assert!(!part.is_optional);

    let part = Part::parse("conditional_expression[1]");
    assert_eq!(part.fields.as_slice(), [Field::Index(1)]);
    assert!(Part::parse("export_statement?").is_optional);
  }

  #[test]
  fn optional_parent_is_returned_when_present() {
    let r = Range::from_coords;
    let tree = SyntaxTree::from_spec(
      NodeSpec::new("program", r(0, 0, 0, 30))
        .child(
          NodeSpec::new("export_statement", r(0, 0, 0, 20))
            .child(NodeSpec::new("class_declaration", r(0, 7, 0, 20))),
        )
        .child(NodeSpec::new("class_declaration", r(0, 21, 0, 30))),
    );
    let pattern = Pattern::new("export_statement?.class_declaration");

    let exported = tree.nodes().filter(|&node| tree.kind(node) == "class_declaration").collect::<Vec<_>>();
    let found = pattern.find(&tree, exported[0]).unwrap();
    assert_eq!(tree.kind(found.node), "export_statement");

    let found = pattern.find(&tree, exported[1]).unwrap();
    assert_eq!(found.node, exported[1]);
  }

  #[test]
  fn important_part_wins_over_top_node() {
    let tree = function_tree();
    let number = find_kind(&tree, "number");
    let pattern = Pattern::new("return_statement.~return!");
    let found = pattern.find(&tree, number).unwrap();
    assert_eq!(tree.kind(found.target), "number");
  }

  #[test]
  fn descends_through_unique_children() {
    let tree = function_tree();
    let statement = find_kind(&tree, "return_statement");
    // Ascending fails at `return_statement` itself, descending finds the
    // single non-`return` named child.
    let found = Pattern::new("return_statement.~return!").find(&tree, statement).unwrap();
    assert_eq!(tree.kind(found.target), "number");
  }

  #[test]
  fn fields_select_children() {
    let tree = function_tree();
    let function = find_kind(&tree, "function_declaration");
    let found = PatternFinder::new(&["class_declaration[name]", "*[name]"])
      .find(&tree, function)
      .unwrap();
    assert_eq!(found.node, function);
    assert_eq!(tree.kind(found.target), "identifier");

    assert_eq!(Pattern::new("*[missing]").find(&tree, function), None);
  }

  #[test]
  fn anonymous_nodes_never_match() {
    let tree = function_tree();
    let keyword = find_kind(&tree, "function");
    assert_eq!(Pattern::new("function").find(&tree, keyword), None);
    assert_eq!(Pattern::new("*").find(&tree, keyword), None);
  }
}
