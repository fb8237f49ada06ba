//! Parse trees as seen by the resolver.
//!
//! The host owns parsing. What reaches the resolver is an immutable
//! [`SyntaxTree`]: an arena of nodes with kinds, field names and ranges in
//! document coordinates. [`SyntaxProvider`] hands out the tree for a
//! document, or reports that the document's language has no grammar so that
//! callers can fall back to text scanning.
//!
//! Trees are usually produced by a parser adapter (see the `tree-house`
//! feature). Tests and hosts without a parser can build them directly:
//!
//! ```
//! use the_target::{position::Range, syntax::{NodeSpec, SyntaxTree}};
//!
//! let tree = SyntaxTree::from_spec(
//!   NodeSpec::new("program", Range::from_coords(0, 0, 0, 5))
//!     .child(NodeSpec::new("identifier", Range::from_coords(0, 0, 0, 3)))
//!     .child(NodeSpec::new(";", Range::from_coords(0, 3, 0, 4)).named(false)),
//! );
//! let node = tree.node_at(Range::from_coords(0, 1, 0, 1));
//! assert_eq!(tree.kind(node), "identifier");
//! ```

use std::{
  collections::HashMap,
  sync::Arc,
};

use thiserror::Error;

use crate::{
  Tendril,
  document::{
    Document,
    DocumentId,
  },
  position::Range,
};

pub mod languages;
pub mod pattern;
#[cfg(feature = "tree-house")]
pub mod tree_house;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
  #[inline]
  pub const fn index(self) -> usize {
    self.0 as usize
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
  pub kind:       Tendril,
  pub range:      Range,
  /// Anonymous nodes are literal tokens such as `(` or `return`.
  pub is_named:   bool,
  /// The field this node occupies in its parent, if any.
  pub field_name: Option<Tendril>,
  pub parent:     Option<NodeId>,
  pub children:   Vec<NodeId>,
}

/// Owned builder input for [`SyntaxTree::from_spec`].
#[derive(Debug, Clone)]
pub struct NodeSpec {
  kind:     Tendril,
  range:    Range,
  is_named: bool,
  field:    Option<Tendril>,
  children: Vec<NodeSpec>,
}

impl NodeSpec {
  pub fn new(kind: &str, range: Range) -> Self {
    Self {
      kind: Tendril::from(kind),
      range,
      is_named: true,
      field: None,
      children: Vec::new(),
    }
  }

  #[must_use]
  pub fn named(mut self, is_named: bool) -> Self {
    self.is_named = is_named;
    self
  }

  #[must_use]
  pub fn field(mut self, name: &str) -> Self {
    self.field = Some(Tendril::from(name));
    self
  }

  #[must_use]
  pub fn child(mut self, child: NodeSpec) -> Self {
    self.children.push(child);
    self
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
  nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
  /// Flattens `root` into an arena. Children keep their order.
  pub fn from_spec(root: NodeSpec) -> Self {
    let mut tree = Self { nodes: Vec::new() };
    tree.push(root, None);
    tree
  }

  fn push(&mut self, spec: NodeSpec, parent: Option<NodeId>) -> NodeId {
    let id = NodeId(self.nodes.len() as u32);
    self.nodes.push(SyntaxNode {
      kind: spec.kind,
      range: spec.range,
      is_named: spec.is_named,
      field_name: spec.field,
      parent,
      children: Vec::with_capacity(spec.children.len()),
    });
    for child in spec.children {
      let child = self.push(child, Some(id));
      self.nodes[id.index()].children.push(child);
    }
    id
  }

  #[inline]
  pub const fn root(&self) -> NodeId {
    NodeId(0)
  }

  #[inline]
  pub fn node(&self, id: NodeId) -> &SyntaxNode {
    &self.nodes[id.index()]
  }

  #[inline]
  pub fn kind(&self, id: NodeId) -> &str {
    &self.node(id).kind
  }

  #[inline]
  pub fn range(&self, id: NodeId) -> Range {
    self.node(id).range
  }

  #[inline]
  pub fn parent(&self, id: NodeId) -> Option<NodeId> {
    self.node(id).parent
  }

  #[inline]
  pub fn children(&self, id: NodeId) -> &[NodeId] {
    &self.node(id).children
  }

  pub fn named_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    self
      .children(id)
      .iter()
      .copied()
      .filter(|&child| self.node(child).is_named)
  }

  pub fn named_child(&self, id: NodeId, n: usize) -> Option<NodeId> {
    self.named_children(id).nth(n)
  }

  pub fn child_by_field(&self, id: NodeId, field: &str) -> Option<NodeId> {
    self
      .children(id)
      .iter()
      .copied()
      .find(|&child| self.node(child).field_name.as_deref() == Some(field))
  }

  /// `id` followed by each of its ancestors up to the root.
  pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    std::iter::successors(Some(id), |&node| self.parent(node))
  }

  /// Every node in pre-order.
  pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
    // Nodes are pushed depth first, so arena order is pre-order.
    (0..self.nodes.len() as u32).map(NodeId)
  }

  /// The smallest node containing `range`. At a boundary between two
  /// siblings the right one wins.
  pub fn node_at(&self, range: Range) -> NodeId {
    let mut current = self.root();
    'descend: loop {
      for &child in self.children(current).iter().rev() {
        let child_range = self.range(child);
        if child_range.contains_range(&range)
          && (child_range.end > range.start || child_range.is_empty())
        {
          current = child;
          continue 'descend;
        }
      }
      // Zero-width query at the very end of a node.
      for &child in self.children(current).iter().rev() {
        if self.range(child).contains_range(&range) {
          current = child;
          continue 'descend;
        }
      }
      return current;
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("language '{language_id}' has no syntax tree")]
pub struct UnsupportedLanguage {
  pub language_id: String,
}

pub trait SyntaxProvider {
  fn syntax_tree(&self, document: &Document) -> Result<Arc<SyntaxTree>, UnsupportedLanguage>;
}

/// A provider for hosts without any parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSyntax;

impl SyntaxProvider for NoSyntax {
  fn syntax_tree(&self, document: &Document) -> Result<Arc<SyntaxTree>, UnsupportedLanguage> {
    Err(UnsupportedLanguage {
      language_id: document.language_id().to_string(),
    })
  }
}

/// Trees registered per document.
#[derive(Debug, Default, Clone)]
pub struct SyntaxTrees {
  trees: HashMap<DocumentId, Arc<SyntaxTree>>,
}

impl SyntaxTrees {
  pub fn insert(&mut self, document: DocumentId, tree: SyntaxTree) {
    self.trees.insert(document, Arc::new(tree));
  }

  pub fn remove(&mut self, document: DocumentId) -> Option<Arc<SyntaxTree>> {
    self.trees.remove(&document)
  }
}

impl SyntaxProvider for SyntaxTrees {
  fn syntax_tree(&self, document: &Document) -> Result<Arc<SyntaxTree>, UnsupportedLanguage> {
    self.trees.get(&document.id()).cloned().ok_or_else(|| {
      UnsupportedLanguage {
        language_id: document.language_id().to_string(),
      }
    })
  }
}

#[cfg(test)]
pub(crate) mod test {
  use super::*;

  /// `function foo() {\n  return 1;\n}` as parsed by a javascript grammar.
  pub(crate) fn function_tree() -> SyntaxTree {
    let r = Range::from_coords;
    SyntaxTree::from_spec(
      NodeSpec::new("program", r(0, 0, 2, 1)).child(
        NodeSpec::new("function_declaration", r(0, 0, 2, 1))
          .child(NodeSpec::new("function", r(0, 0, 0, 8)).named(false))
          .child(NodeSpec::new("identifier", r(0, 9, 0, 12)).field("name"))
          .child(
            NodeSpec::new("formal_parameters", r(0, 12, 0, 14))
              .field("parameters")
              .child(NodeSpec::new("(", r(0, 12, 0, 13)).named(false))
              .child(NodeSpec::new(")", r(0, 13, 0, 14)).named(false)),
          )
          .child(
            NodeSpec::new("statement_block", r(0, 15, 2, 1))
              .field("body")
              .child(NodeSpec::new("{", r(0, 15, 0, 16)).named(false))
              .child(
                NodeSpec::new("return_statement", r(1, 2, 1, 11))
                  .child(NodeSpec::new("return", r(1, 2, 1, 8)).named(false))
                  .child(NodeSpec::new("number", r(1, 9, 1, 10)))
                  .child(NodeSpec::new(";", r(1, 10, 1, 11)).named(false)),
              )
              .child(NodeSpec::new("}", r(2, 0, 2, 1)).named(false)),
          ),
      ),
    )
  }

  #[test]
  fn node_at_finds_smallest_node() {
    let tree = function_tree();
    let node = tree.node_at(Range::from_coords(1, 9, 1, 9));
    assert_eq!(tree.kind(node), "number");

    let node = tree.node_at(Range::from_coords(1, 3, 1, 10));
    assert_eq!(tree.kind(node), "return_statement");

    // Between `foo` and `(` the right node wins.
    let node = tree.node_at(Range::from_coords(0, 12, 0, 12));
    assert_eq!(tree.kind(node), "(");

    // End of the document still lands inside the function.
    let node = tree.node_at(Range::from_coords(2, 1, 2, 1));
    assert_eq!(tree.kind(node), "}");
  }

  #[test]
  fn navigation() {
    let tree = function_tree();
    let function = tree.named_child(tree.root(), 0).unwrap();
    assert_eq!(tree.kind(function), "function_declaration");

    let name = tree.child_by_field(function, "name").unwrap();
    assert_eq!(tree.range(name), Range::from_coords(0, 9, 0, 12));
    assert_eq!(tree.named_children(function).count(), 3);

    let kinds: Vec<_> = tree.ancestors(name).map(|node| tree.kind(node)).collect();
    assert_eq!(kinds, ["identifier", "function_declaration", "program"]);
  }

  #[test]
  fn providers() {
    let document = Document::from_str(DocumentId::new(7), "javascript", "x");
    assert_eq!(
      NoSyntax.syntax_tree(&document),
      Err(UnsupportedLanguage {
        language_id: "javascript".into(),
      })
    );

    let mut trees = SyntaxTrees::default();
    trees.insert(DocumentId::new(7), function_tree());
    assert!(trees.syntax_tree(&document).is_ok());
  }
}
