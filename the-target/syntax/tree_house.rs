//! Conversion from a `tree-house` parse tree.

use ropey::RopeSlice;
use tree_house::tree_sitter::{
  Tree,
  TreeCursor,
};

use super::{
  NodeSpec,
  SyntaxTree,
};
use crate::position::{
  Position,
  Range,
};

/// Snapshots `tree`, parsed from `text`, into document coordinates.
pub fn syntax_tree(tree: &Tree, text: RopeSlice) -> SyntaxTree {
  let root = tree.root_node();
  let mut cursor = root.walk();
  SyntaxTree::from_spec(node_spec(&mut cursor, text))
}

fn node_spec(cursor: &mut TreeCursor, text: RopeSlice) -> NodeSpec {
  let node = cursor.node();
  let bytes = node.byte_range();
  let range = Range::new(
    position(text, bytes.start as usize),
    position(text, bytes.end as usize),
  );

  let mut spec = NodeSpec::new(node.kind(), range).named(node.is_named());
  if let Some(field) = cursor.field_name() {
    spec = spec.field(field);
  }

  if cursor.goto_first_child() {
    loop {
      spec = spec.child(node_spec(cursor, text));
      if !cursor.goto_next_sibling() {
        break;
      }
    }
    cursor.goto_parent();
  }

  spec
}

fn position(text: RopeSlice, byte: usize) -> Position {
  let char_idx = text.byte_to_char(byte.min(text.len_bytes()));
  let line = text.char_to_line(char_idx);
  Position::new(line, char_idx - text.line_to_char(line))
}
