//! Target resolution for structural editing commands.
//!
//! A command names what it acts on with a [`descriptor::TargetDescriptor`]:
//! a mark ("the cursor", "the token under the blue hat") refined by a chain
//! of modifiers ("containing function", "next two words"). The
//! [`pipeline::Resolver`] turns that description into concrete
//! [`target::Target`] values: a content range plus the delimiter, removal,
//! interior and boundary ranges the action layer needs to edit correctly.
//!
//! The host supplies documents, selections, parse trees and hat assignments
//! through the seams in [`context`], [`hats`] and [`syntax`].

use smartstring::{
  LazyCompact,
  SmartString,
};

pub mod config;
pub mod context;
pub mod descriptor;
pub mod document;
pub mod editor;
pub mod error;
pub mod hats;
pub mod items;
pub mod mark;
pub mod modifier;
pub mod pair;
pub mod pipeline;
pub mod position;
pub mod scope;
pub mod selection;
pub mod syntax;
pub mod target;
pub mod tokenizer;
pub mod words;

pub use error::{
  Result,
  TargetError,
};

pub type Tendril = SmartString<LazyCompact>;
