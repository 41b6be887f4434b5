//! Rule paths for wirestate
//!
//! Components declare which nested fields of their entity-typed properties
//! may reach the client as dotted rule paths (`post.title`,
//! `post.comments.*.body`). This crate turns those paths into a tree and
//! uses it to project JSON data:
//! - [`compile`]: rule paths into a [`RuleTree`]
//! - [`extract`]: shape-preserving projection of a value through a tree
//! - [`project_property`]: projection of one property by its own rules

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod extract;
pub mod tree;

pub use extract::{extract, project_property};
pub use tree::{compile, RuleNode, RuleTree, SEPARATOR, WILDCARD};
