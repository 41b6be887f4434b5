//! Rule paths and their compiled tree form
//!
//! A rule path is a dotted string such as `post.comments.*.body`, where `*`
//! as a segment means "every element of the sequence here". A set of rule
//! paths compiles into a [`RuleTree`]:
//!
//! | Path suffix | Node |
//! |-------------|------|
//! | `name` | [`RuleNode::Field`] |
//! | `*` | [`RuleNode::Everything`] |
//! | `*.rest` | [`RuleNode::Each`] |
//! | `name.rest` | [`RuleNode::Nested`] |
//!
//! ## Compilation rules
//!
//! - Paths are grouped by their first segment; groups keep first-seen order.
//! - Within a group, a bare `*` suffix is dropped as soon as any finer rule
//!   (a named field or a nested path) exists for the same group.
//! - A plain field wins over a nested group of the same name.
//! - Duplicates collapse.
//!
//! The result depends only on the set of paths, not their order.

use std::fmt;

/// Path separator
pub const SEPARATOR: char = '.';

/// Wildcard segment
pub const WILDCARD: &str = "*";

/// One entry of a compiled rule tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleNode {
    /// Copy the named key when present
    Field(String),
    /// Take the entire value at this level
    Everything,
    /// Apply the subtree to every element of the sequence at this level
    Each(RuleTree),
    /// Apply the subtree to the value under the named key
    Nested(String, RuleTree),
}

/// Compiled form of a set of rule paths
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleTree {
    nodes: Vec<RuleNode>,
}

impl RuleTree {
    /// An empty tree; projects nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from nodes as given
    pub fn from_nodes(nodes: Vec<RuleNode>) -> Self {
        Self { nodes }
    }

    /// Nodes in order
    pub fn nodes(&self) -> &[RuleNode] {
        &self.nodes
    }

    /// Whether the tree has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether every node is a wildcard fan-out
    pub fn is_fan_out(&self) -> bool {
        !self.nodes.is_empty() && self.nodes.iter().all(|n| matches!(n, RuleNode::Each(_)))
    }

    /// The node governing the top-level key `name`
    ///
    /// Returns the plain field or the nested group for `name`, whichever the
    /// tree holds.
    pub fn get(&self, name: &str) -> Option<&RuleNode> {
        self.nodes.iter().find(|node| match node {
            RuleNode::Field(field) => field == name,
            RuleNode::Nested(key, _) => key == name,
            _ => false,
        })
    }

    /// The nested subtree under the top-level key `name`
    pub fn subtree(&self, name: &str) -> Option<&RuleTree> {
        match self.get(name)? {
            RuleNode::Nested(_, tree) => Some(tree),
            _ => None,
        }
    }

    /// Flatten back into dotted rule paths
    ///
    /// ```
    /// use wirestate_rules::compile;
    ///
    /// let tree = compile(["items.*.name", "items.*.price", "title"]);
    /// assert_eq!(tree.paths(), vec!["items.*.name", "items.*.price", "title"]);
    /// ```
    pub fn paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        for node in &self.nodes {
            match node {
                RuleNode::Field(name) => out.push(name.clone()),
                RuleNode::Everything => out.push(WILDCARD.to_string()),
                RuleNode::Each(tree) => {
                    for rest in tree.paths() {
                        out.push(format!("{}{}{}", WILDCARD, SEPARATOR, rest));
                    }
                }
                RuleNode::Nested(key, tree) => {
                    for rest in tree.paths() {
                        out.push(format!("{}{}{}", key, SEPARATOR, rest));
                    }
                }
            }
        }
        out
    }
}

impl fmt::Display for RuleTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.paths().join(", "))
    }
}

// =============================================================================
// Compilation
// =============================================================================

enum Slot {
    Plain(String),
    Group(String, Vec<String>),
}

/// Compile rule paths into a [`RuleTree`]
///
/// # Examples
///
/// ```
/// use wirestate_rules::{compile, RuleNode};
///
/// // Bare `*` is dropped once a finer rule exists for the same group
/// let tree = compile(["items.*", "items.name"]);
/// assert_eq!(tree.paths(), vec!["items.name"]);
///
/// // Without finer rules it stays, meaning "everything under items"
/// let tree = compile(["items.*"]);
/// assert_eq!(
///     tree.subtree("items").unwrap().nodes(),
///     &[RuleNode::Everything]
/// );
/// ```
pub fn compile<I, S>(paths: I) -> RuleTree
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut slots: Vec<Slot> = Vec::new();

    for path in paths {
        let path = path.as_ref();
        match path.split_once(SEPARATOR) {
            None => {
                let exists = slots
                    .iter()
                    .any(|s| matches!(s, Slot::Plain(name) if name == path));
                if !exists {
                    slots.push(Slot::Plain(path.to_string()));
                }
            }
            Some((head, rest)) => {
                let group = slots.iter_mut().find_map(|s| match s {
                    Slot::Group(name, suffixes) if name == head => Some(suffixes),
                    _ => None,
                });
                match group {
                    Some(suffixes) => {
                        if !suffixes.iter().any(|s| s == rest) {
                            suffixes.push(rest.to_string());
                        }
                    }
                    None => slots.push(Slot::Group(head.to_string(), vec![rest.to_string()])),
                }
            }
        }
    }

    let plain: Vec<String> = slots
        .iter()
        .filter_map(|s| match s {
            Slot::Plain(name) => Some(name.clone()),
            Slot::Group(..) => None,
        })
        .collect();

    let mut nodes = Vec::with_capacity(slots.len());
    for slot in slots {
        match slot {
            Slot::Plain(name) if name == WILDCARD => nodes.push(RuleNode::Everything),
            Slot::Plain(name) => nodes.push(RuleNode::Field(name)),
            Slot::Group(head, _) if plain.contains(&head) => {}
            Slot::Group(head, mut suffixes) => {
                if suffixes.iter().any(|s| s != WILDCARD) {
                    suffixes.retain(|s| s != WILDCARD);
                }
                let child = compile(&suffixes);
                if head == WILDCARD {
                    nodes.push(RuleNode::Each(child));
                } else {
                    nodes.push(RuleNode::Nested(head, child));
                }
            }
        }
    }

    RuleTree { nodes }
}
