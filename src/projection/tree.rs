//! Filter tree compiled from a statement's `only` clause
//!
//! Selectors `["name", "address.city", matches("tags", "^a")]` compile to
//!
//! ```text
//! name    -> Include
//! address -> { city -> Include }
//! tags    -> Match(tags, ^a)
//! ```
//!
//! The `*` token is kept as an ordinary key and split out when projecting.

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::domain::{Match, Selector, SELECT_ALL};

use super::errors::{FilterError, FilterResult};

/// Rule attached to one field of a [`FilterTree`]
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    /// Keep the field's entire value
    Include,
    /// Keep the field only where it matches
    Match(Match),
    /// Recurse into the field's value
    Tree(FilterTree),
}

/// Nested projection rules, keyed by field name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterTree {
    fields: BTreeMap<String, FilterNode>,
}

impl FilterTree {
    /// Compile an `only` clause
    ///
    /// Selectors sharing a prefix merge into one sub-tree. When two
    /// selectors disagree on the shape of a node, the later one wins.
    pub fn build(selectors: &[Selector]) -> FilterResult<Self> {
        let mut tree = FilterTree::default();

        for selector in selectors {
            match selector {
                Selector::Path(path) => tree.insert(path, FilterNode::Include),
                Selector::Match(m) => {
                    let (leaf, _) = m.target().split_last().ok_or(FilterError::EmptyMatchTarget)?;
                    // Constraint applies at the leaf, so it only keeps the last field
                    let rule = Match {
                        path: vec![leaf.clone()],
                        arg: m.arg.clone(),
                    };
                    tree.insert(m.target(), FilterNode::Match(rule));
                }
            }
        }

        Ok(tree)
    }

    fn insert(&mut self, path: &[String], leaf: FilterNode) {
        match path {
            [] => {}
            [field] => {
                self.fields.insert(field.clone(), leaf);
            }
            [field, rest @ ..] => {
                let entry = self
                    .fields
                    .entry(field.clone())
                    .or_insert_with(|| FilterNode::Tree(FilterTree::default()));

                match entry {
                    FilterNode::Tree(subtree) => subtree.insert(rest, leaf),
                    other => {
                        let mut subtree = FilterTree::default();
                        subtree.insert(rest, leaf);
                        *other = FilterNode::Tree(subtree);
                    }
                }
            }
        }
    }

    /// Tree holding only the select-all marker
    pub fn select_all() -> Self {
        let mut tree = FilterTree::default();
        tree.fields.insert(SELECT_ALL.to_string(), FilterNode::Include);
        tree
    }

    pub fn get(&self, field: &str) -> Option<&FilterNode> {
        self.fields.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields and their rules, in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterNode)> {
        self.fields.iter()
    }

    /// Split the select-all marker from the named rules
    ///
    /// The returned tree never holds the marker.
    pub fn split_select_all(&self) -> (bool, Cow<'_, FilterTree>) {
        if !self.fields.contains_key(SELECT_ALL) {
            return (false, Cow::Borrowed(self));
        }

        let mut named = self.clone();
        named.fields.remove(SELECT_ALL);
        (true, Cow::Owned(named))
    }
}
