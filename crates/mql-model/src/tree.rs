//! Tree configurations: named hierarchies of typed cards

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A named hierarchical grouping of cards with parent-child edges
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TreeConfiguration {
    /// Tree name (matched case-insensitively)
    pub name: String,
    /// Card type names from root to leaf
    pub card_types: Vec<String>,
    /// Members of the tree
    members: BTreeSet<u64>,
    /// Child card number to parent card number
    parents: BTreeMap<u64, u64>,
}

impl TreeConfiguration {
    /// Create an empty tree
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the card type ordering from root to leaf
    pub fn with_card_types<S: Into<String>>(mut self, types: impl IntoIterator<Item = S>) -> Self {
        self.card_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Add a card to the tree, optionally under a parent
    pub fn with_member(mut self, number: u64, parent: Option<u64>) -> Self {
        self.members.insert(number);
        if let Some(parent) = parent {
            self.members.insert(parent);
            self.parents.insert(number, parent);
        }
        self
    }

    /// Whether a card belongs to the tree
    pub fn contains(&self, number: u64) -> bool {
        self.members.contains(&number)
    }

    /// All members, in card-number order
    pub fn members(&self) -> impl Iterator<Item = u64> + '_ {
        self.members.iter().copied()
    }

    /// Direct children of a card
    pub fn children_of(&self, number: u64) -> Vec<u64> {
        self.parents
            .iter()
            .filter(|(_, parent)| **parent == number)
            .map(|(child, _)| *child)
            .collect()
    }

    /// Every transitive descendant of a card
    pub fn descendants_of(&self, number: u64) -> Vec<u64> {
        let mut result = Vec::new();
        let mut frontier = self.children_of(number);
        while let Some(child) = frontier.pop() {
            frontier.extend(self.children_of(child));
            result.push(child);
        }
        result.sort_unstable();
        result
    }
}
