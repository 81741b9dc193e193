//! Class-label consensus across replicate groups.

use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{AlembicError, Result};
use crate::table::DataTable;

use super::{GroupResolver, ReplicateGroup};

/// The closed set of class-consensus strategies.
///
/// Strategy names arrive as configuration; anything outside this set is
/// rejected when the name is parsed, never discovered mid-pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassStrategy {
    /// Keep a group only when every replicate carries the same label.
    Unanimous,
    /// Keep a group when one label strictly out-votes every other.
    Majority,
}

impl ClassStrategy {
    /// Configuration name of the strategy.
    pub fn name(&self) -> &'static str {
        match self {
            ClassStrategy::Unanimous => "unanimous",
            ClassStrategy::Majority => "majority",
        }
    }
}

impl FromStr for ClassStrategy {
    type Err = AlembicError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unanimous" => Ok(ClassStrategy::Unanimous),
            "majority" => Ok(ClassStrategy::Majority),
            other => Err(AlembicError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Per-group class-label resolver.
pub struct ClassResolver {
    strategy: ClassStrategy,
    class_pos: usize,
}

impl ClassResolver {
    /// Build a resolver over the given class column.
    pub fn new(table: &DataTable, class_col: &str, strategy: ClassStrategy) -> Result<Self> {
        let class_pos = table.require_column(class_col)?;
        Ok(Self {
            strategy,
            class_pos,
        })
    }

    fn resolve_unanimous(&self, group: &ReplicateGroup) -> Option<usize> {
        let mut cells = group.cells(self.class_pos);
        let (first_index, first_label) = cells.next()?;
        if cells.all(|(_, label)| label == first_label) {
            Some(first_index)
        } else {
            None
        }
    }

    fn resolve_majority(&self, group: &ReplicateGroup) -> Option<usize> {
        if group.len() == 1 {
            return group.cells(self.class_pos).next().map(|(index, _)| index);
        }

        let mut votes: IndexMap<&str, usize> = IndexMap::new();
        for (_, label) in group.cells(self.class_pos) {
            *votes.entry(label).or_insert(0) += 1;
        }

        let top = *votes.values().max()?;
        if votes.values().filter(|&&count| count == top).count() > 1 {
            // Tied vote: the group cannot be reconciled.
            return None;
        }

        let (winner, _) = votes.iter().find(|&(_, &count)| count == top)?;
        group
            .cells(self.class_pos)
            .find(|(_, label)| label == winner)
            .map(|(index, _)| index)
    }
}

impl GroupResolver for ClassResolver {
    fn resolve(&self, group: &ReplicateGroup) -> Option<usize> {
        match self.strategy {
            ClassStrategy::Unanimous => self.resolve_unanimous(group),
            ClassStrategy::Majority => self.resolve_majority(group),
        }
    }
}
