//! Upstream dependency-analysis results consumed by lowering
//!
//! Stratification and recursion detection run before lowering, in a separate
//! pass. Lowering consumes the result as a read-only fact and performs no
//! analysis of its own: a relation missing from the assignment is an
//! internal-invariant violation surfaced by the lowering stage, not repaired
//! here.

use crate::ast::Symbol;
use std::collections::{HashMap, HashSet};

/// Stratum assignment and recursion flags for one program
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgramAnalysis {
    /// Map from relation name to stratum number (0 = bottom stratum)
    strata: HashMap<Symbol, usize>,
    /// Relations that are (mutually) recursive
    recursive: HashSet<Symbol>,
}

impl ProgramAnalysis {
    pub fn new(strata: HashMap<Symbol, usize>, recursive: HashSet<Symbol>) -> Self {
        ProgramAnalysis { strata, recursive }
    }

    /// Stratum number of a relation, if the analysis covers it
    pub fn stratum_of(&self, relation: Symbol) -> Option<usize> {
        self.strata.get(&relation).copied()
    }

    /// Whether a relation participates in a recursive cycle
    pub fn is_recursive(&self, relation: Symbol) -> bool {
        self.recursive.contains(&relation)
    }

    /// Number of strata (highest assigned stratum + 1)
    pub fn num_strata(&self) -> usize {
        self.strata.values().max().map_or(0, |max| max + 1)
    }
}
