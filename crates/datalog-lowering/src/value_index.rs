//! Per-clause map from variables to their RAM storage locations
//!
//! The index is created fresh for every clause and discarded once the
//! clause's operation tree has been emitted, so bindings can never leak
//! between clauses. A variable may be recorded at several locations when it
//! recurs across atoms; the first recorded location is authoritative and
//! later occurrences are turned into equality conditions by the clause
//! translator.
//!
//! Aggregate subqueries get a child scope chained to the clause's index:
//! lookups fall back outward, bindings land in the innermost scope. A
//! variable bound by an equality against a computable expression (the
//! "generated temporary" case, e.g. `C = count : edge(X, Y)`) is recorded
//! as a definition instead of a location.

use datalog_ast::{Symbol, Term};
use std::collections::HashMap;

/// A RAM storage location: column `column` of the tuple bound by scan
/// number `tuple`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub tuple: usize,
    pub column: usize,
}

/// Variable binding index for one clause (or one aggregate scope)
#[derive(Debug, Default)]
pub struct ValueIndex<'t> {
    parent: Option<&'t ValueIndex<'t>>,
    locations: HashMap<Symbol, Vec<Location>>,
    definitions: HashMap<Symbol, &'t Term>,
}

impl<'t> ValueIndex<'t> {
    pub fn new() -> Self {
        ValueIndex {
            parent: None,
            locations: HashMap::new(),
            definitions: HashMap::new(),
        }
    }

    /// A child scope whose lookups fall back to this index
    pub fn child(&self) -> ValueIndex<'_> {
        ValueIndex {
            parent: Some(self),
            locations: HashMap::new(),
            definitions: HashMap::new(),
        }
    }

    /// Record a location for a variable. The first recorded location stays
    /// authoritative.
    pub fn bind(&mut self, variable: Symbol, location: Location) {
        self.locations.entry(variable).or_default().push(location);
    }

    /// Record a variable as defined by an expression rather than stored in
    /// a tuple
    pub fn define(&mut self, variable: Symbol, term: &'t Term) {
        self.definitions.insert(variable, term);
    }

    /// Authoritative location of a variable, searching enclosing scopes
    pub fn lookup(&self, variable: Symbol) -> Option<Location> {
        match self.locations.get(&variable).and_then(|l| l.first()) {
            Some(location) => Some(*location),
            None => self.parent.and_then(|p| p.lookup(variable)),
        }
    }

    /// Defining expression of a variable, searching enclosing scopes
    pub fn definition(&self, variable: Symbol) -> Option<&'t Term> {
        match self.definitions.get(&variable) {
            Some(term) => Some(term),
            None => self.parent.and_then(|p| p.definition(variable)),
        }
    }

    pub fn is_bound(&self, variable: Symbol) -> bool {
        self.lookup(variable).is_some() || self.definition(variable).is_some()
    }

    /// All locations recorded for a variable in this scope only
    pub fn locations(&self, variable: Symbol) -> &[Location] {
        self.locations
            .get(&variable)
            .map_or(&[], |locations| locations.as_slice())
    }

    /// Loop depth at which a variable becomes available: one past its
    /// authoritative tuple, or the maximum over a definition's own
    /// variables. Unbound variables have no depth.
    pub fn depth_of(&self, variable: Symbol) -> Option<usize> {
        self.depth_of_guarded(variable, &mut Vec::new())
    }

    fn depth_of_guarded(&self, variable: Symbol, visiting: &mut Vec<Symbol>) -> Option<usize> {
        if visiting.contains(&variable) {
            return None;
        }
        if let Some(location) = self.lookup(variable) {
            return Some(location.tuple + 1);
        }
        let definition = self.definition(variable)?;
        visiting.push(variable);
        let mut variables = Vec::new();
        definition.collect_variables(&mut variables);
        let depth = variables
            .into_iter()
            .filter_map(|v| self.depth_of_guarded(v, visiting))
            .max()
            .unwrap_or(0);
        visiting.pop();
        Some(depth)
    }

    /// First tuple number not referenced by any binding in scope; used to
    /// give aggregate subqueries a collision-free tuple number
    pub fn next_tuple(&self) -> usize {
        let local = self
            .locations
            .values()
            .flatten()
            .map(|location| location.tuple + 1)
            .max()
            .unwrap_or(0);
        local.max(self.parent.map_or(0, |p| p.next_tuple()))
    }
}
