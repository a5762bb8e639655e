//! Read-only program-wide facts shared by every translator of a run
//!
//! The context is an immutable snapshot built once per translation: relation
//! and functor lookup tables, the upstream stratum assignment, and the
//! deterministic global rule-id numbering used by provenance mode. It
//! validates nothing — semantic validation happened upstream — but its
//! accessors return `Result`/`Option` so that a broken upstream guarantee
//! surfaces as a [`LoweringError`] instead of a panic.

use crate::LoweringError;
use datalog_ast::{FunctorDecl, Program, ProgramAnalysis, Relation, Symbol};
use datalog_ram::RamValue;
use std::collections::HashMap;

/// Whole-program lookup structure borrowed by all translators of one run
#[derive(Debug)]
pub struct TranslatorContext<'p> {
    program: &'p Program,
    analysis: &'p ProgramAnalysis,
    relations: HashMap<Symbol, &'p Relation>,
    functors: HashMap<Symbol, &'p FunctorDecl>,
    rule_ids: HashMap<(Symbol, usize), RamValue>,
}

impl<'p> TranslatorContext<'p> {
    pub fn new(program: &'p Program, analysis: &'p ProgramAnalysis) -> Self {
        let relations = program.relations.iter().map(|r| (r.name, r)).collect();
        let functors = program.functors.iter().map(|f| (f.name, f)).collect();

        // Rule ids are global and dense, assigned in (relation declaration,
        // clause) order so that repeated translations agree.
        let mut rule_ids = HashMap::new();
        let mut next_id: RamValue = 0;
        for relation in &program.relations {
            for clause_index in 0..relation.clauses.len() {
                rule_ids.insert((relation.name, clause_index), next_id);
                next_id += 1;
            }
        }

        TranslatorContext {
            program,
            analysis,
            relations,
            functors,
            rule_ids,
        }
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    /// Relation declaration by name
    pub fn relation(&self, name: Symbol) -> Result<&'p Relation, LoweringError> {
        self.relations
            .get(&name)
            .copied()
            .ok_or_else(|| LoweringError::UnknownRelation {
                relation: name.to_string(),
            })
    }

    /// Stratum number of a relation
    pub fn stratum_of(&self, name: Symbol) -> Result<usize, LoweringError> {
        self.analysis
            .stratum_of(name)
            .ok_or_else(|| LoweringError::MissingStratum {
                relation: name.to_string(),
            })
    }

    pub fn is_recursive(&self, name: Symbol) -> bool {
        self.analysis.is_recursive(name)
    }

    /// Whether any clause derives into the relation. Derived relations carry
    /// auxiliary columns in provenance mode; purely extensional ones do not.
    pub fn is_derived(&self, name: Symbol) -> bool {
        self.relations.get(&name).is_some_and(|r| r.is_derived())
    }

    /// User-declared functor signature, if any
    pub fn functor(&self, name: Symbol) -> Option<&'p FunctorDecl> {
        self.functors.get(&name).copied()
    }

    pub fn num_strata(&self) -> usize {
        self.analysis.num_strata()
    }

    /// Deterministic global rule id of one clause
    pub fn rule_id(&self, relation: Symbol, clause_index: usize) -> Option<RamValue> {
        self.rule_ids.get(&(relation, clause_index)).copied()
    }
}
