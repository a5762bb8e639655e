//! Translation strategy: the factory for matched translator sets
//!
//! A strategy bundles one implementation of each of the four translator
//! roles. The factory is the only construction path for translators, and
//! unit and clause translators capture the strategy that built them, so
//! every nested translator they create comes from the same factory —
//! composing a plain translator with a provenance one is structurally
//! impossible.
//!
//! Provenance mode reuses the plain constraint lowering rules unchanged
//! (negation checks compare data columns only, which the prefix semantics
//! of non-membership tests already provide); its clause and value
//! translators differ.

use crate::clause::{ClauseTranslator, ProvenanceClauseTranslator, SeminaiveClauseTranslator};
use crate::constraint::{ConstraintTranslator, SeminaiveConstraintTranslator};
use crate::context::TranslatorContext;
use crate::unit::{ProvenanceUnitTranslator, SeminaiveUnitTranslator, UnitTranslator};
use crate::value::{ProvenanceValueTranslator, SeminaiveValueTranslator, ValueTranslator};
use crate::value_index::ValueIndex;
use datalog_ram::SymbolTable;

/// Target evaluation mode, fixed for the lifetime of one translation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Semi-naive evaluation without derivation bookkeeping
    Plain,
    /// Semi-naive evaluation with per-tuple derivation metadata
    Provenance,
}

impl Mode {
    /// The strategy implementing this mode
    pub fn strategy(self) -> Box<dyn TranslationStrategy> {
        match self {
            Mode::Plain => Box::new(SeminaiveStrategy),
            Mode::Provenance => Box::new(ProvenanceStrategy),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Plain => write!(f, "plain"),
            Mode::Provenance => write!(f, "provenance"),
        }
    }
}

/// Factory producing a mutually compatible set of the four translator roles
pub trait TranslationStrategy {
    fn mode(&self) -> Mode;

    fn create_unit_translator<'a>(
        &'a self,
        context: &'a TranslatorContext<'a>,
        symbols: &'a SymbolTable,
    ) -> Box<dyn UnitTranslator + 'a>;

    fn create_clause_translator<'a>(
        &'a self,
        context: &'a TranslatorContext<'a>,
        symbols: &'a SymbolTable,
    ) -> Box<dyn ClauseTranslator + 'a>;

    fn create_constraint_translator<'a>(
        &'a self,
        context: &'a TranslatorContext<'a>,
        symbols: &'a SymbolTable,
        index: &'a ValueIndex<'a>,
    ) -> Box<dyn ConstraintTranslator + 'a>;

    fn create_value_translator<'a>(
        &'a self,
        context: &'a TranslatorContext<'a>,
        symbols: &'a SymbolTable,
        index: &'a ValueIndex<'a>,
    ) -> Box<dyn ValueTranslator + 'a>;
}

/// Plain semi-naive translation
pub struct SeminaiveStrategy;

impl TranslationStrategy for SeminaiveStrategy {
    fn mode(&self) -> Mode {
        Mode::Plain
    }

    fn create_unit_translator<'a>(
        &'a self,
        context: &'a TranslatorContext<'a>,
        symbols: &'a SymbolTable,
    ) -> Box<dyn UnitTranslator + 'a> {
        Box::new(SeminaiveUnitTranslator::new(self, context, symbols))
    }

    fn create_clause_translator<'a>(
        &'a self,
        context: &'a TranslatorContext<'a>,
        symbols: &'a SymbolTable,
    ) -> Box<dyn ClauseTranslator + 'a> {
        Box::new(SeminaiveClauseTranslator::new(self, context, symbols))
    }

    fn create_constraint_translator<'a>(
        &'a self,
        context: &'a TranslatorContext<'a>,
        symbols: &'a SymbolTable,
        index: &'a ValueIndex<'a>,
    ) -> Box<dyn ConstraintTranslator + 'a> {
        Box::new(SeminaiveConstraintTranslator::new(
            self, context, symbols, index,
        ))
    }

    fn create_value_translator<'a>(
        &'a self,
        context: &'a TranslatorContext<'a>,
        symbols: &'a SymbolTable,
        index: &'a ValueIndex<'a>,
    ) -> Box<dyn ValueTranslator + 'a> {
        Box::new(SeminaiveValueTranslator::new(self, context, symbols, index))
    }
}

/// Provenance-tracking translation
pub struct ProvenanceStrategy;

impl TranslationStrategy for ProvenanceStrategy {
    fn mode(&self) -> Mode {
        Mode::Provenance
    }

    fn create_unit_translator<'a>(
        &'a self,
        context: &'a TranslatorContext<'a>,
        symbols: &'a SymbolTable,
    ) -> Box<dyn UnitTranslator + 'a> {
        Box::new(ProvenanceUnitTranslator::new(self, context, symbols))
    }

    fn create_clause_translator<'a>(
        &'a self,
        context: &'a TranslatorContext<'a>,
        symbols: &'a SymbolTable,
    ) -> Box<dyn ClauseTranslator + 'a> {
        Box::new(ProvenanceClauseTranslator::new(self, context, symbols))
    }

    fn create_constraint_translator<'a>(
        &'a self,
        context: &'a TranslatorContext<'a>,
        symbols: &'a SymbolTable,
        index: &'a ValueIndex<'a>,
    ) -> Box<dyn ConstraintTranslator + 'a> {
        Box::new(SeminaiveConstraintTranslator::new(
            self, context, symbols, index,
        ))
    }

    fn create_value_translator<'a>(
        &'a self,
        context: &'a TranslatorContext<'a>,
        symbols: &'a SymbolTable,
        index: &'a ValueIndex<'a>,
    ) -> Box<dyn ValueTranslator + 'a> {
        Box::new(ProvenanceValueTranslator::new(self, context, symbols, index))
    }
}
