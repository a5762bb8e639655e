//! Lowering of validated Datalog programs to the RAM intermediate
//! representation
//!
//! This crate is the lowering stage of the Datalog pipeline: it consumes a
//! program that has passed semantic validation (together with the upstream
//! stratification result and a shared symbol table) and emits an
//! imperative RAM program for the downstream interpreter or code
//! generator.
//!
//! The behavior of the whole stage is swapped wholesale through a
//! [`Mode`]: `Plain` emits semi-naive evaluation, `Provenance` emits the
//! same evaluation extended with per-tuple derivation metadata (rule id
//! and derivation height columns, plus a rule-info side table) so that a
//! downstream explain query can reconstruct why any fact was derived. The
//! mode selects a [`TranslationStrategy`], the factory from which every
//! translator of the run is created; translators of different modes can
//! never be composed.
//!
//! # Example
//!
//! ```ignore
//! use datalog_lowering::{translate, Mode};
//! use datalog_ram::SymbolTable;
//!
//! let symbols = SymbolTable::new();
//! let ram = translate(&program, &analysis, &symbols, Mode::Plain)?;
//! println!("{}", ram);
//! ```

mod clause;
mod constraint;
mod context;
mod strategy;
mod unit;
mod value;
mod value_index;

pub use clause::{ClauseTranslator, ClauseVersion};
pub use constraint::ConstraintTranslator;
pub use context::TranslatorContext;
pub use strategy::{Mode, ProvenanceStrategy, SeminaiveStrategy, TranslationStrategy};
pub use unit::UnitTranslator;
pub use value::{AuxiliaryValue, ValueTranslator};
pub use value_index::{Location, ValueIndex};

use datalog_ast::{Clause, Program, ProgramAnalysis};
use datalog_ram::{RamProgram, SymbolTable};

/// Errors raised when an upstream guarantee turns out broken. Lowering a
/// valid input never fails; each variant is a defensive invariant check,
/// not normal control flow.
#[derive(Debug)]
pub enum LoweringError {
    /// A clause references a relation the program does not declare
    UnknownRelation { relation: String },
    /// A variable is used where no body atom binds it
    UnboundVariable { variable: String },
    /// A functor application names neither an intrinsic nor a declared
    /// functor
    UnknownFunctor { functor: String },
    /// The stratum assignment does not cover a relation
    MissingStratum { relation: String },
    /// An aggregate term is structurally broken
    MalformedAggregate { reason: String },
    /// A provenance-only value was requested from a plain-mode translator
    AuxiliaryInPlainMode,
    /// An error with the clause being translated attached
    InClause {
        clause: String,
        source: Box<LoweringError>,
    },
}

impl LoweringError {
    /// Attach the clause under translation to an error, once
    pub(crate) fn in_clause(self, clause: &Clause) -> LoweringError {
        match self {
            already @ LoweringError::InClause { .. } => already,
            source => LoweringError::InClause {
                clause: clause.to_string(),
                source: Box::new(source),
            },
        }
    }
}

impl std::fmt::Display for LoweringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoweringError::UnknownRelation { relation } => {
                write!(f, "unknown relation `{}`", relation)
            }
            LoweringError::UnboundVariable { variable } => {
                write!(f, "unbound variable `{}`", variable)
            }
            LoweringError::UnknownFunctor { functor } => {
                write!(f, "unknown functor `{}`", functor)
            }
            LoweringError::MissingStratum { relation } => {
                write!(f, "no stratum assigned to relation `{}`", relation)
            }
            LoweringError::MalformedAggregate { reason } => {
                write!(f, "malformed aggregate: {}", reason)
            }
            LoweringError::AuxiliaryInPlainMode => {
                write!(f, "auxiliary proof value requested in plain translation mode")
            }
            LoweringError::InClause { clause, source } => {
                write!(f, "in clause `{}`: {}", clause, source)
            }
        }
    }
}

impl std::error::Error for LoweringError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoweringError::InClause { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Translate a validated program to a RAM program.
///
/// `analysis` is the upstream stratification result; `symbols` is shared
/// with the caller so that interned ids stay meaningful to whoever runs
/// the emitted program. The mode is fixed for the whole run.
pub fn translate(
    program: &Program,
    analysis: &ProgramAnalysis,
    symbols: &SymbolTable,
    mode: Mode,
) -> Result<RamProgram, LoweringError> {
    let strategy = mode.strategy();
    let context = TranslatorContext::new(program, analysis);
    let unit = strategy.create_unit_translator(&context, symbols);
    unit.translate_program(program)
}
