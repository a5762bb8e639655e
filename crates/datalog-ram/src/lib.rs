//! Relational-algebra IR (RAM) emitted by the Datalog lowering stage
//!
//! These types are the lowering stage's output: an imperative program over
//! relations, ready for direct interpretation or further lowering to native
//! code. They are intentionally separate from the AST types to decouple
//! lowering from evaluation.
//!
//! The crate also hosts the [`SymbolTable`], the one piece of state shared
//! by reference across every translator of a lowering run: program string
//! constants are interned to dense numeric ids so that RAM values are
//! uniformly numbers.

mod ir;
mod symbol_table;

pub use ir::{
    delta_name, new_name, AggregateOp, ComparisonOp, Condition, Expr, Operation, RamAggregate,
    RamProgram, RamType, RamValue, RelationDecl, RuleInfo, Statement, Stratum,
};
pub use symbol_table::SymbolTable;
