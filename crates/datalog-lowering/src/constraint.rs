//! Constraint translation: one body constraint to one RAM condition
//!
//! Comparisons lower operand-wise; a negated atom lowers to a
//! non-membership test against the target relation over the bound argument
//! values. Negation never needs delta treatment: stratification places the
//! negated relation in an earlier stratum, fully computed by the time the
//! condition runs. Both modes share these rules — in provenance mode the
//! value list covers the data columns only, which the prefix semantics of
//! [`Condition::NotExists`] interpret as ignoring the auxiliary columns.

use crate::context::TranslatorContext;
use crate::strategy::TranslationStrategy;
use crate::value::ValueTranslator;
use crate::value_index::ValueIndex;
use crate::LoweringError;
use datalog_ast::{ComparisonOp, Literal};
use datalog_ram::{Condition, SymbolTable};

/// Lowers one body constraint to a RAM condition
pub trait ConstraintTranslator {
    fn translate_constraint(&self, literal: &Literal) -> Result<Condition, LoweringError>;
}

pub struct SeminaiveConstraintTranslator<'a> {
    strategy: &'a dyn TranslationStrategy,
    context: &'a TranslatorContext<'a>,
    symbols: &'a SymbolTable,
    index: &'a ValueIndex<'a>,
}

impl<'a> SeminaiveConstraintTranslator<'a> {
    pub fn new(
        strategy: &'a dyn TranslationStrategy,
        context: &'a TranslatorContext<'a>,
        symbols: &'a SymbolTable,
        index: &'a ValueIndex<'a>,
    ) -> Self {
        SeminaiveConstraintTranslator {
            strategy,
            context,
            symbols,
            index,
        }
    }
}

impl ConstraintTranslator for SeminaiveConstraintTranslator<'_> {
    fn translate_constraint(&self, literal: &Literal) -> Result<Condition, LoweringError> {
        let values = self
            .strategy
            .create_value_translator(self.context, self.symbols, self.index);
        match literal {
            Literal::Constraint(constraint) => Ok(Condition::Comparison {
                op: convert_comparison_op(constraint.op),
                left: values.translate_value(&constraint.left)?,
                right: values.translate_value(&constraint.right)?,
            }),
            Literal::Negated(atom) => {
                self.context.relation(atom.relation)?;
                let args = atom
                    .args
                    .iter()
                    .map(|arg| values.translate_value(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Condition::NotExists {
                    relation: atom.relation.to_string(),
                    values: args,
                })
            }
            Literal::Atom(_) => unreachable!("positive atoms are lowered as scans, not conditions"),
        }
    }
}

pub(crate) fn convert_comparison_op(op: ComparisonOp) -> datalog_ram::ComparisonOp {
    match op {
        ComparisonOp::Equal => datalog_ram::ComparisonOp::Equal,
        ComparisonOp::NotEqual => datalog_ram::ComparisonOp::NotEqual,
        ComparisonOp::LessThan => datalog_ram::ComparisonOp::LessThan,
        ComparisonOp::LessOrEqual => datalog_ram::ComparisonOp::LessOrEqual,
        ComparisonOp::GreaterThan => datalog_ram::ComparisonOp::GreaterThan,
        ComparisonOp::GreaterOrEqual => datalog_ram::ComparisonOp::GreaterOrEqual,
    }
}
