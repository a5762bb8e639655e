//! Value translation: one Datalog term to one RAM expression
//!
//! Variables resolve through the value index, text constants intern through
//! the shared symbol table, functor applications lower argument-wise, and
//! aggregates become subquery expressions with their own child scope.
//! Provenance mode additionally answers requests for the auxiliary proof
//! columns of supporting tuples; in plain mode such a request is a
//! mode-composition defect and fails.

use crate::context::TranslatorContext;
use crate::strategy::TranslationStrategy;
use crate::value_index::{Location, ValueIndex};
use crate::LoweringError;
use datalog_ast::{Aggregate, AggregateOp, Constant, Symbol, Term};
use datalog_ram::{Condition, Expr, RamAggregate, SymbolTable};

/// Functors the RAM vocabulary understands without a user declaration
const INTRINSIC_FUNCTORS: &[&str] = &["+", "-", "*", "/", "%", "min", "max", "cat"];

/// A reference to provenance metadata, produced by provenance head
/// projections
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuxiliaryValue {
    /// The id of the clause that fired
    RuleId {
        relation: Symbol,
        clause_index: usize,
    },
    /// Derivation height of the supporting tuple bound at scan `tuple`
    Height { relation: Symbol, tuple: usize },
}

/// Lowers one value expression to a RAM expression
pub trait ValueTranslator {
    fn translate_value(&self, term: &Term) -> Result<Expr, LoweringError>;

    /// Lower a reference to auxiliary proof metadata. Only provenance-mode
    /// translators can answer this.
    fn translate_auxiliary(&self, auxiliary: &AuxiliaryValue) -> Result<Expr, LoweringError>;
}

pub struct SeminaiveValueTranslator<'a> {
    strategy: &'a dyn TranslationStrategy,
    context: &'a TranslatorContext<'a>,
    symbols: &'a SymbolTable,
    index: &'a ValueIndex<'a>,
}

impl<'a> SeminaiveValueTranslator<'a> {
    pub fn new(
        strategy: &'a dyn TranslationStrategy,
        context: &'a TranslatorContext<'a>,
        symbols: &'a SymbolTable,
        index: &'a ValueIndex<'a>,
    ) -> Self {
        SeminaiveValueTranslator {
            strategy,
            context,
            symbols,
            index,
        }
    }

    fn translate_aggregate(&self, aggregate: &Aggregate) -> Result<Expr, LoweringError> {
        let relation = self.context.relation(aggregate.pattern.relation)?;
        if aggregate.pattern.args.len() != relation.arity() {
            return Err(LoweringError::MalformedAggregate {
                reason: format!(
                    "pattern arity {} does not match relation {}/{}",
                    aggregate.pattern.args.len(),
                    relation.name,
                    relation.arity()
                ),
            });
        }
        if aggregate.target.is_none() && aggregate.op != AggregateOp::Count {
            return Err(LoweringError::MalformedAggregate {
                reason: format!("{} aggregate without a target expression", aggregate.op),
            });
        }

        let tuple = self.index.next_tuple();
        let mut scope = self.index.child();
        let mut pattern = Vec::with_capacity(aggregate.pattern.args.len());
        let mut conditions = Vec::new();

        for (column, arg) in aggregate.pattern.args.iter().enumerate() {
            match arg {
                Term::Variable(v) => {
                    if let Some(first) = scope.locations(*v).first().copied() {
                        // repeated aggregate-local variable: equality inside
                        // the aggregate's own scope
                        pattern.push(None);
                        conditions.push(Condition::Comparison {
                            op: datalog_ram::ComparisonOp::Equal,
                            left: Expr::TupleElement { tuple, column },
                            right: Expr::TupleElement {
                                tuple: first.tuple,
                                column: first.column,
                            },
                        });
                    } else if self.index.is_bound(*v) {
                        pattern.push(Some(self.translate_value(arg)?));
                    } else {
                        scope.bind(*v, Location { tuple, column });
                        pattern.push(None);
                    }
                }
                bound => pattern.push(Some(self.translate_value(bound)?)),
            }
        }

        let target = match &aggregate.target {
            Some(target) => {
                let inner = self
                    .strategy
                    .create_value_translator(self.context, self.symbols, &scope);
                Some(inner.translate_value(target)?)
            }
            None => None,
        };

        let condition = if conditions.is_empty() {
            None
        } else {
            Some(Condition::conjoin(conditions))
        };

        Ok(Expr::Aggregate(Box::new(RamAggregate {
            op: convert_aggregate_op(aggregate.op),
            relation: relation.name.to_string(),
            tuple,
            pattern,
            target,
            condition,
        })))
    }
}

impl ValueTranslator for SeminaiveValueTranslator<'_> {
    fn translate_value(&self, term: &Term) -> Result<Expr, LoweringError> {
        match term {
            Term::Variable(v) => {
                if let Some(location) = self.index.lookup(*v) {
                    Ok(Expr::TupleElement {
                        tuple: location.tuple,
                        column: location.column,
                    })
                } else if let Some(definition) = self.index.definition(*v) {
                    self.translate_value(definition)
                } else {
                    Err(LoweringError::UnboundVariable {
                        variable: v.to_string(),
                    })
                }
            }
            Term::Constant(Constant::Number(n)) => Ok(Expr::Number(*n)),
            Term::Constant(Constant::Text(s)) => Ok(Expr::Number(self.symbols.intern(s))),
            Term::Functor(name, args) => {
                if self.context.functor(*name).is_none()
                    && !INTRINSIC_FUNCTORS.contains(&name.as_ref().as_str())
                {
                    return Err(LoweringError::UnknownFunctor {
                        functor: name.to_string(),
                    });
                }
                let args = args
                    .iter()
                    .map(|arg| self.translate_value(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Expr::Functor {
                    name: name.to_string(),
                    args,
                })
            }
            Term::Aggregate(aggregate) => self.translate_aggregate(aggregate),
        }
    }

    fn translate_auxiliary(&self, _auxiliary: &AuxiliaryValue) -> Result<Expr, LoweringError> {
        Err(LoweringError::AuxiliaryInPlainMode)
    }
}

/// Provenance value translation: ordinary terms lower exactly as in plain
/// mode (through the same strategy, so aggregate subscopes stay in
/// provenance mode); auxiliary references resolve against the reserved
/// trailing columns of derived relations.
pub struct ProvenanceValueTranslator<'a> {
    seminaive: SeminaiveValueTranslator<'a>,
}

impl<'a> ProvenanceValueTranslator<'a> {
    pub fn new(
        strategy: &'a dyn TranslationStrategy,
        context: &'a TranslatorContext<'a>,
        symbols: &'a SymbolTable,
        index: &'a ValueIndex<'a>,
    ) -> Self {
        ProvenanceValueTranslator {
            seminaive: SeminaiveValueTranslator::new(strategy, context, symbols, index),
        }
    }
}

impl ValueTranslator for ProvenanceValueTranslator<'_> {
    fn translate_value(&self, term: &Term) -> Result<Expr, LoweringError> {
        self.seminaive.translate_value(term)
    }

    fn translate_auxiliary(&self, auxiliary: &AuxiliaryValue) -> Result<Expr, LoweringError> {
        let context = self.seminaive.context;
        match auxiliary {
            AuxiliaryValue::RuleId {
                relation,
                clause_index,
            } => context
                .rule_id(*relation, *clause_index)
                .map(Expr::Number)
                .ok_or_else(|| LoweringError::UnknownRelation {
                    relation: relation.to_string(),
                }),
            AuxiliaryValue::Height { relation, tuple } => {
                let decl = context.relation(*relation)?;
                if context.is_derived(*relation) {
                    // height is the second auxiliary column
                    Ok(Expr::TupleElement {
                        tuple: *tuple,
                        column: decl.arity() + 1,
                    })
                } else {
                    // extensional support contributes height 0
                    Ok(Expr::Number(0))
                }
            }
        }
    }
}

pub(crate) fn convert_aggregate_op(op: AggregateOp) -> datalog_ram::AggregateOp {
    match op {
        AggregateOp::Count => datalog_ram::AggregateOp::Count,
        AggregateOp::Sum => datalog_ram::AggregateOp::Sum,
        AggregateOp::Min => datalog_ram::AggregateOp::Min,
        AggregateOp::Max => datalog_ram::AggregateOp::Max,
    }
}
