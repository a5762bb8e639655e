//! Clause translation: one Datalog clause to one RAM insert statement
//!
//! Lowering runs in two passes over the clause. The indexing pass walks the
//! positive body atoms in written order, assigning one scan level per atom
//! and recording, for every variable, where it first becomes available; it
//! also detects equalities that define otherwise-unbound variables
//! (aggregate results and computed values). The emission pass then builds
//! the operation tree inside-out: the head projection, the optional
//! frontier guard of a semi-naive version, and per level the accumulated
//! equality and constraint conditions under that level's scan.
//!
//! Negations and comparison constraints attach at the shallowest level at
//! which all their variables are bound, so they prune the loop nest as
//! early as possible.

use crate::constraint::ConstraintTranslator;
use crate::context::TranslatorContext;
use crate::strategy::TranslationStrategy;
use crate::value::{AuxiliaryValue, ValueTranslator};
use crate::value_index::{Location, ValueIndex};
use crate::LoweringError;
use datalog_ast::{Atom, Clause, ComparisonOp, Literal, Relation, Term};
use datalog_ram::{delta_name, Condition, Expr, Operation, Statement, SymbolTable};

/// Selects the semi-naive rewrite variant of a clause: which relation the
/// head projects into, which positive-atom occurrence (if any) scans the
/// delta relation, and which relation the projected tuple must not already
/// be in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseVersion {
    pub destination: String,
    pub delta_atom: Option<usize>,
    pub frontier_check: Option<String>,
}

impl ClauseVersion {
    /// The single-pass variant: project straight into the relation
    pub fn direct(destination: impl Into<String>) -> Self {
        ClauseVersion {
            destination: destination.into(),
            delta_atom: None,
            frontier_check: None,
        }
    }
}

/// Lowers one clause to a RAM statement
pub trait ClauseTranslator {
    fn translate_clause(
        &self,
        relation: &Relation,
        clause: &Clause,
        clause_index: usize,
        version: &ClauseVersion,
    ) -> Result<Statement, LoweringError>;
}

pub struct SeminaiveClauseTranslator<'a> {
    strategy: &'a dyn TranslationStrategy,
    context: &'a TranslatorContext<'a>,
    symbols: &'a SymbolTable,
}

impl<'a> SeminaiveClauseTranslator<'a> {
    pub fn new(
        strategy: &'a dyn TranslationStrategy,
        context: &'a TranslatorContext<'a>,
        symbols: &'a SymbolTable,
    ) -> Self {
        SeminaiveClauseTranslator {
            strategy,
            context,
            symbols,
        }
    }
}

impl ClauseTranslator for SeminaiveClauseTranslator<'_> {
    fn translate_clause(
        &self,
        relation: &Relation,
        clause: &Clause,
        clause_index: usize,
        version: &ClauseVersion,
    ) -> Result<Statement, LoweringError> {
        lower_clause(
            self.strategy,
            self.context,
            self.symbols,
            relation,
            clause,
            clause_index,
            version,
            false,
        )
    }
}

/// Provenance clause translation: the same loop nest, with the head
/// projection extended by the rule-id constant and the derivation-height
/// expression, both obtained through the provenance value translator.
pub struct ProvenanceClauseTranslator<'a> {
    strategy: &'a dyn TranslationStrategy,
    context: &'a TranslatorContext<'a>,
    symbols: &'a SymbolTable,
}

impl<'a> ProvenanceClauseTranslator<'a> {
    pub fn new(
        strategy: &'a dyn TranslationStrategy,
        context: &'a TranslatorContext<'a>,
        symbols: &'a SymbolTable,
    ) -> Self {
        ProvenanceClauseTranslator {
            strategy,
            context,
            symbols,
        }
    }
}

impl ClauseTranslator for ProvenanceClauseTranslator<'_> {
    fn translate_clause(
        &self,
        relation: &Relation,
        clause: &Clause,
        clause_index: usize,
        version: &ClauseVersion,
    ) -> Result<Statement, LoweringError> {
        lower_clause(
            self.strategy,
            self.context,
            self.symbols,
            relation,
            clause,
            clause_index,
            version,
            true,
        )
    }
}

#[allow(clippy::too_many_arguments)]
fn lower_clause(
    strategy: &dyn TranslationStrategy,
    context: &TranslatorContext<'_>,
    symbols: &SymbolTable,
    relation: &Relation,
    clause: &Clause,
    clause_index: usize,
    version: &ClauseVersion,
    provenance: bool,
) -> Result<Statement, LoweringError> {
    build_clause(
        strategy,
        context,
        symbols,
        relation,
        clause,
        clause_index,
        version,
        provenance,
    )
    .map_err(|error| error.in_clause(clause))
}

#[allow(clippy::too_many_arguments)]
fn build_clause(
    strategy: &dyn TranslationStrategy,
    context: &TranslatorContext<'_>,
    symbols: &SymbolTable,
    relation: &Relation,
    clause: &Clause,
    clause_index: usize,
    version: &ClauseVersion,
    provenance: bool,
) -> Result<Statement, LoweringError> {
    let atoms: Vec<&Atom> = clause.positive_atoms().collect();

    // Indexing pass: one scan level per atom, first binding wins. Every
    // argument that is not a fresh variable is deferred as an equality at
    // its atom's level.
    let mut index = ValueIndex::new();
    let mut atom_equalities: Vec<Vec<(Location, &Term)>> = vec![Vec::new(); atoms.len()];
    for (tuple, atom) in atoms.iter().enumerate() {
        context.relation(atom.relation)?;
        for (column, arg) in atom.args.iter().enumerate() {
            let location = Location { tuple, column };
            match arg {
                Term::Variable(v) => {
                    let seen = index.is_bound(*v);
                    index.bind(*v, location);
                    if seen {
                        atom_equalities[tuple].push((location, arg));
                    }
                }
                _ => atom_equalities[tuple].push((location, arg)),
            }
        }
    }

    // An equality against an otherwise-unbound variable defines that
    // variable (aggregate results, computed values); the defining literal
    // emits no runtime condition.
    let mut defining = vec![false; clause.body.len()];
    for (position, literal) in clause.body.iter().enumerate() {
        let Literal::Constraint(constraint) = literal else {
            continue;
        };
        if constraint.op != ComparisonOp::Equal {
            continue;
        }
        match (&constraint.left, &constraint.right) {
            (Term::Variable(v), definition) | (definition, Term::Variable(v))
                if !index.is_bound(*v) =>
            {
                let mut variables = Vec::new();
                definition.collect_variables(&mut variables);
                if !variables.contains(v) {
                    index.define(*v, definition);
                    defining[position] = true;
                }
            }
            _ => {}
        }
    }

    // Placement: each remaining negation/constraint attaches at the
    // shallowest level where all its variables are available.
    let mut placed: Vec<Vec<&Literal>> = vec![Vec::new(); atoms.len() + 1];
    for (position, literal) in clause.body.iter().enumerate() {
        match literal {
            Literal::Atom(_) => {}
            Literal::Negated(_) | Literal::Constraint(_) => {
                if defining[position] {
                    continue;
                }
                let mut variables = Vec::new();
                literal.collect_variables(&mut variables);
                let depth = variables
                    .into_iter()
                    .filter_map(|v| index.depth_of(v))
                    .max()
                    .unwrap_or(0);
                placed[depth].push(literal);
            }
        }
    }

    // Emission pass
    let values = strategy.create_value_translator(context, symbols, &index);
    let constraints = strategy.create_constraint_translator(context, symbols, &index);

    let mut head_values = clause
        .head
        .args
        .iter()
        .map(|arg| values.translate_value(arg))
        .collect::<Result<Vec<_>, _>>()?;

    // The frontier guard compares data columns only; in provenance mode the
    // prefix semantics of the non-membership test skip the auxiliary
    // columns.
    let frontier = version.frontier_check.as_ref().map(|checked| Condition::NotExists {
        relation: checked.clone(),
        values: head_values.clone(),
    });

    if provenance {
        head_values.push(values.translate_auxiliary(&AuxiliaryValue::RuleId {
            relation: relation.name,
            clause_index,
        })?);
        head_values.push(height_expr(values.as_ref(), &atoms)?);
    }

    let mut level_conditions: Vec<Vec<Condition>> = vec![Vec::new(); atoms.len() + 1];
    for (tuple, equalities) in atom_equalities.iter().enumerate() {
        for (location, term) in equalities {
            level_conditions[tuple + 1].push(Condition::Comparison {
                op: datalog_ram::ComparisonOp::Equal,
                left: Expr::TupleElement {
                    tuple: location.tuple,
                    column: location.column,
                },
                right: values.translate_value(term)?,
            });
        }
    }
    for (depth, literals) in placed.iter().enumerate() {
        for literal in literals {
            level_conditions[depth].push(constraints.translate_constraint(literal)?);
        }
    }

    let mut operation = Operation::Project {
        relation: version.destination.clone(),
        values: head_values,
    };
    if let Some(condition) = frontier {
        operation = Operation::Filter {
            condition,
            body: Box::new(operation),
        };
    }
    for tuple in (0..atoms.len()).rev() {
        let conditions = std::mem::take(&mut level_conditions[tuple + 1]);
        if !conditions.is_empty() {
            operation = Operation::Filter {
                condition: Condition::conjoin(conditions),
                body: Box::new(operation),
            };
        }
        let scanned = if version.delta_atom == Some(tuple) {
            delta_name(atoms[tuple].relation.as_ref())
        } else {
            atoms[tuple].relation.to_string()
        };
        operation = Operation::Scan {
            relation: scanned,
            tuple,
            body: Box::new(operation),
        };
    }
    let ground = std::mem::take(&mut level_conditions[0]);
    if !ground.is_empty() {
        operation = Operation::Filter {
            condition: Condition::conjoin(ground),
            body: Box::new(operation),
        };
    }

    Ok(Statement::Insert(operation))
}

/// Derivation height of the projected tuple: 0 for facts, otherwise one
/// more than the maximum height among the supporting tuples.
fn height_expr(values: &dyn ValueTranslator, atoms: &[&Atom]) -> Result<Expr, LoweringError> {
    let mut heights = Vec::with_capacity(atoms.len());
    for (tuple, atom) in atoms.iter().enumerate() {
        heights.push(values.translate_auxiliary(&AuxiliaryValue::Height {
            relation: atom.relation,
            tuple,
        })?);
    }
    let Some(mut tallest) = heights.pop() else {
        return Ok(Expr::Number(0));
    };
    while let Some(height) = heights.pop() {
        tallest = Expr::Functor {
            name: "max".to_string(),
            args: vec![height, tallest],
        };
    }
    Ok(Expr::Functor {
        name: "+".to_string(),
        args: vec![Expr::Number(1), tallest],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::Mode;
    use datalog_ast::{
        Aggregate, AggregateOp, Attribute, AttributeType, Constraint, Program, ProgramAnalysis,
        Symbol,
    };
    use internment::Intern;
    use std::collections::{HashMap, HashSet};

    fn sym(s: &str) -> Symbol {
        Intern::new(s.to_string())
    }

    fn attr(name: &str) -> Attribute {
        Attribute {
            name: sym(name),
            ty: AttributeType::Number,
        }
    }

    fn element(tuple: usize, column: usize) -> Expr {
        Expr::TupleElement { tuple, column }
    }

    /// edge and visited are extensional; reach and total are derived
    fn test_program() -> Program {
        Program {
            relations: vec![
                Relation {
                    name: sym("edge"),
                    attributes: vec![attr("x"), attr("y")],
                    clauses: vec![],
                },
                Relation {
                    name: sym("visited"),
                    attributes: vec![attr("x")],
                    clauses: vec![],
                },
                Relation {
                    name: sym("reach"),
                    attributes: vec![attr("x"), attr("y")],
                    clauses: vec![Clause {
                        head: Atom::new("reach", vec![Term::variable("X"), Term::variable("Y")]),
                        body: vec![Literal::Atom(Atom::new(
                            "edge",
                            vec![Term::variable("X"), Term::variable("Y")],
                        ))],
                    }],
                },
                Relation {
                    name: sym("total"),
                    attributes: vec![attr("n")],
                    clauses: vec![],
                },
            ],
            functors: vec![],
        }
    }

    fn test_analysis() -> ProgramAnalysis {
        ProgramAnalysis::new(
            HashMap::from([
                (sym("edge"), 0),
                (sym("visited"), 0),
                (sym("reach"), 1),
                (sym("total"), 2),
            ]),
            HashSet::from([sym("reach")]),
        )
    }

    fn translate(
        mode: Mode,
        relation_name: &str,
        clause: &Clause,
        version: &ClauseVersion,
    ) -> Result<Statement, LoweringError> {
        let program = test_program();
        let analysis = test_analysis();
        let context = TranslatorContext::new(&program, &analysis);
        let symbols = SymbolTable::new();
        let strategy = mode.strategy();
        let relation = program.relation(sym(relation_name)).unwrap();
        let translator = strategy.create_clause_translator(&context, &symbols);
        translator.translate_clause(relation, clause, 0, version)
    }

    #[test]
    fn test_single_atom_clause() {
        let clause = Clause {
            head: Atom::new("reach", vec![Term::variable("X"), Term::variable("Y")]),
            body: vec![Literal::Atom(Atom::new(
                "edge",
                vec![Term::variable("X"), Term::variable("Y")],
            ))],
        };

        let statement =
            translate(Mode::Plain, "reach", &clause, &ClauseVersion::direct("reach")).unwrap();
        assert_eq!(
            statement,
            Statement::Insert(Operation::Scan {
                relation: "edge".to_string(),
                tuple: 0,
                body: Box::new(Operation::Project {
                    relation: "reach".to_string(),
                    values: vec![element(0, 0), element(0, 1)],
                }),
            })
        );
    }

    #[test]
    fn test_repeated_variable_emits_equality_join() {
        // reach(X, Y) :- reach(X, Z), edge(Z, Y).
        let clause = Clause {
            head: Atom::new("reach", vec![Term::variable("X"), Term::variable("Y")]),
            body: vec![
                Literal::Atom(Atom::new(
                    "reach",
                    vec![Term::variable("X"), Term::variable("Z")],
                )),
                Literal::Atom(Atom::new(
                    "edge",
                    vec![Term::variable("Z"), Term::variable("Y")],
                )),
            ],
        };

        let statement =
            translate(Mode::Plain, "reach", &clause, &ClauseVersion::direct("reach")).unwrap();
        // Z is authoritative at t0.1; its recurrence at t1.0 becomes an
        // equality, not a re-binding
        assert_eq!(
            statement,
            Statement::Insert(Operation::Scan {
                relation: "reach".to_string(),
                tuple: 0,
                body: Box::new(Operation::Scan {
                    relation: "edge".to_string(),
                    tuple: 1,
                    body: Box::new(Operation::Filter {
                        condition: Condition::Comparison {
                            op: datalog_ram::ComparisonOp::Equal,
                            left: element(1, 0),
                            right: element(0, 1),
                        },
                        body: Box::new(Operation::Project {
                            relation: "reach".to_string(),
                            values: vec![element(0, 0), element(1, 1)],
                        }),
                    }),
                }),
            })
        );
    }

    #[test]
    fn test_delta_version_scans_delta_and_guards_frontier() {
        let clause = Clause {
            head: Atom::new("reach", vec![Term::variable("X"), Term::variable("Y")]),
            body: vec![
                Literal::Atom(Atom::new(
                    "reach",
                    vec![Term::variable("X"), Term::variable("Z")],
                )),
                Literal::Atom(Atom::new(
                    "edge",
                    vec![Term::variable("Z"), Term::variable("Y")],
                )),
            ],
        };
        let version = ClauseVersion {
            destination: "@new_reach".to_string(),
            delta_atom: Some(0),
            frontier_check: Some("reach".to_string()),
        };

        let statement = translate(Mode::Plain, "reach", &clause, &version).unwrap();
        assert_eq!(
            statement,
            Statement::Insert(Operation::Scan {
                relation: "@delta_reach".to_string(),
                tuple: 0,
                body: Box::new(Operation::Scan {
                    relation: "edge".to_string(),
                    tuple: 1,
                    body: Box::new(Operation::Filter {
                        condition: Condition::Comparison {
                            op: datalog_ram::ComparisonOp::Equal,
                            left: element(1, 0),
                            right: element(0, 1),
                        },
                        body: Box::new(Operation::Filter {
                            condition: Condition::NotExists {
                                relation: "reach".to_string(),
                                values: vec![element(0, 0), element(1, 1)],
                            },
                            body: Box::new(Operation::Project {
                                relation: "@new_reach".to_string(),
                                values: vec![element(0, 0), element(1, 1)],
                            }),
                        }),
                    }),
                }),
            })
        );
    }

    #[test]
    fn test_constant_argument_becomes_equality() {
        // reach(X, Y) :- edge(X, Y), edge(1, X).
        let clause = Clause {
            head: Atom::new("reach", vec![Term::variable("X"), Term::variable("Y")]),
            body: vec![
                Literal::Atom(Atom::new(
                    "edge",
                    vec![Term::variable("X"), Term::variable("Y")],
                )),
                Literal::Atom(Atom::new("edge", vec![Term::number(1), Term::variable("X")])),
            ],
        };

        let statement =
            translate(Mode::Plain, "reach", &clause, &ClauseVersion::direct("reach")).unwrap();
        assert_eq!(
            statement,
            Statement::Insert(Operation::Scan {
                relation: "edge".to_string(),
                tuple: 0,
                body: Box::new(Operation::Scan {
                    relation: "edge".to_string(),
                    tuple: 1,
                    body: Box::new(Operation::Filter {
                        condition: Condition::Conjunction(vec![
                            Condition::Comparison {
                                op: datalog_ram::ComparisonOp::Equal,
                                left: element(1, 0),
                                right: Expr::Number(1),
                            },
                            Condition::Comparison {
                                op: datalog_ram::ComparisonOp::Equal,
                                left: element(1, 1),
                                right: element(0, 0),
                            },
                        ]),
                        body: Box::new(Operation::Project {
                            relation: "reach".to_string(),
                            values: vec![element(0, 0), element(0, 1)],
                        }),
                    }),
                }),
            })
        );
    }

    #[test]
    fn test_constraint_placed_at_earliest_level() {
        // reach(X, Y) :- edge(X, Z), X < Z, edge(Z, Y).
        // X and Z are both available after the first scan, so the
        // comparison prunes before the second scan opens.
        let clause = Clause {
            head: Atom::new("reach", vec![Term::variable("X"), Term::variable("Y")]),
            body: vec![
                Literal::Atom(Atom::new(
                    "edge",
                    vec![Term::variable("X"), Term::variable("Z")],
                )),
                Literal::Constraint(Constraint {
                    left: Term::variable("X"),
                    op: ComparisonOp::LessThan,
                    right: Term::variable("Z"),
                }),
                Literal::Atom(Atom::new(
                    "edge",
                    vec![Term::variable("Z"), Term::variable("Y")],
                )),
            ],
        };

        let statement =
            translate(Mode::Plain, "reach", &clause, &ClauseVersion::direct("reach")).unwrap();
        assert_eq!(
            statement,
            Statement::Insert(Operation::Scan {
                relation: "edge".to_string(),
                tuple: 0,
                body: Box::new(Operation::Filter {
                    condition: Condition::Comparison {
                        op: datalog_ram::ComparisonOp::LessThan,
                        left: element(0, 0),
                        right: element(0, 1),
                    },
                    body: Box::new(Operation::Scan {
                        relation: "edge".to_string(),
                        tuple: 1,
                        body: Box::new(Operation::Filter {
                            condition: Condition::Comparison {
                                op: datalog_ram::ComparisonOp::Equal,
                                left: element(1, 0),
                                right: element(0, 1),
                            },
                            body: Box::new(Operation::Project {
                                relation: "reach".to_string(),
                                values: vec![element(0, 0), element(1, 1)],
                            }),
                        }),
                    }),
                }),
            })
        );
    }

    #[test]
    fn test_negation_placed_after_binding() {
        // reach(X, X) :- edge(X, Y), not visited(Y).
        let clause = Clause {
            head: Atom::new("reach", vec![Term::variable("X"), Term::variable("X")]),
            body: vec![
                Literal::Atom(Atom::new(
                    "edge",
                    vec![Term::variable("X"), Term::variable("Y")],
                )),
                Literal::Negated(Atom::new("visited", vec![Term::variable("Y")])),
            ],
        };

        let statement =
            translate(Mode::Plain, "reach", &clause, &ClauseVersion::direct("reach")).unwrap();
        assert_eq!(
            statement,
            Statement::Insert(Operation::Scan {
                relation: "edge".to_string(),
                tuple: 0,
                body: Box::new(Operation::Filter {
                    condition: Condition::NotExists {
                        relation: "visited".to_string(),
                        values: vec![element(0, 1)],
                    },
                    body: Box::new(Operation::Project {
                        relation: "reach".to_string(),
                        values: vec![element(0, 0), element(0, 0)],
                    }),
                }),
            })
        );
    }

    #[test]
    fn test_fact_projects_without_scans() {
        let clause = Clause {
            head: Atom::new("reach", vec![Term::number(1), Term::number(2)]),
            body: vec![],
        };

        let statement =
            translate(Mode::Plain, "reach", &clause, &ClauseVersion::direct("reach")).unwrap();
        assert_eq!(
            statement,
            Statement::Insert(Operation::Project {
                relation: "reach".to_string(),
                values: vec![Expr::Number(1), Expr::Number(2)],
            })
        );
    }

    #[test]
    fn test_aggregate_bound_head_variable() {
        // total(C) :- C = count : edge(X, Y).
        let clause = Clause {
            head: Atom::new("total", vec![Term::variable("C")]),
            body: vec![Literal::Constraint(Constraint {
                left: Term::variable("C"),
                op: ComparisonOp::Equal,
                right: Term::Aggregate(Box::new(Aggregate {
                    op: AggregateOp::Count,
                    pattern: Atom::new("edge", vec![Term::variable("X"), Term::variable("Y")]),
                    target: None,
                })),
            })],
        };

        let statement =
            translate(Mode::Plain, "total", &clause, &ClauseVersion::direct("total")).unwrap();
        // The defining equality emits no condition; the aggregate lowers at
        // the head use site.
        assert_eq!(
            statement,
            Statement::Insert(Operation::Project {
                relation: "total".to_string(),
                values: vec![Expr::Aggregate(Box::new(datalog_ram::RamAggregate {
                    op: datalog_ram::AggregateOp::Count,
                    relation: "edge".to_string(),
                    tuple: 0,
                    pattern: vec![None, None],
                    target: None,
                    condition: None,
                }))],
            })
        );
    }

    #[test]
    fn test_unbound_head_variable_is_fatal_with_clause_context() {
        let clause = Clause {
            head: Atom::new("reach", vec![Term::variable("X"), Term::variable("Y")]),
            body: vec![Literal::Atom(Atom::new("edge", vec![Term::variable("X"), Term::number(3)]))],
        };

        let error = translate(Mode::Plain, "reach", &clause, &ClauseVersion::direct("reach"))
            .unwrap_err();
        match error {
            LoweringError::InClause { clause: text, source } => {
                assert!(text.contains("reach(X, Y)"));
                assert!(matches!(
                    *source,
                    LoweringError::UnboundVariable { .. }
                ));
            }
            other => panic!("expected clause-wrapped error, got {:?}", other),
        }
    }

    #[test]
    fn test_provenance_projection_carries_rule_id_and_height() {
        let clause = Clause {
            head: Atom::new("reach", vec![Term::variable("X"), Term::variable("Y")]),
            body: vec![Literal::Atom(Atom::new(
                "edge",
                vec![Term::variable("X"), Term::variable("Y")],
            ))],
        };

        let statement = translate(
            Mode::Provenance,
            "reach",
            &clause,
            &ClauseVersion::direct("reach"),
        )
        .unwrap();
        // reach's only clause has global rule id 0; edge is extensional so
        // the height is 1 + 0
        assert_eq!(
            statement,
            Statement::Insert(Operation::Scan {
                relation: "edge".to_string(),
                tuple: 0,
                body: Box::new(Operation::Project {
                    relation: "reach".to_string(),
                    values: vec![
                        element(0, 0),
                        element(0, 1),
                        Expr::Number(0),
                        Expr::Functor {
                            name: "+".to_string(),
                            args: vec![Expr::Number(1), Expr::Number(0)],
                        },
                    ],
                }),
            })
        );
    }

    #[test]
    fn test_provenance_height_over_recursive_support() {
        // reach(X, Y) :- reach(X, Z), edge(Z, Y).  reach carries auxiliary
        // columns, so its height column (arity + 1 = 3) feeds the formula.
        let clause = Clause {
            head: Atom::new("reach", vec![Term::variable("X"), Term::variable("Y")]),
            body: vec![
                Literal::Atom(Atom::new(
                    "reach",
                    vec![Term::variable("X"), Term::variable("Z")],
                )),
                Literal::Atom(Atom::new(
                    "edge",
                    vec![Term::variable("Z"), Term::variable("Y")],
                )),
            ],
        };

        let statement = translate(
            Mode::Provenance,
            "reach",
            &clause,
            &ClauseVersion::direct("reach"),
        )
        .unwrap();
        let Statement::Insert(operation) = statement else {
            panic!("expected insert");
        };
        let mut projected: Option<Vec<Expr>> = None;
        let mut cursor = &operation;
        loop {
            match cursor {
                Operation::Scan { body, .. } | Operation::Filter { body, .. } => cursor = body,
                Operation::Project { values, .. } => {
                    projected = Some(values.clone());
                    break;
                }
            }
        }
        let values = projected.unwrap();
        assert_eq!(
            values[3],
            Expr::Functor {
                name: "+".to_string(),
                args: vec![
                    Expr::Number(1),
                    Expr::Functor {
                        name: "max".to_string(),
                        args: vec![element(0, 3), Expr::Number(0)],
                    },
                ],
            }
        );
    }
}
