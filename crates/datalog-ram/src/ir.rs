//! RAM program types
//!
//! A RAM program is an ordered set of relation declarations plus one block
//! of statements per stratum. Statements insert tuples via nested
//! scan/filter/project operation trees, move tuples wholesale between
//! relations, or loop to a fixpoint. Expressions and conditions form the
//! value vocabulary inside operation trees.
//!
//! Tuple references are positional: `Scan` binds tuple number `t`, and
//! `TupleElement { tuple: t, column: c }` reads column `c` of that tuple
//! anywhere inside the scan's body (or inside an aggregate's own scope for
//! the aggregate's tuple number).

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// The RAM value domain. Numbers are themselves; text constants are
/// symbol-table ids.
pub type RamValue = i64;

/// Name of the semi-naive delta twin of a relation. The `@` prefix is
/// reserved and cannot collide with source relation names.
pub fn delta_name(relation: &str) -> String {
    format!("@delta_{}", relation)
}

/// Name of the semi-naive accumulator twin of a relation
pub fn new_name(relation: &str) -> String {
    format!("@new_{}", relation)
}

/// A complete RAM program: declarations, one statement block per stratum,
/// and (in provenance mode) the rule-info side table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RamProgram {
    pub declarations: Vec<RelationDecl>,
    pub strata: Vec<Stratum>,
    /// Provenance side table mapping rule ids to their source clauses;
    /// empty in plain mode
    pub rule_info: Vec<RuleInfo>,
}

/// A declared RAM relation. `auxiliary` counts the trailing provenance
/// columns included in `attributes` (0 in plain mode, 2 on derived
/// relations in provenance mode).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDecl {
    pub name: String,
    pub attributes: Vec<(String, RamType)>,
    pub auxiliary: usize,
}

impl RelationDecl {
    /// Total number of columns, auxiliary included
    pub fn arity(&self) -> usize {
        self.attributes.len()
    }

    /// Number of data columns
    pub fn data_arity(&self) -> usize {
        self.attributes.len() - self.auxiliary
    }
}

/// Column types in the RAM value domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RamType {
    Number,
    Text,
}

/// The statement block of one stratum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Stratum {
    pub statements: Vec<Statement>,
}

/// Imperative statements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statement {
    /// Run an operation tree, inserting projected tuples
    Insert(Operation),
    /// Add every tuple of `source` to `target`
    Merge { source: String, target: String },
    /// Remove every tuple of the relation
    Clear(String),
    /// Repeat the body until an `Exit` fires
    Loop(Vec<Statement>),
    /// Leave the enclosing `Loop` when the condition holds
    Exit(Condition),
}

/// Nested tuple-at-a-time operations forming one insert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Iterate the relation, binding tuple number `tuple` in `body`
    Scan {
        relation: String,
        tuple: usize,
        body: Box<Operation>,
    },
    /// Evaluate `body` only when the condition holds
    Filter {
        condition: Condition,
        body: Box<Operation>,
    },
    /// Insert one tuple built from `values` into the relation
    Project { relation: String, values: Vec<Expr> },
}

/// Boolean conditions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    Comparison {
        op: ComparisonOp,
        left: Expr,
        right: Expr,
    },
    /// Non-membership test. Fewer values than the relation's arity is a
    /// prefix test over the leading columns; provenance existence checks
    /// use this to ignore the auxiliary columns.
    NotExists { relation: String, values: Vec<Expr> },
    /// True when the relation holds no tuples
    Empty(String),
    Conjunction(Vec<Condition>),
}

impl Condition {
    /// Collapse a list of conditions into one. A single condition stays
    /// bare; an empty list is the vacuously true conjunction.
    pub fn conjoin(mut conditions: Vec<Condition>) -> Condition {
        if conditions.len() == 1 {
            conditions.pop().unwrap()
        } else {
            Condition::Conjunction(conditions)
        }
    }
}

/// Comparison operators over RAM values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
}

/// Value expressions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    /// A literal RAM value (a number, or an interned text id)
    Number(RamValue),
    /// Column `column` of the tuple bound by scan (or aggregate) `tuple`
    TupleElement { tuple: usize, column: usize },
    /// Functor application; intrinsic arithmetic keeps its operator name
    /// (`"+"`, `"max"`, ...), user functors their declared name
    Functor { name: String, args: Vec<Expr> },
    /// Aggregate subquery
    Aggregate(Box<RamAggregate>),
}

/// An aggregate subquery: scan `relation` binding tuple number `tuple`;
/// `pattern[i] = Some(e)` constrains column `i` to equal `e` (an
/// outer-scope expression), `None` leaves it free. `target` and
/// `condition` are evaluated per matching tuple in the aggregate's own
/// scope; `Count` has no target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RamAggregate {
    pub op: AggregateOp,
    pub relation: String,
    pub tuple: usize,
    pub pattern: Vec<Option<Expr>>,
    pub target: Option<Expr>,
    pub condition: Option<Condition>,
}

/// Aggregate operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregateOp {
    Count,
    Sum,
    Min,
    Max,
}

/// Provenance rule-info record: enough, together with the rule-id and
/// height columns on derived tuples, for a downstream explain query to
/// reconstruct a derivation tree. `body_relations` lists the relations of
/// the positive body atoms in scan order; the supporting tuples of a
/// derivation step come from these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleInfo {
    pub rule_id: RamValue,
    pub relation: String,
    pub clause_text: String,
    pub body_relations: Vec<String>,
}

// Display: one-line renderings for expressions and conditions, indented
// listings for statements and whole programs.

impl std::fmt::Display for RamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RamType::Number => write!(f, "number"),
            RamType::Text => write!(f, "text"),
        }
    }
}

impl std::fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComparisonOp::Equal => write!(f, "="),
            ComparisonOp::NotEqual => write!(f, "!="),
            ComparisonOp::LessThan => write!(f, "<"),
            ComparisonOp::LessOrEqual => write!(f, "<="),
            ComparisonOp::GreaterThan => write!(f, ">"),
            ComparisonOp::GreaterOrEqual => write!(f, ">="),
        }
    }
}

impl std::fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateOp::Count => write!(f, "count"),
            AggregateOp::Sum => write!(f, "sum"),
            AggregateOp::Min => write!(f, "min"),
            AggregateOp::Max => write!(f, "max"),
        }
    }
}

/// Operator names rendered infix when applied to two arguments
const INFIX_FUNCTORS: &[&str] = &["+", "-", "*", "/", "%"];

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::TupleElement { tuple, column } => write!(f, "t{}.{}", tuple, column),
            Expr::Functor { name, args } => {
                if args.len() == 2 && INFIX_FUNCTORS.contains(&name.as_str()) {
                    write!(f, "({} {} {})", args[0], name, args[1])
                } else {
                    write!(f, "{}({})", name, args.iter().format(", "))
                }
            }
            Expr::Aggregate(agg) => write!(f, "{}", agg),
        }
    }
}

impl std::fmt::Display for RamAggregate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pattern = self
            .pattern
            .iter()
            .map(|slot| match slot {
                Some(expr) => expr.to_string(),
                None => "_".to_string(),
            })
            .format(", ");
        match &self.target {
            Some(target) => write!(
                f,
                "{} {} : {} as t{}({})",
                self.op, target, self.relation, self.tuple, pattern
            )?,
            None => write!(
                f,
                "{} : {} as t{}({})",
                self.op, self.relation, self.tuple, pattern
            )?,
        }
        if let Some(condition) = &self.condition {
            write!(f, " where {}", condition)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::Comparison { op, left, right } => write!(f, "{} {} {}", left, op, right),
            Condition::NotExists { relation, values } => {
                write!(f, "({}) not in {}", values.iter().format(", "), relation)
            }
            Condition::Empty(relation) => write!(f, "isempty({})", relation),
            Condition::Conjunction(conditions) => {
                if conditions.is_empty() {
                    write!(f, "true")
                } else {
                    write!(f, "{}", conditions.iter().format(" and "))
                }
            }
        }
    }
}

fn indent(f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
    write!(f, "{:width$}", "", width = depth * 2)
}

fn fmt_operation(
    f: &mut std::fmt::Formatter<'_>,
    operation: &Operation,
    depth: usize,
) -> std::fmt::Result {
    indent(f, depth)?;
    match operation {
        Operation::Scan {
            relation,
            tuple,
            body,
        } => {
            writeln!(f, "for t{} in {}", tuple, relation)?;
            fmt_operation(f, body, depth + 1)
        }
        Operation::Filter { condition, body } => {
            writeln!(f, "if {}", condition)?;
            fmt_operation(f, body, depth + 1)
        }
        Operation::Project { relation, values } => {
            writeln!(f, "project ({}) into {}", values.iter().format(", "), relation)
        }
    }
}

fn fmt_statement(
    f: &mut std::fmt::Formatter<'_>,
    statement: &Statement,
    depth: usize,
) -> std::fmt::Result {
    indent(f, depth)?;
    match statement {
        Statement::Insert(operation) => {
            writeln!(f, "insert")?;
            fmt_operation(f, operation, depth + 1)
        }
        Statement::Merge { source, target } => writeln!(f, "merge {} into {}", source, target),
        Statement::Clear(relation) => writeln!(f, "clear {}", relation),
        Statement::Loop(body) => {
            writeln!(f, "loop")?;
            for statement in body {
                fmt_statement(f, statement, depth + 1)?;
            }
            Ok(())
        }
        Statement::Exit(condition) => writeln!(f, "exit if {}", condition),
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt_operation(f, self, 0)
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt_statement(f, self, 0)
    }
}

impl std::fmt::Display for RelationDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let attributes = self
            .attributes
            .iter()
            .map(|(name, ty)| format!("{}: {}", name, ty))
            .format(", ");
        write!(f, ".decl {}({})", self.name, attributes)
    }
}

impl std::fmt::Display for RamProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for declaration in &self.declarations {
            writeln!(f, "{}", declaration)?;
        }
        for (number, stratum) in self.strata.iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "stratum {}:", number)?;
            for statement in &stratum.statements {
                fmt_statement(f, statement, 1)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twin_names() {
        assert_eq!(delta_name("reach"), "@delta_reach");
        assert_eq!(new_name("reach"), "@new_reach");
    }

    #[test]
    fn test_conjoin_single_stays_bare() {
        let condition = Condition::Empty("r".to_string());
        assert_eq!(Condition::conjoin(vec![condition.clone()]), condition);
    }

    #[test]
    fn test_conjoin_many() {
        let conditions = vec![
            Condition::Empty("a".to_string()),
            Condition::Empty("b".to_string()),
        ];
        assert_eq!(
            Condition::conjoin(conditions.clone()),
            Condition::Conjunction(conditions)
        );
    }

    #[test]
    fn test_data_arity_excludes_auxiliary() {
        let decl = RelationDecl {
            name: "path".to_string(),
            attributes: vec![
                ("x".to_string(), RamType::Number),
                ("y".to_string(), RamType::Number),
                ("@rule_id".to_string(), RamType::Number),
                ("@height".to_string(), RamType::Number),
            ],
            auxiliary: 2,
        };
        assert_eq!(decl.arity(), 4);
        assert_eq!(decl.data_arity(), 2);
    }

    #[test]
    fn test_display_insert() {
        let statement = Statement::Insert(Operation::Scan {
            relation: "edge".to_string(),
            tuple: 0,
            body: Box::new(Operation::Project {
                relation: "path".to_string(),
                values: vec![
                    Expr::TupleElement { tuple: 0, column: 0 },
                    Expr::TupleElement { tuple: 0, column: 1 },
                ],
            }),
        });
        assert_eq!(
            statement.to_string(),
            "insert\n  for t0 in edge\n    project (t0.0, t0.1) into path\n"
        );
    }

    #[test]
    fn test_display_infix_functor_and_aggregate() {
        let height = Expr::Functor {
            name: "+".to_string(),
            args: vec![Expr::Number(1), Expr::TupleElement { tuple: 0, column: 3 }],
        };
        assert_eq!(height.to_string(), "(1 + t0.3)");

        let aggregate = Expr::Aggregate(Box::new(RamAggregate {
            op: AggregateOp::Count,
            relation: "edge".to_string(),
            tuple: 2,
            pattern: vec![Some(Expr::TupleElement { tuple: 0, column: 0 }), None],
            target: None,
            condition: None,
        }));
        assert_eq!(aggregate.to_string(), "count : edge as t2(t0.0, _)");
    }

    #[test]
    fn test_serde_round_trip() {
        let program = RamProgram {
            declarations: vec![RelationDecl {
                name: "edge".to_string(),
                attributes: vec![
                    ("x".to_string(), RamType::Number),
                    ("y".to_string(), RamType::Text),
                ],
                auxiliary: 0,
            }],
            strata: vec![Stratum {
                statements: vec![Statement::Clear("edge".to_string())],
            }],
            rule_info: vec![],
        };
        let json = serde_json::to_string(&program).unwrap();
        let back: RamProgram = serde_json::from_str(&json).unwrap();
        assert_eq!(program, back);
    }
}
