//! AST definitions for validated Datalog programs
//!
//! The shapes here mirror what the lowering stage needs and nothing more:
//! relations carry their typed schema and their clauses, clauses carry an
//! ordered body, and terms cover variables, constants, functor applications
//! and aggregate subqueries.
//!
//! # Syntax Examples
//!
//! - **Fact**: `edge(1, 2).` (a clause with an empty body)
//! - **Rule**: `reach(X, Y) :- reach(X, Z), edge(Z, Y).`
//! - **Negation**: `unreached(X) :- node(X), not reach(root, X).`
//! - **Aggregate**: `total(S) :- S = sum Y : sales(X, Y).`

use internment::Intern;

/// Interned string for efficient storage and comparison
pub type Symbol = Intern<String>;

/// A validated Datalog program: relations with their clauses, plus
/// user-defined functor signatures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub relations: Vec<Relation>,
    pub functors: Vec<FunctorDecl>,
}

impl Program {
    /// Look up a relation by name
    pub fn relation(&self, name: Symbol) -> Option<&Relation> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Look up a functor declaration by name
    pub fn functor(&self, name: Symbol) -> Option<&FunctorDecl> {
        self.functors.iter().find(|f| f.name == name)
    }
}

/// A declared relation: typed attribute schema plus the clauses deriving it.
/// A relation with no clauses is purely extensional (input data).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub name: Symbol,
    pub attributes: Vec<Attribute>,
    pub clauses: Vec<Clause>,
}

impl Relation {
    pub fn arity(&self) -> usize {
        self.attributes.len()
    }

    /// Whether any clause derives into this relation
    pub fn is_derived(&self) -> bool {
        !self.clauses.is_empty()
    }
}

/// A named, typed attribute of a relation schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: Symbol,
    pub ty: AttributeType,
}

/// Attribute types after type resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    Number,
    Text,
}

/// A user-defined functor signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctorDecl {
    pub name: Symbol,
    pub params: Vec<AttributeType>,
    pub returns: AttributeType,
}

/// A clause: head atom plus ordered body literals.
/// A fact is a clause with an empty body and a ground head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub head: Atom,
    pub body: Vec<Literal>,
}

impl Clause {
    pub fn is_fact(&self) -> bool {
        self.body.is_empty()
    }

    /// Positive body atoms in written order (the atoms that become scans)
    pub fn positive_atoms(&self) -> impl Iterator<Item = &Atom> {
        self.body.iter().filter_map(|lit| match lit {
            Literal::Atom(atom) => Some(atom),
            Literal::Negated(_) | Literal::Constraint(_) => None,
        })
    }
}

/// A body literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// Positive atom: `edge(X, Y)`
    Atom(Atom),
    /// Negated atom: `not reach(X, Y)`
    Negated(Atom),
    /// Comparison constraint: `X < Y`
    Constraint(Constraint),
}

impl Literal {
    pub fn is_positive(&self) -> bool {
        matches!(self, Literal::Atom(_))
    }
}

/// A comparison constraint between two terms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub left: Term,
    pub op: ComparisonOp,
    pub right: Term,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
}

/// A predicate applied to terms: `edge(X, Y)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    pub relation: Symbol,
    pub args: Vec<Term>,
}

impl Atom {
    pub fn new(relation: impl Into<String>, args: Vec<Term>) -> Self {
        Atom {
            relation: Intern::new(relation.into()),
            args,
        }
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }
}

/// A term in an atom argument, constraint operand, or head position
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Variable reference
    Variable(Symbol),
    /// Constant value
    Constant(Constant),
    /// Functor application: `f(X, Y)`
    Functor(Symbol, Vec<Term>),
    /// Aggregate subquery: `sum Y : sales(X, Y)`
    Aggregate(Box<Aggregate>),
}

impl Term {
    pub fn variable(name: impl Into<String>) -> Self {
        Term::Variable(Intern::new(name.into()))
    }

    pub fn number(value: i64) -> Self {
        Term::Constant(Constant::Number(value))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Term::Constant(Constant::Text(Intern::new(value.into())))
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    /// Collect every variable mentioned in this term, including variables
    /// local to aggregate patterns. Callers that care about clause-level
    /// binding filter against their own index.
    pub fn collect_variables(&self, out: &mut Vec<Symbol>) {
        match self {
            Term::Variable(v) => out.push(*v),
            Term::Constant(_) => {}
            Term::Functor(_, args) => {
                for arg in args {
                    arg.collect_variables(out);
                }
            }
            Term::Aggregate(agg) => {
                for arg in &agg.pattern.args {
                    arg.collect_variables(out);
                }
                if let Some(target) = &agg.target {
                    target.collect_variables(out);
                }
            }
        }
    }
}

/// Constant values after type resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constant {
    Number(i64),
    Text(Symbol),
}

/// An aggregate subquery: fold `op` over the tuples matching `pattern`.
/// `target` is the aggregated expression; `Count` has none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    pub op: AggregateOp,
    pub pattern: Atom,
    pub target: Option<Term>,
}

/// Aggregate operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    Count,
    Sum,
    Min,
    Max,
}

impl Literal {
    /// Collect every variable mentioned in this literal
    pub fn collect_variables(&self, out: &mut Vec<Symbol>) {
        match self {
            Literal::Atom(atom) | Literal::Negated(atom) => {
                for arg in &atom.args {
                    arg.collect_variables(out);
                }
            }
            Literal::Constraint(c) => {
                c.left.collect_variables(out);
                c.right.collect_variables(out);
            }
        }
    }
}

// Display implementations, used by diagnostics and provenance rule info

impl std::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeType::Number => write!(f, "number"),
            AttributeType::Text => write!(f, "text"),
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

impl std::fmt::Display for Constant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constant::Number(n) => write!(f, "{}", n),
            Constant::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Variable(v) => write!(f, "{}", v),
            Term::Constant(c) => write!(f, "{}", c),
            Term::Functor(name, args) => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Term::Aggregate(agg) => write!(f, "{}", agg),
        }
    }
}

impl std::fmt::Display for Aggregate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.target {
            Some(target) => write!(f, "{} {} : {}", self.op, target, self.pattern),
            None => write!(f, "{} : {}", self.op, self.pattern),
        }
    }
}

impl std::fmt::Display for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.relation)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Atom(atom) => write!(f, "{}", atom),
            Literal::Negated(atom) => write!(f, "not {}", atom),
            Literal::Constraint(c) => write!(f, "{} {} {}", c.left, c.op, c.right),
        }
    }
}

impl std::fmt::Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_fact() {
            return write!(f, "{}.", self.head);
        }
        write!(f, "{} :- ", self.head)?;
        for (i, lit) in self.body.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", lit)?;
        }
        write!(f, ".")
    }
}
