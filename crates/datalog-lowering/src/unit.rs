//! Unit translation: a whole validated program to a RAM program
//!
//! Relations are processed in non-decreasing stratum order; within a
//! stratum, declaration order (the deterministic tie-break). A stratum
//! with recursive relations compiles to seed inserts, a merge of each
//! relation into its delta twin, and a fixpoint loop over the semi-naive
//! clause versions; everything else compiles to single-pass inserts. Each
//! clause is translated in isolation by a fresh clause translator, so no
//! value-index state survives between clauses.

use crate::clause::{ClauseTranslator, ClauseVersion};
use crate::context::TranslatorContext;
use crate::strategy::TranslationStrategy;
use crate::LoweringError;
use datalog_ast::{Clause, Program, Relation};
use datalog_ram::{
    delta_name, new_name, Condition, RamProgram, RamType, RelationDecl, RuleInfo, Statement,
    Stratum, SymbolTable,
};
use log::{debug, trace};

/// Produces the complete RAM program for one validated Datalog program
pub trait UnitTranslator {
    fn translate_program(&self, program: &Program) -> Result<RamProgram, LoweringError>;
}

pub struct SeminaiveUnitTranslator<'a> {
    strategy: &'a dyn TranslationStrategy,
    context: &'a TranslatorContext<'a>,
    symbols: &'a SymbolTable,
}

impl<'a> SeminaiveUnitTranslator<'a> {
    pub fn new(
        strategy: &'a dyn TranslationStrategy,
        context: &'a TranslatorContext<'a>,
        symbols: &'a SymbolTable,
    ) -> Self {
        SeminaiveUnitTranslator {
            strategy,
            context,
            symbols,
        }
    }
}

impl UnitTranslator for SeminaiveUnitTranslator<'_> {
    fn translate_program(&self, program: &Program) -> Result<RamProgram, LoweringError> {
        lower_program(self.strategy, self.context, self.symbols, program, false)
    }
}

/// Provenance unit translation: the same stratum scheduling, with two
/// auxiliary columns declared on every derived relation (and its twins)
/// and the rule-info side table recorded per clause.
pub struct ProvenanceUnitTranslator<'a> {
    strategy: &'a dyn TranslationStrategy,
    context: &'a TranslatorContext<'a>,
    symbols: &'a SymbolTable,
}

impl<'a> ProvenanceUnitTranslator<'a> {
    pub fn new(
        strategy: &'a dyn TranslationStrategy,
        context: &'a TranslatorContext<'a>,
        symbols: &'a SymbolTable,
    ) -> Self {
        ProvenanceUnitTranslator {
            strategy,
            context,
            symbols,
        }
    }
}

impl UnitTranslator for ProvenanceUnitTranslator<'_> {
    fn translate_program(&self, program: &Program) -> Result<RamProgram, LoweringError> {
        lower_program(self.strategy, self.context, self.symbols, program, true)
    }
}

fn lower_program(
    strategy: &dyn TranslationStrategy,
    context: &TranslatorContext<'_>,
    symbols: &SymbolTable,
    program: &Program,
    provenance: bool,
) -> Result<RamProgram, LoweringError> {
    let num_strata = context.num_strata();
    let mut grouped: Vec<Vec<&Relation>> = vec![Vec::new(); num_strata];
    for relation in &program.relations {
        let stratum = context.stratum_of(relation.name)?;
        grouped[stratum].push(relation);
    }

    let mut declarations = Vec::new();
    for relation in &program.relations {
        let base = declaration(relation, provenance);
        if context.is_recursive(relation.name) {
            let delta = twin(&base, delta_name(&base.name));
            let accumulator = twin(&base, new_name(&base.name));
            declarations.push(base);
            declarations.push(delta);
            declarations.push(accumulator);
        } else {
            declarations.push(base);
        }
    }

    let mut strata = Vec::with_capacity(num_strata);
    for (number, relations) in grouped.iter().enumerate() {
        debug!("lowering stratum {} ({} relations)", number, relations.len());
        strata.push(Stratum {
            statements: lower_stratum(strategy, context, symbols, number, relations)?,
        });
    }

    let rule_info = if provenance {
        rule_infos(context, program)
    } else {
        Vec::new()
    };

    Ok(RamProgram {
        declarations,
        strata,
        rule_info,
    })
}

fn lower_stratum(
    strategy: &dyn TranslationStrategy,
    context: &TranslatorContext<'_>,
    symbols: &SymbolTable,
    number: usize,
    relations: &[&Relation],
) -> Result<Vec<Statement>, LoweringError> {
    let mut statements = Vec::new();
    let recursive: Vec<&Relation> = relations
        .iter()
        .copied()
        .filter(|r| context.is_recursive(r.name))
        .collect();

    // Single-pass inserts: all clauses of non-recursive relations, and the
    // seed clauses of recursive ones.
    for relation in relations {
        for (clause_index, clause) in relation.clauses.iter().enumerate() {
            if recursive_atom_positions(context, number, clause).is_empty() {
                trace!("lowering clause {}", clause);
                let translator = strategy.create_clause_translator(context, symbols);
                statements.push(translator.translate_clause(
                    relation,
                    clause,
                    clause_index,
                    &ClauseVersion::direct(relation.name.to_string()),
                )?);
            }
        }
    }

    if recursive.is_empty() {
        return Ok(statements);
    }

    for relation in &recursive {
        statements.push(Statement::Merge {
            source: relation.name.to_string(),
            target: delta_name(relation.name.as_ref()),
        });
    }

    let mut loop_body = Vec::new();
    for relation in &recursive {
        for (clause_index, clause) in relation.clauses.iter().enumerate() {
            for position in recursive_atom_positions(context, number, clause) {
                trace!("lowering clause {} (delta on atom {})", clause, position);
                let version = ClauseVersion {
                    destination: new_name(relation.name.as_ref()),
                    delta_atom: Some(position),
                    frontier_check: Some(relation.name.to_string()),
                };
                let translator = strategy.create_clause_translator(context, symbols);
                loop_body.push(translator.translate_clause(
                    relation,
                    clause,
                    clause_index,
                    &version,
                )?);
            }
        }
    }
    loop_body.push(Statement::Exit(Condition::conjoin(
        recursive
            .iter()
            .map(|r| Condition::Empty(new_name(r.name.as_ref())))
            .collect(),
    )));
    for relation in &recursive {
        let name = relation.name.as_ref();
        loop_body.push(Statement::Merge {
            source: new_name(name),
            target: name.to_string(),
        });
        loop_body.push(Statement::Clear(delta_name(name)));
        loop_body.push(Statement::Merge {
            source: new_name(name),
            target: delta_name(name),
        });
        loop_body.push(Statement::Clear(new_name(name)));
    }
    statements.push(Statement::Loop(loop_body));

    for relation in &recursive {
        statements.push(Statement::Clear(delta_name(relation.name.as_ref())));
        statements.push(Statement::Clear(new_name(relation.name.as_ref())));
    }

    Ok(statements)
}

/// Positions (among the positive body atoms) whose relation belongs to the
/// same recursive stratum as the clause: these occurrences get a delta
/// version each.
fn recursive_atom_positions(
    context: &TranslatorContext<'_>,
    stratum: usize,
    clause: &Clause,
) -> Vec<usize> {
    clause
        .positive_atoms()
        .enumerate()
        .filter(|(_, atom)| {
            context.is_recursive(atom.relation)
                && matches!(context.stratum_of(atom.relation), Ok(s) if s == stratum)
        })
        .map(|(position, _)| position)
        .collect()
}

fn declaration(relation: &Relation, provenance: bool) -> RelationDecl {
    let mut attributes: Vec<(String, RamType)> = relation
        .attributes
        .iter()
        .map(|attribute| (attribute.name.to_string(), convert_type(attribute.ty)))
        .collect();
    let mut auxiliary = 0;
    if provenance && relation.is_derived() {
        attributes.push(("@rule_id".to_string(), RamType::Number));
        attributes.push(("@height".to_string(), RamType::Number));
        auxiliary = 2;
    }
    RelationDecl {
        name: relation.name.to_string(),
        attributes,
        auxiliary,
    }
}

fn twin(base: &RelationDecl, name: String) -> RelationDecl {
    RelationDecl {
        name,
        attributes: base.attributes.clone(),
        auxiliary: base.auxiliary,
    }
}

fn convert_type(ty: datalog_ast::AttributeType) -> RamType {
    match ty {
        datalog_ast::AttributeType::Number => RamType::Number,
        datalog_ast::AttributeType::Text => RamType::Text,
    }
}

fn rule_infos(context: &TranslatorContext<'_>, program: &Program) -> Vec<RuleInfo> {
    let mut infos = Vec::new();
    for relation in &program.relations {
        for (clause_index, clause) in relation.clauses.iter().enumerate() {
            if let Some(rule_id) = context.rule_id(relation.name, clause_index) {
                infos.push(RuleInfo {
                    rule_id,
                    relation: relation.name.to_string(),
                    clause_text: clause.to_string(),
                    body_relations: clause
                        .positive_atoms()
                        .map(|atom| atom.relation.to_string())
                        .collect(),
                });
            }
        }
    }
    infos
}
