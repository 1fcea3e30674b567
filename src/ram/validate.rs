//! 程序校验器
//!
//! 在优化前后检查 RAM 程序的结构不变量：
//! - 每个被引用的关系都已声明，且元数一致
//! - 范围模式、投影值和存在性检查的长度等于关系元数
//! - 优化后不存在所有位置都无界的带索引操作

use crate::core::error::{RamError, RamResult};
use crate::ram::condition::Condition;
use crate::ram::operation::Operation;
use crate::ram::program::Program;
use crate::ram::relation::RelationReference;
use crate::ram::statement::Statement;
use crate::ram::visitor::collect_nodes;

/// 程序校验器
#[derive(Debug)]
pub struct ProgramValidator;

impl ProgramValidator {
    /// 校验结构不变量，汇总所有问题后一次性返回
    pub fn validate_program(program: &Program) -> RamResult<()> {
        let mut problems = Vec::new();

        for stmt in collect_nodes::<Statement>(program) {
            for rel in stmt.relations() {
                Self::check_relation(program, rel, &mut problems);
            }
        }

        for op in collect_nodes::<Operation>(program) {
            Self::check_operation(program, op, &mut problems);
        }

        for cond in collect_nodes::<Condition>(program) {
            if let Some(rel) = cond.relation() {
                Self::check_relation(program, rel, &mut problems);
            }
            if let Condition::ExistenceCheck { relation, values } = cond {
                if values.len() != relation.arity() {
                    problems.push(format!(
                        "存在性检查 {} 的值个数 {} 与元数 {} 不一致",
                        relation,
                        values.len(),
                        relation.arity()
                    ));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(RamError::validation(problems.join("; ")))
        }
    }

    /// 校验优化后不变量：不存在空范围模式的带索引操作
    pub fn check_no_empty_index(program: &Program) -> RamResult<()> {
        let empty: Vec<String> = Self::find_empty_index_operations(program)
            .into_iter()
            .map(|op| {
                format!(
                    "{}({})",
                    op.name(),
                    op.relation().map(|r| r.name()).unwrap_or_default()
                )
            })
            .collect();

        if empty.is_empty() {
            Ok(())
        } else {
            Err(RamError::validation(format!(
                "存在空范围模式的带索引操作: {}",
                empty.join(", ")
            )))
        }
    }

    /// 所有位置都无界的带索引操作
    pub fn find_empty_index_operations(program: &Program) -> Vec<&Operation> {
        collect_nodes::<Operation>(program)
            .into_iter()
            .filter(|op| {
                op.range_pattern()
                    .map(|pattern| !pattern.has_defined_bound())
                    .unwrap_or(false)
            })
            .collect()
    }

    fn check_operation(program: &Program, op: &Operation, problems: &mut Vec<String>) {
        let Some(rel) = op.relation() else {
            return;
        };
        Self::check_relation(program, rel, problems);

        if let Some(pattern) = op.range_pattern() {
            if !pattern.is_well_formed() {
                problems.push(format!(
                    "{} 的范围模式上下界长度不一致: {} 与 {}",
                    op.name(),
                    pattern.lower().len(),
                    pattern.upper().len()
                ));
            }
            if pattern.arity() != rel.arity() {
                problems.push(format!(
                    "{} 的范围模式长度 {} 与关系 {} 的元数 {} 不一致",
                    op.name(),
                    pattern.arity(),
                    rel,
                    rel.arity()
                ));
            }
        }

        if let Operation::Project(project) = op {
            if project.values.len() != rel.arity() {
                problems.push(format!(
                    "投影到 {} 的值个数 {} 与元数 {} 不一致",
                    rel,
                    project.values.len(),
                    rel.arity()
                ));
            }
            if let Some(filter) = &project.filter {
                Self::check_relation(program, filter, problems);
            }
        }
    }

    fn check_relation(program: &Program, rel: &RelationReference, problems: &mut Vec<String>) {
        match program.relation(rel.name()) {
            None => problems.push(format!("关系 {} 未声明", rel)),
            Some(decl) if decl.arity() != rel.arity() => problems.push(format!(
                "关系 {} 引用元数 {} 与声明元数 {} 不一致",
                rel,
                rel.arity(),
                decl.arity()
            )),
            Some(_) => {}
        }
    }
}
