//! 空索引移除转换
//!
//! 范围模式的所有位置上下界都未定义时，带索引的操作等价于对应的普通操作，
//! 把它降级：IndexScan → Scan，ParallelIndexScan → ParallelScan，
//! IndexChoice → Choice，IndexAggregate → Aggregate。其余字段原样搬移。

use crate::core::error::RamResult;
use crate::ram::operation::{Aggregate, Choice, IndexOperation, Operation, ParallelScan, Scan};
use crate::ram::program::Program;
use crate::ram::rewrite::OperationMapper;
use crate::ram::transform::Transformer;
use crate::ram::validate::ProgramValidator;

/// 把空范围模式的带索引操作降级为普通操作
#[derive(Debug, Default)]
pub struct RemoveEmptyIndexTransformer;

impl RemoveEmptyIndexTransformer {
    pub const NAME: &'static str = "RemoveEmptyIndexTransformer";

    pub fn new() -> Self {
        Self
    }
}

impl Transformer for RemoveEmptyIndexTransformer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn transform(&mut self, program: &mut Program) -> RamResult<bool> {
        let mut downgrader = Downgrader { changed: false };
        program.for_each_query_mut(|query| query.apply(&mut downgrader));
        Ok(downgrader.changed)
    }

    fn check_postcondition(&self, program: &Program) -> RamResult<()> {
        ProgramValidator::check_no_empty_index(program)
    }
}

struct Downgrader {
    changed: bool,
}

impl OperationMapper for Downgrader {
    fn map(&mut self, op: Operation) -> Operation {
        let mut op = match op.into_index_operation() {
            Ok(index_op) if !index_op.pattern().has_defined_bound() => {
                self.changed = true;
                log::debug!("{} 于关系 {} 的范围模式为空，降级", index_op.name(), index_op.relation());
                downgrade(index_op)
            }
            Ok(index_op) => index_op.into(),
            Err(op) => op,
        };
        op.apply(self);
        op
    }
}

fn downgrade(op: IndexOperation) -> Operation {
    match op {
        IndexOperation::Scan(scan) => Scan {
            relation: scan.relation,
            tuple_id: scan.tuple_id,
            nested: scan.nested,
            profile_text: scan.profile_text,
        }
        .into(),
        IndexOperation::ParallelScan(scan) => ParallelScan {
            relation: scan.relation,
            tuple_id: scan.tuple_id,
            nested: scan.nested,
            profile_text: scan.profile_text,
        }
        .into(),
        IndexOperation::Choice(choice) => Choice {
            relation: choice.relation,
            tuple_id: choice.tuple_id,
            condition: choice.condition,
            nested: choice.nested,
            profile_text: choice.profile_text,
        }
        .into(),
        IndexOperation::Aggregate(agg) => Aggregate {
            relation: agg.relation,
            tuple_id: agg.tuple_id,
            function: agg.function,
            expression: agg.expression,
            condition: agg.condition,
            nested: agg.nested,
            profile_text: agg.profile_text,
        }
        .into(),
    }
}
