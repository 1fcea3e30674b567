//! 索引卸载转换
//!
//! 对每个带索引的操作，询问索引分析哪些属性不能由所选索引覆盖，
//! 把这些属性的界从范围模式中移出，改写为显式条件：
//! - 下界 `l` 生成 `t.i >= l`，上界 `u` 生成 `t.i <= u`
//! - 按属性位置升序、先下界后上界，左结合地合取
//! - 被卸载属性的上下界重置为 `Undefined`
//!
//! IndexScan、ParallelIndexScan、IndexChoice 用新的 Filter 包裹原嵌套操作；
//! IndexAggregate 把新条件合取到已有条件之后，嵌套操作不变。
//! 没有生成任何条件时操作保持原样。

use crate::core::error::{RamError, RamResult};
use crate::core::types::operators::BinaryConstraintOp;
use crate::ram::analysis::IndexAnalysis;
use crate::ram::condition::Condition;
use crate::ram::expression::Expression;
use crate::ram::operation::{Filter, IndexOperation, Operation};
use crate::ram::program::Program;
use crate::ram::rewrite::OperationMapper;
use crate::ram::transform::Transformer;

/// 把索引无法覆盖的界卸载为过滤条件
pub struct IndexToFilterTransformer<'a> {
    analysis: &'a dyn IndexAnalysis,
}

impl<'a> IndexToFilterTransformer<'a> {
    pub const NAME: &'static str = "IndexToFilterTransformer";

    pub fn new(analysis: &'a dyn IndexAnalysis) -> Self {
        Self { analysis }
    }
}

impl Transformer for IndexToFilterTransformer<'_> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    /// 失败时 `program` 保持调用前的状态
    fn transform(&mut self, program: &mut Program) -> RamResult<bool> {
        let mut discharger = Discharger {
            analysis: self.analysis,
            changed: false,
            error: None,
        };
        let mut rewritten = program.clone();
        rewritten.for_each_query_mut(|query| query.apply(&mut discharger));

        if let Some(err) = discharger.error {
            return Err(err);
        }
        *program = rewritten;
        Ok(discharger.changed)
    }
}

struct Discharger<'a> {
    analysis: &'a dyn IndexAnalysis,
    changed: bool,
    error: Option<RamError>,
}

impl Discharger<'_> {
    fn discharge(&mut self, op: IndexOperation) -> Operation {
        if !op.pattern().is_well_formed() {
            self.error = Some(RamError::transform(
                IndexToFilterTransformer::NAME,
                format!("{} 于关系 {} 的范围模式上下界长度不一致", op.name(), op.relation()),
            ));
            return op.into();
        }

        let signature = self.analysis.search_signature(&op);
        let attributes = self
            .analysis
            .attributes_to_discharge(&signature, op.relation());

        let tuple_id = op.tuple_id();
        let mut pattern = op.pattern().clone();
        let mut bounds = Vec::new();

        for &attribute in &attributes {
            if attribute >= pattern.arity() {
                self.error.get_or_insert_with(|| {
                    RamError::transform(
                        IndexToFilterTransformer::NAME,
                        format!(
                            "索引分析返回的属性 {} 超出关系 {} 的元数 {}",
                            attribute,
                            op.relation(),
                            pattern.arity()
                        ),
                    )
                });
                continue;
            }

            let lower = pattern.lower_bound(attribute);
            if lower.is_defined() {
                bounds.push(Condition::constraint(
                    BinaryConstraintOp::Ge,
                    Expression::tuple_element(tuple_id, attribute),
                    lower.clone(),
                ));
            }
            let upper = pattern.upper_bound(attribute);
            if upper.is_defined() {
                bounds.push(Condition::constraint(
                    BinaryConstraintOp::Le,
                    Expression::tuple_element(tuple_id, attribute),
                    upper.clone(),
                ));
            }
            pattern.reset(attribute);
        }

        let Some(condition) = Condition::conjoin_all(bounds) else {
            return op.into();
        };

        self.changed = true;
        log::debug!(
            "{} 卸载关系 {} 的属性 {:?}: {}",
            op.name(),
            op.relation(),
            attributes,
            condition
        );

        match op {
            IndexOperation::Scan(mut scan) => {
                scan.pattern = pattern;
                wrap_in_filter(&mut scan.nested, condition);
                scan.into()
            }
            IndexOperation::ParallelScan(mut scan) => {
                scan.pattern = pattern;
                wrap_in_filter(&mut scan.nested, condition);
                scan.into()
            }
            IndexOperation::Choice(mut choice) => {
                choice.pattern = pattern;
                wrap_in_filter(&mut choice.nested, condition);
                choice.into()
            }
            IndexOperation::Aggregate(mut agg) => {
                agg.pattern = pattern;
                let existing = std::mem::replace(&mut agg.condition, Condition::True);
                agg.condition = Condition::conjunction(existing, condition);
                agg.into()
            }
        }
    }
}

impl OperationMapper for Discharger<'_> {
    fn map(&mut self, op: Operation) -> Operation {
        if self.error.is_some() {
            return op;
        }
        let mut op = match op.into_index_operation() {
            Ok(index_op) => self.discharge(index_op),
            Err(op) => op,
        };
        op.apply(self);
        op
    }
}

/// 用 Filter 包裹槽位中原有的嵌套操作
fn wrap_in_filter(slot: &mut Box<Operation>, condition: Condition) {
    let nested = std::mem::take(slot.as_mut());
    **slot = Filter::new(condition, nested).into();
}
