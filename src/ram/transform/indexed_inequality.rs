//! 索引不等式转换
//!
//! 依次运行索引卸载和空索引移除两个独立的遍历。移除必须看到卸载后
//! 已经收窄的范围模式，因此两者不能合并为一次遍历。

use crate::core::error::RamResult;
use crate::ram::analysis::IndexAnalysis;
use crate::ram::program::Program;
use crate::ram::transform::{IndexToFilterTransformer, RemoveEmptyIndexTransformer, Transformer};

/// 卸载 + 移除的组合转换
pub struct IndexedInequalityTransformer<'a> {
    index_to_filter: IndexToFilterTransformer<'a>,
    remove_empty_index: RemoveEmptyIndexTransformer,
}

impl<'a> IndexedInequalityTransformer<'a> {
    pub const NAME: &'static str = "IndexedInequalityTransformer";

    pub fn new(analysis: &'a dyn IndexAnalysis) -> Self {
        Self {
            index_to_filter: IndexToFilterTransformer::new(analysis),
            remove_empty_index: RemoveEmptyIndexTransformer::new(),
        }
    }
}

impl Transformer for IndexedInequalityTransformer<'_> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn transform(&mut self, program: &mut Program) -> RamResult<bool> {
        let discharged = self.index_to_filter.transform(program)?;
        let removed = self.remove_empty_index.transform(program)?;
        Ok(discharged || removed)
    }

    fn check_postcondition(&self, program: &Program) -> RamResult<()> {
        self.remove_empty_index.check_postcondition(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::operators::BinaryConstraintOp;
    use crate::ram::analysis::StaticIndexAnalysis;
    use crate::ram::condition::Condition;
    use crate::ram::expression::Expression;
    use crate::ram::operation::{Filter, IndexScan, Operation, Project, RangePattern, Scan};
    use crate::ram::relation::{Relation, RelationReference};
    use crate::ram::statement::Statement;

    #[test]
    fn test_discharge_then_downgrade() {
        let analysis = StaticIndexAnalysis::new().with_index("R", vec![0]);
        let r = RelationReference::new("R", 2);
        let insert: Operation = Project::new(
            RelationReference::new("S", 1),
            vec![Expression::tuple_element(0, 0)],
        )
        .into();

        let mut program = Program::new();
        program.add_relation(Relation::new("R", 2));
        program.add_relation(Relation::new("S", 1));
        program.add_statement(Statement::query(
            IndexScan::new(
                r.clone(),
                0,
                RangePattern::point(vec![Expression::Undefined, Expression::signed(5)]),
                insert.clone(),
                "",
            )
            .into(),
        ));

        let mut transformer = IndexedInequalityTransformer::new(&analysis);
        assert!(transformer.transform(&mut program).expect("转换失败"));
        assert!(transformer.check_postcondition(&program).is_ok());

        let constraint = |op, v| {
            Condition::constraint(op, Expression::tuple_element(0, 1), Expression::signed(v))
        };
        let expected: Operation = Scan::new(
            r,
            0,
            Filter::new(
                Condition::conjunction(
                    constraint(BinaryConstraintOp::Ge, 5),
                    constraint(BinaryConstraintOp::Le, 5),
                ),
                insert,
            )
            .into(),
            "",
        )
        .into();
        assert_eq!(program.queries()[0].operation(), &expected);

        // 第二次运行没有可做的改变
        assert!(!transformer.transform(&mut program).expect("转换失败"));
    }
}
