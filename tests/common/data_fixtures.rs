//! 测试数据生成模块
//!
//! 提供 RAM 节点和程序的构造函数

use ramlog::core::BinaryConstraintOp;
use ramlog::ram::operation::Project;
use ramlog::ram::{
    Condition, Expression, Operation, Program, RangePattern, Relation, RelationReference,
    Statement,
};

pub fn rel(name: &str, arity: usize) -> RelationReference {
    RelationReference::new(name, arity)
}

/// 把元组 `tuple_id` 的第 0 个属性插入 S/1
pub fn insert_s(tuple_id: usize) -> Operation {
    Project::new(rel("S", 1), vec![Expression::tuple_element(tuple_id, 0)]).into()
}

/// 由整数界构造范围模式，`None` 表示无界
pub fn pattern(lower: &[Option<i64>], upper: &[Option<i64>]) -> RangePattern {
    let to_exprs = |bounds: &[Option<i64>]| -> Vec<Expression> {
        bounds
            .iter()
            .map(|b| b.map(Expression::signed).unwrap_or(Expression::Undefined))
            .collect()
    };
    RangePattern::new(to_exprs(lower), to_exprs(upper))
}

pub fn constraint(op: BinaryConstraintOp, tuple_id: usize, element: usize, value: i64) -> Condition {
    Condition::constraint(
        op,
        Expression::tuple_element(tuple_id, element),
        Expression::signed(value),
    )
}

pub fn ge(tuple_id: usize, element: usize, value: i64) -> Condition {
    constraint(BinaryConstraintOp::Ge, tuple_id, element, value)
}

pub fn le(tuple_id: usize, element: usize, value: i64) -> Condition {
    constraint(BinaryConstraintOp::Le, tuple_id, element, value)
}

/// 声明 R/2、S/1、T/3，主体只包含一个查询
pub fn program_with(op: Operation) -> Program {
    let mut program = Program::new();
    program.add_relation(Relation::new("R", 2));
    program.add_relation(Relation::new("S", 1));
    program.add_relation(Relation::new("T", 3));
    program.add_statement(Statement::query(op));
    program
}

/// 第一个查询的根操作
pub fn root(program: &Program) -> &Operation {
    program.queries()[0].operation()
}
