//! 自定义断言辅助模块
//!
//! 提供针对 RAM 程序的常用断言，以及用于比较过滤语义的小型求值器

use ramlog::core::BinaryConstraintOp;
use ramlog::ram::visitor::collect_nodes;
use ramlog::ram::{Condition, Expression, Operation, Program, RangePattern};

/// 断言结果失败并匹配错误消息
pub fn assert_err_with<T: std::fmt::Debug, E: std::fmt::Display>(result: Result<T, E>, expected_msg: &str) {
    let err = result.expect_err("操作应该失败");
    let err_str = err.to_string();
    assert!(
        err_str.contains(expected_msg),
        "错误消息应包含 '{}', 实际是 '{}'",
        expected_msg,
        err_str
    );
}

/// 断言程序中不存在范围模式为空的带索引操作
pub fn assert_no_empty_index(program: &Program) {
    for op in collect_nodes::<Operation>(program) {
        if let Some(pattern) = op.range_pattern() {
            assert!(
                pattern.has_defined_bound(),
                "{} 的范围模式不应为空",
                op.name()
            );
        }
    }
}

/// 断言每个范围模式的长度都等于关系元数
pub fn assert_arity_preserved(program: &Program) {
    for op in collect_nodes::<Operation>(program) {
        if let (Some(pattern), Some(rel)) = (op.range_pattern(), op.relation()) {
            assert_eq!(
                pattern.arity(),
                rel.arity(),
                "{} 的范围模式长度与关系 {} 的元数不一致",
                op.name(),
                rel
            );
        }
    }
}

/// 自根向下的操作名称序列
pub fn operation_names(op: &Operation) -> Vec<&'static str> {
    let mut names = vec![op.name()];
    let mut current = op;
    while let Some(nested) = current.nested() {
        names.push(nested.name());
        current = nested;
    }
    names
}

fn value_of(expr: &Expression, tuple_id: usize, tuple: &[i64]) -> Option<i64> {
    match expr {
        Expression::SignedConstant(v) => Some(*v),
        Expression::TupleElement { tuple_id: t, element } if *t == tuple_id => {
            tuple.get(*element).copied()
        }
        _ => None,
    }
}

/// 元组是否落在只含整数常量界的范围模式内
pub fn pattern_accepts(pattern: &RangePattern, tuple: &[i64]) -> bool {
    (0..pattern.arity()).all(|i| {
        let lower_ok = match pattern.lower_bound(i) {
            Expression::SignedConstant(l) => tuple[i] >= *l,
            _ => true,
        };
        let upper_ok = match pattern.upper_bound(i) {
            Expression::SignedConstant(u) => tuple[i] <= *u,
            _ => true,
        };
        lower_ok && upper_ok
    })
}

/// 对单个元组求值只含整数约束的条件
pub fn condition_accepts(cond: &Condition, tuple_id: usize, tuple: &[i64]) -> bool {
    match cond {
        Condition::True => true,
        Condition::Conjunction(lhs, rhs) => {
            condition_accepts(lhs, tuple_id, tuple) && condition_accepts(rhs, tuple_id, tuple)
        }
        Condition::Negation(inner) => !condition_accepts(inner, tuple_id, tuple),
        Condition::Constraint { op, lhs, rhs } => {
            let (Some(l), Some(r)) = (value_of(lhs, tuple_id, tuple), value_of(rhs, tuple_id, tuple))
            else {
                panic!("求值器只支持整数常量和当前元组的属性");
            };
            match op {
                BinaryConstraintOp::Eq => l == r,
                BinaryConstraintOp::Ne => l != r,
                BinaryConstraintOp::Lt => l < r,
                BinaryConstraintOp::Le => l <= r,
                BinaryConstraintOp::Gt => l > r,
                BinaryConstraintOp::Ge => l >= r,
            }
        }
        other => panic!("求值器不支持条件 {}", other),
    }
}
