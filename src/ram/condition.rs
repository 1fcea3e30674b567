//! RAM 布尔条件
//!
//! 条件出现在 Filter、Choice 和 Aggregate 中。每个条件独占自己的子树，
//! 在多个节点中复用时必须克隆。

use crate::core::types::operators::BinaryConstraintOp;
use crate::ram::expression::Expression;
use crate::ram::relation::RelationReference;
use serde::{Deserialize, Serialize};
use std::fmt;

/// RAM 条件
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    /// 恒真
    True,

    /// 二元合取
    Conjunction(Box<Condition>, Box<Condition>),

    /// 否定
    Negation(Box<Condition>),

    /// 二元约束，比较两个表达式
    Constraint {
        op: BinaryConstraintOp,
        lhs: Expression,
        rhs: Expression,
    },

    /// 关系是否为空
    EmptinessCheck(RelationReference),

    /// 关系中是否存在匹配 `values` 的元组，`Undefined` 位置为通配
    ExistenceCheck {
        relation: RelationReference,
        values: Vec<Expression>,
    },
}

impl Condition {
    pub fn constraint(op: BinaryConstraintOp, lhs: Expression, rhs: Expression) -> Self {
        Condition::Constraint { op, lhs, rhs }
    }

    pub fn conjunction(lhs: Condition, rhs: Condition) -> Self {
        Condition::Conjunction(Box::new(lhs), Box::new(rhs))
    }

    pub fn negation(inner: Condition) -> Self {
        Condition::Negation(Box::new(inner))
    }

    /// 把 `next` 追加到可能为空的累积条件上（左结合）
    pub fn conjoin(acc: Option<Condition>, next: Condition) -> Condition {
        match acc {
            None => next,
            Some(acc) => Condition::conjunction(acc, next),
        }
    }

    /// 将条件列表折叠为左结合的合取，空列表返回 `None`
    pub fn conjoin_all(conditions: impl IntoIterator<Item = Condition>) -> Option<Condition> {
        conditions
            .into_iter()
            .fold(None, |acc, c| Some(Condition::conjoin(acc, c)))
    }

    /// 展开合取，按从左到右的顺序返回各个合取项
    pub fn conjuncts(&self) -> Vec<&Condition> {
        match self {
            Condition::Conjunction(lhs, rhs) => {
                let mut res = lhs.conjuncts();
                res.extend(rhs.conjuncts());
                res
            }
            other => vec![other],
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Condition::True)
    }

    /// 直接子条件
    pub fn child_conditions(&self) -> Vec<&Condition> {
        match self {
            Condition::Conjunction(lhs, rhs) => vec![lhs.as_ref(), rhs.as_ref()],
            Condition::Negation(inner) => vec![inner.as_ref()],
            _ => vec![],
        }
    }

    /// 直接包含的表达式
    pub fn expressions(&self) -> Vec<&Expression> {
        match self {
            Condition::Constraint { lhs, rhs, .. } => vec![lhs, rhs],
            Condition::ExistenceCheck { values, .. } => values.iter().collect(),
            _ => vec![],
        }
    }

    /// 直接引用的关系
    pub fn relation(&self) -> Option<&RelationReference> {
        match self {
            Condition::EmptinessCheck(rel) => Some(rel),
            Condition::ExistenceCheck { relation, .. } => Some(relation),
            _ => None,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::True => write!(f, "true"),
            Condition::Conjunction(lhs, rhs) => write!(f, "{} AND {}", lhs, rhs),
            Condition::Negation(inner) => write!(f, "(NOT {})", inner),
            Condition::Constraint { op, lhs, rhs } => write!(f, "({} {} {})", lhs, op, rhs),
            Condition::EmptinessCheck(rel) => write!(f, "({} = ∅)", rel),
            Condition::ExistenceCheck { relation, values } => {
                let args: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "({}) ∈ {}", args.join(","), relation)
            }
        }
    }
}
