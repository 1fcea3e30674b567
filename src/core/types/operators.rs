//! 操作符类型定义
//!
//! 定义 RAM 中间表示使用的比较操作符和聚合函数

use serde::{Deserialize, Serialize};
use std::fmt;

/// 二元约束操作符
///
/// 用于 `Condition::Constraint`，比较两个表达式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryConstraintOp {
    /// 等于
    Eq,
    /// 不等于
    Ne,
    /// 小于
    Lt,
    /// 小于等于
    Le,
    /// 大于
    Gt,
    /// 大于等于
    Ge,
}

impl BinaryConstraintOp {
    /// 获取操作符的符号表示
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryConstraintOp::Eq => "=",
            BinaryConstraintOp::Ne => "!=",
            BinaryConstraintOp::Lt => "<",
            BinaryConstraintOp::Le => "<=",
            BinaryConstraintOp::Gt => ">",
            BinaryConstraintOp::Ge => ">=",
        }
    }

    /// 交换左右操作数后的等价操作符
    ///
    /// 例如 `a < b` 等价于 `b > a`
    pub fn flip(&self) -> Self {
        match self {
            BinaryConstraintOp::Eq => BinaryConstraintOp::Eq,
            BinaryConstraintOp::Ne => BinaryConstraintOp::Ne,
            BinaryConstraintOp::Lt => BinaryConstraintOp::Gt,
            BinaryConstraintOp::Le => BinaryConstraintOp::Ge,
            BinaryConstraintOp::Gt => BinaryConstraintOp::Lt,
            BinaryConstraintOp::Ge => BinaryConstraintOp::Le,
        }
    }

    /// 是否为不等式（范围）约束
    pub fn is_inequality(&self) -> bool {
        matches!(
            self,
            BinaryConstraintOp::Lt
                | BinaryConstraintOp::Le
                | BinaryConstraintOp::Gt
                | BinaryConstraintOp::Ge
        )
    }
}

impl fmt::Display for BinaryConstraintOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// 聚合函数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateFunction {
    Max,
    Min,
    Count,
    Sum,
}

impl AggregateFunction {
    /// 获取聚合函数名称
    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunction::Max => "MAX",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
        }
    }

    /// 根据名称查找聚合函数（不区分大小写）
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "MAX" => Some(AggregateFunction::Max),
            "MIN" => Some(AggregateFunction::Min),
            "COUNT" => Some(AggregateFunction::Count),
            "SUM" => Some(AggregateFunction::Sum),
            _ => None,
        }
    }

    /// COUNT 不读取目标表达式
    pub fn uses_target_expression(&self) -> bool {
        !matches!(self, AggregateFunction::Count)
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
