//! RAM 标量表达式
//!
//! 表达式是操作树中的叶子：读取元组的某个属性、常量，或表示"无界"的
//! `Undefined` 哨兵。范围模式中的每个位置都保存一个表达式，未约束的位置
//! 保存 `Undefined`，而不是用 `Option` 表示缺失。

use serde::{Deserialize, Serialize};
use std::fmt;

/// RAM 标量表达式
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expression {
    /// 读取元组标识符 `tuple_id` 所绑定元组的第 `element` 个属性
    TupleElement { tuple_id: usize, element: usize },

    /// 有符号整数常量
    SignedConstant(i64),

    /// 无符号整数常量
    UnsignedConstant(u64),

    /// 字符串常量，保存符号表中的索引
    StringConstant(usize),

    /// 未定义值，用于范围模式中没有界的位置
    Undefined,
}

impl Expression {
    pub fn tuple_element(tuple_id: usize, element: usize) -> Self {
        Expression::TupleElement { tuple_id, element }
    }

    pub fn signed(value: i64) -> Self {
        Expression::SignedConstant(value)
    }

    pub fn undefined() -> Self {
        Expression::Undefined
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Expression::Undefined)
    }

    pub fn is_defined(&self) -> bool {
        !self.is_undefined()
    }

    pub fn is_constant(&self) -> bool {
        matches!(
            self,
            Expression::SignedConstant(_)
                | Expression::UnsignedConstant(_)
                | Expression::StringConstant(_)
        )
    }

    /// 表达式读取的元组标识符
    pub fn tuple_id(&self) -> Option<usize> {
        match self {
            Expression::TupleElement { tuple_id, .. } => Some(*tuple_id),
            _ => None,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::TupleElement { tuple_id, element } => write!(f, "t{}.{}", tuple_id, element),
            Expression::SignedConstant(v) => write!(f, "{}", v),
            Expression::UnsignedConstant(v) => write!(f, "{}u", v),
            Expression::StringConstant(idx) => write!(f, "sym#{}", idx),
            Expression::Undefined => write!(f, "_"),
        }
    }
}
