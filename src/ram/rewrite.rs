//! 操作树重写基础设施
//!
//! 重写以"映射器"为单位：映射器接收一个被移出槽位的操作（所有权转移），
//! 返回放回同一槽位的替换操作，替换操作可以是不同的变体。
//!
//! - 实现 [`OperationMapper`] 的结构体自己决定何时调用 `Operation::apply`
//!   继续向下递归，适合需要携带状态（例如 changed 标记）的转换
//! - [`rewrite_pre_order`] / [`rewrite_post_order`] 用于无需控制递归的简单重写

use crate::ram::operation::Operation;

/// 操作映射器
pub trait OperationMapper {
    fn map(&mut self, op: Operation) -> Operation;
}

impl<F> OperationMapper for F
where
    F: FnMut(Operation) -> Operation,
{
    fn map(&mut self, op: Operation) -> Operation {
        self(op)
    }
}

/// 先父后子的映射器适配器
///
/// 先对节点调用 `f`，再递归进入（可能已被替换的）节点的子操作
pub struct PreOrder<F> {
    f: F,
}

impl<F> PreOrder<F>
where
    F: FnMut(Operation) -> Operation,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> OperationMapper for PreOrder<F>
where
    F: FnMut(Operation) -> Operation,
{
    fn map(&mut self, op: Operation) -> Operation {
        let mut op = (self.f)(op);
        op.apply(self);
        op
    }
}

/// 先子后父的映射器适配器
pub struct PostOrder<F> {
    f: F,
}

impl<F> PostOrder<F>
where
    F: FnMut(Operation) -> Operation,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> OperationMapper for PostOrder<F>
where
    F: FnMut(Operation) -> Operation,
{
    fn map(&mut self, mut op: Operation) -> Operation {
        op.apply(self);
        (self.f)(op)
    }
}

/// 对整棵操作树先父后子地应用 `f`
pub fn rewrite_pre_order<F>(op: Operation, f: F) -> Operation
where
    F: FnMut(Operation) -> Operation,
{
    PreOrder::new(f).map(op)
}

/// 对整棵操作树先子后父地应用 `f`
pub fn rewrite_post_order<F>(op: Operation, f: F) -> Operation
where
    F: FnMut(Operation) -> Operation,
{
    PostOrder::new(f).map(op)
}
