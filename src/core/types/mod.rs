//! 核心类型模块

pub mod operators;

pub use operators::{AggregateFunction, BinaryConstraintOp};
