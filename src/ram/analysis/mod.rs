//! RAM 分析
//!
//! 转换所依赖的分析结果，目前只有索引选择。

pub mod index;

pub use index::{AttributeConstraint, Index, IndexAnalysis, SearchSignature, StaticIndexAnalysis};
