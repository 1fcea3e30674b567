//! 关系代数机（RAM）中间表示
//!
//! 包含 IR 节点定义、遍历与重写基础设施、程序校验、索引分析接口，
//! 以及基于索引的计划转换。

pub mod analysis;
pub mod condition;
pub mod display;
pub mod expression;
pub mod operation;
pub mod program;
pub mod relation;
pub mod rewrite;
pub mod statement;
pub mod transform;
pub mod validate;
pub mod visitor;

pub use analysis::{IndexAnalysis, SearchSignature, StaticIndexAnalysis};
pub use condition::Condition;
pub use expression::Expression;
pub use operation::{IndexOperation, Operation, RangePattern};
pub use program::Program;
pub use relation::{Relation, RelationReference};
pub use rewrite::OperationMapper;
pub use statement::{Query, Statement};
pub use transform::{
    IndexToFilterTransformer, IndexedInequalityTransformer, RemoveEmptyIndexTransformer,
    TransformPipeline, Transformer,
};
pub use validate::ProgramValidator;
