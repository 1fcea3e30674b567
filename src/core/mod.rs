pub mod error;
pub mod symbol;
pub mod types;

// 错误和结果类型
pub use error::{RamError, RamResult};

pub use symbol::SymbolTable;

pub use types::operators::{AggregateFunction, BinaryConstraintOp};
