//! RAM 程序转换
//!
//! 每个转换实现 [`Transformer`]，就地修改程序并返回是否发生了改变。
//! 转换要么完成整个程序的遍历，要么返回错误中止整个编译。

pub mod index_to_filter;
pub mod indexed_inequality;
pub mod pipeline;
pub mod remove_empty_index;

pub use index_to_filter::IndexToFilterTransformer;
pub use indexed_inequality::IndexedInequalityTransformer;
pub use pipeline::TransformPipeline;
pub use remove_empty_index::RemoveEmptyIndexTransformer;

use crate::core::error::RamResult;
use crate::ram::program::Program;

/// 程序转换 trait
pub trait Transformer {
    /// 转换名称，也用于配置中按名称禁用
    fn name(&self) -> &'static str;

    /// 应用转换
    ///
    /// # 返回
    /// - `Ok(true)`: 程序发生了改变
    /// - `Ok(false)`: 程序保持不变
    /// - `Err(e)`: 转换失败，编译应当中止
    fn transform(&mut self, program: &mut Program) -> RamResult<bool>;

    /// 转换完成后程序必须满足的不变量
    fn check_postcondition(&self, _program: &Program) -> RamResult<()> {
        Ok(())
    }
}
