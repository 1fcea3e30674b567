//! RamLog - 关系代数机（RAM）中间表示与基于索引的计划重写
//!
//! 本 crate 提供 Datalog 编译器中端的核心部分：
//! - RAM 程序、语句、操作、条件和表达式的树形模型
//! - 深度优先的节点遍历与按所有权转移的节点重写
//! - 索引卸载（把索引无法覆盖的范围界改写为显式过滤条件）
//! - 空索引移除（把没有任何界的带索引操作降级为普通操作）
//! - 转换流水线、程序校验、配置和日志

pub mod config;
pub mod core;
pub mod ram;
pub mod translate;
pub mod utils;
