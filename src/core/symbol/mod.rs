//! 符号表模块 - 字符串常量与整数索引之间的双向映射

pub mod symbol_table;

pub use symbol_table::SymbolTable;
