//! 符号表实现
//!
//! 将字符串常量编码为整数索引，`Expression::StringConstant` 只保存索引。
//! 翻译阶段的多个翻译器共享同一个符号表，因此使用 RwLock 提供内部可变性。

use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct SymbolStore {
    by_name: HashMap<String, usize>,
    names: Vec<String>,
}

/// 符号表
///
/// 同一字符串总是得到相同的索引，索引按首次出现的顺序分配
#[derive(Debug, Default)]
pub struct SymbolTable {
    store: RwLock<SymbolStore>,
}

impl Clone for SymbolTable {
    fn clone(&self) -> Self {
        let guard = self.store.read();
        Self {
            store: RwLock::new(SymbolStore {
                by_name: guard.by_name.clone(),
                names: guard.names.clone(),
            }),
        }
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 编码字符串，不存在时插入
    pub fn encode(&self, symbol: &str) -> usize {
        if let Some(index) = self.store.read().by_name.get(symbol) {
            return *index;
        }
        let mut guard = self.store.write();
        // 读锁释放后可能已被其他翻译器插入
        if let Some(index) = guard.by_name.get(symbol) {
            return *index;
        }
        let index = guard.names.len();
        guard.names.push(symbol.to_string());
        guard.by_name.insert(symbol.to_string(), index);
        index
    }

    /// 解码索引
    pub fn decode(&self, index: usize) -> Option<String> {
        self.store.read().names.get(index).cloned()
    }

    /// 查找字符串而不插入
    pub fn lookup(&self, symbol: &str) -> Option<usize> {
        self.store.read().by_name.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.store.read().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
