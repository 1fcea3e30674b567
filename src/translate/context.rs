//! 翻译上下文与值索引
//!
//! `TranslatorContext` 提供翻译期间只读的关系声明信息；
//! `ValueIndex` 记录源语言变量在 RAM 中出现的 (元组标识符, 属性位置)。

use crate::core::error::{RamError, RamResult};
use crate::ram::expression::Expression;
use crate::ram::relation::{Relation, RelationReference};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// 变量在 RAM 中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub tuple_id: usize,
    pub element: usize,
}

impl Location {
    pub fn new(tuple_id: usize, element: usize) -> Self {
        Self { tuple_id, element }
    }

    /// 读取该位置的表达式
    pub fn to_expression(self) -> Expression {
        Expression::tuple_element(self.tuple_id, self.element)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}.{}", self.tuple_id, self.element)
    }
}

/// 变量到出现位置的映射
#[derive(Debug, Clone, Default)]
pub struct ValueIndex {
    references: BTreeMap<String, BTreeSet<Location>>,
}

impl ValueIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记变量的一次出现
    pub fn add_var_reference(&mut self, var: impl Into<String>, location: Location) {
        self.references.entry(var.into()).or_default().insert(location);
    }

    pub fn is_defined(&self, var: &str) -> bool {
        self.references.contains_key(var)
    }

    /// 变量的定义点：最外层（元组标识符最小）的出现位置
    pub fn definition_point(&self, var: &str) -> RamResult<Location> {
        self.references
            .get(var)
            .and_then(|locations| locations.iter().next().copied())
            .ok_or_else(|| RamError::translation(format!("变量 {} 未绑定", var)))
    }

    /// 变量的所有出现位置，升序
    pub fn references(&self, var: &str) -> Vec<Location> {
        self.references
            .get(var)
            .map(|locations| locations.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.references.keys().map(String::as_str)
    }
}

/// 翻译上下文
#[derive(Debug, Clone, Default)]
pub struct TranslatorContext {
    relations: BTreeMap<String, Relation>,
}

impl TranslatorContext {
    pub fn new(relations: impl IntoIterator<Item = Relation>) -> Self {
        Self {
            relations: relations
                .into_iter()
                .map(|rel| (rel.name().to_string(), rel))
                .collect(),
        }
    }

    pub fn relation(&self, name: &str) -> RamResult<&Relation> {
        self.relations
            .get(name)
            .ok_or_else(|| RamError::translation(format!("关系 {} 未声明", name)))
    }

    pub fn reference(&self, name: &str) -> RamResult<RelationReference> {
        self.relation(name).map(Relation::reference)
    }

    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations.values()
    }
}
