//! 关系声明与关系引用
//!
//! `Relation` 是程序中声明的关系；`RelationReference` 只是按名称和元数
//! 指向某个声明的轻量句柄，不持有关系数据。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 关系的物理表示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RelationRepresentation {
    #[default]
    Default,
    Btree,
    Brie,
    Eqrel,
    Info,
}

/// 关系声明
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    name: String,
    arity: usize,
    attribute_names: Vec<String>,
    attribute_types: Vec<String>,
    representation: RelationRepresentation,
}

impl Relation {
    /// 创建新的关系声明，属性名默认为 `a0, a1, ...`，类型默认为 `i`
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
            attribute_names: (0..arity).map(|i| format!("a{}", i)).collect(),
            attribute_types: vec!["i".to_string(); arity],
            representation: RelationRepresentation::Default,
        }
    }

    pub fn with_attributes(mut self, names: Vec<String>, types: Vec<String>) -> Self {
        self.attribute_names = names;
        self.attribute_types = types;
        self
    }

    pub fn with_representation(mut self, representation: RelationRepresentation) -> Self {
        self.representation = representation;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn attribute_names(&self) -> &[String] {
        &self.attribute_names
    }

    pub fn attribute_types(&self) -> &[String] {
        &self.attribute_types
    }

    pub fn representation(&self) -> RelationRepresentation {
        self.representation
    }

    /// 临时关系（半朴素求值产生的 delta/new 关系）
    pub fn is_temp(&self) -> bool {
        self.name.starts_with('@')
    }

    /// 创建指向此关系的引用
    pub fn reference(&self) -> RelationReference {
        RelationReference::new(self.name.clone(), self.arity)
    }
}

/// 关系引用
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelationReference {
    name: String,
    arity: usize,
}

impl RelationReference {
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }
}

impl fmt::Display for RelationReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
