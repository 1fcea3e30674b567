//! RAM 程序
//!
//! 程序由关系声明、主语句序列和命名子程序组成，是优化流水线的处理单元。

use crate::core::error::{RamError, RamResult};
use crate::ram::relation::{Relation, RelationReference};
use crate::ram::statement::{Query, Statement};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// RAM 程序
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    relations: BTreeMap<String, Relation>,
    statements: Vec<Statement>,
    subroutines: BTreeMap<String, Statement>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// 声明关系，同名关系会被覆盖
    pub fn add_relation(&mut self, relation: Relation) -> RelationReference {
        let reference = relation.reference();
        self.relations.insert(relation.name().to_string(), relation);
        reference
    }

    pub fn add_statement(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    pub fn add_subroutine(&mut self, name: impl Into<String>, body: Statement) {
        self.subroutines.insert(name.into(), body);
    }

    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }

    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations.values()
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn subroutines(&self) -> &BTreeMap<String, Statement> {
        &self.subroutines
    }

    pub fn subroutine(&self, name: &str) -> Option<&Statement> {
        self.subroutines.get(name)
    }

    /// 主语句在前、子程序按名称排序在后，依次对每个查询调用 `f`
    pub fn for_each_query_mut<F: FnMut(&mut Query)>(&mut self, mut f: F) {
        for stmt in &mut self.statements {
            stmt.for_each_query_mut(&mut f);
        }
        for stmt in self.subroutines.values_mut() {
            stmt.for_each_query_mut(&mut f);
        }
    }

    /// 所有查询，顺序与 [`Program::for_each_query_mut`] 一致
    pub fn queries(&self) -> Vec<&Query> {
        crate::ram::visitor::collect_nodes::<Query>(self)
    }

    pub fn to_json(&self) -> RamResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> RamResult<Self> {
        let program: Program = serde_json::from_str(text)?;
        if program
            .relations
            .iter()
            .any(|(name, relation)| name != relation.name())
        {
            return Err(RamError::Serialization(
                "关系表的键与关系名称不一致".to_string(),
            ));
        }
        Ok(program)
    }
}
