//! RAM 语句
//!
//! 语句组成程序的控制结构，`Query` 是唯一持有操作树的语句。

use crate::ram::condition::Condition;
use crate::ram::operation::Operation;
use crate::ram::relation::RelationReference;
use crate::ram::rewrite::OperationMapper;
use serde::{Deserialize, Serialize};

/// 查询语句，独占一棵操作树
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    pub operation: Operation,
}

impl Query {
    pub fn new(operation: Operation) -> Self {
        Self { operation }
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// 对根操作应用映射器，返回值放回根槽位
    pub fn apply<M: OperationMapper + ?Sized>(&mut self, mapper: &mut M) {
        let root = std::mem::take(&mut self.operation);
        self.operation = mapper.map(root);
    }
}

/// RAM 语句
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Statement {
    /// 顺序执行
    Sequence(Vec<Statement>),
    /// 可并行执行
    Parallel(Vec<Statement>),
    /// 循环执行直到 Exit 条件成立
    Loop(Box<Statement>),
    /// 条件成立时退出最内层循环
    Exit(Condition),
    /// 查询
    Query(Query),
    /// 清空关系
    Clear(RelationReference),
    /// 交换两个关系的内容
    Swap(RelationReference, RelationReference),
}

impl Statement {
    pub fn query(operation: Operation) -> Self {
        Statement::Query(Query::new(operation))
    }

    pub fn sequence(statements: Vec<Statement>) -> Self {
        Statement::Sequence(statements)
    }

    pub fn looped(body: Statement) -> Self {
        Statement::Loop(Box::new(body))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Statement::Sequence(_) => "Sequence",
            Statement::Parallel(_) => "Parallel",
            Statement::Loop(_) => "Loop",
            Statement::Exit(_) => "Exit",
            Statement::Query(_) => "Query",
            Statement::Clear(_) => "Clear",
            Statement::Swap(_, _) => "Swap",
        }
    }

    /// 直接子语句
    pub fn child_statements(&self) -> Vec<&Statement> {
        match self {
            Statement::Sequence(stmts) | Statement::Parallel(stmts) => stmts.iter().collect(),
            Statement::Loop(body) => vec![body.as_ref()],
            _ => vec![],
        }
    }

    /// 直接引用的关系
    pub fn relations(&self) -> Vec<&RelationReference> {
        match self {
            Statement::Clear(rel) => vec![rel],
            Statement::Swap(first, second) => vec![first, second],
            _ => vec![],
        }
    }

    /// 深度优先地对每个查询调用 `f`
    pub fn for_each_query_mut<F: FnMut(&mut Query)>(&mut self, f: &mut F) {
        match self {
            Statement::Sequence(stmts) | Statement::Parallel(stmts) => {
                for stmt in stmts {
                    stmt.for_each_query_mut(f);
                }
            }
            Statement::Loop(body) => body.for_each_query_mut(f),
            Statement::Query(query) => f(query),
            Statement::Exit(_) | Statement::Clear(_) | Statement::Swap(_, _) => {}
        }
    }
}
