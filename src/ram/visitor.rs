//! RAM 节点只读遍历
//!
//! 提供统一的节点引用 [`NodeRef`] 和按类型过滤的深度优先遍历：
//!
//! ```ignore
//! visit_depth_first(&program, |scan: &IndexScan| { ... });
//! ```
//!
//! 遍历顺序为先父后子，同一节点的子节点按声明顺序访问。

use crate::ram::condition::Condition;
use crate::ram::expression::Expression;
use crate::ram::operation::{
    Aggregate, Choice, Filter, IndexAggregate, IndexChoice, IndexScan, Lookup, Operation,
    ParallelIndexScan, ParallelScan, Project, Return, Scan,
};
use crate::ram::program::Program;
use crate::ram::statement::{Query, Statement};

/// 任意 RAM 节点的借用
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Program(&'a Program),
    Statement(&'a Statement),
    Operation(&'a Operation),
    Condition(&'a Condition),
    Expression(&'a Expression),
}

impl<'a> NodeRef<'a> {
    /// 直接子节点
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        match *self {
            NodeRef::Program(program) => program
                .statements()
                .iter()
                .chain(program.subroutines().values())
                .map(NodeRef::Statement)
                .collect(),
            NodeRef::Statement(stmt) => match stmt {
                Statement::Query(query) => vec![NodeRef::Operation(&query.operation)],
                Statement::Exit(cond) => vec![NodeRef::Condition(cond)],
                other => other
                    .child_statements()
                    .into_iter()
                    .map(NodeRef::Statement)
                    .collect(),
            },
            NodeRef::Operation(op) => {
                let mut children: Vec<NodeRef<'a>> =
                    op.expressions().into_iter().map(NodeRef::Expression).collect();
                if let Some(cond) = op.condition() {
                    children.push(NodeRef::Condition(cond));
                }
                if let Some(nested) = op.nested() {
                    children.push(NodeRef::Operation(nested));
                }
                children
            }
            NodeRef::Condition(cond) => cond
                .child_conditions()
                .into_iter()
                .map(NodeRef::Condition)
                .chain(cond.expressions().into_iter().map(NodeRef::Expression))
                .collect(),
            NodeRef::Expression(_) => Vec::new(),
        }
    }
}

impl<'a> From<&'a Program> for NodeRef<'a> {
    fn from(node: &'a Program) -> Self {
        NodeRef::Program(node)
    }
}

impl<'a> From<&'a Statement> for NodeRef<'a> {
    fn from(node: &'a Statement) -> Self {
        NodeRef::Statement(node)
    }
}

impl<'a> From<&'a Query> for NodeRef<'a> {
    fn from(node: &'a Query) -> Self {
        NodeRef::Operation(&node.operation)
    }
}

impl<'a> From<&'a Operation> for NodeRef<'a> {
    fn from(node: &'a Operation) -> Self {
        NodeRef::Operation(node)
    }
}

impl<'a> From<&'a Condition> for NodeRef<'a> {
    fn from(node: &'a Condition) -> Self {
        NodeRef::Condition(node)
    }
}

impl<'a> From<&'a Expression> for NodeRef<'a> {
    fn from(node: &'a Expression) -> Self {
        NodeRef::Expression(node)
    }
}

/// 可以从 [`NodeRef`] 中按类型取出的节点
pub trait NodeCast {
    fn cast<'a>(node: NodeRef<'a>) -> Option<&'a Self>;
}

impl NodeCast for Statement {
    fn cast<'a>(node: NodeRef<'a>) -> Option<&'a Self> {
        match node {
            NodeRef::Statement(stmt) => Some(stmt),
            _ => None,
        }
    }
}

impl NodeCast for Query {
    fn cast<'a>(node: NodeRef<'a>) -> Option<&'a Self> {
        match node {
            NodeRef::Statement(Statement::Query(query)) => Some(query),
            _ => None,
        }
    }
}

impl NodeCast for Operation {
    fn cast<'a>(node: NodeRef<'a>) -> Option<&'a Self> {
        match node {
            NodeRef::Operation(op) => Some(op),
            _ => None,
        }
    }
}

impl NodeCast for Condition {
    fn cast<'a>(node: NodeRef<'a>) -> Option<&'a Self> {
        match node {
            NodeRef::Condition(cond) => Some(cond),
            _ => None,
        }
    }
}

impl NodeCast for Expression {
    fn cast<'a>(node: NodeRef<'a>) -> Option<&'a Self> {
        match node {
            NodeRef::Expression(expr) => Some(expr),
            _ => None,
        }
    }
}

macro_rules! impl_operation_cast {
    ($($variant:ident),+ $(,)?) => {
        $(
            impl NodeCast for $variant {
                fn cast<'a>(node: NodeRef<'a>) -> Option<&'a Self> {
                    match node {
                        NodeRef::Operation(Operation::$variant(op)) => Some(op),
                        _ => None,
                    }
                }
            }
        )+
    };
}

impl_operation_cast!(
    Scan,
    ParallelScan,
    IndexScan,
    ParallelIndexScan,
    Choice,
    IndexChoice,
    Aggregate,
    IndexAggregate,
    Filter,
    Lookup,
    Project,
    Return,
);

/// 深度优先遍历，对每个类型为 `T` 的节点调用 `visitor`
pub fn visit_depth_first<'a, T, F>(root: impl Into<NodeRef<'a>>, mut visitor: F)
where
    T: NodeCast + 'a,
    F: FnMut(&'a T),
{
    visit_node(root.into(), &mut visitor);
}

fn visit_node<'a, T, F>(node: NodeRef<'a>, visitor: &mut F)
where
    T: NodeCast + 'a,
    F: FnMut(&'a T),
{
    if let Some(target) = T::cast(node) {
        visitor(target);
    }
    for child in node.children() {
        visit_node(child, visitor);
    }
}

/// 按深度优先顺序收集所有类型为 `T` 的节点
pub fn collect_nodes<'a, T>(root: impl Into<NodeRef<'a>>) -> Vec<&'a T>
where
    T: NodeCast + 'a,
{
    let mut nodes = Vec::new();
    visit_depth_first(root, |node: &'a T| nodes.push(node));
    nodes
}
