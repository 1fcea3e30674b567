//! RAM 操作树
//!
//! 操作是关系代数查询的节点，构成严格嵌套的树：每个非叶子操作独占
//! 一个嵌套子操作（Filter 另外持有一个条件），叶子操作为 Project 和
//! Return。相等性和克隆由派生实现，按字段递归比较/复制整棵子树。
//!
//! 带索引的变体（IndexScan、ParallelIndexScan、IndexChoice、
//! IndexAggregate）额外携带一个 [`RangePattern`]；它们构成封闭集合
//! [`IndexOperation`]，转换通过对该枚举的穷尽匹配处理所有情况。

use crate::core::types::operators::AggregateFunction;
use crate::ram::condition::Condition;
use crate::ram::expression::Expression;
use crate::ram::relation::RelationReference;
use crate::ram::rewrite::OperationMapper;
use serde::{Deserialize, Serialize};

/// 范围模式
///
/// 每个属性一对 (下界, 上界)，`Undefined` 表示该方向无界。
/// 长度总是等于所引用关系的元数。
///
/// 反序列化时拒绝上下界长度不一致的模式；直接构造的模式由
/// `ProgramValidator` 检查。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRangePattern")]
pub struct RangePattern {
    lower: Vec<Expression>,
    upper: Vec<Expression>,
}

#[derive(Deserialize)]
struct RawRangePattern {
    lower: Vec<Expression>,
    upper: Vec<Expression>,
}

impl TryFrom<RawRangePattern> for RangePattern {
    type Error = String;

    fn try_from(raw: RawRangePattern) -> Result<Self, Self::Error> {
        if raw.lower.len() != raw.upper.len() {
            return Err(format!(
                "范围模式下界长度 {} 与上界长度 {} 不一致",
                raw.lower.len(),
                raw.upper.len()
            ));
        }
        Ok(Self {
            lower: raw.lower,
            upper: raw.upper,
        })
    }
}

impl RangePattern {
    pub fn new(lower: Vec<Expression>, upper: Vec<Expression>) -> Self {
        Self { lower, upper }
    }

    /// 上下界长度是否一致
    pub fn is_well_formed(&self) -> bool {
        self.lower.len() == self.upper.len()
    }

    /// 所有位置都无界的模式
    pub fn unbounded(arity: usize) -> Self {
        Self {
            lower: vec![Expression::Undefined; arity],
            upper: vec![Expression::Undefined; arity],
        }
    }

    /// 点查询模式，上下界相同
    pub fn point(values: Vec<Expression>) -> Self {
        Self {
            lower: values.clone(),
            upper: values,
        }
    }

    pub fn arity(&self) -> usize {
        self.lower.len()
    }

    pub fn lower(&self) -> &[Expression] {
        &self.lower
    }

    pub fn upper(&self) -> &[Expression] {
        &self.upper
    }

    pub fn lower_bound(&self, attribute: usize) -> &Expression {
        &self.lower[attribute]
    }

    pub fn upper_bound(&self, attribute: usize) -> &Expression {
        &self.upper[attribute]
    }

    /// 设置某个属性的上下界
    pub fn set_bounds(&mut self, attribute: usize, lower: Expression, upper: Expression) {
        self.lower[attribute] = lower;
        self.upper[attribute] = upper;
    }

    /// 把某个属性的上下界都重置为 `Undefined`
    pub fn reset(&mut self, attribute: usize) {
        self.set_bounds(attribute, Expression::Undefined, Expression::Undefined);
    }

    /// 该属性上下界是否都未定义
    pub fn is_unbounded_at(&self, attribute: usize) -> bool {
        let undefined = |bounds: &[Expression]| {
            bounds
                .get(attribute)
                .map_or(true, Expression::is_undefined)
        };
        undefined(self.lower.as_slice()) && undefined(self.upper.as_slice())
    }

    /// 是否至少有一个属性带有已定义的界
    pub fn has_defined_bound(&self) -> bool {
        (0..self.arity()).any(|i| !self.is_unbounded_at(i))
    }

    pub fn expressions(&self) -> impl Iterator<Item = &Expression> {
        self.lower.iter().chain(self.upper.iter())
    }
}

/// 全表扫描：遍历关系的每个元组，绑定到 `tuple_id`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scan {
    pub relation: RelationReference,
    pub tuple_id: usize,
    pub nested: Box<Operation>,
    pub profile_text: String,
}

/// 并行全表扫描
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParallelScan {
    pub relation: RelationReference,
    pub tuple_id: usize,
    pub nested: Box<Operation>,
    pub profile_text: String,
}

/// 索引范围扫描：只遍历落在范围模式内的元组
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexScan {
    pub relation: RelationReference,
    pub tuple_id: usize,
    pub pattern: RangePattern,
    pub nested: Box<Operation>,
    pub profile_text: String,
}

/// 并行索引范围扫描
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParallelIndexScan {
    pub relation: RelationReference,
    pub tuple_id: usize,
    pub pattern: RangePattern,
    pub nested: Box<Operation>,
    pub profile_text: String,
}

/// 选择：找到第一个满足条件的元组后进入嵌套操作一次
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Choice {
    pub relation: RelationReference,
    pub tuple_id: usize,
    pub condition: Condition,
    pub nested: Box<Operation>,
    pub profile_text: String,
}

/// 带范围模式的选择
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexChoice {
    pub relation: RelationReference,
    pub tuple_id: usize,
    pub condition: Condition,
    pub pattern: RangePattern,
    pub nested: Box<Operation>,
    pub profile_text: String,
}

/// 聚合：对满足条件的元组计算目标表达式的聚合值，结果绑定到
/// `tuple_id` 的第 0 个属性
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Aggregate {
    pub relation: RelationReference,
    pub tuple_id: usize,
    pub function: AggregateFunction,
    pub expression: Expression,
    pub condition: Condition,
    pub nested: Box<Operation>,
    pub profile_text: String,
}

/// 带范围模式的聚合
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexAggregate {
    pub relation: RelationReference,
    pub tuple_id: usize,
    pub function: AggregateFunction,
    pub expression: Expression,
    pub condition: Condition,
    pub pattern: RangePattern,
    pub nested: Box<Operation>,
    pub profile_text: String,
}

/// 过滤：条件成立时进入嵌套操作
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filter {
    pub condition: Condition,
    pub nested: Box<Operation>,
    pub profile_text: String,
}

/// 记录解包：把外层元组 `ref_tuple_id` 第 `ref_position` 个属性中的记录
/// 展开为元数为 `arity` 的新元组，绑定到 `tuple_id`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lookup {
    pub ref_tuple_id: usize,
    pub ref_position: usize,
    pub arity: usize,
    pub tuple_id: usize,
    pub nested: Box<Operation>,
}

/// 投影：计算表达式并插入目标关系
///
/// 若设置了 `filter`，只在元组不存在于该关系时插入
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Project {
    pub relation: RelationReference,
    pub values: Vec<Expression>,
    pub filter: Option<RelationReference>,
}

/// 子程序返回
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Return {
    pub values: Vec<Expression>,
}

impl Scan {
    pub fn new(
        relation: RelationReference,
        tuple_id: usize,
        nested: Operation,
        profile_text: impl Into<String>,
    ) -> Self {
        Self {
            relation,
            tuple_id,
            nested: Box::new(nested),
            profile_text: profile_text.into(),
        }
    }
}

impl ParallelScan {
    pub fn new(
        relation: RelationReference,
        tuple_id: usize,
        nested: Operation,
        profile_text: impl Into<String>,
    ) -> Self {
        Self {
            relation,
            tuple_id,
            nested: Box::new(nested),
            profile_text: profile_text.into(),
        }
    }
}

impl IndexScan {
    pub fn new(
        relation: RelationReference,
        tuple_id: usize,
        pattern: RangePattern,
        nested: Operation,
        profile_text: impl Into<String>,
    ) -> Self {
        Self {
            relation,
            tuple_id,
            pattern,
            nested: Box::new(nested),
            profile_text: profile_text.into(),
        }
    }
}

impl ParallelIndexScan {
    pub fn new(
        relation: RelationReference,
        tuple_id: usize,
        pattern: RangePattern,
        nested: Operation,
        profile_text: impl Into<String>,
    ) -> Self {
        Self {
            relation,
            tuple_id,
            pattern,
            nested: Box::new(nested),
            profile_text: profile_text.into(),
        }
    }
}

impl Choice {
    pub fn new(
        relation: RelationReference,
        tuple_id: usize,
        condition: Condition,
        nested: Operation,
        profile_text: impl Into<String>,
    ) -> Self {
        Self {
            relation,
            tuple_id,
            condition,
            nested: Box::new(nested),
            profile_text: profile_text.into(),
        }
    }
}

impl IndexChoice {
    pub fn new(
        relation: RelationReference,
        tuple_id: usize,
        condition: Condition,
        pattern: RangePattern,
        nested: Operation,
        profile_text: impl Into<String>,
    ) -> Self {
        Self {
            relation,
            tuple_id,
            condition,
            pattern,
            nested: Box::new(nested),
            profile_text: profile_text.into(),
        }
    }
}

impl Aggregate {
    pub fn new(
        nested: Operation,
        function: AggregateFunction,
        relation: RelationReference,
        expression: Expression,
        condition: Condition,
        tuple_id: usize,
    ) -> Self {
        Self {
            relation,
            tuple_id,
            function,
            expression,
            condition,
            nested: Box::new(nested),
            profile_text: String::new(),
        }
    }
}

impl IndexAggregate {
    pub fn new(
        nested: Operation,
        function: AggregateFunction,
        relation: RelationReference,
        expression: Expression,
        condition: Condition,
        pattern: RangePattern,
        tuple_id: usize,
    ) -> Self {
        Self {
            relation,
            tuple_id,
            function,
            expression,
            condition,
            pattern,
            nested: Box::new(nested),
            profile_text: String::new(),
        }
    }
}

impl Filter {
    pub fn new(condition: Condition, nested: Operation) -> Self {
        Self {
            condition,
            nested: Box::new(nested),
            profile_text: String::new(),
        }
    }
}

impl Lookup {
    pub fn new(
        nested: Operation,
        ref_tuple_id: usize,
        ref_position: usize,
        arity: usize,
        tuple_id: usize,
    ) -> Self {
        Self {
            ref_tuple_id,
            ref_position,
            arity,
            tuple_id,
            nested: Box::new(nested),
        }
    }
}

impl Project {
    pub fn new(relation: RelationReference, values: Vec<Expression>) -> Self {
        Self {
            relation,
            values,
            filter: None,
        }
    }

    /// 只插入 `filter` 中尚不存在的元组
    pub fn with_filter(mut self, filter: RelationReference) -> Self {
        self.filter = Some(filter);
        self
    }
}

impl Return {
    pub fn new(values: Vec<Expression>) -> Self {
        Self { values }
    }
}

/// RAM 操作
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Scan(Scan),
    ParallelScan(ParallelScan),
    IndexScan(IndexScan),
    ParallelIndexScan(ParallelIndexScan),
    Choice(Choice),
    IndexChoice(IndexChoice),
    Aggregate(Aggregate),
    IndexAggregate(IndexAggregate),
    Filter(Filter),
    Lookup(Lookup),
    Project(Project),
    Return(Return),
}

/// 占位值，仅在把子操作移出槽位的瞬间使用
impl Default for Operation {
    fn default() -> Self {
        Operation::Return(Return::default())
    }
}

macro_rules! impl_operation_from {
    ($($variant:ident),+ $(,)?) => {
        $(
            impl From<$variant> for Operation {
                fn from(op: $variant) -> Self {
                    Operation::$variant(op)
                }
            }
        )+
    };
}

impl_operation_from!(
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

impl Operation {
    /// 变体名称
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Scan(_) => "Scan",
            Operation::ParallelScan(_) => "ParallelScan",
            Operation::IndexScan(_) => "IndexScan",
            Operation::ParallelIndexScan(_) => "ParallelIndexScan",
            Operation::Choice(_) => "Choice",
            Operation::IndexChoice(_) => "IndexChoice",
            Operation::Aggregate(_) => "Aggregate",
            Operation::IndexAggregate(_) => "IndexAggregate",
            Operation::Filter(_) => "Filter",
            Operation::Lookup(_) => "Lookup",
            Operation::Project(_) => "Project",
            Operation::Return(_) => "Return",
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Operation::Project(_) | Operation::Return(_))
    }

    pub fn is_index_operation(&self) -> bool {
        matches!(
            self,
            Operation::IndexScan(_)
                | Operation::ParallelIndexScan(_)
                | Operation::IndexChoice(_)
                | Operation::IndexAggregate(_)
        )
    }

    /// 嵌套子操作
    pub fn nested(&self) -> Option<&Operation> {
        match self {
            Operation::Scan(op) => Some(&op.nested),
            Operation::ParallelScan(op) => Some(&op.nested),
            Operation::IndexScan(op) => Some(&op.nested),
            Operation::ParallelIndexScan(op) => Some(&op.nested),
            Operation::Choice(op) => Some(&op.nested),
            Operation::IndexChoice(op) => Some(&op.nested),
            Operation::Aggregate(op) => Some(&op.nested),
            Operation::IndexAggregate(op) => Some(&op.nested),
            Operation::Filter(op) => Some(&op.nested),
            Operation::Lookup(op) => Some(&op.nested),
            Operation::Project(_) | Operation::Return(_) => None,
        }
    }

    /// 嵌套子操作所在的槽位
    pub fn nested_mut(&mut self) -> Option<&mut Box<Operation>> {
        match self {
            Operation::Scan(op) => Some(&mut op.nested),
            Operation::ParallelScan(op) => Some(&mut op.nested),
            Operation::IndexScan(op) => Some(&mut op.nested),
            Operation::ParallelIndexScan(op) => Some(&mut op.nested),
            Operation::Choice(op) => Some(&mut op.nested),
            Operation::IndexChoice(op) => Some(&mut op.nested),
            Operation::Aggregate(op) => Some(&mut op.nested),
            Operation::IndexAggregate(op) => Some(&mut op.nested),
            Operation::Filter(op) => Some(&mut op.nested),
            Operation::Lookup(op) => Some(&mut op.nested),
            Operation::Project(_) | Operation::Return(_) => None,
        }
    }

    /// 被搜索或被写入的关系
    pub fn relation(&self) -> Option<&RelationReference> {
        match self {
            Operation::Scan(op) => Some(&op.relation),
            Operation::ParallelScan(op) => Some(&op.relation),
            Operation::IndexScan(op) => Some(&op.relation),
            Operation::ParallelIndexScan(op) => Some(&op.relation),
            Operation::Choice(op) => Some(&op.relation),
            Operation::IndexChoice(op) => Some(&op.relation),
            Operation::Aggregate(op) => Some(&op.relation),
            Operation::IndexAggregate(op) => Some(&op.relation),
            Operation::Project(op) => Some(&op.relation),
            Operation::Filter(_) | Operation::Lookup(_) | Operation::Return(_) => None,
        }
    }

    /// 此操作绑定的元组标识符
    pub fn tuple_id(&self) -> Option<usize> {
        match self {
            Operation::Scan(op) => Some(op.tuple_id),
            Operation::ParallelScan(op) => Some(op.tuple_id),
            Operation::IndexScan(op) => Some(op.tuple_id),
            Operation::ParallelIndexScan(op) => Some(op.tuple_id),
            Operation::Choice(op) => Some(op.tuple_id),
            Operation::IndexChoice(op) => Some(op.tuple_id),
            Operation::Aggregate(op) => Some(op.tuple_id),
            Operation::IndexAggregate(op) => Some(op.tuple_id),
            Operation::Lookup(op) => Some(op.tuple_id),
            Operation::Filter(_) | Operation::Project(_) | Operation::Return(_) => None,
        }
    }

    /// 此操作自身持有的条件
    pub fn condition(&self) -> Option<&Condition> {
        match self {
            Operation::Choice(op) => Some(&op.condition),
            Operation::IndexChoice(op) => Some(&op.condition),
            Operation::Aggregate(op) => Some(&op.condition),
            Operation::IndexAggregate(op) => Some(&op.condition),
            Operation::Filter(op) => Some(&op.condition),
            _ => None,
        }
    }

    /// 带索引变体的范围模式
    pub fn range_pattern(&self) -> Option<&RangePattern> {
        match self {
            Operation::IndexScan(op) => Some(&op.pattern),
            Operation::ParallelIndexScan(op) => Some(&op.pattern),
            Operation::IndexChoice(op) => Some(&op.pattern),
            Operation::IndexAggregate(op) => Some(&op.pattern),
            _ => None,
        }
    }

    pub fn profile_text(&self) -> Option<&str> {
        match self {
            Operation::Scan(op) => Some(&op.profile_text),
            Operation::ParallelScan(op) => Some(&op.profile_text),
            Operation::IndexScan(op) => Some(&op.profile_text),
            Operation::ParallelIndexScan(op) => Some(&op.profile_text),
            Operation::Choice(op) => Some(&op.profile_text),
            Operation::IndexChoice(op) => Some(&op.profile_text),
            Operation::Aggregate(op) => Some(&op.profile_text),
            Operation::IndexAggregate(op) => Some(&op.profile_text),
            Operation::Filter(op) => Some(&op.profile_text),
            Operation::Lookup(_) | Operation::Project(_) | Operation::Return(_) => None,
        }
    }

    /// 此操作直接持有的表达式（不含条件内部和子操作）
    pub fn expressions(&self) -> Vec<&Expression> {
        match self {
            Operation::IndexScan(op) => op.pattern.expressions().collect(),
            Operation::ParallelIndexScan(op) => op.pattern.expressions().collect(),
            Operation::IndexChoice(op) => op.pattern.expressions().collect(),
            Operation::Aggregate(op) => vec![&op.expression],
            Operation::IndexAggregate(op) => std::iter::once(&op.expression)
                .chain(op.pattern.expressions())
                .collect(),
            Operation::Project(op) => op.values.iter().collect(),
            Operation::Return(op) => op.values.iter().collect(),
            _ => vec![],
        }
    }

    /// 嵌套深度，叶子为 1
    pub fn depth(&self) -> usize {
        match self.nested() {
            Some(nested) => 1 + nested.depth(),
            None => 1,
        }
    }

    /// 对直接嵌套的子操作应用映射器
    ///
    /// 子操作被移出槽位交给 `mapper`，返回值（可能是不同变体）放回原位。
    /// 是否继续递归由映射器决定。
    pub fn apply<M: OperationMapper + ?Sized>(&mut self, mapper: &mut M) {
        if let Some(slot) = self.nested_mut() {
            let child = std::mem::take(&mut **slot);
            **slot = mapper.map(child);
        }
    }

    /// 拆出带索引的变体；其他变体原样返回
    pub fn into_index_operation(self) -> Result<IndexOperation, Operation> {
        match self {
            Operation::IndexScan(op) => Ok(IndexOperation::Scan(op)),
            Operation::ParallelIndexScan(op) => Ok(IndexOperation::ParallelScan(op)),
            Operation::IndexChoice(op) => Ok(IndexOperation::Choice(op)),
            Operation::IndexAggregate(op) => Ok(IndexOperation::Aggregate(op)),
            other => Err(other),
        }
    }
}

/// 带索引操作的封闭集合
///
/// 新增带索引变体时必须在这里登记，各转换对它的匹配是穷尽的
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOperation {
    Scan(IndexScan),
    ParallelScan(ParallelIndexScan),
    Choice(IndexChoice),
    Aggregate(IndexAggregate),
}

impl IndexOperation {
    pub fn relation(&self) -> &RelationReference {
        match self {
            IndexOperation::Scan(op) => &op.relation,
            IndexOperation::ParallelScan(op) => &op.relation,
            IndexOperation::Choice(op) => &op.relation,
            IndexOperation::Aggregate(op) => &op.relation,
        }
    }

    pub fn tuple_id(&self) -> usize {
        match self {
            IndexOperation::Scan(op) => op.tuple_id,
            IndexOperation::ParallelScan(op) => op.tuple_id,
            IndexOperation::Choice(op) => op.tuple_id,
            IndexOperation::Aggregate(op) => op.tuple_id,
        }
    }

    pub fn pattern(&self) -> &RangePattern {
        match self {
            IndexOperation::Scan(op) => &op.pattern,
            IndexOperation::ParallelScan(op) => &op.pattern,
            IndexOperation::Choice(op) => &op.pattern,
            IndexOperation::Aggregate(op) => &op.pattern,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IndexOperation::Scan(_) => "IndexScan",
            IndexOperation::ParallelScan(_) => "ParallelIndexScan",
            IndexOperation::Choice(_) => "IndexChoice",
            IndexOperation::Aggregate(_) => "IndexAggregate",
        }
    }
}

impl From<IndexOperation> for Operation {
    fn from(op: IndexOperation) -> Self {
        match op {
            IndexOperation::Scan(op) => Operation::IndexScan(op),
            IndexOperation::ParallelScan(op) => Operation::ParallelIndexScan(op),
            IndexOperation::Choice(op) => Operation::IndexChoice(op),
            IndexOperation::Aggregate(op) => Operation::IndexAggregate(op),
        }
    }
}
