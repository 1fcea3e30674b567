//! 索引选择分析
//!
//! 对给定关系和搜索签名，选择一个词典序索引，并给出该索引无法覆盖、
//! 需要从范围模式中卸载为显式条件的属性集合。
//!
//! 转换只通过 [`IndexAnalysis`] 消费分析结果；[`StaticIndexAnalysis`]
//! 是基于预先登记的候选索引的确定性实现。

use crate::ram::operation::{IndexOperation, RangePattern};
use crate::ram::relation::RelationReference;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// 单个属性上的约束类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeConstraint {
    /// 上下界都未定义
    None,
    /// 上下界相同且已定义
    Equal,
    /// 其他有界情况
    Inequal,
}

/// 搜索签名：调用点上各属性的约束类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchSignature {
    constraints: Vec<AttributeConstraint>,
}

impl SearchSignature {
    pub fn new(constraints: Vec<AttributeConstraint>) -> Self {
        Self { constraints }
    }

    /// 从范围模式推导签名
    pub fn from_pattern(pattern: &RangePattern) -> Self {
        let constraints = (0..pattern.arity())
            .map(|attribute| {
                let lower = pattern.lower_bound(attribute);
                let upper = pattern.upper_bound(attribute);
                if lower.is_undefined() && upper.is_undefined() {
                    AttributeConstraint::None
                } else if lower.is_defined() && lower == upper {
                    AttributeConstraint::Equal
                } else {
                    AttributeConstraint::Inequal
                }
            })
            .collect();
        Self { constraints }
    }

    pub fn arity(&self) -> usize {
        self.constraints.len()
    }

    pub fn get(&self, attribute: usize) -> AttributeConstraint {
        self.constraints
            .get(attribute)
            .copied()
            .unwrap_or(AttributeConstraint::None)
    }

    /// 受约束的属性位置，升序
    pub fn constrained(&self) -> impl Iterator<Item = usize> + '_ {
        self.constraints
            .iter()
            .enumerate()
            .filter(|(_, c)| **c != AttributeConstraint::None)
            .map(|(i, _)| i)
    }

    pub fn is_empty(&self) -> bool {
        self.constrained().next().is_none()
    }
}

impl fmt::Display for SearchSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text: String = self
            .constraints
            .iter()
            .map(|c| match c {
                AttributeConstraint::None => '_',
                AttributeConstraint::Equal => '=',
                AttributeConstraint::Inequal => '~',
            })
            .collect();
        write!(f, "<{}>", text)
    }
}

/// 词典序索引：按顺序排列的属性位置
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Index {
    attributes: Vec<usize>,
}

impl Index {
    pub fn new(attributes: Vec<usize>) -> Self {
        Self { attributes }
    }

    /// 按属性自然顺序排列的索引
    pub fn natural(arity: usize) -> Self {
        Self::new((0..arity).collect())
    }

    pub fn attributes(&self) -> &[usize] {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// 该索引能覆盖的受约束属性
    ///
    /// 沿索引顺序，等值属性逐个覆盖；第一个非等值约束属性被作为范围覆盖，
    /// 之后的属性都无法使用索引。
    pub fn covered(&self, signature: &SearchSignature) -> BTreeSet<usize> {
        self.scores(signature)
            .into_iter()
            .zip(self.attributes.iter().copied())
            .map(|(_, attribute)| attribute)
            .collect()
    }

    fn scores(&self, signature: &SearchSignature) -> Vec<IndexScore> {
        let mut scores = Vec::new();
        for &attribute in &self.attributes {
            match signature.get(attribute) {
                AttributeConstraint::Equal => scores.push(IndexScore::Prefix),
                AttributeConstraint::Inequal => {
                    scores.push(IndexScore::Range);
                    break;
                }
                AttributeConstraint::None => break,
            }
        }
        scores
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let attrs: Vec<String> = self.attributes.iter().map(|a| a.to_string()).collect();
        write!(f, "[{}]", attrs.join(","))
    }
}

/// 索引评分，分数越高表示索引越适合该签名
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum IndexScore {
    /// 范围条件
    Range = 1,
    /// 前缀匹配（等值）
    Prefix = 2,
}

/// 索引选择分析
///
/// 对同一程序、同一关系和签名，重复查询必须返回相同的结果
pub trait IndexAnalysis {
    /// 为关系和签名选择的索引
    fn chosen_index(&self, relation: &RelationReference, signature: &SearchSignature) -> Index;

    /// 签名中需要卸载为显式条件的属性位置
    fn attributes_to_discharge(
        &self,
        signature: &SearchSignature,
        relation: &RelationReference,
    ) -> BTreeSet<usize>;

    /// 带索引操作在调用点上的签名
    fn search_signature(&self, op: &IndexOperation) -> SearchSignature {
        SearchSignature::from_pattern(op.pattern())
    }
}

/// 基于登记候选索引的静态分析
#[derive(Debug, Clone, Default)]
pub struct StaticIndexAnalysis {
    candidates: BTreeMap<String, Vec<Index>>,
}

impl StaticIndexAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为关系登记一个候选索引
    pub fn add_index(&mut self, relation: impl Into<String>, index: Index) -> &mut Self {
        self.candidates.entry(relation.into()).or_default().push(index);
        self
    }

    pub fn with_index(mut self, relation: impl Into<String>, attributes: Vec<usize>) -> Self {
        self.add_index(relation, Index::new(attributes));
        self
    }

    pub fn candidates(&self, relation: &str) -> &[Index] {
        self.candidates
            .get(relation)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl IndexAnalysis for StaticIndexAnalysis {
    fn chosen_index(&self, relation: &RelationReference, signature: &SearchSignature) -> Index {
        let candidates = self.candidates(relation.name());
        if candidates.is_empty() {
            return Index::natural(relation.arity());
        }

        // 先比较得分序列，再比较字段数量；完全相同时保留先登记的索引
        let mut best = &candidates[0];
        let mut best_scores = best.scores(signature);
        for candidate in &candidates[1..] {
            let scores = candidate.scores(signature);
            let better = scores > best_scores
                || (scores == best_scores && candidate.len() < best.len());
            if better {
                best = candidate;
                best_scores = scores;
            }
        }

        log::debug!(
            "关系 {} 签名 {} 选择索引 {}",
            relation,
            signature,
            best
        );
        best.clone()
    }

    fn attributes_to_discharge(
        &self,
        signature: &SearchSignature,
        relation: &RelationReference,
    ) -> BTreeSet<usize> {
        let covered = self.chosen_index(relation, signature).covered(signature);
        signature
            .constrained()
            .filter(|attribute| !covered.contains(attribute))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ram::expression::Expression;

    fn signature(text: &str) -> SearchSignature {
        SearchSignature::new(
            text.chars()
                .map(|c| match c {
                    '=' => AttributeConstraint::Equal,
                    '~' => AttributeConstraint::Inequal,
                    _ => AttributeConstraint::None,
                })
                .collect(),
        )
    }

    #[test]
    fn test_signature_from_pattern() {
        let mut pattern = RangePattern::unbounded(3);
        pattern.set_bounds(0, Expression::signed(1), Expression::signed(1));
        pattern.set_bounds(1, Expression::signed(1), Expression::Undefined);

        let sig = SearchSignature::from_pattern(&pattern);
        assert_eq!(sig.get(0), AttributeConstraint::Equal);
        assert_eq!(sig.get(1), AttributeConstraint::Inequal);
        assert_eq!(sig.get(2), AttributeConstraint::None);
        assert_eq!(sig.constrained().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(sig.to_string(), "<=~_>");
        assert!(SearchSignature::from_pattern(&RangePattern::unbounded(2)).is_empty());
    }

    #[test]
    fn test_index_coverage_stops_after_range() {
        let index = Index::new(vec![0, 1, 2]);
        let covered = index.covered(&signature("~=="));
        assert_eq!(covered.into_iter().collect::<Vec<_>>(), vec![0]);

        let covered = index.covered(&signature("==~"));
        assert_eq!(covered.into_iter().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_chosen_index_prefers_prefix() {
        let analysis = StaticIndexAnalysis::new()
            .with_index("R", vec![0, 1])
            .with_index("R", vec![1, 0]);
        let rel = RelationReference::new("R", 2);

        assert_eq!(
            analysis.chosen_index(&rel, &signature("_=")),
            Index::new(vec![1, 0])
        );
        assert_eq!(
            analysis.chosen_index(&rel, &signature("=_")),
            Index::new(vec![0, 1])
        );
    }

    #[test]
    fn test_chosen_index_tie_prefers_shorter() {
        let analysis = StaticIndexAnalysis::new()
            .with_index("R", vec![0, 1, 2])
            .with_index("R", vec![0]);
        let rel = RelationReference::new("R", 3);
        assert_eq!(
            analysis.chosen_index(&rel, &signature("=__")),
            Index::new(vec![0])
        );
    }

    #[test]
    fn test_attributes_to_discharge() {
        let analysis = StaticIndexAnalysis::new().with_index("R", vec![0]);
        let rel = RelationReference::new("R", 2);

        assert!(analysis.attributes_to_discharge(&signature("=_"), &rel).is_empty());
        assert_eq!(
            analysis
                .attributes_to_discharge(&signature("_="), &rel)
                .into_iter()
                .collect::<Vec<_>>(),
            vec![1]
        );
        assert_eq!(
            analysis
                .attributes_to_discharge(&signature("~~"), &rel)
                .into_iter()
                .collect::<Vec<_>>(),
            vec![1]
        );
    }

    #[test]
    fn test_unregistered_relation_uses_natural_order() {
        let analysis = StaticIndexAnalysis::new();
        let rel = RelationReference::new("T", 3);
        assert_eq!(analysis.chosen_index(&rel, &signature("~~_")), Index::natural(3));
        assert_eq!(
            analysis
                .attributes_to_discharge(&signature("~~_"), &rel)
                .into_iter()
                .collect::<Vec<_>>(),
            vec![1]
        );
    }
}
