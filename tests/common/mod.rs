//! 集成测试共享工具模块
//!
//! 提供程序构造、断言和预设结果的索引分析，供所有集成测试使用

#![allow(dead_code)]

pub mod assertions;
pub mod data_fixtures;

use ramlog::ram::analysis::{Index, IndexAnalysis, SearchSignature};
use ramlog::ram::RelationReference;
use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};

/// 返回预设卸载集合的索引分析
///
/// 未登记的关系不卸载任何属性；选择的索引总是自然顺序。
#[derive(Debug, Default)]
pub struct FixedIndexAnalysis {
    discharge: BTreeMap<String, BTreeSet<usize>>,
    calls: Cell<usize>,
}

impl FixedIndexAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn discharging(mut self, relation: &str, attributes: &[usize]) -> Self {
        self.discharge
            .insert(relation.to_string(), attributes.iter().copied().collect());
        self
    }

    /// `attributes_to_discharge` 被调用的次数
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl IndexAnalysis for FixedIndexAnalysis {
    fn chosen_index(&self, relation: &RelationReference, _signature: &SearchSignature) -> Index {
        Index::natural(relation.arity())
    }

    fn attributes_to_discharge(
        &self,
        _signature: &SearchSignature,
        relation: &RelationReference,
    ) -> BTreeSet<usize> {
        self.calls.set(self.calls.get() + 1);
        self.discharge
            .get(relation.name())
            .cloned()
            .unwrap_or_default()
    }
}
