//! 规则语言到 RAM 的翻译边界
//!
//! 本 crate 只定义翻译策略的接口和翻译期间共享的上下文，
//! 具体的源语言和降级规则由使用方提供。

pub mod context;
pub mod strategy;

pub use context::{Location, TranslatorContext, ValueIndex};
pub use strategy::{
    ClauseTranslator, ConstraintTranslator, SourceLanguage, TranslationStrategy, UnitTranslator,
    ValueTranslator,
};
