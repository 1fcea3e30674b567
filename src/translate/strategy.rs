//! 翻译策略接口
//!
//! 把规则语言降级为 RAM 的可替换策略。策略提供四个工厂：整个程序、
//! 单条规则、规则体文字、规则参数各一个翻译器。不同的求值方式
//! （例如半朴素求值、带溯源的求值）只需要提供不同的策略，
//! 不影响操作树模型本身。

use crate::core::error::RamResult;
use crate::core::symbol::SymbolTable;
use crate::ram::condition::Condition;
use crate::ram::expression::Expression;
use crate::ram::program::Program;
use crate::ram::statement::Statement;
use crate::translate::context::{TranslatorContext, ValueIndex};

/// 源语言的语法类型
pub trait SourceLanguage {
    /// 整个翻译单元
    type Program;
    /// 规则
    type Clause;
    /// 规则体文字
    type Literal;
    /// 规则参数
    type Argument;
}

/// 翻译单元 → RAM 程序
pub trait UnitTranslator<L: SourceLanguage> {
    fn translate_unit(&mut self, unit: &L::Program) -> RamResult<Program>;
}

/// 规则 → RAM 语句
pub trait ClauseTranslator<L: SourceLanguage> {
    fn translate_clause(&mut self, clause: &L::Clause) -> RamResult<Statement>;
}

/// 规则体文字 → RAM 条件
///
/// 不产生条件的文字（例如已由扫描绑定的正文字）返回 `Ok(None)`
pub trait ConstraintTranslator<L: SourceLanguage> {
    fn translate_constraint(&mut self, literal: &L::Literal) -> RamResult<Option<Condition>>;
}

/// 规则参数 → RAM 表达式
pub trait ValueTranslator<L: SourceLanguage> {
    fn translate_value(&mut self, argument: &L::Argument) -> RamResult<Expression>;
}

/// 翻译策略
pub trait TranslationStrategy<L: SourceLanguage> {
    /// 策略名称
    fn name(&self) -> &'static str;

    fn create_unit_translator(&self) -> Box<dyn UnitTranslator<L>>;

    fn create_clause_translator<'a>(
        &self,
        context: &'a TranslatorContext,
        symbol_table: &'a SymbolTable,
    ) -> Box<dyn ClauseTranslator<L> + 'a>;

    fn create_constraint_translator<'a>(
        &self,
        context: &'a TranslatorContext,
        symbol_table: &'a SymbolTable,
        index: &'a ValueIndex,
    ) -> Box<dyn ConstraintTranslator<L> + 'a>;

    fn create_value_translator<'a>(
        &self,
        context: &'a TranslatorContext,
        symbol_table: &'a SymbolTable,
        index: &'a ValueIndex,
    ) -> Box<dyn ValueTranslator<L> + 'a>;
}
