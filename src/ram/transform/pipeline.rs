//! 转换流水线
//!
//! 按登记顺序运行转换，遵循 [`OptimizerConfig`]：跳过被禁用的转换，
//! 开启校验时在运行前后检查程序结构，并检查每个转换的后置不变量。

use crate::config::OptimizerConfig;
use crate::core::error::RamResult;
use crate::ram::analysis::IndexAnalysis;
use crate::ram::program::Program;
use crate::ram::transform::{IndexToFilterTransformer, RemoveEmptyIndexTransformer, Transformer};
use crate::ram::validate::ProgramValidator;

/// 转换流水线
pub struct TransformPipeline<'a> {
    transformers: Vec<Box<dyn Transformer + 'a>>,
    config: OptimizerConfig,
}

impl<'a> TransformPipeline<'a> {
    /// 创建空流水线
    pub fn new(config: OptimizerConfig) -> Self {
        Self {
            transformers: Vec::new(),
            config,
        }
    }

    /// 创建包含索引卸载和空索引移除两个遍历的流水线
    pub fn with_index_passes(analysis: &'a dyn IndexAnalysis, config: OptimizerConfig) -> Self {
        let mut pipeline = Self::new(config);
        pipeline
            .add(IndexToFilterTransformer::new(analysis))
            .add(RemoveEmptyIndexTransformer::new());
        pipeline
    }

    /// 添加转换
    pub fn add<T: Transformer + 'a>(&mut self, transformer: T) -> &mut Self {
        self.transformers.push(Box::new(transformer));
        self
    }

    pub fn transformer_names(&self) -> Vec<&'static str> {
        self.transformers.iter().map(|t| t.name()).collect()
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// 运行所有转换，返回是否有任何转换改变了程序
    pub fn run(&mut self, program: &mut Program) -> RamResult<bool> {
        if self.config.validate {
            ProgramValidator::validate_program(program)?;
        }

        let mut changed = false;
        for transformer in &mut self.transformers {
            let name = transformer.name();
            if self.config.is_disabled(name) {
                log::info!("跳过已禁用的转换 {}", name);
                continue;
            }

            let pass_changed = transformer.transform(program)?;
            log::info!("转换 {} 完成, changed = {}", name, pass_changed);

            if self.config.validate {
                transformer.check_postcondition(program)?;
            }
            changed |= pass_changed;
        }

        if self.config.validate {
            ProgramValidator::validate_program(program)?;
        }
        Ok(changed)
    }
}
