//! 统一错误处理 for RamLog
//!
//! ## 设计理念
//!
//! 1. **一个错误枚举**：IR 构建、校验、转换、翻译和配置共用 `RamError`
//! 2. **编译期穷尽**：带索引操作的变体集合是封闭枚举，转换中不存在
//!    "未知子类" 的运行时失败路径
//! 3. **统一接口**：`RamResult<T>` 提供统一的返回类型，简化错误传播

use thiserror::Error;

/// 统一的错误类型
#[derive(Error, Debug)]
pub enum RamError {
    #[error("校验错误: {0}")]
    Validation(String),

    #[error("转换 {transformer} 失败: {message}")]
    Transform {
        transformer: &'static str,
        message: String,
    },

    #[error("翻译错误: {0}")]
    Translation(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
}

impl RamError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn transform(transformer: &'static str, msg: impl Into<String>) -> Self {
        Self::Transform {
            transformer,
            message: msg.into(),
        }
    }

    pub fn translation(msg: impl Into<String>) -> Self {
        Self::Translation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<serde_json::Error> for RamError {
    fn from(e: serde_json::Error) -> Self {
        RamError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for RamError {
    fn from(e: toml::de::Error) -> Self {
        RamError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for RamError {
    fn from(e: toml::ser::Error) -> Self {
        RamError::Config(e.to_string())
    }
}

/// 统一的结果类型
pub type RamResult<T> = Result<T, RamError>;
