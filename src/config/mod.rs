use crate::core::error::{RamError, RamResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub log: LogConfig,
    pub optimizer: OptimizerConfig,
}

/// 日志配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub dir: String,
    pub file: String,
    pub max_file_size: u64,
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "logs".to_string(),
            file: "ramlog".to_string(),
            max_file_size: 100 * 1024 * 1024, // 100MB
            max_files: 5,
        }
    }
}

/// 优化流水线配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct OptimizerConfig {
    /// 按名称禁用的转换
    pub disabled_transforms: Vec<String>,
    /// 流水线前后运行程序校验
    pub validate: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            disabled_transforms: Vec::new(),
            validate: true,
        }
    }
}

impl OptimizerConfig {
    pub fn is_disabled(&self, transformer: &str) -> bool {
        self.disabled_transforms.iter().any(|name| name == transformer)
    }

    pub fn disable(mut self, transformer: impl Into<String>) -> Self {
        self.disabled_transforms.push(transformer.into());
        self
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> RamResult<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.log.dir = Config::resolve_log_dir(&config.log.dir)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> RamResult<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> RamResult<()> {
        if self.log.max_file_size == 0 {
            return Err(RamError::config("log.max_file_size 必须大于 0"));
        }
        if self.log.file.trim().is_empty() {
            return Err(RamError::config("log.file 不能为空"));
        }
        Ok(())
    }

    fn resolve_log_dir(log_dir: &str) -> RamResult<String> {
        let Some(relative_path) = log_dir.strip_prefix('~') else {
            return Ok(log_dir.to_string());
        };

        let home_dir: PathBuf = env::var_os("HOME")
            .or_else(|| env::var_os("USERPROFILE"))
            .map(PathBuf::from)
            .ok_or_else(|| RamError::config("无法获取用户主目录"))?;
        let relative_path = relative_path.trim_start_matches(['/', '\\']);
        Ok(home_dir.join(relative_path).to_string_lossy().into_owned())
    }
}
