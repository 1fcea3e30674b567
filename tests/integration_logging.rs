//! 配置与日志系统集成测试
//!
//! 测试范围:
//! - 配置文件加载、保存和默认值
//! - 优化器配置驱动流水线
//! - 日志初始化后流水线日志写入文件

mod common;

use std::fs;
use std::time::Duration;

use common::data_fixtures::{insert_s, pattern, program_with, rel};
use common::FixedIndexAnalysis;
use ramlog::config::{Config, LogConfig, OptimizerConfig};
use ramlog::ram::operation::IndexScan;
use ramlog::ram::{IndexToFilterTransformer, TransformPipeline};
use ramlog::utils::logging;

/// 测试配置默认值
#[test]
fn test_config_defaults() {
    let config = Config::default();

    assert_eq!(config.log.level, "info");
    assert_eq!(config.log.dir, "logs");
    assert_eq!(config.log.file, "ramlog");
    assert_eq!(config.log.max_file_size, 100 * 1024 * 1024); // 100MB
    assert_eq!(config.log.max_files, 5);
    assert_eq!(config.optimizer, OptimizerConfig::default());
}

/// 测试配置保存后重新加载
#[test]
fn test_config_save_and_load() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let path = dir.path().join("ramlog.toml");

    let config = Config {
        log: LogConfig {
            level: "debug".to_string(),
            dir: "custom_logs".to_string(),
            file: "custom".to_string(),
            max_file_size: 52428800,
            max_files: 3,
        },
        optimizer: OptimizerConfig {
            disabled_transforms: vec!["IndexToFilterTransformer".to_string()],
            validate: false,
        },
    };
    config.save(&path).expect("保存配置失败");

    let content = fs::read_to_string(&path).expect("读取配置文件失败");
    assert!(content.contains("level = \"debug\""));
    assert!(content.contains("max_file_size = 52428800"));

    let loaded = Config::load(&path).expect("加载配置失败");
    assert_eq!(loaded, config);
}

/// 测试配置文件中禁用的转换被流水线跳过
#[test]
fn test_config_file_drives_pipeline() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let path = dir.path().join("ramlog.toml");
    fs::write(
        &path,
        r#"
[optimizer]
disabled_transforms = ["IndexToFilterTransformer"]
"#,
    )
    .expect("写入配置文件失败");

    let config = Config::load(&path).expect("加载配置失败");
    assert!(config.optimizer.validate, "未写出的字段使用默认值");
    assert!(config.optimizer.is_disabled(IndexToFilterTransformer::NAME));

    let analysis = FixedIndexAnalysis::new().discharging("R", &[1]);
    let mut pipeline = TransformPipeline::with_index_passes(&analysis, config.optimizer);
    let mut program = program_with(
        IndexScan::new(rel("R", 2), 0, pattern(&[None, Some(4)], &[None, Some(4)]), insert_s(0), "")
            .into(),
    );

    let original = program.clone();
    assert!(!pipeline.run(&mut program).expect("流水线失败"));
    assert_eq!(program, original);
    assert_eq!(analysis.calls(), 0);
}

/// 测试无效配置被拒绝
#[test]
fn test_invalid_config_rejected() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[log\nlevel = ").expect("写入配置文件失败");

    assert!(Config::load(&path).is_err());
    assert!(Config::load(dir.path().join("missing.toml")).is_err());
}

/// 集成测试：日志初始化后流水线日志写入文件
/// 注意：由于 flexi_logger 使用全局 logger，所有功能在一个测试中验证
#[test]
fn test_pipeline_logs_to_file() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let log_config = LogConfig {
        level: "debug".to_string(),
        dir: dir.path().to_string_lossy().into_owned(),
        file: "pipeline_test".to_string(),
        ..LogConfig::default()
    };

    logging::init(&log_config).expect("日志初始化失败");
    assert!(logging::is_initialized());

    let analysis = FixedIndexAnalysis::new().discharging("R", &[1]);
    let mut pipeline = TransformPipeline::with_index_passes(&analysis, OptimizerConfig::default());
    let mut program = program_with(
        IndexScan::new(rel("R", 2), 0, pattern(&[None, Some(4)], &[None, Some(4)]), insert_s(0), "")
            .into(),
    );
    assert!(pipeline.run(&mut program).expect("流水线失败"));

    logging::shutdown();
    assert!(!logging::is_initialized());
    std::thread::sleep(Duration::from_millis(200));

    let content: String = fs::read_dir(dir.path())
        .expect("读取目录失败")
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name().to_string_lossy().to_string();
            name.starts_with("pipeline_test") && name.ends_with(".log")
        })
        .map(|e| fs::read_to_string(e.path()).unwrap_or_default())
        .collect();

    assert!(content.contains("转换 IndexToFilterTransformer 完成"), "日志应包含流水线摘要");
    assert!(content.contains("RemoveEmptyIndexTransformer"), "日志应包含移除遍历");
}
