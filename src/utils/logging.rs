// 日志工具模块
//
// 封装 flexi_logger 的初始化和关闭，库代码本身只通过 log 宏输出

use crate::config::LogConfig;
use crate::core::error::{RamError, RamResult};
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use parking_lot::{const_mutex, Mutex};

/// 全局日志句柄，用于程序退出时 flush
static LOGGER_HANDLE: Mutex<Option<LoggerHandle>> = const_mutex(None);

/// 初始化日志系统
///
/// 日志写入 `dir/file*.log`，按大小滚动，异步写入。
/// 已初始化时直接返回 `Ok(())`。
///
/// # Examples
/// ```no_run
/// use ramlog::config::Config;
/// use ramlog::utils::logging;
///
/// let config = Config::default();
/// logging::init(&config.log).expect("日志初始化失败");
/// ```
pub fn init(config: &LogConfig) -> RamResult<()> {
    let mut guard = LOGGER_HANDLE.lock();
    if guard.is_some() {
        return Ok(());
    }

    let handle = Logger::try_with_str(&config.level)
        .map_err(|e| RamError::config(format!("无效的日志级别 {}: {}", config.level, e)))?
        .log_to_file(
            FileSpec::default()
                .basename(&config.file)
                .directory(&config.dir),
        )
        .rotate(
            Criterion::Size(config.max_file_size),
            Naming::Numbers,
            Cleanup::KeepLogFiles(config.max_files),
        )
        .write_mode(WriteMode::Async)
        .append()
        .start()
        .map_err(|e| RamError::config(format!("日志系统启动失败: {}", e)))?;

    *guard = Some(handle);
    log::info!("日志系统初始化完成: {}/{}", config.dir, config.file);
    Ok(())
}

/// 刷新并关闭日志系统
///
/// 在程序退出前调用，确保所有异步日志都已写入文件
pub fn shutdown() {
    if let Some(handle) = LOGGER_HANDLE.lock().take() {
        handle.flush();
        handle.shutdown();
    }
}

/// 检查日志系统是否已初始化
pub fn is_initialized() -> bool {
    LOGGER_HANDLE.lock().is_some()
}
