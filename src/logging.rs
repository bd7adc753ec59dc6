//! 日志系统配置
//!
//! 仅供命令行程序使用，SDK 本身只通过 `tracing` 宏输出事件，不安装订阅器。
//! 支持控制台输出和文件持久化，文件按大小滚动，启动时清理过期日志。

use crate::config::LogConfig;
use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// 日志文件名前缀
const LOG_FILE_PREFIX: &str = "mediahub.";
const TIMER_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// 按大小滚动的日志文件写入器
///
/// 文件名格式：mediahub.YYYY-MM-DD-HHMMSS.log、mediahub.YYYY-MM-DD-HHMMSS_N.log
struct RotatingFile {
    /// 启动时间戳（同一次运行的所有分卷共用）
    start_timestamp: String,
    /// 日志目录
    log_dir: PathBuf,
    /// 当前打开的文件
    file: Option<File>,
    /// 分卷序号，0 表示首个文件
    index: u32,
    /// 单个文件大小上限（字节）
    max_file_size: u64,
    /// 当前文件已写入字节数
    written: u64,
}

impl RotatingFile {
    fn open(log_dir: PathBuf, max_file_size: u64) -> io::Result<Self> {
        let mut rotating = Self {
            start_timestamp: Local::now().format("%Y-%m-%d-%H%M%S").to_string(),
            log_dir,
            file: None,
            index: 0,
            max_file_size,
            written: 0,
        };
        rotating.open_current()?;
        Ok(rotating)
    }

    /// 当前分卷的文件路径
    fn file_path(&self) -> PathBuf {
        let name = if self.index == 0 {
            format!("{}{}.log", LOG_FILE_PREFIX, self.start_timestamp)
        } else {
            format!("{}{}_{}.log", LOG_FILE_PREFIX, self.start_timestamp, self.index)
        };
        self.log_dir.join(name)
    }

    /// 打开当前分卷（追加模式），并重置计数
    fn open_current(&mut self) -> io::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.file_path())?;
        self.file = Some(file);
        self.written = 0;
        Ok(())
    }

    fn write_bytes(&mut self, buf: &[u8]) -> io::Result<usize> {
        // 单条记录超过上限时仍写入当前文件，避免产生空文件
        if self.written > 0 && self.written + buf.len() as u64 > self.max_file_size {
            if let Some(mut file) = self.file.take() {
                file.flush()?;
            }
            // 切换到下一个分卷
            self.index += 1;
            self.open_current()?;
        }

        match self.file.as_mut() {
            Some(file) => {
                let n = file.write(buf)?;
                self.written += n as u64;
                Ok(n)
            }
            None => Err(io::Error::new(io::ErrorKind::Other, "日志文件未打开")),
        }
    }

    fn flush_file(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// 线程安全的日志文件写入器
#[derive(Clone)]
pub struct LogFileWriter {
    /// 多个 clone 共享同一个滚动文件
    inner: Arc<Mutex<RotatingFile>>,
}

impl LogFileWriter {
    /// 在 log_dir 下创建首个日志文件
    pub fn new(log_dir: PathBuf, max_file_size: u64) -> io::Result<Self> {
        Ok(Self {
            inner: Arc::new(Mutex::new(RotatingFile::open(log_dir, max_file_size)?)),
        })
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, RotatingFile>> {
        self.inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "日志写入器锁已中毒"))
    }
}

impl Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock()?.write_bytes(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock()?.flush_file()
    }
}

/// 日志系统守卫
/// 必须保持存活，否则日志写入线程会终止
pub struct LogGuard {
    /// 文件输出的后台写入线程守卫（未启用文件日志时为 None）
    _file_guard: Option<WorkerGuard>,
}

/// 初始化日志系统
///
/// RUST_LOG 环境变量优先于配置中的级别
pub fn init_logging(config: &LogConfig) -> LogGuard {
    // 1. 日志级别过滤
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    // 2. 控制台输出到 stderr，stdout 留给命令输出
    let console_layer = fmt::layer()
        .with_target(true)
        .with_timer(ChronoLocal::new(TIMER_FORMAT.to_string()))
        .with_writer(io::stderr);

    // 3. 文件输出（可选），目录创建失败时退化为仅控制台
    let file_writer = if config.enabled {
        fs::create_dir_all(&config.log_dir)
            .and_then(|_| LogFileWriter::new(config.log_dir.clone(), config.max_file_size))
            .map_err(|e| eprintln!("创建日志文件失败: {:?}, 错误: {}，仅使用控制台输出", config.log_dir, e))
            .ok()
    } else {
        None
    };

    let Some(writer) = file_writer else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .init();
        return LogGuard { _file_guard: None };
    };

    // 4. 文件写入放到后台线程，避免阻塞业务
    let (non_blocking, file_guard) = tracing_appender::non_blocking(writer);
    let file_layer = fmt::layer()
        .with_target(true)
        .with_timer(ChronoLocal::new(TIMER_FORMAT.to_string()))
        .with_ansi(false)
        .with_writer(non_blocking);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!(
        "日志系统初始化完成: 目录={:?}, 保留天数={}, 级别={}",
        config.log_dir, config.retention_days, config.level
    );

    // 5. 启动时清理过期日志
    let removed = cleanup_old_logs(&config.log_dir, config.retention_days);
    if removed > 0 {
        info!("已清理 {} 个过期日志文件", removed);
    }

    LogGuard {
        _file_guard: Some(file_guard),
    }
}

/// 清理过期日志文件，返回删除数量
fn cleanup_old_logs(log_dir: &Path, retention_days: u32) -> usize {
    let today = Local::now().date_naive();
    let retention = chrono::Duration::days(retention_days as i64);

    let entries = match fs::read_dir(log_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("读取日志目录失败: {:?}, 错误: {}", log_dir, e);
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        // 只处理本程序生成的日志文件
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        let Some(date) = log_file_date(name) else {
            continue;
        };

        if today.signed_duration_since(date) > retention {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!("删除过期日志文件失败: {:?}, 错误: {}", path, e),
            }
        }
    }
    removed
}

/// 从日志文件名中解析日期
///
/// mediahub.2024-05-01-120000_2.log -> 2024-05-01
fn log_file_date(filename: &str) -> Option<chrono::NaiveDate> {
    let stem = filename
        .strip_prefix(LOG_FILE_PREFIX)?
        .strip_suffix(".log")?;
    let date = stem.get(..10)?;
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_file_date() {
        let date = log_file_date("mediahub.2024-05-01-120000.log").unwrap();
        assert_eq!(date.to_string(), "2024-05-01");
        assert!(log_file_date("mediahub.2024-05-01-120000_3.log").is_some());
        assert!(log_file_date("other.2024-05-01.log").is_none());
        assert!(log_file_date("mediahub.garbage.log").is_none());
    }

    #[test]
    fn test_rotating_file_rolls_over() {
        let dir = TempDir::new().unwrap();
        let mut writer = LogFileWriter::new(dir.path().to_path_buf(), 16).unwrap();

        writer.write_all(b"0123456789\n").unwrap();
        writer.write_all(b"0123456789\n").unwrap();
        writer.flush().unwrap();

        let count = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_cleanup_old_logs() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("mediahub.2000-01-01-000000.log"), "old").unwrap();
        fs::write(dir.path().join("unrelated.txt"), "keep").unwrap();
        let fresh = format!("mediahub.{}.log", Local::now().format("%Y-%m-%d-%H%M%S"));
        fs::write(dir.path().join(&fresh), "new").unwrap();

        assert_eq!(cleanup_old_logs(dir.path(), 7), 1);
        assert!(dir.path().join(&fresh).exists());
        assert!(dir.path().join("unrelated.txt").exists());
    }
}
