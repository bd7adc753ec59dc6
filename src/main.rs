use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use mediahub_sdk::{
    config::DEFAULT_CONFIG_PATH, logging, ApiClient, BarcodeOptions, BinaryPayload,
    DnsRecordType, QrOptions, SdkConfig, SdkError, StorageClient, WaitOptions, YoutubeOptions,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// mediahub - MediaHub API 命令行客户端
#[derive(Parser, Debug)]
#[command(name = "mediahub", version, about = "MediaHub API 命令行客户端")]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 账户信息与用量统计
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// 查询或等待后台任务
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// 提交媒体下载
    Download {
        #[command(subcommand)]
        action: DownloadAction,
    },

    /// 实用工具（DNS、SSL、二维码等）
    Tools {
        #[command(subcommand)]
        action: ToolsAction,
    },

    /// 图片处理
    Image {
        #[command(subcommand)]
        action: ImageAction,
    },

    /// 存储容器操作
    Storage {
        #[command(subcommand)]
        action: StorageAction,
    },
}

#[derive(Subcommand, Debug)]
enum AccountAction {
    /// 查看账户信息
    Info,
    /// 查看用量统计
    Stats {
        /// 统计周期（day、week、month）
        #[arg(short, long)]
        period: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum TaskAction {
    /// 查询任务当前状态
    Get {
        /// 任务 ID
        id: String,
    },
    /// 轮询直到任务完成或失败
    Wait {
        /// 任务 ID
        id: String,
        /// 轮询间隔（毫秒），默认取配置
        #[arg(long)]
        interval: Option<u64>,
        /// 最长等待时间（毫秒），默认取配置
        #[arg(long)]
        timeout: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
enum DownloadAction {
    /// 搜索 YouTube
    Search {
        /// 搜索关键词
        query: String,
        /// 返回条数上限
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// 查看 YouTube 视频详情
    Info {
        /// 视频链接
        url: String,
    },
    /// 下载 YouTube 视频
    Youtube {
        /// 视频链接
        url: String,
        /// 输出格式（默认 mp4）
        #[arg(short, long)]
        format: Option<String>,
        /// 画质，如 720p
        #[arg(short, long)]
        quality: Option<String>,
        /// 提交后等待下载任务结束
        #[arg(short, long)]
        wait: bool,
    },
    /// 下载 TikTok 视频
    Tiktok {
        /// 视频链接
        url: String,
    },
    /// 通用平台下载（按链接自动识别平台）
    Platform {
        /// 视频链接
        url: String,
    },
}

#[derive(Subcommand, Debug)]
enum ToolsAction {
    /// DNS 查询
    Dns {
        /// 域名
        domain: String,
        /// 记录类型（A、AAAA、CNAME、MX、NS、TXT、SOA）
        #[arg(short = 't', long = "type")]
        record_type: Option<DnsRecordType>,
    },
    /// 查看 SSL 证书
    Ssl {
        /// 域名
        domain: String,
    },
    /// 网站综合检测
    WebCheck {
        /// 网站地址
        url: String,
    },
    /// 提取网页元数据
    Metadata {
        /// 网页地址
        url: String,
    },
    /// 生成二维码图片
    Qr {
        /// 编码内容
        text: String,
        /// 输出文件
        #[arg(short, long)]
        output: PathBuf,
        /// 边长（像素）
        #[arg(short, long)]
        size: Option<u32>,
    },
    /// 生成条形码图片
    Barcode {
        /// 编码内容
        text: String,
        /// 输出文件
        #[arg(short, long)]
        output: PathBuf,
        /// 码制（默认 code128）
        #[arg(short = 't', long = "type")]
        symbology: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ImageAction {
    /// 调整图片尺寸
    Resize {
        /// 图片 URL 或本地路径
        source: String,
        /// 目标宽度
        #[arg(long)]
        width: Option<u32>,
        /// 目标高度
        #[arg(long)]
        height: Option<u32>,
        /// 输出文件
        #[arg(short, long)]
        output: PathBuf,
    },
    /// 去除图片背景
    RemoveBg {
        /// 图片 URL 或本地路径
        source: String,
        /// 输出文件
        #[arg(short, long)]
        output: PathBuf,
    },
    /// 多张图片合成 PDF
    ToPdf {
        /// 图片 URL 或本地路径（按顺序成页）
        #[arg(required = true)]
        sources: Vec<String>,
        /// 输出文件
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum StorageAction {
    /// 列出远端目录
    List {
        /// 远端目录
        #[arg(default_value = "/")]
        path: String,
    },
    /// 上传本地文件到远端目录
    Upload {
        /// 本地文件路径
        local: PathBuf,
        /// 远端目录
        remote_dir: String,
        /// 远端文件名，默认沿用本地文件名
        #[arg(short, long)]
        name: Option<String>,
    },
    /// 下载远端文件
    Download {
        /// 远端文件路径
        path: String,
        /// 输出文件
        #[arg(short, long)]
        output: PathBuf,
    },
    /// 创建远端目录
    Mkdir {
        /// 远端目录
        path: String,
    },
    /// 删除远端文件或目录
    Rm {
        /// 远端路径
        path: String,
    },
    /// 重命名或移动远端条目
    Mv {
        /// 原路径
        from: String,
        /// 新路径
        to: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 加载配置文件，缺失时使用默认值；环境变量优先于文件
    let mut config = SdkConfig::load_or_default(&cli.config).await;
    config.apply_env_overrides();

    // 日志 guard 必须存活到进程结束
    let _log_guard = logging::init_logging(&config.log);

    info!("mediahub v{} 启动", env!("CARGO_PKG_VERSION"));

    // 按命令组分发
    match cli.command {
        Command::Account { action } => run_account(&config, action).await,
        Command::Task { action } => run_task(&config, action).await,
        Command::Download { action } => run_download(&config, action).await,
        Command::Tools { action } => run_tools(&config, action).await,
        Command::Image { action } => run_image(&config, action).await,
        Command::Storage { action } => run_storage(&config, action).await,
    }
}

/// 构造主 API 客户端
fn api_client(config: &SdkConfig) -> anyhow::Result<ApiClient> {
    ApiClient::new(config.api.clone()).context("创建 API 客户端失败")
}

/// 构造存储客户端，未配置 [storage] 时报错
fn storage_client(config: &SdkConfig) -> anyhow::Result<StorageClient> {
    let Some(storage) = config.storage.clone() else {
        bail!("未配置存储容器，请在配置文件 [storage] 段或 MEDIAHUB_STORAGE_* 环境变量中设置");
    };
    StorageClient::new(storage).context("创建存储客户端失败")
}

/// JSON 结果格式化输出到 stdout
fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// 写入输出文件，必要时创建父目录
async fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("写入文件失败: {:?}", path))?;
    info!("已写入 {:?} ({} 字节)", path, bytes.len());
    Ok(())
}

/// 写入二进制响应；非成功状态码的响应不落盘
async fn write_payload(path: &Path, payload: &BinaryPayload) -> anyhow::Result<()> {
    if !payload.is_success() {
        bail!(
            "服务端返回 {} ({})，未写入文件",
            payload.status,
            payload.content_type
        );
    }
    write_output(path, &payload.bytes).await
}

/// account 命令组
async fn run_account(config: &SdkConfig, action: AccountAction) -> anyhow::Result<()> {
    let client = api_client(config)?;
    let account = client.account();
    let envelope = match action {
        AccountAction::Info => account.info().await?,
        AccountAction::Stats { period } => account.stats(period.as_deref()).await?,
    };
    print_json(&envelope)
}

/// task 命令组
async fn run_task(config: &SdkConfig, action: TaskAction) -> anyhow::Result<()> {
    let client = api_client(config)?;
    match action {
        TaskAction::Get { id } => print_json(&client.task().get(&id).await?),
        TaskAction::Wait {
            id,
            interval,
            timeout,
        } => {
            // 命令行参数覆盖配置中的轮询默认值
            let mut options = WaitOptions::from_config(client.config());
            if let Some(ms) = interval {
                options = options.with_interval(Duration::from_millis(ms));
            }
            if let Some(ms) = timeout {
                options = options.with_timeout(Duration::from_millis(ms));
            }
            wait_and_print(&client, &id, options).await
        }
    }
}

/// 等待任务，Ctrl-C 时取消
async fn wait_and_print(client: &ApiClient, id: &str, options: WaitOptions) -> anyhow::Result<()> {
    // Ctrl-C 监听任务只负责触发取消令牌
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("收到中断信号，停止等待");
            on_signal.cancel();
        }
    });

    let result = client.task().wait_for_with_cancel(id, options, &cancel).await;
    // 等待结束后不再需要监听信号
    signal_task.abort();

    match result {
        Ok(state) => print_json(&state),
        Err(SdkError::Cancelled { id }) => bail!("已取消等待任务 {}", id),
        Err(e) => Err(e.into()),
    }
}

/// download 命令组
async fn run_download(config: &SdkConfig, action: DownloadAction) -> anyhow::Result<()> {
    let client = api_client(config)?;
    let download = client.download();
    match action {
        DownloadAction::Search { query, limit } => {
            print_json(&download.youtube_search(&query, limit).await?)
        }
        DownloadAction::Info { url } => print_json(&download.youtube_info(&url).await?),
        DownloadAction::Youtube {
            url,
            format,
            quality,
            wait,
        } => {
            let envelope = download
                .youtube(&url, YoutubeOptions { format, quality })
                .await?;
            // 服务端以 taskId（或 id）返回后台任务
            let task_id = envelope
                .data
                .as_ref()
                .and_then(|d| d.get("taskId").or_else(|| d.get("id")))
                .and_then(|v| v.as_str())
                .map(str::to_string);

            match task_id {
                Some(id) if wait => {
                    info!("下载任务已提交: {}", id);
                    wait_and_print(&client, &id, WaitOptions::from_config(client.config())).await
                }
                _ => print_json(&envelope),
            }
        }
        DownloadAction::Tiktok { url } => print_json(&download.tiktok(&url).await?),
        DownloadAction::Platform { url } => print_json(&download.platform(&url).await?),
    }
}

/// tools 命令组，二维码/条形码写入文件
async fn run_tools(config: &SdkConfig, action: ToolsAction) -> anyhow::Result<()> {
    let client = api_client(config)?;
    let tools = client.tools();
    match action {
        ToolsAction::Dns {
            domain,
            record_type,
        } => print_json(&tools.dns(&domain, record_type).await?),
        ToolsAction::Ssl { domain } => print_json(&tools.ssl(&domain).await?),
        ToolsAction::WebCheck { url } => print_json(&tools.web_check(&url).await?),
        ToolsAction::Metadata { url } => print_json(&tools.metadata(&url).await?),
        ToolsAction::Qr { text, output, size } => {
            let payload = tools
                .qr_code(&text, QrOptions { size, format: None })
                .await?;
            write_payload(&output, &payload).await
        }
        ToolsAction::Barcode {
            text,
            output,
            symbology,
        } => {
            let payload = tools
                .barcode(
                    &text,
                    BarcodeOptions {
                        symbology,
                        format: None,
                    },
                )
                .await?;
            write_payload(&output, &payload).await
        }
    }
}

/// image 命令组，图片结果写入文件，JSON 结果输出到 stdout
async fn run_image(config: &SdkConfig, action: ImageAction) -> anyhow::Result<()> {
    let client = api_client(config)?;
    let image = client.image();
    let (response, output) = match action {
        ImageAction::Resize {
            source,
            width,
            height,
            output,
        } => {
            if width.is_none() && height.is_none() {
                bail!("至少需要指定 --width 或 --height");
            }
            (image.resize(source, width, height, None).await?, output)
        }
        ImageAction::RemoveBg { source, output } => {
            (image.remove_background(source).await?, output)
        }
        ImageAction::ToPdf { sources, output } => {
            let payload = image.to_pdf(sources).await?;
            return write_payload(&output, &payload).await;
        }
    };

    match response {
        mediahub_sdk::ApiResponse::Binary(payload) => write_payload(&output, &payload).await,
        mediahub_sdk::ApiResponse::Json(value) => print_json(&value),
    }
}

/// storage 命令组
async fn run_storage(config: &SdkConfig, action: StorageAction) -> anyhow::Result<()> {
    let storage = storage_client(config)?;
    match action {
        StorageAction::List { path } => print_json(&storage.list(&path).await?),
        StorageAction::Upload {
            local,
            remote_dir,
            name,
        } => print_json(&storage.upload(local, &remote_dir, name.as_deref()).await?),
        StorageAction::Download { path, output } => {
            let bytes = storage.download(&path).await?;
            write_output(&output, &bytes).await
        }
        StorageAction::Mkdir { path } => print_json(&storage.create_folder(&path).await?),
        StorageAction::Rm { path } => print_json(&storage.delete(&path).await?),
        StorageAction::Mv { from, to } => print_json(&storage.rename(&from, &to).await?),
    }
}
