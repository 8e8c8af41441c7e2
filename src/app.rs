//! 应用程序初始化和启动
//!
//! 命令行驱动的无界面页面，启动流程：
//! - 日志系统初始化
//! - 配置加载（环境变量可覆盖后端地址）
//! - 按命令行给出的路径构建页面
//! - 启动轮询
//! - 逐行读取标准输入中的页面事件并分发

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::browser::headless::HeadlessBrowser;
use crate::commands::{self, UiEvent};
use crate::domains::SystemDomain;
use crate::event_bus::EventBus;
use crate::logger;
use crate::models::AppConfig;
use crate::settings::SettingsManager;
use crate::AppState;

const DEFAULT_PATH: &str = "/home/";
const DEFAULT_ORIGIN: &str = "http://localhost";
const BASE_URL_ENV: &str = "FARM_ASSIST_BASE_URL";
const CSRF_TOKEN_ENV: &str = "FARM_ASSIST_CSRF_TOKEN";

/// 应用数据目录
pub fn default_data_dir() -> PathBuf {
    if cfg!(target_os = "macos") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join("Library/Application Support/farm-assist")
    } else if cfg!(target_os = "windows") {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join("farm-assist")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".local/share/farm-assist")
    }
}

/// 应用程序入口点
///
/// 1. 日志系统初始化
/// 2. 创建运行时并进入事件循环
pub fn run() -> Result<()> {
    logger::init(&logger::default_log_dir()).context("日志系统初始化失败")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("创建 tokio 运行时失败")?;

    runtime.block_on(serve())
}

async fn serve() -> Result<()> {
    info!("初始化农业助手页面...");

    let data_dir = default_data_dir();
    let settings = Arc::new(SettingsManager::new(data_dir.join("config.json")).await?);

    if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
        info!("使用环境变量中的后端地址: {}", base_url);
        settings
            .update(AppConfig {
                base_url: Some(base_url),
                ..Default::default()
            })
            .await?;
    }
    let config = settings.get().await;
    info!("后端地址: {}", config.base_url);

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_PATH.to_string());
    let csrf_token = std::env::var(CSRF_TOKEN_ENV)
        .unwrap_or_else(|_| uuid::Uuid::new_v4().simple().to_string());

    let browser = HeadlessBrowser::new(DEFAULT_ORIGIN, &path);
    let state = AppState::build(
        &config,
        browser.browser(),
        &csrf_token,
        SystemDomain::new(settings),
    )?;

    if !state.page_domain.get_speech().settings().health_check().await {
        anyhow::bail!("语音设置 Actor 未能启动");
    }

    spawn_event_logger(state.event_bus.clone());
    state.start_polling().await;
    info!(
        "页面 {} 已就绪，轮询: {:?}",
        path,
        state.data_domain.polling_names()
    );

    let mut stdout = tokio::io::stdout();
    let result = drive(&state, BufReader::new(tokio::io::stdin()), &mut stdout).await;

    info!("停止轮询");
    state.data_domain.stop_polling();
    result
}

/// 逐行读取页面事件并按到达顺序分发，每个事件输出一行处理结果
///
/// 输入结束后等待后台请求和聊天回复完成再返回
pub async fn drive<R, W>(state: &AppState, input: R, output: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut stale_reported = false;
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event: UiEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                warn!("无法解析页面事件 {:?}: {}", line, e);
                continue;
            }
        };

        let outcome = commands::dispatch(state, event.clone()).await;
        let mut json = serde_json::to_string(&serde_json::json!({
            "event": event,
            "outcome": outcome,
        }))?;
        json.push('\n');
        output.write_all(json.as_bytes()).await?;
        output.flush().await?;

        report_stale_page(state, &mut stale_reported);
    }

    let pending = state.background.pending();
    if pending > 0 {
        info!("输入结束，等待 {} 个后台任务", pending);
    }
    state.settle().await;
    report_stale_page(state, &mut stale_reported);
    Ok(())
}

/// 整页跳转后只提示一次：之后的事件仍作用在旧文档上
fn report_stale_page(state: &AppState, reported: &mut bool) {
    if *reported || !state.page_domain.is_stale() {
        return;
    }
    *reported = true;
    warn!(
        "页面已跳转到 {}，{} 的文档已过期",
        state.page_domain.get_router().current_path(),
        state.page_domain.path()
    );
}

/// 把页面事件写入日志
fn spawn_event_logger(event_bus: Arc<EventBus>) {
    let mut receiver = event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => debug!("页面事件: {:?}", event),
                Err(RecvError::Lagged(skipped)) => warn!("事件日志落后，跳过 {} 条", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_data_dir() {
        let dir = default_data_dir();
        assert!(dir.ends_with("farm-assist"));
    }
}
