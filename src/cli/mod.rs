mod commands;
mod display;
mod select;

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufRead, BufReader};

use crate::bridge::{self, AdbBridge, Bridge};
use crate::config::{self, Config};
use crate::error::Error;
use crate::report::{self, SystemClipboard};
use crate::scanner::{ScanOutcome, URL_PATTERNS};

pub use commands::Cli;
pub use select::select_device;

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn run(cli: Cli) -> Result<()> {
    let loaded = config::load(cli.config.as_deref());
    let mut config = loaded.config;
    cli.apply(&mut config);

    init_tracing(config.debug);
    for w in &loaded.warnings {
        tracing::warn!("{}", w);
    }
    if let Some(path) = &loaded.source {
        tracing::debug!(path = %path.display(), "loaded config");
    }
    if let Ok(json) = serde_json::to_string(&config) {
        tracing::debug!(config = %json, "effective config");
    }

    let rt = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    rt.block_on(run_async(&cli, &config))
}

/// RUST_LOG 优先；否则 debug 打开本 crate 的 debug 日志，默认只看警告
fn init_tracing(debug: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_env("RUST_LOG")
    } else if debug {
        tracing_subscriber::EnvFilter::new("gacha_url_finder=debug")
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

async fn run_async(cli: &Cli, config: &Config) -> Result<()> {
    let mut input = BufReader::new(tokio::io::stdin());
    let mut out = std::io::stdout();
    // 剪贴板需存活到 pause 结束
    let mut clipboard = SystemClipboard::default();
    let bridge = AdbBridge::new(&config.adb_path);

    display::print_checking(&mut out)?;
    match find_url(&bridge, config, &mut input, &mut out).await {
        Ok(ScanOutcome::Found(m)) => {
            report::report_match(&mut out, &m, config.auto_copy, &mut clipboard)?;
        }
        Ok(ScanOutcome::NotFound) => display::print_not_found(&mut out)?,
        Err(e) => display::print_error(&mut out, &e)?,
    }

    if !cli.no_wait {
        report::pause(&mut input, &mut out)
            .await
            .context("Failed to read from stdin")?;
    }
    Ok(())
}

// ==================== 主流程 ====================

/// 发现设备 → 选择 → 监听 logcat，返回首个命中
pub async fn find_url<R>(
    bridge: &dyn Bridge,
    config: &Config,
    input: &mut R,
    out: &mut impl Write,
) -> Result<ScanOutcome, Error>
where
    R: AsyncBufRead + Unpin,
{
    let devices = bridge::discover(bridge, config, out).await?;
    let device = select_device(&devices, config.debug, input, out).await?;
    tracing::debug!(id = %device.id, name = %device.display_name, "selected device");

    display::print_listening(out, &device)
        .and_then(|()| out.flush())
        .map_err(Error::Console)?;

    let session = bridge.open_logcat(&device.id).await?;
    session.scan(&URL_PATTERNS).await
}
