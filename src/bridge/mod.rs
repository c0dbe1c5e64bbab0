mod adb;

use std::io::Write;

pub use adb::{parse_devices, AdbBridge};

use crate::config::Config;
use crate::error::Error;
use crate::scanner::LogcatSession;

pub const UNKNOWN_DEVICE: &str = "Unknown Device";

// ==================== 设备 ====================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Device {
    /// adb 分配的序列号或 ip:port
    pub id: String,
    pub display_name: String,
}

// ==================== 设备桥抽象 ====================

/// adb 的四种调用；测试用内存实现替换
#[async_trait::async_trait(?Send)]
pub trait Bridge {
    /// 已授权、就绪的设备 id
    async fn list_devices(&self) -> Result<Vec<String>, Error>;

    /// 设备型号，失败或为空返回 None
    async fn device_model(&self, id: &str) -> Option<String>;

    async fn connect(&self, addr: &str) -> Result<(), Error>;

    async fn open_logcat(&self, id: &str) -> Result<LogcatSession, Error>;
}

// ==================== 发现流程 ====================

/// 列出设备；为空且开启 auto_connect 时连接一次再重新列出
pub async fn discover(
    bridge: &dyn Bridge,
    config: &Config,
    out: &mut impl Write,
) -> Result<Vec<Device>, Error> {
    let mut listing = bridge.list_devices().await;
    if let Err(e) = &listing {
        tracing::debug!(error = %e, "device listing failed");
    }

    let empty = listing.as_ref().map_or(true, |ids| ids.is_empty());
    if empty && config.auto_connect {
        let addr = config.auto_connect_addr();
        writeln!(out, "未检测到设备，尝试连接到 {}...", addr).map_err(Error::Console)?;
        bridge.connect(&addr).await?;
        listing = bridge.list_devices().await;
    }

    let ids = listing?;
    if ids.is_empty() {
        return Err(Error::NoDevice);
    }

    let mut devices = Vec::with_capacity(ids.len());
    for id in ids {
        let display_name = if config.query_model {
            bridge
                .device_model(&id)
                .await
                .unwrap_or_else(|| UNKNOWN_DEVICE.to_string())
        } else {
            id.clone()
        };
        devices.push(Device { id, display_name });
    }
    Ok(devices)
}
