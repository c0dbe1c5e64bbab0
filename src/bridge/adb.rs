use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;

use super::Bridge;
use crate::error::Error;
use crate::scanner::LogcatSession;

const DEVICES_HEADER: &str = "List of devices attached";

// ==================== adb devices 解析 ====================

/// 提取状态为 `device` 的设备 id，保持输出顺序
///
/// 跳过表头（及其之前的 daemon 提示）；没有表头时跳过第一行。
pub fn parse_devices(output: &str) -> Vec<String> {
    let lines: Vec<&str> = output.lines().collect();
    let start = lines
        .iter()
        .position(|l| l.trim_start().starts_with(DEVICES_HEADER))
        .map(|i| i + 1)
        .unwrap_or(1);

    lines
        .iter()
        .skip(start)
        .filter_map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('*') {
                return None;
            }
            let mut parts = trimmed.split_whitespace();
            let id = parts.next()?;
            (parts.next() == Some("device")).then(|| id.to_string())
        })
        .collect()
}

// ==================== AdbBridge ====================

/// 通过 adb 可执行文件实现 Bridge
pub struct AdbBridge {
    program: PathBuf,
    envs: Vec<(OsString, OsString)>,
}

impl AdbBridge {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            envs: vec![],
        }
    }

    /// 附加到每次调用的环境变量（如 ADB_SERVER_SOCKET）
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null());
        cmd
    }

    fn describe(&self, args: &[&str]) -> String {
        format!("{} {}", self.program.display(), args.join(" "))
    }

    /// 运行到结束并取 stdout；非零退出码视为失败
    async fn output(&self, args: &[&str]) -> Result<String, Error> {
        let output = self
            .command(args)
            .output()
            .await
            .map_err(|source| Error::ToolSpawn {
                command: self.describe(args),
                source,
            })?;

        if !output.status.success() {
            return Err(Error::ToolFailed {
                command: self.describe(args),
                status: output.status,
            });
        }

        String::from_utf8(output.stdout).map_err(|_| Error::ToolOutput {
            command: self.describe(args),
        })
    }
}

#[async_trait::async_trait(?Send)]
impl Bridge for AdbBridge {
    async fn list_devices(&self) -> Result<Vec<String>, Error> {
        let stdout = self.output(&["devices"]).await?;
        let ids = parse_devices(&stdout);
        tracing::debug!(?ids, "adb devices");
        Ok(ids)
    }

    async fn device_model(&self, id: &str) -> Option<String> {
        match self.output(&["-s", id, "shell", "getprop", "ro.product.model"]).await {
            Ok(out) => {
                let model = out.trim();
                (!model.is_empty()).then(|| model.to_string())
            }
            Err(e) => {
                tracing::debug!(id, error = %e, "getprop ro.product.model failed");
                None
            }
        }
    }

    async fn connect(&self, addr: &str) -> Result<(), Error> {
        let output = self
            .command(&["connect", addr])
            .output()
            .await
            .map_err(|e| Error::Connect {
                addr: addr.to_string(),
                output: e.to_string(),
            })?;
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        tracing::debug!(addr, output = %stdout.trim(), "adb connect");

        // adb connect 失败时退出码也可能是 0，只认输出
        if output.status.success() && stdout.contains("connected to") {
            Ok(())
        } else {
            Err(Error::Connect {
                addr: addr.to_string(),
                output: stdout,
            })
        }
    }

    async fn open_logcat(&self, id: &str) -> Result<LogcatSession, Error> {
        LogcatSession::spawn(self.command(&["-s", id, "shell", "logcat"]))
    }
}
