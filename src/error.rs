use std::process::ExitStatus;

/// 流水线各阶段的错误
///
/// 所有错误在入口处都是终止性的：打印后等待回车退出。
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // -- adb 调用 --
    #[error("无法执行 {command}: {source}")]
    ToolSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} 执行失败 ({status})")]
    ToolFailed { command: String, status: ExitStatus },

    #[error("{command} 输出无法解析")]
    ToolOutput { command: String },

    // -- 设备 --
    #[error("无法连接到设备 {addr}")]
    Connect { addr: String, output: String },

    #[error("仍未检测到设备")]
    NoDevice,

    #[error("无效的选择: {0}")]
    InvalidSelection(String),

    // -- logcat --
    #[error("启动 adb logcat 失败: {0}")]
    StreamLaunch(#[source] std::io::Error),

    #[error("读取日志时出错: {0}")]
    StreamRead(#[source] std::io::Error),

    // -- 控制台 --
    #[error("控制台输出失败: {0}")]
    Console(#[source] std::io::Error),

    // -- 剪贴板（仅警告） --
    #[error("{0}")]
    Clipboard(String),
}
