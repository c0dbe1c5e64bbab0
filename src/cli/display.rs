use std::io::Write;

use crate::bridge::Device;
use crate::error::Error;

// ==================== 终端输出 ====================
// 纯文本、逐行，面向双击启动的控制台窗口

pub fn print_checking(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "正在检查 ADB 连接状态...")
}

pub fn print_listening(out: &mut impl Write, device: &Device) -> std::io::Result<()> {
    writeln!(
        out,
        "正在监听日志（当前设备：{}），请打开抽卡界面...",
        device.display_name,
    )
}

pub fn print_not_found(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "未找到符合条件的URL")
}

pub fn print_error(out: &mut impl Write, err: &Error) -> std::io::Result<()> {
    match err {
        // 附带 adb 原始输出，方便排查
        Error::Connect { output, .. } if !output.trim().is_empty() => {
            writeln!(out, "[ERROR] {}: {}", err, output.trim())
        }
        _ => writeln!(out, "[ERROR] {}", err),
    }
}
