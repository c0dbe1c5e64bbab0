use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::Error;
use crate::scanner::UrlMatch;

// ==================== 剪贴板 ====================

pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<(), Error>;
}

/// 系统剪贴板，首次写入时才打开
///
/// X11/Wayland 下剪贴板内容归属于持有者，需存活到进程退出前。
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), Error> {
        let mut clipboard = match self.inner.take() {
            Some(c) => c,
            None => arboard::Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?,
        };
        let result = clipboard
            .set_text(text)
            .map_err(|e| Error::Clipboard(e.to_string()));
        self.inner = Some(clipboard);
        result
    }
}

// ==================== 结果输出 ====================

/// 打印命中结果；开启 auto_copy 时恰好写一次剪贴板，失败仅警告
pub fn report_match(
    out: &mut impl Write,
    m: &UrlMatch,
    auto_copy: bool,
    clipboard: &mut dyn ClipboardSink,
) -> std::io::Result<()> {
    writeln!(out, "[{}] 找到的URL: {}", m.label, m.url)?;
    if !auto_copy {
        return Ok(());
    }
    match clipboard.set_text(&m.url) {
        Ok(()) => writeln!(out, "[INFO] URL 已自动复制到剪贴板"),
        Err(e) => writeln!(out, "[WARN] 复制到剪贴板失败: {}", e),
    }
}

/// 等待回车，避免双击启动时控制台窗口直接关闭
pub async fn pause<R>(input: &mut R, out: &mut impl Write) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    writeln!(out, "\n按回车键退出...")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line).await?;
    Ok(())
}
