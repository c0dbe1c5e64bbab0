use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};

use super::patterns::{match_line, UrlMatch, UrlPattern};
use crate::error::Error;

const SHUTDOWN_TIMEOUT_SECS: u64 = 3;

/// 单行上限（不含换行符），超出视为读取错误
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanOutcome {
    Found(UrlMatch),
    /// 日志流正常结束，始终没有命中
    NotFound,
}

// ==================== 行扫描 ====================

/// 逐行读取直到首个命中；命中行之后的内容不会被读取
pub async fn scan_lines<R>(mut reader: R, patterns: &[UrlPattern]) -> Result<ScanOutcome, Error>
where
    R: AsyncBufRead + Unpin,
{
    // logcat 可能夹带非 UTF-8 字节，按字节读再有损解码
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let n = (&mut reader)
            .take(MAX_LINE_BYTES as u64 + 1)
            .read_until(b'\n', &mut buf)
            .await
            .map_err(Error::StreamRead)?;
        if n == 0 {
            return Ok(ScanOutcome::NotFound);
        }
        if n > MAX_LINE_BYTES && buf.last() != Some(&b'\n') {
            return Err(Error::StreamRead(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("log line longer than {} bytes", MAX_LINE_BYTES),
            )));
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\r', '\n']);
        if let Some(m) = match_line(line, patterns) {
            return Ok(ScanOutcome::Found(m));
        }
    }
}

// ==================== logcat 子进程 ====================

/// 持有 logcat 子进程；`scan` 的每条退出路径都会终止它，drop 兜底
pub struct LogcatSession {
    child: Child,
    stdout: BufReader<ChildStdout>,
}

impl LogcatSession {
    pub fn spawn(mut cmd: Command) -> Result<Self, Error> {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(Error::StreamLaunch)?;
        let Some(stdout) = child.stdout.take() else {
            return Err(Error::StreamLaunch(std::io::Error::other(
                "child stdout not captured",
            )));
        };

        Ok(Self {
            child,
            stdout: BufReader::new(stdout),
        })
    }

    /// 子进程 pid（已退出时为 None）
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    pub async fn scan(mut self, patterns: &[UrlPattern]) -> Result<ScanOutcome, Error> {
        let result = scan_lines(&mut self.stdout, patterns).await;
        self.terminate().await;
        result
    }

    /// SIGTERM → 等待 → SIGKILL
    async fn terminate(&mut self) {
        #[cfg(unix)]
        if let Some(pid) = self.child.id() {
            unsafe {
                libc::kill(pid as i32, libc::SIGTERM);
            }
        }
        #[cfg(not(unix))]
        {
            let _ = self.child.start_kill();
        }

        match tokio::time::timeout(
            Duration::from_secs(SHUTDOWN_TIMEOUT_SECS),
            self.child.wait(),
        )
        .await
        {
            Ok(Ok(status)) => {
                tracing::debug!(%status, "logcat exited");
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "waiting for logcat failed");
            }
            Err(_) => {
                tracing::warn!("logcat ignored SIGTERM, killing");
                let _ = self.child.start_kill();
                let _ = self.child.wait().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::patterns::URL_PATTERNS;

    const GENSHIN: &str = "https://webstatic.mihoyo.com/hk4e/event/e20190909gacha-v3/index.html?authkey=a";
    const STAR_RAIL: &str = "https://webstatic.mihoyo.com/hkrpg/event/e20211215gacha-v2/index.html?authkey=b";

    #[tokio::test]
    async fn first_match_stops_reading() {
        let text = format!(
            "I/chatty: noise\nD/Unity: open {}\nD/Unity: open {}\nI/other: tail\n",
            GENSHIN, STAR_RAIL,
        );
        let mut input: &[u8] = text.as_bytes();
        let outcome = scan_lines(&mut input, &URL_PATTERNS).await.unwrap();
        assert_eq!(
            outcome,
            ScanOutcome::Found(UrlMatch { label: "原神", url: GENSHIN.into() }),
        );
        // 命中行之后的内容原样留在流中
        let rest = std::str::from_utf8(input).unwrap();
        assert!(rest.starts_with("D/Unity: open https://webstatic.mihoyo.com/hkrpg/"));
    }

    #[tokio::test]
    async fn eof_without_match() {
        let mut input: &[u8] = b"line one\nline two\nno newline at end";
        let outcome = scan_lines(&mut input, &URL_PATTERNS).await.unwrap();
        assert_eq!(outcome, ScanOutcome::NotFound);
        assert!(input.is_empty());
    }

    #[tokio::test]
    async fn empty_stream() {
        let outcome = scan_lines(&b""[..], &URL_PATTERNS).await.unwrap();
        assert_eq!(outcome, ScanOutcome::NotFound);
    }

    #[tokio::test]
    async fn crlf_and_invalid_utf8() {
        let mut bytes = b"\xff\xfe garbage\r\n".to_vec();
        bytes.extend_from_slice(format!("url: {}\r\n", STAR_RAIL).as_bytes());
        let outcome = scan_lines(&bytes[..], &URL_PATTERNS).await.unwrap();
        match outcome {
            ScanOutcome::Found(m) => {
                assert_eq!(m.label, "崩坏：星穹铁道");
                assert_eq!(m.url, STAR_RAIL);
            }
            other => panic!("expected match, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn last_line_without_newline_matches() {
        let text = format!("noise\n{}", GENSHIN);
        let outcome = scan_lines(text.as_bytes(), &URL_PATTERNS).await.unwrap();
        assert!(matches!(outcome, ScanOutcome::Found(_)));
    }

    #[tokio::test]
    async fn overlong_line_is_read_error() {
        let mut text = "x".repeat(MAX_LINE_BYTES + 1);
        text.push('\n');
        text.push_str(GENSHIN);
        let err = scan_lines(text.as_bytes(), &URL_PATTERNS).await.unwrap_err();
        match err {
            Error::StreamRead(e) => assert_eq!(e.kind(), std::io::ErrorKind::InvalidData),
            other => panic!("expected StreamRead, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn line_at_limit_is_accepted() {
        let mut text = "x".repeat(MAX_LINE_BYTES);
        text.push('\n');
        text.push_str(STAR_RAIL);
        let outcome = scan_lines(text.as_bytes(), &URL_PATTERNS).await.unwrap();
        assert!(matches!(outcome, ScanOutcome::Found(ref m) if m.url == STAR_RAIL));
    }

    #[tokio::test]
    async fn spawn_missing_program_is_launch_error() {
        let cmd = Command::new("/nonexistent/definitely-not-adb");
        let err = LogcatSession::spawn(cmd).err().unwrap();
        assert!(matches!(err, Error::StreamLaunch(_)));
    }
}
