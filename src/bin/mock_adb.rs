// ==================== Mock adb ====================
// 用于集成测试的假 adb，行为由环境变量控制：
//   MOCK_ADB_DEVICES            `devices` 的输出
//   MOCK_ADB_DEVICES_CONNECTED  connect 成功后 `devices` 的输出
//   MOCK_ADB_STATE_DIR          connect 成功时在此写入 connected 标记
//   MOCK_ADB_CONNECT_OUTPUT     `connect` 的输出（默认 "connected to <addr>"）
//   MOCK_ADB_MODEL              `getprop ro.product.model` 的输出
//   MOCK_ADB_LOGCAT             `logcat` 逐行输出的文件
//   MOCK_ADB_LOGCAT_HOLD        输出完后不退出，直到被杀
//   MOCK_ADB_LOGCAT_CLOSE_AND_HOLD  输出完后关闭 stdout，但进程不退出
//   MOCK_ADB_LOGCAT_PIDFILE     logcat 启动时写入自身 pid
//   MOCK_ADB_FAIL               逗号分隔的子命令，命中时退出码 1

use std::io::Write;
use std::path::PathBuf;

fn env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn connected_marker() -> Option<PathBuf> {
    env("MOCK_ADB_STATE_DIR").map(|d| PathBuf::from(d).join("connected"))
}

fn fail_if_requested(sub: &str) {
    let fail = env("MOCK_ADB_FAIL").unwrap_or_default();
    if fail.split(',').any(|s| s.trim() == sub) {
        eprintln!("error: mock failure for {}", sub);
        std::process::exit(1);
    }
}

fn devices() {
    let connected = connected_marker().is_some_and(|m| m.exists());
    let listing = if connected {
        env("MOCK_ADB_DEVICES_CONNECTED")
    } else {
        env("MOCK_ADB_DEVICES")
    };
    print!("{}", listing.unwrap_or_else(|| "List of devices attached\n\n".into()));
}

fn connect(addr: &str) {
    let output = env("MOCK_ADB_CONNECT_OUTPUT")
        .unwrap_or_else(|| format!("connected to {}\n", addr));
    if output.contains("connected to") {
        if let Some(marker) = connected_marker() {
            std::fs::write(marker, addr).ok();
        }
    }
    print!("{}", output);
}

fn logcat() {
    if let Some(pidfile) = env("MOCK_ADB_LOGCAT_PIDFILE") {
        std::fs::write(pidfile, std::process::id().to_string()).ok();
    }

    let mut stdout = std::io::stdout().lock();
    if let Some(path) = env("MOCK_ADB_LOGCAT") {
        let content = std::fs::read(path).unwrap_or_default();
        // 父进程提前关闭管道时直接退出
        if stdout.write_all(&content).is_err() || stdout.flush().is_err() {
            return;
        }
    }
    drop(stdout);

    if env("MOCK_ADB_LOGCAT_CLOSE_AND_HOLD").is_some() {
        // 父进程读到 EOF，子进程仍存活
        #[cfg(unix)]
        unsafe {
            libc::close(1);
        }
        hold();
    }
    if env("MOCK_ADB_LOGCAT_HOLD").is_some() {
        hold();
    }
}

fn hold() -> ! {
    loop {
        std::thread::sleep(std::time::Duration::from_secs(3600));
    }
}

fn main() {
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    // -s <serial>
    if args.first().map(String::as_str) == Some("-s") && args.len() >= 2 {
        args.drain(..2);
    }

    let parts: Vec<&str> = args.iter().map(String::as_str).collect();
    match parts.as_slice() {
        ["devices", ..] => {
            fail_if_requested("devices");
            devices();
        }
        ["connect", addr] => {
            fail_if_requested("connect");
            connect(addr);
        }
        ["shell", "getprop", "ro.product.model"] => {
            fail_if_requested("getprop");
            println!("{}", env("MOCK_ADB_MODEL").unwrap_or_default());
        }
        ["shell", "logcat", ..] => {
            fail_if_requested("logcat");
            logcat();
        }
        other => {
            eprintln!("mock-adb: unsupported command: {:?}", other);
            std::process::exit(2);
        }
    }
}
