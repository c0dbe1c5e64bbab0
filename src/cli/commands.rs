use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "gacha-url-finder",
    version,
    about = "Watch adb logcat and grab the gacha history URL"
)]
pub struct Cli {
    /// Settings file (default: ./config.json, then the user config dir)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Verbose output, show device ids in the selection menu
    #[arg(long, short = 'd')]
    pub debug: bool,

    /// Path to the adb executable
    #[arg(long)]
    pub adb: Option<String>,

    /// Do not copy the URL to the clipboard
    #[arg(long)]
    pub no_copy: bool,

    /// Exit immediately instead of waiting for Enter
    #[arg(long)]
    pub no_wait: bool,
}

impl Cli {
    /// 命令行覆盖配置文件
    pub fn apply(&self, config: &mut crate::config::Config) {
        if self.debug {
            config.debug = true;
        }
        if let Some(adb) = &self.adb {
            config.adb_path = adb.clone();
        }
        if self.no_copy {
            config.auto_copy = false;
        }
    }
}
