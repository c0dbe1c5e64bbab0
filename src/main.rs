use anyhow::Result;

fn main() -> Result<()> {
    let cli = gacha_url_finder::cli::parse();
    gacha_url_finder::cli::run(cli)
}
