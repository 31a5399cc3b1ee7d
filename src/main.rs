use anyhow::Result;
use clap::Parser;
use wobotc::cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();
    wobotc::run_cli(&args)
}
