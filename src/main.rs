// src/main.rs

use anyhow::Context;
use taskwatch::{cli, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("taskwatch error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    let config = args.config.clone();
    run(args)
        .await
        .with_context(|| format!("while using config {config}"))
}
