// src/main.rs

use maestro::{cli, logging, run};

/// Exit status when at least one job failed.
const EXIT_JOBS_FAILED: i32 = 2;

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("maestro error: {err:?}");
            std::process::exit(1);
        }
    }
}

async fn run_main() -> anyhow::Result<i32> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    let report = run(args).await?;

    let code = match report {
        Some(report) if !report.failed.is_empty() => EXIT_JOBS_FAILED,
        _ => 0,
    };
    Ok(code)
}
