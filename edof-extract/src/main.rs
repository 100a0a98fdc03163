use std::{fs, path::PathBuf};

use anyhow::{Context, Result, ensure};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
mod detect;
mod extract;

fn main() -> Result<()> {
    let (mut args, unknown_flags) = cli::Cli::parse_lenient();
    // handed to resolve_inputs, which reports and drops them
    args.inputs
        .splice(0..0, unknown_flags.into_iter().map(PathBuf::from));
    init_tracing(args.log_level());
    run(&args)
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &cli::Cli) -> Result<()> {
    let inputs = detect::resolve_inputs(&args.inputs);

    if let Some(dir) = &args.out_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    let extractor = extract::Extractor::from_cli(args);
    let summary = extractor.run_batch(&inputs.files);

    let failed = summary.failed + inputs.missing;
    let total = summary.succeeded + failed;
    info!("Done: {} of {} file(s) extracted", summary.succeeded, total);
    ensure!(failed == 0, "{failed} of {total} file(s) could not be extracted");
    Ok(())
}
