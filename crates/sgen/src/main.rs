use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use console::Style;
use sgen::config::DEFAULT_CONFIG;
use sgen::{Config, Outcome};

/// Generate Swift appearance proxies from YAML stylesheets
#[derive(Parser)]
#[command(name = "sgen", version)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Log pipeline steps
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match generate(&cli.config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", Style::new().red().bold().apply_to("error:"), err);
            ExitCode::FAILURE
        }
    }
}

fn generate(path: &Path) -> Result<()> {
    let config = Config::from_file(path)
        .with_context(|| format!("cannot load {}", path.display()))?;
    let bold = Style::new().bold();
    let green = Style::new().green();
    let dim = Style::new().dim();

    for file in sgen::run(&config)? {
        println!("Generating stylesheet {}...", bold.apply_to(&file.stylesheet));
        match file.outcome {
            Outcome::Written => println!(
                "{}",
                green.apply_to(format!("Stylesheet {} generated.", file.stylesheet))
            ),
            Outcome::Unchanged => println!(
                "{}",
                dim.apply_to(format!("Stylesheet {} skipped (no changes).", file.stylesheet))
            ),
        }
    }
    Ok(())
}
