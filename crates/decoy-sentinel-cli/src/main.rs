mod config;
mod emit;
use anyhow::Result;

use chrono::{DateTime, Utc};
use clap::Parser;
use config::Config;
use decoy_sentinel::SentinelGenerator;
use env_logger::{Builder, Env, Target};
use indicatif::ProgressStyle;
use log::{Level, error, info, log_enabled};
use std::{io::stdout, path::PathBuf, process::exit};

#[derive(Parser)]
#[command(name = "gen-sentinels")]
#[command(about = "Generate decoy-routing sentinels for every key in a key file")]
#[command(version)]
struct Cli {
    /// Key file with one 'index key' pair per line.
    key_file: PathBuf,
    /// Number of sentinels to generate per key.
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    num_sentinels: u64,
    /// Optional path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Flag, if set, sentinels last a day instead of an hour, overrides
    /// config.
    #[arg(short = 'd', long, action)]
    per_day: bool,
    /// Optional RFC 3339 UTC time to generate sentinels for, e.g.,
    /// 2024-01-01T10:30:00Z. Defaults to now.
    #[arg(short, long)]
    time: Option<DateTime<Utc>>,
    /// Optional search pattern length in bytes, overrides config.
    #[arg(short, long)]
    search_pattern_len: Option<usize>,
    /// Flag, if set, derive sentinels on all cores. Output order is
    /// unchanged.
    #[arg(short, long, action)]
    parallel: bool,
    /// Optional number of worker threads, implies --parallel.
    #[arg(short = 'j', long)]
    threads: Option<usize>,
    /// Flag, if set, show a progress bar on stderr.
    #[arg(long, action)]
    progress: bool,
}

fn main() {
    // stdout is reserved for sentinels
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.target(Target::Stderr);
    builder.init();

    if let Err(e) = do_main() {
        // the message must reach stderr even with RUST_LOG=off
        if log_enabled!(Level::Error) {
            error!("error: {e:#}");
        } else {
            eprintln!("error: {e:#}");
        }
        exit(1);
    }
}

fn do_main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let generator = config.generator(cli.per_day, cli.search_pattern_len)?;
    let settings = config.output(cli.parallel, cli.threads, cli.progress)?;
    if let Some(threads) = settings.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    generate(&generator, &cli, &settings)
}

fn generate(
    generator: &SentinelGenerator,
    cli: &Cli,
    settings: &config::OutputSettings,
) -> Result<()> {
    // everything is validated before the first line is written
    let sentinels = generator.generate_all(&cli.key_file, cli.num_sentinels, cli.time)?;
    let keys = sentinels.num_keys();
    let label = sentinels.window_label().to_string();
    info!(
        "generating {} sentinels per key for {keys} keys in {} window '{label}'",
        cli.num_sentinels,
        generator.granularity()
    );

    let written = emit::write_sentinels(sentinels, stdout().lock(), settings)?;
    info!("done, wrote {written} sentinels");
    Ok(())
}

fn get_progress_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise:.green}] [{eta_precise:.cyan}] ({percent:.bold}%) [{bar:50.cyan/blue}] {pos}/{human_len} {msg:.magenta}",
    )?
    .progress_chars("█░"))
}
