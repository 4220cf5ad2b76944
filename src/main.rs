use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use mdout_processor::cli::Args;
use mdout_processor::writer::{ParquetOutput, WriteReport};
use mdout_processor::{MdoutParser, ParseOutput};
use std::process;
use std::time::{Duration, Instant};
use tracing::{debug, info};

fn main() {
    let args = Args::parse();

    if let Err(error) = setup_logging(&args) {
        eprintln!("Failed to initialize logging: {:#}", error);
        process::exit(1);
    }

    match run(&args) {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Set up structured logging on stderr
fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mdout_processor={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let start_time = Instant::now();
    let config = args.parser_config()?;
    let compression = args.compression()?;
    let parser = MdoutParser::with_config(config)?;

    info!("Parsing {}", args.input.display());

    let spinner = (!args.quiet).then(|| {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(format!("Parsing {}...", args.input.display()));
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    });

    let parsed = parser
        .parse_path(&args.input)
        .with_context(|| format!("Failed to parse {}", args.input.display()));

    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }
    let output = parsed?;

    let report = ParquetOutput::new(&args.output)
        .with_compression(compression)
        .write(&output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    if !args.quiet {
        print_summary(&output, &report, start_time.elapsed());
    }
    Ok(())
}

fn print_summary(output: &ParseOutput, report: &WriteReport, elapsed: Duration) {
    println!("\n{}", "Parse Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        elapsed.as_millis().to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Parameters:".bright_cyan(),
        output.parameters.len().to_string().bright_white()
    );
    println!(
        "  {} {} ({} keys)",
        "Time series rows:".bright_cyan(),
        output.time_series.len().to_string().bright_white().bold(),
        output.time_series.key_count()
    );
    println!(
        "  {} {}",
        "Summary rows:".bright_cyan(),
        if output.stats.summary_detected {
            "detected".bright_white()
        } else {
            "not found".bright_yellow()
        }
    );
    if !output.warnings.is_empty() {
        println!(
            "  {} {}",
            "Warnings:".bright_red(),
            output.warnings.len().to_string().bright_red().bold()
        );
        for warning in &output.warnings {
            println!("    {}", warning.to_string().yellow());
        }
    }
    for path in report.paths() {
        println!(
            "  {} {}",
            "Wrote:".bright_cyan(),
            path.display().to_string().bright_white()
        );
    }
}
