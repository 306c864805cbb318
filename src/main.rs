use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use release_metrics::config;
use release_metrics::domain::Period;
use release_metrics::pipeline::{self, CollectOptions};
use release_metrics::ui;

#[derive(clap::Parser)]
#[command(
    name = "release-metrics",
    version,
    about = "Release, commit and changelog metrics across git repositories"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(
        short,
        long,
        default_value = "all",
        help = "Reporting period: all, YYYY, YYYY-MM or YYYY-QN"
    )]
    period: String,

    #[arg(long, help = "Print the report as JSON")]
    json: bool,

    #[arg(short, long, help = "Number of projects scanned in parallel")]
    jobs: Option<usize>,

    #[arg(short, long, help = "Enable debug logging")]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let period = Period::parse(&args.period)?;

    let mut config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };
    if let Some(jobs) = args.jobs {
        config.run.jobs = jobs;
    }

    let projects = config.project_list();
    if projects.is_empty() {
        ui::display_error("No projects configured (set included_projects or [[projects]])");
        std::process::exit(1);
    }

    if !args.json {
        ui::display_status(&format!(
            "Scanning {} projects for period {}",
            projects.len(),
            period
        ));
    }

    let options = CollectOptions::from_config(&config)?;
    let report = pipeline::collect(&projects, &options, &period)
        .context("Failed to collect release metrics")?;

    if args.json {
        println!("{}", ui::report_json(&report)?);
    } else {
        ui::display_report(&report);
    }

    Ok(())
}
