use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::error;
use serde_json::Value;
use pricecast::config::{load_config, Config};
use pricecast::dashboard::sink::JsonChartSink;
use pricecast::dashboard::{Dashboard, Selection};
use pricecast::errors::PipelineError;
use pricecast::ingest::Ingest;
use pricecast::initialization::{init_endpoint, init_logging, init_mail, init_store};

#[derive(Parser)]
#[command(version, about = "Energy price prediction ingest and dashboard")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, env = "PRICECAST_CONFIG", default_value = "config/pricecast.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run predictions for the object named in a new-object notification
    Ingest {
        /// File holding the notification json, '-' for stdin
        #[arg(long, default_value = "-")]
        event: String,
    },
    /// Render per day charts of mean predicted value per hour
    Dashboard {
        /// Only print the selectable cities and months
        #[arg(long)]
        list: bool,
        #[arg(long, required_unless_present = "list")]
        city: Option<String>,
        #[arg(long, required_unless_present = "list")]
        month: Option<u32>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(c) => c,
        Err(e) => { eprintln!("{}", e); return ExitCode::from(2); }
    };
    if let Err(e) = init_logging(&config.general) {
        eprintln!("{}", e);
        return ExitCode::from(2);
    }

    let (name, result) = match &cli.command {
        Command::Ingest { event } => ("ingest", run_ingest(&config, event)),
        Command::Dashboard { list, city, month } => ("dashboard", run_dashboard(&config, *list, city.as_deref(), *month)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{} failed: {:#}", name, e);
            if let Some(mail) = init_mail(config.mail.as_ref()) {
                if let Err(me) = mail.send_mail(format!("pricecast {} failed", name), format!("{:#}", e)) {
                    error!("failed to send failure notification: {}", me);
                }
            }
            ExitCode::from(e.downcast_ref::<PipelineError>().map_or(1, |pe| pe.exit_code()))
        },
    }
}

/// Runs the ingest pipeline for the notification read from file or stdin
///
/// # Arguments
///
/// * 'config' - the configuration
/// * 'event_path' - path to the notification json, '-' for stdin
fn run_ingest(config: &Config, event_path: &str) -> Result<()> {
    let ingest_params = config.ingest.as_ref().ok_or(anyhow!("missing [ingest] configuration"))?;
    let inference = config.inference.as_ref().ok_or(anyhow!("missing [inference] configuration"))?;

    let raw = if event_path == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("reading event from stdin")?;
        buf
    } else {
        fs::read_to_string(event_path).with_context(|| format!("reading event from {}", event_path))?
    };
    let event: Value = serde_json::from_str(&raw)
        .map_err(|e| PipelineError::MalformedEvent(e.to_string()))?;

    let store = init_store(&config.storage, Some(&ingest_params.dest_bucket));
    let endpoint = init_endpoint(inference);

    let dest = Ingest::new(store.as_ref(), &endpoint, ingest_params).handle(&event)?;
    println!("{}", dest);

    Ok(())
}

/// Runs the dashboard, either listing selector options or rendering charts for a selection
///
/// # Arguments
///
/// * 'config' - the configuration
/// * 'list' - whether to only list selector options
/// * 'city' - selected city
/// * 'month' - selected month (1-12)
fn run_dashboard(config: &Config, list: bool, city: Option<&str>, month: Option<u32>) -> Result<()> {
    let params = config.dashboard.as_ref().ok_or(anyhow!("missing [dashboard] configuration"))?;

    let store = init_store(&config.storage, None);
    let dashboard = Dashboard::new(store.as_ref(), params);
    let rows = dashboard.load()?;

    if list {
        let options = dashboard.options(&rows);
        println!("cities: {}", options.cities.join(", "));
        for (number, name) in options.months {
            println!("{:>2} {}", number, name);
        }
        return Ok(());
    }

    let (Some(city), Some(month)) = (city, month) else {
        return Err(anyhow!("both --city and --month are required"));
    };
    let selection = Selection::new(city, month)?;

    let mut sink = JsonChartSink::new(&params.output_dir);
    let count = dashboard.render(&rows, &selection, &mut sink)?;
    println!("{} charts written to {}", count, params.output_dir);

    Ok(())
}
