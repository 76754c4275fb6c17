//! Place a real order on the panel and follow it until it settles.
//!
//! Requires `DRY_RUN=0` and a positive balance unless `--allow-dry-run` is given.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use smm_panel::{
    OrderPlan, OrderSummary, PollOptions, ServiceId, ServiceSelector, Settings, SmmClient,
    WorkflowError, run_order,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "smm-order")]
#[command(about = "Place an order on an SMM panel and poll its status")]
struct Cli {
    /// Exact service id
    #[arg(long, conflicts_with = "name_contains")]
    service_id: Option<u64>,

    /// Pick the cheapest service whose name contains this text
    #[arg(long)]
    name_contains: Option<String>,

    /// Destination for the service (URL, username, video, ...)
    #[arg(long)]
    link: String,

    /// Quantity, checked against the service's min/max
    #[arg(long)]
    quantity: Option<u64>,

    /// Seconds before the first status re-check
    #[arg(long, default_value = "10", value_parser = parse_seconds)]
    poll_interval: Duration,

    /// Maximum number of status checks
    #[arg(long, default_value_t = PollOptions::DEFAULT_ATTEMPTS)]
    poll_attempts: u32,

    /// Print the final summary as JSON
    #[arg(long)]
    json: bool,

    /// Simulate even though DRY_RUN=1 (spends nothing)
    #[arg(long)]
    allow_dry_run: bool,
}

impl Cli {
    fn plan(&self) -> OrderPlan {
        let selector = match (self.service_id, &self.name_contains) {
            (Some(id), _) => ServiceSelector::ById(ServiceId::new(id)),
            (None, Some(needle)) if !needle.is_empty() => {
                ServiceSelector::NameContains(needle.clone())
            }
            _ => ServiceSelector::Cheapest,
        };
        OrderPlan {
            selector,
            link: self.link.clone(),
            quantity: self.quantity,
            poll: PollOptions::new(self.poll_interval, self.poll_attempts),
            allow_dry_run: self.allow_dry_run,
        }
    }
}

fn parse_seconds(value: &str) -> Result<Duration, String> {
    let secs: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number of seconds"))?;
    if secs < 0.0 {
        return Err(format!("'{value}' must not be negative"));
    }
    Duration::try_from_secs_f64(secs).map_err(|err| err.to_string())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

fn print_summary(summary: &OrderSummary, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string(summary)?);
        return Ok(());
    }

    let status = &summary.final_status;
    println!(
        "order_id={} status={} error={} remains={} charge={}",
        summary.order_id,
        status.status.as_deref().unwrap_or("-"),
        status.error.as_deref().unwrap_or("-"),
        status.remains.as_deref().unwrap_or("-"),
        status.charge.as_deref().unwrap_or("-"),
    );
    Ok(())
}

async fn run(cli: &Cli, settings: &Settings) -> Result<OrderSummary, WorkflowError> {
    let client = SmmClient::from_settings(settings)?;
    run_order(&client, settings, &cli.plan()).await
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let dotenv = dotenvy::dotenv();
    init_tracing();
    if let Err(err) = dotenv {
        if !err.not_found() {
            tracing::warn!(error = %err, "failed to load .env");
        }
    }
    let settings = Settings::from_env();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            tracing::error!(error = %err, "failed to start runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(&cli, &settings)) {
        Ok(summary) => match print_summary(&summary, cli.json) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                tracing::error!(error = %err, "failed to print summary");
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            tracing::error!(exit_code = err.exit_code(), "aborted: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
