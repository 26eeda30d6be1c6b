use adprobe::config::{
    DEFAULT_BASE_URL, DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_DELAY_MS, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use adprobe::suite::{self, CaseStatus, SuiteReport, SuiteRunner};
use adprobe::{AdsClient, PollConfig, ProbeConfig};
use clap::Parser;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "adprobe", about = "Black-box probe for the classified-ads service")]
struct Cli {
    #[arg(long, env = "ADPROBE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
    #[arg(long, env = "ADPROBE_REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    timeout_secs: u64,
    #[arg(long, env = "ADPROBE_POLL_ATTEMPTS", default_value_t = DEFAULT_POLL_ATTEMPTS)]
    poll_attempts: u32,
    #[arg(long, env = "ADPROBE_POLL_DELAY_MS", default_value_t = DEFAULT_POLL_DELAY_MS)]
    poll_delay_ms: u64,
    #[arg(long, env = "ADPROBE_POLL_DEADLINE_SECS")]
    poll_deadline_secs: Option<u64>,
    /// Only run cases whose id or title contains this text
    #[arg(long)]
    filter: Option<String>,
    /// Cases to run at once
    #[arg(long, default_value_t = 1)]
    jobs: usize,
    /// Print the report as JSON on stdout
    #[arg(long)]
    json: bool,
    /// List cases and exit
    #[arg(long)]
    list: bool,
}

impl Cli {
    fn probe_config(&self) -> adprobe::Result<ProbeConfig> {
        let mut poll =
            PollConfig::new(self.poll_attempts, Duration::from_millis(self.poll_delay_ms))?;
        if let Some(secs) = self.poll_deadline_secs {
            poll = poll.with_deadline(Duration::from_secs(secs));
        }
        ProbeConfig::new(&self.base_url, Duration::from_secs(self.timeout_secs), poll)
    }
}

fn print_list() {
    for case in suite::cases() {
        println!("{}  {:<22}  {}", case.id, case.endpoint.to_string(), case.title);
    }
}

fn print_report(report: &SuiteReport) {
    for case in &report.cases {
        match &case.status {
            CaseStatus::Passed => {
                println!("PASS  {}  {}  ({} ms)", case.id, case.title, case.elapsed_ms)
            }
            CaseStatus::Failed { reason } => {
                println!("FAIL  {}  {}  ({} ms)", case.id, case.title, case.elapsed_ms);
                println!("      {}", reason);
            }
        }
    }
    println!(
        "{} cases: {} passed, {} failed",
        report.cases.len(),
        report.passed(),
        report.failed()
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.list {
        print_list();
        return Ok(());
    }

    adprobe::logging::init_tracing("info");

    let config = match cli.probe_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(2);
        }
    };
    let client = AdsClient::new(config)?;

    let mut runner = SuiteRunner::new(client).with_jobs(cli.jobs);
    if let Some(filter) = &cli.filter {
        runner = runner.with_filter(filter.clone());
    }
    if runner.selected().is_empty() {
        eprintln!("ERROR: no cases match the filter");
        std::process::exit(2);
    }

    let report = runner.run().await;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if !report.is_success() {
        tracing::warn!("{} of {} cases failed", report.failed(), report.cases.len());
        std::process::exit(1);
    }
    Ok(())
}
