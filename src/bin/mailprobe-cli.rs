use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mailprobe::{MxStatus, VerificationVerdict, VerifyOptions, check_mx, verify_with_options};

#[derive(Parser)]
#[command(name = "mailprobe-cli")]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,

    /// format: human|json
    #[arg(long, default_value = "human")]
    format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Full deliverability verdict for one address
    Verify {
        email: String,

        /// hostname announced in HELO (defaults to the target domain)
        #[arg(long)]
        helo: Option<String>,

        /// SMTP port of the mail exchange
        #[arg(long, default_value_t = 25)]
        port: u16,

        /// per-operation timeout in milliseconds (DNS, connect, each command)
        #[arg(long, default_value_t = 5000)]
        timeout_ms: u64,

        /// extra known-provider domain (repeatable)
        #[arg(long = "provider")]
        providers: Vec<String>,
    },
    /// MX lookup for a domain
    Mx { domain: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Verify {
            email,
            helo,
            port,
            timeout_ms,
            providers,
        } => {
            let mut options = VerifyOptions::default();
            options.probe.helo_domain = helo;
            options.probe.port = port;
            let timeout = Duration::from_millis(timeout_ms);
            options.probe.dns_timeout = timeout;
            options.probe.connect_timeout = timeout;
            options.probe.command_timeout = timeout;
            options.known_providers.extend(providers);

            let verdict = verify_with_options(&email, &options);
            print_verdict(&email, &verdict, &cli.format)?;
            if !verdict.is_valid() {
                std::process::exit(2);
            }
        }
        Commands::Mx { domain } => {
            let status = check_mx(&domain)?;
            print_mx(&status, &cli.format)?;
            if !status.has_records() {
                std::process::exit(2);
            }
        }
    }
    Ok(())
}

fn print_verdict(email: &str, verdict: &VerificationVerdict, format: &str) -> Result<()> {
    match format {
        "human" => match verdict {
            VerificationVerdict::InvalidFormat { reason } => {
                println!("[INVALID] {email} :: {reason}");
            }
            VerificationVerdict::Checked(report) => {
                if report.is_valid {
                    println!("[OK]      {email}");
                } else {
                    println!("[INVALID] {email}");
                }
                println!("          domain: {}", report.domain);
                println!("          known provider: {}", report.is_known_provider);
                println!("          mx record: {}", report.has_mx_record);
                println!("          smtp: {}", report.smtp_detail);
            }
        },
        "json" => {
            #[cfg(feature = "with-serde")]
            println!("{}", serde_json::to_string_pretty(verdict)?);
            #[cfg(not(feature = "with-serde"))]
            bail!("format=json requires the 'with-serde' feature");
        }
        other => bail!("unknown --format '{other}', use: human|json"),
    }
    Ok(())
}

fn print_mx(status: &MxStatus, format: &str) -> Result<()> {
    match format {
        "human" => match status {
            MxStatus::Records(records) => {
                let summary = records
                    .iter()
                    .map(|record| format!("{}:{}", record.priority, record.exchange))
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("records: {summary}");
            }
            MxStatus::NoRecords => println!("no MX records"),
        },
        "json" => {
            #[cfg(feature = "with-serde")]
            println!("{}", serde_json::to_string_pretty(status)?);
            #[cfg(not(feature = "with-serde"))]
            bail!("format=json requires the 'with-serde' feature");
        }
        other => bail!("unknown --format '{other}', use: human|json"),
    }
    Ok(())
}
