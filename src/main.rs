//! modempoller: poll a fleet of DOCSIS cable modems over SNMP and write
//! per-modem reports for the time-series collector.

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use modempoller::catalog::{Catalog, Variant};
use modempoller::config::{Backend, DbConfig, PollerSettings};
use modempoller::db::Inventory;
use modempoller::poller::{OutputMode, PollCycle};
use modempoller::util;

/// `-h` is the database host, as the original flag set defined it, so the
/// built-in short help is disabled and help is `--help` only.
#[derive(Parser)]
#[command(
    name = "modempoller",
    version,
    about = "Asynchronous SNMP poller for DOCSIS cable modem fleets",
    disable_help_flag = true
)]
struct Cli {
    /// Single-modem analysis view: verbose catalog, output on stdout
    #[arg(short = 'a')]
    analysis: bool,

    /// Inventory backend to query
    #[arg(short = 'b', long = "backend", value_enum, default_value = "nms-prime")]
    backend: Backend,

    /// Database name [default: nmsprime / cacti]
    #[arg(short = 'd', long = "database", value_name = "DB")]
    database: Option<String>,

    /// Database server hostname [default: localhost]
    #[arg(short = 'h', long = "host", value_name = "HOST")]
    host: Option<String>,

    /// Restrict polling to one modem id
    #[arg(short = 'm', long = "modem", value_name = "ID")]
    modem: Option<u32>,

    /// Database password [default: nmsprime / cactiuser]
    #[arg(short = 'p', long = "password", value_name = "PASSWORD")]
    password: Option<String>,

    /// Database username [default: nmsprime / cactiuser]
    #[arg(short = 'u', long = "user", value_name = "USER")]
    user: Option<String>,

    /// Print help
    #[arg(long, action = clap::ArgAction::Help)]
    help: Option<bool>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            std::process::exit(code);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("modempoller: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    util::raise_nofile_limit();

    let variant = if cli.analysis {
        Variant::Analysis
    } else {
        Variant::Bulk
    };
    let catalog = Catalog::load(variant)?;

    let mut db_config = DbConfig::defaults(cli.backend);
    if let Some(host) = cli.host {
        db_config.host = host;
    }
    if let Some(user) = cli.user {
        db_config.user = user;
    }
    if let Some(password) = cli.password {
        db_config.pass = password;
    }
    if let Some(database) = cli.database {
        db_config.name = database;
    }

    let inventory = Inventory::connect(cli.backend, &db_config).await?;
    let records = inventory.fetch(cli.modem).await?;

    let mode = if cli.analysis {
        OutputMode::Analysis
    } else {
        OutputMode::Bulk
    };
    let mut cycle = PollCycle::new(catalog, mode, PollerSettings::default());
    for record in &records {
        if let Err(e) = cycle.add_host(record).await {
            warn!(peer = %record.transport, error = %e, "skipping host");
        }
    }

    cycle.run().await
}
