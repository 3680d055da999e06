use clap::Parser;
use miette::{IntoDiagnostic, Result};
use payreq::application::coordinator::{CoordinatorConfig, RequestCoordinator};
use payreq::application::registry::InstrumentRegistry;
use payreq::domain::event::MerchantEvent;
use payreq::domain::ports::InstrumentStoreRef;
use payreq::error::ErrorKind;
use payreq::infrastructure::in_memory::InMemoryInstrumentStore;
use payreq::interfaces::csv::instrument_reader::InstrumentManifestReader;
use payreq::interfaces::json::event_writer::EventWriter;
use payreq::interfaces::json::request_reader::read_request;
use payreq::interfaces::script::driver::CheckoutDriver;
use payreq::interfaces::script::steps::read_steps;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Payment request creation message (JSON)
    request: PathBuf,

    /// Installed instruments manifest (CSV: name, state, schemes)
    #[arg(long)]
    instruments: PathBuf,

    /// Checkout script (JSON array of steps). Without it, only the eligible
    /// instruments are printed.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// How long the merchant may take to answer a shipping address change.
    #[arg(long)]
    response_window_ms: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "payreq=warn",
        1 => "payreq=info",
        _ => "payreq=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<PathBuf>) -> Result<InstrumentStoreRef> {
    use payreq::infrastructure::rocksdb::RocksDBInstrumentStore;

    Ok(match db_path {
        Some(path) => Arc::new(RocksDBInstrumentStore::open(path).into_diagnostic()?),
        None => Arc::new(InMemoryInstrumentStore::new()),
    })
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<PathBuf>) -> Result<InstrumentStoreRef> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Arc::new(InMemoryInstrumentStore::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let store = open_store(cli.db_path)?;

    // Install manifest entries
    let file = File::open(&cli.instruments).into_diagnostic()?;
    let reader = InstrumentManifestReader::new(file);
    for result in reader.instruments() {
        match result {
            Ok(descriptor) => store.store(descriptor).await.into_diagnostic()?,
            Err(e) => eprintln!("Error reading instrument: {}", e),
        }
    }

    let registry = InstrumentRegistry::new(store);
    let config = CoordinatorConfig {
        response_window: cli.response_window_ms.map(Duration::from_millis),
    };

    let file = File::open(&cli.request).into_diagnostic()?;
    let created = match read_request(file) {
        Ok(init) => RequestCoordinator::create(init, &registry, config).await,
        Err(e) => Err(e),
    };
    let (coordinator, mut events) = match created {
        Ok(created) => created,
        Err(e) => {
            eprintln!("Error creating request: {}", e);
            if e.kind() == ErrorKind::NoAvailablePaymentInstruments {
                let installed: Vec<String> = registry
                    .installed()
                    .await
                    .into_diagnostic()?
                    .into_iter()
                    .map(|d| d.name)
                    .collect();
                eprintln!("Installed instruments: {}", installed.join(", "));
            }
            EventWriter::new(io::stdout().lock())
                .write_events([MerchantEvent::from(&e)])
                .into_diagnostic()?;
            return Ok(());
        }
    };

    let Some(script) = cli.script else {
        for name in coordinator.eligible_instruments() {
            println!("{}", name);
        }
        return Ok(());
    };

    let steps = read_steps(File::open(script).into_diagnostic()?).into_diagnostic()?;
    let report = CheckoutDriver::new(coordinator).run(steps).await;
    for (index, e) in &report.step_errors {
        let severity = if e.is_recoverable() {
            "recoverable"
        } else {
            "fatal"
        };
        eprintln!("Error processing step {} ({}): {}", index, severity, e);
    }
    if report.skipped > 0 {
        eprintln!(
            "Skipped {} step(s) after request reached {}",
            report.skipped, report.state
        );
    }

    let mut drained = Vec::new();
    while let Some(event) = events.recv().await {
        drained.push(event);
    }
    EventWriter::new(io::stdout().lock())
        .write_events(drained)
        .into_diagnostic()?;

    Ok(())
}
