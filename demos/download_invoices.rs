//! Download invoices example
//!
//! This example stands in for an interactive front end:
//! - Collecting the parameters (RFC, certificate, key, password, date range)
//! - Running the batch on a background task
//! - Following progress through the event channel
//!
//! ```bash
//! cargo run --example download_invoices -- \
//!     AAA010101AAA fiel.cer fiel.key 'password' 2024-01-01 2024-01-31 [output_dir]
//! ```
//!
//! Set `SAT_DL_CONFIG=/path/to/config.json` to override endpoints and timeouts.

use sat_dl::{Config, Credentials, DateRange, Event, SatDownloader};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 6 {
        eprintln!(
            "usage: download_invoices <rfc> <cer> <key> <password> <start YYYY-MM-DD> <end YYYY-MM-DD> [output_dir]"
        );
        std::process::exit(2);
    }

    let config = match std::env::var_os("SAT_DL_CONFIG") {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };

    let downloader = Arc::new(SatDownloader::new(config)?);
    let mut request = downloader.request(
        Credentials::new(&args[0], &args[1], &args[2], &args[3]),
        DateRange::parse(&args[4], &args[5])?,
    );
    if let Some(dir) = args.get(6).map(|s| s.trim()).filter(|s| !s.is_empty()) {
        request.output_dir = dir.into();
    }
    std::fs::create_dir_all(&request.output_dir)?;

    // Subscribe before starting so no event is missed
    let mut events = downloader.subscribe();
    let handle = downloader.spawn(request);

    while let Ok(event) = events.recv().await {
        match event {
            Event::BatchStarted { total } => println!("Total paquetes: {}", total),
            Event::PackageExtracted {
                index,
                total,
                package_id,
                documents,
            } => println!(
                "Descargando paquete {}/{} ({}: {} XML)",
                index, total, package_id, documents
            ),
            Event::PackageFailed {
                package_id, error, ..
            } => eprintln!("Paquete {} omitido: {}", package_id, error),
            Event::Finished { .. } | Event::Aborted { .. } => break,
            Event::Authenticated => {}
        }
    }

    match handle.await? {
        Ok(summary) => {
            println!(
                "Descarga completada: {} de {} paquetes ({} fallidos)",
                summary.succeeded(),
                summary.total,
                summary.failed()
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
