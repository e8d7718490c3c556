//! Demo program
//!
//! Starts a logger with the default routing, emits one record per severity,
//! and shuts down. Pass a JSON config path to override the defaults.
//!
//! Run with: cargo run --example demo [-- logging.json]

use multisink_logger::prelude::*;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => LoggingConfig::from_json_file(path)?,
        None => LoggingConfig::default(),
    };

    println!("=== multisink_logger demo ===");
    println!("stdout: DEBUG and INFO, stderr: WARNING and up");
    println!("file:   {} (INFO and up)\n", config.file_path().display());

    let logger = Logger::start(&config)?;

    logger.debug("Loading configuration...");
    logger.info("Application started");
    logger.warning("Using default settings for some options");
    logger.error("Failed to load optional plugin");
    logger.critical("Simulated unrecoverable failure");

    let worker = logger.handle();
    std::thread::spawn(move || {
        for i in 1..=3 {
            multisink_logger::info!(worker, "Processing item {}/3", i);
        }
    })
    .join()
    .map_err(|_| "worker thread panicked")?;

    logger.shutdown(Some(Duration::from_secs(5)))?;

    let metrics = logger.metrics();
    println!(
        "\n{} records queued, {} sink writes, {} sink failures",
        metrics.enqueued(),
        metrics.delivered(),
        metrics.sink_failures()
    );
    Ok(())
}
