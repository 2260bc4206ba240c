//! File Cache - manual smoke-test harness
//!
//! Exercises the full public surface against a real cache directory:
//! round trip, expiry, deletion, unknown keys and file copies. Exits
//! nonzero on the first failed check.

mod cache;
mod config;
mod error;

use std::fs;
use std::thread::sleep;
use std::time::Duration;

use anyhow::{ensure, Context};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache::CacheStore;
use config::Config;

/// Main entry point for the smoke-test harness.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the cache store (creates the directory)
/// 4. Run the smoke scenario against the real filesystem
/// 5. Dump final statistics as JSON
fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "filecache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting File Cache smoke test");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: directory={}, threshold={}, default_timeout={}s, mode={:o}",
        config.directory.display(),
        config.threshold,
        config.default_timeout,
        config.file_mode
    );

    let mut store = CacheStore::open(&config).context("failed to open cache store")?;
    info!("Cache store opened");

    run_smoke_scenario(&mut store)?;

    let stats = store.stats();
    info!(
        "Smoke test passed; stats: {}",
        serde_json::to_string_pretty(&stats)?
    );
    Ok(())
}

/// The manual scenario: every public operation, in dependency order.
fn run_smoke_scenario(store: &mut CacheStore) -> anyhow::Result<()> {
    ensure!(store.clear(), "initial clear failed");

    let data = b"Test data";
    let key = "test.dat";

    // Round trip
    let path = store.put(key, data, None).context("put failed")?;
    ensure!(path.is_file(), "put did not leave a file behind");
    ensure!(store.has(key), "has() false right after put");
    let read_back = fs::read(store.get(key).context("get miss after put")?)?;
    ensure!(read_back == data, "payload mismatch after round trip");
    info!("round trip ok");

    // Expiry
    let fleeting = "test_fleeting.dat";
    store.put(fleeting, data, Some(3)).context("put failed")?;
    info!("waiting 5 seconds for expiry");
    sleep(Duration::from_secs(5));
    ensure!(store.has(key), "long-lived entry expired early");
    ensure!(!store.has(fleeting), "short-lived entry did not expire");
    info!("expiry ok");

    // Delete and clear
    store.put(fleeting, data, None).context("put failed")?;
    ensure!(store.delete(key), "delete failed");
    ensure!(!store.has(key), "deleted entry still visible");
    ensure!(store.clear(), "clear failed");
    ensure!(!store.has(fleeting), "cleared entry still visible");
    info!("delete/clear ok");

    // Unknown keys collapse to sentinels
    ensure!(!store.delete("bad name"), "delete of unknown key succeeded");
    ensure!(store.get("bad name").is_none(), "get of unknown key hit");
    ensure!(!store.has("bad name"), "has of unknown key true");
    info!("unknown keys ok");

    // put_file, twice, keyed by the source's base name
    let source_dir = tempfile::tempdir()?;
    let source = source_dir.path().join(key);
    fs::write(&source, data)?;

    store.put_file(&source, None).context("put_file failed")?;
    let path = store
        .put_file(&source, None)
        .context("second put_file failed")?;
    ensure!(path.is_file(), "put_file did not leave a file behind");
    ensure!(store.has(key), "put_file entry not visible under source name");
    info!("put_file ok");

    ensure!(store.clear(), "final clear failed");
    Ok(())
}
