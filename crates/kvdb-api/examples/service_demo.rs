//! A game-server style main loop driving KVDB.
//!
//! Run with `cargo run --example service_demo -- ./demo-data` for the journal
//! backend, or without an argument for the in-memory backend.

use kvdb::logging::LogConfig;
use kvdb::{CallbackQueue, KvdbConfig, KvdbService, OpMonitor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn main() {
    let _guard = match LogConfig::info().init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let config = match std::env::args().nth(1) {
        Some(dir) => KvdbConfig::journal(dir, "demo".to_string(), "players".to_string()),
        None => KvdbConfig::memory(),
    };

    // Everything below the service runs on this thread only
    let callbacks = CallbackQueue::new();
    let monitor = OpMonitor::new();
    let kvdb = match KvdbService::open(&config, Arc::new(callbacks.handle()), Arc::clone(&monitor)) {
        Ok(kvdb) => kvdb,
        Err(e) => {
            tracing::error!(error = %e, "kvdb initialization failed");
            std::process::exit(1);
        }
    };

    let players = [("player:1", "Alice"), ("player:2", "Bob"), ("player:3", "Carol")];
    let outstanding = Arc::new(AtomicUsize::new(players.len() + 2));

    for (key, name) in players {
        let outstanding = Arc::clone(&outstanding);
        kvdb.put(key, name, move |result| {
            match result {
                Ok(()) => tracing::info!(key, "saved"),
                Err(e) => tracing::error!(key, error = %e, "save failed"),
            }
            outstanding.fetch_sub(1, Ordering::SeqCst);
        });
    }

    let done = Arc::clone(&outstanding);
    kvdb.get("player:2", move |result| {
        match result {
            Ok(Some(name)) => tracing::info!(%name, "loaded player:2"),
            Ok(None) => tracing::info!("player:2 not found"),
            Err(e) => tracing::error!(error = %e, "load failed"),
        }
        done.fetch_sub(1, Ordering::SeqCst);
    });

    let done = Arc::clone(&outstanding);
    kvdb.get_range("player:", "player;", move |result| {
        match result {
            Ok(items) => {
                for item in items {
                    tracing::info!(key = item.key(), value = item.value(), "range item");
                }
            }
            Err(e) => tracing::error!(error = %e, "range failed"),
        }
        done.fetch_sub(1, Ordering::SeqCst);
    });

    // Main loop ticks until every callback above has run
    while outstanding.load(Ordering::SeqCst) > 0 {
        callbacks.wait_and_run(Duration::from_millis(50));
    }

    for (name, stats) in monitor.snapshot() {
        tracing::info!(
            op = name,
            count = stats.count,
            avg_us = stats.average().as_micros() as u64,
            "operation stats"
        );
    }
}
