// Journal backend through the service

mod common;

use common::drain_until;
use kvdb::{CallbackQueue, Item, KvdbConfig, KvdbService, OpMonitor, SyncMode};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

const TIMEOUT: Duration = Duration::from_secs(10);

fn journal_config(dir: &TempDir) -> KvdbConfig {
    KvdbConfig::journal(dir.path().to_str().unwrap(), "game", "players")
        .with_sync_mode(SyncMode::Sync)
}

#[test]
fn test_journal_service_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let config = journal_config(&dir);

    {
        let callbacks = CallbackQueue::new();
        let service =
            KvdbService::open(&config, Arc::new(callbacks.handle()), OpMonitor::new()).unwrap();
        let acked = Arc::new(Mutex::new(0));
        for (key, value) in [("p:1", "Alice"), ("p:2", "Bob"), ("p:1", "Carol")] {
            let acked = Arc::clone(&acked);
            service.put(key, value, move |result| {
                result.unwrap();
                *acked.lock().unwrap() += 1;
            });
        }
        assert!(drain_until(&callbacks, TIMEOUT, || *acked.lock().unwrap() == 3));
    }
    assert!(dir.path().join("game.players.journal").exists());

    let callbacks = CallbackQueue::new();
    let service =
        KvdbService::open(&config, Arc::new(callbacks.handle()), OpMonitor::new()).unwrap();
    let got = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&got);
    service.get_range("p:", "p;", move |result| {
        *slot.lock().unwrap() = Some(result.unwrap());
    });

    assert!(drain_until(&callbacks, TIMEOUT, || got.lock().unwrap().is_some()));
    assert_eq!(
        got.lock().unwrap().take().unwrap(),
        vec![Item::new("p:1", "Carol"), Item::new("p:2", "Bob")]
    );
}

#[test]
fn test_journal_without_location_fails_to_open() {
    let callbacks = CallbackQueue::new();
    let config = KvdbConfig::journal("", "game", "players");
    assert!(KvdbService::open(&config, Arc::new(callbacks.handle()), OpMonitor::new()).is_err());
}
