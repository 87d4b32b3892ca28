//! Aggregation engine task.
//!
//! The single consumer of the merge channel and the only writer of the
//! registry. Each message is folded in under its own write lock; nothing is
//! awaited while the lock is held, so readers never wait on the network.
//!
//! The loop ends when every sender is gone, which means every message that
//! made it into the channel has been applied.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use sbs_core::{Disposition, Message, Registry};

/// Totals for one engine run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub received: u64,
    pub new_aircraft: u64,
    pub accepted: u64,
    pub duplicates: u64,
}

impl EngineStats {
    fn record(&mut self, disposition: Disposition) {
        self.received += 1;
        match disposition {
            Disposition::NewAircraft => {
                self.new_aircraft += 1;
                self.accepted += 1;
            }
            Disposition::Accepted => self.accepted += 1,
            Disposition::Duplicate => self.duplicates += 1,
        }
    }
}

/// A panicked writer leaves the registry consistent per message, so a
/// poisoned lock is still safe to use.
pub fn read_registry(registry: &RwLock<Registry>) -> RwLockReadGuard<'_, Registry> {
    registry.read().unwrap_or_else(PoisonError::into_inner)
}

pub fn write_registry(registry: &RwLock<Registry>) -> RwLockWriteGuard<'_, Registry> {
    registry.write().unwrap_or_else(PoisonError::into_inner)
}

/// Drain `rx` into `registry` until the channel closes.
pub async fn run(mut rx: mpsc::Receiver<Message>, registry: Arc<RwLock<Registry>>) -> EngineStats {
    let mut stats = EngineStats::default();

    while let Some(msg) = rx.recv().await {
        let disposition = write_registry(&registry).accept(msg);
        stats.record(disposition);
    }

    info!(
        received = stats.received,
        accepted = stats.accepted,
        duplicates = stats.duplicates,
        aircraft = read_registry(&registry).len(),
        "engine drained"
    );
    stats
}

pub fn spawn(rx: mpsc::Receiver<Message>, registry: Arc<RwLock<Registry>>) -> JoinHandle<EngineStats> {
    tokio::spawn(run(rx, registry))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use sbs_core::{parse_line, HistoryLimits};

    const POS_A: &str = "MSG,3,1,1,4CA2B4,1,2023/01/01,12:00:00.000,2023/01/01,12:00:00.100,,35000,,,51.5074,-0.1278,,,0,0,0,0";
    const POS_B: &str = "MSG,3,1,1,4CA2B4,1,2023/01/01,12:00:00.000,2023/01/01,12:00:00.180,,35000,,,51.5080,-0.1278,,,0,0,0,0";
    const ALT: &str = "MSG,5,1,1,406B90,1,2023/01/01,12:00:01.000,2023/01/01,12:00:01.000,,24000,,,,,,,0,,0,0";

    fn shared_registry() -> Arc<RwLock<Registry>> {
        Arc::new(RwLock::new(Registry::new(HistoryLimits::default())))
    }

    #[tokio::test]
    async fn test_engine_drains_after_senders_drop() {
        let registry = shared_registry();
        let (tx, rx) = mpsc::channel(4);
        let handle = spawn(rx, Arc::clone(&registry));

        let tx_b = tx.clone();
        tx.send(parse_line("a", POS_A).unwrap()).await.unwrap();
        tx_b.send(parse_line("b", POS_A).unwrap()).await.unwrap();
        tx_b.send(parse_line("b", POS_B).unwrap()).await.unwrap();
        tx.send(parse_line("a", ALT).unwrap()).await.unwrap();
        drop(tx);
        drop(tx_b);

        let stats = handle.await.unwrap();
        assert_eq!(
            stats,
            EngineStats {
                received: 4,
                new_aircraft: 2,
                accepted: 3,
                duplicates: 1,
            }
        );

        let reg = read_registry(&registry);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.duplicate_messages, 1);
        let ac = reg.get(0x4CA2B4).unwrap();
        assert_eq!(ac.location_history.len(), 2);
        assert_eq!(ac.stations.len(), 2);
    }

    #[tokio::test]
    async fn test_engine_empty_channel() {
        let registry = shared_registry();
        let (tx, rx) = mpsc::channel::<Message>(1);
        drop(tx);

        let stats = run(rx, Arc::clone(&registry)).await;
        assert_eq!(stats, EngineStats::default());
        assert!(read_registry(&registry).is_empty());
    }
}
