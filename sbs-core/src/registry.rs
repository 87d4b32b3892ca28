//! Aircraft registry — the aggregation engine's state.
//!
//! Pure state machine: call `accept()` with parsed messages from any number
//! of stations, one at a time. The registry must have exactly one writer;
//! the dedup scan in `Aircraft::add_message` assumes nothing appends to the
//! history while it runs.

use std::collections::HashMap;

use tracing::info;

use crate::aircraft::{Aircraft, Disposition, HistoryLimits};
use crate::types::*;

/// All known aircraft, keyed by ICAO address.
#[derive(Debug, Default)]
pub struct Registry {
    aircraft: HashMap<Icao, Aircraft>,
    limits: HistoryLimits,

    // Counters
    pub total_messages: u64,
    pub accepted_messages: u64,
    pub duplicate_messages: u64,
}

impl Registry {
    pub fn new(limits: HistoryLimits) -> Self {
        Registry {
            aircraft: HashMap::new(),
            limits: limits.clamped(),
            total_messages: 0,
            accepted_messages: 0,
            duplicate_messages: 0,
        }
    }

    /// Fold one message into the aircraft it names, creating the aircraft on
    /// first sight.
    pub fn accept(&mut self, m: Message) -> Disposition {
        self.total_messages += 1;
        let icao = m.icao;

        let is_new = !self.aircraft.contains_key(&icao);
        if is_new {
            info!(
                icao = %icao_to_string(icao),
                station = %m.station,
                "new aircraft"
            );
        }

        let limits = self.limits;
        let disposition = self
            .aircraft
            .entry(icao)
            .or_insert_with(|| Aircraft::new(icao))
            .add_message(m, limits);

        match disposition {
            Disposition::Duplicate => {
                self.duplicate_messages += 1;
                Disposition::Duplicate
            }
            _ => {
                self.accepted_messages += 1;
                if is_new {
                    Disposition::NewAircraft
                } else {
                    Disposition::Accepted
                }
            }
        }
    }

    pub fn get(&self, icao: Icao) -> Option<&Aircraft> {
        self.aircraft.get(&icao)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Icao, &Aircraft)> {
        self.aircraft.iter()
    }

    pub fn len(&self) -> usize {
        self.aircraft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aircraft.is_empty()
    }

    pub fn limits(&self) -> HistoryLimits {
        self.limits
    }

    /// All aircraft, most recently seen first.
    pub fn snapshot(&self) -> Vec<&Aircraft> {
        let mut all: Vec<_> = self.aircraft.values().collect();
        all.sort_by(|a, b| b.last_seen.cmp(&a.last_seen).then(a.icao.cmp(&b.icao)));
        all
    }

    /// Number of aircraft each station has reported.
    pub fn station_coverage(&self) -> HashMap<&str, usize> {
        let mut coverage: HashMap<&str, usize> = HashMap::new();
        for ac in self.aircraft.values() {
            for station in &ac.stations {
                *coverage.entry(station.as_str()).or_default() += 1;
            }
        }
        coverage
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
