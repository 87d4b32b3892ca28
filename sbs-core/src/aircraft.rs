//! Per-aircraft aggregate state with cross-station deduplication.
//!
//! Pure logic — no I/O. Several ground stations often forward the same
//! transponder transmission; `Aircraft::add_message` recognises those
//! copies by generation time and content and folds each physical event in
//! only once.

use std::collections::{BTreeSet, VecDeque};

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::types::*;

/// Messages kept per aircraft for duplicate detection.
pub const DEFAULT_DEDUP_WINDOW: usize = 64;

/// Positions kept per aircraft for display trails.
pub const DEFAULT_MAX_TRAIL: usize = 1000;

/// Bounds on the per-aircraft history buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryLimits {
    /// Most recent accepted messages retained as the dedup reference window.
    pub dedup_window: usize,
    /// Most recent positions retained in `location_history`.
    pub max_trail: usize,
}

impl Default for HistoryLimits {
    fn default() -> Self {
        HistoryLimits {
            dedup_window: DEFAULT_DEDUP_WINDOW,
            max_trail: DEFAULT_MAX_TRAIL,
        }
    }
}

impl HistoryLimits {
    /// A zero dedup window would forget every message as soon as it is
    /// accepted; keep at least one.
    pub fn clamped(self) -> Self {
        HistoryLimits {
            dedup_window: self.dedup_window.max(1),
            ..self
        }
    }
}

/// Outcome of offering a message to the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Accepted, and it was the first message for this ICAO.
    NewAircraft,
    /// Accepted and applied.
    Accepted,
    /// Another station already reported the same event; discarded.
    Duplicate,
}

impl Disposition {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Disposition::Duplicate)
    }
}

// ---------------------------------------------------------------------------
// Aircraft state
// ---------------------------------------------------------------------------

/// Aggregated state for a single aircraft across all stations.
#[derive(Debug, Clone)]
pub struct Aircraft {
    pub icao: Icao,
    /// Every station that reported this aircraft, duplicates included.
    pub stations: BTreeSet<String>,
    pub first_seen: Option<NaiveDateTime>,
    pub last_seen: Option<NaiveDateTime>,

    pub callsign: Option<String>,
    pub altitude_ft: Option<i32>,
    pub ground_speed_kts: Option<f32>,
    pub track_deg: Option<f32>,
    pub vertical_rate_fpm: Option<i32>,
    pub squawk: Option<u16>,
    pub squawk_alert: Option<bool>,
    pub emergency: Option<bool>,
    pub ident_active: Option<bool>,
    pub on_ground: Option<bool>,

    pub location_history: VecDeque<Location>,
    pub message_history: VecDeque<Message>,

    pub message_count: u64,
    pub duplicate_count: u64,
}

impl Aircraft {
    pub fn new(icao: Icao) -> Self {
        Aircraft {
            icao,
            stations: BTreeSet::new(),
            first_seen: None,
            last_seen: None,
            callsign: None,
            altitude_ft: None,
            ground_speed_kts: None,
            track_deg: None,
            vertical_rate_fpm: None,
            squawk: None,
            squawk_alert: None,
            emergency: None,
            ident_active: None,
            on_ground: None,
            location_history: VecDeque::new(),
            message_history: VecDeque::new(),
            message_count: 0,
            duplicate_count: 0,
        }
    }

    /// Most recent reported position.
    pub fn position(&self) -> Option<Location> {
        self.location_history.back().copied()
    }

    pub fn has_position(&self) -> bool {
        !self.location_history.is_empty()
    }

    /// Fold one message into this aircraft.
    ///
    /// The reporting station is recorded even when the message turns out to
    /// be a duplicate; nothing else changes in that case.
    pub fn add_message(&mut self, m: Message, limits: HistoryLimits) -> Disposition {
        if !self.stations.contains(&m.station) {
            self.stations.insert(m.station.clone());
        }

        if self.is_duplicate(&m) {
            self.duplicate_count += 1;
            debug!(
                icao = %icao_to_string(self.icao),
                station = %m.station,
                tx_type = ?m.tx_type,
                generated_at = %m.generated_at,
                "duplicate discarded"
            );
            return Disposition::Duplicate;
        }

        if self.last_seen.is_none_or(|t| m.logged_at > t) {
            self.last_seen = Some(m.logged_at);
        }
        self.first_seen.get_or_insert(m.logged_at);

        self.apply(&m, limits.max_trail);

        self.message_count += 1;
        self.message_history.push_back(m);
        while self.message_history.len() > limits.dedup_window {
            self.message_history.pop_front();
        }

        Disposition::Accepted
    }

    /// Overwrite every field the message carries.
    fn apply(&mut self, m: &Message, max_trail: usize) {
        if let Some(cs) = &m.callsign {
            self.callsign = Some(cs.clone());
        }
        if let Some(alt) = m.altitude_ft {
            self.altitude_ft = Some(alt);
        }
        if let Some(spd) = m.ground_speed_kts {
            self.ground_speed_kts = Some(spd);
        }
        if let Some(trk) = m.track_deg {
            self.track_deg = Some(trk);
        }
        if let Some(vr) = m.vertical_rate_fpm {
            self.vertical_rate_fpm = Some(vr);
        }
        if let Some(sq) = m.squawk {
            self.squawk = Some(sq);
        }
        if let Some(v) = m.squawk_alert {
            self.squawk_alert = Some(v);
        }
        if let Some(v) = m.emergency {
            self.emergency = Some(v);
        }
        if let Some(v) = m.ident_active {
            self.ident_active = Some(v);
        }
        if let Some(v) = m.on_ground {
            self.on_ground = Some(v);
        }
        if let Some(loc) = m.position {
            self.location_history.push_back(loc);
            while self.location_history.len() > max_trail {
                self.location_history.pop_front();
            }
        }
    }

    /// True if another station already delivered the event `m` describes.
    ///
    /// Scans newest to oldest. Reports are expected to arrive in roughly
    /// generation order, so the scan ends at the first foreign entry that was
    /// generated strictly earlier than `m`.
    pub fn is_duplicate(&self, m: &Message) -> bool {
        for prev in self.message_history.iter().rev() {
            if prev.station == m.station {
                continue;
            }
            if prev.generated_at < m.generated_at {
                return false;
            }
            if prev.generated_at != m.generated_at || prev.tx_type != m.tx_type {
                continue;
            }

            match m.tx_type {
                Some(1) if m.callsign == prev.callsign => return true,
                // Same instant, same kind of fix: a different value is a
                // different event, not a missed duplicate.
                Some(2) => {
                    return m.position == prev.position
                        && m.altitude_ft == prev.altitude_ft
                        && m.ground_speed_kts == prev.ground_speed_kts
                        && m.track_deg == prev.track_deg;
                }
                Some(3) => return m.position == prev.position,
                Some(4) => {
                    return m.ground_speed_kts == prev.ground_speed_kts
                        && m.track_deg == prev.track_deg
                        && m.vertical_rate_fpm == prev.vertical_rate_fpm;
                }
                Some(5 | 7) if m.altitude_ft == prev.altitude_ft => return true,
                Some(6) if m.squawk == prev.squawk => return true,
                Some(8) if m.on_ground == prev.on_ground => return true,
                _ => {}
            }

            warn!(
                icao = %icao_to_string(m.icao),
                station = %m.station,
                other_station = %prev.station,
                tx_type = ?m.tx_type,
                generated_at = %m.generated_at,
                "possible duplicate with differing content"
            );
        }
        false
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
