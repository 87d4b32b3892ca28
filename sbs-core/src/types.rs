//! Shared types, error enum, and parsed message types for sbs-core.

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

/// All errors produced by sbs-core.
#[derive(Debug, Error)]
pub enum SbsError {
    #[error("wrong number of fields: expected {expected}, got {actual}")]
    FieldCount { expected: usize, actual: usize },
    #[error("invalid transmission subtype: {0:?}")]
    Subtype(String),
    #[error("invalid ICAO address: {0:?}")]
    Icao(String),
    #[error("invalid {which} timestamp: {value:?}")]
    Timestamp { which: &'static str, value: String },
    #[error("subtype {subtype}: invalid {field}: {value:?}")]
    FieldParse {
        subtype: u8,
        field: &'static str,
        value: String,
    },
    #[error("record is not valid UTF-8")]
    Encoding,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SbsError>;

// ---------------------------------------------------------------------------
// ICAO address helpers
// ---------------------------------------------------------------------------

/// ICAO aircraft address. Nominally 24 bits; feeds occasionally send wider
/// values, so the full u32 range is accepted.
pub type Icao = u32;

/// Format ICAO address as (at least) 6-char uppercase hex string.
pub fn icao_to_string(icao: Icao) -> String {
    format!("{icao:06X}")
}

/// Parse a hex string into an ICAO address. Case-insensitive; leading
/// zeros are allowed as long as the value fits in 32 bits. No sign.
pub fn icao_from_hex(hex: &str) -> Option<Icao> {
    if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

// ---------------------------------------------------------------------------
// Message type
// ---------------------------------------------------------------------------

/// SBS-1 message class, from field 0 of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MsgType {
    /// Anything not in the known set. Valid, just uninteresting.
    Invalid,
    /// `SEL`: selection change.
    SelectionChange,
    /// `ID`: call sign set or changed.
    IdChange,
    /// `AIR`: new aircraft.
    NewAircraft,
    /// `STA`: status change.
    StatusChange,
    /// `CLK`: click.
    Click,
    /// `MSG`: transponder transmission. Almost every line is one of these.
    Transmission,
}

impl MsgType {
    /// Classify field 0 by exact match.
    pub fn from_field(s: &str) -> Self {
        match s {
            "SEL" => MsgType::SelectionChange,
            "ID" => MsgType::IdChange,
            "AIR" => MsgType::NewAircraft,
            "STA" => MsgType::StatusChange,
            "CLK" => MsgType::Click,
            "MSG" => MsgType::Transmission,
            _ => MsgType::Invalid,
        }
    }

    /// Wire tag for this type. `Invalid` has no tag of its own.
    pub fn tag(&self) -> &'static str {
        match self {
            MsgType::Invalid => "",
            MsgType::SelectionChange => "SEL",
            MsgType::IdChange => "ID",
            MsgType::NewAircraft => "AIR",
            MsgType::StatusChange => "STA",
            MsgType::Click => "CLK",
            MsgType::Transmission => "MSG",
        }
    }
}

impl std::fmt::Display for MsgType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MsgType::Invalid => write!(f, "invalid"),
            other => write!(f, "{}", other.tag()),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsed message
// ---------------------------------------------------------------------------

/// WGS84 position as reported by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

/// One parsed report line.
///
/// Optional fields are `Some` only when the report's type/subtype carries
/// them and the source field was not blank.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub station: String,
    pub msg_type: MsgType,
    /// Transmission subtype 1-8. `None` for non-`MSG` reports.
    pub tx_type: Option<u8>,
    pub icao: Icao,
    /// Station-supplied event time. Authoritative for ordering and dedup.
    pub generated_at: NaiveDateTime,
    /// Time the station logged the report. Advisory.
    pub logged_at: NaiveDateTime,

    pub callsign: Option<String>,
    pub altitude_ft: Option<i32>,
    pub ground_speed_kts: Option<f32>,
    pub track_deg: Option<f32>,
    pub position: Option<Location>,
    pub vertical_rate_fpm: Option<i32>,
    pub squawk: Option<u16>,

    pub squawk_alert: Option<bool>,
    pub emergency: Option<bool>,
    pub ident_active: Option<bool>,
    pub on_ground: Option<bool>,
}

impl Message {
    /// A message with only the common header fields populated.
    pub fn new(
        station: impl Into<String>,
        msg_type: MsgType,
        tx_type: Option<u8>,
        icao: Icao,
        generated_at: NaiveDateTime,
        logged_at: NaiveDateTime,
    ) -> Self {
        Message {
            station: station.into(),
            msg_type,
            tx_type,
            icao,
            generated_at,
            logged_at,
            callsign: None,
            altitude_ft: None,
            ground_speed_kts: None,
            track_deg: None,
            position: None,
            vertical_rate_fpm: None,
            squawk: None,
            squawk_alert: None,
            emergency: None,
            ident_active: None,
            on_ground: None,
        }
    }

    pub fn is_transmission(&self) -> bool {
        self.msg_type == MsgType::Transmission
    }
}

/// Format a squawk the way it is read out: four digits, zero padded.
pub fn squawk_to_string(squawk: u16) -> String {
    format!("{squawk:04}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
