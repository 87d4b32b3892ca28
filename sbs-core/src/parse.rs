//! Parse SBS-1 BaseStation report lines into typed messages.
//!
//! Responsibilities:
//! - Split a report into its 22 comma-separated fields
//! - Classify the message type (field 0) and transmission subtype (field 1)
//! - Decode the ICAO address and the generated/logged timestamp pairs
//! - Populate the subtype-specific optional fields
//! - Format a `Message` back into a report line (`format_record`)
//!
//! Field layout (0-based):
//!
//! ```text
//!  0 message type      6 date generated   12 ground speed    18 squawk alert
//!  1 tx subtype        7 time generated   13 track           19 emergency
//!  2 session id        8 date logged      14 latitude        20 ident (SPI)
//!  3 aircraft id       9 time logged      15 longitude       21 on ground
//!  4 ICAO hex         10 call sign        16 vertical rate
//!  5 flight id        11 altitude         17 squawk
//! ```

use std::borrow::Cow;
use std::str::FromStr;

use chrono::NaiveDateTime;

use crate::types::*;

/// Number of fields in every SBS-1 report.
pub const FIELD_COUNT: usize = 22;

const MSG_TYPE: usize = 0;
const TX_TYPE: usize = 1;
const ICAO: usize = 4;
const DATE_GENERATED: usize = 6;
const TIME_GENERATED: usize = 7;
const DATE_LOGGED: usize = 8;
const TIME_LOGGED: usize = 9;
const CALLSIGN: usize = 10;
const ALTITUDE: usize = 11;
const GROUND_SPEED: usize = 12;
const TRACK: usize = 13;
const LATITUDE: usize = 14;
const LONGITUDE: usize = 15;
const VERTICAL_RATE: usize = 16;
const SQUAWK: usize = 17;
const SQUAWK_ALERT: usize = 18;
const EMERGENCY: usize = 19;
const IDENT_ACTIVE: usize = 20;
const ON_GROUND: usize = 21;

const DATETIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.f";

/// chrono resolves to nanoseconds; longer fractions are cut to this.
const MAX_FRACTION_DIGITS: usize = 9;

type Fields<'a> = [&'a str; FIELD_COUNT];

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Parse one raw report (line terminator already stripped) from `station`.
pub fn parse(station: &str, record: &[u8]) -> Result<Message> {
    let text = std::str::from_utf8(record).map_err(|_| SbsError::Encoding)?;
    parse_line(station, text)
}

/// Parse one report line from `station`.
pub fn parse_line(station: &str, line: &str) -> Result<Message> {
    let parts: Vec<&str> = line.split(',').collect();
    let fields: Fields = parts.try_into().map_err(|p: Vec<&str>| SbsError::FieldCount {
        expected: FIELD_COUNT,
        actual: p.len(),
    })?;

    let msg_type = MsgType::from_field(fields[MSG_TYPE]);
    let tx_type = if msg_type == MsgType::Transmission {
        Some(parse_subtype(fields[TX_TYPE])?)
    } else {
        None
    };

    let icao = icao_from_hex(fields[ICAO]).ok_or_else(|| SbsError::Icao(fields[ICAO].into()))?;
    let generated_at =
        parse_datetime(fields[DATE_GENERATED], fields[TIME_GENERATED], "generated")?;
    let logged_at = parse_datetime(fields[DATE_LOGGED], fields[TIME_LOGGED], "logged")?;

    let mut msg = Message::new(station, msg_type, tx_type, icao, generated_at, logged_at);

    match (msg_type, tx_type) {
        (MsgType::SelectionChange | MsgType::IdChange, _) => {
            if !fields[CALLSIGN].is_empty() {
                msg.callsign = Some(fields[CALLSIGN].to_string());
            }
        }
        (MsgType::Transmission, Some(subtype)) => {
            let tx = TxFields {
                fields: &fields,
                subtype,
            };
            tx.populate(&mut msg)?;
        }
        _ => {}
    }

    Ok(msg)
}

fn parse_subtype(s: &str) -> Result<u8> {
    match s.parse::<u8>() {
        Ok(v @ 1..=8) => Ok(v),
        _ => Err(SbsError::Subtype(s.into())),
    }
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Combine a `YYYY/MM/DD` date and `HH:MM:SS[.fraction]` time.
///
/// Some feeds append more fractional digits than nanosecond resolution;
/// the excess is dropped rather than rejected.
pub fn parse_datetime(date: &str, time: &str, which: &'static str) -> Result<NaiveDateTime> {
    let time = truncate_fraction(time);
    let combined = format!("{date} {time}");
    NaiveDateTime::parse_from_str(&combined, DATETIME_FORMAT).map_err(|_| SbsError::Timestamp {
        which,
        value: combined,
    })
}

fn truncate_fraction(time: &str) -> Cow<'_, str> {
    match time.split_once('.') {
        Some((whole, frac))
            if frac.len() > MAX_FRACTION_DIGITS && frac.is_char_boundary(MAX_FRACTION_DIGITS) =>
        {
            Cow::Owned(format!("{whole}.{}", &frac[..MAX_FRACTION_DIGITS]))
        }
        _ => Cow::Borrowed(time),
    }
}

// ---------------------------------------------------------------------------
// Transmission subtypes
// ---------------------------------------------------------------------------

struct TxFields<'a> {
    fields: &'a Fields<'a>,
    subtype: u8,
}

impl TxFields<'_> {
    /// Fill the fields this subtype carries.
    fn populate(&self, m: &mut Message) -> Result<()> {
        match self.subtype {
            // Identification
            1 => {
                let cs = self.fields[CALLSIGN];
                if !cs.is_empty() {
                    m.callsign = Some(cs.to_string());
                }
            }
            // Surface position
            2 => {
                m.altitude_ft = Some(self.required(ALTITUDE, "altitude")?);
                m.ground_speed_kts = Some(self.required(GROUND_SPEED, "ground speed")?);
                m.track_deg = Some(self.required(TRACK, "track")?);
                m.position = Some(self.location()?);
                m.on_ground = Some(self.flag(ON_GROUND));
            }
            // Airborne position
            3 => {
                m.altitude_ft = Some(self.required(ALTITUDE, "altitude")?);
                m.position = Some(self.location()?);
                m.squawk_alert = Some(self.flag(SQUAWK_ALERT));
                m.emergency = Some(self.flag(EMERGENCY));
                m.ident_active = Some(self.flag(IDENT_ACTIVE));
                m.on_ground = Some(self.flag(ON_GROUND));
            }
            // Airborne velocity; any part may be missing
            4 => {
                m.ground_speed_kts = self.optional(GROUND_SPEED, "ground speed")?;
                m.track_deg = self.optional(TRACK, "track")?;
                m.vertical_rate_fpm = self.optional(VERTICAL_RATE, "vertical rate")?;
            }
            // Surveillance altitude
            5 => {
                m.altitude_ft = Some(self.required(ALTITUDE, "altitude")?);
                m.squawk_alert = Some(self.flag(SQUAWK_ALERT));
                m.ident_active = Some(self.flag(IDENT_ACTIVE));
                m.on_ground = Some(self.flag(ON_GROUND));
            }
            // Surveillance identity
            6 => {
                m.altitude_ft = self.optional(ALTITUDE, "altitude")?;
                m.squawk = Some(self.required(SQUAWK, "squawk")?);
                m.squawk_alert = Some(self.flag(SQUAWK_ALERT));
                m.emergency = Some(self.flag(EMERGENCY));
                m.ident_active = Some(self.flag(IDENT_ACTIVE));
                m.on_ground = Some(self.flag(ON_GROUND));
            }
            // Air-to-air
            7 => {
                m.altitude_ft = Some(self.required(ALTITUDE, "altitude")?);
                m.on_ground = Some(self.flag(ON_GROUND));
            }
            // All-call reply
            8 => {
                m.on_ground = Some(self.flag(ON_GROUND));
            }
            _ => return Err(SbsError::Subtype(self.subtype.to_string())),
        }
        Ok(())
    }

    fn required<T: FromStr>(&self, idx: usize, field: &'static str) -> Result<T> {
        let raw = self.fields[idx];
        raw.parse().map_err(|_| self.error(field, raw))
    }

    fn optional<T: FromStr>(&self, idx: usize, field: &'static str) -> Result<Option<T>> {
        if self.fields[idx].is_empty() {
            return Ok(None);
        }
        self.required(idx, field).map(Some)
    }

    fn location(&self) -> Result<Location> {
        Ok(Location {
            lat: self.required(LATITUDE, "latitude")?,
            lon: self.required(LONGITUDE, "longitude")?,
        })
    }

    /// dump1090 writes `-1` for set flags, BaseStation writes `1`.
    fn flag(&self, idx: usize) -> bool {
        matches!(self.fields[idx], "1" | "-1")
    }

    fn error(&self, field: &'static str, raw: &str) -> SbsError {
        SbsError::FieldParse {
            subtype: self.subtype,
            field,
            value: raw.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Format a message as an SBS-1 report line (no terminator).
///
/// Session, aircraft and flight id fields are written as `1`. Timestamps
/// keep full sub-second precision so `parse_line` reads back the same
/// message.
pub fn format_record(m: &Message) -> String {
    fn opt<T: ToString>(v: Option<T>) -> String {
        v.map(|v| v.to_string()).unwrap_or_default()
    }
    fn flag(v: Option<bool>) -> &'static str {
        match v {
            Some(true) => "1",
            Some(false) => "0",
            None => "",
        }
    }

    let date_fmt = "%Y/%m/%d";
    let time_fmt = "%H:%M:%S%.f";
    let fields: [String; FIELD_COUNT] = [
        m.msg_type.tag().to_string(),
        opt(m.tx_type),
        "1".into(),
        "1".into(),
        icao_to_string(m.icao),
        "1".into(),
        m.generated_at.format(date_fmt).to_string(),
        m.generated_at.format(time_fmt).to_string(),
        m.logged_at.format(date_fmt).to_string(),
        m.logged_at.format(time_fmt).to_string(),
        m.callsign.clone().unwrap_or_default(),
        opt(m.altitude_ft),
        opt(m.ground_speed_kts),
        opt(m.track_deg),
        opt(m.position.map(|p| p.lat)),
        opt(m.position.map(|p| p.lon)),
        opt(m.vertical_rate_fpm),
        opt(m.squawk),
        flag(m.squawk_alert).into(),
        flag(m.emergency).into(),
        flag(m.ident_active).into(),
        flag(m.on_ground).into(),
    ];
    fields.join(",")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    const MSG3: &str = "MSG,3,1,1,4CA2B4,1,2023/01/01,12:00:00.000,2023/01/01,12:00:00.100,,35000,,,51.5074,-0.1278,,,0,0,0,0";

    fn dt(h: u32, m: u32, s: u32, ms: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_milli_opt(h, m, s, ms)
            .unwrap()
    }

    // -- Framing --

    #[test]
    fn test_parse_airborne_position() {
        let msg = parse("stn-a", MSG3.as_bytes()).unwrap();
        assert_eq!(msg.station, "stn-a");
        assert_eq!(msg.msg_type, MsgType::Transmission);
        assert_eq!(msg.tx_type, Some(3));
        assert_eq!(msg.icao, 0x4CA2B4);
        assert_eq!(msg.generated_at, dt(12, 0, 0, 0));
        assert_eq!(msg.logged_at, dt(12, 0, 0, 100));
        assert_eq!(msg.altitude_ft, Some(35000));
        assert_eq!(
            msg.position,
            Some(Location {
                lat: 51.5074,
                lon: -0.1278
            })
        );
        assert_eq!(msg.squawk_alert, Some(false));
        assert_eq!(msg.emergency, Some(false));
        assert_eq!(msg.ident_active, Some(false));
        assert_eq!(msg.on_ground, Some(false));
        assert!(msg.callsign.is_none());
        assert!(msg.squawk.is_none());
    }

    #[test]
    fn test_field_count_errors() {
        let short = "MSG,3,1,1,4CA2B4,1,2023/01/01,12:00:00.000,2023/01/01,12:00:00.100,,35000,,,51.5074,-0.1278,,,0,0,0";
        let long = format!("{MSG3},0");
        assert!(matches!(
            parse_line("s", short),
            Err(SbsError::FieldCount { expected: 22, actual: 21 })
        ));
        assert!(matches!(
            parse_line("s", &long),
            Err(SbsError::FieldCount { expected: 22, actual: 23 })
        ));
        // Content doesn't matter
        assert!(matches!(
            parse_line("s", &",".repeat(20)),
            Err(SbsError::FieldCount { actual: 21, .. })
        ));
    }

    #[test]
    fn test_non_utf8_record() {
        let mut raw = MSG3.as_bytes().to_vec();
        raw[0] = 0xFF;
        assert!(matches!(parse("s", &raw), Err(SbsError::Encoding)));
    }

    #[test]
    fn test_deterministic() {
        let a = parse_line("s", MSG3).unwrap();
        let b = parse_line("s", MSG3).unwrap();
        assert_eq!(a, b);

        let bad = MSG3.replace("35000", "35k");
        let e1 = parse_line("s", &bad).unwrap_err().to_string();
        let e2 = parse_line("s", &bad).unwrap_err().to_string();
        assert_eq!(e1, e2);
    }

    // -- Header fields --

    #[test]
    fn test_unknown_type_is_invalid_not_error() {
        let line = MSG3.replacen("MSG", "XYZ", 1);
        let msg = parse_line("s", &line).unwrap();
        assert_eq!(msg.msg_type, MsgType::Invalid);
        assert_eq!(msg.tx_type, None);
        assert!(msg.position.is_none());
    }

    #[test]
    fn test_subtype_errors() {
        for bad in ["", "x", "0", "9", "-1"] {
            let line = MSG3.replacen("MSG,3", &format!("MSG,{bad}"), 1);
            assert!(
                matches!(parse_line("s", &line), Err(SbsError::Subtype(_))),
                "subtype {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_icao_error() {
        let line = MSG3.replace("4CA2B4", "4CA2BZ");
        assert!(matches!(parse_line("s", &line), Err(SbsError::Icao(_))));
        let line = MSG3.replace("4CA2B4", "");
        assert!(matches!(parse_line("s", &line), Err(SbsError::Icao(_))));
    }

    #[test]
    fn test_timestamp_errors() {
        let line = MSG3.replacen("2023/01/01", "2023-01-01", 1);
        assert!(matches!(
            parse_line("s", &line),
            Err(SbsError::Timestamp { which: "generated", .. })
        ));
        let line = MSG3.replace("12:00:00.100", "12:00");
        assert!(matches!(
            parse_line("s", &line),
            Err(SbsError::Timestamp { which: "logged", .. })
        ));
    }

    #[test]
    fn test_excess_fraction_truncated() {
        let ts = parse_datetime("2023/01/01", "12:00:00.123456789999", "generated").unwrap();
        assert_eq!(ts.nanosecond(), 123_456_789);

        let line = MSG3.replace("12:00:00.000", "12:00:00.123456789999");
        let msg = parse_line("s", &line).unwrap();
        assert_eq!(msg.generated_at.nanosecond(), 123_456_789);
    }

    #[test]
    fn test_fraction_optional() {
        let ts = parse_datetime("2023/01/01", "12:34:56", "logged").unwrap();
        assert_eq!(ts, dt(12, 34, 56, 0));
    }

    // -- Non-transmission types --

    #[test]
    fn test_id_change_copies_callsign_only() {
        let line = "ID,,1,1,4CA2B4,1,2023/01/01,12:00:00.000,2023/01/01,12:00:00.000,BAW123  ,35000,,,,,,,,,,";
        let msg = parse_line("s", line).unwrap();
        assert_eq!(msg.msg_type, MsgType::IdChange);
        assert_eq!(msg.tx_type, None);
        assert_eq!(msg.callsign.as_deref(), Some("BAW123  "));
        assert!(msg.altitude_ft.is_none(), "ID carries no altitude");
    }

    #[test]
    fn test_status_change_stops_after_header() {
        let line = "STA,,1,1,4CA2B4,1,2023/01/01,12:00:00.000,2023/01/01,12:00:00.000,BAW123,35000,,,,,,,,,,1";
        let msg = parse_line("s", line).unwrap();
        assert_eq!(msg.msg_type, MsgType::StatusChange);
        assert!(msg.callsign.is_none());
        assert!(msg.on_ground.is_none());
    }

    // -- Transmission subtypes --

    #[test]
    fn test_subtype_1() {
        let line = "MSG,1,111,11111,AA2BC2,111111,2016/03/11,13:07:16.663,2016/03/11,13:07:16.626,UAL814  ,,,,,,,,,,,0";
        let msg = parse_line("s", line).unwrap();
        assert_eq!(msg.callsign.as_deref(), Some("UAL814  "));

        // A blank call sign is kept as an identification with no call sign.
        let blank = line.replace("UAL814  ", "");
        let msg = parse_line("s", &blank).unwrap();
        assert_eq!(msg.tx_type, Some(1));
        assert!(msg.callsign.is_none());
    }

    #[test]
    fn test_subtype_2() {
        let line = "MSG,2,1,1,400F01,1,2023/01/01,12:00:00.000,2023/01/01,12:00:00.000,,0,12.5,270.0,51.4700,-0.4543,,,,,,-1";
        let msg = parse_line("s", line).unwrap();
        assert_eq!(msg.altitude_ft, Some(0));
        assert_eq!(msg.ground_speed_kts, Some(12.5));
        assert_eq!(msg.track_deg, Some(270.0));
        assert_eq!(
            msg.position,
            Some(Location {
                lat: 51.47,
                lon: -0.4543
            })
        );
        assert_eq!(msg.on_ground, Some(true));
    }

    #[test]
    fn test_subtype_2_malformed_altitude() {
        let line = "MSG,2,1,1,400F01,1,2023/01/01,12:00:00.000,2023/01/01,12:00:00.000,,abc,12.5,270.0,51.4700,-0.4543,,,,,,0";
        match parse_line("s", line) {
            Err(SbsError::FieldParse {
                subtype,
                field,
                value,
            }) => {
                assert_eq!(subtype, 2);
                assert_eq!(field, "altitude");
                assert_eq!(value, "abc");
            }
            other => panic!("expected FieldParse, got {other:?}"),
        }
    }

    #[test]
    fn test_subtype_3_missing_position() {
        let line = MSG3.replace("51.5074", "");
        assert!(matches!(
            parse_line("s", &line),
            Err(SbsError::FieldParse { subtype: 3, field: "latitude", .. })
        ));
    }

    #[test]
    fn test_subtype_3_flags() {
        let line = MSG3.replace(",0,0,0,0", ",1,0,-1,0");
        let msg = parse_line("s", &line).unwrap();
        assert_eq!(msg.squawk_alert, Some(true));
        assert_eq!(msg.emergency, Some(false));
        assert_eq!(msg.ident_active, Some(true));
        assert_eq!(msg.on_ground, Some(false));
    }

    #[test]
    fn test_subtype_4_all_fields() {
        let line = "MSG,4,111,11111,AC1FCC,111111,2016/03/11,13:07:07.777,2016/03/11,13:07:07.713,,,316,106,,,1536,,,,,0";
        let msg = parse_line("s", line).unwrap();
        assert_eq!(msg.ground_speed_kts, Some(316.0));
        assert_eq!(msg.track_deg, Some(106.0));
        assert_eq!(msg.vertical_rate_fpm, Some(1536));
        assert!(msg.on_ground.is_none());
    }

    #[test]
    fn test_subtype_4_blank_fields_absent() {
        let line = "MSG,4,1,1,AC1FCC,1,2016/03/11,13:07:07.777,2016/03/11,13:07:07.713,,,,,,,-640,,,,,";
        let msg = parse_line("s", line).unwrap();
        assert_eq!(msg.ground_speed_kts, None);
        assert_eq!(msg.track_deg, None);
        assert_eq!(msg.vertical_rate_fpm, Some(-640));
    }

    #[test]
    fn test_subtype_4_malformed_optional() {
        let line = "MSG,4,1,1,AC1FCC,1,2016/03/11,13:07:07.777,2016/03/11,13:07:07.713,,,fast,,,,,,,,,";
        assert!(matches!(
            parse_line("s", line),
            Err(SbsError::FieldParse { subtype: 4, field: "ground speed", .. })
        ));
    }

    #[test]
    fn test_subtype_5() {
        let line = "MSG,5,1,1,4CA2B4,1,2023/01/01,12:00:00.000,2023/01/01,12:00:00.000,,36000,,,,,,,0,,1,0";
        let msg = parse_line("s", line).unwrap();
        assert_eq!(msg.altitude_ft, Some(36000));
        assert_eq!(msg.squawk_alert, Some(false));
        assert_eq!(msg.ident_active, Some(true));
        assert_eq!(msg.on_ground, Some(false));
        assert!(msg.emergency.is_none(), "subtype 5 carries no emergency flag");
    }

    #[test]
    fn test_subtype_6_optional_altitude() {
        let with_alt = "MSG,6,1,1,4CA2B4,1,2023/01/01,12:00:00.000,2023/01/01,12:00:00.000,,36000,,,,,,7700,0,1,0,0";
        let msg = parse_line("s", with_alt).unwrap();
        assert_eq!(msg.altitude_ft, Some(36000));
        assert_eq!(msg.squawk, Some(7700));
        assert_eq!(msg.emergency, Some(true));

        let without_alt = with_alt.replace("36000", "");
        let msg = parse_line("s", &without_alt).unwrap();
        assert_eq!(msg.altitude_ft, None);
        assert_eq!(msg.squawk, Some(7700));

        let no_squawk = with_alt.replace("7700", "");
        assert!(matches!(
            parse_line("s", &no_squawk),
            Err(SbsError::FieldParse { subtype: 6, field: "squawk", .. })
        ));
    }

    #[test]
    fn test_subtype_7_and_8() {
        let line = "MSG,7,1,1,4CA2B4,1,2023/01/01,12:00:00.000,2023/01/01,12:00:00.000,,12000,,,,,,,,,,0";
        let msg = parse_line("s", line).unwrap();
        assert_eq!(msg.altitude_ft, Some(12000));
        assert_eq!(msg.on_ground, Some(false));

        let line = "MSG,8,1,1,4CA2B4,1,2023/01/01,12:00:00.000,2023/01/01,12:00:00.000,,,,,,,,,,,,1";
        let msg = parse_line("s", line).unwrap();
        assert_eq!(msg.on_ground, Some(true));
        assert!(msg.altitude_ft.is_none());
    }

    // -- Formatting --

    #[test]
    fn test_format_then_parse_preserves_fields() {
        let lines = [
            MSG3.to_string(),
            "MSG,4,1,1,AC1FCC,1,2016/03/11,13:07:07.777,2016/03/11,13:07:07.713,,,316.5,106.25,,,-1536,,,,,".into(),
            "MSG,6,1,1,4CA2B4,1,2023/01/01,12:00:00.123456789,2023/01/01,12:00:00,,,,,,,,21,1,0,0,1".into(),
            "ID,,1,1,4CA2B4,1,2023/01/01,12:00:00.000,2023/01/01,12:00:00.000,BAW123,,,,,,,,,,,".into(),
            "MSG,1,111,11111,AA2BC2,111111,2016/03/11,13:07:16.663,2016/03/11,13:07:16.626,UAL814  ,,,,,,,,,,,0".into(),
            "MSG,1,111,11111,AA2BC2,111111,2016/03/11,13:07:16.663,2016/03/11,13:07:16.626,,,,,,,,,,,,0".into(),
            "MSG,2,1,1,400F01,1,2023/01/01,12:00:00.000,2023/01/01,12:00:00.000,,0,12.5,270.0,51.4700,-0.4543,,,,,,-1".into(),
            "MSG,5,1,1,406B90,1,2023/01/01,12:00:01.000,2023/01/01,12:00:01.000,,24000,,,,,,,0,,1,0".into(),
            "MSG,7,1,1,4CA2B4,1,2023/01/01,12:00:00.000,2023/01/01,12:00:00.000,,12000,,,,,,,,,,0".into(),
            "MSG,8,1,1,4CA2B4,1,2023/01/01,12:00:00.000,2023/01/01,12:00:00.000,,,,,,,,,,,,1".into(),
        ];
        for line in lines {
            let original = parse_line("s", &line).unwrap();
            let record = format_record(&original);
            let reparsed = parse_line("s", &record).unwrap();
            assert_eq!(original, reparsed, "record {record}");
        }
    }
}
