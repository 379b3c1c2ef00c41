use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::models::{DashboardError, DashboardResult, QueryResult, Value};

/// Columns read from the `earthquake` table to build the base dataset.
pub const EVENT_COLUMNS: [&str; 22] = [
    "id",
    "place",
    "mag",
    "magType",
    "depth_km",
    "latitude",
    "longitude",
    "time",
    "country",
    "sig",
    "alert",
    "tsunami",
    "status",
    "net",
    "nst",
    "rms",
    "gap",
    "type",
    "types",
    "year",
    "month",
    "day_of_week",
];

/// One seismic record from the base dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub id: String,
    pub place: Option<String>,
    pub mag: Option<f64>,
    pub mag_type: Option<String>,
    pub depth_km: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub time: Option<PrimitiveDateTime>,
    pub country: Option<String>,
    pub sig: Option<f64>,
    pub alert: Option<String>,
    pub tsunami: bool,
    pub status: Option<String>,
    pub net: Option<String>,
    pub nst: Option<i64>,
    pub rms: Option<f64>,
    pub gap: Option<f64>,
    pub event_type: Option<String>,
    pub types: Option<String>,
    pub year: Option<i64>,
    pub month: Option<i64>,
    pub day_of_week: Option<String>,
}

impl Event {
    /// An event with only its identifier set.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            place: None,
            mag: None,
            mag_type: None,
            depth_km: None,
            latitude: None,
            longitude: None,
            time: None,
            country: None,
            sig: None,
            alert: None,
            tsunami: false,
            status: None,
            net: None,
            nst: None,
            rms: None,
            gap: None,
            event_type: None,
            types: None,
            year: None,
            month: None,
            day_of_week: None,
        }
    }

    /// Builds an event from row `index` of a result selected with [`EVENT_COLUMNS`].
    pub fn from_row(result: &QueryResult, index: usize) -> DashboardResult<Self> {
        let cell = |column: &str| result.value(index, column).unwrap_or(&Value::Null);

        let id = match cell("id") {
            Value::Null => {
                return Err(DashboardError::query(format!(
                    "earthquake row {index} has no id"
                )));
            }
            other => other.to_string(),
        };

        let time = match cell("time") {
            Value::Null => None,
            raw => {
                let parsed = parse_event_time(raw);
                if parsed.is_none() {
                    tracing::warn!(event = %id, time = %raw, "ignoring unparseable event time");
                }
                parsed
            }
        };

        Ok(Self {
            place: text(cell("place")),
            mag: cell("mag").as_f64(),
            mag_type: text(cell("magType")),
            depth_km: cell("depth_km").as_f64(),
            latitude: cell("latitude").as_f64(),
            longitude: cell("longitude").as_f64(),
            time,
            country: text(cell("country")),
            sig: cell("sig").as_f64(),
            alert: text(cell("alert")),
            tsunami: cell("tsunami").as_i64().is_some_and(|flag| flag != 0),
            status: text(cell("status")),
            net: text(cell("net")),
            nst: cell("nst").as_i64(),
            rms: cell("rms").as_f64(),
            gap: cell("gap").as_f64(),
            event_type: text(cell("type")),
            types: text(cell("types")),
            year: cell("year").as_i64(),
            month: cell("month").as_i64(),
            day_of_week: text(cell("day_of_week")),
            id,
        })
    }

    /// The precomputed year, or the year of `time` when that column is empty.
    pub fn year(&self) -> Option<i64> {
        self.year
            .or_else(|| self.time.map(|time| i64::from(time.year())))
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Accepts `YYYY-MM-DD HH:MM[:SS[.fff]]` with a space or `T` separator, an
/// optional `Z` or `+HH:MM` offset, a bare date, or Unix milliseconds either as
/// an integer or as all-digit text. Offset forms are normalized to UTC.
pub fn parse_event_time(value: &Value) -> Option<PrimitiveDateTime> {
    match value {
        Value::Integer(millis) => from_unix_millis(*millis),
        Value::Text(raw) => parse_time_text(raw.trim()),
        _ => None,
    }
}

fn from_unix_millis(millis: i64) -> Option<PrimitiveDateTime> {
    let nanos = i128::from(millis).checked_mul(1_000_000)?;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .map(to_utc)
}

fn to_utc(instant: OffsetDateTime) -> PrimitiveDateTime {
    let utc = instant.to_offset(UtcOffset::UTC);
    PrimitiveDateTime::new(utc.date(), utc.time())
}

fn parse_time_text(raw: &str) -> Option<PrimitiveDateTime> {
    // the TEXT column affinity stores integer milliseconds as digits
    if !raw.is_empty() && raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return from_unix_millis(raw.parse().ok()?);
    }

    if let Ok(instant) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(to_utc(instant));
    }
    let offset_formats = [
        format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
        ),
        format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]"
        ),
        format_description!(
            "[year]-[month]-[day] [hour]:[minute][offset_hour sign:mandatory]:[offset_minute]"
        ),
        format_description!(
            "[year]-[month]-[day]T[hour]:[minute][offset_hour sign:mandatory]:[offset_minute]"
        ),
    ];
    if let Some(instant) = offset_formats
        .iter()
        .find_map(|format| OffsetDateTime::parse(raw, *format).ok())
    {
        return Some(to_utc(instant));
    }

    let formats = [
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    ];
    let trimmed = raw.trim_end_matches('Z');
    formats
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(trimmed, *format).ok())
        .or_else(|| {
            Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
                .ok()
                .map(Date::midnight)
        })
}

pub fn format_event_time(time: PrimitiveDateTime) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    time.format(format).unwrap_or_else(|_| time.to_string())
}
