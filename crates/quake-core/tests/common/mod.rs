#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use quake_core::sqlite::{EARTHQUAKE_DDL, SqliteDataSource};
use rusqlite::{Connection, params};

/// A temporary earthquake database removed when dropped.
pub struct Fixture {
    path: PathBuf,
    connection: Connection,
}

impl Fixture {
    pub fn new(test_name: &str) -> Self {
        let path = temp_db_path(test_name);
        let connection = Connection::open(&path).unwrap();
        connection.execute_batch(EARTHQUAKE_DDL).unwrap();
        Self { path, connection }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn insert(&self, event: &EventRow) {
        self.connection
            .execute(
                "INSERT INTO earthquake (
                    id, place, mag, magType, depth_km, latitude, longitude, time,
                    country, sig, alert, tsunami, status, net, nst, rms, gap,
                    type, types, year, month, day_of_week
                ) VALUES (
                    ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                    ?16, ?17, ?18, ?19, ?20, ?21, ?22
                )",
                params![
                    event.id,
                    event.place,
                    event.mag,
                    event.mag_type,
                    event.depth_km,
                    event.latitude,
                    event.longitude,
                    event.time,
                    event.country,
                    event.sig,
                    event.alert,
                    i64::from(event.tsunami),
                    event.status,
                    event.net,
                    event.nst,
                    event.rms,
                    event.gap,
                    event.event_type,
                    event.types,
                    event.year,
                    event.month,
                    event.day_of_week,
                ],
            )
            .unwrap();
    }

    /// Runs raw SQL against the fixture, for rows the builder cannot express.
    pub fn execute(&self, sql: &str) {
        self.connection.execute_batch(sql).unwrap();
    }

    pub fn insert_all(&self, events: impl IntoIterator<Item = EventRow>) {
        for event in events {
            self.insert(&event);
        }
    }

    pub fn open(&self) -> SqliteDataSource {
        SqliteDataSource::open(&self.path, Some(Duration::from_secs(10))).unwrap()
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

pub fn temp_db_path(test_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("quake-{test_name}-{nanos}.sqlite3"))
}

#[derive(Clone, Debug, Default)]
pub struct EventRow {
    pub id: String,
    pub place: Option<String>,
    pub mag: Option<f64>,
    pub mag_type: Option<String>,
    pub depth_km: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub time: Option<String>,
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

impl EventRow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn place(mut self, place: &str) -> Self {
        self.place = Some(place.to_string());
        self
    }

    pub fn mag(mut self, mag: f64) -> Self {
        self.mag = Some(mag);
        self
    }

    pub fn mag_type(mut self, mag_type: &str) -> Self {
        self.mag_type = Some(mag_type.to_string());
        self
    }

    pub fn depth(mut self, depth_km: f64) -> Self {
        self.depth_km = Some(depth_km);
        self
    }

    pub fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Sets `time` and the precomputed `year` and `month` columns from it.
    pub fn time(mut self, time: &str) -> Self {
        self.year = time.get(0..4).and_then(|raw| raw.parse().ok());
        self.month = time.get(5..7).and_then(|raw| raw.parse().ok());
        self.time = Some(time.to_string());
        self
    }

    /// Sets `time` verbatim, leaving `year` and `month` empty.
    pub fn raw_time(mut self, time: &str) -> Self {
        self.time = Some(time.to_string());
        self
    }

    pub fn country(mut self, country: &str) -> Self {
        self.country = Some(country.to_string());
        self
    }

    pub fn sig(mut self, sig: f64) -> Self {
        self.sig = Some(sig);
        self
    }

    pub fn alert(mut self, alert: &str) -> Self {
        self.alert = Some(alert.to_string());
        self
    }

    pub fn tsunami(mut self) -> Self {
        self.tsunami = true;
        self
    }

    pub fn status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }

    pub fn net(mut self, net: &str) -> Self {
        self.net = Some(net.to_string());
        self
    }

    pub fn nst(mut self, nst: i64) -> Self {
        self.nst = Some(nst);
        self
    }

    pub fn quality(mut self, rms: f64, gap: f64) -> Self {
        self.rms = Some(rms);
        self.gap = Some(gap);
        self
    }

    pub fn event_type(mut self, event_type: &str) -> Self {
        self.event_type = Some(event_type.to_string());
        self
    }

    pub fn types(mut self, types: &str) -> Self {
        self.types = Some(types.to_string());
        self
    }

    pub fn day_of_week(mut self, day: &str) -> Self {
        self.day_of_week = Some(day.to_string());
        self
    }
}

/// A small catalogue that gives every task at least one row.
pub fn sample_events() -> Vec<EventRow> {
    vec![
        EventRow::new("us1000")
            .place("Near the coast of Honshu, Japan")
            .mag(7.9)
            .mag_type("mww")
            .depth(24.0)
            .at(38.3, 142.4)
            .time("2025-03-11 05:46:24")
            .country("japan")
            .sig(1200.0)
            .alert("red")
            .tsunami()
            .status("reviewed")
            .net("us")
            .nst(120)
            .quality(1.1, 18.0)
            .event_type("earthquake")
            .types("origin,phase-data,shakemap")
            .day_of_week("Tuesday"),
        EventRow::new("us1001")
            .place("Fiji region")
            .mag(6.4)
            .mag_type("mb")
            .depth(560.0)
            .at(-2.1, 178.2)
            .time("2025-03-20 12:00:00")
            .country("fiji")
            .sig(630.0)
            .alert("green")
            .status("reviewed")
            .net("us")
            .nst(80)
            .quality(0.8, 30.0)
            .event_type("earthquake")
            .types("origin,phase-data")
            .day_of_week("Thursday"),
        EventRow::new("ak2001")
            .place("Southern Alaska")
            .mag(5.1)
            .mag_type("ml")
            .depth(35.0)
            .at(61.2, -149.9)
            .time("2024-07-01 08:15:00")
            .country("usa")
            .sig(400.0)
            .status("automatic")
            .net("ak")
            .nst(40)
            .quality(0.5, 60.0)
            .event_type("earthquake")
            .types("origin")
            .day_of_week("Monday"),
        EventRow::new("us1002")
            .place("Fiji region")
            .mag(5.8)
            .mag_type("mb")
            .depth(20.0)
            .at(-3.0, 179.0)
            .time("2025-03-25 03:30:00")
            .country("fiji")
            .sig(520.0)
            .alert("yellow")
            .status("reviewed")
            .net("us")
            .nst(60)
            .quality(0.9, 25.0)
            .event_type("earthquake")
            .types("origin,shakemap")
            .day_of_week("Tuesday"),
        EventRow::new("ci3001")
            .place("Southern California")
            .mag(4.2)
            .mag_type("ml")
            .depth(8.0)
            .at(34.0, -117.0)
            .time("2023-11-05 22:10:00")
            .country("usa")
            .sig(270.0)
            .status("reviewed")
            .net("ci")
            .nst(55)
            .quality(0.2, 40.0)
            .event_type("quarry blast")
            .types("origin")
            .day_of_week("Sunday"),
    ]
}
