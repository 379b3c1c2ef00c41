//! In-memory analyses over the base dataset, used by tasks simple enough not
//! to need a round trip to the store.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::analysis::continents::continent_for;
use crate::analysis::geo::haversine_km;
use crate::analysis::numeric::{mean, round2};
use crate::models::{BaseDataset, Event, QueryResult, Value, format_event_time};

pub const TOP_EVENTS_LIMIT: usize = 10;
pub const SHALLOW_STRONG_MAX_DEPTH_KM: f64 = 50.0;
pub const SHALLOW_STRONG_MIN_MAGNITUDE: f64 = 7.5;
pub const CONSECUTIVE_MAX_GAP_MINUTES: i64 = 60;
pub const CONSECUTIVE_MAX_DISTANCE_KM: f64 = 50.0;

pub fn strongest_events(dataset: &BaseDataset) -> QueryResult {
    let mut result = QueryResult::new(&["place", "mag", "depth_km", "time"]);
    for event in top_by(dataset, |event| event.mag, TOP_EVENTS_LIMIT) {
        result.push_row(vec![
            Value::text(event.place.as_deref()),
            Value::real(event.mag),
            Value::real(event.depth_km),
            time_value(event),
        ]);
    }
    result
}

pub fn deepest_events(dataset: &BaseDataset) -> QueryResult {
    let mut result = QueryResult::new(&["place", "depth_km", "mag", "time"]);
    for event in top_by(dataset, |event| event.depth_km, TOP_EVENTS_LIMIT) {
        result.push_row(vec![
            Value::text(event.place.as_deref()),
            Value::real(event.depth_km),
            Value::real(event.mag),
            time_value(event),
        ]);
    }
    result
}

pub fn is_shallow_and_strong(event: &Event) -> bool {
    matches!(
        (event.depth_km, event.mag),
        (Some(depth), Some(mag))
            if depth < SHALLOW_STRONG_MAX_DEPTH_KM && mag > SHALLOW_STRONG_MIN_MAGNITUDE
    )
}

pub fn shallow_strong_events(dataset: &BaseDataset) -> QueryResult {
    let mut result = QueryResult::new(&["place", "mag", "depth_km", "time"]);
    for event in dataset
        .events()
        .iter()
        .filter(|event| is_shallow_and_strong(event))
    {
        result.push_row(vec![
            Value::text(event.place.as_deref()),
            Value::real(event.mag),
            Value::real(event.depth_km),
            time_value(event),
        ]);
    }
    result
}

pub fn depth_by_continent(dataset: &BaseDataset) -> QueryResult {
    let mut depths: BTreeMap<&'static str, Vec<f64>> = BTreeMap::new();
    for event in dataset.events() {
        let bucket = depths
            .entry(continent_for(event.country.as_deref()).as_str())
            .or_default();
        if let Some(depth) = event.depth_km {
            bucket.push(depth);
        }
    }

    let mut averages: Vec<(&'static str, Option<f64>)> = depths
        .into_iter()
        .map(|(continent, values)| (continent, mean(values).map(round2)))
        .collect();
    averages.sort_by(|left, right| descending_nulls_last(left.1, right.1));

    let mut result = QueryResult::new(&["continent", "avg_depth"]);
    for (continent, average) in averages {
        result.push_row(vec![continent.into(), Value::real(average)]);
    }
    result
}

pub fn magnitude_by_type(dataset: &BaseDataset) -> QueryResult {
    let mut magnitudes: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for event in dataset.events() {
        let Some(mag_type) = event.mag_type.as_deref() else {
            continue;
        };
        let bucket = magnitudes.entry(mag_type).or_default();
        if let Some(mag) = event.mag {
            bucket.push(mag);
        }
    }

    let mut result = QueryResult::new(&["Magnitude Type", "Average Magnitude"]);
    for (mag_type, values) in magnitudes {
        result.push_row(vec![mag_type.into(), Value::real(mean(values).map(round2))]);
    }
    result
}

pub fn events_per_year(dataset: &BaseDataset) -> QueryResult {
    let mut result = QueryResult::new(&["Year", "Count"]);
    for (year, count) in count_by(dataset.events(), Event::year) {
        result.push_row(vec![year.into(), count.into()]);
    }
    result
}

pub fn events_per_network(dataset: &BaseDataset) -> QueryResult {
    let mut result = QueryResult::new(&["Network", "Count"]);
    for (network, count) in count_by(dataset.events(), |event| event.net.clone()) {
        result.push_row(vec![network.into(), count.into()]);
    }
    result
}

/// Consecutive events (by time) no more than an hour and 50 km apart.
pub fn close_consecutive_pairs(dataset: &BaseDataset) -> QueryResult {
    let mut result = QueryResult::new(&["id", "time", "prev_time", "distance_km"]);
    let mut previous: Option<&Event> = None;

    for event in dataset.chronological() {
        if let Some(prior) = previous
            && let Some(distance) = consecutive_distance(prior, event)
        {
            result.push_row(vec![
                event.id.as_str().into(),
                time_value(event),
                time_value(prior),
                distance.into(),
            ]);
        }
        previous = Some(event);
    }
    result
}

/// Rounded distance between a pair that qualifies as close, else `None`.
fn consecutive_distance(prior: &Event, event: &Event) -> Option<f64> {
    let elapsed = event.time? - prior.time?;
    if elapsed.whole_minutes() > CONSECUTIVE_MAX_GAP_MINUTES {
        return None;
    }
    let distance = round2(haversine_km(prior.coordinates()?, event.coordinates()?));
    (distance <= CONSECUTIVE_MAX_DISTANCE_KM).then_some(distance)
}

/// Stable descending sort on `key`, skipping events without a value.
fn top_by(dataset: &BaseDataset, key: fn(&Event) -> Option<f64>, limit: usize) -> Vec<&Event> {
    let mut ranked: Vec<(&Event, f64)> = dataset
        .events()
        .iter()
        .filter_map(|event| key(event).map(|value| (event, value)))
        .collect();
    ranked.sort_by(|left, right| right.1.total_cmp(&left.1));
    ranked
        .into_iter()
        .take(limit)
        .map(|(event, _)| event)
        .collect()
}

/// Counts per key, most frequent first; ties in ascending key order.
fn count_by<K: Ord>(events: &[Event], key: impl Fn(&Event) -> Option<K>) -> Vec<(K, i64)> {
    let mut counts: BTreeMap<K, i64> = BTreeMap::new();
    for value in events.iter().filter_map(key) {
        *counts.entry(value).or_default() += 1;
    }
    let mut ordered: Vec<(K, i64)> = counts.into_iter().collect();
    ordered.sort_by(|left, right| right.1.cmp(&left.1));
    ordered
}

fn descending_nulls_last(left: Option<f64>, right: Option<f64>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => right.total_cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn time_value(event: &Event) -> Value {
    event
        .time
        .map(|time| Value::Text(format_event_time(time)))
        .unwrap_or(Value::Null)
}
