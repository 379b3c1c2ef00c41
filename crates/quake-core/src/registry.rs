use crate::analysis::transforms;
use crate::models::{
    ChartSpec, DashboardError, DashboardResult, DisplayMode, PostProcess, Summary,
    TaskDefinition, TaskId, TaskShape, TaskSource,
};

/// `time` as an SQLite datetime. All-digit values are Unix milliseconds;
/// anything else is passed through for SQLite's own date parsing.
macro_rules! event_time {
    () => {
        "(CASE WHEN time GLOB '[0-9]*' AND time NOT GLOB '*[^0-9]*' \
THEN datetime(time / 1000, 'unixepoch') ELSE time END)"
    };
}

const EVENT_SUMMARY_COLUMNS: &[&str] = &["place", "mag", "depth_km", "time"];

const ALL_TASKS: [TaskDefinition; 28] = [
    TaskDefinition {
        id: TaskId::known(1),
        title: "Top 10 Strongest Earthquakes (Magnitude)",
        shape: TaskShape::TopN,
        source: TaskSource::InMemory(transforms::strongest_events),
        columns: EVENT_SUMMARY_COLUMNS,
        display: DisplayMode::Table,
        post: None,
    },
    TaskDefinition {
        id: TaskId::known(2),
        title: "Top 10 Deepest Earthquakes",
        shape: TaskShape::TopN,
        source: TaskSource::InMemory(transforms::deepest_events),
        columns: &["place", "depth_km", "mag", "time"],
        display: DisplayMode::Table,
        post: None,
    },
    TaskDefinition {
        id: TaskId::known(3),
        title: "Shallow (<50 km) and Strong (>7.5) Earthquakes",
        shape: TaskShape::FilterCount,
        source: TaskSource::InMemory(transforms::shallow_strong_events),
        columns: EVENT_SUMMARY_COLUMNS,
        display: DisplayMode::TableWithSummary(Summary::RowCount {
            label: "Total Events",
        }),
        post: None,
    },
    TaskDefinition {
        id: TaskId::known(4),
        title: "Average Earthquake Depth per Continent",
        shape: TaskShape::Bucketing,
        source: TaskSource::InMemory(transforms::depth_by_continent),
        columns: &["continent", "avg_depth"],
        display: DisplayMode::Table,
        post: None,
    },
    TaskDefinition {
        id: TaskId::known(5),
        title: "Average Magnitude per Magnitude Type",
        shape: TaskShape::GroupAggregate,
        source: TaskSource::InMemory(transforms::magnitude_by_type),
        columns: &["Magnitude Type", "Average Magnitude"],
        display: DisplayMode::Table,
        post: None,
    },
    TaskDefinition {
        id: TaskId::known(6),
        title: "Year with Most Earthquakes",
        shape: TaskShape::GroupAggregate,
        source: TaskSource::InMemory(transforms::events_per_year),
        columns: &["Year", "Count"],
        display: DisplayMode::Table,
        post: Some(PostProcess::TakeTop(1)),
    },
    TaskDefinition {
        id: TaskId::known(7),
        title: "Month with Highest Number of Earthquakes",
        shape: TaskShape::GroupAggregate,
        source: TaskSource::Sql(
            "
SELECT
    month,
    COUNT(*) AS total_earthquakes
FROM earthquake
GROUP BY month
ORDER BY total_earthquakes DESC, month
",
        ),
        columns: &["month", "total_earthquakes"],
        display: DisplayMode::TableWithSummary(Summary::TopRow {
            key: "month",
            value: "total_earthquakes",
            lead: "Highest earthquakes occurred in",
            joiner: "with",
            unit: "events",
        }),
        post: None,
    },
    TaskDefinition {
        id: TaskId::known(8),
        title: "Day of Week with Most Earthquakes",
        shape: TaskShape::GroupAggregate,
        source: TaskSource::Sql(
            "
SELECT
    day_of_week,
    COUNT(*) AS total_earthquakes
FROM earthquake
GROUP BY day_of_week
ORDER BY total_earthquakes DESC, day_of_week
",
        ),
        columns: &["day_of_week", "total_earthquakes"],
        display: DisplayMode::TableWithSummary(Summary::TopRow {
            key: "day_of_week",
            value: "total_earthquakes",
            lead: "Most earthquakes occurred on",
            joiner: "with",
            unit: "events",
        }),
        post: None,
    },
    TaskDefinition {
        id: TaskId::known(9),
        title: "Earthquakes per Hour of Day",
        shape: TaskShape::GroupAggregate,
        source: TaskSource::Sql(concat!(
            "
SELECT
    CAST(strftime('%H', event_time) AS INTEGER) AS hour_of_day,
    COUNT(*) AS total_earthquakes
FROM (SELECT ",
            event_time!(),
            " AS event_time FROM earthquake)
WHERE strftime('%H', event_time) IS NOT NULL
GROUP BY hour_of_day
ORDER BY hour_of_day
",
        )),
        columns: &["hour_of_day", "total_earthquakes"],
        display: DisplayMode::BarChart(ChartSpec {
            key: "hour_of_day",
            value: "total_earthquakes",
        }),
        post: None,
    },
    TaskDefinition {
        id: TaskId::known(10),
        title: "Most Active Reporting Network",
        shape: TaskShape::GroupAggregate,
        source: TaskSource::InMemory(transforms::events_per_network),
        columns: &["Network", "Count"],
        display: DisplayMode::Table,
        post: Some(PostProcess::TakeTop(1)),
    },
    TaskDefinition {
        id: TaskId::known(11),
        title: "Top 5 Places with Highest Casualties / Impact",
        shape: TaskShape::GroupAggregate,
        source: TaskSource::Sql(
            "
SELECT
    place,
    SUM(sig) AS total_impact
FROM earthquake
WHERE sig IS NOT NULL
GROUP BY place
ORDER BY total_impact DESC, place
LIMIT 5
",
        ),
        columns: &["place", "total_impact"],
        display: DisplayMode::BarChart(ChartSpec {
            key: "place",
            value: "total_impact",
        }),
        post: None,
    },
    TaskDefinition {
        id: TaskId::known(12),
        title: "Average Economic Loss by Alert Level",
        shape: TaskShape::GroupAggregate,
        source: TaskSource::Sql(
            "
SELECT
    alert,
    ROUND(AVG(mag * sig), 2) AS avg_estimated_loss
FROM earthquake
WHERE alert IS NOT NULL
GROUP BY alert
ORDER BY avg_estimated_loss DESC, alert
",
        ),
        columns: &["alert", "avg_estimated_loss"],
        display: DisplayMode::BarChart(ChartSpec {
            key: "alert",
            value: "avg_estimated_loss",
        }),
        post: None,
    },
    TaskDefinition {
        id: TaskId::known(13),
        title: "Count of Reviewed vs Automatic Earthquakes",
        shape: TaskShape::GroupAggregate,
        source: TaskSource::Sql(
            "
SELECT
    status,
    COUNT(*) AS earthquake_count
FROM earthquake
GROUP BY status
ORDER BY earthquake_count DESC, status
",
        ),
        columns: &["status", "earthquake_count"],
        display: DisplayMode::BarChart(ChartSpec {
            key: "status",
            value: "earthquake_count",
        }),
        post: None,
    },
    TaskDefinition {
        id: TaskId::known(14),
        title: "Count by Earthquake Type",
        shape: TaskShape::GroupAggregate,
        source: TaskSource::Sql(
            "
SELECT
    type,
    COUNT(*) AS count
FROM earthquake
GROUP BY type
ORDER BY count DESC, type
",
        ),
        columns: &["type", "count"],
        display: DisplayMode::BarChart(ChartSpec {
            key: "type",
            value: "count",
        }),
        post: None,
    },
    TaskDefinition {
        id: TaskId::known(15),
        title: "Number of Earthquakes by Data Type",
        shape: TaskShape::GroupAggregate,
        source: TaskSource::Sql(
            r#"
SELECT
    TRIM(t.value) AS data_type,
    COUNT(*) AS count
FROM earthquake e
JOIN json_each('["' || REPLACE(e.types, ',', '","') || '"]') AS t
WHERE e.types IS NOT NULL
  AND TRIM(t.value) <> ''
GROUP BY data_type
ORDER BY count DESC, data_type
"#,
        ),
        columns: &["data_type", "count"],
        display: DisplayMode::BarChart(ChartSpec {
            key: "data_type",
            value: "count",
        }),
        post: None,
    },
    TaskDefinition {
        id: TaskId::known(16),
        title: "Events with High Station Coverage (nst > 50)",
        shape: TaskShape::FilterCount,
        source: TaskSource::Sql(
            "
SELECT
    id,
    place,
    mag,
    nst
FROM earthquake
WHERE nst > 50
ORDER BY nst DESC, id
",
        ),
        columns: &["id", "place", "mag", "nst"],
        display: DisplayMode::TableWithSummary(Summary::RowCount {
            label: "Total High-Coverage Events",
        }),
        post: None,
    },
    TaskDefinition {
        id: TaskId::known(17),
        title: "Number of Tsunamis Triggered per Year",
        shape: TaskShape::GroupAggregate,
        source: TaskSource::Sql(concat!(
            "
SELECT
    CAST(strftime('%Y', event_time) AS INTEGER) AS year,
    COUNT(*) AS tsunami_events
FROM (SELECT ",
            event_time!(),
            " AS event_time, tsunami FROM earthquake)
WHERE tsunami = 1
  AND strftime('%Y', event_time) IS NOT NULL
GROUP BY CAST(strftime('%Y', event_time) AS INTEGER)
ORDER BY year
",
        )),
        columns: &["year", "tsunami_events"],
        display: DisplayMode::LineChart(ChartSpec {
            key: "year",
            value: "tsunami_events",
        }),
        post: None,
    },
    TaskDefinition {
        id: TaskId::known(18),
        title: "Count of Earthquakes by Alert Level",
        shape: TaskShape::GroupAggregate,
        source: TaskSource::Sql(
            "
SELECT
    COALESCE(alert, 'none') AS alert_level,
    COUNT(*) AS count
FROM earthquake
GROUP BY alert_level
ORDER BY count DESC, alert_level
",
        ),
        columns: &["alert_level", "count"],
        display: DisplayMode::BarChart(ChartSpec {
            key: "alert_level",
            value: "count",
        }),
        post: None,
    },
    TaskDefinition {
        id: TaskId::known(19),
        title: "Top 5 Countries with Highest Average Earthquake Magnitude (Past 10 Years)",
        shape: TaskShape::GroupAggregate,
        source: TaskSource::Sql(concat!(
            "
SELECT
    country,
    ROUND(AVG(mag), 2) AS avg_magnitude
FROM earthquake
WHERE mag IS NOT NULL
  AND datetime(",
            event_time!(),
            ") >= datetime('now', '-10 years')
GROUP BY country
ORDER BY avg_magnitude DESC, country
LIMIT 5
",
        )),
        columns: &["country", "avg_magnitude"],
        display: DisplayMode::BarChart(ChartSpec {
            key: "country",
            value: "avg_magnitude",
        }),
        post: None,
    },
    TaskDefinition {
        id: TaskId::known(20),
        title: "Countries with Both Shallow and Deep Earthquakes in the Same Month",
        shape: TaskShape::FilterCount,
        source: TaskSource::Sql(concat!(
            "
SELECT
    country,
    CAST(strftime('%Y', event_time) AS INTEGER) AS year,
    CAST(strftime('%m', event_time) AS INTEGER) AS month
FROM (SELECT ",
            event_time!(),
            " AS event_time, country, depth_km FROM earthquake)
WHERE country IS NOT NULL
  AND strftime('%Y', event_time) IS NOT NULL
GROUP BY
    country,
    CAST(strftime('%Y', event_time) AS INTEGER),
    CAST(strftime('%m', event_time) AS INTEGER)
HAVING SUM(depth_km < 70) > 0
   AND SUM(depth_km > 300) > 0
ORDER BY country, year, month
",
        )),
        columns: &["country", "year", "month"],
        display: DisplayMode::TableWithSummary(Summary::RowCount {
            label: "Total such occurrences",
        }),
        post: None,
    },
    TaskDefinition {
        id: TaskId::known(21),
        title: "Year-over-Year Growth Rate of Earthquakes (Global)",
        shape: TaskShape::Sequential,
        source: TaskSource::Sql(concat!(
            "
WITH event_times AS (
    SELECT ",
            event_time!(),
            " AS event_time FROM earthquake
),
yearly_counts AS (
    SELECT
        CAST(strftime('%Y', event_time) AS INTEGER) AS year,
        COUNT(*) AS total_quakes
    FROM event_times
    WHERE strftime('%Y', event_time) IS NOT NULL
    GROUP BY CAST(strftime('%Y', event_time) AS INTEGER)
)
SELECT
    year,
    total_quakes,
    LAG(total_quakes) OVER (ORDER BY year) AS prev_year_quakes,
    ROUND(
        (total_quakes - LAG(total_quakes) OVER (ORDER BY year)) * 100.0
        / NULLIF(LAG(total_quakes) OVER (ORDER BY year), 0),
        2
    ) AS yoy_growth_percent
FROM yearly_counts
ORDER BY year
",
        )),
        columns: &[
            "year",
            "total_quakes",
            "prev_year_quakes",
            "yoy_growth_percent",
        ],
        display: DisplayMode::LineChart(ChartSpec {
            key: "year",
            value: "total_quakes",
        }),
        post: None,
    },
    TaskDefinition {
        id: TaskId::known(22),
        title: "Top 3 Most Seismically Active Regions",
        shape: TaskShape::GroupAggregate,
        source: TaskSource::Sql(
            "
SELECT
    country AS region,
    COUNT(*) AS quake_count,
    ROUND(AVG(mag), 2) AS avg_magnitude,
    ROUND(COUNT(*) * AVG(mag), 2) AS activity_score
FROM earthquake
WHERE mag IS NOT NULL
GROUP BY country
ORDER BY activity_score DESC, region
LIMIT 3
",
        ),
        columns: &["region", "quake_count", "avg_magnitude", "activity_score"],
        display: DisplayMode::BarChart(ChartSpec {
            key: "region",
            value: "activity_score",
        }),
        post: None,
    },
    TaskDefinition {
        id: TaskId::known(23),
        title: "Average Earthquake Depth Near the Equator (±5° Latitude)",
        shape: TaskShape::GroupAggregate,
        source: TaskSource::Sql(
            "
SELECT
    country,
    ROUND(AVG(depth_km), 2) AS avg_depth
FROM earthquake
WHERE latitude BETWEEN -5 AND 5
  AND country IS NOT NULL
GROUP BY country
ORDER BY avg_depth DESC, country
",
        ),
        columns: &["country", "avg_depth"],
        display: DisplayMode::BarChart(ChartSpec {
            key: "country",
            value: "avg_depth",
        }),
        post: None,
    },
    TaskDefinition {
        id: TaskId::known(24),
        title: "Countries with Highest Shallow-to-Deep Earthquake Ratio",
        shape: TaskShape::Ratio,
        source: TaskSource::Sql(
            "
SELECT
    country,
    SUM(depth_km < 70) AS shallow_quakes,
    SUM(depth_km > 300) AS deep_quakes,
    ROUND(
        CAST(SUM(depth_km < 70) AS REAL) / NULLIF(SUM(depth_km > 300), 0),
        2
    ) AS shallow_to_deep_ratio
FROM earthquake
WHERE country IS NOT NULL
GROUP BY country
ORDER BY shallow_to_deep_ratio DESC, country
",
        ),
        columns: &[
            "country",
            "shallow_quakes",
            "deep_quakes",
            "shallow_to_deep_ratio",
        ],
        display: DisplayMode::BarChart(ChartSpec {
            key: "country",
            value: "shallow_to_deep_ratio",
        }),
        post: None,
    },
    TaskDefinition {
        id: TaskId::known(25),
        title: "Average Magnitude Difference (Tsunami vs Non-Tsunami)",
        shape: TaskShape::ScalarDifference,
        source: TaskSource::Sql(
            "
SELECT
    ROUND(
        AVG(CASE WHEN tsunami = 1 THEN mag END) -
        AVG(CASE WHEN tsunami = 0 THEN mag END),
        2
    ) AS avg_magnitude_difference
FROM earthquake
WHERE mag IS NOT NULL
",
        ),
        columns: &["avg_magnitude_difference"],
        display: DisplayMode::Metric {
            label: "Avg Magnitude Difference",
        },
        post: Some(PostProcess::ExtractScalar("avg_magnitude_difference")),
    },
    TaskDefinition {
        id: TaskId::known(26),
        title: "Events with Lowest Data Reliability (Highest Error Score)",
        shape: TaskShape::TopN,
        source: TaskSource::Sql(
            "
SELECT
    id,
    place,
    rms,
    gap,
    ROUND((rms + gap) / 2.0, 2) AS error_score
FROM earthquake
WHERE rms IS NOT NULL
  AND gap IS NOT NULL
ORDER BY error_score DESC, id
LIMIT 10
",
        ),
        columns: &["id", "place", "rms", "gap", "error_score"],
        display: DisplayMode::BarChart(ChartSpec {
            key: "id",
            value: "error_score",
        }),
        post: None,
    },
    TaskDefinition {
        id: TaskId::known(27),
        title: "Consecutive Earthquakes Within 50 km and 1 Hour",
        shape: TaskShape::Sequential,
        source: TaskSource::InMemory(transforms::close_consecutive_pairs),
        columns: &["id", "time", "prev_time", "distance_km"],
        display: DisplayMode::TableWithSummary(Summary::RowCount {
            label: "Total close consecutive pairs",
        }),
        post: None,
    },
    TaskDefinition {
        id: TaskId::known(28),
        title: "Regions with Highest Frequency of Deep-Focus Earthquakes",
        shape: TaskShape::GroupAggregate,
        source: TaskSource::Sql(
            "
SELECT
    country,
    COUNT(*) AS deep_focus_count
FROM earthquake
WHERE depth_km > 300
  AND country IS NOT NULL
GROUP BY country
ORDER BY deep_focus_count DESC, country
",
        ),
        columns: &["country", "deep_focus_count"],
        display: DisplayMode::BarChart(ChartSpec {
            key: "country",
            value: "deep_focus_count",
        }),
        post: None,
    },
];

pub fn tasks() -> &'static [TaskDefinition] {
    &ALL_TASKS
}

/// Identifiers in declaration order.
pub fn all_ids() -> Vec<TaskId> {
    ALL_TASKS.iter().map(|definition| definition.id).collect()
}

pub fn task(id: TaskId) -> Option<&'static TaskDefinition> {
    ALL_TASKS.iter().find(|definition| definition.id == id)
}

pub fn lookup(id: TaskId) -> DashboardResult<&'static TaskDefinition> {
    task(id).ok_or_else(|| DashboardError::unknown_task(id))
}
