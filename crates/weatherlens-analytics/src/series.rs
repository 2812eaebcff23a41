//! Reshape backend rows into plot-ready columns.

use std::collections::BTreeMap;

use serde::Serialize;
use weatherlens_client::{AggregatedRow, ClusterObservation, SeasonalRecord, SpiderPoint, WeatherVariable};

/// Season names indexed by `custom_label`
pub const SEASONS: [&str; 4] = ["Spring", "Summer", "Autumn", "Winter"];

/// Display name for a centroid cluster.
///
/// The centroid job labels clusters in a different order than `custom_label`.
pub fn season_label(cluster_name: &str) -> &str {
    match cluster_name {
        "cluster_0" => "Spring",
        "cluster_1" => "Winter",
        "cluster_2" => "Summer",
        "cluster_3" => "Autumn",
        other => other,
    }
}

/// Eight-point compass bucket for a wind direction in degrees.
pub fn wind_direction(degrees: f64) -> &'static str {
    const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let normalized = degrees.rem_euclid(360.0);
    let index = ((normalized + 22.5) / 45.0).floor() as usize % POINTS.len();
    POINTS[index]
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Series {
    pub x: Vec<String>,
    pub y: Vec<f64>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    fn push(&mut self, x: impl Into<String>, y: f64) {
        self.x.push(x.into());
        self.y.push(y);
    }

    /// Minimum, mean and maximum of `y`
    pub fn summary(&self) -> Option<(f64, f64, f64)> {
        let finite: Vec<f64> = self.y.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }
        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = finite.iter().sum::<f64>() / finite.len() as f64;
        Some((min, mean, max))
    }
}

/// Temperature over time, one trace per season.
pub fn cluster_series(rows: &[ClusterObservation]) -> Vec<(&'static str, Series)> {
    SEASONS
        .iter()
        .enumerate()
        .map(|(label, &season)| {
            let mut series = Series::default();
            for row in rows.iter().filter(|r| r.custom_label == label as i64) {
                series.push(row.date.clone(), row.temp);
            }
            (season, series)
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeasonDays {
    pub seasons: Vec<String>,
    pub days: Vec<f64>,
}

/// Season/day pairs grouped by year, in input order within a year.
pub fn spider_by_year(points: &[SpiderPoint]) -> BTreeMap<i32, SeasonDays> {
    let mut years: BTreeMap<i32, SeasonDays> = BTreeMap::new();
    for point in points {
        let entry = years.entry(point.year).or_default();
        entry.seasons.push(point.season.clone());
        entry.days.push(point.days);
    }
    years
}

/// One variable against the period key, skipping rows without it.
pub fn aggregate_series(rows: &[AggregatedRow], variable: WeatherVariable) -> Series {
    let mut series = Series::default();
    for row in rows {
        if let Some(value) = row.value(variable) {
            series.push(row.key.clone(), value);
        }
    }
    series
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DecompositionSeries {
    pub dt: Vec<String>,
    pub observed: Vec<f64>,
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<f64>,
}

pub fn decomposition_series(
    records: &[SeasonalRecord],
    variable: WeatherVariable,
) -> DecompositionSeries {
    let mut out = DecompositionSeries::default();
    for record in records {
        let Some(d) = record.decomposition(variable) else {
            continue;
        };
        out.dt.push(record.dt.clone());
        out.observed.push(d.observed);
        out.trend.push(d.trend);
        out.seasonal.push(d.seasonal);
        out.residual.push(d.residual);
    }
    out
}
