use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Weather variables reported by the backend, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherVariable {
    Temp,
    Pressure,
    Humidity,
    Clouds,
    Visibility,
    WindSpeed,
    WindDeg,
}

impl WeatherVariable {
    pub const ALL: [WeatherVariable; 7] = [
        Self::Temp,
        Self::Pressure,
        Self::Humidity,
        Self::Clouds,
        Self::Visibility,
        Self::WindSpeed,
        Self::WindDeg,
    ];

    /// Field name used by the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temp => "temp",
            Self::Pressure => "pressure",
            Self::Humidity => "humidity",
            Self::Clouds => "clouds",
            Self::Visibility => "visibility",
            Self::WindSpeed => "wind_speed",
            Self::WindDeg => "wind_deg",
        }
    }

    /// Unit suffix for display
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Temp => "°C",
            Self::Pressure => "hPa",
            Self::Humidity | Self::Clouds => "%",
            Self::Visibility => "km",
            Self::WindSpeed => "m/s",
            Self::WindDeg => "°",
        }
    }
}

impl fmt::Display for WeatherVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeatherVariable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown weather variable '{}', expected one of: {}",
                    s,
                    Self::ALL.map(|v| v.as_str()).join(", ")
                )
            })
    }
}

/// Cluster centroid produced by the backend's clustering job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub cluster_name: String,
    /// Representative temperature in °C
    pub temp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaled_temp: Option<f64>,
    #[serde(
        default,
        deserialize_with = "optional_key",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,
}

impl Centroid {
    pub fn new(cluster_name: impl Into<String>, temp: f64) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            temp,
            scaled_temp: None,
            date: None,
        }
    }
}

/// One observation labelled with its season cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterObservation {
    pub dt: i64,
    pub temp: f64,
    pub pressure: i64,
    pub humidity: i64,
    pub clouds: i64,
    pub visibility: Option<i64>,
    pub wind_speed: f64,
    pub wind_deg: i64,
    #[serde(deserialize_with = "key_string")]
    pub date: String,
    pub month: u32,
    pub scaled_temp: f64,
    pub kmean_label: i64,
    pub custom_label: i64,
}

const DIAGONAL_TOLERANCE: f64 = 1e-6;

/// Square correlation matrix over weather variables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// Row-major; `values[i][j]` correlates `labels[i]` with `labels[j]`.
    /// Missing correlations (`null`) are `NaN`.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Build a matrix from the backend's row records.
    ///
    /// Each row must carry the same set of columns and there must be one row
    /// per column. Known variables are ordered as in [`WeatherVariable::ALL`];
    /// unknown columns follow in name order.
    ///
    /// Rows carry no label of their own, so they are taken to arrive in that
    /// same order. The diagonal is checked to hold: every self-correlation must
    /// be 1 or missing.
    pub fn from_rows(rows: Vec<Map<String, Value>>) -> Result<Self, String> {
        let Some(first) = rows.first() else {
            return Ok(Self {
                labels: Vec::new(),
                values: Vec::new(),
            });
        };

        let mut labels: Vec<String> = first.keys().cloned().collect();
        labels.sort_by_key(|label| {
            let rank = label
                .parse::<WeatherVariable>()
                .map(|v| v as usize)
                .unwrap_or(usize::MAX);
            (rank, label.clone())
        });

        if rows.len() != labels.len() {
            return Err(format!(
                "expected {} rows for {} columns, got {}",
                labels.len(),
                labels.len(),
                rows.len()
            ));
        }

        let mut values = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if row.len() != labels.len() {
                return Err(format!(
                    "row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    labels.len()
                ));
            }
            let mut cells = Vec::with_capacity(labels.len());
            for label in &labels {
                let cell = row
                    .get(label)
                    .ok_or_else(|| format!("row {} is missing column '{}'", i, label))?;
                cells.push(number_or_nan(cell).ok_or_else(|| {
                    format!("row {} column '{}' is not a number: {}", i, label, cell)
                })?);
            }
            values.push(cells);
        }

        for (i, label) in labels.iter().enumerate() {
            let diagonal = values[i][i];
            if !diagonal.is_nan() && (diagonal - 1.0).abs() > DIAGONAL_TOLERANCE {
                return Err(format!(
                    "row {} does not belong to column '{}': self-correlation is {}",
                    i, label, diagonal
                ));
            }
        }

        Ok(Self { labels, values })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Correlation between two named columns
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == row)?;
        let j = self.labels.iter().position(|l| l == column)?;
        Some(self.values[i][j])
    }
}

/// Observed/trend/seasonal/residual components at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Decomposition {
    pub observed: f64,
    pub trend: f64,
    pub seasonal: f64,
    pub residual: f64,
}

/// Seasonal decomposition of every weather variable at one timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeasonalRecord")]
pub struct SeasonalRecord {
    pub dt: String,
    pub components: BTreeMap<WeatherVariable, Decomposition>,
}

impl SeasonalRecord {
    pub fn decomposition(&self, variable: WeatherVariable) -> Option<&Decomposition> {
        self.components.get(&variable)
    }
}

#[derive(Deserialize)]
struct RawSeasonalRecord {
    #[serde(deserialize_with = "key_string")]
    dt: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl TryFrom<RawSeasonalRecord> for SeasonalRecord {
    type Error = String;

    fn try_from(raw: RawSeasonalRecord) -> Result<Self, Self::Error> {
        let component = |prefix: &str, variable: WeatherVariable| -> Result<f64, String> {
            let name = format!("{}_{}", prefix, variable.as_str());
            let value = raw
                .fields
                .get(&name)
                .ok_or_else(|| format!("missing field `{}`", name))?;
            number_or_nan(value).ok_or_else(|| format!("field `{}` is not a number", name))
        };

        let mut components = BTreeMap::new();
        for variable in WeatherVariable::ALL {
            components.insert(
                variable,
                Decomposition {
                    observed: component("observed", variable)?,
                    trend: component("trend", variable)?,
                    seasonal: component("seasonal", variable)?,
                    residual: component("residual", variable)?,
                },
            );
        }

        Ok(Self {
            dt: raw.dt,
            components,
        })
    }
}

/// Aggregation endpoints exposed by the data service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatePeriod {
    /// Daily means
    Day,
    /// ISO-week means
    Week,
    /// Calendar-month means
    Month,
    /// Calendar-month medians
    ResampleMonth,
    /// ISO-week medians
    ResampleWeek,
}

impl AggregatePeriod {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Day => "filterDay",
            Self::Week => "filterWeek",
            Self::Month => "filterMonth",
            Self::ResampleMonth => "resampleMonth",
            Self::ResampleWeek => "resampleWeek",
        }
    }

    /// Name of the column carrying the period key
    pub fn key_field(&self) -> &'static str {
        match self {
            Self::Day => "date",
            Self::Week | Self::ResampleWeek => "year_week",
            Self::Month | Self::ResampleMonth => "month",
        }
    }
}

impl FromStr for AggregatePeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(Self::Day),
            "week" | "weekly" => Ok(Self::Week),
            "month" | "monthly" => Ok(Self::Month),
            "resample-month" | "resample_month" => Ok(Self::ResampleMonth),
            "resample-week" | "resample_week" => Ok(Self::ResampleWeek),
            other => Err(format!("unknown aggregation period '{}'", other)),
        }
    }
}

/// One aggregated row keyed by day, week or month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRow {
    pub key: String,
    pub values: BTreeMap<WeatherVariable, f64>,
}

impl AggregatedRow {
    /// Parse a row, reading the period key from `key_field`.
    ///
    /// Variables that are absent or `null` are left out; anything else that
    /// is not a number is rejected.
    pub fn from_map(mut row: Map<String, Value>, key_field: &str) -> Result<Self, String> {
        let key = match row.remove(key_field) {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => return Err(format!("`{}` is not a string: {}", key_field, other)),
            None => return Err(format!("missing field `{}`", key_field)),
        };

        let mut values = BTreeMap::new();
        for variable in WeatherVariable::ALL {
            match row.get(variable.as_str()) {
                None | Some(Value::Null) => {}
                Some(Value::Number(n)) => {
                    if let Some(v) = n.as_f64() {
                        values.insert(variable, v);
                    }
                }
                Some(other) => {
                    return Err(format!("`{}` is not a number: {}", variable, other));
                }
            }
        }

        Ok(Self { key, values })
    }

    pub fn value(&self, variable: WeatherVariable) -> Option<f64> {
        self.values.get(&variable).copied()
    }
}

/// Response of `/predict-temp-tomorrow`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureForecast {
    #[serde(default)]
    pub temperature_tomorrow: Option<f64>,
}

/// Weather features submitted for season classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonFeatures {
    /// °C
    pub temp: f64,
    /// hPa
    pub pressure: i64,
    /// %
    pub humidity: i64,
    /// %
    pub clouds: i64,
    /// metres
    pub visibility: i64,
    /// m/s
    pub wind_speed: f64,
    /// degrees
    pub wind_deg: i64,
}

impl SeasonFeatures {
    /// Check ranges before the request leaves the client
    pub fn validate(&self) -> Result<(), String> {
        if !self.temp.is_finite() {
            return Err("temp must be a finite number".to_string());
        }
        if !self.wind_speed.is_finite() || self.wind_speed < 0.0 {
            return Err("wind_speed must be a non-negative number".to_string());
        }
        if self.pressure < 0 {
            return Err("pressure cannot be negative".to_string());
        }
        if self.visibility < 0 {
            return Err("visibility cannot be negative".to_string());
        }
        if !(0..=100).contains(&self.humidity) {
            return Err("humidity must be between 0 and 100".to_string());
        }
        if !(0..=100).contains(&self.clouds) {
            return Err("clouds must be between 0 and 100".to_string());
        }
        if !(0..=360).contains(&self.wind_deg) {
            return Err("wind_deg must be between 0 and 360".to_string());
        }
        Ok(())
    }
}

/// Response of `/predict-season-for-day`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonPrediction {
    #[serde(default)]
    pub season: Option<String>,
}

impl SeasonPrediction {
    /// Predicted season, or `"Unknown"` when the backend gave none
    pub fn season_or_unknown(&self) -> &str {
        self.season
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("Unknown")
    }
}

/// Days spent in a season during a year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpiderPoint {
    pub season: String,
    pub days: f64,
    pub year: i32,
}

/// Response of `/prediction_chart`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionChart {
    pub status: String,
    #[serde(default)]
    pub data: ChartData,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub historical: Vec<ChartPoint>,
    #[serde(default)]
    pub prediction: Vec<ChartPoint>,
}

/// A historical or predicted temperature reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub timestamp: i64,
    pub temperature: f64,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Hours ahead, for predicted points
    #[serde(default)]
    pub hour: Option<u32>,
}

fn number_or_nan(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(f64::NAN),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Accept either a string or a number for date-like keys.
fn key_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Key {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Key::deserialize(deserializer)? {
        Key::Text(s) => s,
        Key::Number(n) => n.to_string(),
    })
}

fn optional_key<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "key_string")] String);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|w| w.0))
}
