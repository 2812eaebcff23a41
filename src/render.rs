//! Plain-text rendering of dashboard views.

use std::collections::BTreeMap;
use std::io::{self, Write};

use weatherlens_analytics::series::{season_label, wind_direction, DecompositionSeries, SeasonDays, Series};
use weatherlens_analytics::SeasonForecast;
use weatherlens_client::{Centroid, ChartData, CorrelationMatrix, SeasonPrediction, WeatherVariable};

pub fn centroids(out: &mut impl Write, centroids: &[Centroid]) -> io::Result<()> {
    writeln!(out, "{:<12} {:<8} {:>10}", "Cluster", "Season", "Temp (°C)")?;
    for c in centroids {
        writeln!(
            out,
            "{:<12} {:<8} {:>10.2}",
            c.cluster_name,
            season_label(&c.cluster_name),
            c.temp
        )?;
    }
    Ok(())
}

pub fn predicted_temperature(out: &mut impl Write, temperature: Option<f64>) -> io::Result<()> {
    match temperature {
        Some(t) => writeln!(out, "Predicted temperature for tomorrow: {:.2}°C", t),
        None => writeln!(out, "Failed to fetch predicted temperature."),
    }
}

/// `centroids` fills the centroid column; clusters missing from it show `-`.
pub fn forecast(
    out: &mut impl Write,
    forecast: &SeasonForecast,
    centroids: &[Centroid],
) -> io::Result<()> {
    predicted_temperature(out, forecast.predicted_temperature)?;

    let probabilities = &forecast.probabilities;
    if probabilities.is_empty() {
        return writeln!(out, "Failed to fetch distances and probabilities.");
    }

    writeln!(out)?;
    writeln!(
        out,
        "{:<8} {:>10} {:>10} {:>12}",
        "Season", "Centroid", "Distance", "Probability"
    )?;
    for (cluster, distance) in &probabilities.distances {
        let p = probabilities.probabilities.get(cluster).copied().unwrap_or(0.0);
        let centroid = centroids
            .iter()
            .rev()
            .find(|c| &c.cluster_name == cluster)
            .map(|c| format!("{:.2}", c.temp))
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "{:<8} {:>10} {:>10.2} {:>11.2}%",
            season_label(cluster),
            centroid,
            distance,
            p * 100.0
        )?;
    }

    if let Some((cluster, p)) = probabilities.most_likely() {
        writeln!(out)?;
        writeln!(out, "Most likely: {} ({:.2}%)", season_label(cluster), p * 100.0)?;
    }
    Ok(())
}

pub fn season_prediction(out: &mut impl Write, prediction: &SeasonPrediction) -> io::Result<()> {
    writeln!(out, "Predicted Season: {}", prediction.season_or_unknown())
}

pub fn clusters(out: &mut impl Write, traces: &[(&str, Series)]) -> io::Result<()> {
    writeln!(
        out,
        "{:<8} {:>8} {:>9} {:>9} {:>9}",
        "Season", "Points", "Min °C", "Mean °C", "Max °C"
    )?;
    for (season, series) in traces {
        match series.summary() {
            Some((min, mean, max)) => writeln!(
                out,
                "{:<8} {:>8} {:>9.2} {:>9.2} {:>9.2}",
                season,
                series.len(),
                min,
                mean,
                max
            )?,
            None => writeln!(out, "{:<8} {:>8} {:>9} {:>9} {:>9}", season, 0, "-", "-", "-")?,
        }
    }
    Ok(())
}

pub fn correlation(out: &mut impl Write, matrix: &CorrelationMatrix) -> io::Result<()> {
    if matrix.is_empty() {
        return writeln!(out, "No correlation data.");
    }

    write!(out, "{:<12}", "")?;
    for label in &matrix.labels {
        write!(out, " {:>10}", label)?;
    }
    writeln!(out)?;

    for (label, row) in matrix.labels.iter().zip(&matrix.values) {
        write!(out, "{:<12}", label)?;
        for value in row {
            if value.is_nan() {
                write!(out, " {:>10}", "-")?;
            } else {
                write!(out, " {:>10.2}", value)?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn decomposition(
    out: &mut impl Write,
    variable: WeatherVariable,
    series: &DecompositionSeries,
) -> io::Result<()> {
    writeln!(out, "Seasonal decomposition of {} ({})", variable, variable.unit())?;
    writeln!(
        out,
        "{:<20} {:>10} {:>10} {:>10} {:>10}",
        "Time", "Observed", "Trend", "Seasonal", "Residual"
    )?;
    for i in 0..series.dt.len() {
        writeln!(
            out,
            "{:<20} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            series.dt[i], series.observed[i], series.trend[i], series.seasonal[i], series.residual[i]
        )?;
    }
    Ok(())
}

pub fn aggregates(out: &mut impl Write, variable: WeatherVariable, series: &Series) -> io::Result<()> {
    let header = format!("{} ({})", variable, variable.unit());
    if variable == WeatherVariable::WindDeg {
        writeln!(out, "{:<12} {:>12} {:>10}", "Period", header, "Direction")?;
    } else {
        writeln!(out, "{:<12} {:>12}", "Period", header)?;
    }

    for (key, value) in series.x.iter().zip(&series.y) {
        if variable == WeatherVariable::WindDeg {
            writeln!(out, "{:<12} {:>12.2} {:>10}", key, value, wind_direction(*value))?;
        } else {
            writeln!(out, "{:<12} {:>12.2}", key, value)?;
        }
    }

    if let Some((min, mean, max)) = series.summary() {
        writeln!(out)?;
        writeln!(out, "min {:.2}  mean {:.2}  max {:.2}", min, mean, max)?;
    }
    Ok(())
}

pub fn spider(out: &mut impl Write, years: &BTreeMap<i32, SeasonDays>) -> io::Result<()> {
    for (year, data) in years {
        writeln!(out, "Year {}", year)?;
        for (season, days) in data.seasons.iter().zip(&data.days) {
            writeln!(out, "  {:<8} {:>6.0} days", season, days)?;
        }
    }
    Ok(())
}

pub fn chart(out: &mut impl Write, data: &ChartData) -> io::Result<()> {
    writeln!(out, "{:<20} {:>6} {:>10} {:<10}", "Time", "Clock", "Temp °C", "Kind")?;
    for point in data.historical.iter().chain(&data.prediction) {
        let clock = chrono::DateTime::from_timestamp(point.timestamp, 0)
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| "--:--".to_string());
        let kind = match point.hour {
            Some(h) => format!("{} +{}h", point.kind, h),
            None => point.kind.clone(),
        };
        writeln!(
            out,
            "{:<20} {:>6} {:>10.1} {:<10}",
            point.time, clock, point.temperature, kind
        )?;
    }
    Ok(())
}
