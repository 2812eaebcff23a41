//! weatherlens - terminal dashboard for the weather analytics backend.

mod error_mapping;
mod render;
mod services;

use std::io::Write;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use weatherlens_analytics::series;
use weatherlens_client::{AggregatePeriod, SeasonFeatures, WeatherVariable};
use weatherlens_core::{AppError, Config, ConfigError};

use crate::error_mapping::IntoAppError;
use crate::services::AppServices;

#[derive(Debug, Parser)]
#[command(name = "weatherlens", version, about = "Weather analytics in the terminal")]
struct Cli {
    /// Clustering and prediction service URL (overrides config)
    #[arg(long, global = true)]
    analytics_url: Option<String>,

    /// Aggregation service URL (overrides config)
    #[arg(long, global = true)]
    data_url: Option<String>,

    /// Print typed JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Season cluster centroids
    Centroids,
    /// Tomorrow's temperature and season probabilities
    Forecast,
    /// Tomorrow's predicted temperature only
    PredictTemp,
    /// Classify a day's weather into a season
    PredictSeason(SeasonArgs),
    /// Temperature per season cluster
    Clusters,
    /// Correlation matrix between weather variables
    Correlation,
    /// Trend/seasonal/residual decomposition of one variable
    Seasonal {
        #[arg(long, default_value = "temp")]
        variable: WeatherVariable,
    },
    /// Daily, weekly or monthly aggregates of one variable
    Aggregates {
        /// day, week, month, resample-month or resample-week
        #[arg(long, default_value = "day")]
        period: AggregatePeriod,
        #[arg(long, default_value = "temp")]
        variable: WeatherVariable,
    },
    /// Days per season for recent years
    Spider,
    /// Recent and predicted hourly temperatures
    Chart,
    /// Show the effective configuration
    Config,
}

#[derive(Debug, Args)]
struct SeasonArgs {
    /// Temperature (°C)
    #[arg(long, allow_negative_numbers = true)]
    temp: f64,
    /// Pressure (hPa)
    #[arg(long)]
    pressure: i64,
    /// Humidity (%)
    #[arg(long)]
    humidity: i64,
    /// Cloud cover (%)
    #[arg(long)]
    clouds: i64,
    /// Visibility (m)
    #[arg(long)]
    visibility: i64,
    /// Wind speed (m/s)
    #[arg(long)]
    wind_speed: f64,
    /// Wind direction (°)
    #[arg(long)]
    wind_deg: i64,
}

impl From<SeasonArgs> for SeasonFeatures {
    fn from(args: SeasonArgs) -> Self {
        Self {
            temp: args.temp,
            pressure: args.pressure,
            humidity: args.humidity,
            clouds: args.clouds,
            visibility: args.visibility,
            wind_speed: args.wind_speed,
            wind_deg: args.wind_deg,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = weatherlens_core::init() {
        eprintln!("weatherlens: {}", e);
    }

    if let Err(err) = run(cli).await {
        tracing::error!("{}", err);
        eprintln!("weatherlens: {}", err.display_message());
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<Config, AppError> {
    let mut config = Config::load().map_err(|e| ConfigError::ParseError(format!("{:#}", e)))?;

    if let Some(url) = &cli.analytics_url {
        config.endpoints.analytics_url = url.clone();
    }
    if let Some(url) = &cli.data_url {
        config.endpoints.data_url = url.clone();
    }

    let validation = config.validate();
    for warning in &validation.warnings {
        tracing::warn!("Config warning: {}", warning);
    }
    if !validation.is_valid() {
        return Err(ConfigError::Invalid(validation.error_summary()).into());
    }

    Ok(config)
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = load_config(&cli)?;
    let services = AppServices::new(config).map_err(IntoAppError::into_app_error)?;
    let client = services.client();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let json = cli.json;

    match cli.command {
        Command::Centroids => {
            let centroids = services
                .centroids()
                .refresh()
                .await
                .map_err(IntoAppError::into_app_error)?;
            emit(&mut out, json, &centroids, |o| render::centroids(o, &centroids))?;
        }
        Command::Forecast => {
            let forecast = services.forecaster().forecast_or_empty().await;
            let centroids = services.centroids().centroids();
            emit(&mut out, json, &forecast, |o| {
                render::forecast(o, &forecast, &centroids)
            })?;
        }
        Command::PredictTemp => {
            let temperature = client
                .predict_temp_tomorrow()
                .await
                .map_err(IntoAppError::into_app_error)?;
            emit(&mut out, json, &temperature, |o| {
                render::predicted_temperature(o, temperature)
            })?;
        }
        Command::PredictSeason(args) => {
            let features = SeasonFeatures::from(args);
            let prediction = client
                .predict_season_for_day(&features)
                .await
                .map_err(IntoAppError::into_app_error)?;
            emit(&mut out, json, &prediction, |o| {
                render::season_prediction(o, &prediction)
            })?;
        }
        Command::Clusters => {
            let rows = client
                .get_cluster_data()
                .await
                .map_err(IntoAppError::into_app_error)?;
            let traces = series::cluster_series(&rows);
            emit(&mut out, json, &traces, |o| render::clusters(o, &traces))?;
        }
        Command::Correlation => {
            let matrix = client
                .get_correlation()
                .await
                .map_err(IntoAppError::into_app_error)?;
            emit(&mut out, json, &matrix, |o| render::correlation(o, &matrix))?;
        }
        Command::Seasonal { variable } => {
            let records = client
                .get_seasonal()
                .await
                .map_err(IntoAppError::into_app_error)?;
            let decomposition = series::decomposition_series(&records, variable);
            emit(&mut out, json, &decomposition, |o| {
                render::decomposition(o, variable, &decomposition)
            })?;
        }
        Command::Aggregates { period, variable } => {
            let rows = client
                .get_aggregates(period)
                .await
                .map_err(IntoAppError::into_app_error)?;
            let values = series::aggregate_series(&rows, variable);
            emit(&mut out, json, &values, |o| render::aggregates(o, variable, &values))?;
        }
        Command::Spider => {
            let points = client.get_spider().await.map_err(IntoAppError::into_app_error)?;
            let years = series::spider_by_year(&points);
            emit(&mut out, json, &years, |o| render::spider(o, &years))?;
        }
        Command::Chart => {
            let chart = client
                .get_prediction_chart()
                .await
                .map_err(IntoAppError::into_app_error)?;
            emit(&mut out, json, &chart, |o| render::chart(o, &chart))?;
        }
        Command::Config => {
            let path = Config::config_path()?;
            writeln!(out, "# {}", path.display())?;
            emit(&mut out, true, services.config(), |_| Ok(()))?;
            for warning in &services.config().validate().warnings {
                writeln!(out, "# warning: {}", warning)?;
            }
        }
    }

    out.flush()?;
    Ok(())
}

/// Write `value` as pretty JSON, or render it as text.
fn emit<W, T, F>(out: &mut W, json: bool, value: &T, text: F) -> Result<(), AppError>
where
    W: Write,
    T: Serialize + ?Sized,
    F: FnOnce(&mut W) -> std::io::Result<()>,
{
    if json {
        let encoded = serde_json::to_string_pretty(value).map_err(anyhow::Error::from)?;
        writeln!(out, "{}", encoded)?;
    } else {
        text(out)?;
    }
    Ok(())
}
