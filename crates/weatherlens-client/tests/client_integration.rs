//! Integration tests for AnalyticsClient using wiremock.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::time::Duration;

use weatherlens_client::{
    AggregatePeriod, AnalyticsClient, ClientError, ClientSettings, RetryConfig, SeasonFeatures,
    WeatherVariable,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> AnalyticsClient {
    client_with_retry(server, RetryConfig::new(2, 1, 5))
}

fn client_with_retry(server: &MockServer, retry: RetryConfig) -> AnalyticsClient {
    AnalyticsClient::new(ClientSettings {
        analytics_url: format!("{}/api", server.uri()),
        data_url: server.uri(),
        timeout: Duration::from_secs(5),
        retry,
    })
    .unwrap()
}

fn season_features() -> SeasonFeatures {
    SeasonFeatures {
        temp: 31.2,
        pressure: 1008,
        humidity: 70,
        clouds: 20,
        visibility: 10000,
        wind_speed: 4.1,
        wind_deg: 135,
    }
}

#[tokio::test]
async fn test_get_centroids_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/get_centroids"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "cluster_name": "cluster_0", "temp": 24.5, "scaled_temp": 0.1 },
            { "cluster_name": "cluster_1", "temp": 17.0, "scaled_temp": -1.2 },
        ])))
        .mount(&server)
        .await;

    let centroids = client_for(&server).get_centroids().await.unwrap();

    assert_eq!(centroids.len(), 2);
    assert_eq!(centroids[0].cluster_name, "cluster_0");
    assert_eq!(centroids[1].temp, 17.0);
}

#[tokio::test]
async fn test_get_centroids_wrong_shape() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/get_centroids"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status": "ok", "data_cluster": [] })),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).get_centroids().await.unwrap_err();
    assert!(
        matches!(err, ClientError::Schema { ref endpoint, .. } if endpoint == "get_centroids"),
        "unexpected error: {}",
        err
    );
}

#[tokio::test]
async fn test_not_found_is_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/get_spider"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such route"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).get_spider().await.unwrap_err();
    match err {
        ClientError::Status { status, body, .. } => {
            assert_eq!(status, 404);
            assert_eq!(body, "no such route");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_retry_on_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/get_spider"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/get_spider"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "season": "Summer", "days": 98, "year": 2024 }
        ])))
        .mount(&server)
        .await;

    let points = client_for(&server).get_spider().await.unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].season, "Summer");
}

#[tokio::test]
async fn test_server_error_after_retries_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/get_spider"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let err = client_for(&server).get_spider().await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_no_retry_when_disabled() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/get_spider"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_retry(&server, RetryConfig::none());
    assert!(client.get_spider().await.is_err());
}

#[tokio::test]
async fn test_predict_temp_tomorrow() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/predict-temp-tomorrow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "temperature_tomorrow": 27.3 })),
        )
        .mount(&server)
        .await;

    let temp = client_for(&server).predict_temp_tomorrow().await.unwrap();
    assert_eq!(temp, Some(27.3));
}

#[tokio::test]
async fn test_predict_temp_tomorrow_null() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/predict-temp-tomorrow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "temperature_tomorrow": null })),
        )
        .mount(&server)
        .await;

    let temp = client_for(&server).predict_temp_tomorrow().await.unwrap();
    assert_eq!(temp, None);
}

#[tokio::test]
async fn test_predict_temp_tomorrow_zero_is_a_value() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/predict-temp-tomorrow"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "temperature_tomorrow": 0.0 })),
        )
        .mount(&server)
        .await;

    let temp = client_for(&server).predict_temp_tomorrow().await.unwrap();
    assert_eq!(temp, Some(0.0));
}

#[tokio::test]
async fn test_predict_season_for_day_posts_features() {
    let server = MockServer::start().await;
    let features = season_features();

    Mock::given(method("POST"))
        .and(path("/api/predict-season-for-day"))
        .and(body_json(serde_json::json!({
            "temp": 31.2,
            "pressure": 1008,
            "humidity": 70,
            "clouds": 20,
            "visibility": 10000,
            "wind_speed": 4.1,
            "wind_deg": 135
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "season": "Summer" })))
        .expect(1)
        .mount(&server)
        .await;

    let prediction = client_for(&server)
        .predict_season_for_day(&features)
        .await
        .unwrap();
    assert_eq!(prediction.season_or_unknown(), "Summer");
}

#[tokio::test]
async fn test_predict_season_for_day_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/predict-season-for-day"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .predict_season_for_day(&season_features())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_predict_season_rejects_invalid_input_locally() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/predict-season-for-day"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut features = season_features();
    features.wind_deg = 400;
    let err = client_for(&server)
        .predict_season_for_day(&features)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidInput(_)));
}

#[tokio::test]
async fn test_get_aggregates_weekly() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/filterWeek"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "year_week": "2024-W1", "temp": 18.2, "humidity": 77.5, "wind_deg": 90.0 },
            { "year_week": "2024-W2", "temp": 19.0, "humidity": 80.1, "wind_deg": 45.0 },
        ])))
        .mount(&server)
        .await;

    let rows = client_for(&server)
        .get_aggregates(AggregatePeriod::Week)
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].key, "2024-W2");
    assert_eq!(rows[1].value(WeatherVariable::Humidity), Some(80.1));
    assert_eq!(rows[0].value(WeatherVariable::Pressure), None);
}

#[tokio::test]
async fn test_get_aggregates_missing_key_is_schema_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/filterDay"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([{ "month": "2024-01" }])),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_aggregates(AggregatePeriod::Day)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("date"), "{}", err);
}

#[tokio::test]
async fn test_get_correlation() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/correlation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "temp": 1.0, "pressure": -0.6 },
            { "temp": -0.6, "pressure": 1.0 },
        ])))
        .mount(&server)
        .await;

    let matrix = client_for(&server).get_correlation().await.unwrap();
    assert_eq!(matrix.labels, vec!["temp", "pressure"]);
    assert_eq!(matrix.get("temp", "pressure"), Some(-0.6));
}

#[tokio::test]
async fn test_get_seasonal_rejects_partial_records() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/seasonal"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "dt": "2024-01-01", "observed_temp": 20.0 }
        ])))
        .mount(&server)
        .await;

    let err = client_for(&server).get_seasonal().await.unwrap_err();
    assert!(matches!(err, ClientError::Schema { .. }));
}

#[tokio::test]
async fn test_get_cluster_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/data_cluster"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "dt": 1733356800,
            "temp": 22.4,
            "pressure": 1012,
            "humidity": 81,
            "clouds": 75,
            "visibility": null,
            "wind_speed": 2.6,
            "wind_deg": 60,
            "date": "2024-12-05T00:00:00",
            "month": 12,
            "scaled_temp": -0.42,
            "kmean_label": 1,
            "custom_label": 3
        }])))
        .mount(&server)
        .await;

    let rows = client_for(&server).get_cluster_data().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].custom_label, 3);
    assert_eq!(rows[0].visibility, None);
}

#[tokio::test]
async fn test_prediction_chart_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/prediction_chart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "data": {
                "historical": [
                    { "timestamp": 1733396400, "temperature": 23.4, "time": "2024-12-05 11:00:00", "type": "historical" }
                ],
                "prediction": [
                    { "timestamp": 1733400000, "temperature": 24.0, "time": "2024-12-05 12:00:00", "type": "predicted", "hour": 1 }
                ]
            },
            "message": "Retrieved 1 historical and 1 prediction records"
        })))
        .mount(&server)
        .await;

    let chart = client_for(&server).get_prediction_chart().await.unwrap();
    assert_eq!(chart.historical.len(), 1);
    assert_eq!(chart.prediction[0].hour, Some(1));
}

#[tokio::test]
async fn test_prediction_chart_failure_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/prediction_chart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "error",
            "message": "no predictions yet"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).get_prediction_chart().await.unwrap_err();
    match err {
        ClientError::Api { message, .. } => assert_eq!(message, "no predictions yet"),
        other => panic!("expected api error, got {:?}", other),
    }
}
