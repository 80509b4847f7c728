/// Client tests against a mocked prediction service

use rust_churn_api::integrations::client::{ChurnApiClient, ClientError};
use rust_churn_api::dashboard::default_profile;
use rust_churn_api::risk::RiskLevel;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ChurnApiClient {
    ChurnApiClient::new(server.uri(), Duration::from_millis(500)).unwrap()
}

#[tokio::test]
async fn test_predict_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(body_partial_json(json!({
            "CreditScore": 650,
            "Geography": "France",
            "HasCrCard": 1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "churn_probability": 0.0911,
            "churn_percentage": 9.11,
            "risk_level": "Low Risk",
            "recommended_action": "Customer likely to stay"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server)
        .predict(&default_profile())
        .await
        .unwrap();

    assert_eq!(result.churn_probability, 0.0911);
    assert_eq!(result.churn_percentage, 9.11);
    assert_eq!(result.risk_level, RiskLevel::Low);
}

#[tokio::test]
async fn test_predict_validation_error_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "error": "Age: must be between 1 and 120",
            "field": "Age"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .predict(&default_profile())
        .await
        .unwrap_err();

    match err {
        ClientError::Rejected {
            status,
            message,
            field,
        } => {
            assert_eq!(status, 422);
            assert!(message.contains("Age"));
            assert_eq!(field.as_deref(), Some("Age"));
        }
        other => panic!("expected Rejected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_predict_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "Internal server error"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .predict(&default_profile())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ClientError::Server {
            status: 500,
            message: "Internal server error".to_string()
        }
    );
}

#[tokio::test]
async fn test_predict_timeout_is_unreachable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .predict(&default_profile())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Unreachable(_)), "{:?}", err);
}

#[tokio::test]
async fn test_connection_refused_is_unreachable() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let client =
        ChurnApiClient::new(format!("http://127.0.0.1:{}", port), Duration::from_millis(500))
            .unwrap();
    let err = client.predict(&default_profile()).await.unwrap_err();

    assert!(matches!(err, ClientError::Unreachable(_)), "{:?}", err);
}

#[tokio::test]
async fn test_malformed_success_body_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .predict(&default_profile())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::InvalidResponse(_)), "{:?}", err);
}

#[tokio::test]
async fn test_health_and_feature_preview() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "service": "rust-churn-api",
            "version": "0.1.0"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/features"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "BalancePerProduct": 20000.0,
            "IsSenior": 0,
            "CreditRisk": 1
        })))
        .mount(&server)
        .await;

    let client = ChurnApiClient::new(format!("{}/", server.uri()), Duration::from_secs(1)).unwrap();
    assert_eq!(client.base_url(), server.uri());

    assert_eq!(client.health().await.unwrap(), "healthy");

    let features = client.preview_features(&default_profile()).await.unwrap();
    assert_eq!(features.balance_per_product, 20000.0);
    assert_eq!(features.is_senior, 0);
    assert_eq!(features.credit_risk, 1);
}
