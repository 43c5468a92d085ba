use axum::http::StatusCode;
use rota_api::middleware::error_handling::map_error;
use rota_core::errors::RotaError;
use rstest::rstest;

#[rstest]
#[case(RotaError::NotFound("Rota not found".to_string()), StatusCode::NOT_FOUND)]
#[case(RotaError::Validation("Invalid input".to_string()), StatusCode::BAD_REQUEST)]
#[case(RotaError::Conflict("Drafts already exist".to_string()), StatusCode::CONFLICT)]
#[case(RotaError::Database(eyre::eyre!("Database error")), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_error_status_mapping(#[case] error: RotaError, #[case] expected: StatusCode) {
    let response = map_error(error);

    assert_eq!(response.status(), expected);
}

#[tokio::test]
async fn test_error_handling_internal() {
    let error = RotaError::Internal(Box::new(std::io::Error::new(
        std::io::ErrorKind::Other,
        "Internal error",
    )));

    let response = map_error(error);

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_error_body_carries_message() {
    let response = map_error(RotaError::NotFound("Rota 42 not found".to_string()));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["error"], "Resource not found: Rota 42 not found");
}
