// [tests/mirror/apps/coordinator/handlers/error_shaping.test.rs]
/**
 * =================================================================
 * APARATO: ERROR SHAPING CERTIFICATION (V2.0 - TAXONOMY EVIDENCE)
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L3-MIRROR)
 * RESPONSABILIDAD: MAPEO 1:1 DE LA TAXONOMÍA DE FALLOS A HTTP
 * =================================================================
 */

use axum::http::StatusCode;
use axum::response::IntoResponse;

use vigil_coordinator::errors::ApiError;
use vigil_domain_contracts::ValidationError;
use vigil_infra_db::DbError;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn certify_status_code_matrix() {
    println!("\n🧪 [PROVING_GROUNDS]: Validating the HTTP error taxonomy matrix...");

    let matrix: Vec<(ApiError, StatusCode, &str)> = vec![
        (
            ApiError::Validation { field: "motion_score".into(), reason: "must not be negative".into() },
            StatusCode::BAD_REQUEST,
            "validation",
        ),
        (ApiError::NotFound("gone".into()), StatusCode::NOT_FOUND, "not_found"),
        (ApiError::Conflict("sealed".into()), StatusCode::CONFLICT, "conflict"),
        (
            ApiError::ConstraintViolation("unique".into()),
            StatusCode::UNPROCESSABLE_ENTITY,
            "constraint_violation",
        ),
        (ApiError::Unavailable("pool".into()), StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
    ];

    for (fault, expected_status, expected_kind) in matrix {
        let response = fault.into_response();
        assert_eq!(response.status(), expected_status);
        let body = body_json(response).await;
        assert_eq!(body["error"], expected_kind);
        assert!(body["message"].as_str().is_some());
    }

    println!("   ✅ [VERDICT]: Taxonomy matrix certified.");
}

#[tokio::test]
async fn certify_validation_carries_field_name() {
    let fault: ApiError = ValidationError::new("path", "absolute paths are forbidden").into();
    let response = fault.into_response();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["field"], "path");
}

#[tokio::test]
async fn certify_internal_carries_opaque_correlation() {
    let fault = ApiError::internal("synthetic collapse for certification");
    let response = fault.into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "internal");

    // El detalle interno jamás viaja en el cable; sólo la correlación opaca.
    let correlation = body["correlation_id"].as_str().unwrap();
    assert!(!correlation.is_empty());
    assert!(!body["message"].as_str().unwrap().contains("synthetic"));
}

#[tokio::test]
async fn certify_store_taxonomy_conversion() {
    let conversions: Vec<(DbError, StatusCode)> = vec![
        (DbError::NotFound, StatusCode::NOT_FOUND),
        (DbError::Conflict("x".into()), StatusCode::CONFLICT),
        (DbError::ConstraintViolation("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
        (DbError::Unavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
        (DbError::Mapping("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        (DbError::ClaimLost, StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (store_fault, expected_status) in conversions {
        let api_fault: ApiError = store_fault.into();
        assert_eq!(api_fault.into_response().status(), expected_status);
    }
}
