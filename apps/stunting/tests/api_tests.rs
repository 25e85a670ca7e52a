//! Integration tests for the HTTP API.
//!
//! Runs the full router in-process with axum-test and a pinned reference date.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::NaiveDate;
use serde_json::{Value, json};
use std::sync::Arc;
use stunting::api::{AppState, router};
use stunting::config::ServerConfig;
use stunting_core::StandardsTable;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn server() -> TestServer {
    let config = ServerConfig {
        rate_limit_per_second: 0,
        ..ServerConfig::default()
    };
    let table = Arc::new(StandardsTable::who_default().unwrap());
    let state = AppState::new(table, &config)
        .unwrap()
        .with_today(NaiveDate::from_ymd_opt(2026, 10, 10).unwrap());
    TestServer::new(router(state)).unwrap()
}

// =============================================================================
// HEALTH
// =============================================================================

#[tokio::test]
async fn test_health() {
    let response = server().get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["indicator"], "height_for_age");
    assert_eq!(body["rows"], 122);
}

// =============================================================================
// ASSESS
// =============================================================================

#[tokio::test]
async fn test_assess_median_child_is_normal() {
    let response = server()
        .post("/api/stunting/assess")
        .json(&json!({"gender": "boys", "height": 87.1, "birth_date": "2024-10-10"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["gender"], "male");
    assert_eq!(body["age_months"], 24);
    assert_eq!(body["haz_score"], 0.0);
    assert_eq!(body["status"], "normal");
    assert_eq!(body["median_height"], 87.1);
    assert_eq!(body["standards"]["sd2neg"], 81.0);
    assert_eq!(body["interpretation"]["color"], "green");
    assert_eq!(body["reference_date"], "2026-10-10");
}

#[tokio::test]
async fn test_assess_severely_stunted() {
    let response = server()
        .post("/api/stunting/assess")
        .json(&json!({"gender": "boys", "height": 75.0, "birth_date": "2024-10-10"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "severely_stunted");
    assert_eq!(body["interpretation"]["color"], "red");
    assert!(body["haz_score"].as_f64().unwrap() < -3.0);
}

#[tokio::test]
async fn test_assess_accepts_string_height_and_form_gender() {
    let response = server()
        .post("/api/stunting/assess")
        .json(&json!({"gender": "L", "height": "87,1", "birth_date": "2024-10-10"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["height"], 87.1);
    assert_eq!(body["status"], "normal");
}

#[tokio::test]
async fn test_assess_height_out_of_range() {
    let response = server()
        .post("/api/stunting/assess")
        .json(&json!({"gender": "girls", "height": 5, "birth_date": "2024-10-10"}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
    assert_eq!(
        body["error"]["fields"]["height"],
        "height must be between 10 and 200 cm"
    );
    assert!(body["error"]["fields"].get("gender").is_none());
}

#[tokio::test]
async fn test_assess_child_over_five() {
    let response = server()
        .post("/api/stunting/assess")
        .json(&json!({"gender": "girls", "height": 110, "birth_date": "2020-10-09"}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(
        body["error"]["fields"]["birth_date"],
        "calculator supports children under 5 years only"
    );
}

#[tokio::test]
async fn test_assess_future_birth_date() {
    let response = server()
        .post("/api/stunting/assess")
        .json(&json!({"gender": "girls", "height": 50, "birth_date": "2026-10-11"}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["error"]["fields"]["birth_date"], "birth date must be in the past");
}

#[tokio::test]
async fn test_assess_missing_fields_reports_all() {
    let response = server().post("/api/stunting/assess").json(&json!({})).await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    let fields = body["error"]["fields"].as_object().unwrap();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields["gender"], "gender is required");
    assert_eq!(fields["height"], "height is required");
    assert_eq!(fields["birth_date"], "birth date is required");
}

#[tokio::test]
async fn test_assess_wrongly_typed_fields() {
    let response = server()
        .post("/api/stunting/assess")
        .json(&json!({"gender": 1, "height": true, "birth_date": "2024-10-10"}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    let fields = body["error"]["fields"].as_object().unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields["gender"], "gender must be boys or girls");
    assert_eq!(fields["height"], "height must be a number");
}

#[tokio::test]
async fn test_assess_boy_below_minus_two_sd_at_12_months() {
    let response = server()
        .post("/api/stunting/assess")
        .json(&json!({"gender": "boys", "height": 70.9, "birth_date": "2025-10-10"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["age_months"], 12);
    assert_eq!(body["haz_score"], -2.09);
    assert_eq!(body["status"], "stunted");
}

#[tokio::test]
async fn test_assess_malformed_body() {
    let response = server().post("/api/stunting/assess").text("{ not json").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

// =============================================================================
// STANDARDS
// =============================================================================

#[tokio::test]
async fn test_standards_table() {
    let response = server().get("/api/stunting/standards/girls").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["gender"], "female");
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 61);
    assert_eq!(rows[0]["median"], 49.1);
    assert_eq!(rows[24]["median"], 85.7);
}

#[tokio::test]
async fn test_standards_single_age() {
    let response = server().get("/api/stunting/standards/boys/24").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["columns"]["median"], 87.1);
    assert_eq!(body["interpolated"], false);
    assert_eq!(body["clamped"], false);
}

#[tokio::test]
async fn test_standards_beyond_table_is_clamped() {
    let response = server().get("/api/stunting/standards/girls/72").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["age_months"], 72);
    assert_eq!(body["table_age_months"], 60);
    assert_eq!(body["clamped"], true);
    assert_eq!(body["columns"]["median"], 109.4);
}

#[tokio::test]
async fn test_standards_unknown_gender() {
    let response = server().get("/api/stunting/standards/other").await;

    response.assert_status(StatusCode::BAD_REQUEST);
}
