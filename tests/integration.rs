//! Integration tests for the tax engine HTTP API.
//!
//! This test suite drives the router end to end:
//! - Progressive schedules for each country
//! - Flat-rate elections and family quotient
//! - Currency conversion at the input and output boundaries
//! - Aggregation invariants across a full comparison
//! - Error cases

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use tax_engine::api::{AppState, create_router};
use tax_engine::config::ConfigLoader;

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_state() -> AppState {
    let config = ConfigLoader::load("./config/2024").expect("Failed to load config");
    AppState::new(config)
}

fn create_router_for_test() -> Router {
    create_router(create_test_state())
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Reads a decimal serialized as a JSON string.
fn decimal_at(value: &Value, key: &str) -> Decimal {
    let raw = value[key]
        .as_str()
        .unwrap_or_else(|| panic!("Expected decimal string at '{}', got {}", key, value[key]));
    decimal(raw)
}

async fn post_calculate(router: Router, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/calculate")
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

fn result_for<'a>(report: &'a Value, country: &str) -> &'a Value {
    report["results"]
        .as_array()
        .unwrap()
        .iter()
        .find(|result| result["country"] == country)
        .unwrap_or_else(|| panic!("No result for {}", country))
}

fn has_warning(result: &Value, code: &str) -> bool {
    result["audit_trace"]["warnings"]
        .as_array()
        .unwrap()
        .iter()
        .any(|warning| warning["code"] == code)
}

// =============================================================================
// Progressive Schedules
// =============================================================================

#[tokio::test]
async fn test_uk_employee_40000_gbp() {
    let body = json!({"gross_income": "40000", "currency": "GBP", "countries": ["uk"]});
    let (status, report) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["currency"], "GBP");
    assert_eq!(report["tax_year"], "2024");

    let uk = result_for(&report, "uk");
    assert_eq!(decimal_at(uk, "income_tax"), decimal("5486"));
    assert_eq!(decimal_at(uk, "social_security"), decimal("2194.40"));
    assert_eq!(decimal_at(uk, "net_income"), decimal("32319.60"));
    assert_eq!(decimal_at(uk, "effective_rate"), decimal("19.20"));
}

#[tokio::test]
async fn test_cyprus_employee_50000_eur() {
    let body = json!({"gross_income": "50000", "countries": ["cy"]});
    let (status, report) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    let cy = result_for(&report, "cy");
    assert_eq!(decimal_at(cy, "income_tax"), decimal("7885"));
    assert_eq!(decimal_at(cy, "social_security"), decimal("4150"));
    assert_eq!(decimal_at(cy, "other_taxes"), decimal("1325"));
    assert_eq!(decimal_at(cy, "net_income"), decimal("36640"));
    assert_eq!(decimal_at(cy, "effective_rate"), decimal("26.72"));
    assert_eq!(cy["income_tax_method"]["type"], "progressive");
}

#[tokio::test]
async fn test_spain_employee_30000_eur() {
    let body = json!({"gross_income": 30000, "countries": ["es"]});
    let (status, report) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    let es = result_for(&report, "es");
    assert_eq!(decimal_at(es, "income_tax"), decimal("7165.50"));
    assert_eq!(decimal_at(es, "social_security"), decimal("1905"));
}

#[tokio::test]
async fn test_portugal_employee_50000_is_rounded_half_away_from_zero() {
    let body = json!({"gross_income": "50000", "countries": ["pt"]});
    let (status, report) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    let pt = result_for(&report, "pt");
    // 16,099.635 before presentation rounding
    assert_eq!(decimal_at(pt, "income_tax"), decimal("16099.64"));
    assert_eq!(decimal_at(pt, "social_security"), decimal("5500"));
    assert_eq!(pt["income_tax_breakdown"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_poland_employee_100000_pln() {
    let body = json!({"gross_income": "100000", "currency": "PLN", "countries": ["pl"]});
    let (status, report) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    let pl = result_for(&report, "pl");
    assert_eq!(decimal_at(pl, "income_tax"), decimal("8400"));
    assert_eq!(decimal_at(pl, "social_security"), decimal("13710"));
    assert_eq!(decimal_at(pl, "other_taxes"), decimal("7766.10"));
}

// =============================================================================
// Elections and Household
// =============================================================================

#[tokio::test]
async fn test_portugal_nhr_flat_rate() {
    let body = json!({
        "gross_income": "80000",
        "benefits": ["pt_nhr"],
        "countries": ["pt"]
    });
    let (status, report) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    let pt = result_for(&report, "pt");
    assert_eq!(decimal_at(pt, "income_tax"), decimal("16000"));
    assert_eq!(pt["income_tax_method"]["type"], "flat_rate");
    assert_eq!(pt["income_tax_method"]["election"], "pt_nhr");
}

#[tokio::test]
async fn test_benefit_only_applies_to_its_country() {
    let base = json!({"gross_income": "80000", "countries": ["es"]});
    let with_nhr = json!({"gross_income": "80000", "benefits": ["pt_nhr"], "countries": ["es"]});

    let (_, plain) = post_calculate(create_router_for_test(), base).await;
    let (_, elected) = post_calculate(create_router_for_test(), with_nhr).await;

    assert_eq!(
        decimal_at(result_for(&plain, "es"), "income_tax"),
        decimal_at(result_for(&elected, "es"), "income_tax")
    );
}

#[tokio::test]
async fn test_france_family_quotient() {
    let body = json!({
        "gross_income": "50000",
        "marital_status": "married",
        "num_children": 2,
        "countries": ["fr"]
    });
    let (status, report) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    let fr = result_for(&report, "fr");
    assert_eq!(decimal_at(fr, "family_quotient"), decimal("3"));
    assert_eq!(decimal_at(fr, "income_tax"), decimal("1772.98"));
}

#[tokio::test]
async fn test_missing_regime_is_a_warning_not_an_error() {
    let body = json!({
        "gross_income": "20000",
        "has_sole_proprietorship": true,
        "sole_proprietorship_income": "20000",
        "years_in_business": 0,
        "countries": ["pt"]
    });
    let (status, report) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    let pt = result_for(&report, "pt");
    assert!(has_warning(pt, "MISSING_REGIME_SELECTION"));
    // 20,000 at the simplified 75% coefficient, halved in the first year
    assert_eq!(decimal_at(pt, "taxable_base"), decimal("7500"));
    assert_eq!(decimal_at(pt, "social_security"), Decimal::ZERO);
}

// =============================================================================
// Currency Conversion
// =============================================================================

#[tokio::test]
async fn test_uk_in_euros_matches_native_computation() {
    // 47,058.82 EUR is 39,999.997 GBP at the 0.85 snapshot rate
    let body = json!({"gross_income": "47058.82", "currency": "EUR", "countries": ["uk"]});
    let (status, report) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["currency"], "EUR");

    let uk = result_for(&report, "uk");
    assert_eq!(uk["currency"], "EUR");
    assert_eq!(decimal_at(uk, "gross_income"), decimal("47058.82"));

    let tax_in_pounds = decimal_at(uk, "income_tax") * decimal("0.85");
    assert!(
        (tax_in_pounds - decimal("5486")).abs() < decimal("0.01"),
        "Expected about 5486 GBP, got {}",
        tax_in_pounds
    );
}

#[tokio::test]
async fn test_comparison_is_displayed_in_input_currency() {
    let body = json!({
        "gross_income": "60000",
        "currency": "USD",
        "countries": ["pt", "es", "fr", "uk", "cy", "pl"]
    });
    let (status, report) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    for result in report["results"].as_array().unwrap() {
        assert_eq!(result["currency"], "USD");
        assert_eq!(decimal_at(result, "gross_income"), decimal("60000"));
    }
}

// =============================================================================
// Aggregation
// =============================================================================

#[tokio::test]
async fn test_full_comparison_invariants() {
    let body = json!({
        "gross_income": "75000",
        "marital_status": "married",
        "num_children": 1,
        "countries": ["pt", "es", "fr", "uk", "cy", "pl"]
    });
    let (status, report) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    let results = report["results"].as_array().unwrap();
    let order: Vec<&str> = results
        .iter()
        .map(|result| result["country"].as_str().unwrap())
        .collect();
    assert_eq!(order, vec!["pt", "es", "fr", "uk", "cy", "pl"]);

    let tolerance = decimal("0.02");
    for result in results {
        let gross = decimal_at(result, "gross_income");
        let total = decimal_at(result, "total_deductions");
        let parts = decimal_at(result, "income_tax")
            + decimal_at(result, "social_security")
            + decimal_at(result, "other_taxes");

        // Each amount is rounded on its own, so sums may drift by a cent.
        assert!((total - parts).abs() <= tolerance);
        assert!((decimal_at(result, "net_income") - (gross - total)).abs() <= tolerance);

        let recomputed = total / gross * Decimal::ONE_HUNDRED;
        assert!((decimal_at(result, "effective_rate") - recomputed).abs() < decimal("0.01"));

        let slices: Decimal = result["income_tax_breakdown"]
            .as_array()
            .unwrap()
            .iter()
            .map(|slice| decimal_at(slice, "tax_amount"))
            .sum();
        assert!((slices - decimal_at(result, "income_tax")).abs() <= tolerance);
    }

    let lowest = report["lowest_effective_rate"].as_str().unwrap();
    let lowest_rate = decimal_at(result_for(&report, lowest), "effective_rate");
    assert!(
        results
            .iter()
            .all(|result| decimal_at(result, "effective_rate") >= lowest_rate)
    );
}

#[tokio::test]
async fn test_duplicate_countries_are_computed_once() {
    let body = json!({"gross_income": "50000", "countries": ["cy", "CY", "fr"]});
    let (status, report) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["results"].as_array().unwrap().len(), 2);
}

// =============================================================================
// Error Cases
// =============================================================================

#[tokio::test]
async fn test_zero_income_returns_400() {
    let body = json!({"gross_income": "0", "countries": ["pt"]});
    let (status, error) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_INPUT");
    assert!(error["message"].as_str().unwrap().contains("gross_income"));
}

#[tokio::test]
async fn test_income_beyond_supported_range_returns_400() {
    let body = json!({
        "gross_income": "50000000000000000000000000000",
        "currency": "GBP",
        "countries": ["pl"]
    });
    let (status, error) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_INPUT");
    assert!(error["message"].as_str().unwrap().contains("must not exceed"));
}

#[tokio::test]
async fn test_minimum_contributions_above_income_give_negative_net() {
    let body = json!({
        "gross_income": "1000",
        "has_sole_proprietorship": true,
        "sole_proprietorship_income": "1000",
        "years_in_business": 3,
        "countries": ["es"]
    });
    let (status, report) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    let es = result_for(&report, "es");
    assert_eq!(decimal_at(es, "social_security"), decimal("2700"));
    assert!(decimal_at(es, "net_income") < Decimal::ZERO);
    assert!(has_warning(es, "DEDUCTIONS_EXCEED_GROSS"));
}

#[tokio::test]
async fn test_business_income_above_gross_returns_400() {
    let body = json!({
        "gross_income": "30000",
        "has_sole_proprietorship": true,
        "sole_proprietorship_income": "40000",
        "countries": ["es"]
    });
    let (status, error) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_INPUT");
    assert!(
        error["message"]
            .as_str()
            .unwrap()
            .contains("sole_proprietorship_income")
    );
}

#[tokio::test]
async fn test_no_countries_returns_400() {
    let body = json!({"gross_income": "50000", "countries": []});
    let (status, error) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_INPUT");
    assert!(error["message"].as_str().unwrap().contains("countries"));
}

#[tokio::test]
async fn test_unsupported_country_returns_400() {
    let body = json!({"gross_income": "50000", "countries": ["pt", "de"]});
    let (status, error) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "UNSUPPORTED_COUNTRY");
}

#[tokio::test]
async fn test_unsupported_currency_returns_400() {
    let body = json!({"gross_income": "50000", "currency": "JPY", "countries": ["pt"]});
    let (status, error) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "UNSUPPORTED_CURRENCY");
}

#[tokio::test]
async fn test_unknown_benefit_is_malformed() {
    let body = json!({"gross_income": "50000", "benefits": ["de_none"], "countries": ["pt"]});
    let (status, error) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_zus_relief_without_business_returns_400() {
    let body = json!({
        "gross_income": "100000",
        "currency": "PLN",
        "benefits": ["pl_ulga_na_start"],
        "countries": ["pl"]
    });
    let (status, error) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_missing_content_type_returns_400() {
    let response = create_router_for_test()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/calculate")
                .body(Body::from(r#"{"gross_income": "50000", "countries": ["pt"]}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let error: Value = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(error["code"], "MISSING_CONTENT_TYPE");
}

// =============================================================================
// Country Listing
// =============================================================================

#[tokio::test]
async fn test_countries_endpoint() {
    let response = create_router_for_test()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/countries")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let countries: Value = serde_json::from_slice(&body_bytes).unwrap();
    let countries = countries.as_array().unwrap();

    assert_eq!(countries.len(), 6);
    assert_eq!(countries[0], json!({"code": "pt", "name": "Portugal", "native_currency": "EUR"}));
    assert_eq!(
        countries[3],
        json!({"code": "uk", "name": "United Kingdom", "native_currency": "GBP"})
    );
}
