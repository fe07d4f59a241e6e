use std::collections::BTreeMap;

use axum::body::{to_bytes, Body};
use axum::http::Request;
use tower::ServiceExt;
use vastgoed_analysis::{GeminiSummarizer, SummarizerSettings};
use vastgoed_core::{AreaSubject, IndividualSubject};
use vastgoed_providers::{
    AreaListing, EnergyLabelData, EnergyLabelRequest, LocationData, ProviderResult, ReferenceData,
    ReferenceSummary, WozData,
};

use super::*;

/// Answers every lookup from fixed data.
struct FixedSource {
    location: ProviderResult<LocationData>,
}

impl PropertyDataSource for FixedSource {
    async fn fetch_location(&self, _subject: &IndividualSubject) -> ProviderResult<LocationData> {
        self.location.clone()
    }

    async fn fetch_reference(&self, _subject: &IndividualSubject) -> ProviderResult<ReferenceData> {
        ProviderResult::Success(ReferenceData {
            price_mean: Some("400000-450000".into()),
            price_range: None,
            comparables: Vec::new(),
            summary: ReferenceSummary {
                count: 0,
                mean_distance_m: 0,
                house_types: BTreeMap::new(),
            },
        })
    }

    async fn fetch_valuation(&self, _subject: &IndividualSubject) -> ProviderResult<WozData> {
        ProviderResult::Failure("no WOZ value for this address".into())
    }

    async fn fetch_energy_label(
        &self,
        _request: &EnergyLabelRequest,
    ) -> ProviderResult<EnergyLabelData> {
        ProviderResult::Absent
    }

    async fn fetch_area_listings(&self, subject: &AreaSubject) -> ProviderResult<Vec<AreaListing>> {
        ProviderResult::Success(vec![AreaListing {
            id: "0363010000758545".into(),
            address: "Prinsengracht 72".into(),
            street: Some("Prinsengracht".into()),
            city: Some("Amsterdam".into()),
            province: None,
            postal_code: subject.postal_code.to_string(),
            house_number: "72".into(),
            addition: None,
            asking_price: Some(650_000),
            listing_date: None,
            status: Some("Beschikbaar".into()),
            image_url: None,
        }])
    }
}

fn location() -> LocationData {
    LocationData {
        bag_id: None,
        postal_code: Some("1015MN".into()),
        house_number: Some(72),
        house_addition: None,
        street: Some("Prinsengracht".into()),
        city: Some("Amsterdam".into()),
        house_type: Some("Appartement".into()),
        build_year: Some(1900),
        inner_surface_area: Some(85.0),
        outer_surface_area: None,
        volume: None,
        rooms: Some(3),
        coordinates: None,
        energy_label: None,
    }
}

/// A summarizer without a key: every report is the fallback.
fn app_with(location: ProviderResult<LocationData>, auth: AuthState) -> Router {
    let summarizer = GeminiSummarizer::new(SummarizerSettings {
        api_key: None,
        base_url: "http://127.0.0.1:9".into(),
        model: "test-model".into(),
        timeout_secs: 1,
        user_agent: "test".into(),
    })
    .expect("summarizer");

    let state = AppState {
        source: Arc::new(FixedSource { location }),
        summarizer: Arc::new(summarizer),
        scheduler: BatchScheduler::new(3, Duration::from_millis(1)),
        summarizer_configured: false,
    };
    build_app(state, auth, default_rate_limit_state())
}

fn app() -> Router {
    app_with(ProviderResult::Success(location()), AuthState::disabled())
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json parse")
}

#[test]
fn api_error_validation_error_maps_to_bad_request() {
    let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_is_public_and_echoes_request_id() {
    let auth = AuthState::from_keys("secret", false).expect("auth");
    let response = app_with(ProviderResult::Success(location()), auth)
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "req-42");
    let json = json_body(response).await;
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["summarizer"], "fallback_only");
    assert_eq!(json["meta"]["request_id"], "req-42");
}

#[tokio::test]
async fn protected_routes_require_bearer_token() {
    let auth = AuthState::from_keys("secret", false).expect("auth");
    let body = serde_json::json!({ "postal_code": "1015MN" });

    let denied = app_with(ProviderResult::Success(location()), auth.clone())
        .oneshot(post_json("/api/v1/facts/area", &body))
        .await
        .expect("response");
    assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);

    let mut request = post_json("/api/v1/facts/area", &body);
    request
        .headers_mut()
        .insert("authorization", "Bearer secret".parse().expect("header"));
    let allowed = app_with(ProviderResult::Success(location()), auth)
        .oneshot(request)
        .await
        .expect("response");
    assert_eq!(allowed.status(), StatusCode::OK);
}

#[tokio::test]
async fn invalid_postal_code_is_a_validation_error() {
    let response = app()
        .oneshot(post_json(
            "/api/v1/analysis/individual",
            &serde_json::json!({ "house_number": "72", "postal_code": "10155" }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn individual_facts_report_sources_and_warnings() {
    let response = app()
        .oneshot(post_json(
            "/api/v1/facts/individual",
            &serde_json::json!({
                "street": "Prinsengracht",
                "house_number": "72",
                "addition": "1",
                "city": "Amsterdam",
                "postal_code": "1015MN"
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let data = &json["data"];
    assert_eq!(data["mode"], "individual");
    assert_eq!(data["phase"], "partially_failed");
    assert_eq!(
        data["facts"]["sources_used"],
        serde_json::json!(["location", "reference"])
    );
    assert_eq!(data["facts"]["energy_label"]["status"], "absent");
    assert_eq!(data["warnings"][0]["source"], "valuation");
    assert!(data["report"].is_null());
}

#[tokio::test]
async fn individual_analysis_without_key_returns_fallback_report() {
    let response = app()
        .oneshot(post_json(
            "/api/v1/analysis/individual",
            &serde_json::json!({ "house_number": "72", "postal_code": "1015MN" }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let report = &json["data"]["report"];
    assert_eq!(json["data"]["phase"], "reported");
    assert_eq!(report["model_id"], "fallback");
    assert_eq!(report["failed"], true);
    assert_eq!(report["error"], "summarizer API key not configured");
}

#[tokio::test]
async fn failed_address_lookup_still_reports() {
    let response = app_with(
        ProviderResult::Failure("address not found".into()),
        AuthState::disabled(),
    )
    .oneshot(post_json(
        "/api/v1/analysis/individual",
        &serde_json::json!({ "house_number": "72", "postal_code": "1015MN" }),
    ))
    .await
    .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["data"]["warnings"][0]["severity"], "error");
    assert_eq!(
        json["data"]["report"]["error"],
        "address lookup failed: address not found"
    );
}

#[tokio::test]
async fn area_analysis_lists_statistics_and_labels() {
    let response = app()
        .oneshot(post_json(
            "/api/v1/analysis/area",
            &serde_json::json!({ "postal_code": "1015 mn" }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let facts = &json["data"]["facts"];
    assert_eq!(json["data"]["mode"], "area");
    assert_eq!(json["data"]["subject"]["postal_code"], "1015MN");
    assert_eq!(facts["statistics"]["total"], 1);
    assert_eq!(facts["statistics"]["average_price"], 650_000);
    assert_eq!(facts["energy_labels"]["absent_count"], 1);
    assert!(json["data"]["report"]["raw_text"]
        .as_str()
        .expect("text")
        .contains("Gemiddelde vraagprijs: €650000"));
}
