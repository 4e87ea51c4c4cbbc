//! Integration tests for the SDeal site
//!
//! These tests drive the full axum router in-process, with the package
//! backend replaced by a wiremock server.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::NaiveDate;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::{
    matchers::{body_partial_json, header as header_eq, header_exists, method, path},
    Mock, MockServer, ResponseTemplate,
};

use sdeal_site::{
    backend::HttpPackageApi,
    config::Config,
    server::{app_router, AppState},
};

// ==================== Test Helpers ====================

fn create_test_config(backend_url: &str) -> Config {
    Config {
        port: 8080,
        public_base_url: "https://www.sdeal.com".to_string(),
        cookie_secure: false,
        backend_base_url: backend_url.to_string(),
        fixed_start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
    }
}

fn create_app(backend_url: &str) -> Router {
    let state = Arc::new(AppState {
        config: Arc::new(create_test_config(backend_url)),
        api: Arc::new(HttpPackageApi::new(backend_url)),
    });
    app_router(state)
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("router is infallible")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

fn set_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string())
}

/// Package form of an existing seller that passes validation.
fn existing_seller_draft(package: &str, commission: &str) -> serde_json::Value {
    serde_json::json!({
        "customerType": "existing",
        "selectedPackage": package,
        "selectedAddons": ["dealCSS"],
        "billingPeriod": "monthly",
        "sellerIdentity": { "kind": "existing", "sellerId": "S-100", "email": "shop@example.nl" },
        "commissionPercentage": commission,
        "startDate": "immediate",
        "sellCountries": ["NL", "BE"],
        "payoutFrequency": "monthly",
        "agreementAccepted": true
    })
}

// ==================== Page Tests ====================

#[tokio::test]
async fn test_health() {
    let response = send(create_app("http://127.0.0.1:1"), get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_dutch_pricing_page() {
    let response = send(create_app("http://127.0.0.1:1"), get("/nl/pricing")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response).unwrap().starts_with("sdeal-language=nl;"));

    let html = body_text(response).await;
    assert!(html.contains("<html lang=\"nl\">"));
    assert!(html.contains("<title>Prijzen</title>"));
    assert!(html.contains("href=\"/nl/package?newCustomer=true&amp;package=B\""));
}

#[tokio::test]
async fn test_pricing_link_opens_dutch_new_customer_intake() {
    let response = send(
        create_app("http://127.0.0.1:1"),
        get("/nl/package?newCustomer=true&package=B"),
    )
    .await;

    let html = body_text(response).await;
    assert!(html.contains("<html lang=\"nl\">"));
    assert!(html.contains("data-stage=\"NewCustomerIntake\""));
    assert!(html.contains("data-package=\"B\""));
}

#[tokio::test]
async fn test_prefix_is_case_insensitive() {
    let response = send(create_app("http://127.0.0.1:1"), get("/NL/Pricing")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("<html lang=\"nl\">"));
}

#[tokio::test]
async fn test_unprefixed_path_uses_cookie_preference() {
    let request = Request::builder()
        .uri("/faq")
        .header(header::COOKIE, "sdeal-language=de")
        .body(Body::empty())
        .unwrap();

    let response = send(create_app("http://127.0.0.1:1"), request).await;

    // The preference did not change, so nothing is written back.
    assert_eq!(set_cookie(&response), None);
    assert!(body_text(response).await.contains("<html lang=\"de\">"));
}

#[tokio::test]
async fn test_unprefixed_path_without_cookie_is_english() {
    let response = send(create_app("http://127.0.0.1:1"), get("/jobs")).await;
    assert_eq!(set_cookie(&response), None);
    assert!(body_text(response).await.contains("<html lang=\"en\">"));
}

#[tokio::test]
async fn test_unknown_prefix_falls_back_to_english_404() {
    let response = send(create_app("http://127.0.0.1:1"), get("/es/pricing")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("<title>Page not found</title>"));
}

#[tokio::test]
async fn test_localized_not_found() {
    let response = send(create_app("http://127.0.0.1:1"), get("/fr/nope")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("<title>Page introuvable</title>"));
}

#[tokio::test]
async fn test_product_page_with_slug() {
    let response = send(create_app("http://127.0.0.1:1"), get("/de/products/bamboo-brush")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("data-slug=\"bamboo-brush\""));
}

// ==================== Language Switch Tests ====================

#[tokio::test]
async fn test_language_switch_redirects_to_equivalent_page() {
    let response = send(
        create_app("http://127.0.0.1:1"),
        post_form("/language", "language=de&path=%2Fnl%2Fpricing"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/de/pricing");
    assert!(set_cookie(&response).unwrap().starts_with("sdeal-language=de;"));
}

#[tokio::test]
async fn test_language_switch_to_english_drops_prefix() {
    let response = send(
        create_app("http://127.0.0.1:1"),
        post_form("/language", "language=en&path=%2Ffr%2Fproducts%2Fx"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/products/x");
}

#[tokio::test]
async fn test_language_switch_with_control_characters_redirects_home() {
    let response = send(
        create_app("http://127.0.0.1:1"),
        post_form("/language", "language=de&path=%2Fnl%2Fa%0Db"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/de");
}

#[tokio::test]
async fn test_language_switch_to_current_is_noop() {
    let response = send(
        create_app("http://127.0.0.1:1"),
        post_form("/language", "language=nl&path=%2Fnl%2Fpricing"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(set_cookie(&response), None);
}

#[tokio::test]
async fn test_language_switch_unknown_language() {
    let response = send(
        create_app("http://127.0.0.1:1"),
        post_form("/language", "language=xx&path=%2F"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);
}

// ==================== Pricing Tests ====================

#[tokio::test]
async fn test_pricing_table_yearly() {
    let response = send(
        create_app("http://127.0.0.1:1"),
        get("/api/pricing?billingPeriod=yearly"),
    )
    .await;

    let rows = body_json(response).await;
    assert_eq!(rows[0]["package"], "A");
    assert_eq!(rows[0]["price"], "260.95");
    assert_eq!(rows[0]["minCommission"], "12");
}

// ==================== Intake Tests ====================

#[tokio::test]
async fn test_existing_intake_returns_shareable_url() {
    let response = send(
        create_app("http://127.0.0.1:1"),
        post_json(
            "/api/package/intake/existing",
            serde_json::json!({ "language": "fr", "email": "a@b.fr", "sellerId": "S-7" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["url"], "/fr/package?sellerId=S-7");
}

#[tokio::test]
async fn test_existing_intake_field_errors() {
    let response = send(
        create_app("http://127.0.0.1:1"),
        post_json(
            "/api/package/intake/existing",
            serde_json::json!({ "language": "nl", "email": "nope", "sellerId": "" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["fieldErrors"]["email"], "Vul een geldig emailadres in");
    assert!(json["fieldErrors"]["sellerId"].is_string());
}

#[tokio::test]
async fn test_new_intake_rejects_bad_iban() {
    let response = send(
        create_app("http://127.0.0.1:1"),
        post_json(
            "/api/package/intake/new",
            serde_json::json!({
                "language": "en",
                "package": "B",
                "customer": {
                    "companyName": "Groen BV", "firstName": "Sanne", "lastName": "de Vries",
                    "street": "Keizersgracht 1", "city": "Amsterdam", "postalCode": "1015 CJ",
                    "country": "NL", "kvkNumber": "12345678", "vatNumber": "NL123456789B01",
                    "iban": "1234", "bic": "ABNANL2A"
                }
            }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["fieldErrors"]["iban"],
        "Please enter a valid IBAN"
    );
}

// ==================== Submission Tests ====================

#[tokio::test]
async fn test_submit_forwards_to_backend_with_idempotency_key() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/package/submit"))
        .and(header_exists("Idempotency-Key"))
        .and(body_partial_json(serde_json::json!({
            "package": "B",
            "sellerId": "S-100",
            "commissionPercentage": "4.5",
            "language": "de"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": { "id": "sel_900" }
        })))
        .expect(1)
        .mount(&backend)
        .await;

    let response = send(
        create_app(&backend.uri()),
        post_json(
            "/api/package/submit",
            serde_json::json!({ "language": "de", "draft": existing_seller_draft("B", "4,5") }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["packageSelectionId"], "sel_900");
    assert!(json["idempotencyKey"].is_string());
}

#[tokio::test]
async fn test_submit_retry_reuses_client_idempotency_key() {
    let key = "11111111-1111-4111-8111-111111111111";
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/package/submit"))
        .and(header_eq("Idempotency-Key", key))
        .and(body_partial_json(serde_json::json!({ "idempotencyKey": key })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": { "id": "sel_901" }
        })))
        .expect(2)
        .mount(&backend)
        .await;

    for _ in 0..2 {
        let response = send(
            create_app(&backend.uri()),
            post_json(
                "/api/package/submit",
                serde_json::json!({
                    "language": "en",
                    "draft": existing_seller_draft("B", "5"),
                    "idempotencyKey": key
                }),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["idempotencyKey"], key);
    }
}

#[tokio::test]
async fn test_submit_below_minimum_commission_never_reaches_backend() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/package/submit"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;

    let response = send(
        create_app(&backend.uri()),
        post_json(
            "/api/package/submit",
            serde_json::json!({ "language": "en", "draft": existing_seller_draft("A", "10") }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["fieldErrors"]["commission"],
        "Commission percentage must be at least 12% for Package A"
    );
}

#[tokio::test]
async fn test_submit_without_countries_blocked() {
    let mut draft = existing_seller_draft("C", "4");
    draft["sellCountries"] = serde_json::json!([]);

    let response = send(
        create_app("http://127.0.0.1:1"),
        post_json(
            "/api/package/submit",
            serde_json::json!({ "language": "en", "draft": draft }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["fieldErrors"]["sellCountries"].is_string());
}

#[tokio::test]
async fn test_submit_backend_error_shown_verbatim() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/package/submit"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "success": false,
            "error": "Seller not found."
        })))
        .mount(&backend)
        .await;

    let response = send(
        create_app(&backend.uri()),
        post_json(
            "/api/package/submit",
            serde_json::json!({ "language": "en", "draft": existing_seller_draft("B", "5") }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["error"], "Seller not found.");
}

#[tokio::test]
async fn test_submit_unreachable_backend_uses_translated_message() {
    let response = send(
        create_app("http://127.0.0.1:1"),
        post_json(
            "/api/package/submit",
            serde_json::json!({ "language": "nl", "draft": existing_seller_draft("B", "5") }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(
        json["error"],
        sdeal_site::i18n::Message::NetworkError.text(sdeal_site::i18n::Language::DUTCH)
    );
}

// ==================== Payment Tests ====================

#[tokio::test]
async fn test_create_payment_returns_url() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/package/create-payment"))
        .and(body_partial_json(serde_json::json!({ "packageSelectionId": "sel_900" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "paymentUrl": "https://pay.example.com/sel_900"
        })))
        .expect(1)
        .mount(&backend)
        .await;

    let response = send(
        create_app(&backend.uri()),
        post_json(
            "/api/package/create-payment",
            serde_json::json!({ "language": "en", "packageSelectionId": "sel_900" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["paymentUrl"], "https://pay.example.com/sel_900");
}

#[tokio::test]
async fn test_create_payment_requires_id() {
    let response = send(
        create_app("http://127.0.0.1:1"),
        post_json(
            "/api/package/create-payment",
            serde_json::json!({ "packageSelectionId": " " }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_lifetime_discount_payment() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/lifetime-discount/create-payment"))
        .and(body_partial_json(serde_json::json!({ "email": "koper@example.de", "language": "de" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "paymentUrl": "https://pay.example.com/ld"
        })))
        .expect(1)
        .mount(&backend)
        .await;

    let response = send(
        create_app(&backend.uri()),
        post_json(
            "/api/lifetime-discount/create-payment",
            serde_json::json!({ "language": "de", "email": "koper@example.de" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["paymentUrl"], "https://pay.example.com/ld");
}

#[tokio::test]
async fn test_lifetime_discount_invalid_email() {
    let response = send(
        create_app("http://127.0.0.1:1"),
        post_json(
            "/api/lifetime-discount/create-payment",
            serde_json::json!({ "language": "en", "email": "broken" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["fieldErrors"]["email"],
        "Please enter a valid email address"
    );
}
