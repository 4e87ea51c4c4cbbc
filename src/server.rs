//! HTTP surface: localized page shells, the language switch, and the JSON
//! endpoints the browser wizard talks to.

use crate::backend::PackageApi;
use crate::config::Config;
use crate::i18n::{
    strip_language_prefix, Language, LanguageContext, Message, Navigator, PreferenceStore,
};
use crate::lifetime_discount::{self, LifetimeDiscountError};
use crate::pages::{render_page, Page, PageRoute};
use crate::wizard::{
    package_url, price_table, validate_existing_customer, validate_new_customer, BillingPeriod,
    FieldErrors, NewCustomerRecord, PackageDraft, PriceRow, StartDatePolicy, Wizard, WizardError,
    WizardQuery,
};
use axum::{
    extract::{Form, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Cookie holding the persisted language preference.
pub const LANGUAGE_COOKIE: &str = "sdeal-language";

pub struct AppState {
    pub config: Arc<Config>,
    pub api: Arc<dyn PackageApi>,
}

impl AppState {
    fn start_date_policy(&self) -> StartDatePolicy {
        StartDatePolicy::new(self.config.fixed_start_date)
    }
}

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/language", post(change_language))
        .route("/api/pricing", get(pricing))
        .route("/api/package/intake/new", post(intake_new))
        .route("/api/package/intake/existing", post(intake_existing))
        .route("/api/package/submit", post(submit_package))
        .route("/api/package/create-payment", post(create_payment))
        .route(
            "/api/lifetime-discount/create-payment",
            post(lifetime_discount_payment),
        )
        .route("/", get(page))
        .route("/*path", get(page))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

// ==================== Errors ====================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: FieldErrors,
    },
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Backend(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field_errors: Option<FieldErrors>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, field_errors) = match self {
            ApiError::Validation {
                message,
                field_errors,
            } => (StatusCode::BAD_REQUEST, message, Some(field_errors)),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message, None),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, message, None),
            ApiError::Backend(message) => (StatusCode::BAD_GATEWAY, message, None),
        };
        let body = Json(ErrorBody {
            success: false,
            error,
            field_errors,
        });
        (status, body).into_response()
    }
}

impl ApiError {
    fn validation(field_errors: FieldErrors) -> Self {
        // Lead with the first field's message so simple clients have something to show.
        let message = field_errors
            .fields()
            .next()
            .and_then(|field| field_errors.get(field))
            .unwrap_or_default()
            .to_string();
        ApiError::Validation {
            message,
            field_errors,
        }
    }

    fn from_wizard(error: WizardError, language: Language) -> Self {
        match error {
            WizardError::Validation(errors) => ApiError::validation(errors),
            WizardError::InFlight => ApiError::Conflict(Message::SubmitInProgress.text(language).to_string()),
            e @ WizardError::InvalidTransition { .. } => ApiError::Conflict(e.to_string()),
            WizardError::Backend { message, .. } => ApiError::Backend(message),
        }
    }
}

// ==================== Language Preference ====================

/// Preference store backed by the request's language cookie. Saved values
/// are written back as `Set-Cookie` on the response.
#[derive(Debug, Default)]
pub struct CookiePreferenceStore {
    incoming: Option<Language>,
    saved: Mutex<Option<Language>>,
}

impl CookiePreferenceStore {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let incoming = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == LANGUAGE_COOKIE)
            .and_then(|(_, value)| Language::from_code(value.trim()).ok());

        Self {
            incoming,
            saved: Mutex::new(None),
        }
    }

    /// Language written during this request, if any.
    pub fn saved(&self) -> Option<Language> {
        *self.saved.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl PreferenceStore for CookiePreferenceStore {
    fn load(&self) -> Option<Language> {
        self.saved().or(self.incoming)
    }

    fn save(&self, language: Language) {
        *self.saved.lock().unwrap_or_else(|e| e.into_inner()) = Some(language);
    }
}

fn language_cookie(language: Language, secure: bool) -> Option<HeaderValue> {
    // No expiry: the preference is kept until the user changes it.
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age=315360000; SameSite=Lax",
        LANGUAGE_COOKIE,
        language.code()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).ok()
}

fn persist_language(response: &mut Response, store: &CookiePreferenceStore, secure: bool) {
    if let Some(cookie) = store.saved().and_then(|l| language_cookie(l, secure)) {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
}

/// Captures the replace-navigation target for a redirect response.
#[derive(Debug, Default)]
struct RedirectNavigator {
    target: Mutex<Option<String>>,
}

impl Navigator for RedirectNavigator {
    fn replace(&self, url: &str) {
        *self.target.lock().unwrap_or_else(|e| e.into_inner()) = Some(url.to_string());
    }
}

/// Request-scoped language context seeded from the cookie.
fn language_context(headers: &HeaderMap) -> LanguageContext<CookiePreferenceStore> {
    LanguageContext::new(CookiePreferenceStore::from_headers(headers))
}

// ==================== Pages ====================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn page(State(state): State<Arc<AppState>>, headers: HeaderMap, uri: Uri) -> Response {
    let path = uri.path();
    let context = language_context(&headers);
    let language = context.resolve_navigation(path);

    let route = PageRoute::from_path(&strip_language_prefix(path));
    let wizard = match &route {
        Some(PageRoute {
            page: Page::Package,
            ..
        }) => Some(Wizard::mount(
            language,
            &WizardQuery::parse(uri.query().unwrap_or_default()),
            state.start_date_policy(),
            chrono::Utc::now().date_naive(),
        )),
        _ => None,
    };

    let html = render_page(
        route.as_ref(),
        language,
        &state.config.public_base_url,
        wizard.as_ref(),
    );
    let status = if route.is_some() {
        StatusCode::OK
    } else {
        debug!("No page for {}", path);
        StatusCode::NOT_FOUND
    };

    let mut response = (status, Html(html)).into_response();
    persist_language(&mut response, context.store(), state.config.cookie_secure);
    response
}

#[derive(Debug, Deserialize)]
struct LanguageChange {
    language: String,
    #[serde(default)]
    path: Option<String>,
}

/// Only same-site absolute paths may be redirected to.
fn safe_path(path: Option<&str>) -> &str {
    match path {
        Some(p)
            if p.starts_with('/')
                && !p.starts_with("//")
                && !p.contains('\\')
                && !p.chars().any(char::is_control) =>
        {
            p
        }
        _ => "/",
    }
}

async fn change_language(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(change): Form<LanguageChange>,
) -> ApiResult<Response> {
    let target = Language::from_code(&change.language)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let current_path = safe_path(change.path.as_deref());

    let context = language_context(&headers);
    context.resolve_navigation(current_path);

    let navigator = RedirectNavigator::default();
    if !context.change_language(target, current_path, &navigator) {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let location = navigator
        .target
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .take()
        .unwrap_or_else(|| "/".to_string());
    info!("Language switched to {}", target);

    let location = HeaderValue::from_str(&location).unwrap_or(HeaderValue::from_static("/"));
    let mut response = StatusCode::SEE_OTHER.into_response();
    response.headers_mut().insert(header::LOCATION, location);
    persist_language(&mut response, context.store(), state.config.cookie_secure);
    Ok(response)
}

// ==================== Pricing ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PricingQuery {
    #[serde(default)]
    billing_period: BillingPeriod,
}

async fn pricing(Query(query): Query<PricingQuery>) -> Json<Vec<PriceRow>> {
    Json(price_table(query.billing_period))
}

// ==================== Package Wizard ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntakeNewRequest {
    language: Language,
    #[serde(default)]
    package: Option<String>,
    customer: NewCustomerRecord,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IntakeResponse {
    success: bool,
    url: String,
}

async fn intake_new(Json(request): Json<IntakeNewRequest>) -> ApiResult<Json<IntakeResponse>> {
    validate_new_customer(&request.customer, request.language).map_err(ApiError::validation)?;

    let package = request.package.as_deref().and_then(crate::wizard::PackageTier::parse);
    Ok(Json(IntakeResponse {
        success: true,
        url: package_url(request.language, &WizardQuery::for_new_customer(package)),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntakeExistingRequest {
    language: Language,
    #[serde(default)]
    email: String,
    #[serde(default)]
    seller_id: String,
}

async fn intake_existing(
    Json(request): Json<IntakeExistingRequest>,
) -> ApiResult<Json<IntakeResponse>> {
    validate_existing_customer(&request.email, &request.seller_id, request.language)
        .map_err(ApiError::validation)?;

    Ok(Json(IntakeResponse {
        success: true,
        url: package_url(
            request.language,
            &WizardQuery::for_existing_seller(&request.seller_id),
        ),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitPackageRequest {
    language: Language,
    draft: PackageDraft,
    /// Key of the attempt the browser started; a retry of that attempt
    /// sends the same key.
    #[serde(default)]
    idempotency_key: Option<uuid::Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitPackageResponse {
    success: bool,
    package_selection_id: String,
    idempotency_key: Option<uuid::Uuid>,
}

async fn submit_package(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubmitPackageRequest>,
) -> ApiResult<Json<SubmitPackageResponse>> {
    let language = request.language;
    let mut wizard = Wizard::resume(
        language,
        request.draft,
        state.start_date_policy(),
        chrono::Utc::now().date_naive(),
    )
    .map_err(|e| ApiError::from_wizard(e, language))?;

    let key = request.idempotency_key.unwrap_or_else(uuid::Uuid::new_v4);
    wizard
        .submit_with_key(state.api.as_ref(), key)
        .await
        .map_err(|e| ApiError::from_wizard(e, language))?;

    match wizard.stage() {
        crate::wizard::Stage::SubmitSuccess {
            package_selection_id,
            ..
        } => Ok(Json(SubmitPackageResponse {
            success: true,
            package_selection_id: package_selection_id.clone(),
            idempotency_key: wizard.last_idempotency_key(),
        })),
        other => {
            warn!("Submission ended in unexpected stage {}", other.name());
            Err(ApiError::Conflict(format!("unexpected stage {}", other.name())))
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePaymentRequest {
    #[serde(default)]
    language: Language,
    package_selection_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentResponse {
    success: bool,
    payment_url: String,
}

async fn create_payment(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreatePaymentRequest>,
) -> ApiResult<Json<PaymentResponse>> {
    let id = request.package_selection_id.trim();
    if id.is_empty() {
        return Err(ApiError::BadRequest("packageSelectionId is required".to_string()));
    }

    let link = state.api.create_payment(id).await.map_err(|e| {
        warn!("Payment creation for {} failed: {}", id, e);
        ApiError::Backend(e.user_message(request.language, Message::PaymentNetworkError))
    })?;

    Ok(Json(PaymentResponse {
        success: true,
        payment_url: link.url,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LifetimeDiscountRequest {
    #[serde(default)]
    language: Language,
    #[serde(default)]
    email: String,
}

async fn lifetime_discount_payment(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LifetimeDiscountRequest>,
) -> ApiResult<Json<PaymentResponse>> {
    let link = lifetime_discount::start_payment(state.api.as_ref(), &request.email, request.language)
        .await
        .map_err(|e| match e {
            LifetimeDiscountError::Validation(errors) => ApiError::validation(errors),
            e @ LifetimeDiscountError::Backend(_) => ApiError::Backend(e.user_message(request.language)),
        })?;

    Ok(Json(PaymentResponse {
        success: true,
        payment_url: link.url,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    // ==================== Cookie Store Tests ====================

    #[test]
    fn test_cookie_store_reads_language() {
        let store = CookiePreferenceStore::from_headers(&headers_with_cookie(
            "session=abc; sdeal-language=de; theme=dark",
        ));
        assert_eq!(store.load(), Some(Language::GERMAN));
        assert_eq!(store.saved(), None);
    }

    #[test]
    fn test_cookie_store_ignores_unknown_language() {
        let store = CookiePreferenceStore::from_headers(&headers_with_cookie("sdeal-language=xx"));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_cookie_store_save_wins_over_incoming() {
        let store = CookiePreferenceStore::from_headers(&headers_with_cookie("sdeal-language=de"));
        store.save(Language::FRENCH);
        assert_eq!(store.load(), Some(Language::FRENCH));
        assert_eq!(store.saved(), Some(Language::FRENCH));
    }

    #[test]
    fn test_language_cookie_format() {
        let secure = language_cookie(Language::DUTCH, true).unwrap();
        assert_eq!(
            secure.to_str().unwrap(),
            "sdeal-language=nl; Path=/; Max-Age=315360000; SameSite=Lax; Secure"
        );
        let plain = language_cookie(Language::DUTCH, false).unwrap();
        assert!(!plain.to_str().unwrap().contains("Secure"));
    }

    // ==================== Redirect Safety Tests ====================

    #[test]
    fn test_safe_path() {
        assert_eq!(safe_path(Some("/nl/pricing")), "/nl/pricing");
        assert_eq!(safe_path(Some("//evil.example.com")), "/");
        assert_eq!(safe_path(Some("https://evil.example.com")), "/");
        assert_eq!(safe_path(None), "/");
    }

    #[test]
    fn test_safe_path_rejects_control_characters() {
        assert_eq!(safe_path(Some("/nl/a\rb")), "/");
        assert_eq!(safe_path(Some("/nl/a\nSet-Cookie: x=1")), "/");
        assert_eq!(safe_path(Some("/nl/a\u{7f}")), "/");
    }

    // ==================== Error Mapping Tests ====================

    #[test]
    fn test_wizard_errors_map_to_status() {
        let status = |e: WizardError| {
            ApiError::from_wizard(e, Language::ENGLISH)
                .into_response()
                .status()
        };

        assert_eq!(status(WizardError::Validation(FieldErrors::new())), StatusCode::BAD_REQUEST);
        assert_eq!(status(WizardError::InFlight), StatusCode::CONFLICT);
        assert_eq!(
            status(WizardError::InvalidTransition {
                action: "submit",
                stage: "Submitting"
            }),
            StatusCode::CONFLICT
        );
    }
}
