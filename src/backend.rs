use crate::i18n::{Language, Message};
use crate::wizard::{
    CountryCode, NewCustomerRecord, PackageTier, PayoutFrequency, SellerIdentity,
    StartDatePolicy, ValidatedSelection,
};
use crate::wizard::{Addon, BillingPeriod};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

const SUBMIT_PATH: &str = "/api/package/submit";
const CREATE_PAYMENT_PATH: &str = "/api/package/create-payment";
const LIFETIME_DISCOUNT_PATH: &str = "/api/lifetime-discount/create-payment";

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Connection failure or unreadable body.
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with something that is not the expected JSON.
    #[error("unexpected response from {endpoint} ({status}): {detail}")]
    Malformed {
        endpoint: &'static str,
        status: u16,
        detail: String,
    },

    /// The backend refused the request and said why.
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

impl BackendError {
    /// Text to show the user: server messages verbatim, everything else as
    /// the translated `fallback`.
    pub fn user_message(&self, language: Language, fallback: Message) -> String {
        match self {
            BackendError::Rejected { message, .. } => message.clone(),
            _ => fallback.text(language).to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddonFlags {
    #[serde(rename = "dealCSS")]
    pub deal_css: bool,
    pub caas: bool,
}

/// Body of the package submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub package: PackageTier,
    pub addons: AddonFlags,
    pub billing_period: BillingPeriod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_customer: Option<NewCustomerRecord>,
    pub commission_percentage: Decimal,
    pub start_date: String,
    pub sell_countries: Vec<CountryCode>,
    pub payout_frequency: PayoutFrequency,
    pub agreement_accepted: bool,
    pub language: Language,
    pub idempotency_key: Uuid,
}

impl SubmitRequest {
    pub fn new(
        selection: &ValidatedSelection,
        identity: &SellerIdentity,
        language: Language,
        policy: &StartDatePolicy,
        idempotency_key: Uuid,
    ) -> Self {
        let (seller_id, seller_email, new_customer) = match identity {
            SellerIdentity::Existing { seller_id, email } => {
                (Some(seller_id.trim().to_string()), email.clone(), None)
            }
            SellerIdentity::New(record) => (None, None, Some(record.clone())),
        };

        Self {
            package: selection.package,
            addons: AddonFlags {
                deal_css: selection.addons.contains(&Addon::DealCss),
                caas: selection.addons.contains(&Addon::Caas),
            },
            billing_period: selection.billing_period,
            seller_id,
            seller_email,
            new_customer,
            commission_percentage: selection.commission_percentage,
            start_date: policy.wire_value(selection.start_date),
            sell_countries: selection.sell_countries.iter().copied().collect(),
            payout_frequency: selection.payout_frequency,
            agreement_accepted: true,
            language,
            idempotency_key,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePaymentRequest<'a> {
    package_selection_id: &'a str,
}

#[derive(Debug, Serialize)]
struct LifetimeDiscountRequest<'a> {
    email: &'a str,
    language: Language,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEnvelope {
    #[serde(default)]
    success: bool,
    error: Option<String>,
    data: Option<SelectionData>,
    payment_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SelectionData {
    id: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub package_selection_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentLink {
    pub url: String,
}

/// The persistence/payment backend, treated as an opaque collaborator.
#[async_trait]
pub trait PackageApi: Send + Sync {
    async fn submit_selection(&self, request: &SubmitRequest) -> Result<SubmitReceipt, BackendError>;

    async fn create_payment(&self, package_selection_id: &str) -> Result<PaymentLink, BackendError>;

    async fn create_lifetime_discount_payment(
        &self,
        email: &str,
        language: Language,
    ) -> Result<PaymentLink, BackendError>;
}

/// `PackageApi` over HTTP/JSON. No retries and no timeout: a failure is
/// handed back to the user, who decides whether to try again.
#[derive(Debug, Clone)]
pub struct HttpPackageApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPackageApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &'static str,
        body: &B,
        idempotency_key: Option<Uuid>,
    ) -> Result<ApiEnvelope, BackendError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut request = self.client.post(&url).json(body);
        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key.to_string());
        }

        let response = request
            .send()
            .await
            .map_err(|source| BackendError::Transport { endpoint, source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| BackendError::Transport { endpoint, source })?;

        let envelope: ApiEnvelope =
            serde_json::from_str(&body).map_err(|e| BackendError::Malformed {
                endpoint,
                status: status.as_u16(),
                detail: e.to_string(),
            })?;

        if !status.is_success() || !envelope.success {
            warn!("Backend {} refused request ({}): {:?}", endpoint, status, envelope.error);
            return Err(match envelope.error {
                Some(message) => BackendError::Rejected {
                    status: status.as_u16(),
                    message,
                },
                None => BackendError::Malformed {
                    endpoint,
                    status: status.as_u16(),
                    detail: "response did not report success".to_string(),
                },
            });
        }

        debug!("Backend {} answered {}", endpoint, status);
        Ok(envelope)
    }

    fn payment_link(endpoint: &'static str, envelope: ApiEnvelope) -> Result<PaymentLink, BackendError> {
        match envelope.payment_url {
            Some(url) if !url.is_empty() => Ok(PaymentLink { url }),
            _ => Err(BackendError::Malformed {
                endpoint,
                status: 200,
                detail: "missing paymentUrl".to_string(),
            }),
        }
    }
}

#[async_trait]
impl PackageApi for HttpPackageApi {
    async fn submit_selection(&self, request: &SubmitRequest) -> Result<SubmitReceipt, BackendError> {
        let envelope = self
            .post(SUBMIT_PATH, request, Some(request.idempotency_key))
            .await?;

        let id = match envelope.data.map(|data| data.id) {
            Some(serde_json::Value::String(id)) if !id.is_empty() => id,
            Some(serde_json::Value::Number(id)) => id.to_string(),
            _ => {
                return Err(BackendError::Malformed {
                    endpoint: SUBMIT_PATH,
                    status: 200,
                    detail: "missing selection id".to_string(),
                })
            }
        };

        Ok(SubmitReceipt {
            package_selection_id: id,
        })
    }

    async fn create_payment(&self, package_selection_id: &str) -> Result<PaymentLink, BackendError> {
        let body = CreatePaymentRequest {
            package_selection_id,
        };
        let envelope = self.post(CREATE_PAYMENT_PATH, &body, None).await?;
        Self::payment_link(CREATE_PAYMENT_PATH, envelope)
    }

    async fn create_lifetime_discount_payment(
        &self,
        email: &str,
        language: Language,
    ) -> Result<PaymentLink, BackendError> {
        let body = LifetimeDiscountRequest { email, language };
        let envelope = self.post(LIFETIME_DISCOUNT_PATH, &body, None).await?;
        Self::payment_link(LIFETIME_DISCOUNT_PATH, envelope)
    }
}
