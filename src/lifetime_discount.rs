//! Lifetime-discount group sign-up: a one-time payment for a permanent
//! discount, started from an email address alone.

use crate::backend::{BackendError, PackageApi, PaymentLink};
use crate::i18n::{Language, Message};
use crate::wizard::{is_valid_email, Field, FieldErrors};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{info, warn};

/// One-time price of joining the group, in euros.
pub const LIFETIME_DISCOUNT_PRICE: Decimal = dec!(14.95);

#[derive(Debug, thiserror::Error)]
pub enum LifetimeDiscountError {
    #[error("invalid email address")]
    Validation(FieldErrors),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl LifetimeDiscountError {
    pub fn user_message(&self, language: Language) -> String {
        match self {
            LifetimeDiscountError::Validation(errors) => errors
                .get(Field::Email)
                .unwrap_or_else(|| Message::EmailInvalid.text(language))
                .to_string(),
            LifetimeDiscountError::Backend(e) => {
                e.user_message(language, Message::PaymentNetworkError)
            }
        }
    }
}

pub fn validate_email(email: &str, language: Language) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if email.trim().is_empty() {
        errors.insert(Field::Email, Message::EmailRequired.text(language));
    } else if !is_valid_email(email) {
        errors.insert(Field::Email, Message::EmailInvalid.text(language));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate the email and ask the backend for a payment link. The caller
/// redirects to the returned URL.
pub async fn start_payment(
    api: &dyn PackageApi,
    email: &str,
    language: Language,
) -> Result<PaymentLink, LifetimeDiscountError> {
    validate_email(email, language).map_err(LifetimeDiscountError::Validation)?;

    let email = email.trim();
    match api.create_lifetime_discount_payment(email, language).await {
        Ok(link) => {
            info!("Lifetime discount payment created ({})", language);
            Ok(link)
        }
        Err(e) => {
            warn!("Lifetime discount payment failed: {}", e);
            Err(e.into())
        }
    }
}
