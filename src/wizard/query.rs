//! Query parameters the package page reads and writes.
//!
//! `sellerId`, `newCustomer=true`, `package=A|B|C` and `payment=success`.
//! A query that does not parse is treated as empty, and a repeated key
//! keeps its first value.

use crate::i18n::{localize_url, Language};
use crate::wizard::draft::PackageTier;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Language-neutral path of the package wizard.
pub const PACKAGE_PAGE: &str = "/package";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_customer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<String>,
}

impl WizardQuery {
    /// Reads the known parameters. A repeated key keeps its first value.
    pub fn parse(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).unwrap_or_else(|e| {
            debug!("Ignoring unparsable package query {:?}: {}", query, e);
            Vec::new()
        });

        let mut parsed = WizardQuery::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "sellerId" => &mut parsed.seller_id,
                "newCustomer" => &mut parsed.new_customer,
                "package" => &mut parsed.package,
                "payment" => &mut parsed.payment,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        parsed
    }

    /// Link from the pricing page into the new-customer intake.
    pub fn for_new_customer(package: Option<PackageTier>) -> Self {
        Self {
            new_customer: Some("true".to_string()),
            package: package.map(|p| p.to_string()),
            ..Default::default()
        }
    }

    /// Shareable link that resumes the wizard for a known seller.
    pub fn for_existing_seller(seller_id: &str) -> Self {
        Self {
            seller_id: Some(seller_id.trim().to_string()),
            ..Default::default()
        }
    }

    pub fn seller_id(&self) -> Option<&str> {
        self.seller_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn is_new_customer(&self) -> bool {
        self.new_customer.as_deref() == Some("true")
    }

    pub fn package(&self) -> Option<PackageTier> {
        self.package.as_deref().and_then(PackageTier::parse)
    }

    pub fn payment_succeeded(&self) -> bool {
        self.payment.as_deref() == Some("success")
    }

    pub fn to_query_string(&self) -> String {
        serde_urlencoded::to_string(self).unwrap_or_default()
    }
}

/// Localized URL of the package page carrying `query`.
pub fn package_url(language: Language, query: &WizardQuery) -> String {
    let path = localize_url(PACKAGE_PAGE, language);
    let query = query.to_query_string();
    if query.is_empty() {
        path
    } else {
        format!("{}?{}", path, query)
    }
}
