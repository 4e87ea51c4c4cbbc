//! Client-side validation for the three wizard forms.
//!
//! Each form runs every check and collects one message per failing field, so
//! the user sees all problems at once. Messages are localized when produced.

use crate::i18n::{Language, Message};
use crate::wizard::draft::{
    Addon, BillingPeriod, CountryCode, NewCustomerRecord, PackageDraft, PackageTier,
    PayoutFrequency, StartDate, StartDatePolicy,
};
use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use std::sync::OnceLock;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static IBAN_REGEX: OnceLock<Regex> = OnceLock::new();
static BIC_REGEX: OnceLock<Regex> = OnceLock::new();

/// Form fields that can carry an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    CompanyName,
    FirstName,
    LastName,
    Street,
    City,
    PostalCode,
    Country,
    KvkNumber,
    VatNumber,
    Iban,
    Bic,
    Email,
    SellerId,
    Package,
    Commission,
    StartDate,
    SellCountries,
    PayoutFrequency,
    Agreement,
}

/// Field-scoped error messages, serialized as `{ "field": "message" }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn clear(&mut self, field: Field) {
        self.0.remove(&field);
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

/// A package form that passed validation, with every required choice resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSelection {
    pub package: PackageTier,
    pub addons: BTreeSet<Addon>,
    pub billing_period: BillingPeriod,
    pub commission_percentage: Decimal,
    pub start_date: StartDate,
    pub sell_countries: BTreeSet<CountryCode>,
    pub payout_frequency: PayoutFrequency,
}

// ==================== Format Checks ====================

pub fn is_valid_email(email: &str) -> bool {
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex")
    });
    regex.is_match(email.trim())
}

/// IBAN shape check followed by the ISO 13616 mod-97 checksum. Spaces are
/// ignored and letters may be lowercase.
pub fn is_valid_iban(iban: &str) -> bool {
    let normalized: String = iban
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();

    let regex = IBAN_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Z]{2}[0-9]{2}[A-Z0-9]{11,30}$").expect("Invalid IBAN regex")
    });
    if !regex.is_match(&normalized) {
        return false;
    }

    let (head, tail) = normalized.split_at(4);
    let remainder = tail.chars().chain(head.chars()).fold(0u32, |acc, c| {
        let value = c.to_digit(36).unwrap_or(0);
        if value >= 10 {
            (acc * 100 + value) % 97
        } else {
            (acc * 10 + value) % 97
        }
    });
    remainder == 1
}

/// 8 or 11 character SWIFT/BIC code.
pub fn is_valid_bic(bic: &str) -> bool {
    let regex = BIC_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Z]{4}[A-Z]{2}[A-Z0-9]{2}([A-Z0-9]{3})?$").expect("Invalid BIC regex")
    });
    regex.is_match(&bic.trim().to_ascii_uppercase())
}

/// Parse a commission input; accepts a decimal comma.
pub fn parse_commission(input: &str) -> Option<Decimal> {
    Decimal::from_str(&input.trim().replace(',', ".")).ok()
}

// ==================== Form Validation ====================

/// Validate the new-customer registration record.
pub fn validate_new_customer(
    record: &NewCustomerRecord,
    language: Language,
) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    let required = Message::FieldRequired.text(language);

    let fields = [
        (Field::CompanyName, &record.company_name),
        (Field::FirstName, &record.first_name),
        (Field::LastName, &record.last_name),
        (Field::Street, &record.street),
        (Field::City, &record.city),
        (Field::PostalCode, &record.postal_code),
        (Field::Country, &record.country),
        (Field::KvkNumber, &record.kvk_number),
        (Field::VatNumber, &record.vat_number),
        (Field::Iban, &record.iban),
        (Field::Bic, &record.bic),
    ];
    for (field, value) in fields {
        if value.trim().is_empty() {
            errors.insert(field, required);
        }
    }

    if !errors.contains(Field::Iban) && !is_valid_iban(&record.iban) {
        errors.insert(Field::Iban, Message::IbanInvalid.text(language));
    }
    if !errors.contains(Field::Bic) && !is_valid_bic(&record.bic) {
        errors.insert(Field::Bic, Message::BicInvalid.text(language));
    }

    errors.into_result(())
}

/// Validate the existing-customer login step.
pub fn validate_existing_customer(
    email: &str,
    seller_id: &str,
    language: Language,
) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if email.trim().is_empty() {
        errors.insert(Field::Email, Message::EmailRequired.text(language));
    } else if !is_valid_email(email) {
        errors.insert(Field::Email, Message::EmailInvalid.text(language));
    }

    if seller_id.trim().is_empty() {
        errors.insert(Field::SellerId, Message::SellerIdRequired.text(language));
    }

    errors.into_result(())
}

/// Validate the package form on a submit attempt.
pub fn validate_package_form(
    draft: &PackageDraft,
    policy: &StartDatePolicy,
    today: NaiveDate,
    language: Language,
) -> Result<ValidatedSelection, FieldErrors> {
    let mut errors = FieldErrors::new();

    if draft.selected_package.is_none() {
        errors.insert(Field::Package, Message::PackageRequired.text(language));
    }

    let commission = check_commission(draft, language, &mut errors);

    if draft.start_date == StartDate::FixedFutureDate
        && !policy.offers_fixed_date(draft.customer_type, today)
    {
        errors.insert(Field::StartDate, Message::StartDateUnavailable.text(language));
    }

    if draft.sell_countries.is_empty() {
        errors.insert(Field::SellCountries, Message::SellCountriesRequired.text(language));
    }

    if draft.payout_frequency.is_none() {
        errors.insert(Field::PayoutFrequency, Message::PayoutFrequencyRequired.text(language));
    }

    if !draft.agreement_accepted {
        errors.insert(Field::Agreement, Message::AgreementRequired.text(language));
    }

    match (draft.selected_package, commission, draft.payout_frequency) {
        (Some(package), Some(commission_percentage), Some(payout_frequency))
            if errors.is_empty() =>
        {
            Ok(ValidatedSelection {
                package,
                addons: draft.selected_addons.clone(),
                billing_period: draft.billing_period,
                commission_percentage,
                start_date: draft.start_date,
                sell_countries: draft.sell_countries.clone(),
                payout_frequency,
            })
        }
        _ => Err(errors),
    }
}

/// Commission must be present, numeric, and at least the package floor. The
/// floor is only known once a package is chosen.
fn check_commission(
    draft: &PackageDraft,
    language: Language,
    errors: &mut FieldErrors,
) -> Option<Decimal> {
    let floor = draft.selected_package.map(PackageTier::min_commission);
    let input = draft.commission_percentage.trim();

    if input.is_empty() {
        let min = floor.map(|f| f.to_string()).unwrap_or_default();
        errors.insert(
            Field::Commission,
            Message::CommissionRequired.text(language).replace("{min}", &min),
        );
        return None;
    }

    let Some(value) = parse_commission(input) else {
        errors.insert(Field::Commission, Message::CommissionInvalid.text(language));
        return None;
    };

    match (draft.selected_package, floor) {
        (Some(package), Some(min)) if value < min => {
            errors.insert(
                Field::Commission,
                Message::CommissionBelowMinimum
                    .text(language)
                    .replace("{min}", &min.to_string())
                    .replace("{package}", &package.to_string()),
            );
            None
        }
        _ => Some(value),
    }
}
