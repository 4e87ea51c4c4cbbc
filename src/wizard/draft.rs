//! Package selection draft: everything the wizard collects before submission.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
    New,
    Existing,
}

/// Service level a seller subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PackageTier {
    A,
    B,
    C,
}

impl PackageTier {
    pub const ALL: [PackageTier; 3] = [PackageTier::A, PackageTier::B, PackageTier::C];

    /// Lowest commission percentage a seller may assign on this package.
    pub fn min_commission(self) -> Decimal {
        match self {
            PackageTier::A => dec!(12),
            PackageTier::B | PackageTier::C => dec!(4),
        }
    }

    /// Monthly subscription price in euros.
    pub fn monthly_price(self) -> Decimal {
        match self {
            PackageTier::A => dec!(29.00),
            PackageTier::B => dec!(49.00),
            PackageTier::C => dec!(99.00),
        }
    }

    pub fn parse(value: &str) -> Option<PackageTier> {
        match value.trim() {
            "A" | "a" => Some(PackageTier::A),
            "B" | "b" => Some(PackageTier::B),
            "C" | "c" => Some(PackageTier::C),
            _ => None,
        }
    }
}

impl fmt::Display for PackageTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            PackageTier::A => "A",
            PackageTier::B => "B",
            PackageTier::C => "C",
        };
        f.write_str(letter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Addon {
    #[serde(rename = "dealCSS")]
    DealCss,
    #[serde(rename = "caas")]
    Caas,
}

impl Addon {
    pub fn monthly_price(self) -> Decimal {
        match self {
            Addon::DealCss => dec!(24.95),
            Addon::Caas => dec!(39.95),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    #[default]
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutFrequency {
    Weekly,
    Monthly,
}

/// Countries a seller can list products in, one per marketplace domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CountryCode {
    NL,
    DE,
    FR,
    BE,
    AT,
    DK,
    IT,
}

impl CountryCode {
    pub const ALL: [CountryCode; 7] = [
        CountryCode::NL,
        CountryCode::DE,
        CountryCode::FR,
        CountryCode::BE,
        CountryCode::AT,
        CountryCode::DK,
        CountryCode::IT,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StartDate {
    #[default]
    Immediate,
    FixedFutureDate,
}

/// Decides whether the fixed future start date is still on offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartDatePolicy {
    pub fixed_date: NaiveDate,
}

impl StartDatePolicy {
    pub fn new(fixed_date: NaiveDate) -> Self {
        Self { fixed_date }
    }

    /// Only existing customers get the fixed date, and only before it passes.
    pub fn offers_fixed_date(&self, customer: Option<CustomerType>, today: NaiveDate) -> bool {
        customer == Some(CustomerType::Existing) && today < self.fixed_date
    }

    /// Value sent to the backend: `immediate` or the ISO date.
    pub fn wire_value(&self, start: StartDate) -> String {
        match start {
            StartDate::Immediate => "immediate".to_string(),
            StartDate::FixedFutureDate => self.fixed_date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Registration data for a seller without an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewCustomerRecord {
    pub company_name: String,
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub kvk_number: String,
    pub vat_number: String,
    pub iban: String,
    pub bic: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum SellerIdentity {
    /// The seller id is assigned server-side.
    New(NewCustomerRecord),
    #[serde(rename_all = "camelCase")]
    Existing {
        seller_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        email: Option<String>,
    },
}

/// Client-side draft, mutated by wizard events and submitted once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageDraft {
    pub customer_type: Option<CustomerType>,
    pub selected_package: Option<PackageTier>,
    pub selected_addons: BTreeSet<Addon>,
    pub billing_period: BillingPeriod,
    pub seller_identity: Option<SellerIdentity>,
    /// Raw commission input; parsed during validation.
    pub commission_percentage: String,
    pub start_date: StartDate,
    pub sell_countries: BTreeSet<CountryCode>,
    pub payout_frequency: Option<PayoutFrequency>,
    pub agreement_accepted: bool,
}

impl PackageDraft {
    /// Flip an add-on on or off; returns whether it is now selected.
    pub fn toggle_addon(&mut self, addon: Addon) -> bool {
        if !self.selected_addons.remove(&addon) {
            self.selected_addons.insert(addon);
            true
        } else {
            false
        }
    }

    /// Flip a sell country on or off; returns whether it is now selected.
    pub fn toggle_country(&mut self, country: CountryCode) -> bool {
        if !self.sell_countries.remove(&country) {
            self.sell_countries.insert(country);
            true
        } else {
            false
        }
    }
}
