//! Package selection wizard
//!
//! Guides a seller from the customer type choice through identification and
//! the package form to a submitted selection and a payment link.
//!
//! # Modules
//!
//! - `draft`: the accumulated selection and its domain types
//! - `pricing`: package and add-on prices, wizard totals, the pricing table
//! - `validation`: per-step validation with localized field errors
//! - `query`: the `sellerId` / `newCustomer` / `package` / `payment` query
//! - `machine`: the stage machine that ties it together

mod draft;
mod machine;
mod pricing;
mod query;
mod validation;

pub use draft::{
    Addon, BillingPeriod, CountryCode, CustomerType, NewCustomerRecord, PackageDraft,
    PackageTier, PayoutFrequency, SellerIdentity, StartDate, StartDatePolicy,
};
pub use machine::{Stage, Wizard, WizardError};
pub use pricing::{display_yearly_price, monthly_total, price_table, wizard_total, PriceRow};
pub use query::{package_url, WizardQuery, PACKAGE_PAGE};
pub use validation::{
    is_valid_bic, is_valid_email, is_valid_iban, parse_commission, validate_existing_customer,
    validate_new_customer, validate_package_form, Field, FieldErrors, ValidatedSelection,
};
