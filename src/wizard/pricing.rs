//! Package prices.
//!
//! Two yearly formulas exist and are kept apart on purpose:
//! - the wizard charges 12 months at 30% off, unrounded ([`wizard_total`]);
//! - the public price table shows 12 months at 25% off, rounded to end in
//!   `.95` ([`display_yearly_price`]).

use crate::wizard::draft::{Addon, BillingPeriod, PackageTier};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::BTreeSet;

const WIZARD_YEARLY_FACTOR: Decimal = dec!(0.7);
const DISPLAY_YEARLY_FACTOR: Decimal = dec!(0.75);

/// Package plus selected add-ons, per month.
pub fn monthly_total(package: PackageTier, addons: &BTreeSet<Addon>) -> Decimal {
    addons
        .iter()
        .fold(package.monthly_price(), |total, addon| total + addon.monthly_price())
}

/// Amount charged for the chosen billing period.
pub fn wizard_total(package: PackageTier, addons: &BTreeSet<Addon>, period: BillingPeriod) -> Decimal {
    let monthly = monthly_total(package, addons);
    match period {
        BillingPeriod::Monthly => monthly,
        BillingPeriod::Yearly => monthly * dec!(12) * WIZARD_YEARLY_FACTOR,
    }
}

/// Yearly price shown on the pricing page for a monthly price.
pub fn display_yearly_price(monthly: Decimal) -> Decimal {
    let discounted = monthly * dec!(12) * DISPLAY_YEARLY_FACTOR;
    discounted.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero) - dec!(0.05)
}

/// One row of the public price table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRow {
    pub package: PackageTier,
    pub min_commission: Decimal,
    pub price: Decimal,
    pub billing_period: BillingPeriod,
}

pub fn price_table(period: BillingPeriod) -> Vec<PriceRow> {
    PackageTier::ALL
        .iter()
        .map(|&package| {
            let monthly = package.monthly_price();
            PriceRow {
                package,
                min_commission: package.min_commission(),
                price: match period {
                    BillingPeriod::Monthly => monthly,
                    BillingPeriod::Yearly => display_yearly_price(monthly),
                },
                billing_period: period,
            }
        })
        .collect()
}
