//! The package selection wizard as an explicit state machine.
//!
//! ```text
//! ChooseCustomerType -> NewCustomerIntake | ExistingCustomerIntake
//!                    -> PackageForm -> Submitting -> SubmitSuccess -> PaymentRedirect
//!                                                 \-> SubmitError (retryable)
//! ```
//!
//! Network calls are split into `begin_*` / `finish_*` pairs so the in-flight
//! flag is observable between them; `submit` and `create_payment` drive a
//! whole round trip against a [`PackageApi`].

use crate::backend::{BackendError, PackageApi, PaymentLink, SubmitReceipt, SubmitRequest};
use crate::i18n::{Language, Message};
use crate::wizard::draft::{
    Addon, BillingPeriod, CountryCode, CustomerType, NewCustomerRecord, PackageDraft,
    PackageTier, PayoutFrequency, SellerIdentity, StartDate, StartDatePolicy,
};
use crate::wizard::pricing::wizard_total;
use crate::wizard::query::{package_url, WizardQuery};
use crate::wizard::validation::{
    validate_existing_customer, validate_new_customer, validate_package_form, Field, FieldErrors,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "stage")]
pub enum Stage {
    ChooseCustomerType,
    NewCustomerIntake,
    ExistingCustomerIntake,
    PackageForm,
    Submitting,
    SubmitError {
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    SubmitSuccess {
        package_selection_id: String,
        payment_error: Option<String>,
    },
    PaymentRedirect {
        url: String,
    },
    /// The payment provider sent the seller back with `payment=success`.
    PaymentConfirmed,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::ChooseCustomerType => "ChooseCustomerType",
            Stage::NewCustomerIntake => "NewCustomerIntake",
            Stage::ExistingCustomerIntake => "ExistingCustomerIntake",
            Stage::PackageForm => "PackageForm",
            Stage::Submitting => "Submitting",
            Stage::SubmitError { .. } => "SubmitError",
            Stage::SubmitSuccess { .. } => "SubmitSuccess",
            Stage::PaymentRedirect { .. } => "PaymentRedirect",
            Stage::PaymentConfirmed => "PaymentConfirmed",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("{} field(s) failed validation", .0.len())]
    Validation(FieldErrors),

    #[error("a request is already in flight")]
    InFlight,

    #[error("cannot {action} in stage {stage}")]
    InvalidTransition {
        action: &'static str,
        stage: &'static str,
    },

    /// A backend call failed; `message` is what the user sees.
    #[error("{message}")]
    Backend {
        message: String,
        #[source]
        source: BackendError,
    },
}

pub struct Wizard {
    language: Language,
    draft: PackageDraft,
    stage: Stage,
    errors: FieldErrors,
    in_flight: bool,
    policy: StartDatePolicy,
    today: NaiveDate,
    last_idempotency_key: Option<Uuid>,
}

impl Wizard {
    /// Start the wizard for a page visit with the given query parameters.
    pub fn mount(
        language: Language,
        query: &WizardQuery,
        policy: StartDatePolicy,
        today: NaiveDate,
    ) -> Self {
        let mut draft = PackageDraft {
            selected_package: query.package(),
            ..Default::default()
        };

        let stage = if query.payment_succeeded() {
            Stage::PaymentConfirmed
        } else if let Some(seller_id) = query.seller_id() {
            draft.customer_type = Some(CustomerType::Existing);
            draft.seller_identity = Some(SellerIdentity::Existing {
                seller_id: seller_id.to_string(),
                email: None,
            });
            Stage::PackageForm
        } else if query.is_new_customer() {
            draft.customer_type = Some(CustomerType::New);
            Stage::NewCustomerIntake
        } else {
            Stage::ChooseCustomerType
        };

        debug!("Wizard mounted in {} at {}", language, stage.name());
        Self::with_state(language, draft, stage, policy, today)
    }

    /// Continue at the package form with a draft collected elsewhere.
    ///
    /// The seller identity must be present and valid; the customer type is
    /// taken from it.
    pub fn resume(
        language: Language,
        mut draft: PackageDraft,
        policy: StartDatePolicy,
        today: NaiveDate,
    ) -> Result<Self, WizardError> {
        let customer_type = match &draft.seller_identity {
            Some(SellerIdentity::New(record)) => {
                validate_new_customer(record, language).map_err(WizardError::Validation)?;
                CustomerType::New
            }
            Some(SellerIdentity::Existing { seller_id, .. }) if !seller_id.trim().is_empty() => {
                CustomerType::Existing
            }
            Some(SellerIdentity::Existing { .. }) => {
                let mut errors = FieldErrors::new();
                errors.insert(Field::SellerId, Message::SellerIdRequired.text(language));
                return Err(WizardError::Validation(errors));
            }
            None => {
                return Err(WizardError::InvalidTransition {
                    action: "resume without a seller identity",
                    stage: Stage::ChooseCustomerType.name(),
                })
            }
        };
        draft.customer_type = Some(customer_type);

        Ok(Self::with_state(language, draft, Stage::PackageForm, policy, today))
    }

    fn with_state(
        language: Language,
        draft: PackageDraft,
        stage: Stage,
        policy: StartDatePolicy,
        today: NaiveDate,
    ) -> Self {
        Self {
            language,
            draft,
            stage,
            errors: FieldErrors::new(),
            in_flight: false,
            policy,
            today,
            last_idempotency_key: None,
        }
    }

    // ==================== Accessors ====================

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn draft(&self) -> &PackageDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Follow a language change broadcast by the router.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Key sent with the most recent submission attempt.
    pub fn last_idempotency_key(&self) -> Option<Uuid> {
        self.last_idempotency_key
    }

    pub fn offers_fixed_start_date(&self) -> bool {
        self.policy
            .offers_fixed_date(self.draft.customer_type, self.today)
    }

    /// Commission floor; only known once a package is chosen.
    pub fn min_commission(&self) -> Option<Decimal> {
        self.draft.selected_package.map(PackageTier::min_commission)
    }

    /// Total for the summary panel; only known once a package is chosen.
    pub fn total(&self) -> Option<Decimal> {
        self.draft.selected_package.map(|package| {
            wizard_total(package, &self.draft.selected_addons, self.draft.billing_period)
        })
    }

    /// URL of the current page for sharing or resuming. Carries the seller id
    /// once an existing seller is identified.
    pub fn shareable_url(&self) -> String {
        let query = match &self.draft.seller_identity {
            Some(SellerIdentity::Existing { seller_id, .. }) => {
                WizardQuery::for_existing_seller(seller_id)
            }
            _ if self.draft.customer_type == Some(CustomerType::New) => {
                WizardQuery::for_new_customer(self.draft.selected_package)
            }
            _ => WizardQuery::default(),
        };
        package_url(self.language, &query)
    }

    // ==================== Customer Type & Intake ====================

    pub fn choose_customer_type(&mut self, customer_type: CustomerType) -> Result<(), WizardError> {
        self.expect_stage(&[Stage::ChooseCustomerType], "choose a customer type")?;

        self.draft.customer_type = Some(customer_type);
        self.stage = match customer_type {
            CustomerType::New => Stage::NewCustomerIntake,
            CustomerType::Existing => Stage::ExistingCustomerIntake,
        };
        Ok(())
    }

    /// Return from an intake step to the customer type choice.
    pub fn back(&mut self) -> Result<(), WizardError> {
        self.expect_stage(
            &[Stage::NewCustomerIntake, Stage::ExistingCustomerIntake],
            "go back",
        )?;
        self.draft.customer_type = None;
        self.errors = FieldErrors::new();
        self.stage = Stage::ChooseCustomerType;
        Ok(())
    }

    pub fn submit_new_customer(&mut self, record: NewCustomerRecord) -> Result<(), WizardError> {
        self.expect_stage(&[Stage::NewCustomerIntake], "submit new customer details")?;

        if let Err(errors) = validate_new_customer(&record, self.language) {
            return Err(self.reject(errors));
        }

        self.errors = FieldErrors::new();
        self.draft.seller_identity = Some(SellerIdentity::New(record));
        self.stage = Stage::PackageForm;
        Ok(())
    }

    /// Identify an existing seller. On success the seller id becomes part of
    /// [`Wizard::shareable_url`].
    pub fn submit_existing_customer(&mut self, email: &str, seller_id: &str) -> Result<(), WizardError> {
        self.expect_stage(&[Stage::ExistingCustomerIntake], "submit seller login")?;

        if let Err(errors) = validate_existing_customer(email, seller_id, self.language) {
            return Err(self.reject(errors));
        }

        self.errors = FieldErrors::new();
        self.draft.seller_identity = Some(SellerIdentity::Existing {
            seller_id: seller_id.trim().to_string(),
            email: Some(email.trim().to_string()),
        });
        self.stage = Stage::PackageForm;
        Ok(())
    }

    // ==================== Package Form Edits ====================

    pub fn select_package(&mut self, package: PackageTier) -> Result<(), WizardError> {
        self.edit(Field::Package, |draft| draft.selected_package = Some(package))
    }

    pub fn toggle_addon(&mut self, addon: Addon) -> Result<(), WizardError> {
        self.ensure_editable("change add-ons")?;
        self.draft.toggle_addon(addon);
        Ok(())
    }

    pub fn set_billing_period(&mut self, period: BillingPeriod) -> Result<(), WizardError> {
        self.ensure_editable("change the billing period")?;
        self.draft.billing_period = period;
        Ok(())
    }

    pub fn set_commission(&mut self, input: &str) -> Result<(), WizardError> {
        let input = input.to_string();
        self.edit(Field::Commission, |draft| draft.commission_percentage = input)
    }

    pub fn set_start_date(&mut self, start_date: StartDate) -> Result<(), WizardError> {
        self.ensure_editable("change the start date")?;
        if start_date == StartDate::FixedFutureDate && !self.offers_fixed_start_date() {
            let mut errors = FieldErrors::new();
            errors.insert(Field::StartDate, Message::StartDateUnavailable.text(self.language));
            return Err(self.reject(errors));
        }
        self.edit(Field::StartDate, |draft| draft.start_date = start_date)
    }

    pub fn toggle_country(&mut self, country: CountryCode) -> Result<(), WizardError> {
        self.edit(Field::SellCountries, |draft| {
            draft.toggle_country(country);
        })
    }

    pub fn set_payout_frequency(&mut self, frequency: PayoutFrequency) -> Result<(), WizardError> {
        self.edit(Field::PayoutFrequency, |draft| draft.payout_frequency = Some(frequency))
    }

    pub fn set_agreement(&mut self, accepted: bool) -> Result<(), WizardError> {
        self.edit(Field::Agreement, |draft| draft.agreement_accepted = accepted)
    }

    // ==================== Submission ====================

    /// Validate the form and, if it passes, enter `Submitting`.
    ///
    /// Every attempt gets a fresh idempotency key.
    pub fn begin_submit(&mut self) -> Result<SubmitRequest, WizardError> {
        self.begin_submit_with_key(Uuid::new_v4())
    }

    /// Like [`Wizard::begin_submit`], reusing the key of an attempt the
    /// client already started.
    pub fn begin_submit_with_key(&mut self, key: Uuid) -> Result<SubmitRequest, WizardError> {
        if self.in_flight {
            return Err(WizardError::InFlight);
        }
        self.ensure_editable("submit")?;

        let selection = match validate_package_form(&self.draft, &self.policy, self.today, self.language) {
            Ok(selection) => selection,
            Err(errors) => return Err(self.reject(errors)),
        };
        let identity = self.draft.seller_identity.as_ref().ok_or(WizardError::InvalidTransition {
            action: "submit without a seller identity",
            stage: self.stage.name(),
        })?;

        let request = SubmitRequest::new(&selection, identity, self.language, &self.policy, key);

        self.errors = FieldErrors::new();
        self.last_idempotency_key = Some(key);
        self.in_flight = true;
        self.stage = Stage::Submitting;
        info!("Submitting package {} (attempt {})", selection.package, key);
        Ok(request)
    }

    pub fn finish_submit(&mut self, result: Result<SubmitReceipt, BackendError>) -> Result<(), WizardError> {
        self.expect_stage(&[Stage::Submitting], "finish a submission")?;
        self.in_flight = false;

        match result {
            Ok(receipt) => {
                info!("Package selection stored as {}", receipt.package_selection_id);
                self.stage = Stage::SubmitSuccess {
                    package_selection_id: receipt.package_selection_id,
                    payment_error: None,
                };
                Ok(())
            }
            Err(source) => {
                warn!("Package submission failed: {}", source);
                let message = source.user_message(self.language, Message::NetworkError);
                self.stage = Stage::SubmitError {
                    message: message.clone(),
                };
                Err(WizardError::Backend { message, source })
            }
        }
    }

    pub async fn submit(&mut self, api: &dyn PackageApi) -> Result<(), WizardError> {
        self.submit_with_key(api, Uuid::new_v4()).await
    }

    pub async fn submit_with_key(&mut self, api: &dyn PackageApi, key: Uuid) -> Result<(), WizardError> {
        let request = self.begin_submit_with_key(key)?;
        let result = api.submit_selection(&request).await;
        self.finish_submit(result)
    }

    // ==================== Payment ====================

    /// Start the payment request; returns the selection id to send.
    pub fn begin_payment(&mut self) -> Result<String, WizardError> {
        let Stage::SubmitSuccess {
            package_selection_id,
            ..
        } = &self.stage
        else {
            return Err(WizardError::InvalidTransition {
                action: "create a payment",
                stage: self.stage.name(),
            });
        };
        if self.in_flight {
            return Err(WizardError::InFlight);
        }

        let id = package_selection_id.clone();
        self.in_flight = true;
        Ok(id)
    }

    pub fn finish_payment(&mut self, result: Result<PaymentLink, BackendError>) -> Result<(), WizardError> {
        let Stage::SubmitSuccess {
            package_selection_id,
            ..
        } = &self.stage
        else {
            return Err(WizardError::InvalidTransition {
                action: "finish a payment",
                stage: self.stage.name(),
            });
        };
        let package_selection_id = package_selection_id.clone();
        self.in_flight = false;

        match result {
            Ok(link) => {
                info!("Redirecting {} to payment", package_selection_id);
                self.stage = Stage::PaymentRedirect { url: link.url };
                Ok(())
            }
            Err(source) => {
                warn!("Payment creation for {} failed: {}", package_selection_id, source);
                let message = source.user_message(self.language, Message::PaymentNetworkError);
                self.stage = Stage::SubmitSuccess {
                    package_selection_id,
                    payment_error: Some(message.clone()),
                };
                Err(WizardError::Backend { message, source })
            }
        }
    }

    /// Request the payment link; returns the URL to redirect the browser to.
    pub async fn create_payment(&mut self, api: &dyn PackageApi) -> Result<String, WizardError> {
        let id = self.begin_payment()?;
        let result = api.create_payment(&id).await;
        self.finish_payment(result)?;
        match &self.stage {
            Stage::PaymentRedirect { url } => Ok(url.clone()),
            other => Err(WizardError::InvalidTransition {
                action: "read the payment URL",
                stage: other.name(),
            }),
        }
    }

    // ==================== Internal ====================

    fn expect_stage(&self, allowed: &[Stage], action: &'static str) -> Result<(), WizardError> {
        if allowed.contains(&self.stage) {
            Ok(())
        } else {
            Err(WizardError::InvalidTransition {
                action,
                stage: self.stage.name(),
            })
        }
    }

    /// The form can be edited on the package form and after a failed submission.
    fn ensure_editable(&mut self, action: &'static str) -> Result<(), WizardError> {
        match self.stage {
            Stage::PackageForm => Ok(()),
            Stage::SubmitError { .. } => {
                self.stage = Stage::PackageForm;
                Ok(())
            }
            _ => Err(WizardError::InvalidTransition {
                action,
                stage: self.stage.name(),
            }),
        }
    }

    fn edit(&mut self, field: Field, apply: impl FnOnce(&mut PackageDraft)) -> Result<(), WizardError> {
        self.ensure_editable("edit the package form")?;
        apply(&mut self.draft);
        self.errors.clear(field);
        Ok(())
    }

    fn reject(&mut self, errors: FieldErrors) -> WizardError {
        debug!("Validation failed on {:?}", errors.fields().collect::<Vec<_>>());
        self.errors = errors.clone();
        WizardError::Validation(errors)
    }
}
