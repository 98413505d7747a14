//! Hotel and car checkout.
//!
//! Same lifecycle as a profile submission without the dirty check: validate the
//! traveler and card fields, price the stay, post the booking, adopt the
//! returned user and open the confirmation screen after the redirect delay.
use super::{
    backend::{Backend, BookingRequest, Reservation},
    cache::UserCache,
    config::EngineConfig,
    error::{TripError, WorkflowError},
    messages::{FieldErrors, MessageBus},
    navigate::Navigator,
    record::Record,
    submit::{SubmissionController, SubmissionState, SubmitOutcome},
    trip::{Price, Quote, nights, quote_per_day},
    validate::FormRules,
};
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

pub const BOOKING_CONFIRMATION: &str = "/booking-confirmation";
pub const BOOKED_MESSAGE: &str = "Booking confirmed";

#[derive(Clone, Debug, PartialEq)]
pub struct HotelOffer {
    pub details: Value,
    pub nightly_rate: Price,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl HotelOffer {
    pub fn quote(&self) -> Result<Quote, TripError> {
        quote_per_day(self.nightly_rate, nights(self.check_in, self.check_out)?)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CarOffer {
    pub details: Value,
    pub daily_rate: Price,
    pub pick_up: NaiveDate,
    pub drop_off: NaiveDate,
}

impl CarOffer {
    pub fn quote(&self) -> Result<Quote, TripError> {
        quote_per_day(self.daily_rate, nights(self.pick_up, self.drop_off)?)
    }
}

pub struct Checkout {
    backend: Arc<dyn Backend>,
    cache: UserCache,
    rules: FormRules,
    field_errors: FieldErrors,
    controller: SubmissionController,
    today: Option<NaiveDate>,
}

impl Checkout {
    pub fn new(
        backend: Arc<dyn Backend>,
        cache: UserCache,
        config: &EngineConfig,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let messages = MessageBus::new(config.message_ttl);
        let controller = SubmissionController::new(Arc::clone(&backend), cache.clone(), messages)
            .with_success_message(BOOKED_MESSAGE)
            .redirect_to(BOOKING_CONFIRMATION, navigator, config.redirect_delay);

        Self {
            backend,
            cache,
            rules: FormRules::checkout(),
            field_errors: FieldErrors::new(config.message_ttl),
            controller,
            today: None,
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn state(&self) -> SubmissionState {
        self.controller.state()
    }
    pub fn messages(&self) -> &MessageBus {
        self.controller.messages()
    }
    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }
    pub fn navigation_pending(&self) -> bool {
        self.controller.navigation_pending()
    }

    pub async fn book_hotel(&self, form: &Record, offer: &HotelOffer) -> SubmitOutcome {
        self.book(form, Reservation::Hotel, &offer.details, offer.quote())
            .await
    }

    pub async fn book_car(&self, form: &Record, offer: &CarOffer) -> SubmitOutcome {
        self.book(form, Reservation::Car, &offer.details, offer.quote())
            .await
    }

    pub fn teardown(&self) {
        self.field_errors.clear_all();
        self.controller.teardown();
    }

    async fn book(
        &self,
        form: &Record,
        reservation: Reservation,
        details: &Value,
        quote: Result<Quote, TripError>,
    ) -> SubmitOutcome {
        if self.controller.is_pending() {
            return SubmitOutcome::Busy;
        }

        let today = self.today.unwrap_or_else(|| Utc::now().date_naive());
        let errors = self.rules.validate(form, today);
        if !errors.is_empty() {
            debug!(count = errors.len(), "checkout blocked by validation");
            for error in &errors {
                self.field_errors.flash(error.field.as_str(), error.message.clone());
            }
            return self.controller.reject_invalid(errors);
        }

        let quote = match quote {
            Ok(quote) => quote,
            Err(e) => return self.controller.fail_locally(&e.to_string()),
        };
        let Some(user_id) = self.cache.user_id() else {
            return self
                .controller
                .fail_locally(&WorkflowError::NotSignedIn.to_string());
        };

        let request = BookingRequest {
            reservation,
            form_data: form.to_value(),
            details: details.clone(),
            total: quote.total.amount.round_dp(2),
        };
        info!(%user_id, ?reservation, total = %quote.total, "placing booking");
        self.controller
            .run(self.backend.book(&user_id, &request))
            .await
    }
}
