//! Walks a profile edit, a hotel checkout and a cancellation against a local
//! sled document store. Run with `RUST_LOG=debug` to see the lifecycle.

use anyhow::Context;
use booking_forms::{
    FieldPath, FormSession, FormSpec, UserCache,
    cancel::CancellationWorkflow,
    checkout::{Checkout, HotelOffer},
    config::EngineConfig,
    messages::MessageBus,
    navigate::{ChannelNavigator, Navigator},
    record::Record,
    store::SledBackend,
    trip::{Currency, Price},
    validate::FormRules,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let temp_dir = tempfile::tempdir()?;
    let db = sled::open(temp_dir.path().join("demo.db"))?;
    let store = Arc::new(SledBackend::new(Arc::new(db)));

    let user_id = store.insert_user(json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.com",
        "phoneNumber": "5551234567",
        "bookings": []
    }))?;
    let user = store.load_user(&user_id)?.context("user was just stored")?;

    let cache = UserCache::new();
    cache.sign_in(Record::from(serde_json::Value::Object(user)));

    let config = EngineConfig::load();
    let (navigator, mut destinations) = ChannelNavigator::new();
    let navigator = Arc::new(navigator);

    // profile edit
    let mut session = FormSession::load(
        &cache,
        store.clone(),
        FormSpec::new(FormRules::names().extend(FormRules::emergency_contact()))
            .then_navigate_to("/account"),
        &config,
        Some(navigator.clone() as Arc<dyn Navigator>),
    )?;
    session.edit(&FieldPath::EmergencyName.path(), "Charles Babbage");
    session.edit(&FieldPath::EmergencyPhone.path(), "5559876543");
    println!("profile submit: {:?}", session.submit().await);
    println!("resubmit: {:?}", session.submit().await);

    // hotel checkout
    let form = cache
        .user()
        .context("still signed in")?
        .set(&FieldPath::CardHolder.path(), "Ada Lovelace")
        .set(&FieldPath::CardNumber.path(), "4242 4242 4242 4242")
        .set(&FieldPath::CardExpiration.path(), "12/2099")
        .set(&FieldPath::CardSecurityCode.path(), "123");
    let offer = HotelOffer {
        details: json!({ "name": "Seaview", "city": "Lisbon" }),
        nightly_rate: Price::new(Decimal::new(8900, 2), Currency::EUR),
        check_in: NaiveDate::from_ymd_opt(2099, 6, 1).context("date")?,
        check_out: NaiveDate::from_ymd_opt(2099, 6, 4).context("date")?,
    };
    println!("quote: {:?}", offer.quote()?);
    let checkout = Checkout::new(store.clone(), cache.clone(), &config, navigator);
    println!("checkout: {:?}", checkout.book_hotel(&form, &offer).await);

    // cancellation
    let bookings = cache.bookings();
    let booking = bookings.first().context("the checkout stored a booking")?;
    let cancel = CancellationWorkflow::new(store.clone(), cache.clone(), MessageBus::default());
    cancel.request_cancel(booking.id.clone())?;
    println!("remaining after cancel: {:?}", cancel.confirm().await?);

    while let Some(destination) = destinations.recv().await {
        println!("navigated to {destination}");
        if destination == "/booking-confirmation" {
            break;
        }
    }

    Ok(())
}
