//! Smoke screen unit tests for the booking form engine components
//!
//! These tests span the codebase and exercise each component in isolation
//! from the integration scenarios. They are intended as a smoke screen and
//! mostly test the happy path plus the documented edge examples.
//!
#![allow(unused_imports)]

use booking_forms::{
    BookingKind, FieldPath, Node, Path, PathError, Record,
    backend::{Booking, BookingRequest, Reservation},
    cache::UserCache,
    config::EngineConfig,
    dirty::{changed_paths, is_dirty},
    trip::{
        Currency, Price, TripDuration, duration_minutes, nights, parse_instant, quote,
        quote_per_day,
    },
    utils::new_uuid_to_bech32,
    validate::{
        FormRules, format_card_number, validate_card_expiry, validate_card_number,
        validate_date_of_birth, validate_document_expiry, validate_known_traveler_number,
        validate_phone_number, validate_redress_number, validate_required,
        validate_security_code,
    },
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;
use std::time::Duration;

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

// UTILS MODULE TESTS
#[cfg(test)]
mod utils_tests {
    use super::*;

    /// Ids are bech32 strings carrying the requested prefix
    #[test]
    fn generates_valid_bech32_with_hrp() {
        let encoded = new_uuid_to_bech32("booking").unwrap();
        assert!(encoded.starts_with("booking1"));
        assert!(encoded.len() > 10);
    }

    /// An empty prefix is not a valid bech32 hrp
    #[test]
    fn handles_empty_hrp() {
        assert!(new_uuid_to_bech32("").is_err());
    }

    /// Multiple calls generate unique identifiers
    #[test]
    fn generates_unique_ids() {
        let id1 = new_uuid_to_bech32("user").unwrap();
        let id2 = new_uuid_to_bech32("user").unwrap();
        assert_ne!(id1, id2);
    }
}

// PATH MODULE TESTS
#[cfg(test)]
mod path_tests {
    use super::*;

    /// Dot paths split into segments and print back unchanged
    #[test]
    fn parses_and_displays() {
        let path = Path::parse("travelDocument.expirationDate").unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path.to_string(), "travelDocument.expirationDate");
    }

    /// Empty paths and empty segments are rejected
    #[test]
    fn rejects_malformed_paths() {
        assert_eq!(Path::parse(""), Err(PathError::Empty));
        assert!(matches!(
            Path::parse("location..city"),
            Err(PathError::EmptySegment(_))
        ));
    }

    /// Every known leaf round-trips through its string form
    #[test]
    fn known_fields_match_their_paths() {
        for field in FieldPath::ALL {
            assert_eq!(field.path(), Path::parse(field.as_str()).unwrap());
        }
        assert_eq!(FieldPath::EmergencyPhone.as_str(), "emergency.phoneNumber");
    }
}

// RECORD MODULE TESTS
#[cfg(test)]
mod record_tests {
    use super::*;

    /// Writing a nested field keeps the sibling subtree shared
    #[test]
    fn set_shares_siblings() {
        let record = Record::from(json!({
            "location": { "city": "Lagos" },
            "emergency": { "name": "Bo" }
        }));
        let written = record.set(&FieldPath::LocationCity.path(), "Accra");

        let before = record.get(&Path::parse("emergency").unwrap()).unwrap();
        let after = written.get(&Path::parse("emergency").unwrap()).unwrap();
        assert!(before.ptr_eq(after));
        assert_eq!(record.str_at(&FieldPath::LocationCity.path()), Some("Lagos"));
        assert_eq!(written.str_at(&FieldPath::LocationCity.path()), Some("Accra"));
    }

    /// Missing intermediates are created on write
    #[test]
    fn set_creates_missing_maps() {
        let written = Record::new().set(&FieldPath::CardHolder.path(), "Ada Lovelace");
        assert_eq!(
            written.to_value(),
            json!({ "paymentCard": { "holder": "Ada Lovelace" } })
        );
    }

    /// A deep copy compares equal but shares nothing
    #[test]
    fn deep_copy_is_equal_and_independent() {
        let record = Record::from(json!({ "location": { "city": "Lagos" } }));
        let copy = record.deep_copy();
        assert_eq!(record, copy);

        let path = Path::parse("location").unwrap();
        assert!(!record.get(&path).unwrap().ptr_eq(copy.get(&path).unwrap()));
    }
}

// DIRTY MODULE TESTS
#[cfg(test)]
mod dirty_tests {
    use super::*;

    /// A record is never dirty against itself
    #[test]
    fn same_record_is_clean() {
        let record = Record::from(json!({ "firstName": "Ada" }));
        assert!(!is_dirty(&record, &record));
    }

    /// A change to a nested leaf is reported by its full path
    #[test]
    fn nested_change_is_dirty() {
        let snapshot = Record::from(json!({ "emergency": { "name": "Bo", "phoneNumber": "5550100200" } }));
        let record = snapshot.set(&FieldPath::EmergencyPhone.path(), "5550100300");

        assert!(is_dirty(&record, &snapshot));
        assert_eq!(
            changed_paths(&record, &snapshot),
            vec![FieldPath::EmergencyPhone.path()]
        );
    }
}

// VALIDATE MODULE TESTS
#[cfg(test)]
mod validate_tests {
    use super::*;

    /// Blank and whitespace-only values are missing
    #[test]
    fn required_rejects_blank() {
        assert_eq!(
            validate_required("last name", "  ").as_deref(),
            Some("Kindly enter your last name")
        );
        assert_eq!(validate_required("last name", "King"), None);
    }

    /// Card numbers are checked after stripping spaces
    #[test]
    fn card_number_examples() {
        assert_eq!(validate_card_number("4242 4242 4242 4242"), None);
        assert!(validate_card_number("4242 4242 4242").is_some());
        assert_eq!(format_card_number("4242424242424242999"), "4242 4242 4242 4242");
    }

    /// February 30th never exists, February 29th does in leap years
    #[test]
    fn date_of_birth_examples() {
        let today = day(2025, 6, 1);
        assert!(validate_date_of_birth("02/30/2000", today).is_some());
        assert_eq!(validate_date_of_birth("02/29/2000", today), None);
        assert!(validate_date_of_birth("02/29/2001", today).is_some());
    }

    /// Travelers must be at least sixteen by calendar year
    #[test]
    fn date_of_birth_age_window() {
        let today = day(2025, 6, 1);
        assert_eq!(validate_date_of_birth("12/31/2009", today), None);
        assert!(validate_date_of_birth("01/01/2010", today).is_some());
        assert!(validate_date_of_birth("01/01/1899", today).is_some());
    }

    /// An expiry month that has started is already expired
    #[test]
    fn card_expiry_examples() {
        let today = day(2025, 6, 15);
        assert_eq!(
            validate_card_expiry("01/2020", today).as_deref(),
            Some("Card has expired")
        );
        assert!(validate_card_expiry("06/2025", today).is_some());
        assert_eq!(validate_card_expiry("07/2025", today), None);
        assert!(validate_card_expiry("13/2030", today).is_some());
    }

    /// Document expiry only needs to be this year or later
    #[test]
    fn document_expiry_examples() {
        let today = day(2025, 6, 15);
        assert_eq!(validate_document_expiry("01/01/2025", today), None);
        assert!(validate_document_expiry("12/31/2024", today).is_some());
        assert!(validate_document_expiry("04/31/2030", today).is_some());
    }

    /// Digit windows for the numeric identity fields
    #[test]
    fn digit_windows() {
        assert_eq!(validate_phone_number("5550100200"), None);
        assert!(validate_phone_number("555010020").is_some());
        assert_eq!(validate_known_traveler_number("12345"), None);
        assert!(validate_known_traveler_number("12345678901").is_some());
        assert_eq!(validate_redress_number("1234567"), None);
        assert!(validate_redress_number("123456").is_some());
        assert_eq!(validate_security_code("1234"), None);
        assert!(validate_security_code("12").is_some());
    }

    /// The first failing rule per field is reported, in rule order
    #[test]
    fn form_rules_report_first_error_per_field() {
        let record = Record::from(json!({ "firstName": "", "phoneNumber": "abc" }));
        let errors = FormRules::personal_details().validate(&record, day(2025, 1, 1));

        let fields: Vec<FieldPath> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                FieldPath::FirstName,
                FieldPath::LastName,
                FieldPath::PhoneNumber,
                FieldPath::DateOfBirth,
            ]
        );
    }
}

// TRIP MODULE TESTS
#[cfg(test)]
mod trip_tests {
    use super::*;

    /// A 10:00 to 12:30 flight lasts 2h 30m; 100.00 carries 10.00 tax
    #[test]
    fn flight_duration_and_price() {
        let departure = parse_instant("2024-01-01T10:00:00Z").unwrap();
        let arrival = parse_instant("2024-01-01T12:30:00Z").unwrap();
        assert_eq!(duration_minutes(departure, arrival), Ok(150));
        assert_eq!(
            TripDuration::between(departure, arrival).unwrap().to_string(),
            "2h 30m"
        );

        let quote = quote(Price::new(Decimal::new(10_000, 2), Currency::USD));
        assert_eq!(quote.tax.to_string(), "$10.00");
        assert_eq!(quote.total.to_string(), "$110.00");
    }

    /// Hotel stays are priced per night
    #[test]
    fn hotel_stay_quote() {
        let stay = nights(day(2024, 3, 1), day(2024, 3, 4)).unwrap();
        let quote = quote_per_day(Price::new(Decimal::new(8_900, 2), Currency::GBP), stay).unwrap();
        assert_eq!(quote.base.to_string(), "£267.00");
        assert_eq!(quote.total.to_string(), "£293.70");
    }

    /// Minute-precision timestamps as bookings carry them
    #[test]
    fn minute_precision_flight_times() {
        let departure = parse_instant("2024-01-01T10:00Z").unwrap();
        let arrival = parse_instant("2024-01-01T12:30Z").unwrap();
        assert_eq!(duration_minutes(departure, arrival), Ok(150));
        assert_eq!(
            TripDuration::between(departure, arrival).unwrap().to_string(),
            "2h 30m"
        );
    }

    /// Unparseable instants are reported with the raw text
    #[test]
    fn invalid_instant_is_reported() {
        assert!(parse_instant("yesterday").is_err());
    }
}

// BACKEND MODULE TESTS
#[cfg(test)]
mod backend_tests {
    use super::*;

    /// Bookings keep unknown fields when read and written back
    #[test]
    fn booking_carries_extra_fields() {
        let raw = json!({ "_id": "b1", "type": "car", "carDetails": { "model": "Corolla" } });
        let booking: Booking = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(booking.kind, BookingKind::Car);
        assert_eq!(serde_json::to_value(&booking).unwrap(), raw);
    }

    /// Reservation requests nest the offer under the kind's details key
    #[test]
    fn booking_request_body() {
        let request = BookingRequest {
            reservation: Reservation::Hotel,
            form_data: json!({ "firstName": "Ada" }),
            details: json!({ "name": "Seaview" }),
            total: Decimal::new(11_000, 2),
        };
        assert_eq!(
            request.body(),
            json!({
                "formData": { "firstName": "Ada" },
                "hotelDetails": { "name": "Seaview" },
                "total": "110.00"
            })
        );
    }
}

// CACHE AND CONFIG MODULE TESTS
#[cfg(test)]
mod cache_config_tests {
    use super::*;

    /// Signing out forgets the profile
    #[test]
    fn sign_in_and_out() {
        let cache = UserCache::new();
        cache.sign_in(Record::from(json!({ "_id": "u1", "bookings": [] })));
        assert_eq!(cache.user_id().as_deref(), Some("u1"));
        assert!(cache.bookings().is_empty());

        cache.sign_out();
        assert_eq!(cache.user(), None);
        assert_eq!(cache.user_id(), None);
    }

    /// Unset variables fall back to the defaults
    #[test]
    fn config_defaults() {
        let config = EngineConfig::load_with(|_| None);
        assert_eq!(config.api_url, "http://localhost:3000");
        assert_eq!(config.message_ttl, Duration::from_secs(3));
        assert_eq!(config.redirect_delay, Duration::from_secs(3));
    }
}
