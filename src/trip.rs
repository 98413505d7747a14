//! Trip duration and price arithmetic
use super::error::TripError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Flat 10% tax on every booking.
pub const TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Currency {
    USD,
    EUR,
    GBP,
    INR,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::INR => "₹",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub amount: Decimal,
    pub currency: Currency,
}

impl Price {
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:.2}", self.currency.symbol(), self.amount)
    }
}

/// Base, tax and total of a booking, all in the base's currency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub base: Price,
    pub tax: Price,
    pub total: Price,
}

pub fn tax(base: Decimal) -> Decimal {
    base * TAX_RATE
}

pub fn total(base: Decimal) -> Decimal {
    base + tax(base)
}

pub fn quote(base: Price) -> Quote {
    Quote {
        base,
        tax: Price::new(tax(base.amount), base.currency),
        total: Price::new(total(base.amount), base.currency),
    }
}

/// Quote for `units` nights or rental days at `rate` each.
pub fn quote_per_day(rate: Price, units: i64) -> Result<Quote, TripError> {
    if units <= 0 {
        return Err(TripError::EmptyStay { days: units });
    }
    Ok(quote(Price::new(rate.amount * Decimal::from(units), rate.currency)))
}

/// Whole minutes from `start` to `end`, truncated.
///
/// An `end` before `start` means the booking data is corrupt and is reported
/// rather than clamped to zero.
pub fn duration_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64, TripError> {
    let elapsed = end - start;
    if elapsed < chrono::Duration::zero() {
        return Err(TripError::NegativeDuration {
            minutes: elapsed.num_minutes(),
        });
    }
    Ok(elapsed.num_minutes())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TripDuration {
    pub hours: i64,
    pub minutes: i64,
}

impl TripDuration {
    pub fn from_minutes(total: i64) -> Self {
        Self {
            hours: total / 60,
            minutes: total % 60,
        }
    }
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TripError> {
        duration_minutes(start, end).map(Self::from_minutes)
    }
    pub fn total_minutes(&self) -> i64 {
        self.hours * 60 + self.minutes
    }
}

impl fmt::Display for TripDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m", self.hours, self.minutes)
    }
}

/// Parse an instant such as `2024-01-01T10:00:00Z`.
///
/// Full RFC 3339 is tried first; minute precision (`2024-01-01T10:00Z`,
/// `2024-01-01T10:00+05:30`) is accepted as well.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, TripError> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ") {
        return Ok(naive.and_utc());
    }
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%:z")
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|_| TripError::InvalidTimestamp(raw.to_owned()))
}

/// Nights between check-in and check-out; also used for rental days.
pub fn nights(check_in: NaiveDate, check_out: NaiveDate) -> Result<i64, TripError> {
    let days = (check_out - check_in).num_days();
    if days <= 0 {
        return Err(TripError::EmptyStay { days });
    }
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn flight_duration_and_price() {
        let departure = parse_instant("2024-01-01T10:00:00Z").unwrap();
        let arrival = parse_instant("2024-01-01T12:30:00Z").unwrap();

        let duration = TripDuration::between(departure, arrival).unwrap();
        assert_eq!(duration.total_minutes(), 150);
        assert_eq!(duration.to_string(), "2h 30m");

        let quote = quote(Price::new(Decimal::new(10000, 2), Currency::USD));
        assert_eq!(quote.tax.amount, Decimal::new(1000, 2));
        assert_eq!(quote.total.amount, Decimal::new(11000, 2));
        assert_eq!(quote.total.to_string(), "$110.00");
    }

    #[test]
    fn minute_precision_instants_parse() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        assert_eq!(parse_instant("2024-01-01T10:00Z"), Ok(expected));
        assert_eq!(parse_instant("2024-01-01T15:30+05:30"), Ok(expected));
        assert_eq!(
            parse_instant("2024-01-01T10Z"),
            Err(TripError::InvalidTimestamp("2024-01-01T10Z".into()))
        );
    }

    #[test]
    fn same_instant_is_zero() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        assert_eq!(duration_minutes(at, at), Ok(0));
    }

    #[test]
    fn partial_minutes_truncate() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 10, 1, 59).unwrap();
        assert_eq!(duration_minutes(start, end), Ok(1));
    }

    #[test]
    fn negative_duration_is_an_error() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        assert_eq!(
            duration_minutes(start, end),
            Err(TripError::NegativeDuration { minutes: -120 })
        );
    }

    #[test]
    fn nights_require_a_positive_span() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        assert_eq!(nights(d(1), d(4)), Ok(3));
        assert!(nights(d(4), d(4)).is_err());
        assert!(nights(d(4), d(1)).is_err());
    }

    #[test]
    fn per_day_quote_multiplies_first() {
        let rate = Price::new(Decimal::new(4550, 2), Currency::EUR);
        let quote = quote_per_day(rate, 2).unwrap();
        assert_eq!(quote.base.amount, Decimal::new(9100, 2));
        assert_eq!(quote.total.amount, Decimal::new(10010, 2));
    }
}
