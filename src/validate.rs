//! Field validators for the profile, traveler and checkout forms.
//!
//! Every validator returns `None` when the value is acceptable and the message
//! to show otherwise. Validators that depend on the calendar take `today`
//! explicitly so they stay pure.
use super::{
    path::{FieldPath, Path},
    record::Record,
};
use chrono::{Datelike, NaiveDate};
use serde_json::Value;

pub const MIN_TRAVELER_AGE: i32 = 16;
pub const EARLIEST_BIRTH_YEAR: i32 = 1900;
pub const CARD_DIGITS: usize = 16;

pub fn validate_required(label: &str, value: &str) -> Option<String> {
    value
        .trim()
        .is_empty()
        .then(|| format!("Kindly enter your {label}"))
}

pub fn validate_phone_number(value: &str) -> Option<String> {
    digits_in_window("phone number", value, 10, 15)
}

pub fn validate_known_traveler_number(value: &str) -> Option<String> {
    digits_in_window("known traveler number", value, 5, 10)
}

pub fn validate_redress_number(value: &str) -> Option<String> {
    digits_in_window("redress number", value, 7, 15)
}

/// Whitespace is ignored; exactly 16 digits are required.
pub fn validate_card_number(value: &str) -> Option<String> {
    let stripped: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    if stripped.is_empty() {
        return Some("Kindly enter your card number".into());
    }
    if !is_digits(&stripped) {
        return Some("Card number must contain only digits".into());
    }
    if stripped.len() != CARD_DIGITS {
        return Some(format!("Card number must be {CARD_DIGITS} digits"));
    }
    None
}

/// Display form of a card number: digits only, capped at 16, in blocks of four.
pub fn format_card_number(input: &str) -> String {
    let digits: Vec<char> = input
        .chars()
        .filter(char::is_ascii_digit)
        .take(CARD_DIGITS)
        .collect();

    digits
        .chunks(4)
        .map(|block| block.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `MM/YYYY`; the first of that month must be strictly after `today`.
pub fn validate_card_expiry(value: &str, today: NaiveDate) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return Some("Kindly enter your card expiration date".into());
    }
    let Some((month, year)) = value.split_once('/') else {
        return Some("Expiration date must be in MM/YYYY format".into());
    };
    if month.is_empty() || year.is_empty() {
        return Some("Expiration date must be in MM/YYYY format".into());
    }
    if !is_digits(month) || !is_digits(year) {
        return Some("Expiration date must be numeric".into());
    }
    let first_of_month = match (month.parse::<u32>(), year.parse::<i32>()) {
        (Ok(month), Ok(year)) => NaiveDate::from_ymd_opt(year, month, 1),
        _ => None,
    };
    match first_of_month {
        None => Some("Invalid expiration date".into()),
        Some(date) if date <= today => Some("Card has expired".into()),
        Some(_) => None,
    }
}

pub fn validate_security_code(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return Some("Kindly enter your security code".into());
    }
    if !is_digits(value) || !(3..=4).contains(&value.len()) {
        return Some("Security code must be 3 or 4 digits".into());
    }
    None
}

/// `MM/DD/YYYY`, a real calendar date, born between 1900 and 16 years ago.
pub fn validate_date_of_birth(value: &str, today: NaiveDate) -> Option<String> {
    if value.trim().is_empty() {
        return Some("Kindly enter your date of birth".into());
    }
    let (month, day, year) = match parse_calendar_date(value) {
        Ok(parts) => parts,
        Err(message) => return Some(message),
    };
    if year < EARLIEST_BIRTH_YEAR {
        return Some(format!("Year of birth must be {EARLIEST_BIRTH_YEAR} or later"));
    }
    if year > today.year() - MIN_TRAVELER_AGE {
        return Some(format!("You must be at least {MIN_TRAVELER_AGE} years old"));
    }
    checked_date(month, day, year).err()
}

/// `MM/DD/YYYY`, a real calendar date, expiring this year or later.
pub fn validate_document_expiry(value: &str, today: NaiveDate) -> Option<String> {
    if value.trim().is_empty() {
        return Some("Kindly enter your passport expiration date".into());
    }
    let (month, day, year) = match parse_calendar_date(value) {
        Ok(parts) => parts,
        Err(message) => return Some(message),
    };
    if let Err(message) = checked_date(month, day, year) {
        return Some(message);
    }
    if year < today.year() {
        return Some("Passport expiration year cannot be in the past".into());
    }
    None
}

fn digits_in_window(label: &str, value: &str, min: usize, max: usize) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return Some(format!("Kindly enter your {label}"));
    }
    if !is_digits(value) {
        return Some(format!("{} must contain only digits", sentence_case(label)));
    }
    if !(min..=max).contains(&value.len()) {
        return Some(format!(
            "{} must be between {min} and {max} digits",
            sentence_case(label)
        ));
    }
    None
}

fn parse_calendar_date(value: &str) -> Result<(u32, u32, i32), String> {
    let parts: Vec<&str> = value.trim().split('/').collect();
    let [month, day, year] = parts.as_slice() else {
        return Err("Date must be in MM/DD/YYYY format".into());
    };
    if ![month, day, year].iter().all(|part| is_digits(part)) {
        return Err("Date must be in MM/DD/YYYY format".into());
    }
    let parsed = (month.parse::<u32>(), day.parse::<u32>(), year.parse::<i32>());
    let (Ok(month), Ok(day), Ok(year)) = parsed else {
        return Err("Date must be in MM/DD/YYYY format".into());
    };
    if !(1..=12).contains(&month) {
        return Err("Month must be between 01 and 12".into());
    }
    if !(1..=31).contains(&day) {
        return Err("Day must be between 01 and 31".into());
    }
    Ok((month, day, year))
}

// from_ymd_opt rejects dates that would roll over, e.g. 02/30 or 04/31
fn checked_date(month: u32, day: u32, year: i32) -> Result<NaiveDate, String> {
    NaiveDate::from_ymd_opt(year, month, day)
        .filter(|date| date.month() == month && date.day() == day && date.year() == year)
        .ok_or_else(|| "Please enter a valid date".to_string())
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

fn sentence_case(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Text of a record leaf as the form inputs see it.
pub fn field_text(record: &Record, path: &Path) -> String {
    match record.value_at(path) {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    Required,
    PhoneNumber,
    KnownTravelerNumber,
    RedressNumber,
    CardNumber,
    CardExpiry,
    SecurityCode,
    DateOfBirth,
    DocumentExpiry,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldRule {
    pub field: FieldPath,
    pub rule: Rule,
}

impl FieldRule {
    pub fn check(&self, value: &str, today: NaiveDate) -> Option<String> {
        match self.rule {
            Rule::Required => validate_required(self.field.label(), value),
            Rule::PhoneNumber => validate_phone_number(value),
            Rule::KnownTravelerNumber => validate_known_traveler_number(value),
            Rule::RedressNumber => validate_redress_number(value),
            Rule::CardNumber => validate_card_number(value),
            Rule::CardExpiry => validate_card_expiry(value, today),
            Rule::SecurityCode => validate_security_code(value),
            Rule::DateOfBirth => validate_date_of_birth(value, today),
            Rule::DocumentExpiry => validate_document_expiry(value, today),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: FieldPath,
    pub message: String,
}

/// Ordered rule set for one form. The first failing rule of a field wins.
#[derive(Clone, Debug, Default)]
pub struct FormRules {
    rules: Vec<FieldRule>,
}

impl FormRules {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with(mut self, field: FieldPath, rule: Rule) -> Self {
        self.rules.push(FieldRule { field, rule });
        self
    }
    pub fn extend(mut self, other: FormRules) -> Self {
        self.rules.extend(other.rules);
        self
    }
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
    pub fn rules_for<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = &'a FieldRule> + 'a {
        self.rules
            .iter()
            .filter(move |rule| &rule.field.path() == path)
    }

    /// Check a single field, as done on every keystroke.
    pub fn check_field(&self, record: &Record, path: &Path, today: NaiveDate) -> Option<String> {
        let value = field_text(record, path);
        self.rules_for(path)
            .find_map(|rule| rule.check(&value, today))
    }

    /// Check every field. Runs all rules regardless of earlier keystroke results.
    pub fn validate(&self, record: &Record, today: NaiveDate) -> Vec<FieldError> {
        let mut errors: Vec<FieldError> = Vec::new();
        for rule in &self.rules {
            if errors.iter().any(|e| e.field == rule.field) {
                continue;
            }
            let value = field_text(record, &rule.field.path());
            if let Some(message) = rule.check(&value, today) {
                errors.push(FieldError {
                    field: rule.field,
                    message,
                });
            }
        }
        errors
    }

    pub fn names() -> Self {
        Self::new()
            .with(FieldPath::FirstName, Rule::Required)
            .with(FieldPath::LastName, Rule::Required)
    }

    pub fn personal_details() -> Self {
        Self::names()
            .with(FieldPath::PhoneNumber, Rule::PhoneNumber)
            .with(FieldPath::DateOfBirth, Rule::DateOfBirth)
    }

    pub fn emergency_contact() -> Self {
        Self::new()
            .with(FieldPath::EmergencyName, Rule::Required)
            .with(FieldPath::EmergencyPhone, Rule::PhoneNumber)
    }

    pub fn traveler_numbers() -> Self {
        Self::new()
            .with(FieldPath::KnownTravelerNumber, Rule::KnownTravelerNumber)
            .with(FieldPath::RedressNumber, Rule::RedressNumber)
    }

    pub fn travel_document() -> Self {
        Self::new()
            .with(FieldPath::DocumentNumber, Rule::Required)
            .with(FieldPath::DocumentExpiration, Rule::DocumentExpiry)
    }

    pub fn payment_card() -> Self {
        Self::new()
            .with(FieldPath::CardHolder, Rule::Required)
            .with(FieldPath::CardNumber, Rule::CardNumber)
            .with(FieldPath::CardExpiration, Rule::CardExpiry)
            .with(FieldPath::CardSecurityCode, Rule::SecurityCode)
    }

    /// Traveler and card fields required to place a hotel or car booking.
    pub fn checkout() -> Self {
        Self::names()
            .with(FieldPath::Email, Rule::Required)
            .with(FieldPath::PhoneNumber, Rule::PhoneNumber)
            .extend(Self::payment_card())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn card_number_ignores_spaces() {
        assert_eq!(validate_card_number("4242 4242 4242 4242"), None);
        assert!(validate_card_number("4242 4242 4242").is_some());
        assert!(validate_card_number("4242-4242-4242-4242").is_some());
    }

    #[test]
    fn card_number_formatting() {
        assert_eq!(format_card_number("4242424242424242"), "4242 4242 4242 4242");
        assert_eq!(format_card_number("42a42-4"), "4242 4");
        assert_eq!(format_card_number("4242 4242 4242 4242 99"), "4242 4242 4242 4242");
        assert_eq!(format_card_number(""), "");
    }

    #[test]
    fn card_expiry_must_be_future() {
        let today = day(2026, 10, 18);
        assert_eq!(
            validate_card_expiry("01/2020", today).as_deref(),
            Some("Card has expired")
        );
        // first of the current month is not in the future
        assert!(validate_card_expiry("10/2026", today).is_some());
        assert_eq!(validate_card_expiry("11/2026", today), None);
        assert!(validate_card_expiry("13/2030", today).is_some());
        assert!(validate_card_expiry("/2030", today).is_some());
        assert!(validate_card_expiry("ab/2030", today).is_some());
    }

    #[test]
    fn security_code_is_three_or_four_digits() {
        assert_eq!(validate_security_code("123"), None);
        assert_eq!(validate_security_code("1234"), None);
        assert!(validate_security_code("12").is_some());
        assert!(validate_security_code("12345").is_some());
        assert!(validate_security_code("12a").is_some());
    }

    #[test]
    fn date_of_birth_round_trips() {
        let today = day(2026, 10, 18);
        assert!(validate_date_of_birth("02/30/2000", today).is_some());
        assert_eq!(validate_date_of_birth("02/29/2000", today), None);
        assert!(validate_date_of_birth("02/29/2001", today).is_some());
        assert!(validate_date_of_birth("04/31/1990", today).is_some());
        assert!(validate_date_of_birth("13/01/1990", today).is_some());
        assert!(validate_date_of_birth("01/01/1899", today).is_some());
        assert_eq!(validate_date_of_birth("12/31/2010", today), None);
        assert!(validate_date_of_birth("01/01/2011", today).is_some());
    }

    #[test]
    fn document_expiry_not_in_past_year() {
        let today = day(2026, 10, 18);
        assert_eq!(validate_document_expiry("01/15/2026", today), None);
        assert!(validate_document_expiry("12/31/2025", today).is_some());
        assert!(validate_document_expiry("06/31/2030", today).is_some());
    }

    #[test]
    fn traveler_number_windows() {
        assert_eq!(validate_known_traveler_number("12345"), None);
        assert_eq!(validate_known_traveler_number("1234567890"), None);
        assert!(validate_known_traveler_number("1234").is_some());
        assert!(validate_known_traveler_number("12345678901").is_some());
        assert_eq!(validate_redress_number("1234567"), None);
        assert!(validate_redress_number("123456").is_some());
        assert_eq!(
            validate_redress_number("12a4567").as_deref(),
            Some("Redress number must contain only digits")
        );
    }

    #[test]
    fn form_rules_report_first_error_per_field() {
        let record = Record::from(json!({ "firstName": "Ada", "lastName": "  " }));
        let errors = FormRules::names().validate(&record, day(2026, 1, 1));

        assert_eq!(
            errors,
            vec![FieldError {
                field: FieldPath::LastName,
                message: "Kindly enter your last name".into()
            }]
        );
    }
}
