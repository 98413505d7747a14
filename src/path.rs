//! Dot-separated paths into an editable record.
//!
//! Free-form paths are parsed into [`Path`]. The leaves the booking screens
//! actually edit are enumerated by [`FieldPath`] so a typo is a compile error
//! rather than a silently created subtree.

use super::error::PathError;
use std::{fmt, str::FromStr};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path(Vec<String>);

impl Path {
    /// Parse `a.b.c`. Empty input and empty segments (`a..b`, `.a`) are rejected.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }
        let segments: Vec<String> = raw.split('.').map(str::to_owned).collect();
        if segments.iter().any(String::is_empty) {
            return Err(PathError::EmptySegment(raw.to_owned()));
        }
        Ok(Self(segments))
    }
    pub fn segments(&self) -> &[String] {
        &self.0
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn child(&self, key: &str) -> Result<Self, PathError> {
        if key.is_empty() {
            return Err(PathError::EmptySegment(format!("{self}.")));
        }
        let mut segments = self.0.clone();
        segments.push(key.to_owned());
        Ok(Self(segments))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<FieldPath> for Path {
    fn from(value: FieldPath) -> Self {
        Self(value.as_str().split('.').map(str::to_owned).collect())
    }
}

/// Known leaves of the user record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldPath {
    UserId,
    FirstName,
    LastName,
    Email,
    PhoneNumber,
    DateOfBirth,
    Gender,
    ProfilePicture,
    LocationCity,
    LocationCountry,
    EmergencyName,
    EmergencyPhone,
    KnownTravelerNumber,
    RedressNumber,
    DocumentNumber,
    DocumentExpiration,
    CardHolder,
    CardNumber,
    CardExpiration,
    CardSecurityCode,
    Bookings,
}

impl FieldPath {
    pub const ALL: [FieldPath; 21] = [
        FieldPath::UserId,
        FieldPath::FirstName,
        FieldPath::LastName,
        FieldPath::Email,
        FieldPath::PhoneNumber,
        FieldPath::DateOfBirth,
        FieldPath::Gender,
        FieldPath::ProfilePicture,
        FieldPath::LocationCity,
        FieldPath::LocationCountry,
        FieldPath::EmergencyName,
        FieldPath::EmergencyPhone,
        FieldPath::KnownTravelerNumber,
        FieldPath::RedressNumber,
        FieldPath::DocumentNumber,
        FieldPath::DocumentExpiration,
        FieldPath::CardHolder,
        FieldPath::CardNumber,
        FieldPath::CardExpiration,
        FieldPath::CardSecurityCode,
        FieldPath::Bookings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldPath::UserId => "_id",
            FieldPath::FirstName => "firstName",
            FieldPath::LastName => "lastName",
            FieldPath::Email => "email",
            FieldPath::PhoneNumber => "phoneNumber",
            FieldPath::DateOfBirth => "dateOfBirth",
            FieldPath::Gender => "gender",
            FieldPath::ProfilePicture => "profilePicture",
            FieldPath::LocationCity => "location.city",
            FieldPath::LocationCountry => "location.country",
            FieldPath::EmergencyName => "emergency.name",
            FieldPath::EmergencyPhone => "emergency.phoneNumber",
            FieldPath::KnownTravelerNumber => "travelerNumbers.knownTravelerNumber",
            FieldPath::RedressNumber => "travelerNumbers.redressNumber",
            FieldPath::DocumentNumber => "travelDocument.number",
            FieldPath::DocumentExpiration => "travelDocument.expirationDate",
            FieldPath::CardHolder => "paymentCard.holder",
            FieldPath::CardNumber => "paymentCard.number",
            FieldPath::CardExpiration => "paymentCard.expirationDate",
            FieldPath::CardSecurityCode => "paymentCard.securityCode",
            FieldPath::Bookings => "bookings",
        }
    }

    /// Human wording used in "Kindly enter your ..." messages.
    pub fn label(&self) -> &'static str {
        match self {
            FieldPath::UserId => "account id",
            FieldPath::FirstName => "first name",
            FieldPath::LastName => "last name",
            FieldPath::Email => "email",
            FieldPath::PhoneNumber => "phone number",
            FieldPath::DateOfBirth => "date of birth",
            FieldPath::Gender => "gender",
            FieldPath::ProfilePicture => "profile picture",
            FieldPath::LocationCity => "city",
            FieldPath::LocationCountry => "country",
            FieldPath::EmergencyName => "emergency contact name",
            FieldPath::EmergencyPhone => "emergency contact phone number",
            FieldPath::KnownTravelerNumber => "known traveler number",
            FieldPath::RedressNumber => "redress number",
            FieldPath::DocumentNumber => "passport number",
            FieldPath::DocumentExpiration => "passport expiration date",
            FieldPath::CardHolder => "name on card",
            FieldPath::CardNumber => "card number",
            FieldPath::CardExpiration => "card expiration date",
            FieldPath::CardSecurityCode => "security code",
            FieldPath::Bookings => "bookings",
        }
    }

    pub fn path(&self) -> Path {
        Path::from(*self)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_empty_segments() {
        assert_eq!(Path::parse(""), Err(PathError::Empty));
        assert!(matches!(
            Path::parse("location..city"),
            Err(PathError::EmptySegment(_))
        ));
        assert!(matches!(Path::parse(".city"), Err(PathError::EmptySegment(_))));
    }

    #[test]
    fn field_paths_parse_to_themselves() {
        for field in FieldPath::ALL {
            let parsed = Path::parse(field.as_str()).unwrap();
            assert_eq!(parsed, field.path());
            assert_eq!(parsed.to_string(), field.as_str());
        }
    }
}
