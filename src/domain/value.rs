use crate::domain::validation::ValidationError;

use phonenumber::country;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Aramba API key, sent as `Authorization: ApiKey <key>`.
///
/// Invariant: non-empty after trimming.
pub struct ApiKey(String);

impl ApiKey {
    /// Authorization scheme used by Aramba.
    pub const SCHEME: &'static str = "ApiKey";

    /// Create a validated [`ApiKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::SCHEME });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Full `Authorization` header value (`ApiKey <key>`).
    pub fn authorization_value(&self) -> String {
        format!("{} {}", Self::SCHEME, self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Registered originator name/number for outbound SMS (`senderId`).
///
/// Invariant: non-empty after trimming. The value must be registered with your
/// Aramba account; see `ArambaClient::available_sender_ids`.
pub struct SenderId(String);

impl SenderId {
    /// Payload field name used by Aramba (`senderId`).
    pub const FIELD: &'static str = "senderId";

    /// Create a validated [`SenderId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated sender id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// SMS message text (`Text`).
///
/// Invariant: non-empty after trimming. The original value (including
/// whitespace) is preserved.
pub struct MessageText(String);

impl MessageText {
    /// Payload field name used by Aramba (`Text`).
    pub const FIELD: &'static str = "Text";

    /// Create validated message text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the message text as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Normalized recipient phone number (`PhoneNumber`), canonical digits only.
///
/// Normalization strips surrounding dashes and whitespace, a leading `+`, and
/// a leading international `00` prefix, then requires the remainder to parse
/// as an integer (which also drops leading zeroes). Inputs that differ only in
/// those decorations normalize to the same value:
///
/// ```
/// use aramba::PhoneNumber;
///
/// let a = PhoneNumber::new("+79160000000").unwrap();
/// let b = PhoneNumber::new(" -0079160000000- ").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.digits(), "79160000000");
/// ```
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Payload field name used by Aramba (`PhoneNumber`).
    pub const FIELD: &'static str = "PhoneNumber";

    /// Normalize and validate a phone number.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let stripped = value.trim_matches(|c: char| c == '-' || c.is_whitespace());
        let stripped = stripped.strip_prefix('+').unwrap_or(stripped);
        let stripped = stripped.strip_prefix("00").unwrap_or(stripped);
        let digits: u64 = stripped
            .parse()
            .map_err(|_| ValidationError::InvalidPhoneNumber {
                input: value.clone(),
            })?;
        Ok(Self(digits.to_string()))
    }

    /// Canonical digit string as sent to Aramba.
    pub fn digits(&self) -> &str {
        &self.0
    }
}

impl From<E164PhoneNumber> for PhoneNumber {
    fn from(value: E164PhoneNumber) -> Self {
        // E.164 is "+<digits>"; the canonical form drops the plus.
        Self(value.e164.trim_start_matches('+').to_owned())
    }
}

#[derive(Debug, Clone)]
/// Strictly parsed phone number with an E.164 representation.
///
/// Opt-in alternative to [`PhoneNumber`]'s string normalization: parsing goes
/// through the `phonenumber` crate and rejects numbers that are not valid for
/// their region. Equality, ordering, and hashing are based on the E.164 form.
pub struct E164PhoneNumber {
    raw: String,
    e164: String,
    parsed: phonenumber::PhoneNumber,
}

impl E164PhoneNumber {
    /// Parse and normalize a phone number into E.164.
    ///
    /// `default_region` is used when the input does not carry an explicit
    /// country prefix.
    pub fn parse(
        default_region: Option<country::Id>,
        input: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let input = input.into();
        let raw = input.trim().to_owned();
        if raw.is_empty() {
            return Err(ValidationError::Empty {
                field: PhoneNumber::FIELD,
            });
        }

        let parsed = phonenumber::parse(default_region, &raw)
            .map_err(|_| ValidationError::InvalidPhoneNumber { input: raw.clone() })?;

        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();

        Ok(Self { raw, e164, parsed })
    }

    /// Raw input after trimming.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Normalized E.164 representation.
    pub fn e164(&self) -> &str {
        &self.e164
    }

    /// The parsed phone number from the `phonenumber` crate.
    pub fn parsed(&self) -> &phonenumber::PhoneNumber {
        &self.parsed
    }
}

impl PartialEq for E164PhoneNumber {
    fn eq(&self, other: &Self) -> bool {
        self.e164 == other.e164
    }
}

impl Eq for E164PhoneNumber {}

impl std::hash::Hash for E164PhoneNumber {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.e164.hash(state);
    }
}

impl std::cmp::PartialOrd for E164PhoneNumber {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::cmp::Ord for E164PhoneNumber {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.e164.cmp(&other.e164)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Contact group identifier, used as a URL path segment.
///
/// Invariant: non-empty after trimming.
pub struct GroupId(String);

impl GroupId {
    /// Create a validated [`GroupId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "group id" });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated group id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Contact identifier within a group, used as a URL path segment.
///
/// Invariant: non-empty after trimming.
pub struct ContactId(String);

impl ContactId {
    /// Create a validated [`ContactId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "contact id" });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated contact id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Page size for sender-id listings (`Limit`).
///
/// Invariant: `1..=500`.
pub struct PageLimit(u16);

impl PageLimit {
    /// Query parameter name used by Aramba (`Limit`).
    pub const FIELD: &'static str = "Limit";

    /// Minimum allowed page size.
    pub const MIN: u16 = 1;
    /// Maximum allowed page size.
    pub const MAX: u16 = 500;
    /// Page size used when the caller does not ask for one.
    pub const DEFAULT: Self = Self(50);

    /// Create a validated page limit.
    pub fn new(value: u16) -> Result<Self, ValidationError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ValidationError::LimitOutOfRange {
                min: Self::MIN,
                max: Self::MAX,
                actual: u32::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Get the underlying page size.
    pub fn value(self) -> u16 {
        self.0
    }
}

impl Default for PageLimit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_newtypes_trim_or_validate() {
        let key = ApiKey::new("  key ").unwrap();
        assert_eq!(key.as_str(), "key");
        assert_eq!(key.authorization_value(), "ApiKey key");
        assert!(ApiKey::new("  ").is_err());

        let sender = SenderId::new(" ACME ").unwrap();
        assert_eq!(sender.as_str(), "ACME");
        assert!(SenderId::new("").is_err());

        let text = MessageText::new(" hi ").unwrap();
        assert_eq!(text.as_str(), " hi ");
        assert!(MessageText::new("  ").is_err());

        let group = GroupId::new(" 42 ").unwrap();
        assert_eq!(group.as_str(), "42");
        assert!(GroupId::new("  ").is_err());

        let contact = ContactId::new(" 7 ").unwrap();
        assert_eq!(contact.as_str(), "7");
        assert!(ContactId::new("").is_err());
    }

    #[test]
    fn phone_number_strips_decorations() {
        assert_eq!(
            PhoneNumber::new("+79160000000").unwrap().digits(),
            "79160000000"
        );
        assert_eq!(
            PhoneNumber::new("0079160000000").unwrap().digits(),
            "79160000000"
        );
        assert_eq!(
            PhoneNumber::new(" -79160000000- ").unwrap().digits(),
            "79160000000"
        );
        assert_eq!(
            PhoneNumber::new("+0079160000000").unwrap().digits(),
            "79160000000"
        );
    }

    #[test]
    fn phone_number_drops_leading_zeroes_via_integer_parse() {
        assert_eq!(
            PhoneNumber::new("079160000000").unwrap().digits(),
            "79160000000"
        );
    }

    #[test]
    fn phone_number_keeps_trailing_zeroes() {
        assert_eq!(
            PhoneNumber::new("7916000000").unwrap().digits(),
            "7916000000"
        );
    }

    #[test]
    fn equivalent_inputs_normalize_to_the_same_number() {
        let canonical = PhoneNumber::new("79160000000").unwrap();
        for input in ["+79160000000", "0079160000000", " 79160000000 ", "-79160000000-"] {
            assert_eq!(PhoneNumber::new(input).unwrap(), canonical, "input: {input}");
        }
    }

    #[test]
    fn phone_number_rejects_non_numeric_remainders() {
        for input in ["", "abc", "+7 916 000-00-00", "7916x00000"] {
            assert!(
                matches!(
                    PhoneNumber::new(input),
                    Err(ValidationError::InvalidPhoneNumber { .. })
                ),
                "input: {input}"
            );
        }
    }

    #[test]
    fn e164_parsing_and_conversion() {
        let strict = E164PhoneNumber::parse(None, "+7 925 123-45-67").unwrap();
        assert_eq!(strict.e164(), "+79251234567");
        assert_eq!(strict.raw(), "+7 925 123-45-67");

        let normalized: PhoneNumber = strict.clone().into();
        assert_eq!(normalized.digits(), "79251234567");

        let other = E164PhoneNumber::parse(None, "+79251234567").unwrap();
        assert_eq!(strict, other);

        assert!(E164PhoneNumber::parse(None, "not-a-number").is_err());
        assert!(E164PhoneNumber::parse(None, "").is_err());
    }

    #[test]
    fn page_limit_enforces_range() {
        assert!(PageLimit::new(PageLimit::MIN).is_ok());
        assert!(PageLimit::new(PageLimit::MAX).is_ok());
        assert!(matches!(
            PageLimit::new(0),
            Err(ValidationError::LimitOutOfRange { .. })
        ));
        assert!(PageLimit::new(PageLimit::MAX + 1).is_err());
        assert_eq!(PageLimit::default().value(), 50);
    }
}
