use serde::Deserialize;
use serde::de::Error as DeError;

/// String-or-number JSON field preserved as its literal token.
///
/// Aramba returns ids and costs as either JSON strings or bare numbers
/// depending on the endpoint. Keeping the raw token avoids float
/// round-tripping (`1.50` stays `"1.50"` instead of becoming `"1.5"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WireToken(String);

impl WireToken {
    pub(crate) fn into_string(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for WireToken {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw: Box<serde_json::value::RawValue> = Deserialize::deserialize(deserializer)?;
        let token = raw.get();

        match token.as_bytes().first().copied() {
            Some(b'"') => {
                let text = serde_json::from_str::<String>(token).map_err(D::Error::custom)?;
                Ok(Self(text))
            }
            Some(b'-' | b'0'..=b'9') => Ok(Self(token.to_owned())),
            _ => Err(D::Error::custom("expected a JSON string or number")),
        }
    }
}
