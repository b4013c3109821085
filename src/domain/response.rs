use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Lifecycle status of an outbound message.
///
/// `New` and `Error` allow (re-)sending; `Enroute`, `Delivered`, and
/// `Undeliverable` are terminal for this client.
pub enum DeliveryStatus {
    New,
    Enroute,
    Delivered,
    Undeliverable,
    Error,
}

impl DeliveryStatus {
    /// Lowercased status label, matching the gateway's vocabulary.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Enroute => "enroute",
            Self::Delivered => "delivered",
            Self::Undeliverable => "undeliverable",
            Self::Error => "error",
        }
    }

    /// Parse a server-provided status label, ignoring case.
    pub fn from_api(value: &str) -> Option<Self> {
        let value = value.trim();
        for status in [
            Self::New,
            Self::Enroute,
            Self::Delivered,
            Self::Undeliverable,
            Self::Error,
        ] {
            if value.eq_ignore_ascii_case(status.as_str()) {
                return Some(status);
            }
        }
        None
    }

    /// Whether a send attempt is allowed from this status.
    pub fn is_sendable(self) -> bool {
        matches!(self, Self::New | Self::Error)
    }

    /// Whether the message reached a state this client will not retry.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Enroute | Self::Delivered | Self::Undeliverable)
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Per-message report decoded from the gateway.
///
/// `id` and `cost` keep the exact wire token (`"1.50"` stays `"1.50"`);
/// timestamps are passed through as the gateway formats them.
pub struct DispatchRecord {
    pub status: DeliveryStatus,
    pub id: Option<String>,
    pub cost: Option<String>,
    pub number: String,
    pub content: String,
    pub planned_utc_datetime: Option<String>,
    pub delivery_utc_datetime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Snapshot of a single message's send outcome.
///
/// Before a successful send the `number` and `content` fields echo the
/// submitted values and the server-populated fields are `None`.
pub struct SmsReport {
    pub status_code: Option<u16>,
    pub status: DeliveryStatus,
    pub id: Option<String>,
    pub cost: Option<String>,
    pub number: String,
    pub content: String,
    pub planned_utc_datetime: Option<String>,
    pub delivery_utc_datetime: Option<String>,
}
