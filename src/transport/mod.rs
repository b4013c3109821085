//! Transport layer: wire-format details (serialization/deserialization).

mod send_bulk;
mod send_sms;
mod sender_ids;
mod token;

pub(crate) use send_bulk::{BulkSmsPayload, decode_bulk_report, encode_bulk_sms};
pub(crate) use send_sms::{SingleSmsPayload, decode_single_report, encode_single_sms};
pub(crate) use sender_ids::decode_sender_ids;

#[derive(Debug, thiserror::Error)]
pub(crate) enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response carries an unknown delivery status: {value}")]
    UnknownDeliveryStatus { value: String },

    #[error("response contains an unknown recipient key: {key}")]
    UnknownRecipientKey { key: String },
}
