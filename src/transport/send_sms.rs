use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DeliveryStatus, DispatchRecord, MessageText, PhoneNumber, SenderId};
use crate::transport::TransportError;
use crate::transport::token::WireToken;

/// Borrowed view of a single-send request, as handed over by the client layer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SingleSmsPayload<'a> {
    pub sender_id: &'a SenderId,
    pub send_at: Option<&'a DateTime<Utc>>,
    pub use_recipient_timezone: bool,
    pub number: &'a PhoneNumber,
    pub text: &'a MessageText,
}

#[derive(Serialize)]
struct SingleSmsWire<'a> {
    #[serde(rename = "senderId")]
    sender_id: &'a str,
    #[serde(rename = "SendDateTime")]
    send_date_time: Option<&'a DateTime<Utc>>,
    #[serde(rename = "UseRecipientTimeZone")]
    use_recipient_time_zone: bool,
    #[serde(rename = "PhoneNumber")]
    phone_number: &'a str,
    #[serde(rename = "Text")]
    text: &'a str,
}

pub(crate) fn encode_single_sms(payload: &SingleSmsPayload<'_>) -> Result<String, TransportError> {
    let wire = SingleSmsWire {
        sender_id: payload.sender_id.as_str(),
        send_date_time: payload.send_at,
        use_recipient_time_zone: payload.use_recipient_timezone,
        phone_number: payload.number.digits(),
        text: payload.text.as_str(),
    };
    Ok(serde_json::to_string(&wire)?)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReportWire {
    status: String,
    #[serde(default)]
    id: Option<WireToken>,
    #[serde(default)]
    cost: Option<WireToken>,
    #[serde(rename = "phoneNumber")]
    phone_number: String,
    text: String,
    #[serde(rename = "plannedUtcDateTime", default)]
    planned_utc_date_time: Option<String>,
    #[serde(rename = "deliveryUtcDateTime", default)]
    delivery_utc_date_time: Option<String>,
}

pub(crate) fn record_from_wire(wire: ReportWire) -> Result<DispatchRecord, TransportError> {
    let status = DeliveryStatus::from_api(&wire.status).ok_or(
        TransportError::UnknownDeliveryStatus { value: wire.status },
    )?;
    Ok(DispatchRecord {
        status,
        id: wire.id.map(WireToken::into_string),
        cost: wire.cost.map(WireToken::into_string),
        number: wire.phone_number,
        content: wire.text,
        planned_utc_datetime: wire.planned_utc_date_time,
        delivery_utc_datetime: wire.delivery_utc_date_time,
    })
}

pub(crate) fn decode_single_report(json: &str) -> Result<DispatchRecord, TransportError> {
    let wire: ReportWire = serde_json::from_str(json)?;
    record_from_wire(wire)
}
