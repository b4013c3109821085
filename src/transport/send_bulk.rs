use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{DispatchRecord, MessageText, PhoneNumber, SenderId};
use crate::transport::TransportError;
use crate::transport::send_sms::{ReportWire, record_from_wire};

/// Borrowed view of a bulk-send request.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BulkSmsPayload<'a> {
    pub sender_id: &'a SenderId,
    pub send_at: Option<&'a DateTime<Utc>>,
    pub use_recipient_timezone: bool,
    pub numbers: &'a [PhoneNumber],
    pub text: &'a MessageText,
}

#[derive(Serialize)]
struct BulkSmsWire<'a> {
    #[serde(rename = "senderId")]
    sender_id: &'a str,
    #[serde(rename = "SendDateTime")]
    send_date_time: Option<&'a DateTime<Utc>>,
    #[serde(rename = "UseRecipientTimeZone")]
    use_recipient_time_zone: bool,
    #[serde(rename = "PhoneNumbers")]
    phone_numbers: Vec<&'a str>,
    #[serde(rename = "Text")]
    text: &'a str,
}

pub(crate) fn encode_bulk_sms(payload: &BulkSmsPayload<'_>) -> Result<String, TransportError> {
    let wire = BulkSmsWire {
        sender_id: payload.sender_id.as_str(),
        send_date_time: payload.send_at,
        use_recipient_time_zone: payload.use_recipient_timezone,
        phone_numbers: payload.numbers.iter().map(PhoneNumber::digits).collect(),
        text: payload.text.as_str(),
    };
    Ok(serde_json::to_string(&wire)?)
}

/// Decode a bulk response (a mapping keyed by recipient) into records ordered
/// by the submitted recipient sequence.
///
/// Response keys may carry a `+` prefix; a key matching no submitted recipient
/// is an error.
pub(crate) fn decode_bulk_report(
    numbers: &[PhoneNumber],
    json: &str,
) -> Result<Vec<DispatchRecord>, TransportError> {
    let wire: BTreeMap<String, ReportWire> = serde_json::from_str(json)?;

    let mut pending: HashMap<String, (String, ReportWire)> = HashMap::with_capacity(wire.len());
    for (key, entry) in wire {
        let digits = key.trim().trim_start_matches('+').to_owned();
        pending.insert(digits, (key, entry));
    }

    let mut records = Vec::with_capacity(pending.len());
    for number in numbers {
        if let Some((_, entry)) = pending.remove(number.digits()) {
            records.push(record_from_wire(entry)?);
        }
    }

    if let Some((key, _)) = pending.into_values().next() {
        return Err(TransportError::UnknownRecipientKey { key });
    }

    Ok(records)
}
