use serde::Deserialize;

use crate::transport::TransportError;

#[derive(Deserialize)]
struct SenderIdsWire {
    items: Vec<serde_json::Value>,
}

/// Decode the `smsSenderIds` listing envelope.
///
/// Aramba does not document the item schema, so entries are passed through as
/// decoded JSON values.
pub(crate) fn decode_sender_ids(json: &str) -> Result<Vec<serde_json::Value>, TransportError> {
    let wire: SenderIdsWire = serde_json::from_str(json)?;
    Ok(wire.items)
}
