//! Stateful message entities and their send lifecycle.

use chrono::{DateTime, Utc};

use crate::domain::{
    DeliveryStatus, DispatchRecord, MessageText, PhoneNumber, SenderId, SmsOptions, SmsReport,
    ValidationError,
};
use crate::transport;

use super::{ArambaClient, ArambaError, parse_error};

/// One outbound SMS message.
///
/// Construct through [`ArambaClient::new_sms`] or
/// [`ArambaClient::append_new_sms`]. A message starts as
/// [`DeliveryStatus::New`]; [`Sms::send`] moves it to the status reported by
/// the gateway, or to [`DeliveryStatus::Error`] on a classified API failure.
/// Once a terminal status is reached, further sends are no-ops.
#[derive(Debug, Clone)]
pub struct Sms {
    number: PhoneNumber,
    content: MessageText,
    sender_id: SenderId,
    send_at: Option<DateTime<Utc>>,
    use_recipient_timezone: bool,
    status: DeliveryStatus,
    status_code: Option<u16>,
    delivery: Option<DispatchRecord>,
}

impl Sms {
    pub(crate) fn new(
        default_sender: &SenderId,
        number: impl Into<String>,
        content: impl Into<String>,
        options: SmsOptions,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            number: PhoneNumber::new(number)?,
            content: MessageText::new(content)?,
            sender_id: options.sender_id.unwrap_or_else(|| default_sender.clone()),
            send_at: options.send_at,
            use_recipient_timezone: options.use_recipient_timezone,
            status: DeliveryStatus::New,
            status_code: None,
            delivery: None,
        })
    }

    /// Current lifecycle status.
    pub fn status(&self) -> DeliveryStatus {
        self.status
    }

    /// HTTP status code recorded by the last send attempt.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// The normalized recipient number as submitted.
    pub fn number(&self) -> &PhoneNumber {
        &self.number
    }

    /// The message text as submitted.
    pub fn content(&self) -> &str {
        self.content.as_str()
    }

    /// The sender id this message will be sent under.
    pub fn sender_id(&self) -> &SenderId {
        &self.sender_id
    }

    /// Submit the message unless it already reached a terminal status.
    ///
    /// A classified API failure is absorbed into [`DeliveryStatus::Error`]
    /// with the HTTP code recorded, so it can be retried and inspected via
    /// [`Sms::report`]. Transport and decode failures propagate as `Err` and
    /// leave the lifecycle status untouched.
    pub fn send(&mut self, client: &ArambaClient) -> Result<(), ArambaError> {
        if !self.status.is_sendable() {
            return Ok(());
        }

        let payload = transport::SingleSmsPayload {
            sender_id: &self.sender_id,
            send_at: self.send_at.as_ref(),
            use_recipient_timezone: self.use_recipient_timezone,
            number: &self.number,
            text: &self.content,
        };

        match client.submit_single(&payload) {
            Ok(response) => {
                self.status_code = Some(response.status());
                let record = transport::decode_single_report(response.body())
                    .map_err(parse_error)?;
                self.status = record.status;
                self.delivery = Some(record);
                Ok(())
            }
            Err(ArambaError::Api { status, .. }) => {
                self.status = DeliveryStatus::Error;
                self.status_code = Some(status);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Snapshot of the send outcome.
    ///
    /// Before a successful send the server-populated fields are `None` and
    /// `number`/`content` echo the submitted values.
    pub fn report(&self) -> SmsReport {
        match &self.delivery {
            Some(record) => SmsReport {
                status_code: self.status_code,
                status: self.status,
                id: record.id.clone(),
                cost: record.cost.clone(),
                number: record.number.clone(),
                content: record.content.clone(),
                planned_utc_datetime: record.planned_utc_datetime.clone(),
                delivery_utc_datetime: record.delivery_utc_datetime.clone(),
            },
            None => SmsReport {
                status_code: self.status_code,
                status: self.status,
                id: None,
                cost: None,
                number: self.number.digits().to_owned(),
                content: self.content.as_str().to_owned(),
                planned_utc_datetime: None,
                delivery_utc_datetime: None,
            },
        }
    }
}

/// One message body addressed to a sequence of recipients.
///
/// Construct through [`ArambaClient::new_bulk_sms`]. After a successful send,
/// [`MultiSms::results`] holds one record per recipient entry the gateway
/// reported, ordered by the submitted recipient sequence.
#[derive(Debug, Clone)]
pub struct MultiSms {
    numbers: Vec<PhoneNumber>,
    content: MessageText,
    sender_id: SenderId,
    send_at: Option<DateTime<Utc>>,
    use_recipient_timezone: bool,
    status: DeliveryStatus,
    status_code: Option<u16>,
    results: Vec<DispatchRecord>,
}

impl MultiSms {
    pub(crate) fn new(
        default_sender: &SenderId,
        numbers: impl IntoIterator<Item = impl Into<String>>,
        content: impl Into<String>,
        options: SmsOptions,
    ) -> Result<Self, ValidationError> {
        let numbers = numbers
            .into_iter()
            .map(PhoneNumber::new)
            .collect::<Result<Vec<_>, _>>()?;
        if numbers.is_empty() {
            return Err(ValidationError::Empty {
                field: "PhoneNumbers",
            });
        }

        Ok(Self {
            numbers,
            content: MessageText::new(content)?,
            sender_id: options.sender_id.unwrap_or_else(|| default_sender.clone()),
            send_at: options.send_at,
            use_recipient_timezone: options.use_recipient_timezone,
            status: DeliveryStatus::New,
            status_code: None,
            results: Vec::new(),
        })
    }

    /// Aggregate lifecycle status.
    pub fn status(&self) -> DeliveryStatus {
        self.status
    }

    /// HTTP status code recorded by the last send attempt.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// The normalized recipients as submitted.
    pub fn numbers(&self) -> &[PhoneNumber] {
        &self.numbers
    }

    /// The message text as submitted.
    pub fn content(&self) -> &str {
        self.content.as_str()
    }

    /// Per-recipient records from the last successful send; empty until then.
    pub fn results(&self) -> &[DispatchRecord] {
        &self.results
    }

    /// Submit the bulk message unless it already reached a terminal status.
    ///
    /// Error handling matches [`Sms::send`]: classified API failures become
    /// the aggregate [`DeliveryStatus::Error`] with the code recorded;
    /// transport and decode failures propagate as `Err`.
    pub fn send(&mut self, client: &ArambaClient) -> Result<(), ArambaError> {
        if !self.status.is_sendable() {
            return Ok(());
        }

        let payload = transport::BulkSmsPayload {
            sender_id: &self.sender_id,
            send_at: self.send_at.as_ref(),
            use_recipient_timezone: self.use_recipient_timezone,
            numbers: &self.numbers,
            text: &self.content,
        };

        match client.submit_bulk(&payload) {
            Ok(response) => {
                self.status_code = Some(response.status());
                let records = transport::decode_bulk_report(&self.numbers, response.body())
                    .map_err(parse_error)?;
                self.status = aggregate_status(&records);
                self.results = records;
                Ok(())
            }
            Err(ArambaError::Api { status, .. }) => {
                self.status = DeliveryStatus::Error;
                self.status_code = Some(status);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

// The gateway reports per-recipient statuses only; the aggregate adopts the
// common status when uniform and stays "enroute" (accepted, in flight) when
// recipients diverge.
fn aggregate_status(records: &[DispatchRecord]) -> DeliveryStatus {
    match records.first().map(|record| record.status) {
        Some(first) if records.iter().all(|record| record.status == first) => first,
        _ => DeliveryStatus::Enroute,
    }
}

#[cfg(test)]
mod tests {
    use crate::client::testing::{FakeTransport, client_with};
    use crate::domain::SenderId;

    use super::*;

    fn report_json(status: &str) -> String {
        format!(
            r#"{{"status": "{status}", "id": "abc-1", "cost": "1.50", "phoneNumber": "79160000000", "text": "hello", "plannedUtcDateTime": "2026-01-02T10:30:00Z", "deliveryUtcDateTime": null}}"#
        )
    }

    fn bulk_json() -> &'static str {
        r#"
        {
          "79251234567": {
            "status": "Delivered",
            "id": "b-2",
            "cost": "0.50",
            "phoneNumber": "79251234567",
            "text": "hello",
            "deliveryUtcDateTime": "2026-01-02T10:31:00Z"
          },
          "79160000000": {
            "status": "Enroute",
            "id": "b-1",
            "cost": 2,
            "phoneNumber": "79160000000",
            "text": "hello"
          }
        }
        "#
    }

    #[test]
    fn sms_defaults_to_the_engine_sender_id() {
        let client = client_with(FakeTransport::new(200, "{}"));

        let sms = client
            .new_sms("+79160000000", "hello", SmsOptions::default())
            .unwrap();
        assert_eq!(sms.sender_id().as_str(), "ACME");

        let sms = client
            .new_sms(
                "+79160000000",
                "hello",
                SmsOptions {
                    sender_id: Some(SenderId::new("OTHER").unwrap()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(sms.sender_id().as_str(), "OTHER");
    }

    #[test]
    fn report_before_send_echoes_the_submitted_values() {
        let client = client_with(FakeTransport::new(200, "{}"));
        let sms = client
            .new_sms("+79160000000", "hello", SmsOptions::default())
            .unwrap();

        let report = sms.report();
        assert_eq!(report.status, DeliveryStatus::New);
        assert_eq!(report.status_code, None);
        assert_eq!(report.id, None);
        assert_eq!(report.cost, None);
        assert_eq!(report.number, "79160000000");
        assert_eq!(report.content, "hello");
    }

    #[test]
    fn send_adopts_the_server_report() {
        let transport = FakeTransport::new(201, report_json("Delivered"));
        let client = client_with(transport.clone());
        let mut sms = client
            .new_sms("+79160000000", "hello", SmsOptions::default())
            .unwrap();

        sms.send(&client).unwrap();

        assert_eq!(sms.status(), DeliveryStatus::Delivered);
        assert_eq!(sms.status_code(), Some(201));

        let report = sms.report();
        assert_eq!(report.id.as_deref(), Some("abc-1"));
        assert_eq!(report.cost.as_deref(), Some("1.50"));
        assert_eq!(report.number, "79160000000");
        assert_eq!(
            report.planned_utc_datetime.as_deref(),
            Some("2026-01-02T10:30:00Z")
        );
        assert_eq!(report.delivery_utc_datetime, None);

        let request = &transport.requests()[0];
        assert_eq!(request.url, "https://api.invalid/singleSms");
        let body: serde_json::Value =
            serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["PhoneNumber"], "79160000000");
        assert_eq!(body["senderId"], "ACME");
        assert_eq!(body["Text"], "hello");
    }

    #[test]
    fn send_is_a_noop_after_a_terminal_status() {
        let transport = FakeTransport::new(201, report_json("Enroute"));
        let client = client_with(transport.clone());
        let mut sms = client
            .new_sms("+79160000000", "hello", SmsOptions::default())
            .unwrap();

        sms.send(&client).unwrap();
        assert_eq!(sms.status(), DeliveryStatus::Enroute);
        assert_eq!(transport.request_count(), 1);

        sms.send(&client).unwrap();
        assert_eq!(transport.request_count(), 1);
        assert_eq!(sms.status(), DeliveryStatus::Enroute);
    }

    #[test]
    fn api_errors_become_the_error_status_and_allow_a_retry() {
        let transport = FakeTransport::new(402, "");
        let client = client_with(transport.clone());
        let mut sms = client
            .new_sms("+79160000000", "hello", SmsOptions::default())
            .unwrap();

        sms.send(&client).unwrap();
        assert_eq!(sms.status(), DeliveryStatus::Error);
        assert_eq!(sms.status_code(), Some(402));
        assert_eq!(sms.report().number, "79160000000");

        transport.push_response(200, report_json("Enroute"));
        sms.send(&client).unwrap();
        assert_eq!(sms.status(), DeliveryStatus::Enroute);
        assert_eq!(sms.status_code(), Some(200));
        assert_eq!(transport.request_count(), 2);
    }

    #[test]
    fn decode_failures_propagate_and_keep_the_status_sendable() {
        let transport = FakeTransport::new(200, "not json");
        let client = client_with(transport.clone());
        let mut sms = client
            .new_sms("+79160000000", "hello", SmsOptions::default())
            .unwrap();

        let err = sms.send(&client).unwrap_err();
        assert!(matches!(err, ArambaError::Parse(_)));
        assert_eq!(sms.status(), DeliveryStatus::New);
        assert!(sms.status().is_sendable());
    }

    #[test]
    fn scheduled_sends_carry_the_timestamp() {
        use chrono::TimeZone;

        let transport = FakeTransport::new(201, report_json("Enroute"));
        let client = client_with(transport.clone());
        let mut sms = client
            .new_sms(
                "+79160000000",
                "later",
                SmsOptions {
                    send_at: Some(Utc.with_ymd_and_hms(2026, 1, 2, 10, 30, 0).unwrap()),
                    use_recipient_timezone: true,
                    ..Default::default()
                },
            )
            .unwrap();

        sms.send(&client).unwrap();

        let request = &transport.requests()[0];
        let body: serde_json::Value =
            serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert!(
            body["SendDateTime"]
                .as_str()
                .unwrap()
                .starts_with("2026-01-02T10:30:00")
        );
        assert_eq!(body["UseRecipientTimeZone"], true);
    }

    #[test]
    fn bulk_send_collects_records_in_submission_order() {
        let transport = FakeTransport::new(200, bulk_json());
        let client = client_with(transport.clone());
        let mut bulk = client
            .new_bulk_sms(
                ["+79160000000", "+79251234567"],
                "hello",
                SmsOptions::default(),
            )
            .unwrap();

        bulk.send(&client).unwrap();

        assert_eq!(bulk.status_code(), Some(200));
        let results = bulk.results();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].number, "79160000000");
        assert_eq!(results[0].status, DeliveryStatus::Enroute);
        assert_eq!(results[0].cost.as_deref(), Some("2"));
        assert_eq!(results[1].number, "79251234567");
        assert_eq!(results[1].status, DeliveryStatus::Delivered);
        assert_eq!(results[1].cost.as_deref(), Some("0.50"));

        // mixed per-recipient statuses leave the aggregate in flight
        assert_eq!(bulk.status(), DeliveryStatus::Enroute);

        let request = &transport.requests()[0];
        assert_eq!(request.url, "https://api.invalid/singleSms/multiple");
        let body: serde_json::Value =
            serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body["PhoneNumbers"],
            serde_json::json!(["79160000000", "79251234567"])
        );
    }

    #[test]
    fn bulk_uniform_statuses_become_the_aggregate() {
        let json = r#"
        {
          "79160000000": {
            "status": "Delivered",
            "phoneNumber": "79160000000",
            "text": "hello"
          }
        }
        "#;
        let transport = FakeTransport::new(200, json);
        let client = client_with(transport.clone());
        let mut bulk = client
            .new_bulk_sms(["+79160000000"], "hello", SmsOptions::default())
            .unwrap();

        bulk.send(&client).unwrap();
        assert_eq!(bulk.status(), DeliveryStatus::Delivered);

        // terminal aggregate makes further sends no-ops
        bulk.send(&client).unwrap();
        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn bulk_api_errors_set_the_aggregate_error() {
        let transport = FakeTransport::new(500, "");
        let client = client_with(transport.clone());
        let mut bulk = client
            .new_bulk_sms(
                ["+79160000000", "+79251234567"],
                "hello",
                SmsOptions::default(),
            )
            .unwrap();

        bulk.send(&client).unwrap();
        assert_eq!(bulk.status(), DeliveryStatus::Error);
        assert_eq!(bulk.status_code(), Some(500));
        assert!(bulk.results().is_empty());
        assert!(bulk.status().is_sendable());
    }

    #[test]
    fn bulk_construction_validates_every_number() {
        let client = client_with(FakeTransport::new(200, "{}"));

        let err = client
            .new_bulk_sms(["+79160000000", "bad"], "hello", SmsOptions::default())
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidPhoneNumber { .. }));

        let err = client
            .new_bulk_sms(Vec::<String>::new(), "hello", SmsOptions::default())
            .unwrap_err();
        assert!(matches!(err, ValidationError::Empty { .. }));
    }
}
