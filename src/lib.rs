//! Typed Rust client for the Aramba SMS gateway HTTP API.
//!
//! The crate is split into a domain layer of validated types, a transport
//! layer for wire-format details, and a client layer that owns HTTP dispatch,
//! the sender-id cache, and the outbound message queue. All I/O is
//! synchronous: one blocking request per operation.
//!
//! ```rust,no_run
//! use aramba::{ApiKey, ArambaClient, SenderId, SmsOptions};
//!
//! fn main() -> Result<(), aramba::ArambaError> {
//!     let client = ArambaClient::new(ApiKey::new("...")?, SenderId::new("ACME")?);
//!     let mut sms = client.new_sms("+79160000000", "hello", SmsOptions::default())?;
//!     sms.send(&client)?;
//!     println!("sent: {:?}", sms.report());
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{
    ApiResponse, ArambaClient, ArambaClientBuilder, ArambaError, Method, MultiSms, Sms,
};
pub use domain::{
    ApiKey, ContactId, DeliveryStatus, DispatchRecord, E164PhoneNumber, GroupId, MessageText,
    PageLimit, PageQuery, PhoneNumber, SenderId, SmsOptions, SmsReport, ValidationError,
};
