//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod response;
mod validation;
mod value;

pub use request::{PageQuery, SmsOptions};
pub use response::{DeliveryStatus, DispatchRecord, SmsReport};
pub use validation::ValidationError;
pub use value::{
    ApiKey, ContactId, E164PhoneNumber, GroupId, MessageText, PageLimit, PhoneNumber, SenderId,
};
