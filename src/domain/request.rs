use chrono::{DateTime, Utc};

use crate::domain::value::{PageLimit, SenderId};

#[derive(Debug, Clone, Default)]
/// Optional parameters for single and bulk sends.
pub struct SmsOptions {
    /// Overrides the engine's default sender id when set.
    pub sender_id: Option<SenderId>,
    /// Scheduled send time; `None` sends immediately.
    pub send_at: Option<DateTime<Utc>>,
    /// Deliver at the scheduled time in each recipient's timezone.
    pub use_recipient_timezone: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Pagination window for sender-id listings.
pub struct PageQuery {
    pub offset: u32,
    pub limit: PageLimit,
}

impl PageQuery {
    /// Query parameter name used by Aramba (`Offset`).
    pub const OFFSET_FIELD: &'static str = "Offset";

    pub fn new(offset: u32, limit: PageLimit) -> Self {
        Self { offset, limit }
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: PageLimit::DEFAULT,
        }
    }
}
