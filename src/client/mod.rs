//! Client layer: the sender engine orchestrating transport calls.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::domain::{
    ApiKey, ContactId, GroupId, PageLimit, PageQuery, SenderId, SmsOptions, ValidationError,
};
use crate::transport;

mod message;

pub use message::{MultiSms, Sms};

/// Production Aramba API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.aramba.ru";

const SMS_SENDER_IDS: &str = "smsSenderIds";
const BALANCE: &str = "balance";
const SINGLE_SMS: &str = "singleSms";
const MULTIPLE: &str = "multiple";
const CONTACT_GROUPS: &str = "contactGroups";
const GROUP_CONTACTS: &str = "contacts";

const AUTHORIZATION: &str = "Authorization";
const ACCEPT: &str = "Accept";
const CONTENT_TYPE: &str = "Content-Type";
const APPLICATION_JSON: &str = "application/json";
const RESERVED_HEADERS: [&str; 3] = [AUTHORIZATION, ACCEPT, CONTENT_TYPE];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// HTTP verbs accepted by the Aramba API.
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Delete => "delete",
            Self::Options => "options",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(value: Method) -> Self {
        match value {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
            Method::Options => reqwest::Method::OPTIONS,
        }
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`ArambaClient`].
///
/// Classified API failures carry the HTTP status code and a fixed
/// human-readable message; network-level failures pass through unclassified.
pub enum ArambaError {
    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// The API answered with one of the classified error status codes.
    #[error("{message} (status {status})")]
    Api { status: u16, message: &'static str },

    /// A request or response body could not be encoded/decoded.
    #[error("parse error: {0}")]
    Parse(#[source] Box<dyn StdError + Send + Sync>),

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The builder was finished without a default sender id.
    #[error("a default sender id is required; set one on the builder")]
    MissingSenderId,

    /// The configured base URL cannot be used for API requests.
    #[error("base url cannot be used for API requests: {url}")]
    InvalidBaseUrl { url: String },
}

fn api_error_message(status: u16) -> Option<&'static str> {
    Some(match status {
        400 => "Bad request.",
        401 => "Not authorized.",
        402 => "Payment required.",
        403 => "This action is not permitted for given API key.",
        404 => "Not found.",
        409 => "Conflict.",
        500 => "Internal server error.",
        _ => return None,
    })
}

fn parse_error(err: impl StdError + Send + Sync + 'static) -> ArambaError {
    ArambaError::Parse(Box::new(err))
}

#[derive(Debug, Clone)]
/// Raw API response passed through for the caller to decode.
///
/// Endpoints without a documented field set (balance, contact groups,
/// contacts) return this envelope; [`ApiResponse::json`] decodes the body
/// into any deserializable shape.
pub struct ApiResponse {
    status: u16,
    body: String,
}

impl ApiResponse {
    /// HTTP status code of the response.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Raw response body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ArambaError> {
        serde_json::from_str(&self.body).map_err(parse_error)
    }
}

enum RequestBody {
    Empty,
    Json(String),
    Form(Vec<(String, String)>),
}

impl RequestBody {
    fn encoded(self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Json(json) => Some(json),
            Self::Form(fields) => {
                let mut serializer = url::form_urlencoded::Serializer::new(String::new());
                serializer.extend_pairs(fields);
                Some(serializer.finish())
            }
        }
    }
}

#[derive(Debug, Clone)]
struct RawResponse {
    status: u16,
    body: String,
}

trait HttpTransport: Send + Sync + std::fmt::Debug {
    fn execute(
        &self,
        method: Method,
        url: &str,
        headers: &[(&'static str, String)],
        body: Option<&str>,
    ) -> Result<RawResponse, Box<dyn StdError + Send + Sync>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport for ReqwestTransport {
    fn execute(
        &self,
        method: Method,
        url: &str,
        headers: &[(&'static str, String)],
        body: Option<&str>,
    ) -> Result<RawResponse, Box<dyn StdError + Send + Sync>> {
        let mut request = self.client.request(method.into(), url);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }
        if let Some(body) = body {
            request = request.body(body.to_owned());
        }
        let response = request.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(RawResponse { status, body })
    }
}

#[derive(Debug)]
struct SenderIdCache {
    query: PageQuery,
    items: Vec<serde_json::Value>,
}

#[derive(Debug, Clone)]
/// Builder for [`ArambaClient`].
///
/// Use this to set the default sender id and to customize the endpoint,
/// request timeout, or user-agent.
pub struct ArambaClientBuilder {
    api_key: ApiKey,
    sender_id: Option<SenderId>,
    base_url: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl ArambaClientBuilder {
    /// Create a builder with the default endpoint and no timeout/user-agent
    /// override.
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            sender_id: None,
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: None,
            user_agent: None,
        }
    }

    /// Set the default sender id applied to messages that do not carry one.
    pub fn sender_id(mut self, sender_id: SenderId) -> Self {
        self.sender_id = Some(sender_id);
        self
    }

    /// Override the Aramba API base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build an [`ArambaClient`].
    pub fn build(self) -> Result<ArambaClient, ArambaError> {
        let sender_id = self.sender_id.ok_or(ArambaError::MissingSenderId)?;

        let base_url = Url::parse(&self.base_url).map_err(|_| ArambaError::InvalidBaseUrl {
            url: self.base_url.clone(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ArambaError::InvalidBaseUrl { url: self.base_url });
        }

        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        let client = builder
            .build()
            .map_err(|err| ArambaError::Transport(Box::new(err)))?;

        Ok(ArambaClient {
            api_key: self.api_key,
            sender_id,
            base_url,
            http: Arc::new(ReqwestTransport { client }),
            queue: Vec::new(),
            sender_ids: None,
        })
    }
}

/// Synchronous Aramba sender engine.
///
/// Owns the credentials, the default sender id, an ordered queue of pending
/// [`Sms`], and a cache of the last sender-id listing. One HTTP request is
/// issued per operation; the type is meant for single-threaded use (mutations
/// go through `&mut self`).
#[derive(Debug)]
pub struct ArambaClient {
    api_key: ApiKey,
    sender_id: SenderId,
    base_url: Url,
    http: Arc<dyn HttpTransport>,
    queue: Vec<Sms>,
    sender_ids: Option<SenderIdCache>,
}

impl ArambaClient {
    /// Create a client against the production endpoint.
    ///
    /// For more customization, use [`ArambaClient::builder`].
    pub fn new(api_key: ApiKey, sender_id: SenderId) -> Self {
        Self {
            api_key,
            sender_id,
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default API endpoint is a valid url"),
            http: Arc::new(ReqwestTransport {
                client: reqwest::blocking::Client::new(),
            }),
            queue: Vec::new(),
            sender_ids: None,
        }
    }

    /// Start building a client with custom settings.
    pub fn builder(api_key: ApiKey) -> ArambaClientBuilder {
        ArambaClientBuilder::new(api_key)
    }

    /// The default sender id applied to new messages.
    pub fn sender_id(&self) -> &SenderId {
        &self.sender_id
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn dispatch(
        &self,
        method: Method,
        url: Url,
        body: RequestBody,
        extra_headers: &[(&'static str, &str)],
    ) -> Result<ApiResponse, ArambaError> {
        let mut headers: Vec<(&'static str, String)> = Vec::with_capacity(extra_headers.len() + 3);
        for (name, value) in extra_headers.iter().copied() {
            // required headers win over caller-supplied ones
            if RESERVED_HEADERS
                .iter()
                .any(|reserved| name.eq_ignore_ascii_case(reserved))
            {
                continue;
            }
            headers.push((name, value.to_owned()));
        }
        headers.push((AUTHORIZATION, self.api_key.authorization_value()));
        headers.push((ACCEPT, APPLICATION_JSON.to_owned()));
        headers.push((CONTENT_TYPE, APPLICATION_JSON.to_owned()));

        tracing::debug!(%method, %url, "dispatching Aramba API request");

        let body = body.encoded();
        let response = self
            .http
            .execute(method, url.as_str(), &headers, body.as_deref())
            .map_err(ArambaError::Transport)?;

        if let Some(message) = api_error_message(response.status) {
            tracing::debug!(status = response.status, reason = message, "Aramba API error");
            return Err(ArambaError::Api {
                status: response.status,
                message,
            });
        }

        Ok(ApiResponse {
            status: response.status,
            body: response.body,
        })
    }

    /// List the sender ids registered with the account.
    ///
    /// The result is cached per pagination window: repeated calls with an
    /// equal [`PageQuery`] return the cached listing without issuing a
    /// request. Item schema is not documented by Aramba, so entries are
    /// decoded JSON values.
    pub fn available_sender_ids(
        &mut self,
        query: PageQuery,
    ) -> Result<&[serde_json::Value], ArambaError> {
        let stale = self
            .sender_ids
            .as_ref()
            .is_none_or(|cache| cache.query != query);
        if stale {
            let mut url = self.endpoint(&[SMS_SENDER_IDS]);
            url.query_pairs_mut()
                .append_pair(PageQuery::OFFSET_FIELD, &query.offset.to_string())
                .append_pair(PageLimit::FIELD, &query.limit.value().to_string());
            let response = self.dispatch(Method::Get, url, RequestBody::Empty, &[])?;
            let items = transport::decode_sender_ids(response.body()).map_err(parse_error)?;
            self.sender_ids = Some(SenderIdCache { query, items });
        }
        match &self.sender_ids {
            Some(cache) => Ok(&cache.items),
            None => Ok(&[]),
        }
    }

    /// Query the account balance; the body shape is left to the caller.
    pub fn ask_balance(&self) -> Result<ApiResponse, ArambaError> {
        self.dispatch(
            Method::Get,
            self.endpoint(&[BALANCE]),
            RequestBody::Empty,
            &[],
        )
    }

    /// Create a contact group.
    pub fn create_group(&self, name: &str) -> Result<ApiResponse, ArambaError> {
        self.dispatch(
            Method::Post,
            self.endpoint(&[CONTACT_GROUPS]),
            RequestBody::Form(vec![("name".to_owned(), name.to_owned())]),
            &[],
        )
    }

    /// Fetch a contact group.
    pub fn retrieve_group(&self, group_id: &GroupId) -> Result<ApiResponse, ArambaError> {
        self.dispatch(
            Method::Get,
            self.endpoint(&[CONTACT_GROUPS, group_id.as_str()]),
            RequestBody::Empty,
            &[],
        )
    }

    /// Rename a contact group.
    pub fn update_group(&self, group_id: &GroupId, name: &str) -> Result<ApiResponse, ArambaError> {
        self.dispatch(
            Method::Put,
            self.endpoint(&[CONTACT_GROUPS, group_id.as_str()]),
            RequestBody::Form(vec![("name".to_owned(), name.to_owned())]),
            &[],
        )
    }

    /// Delete a contact group.
    pub fn delete_group(&self, group_id: &GroupId) -> Result<ApiResponse, ArambaError> {
        self.dispatch(
            Method::Delete,
            self.endpoint(&[CONTACT_GROUPS, group_id.as_str()]),
            RequestBody::Empty,
            &[],
        )
    }

    /// Create a contact inside a group from raw field pairs.
    pub fn create_contact(
        &self,
        group_id: &GroupId,
        fields: Vec<(String, String)>,
    ) -> Result<ApiResponse, ArambaError> {
        self.dispatch(
            Method::Post,
            self.endpoint(&[CONTACT_GROUPS, group_id.as_str(), GROUP_CONTACTS]),
            RequestBody::Form(fields),
            &[],
        )
    }

    /// Fetch a contact.
    pub fn retrieve_contact(
        &self,
        group_id: &GroupId,
        contact_id: &ContactId,
    ) -> Result<ApiResponse, ArambaError> {
        self.dispatch(
            Method::Get,
            self.endpoint(&[
                CONTACT_GROUPS,
                group_id.as_str(),
                GROUP_CONTACTS,
                contact_id.as_str(),
            ]),
            RequestBody::Empty,
            &[],
        )
    }

    /// Update a contact from raw field pairs.
    pub fn update_contact(
        &self,
        group_id: &GroupId,
        contact_id: &ContactId,
        fields: Vec<(String, String)>,
    ) -> Result<ApiResponse, ArambaError> {
        self.dispatch(
            Method::Put,
            self.endpoint(&[
                CONTACT_GROUPS,
                group_id.as_str(),
                GROUP_CONTACTS,
                contact_id.as_str(),
            ]),
            RequestBody::Form(fields),
            &[],
        )
    }

    /// Delete a contact.
    pub fn delete_contact(
        &self,
        group_id: &GroupId,
        contact_id: &ContactId,
    ) -> Result<ApiResponse, ArambaError> {
        self.dispatch(
            Method::Delete,
            self.endpoint(&[
                CONTACT_GROUPS,
                group_id.as_str(),
                GROUP_CONTACTS,
                contact_id.as_str(),
            ]),
            RequestBody::Empty,
            &[],
        )
    }

    /// Construct a single message; the engine's sender id applies unless the
    /// options carry one.
    pub fn new_sms(
        &self,
        number: impl Into<String>,
        content: impl Into<String>,
        options: SmsOptions,
    ) -> Result<Sms, ValidationError> {
        Sms::new(&self.sender_id, number, content, options)
    }

    /// Construct a bulk message over a sequence of recipients.
    pub fn new_bulk_sms(
        &self,
        numbers: impl IntoIterator<Item = impl Into<String>>,
        content: impl Into<String>,
        options: SmsOptions,
    ) -> Result<MultiSms, ValidationError> {
        MultiSms::new(&self.sender_id, numbers, content, options)
    }

    /// Construct a message and append it to the outbound queue.
    pub fn append_new_sms(
        &mut self,
        number: impl Into<String>,
        content: impl Into<String>,
        options: SmsOptions,
    ) -> Result<(), ValidationError> {
        let sms = Sms::new(&self.sender_id, number, content, options)?;
        self.queue.push(sms);
        Ok(())
    }

    /// The pending message queue, in append order.
    pub fn queue(&self) -> &[Sms] {
        &self.queue
    }

    /// Send every queued message in order.
    ///
    /// The queue is not drained: messages already in a terminal status are
    /// skipped by their own send guard, so repeated flushes only touch new or
    /// failed entries. The first transport-level failure stops the iteration
    /// and propagates; the queue is preserved.
    pub fn send_queued(&mut self) -> Result<(), ArambaError> {
        let mut queue = std::mem::take(&mut self.queue);
        let mut outcome = Ok(());
        for sms in queue.iter_mut() {
            if let Err(err) = sms.send(self) {
                outcome = Err(err);
                break;
            }
        }
        self.queue = queue;
        outcome
    }

    pub(crate) fn submit_single(
        &self,
        payload: &transport::SingleSmsPayload<'_>,
    ) -> Result<ApiResponse, ArambaError> {
        let body = transport::encode_single_sms(payload).map_err(parse_error)?;
        self.dispatch(
            Method::Post,
            self.endpoint(&[SINGLE_SMS]),
            RequestBody::Json(body),
            &[],
        )
    }

    pub(crate) fn submit_bulk(
        &self,
        payload: &transport::BulkSmsPayload<'_>,
    ) -> Result<ApiResponse, ArambaError> {
        let body = transport::encode_bulk_sms(payload).map_err(parse_error)?;
        self.dispatch(
            Method::Post,
            self.endpoint(&[SINGLE_SMS, MULTIPLE]),
            RequestBody::Json(body),
            &[],
        )
    }
}
