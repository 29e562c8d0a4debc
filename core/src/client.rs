//! Signed request dispatcher for the OVH REST API.
//!
//! # Design
//! `OvhClient` holds only its `ClientConfig` and a `Transport`, and carries
//! no mutable state between calls, so one client can be shared by many
//! threads. Each call is split the same way as the host-does-IO pattern:
//! `build_request` assembles a complete `HttpRequest` (signature included),
//! the transport executes it, and `parse_response` classifies the status.
//! Both halves are public so callers with their own HTTP stack can skip the
//! transport entirely.

use chrono::Utc;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::endpoint;
use crate::error::{ApiError, ErrorKind};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::signature;
use crate::transport::{Transport, UreqTransport};

pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_APPLICATION: &str = "X-Ovh-Application";
pub const HEADER_CONSUMER: &str = "X-Ovh-Consumer";
pub const HEADER_TIMESTAMP: &str = "X-Ovh-Timestamp";
pub const HEADER_SIGNATURE: &str = "X-Ovh-Signature";

/// Synchronous, stateless client for the OVH API.
#[derive(Debug, Clone)]
pub struct OvhClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl OvhClient<UreqTransport> {
    /// Client using a `ureq` transport bounded by the configured timeouts.
    pub fn new(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.connect_timeout(), config.read_timeout());
        Self { config, transport }
    }
}

impl<T> OvhClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Base URL the configured endpoint resolves to.
    pub fn base_url(&self) -> &str {
        endpoint::resolve(&self.config.endpoint)
    }

    /// Build a request, signing it with the current wall-clock time when
    /// `need_auth` is set.
    pub fn build_request(&self, method: HttpMethod, path: &str, body: &str, need_auth: bool) -> HttpRequest {
        let timestamp = if need_auth { Utc::now().timestamp() } else { 0 };
        self.build_request_at(method, path, body, need_auth, timestamp)
    }

    /// Build a request signed with an explicit unix `timestamp`.
    ///
    /// `path` is appended to the base URL verbatim. `timestamp` is ignored
    /// when `need_auth` is false.
    pub fn build_request_at(
        &self,
        method: HttpMethod,
        path: &str,
        body: &str,
        need_auth: bool,
        timestamp: i64,
    ) -> HttpRequest {
        let url = format!("{}{path}", self.base_url());

        let mut headers = vec![
            (HEADER_CONTENT_TYPE.to_string(), "application/json".to_string()),
            (HEADER_APPLICATION.to_string(), self.config.application_key.clone()),
        ];
        if need_auth {
            let signature = signature::sign(
                &self.config.application_secret,
                &self.config.consumer_key,
                method.as_str(),
                &url,
                body,
                timestamp,
            );
            headers.push((HEADER_CONSUMER.to_string(), self.config.consumer_key.clone()));
            headers.push((HEADER_TIMESTAMP.to_string(), timestamp.to_string()));
            headers.push((HEADER_SIGNATURE.to_string(), signature));
        }

        HttpRequest {
            method,
            url,
            headers,
            body: (!body.is_empty()).then(|| body.to_string()),
        }
    }

    /// Return the raw body on 200, or the classified error carrying it.
    pub fn parse_response(&self, response: HttpResponse) -> Result<String, ApiError> {
        if response.status == 200 {
            return Ok(response.body);
        }
        Err(ErrorKind::from_status(response.status).with_message(response.body))
    }
}

impl<T: Transport> OvhClient<T> {
    /// Issue one request and classify the outcome. Nothing is retried.
    pub fn call(&self, method: HttpMethod, path: &str, body: &str, need_auth: bool) -> Result<String, ApiError> {
        let request = self.build_request(method, path, body, need_auth);
        debug!(%method, url = %request.url, authenticated = need_auth, "sending request");

        let response = match self.transport.execute(&request) {
            Ok(response) => response,
            Err(err) => {
                warn!(%method, url = %request.url, error = %err, "request did not complete");
                return Err(err);
            }
        };

        let status = response.status;
        match self.parse_response(response) {
            Ok(body) => {
                debug!(status, bytes = body.len(), "request succeeded");
                Ok(body)
            }
            Err(err) => {
                warn!(%method, url = %request.url, status, kind = %err.kind(), "request rejected");
                Err(err)
            }
        }
    }

    /// Authenticated GET without a body.
    pub fn get(&self, path: &str) -> Result<String, ApiError> {
        self.call(HttpMethod::Get, path, "", true)
    }

    pub fn get_with(&self, path: &str, need_auth: bool) -> Result<String, ApiError> {
        self.call(HttpMethod::Get, path, "", need_auth)
    }

    pub fn get_with_body(&self, path: &str, body: &str, need_auth: bool) -> Result<String, ApiError> {
        self.call(HttpMethod::Get, path, body, need_auth)
    }

    pub fn put(&self, path: &str, body: &str, need_auth: bool) -> Result<String, ApiError> {
        self.call(HttpMethod::Put, path, body, need_auth)
    }

    pub fn post(&self, path: &str, body: &str, need_auth: bool) -> Result<String, ApiError> {
        self.call(HttpMethod::Post, path, body, need_auth)
    }

    pub fn delete(&self, path: &str, body: &str, need_auth: bool) -> Result<String, ApiError> {
        self.call(HttpMethod::Delete, path, body, need_auth)
    }

    /// Server clock as unix seconds, from the unauthenticated `/auth/time`.
    ///
    /// Comparing it with the local clock tells a caller whether signed calls
    /// will be rejected for timestamp drift.
    pub fn server_time(&self) -> Result<i64, ApiError> {
        let body = self.get_with("/auth/time", false)?;
        body.trim()
            .parse()
            .map_err(|_| ApiError::Api(format!("unexpected /auth/time response: {body}")))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Replies with a fixed response and records every request it sees.
    struct Canned {
        reply: Result<HttpResponse, ApiError>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Canned {
        fn status(status: u16, body: &str) -> Self {
            Self {
                reply: Ok(HttpResponse {
                    status,
                    headers: Vec::new(),
                    body: body.to_string(),
                }),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(ApiError::Internal(message.to_string())),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn last(&self) -> HttpRequest {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl Transport for Canned {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.lock().unwrap().push(request.clone());
            self.reply.clone()
        }
    }

    fn config(endpoint: &str) -> ClientConfig {
        ClientConfig::new(endpoint, "app-key", "S", "C")
    }

    fn client() -> OvhClient<Canned> {
        OvhClient::with_transport(config("ovh-eu"), Canned::status(200, ""))
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_request_resolves_alias_and_appends_path() {
        let req = client().build_request_at(HttpMethod::Get, "/me", "", true, 1000);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://eu.api.ovh.com/1.0/me");
        assert!(req.body.is_none());
    }

    #[test]
    fn literal_endpoint_is_used_verbatim() {
        let client = OvhClient::with_transport(config("https://x"), Canned::status(200, ""));
        let req = client.build_request_at(HttpMethod::Get, "/y", "", true, 1000);
        assert_eq!(req.url, "https://x/y");
        assert_eq!(
            req.header(HEADER_SIGNATURE),
            Some("$1$b2f46a992ea0270ba49dad51f80fbabd95e84022")
        );
    }

    #[test]
    fn authenticated_request_carries_all_headers() {
        let req = client().build_request_at(HttpMethod::Post, "/me/sshKey", r#"{"keyName":"k"}"#, true, 1700000000);
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header(HEADER_APPLICATION), Some("app-key"));
        assert_eq!(req.header(HEADER_CONSUMER), Some("C"));
        assert_eq!(req.header(HEADER_TIMESTAMP), Some("1700000000"));
        let expected = signature::sign(
            "S",
            "C",
            "POST",
            "https://eu.api.ovh.com/1.0/me/sshKey",
            r#"{"keyName":"k"}"#,
            1700000000,
        );
        assert_eq!(req.header(HEADER_SIGNATURE), Some(expected.as_str()));
        assert_eq!(req.body.as_deref(), Some(r#"{"keyName":"k"}"#));
    }

    #[test]
    fn unauthenticated_request_omits_signing_headers() {
        let req = client().build_request_at(HttpMethod::Get, "/auth/time", "", false, 1000);
        assert_eq!(req.headers.len(), 2);
        assert_eq!(req.header(HEADER_APPLICATION), Some("app-key"));
        assert!(req.header(HEADER_CONSUMER).is_none());
        assert!(req.header(HEADER_TIMESTAMP).is_none());
        assert!(req.header(HEADER_SIGNATURE).is_none());
    }

    #[test]
    fn build_request_uses_current_time() {
        let before = Utc::now().timestamp();
        let req = client().build_request(HttpMethod::Get, "/me", "", true);
        let after = Utc::now().timestamp();
        let ts: i64 = req.header(HEADER_TIMESTAMP).unwrap().parse().unwrap();
        assert!(before <= ts && ts <= after);
    }

    #[test]
    fn parse_response_success_is_unmodified() {
        let body = client().parse_response(response(200, r#"{"firstname":"Foo"}"#)).unwrap();
        assert_eq!(body, r#"{"firstname":"Foo"}"#);
    }

    #[test]
    fn parse_response_classifies_errors() {
        let c = client();
        let err = c.parse_response(response(400, "bad body")).unwrap_err();
        assert_eq!(err, ApiError::BadParameters("bad body".to_string()));
        assert_eq!(c.parse_response(response(403, "")).unwrap_err().kind(), ErrorKind::Auth);
        assert_eq!(
            c.parse_response(response(404, "")).unwrap_err().kind(),
            ErrorKind::ResourceNotFound
        );
        assert_eq!(
            c.parse_response(response(409, "")).unwrap_err().kind(),
            ErrorKind::ResourceConflict
        );
        let err = c.parse_response(response(500, "boom")).unwrap_err();
        assert_eq!(err, ApiError::Api("boom".to_string()));
    }

    #[test]
    fn non_200_success_status_is_an_api_error() {
        let err = client().parse_response(response(204, "")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Api);
    }

    #[test]
    fn wrappers_pick_method_and_auth() {
        let c = client();
        c.get("/me").unwrap();
        let req = c.transport.last();
        assert_eq!(req.method, HttpMethod::Get);
        assert!(req.header(HEADER_SIGNATURE).is_some());

        c.get_with("/me", false).unwrap();
        assert!(c.transport.last().header(HEADER_SIGNATURE).is_none());

        c.put("/me", "{}", true).unwrap();
        assert_eq!(c.transport.last().method, HttpMethod::Put);

        c.post("/me/sshKey", "{}", true).unwrap();
        assert_eq!(c.transport.last().method, HttpMethod::Post);

        c.delete("/me/sshKey/k", "", true).unwrap();
        let req = c.transport.last();
        assert_eq!(req.method, HttpMethod::Delete);
        assert!(req.body.is_none());

        c.get_with_body("/me", "{}", false).unwrap();
        assert_eq!(c.transport.last().body.as_deref(), Some("{}"));
    }

    #[test]
    fn transport_failure_is_internal_error() {
        let c = OvhClient::with_transport(config("ovh-eu"), Canned::failing("connection refused"));
        let err = c.get("/me").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.message(), "connection refused");
    }

    #[test]
    fn server_time_parses_integer() {
        let c = OvhClient::with_transport(config("ovh-eu"), Canned::status(200, "1700000000"));
        assert_eq!(c.server_time().unwrap(), 1700000000);
        assert!(c.transport.last().header(HEADER_SIGNATURE).is_none());

        let c = OvhClient::with_transport(config("ovh-eu"), Canned::status(200, "\"soon\""));
        assert_eq!(c.server_time().unwrap_err().kind(), ErrorKind::Api);
    }
}
