use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{FromRequest, Path, Request, State},
    http::{header::HOST, request::Parts, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use ring::digest::{digest, SHA1_FOR_LEGACY_USE_ONLY};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::warn;

/// Largest accepted gap between a request timestamp and server time.
pub const MAX_DRIFT_SECS: i64 = 300;

/// Credentials the server expects on authenticated routes.
#[derive(Clone, Debug)]
pub struct MockCredentials {
    pub application_key: String,
    pub application_secret: String,
    pub consumer_key: String,
}

impl Default for MockCredentials {
    fn default() -> Self {
        Self {
            application_key: "mock-application-key".to_string(),
            application_secret: "mock-application-secret".to_string(),
            consumer_key: "mock-consumer-key".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Currency {
    pub symbol: String,
    pub code: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub firstname: String,
    pub name: String,
    pub nichandle: String,
    pub email: String,
    pub country: String,
    pub ovh_subsidiary: String,
    pub currency: Currency,
}

impl Default for Account {
    fn default() -> Self {
        Self {
            firstname: "Foo".to_string(),
            name: "Bar".to_string(),
            nichandle: "fb0000-ovh".to_string(),
            email: "test@foobar.com".to_string(),
            country: "FR".to_string(),
            ovh_subsidiary: "FR".to_string(),
            currency: Currency {
                symbol: "€".to_string(),
                code: "EUR".to_string(),
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateAccount {
    pub firstname: Option<String>,
    pub name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SshKey {
    pub key_name: String,
    pub key: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

pub struct AppState {
    credentials: MockCredentials,
    account: RwLock<Account>,
    ssh_keys: RwLock<HashMap<String, SshKey>>,
}

pub type Shared = Arc<AppState>;

type Rejection = (StatusCode, Json<ErrorBody>);

fn reject(status: StatusCode, message: &str) -> Rejection {
    (
        status,
        Json(ErrorBody {
            message: message.to_string(),
        }),
    )
}

pub fn app(credentials: MockCredentials) -> Router {
    let state: Shared = Arc::new(AppState {
        credentials,
        account: RwLock::new(Account::default()),
        ssh_keys: RwLock::new(HashMap::new()),
    });
    Router::new()
        .route("/auth/time", get(auth_time))
        .route("/me", get(get_me).put(update_me))
        .route("/me/sshKey", post(create_ssh_key))
        .route("/me/sshKey/{name}", get(get_ssh_key).delete(delete_ssh_key))
        .route("/status/{code}", get(status))
        .with_state(state)
}

pub async fn run(listener: TcpListener, credentials: MockCredentials) -> Result<(), std::io::Error> {
    axum::serve(listener, app(credentials)).await
}

/// Recompute the `X-Ovh-Signature` value the way the API does: SHA-1 over
/// the ISO-8859-1 bytes of the `+`-joined fields, `?` for unmappable chars.
pub fn expected_signature(
    secret: &str,
    consumer_key: &str,
    method: &str,
    url: &str,
    body: &str,
    timestamp: i64,
) -> String {
    let to_sign = format!("{secret}+{consumer_key}+{method}+{url}+{body}+{timestamp}");
    let bytes: Vec<u8> = to_sign
        .chars()
        .map(|c| if (c as u32) <= 0xFF { c as u8 } else { b'?' })
        .collect();
    format!("$1${}", hex::encode(digest(&SHA1_FOR_LEGACY_USE_ONLY, &bytes)))
}

fn verify(credentials: &MockCredentials, parts: &Parts, body: &str) -> Result<(), Rejection> {
    let header = |name: &str| parts.headers.get(name).and_then(|v| v.to_str().ok());

    if header("x-ovh-application") != Some(credentials.application_key.as_str()) {
        return Err(reject(StatusCode::FORBIDDEN, "Invalid application key"));
    }
    if header("x-ovh-consumer") != Some(credentials.consumer_key.as_str()) {
        return Err(reject(StatusCode::FORBIDDEN, "Invalid credential"));
    }
    let timestamp: i64 = header("x-ovh-timestamp")
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| reject(StatusCode::FORBIDDEN, "Invalid timestamp"))?;
    if (Utc::now().timestamp() - timestamp).abs() > MAX_DRIFT_SECS {
        return Err(reject(StatusCode::FORBIDDEN, "Query out of time"));
    }
    let host = header(HOST.as_str()).ok_or_else(|| reject(StatusCode::BAD_REQUEST, "Missing Host header"))?;

    let url = format!("http://{host}{}", parts.uri);
    let expected = expected_signature(
        &credentials.application_secret,
        &credentials.consumer_key,
        parts.method.as_str(),
        &url,
        body,
        timestamp,
    );
    if header("x-ovh-signature") != Some(expected.as_str()) {
        return Err(reject(StatusCode::FORBIDDEN, "Invalid signature"));
    }
    Ok(())
}

/// Request body of a call whose `X-Ovh-*` headers and signature checked out.
pub struct Signed(pub String);

impl FromRequest<Shared> for Signed {
    type Rejection = Rejection;

    async fn from_request(req: Request, state: &Shared) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(|_| reject(StatusCode::BAD_REQUEST, "Unreadable body"))?;
        // Payloads arrive as ISO-8859-1; every byte is one char.
        let body: String = bytes.iter().map(|&b| b as char).collect();
        if let Err(rejection) = verify(&state.credentials, &parts, &body) {
            warn!(method = %parts.method, uri = %parts.uri, reason = %rejection.1.message, "rejecting request");
            return Err(rejection);
        }
        Ok(Signed(body))
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, Rejection> {
    serde_json::from_str(body).map_err(|e| reject(StatusCode::BAD_REQUEST, &format!("Invalid body: {e}")))
}

async fn auth_time() -> Json<i64> {
    Json(Utc::now().timestamp())
}

async fn get_me(State(state): State<Shared>, Signed(_): Signed) -> Json<Account> {
    Json(state.account.read().await.clone())
}

async fn update_me(State(state): State<Shared>, Signed(body): Signed) -> Result<Json<()>, Rejection> {
    let input: UpdateAccount = parse_body(&body)?;
    let mut account = state.account.write().await;
    if let Some(firstname) = input.firstname {
        account.firstname = firstname;
    }
    if let Some(name) = input.name {
        account.name = name;
    }
    Ok(Json(()))
}

async fn create_ssh_key(State(state): State<Shared>, Signed(body): Signed) -> Result<Json<()>, Rejection> {
    let input: SshKey = parse_body(&body)?;
    let mut keys = state.ssh_keys.write().await;
    if keys.contains_key(&input.key_name) {
        return Err(reject(
            StatusCode::CONFLICT,
            &format!("This key name already exists: {}", input.key_name),
        ));
    }
    keys.insert(input.key_name.clone(), input);
    Ok(Json(()))
}

async fn get_ssh_key(
    State(state): State<Shared>,
    Path(name): Path<String>,
    Signed(_): Signed,
) -> Result<Json<SshKey>, Rejection> {
    let keys = state.ssh_keys.read().await;
    keys.get(&name)
        .cloned()
        .map(Json)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, &format!("The requested object ({name}) does not exist")))
}

async fn delete_ssh_key(
    State(state): State<Shared>,
    Path(name): Path<String>,
    Signed(_): Signed,
) -> Result<Json<()>, Rejection> {
    match state.ssh_keys.write().await.remove(&name) {
        Some(_) => Ok(Json(())),
        None => Err(reject(
            StatusCode::NOT_FOUND,
            &format!("The requested object ({name}) does not exist"),
        )),
    }
}

async fn status(Path(code): Path<u16>) -> Rejection {
    match StatusCode::from_u16(code) {
        Ok(status) => reject(status, &format!("status {code}")),
        Err(_) => reject(StatusCode::BAD_REQUEST, &format!("invalid status {code}")),
    }
}
