//! HTTP API server for the Accredit node.
//!
//! Every mutating route is attributed to the identity in the `x-caller`
//! header. Handlers never touch the ledger; they forward a
//! [`LedgerCommand`] to the ledger task and wait for its reply.

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request, State},
    http::{request::Parts, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;

use accredit_core::{Address, CredentialId, Digest};
use accredit_crypto::InclusionProof;
use accredit_ledger::{AccessRequest, GrantRequest, IssuerKind, LedgerError};

use crate::commands::{
    AccessRootResponse, CompanyResponse, CredentialResponse, EventsResponse, GrantResponse,
    InstitutionStatusResponse, IssuedResponse, LedgerCommand, LedgerStatus, RoleResponse,
};
use crate::state::NodeState;

/// Header carrying the caller's identity.
pub const CALLER_HEADER: &str = "x-caller";

// --- Request / response types ---

#[derive(Deserialize)]
pub struct AddressRequest {
    pub address: Address,
}

#[derive(Deserialize)]
pub struct IssueCredentialRequest {
    pub owner: Address,
    pub pointer: String,
    #[serde(default)]
    pub issuer_kind: Option<IssuerKind>,
}

#[derive(Deserialize)]
pub struct UpdateAccessRequest {
    pub access_root: Digest,
}

#[derive(Deserialize)]
pub struct GrantAccessRequest {
    pub verifier: Address,
    pub proof_is_valid: bool,
    pub proof: InclusionProof,
}

#[derive(Deserialize)]
pub struct EventsQuery {
    #[serde(default)]
    pub since: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub version: String,
    pub uptime_secs: u64,
    pub ledger: LedgerStatus,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            code: code.into(),
            error: error.into(),
        }),
    )
}

fn invalid_input(error: impl Into<String>) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, "InvalidInput", error)
}

/// HTTP status for a refused ledger transition.
pub fn status_for(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::Unauthorized(_) | LedgerError::AccessDenied(_) => StatusCode::FORBIDDEN,
        LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::Conflict(_) => StatusCode::CONFLICT,
        LedgerError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        LedgerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn ledger_error(err: LedgerError) -> ApiError {
    api_error(status_for(&err), err.code(), err.to_string())
}

fn parse_address(raw: &str) -> Result<Address, ApiError> {
    Address::new(raw).map_err(|e| invalid_input(e.to_string()))
}

/// The identity a request is attributed to.
pub struct Caller(pub Address);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(CALLER_HEADER)
            .ok_or_else(|| invalid_input(format!("missing {} header", CALLER_HEADER)))?;
        let text = value
            .to_str()
            .map_err(|_| invalid_input(format!("{} header is not valid text", CALLER_HEADER)))?;
        parse_address(text).map(Caller)
    }
}

/// JSON body whose rejections use the `{code, error}` error body.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| invalid_input(rejection.body_text()))?;
        Ok(ApiJson(value))
    }
}

/// Path parameters, rejected as `InvalidInput`.
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| invalid_input(rejection.body_text()))?;
        Ok(ApiPath(value))
    }
}

/// Query string, rejected as `InvalidInput`.
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| invalid_input(rejection.body_text()))?;
        Ok(ApiQuery(value))
    }
}

// --- Handlers ---

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
    })
}

async fn handle_status(State(state): State<Arc<NodeState>>) -> ApiResult<StatusResponse> {
    let (reply, rx) = oneshot::channel();
    let Json(ledger) = send_command_and_await(&state, LedgerCommand::Status { reply }, rx).await?;
    Ok(Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
        ledger,
    }))
}

async fn handle_add_admin(
    State(state): State<Arc<NodeState>>,
    Caller(caller): Caller,
    ApiJson(req): ApiJson<AddressRequest>,
) -> ApiResult<RoleResponse> {
    let (reply, rx) = oneshot::channel();
    let cmd = LedgerCommand::AddAdmin {
        caller,
        admin: req.address,
        reply,
    };
    send_command_and_await(&state, cmd, rx).await
}

async fn handle_add_institution(
    State(state): State<Arc<NodeState>>,
    Caller(caller): Caller,
    ApiJson(req): ApiJson<AddressRequest>,
) -> ApiResult<RoleResponse> {
    let (reply, rx) = oneshot::channel();
    let cmd = LedgerCommand::AddInstitution {
        caller,
        institution: req.address,
        reply,
    };
    send_command_and_await(&state, cmd, rx).await
}

async fn handle_institution_status(
    State(state): State<Arc<NodeState>>,
    ApiPath(address): ApiPath<String>,
) -> ApiResult<InstitutionStatusResponse> {
    let institution = parse_address(&address)?;
    let (reply, rx) = oneshot::channel();
    let cmd = LedgerCommand::InstitutionStatus { institution, reply };
    send_command_and_await(&state, cmd, rx).await
}

async fn handle_issue_credential(
    State(state): State<Arc<NodeState>>,
    Caller(caller): Caller,
    ApiJson(req): ApiJson<IssueCredentialRequest>,
) -> ApiResult<IssuedResponse> {
    let (reply, rx) = oneshot::channel();
    let cmd = LedgerCommand::IssueCredential {
        caller,
        owner: req.owner,
        pointer: req.pointer,
        kind: req.issuer_kind,
        reply,
    };
    send_command_and_await(&state, cmd, rx).await
}

async fn handle_get_credential(
    State(state): State<Arc<NodeState>>,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<u64>,
) -> ApiResult<CredentialResponse> {
    let (reply, rx) = oneshot::channel();
    let cmd = LedgerCommand::GetCredential {
        caller,
        credential_id: CredentialId(id),
        reply,
    };
    send_command_and_await(&state, cmd, rx).await
}

async fn handle_get_access(
    State(state): State<Arc<NodeState>>,
    ApiPath(id): ApiPath<u64>,
) -> ApiResult<AccessRootResponse> {
    let (reply, rx) = oneshot::channel();
    let cmd = LedgerCommand::GetAccessRoot {
        credential_id: CredentialId(id),
        reply,
    };
    send_command_and_await(&state, cmd, rx).await
}

async fn handle_update_access(
    State(state): State<Arc<NodeState>>,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<u64>,
    ApiJson(req): ApiJson<UpdateAccessRequest>,
) -> ApiResult<AccessRootResponse> {
    let (reply, rx) = oneshot::channel();
    let cmd = LedgerCommand::UpdateAccess {
        caller,
        credential_id: CredentialId(id),
        access_root: req.access_root,
        reply,
    };
    send_command_and_await(&state, cmd, rx).await
}

async fn handle_request_access(
    State(state): State<Arc<NodeState>>,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<u64>,
) -> ApiResult<AccessRequest> {
    let (reply, rx) = oneshot::channel();
    let cmd = LedgerCommand::RequestAccess {
        caller,
        credential_id: CredentialId(id),
        reply,
    };
    send_command_and_await(&state, cmd, rx).await
}

async fn handle_grant_access(
    State(state): State<Arc<NodeState>>,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<u64>,
    ApiJson(req): ApiJson<GrantAccessRequest>,
) -> ApiResult<GrantResponse> {
    let (reply, rx) = oneshot::channel();
    let cmd = LedgerCommand::GrantAccess {
        caller,
        grant: GrantRequest {
            credential_id: CredentialId(id),
            verifier: req.verifier,
            proof_is_valid: req.proof_is_valid,
            proof: req.proof,
        },
        reply,
    };
    send_command_and_await(&state, cmd, rx).await
}

async fn handle_add_company(
    State(state): State<Arc<NodeState>>,
    Caller(caller): Caller,
    ApiJson(req): ApiJson<AddressRequest>,
) -> ApiResult<CompanyResponse> {
    let (reply, rx) = oneshot::channel();
    let cmd = LedgerCommand::AddCompany {
        caller,
        company: req.address,
        reply,
    };
    send_command_and_await(&state, cmd, rx).await
}

async fn handle_company_stats(
    State(state): State<Arc<NodeState>>,
    ApiPath(address): ApiPath<String>,
) -> ApiResult<CompanyResponse> {
    let company = parse_address(&address)?;
    let (reply, rx) = oneshot::channel();
    let cmd = LedgerCommand::CompanyStats { company, reply };
    send_command_and_await(&state, cmd, rx).await
}

async fn handle_events(
    State(state): State<Arc<NodeState>>,
    ApiQuery(query): ApiQuery<EventsQuery>,
) -> ApiResult<EventsResponse> {
    let (reply, rx) = oneshot::channel();
    let cmd = LedgerCommand::Events {
        since: query.since,
        reply,
    };
    send_command_and_await(&state, cmd, rx).await
}

/// Helper to send a command and await the reply.
async fn send_command_and_await<T: Serialize>(
    state: &Arc<NodeState>,
    cmd: LedgerCommand,
    reply_rx: oneshot::Receiver<Result<T, LedgerError>>,
) -> ApiResult<T> {
    state.command_tx.send(cmd).await.map_err(|_| {
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal",
            "ledger task not running",
        )
    })?;

    match reply_rx.await {
        Ok(Ok(resp)) => Ok(Json(resp)),
        Ok(Err(e)) => Err(ledger_error(e)),
        Err(_) => Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal",
            "ledger task dropped the reply channel",
        )),
    }
}

// --- Server ---

pub fn build_router(state: Arc<NodeState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(handle_health))
        .route("/api/v1/status", get(handle_status))
        .route("/api/v1/admins", post(handle_add_admin))
        .route("/api/v1/institutions", post(handle_add_institution))
        .route("/api/v1/institutions/{address}", get(handle_institution_status))
        .route("/api/v1/credentials", post(handle_issue_credential))
        .route("/api/v1/credentials/{id}", get(handle_get_credential))
        .route(
            "/api/v1/credentials/{id}/access",
            get(handle_get_access).put(handle_update_access),
        )
        .route("/api/v1/credentials/{id}/requests", post(handle_request_access))
        .route("/api/v1/credentials/{id}/grants", post(handle_grant_access))
        .route("/api/v1/companies", post(handle_add_company))
        .route("/api/v1/companies/{address}", get(handle_company_stats))
        .route("/api/v1/events", get(handle_events))
        .with_state(state)
}

pub async fn start_api_server(
    listen_addr: SocketAddr,
    state: Arc<NodeState>,
) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(%listen_addr, "HTTP API server started");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use accredit_core::LedgerConfig;
    use accredit_crypto::AccessTree;
    use accredit_ledger::Ledger;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    fn addr(b: u8) -> Address {
        Address::from_bytes([b; 20])
    }

    fn test_router() -> Router {
        let ledger = Ledger::new(LedgerConfig::with_admins([addr(0)]));
        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(crate::node::run_ledger(ledger, None, rx));
        build_router(Arc::new(NodeState::new(tx)))
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        caller: Option<Address>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(caller) = caller {
            builder = builder.header(CALLER_HEADER, caller.to_hex());
        }
        let req = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    /// Admin 0 lists institution 1, which issues credential 0 to identity 2.
    async fn seeded_router() -> Router {
        let app = test_router();
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/institutions",
            Some(addr(0)),
            Some(json!({ "address": addr(1) })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/credentials",
            Some(addr(1)),
            Some(json!({ "owner": addr(2), "pointer": "abcde" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["credential_id"], 0);
        app
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_router();
        let (status, body) = send(&app, "GET", "/api/v1/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_status() {
        let app = seeded_router().await;
        let (status, body) = send(&app, "GET", "/api/v1/status", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ledger"]["admins"], 1);
        assert_eq!(body["ledger"]["credentials"], 1);
    }

    #[tokio::test]
    async fn test_missing_caller_is_bad_request() {
        let app = test_router();
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/admins",
            None,
            Some(json!({ "address": addr(5) })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "InvalidInput");
    }

    #[tokio::test]
    async fn test_non_admin_forbidden() {
        let app = test_router();
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/admins",
            Some(addr(3)),
            Some(json!({ "address": addr(5) })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "Unauthorized");
        assert_eq!(body["error"], "Not Admin!");
    }

    #[tokio::test]
    async fn test_institution_status() {
        let app = seeded_router().await;
        let uri = format!("/api/v1/institutions/{}", addr(1));
        let (status, body) = send(&app, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["verified"], true);
        assert_eq!(body["listed_by"], addr(0).to_hex());

        let uri = format!("/api/v1/institutions/{}", addr(9));
        let (_, body) = send(&app, "GET", &uri, None, None).await;
        assert_eq!(body["verified"], false);

        let (status, _) = send(&app, "GET", "/api/v1/institutions/nope", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_owner_reads_credential() {
        let app = seeded_router().await;
        let (status, body) = send(&app, "GET", "/api/v1/credentials/0", Some(addr(2)), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pointer"], "abcde");
        assert_eq!(body["issuer"], addr(1).to_hex());

        let (status, body) = send(&app, "GET", "/api/v1/credentials/0", Some(addr(3)), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Can't access credential");

        let (status, body) = send(&app, "GET", "/api/v1/credentials/7", Some(addr(2)), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NotFound");
    }

    #[tokio::test]
    async fn test_empty_pointer_rejected() {
        let app = seeded_router().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/credentials",
            Some(addr(1)),
            Some(json!({ "owner": addr(2), "pointer": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "InvalidInput");
    }

    #[tokio::test]
    async fn test_access_flow() {
        let app = seeded_router().await;
        let tree = AccessTree::from_members(&[addr(4)]).unwrap();

        let (status, _) = send(
            &app,
            "PUT",
            "/api/v1/credentials/0/access",
            Some(addr(2)),
            Some(json!({ "access_root": tree.root() })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, "GET", "/api/v1/credentials/0/access", None, None).await;
        assert_eq!(body["access_root"], tree.root().to_hex());

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/credentials/0/requests",
            Some(addr(4)),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["access_root"], tree.root().to_hex());

        let proof = tree.prove(&addr(4)).unwrap();
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/credentials/0/grants",
            Some(addr(2)),
            Some(json!({ "verifier": addr(4), "proof_is_valid": true, "proof": proof })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "granted");

        let unrelated = AccessTree::from_members(&[addr(3), addr(8)]).unwrap();
        let proof = unrelated.prove(&addr(3)).unwrap();
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/credentials/0/grants",
            Some(addr(2)),
            Some(json!({ "verifier": addr(3), "proof_is_valid": true, "proof": proof })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "AccessDenied");
        assert_eq!(body["error"], "Invalid Access Rights");
    }

    #[tokio::test]
    async fn test_company_attestation() {
        let app = seeded_router().await;
        send(
            &app,
            "POST",
            "/api/v1/institutions",
            Some(addr(0)),
            Some(json!({ "address": addr(7) })),
        )
        .await;

        let company = json!({ "address": addr(5) });
        let (status, body) = send(&app, "POST", "/api/v1/companies", Some(addr(1)), Some(company.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score"], 50);
        assert_eq!(body["verified"], false);

        let (status, body) = send(&app, "POST", "/api/v1/companies", Some(addr(1)), Some(company.clone())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "Conflict");

        send(&app, "POST", "/api/v1/companies", Some(addr(7)), Some(company)).await;
        let uri = format!("/api/v1/companies/{}", addr(5));
        let (status, body) = send(&app, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score"], 100);
        assert_eq!(body["verified"], true);
        assert_eq!(body["attestations"], 2);
    }

    #[tokio::test]
    async fn test_events_polling() {
        let app = seeded_router().await;
        let (status, body) = send(&app, "GET", "/api/v1/events", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let events = body["events"].as_array().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["event"]["type"], "InstitutionListed");
        assert_eq!(events[1]["event"]["type"], "CredentialIssued");
        assert_eq!(body["next"], 2);

        let (_, body) = send(&app, "GET", "/api/v1/events?since=1", None, None).await;
        assert_eq!(body["events"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_input() {
        let app = seeded_router().await;
        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/admins")
            .header(CALLER_HEADER, addr(0).to_hex())
            .header("content-type", "application/json")
            .body(Body::from("{\"address\":"))
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.code, "InvalidInput");

        // Well-formed JSON with an address that doesn't parse
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/credentials",
            Some(addr(1)),
            Some(json!({ "owner": "0x1234", "pointer": "abcde" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "InvalidInput");

        let (status, body) = send(
            &app,
            "PUT",
            "/api/v1/credentials/0/access",
            Some(addr(2)),
            Some(json!({ "root": "00" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "InvalidInput");
    }

    #[tokio::test]
    async fn test_bad_path_and_query_are_invalid_input() {
        let app = seeded_router().await;
        let (status, body) = send(&app, "GET", "/api/v1/credentials/abc", Some(addr(2)), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "InvalidInput");

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/credentials/-1/requests",
            Some(addr(4)),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "InvalidInput");

        let (status, body) = send(&app, "GET", "/api/v1/events?since=soon", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "InvalidInput");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&LedgerError::Unauthorized("x".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(&LedgerError::AccessDenied("x".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(&LedgerError::NotFound(CredentialId(1))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&LedgerError::Conflict("x".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&LedgerError::InvalidInput("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&LedgerError::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
