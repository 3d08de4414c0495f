//! In-process stub of the contact backend for async tests.
//!
//! Binds an Axum router to `127.0.0.1:0` and records the method, path and
//! `Authorization` header of every request it receives, so tests can assert
//! what the HTTP pipeline actually put on the wire.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use serde_json::{Value, json};

use crate::net::types::{Contact, User};

pub const PASSWORD: &str = "correct-horse";
pub const ADA_TOKEN: &str = "token-ada";
pub const TAKEN_EMAIL: &str = "taken@example.com";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

#[must_use]
pub fn ada() -> User {
    User { id: 1, name: "Ada".into(), email: "ada@example.com".into(), phone_number: "+15550100".into() }
}

#[derive(Default)]
struct Contacts {
    rows: Vec<Contact>,
    next_id: i64,
}

#[derive(Clone)]
struct StubState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    contacts: Arc<Mutex<Contacts>>,
}

pub struct StubBackend {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubBackend {
    pub async fn spawn() -> Self {
        let state = StubState {
            requests: Arc::new(Mutex::new(Vec::new())),
            contacts: Arc::new(Mutex::new(Contacts { rows: Vec::new(), next_id: 1 })),
        };
        let requests = state.requests.clone();

        let app = Router::new()
            .route("/user/login", post(login))
            .route("/user/signup", post(signup))
            .route("/user/change-password", post(change_password))
            .route("/contacts", get(list_contacts).post(create_contact))
            .route("/contacts/search", get(search_contacts))
            .route("/contacts/{id}", put(update_contact).delete(delete_contact))
            .route("/garbage", get(garbage))
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub backend");
        let addr = listener.local_addr().expect("stub backend addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub backend failed");
        });

        Self { base_url: format!("http://{addr}"), requests }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

/// Base URL of a port nothing is listening on.
pub async fn dead_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

// =============================================================================
// MIDDLEWARE
// =============================================================================

async fn record(State(state): State<StubState>, request: Request, next: Next) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);
    state.requests.lock().unwrap().push(RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        authorization,
    });
    next.run(request).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(json!({ "status": status.as_u16(), "message": message, "timeStamp": 0 }))).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer token-"))
}

// =============================================================================
// USER ENDPOINTS
// =============================================================================

async fn login(axum::Json(body): axum::Json<Value>) -> Response {
    let who = body.get("emailOrPhone").and_then(Value::as_str).unwrap_or_default();
    let password = body.get("password").and_then(Value::as_str).unwrap_or_default();
    let user = ada();
    if (who == user.email || who == user.phone_number) && password == PASSWORD {
        return axum::Json(json!({ "token": ADA_TOKEN, "user": user })).into_response();
    }
    error(StatusCode::UNAUTHORIZED, "Invalid email/phone or password")
}

async fn signup(axum::Json(body): axum::Json<Value>) -> Response {
    let field = |name: &str| body.get(name).and_then(Value::as_str).unwrap_or_default().to_string();
    let email = field("email");
    if email == TAKEN_EMAIL {
        return error(StatusCode::BAD_REQUEST, "Email already in use");
    }
    let name = field("name");
    let user = User { id: 2, name: name.clone(), email, phone_number: field("phoneNumber") };
    // A blank name gets a blank token, mimicking a backend that issued no credential.
    let token = if name.is_empty() { String::new() } else { format!("token-{}", name.to_lowercase()) };
    axum::Json(json!({ "token": token, "user": user })).into_response()
}

async fn change_password(headers: HeaderMap, axum::Json(body): axum::Json<Value>) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    if body.get("currentPassword").and_then(Value::as_str) != Some(PASSWORD) {
        return error(StatusCode::BAD_REQUEST, "Current password is incorrect");
    }
    axum::Json(json!(ada())).into_response()
}

// =============================================================================
// CONTACT ENDPOINTS
// =============================================================================

fn contact_from_body(id: i64, body: &Value) -> Contact {
    let text = |name: &str| body.get(name).and_then(Value::as_str).map(ToOwned::to_owned);
    Contact {
        id,
        user_id: 1,
        first_name: text("firstName").unwrap_or_default(),
        last_name: text("lastName"),
        email: text("email").unwrap_or_default(),
        phone_number: text("phoneNumber"),
    }
}

async fn list_contacts(State(state): State<StubState>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let rows = state.contacts.lock().unwrap().rows.clone();
    axum::Json(rows).into_response()
}

#[derive(serde::Deserialize)]
struct SearchParams {
    query: String,
}

async fn search_contacts(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let needle = params.query.to_lowercase();
    let rows: Vec<Contact> = state
        .contacts
        .lock()
        .unwrap()
        .rows
        .iter()
        .filter(|c| c.first_name.to_lowercase().contains(&needle) || c.email.to_lowercase().contains(&needle))
        .cloned()
        .collect();
    axum::Json(rows).into_response()
}

async fn create_contact(
    State(state): State<StubState>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let mut contacts = state.contacts.lock().unwrap();
    let contact = contact_from_body(contacts.next_id, &body);
    contacts.next_id += 1;
    contacts.rows.push(contact.clone());
    (StatusCode::CREATED, axum::Json(contact)).into_response()
}

async fn update_contact(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let mut contacts = state.contacts.lock().unwrap();
    let Some(row) = contacts.rows.iter_mut().find(|c| c.id == id) else {
        return error(StatusCode::NOT_FOUND, "Contact not found");
    };
    *row = contact_from_body(id, &body);
    axum::Json(row.clone()).into_response()
}

async fn delete_contact(State(state): State<StubState>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let mut contacts = state.contacts.lock().unwrap();
    let before = contacts.rows.len();
    contacts.rows.retain(|c| c.id != id);
    if contacts.rows.len() == before {
        return error(StatusCode::NOT_FOUND, "Contact not found");
    }
    StatusCode::OK.into_response()
}

async fn garbage() -> Response {
    (StatusCode::OK, "definitely not json").into_response()
}
