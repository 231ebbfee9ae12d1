//! HTTP adapters against an in-process backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde_json::json;

use booking_core::connector::adapter::wire::{
    BookingDto, CreateBookingRequest, PaymentRequest,
};
use booking_core::{
    ApiClient, ApiConfig, BookingStatus, BookingStore, BusinessDirectory, HttpBookingStore,
    HttpBusinessDirectory, HttpPaymentGateway, PaymentGateway, PaymentMethod, PaymentStatus,
    Service, SessionContext,
};

#[derive(Default)]
struct Backend {
    taken: Mutex<Vec<(String, DateTime<Utc>)>>,
    auth_headers: Mutex<Vec<String>>,
    list_queries: Mutex<Vec<HashMap<String, String>>>,
}

impl Backend {
    fn record_auth(&self, headers: &HeaderMap) {
        let value = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        self.auth_headers.lock().unwrap().push(value);
    }
}

type Shared = State<Arc<Backend>>;

async fn list_businesses(Query(query): Query<HashMap<String, String>>) -> Response {
    match query.get("category").map(String::as_str) {
        Some("barber") => Json(json!([{
            "id": "b1",
            "name": "Sharp Cuts",
            "category": "barber",
            "timezone": "Europe/Berlin",
            "hours": [{"weekday": "mon", "open": "09:00", "close": "19:00"}]
        }]))
        .into_response(),
        _ => Json(json!([])).into_response(),
    }
}

async fn list_services(Path(business_id): Path<String>) -> Response {
    if business_id != "b1" {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "no such business"}))).into_response();
    }
    Json(json!([
        {"id": "s1", "name": "Haircut", "price": 30.0, "durationMinutes": 45},
        {"id": "s2", "name": "Beard trim", "price": 20, "durationMinutes": 30, "workerId": "w2", "currency": "USD"}
    ]))
    .into_response()
}

async fn list_workers(Path(_business_id): Path<String>) -> Response {
    Json(json!([{"id": "w1", "name": "Ana", "serviceIds": ["s1"]}])).into_response()
}

async fn create_booking(
    State(backend): Shared,
    headers: HeaderMap,
    Json(body): Json<CreateBookingRequest>,
) -> Response {
    backend.record_auth(&headers);
    let mut taken = backend.taken.lock().unwrap();
    if taken.contains(&(body.worker_id.clone(), body.start)) {
        return (StatusCode::CONFLICT, Json(json!({"error": "conflict"}))).into_response();
    }
    taken.push((body.worker_id.clone(), body.start));
    (
        StatusCode::CREATED,
        Json(json!({"id": format!("bk-{}", taken.len()), "status": "pending"})),
    )
        .into_response()
}

async fn cancel_booking(Path(booking_id): Path<String>) -> Response {
    let start: DateTime<Utc> = "2026-03-02T09:00:00Z".parse().unwrap();
    Json(json!({
        "id": booking_id,
        "status": "cancelled",
        "serviceId": "s1",
        "workerId": "w1",
        "start": start,
        "end": start + Duration::minutes(45)
    }))
    .into_response()
}

async fn worker_bookings(
    State(backend): Shared,
    Path(worker_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    backend.list_queries.lock().unwrap().push(query);
    let start: DateTime<Utc> = "2026-03-02T10:00:00Z".parse().unwrap();
    Json(json!([{
        "id": "bk-9",
        "serviceId": "s1",
        "workerId": worker_id,
        "customerId": "someone",
        "start": start,
        "end": start + Duration::minutes(45),
        "status": "confirmed",
        "paymentId": "pay-9"
    }]))
    .into_response()
}

async fn capture(Json(body): Json<PaymentRequest>) -> Response {
    match body.booking_id.as_str() {
        "declined" => {
            (StatusCode::PAYMENT_REQUIRED, Json(json!({"error": "card declined"}))).into_response()
        }
        "soft-declined" => Json(json!({"id": "pay-2", "status": "failed", "message": "limit"})).into_response(),
        "broken" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        _ if body.amount != Decimal::new(30, 0) => {
            (StatusCode::BAD_REQUEST, Json(json!({"error": "bad amount"}))).into_response()
        }
        _ => Json(json!({"id": "pay-1", "status": "captured"})).into_response(),
    }
}

async fn spawn_backend() -> (Arc<ApiClient>, Arc<Backend>) {
    let backend = Arc::new(Backend::default());
    let app = axum::Router::new()
        .route("/businesses", get(list_businesses))
        .route("/businesses/{id}/services", get(list_services))
        .route("/businesses/{id}/workers", get(list_workers))
        .route("/bookings", post(create_booking))
        .route("/bookings/{id}/cancel", post(cancel_booking))
        .route("/workers/{id}/bookings", get(worker_bookings))
        .route("/payments", post(capture))
        .with_state(Arc::clone(&backend));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });

    let config = ApiConfig::new(format!("http://{addr}")).with_token("config-token");
    (Arc::new(ApiClient::new(config)), backend)
}

fn haircut() -> Service {
    Service::new("s1", "b1", "Haircut", Decimal::new(30, 0), "EUR", 45).unwrap()
}

#[tokio::test]
async fn test_directory_maps_catalog() {
    let (client, _backend) = spawn_backend().await;
    let directory = HttpBusinessDirectory::new(client);

    let businesses = directory.list_businesses("barber").await.unwrap();
    assert_eq!(businesses.len(), 1);
    assert_eq!(businesses[0].timezone(), chrono_tz::Europe::Berlin);
    assert!(directory.list_businesses("spa").await.unwrap().is_empty());

    let services = directory.get_services("b1").await.unwrap();
    assert_eq!(services[0].price(), Decimal::new(30, 0));
    assert_eq!(services[0].currency(), "EUR");
    assert_eq!(services[1].worker_id(), Some("w2"));
    assert_eq!(services[1].currency(), "USD");

    let workers = directory.get_workers("b1").await.unwrap();
    assert!(workers[0].is_assigned_to("s1"));
    assert_eq!(workers[0].business_id(), "b1");
}

#[tokio::test]
async fn test_unknown_business_is_not_found() {
    let (client, _backend) = spawn_backend().await;
    let directory = HttpBusinessDirectory::new(client);

    let err = directory.get_services("b9").await.unwrap_err();
    assert!(matches!(err, booking_core::DomainError::NotFound(_)));
}

#[tokio::test]
async fn test_create_booking_and_conflict() {
    let (client, backend) = spawn_backend().await;
    let store = HttpBookingStore::new(client);
    let ctx = SessionContext::new("c1").with_token("session-token");
    let start: DateTime<Utc> = "2026-03-02T09:00:00Z".parse().unwrap();

    let booking = store.create_booking(&haircut(), "w1", start, &ctx).await.unwrap();
    assert_eq!(booking.id(), "bk-1");
    assert_eq!(booking.status(), BookingStatus::Pending);
    assert_eq!(booking.end(), start + Duration::minutes(45));
    assert_eq!(booking.customer_id(), "c1");

    let err = store
        .create_booking(&haircut(), "w1", start, &ctx)
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    let auth = backend.auth_headers.lock().unwrap().clone();
    assert_eq!(auth, vec!["Bearer session-token", "Bearer session-token"]);
}

#[tokio::test]
async fn test_config_token_used_without_session_token() {
    let (client, backend) = spawn_backend().await;
    let store = HttpBookingStore::new(client);
    let start: DateTime<Utc> = "2026-03-02T11:00:00Z".parse().unwrap();

    store
        .create_booking(&haircut(), "w1", start, &SessionContext::new("c1"))
        .await
        .unwrap();

    let auth = backend.auth_headers.lock().unwrap().clone();
    assert_eq!(auth, vec!["Bearer config-token"]);
}

#[tokio::test]
async fn test_list_and_cancel_bookings() {
    let (client, backend) = spawn_backend().await;
    let store = HttpBookingStore::new(client);
    let ctx = SessionContext::new("c1");
    let from: DateTime<Utc> = "2026-03-01T23:00:00Z".parse().unwrap();
    let to = from + Duration::days(1);

    let bookings = store.list_bookings("w1", from, to, &ctx).await.unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].status(), BookingStatus::Confirmed);
    assert_eq!(bookings[0].payment_id(), Some("pay-9"));

    let query = backend.list_queries.lock().unwrap()[0].clone();
    assert_eq!(query.get("from").map(String::as_str), Some("2026-03-01T23:00:00Z"));
    assert_eq!(query.get("to").map(String::as_str), Some("2026-03-02T23:00:00Z"));

    let cancelled = store.cancel_booking("bk-1", &ctx).await.unwrap();
    assert_eq!(cancelled.status(), BookingStatus::Cancelled);
    assert!(!cancelled.reserves_slot());
}

#[tokio::test]
async fn test_payment_outcomes() {
    let (client, _backend) = spawn_backend().await;
    let gateway = HttpPaymentGateway::new(client);
    let ctx = SessionContext::new("c1");
    let price = Decimal::new(30, 0);

    let captured = gateway
        .capture("bk-1", price, PaymentMethod::Online, &ctx)
        .await
        .unwrap();
    assert_eq!(captured.status, PaymentStatus::Captured);
    assert_eq!(captured.payment_id, "pay-1");

    let soft = gateway
        .capture("soft-declined", price, PaymentMethod::Online, &ctx)
        .await
        .unwrap();
    assert_eq!(soft.status, PaymentStatus::Failed);
    assert_eq!(soft.message.as_deref(), Some("limit"));

    let declined = gateway
        .capture("declined", price, PaymentMethod::Online, &ctx)
        .await
        .unwrap_err();
    assert_eq!(declined, booking_core::DomainError::payment("card declined"));

    let broken = gateway
        .capture("broken", price, PaymentMethod::Deposit, &ctx)
        .await
        .unwrap_err();
    assert!(broken.is_network());
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = Arc::new(ApiClient::new(ApiConfig::new(format!("http://{addr}"))));
    let directory = HttpBusinessDirectory::new(client);

    assert!(directory.list_businesses("barber").await.unwrap_err().is_network());
}

#[test]
fn test_booking_dto_round_trips_status() {
    let dto: BookingDto = serde_json::from_str(
        r#"{"id":"bk","status":"canceled","serviceId":"s1","workerId":"w1",
            "start":"2026-03-02T09:00:00Z","end":"2026-03-02T09:45:00Z"}"#,
    )
    .unwrap();

    let booking = dto.into_domain().unwrap();
    assert_eq!(booking.status(), BookingStatus::Cancelled);
    assert_eq!(booking.customer_id(), "");
}
