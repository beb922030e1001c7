use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use burnboard_core::{AdminAllowList, YearMonth};
use burnboard_revolut::{RevolutClient, RevolutConfig};
use burnboard_server::auth::EMAIL_HEADER;
use burnboard_server::{create_router, AppState, LiveData};
use chrono::Local;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const ADMIN: &str = "admin@example.com";
const PRIVATE_PEM: &str = include_str!("../../revolut/testdata/private.pem");

async fn state_with(live: LiveData) -> AppState {
    AppState {
        db: burnboard_storage::create_db("sqlite::memory:").await.unwrap(),
        live,
        admins: Arc::new(AdminAllowList::parse(ADMIN)),
        initial_cash_cents: 100_000,
    }
}

async fn offline_state() -> AppState {
    state_with(LiveData::Disabled("REVOLUT_CLIENT_ID is required".into())).await
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get_req(uri: &str, email: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(email) = email {
        builder = builder.header(EMAIL_HEADER, email);
    }
    builder.body(Body::empty()).unwrap()
}

fn form_req(uri: &str, email: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(email) = email {
        builder = builder.header(EMAIL_HEADER, email);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn current_month() -> YearMonth {
    YearMonth::from_date(Local::now().date_naive())
}

#[tokio::test]
async fn health_check() {
    let app = create_router(offline_state().await);
    let (status, body) = send(&app, get_req("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = create_router(offline_state().await);
    let resp = app.oneshot(get_req("/health", None)).await.unwrap();
    assert!(resp.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn empty_dashboard_has_projection_but_no_runway() {
    let app = create_router(offline_state().await);
    let (status, body) = send(&app, get_req("/api/burn", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currency"], "USD");
    assert!(body["past_month"].is_null());
    assert!(body["past_month_revenue"].is_null());
    assert!(body["live_spend"].is_null());
    assert!(body["live_revenue"].is_null());
    assert_eq!(body["projected"].as_array().unwrap().len(), 6);
    assert_eq!(body["projected"][0]["year_month"], current_month().add_months(1).to_string());
    assert_eq!(body["initial_cash_formatted"], "$1,000");
    assert_eq!(body["running_remaining"][5]["remaining_cents"], 100_000);
    assert!(body["runway_months"].is_null());
    assert!(body["previous_months"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn writes_require_an_admin() {
    let app = create_router(offline_state().await);
    let form = "yearMonth=2025-01&amount=10";

    let (status, body) = send(&app, form_req("/api/burn", None, form)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Sign-in required");

    let (status, _) = send(&app, form_req("/api/burn", Some("eve@example.com"), form)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, form_req("/api/revenue", Some("eve@example.com"), form)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, form_req("/api/burn", Some(" Admin@Example.com "), form)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn validation_errors_are_structured() {
    let app = create_router(offline_state().await);

    let cases = [
        ("amount=10", "Year/month and amount are required."),
        ("yearMonth=2025-13&amount=10", "Year/month must be YYYY-MM."),
        ("yearMonth=2025-01&amount=-5", "Amount must be a non-negative number."),
        ("yearMonth=2025-01&amount=ten", "Amount must be a non-negative number."),
    ];
    for (form, message) in cases {
        let (status, body) = send(&app, form_req("/api/burn", Some(ADMIN), form)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{form}");
        assert_eq!(body, json!({ "ok": false, "error": message }), "{form}");
    }
}

#[tokio::test]
async fn dashboard_projects_from_recorded_history() {
    let app = create_router(offline_state().await);
    let past = current_month().previous();

    for (offset, amount) in [(2, "10"), (1, "20")] {
        let form = format!("yearMonth={}&amount={amount}", past.add_months(-offset));
        let (status, _) = send(&app, form_req("/api/burn", Some(ADMIN), &form)).await;
        assert_eq!(status, StatusCode::OK);
    }
    let form = format!("yearMonth={past}&amount=30&breakdown=%7Bnot+json");
    send(&app, form_req("/api/burn", Some(ADMIN), &form)).await;
    let form = format!("yearMonth={past}&amount=1234.5&notes=wire");
    send(&app, form_req("/api/revenue", Some(ADMIN), &form)).await;

    let (status, body) = send(&app, get_req("/api/burn", None)).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["past_month"]["year_month"], past.to_string());
    assert_eq!(body["past_month"]["amount_cents"], 3000);
    assert_eq!(body["past_month"]["formatted"], "$30");
    assert_eq!(body["past_month"]["breakdown"]["status"], "invalid");
    assert_eq!(body["past_month"]["breakdown"]["notice"], "Invalid breakdown JSON.");
    assert_eq!(body["past_month_revenue"]["amount_cents"], 123450);
    assert_eq!(body["past_month_revenue"]["formatted"], "$1,235");

    assert_eq!(body["average_burn_cents"], 2000);
    for (k, month) in body["projected"].as_array().unwrap().iter().enumerate() {
        assert_eq!(month["amount_cents"], 2000);
        assert_eq!(
            body["running_remaining"][k]["remaining_cents"],
            100_000 - (k as i64 + 1) * 2000
        );
    }
    assert_eq!(body["runway_months"], 44);

    let previous = body["previous_months"].as_array().unwrap();
    assert_eq!(previous.len(), 3);
    assert_eq!(previous[0]["year_month"], past.to_string());
    assert_eq!(previous[0]["has_breakdown"], true);
    assert_eq!(previous[1]["has_breakdown"], false);
}

#[tokio::test]
async fn resubmitting_a_month_overwrites_it() {
    let app = create_router(offline_state().await);
    let past = current_month().previous();

    send(&app, form_req("/api/burn", Some(ADMIN), &format!("yearMonth={past}&amount=10"))).await;
    send(&app, form_req("/api/burn", Some(ADMIN), &format!("yearMonth={past}&amount=25.5"))).await;

    let (_, body) = send(&app, get_req("/api/burn", None)).await;
    assert_eq!(body["past_month"]["amount_cents"], 2550);
    assert_eq!(body["previous_months"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn debug_endpoint_reports_disabled_integration() {
    let app = create_router(offline_state().await);

    let (status, _) = send(&app, get_req("/api/revolut/debug", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, get_req("/api/revolut/debug", Some(ADMIN))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "REVOLUT_CLIENT_ID is required");
    assert!(body["_meta"]["fetchedAt"].is_string());
}

async fn spawn_bank() -> String {
    let bank = Router::new()
        .route(
            "/accounts",
            get(|| async { Json(json!([{ "id": "acc-1", "name": "Main", "state": "active" }])) }),
        )
        .route(
            "/accounts/{id}/transactions",
            get(|| async {
                Json(json!([
                    { "legs": [{ "amount": -45.5 }] },
                    { "amount": 2500 },
                    { "amount": -2000 }
                ]))
            }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, bank).await.unwrap();
    });
    format!("http://{addr}")
}

async fn spawn_failing_bank() -> String {
    let bank = Router::new().route(
        "/accounts",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "bank offline") }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, bank).await.unwrap();
    });
    format!("http://{addr}")
}

async fn state_for_bank(api_base: String) -> AppState {
    let client = RevolutClient::new(&RevolutConfig {
        client_id: "client-abc".into(),
        issuer: "burn.example.com".into(),
        private_key: PRIVATE_PEM.into(),
        api_base,
    })
    .unwrap();
    state_with(LiveData::Connected(Arc::new(client))).await
}

async fn connected_state() -> AppState {
    state_for_bank(spawn_bank().await).await
}

#[tokio::test]
async fn dashboard_includes_live_totals() {
    let app = create_router(connected_state().await);
    let (status, body) = send(&app, get_req("/api/burn", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["live_spend"]["total_cents"], 4550 + 2000);
    assert_eq!(body["live_spend"]["formatted"], "$66");
    assert_eq!(body["live_revenue"]["total_cents"], 2500);
    assert_eq!(body["live_revenue"]["currency"], "USD");
}

#[tokio::test]
async fn debug_endpoint_returns_raw_upstream_json() {
    let app = create_router(connected_state().await);
    let (status, body) = send(
        &app,
        get_req("/api/revolut/debug?from=2025-01-01&to=2025-01-31", Some(ADMIN)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_meta"]["dateRange"], json!({ "from": "2025-01-01", "to": "2025-01-31" }));
    assert_eq!(body["_meta"]["transactionsEndpoint"], "/accounts/acc-1/transactions");
    assert_eq!(body["accounts"]["status"], 200);
    assert_eq!(body["accounts"]["data"][0]["id"], "acc-1");
    assert_eq!(body["transactions"]["status"], 200);
    assert_eq!(body["transactions"]["data"][1]["amount"], 2500);
}

#[tokio::test]
async fn debug_endpoint_passes_free_form_dates_through() {
    let app = create_router(connected_state().await);
    let (status, body) = send(
        &app,
        get_req("/api/revolut/debug?from=last%20week&to=2025-02-30", Some(ADMIN)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_meta"]["dateRange"], json!({ "from": "last week", "to": "2025-02-30" }));
    assert_eq!(body["transactions"]["status"], 200);
}

#[tokio::test]
async fn failing_bank_leaves_dashboard_without_live_figures() {
    let app = create_router(state_for_bank(spawn_failing_bank().await).await);
    let past = current_month().previous();
    send(&app, form_req("/api/burn", Some(ADMIN), &format!("yearMonth={past}&amount=10"))).await;

    let (status, body) = send(&app, get_req("/api/burn", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["live_spend"].is_null());
    assert!(body["live_revenue"].is_null());
    assert_eq!(body["past_month"]["amount_cents"], 1000);
}

#[tokio::test]
async fn failing_bank_is_reported_by_debug_endpoint() {
    let app = create_router(state_for_bank(spawn_failing_bank().await).await);
    let (status, body) = send(&app, get_req("/api/revolut/debug", Some(ADMIN))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("Revolut API 500"), "{error}");
    assert!(body["_meta"]["fetchedAt"].is_string());
}
