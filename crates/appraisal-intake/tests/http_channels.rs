//! Outbound clients exercised against local HTTP stand-ins for the
//! persistence store, the webhook, the postal-code service and the report
//! model.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use appraisal_intake::workflows::intake::address::{AddressLookup, LookupOutcome, ViaCepClient};
use appraisal_intake::workflows::intake::domain::{
    Applicable, DocumentKind, StateCode, SubmissionRecord,
};
use appraisal_intake::workflows::intake::report::{GeminiClient, ReportError, ReportGenerator};
use appraisal_intake::workflows::intake::submission::{
    ChannelError, EvaluationRow, NotificationChannel, PersistenceChannel, SupabaseStore,
    WebhookNotifier,
};

const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Default)]
struct Captured {
    requests: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
}

impl Captured {
    fn push(&self, headers: HeaderMap, body: Value) {
        self.requests
            .lock()
            .expect("capture mutex poisoned")
            .push((headers, body));
    }

    fn take(&self) -> Vec<(HeaderMap, Value)> {
        std::mem::take(&mut *self.requests.lock().expect("capture mutex poisoned"))
    }
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stand-in serves");
    });
    format!("http://{addr}")
}

fn record() -> SubmissionRecord {
    let mut record = SubmissionRecord::default();
    record.applicant.full_name = "Carlos Lima".to_string();
    record.address.city = "Curitiba".to_string();
    record.address.state = Some(StateCode::Pr);
    record
        .documentation
        .available
        .insert(DocumentKind::OccupancyPermit);
    record.condominium = Applicable::NotApplicable;
    record.photos = vec!["data:image/png;base64,AAAA".to_string()];
    record.document_files = vec!["data:application/pdf;base64,JVBE".to_string()];
    record
}

async fn store_accepting(
    State(captured): State<Captured>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    captured.push(headers, body);
    StatusCode::CREATED
}

async fn store_rejecting() -> Response {
    (
        StatusCode::CONFLICT,
        Json(json!({"code": "23505", "message": "duplicate key value violates unique constraint"})),
    )
        .into_response()
}

#[tokio::test]
async fn supabase_store_posts_row_with_credentials() {
    let captured = Captured::default();
    let base = spawn(
        Router::new()
            .route("/rest/v1/property_evaluations", post(store_accepting))
            .with_state(captured.clone()),
    )
    .await;

    let store = SupabaseStore::new(&base, "anon-key", "property_evaluations", TIMEOUT)
        .expect("client builds");
    let row = EvaluationRow::from_record(&record());
    store.persist(&row).await.expect("row stored");

    let requests = captured.take();
    assert_eq!(requests.len(), 1);
    let (headers, body) = &requests[0];
    assert_eq!(headers["apikey"], "anon-key");
    assert_eq!(headers["authorization"], "Bearer anon-key");
    assert_eq!(headers["prefer"], "return=minimal");
    assert_eq!(body[0]["client_name"], "Carlos Lima");
    assert_eq!(body[0]["address_state"], "PR");
    assert!(body[0].get("document_files").is_none());
}

#[tokio::test]
async fn supabase_rejection_message_is_surfaced() {
    let base = spawn(Router::new().route("/rest/v1/property_evaluations", post(store_rejecting))).await;

    let store = SupabaseStore::new(&base, "anon-key", "property_evaluations", TIMEOUT)
        .expect("client builds");
    let err = store
        .persist(&EvaluationRow::from_record(&record()))
        .await
        .expect_err("store rejects");
    assert_eq!(
        err,
        ChannelError::Rejected("duplicate key value violates unique constraint".to_string())
    );
}

#[tokio::test]
async fn webhook_receives_full_record_and_reports_status() {
    let captured = Captured::default();
    let base = spawn(
        Router::new()
            .route(
                "/webhook/formulario",
                post(
                    |State(captured): State<Captured>, headers: HeaderMap, Json(body): Json<Value>| async move {
                        captured.push(headers, body);
                        StatusCode::OK
                    },
                ),
            )
            .route(
                "/webhook/broken",
                post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
            )
            .with_state(captured.clone()),
    )
    .await;

    let notifier = WebhookNotifier::new(format!("{base}/webhook/formulario"), TIMEOUT)
        .expect("client builds");
    notifier.notify(&record()).await.expect("webhook accepts");

    let requests = captured.take();
    let (headers, body) = &requests[0];
    assert_eq!(headers["content-type"], "application/json");
    assert_eq!(body["address"]["city"], "Curitiba");
    assert_eq!(body["condominium"], "N/A");
    assert_eq!(body["document_files"][0], "data:application/pdf;base64,JVBE");

    let broken = WebhookNotifier::new(format!("{base}/webhook/broken"), TIMEOUT)
        .expect("client builds");
    let err = broken.notify(&record()).await.expect_err("webhook fails");
    assert_eq!(err, ChannelError::Status { status: 500 });
}

#[tokio::test]
async fn unreachable_webhook_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let notifier = WebhookNotifier::new(format!("http://{addr}/hook"), TIMEOUT)
        .expect("client builds");
    let err = notifier.notify(&record()).await.expect_err("nothing listens");
    assert!(matches!(err, ChannelError::Transport(_)));
}

async fn viacep(Path(cep): Path<String>) -> Response {
    match cep.as_str() {
        "01310100" => Json(json!({
            "cep": "01310-100",
            "logradouro": "Avenida Paulista",
            "bairro": "Bela Vista",
            "localidade": "São Paulo",
            "uf": "SP"
        }))
        .into_response(),
        "99999999" => Json(json!({ "erro": true })).into_response(),
        "88888888" => Json(json!({ "erro": "true" })).into_response(),
        _ => StatusCode::BAD_REQUEST.into_response(),
    }
}

#[tokio::test]
async fn viacep_client_maps_found_missing_and_errors() {
    let base = spawn(Router::new().route("/ws/:cep/json/", get(viacep))).await;
    let client = ViaCepClient::new(format!("{base}/ws/"), TIMEOUT).expect("client builds");

    match client.lookup("01310100").await.expect("lookup succeeds") {
        LookupOutcome::Found(address) => {
            assert_eq!(address.street, "Avenida Paulista");
            assert_eq!(address.city, "São Paulo");
            assert_eq!(address.state, Some(StateCode::Sp));
        }
        other => panic!("expected address, got {other:?}"),
    }
    assert_eq!(
        client.lookup("99999999").await.expect("lookup succeeds"),
        LookupOutcome::NotFound
    );
    assert_eq!(
        client.lookup("88888888").await.expect("lookup succeeds"),
        LookupOutcome::NotFound
    );
    assert!(client.lookup("12345678").await.is_err());
}

async fn gemini(
    State(captured): State<Captured>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some("gemini-key") {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error": {"code": 403, "message": "API key not valid"}})),
        )
            .into_response();
    }
    assert_eq!(call, "gemini-2.5-flash:generateContent");
    captured.push(headers, body);
    Json(json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{"text": "---\n### **PARECER TÉCNICO DE AVALIAÇÃO MERCADOLÓGICA (PTAM)**\n**1. SOLICITANTE**\n- Nome: Carlos Lima\n"}]
            }
        }]
    }))
    .into_response()
}

#[tokio::test]
async fn gemini_client_sends_prompt_with_photos_and_splits_sections() {
    let captured = Captured::default();
    let base = spawn(
        Router::new()
            .route("/v1beta/models/:call", post(gemini))
            .with_state(captured.clone()),
    )
    .await;

    let client = GeminiClient::new("gemini-key", "gemini-2.5-flash", TIMEOUT)
        .expect("client builds")
        .with_endpoint(format!("{base}/v1beta"));
    let report = client.generate(&record()).await.expect("report drafted");

    assert_eq!(report.sections.len(), 2);
    assert_eq!(
        report.sections[1].title,
        "PARECER TÉCNICO DE AVALIAÇÃO MERCADOLÓGICA (PTAM)"
    );

    let requests = captured.take();
    let parts = &requests[0].1["contents"][0]["parts"];
    assert!(parts[0]["text"]
        .as_str()
        .expect("prompt")
        .contains("Carlos Lima"));
    assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");

    let denied = GeminiClient::new("wrong", "gemini-2.5-flash", TIMEOUT)
        .expect("client builds")
        .with_endpoint(format!("{base}/v1beta"));
    match denied.generate(&record()).await {
        Err(ReportError::Status { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "API key not valid");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}
