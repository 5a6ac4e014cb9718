use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::address::AddressLookup;
use super::domain::{
    DocumentKind, DocumentStatus, Objective, Occupancy, PropertyType, RequesterRole, StateCode,
};
use super::encoder::{AttachmentTarget, FileInput};
use super::session::IntakeSession;
use super::submission::{NotificationChannel, PersistenceChannel};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct FieldEdit {
    pub field: String,
    #[serde(default)]
    pub value: Value,
}

/// A file uploaded by the client. `data` carries the base64 file content.
#[derive(Debug, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    #[serde(default)]
    pub media_type: Option<String>,
    pub data: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttachRequest {
    pub files: Vec<UploadedFile>,
}

/// Router exposing one intake session over HTTP.
pub fn intake_router<P, N, L>(session: Arc<IntakeSession<P, N, L>>) -> Router
where
    P: PersistenceChannel + 'static,
    N: NotificationChannel + 'static,
    L: AddressLookup + 'static,
{
    Router::new()
        .route("/api/v1/intake/options", get(options_handler))
        .route(
            "/api/v1/intake/form",
            get(form_handler::<P, N, L>).patch(edit_handler::<P, N, L>),
        )
        .route("/api/v1/intake/form/reset", post(reset_handler::<P, N, L>))
        .route(
            "/api/v1/intake/form/photos",
            post(attach_photos_handler::<P, N, L>),
        )
        .route(
            "/api/v1/intake/form/photos/:index",
            delete(remove_photo_handler::<P, N, L>),
        )
        .route(
            "/api/v1/intake/form/documents",
            post(attach_documents_handler::<P, N, L>),
        )
        .route(
            "/api/v1/intake/form/documents/:index",
            delete(remove_document_handler::<P, N, L>),
        )
        .route("/api/v1/intake/submit", post(submit_handler::<P, N, L>))
        .route("/api/v1/intake/report", post(report_handler::<P, N, L>))
        .with_state(session)
}

pub(crate) async fn form_handler<P, N, L>(
    State(session): State<Arc<IntakeSession<P, N, L>>>,
) -> Response
where
    P: PersistenceChannel + 'static,
    N: NotificationChannel + 'static,
    L: AddressLookup + 'static,
{
    let record = session.snapshot().await;
    (StatusCode::OK, axum::Json(&*record)).into_response()
}

pub(crate) async fn edit_handler<P, N, L>(
    State(session): State<Arc<IntakeSession<P, N, L>>>,
    axum::Json(edit): axum::Json<FieldEdit>,
) -> Result<Response, AppError>
where
    P: PersistenceChannel + 'static,
    N: NotificationChannel + 'static,
    L: AddressLookup + 'static,
{
    let change = session.apply_field(&edit.field, edit.value).await?;
    let record = session.snapshot().await;
    let payload = json!({
        "change": change,
        "form": &*record,
    });
    Ok((StatusCode::OK, axum::Json(payload)).into_response())
}

pub(crate) async fn reset_handler<P, N, L>(
    State(session): State<Arc<IntakeSession<P, N, L>>>,
) -> Response
where
    P: PersistenceChannel + 'static,
    N: NotificationChannel + 'static,
    L: AddressLookup + 'static,
{
    session.reset().await;
    let record = session.snapshot().await;
    (StatusCode::OK, axum::Json(&*record)).into_response()
}

async fn attach<P, N, L>(
    session: &IntakeSession<P, N, L>,
    target: AttachmentTarget,
    request: AttachRequest,
) -> Result<Response, AppError>
where
    P: PersistenceChannel + 'static,
    N: NotificationChannel + 'static,
    L: AddressLookup + 'static,
{
    let inputs = request
        .files
        .into_iter()
        .map(|file| FileInput::from_base64(file.name, file.media_type, &file.data))
        .collect::<Result<Vec<_>, _>>()?;
    let added = session.attach(target, inputs).await?;
    let record = session.snapshot().await;
    let payload = json!({
        "added": added,
        "form": &*record,
    });
    Ok((StatusCode::OK, axum::Json(payload)).into_response())
}

async fn remove<P, N, L>(
    session: &IntakeSession<P, N, L>,
    target: AttachmentTarget,
    index: usize,
) -> Result<Response, AppError>
where
    P: PersistenceChannel + 'static,
    N: NotificationChannel + 'static,
    L: AddressLookup + 'static,
{
    if !session.remove(target, index).await {
        return Err(AppError::AttachmentNotFound { index });
    }
    let record = session.snapshot().await;
    Ok((StatusCode::OK, axum::Json(&*record)).into_response())
}

pub(crate) async fn attach_photos_handler<P, N, L>(
    State(session): State<Arc<IntakeSession<P, N, L>>>,
    axum::Json(request): axum::Json<AttachRequest>,
) -> Result<Response, AppError>
where
    P: PersistenceChannel + 'static,
    N: NotificationChannel + 'static,
    L: AddressLookup + 'static,
{
    attach(&session, AttachmentTarget::Photos, request).await
}

pub(crate) async fn attach_documents_handler<P, N, L>(
    State(session): State<Arc<IntakeSession<P, N, L>>>,
    axum::Json(request): axum::Json<AttachRequest>,
) -> Result<Response, AppError>
where
    P: PersistenceChannel + 'static,
    N: NotificationChannel + 'static,
    L: AddressLookup + 'static,
{
    attach(&session, AttachmentTarget::Documents, request).await
}

pub(crate) async fn remove_photo_handler<P, N, L>(
    State(session): State<Arc<IntakeSession<P, N, L>>>,
    Path(index): Path<usize>,
) -> Result<Response, AppError>
where
    P: PersistenceChannel + 'static,
    N: NotificationChannel + 'static,
    L: AddressLookup + 'static,
{
    remove(&session, AttachmentTarget::Photos, index).await
}

pub(crate) async fn remove_document_handler<P, N, L>(
    State(session): State<Arc<IntakeSession<P, N, L>>>,
    Path(index): Path<usize>,
) -> Result<Response, AppError>
where
    P: PersistenceChannel + 'static,
    N: NotificationChannel + 'static,
    L: AddressLookup + 'static,
{
    remove(&session, AttachmentTarget::Documents, index).await
}

pub(crate) async fn submit_handler<P, N, L>(
    State(session): State<Arc<IntakeSession<P, N, L>>>,
) -> Result<Response, AppError>
where
    P: PersistenceChannel + 'static,
    N: NotificationChannel + 'static,
    L: AddressLookup + 'static,
{
    let receipt = session.submit().await?;
    Ok((StatusCode::OK, axum::Json(receipt)).into_response())
}

pub(crate) async fn report_handler<P, N, L>(
    State(session): State<Arc<IntakeSession<P, N, L>>>,
) -> Result<Response, AppError>
where
    P: PersistenceChannel + 'static,
    N: NotificationChannel + 'static,
    L: AddressLookup + 'static,
{
    let report = session.generate_report().await?;
    Ok((StatusCode::OK, axum::Json(report)).into_response())
}

fn catalog<T: serde::Serialize + Copy>(
    items: &[T],
    label: impl Fn(T) -> &'static str,
) -> Vec<Value> {
    items
        .iter()
        .map(|item| json!({ "value": item, "label": label(*item) }))
        .collect()
}

pub(crate) async fn options_handler() -> Response {
    let payload = json!({
        "requester_roles": catalog(&RequesterRole::ALL, RequesterRole::label),
        "property_types": catalog(&PropertyType::ALL, PropertyType::label),
        "objectives": catalog(&Objective::ALL, Objective::label),
        "occupancy": catalog(&Occupancy::ALL, Occupancy::label),
        "documents": catalog(&DocumentKind::ALL, DocumentKind::label),
        "document_status": catalog(&DocumentStatus::ALL, DocumentStatus::label),
        "states": catalog(&StateCode::ALL, StateCode::name),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}
