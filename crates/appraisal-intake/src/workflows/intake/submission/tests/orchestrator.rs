use super::common::*;
use crate::workflows::intake::domain::SubmissionRecord;
use crate::workflows::intake::fields::FieldUpdate;
use crate::workflows::intake::submission::{
    Channel, ChannelError, RequiredField, SubmissionError, SubmissionOrchestrator,
    SUCCESS_MESSAGE,
};
use std::collections::BTreeSet;
use std::sync::Arc;

fn orchestrator(
    store: &Arc<MemoryStore>,
    hook: &Arc<MemoryHook>,
) -> SubmissionOrchestrator<MemoryStore, MemoryHook> {
    SubmissionOrchestrator::new(store.clone(), hook.clone())
}

#[tokio::test]
async fn empty_documents_are_rejected_before_any_channel_runs() {
    let store = Arc::new(MemoryStore::new(Behavior::Succeed));
    let hook = Arc::new(MemoryHook::new(Behavior::Succeed));
    let mut form = filled_form();
    form.update(FieldUpdate::Documents(BTreeSet::new()));

    match orchestrator(&store, &hook).submit(&mut form).await {
        Err(SubmissionError::Validation(err)) => {
            assert_eq!(err.field, RequiredField::Documents);
            assert_eq!(err.field.focus_target(), "matricula");
            assert!(err.message.contains("Documentos Disponíveis"));
        }
        other => panic!("expected documents validation error, got {other:?}"),
    }
    assert!(store.rows().is_empty());
    assert!(hook.payloads().is_empty());
}

#[tokio::test]
async fn empty_photos_are_rejected_before_any_channel_runs() {
    let store = Arc::new(MemoryStore::new(Behavior::Succeed));
    let hook = Arc::new(MemoryHook::new(Behavior::Succeed));
    let mut form = filled_form();
    form.update(FieldUpdate::Photos(Vec::new()));

    match orchestrator(&store, &hook).submit(&mut form).await {
        Err(SubmissionError::Validation(err)) => {
            assert_eq!(err.field, RequiredField::Photos);
            assert_eq!(err.field.focus_target(), "photo-dropzone-photos");
        }
        other => panic!("expected photos validation error, got {other:?}"),
    }
    assert!(store.rows().is_empty());
    assert!(hook.payloads().is_empty());
}

#[tokio::test]
async fn persistence_failure_fails_submission_and_keeps_form() {
    let store = Arc::new(MemoryStore::new(Behavior::Fail(ChannelError::Rejected(
        "duplicate key value".to_string(),
    ))));
    let hook = Arc::new(MemoryHook::new(Behavior::Succeed));
    let mut form = filled_form();
    let before = form.snapshot();

    let err = orchestrator(&store, &hook)
        .submit(&mut form)
        .await
        .expect_err("persistence failure fails the submission");

    assert_eq!(err.failed_channels(), vec![Channel::Persistence]);
    assert!(err.user_message().contains("duplicate key value"));
    assert_eq!(*form.snapshot(), *before);
    assert_eq!(hook.payloads().len(), 1, "notification still ran");
}

#[tokio::test]
async fn notification_status_failure_is_reported_with_status() {
    let store = Arc::new(MemoryStore::new(Behavior::Succeed));
    let hook = Arc::new(MemoryHook::new(Behavior::Fail(ChannelError::Status {
        status: 502,
    })));
    let mut form = filled_form();

    let err = orchestrator(&store, &hook)
        .submit(&mut form)
        .await
        .expect_err("hook failure fails the submission");

    assert_eq!(err.failed_channels(), vec![Channel::Notification]);
    assert_eq!(
        err.user_message(),
        "Ocorreu um erro ao enviar os dados: Falha ao enviar para o webhook: Status 502"
    );
    assert_eq!(*form.snapshot(), complete_record());
    assert_eq!(store.rows().len(), 1, "persistence still ran");
}

#[tokio::test]
async fn both_failures_are_reported_together() {
    let store = Arc::new(MemoryStore::new(Behavior::Fail(ChannelError::Transport(
        "connection reset".to_string(),
    ))));
    let hook = Arc::new(MemoryHook::new(Behavior::Fail(ChannelError::Status {
        status: 404,
    })));
    let mut form = filled_form();

    let err = orchestrator(&store, &hook)
        .submit(&mut form)
        .await
        .expect_err("both channels failed");

    assert_eq!(
        err.failed_channels(),
        vec![Channel::Persistence, Channel::Notification]
    );
    let message = err.user_message();
    assert!(message.contains("connection reset"));
    assert!(message.contains("Status 404"));
}

#[tokio::test]
async fn panicking_channel_is_reported_as_unknown_error() {
    let store = Arc::new(MemoryStore::new(Behavior::Panic));
    let hook = Arc::new(MemoryHook::new(Behavior::Succeed));
    let mut form = filled_form();

    let err = orchestrator(&store, &hook)
        .submit(&mut form)
        .await
        .expect_err("panic becomes a failure");

    match &err {
        SubmissionError::Channels(failures) => {
            assert!(matches!(failures[0].error, ChannelError::Unexpected(_)));
        }
        other => panic!("expected channel failure, got {other:?}"),
    }
    assert!(err.user_message().contains("Erro desconhecido"));
    assert_eq!(*form.snapshot(), complete_record());
}

#[tokio::test]
async fn success_resets_form_and_sends_both_payload_shapes() {
    let store = Arc::new(MemoryStore::new(Behavior::Succeed));
    let hook = Arc::new(MemoryHook::new(Behavior::Succeed));
    let mut form = filled_form();

    let receipt = orchestrator(&store, &hook)
        .submit(&mut form)
        .await
        .expect("both channels succeed");

    assert_eq!(receipt.message, SUCCESS_MESSAGE);
    assert_eq!(receipt.photo_count, 2);
    assert_eq!(receipt.document_count, 1);
    assert_eq!(*form.snapshot(), SubmissionRecord::default());

    let rows = store.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].address_city, "Belo Horizonte");

    let payloads = hook.payloads();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0]["address"]["city"], "Belo Horizonte");
    assert_eq!(payloads[0]["document_files"].as_array().map(Vec::len), Some(1));
    assert_eq!(payloads[0]["condominium"], "N/A");
}
