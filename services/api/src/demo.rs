use crate::infra::{InMemoryEvaluationStore, InMemoryWebhook, StaticAddressLookup};
use appraisal_intake::error::AppError;
use appraisal_intake::workflows::intake::address::AddressAutofill;
use appraisal_intake::workflows::intake::encoder::{encode_bytes, AttachmentTarget, FileInput};
use appraisal_intake::workflows::intake::session::IntakeSession;
use appraisal_intake::workflows::intake::submission::SubmissionOrchestrator;
use clap::Args;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

/// PNG signature bytes standing in for photos when no `--photo` is given.
const SAMPLE_PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Postal code used to autofill the sample address.
    #[arg(long, default_value = "01310-100")]
    pub(crate) postal_code: String,
    /// Photo files to attach (repeatable). Defaults to two placeholders.
    #[arg(long)]
    pub(crate) photo: Vec<PathBuf>,
    /// Document files to attach (repeatable).
    #[arg(long)]
    pub(crate) document: Vec<PathBuf>,
    /// Make the webhook answer 500 to show a failed submission.
    #[arg(long)]
    pub(crate) fail_webhook: bool,
}

fn sample_edits() -> Vec<(&'static str, Value)> {
    vec![
        ("client_name", json!("Maria Aparecida Souza")),
        ("whatsapp", json!("11987654321")),
        ("requester_role", json!("corretor_cnai")),
        ("address.number", json!("1578")),
        ("property_type", json!("comercial")),
        ("land_area_m2", json!("N/A")),
        ("built_area_m2", json!(320.5)),
        ("construction_age_years", json!(12)),
        (
            "condition_description",
            json!("Bom estado geral, fachada reformada em 2022."),
        ),
        ("documents", json!(["Matrícula do Imóvel", "Carnê de IPTU"])),
        ("document_status", json!("regular")),
        ("objective", json!("venda")),
        ("occupancy", json!("ocupado")),
        ("condominium", json!("Edifício Conjunto Nacional")),
    ]
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        postal_code,
        photo,
        document,
        fail_webhook,
    } = args;

    let store = Arc::new(InMemoryEvaluationStore::default());
    let webhook = Arc::new(if fail_webhook {
        InMemoryWebhook::failing(500)
    } else {
        InMemoryWebhook::default()
    });
    let session = IntakeSession::new(
        SubmissionOrchestrator::new(store.clone(), webhook.clone()),
        AddressAutofill::new(Arc::new(StaticAddressLookup::sample())),
    );

    println!("Appraisal intake demo");
    let change = session.apply_field("address.zip", json!(postal_code)).await?;
    let record = session.snapshot().await;
    println!(
        "- CEP {} -> {}, {} / {}",
        record.address.postal_code,
        record.address.street,
        record.address.city,
        record
            .address
            .state
            .map(|state| state.code())
            .unwrap_or("--")
    );
    if let Some(warning) = change.warning {
        println!("  Warning: {}", warning);
    }

    for (field, value) in sample_edits() {
        session.apply_field(field, value).await?;
    }
    let record = session.snapshot().await;
    println!(
        "- Requester {} ({}) | {}",
        record.applicant.full_name,
        record.applicant.role.label(),
        record.applicant.phone
    );

    let photos = if photo.is_empty() {
        vec![
            FileInput::memory("fachada.png", SAMPLE_PNG.to_vec()),
            FileInput::memory("sala.png", SAMPLE_PNG.to_vec()),
        ]
    } else {
        photo.into_iter().map(FileInput::path).collect()
    };
    match session.attach(AttachmentTarget::Photos, photos).await {
        Ok(added) => println!("- Attached {} photo(s)", added),
        Err(err) => println!("  Photos rejected: {}", err.user_message()),
    }
    if !document.is_empty() {
        let documents = document.into_iter().map(FileInput::path).collect();
        match session.attach(AttachmentTarget::Documents, documents).await {
            Ok(added) => println!("- Attached {} document(s)", added),
            Err(err) => println!("  Documents rejected: {}", err.user_message()),
        }
    }

    match session.submit().await {
        Ok(receipt) => {
            println!("- {}", receipt.message);
            println!(
                "  Stored rows: {} | webhook deliveries: {}",
                store.rows().len(),
                webhook.deliveries().len()
            );
            if let Some(row) = store.rows().first() {
                match serde_json::to_string_pretty(row) {
                    Ok(json) => println!("  Stored row:\n{}", json),
                    Err(err) => println!("  Stored row unavailable: {}", err),
                }
            }
        }
        Err(err) => {
            println!("  {}", err.user_message());
            let retained = session.snapshot().await;
            println!(
                "  Form kept for retry: {} photo(s), client {}",
                retained.photos.len(),
                retained.applicant.full_name
            );
        }
    }

    let preview = encode_bytes("image/png", SAMPLE_PNG);
    println!("\nInline encoding sample: {}", preview);
    Ok(())
}
