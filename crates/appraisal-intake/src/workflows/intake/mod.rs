//! Real-estate appraisal intake: the requester's form, its input rules, and
//! the submission of a completed record.

pub mod address;
pub mod domain;
pub mod encoder;
pub mod fields;
pub mod normalize;
pub mod report;
pub mod router;
pub mod session;
pub mod state;
pub mod submission;

pub use address::{
    AddressAutofill, AddressLookup, LookupAddress, LookupError, LookupOutcome, PostalCodeOutcome,
    ViaCepClient,
};
pub use domain::{
    Address, Applicable, Applicant, DocumentKind, DocumentStatus, Documentation, Objective,
    Occupancy, PropertyDetails, PropertyType, RequesterRole, StateCode, SubmissionRecord,
    NOT_APPLICABLE,
};
pub use encoder::{attach_files, encode_batch, encode_file, AttachmentTarget, EncodeError, FileInput};
pub use fields::{AddressUpdate, FieldError, FieldUpdate};
pub use normalize::{format_phone, format_postal_code};
pub use report::{AppraisalReport, GeminiClient, ReportError, ReportGenerator, ReportSection};
pub use router::intake_router;
pub use session::{FieldChange, IntakeSession};
pub use state::FormState;
pub use submission::{
    Channel, ChannelError, ChannelFailure, NotificationChannel, PersistenceChannel,
    SubmissionError, SubmissionOrchestrator, SubmissionReceipt, SupabaseStore, WebhookNotifier,
};
