pub mod config;
pub mod document;
pub mod record;
pub mod response;
pub mod service;
pub mod storage;
pub mod sync;

pub use config::{ConfigError, ConfigKey, RemoteConfig, load_config};
pub use document::{
    DocumentParams, ListingEntry, NameError, RemoteFields, UploadResult, validate_name,
};
pub use record::{DocumentRecord, LocalDocument};
pub use response::{
    ClassifiedError, MalformedResponseError, Outcome, ResponseStatus, is_service_response,
};
pub use service::{DocumentService, TransportError};
pub use storage::{
    AttachmentFuLocator, FileBinding, FileLocatable, PaperclipLocator, StorageStrategy,
    StoredFile,
};
pub use sync::{DeleteError, DocumentSync, LifecycleHooks, SyncError, UploadError, UploadOutcome};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
