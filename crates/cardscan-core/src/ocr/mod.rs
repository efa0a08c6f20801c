mod config;
mod google_vision;
mod http;
mod ocr_space;
mod orchestrator;
mod provider;
mod tesseract;

pub use config::{
    AcquisitionConfig, ConfigError, ConfigResult, ProviderConfig, ProviderKind,
    ATTEMPT_TIMEOUT_VAR, GOOGLE_VISION_KEY_VAR, OCR_SPACE_KEY_VAR,
};
pub use google_vision::GoogleVisionProvider;
pub use http::build_client;
pub use ocr_space::OcrSpaceProvider;
pub use orchestrator::{
    acquire, Acquisition, AcquisitionError, AcquisitionResult, CancelToken, Canceller,
    Orchestrator, ProviderAttempt,
};
pub use provider::{FailureKind, OcrProvider, ProviderError, ProviderResult};
pub use tesseract::TesseractProvider;
