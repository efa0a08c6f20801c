#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extract;
pub mod ocr;

pub use error::{Error, Result};
pub use extract::{
    assemble, classify, normalize, parse_text, CardScanner, Classification, FieldName, Line,
    ParsedContact, ScanOutput,
};
pub use ocr::{
    Acquisition, AcquisitionConfig, AcquisitionError, CancelToken, Canceller, ConfigError,
    FailureKind, OcrProvider, Orchestrator, ProviderAttempt, ProviderConfig, ProviderError,
    ProviderKind,
};

