mod assembler;
mod classifier;
mod normalizer;
mod patterns;
mod pipeline;

pub use assembler::{assemble, ParsedContact};
pub use classifier::{classify, Classification};
pub use normalizer::{normalize, FieldName, Line};
pub use pipeline::{parse_text, CardScanner, ScanOutput};
