use std::path::PathBuf;

use thiserror::Error;

/// Failures the pipeline surfaces to its caller. Per-item download and
/// thumbnail failures are deliberately not represented here; those are
/// swallowed and reported through status enums instead.
#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error("no config file found, you must create config first")]
    ConfigMissing,
    #[error("no key is provided, please get your key")]
    AccessKeyMissing,
    #[error("quality `{quality}` is not available for image `{id}`")]
    MissingQuality { id: String, quality: String },
    #[error("invalid metadata file {}: {}", .path.display(), .source)]
    CorruptMetadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
