use thiserror::Error;

/// Error taxonomy shared by the solver core, the config factory, and the
/// observer/IO layer. Mirrors the style of `ccx-io`'s `IoError`: one
/// `thiserror` enum per crate boundary, no `anyhow` in library code.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("duplicate key: {0}")]
    DuplicateKey(u64),

    #[error("unknown key: {0}")]
    UnknownKey(u64),

    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionError { expected: usize, found: usize },

    #[error("singular system encountered during solve")]
    SingularSystem,

    #[error("numerical overflow: {0}")]
    NumericalOverflow(String),

    #[error("transport error: {0}")]
    TransportError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
