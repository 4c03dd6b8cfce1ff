/// Top-level union of every error the driver can hit (`SPEC_FULL.md` §7).
#[derive(thiserror::Error, Debug)]
pub enum SpectreError {
    #[error(transparent)]
    Dynamics(#[from] dynamics::DynamicsError),

    #[error(transparent)]
    Field(#[from] field::FieldError),

    #[error(transparent)]
    Grid(#[from] grid::GridError),

    /// Snapshot I/O failure (`spec.md` §7): logged and skipped by the driver, the run
    /// continues.
    #[error("snapshot I/O failed: {0}")]
    SnapshotIo(#[from] std::io::Error),

    #[error("invalid run configuration: {0}")]
    Config(String),
}
