use snafu::Snafu;

pub type Result<T, E = UnrollError> = std::result::Result<T, E>;

/// Failure of the unroll transform on one tree.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum UnrollError {
    /// A threshold was negative. Reported before any traversal.
    #[snafu(display("invalid unroll configuration: {field} = {value} (must be non-negative)"))]
    InvalidConfig { field: &'static str, value: i64 },

    /// A loop marked for unrolling has an extent that is not a constant.
    #[snafu(display("cannot unroll loop over '{loop_var}': extent {extent} is not a constant"))]
    UnsupportedUnrollTarget { loop_var: String, extent: String },
}

/// Failure of a pass over a module.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PassError {
    /// The pass-context entry for a pass could not be decoded.
    #[snafu(display("invalid pass config '{key}': {source}"))]
    Config { key: String, source: serde_json::Error },

    #[snafu(display("unroll failed in function '{func}': {source}"))]
    Unroll { func: String, source: UnrollError },
}
