use snafu::Snafu;
use tirx_dtype::DType;

use crate::BinaryOp;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Binary operands with different dtypes, neither of them an immediate.
    #[snafu(display("dtype mismatch in {op}: cannot combine {lhs} and {rhs}"))]
    DTypeMismatch { op: BinaryOp, lhs: DType, rhs: DType },

    /// Load or store with the wrong number of indices.
    #[snafu(display("buffer '{buffer}' has {expected} dimensions but was indexed with {actual}"))]
    IndexArityMismatch { buffer: String, expected: usize, actual: usize },

    /// Stored value does not have the buffer's element dtype.
    #[snafu(display("cannot store {actual} into buffer '{buffer}' of {expected}"))]
    StoreDTypeMismatch { buffer: String, expected: DType, actual: DType },
}
