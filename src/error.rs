//! Error types for the benchmark driver.

use thiserror::Error;

/// Everything that can go wrong outside the transport, which aborts on its
/// own. Kernel invocations themselves have no recoverable failures.
#[derive(Debug, Error)]
pub enum Error {
    /// The command line did not parse.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    /// The global verification rejected the sorted output.
    #[error("verification failed: the distributed array is not globally sorted")]
    VerificationFailed,
    /// Filesystem trouble while touching the result file.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The result row could not be written.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
