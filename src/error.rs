use std::collections::TryReserveError;

use thiserror::Error;

/// An OrderedMap error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The table or the order list couldn't grow by the requested amount.
    #[error("failed to reserve room for {additional} more entries: {source}")]
    Reserve {
        additional: usize,
        #[source]
        source: TryReserveError,
    },
}
