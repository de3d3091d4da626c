//! Driving async operations to completion on the calling thread.

use std::future::Future;

use crate::error::{Result, UpdateError};

/// Runs `future` on a fresh current-thread runtime and returns its result.
///
/// Fails with [`UpdateError::InvalidArgument`] when the calling thread is
/// already driving a tokio runtime; use the async API there.
pub(crate) fn block_on<F, T>(future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(UpdateError::invalid_argument(
            "blocking call made from within an async runtime; use the async API instead",
        ));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(future)
}
