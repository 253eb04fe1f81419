//! Cancellable background requests.
//!
//! Every catalog request runs on its own task, racing the request against a
//! [`CancellationToken`]. The token is wrapped in a [`DropGuard`] held by the
//! component that issued the request, so replacing or dropping that
//! component's [`InFlight`] cancels the request.

use std::future::Future;

use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

use crate::catalog::CatalogError;
use crate::metrics::REQUESTS_CANCELLED;

/// Handle on an outstanding request. Dropping it cancels the request.
#[derive(Debug)]
pub(crate) struct InFlight {
    _cancel: DropGuard,
}

/// Spawn `request` on the current Tokio runtime.
///
/// `deliver` receives the outcome exactly once: the request's own result, or
/// [`CatalogError::Cancelled`] if the returned [`InFlight`] was dropped first.
pub(crate) fn spawn_cancellable<T, Fut, F>(
    component: &'static str,
    request: Fut,
    deliver: F,
) -> InFlight
where
    T: Send + 'static,
    Fut: Future<Output = Result<T, CatalogError>> + Send + 'static,
    F: FnOnce(Result<T, CatalogError>) + Send + 'static,
{
    let token = CancellationToken::new();
    let cancelled = token.clone();

    tokio::spawn(async move {
        let outcome = tokio::select! {
            biased;
            _ = cancelled.cancelled() => Err(CatalogError::Cancelled),
            result = request => result,
        };

        if matches!(outcome, Err(CatalogError::Cancelled)) {
            debug!("{} request cancelled", component);
            REQUESTS_CANCELLED.with_label_values(&[component]).inc();
        }

        deliver(outcome);
    });

    InFlight {
        _cancel: token.drop_guard(),
    }
}
