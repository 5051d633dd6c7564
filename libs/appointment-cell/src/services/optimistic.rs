// libs/appointment-cell/src/services/optimistic.rs
use std::future::Future;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use shared_database::RemoteError;

use crate::models::AppointmentError;

pub type Rollback<S> = Box<dyn FnOnce(&mut S) + Send>;

/// A local change that has been applied, the payload for the remote call
/// that confirms it, and the undo for when that call fails.
pub struct Applied<S, P> {
    pub payload: P,
    pub rollback: Rollback<S>,
}

impl<S, P> Applied<S, P> {
    pub fn new(payload: P, rollback: impl FnOnce(&mut S) + Send + 'static) -> Self {
        Self {
            payload,
            rollback: Box::new(rollback),
        }
    }

    /// Nothing was changed locally, so there is nothing to undo.
    pub fn untouched(payload: P) -> Self {
        Self::new(payload, |_| {})
    }
}

/// Applies `apply` under the write lock, releases the lock, runs `remote` and
/// undoes the local change if the remote call fails.
///
/// `apply` may refuse the action by returning an error; in that case nothing
/// is changed and `remote` is never called. The lock is never held across the
/// remote call, so overlapping actions interleave and the last response to
/// settle wins.
pub async fn apply_optimistic<S, P, T, A, R, Fut>(
    state: &RwLock<S>,
    action: &str,
    apply: A,
    remote: R,
) -> Result<T, AppointmentError>
where
    A: FnOnce(&mut S) -> Result<Applied<S, P>, AppointmentError>,
    R: FnOnce(P) -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    let Applied { payload, rollback } = {
        let mut guard = state.write().await;
        apply(&mut guard)?
    };
    debug!("{}: local change applied", action);

    match remote(payload).await {
        Ok(value) => Ok(value),
        Err(err) => {
            warn!("{} failed, rolling back local change: {}", action, err);
            let mut guard = state.write().await;
            rollback(&mut guard);
            Err(AppointmentError::Remote(err))
        }
    }
}
