//! Waiter primitives for node state changes
//!
//! Polling helpers for tests that need to wait on chain state: readiness,
//! height, balances. All waiting goes through a [`Clock`], so with a
//! paused tokio runtime these helpers resolve instantly instead of
//! burning wall-clock time.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use tokio::time::Duration;

use crate::account::AccountId;
use crate::clock::Clock;
use crate::error::WorkspaceError;
use crate::rpc::NodeClient;

/// Interval between probe attempts used by the convenience waiters.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Poll `probe` until it returns `true` or `timeout` elapses.
///
/// Probe errors are propagated immediately; use [`wait_until_ok`] when
/// errors are expected while the condition converges (e.g. a node that is
/// still booting).
///
/// # Errors
///
/// Returns [`WorkspaceError::Timeout`] if the predicate never held, or the
/// probe's own error.
pub async fn wait_until<F, Fut>(
    clock: &dyn Clock,
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let deadline = clock.now() + timeout;
    loop {
        if probe().await? {
            return Ok(());
        }
        if clock.now() >= deadline {
            return Err(WorkspaceError::Timeout(timeout).into());
        }
        clock.sleep(interval).await;
    }
}

/// Poll `probe` until it returns `Ok`, treating errors as "not yet".
///
/// This is the readiness-flavored waiter: a sandbox node refuses
/// connections until its RPC server is up, and every one of those
/// failures just means "try again".
///
/// # Errors
///
/// Returns [`WorkspaceError::Timeout`] wrapping nothing but the elapsed
/// duration; the last probe error is logged at debug level.
pub async fn wait_until_ok<T, F, Fut>(
    clock: &dyn Clock,
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let deadline = clock.now() + timeout;
    loop {
        match probe().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if clock.now() >= deadline {
                    log::debug!("waiter gave up; last error: {:#}", e);
                    return Err(WorkspaceError::Timeout(timeout).into());
                }
            }
        }
        clock.sleep(interval).await;
    }
}

/// Wait until the chain reaches at least `target` height.
pub async fn wait_for_height(
    client: &Arc<dyn NodeClient>,
    clock: &dyn Clock,
    target: u64,
    timeout: Duration,
) -> Result<()> {
    wait_until(clock, timeout, DEFAULT_POLL_INTERVAL, || {
        let client = client.clone();
        async move { Ok(client.node_info().await?.height >= target) }
    })
    .await
}

/// Wait until `account` holds at least `min_balance` nanoHLS.
pub async fn wait_for_balance_at_least(
    client: &Arc<dyn NodeClient>,
    clock: &dyn Clock,
    account: &AccountId,
    min_balance: u64,
    timeout: Duration,
) -> Result<()> {
    wait_until(clock, timeout, DEFAULT_POLL_INTERVAL, || {
        let client = client.clone();
        let account = account.clone();
        async move { Ok(client.balance(&account).await? >= min_balance) }
    })
    .await
}
