//! Response interception around a triggering action

use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::driver::{Driver, ResponseInfo};
use crate::error::{E2eError, E2eResult};

/// Arm a listener for `pattern`, run `trigger`, then wait for the response.
///
/// The listener is registered before the trigger runs. A non-2xx status is
/// returned as [`E2eError::ResponseFailed`] carrying the status and body.
pub async fn expect_response<F>(
    driver: &dyn Driver,
    pattern: &str,
    timeout: Duration,
    trigger: F,
) -> E2eResult<ResponseInfo>
where
    F: Future<Output = E2eResult<()>>,
{
    let watch = driver.arm_response(pattern, timeout).await?;
    trigger.await?;
    let response = driver.await_response(watch).await?;
    debug!(url = %response.url, status = response.status, "Intercepted response");
    check_status(pattern, response)
}

pub(crate) fn check_status(pattern: &str, response: ResponseInfo) -> E2eResult<ResponseInfo> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(E2eError::ResponseFailed {
            pattern: pattern.to_string(),
            status: response.status,
            body: response.body,
        })
    }
}
