//! Event store connectivity checks.

use crate::client::StoreClient;
use tracing::warn;

/// Checks connectivity by running a trivial query.
pub async fn check_connection(client: &StoreClient) -> bool {
    match client.inner().query("SELECT 1").fetch_one::<u8>().await {
        Ok(_) => true,
        Err(e) => {
            warn!(error = %e, "event store connectivity check failed");
            false
        }
    }
}
