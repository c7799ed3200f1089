//! Per-call connectivity probe.
//!
//! The cheapest read the remote offers is a bounded count; completing it
//! without a network or authorization error means the remote path is open.
//! Results are deliberately not cached — every public operation re-probes,
//! so a remote that just came back (or just went away) is noticed on the
//! very next call.

use std::sync::Arc;

use crate::collection::Collection;

use super::RemoteStore;

pub struct ConnectivityProbe {
    remote: Option<Arc<dyn RemoteStore>>,
}

impl ConnectivityProbe {
    pub fn new(remote: Option<Arc<dyn RemoteStore>>) -> Self {
        Self { remote }
    }

    /// Whether the remote path is usable right now. `false` when the remote
    /// is unconfigured or the probe read fails.
    pub async fn is_reachable(&self) -> bool {
        let Some(remote) = &self.remote else {
            return false;
        };
        match remote.count(Collection::SiteSettings).await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "connectivity probe failed");
                false
            }
        }
    }
}
