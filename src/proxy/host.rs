//! Settings the hosting registry server provides to the relay

use crate::upstream::ProxyUrl;

/// Host configuration consulted on every upstream attempt
pub trait HostSettings: Send + Sync {
    /// Outbound proxy for HTTPS traffic, if the registry has one configured
    fn https_proxy(&self) -> Option<ProxyUrl>;
}

/// Host settings fixed at startup
#[derive(Clone, Debug, Default)]
pub struct StaticHostSettings {
    pub https_proxy: Option<ProxyUrl>,
}

impl StaticHostSettings {
    pub fn with_proxy(https_proxy: ProxyUrl) -> Self {
        Self {
            https_proxy: Some(https_proxy),
        }
    }
}

impl HostSettings for StaticHostSettings {
    fn https_proxy(&self) -> Option<ProxyUrl> {
        self.https_proxy.clone()
    }
}
