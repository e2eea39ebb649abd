use crate::config::DashboardConfig;
use crate::dashboard::Dashboard;
use crate::errors::UpstreamError;
use crate::upstream::UpstreamClient;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DashboardConfig>,
    pub upstream: Arc<UpstreamClient>,
    pub dashboard: Arc<Dashboard>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Result<Self, UpstreamError> {
        let upstream = UpstreamClient::new(config.upstream_url.clone(), config.upstream_timeout)?;
        let dashboard = Dashboard::new(config.locale);
        Ok(Self {
            config: Arc::new(config),
            upstream: Arc::new(upstream),
            dashboard: Arc::new(dashboard),
        })
    }
}
