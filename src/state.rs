use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    utils::telegram::{DeliveryError, ReportSender},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sender: Arc<ReportSender>,
}

impl AppState {
    /// Wires the Telegram sender from configuration.
    pub fn from_config(config: Config) -> Result<Self, DeliveryError> {
        let sender = ReportSender::from_config(&config)?;
        Ok(Self {
            config,
            sender: Arc::new(sender),
        })
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<ReportSender> {
    fn from_ref(state: &AppState) -> Self {
        state.sender.clone()
    }
}
