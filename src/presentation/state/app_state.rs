use std::sync::Arc;

use crate::application::services::{ChannelHealthService, TaskOrchestrator};
use crate::presentation::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<TaskOrchestrator>,
    pub channel_health: Arc<ChannelHealthService>,
    pub settings: Settings,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<TaskOrchestrator>,
        channel_health: Arc<ChannelHealthService>,
        settings: Settings,
    ) -> Self {
        Self {
            orchestrator,
            channel_health,
            settings,
        }
    }
}
