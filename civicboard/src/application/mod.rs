//! Application wide state and startup wiring.

pub mod config;
pub mod logging;

use std::sync::Arc;

use llm_client::broker::LLMBroker;
use tracing_appender::non_blocking::WorkerGuard;

use crate::chat::ActiveSendTracker;
use crate::db::{init_sqlite_db, SqlDb};

use self::config::Configuration;

#[derive(Clone)]
pub struct Application {
    pub config: Arc<Configuration>,
    pub sql: SqlDb,
    pub llm_broker: Arc<LLMBroker>,
    pub active_sends: ActiveSendTracker,
}

impl Application {
    pub fn install_logging(config: &Configuration) -> anyhow::Result<Option<WorkerGuard>> {
        logging::install_logging(config)
    }

    pub async fn initialize(config: Configuration) -> anyhow::Result<Self> {
        let sql = init_sqlite_db(&config).await?;
        Ok(Self {
            config: Arc::new(config),
            sql,
            llm_broker: Arc::new(LLMBroker::new()),
            active_sends: ActiveSendTracker::new(),
        })
    }

    #[cfg(test)]
    pub(crate) async fn initialize_for_tests(broker: LLMBroker) -> Self {
        Self {
            config: Arc::new(Configuration::for_tests()),
            sql: crate::db::init_test_db().await,
            llm_broker: Arc::new(broker),
            active_sends: ActiveSendTracker::new(),
        }
    }
}
