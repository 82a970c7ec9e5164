use std::sync::Arc;

use crate::{
    catalog::Catalog,
    config::AppConfig,
    db::DbPool,
    replica::AiReplica,
    services::chat::interpret::{LexicalInterpreter, ReplyInterpreter},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: AppConfig,
    pub replica: Arc<dyn AiReplica>,
    pub catalog: Arc<dyn Catalog>,
    pub interpreter: Arc<dyn ReplyInterpreter>,
}

impl AppState {
    pub fn new(
        pool: DbPool,
        config: AppConfig,
        replica: Arc<dyn AiReplica>,
        catalog: Arc<dyn Catalog>,
    ) -> Self {
        Self {
            pool,
            config,
            replica,
            catalog,
            interpreter: Arc::new(LexicalInterpreter),
        }
    }
}
