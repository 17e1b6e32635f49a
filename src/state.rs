use std::sync::Arc;

use sqlx::PgPool;

use scolara_core::FileStorage;

use crate::config::cors::CorsConfig;
use crate::config::database::init_db_pool;
use crate::config::jwt::JwtConfig;
use crate::config::storage::StorageConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub file_storage: Arc<dyn FileStorage>,
}

pub async fn init_app_state() -> AppState {
    let storage_config = StorageConfig::from_env();

    AppState {
        db: init_db_pool().await,
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
        file_storage: Arc::new(storage_config.build()),
    }
}
