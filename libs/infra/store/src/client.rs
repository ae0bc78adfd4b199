// [libs/infra/store/src/client.rs]
/*!
 * =================================================================
 * APARATO: DATABASE CONNECTION CLIENT (V1.0)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GESTIÓN DE ENLACES Y PERSISTENCIA
 * =================================================================
 */

use std::sync::Arc;

use libsql::{Builder, Connection, Database};
use tracing::{info, instrument};

use crate::errors::StoreError;
use crate::schema::apply_full_schema;

#[derive(Clone)]
pub struct DbClient {
    driver: Arc<Database>,
    /// Keeps an in-memory database alive across connections; dropped
    /// otherwise. `:memory:` URLs need an anchor connection held open,
    /// since libSQL would otherwise purge the database once the
    /// bootstrap connection closes.
    _memory_anchor: Option<Arc<Connection>>,
}

impl DbClient {
    #[instrument(skip(database_access_token))]
    pub async fn connect(database_url: &str, database_access_token: Option<String>) -> Result<Self, StoreError> {
        if database_url.is_empty() {
            return Err(StoreError::Connection("DATABASE_URL is empty".into()));
        }

        info!("🔌 [STORE]: connecting to [{}]", database_url);

        let is_remote = database_url.starts_with("libsql://") || database_url.starts_with("https://");
        let is_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

        let driver = if is_remote {
            let token = database_access_token
                .ok_or_else(|| StoreError::Connection("remote URL requires an access token".into()))?;
            Builder::new_remote(database_url.to_string(), token).build().await
        } else {
            Builder::new_local(database_url).build().await
        }
        .map_err(|e| StoreError::Connection(e.to_string()))?;

        let driver = Arc::new(driver);
        let mut anchor = None;

        if is_memory {
            let anchor_conn = driver.connect().map_err(|e| StoreError::Connection(e.to_string()))?;
            apply_full_schema(&anchor_conn).await?;
            anchor = Some(Arc::new(anchor_conn));
            info!("⚓ [STORE]: in-memory schema anchored");
        } else {
            let bootstrap_conn = driver.connect().map_err(|e| StoreError::Connection(e.to_string()))?;
            apply_full_schema(&bootstrap_conn).await?;
        }

        Ok(Self { driver, _memory_anchor: anchor })
    }

    pub fn connection(&self) -> Result<Connection, StoreError> {
        self.driver.connect().map_err(|e| StoreError::Connection(e.to_string()))
    }
}
