use crate::{adapters::persistence::PostgresPersistence, infra::db::init_db};

pub mod ai_gateway;
pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod gemini_client;
pub mod http_client;
pub mod replicate_client;
pub mod setup;
pub mod stripe_client;
pub mod stripe_payment_adapter;

pub async fn postgres_persistence(
    database_url: &str,
    max_connections: u32,
) -> anyhow::Result<PostgresPersistence> {
    let pool = init_db(database_url, max_connections).await?;
    let persistence = PostgresPersistence::new(pool);
    Ok(persistence)
}
