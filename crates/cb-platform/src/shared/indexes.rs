//! MongoDB Index Initialization
//!
//! Creates indexes for all collections on application startup.

use mongodb::{Database, IndexModel, bson::doc, options::IndexOptions};
use tracing::info;

/// Initialize all MongoDB indexes
pub async fn initialize_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    info!("Initializing MongoDB indexes...");

    create_client_indexes(db).await?;

    info!("MongoDB indexes initialized successfully");
    Ok(())
}

async fn create_client_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let clients = db.collection::<mongodb::bson::Document>("clients");

    // At most one client per email; concurrent creates rely on this
    clients.create_index(
        IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("clients_email_unique".to_string())
                .build())
            .build(),
    ).await?;

    // Owner filtering
    clients.create_index(
        IndexModel::builder()
            .keys(doc! { "user": 1 })
            .options(IndexOptions::builder().build())
            .build(),
    ).await?;

    clients.create_index(
        IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(IndexOptions::builder().build())
            .build(),
    ).await?;

    // Default list order
    clients.create_index(
        IndexModel::builder()
            .keys(doc! { "createdAt": 1, "_id": 1 })
            .options(IndexOptions::builder().build())
            .build(),
    ).await?;

    info!("Created indexes on clients");
    Ok(())
}
