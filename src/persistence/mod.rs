//! Persistence layer: PostgreSQL store snapshots.
//!
//! Each store is saved as one named JSONB blob in `store_blobs` together
//! with the schema version it was written with, and reloaded wholesale at
//! startup.

pub mod models;
pub mod postgres;
pub mod snapshot;

pub use models::{BlobName, SCHEMA_VERSION, StoredBlob};
pub use postgres::PostgresPersistence;
pub use snapshot::{SnapshotCoordinator, Stores};
