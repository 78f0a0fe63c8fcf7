pub mod record_store_sqlite;
pub mod utils;
