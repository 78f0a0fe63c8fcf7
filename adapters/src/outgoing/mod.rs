pub mod fs_tokio;
pub mod image_rs;
pub mod sqlite_sqlx;
pub mod tokio_spawn;
