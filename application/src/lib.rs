#[cfg(any(
    feature = "adapters",
    feature = "image",
    feature = "sqlx",
    feature = "clap"
))]
compile_error!("application must not depend on adapters/framework crates");

pub mod config;
pub mod error;
pub mod framing;
pub mod infrastructure_config;
pub mod ports;
pub mod records;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;
