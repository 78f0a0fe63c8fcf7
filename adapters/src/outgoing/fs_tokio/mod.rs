pub mod frame_assets_fs;
pub mod object_store_fs;

#[cfg(test)]
pub(crate) mod scratch;
