pub mod blocking_compositor;
pub mod compositor;
pub mod frame_assets;
pub mod object_store;
pub mod record_store;
