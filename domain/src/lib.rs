pub mod color;
pub mod error;
pub mod image;
pub mod object_key;
pub mod record;
