use framer_application::infrastructure_config::{CompositorConfig, Config, UploadConfig};
use tracing::info;

pub fn log_config_info(config: &Config) {
    info!("⚙️  Configuration ({})", config.environment.env);
    log_compositor_configuration(&config.compositor);
    log_upload_configuration(&config.uploads);
    log_storage_configuration(config);
}

fn log_compositor_configuration(compositor: &CompositorConfig) {
    info!(
        "  🖼️  Compositor: max {} pixels, default quality {}, timeout {}s",
        compositor.max_image_pixels, compositor.default_quality, compositor.timeout_secs
    );
    info!(
        "  ⬜ White background coefficient: {}",
        compositor.white_background_coefficient
    );
}

fn log_upload_configuration(uploads: &UploadConfig) {
    info!(
        "  📤 Uploads: max {} bytes, types [{}]",
        uploads.max_file_size,
        uploads.allowed_types.join(", ")
    );
}

fn log_storage_configuration(config: &Config) {
    info!(
        "  🧩 Frames: {}/ (default {})",
        config.frames.directory, config.frames.default_frame
    );
    info!(
        "  📦 Objects: {}/ served under {}",
        config.storage.root_dir, config.storage.public_url_prefix
    );
    info!(
        "  🗄️  Database: {} (pool {}, query timeout {}s)",
        config.db.database_url, config.db.pool_size, config.db.query_timeout_secs
    );
}
