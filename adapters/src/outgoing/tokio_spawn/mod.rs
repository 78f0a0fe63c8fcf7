pub mod blocking_compositor_tokio;
