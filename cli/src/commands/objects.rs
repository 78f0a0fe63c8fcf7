use tokio::fs;
use tracing::info;

use super::{ObjectsCommand, input::read_upload, output};
use crate::bootstrap::state::AppState;
use framer_application::error::AppResult;

pub(crate) async fn run(state: &AppState, command: ObjectsCommand) -> AppResult<()> {
    match command {
        ObjectsCommand::List => output::emit(&state.storage.list_objects().await?),
        ObjectsCommand::Get { key, output: path } => {
            let bytes = state.storage.get_object(&key).await?;
            fs::write(&path, &bytes).await?;
            info!(%key, path = %path.display(), bytes = bytes.len(), "Object written");
            Ok(())
        }
        ObjectsCommand::Upload { file } => {
            let upload = read_upload(&file).await?;
            output::emit(&state.storage.upload_original(upload).await?)
        }
    }
}
