use std::sync::Arc;

use super::{FrameArgs, WhiteBgArgs, batch::process_all, output};
use crate::bootstrap::state::AppState;
use framer_application::error::AppResult;
use framer_application::ports::incoming::framing::{AddFrameCommand, AddWhiteBackgroundCommand};

pub(crate) async fn frame(state: &AppState, args: FrameArgs) -> AppResult<()> {
    let use_case = Arc::clone(&state.add_frame);
    let FrameArgs {
        inputs,
        frame,
        quality,
    } = args;

    process_all(&inputs, move |upload| {
        let use_case = Arc::clone(&use_case);
        let command = AddFrameCommand {
            upload,
            frame_name: frame.clone(),
            quality,
        };
        async move { use_case.add_frame(command).await }
    })
    .await
}

pub(crate) async fn white_background(state: &AppState, args: WhiteBgArgs) -> AppResult<()> {
    let use_case = Arc::clone(&state.white_background);
    let WhiteBgArgs {
        inputs,
        coefficient,
    } = args;

    process_all(&inputs, move |upload| {
        let use_case = Arc::clone(&use_case);
        let command = AddWhiteBackgroundCommand {
            upload,
            coefficient,
        };
        async move { use_case.add_white_background(command).await }
    })
    .await
}

pub(crate) async fn list_frames(state: &AppState) -> AppResult<()> {
    let frames = state.add_frame.list_frames().await?;
    output::emit(&frames)
}
