use tracing::info;

use super::{RecordsCommand, output};
use crate::bootstrap::state::AppState;
use domain::record::RecordId;
use framer_application::error::AppResult;

pub(crate) async fn run(state: &AppState, command: RecordsCommand) -> AppResult<()> {
    match command {
        RecordsCommand::List => output::emit(&state.records.list_records().await?),
        RecordsCommand::Delete { id } => {
            let id = RecordId::new(id);
            state.records.delete_record(id).await?;
            info!(%id, "Record deleted");
            Ok(())
        }
        RecordsCommand::Reorder { ids } => {
            let ids: Vec<RecordId> = ids.into_iter().map(RecordId::new).collect();
            state.records.reorder_records(&ids).await?;
            output::emit(&state.records.list_records().await?)
        }
    }
}
