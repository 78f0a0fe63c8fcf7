use serde::Serialize;
use std::io::{self, Write};

use framer_application::error::AppResult;

/// Writes `value` to stdout as pretty JSON.
pub(crate) fn emit<T: Serialize + ?Sized>(value: &T) -> AppResult<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
