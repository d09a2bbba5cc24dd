//! `inkloop replay`: render a JSON-lines trace file.

use std::io::{self, Write};
use std::path::Path;

use inkloop_agent::TraceRenderer;

use super::CmdResult;

pub async fn run(file: &Path) -> CmdResult {
    let raw = tokio::fs::read_to_string(file)
        .await
        .map_err(|e| format!("Failed to read {}: {e}", file.display()))?;
    let lines = replay(&raw, io::stdout().lock())?;
    if lines == 0 {
        println!("Trace file is empty.");
    }
    Ok(())
}

/// Render every non-blank line of `raw`; returns how many there were.
pub fn replay<W: Write>(raw: &str, out: W) -> io::Result<usize> {
    let mut renderer = TraceRenderer::new(out);
    let mut count = 0;
    for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
        renderer.render_line(line)?;
        count += 1;
    }
    Ok(count)
}
