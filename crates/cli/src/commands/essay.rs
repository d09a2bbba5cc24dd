//! `inkloop essay`: the plan / research / draft / critique loop.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use inkloop_agent::{EssayAgent, TraceRecord, TraceRenderer};
use inkloop_config::CheckpointBackend;
use inkloop_core::checkpoint::ThreadId;
use tracing::{info, warn};

use super::{CmdResult, load_config, model_provider, search_client};

pub struct EssayArgs {
    pub task: Option<String>,
    pub max_revisions: Option<u32>,
    pub thread: Option<String>,
    pub resume: bool,
    pub trace_out: Option<PathBuf>,
}

/// Where trace records go as their steps complete.
pub struct TraceSink<W: Write> {
    renderer: TraceRenderer<W>,
    file: Option<BufWriter<File>>,
}

impl<W: Write> TraceSink<W> {
    pub fn new(out: W, trace_out: Option<&PathBuf>) -> io::Result<Self> {
        let file = match trace_out {
            Some(path) => Some(BufWriter::new(
                OpenOptions::new().create(true).append(true).open(path)?,
            )),
            None => None,
        };
        Ok(Self {
            renderer: TraceRenderer::new(out),
            file,
        })
    }

    pub fn record(&mut self, record: &TraceRecord) -> io::Result<()> {
        self.renderer.render(record)?;
        if let Some(file) = &mut self.file {
            serde_json::to_writer(&mut *file, record)?;
            file.write_all(b"\n")?;
            file.flush()?;
        }
        Ok(())
    }
}

pub async fn run(args: EssayArgs) -> CmdResult {
    let config = load_config()?;

    if args.resume && config.checkpoint.backend == CheckpointBackend::Memory {
        return Err(
            "--resume needs a persistent checkpoint store; set `backend = \"file\"` under [checkpoint]"
                .into(),
        );
    }

    let (provider, model) = model_provider(&config)?;
    let search = search_client(&config)?;
    let store = inkloop_checkpoint::build_from_config(&config);

    let agent = EssayAgent::new(provider, search, &model)
        .with_checkpoint_store(store)
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens)
        .with_results_per_query(config.search.research_results)
        .with_search_concurrency(config.search.concurrency);

    let thread = args.thread.as_deref().map(ThreadId::from).unwrap_or_default();
    let mut sink = TraceSink::new(io::stdout(), args.trace_out.as_ref())?;
    let mut on_record = |record: &TraceRecord| {
        if let Err(e) = sink.record(record) {
            warn!(error = %e, "Failed to write trace record");
        }
    };

    let run = if args.resume {
        if args.task.is_some() {
            warn!("Ignoring the task argument: resuming the saved run");
        }
        agent
            .resume_with(&thread, &mut on_record)
            .await?
            .ok_or_else(|| format!("no saved run for thread '{thread}'"))?
    } else {
        let task = args.task.ok_or("an essay task is required unless --resume is given")?;
        let max_revisions = args.max_revisions.unwrap_or(config.agent.max_revisions);
        agent
            .run_with(&task, max_revisions, &thread, &mut on_record)
            .await?
    };

    info!(
        thread = %thread,
        revision = run.state.revision_number,
        "Essay complete"
    );
    if run.trace.is_empty() {
        // resumed a finished run: nothing was rendered yet
        println!("{}", run.draft);
    }
    Ok(())
}
