//! Terminal rendering of essay trace records.
//!
//! Live runs hand typed [`TraceRecord`]s to [`TraceRenderer::render`].
//! Replays read raw JSON lines through [`TraceRenderer::render_json`],
//! which prints a warning for anything it does not recognize instead of
//! failing.

use std::io::{self, Write};

use tracing::warn;

use crate::essay::TraceRecord;

const RULE: &str = "----------------------------------------";

pub struct TraceRenderer<W: Write> {
    out: W,
}

impl<W: Write> TraceRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn render(&mut self, record: &TraceRecord) -> io::Result<()> {
        match record {
            TraceRecord::Plan { plan } => {
                self.heading("Plan")?;
                writeln!(self.out, "Understood! I will be the planner of the operation.\n")?;
                writeln!(self.out, "{plan}")?;
            }
            TraceRecord::ResearchPlan { queries, content } => {
                self.heading("Research plan")?;
                self.queries(queries)?;
                writeln!(self.out, "Total items in research plan: {}", content.len())?;
                self.items_from(0, content)?;
            }
            TraceRecord::Reflect { critique } => {
                self.heading("Reflection")?;
                writeln!(self.out, "{critique}")?;
            }
            TraceRecord::ResearchCritique {
                queries,
                content,
                total_items,
            } => {
                // traces written before the running total was recorded carry 0
                let total = (*total_items).max(content.len());
                self.heading("Research critique")?;
                self.queries(queries)?;
                writeln!(self.out, "Total items in research critique: {total}")?;
                self.items_from(total - content.len(), content)?;
            }
            TraceRecord::Generate {
                draft,
                revision_number,
            } => {
                self.heading(&format!("Draft (revision {})", revision_number.saturating_sub(1)))?;
                writeln!(self.out, "{draft}")?;
            }
        }
        writeln!(self.out)?;
        self.out.flush()
    }

    /// Render one record read back from a trace file.
    pub fn render_json(&mut self, value: &serde_json::Value) -> io::Result<()> {
        let Some(kind) = value.get("kind").and_then(|k| k.as_str()) else {
            warn!("Trace record without a kind");
            return self.unsupported("<missing kind>");
        };

        match serde_json::from_value::<TraceRecord>(value.clone()) {
            Ok(record) => self.render(&record),
            Err(e) => {
                warn!(kind, error = %e, "Unsupported trace record");
                self.unsupported(kind)
            }
        }
    }

    /// Render one line of a trace file; lines that are not JSON are
    /// reported and skipped.
    pub fn render_line(&mut self, line: &str) -> io::Result<()> {
        match serde_json::from_str::<serde_json::Value>(line) {
            Ok(value) => self.render_json(&value),
            Err(e) => {
                warn!(error = %e, "Trace line is not JSON");
                writeln!(self.out, "warning: trace line is not JSON, skipped\n")?;
                self.out.flush()
            }
        }
    }

    fn unsupported(&mut self, kind: &str) -> io::Result<()> {
        writeln!(self.out, "warning: unsupported trace record ({kind}), skipped\n")?;
        self.out.flush()
    }

    fn heading(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.out, "{RULE}\n{title}\n{RULE}")
    }

    fn queries(&mut self, queries: &[String]) -> io::Result<()> {
        if queries.is_empty() {
            return Ok(());
        }
        writeln!(self.out, "Queries: {}", queries.join(" | "))
    }

    /// Number `items` after the `before` already listed by earlier steps.
    fn items_from(&mut self, before: usize, items: &[String]) -> io::Result<()> {
        for (i, item) in items.iter().enumerate() {
            writeln!(self.out, "{}: {item}", before + i + 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rendered(f: impl FnOnce(&mut TraceRenderer<Vec<u8>>)) -> String {
        let mut r = TraceRenderer::new(Vec::new());
        f(&mut r);
        String::from_utf8(r.into_inner()).unwrap()
    }

    #[test]
    fn renders_each_kind() {
        let out = rendered(|r| {
            r.render(&TraceRecord::Plan { plan: "I. Intro".into() }).unwrap();
            r.render(&TraceRecord::ResearchPlan {
                queries: vec!["q1".into()],
                content: vec!["alpha".into(), "beta".into()],
            })
            .unwrap();
            r.render(&TraceRecord::Generate {
                draft: "The essay.".into(),
                revision_number: 2,
            })
            .unwrap();
            r.render(&TraceRecord::Reflect { critique: "Longer.".into() }).unwrap();
            r.render(&TraceRecord::ResearchCritique {
                queries: vec![],
                content: vec!["gamma".into()],
                total_items: 3,
            })
            .unwrap();
        });

        assert!(out.contains("I. Intro"));
        assert!(out.contains("Total items in research plan: 2\n1: alpha\n2: beta"));
        assert!(out.contains("Draft (revision 1)\n"));
        assert!(out.contains("The essay."));
        assert!(out.contains("Longer."));
        assert!(out.contains("Total items in research critique: 3\n3: gamma"));
    }

    #[test]
    fn critique_from_an_older_trace_counts_its_own_items() {
        let out = rendered(|r| {
            r.render_json(&json!({
                "kind": "research_critique",
                "queries": [],
                "content": ["x", "y"]
            }))
            .unwrap()
        });
        assert!(out.contains("Total items in research critique: 2\n1: x\n2: y"));
    }

    #[test]
    fn json_records_render_like_typed_ones() {
        let from_json = rendered(|r| {
            r.render_json(&json!({"kind": "reflect", "critique": "ok"})).unwrap()
        });
        let typed = rendered(|r| r.render(&TraceRecord::Reflect { critique: "ok".into() }).unwrap());
        assert_eq!(from_json, typed);
    }

    #[test]
    fn unknown_kind_warns_instead_of_failing() {
        let out = rendered(|r| {
            r.render_json(&json!({"kind": "summarize", "text": "x"})).unwrap();
            r.render_json(&json!({"draft": "no kind"})).unwrap();
            r.render_json(&json!({"kind": "generate"})).unwrap();
        });
        assert!(out.contains("warning: unsupported trace record (summarize)"));
        assert!(out.contains("warning: unsupported trace record (<missing kind>)"));
        assert!(out.contains("warning: unsupported trace record (generate)"));
    }

    #[test]
    fn garbage_lines_are_skipped() {
        let out = rendered(|r| {
            r.render_line("not json at all").unwrap();
            r.render_line(r#"{"kind":"plan","plan":"Outline"}"#).unwrap();
        });
        assert!(out.contains("warning: trace line is not JSON, skipped"));
        assert!(out.contains("Outline"));
    }
}
