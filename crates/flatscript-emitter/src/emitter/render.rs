//! Chunk rendering.
//!
//! Rendering is two-pass. The first pass renders every chunk body and
//! records which chunks were targeted by an emitted jump. The second pass
//! writes labels for the entry chunk and the targeted chunks only, each
//! followed by its body.
//!
//! ```text
//! Main:                        <- entry label, always present
//!     goto_if_set FLAG_1, Main_2
//!     end
//!
//! Main_2:                      <- targeted, so labelled
//!     msgbox Text_1
//!     end
//!
//! ```

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::ast::{Command, RawStatement, Text};
use crate::compiler::{Branch, Chunk, ChunkGraph, ChunkId};
use crate::error::Result;

/// The label of a chunk: the script name for the entry chunk, and
/// `<script>_<id>` for every other chunk.
pub fn label(script: &str, id: ChunkId) -> String {
    if id.is_entry() {
        script.to_string()
    } else {
        format!("{}_{}", script, id)
    }
}

/// Renders the chunks of one script in a given order.
pub struct ChunkRenderer<'g, 'a> {
    script: &'g str,
    graph: &'g ChunkGraph<'a>,
}

/// Body rendering state for one pass.
#[derive(Default)]
struct BodyPass {
    targets: FxHashSet<ChunkId>,
}

impl<'g, 'a> ChunkRenderer<'g, 'a> {
    /// Creates a renderer for the named script's chunk graph.
    pub fn new(script: &'g str, graph: &'g ChunkGraph<'a>) -> Self {
        Self { script, graph }
    }

    /// Renders the chunks listed in `order`.
    ///
    /// Ids in `order` that are not part of the graph are skipped.
    pub fn render(&self, order: &[ChunkId]) -> Result<String> {
        let chunks: Vec<&Chunk<'a>> = order.iter().filter_map(|id| self.graph.get(*id)).collect();

        let mut pass = BodyPass::default();
        let mut bodies = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            let next = chunks.get(i + 1).map(|c| c.id);
            bodies.push(self.render_body(chunk, next, &mut pass)?);
        }

        let mut out = String::new();
        for (chunk, body) in chunks.iter().zip(bodies) {
            if chunk.id.is_entry() || pass.targets.contains(&chunk.id) {
                out.push_str(&label(self.script, chunk.id));
                out.push_str(":\n");
            } else {
                trace!(script = self.script, chunk = %chunk.id, "label elided");
            }
            out.push_str(&body);
        }
        Ok(out)
    }

    fn render_body(&self, chunk: &Chunk<'a>, next: Option<ChunkId>, pass: &mut BodyPass) -> Result<String> {
        let mut body = String::new();
        for command in &chunk.commands {
            render_command(command, &mut body);
        }

        let falls_through = match chunk.branch {
            Some(Branch::Jump { dest }) => self.transfer(Some(dest), chunk, next, pass, &mut body),
            Some(Branch::Break { dest }) => self.transfer(dest, chunk, next, pass, &mut body),
            Some(Branch::Conditional {
                truthy,
                comparison,
                falsey,
            }) => {
                comparison.render_jump(&label(self.script, truthy), &mut body)?;
                pass.targets.insert(truthy);
                self.transfer(falsey, chunk, next, pass, &mut body)
            }
            None => self.transfer(chunk.return_id, chunk, next, pass, &mut body),
        };

        if !falls_through {
            body.push('\n');
        }
        Ok(body)
    }

    /// Transfers control to `dest`, eliding the jump when `dest` is the
    /// next chunk. Returns whether control falls through.
    fn transfer(
        &self,
        dest: Option<ChunkId>,
        chunk: &Chunk<'a>,
        next: Option<ChunkId>,
        pass: &mut BodyPass,
        body: &mut String,
    ) -> bool {
        match dest {
            Some(dest) if Some(dest) == next => true,
            Some(dest) => {
                pass.targets.insert(dest);
                body.push_str("\tgoto ");
                body.push_str(&label(self.script, dest));
                body.push('\n');
                false
            }
            None => {
                match chunk.exit {
                    Some(command) => render_command(command, body),
                    None => body.push_str("\tend\n"),
                }
                false
            }
        }
    }
}

fn render_command(command: &Command, out: &mut String) {
    out.push('\t');
    out.push_str(&command.to_string());
    out.push('\n');
}

/// Renders a raw statement verbatim.
pub fn render_raw(raw: &RawStatement) -> String {
    format!("{}\n", raw.value)
}

/// Renders a text block: its label, then one `.string` line per line of
/// the value.
pub fn render_text(text: &Text) -> String {
    let mut out = format!("{}:\n", text.name);
    for line in text.value.split('\n') {
        out.push_str(&format!("\t.string \"{}\"\n", line));
    }
    out
}
