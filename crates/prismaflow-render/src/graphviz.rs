//! External Graphviz invocation.
//!
//! The DOT document is piped to `dot -K<engine> -Tsvg`. The program can be overridden with the
//! `PRISMAFLOW_DOT` environment variable.

use crate::error::{Error, Result};
use std::io::Write as _;
use std::process::{Command, Stdio};

pub const PROGRAM_ENV: &str = "PRISMAFLOW_DOT";
pub const DEFAULT_PROGRAM: &str = "dot";
/// Pinned positions (`pos="x,y!"`) are honoured by `neato`.
pub const DEFAULT_ENGINE: &str = "neato";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graphviz {
    pub program: String,
    pub engine: String,
}

impl Default for Graphviz {
    fn default() -> Self {
        let program = std::env::var(PROGRAM_ENV)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PROGRAM.to_string());
        Self {
            program,
            engine: DEFAULT_ENGINE.to_string(),
        }
    }
}

impl Graphviz {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            engine: DEFAULT_ENGINE.to_string(),
        }
    }

    /// Lays out and renders `dot` to SVG text.
    pub fn render_svg(&self, dot: &str) -> Result<String> {
        tracing::debug!(program = %self.program, engine = %self.engine, "running graphviz");
        let mut child = Command::new(&self.program)
            .arg(format!("-K{}", self.engine))
            .arg("-Tsvg")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| Error::GraphvizSpawn {
                program: self.program.clone(),
                source,
            })?;

        // Feed stdin from a separate thread so a large SVG cannot fill the stdout pipe while we
        // are still writing.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = dot.to_string();
            std::thread::spawn(move || stdin.write_all(input.as_bytes()))
        });

        let output = child.wait_with_output()?;
        if let Some(writer) = writer {
            match writer.join() {
                Ok(res) => {
                    if let Err(err) = res {
                        tracing::debug!(error = %err, "graphviz closed stdin early");
                    }
                }
                Err(_) => tracing::warn!("graphviz stdin writer panicked"),
            }
        }

        if !output.status.success() {
            return Err(Error::GraphvizFailed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        let svg = String::from_utf8(output.stdout)?;
        tracing::debug!(bytes = svg.len(), "graphviz finished");
        Ok(svg)
    }
}
