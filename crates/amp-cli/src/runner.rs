//! Line-oriented driver: one engine-protocol input per line in, one result per line out.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::{info, info_span, trace, warn};

use amp_model::EngineInput;
use amp_transform::Transformation;

use crate::logging::redact_value;

/// Counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Non-blank input lines.
    pub lines: usize,
    pub transformed: usize,
    pub filtered: usize,
    /// Lines that were not a valid engine-protocol input.
    pub failed: usize,
}

/// Applies `transformation` to every non-blank line of `reader`.
///
/// Each readable line yields exactly one output line, filtered events
/// included. Unreadable lines are counted and skipped.
///
/// # Errors
///
/// Fails only on I/O errors while reading or writing.
pub fn run_lines<T, R, W>(transformation: &T, reader: R, mut writer: W) -> Result<RunStats>
where
    T: Transformation,
    R: BufRead,
    W: Write,
{
    let span = info_span!("run", transformation = transformation.name());
    let _guard = span.enter();
    let mut stats = RunStats::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line.context("read input line")?;
        let number = index + 1;
        if line.trim().is_empty() {
            continue;
        }
        stats.lines += 1;

        let mut input: EngineInput = match serde_json::from_str(&line) {
            Ok(input) => input,
            Err(error) => {
                warn!(line = number, %error, "skipping unreadable input line");
                trace!(line = number, content = redact_value(&line), "unreadable input");
                stats.failed += 1;
                continue;
            }
        };
        input.data.promote_atomic_timestamps();

        let output = transformation.run(&input);
        if output.filter_out {
            stats.filtered += 1;
        } else {
            stats.transformed += 1;
        }
        serde_json::to_writer(&mut writer, &output)
            .with_context(|| format!("write result for line {number}"))?;
        writer.write_all(b"\n").context("write result")?;
    }
    writer.flush().context("flush output")?;

    info!(
        lines = stats.lines,
        transformed = stats.transformed,
        filtered = stats.filtered,
        failed = stats.failed,
        "run complete"
    );
    Ok(stats)
}
