//! The line-oriented driver loop: reads commands from a `BufRead`, drives a
//! `TriSet`, and tracks the `running` set of outstanding suggestions —
//! a driver concern, not a core one, per the engine's contract.

use std::collections::HashSet;
use std::io::{BufRead, Write};

use lattice_core::Point;
use lattice_engine::TriSet;
use tracing::{debug, warn};

use crate::command::{parse_command, Command};
use crate::error::DriverError;

/// Run the driver loop against `input`/`output` for a session of
/// dimension `n`. Returns once input is exhausted or a command is aborted.
pub fn run<R: BufRead, W: Write>(n: usize, mut input: R, mut output: W) -> Result<(), DriverError> {
    let mut ts = TriSet::new(n);
    let mut running: HashSet<Point> = HashSet::new();
    let mut line = String::new();

    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let cmd_line = trim_newline(&line);

        let Some(cmd) = parse_command(cmd_line) else {
            if !cmd_line.is_empty() {
                debug!(line = %cmd_line, "ignoring unrecognized command");
            }
            continue;
        };

        if cmd.takes_bitstring() {
            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            let bits = trim_newline(&line);
            let p = Point::parse(bits, n);
            running.remove(&p);

            let result = match cmd {
                Command::True => ts.mark_true(&p),
                Command::False => ts.mark_false(&p),
                Command::Improbable => ts.mark_improbable(&p),
                _ => unreachable!("takes_bitstring only set for labeling commands"),
            };

            match result {
                Ok(changed) => writeln!(output, "{}", changed as u8)?,
                Err(err) => {
                    warn!(error = %err, command = ?cmd, "contradictory label, aborting");
                    break;
                }
            }
            continue;
        }

        match cmd {
            Command::Summary => write_summary(&mut output, &ts, running.len())?,
            Command::ListTrue => dump(&mut output, ts.us().iter())?,
            Command::ListSuprema => dump(&mut output, ts.sup())?,
            Command::ListImprobable => dump(&mut output, ts.zs())?,
            Command::ListInfima => dump(&mut output, ts.inf())?,
            Command::ListFalse => dump(&mut output, ts.ds().iter())?,
            Command::ListRunning => dump(&mut output, running.iter())?,
            Command::NextU => {
                let s = next_fresh(|| ts.next_u(), &mut running);
                emit_point_or_blank(&mut output, &s)?;
            }
            Command::NextD => {
                let s = next_fresh(|| ts.next_d(), &mut running);
                emit_point_or_blank(&mut output, &s)?;
            }
            Command::Cancelled => {
                let decided: Vec<Point> = running
                    .iter()
                    .filter(|p| ts.is_decided(p))
                    .cloned()
                    .collect();
                for p in &decided {
                    writeln!(output, "{p}")?;
                    running.remove(p);
                }
                writeln!(output)?;
            }
            Command::Finalize => {
                ts.check_all();
                writeln!(output)?;
            }
            Command::True | Command::False | Command::Improbable => {
                unreachable!("handled above")
            }
        }
    }

    Ok(())
}

fn trim_newline(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

/// Pop suggestions until one is newly inserted into `running` (or the walk
/// is exhausted). The core does not filter by `running` itself — that
/// bookkeeping is this driver's job, per the engine's contract.
fn next_fresh(mut next: impl FnMut() -> Point, running: &mut HashSet<Point>) -> Point {
    loop {
        let s = next();
        if !s.is_present() || running.insert(s.clone()) {
            return s;
        }
    }
}

fn emit_point_or_blank<W: Write>(output: &mut W, p: &Point) -> std::io::Result<()> {
    if p.is_present() {
        writeln!(output, "{p}")
    } else {
        writeln!(output)
    }
}

fn dump<'a, W: Write>(
    output: &mut W,
    items: impl Iterator<Item = &'a Point>,
) -> std::io::Result<()> {
    for p in items {
        writeln!(output, "{p}")?;
    }
    writeln!(output)
}

fn write_summary<W: Write>(
    output: &mut W,
    ts: &TriSet,
    running_len: usize,
) -> std::io::Result<()> {
    writeln!(output, "{}", ts.us().len())?;
    writeln!(output, "{}", ts.sup().len())?;
    writeln!(output, "{}", ts.zs().len())?;
    writeln!(output, "{}", ts.inf().len())?;
    writeln!(output, "{}", ts.ds().len())?;
    writeln!(output, "{running_len}")?;
    writeln!(output, "{}", best_hier_str(ts.us().best_hier()))?;
    writeln!(output, "{}", best_hier_str(ts.ds().best_hier()))
}

/// `best_hier` is "min popcount, or +inf if empty" per the spec; the
/// textual protocol renders that sentinel as `usize::MAX`.
fn best_hier_str(v: Option<usize>) -> String {
    v.unwrap_or(usize::MAX).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_str(n: usize, input: &str) -> String {
        let mut out = Vec::new();
        run(n, Cursor::new(input.as_bytes()), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn true_false_roundtrip() {
        let out = run_str(4, "true\n1111\nfalse\n0000\nsummary\n");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "1");
        assert_eq!(lines[1], "1");
        // summary: us, sup, zs, inf, ds, running, best_hier(us), best_hier(ds)
        assert_eq!(&lines[2..10], ["1", "0", "0", "0", "1", "0", "4", "0"]);
    }

    #[test]
    fn marking_already_true_returns_zero() {
        let out = run_str(4, "true\n1111\ntrue\n1111\n");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec!["1", "0"]);
    }

    #[test]
    fn contradiction_aborts_loop() {
        let out = run_str(4, "true\n1100\nfalse\n1000\nsummary\n");
        let lines: Vec<&str> = out.lines().collect();
        // "true" succeeds, "false" fails silently (no "0"/"1" emitted,
        // loop aborts), so "summary" never runs.
        assert_eq!(lines, vec!["1"]);
    }

    #[test]
    fn list_true_dumps_blank_terminated() {
        let out = run_str(4, "true\n1100\nlist true\n");
        assert_eq!(out, "1\n1100\n\n");
    }

    #[test]
    fn next_u_returns_blank_when_exhausted_for_null_session() {
        // N too small to have any structure: immediately exhausted walk on
        // an empty store still terminates and emits blank.
        let out = run_str(1, "next u\n");
        assert_eq!(out, "\n");
    }

    #[test]
    fn unknown_command_is_ignored() {
        let out = run_str(4, "bogus\ntrue\n1111\n");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec!["1"]);
    }

    #[test]
    fn cancelled_reports_decided_and_clears_them() {
        let out = run_str(
            4,
            "next u\ntrue\n0000\ncancelled\n",
        );
        // whatever next_u suggested (likely "0000" itself, the bottom) is
        // now decided and should be reported by "cancelled".
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.last(), Some(&""));
    }

    #[test]
    fn finalize_emits_blank_terminator() {
        let out = run_str(4, "finalize\n");
        assert_eq!(out, "\n");
    }
}
