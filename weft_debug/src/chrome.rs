// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//! Render and commit phases become duration events, so interrupted render
//! phases show up as separate bars with gaps where the host ran other work.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use weft_core::time::{Duration, HostTime, Timebase};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
/// Events without a timestamp of their own (summaries, effect counts) are
/// placed at the most recent timestamp seen.
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut last = HostTime(0);

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::CycleScheduled(e) => {
                last = e.timestamp;
                events.push(json!({
                    "ph": "i",
                    "name": "CycleScheduled",
                    "cat": "Scheduler",
                    "ts": ticks_to_us(e.timestamp.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "cycle": e.cycle,
                        "cause": format!("{:?}", e.cause),
                        "superseded": e.superseded,
                    }
                }));
            }
            RecordedEvent::PhaseBegin(e) => {
                last = e.timestamp;
                events.push(json!({
                    "ph": "B",
                    "name": format!("{:?}", e.phase),
                    "cat": "Cycle",
                    "ts": ticks_to_us(e.timestamp.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "cycle": e.cycle,
                    }
                }));
            }
            RecordedEvent::PhaseEnd(e) => {
                last = e.timestamp;
                events.push(json!({
                    "ph": "E",
                    "name": format!("{:?}", e.phase),
                    "cat": "Cycle",
                    "ts": ticks_to_us(e.timestamp.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "cycle": e.cycle,
                    }
                }));
            }
            RecordedEvent::Slice(e) => {
                last = e.timestamp;
                let remaining = if e.remaining == Duration::MAX {
                    Value::Null
                } else {
                    json!(ticks_to_us(e.remaining.ticks(), timebase))
                };
                events.push(json!({
                    "ph": "i",
                    "name": "Slice",
                    "cat": "Scheduler",
                    "ts": ticks_to_us(e.timestamp.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "cycle": e.cycle,
                        "units": e.units,
                        "remaining_us": remaining,
                        "yielded": e.yielded,
                    }
                }));
            }
            RecordedEvent::CycleSummary(s) => {
                events.push(json!({
                    "ph": "i",
                    "name": "CycleSummary",
                    "cat": "Summary",
                    "ts": ticks_to_us(last.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "cycle": s.cycle,
                        "cause": format!("{:?}", s.cause),
                        "units": s.units,
                        "slices": s.slices,
                        "placements": s.placements,
                        "updates": s.updates,
                        "deletions": s.deletions,
                        "property_mutations": s.property_mutations,
                        "render_us": ticks_to_us(s.render_ticks, timebase),
                        "commit_us": ticks_to_us(s.commit_ticks, timebase),
                    }
                }));
            }
            RecordedEvent::FiberEffects {
                cycle,
                placements,
                updates,
                deletions,
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": "FiberEffects",
                    "cat": "Rich",
                    "ts": ticks_to_us(last.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "cycle": cycle,
                        "placements": placements,
                        "updates": updates,
                        "deletions": deletions,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use weft_core::trace::{
        CycleCause, CycleScheduledEvent, CycleSummary, PhaseBeginEvent, PhaseEndEvent, PhaseKind,
        SliceEvent, TraceSink,
    };

    fn parse(rec: &RecorderSink, timebase: Timebase) -> Vec<Value> {
        let mut out = Vec::new();
        export(rec.as_bytes(), timebase, &mut out).unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_cycle_scheduled(&CycleScheduledEvent {
            cycle: 1,
            cause: CycleCause::Render,
            superseded: None,
            timestamp: HostTime(1_000),
        });
        rec.on_phase_begin(&PhaseBeginEvent {
            cycle: 1,
            phase: PhaseKind::Render,
            timestamp: HostTime(1_000),
        });
        rec.on_phase_end(&PhaseEndEvent {
            cycle: 1,
            phase: PhaseKind::Render,
            timestamp: HostTime(1_250),
        });
        rec.on_slice(&SliceEvent {
            cycle: 1,
            units: 4,
            remaining: Duration::MAX,
            yielded: true,
            timestamp: HostTime(1_250),
        });

        let parsed = parse(&rec, Timebase::MICROS);
        assert_eq!(parsed.len(), 4);

        assert_eq!(parsed[0]["ph"], "i");
        assert_eq!(parsed[0]["name"], "CycleScheduled");
        assert_eq!(parsed[0]["args"]["cause"], "Render");

        assert_eq!(parsed[1]["ph"], "B");
        assert_eq!(parsed[1]["name"], "Render");
        assert_eq!(parsed[1]["ts"], 1_000.0);

        assert_eq!(parsed[2]["ph"], "E");
        assert_eq!(parsed[2]["ts"], 1_250.0);

        assert_eq!(parsed[3]["name"], "Slice");
        assert!(parsed[3]["args"]["remaining_us"].is_null());
        assert_eq!(parsed[3]["args"]["yielded"], true);
    }

    #[test]
    fn summary_uses_the_last_timestamp() {
        let mut rec = RecorderSink::new();
        rec.on_phase_end(&PhaseEndEvent {
            cycle: 2,
            phase: PhaseKind::Commit,
            timestamp: HostTime(5_000),
        });
        rec.on_cycle_summary(&CycleSummary {
            cycle: 2,
            cause: CycleCause::StateUpdate,
            units: 4,
            slices: 1,
            placements: 0,
            updates: 3,
            deletions: 0,
            property_mutations: 1,
            render_ticks: 2_000,
            commit_ticks: 10,
        });

        let parsed = parse(&rec, Timebase::NANOS);
        assert_eq!(parsed[1]["name"], "CycleSummary");
        assert_eq!(parsed[1]["ts"], 5.0);
        assert_eq!(parsed[1]["args"]["cause"], "StateUpdate");
        assert_eq!(parsed[1]["args"]["render_us"], 2.0);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], Timebase::NANOS, &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert!(parsed.is_empty());
    }
}
