//! `waveline info`: prints the rows of a document and what they hold.

use std::fmt::Write as _;
use std::path::Path;

use waveline_model::{Diagram, RowRef};

use crate::pipeline::load_document;
use crate::{FileArgs, GlobalArgs};

/// Runs the `waveline info` command.
pub fn run(args: &FileArgs, _global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let diagram = load_document(Path::new(&args.path))?;
    print!("{}", summarize(&diagram));
    Ok(0)
}

/// Renders the summary text.
pub fn summarize(diagram: &Diagram) -> String {
    let config = diagram.config();
    let projector = diagram.projector();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "cycles: {}  period: {}  rows: {}",
        config.cycles,
        config.clock_period(),
        diagram.rows().total_rows()
    );
    for (index, row) in diagram.rows().iter().enumerate() {
        let detail = match row {
            RowRef::Signal(name) => diagram
                .signal_by_name(name)
                .map(|s| {
                    let clock = s
                        .base_clock
                        .as_deref()
                        .map(|c| format!(" @{c}"))
                        .unwrap_or_default();
                    format!("{} {} values{clock}", s.kind(), s.values().len())
                })
                .unwrap_or_default(),
            RowRef::Measure(name) => diagram
                .measure(name)
                .map(|m| {
                    let span = projector
                        .measure_duration(name)
                        .map(|t| format!(" = {t:.3}{}", config.clock_period_unit))
                        .unwrap_or_default();
                    format!("'{}' {} -> {}{span}", m.text, m.from, m.to)
                })
                .unwrap_or_default(),
            RowRef::Group(name) => diagram
                .group(name)
                .map(|g| g.measures.join(", "))
                .unwrap_or_default(),
            RowRef::Text(name) => diagram
                .text(name)
                .map(|t| format!("'{}'", t.text))
                .unwrap_or_default(),
            RowRef::Counter(name) => diagram
                .counter(name)
                .map(|c| format!("{} start points", c.values.len()))
                .unwrap_or_default(),
            RowRef::AcTable(name) => diagram
                .ac_table(name)
                .map(|t| format!("{} entries", t.entries.len()))
                .unwrap_or_default(),
            RowRef::CycleNumbers(name) => diagram
                .cycle_numbers(name)
                .map(|n| format!("from {}", n.first))
                .unwrap_or_default(),
        };
        let _ = writeln!(out, "{index:>3}  {row}  {detail}");
    }
    let arrows = diagram.arrows().count();
    if arrows > 0 {
        let _ = writeln!(out, "arrows: {arrows}");
    }
    out
}
