//! `waveline insert-cycles` and `waveline delete-cycles`.

use std::path::Path;

use waveline_model::{parse_cycle_count, CycleScope};

use crate::pipeline::{load_document, store_document};
use crate::{CycleArgs, GlobalArgs};

fn scope(args: &CycleArgs) -> CycleScope {
    match args.signal {
        Some(ref name) => CycleScope::Signal(name.clone()),
        None => CycleScope::Global,
    }
}

/// Runs `waveline insert-cycles`.
pub fn run_insert(args: &CycleArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let n = parse_cycle_count(&args.count)?;
    let path = Path::new(&args.path);
    let mut diagram = load_document(path)?;
    diagram.insert_cycles(&scope(args), args.at, n)?;
    let target = store_document(&diagram, path, args.output.as_deref())?;
    if !global.quiet {
        eprintln!(
            "    Inserted {n} cycle(s) at {} ({} total) -> {}",
            args.at,
            diagram.config().cycles,
            target.display()
        );
    }
    Ok(0)
}

/// Runs `waveline delete-cycles`.
pub fn run_delete(args: &CycleArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let n = parse_cycle_count(&args.count)?;
    let path = Path::new(&args.path);
    let mut diagram = load_document(path)?;
    let edit = diagram.delete_cycles(&scope(args), args.at, n)?;
    let target = store_document(&diagram, path, args.output.as_deref())?;
    if !global.quiet {
        eprintln!(
            "     Deleted {n} cycle(s) at {} -> {}",
            args.at,
            target.display()
        );
        for m in &edit.purged_measures {
            eprintln!("     Removed measure {m}");
        }
        for a in &edit.purged_arrows {
            eprintln!("     Removed arrow {a}");
        }
    }
    Ok(0)
}
