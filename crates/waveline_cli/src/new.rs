//! `waveline new`: creates a document with a single clock.

use std::path::Path;

use tracing::debug;
use waveline_model::{Diagram, Signal};

use crate::pipeline::resolve_config;
use crate::{GlobalArgs, NewArgs};

/// Runs the `waveline new` command. Returns exit code 0 on success.
pub fn run(args: &NewArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let path = Path::new(&args.path);
    if path.exists() && !args.force {
        return Err(format!("'{}' already exists (use --force to overwrite)", args.path).into());
    }

    let mut config = resolve_config(global)?;
    if let Some(cycles) = args.cycles {
        if cycles == 0 || cycles > waveline_config::MAX_CYCLES {
            return Err(format!(
                "cycles must be between 1 and {}, got {cycles}",
                waveline_config::MAX_CYCLES
            )
            .into());
        }
        config.cycles = cycles;
    }
    debug!(cycles = config.cycles, period = %config.clock_period(), "new document");

    let mut diagram = Diagram::new(config);
    diagram.add_signal(Signal::clock(args.clock.as_str(), None), None)?;
    waveline_model::save_file(&diagram, path)?;

    if !global.quiet {
        eprintln!("     Created {}", path.display());
    }
    Ok(0)
}
