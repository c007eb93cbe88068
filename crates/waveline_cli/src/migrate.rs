//! `waveline migrate`: rewrites a document in the current layout.

use std::path::Path;

use waveline_model::FORMAT_VERSION;

use crate::pipeline::{load_document, store_document};
use crate::{GlobalArgs, MigrateArgs};

/// Runs the `waveline migrate` command.
pub fn run(args: &MigrateArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let input = Path::new(&args.input);
    let diagram = load_document(input)?;
    let target = store_document(&diagram, input, args.output.as_deref())?;
    if !global.quiet {
        eprintln!(
            "    Migrated {} -> {} (format {FORMAT_VERSION})",
            input.display(),
            target.display()
        );
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn migrates_flat_layout() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("old.json");
        let output = tmp.path().join("new.json");
        std::fs::write(
            &input,
            r#"{"version": "1.0", "signals": [{"name": "clk", "type": "clock"},
                {"name": "d", "type": "bus", "values": ["X", "A", null]}]}"#,
        )
        .unwrap();
        let args = MigrateArgs {
            input: input.to_str().unwrap().to_string(),
            output: Some(output.to_str().unwrap().to_string()),
        };
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: None,
        };
        assert_eq!(run(&args, &global).unwrap(), 0);

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["version"], "3.0");
        assert!(written["signals"].is_object());
        assert_eq!(written["rows"][1]["name"], "d");
        assert_eq!(written["signals"]["d"]["values"]["1"], "A");
    }
}
