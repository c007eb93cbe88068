//! `waveline check`: reports inconsistencies between rows, data maps and
//! references.

use std::path::Path;

use crate::pipeline::load_document;
use crate::{CheckArgs, GlobalArgs};

/// Runs the `waveline check` command.
///
/// Returns exit code 0 when the document is consistent, 1 otherwise.
pub fn run(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let diagram = load_document(Path::new(&args.path))?;
    let issues = diagram.check();

    if args.json {
        let messages: Vec<String> = issues.iter().map(|i| i.to_string()).collect();
        println!("{}", serde_json::to_string_pretty(&messages)?);
    } else {
        for issue in &issues {
            eprintln!("warning: {issue}");
        }
        if !global.quiet {
            if issues.is_empty() {
                eprintln!("   Checked {}: no issues", args.path);
            } else {
                eprintln!("   Checked {}: {} issue(s)", args.path, issues.len());
            }
        }
    }

    Ok(if issues.is_empty() { 0 } else { 1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn global() -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config: None,
        }
    }

    #[test]
    fn clean_document_passes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("d.json");
        std::fs::write(
            &path,
            r#"{"signals": [{"name": "clk", "type": "clock"}, {"name": "a", "type": "bit", "baseClock": "clk"}]}"#,
        )
        .unwrap();
        let args = CheckArgs {
            path: path.to_str().unwrap().to_string(),
            json: false,
        };
        assert_eq!(run(&args, &global()).unwrap(), 0);
    }

    #[test]
    fn bad_base_clock_fails() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("d.json");
        std::fs::write(
            &path,
            r#"{"signals": [{"name": "a", "type": "bit", "baseClock": "nope"}]}"#,
        )
        .unwrap();
        let args = CheckArgs {
            path: path.to_str().unwrap().to_string(),
            json: true,
        };
        assert_eq!(run(&args, &global()).unwrap(), 1);
    }
}
