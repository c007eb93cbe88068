//! Shared helpers for CLI commands: configuration lookup and document I/O.

use std::path::{Path, PathBuf};

use waveline_config::DiagramConfig;
use waveline_model::Diagram;

use crate::GlobalArgs;

/// Loads editor configuration.
///
/// If `--config` names a file it is loaded directly; a directory is searched
/// for `waveline.toml`. Otherwise the current directory is searched. A
/// missing file yields the built-in defaults.
pub fn resolve_config(global: &GlobalArgs) -> Result<DiagramConfig, Box<dyn std::error::Error>> {
    match global.config {
        Some(ref path) => {
            let p = PathBuf::from(path);
            if p.is_file() {
                Ok(waveline_config::load_config_file(&p)?)
            } else if p.is_dir() {
                Ok(waveline_config::load_config(&p)?)
            } else {
                Err(format!("config path '{path}' does not exist").into())
            }
        }
        None => Ok(waveline_config::load_config(&std::env::current_dir()?)?),
    }
}

/// Reads a document, naming the file in the error.
pub fn load_document(path: &Path) -> Result<Diagram, Box<dyn std::error::Error>> {
    waveline_model::load_file(path)
        .map_err(|e| format!("{}: {e}", path.display()).into())
}

/// Writes `diagram` to `output`, or back to `input` when no output is given.
pub fn store_document(
    diagram: &Diagram,
    input: &Path,
    output: Option<&str>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let target = output.map(PathBuf::from).unwrap_or_else(|| input.to_path_buf());
    waveline_model::save_file(diagram, &target)?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn global(config: Option<String>) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config,
        }
    }

    #[test]
    fn config_file_path() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("custom.toml");
        std::fs::write(&file, "[diagram]\ncycles = 8\n").unwrap();
        let config = resolve_config(&global(Some(file.to_str().unwrap().to_string()))).unwrap();
        assert_eq!(config.cycles, 8);
    }

    #[test]
    fn config_directory_without_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config =
            resolve_config(&global(Some(tmp.path().to_str().unwrap().to_string()))).unwrap();
        assert_eq!(config, DiagramConfig::default());
    }

    #[test]
    fn missing_config_path_errors() {
        assert!(resolve_config(&global(Some("/nonexistent/waveline.toml".into()))).is_err());
    }

    #[test]
    fn load_error_names_file() {
        let err = load_document(Path::new("/nonexistent/d.json")).unwrap_err();
        assert!(err.to_string().starts_with("/nonexistent/d.json"));
    }
}
