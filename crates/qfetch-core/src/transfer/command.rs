//! Fetch by shelling out to an external downloader (e.g. `curl -o`).

use std::path::Path;
use std::process::Command;

use super::{Fetcher, TransferError};

/// Default argv template for the external downloader.
pub const DEFAULT_COMMAND: [&str; 6] = ["curl", "-sS", "-L", "-o", "{output}", "{url}"];

/// Runs an argv template with `{url}` and `{output}` substituted. No shell
/// is involved, so URLs need no quoting.
#[derive(Debug, Clone)]
pub struct CommandFetcher {
    argv: Vec<String>,
}

impl Default for CommandFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND.iter().map(|s| s.to_string()).collect())
    }
}

impl CommandFetcher {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    /// The argv for one transfer, placeholders substituted.
    pub fn render(&self, url: &str, dest: &Path) -> Vec<String> {
        let output = dest.to_string_lossy();
        self.argv
            .iter()
            .map(|arg| arg.replace("{url}", url).replace("{output}", &output))
            .collect()
    }
}

impl Fetcher for CommandFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64, TransferError> {
        let argv = self.render(url, dest);
        let Some((program, args)) = argv.split_first() else {
            return Err(TransferError::Command {
                program: String::new(),
                status: "empty downloader command".to_string(),
            });
        };

        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|e| TransferError::Command {
                program: program.clone(),
                status: e.to_string(),
            })?;
        if !status.success() {
            return Err(TransferError::Command {
                program: program.clone(),
                status: status.to_string(),
            });
        }
        Ok(std::fs::metadata(dest)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_placeholders() {
        let f = CommandFetcher::default();
        let argv = f.render("http://h/a b.bin", Path::new("/tmp/a b.bin"));
        assert_eq!(
            argv,
            ["curl", "-sS", "-L", "-o", "/tmp/a b.bin", "http://h/a b.bin"]
        );
    }

    #[test]
    fn empty_template_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let f = CommandFetcher::new(vec![]);
        let err = f.fetch("http://h/x", &dir.path().join("x")).unwrap_err();
        assert!(matches!(err, TransferError::Command { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn runs_command_and_reports_written_size() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        let f = CommandFetcher::new(
            ["sh", "-c", "printf '%s' \"$1\" > \"$2\"", "sh", "{url}", "{output}"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        let n = f.fetch("0123456789", &dest).unwrap();
        assert_eq!(n, 10);
        assert_eq!(std::fs::read(&dest).unwrap(), b"0123456789");
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let f = CommandFetcher::new(vec!["false".to_string()]);
        let err = f.fetch("http://h/x", &dir.path().join("x")).unwrap_err();
        assert!(matches!(err, TransferError::Command { ref program, .. } if program == "false"));
    }
}
