use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

/// Post-processes a generated source file in place. Formatting is cosmetic,
/// so implementations report problems through logging and never fail.
pub trait SourceFormatter {
    fn format(&self, path: &Path);
}

/// Runs `gofmt -w` on each file when `gofmt` is on `PATH`.
#[derive(Debug, Clone)]
pub struct GoFmt {
    exe: Option<PathBuf>,
}

impl GoFmt {
    pub fn locate() -> Self {
        let exe = which::which("gofmt").ok();
        if exe.is_none() {
            warn!("gofmt not found on PATH, generated files are left unformatted");
        }
        GoFmt { exe }
    }
}

impl SourceFormatter for GoFmt {
    fn format(&self, path: &Path) {
        let Some(exe) = &self.exe else {
            return;
        };
        match Command::new(exe).arg("-w").arg(path).output() {
            Ok(out) if out.status.success() => debug!(file = %path.display(), "formatted"),
            Ok(out) => warn!(
                file = %path.display(),
                stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                "gofmt failed"
            ),
            Err(e) => warn!(file = %path.display(), error = %e, "could not run gofmt"),
        }
    }
}

/// Leaves files untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFormat;

impl SourceFormatter for NoFormat {
    fn format(&self, _path: &Path) {}
}
