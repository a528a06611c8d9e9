use std::path::Path;
use std::process::Command;

use super::errors::DownloadError;

/// How to invoke yt-dlp: a native binary, or `python -m yt_dlp`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    /// Arguments that precede every invocation (e.g., `-m yt_dlp`)
    pub prefix_args: Vec<String>,
}

impl ToolCommand {
    pub fn binary(path: impl Into<String>) -> Self {
        Self {
            program: path.into(),
            prefix_args: Vec::new(),
        }
    }

    pub fn python_module(python: impl Into<String>) -> Self {
        Self {
            program: python.into(),
            prefix_args: vec!["-m".to_string(), "yt_dlp".to_string()],
        }
    }

    /// Full argument list for one run
    pub fn args(&self, args: Vec<String>) -> Vec<String> {
        let mut all = self.prefix_args.clone();
        all.extend(args);
        all
    }

    /// Display form for logs
    pub fn describe(&self) -> String {
        if self.prefix_args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.prefix_args.join(" "))
        }
    }

    /// `--version` output, if the command runs
    pub fn version(&self) -> Option<String> {
        let output = Command::new(&self.program)
            .args(self.args(vec!["--version".to_string()]))
            .output()
            .ok()?;

        if !output.status.success() {
            return None;
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if version.is_empty() {
            None
        } else {
            Some(version)
        }
    }
}

pub struct ToolManager {
    python: String,
}

impl ToolManager {
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
        }
    }

    /// Resolve the yt-dlp command.
    ///
    /// An explicit path wins. Otherwise the native binary is preferred, and the
    /// Python module is the last resort.
    pub fn locate(&self, explicit: Option<&str>) -> Result<ToolCommand, DownloadError> {
        if let Some(path) = explicit {
            tracing::debug!("[Tools] Using configured yt-dlp: {}", path);
            return Ok(ToolCommand::binary(path));
        }

        if let Some(path) = self.find_binary() {
            tracing::debug!("[Tools] Found yt-dlp binary at {}", path);
            return Ok(ToolCommand::binary(path));
        }

        if self.python_has_module("yt_dlp") {
            tracing::debug!("[Tools] Falling back to {} -m yt_dlp", self.python);
            return Ok(ToolCommand::python_module(self.python.clone()));
        }

        Err(DownloadError::ToolNotFound(
            "install yt-dlp (https://github.com/yt-dlp/yt-dlp) or pass --yt-dlp <PATH>"
                .to_string(),
        ))
    }

    fn find_binary(&self) -> Option<String> {
        let common_paths = [
            "/opt/homebrew/bin/yt-dlp", // Homebrew on Apple Silicon
            "/usr/local/bin/yt-dlp",    // Homebrew on Intel Mac
            "/usr/bin/yt-dlp",          // System installation
        ];

        for path in common_paths {
            if Path::new(path).exists() {
                return Some(path.to_string());
            }
        }

        let lookup = if cfg!(windows) { "where" } else { "which" };
        let output = Command::new(lookup).arg("yt-dlp").output().ok()?;
        if !output.status.success() {
            return None;
        }

        String::from_utf8(output.stdout)
            .ok()?
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_string)
    }

    fn python_has_module(&self, module: &str) -> bool {
        let code = format!("import {}", module);
        match Command::new(&self.python).args(["-c", &code]).output() {
            Ok(out) => out.status.success(),
            Err(_) => false,
        }
    }
}
