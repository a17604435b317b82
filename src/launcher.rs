//! Launching external resources (IDE URIs, browser URLs).

use crate::error::{GitspaceError, Result};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Opens an external URI on behalf of the user.
pub trait Launcher {
    fn open(&self, uri: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OpenCommand {
    program: PathBuf,
    prefix_args: Vec<OsString>,
}

impl OpenCommand {
    /// Full argument list for opening `uri`. The URI is always one argument.
    fn args_for(&self, uri: &str) -> Vec<OsString> {
        let mut args = self.prefix_args.clone();
        args.push(OsString::from(uri));
        args
    }
}

/// Hands URIs to the platform's default handler.
#[derive(Debug, Clone)]
pub struct SystemLauncher {
    command: OpenCommand,
}

impl SystemLauncher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            command: command_for_os(std::env::consts::OS)?,
        })
    }
}

impl Launcher for SystemLauncher {
    fn open(&self, uri: &str) -> Result<()> {
        if uri.trim().is_empty() {
            return Err(GitspaceError::Launch {
                uri: uri.to_string(),
                reason: "no URL available for this gitspace".to_string(),
            });
        }

        let args = self.command.args_for(uri);
        tracing::debug!(program = %self.command.program.display(), uri, "launching");

        let status = Command::new(&self.command.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| GitspaceError::Launch {
                uri: uri.to_string(),
                reason: e.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(GitspaceError::Launch {
                uri: uri.to_string(),
                reason: format!("{} exited with {}", self.command.program.display(), status),
            })
        }
    }
}

fn command_for_os(target_os: &str) -> Result<OpenCommand> {
    match target_os {
        "macos" => Ok(OpenCommand {
            program: PathBuf::from("open"),
            prefix_args: Vec::new(),
        }),
        "linux" | "freebsd" | "openbsd" | "netbsd" => Ok(OpenCommand {
            program: PathBuf::from("xdg-open"),
            prefix_args: Vec::new(),
        }),
        // Not `cmd /C start`: URLs come from the server and cmd would split them on `&`.
        "windows" => Ok(OpenCommand {
            program: PathBuf::from("rundll32"),
            prefix_args: vec![OsString::from("url.dll,FileProtocolHandler")],
        }),
        _ => Err(GitspaceError::Launch {
            uri: String::new(),
            reason: format!("opening URLs is unsupported on `{target_os}`"),
        }),
    }
}
