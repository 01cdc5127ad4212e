// Client discovery - finds the running League client and its API credentials

#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

use super::error::LocateError;
use super::types::ConnectionInfo;

pub const DEFAULT_PROCESS_NAME: &str = "LeagueClientUx";
pub const APP_PORT_FLAG: &str = "--app-port=";
pub const AUTH_TOKEN_FLAG: &str = "--remoting-auth-token=";
const LOCKFILE_NAMES: [&str; 3] = ["lockfile", "LeagueClientUx.lockfile", "LeagueClient.lockfile"];

#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x08000000;

/// Anything that can produce connection details on demand.
///
/// Called again every time the gateway has lost its connection, so
/// implementations must not cache a stale result.
pub trait ConnectionSource: Send + Sync {
  fn locate(&self) -> Result<ConnectionInfo, LocateError>;
}

/// Finds the client through the OS process list, falling back to the
/// lockfile in any configured install directory.
#[derive(Debug, Clone)]
pub struct ConnectionLocator {
  process_name: String,
  install_dirs: Vec<PathBuf>,
}

impl Default for ConnectionLocator {
  fn default() -> Self {
    Self::new(DEFAULT_PROCESS_NAME, Vec::new())
  }
}

impl ConnectionLocator {
  pub fn new(process_name: impl Into<String>, install_dirs: Vec<PathBuf>) -> Self {
    Self {
      process_name: process_name.into(),
      install_dirs,
    }
  }

  fn locate_process(&self) -> Result<ConnectionInfo, LocateError> {
    let command_lines = list_command_lines(&self.process_name)?;
    if command_lines.is_empty() {
      return Err(LocateError::ProcessNotFound(self.process_name.clone()));
    }

    // Several helper processes share the name; take the first with both flags.
    let mut last_err = LocateError::ProcessNotFound(self.process_name.clone());
    for line in &command_lines {
      match parse_command_line(line) {
        Ok((port, token)) => return Ok(ConnectionInfo::from_port_token(port, &token)),
        Err(e) => last_err = e,
      }
    }
    Err(last_err)
  }

  fn locate_lockfile(&self) -> Result<ConnectionInfo, LocateError> {
    for dir in &self.install_dirs {
      for name in LOCKFILE_NAMES {
        let path = dir.join(name);
        let Ok(content) = std::fs::read_to_string(&path) else {
          continue;
        };
        if let Some((port, token)) = parse_lockfile(&content) {
          debug!(path = %path.display(), "using lockfile credentials");
          return Ok(ConnectionInfo::from_port_token(port, &token));
        }
      }
    }
    Err(LocateError::LockfileNotFound)
  }
}

impl ConnectionSource for ConnectionLocator {
  fn locate(&self) -> Result<ConnectionInfo, LocateError> {
    match self.locate_process() {
      Ok(info) => Ok(info),
      Err(process_err) if !self.install_dirs.is_empty() => {
        debug!(error = %process_err, "process discovery failed, trying lockfiles");
        self.locate_lockfile()
      }
      Err(process_err) => Err(process_err),
    }
  }
}

/// A preconfigured endpoint, used to point the pipeline at a mock server.
#[derive(Debug, Clone)]
pub struct FixedEndpoint(pub ConnectionInfo);

impl ConnectionSource for FixedEndpoint {
  fn locate(&self) -> Result<ConnectionInfo, LocateError> {
    Ok(self.0.clone())
  }
}

/// Extract `(port, token)` from a client command line.
///
/// Accepts both a shell-style line and the quoted Windows form
/// (`"--app-port=1234" "--remoting-auth-token=abc"`).
pub fn parse_command_line(line: &str) -> Result<(u16, String), LocateError> {
  let port = flag_value(line, APP_PORT_FLAG)
    .and_then(|v| v.parse::<u16>().ok())
    .ok_or(LocateError::MissingArgument("--app-port"))?;
  let token = flag_value(line, AUTH_TOKEN_FLAG)
    .filter(|t| !t.is_empty())
    .ok_or(LocateError::MissingArgument("--remoting-auth-token"))?;
  Ok((port, token.to_string()))
}

fn flag_value<'a>(line: &'a str, flag: &str) -> Option<&'a str> {
  // The flag must start an argument: `--riotclient-app-port=` is a different flag.
  let (index, _) = line.match_indices(flag).find(|(index, _)| {
    line[..*index]
      .chars()
      .next_back()
      .map_or(true, |c| c == '"' || c.is_whitespace())
  })?;
  let rest = &line[index + flag.len()..];
  let end = rest
    .find(|c: char| c == '"' || c.is_whitespace())
    .unwrap_or(rest.len());
  Some(&rest[..end])
}

/// Parse `name:pid:port:password:protocol`.
pub fn parse_lockfile(content: &str) -> Option<(u16, String)> {
  let parts: Vec<&str> = content.trim().split(':').collect();
  if parts.len() < 5 {
    return None;
  }
  let port = parts[2].parse::<u16>().ok()?;
  let token = parts[3];
  if token.is_empty() {
    return None;
  }
  Some((port, token.to_string()))
}

#[cfg(target_os = "windows")]
fn list_command_lines(process_name: &str) -> Result<Vec<String>, LocateError> {
  let exe = format!("{}.exe", process_name);

  let mut command = Command::new("wmic");
  command.args([
    "process",
    "where",
    &format!("name='{}'", exe),
    "get",
    "CommandLine",
  ]);
  command.creation_flags(CREATE_NO_WINDOW);

  if let Ok(output) = command.output() {
    if output.status.success() {
      let stdout = String::from_utf8_lossy(&output.stdout);
      let lines = command_lines_from_output(&stdout, &exe);
      if !lines.is_empty() {
        return Ok(lines);
      }
    }
  }

  // wmic is missing on recent Windows builds
  let mut command = Command::new("powershell");
  command.creation_flags(CREATE_NO_WINDOW);
  command.args([
    "-NoProfile",
    "-Command",
    &format!(
      "Get-CimInstance Win32_Process -Filter \"name = '{}'\" | Select-Object -ExpandProperty CommandLine",
      exe
    ),
  ]);
  let output = command
    .output()
    .map_err(|e| LocateError::ProcessListing(e.to_string()))?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  Ok(command_lines_from_output(&stdout, &exe))
}

#[cfg(not(target_os = "windows"))]
fn list_command_lines(process_name: &str) -> Result<Vec<String>, LocateError> {
  let output = Command::new("ps")
    .args(["-A", "-ww", "-o", "args="])
    .output()
    .map_err(|e| LocateError::ProcessListing(e.to_string()))?;
  if !output.status.success() {
    return Err(LocateError::ProcessListing(format!(
      "ps exited with {}",
      output.status
    )));
  }
  let stdout = String::from_utf8_lossy(&output.stdout);
  Ok(command_lines_from_output(&stdout, process_name))
}

fn command_lines_from_output(stdout: &str, process_name: &str) -> Vec<String> {
  stdout
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty() && line.contains(process_name))
    .map(str::to_string)
    .collect()
}
