use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fixed renderer parameters, serialized onto the renderer command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfiguration {
    pub body: String,
    pub latitude: f64,
    pub longitude: f64,
    pub geometry: String,
    pub projection: String,
    pub num_times: u32,
    pub label: bool,
}

impl Default for RenderConfiguration {
    fn default() -> Self {
        Self {
            body: "earth".to_string(),
            latitude: 0.0,
            longitude: -112.0,
            geometry: "800x508".to_string(),
            projection: "rectangular".to_string(),
            num_times: 1,
            label: false,
        }
    }
}

/// Successful outcome of a generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedImage {
    /// Path relative to the static-serving root, e.g. `img/earth.png`.
    pub public_path: String,
    /// Whether the cloud refresh ran and succeeded during this call.
    pub refreshed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Working directory for the child only; the server's own cwd is never touched.
    pub working_dir: Option<PathBuf>,
}

impl ProcessCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn display_program(&self) -> String {
        self.program.display().to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the child was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// stdout 與 stderr 合併，用於診斷訊息
    pub fn combined(&self) -> String {
        match (self.stdout.trim(), self.stderr.trim()) {
            ("", "") => String::new(),
            (out, "") => out.to_string(),
            ("", err) => err.to_string(),
            (out, err) => format!("{}\n{}", out, err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessPoint {
    pub ssid: String,
    pub mac: String,
    pub channel: Option<u32>,
    pub signal_level: Option<i32>,
    pub security: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinRequest {
    pub ssid: String,
    #[serde(default)]
    pub password: String,
}
