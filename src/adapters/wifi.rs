use crate::domain::model::{AccessPoint, ProcessCommand};
use crate::domain::ports::{ProcessRunner, WifiManager};
use crate::utils::error::{KioskError, Result};
use async_trait::async_trait;
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Other(String),
}

impl Platform {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "linux" => Platform::Linux,
            "macos" => Platform::MacOs,
            other => Platform::Other(other.to_string()),
        }
    }

    fn name(&self) -> &str {
        match self {
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
            Platform::Other(name) => name,
        }
    }
}

/// Scans and joins networks with the platform's own tools
/// (`nmcli` on Linux, `airport`/`networksetup` on macOS).
pub struct ShellWifiManager<R: ProcessRunner> {
    runner: R,
    platform: Platform,
    interface: String,
    airport_path: String,
}

impl<R: ProcessRunner> ShellWifiManager<R> {
    pub fn new(runner: R, platform: Platform, interface: String, airport_path: String) -> Self {
        Self {
            runner,
            platform,
            interface,
            airport_path,
        }
    }

    fn unsupported(&self, operation: &str) -> KioskError {
        KioskError::Unsupported {
            operation: operation.to_string(),
            platform: self.platform.name().to_string(),
        }
    }
}

#[async_trait]
impl<R: ProcessRunner> WifiManager for ShellWifiManager<R> {
    async fn scan(&self) -> Result<Vec<AccessPoint>> {
        let command = match self.platform {
            Platform::Linux => ProcessCommand::new("nmcli").args([
                "-t",
                "-f",
                "SSID,BSSID,CHAN,SIGNAL,SECURITY",
                "device",
                "wifi",
                "list",
            ]),
            Platform::MacOs => ProcessCommand::new(&self.airport_path).arg("-s"),
            Platform::Other(_) => return Err(self.unsupported("Wi-Fi scan")),
        };

        let output = self
            .runner
            .run(&command)
            .await
            .map_err(|e| KioskError::WifiScanFailed {
                message: e.to_string(),
            })?;
        if !output.success() {
            return Err(KioskError::WifiScanFailed {
                message: output.combined(),
            });
        }

        let access_points = match self.platform {
            Platform::MacOs => parse_airport(&output.stdout),
            _ => parse_nmcli(&output.stdout),
        };
        tracing::info!("📶 Found {} access points", access_points.len());
        tracing::debug!("Access points: {:?}", access_points);
        Ok(access_points)
    }

    async fn join(&self, ssid: &str, password: &str) -> Result<()> {
        // 每個參數獨立傳入，不經過 shell
        let mut command = match self.platform {
            Platform::Linux => {
                ProcessCommand::new("nmcli").args(["device", "wifi", "connect", ssid])
            }
            Platform::MacOs => ProcessCommand::new("networksetup").args([
                "-setairportnetwork",
                self.interface.as_str(),
                ssid,
            ]),
            Platform::Other(_) => return Err(self.unsupported("Wi-Fi join")),
        };
        if !password.is_empty() {
            command = match self.platform {
                Platform::Linux => command.args(["password", password]),
                _ => command.arg(password),
            };
        }

        let output = self
            .runner
            .run(&command)
            .await
            .map_err(|e| KioskError::WifiJoinFailed {
                ssid: ssid.to_string(),
                message: e.to_string(),
            })?;

        // networksetup exits 0 even on a bad password but prints the reason
        let reported_error = self.platform == Platform::MacOs
            && output.stdout.to_lowercase().contains("error");
        if !output.success() || reported_error {
            return Err(KioskError::WifiJoinFailed {
                ssid: ssid.to_string(),
                message: output.combined(),
            });
        }

        tracing::info!("✅ Joined network {}", ssid);
        Ok(())
    }
}

/// Splits one `nmcli -t` line on unescaped `:`.
fn split_terse(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            ':' => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

pub fn parse_nmcli(output: &str) -> Vec<AccessPoint> {
    output
        .lines()
        .filter_map(|line| {
            let fields = split_terse(line);
            if fields.len() < 5 {
                return None;
            }
            let ssid = fields[0].trim();
            if ssid.is_empty() {
                return None;
            }
            // nmcli reports 0-100 quality; convert to the dBm scale airport uses
            let signal_level = fields[3]
                .trim()
                .parse::<i32>()
                .ok()
                .map(|quality| quality / 2 - 100);
            Some(AccessPoint {
                ssid: ssid.to_string(),
                mac: fields[1].trim().to_lowercase(),
                channel: fields[2].trim().parse().ok(),
                signal_level,
                security: fields[4..].join(":").trim().to_string(),
            })
        })
        .collect()
}

pub fn parse_airport(output: &str) -> Vec<AccessPoint> {
    let Ok(bssid) = Regex::new(r"([0-9A-Fa-f]{2}(?::[0-9A-Fa-f]{2}){5})") else {
        return Vec::new();
    };

    output
        .lines()
        .filter_map(|line| {
            let found = bssid.find(line)?;
            let ssid = line[..found.start()].trim();
            if ssid.is_empty() {
                return None;
            }
            let mut rest = line[found.end()..].split_whitespace();
            let signal_level = rest.next().and_then(|v| v.parse().ok());
            let channel = rest
                .next()
                .and_then(|v| v.split(',').next())
                .and_then(|v| v.parse().ok());
            // HT 與 CC 欄位不需要
            let security = rest.skip(2).collect::<Vec<_>>().join(" ");
            Some(AccessPoint {
                ssid: ssid.to_string(),
                mac: found.as_str().to_lowercase(),
                channel,
                signal_level,
                security,
            })
        })
        .collect()
}
