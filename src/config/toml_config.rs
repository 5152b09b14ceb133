use crate::core::generator::GeneratorSettings;
use crate::domain::model::RenderConfiguration;
use crate::utils::error::{KioskError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub generator: GeneratorConfig,
    pub render: RenderConfiguration,
    pub wifi: WifiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Static-serving root; the rendered image lands underneath it.
    pub public_root: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            public_root: "../client/public".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub renderer: String,
    pub search_dir: String,
    pub config_file: String,
    pub refresh_script: String,
    /// Defaults to `search_dir` when unset.
    pub refresh_working_dir: Option<String>,
    pub output_subdir: String,
    pub output_file_name: String,
    pub refresh_interval_minutes: u32,
    /// No limit unless set.
    pub render_timeout_secs: Option<u64>,
    /// Background regeneration period; disabled unless set.
    pub periodic_interval_secs: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            renderer: "../../xplanet/build/bin/xplanet".to_string(),
            search_dir: "../../xplanet/sourceData".to_string(),
            config_file: "../../xplanet/xplanet.conf".to_string(),
            refresh_script: "../../xplanet/download_clouds.sh".to_string(),
            refresh_working_dir: None,
            output_subdir: "img".to_string(),
            output_file_name: "earth.png".to_string(),
            refresh_interval_minutes: 240,
            render_timeout_secs: None,
            periodic_interval_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiConfig {
    /// Interface passed to `networksetup` on macOS.
    pub interface: String,
    pub airport_path: String,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            interface: "en0".to_string(),
            airport_path: "/System/Library/PrivateFrameworks/Apple80211.framework/Versions/Current/Resources/airport".to_string(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置，相對路徑以設定檔所在目錄為基準
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| KioskError::filesystem(path, e))?;
        let mut config = Self::from_toml_str(&content)?;

        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let base = std::fs::canonicalize(&base).map_err(|e| KioskError::filesystem(&base, e))?;
        config.resolve_paths(&base);
        Ok(config)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| KioskError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${XPLANET_HOME})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| KioskError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Rewrites every relative path so it no longer depends on the process cwd.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |value: &mut String| {
            let path = Path::new(value.as_str());
            if path.is_relative() {
                *value = base.join(path).display().to_string();
            }
        };

        resolve(&mut self.server.public_root);
        resolve(&mut self.generator.renderer);
        resolve(&mut self.generator.search_dir);
        resolve(&mut self.generator.config_file);
        resolve(&mut self.generator.refresh_script);
        if let Some(dir) = self.generator.refresh_working_dir.as_mut() {
            resolve(dir);
        }
    }

    pub fn generator_settings(&self) -> GeneratorSettings {
        let generator = &self.generator;
        GeneratorSettings {
            renderer: PathBuf::from(&generator.renderer),
            search_dir: PathBuf::from(&generator.search_dir),
            config_file: PathBuf::from(&generator.config_file),
            refresh_script: PathBuf::from(&generator.refresh_script),
            refresh_working_dir: PathBuf::from(
                generator
                    .refresh_working_dir
                    .as_deref()
                    .unwrap_or(&generator.search_dir),
            ),
            public_root: PathBuf::from(&self.server.public_root),
            output_subdir: generator.output_subdir.clone(),
            output_file_name: generator.output_file_name.clone(),
            refresh_interval_minutes: generator.refresh_interval_minutes,
            render_timeout: generator.render_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn periodic_interval(&self) -> Option<Duration> {
        self.generator.periodic_interval_secs.map(Duration::from_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("server.host", &self.server.host)?;
        validation::validate_path("server.public_root", &self.server.public_root)?;

        let generator = &self.generator;
        validation::validate_path("generator.renderer", &generator.renderer)?;
        validation::validate_path("generator.search_dir", &generator.search_dir)?;
        validation::validate_path("generator.config_file", &generator.config_file)?;
        validation::validate_path("generator.refresh_script", &generator.refresh_script)?;
        if let Some(dir) = &generator.refresh_working_dir {
            validation::validate_path("generator.refresh_working_dir", dir)?;
        }
        validation::validate_file_name("generator.output_subdir", &generator.output_subdir)?;
        validation::validate_file_name("generator.output_file_name", &generator.output_file_name)?;
        validation::validate_positive_number(
            "generator.refresh_interval_minutes",
            u64::from(generator.refresh_interval_minutes),
            1,
        )?;
        if let Some(timeout) = generator.render_timeout_secs {
            validation::validate_positive_number("generator.render_timeout_secs", timeout, 1)?;
        }
        if let Some(period) = generator.periodic_interval_secs {
            validation::validate_positive_number("generator.periodic_interval_secs", period, 1)?;
        }

        let render = &self.render;
        validation::validate_non_empty_string("render.body", &render.body)?;
        validation::validate_range("render.latitude", render.latitude, -90.0, 90.0)?;
        validation::validate_range("render.longitude", render.longitude, -180.0, 180.0)?;
        validation::validate_geometry("render.geometry", &render.geometry)?;
        validation::validate_one_of(
            "render.projection",
            &render.projection,
            &[
                "ancient",
                "azimuthal",
                "bonne",
                "equal_area",
                "gnomonic",
                "hemisphere",
                "icosagnomonic",
                "lambert",
                "mercator",
                "mollweide",
                "orthographic",
                "peters",
                "polyconic",
                "rectangular",
                "tsc",
            ],
        )?;
        validation::validate_positive_number("render.num_times", u64::from(render.num_times), 1)?;

        validation::validate_non_empty_string("wifi.interface", &self.wifi.interface)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.generator.refresh_interval_minutes, 240);
        assert_eq!(config.render, RenderConfiguration::default());
        assert!(config.generator.render_timeout_secs.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let config = TomlConfig::from_toml_str(
            r#"
            [generator]
            refresh_interval_minutes = 30
            render_timeout_secs = 120

            [render]
            label = true
            "#,
        )
        .unwrap();

        assert_eq!(config.generator.refresh_interval_minutes, 30);
        assert_eq!(config.generator.render_timeout_secs, Some(120));
        assert!(config.render.label);
        assert_eq!(config.render.body, "earth");
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("PLANET_KIOSK_TEST_HOME", "/opt/xplanet");
        let config = TomlConfig::from_toml_str(
            r#"
            [generator]
            renderer = "${PLANET_KIOSK_TEST_HOME}/bin/xplanet"
            search_dir = "${PLANET_KIOSK_TEST_UNDEFINED}/data"
            "#,
        )
        .unwrap();

        assert_eq!(config.generator.renderer, "/opt/xplanet/bin/xplanet");
        assert_eq!(config.generator.search_dir, "${PLANET_KIOSK_TEST_UNDEFINED}/data");
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = TomlConfig::default();
        config.generator.refresh_interval_minutes = 0;
        assert!(matches!(
            config.validate(),
            Err(KioskError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_unknown_projection_rejected() {
        let mut config = TomlConfig::default();
        config.render.projection = "cylindrical".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_paths_keeps_absolute() {
        let mut config = TomlConfig::default();
        config.generator.renderer = "/usr/bin/xplanet".to_string();
        config.resolve_paths(Path::new("/srv/kiosk/server"));

        assert_eq!(config.generator.renderer, "/usr/bin/xplanet");
        assert_eq!(
            PathBuf::from(&config.generator.search_dir),
            Path::new("/srv/kiosk/server").join("../../xplanet/sourceData")
        );
    }

    #[test]
    fn test_refresh_working_dir_falls_back_to_search_dir() {
        let config = TomlConfig::default();
        let settings = config.generator_settings();
        assert_eq!(settings.refresh_working_dir, settings.search_dir);
        assert_eq!(settings.public_path(), "img/earth.png");
    }
}
