use crate::core::staleness::StalenessTracker;
use crate::domain::model::{GeneratedImage, ProcessCommand, ProcessOutput, RenderConfiguration};
use crate::domain::ports::{Clock, ImageSource, ProcessRunner};
use crate::utils::error::{KioskError, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::Mutex;

/// Resolved filesystem locations and timing knobs for [`ImageGenerator`].
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub renderer: PathBuf,
    pub search_dir: PathBuf,
    pub config_file: PathBuf,
    pub refresh_script: PathBuf,
    pub refresh_working_dir: PathBuf,
    pub public_root: PathBuf,
    pub output_subdir: String,
    pub output_file_name: String,
    pub refresh_interval_minutes: u32,
    pub render_timeout: Option<Duration>,
}

impl GeneratorSettings {
    pub fn output_dir(&self) -> PathBuf {
        self.public_root.join(&self.output_subdir)
    }

    pub fn output_file(&self) -> PathBuf {
        self.output_dir().join(&self.output_file_name)
    }

    /// Render target; keeps the file extension so the renderer picks the same format.
    pub fn staging_file(&self) -> PathBuf {
        self.output_dir()
            .join(format!(".partial-{}", self.output_file_name))
    }

    pub fn public_path(&self) -> String {
        format!("{}/{}", self.output_subdir, self.output_file_name)
    }
}

/// Produces the planet image, refreshing cloud data first when it has gone stale.
///
/// Calls to [`generate`](Self::generate) are serialized: the tracker lives behind
/// the same mutex that gates the refresh/render sequence, so two overlapping
/// requests never run the external programs against the same files at once.
pub struct ImageGenerator<R: ProcessRunner, C: Clock> {
    runner: R,
    clock: C,
    settings: GeneratorSettings,
    render: RenderConfiguration,
    tracker: Mutex<StalenessTracker>,
}

impl<R: ProcessRunner, C: Clock> ImageGenerator<R, C> {
    pub fn new(runner: R, clock: C, settings: GeneratorSettings, render: RenderConfiguration) -> Self {
        let tracker = StalenessTracker::new(settings.refresh_interval_minutes);
        Self {
            runner,
            clock,
            settings,
            render,
            tracker: Mutex::new(tracker),
        }
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    pub async fn generate(&self) -> Result<GeneratedImage> {
        let mut tracker = self.tracker.lock().await;
        let now = self.clock.now();

        let mut refreshed = false;
        if tracker.is_refresh_due(now) {
            tracing::info!(
                "☁️ Cloud data is stale (last refresh: {:?}), running refresh",
                tracker.last_refresh()
            );
            match self.refresh().await {
                Ok(()) => {
                    tracker.record_refresh(now);
                    refreshed = true;
                    tracing::info!("✅ Cloud refresh completed");
                }
                Err(e) => {
                    // 不更新時間戳，下次呼叫會再試一次
                    tracing::warn!("⚠️ {} (rendering with existing data)", e);
                }
            }
        } else {
            tracing::debug!("Cloud data is fresh, skipping refresh");
        }

        self.render_image().await?;

        let public_path = self.settings.public_path();
        tracing::info!("🌍 Image ready at {}", public_path);
        Ok(GeneratedImage {
            public_path,
            refreshed,
        })
    }

    pub async fn is_refresh_due(&self) -> bool {
        let tracker = self.tracker.lock().await;
        tracker.is_refresh_due(self.clock.now())
    }

    pub async fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.tracker.lock().await.last_refresh()
    }

    async fn refresh(&self) -> Result<()> {
        let command = ProcessCommand::new(&self.settings.refresh_script)
            .current_dir(&self.settings.refresh_working_dir);

        tracing::debug!(
            "Running {} in {}",
            command.display_program(),
            self.settings.refresh_working_dir.display()
        );
        let output = self.runner.run(&command).await?;

        if output.success() {
            Ok(())
        } else {
            Err(KioskError::RefreshFailed {
                code: output.exit_code,
                output: output.combined(),
            })
        }
    }

    pub fn render_command(&self, output_file: &Path) -> ProcessCommand {
        let render = &self.render;
        let mut command = ProcessCommand::new(&self.settings.renderer).args([
            format!("-searchdir={}", self.settings.search_dir.display()),
            format!("-config={}", self.settings.config_file.display()),
            format!("-output={}", output_file.display()),
            format!("-body={}", render.body),
            format!("-latitude={}", render.latitude),
            format!("-longitude={}", render.longitude),
            format!("-geometry={}", render.geometry),
            format!("-projection={}", render.projection),
            format!("-num_times={}", render.num_times),
        ]);
        if render.label {
            command = command.arg("-label");
        }
        command
    }

    async fn render_image(&self) -> Result<()> {
        let output_dir = self.settings.output_dir();
        tokio::fs::create_dir_all(&output_dir)
            .await
            .map_err(|e| KioskError::filesystem(&output_dir, e))?;

        let staging = self.settings.staging_file();
        let command = self.render_command(&staging);
        tracing::debug!("Render command: {:?}", command.args);

        let outcome = self.run_render(&command).await.and_then(|output| {
            if output.success() {
                Ok(())
            } else {
                Err(KioskError::RenderFailed {
                    code: output.exit_code,
                    output: output.combined(),
                })
            }
        });

        match outcome {
            Ok(()) => {
                let target = self.settings.output_file();
                if let Err(e) = tokio::fs::rename(&staging, &target).await {
                    let err = KioskError::filesystem(&target, e);
                    tracing::error!("❌ {}", err);
                    discard_partial(&staging).await;
                    return Err(err);
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!("❌ {}", e);
                discard_partial(&staging).await;
                Err(e)
            }
        }
    }

    async fn run_render(&self, command: &ProcessCommand) -> Result<ProcessOutput> {
        match self.settings.render_timeout {
            Some(limit) => tokio::time::timeout(limit, self.runner.run(command))
                .await
                .unwrap_or(Err(KioskError::RenderTimedOut {
                    seconds: limit.as_secs(),
                })),
            None => self.runner.run(command).await,
        }
    }
}

async fn discard_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!("Removed partial output {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Could not remove partial output {}: {}", path.display(), e),
    }
}

#[async_trait::async_trait]
impl<R: ProcessRunner, C: Clock> ImageSource for ImageGenerator<R, C> {
    async fn current_image(&self) -> Result<GeneratedImage> {
        self.generate().await
    }
}
