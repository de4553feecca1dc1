//! Video rendering.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use ddi_llm::SCENE_NAME;
use tokio::process::Command;
use tracing::{debug, info};

use crate::pipeline::{PipelineError, PipelineResult};

/// Quality directory Manim writes for `-ql`.
const LOW_QUALITY_DIR: &str = "480p15";

/// Turns a script file into a video file.
pub trait Renderer: Send + Sync {
    /// Render `script` and return the path of the produced video.
    fn render(&self, script: &Path, output_name: &str) -> PipelineResult<PathBuf>;
}

/// Default limit on a single render.
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(300);

/// Renders with the Manim command-line tool.
///
/// A render that outlives `timeout` is killed.
pub struct ManimRenderer {
    bin: String,
    timeout: Duration,
}

impl ManimRenderer {
    pub fn new(bin: impl Into<String>, timeout: Duration) -> Self {
        Self {
            bin: bin.into(),
            timeout,
        }
    }

    async fn run(&self, script: &Path, work_dir: &Path, output_name: &str) -> PipelineResult<Output> {
        let child = Command::new(&self.bin)
            .kill_on_drop(true)
            .current_dir(work_dir)
            .arg("-ql")
            .arg(script)
            .arg(SCENE_NAME)
            .arg("-o")
            .arg(output_name)
            .arg("--disable_preview")
            .output();

        tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| {
                PipelineError::Render(format!(
                    "{} timed out after {}s",
                    self.bin,
                    self.timeout.as_secs_f32()
                ))
            })?
            .map_err(|e| PipelineError::Render(format!("failed to start {}: {}", self.bin, e)))
    }

    /// Where Manim writes a low-quality render of `script`.
    pub fn output_path(script: &Path, output_name: &str) -> PathBuf {
        let work_dir = script.parent().unwrap_or_else(|| Path::new("."));
        let stem = script
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        work_dir
            .join("media")
            .join("videos")
            .join(stem)
            .join(LOW_QUALITY_DIR)
            .join(output_name)
    }
}

impl Renderer for ManimRenderer {
    fn render(&self, script: &Path, output_name: &str) -> PipelineResult<PathBuf> {
        let work_dir = script.parent().unwrap_or_else(|| Path::new("."));
        debug!(bin = %self.bin, script = %script.display(), "starting render");

        // Called from blocking threads; the child gets its own small runtime
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let output = runtime.block_on(self.run(script, work_dir, output_name))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: Vec<&str> = stderr.lines().rev().take(5).collect();
            return Err(PipelineError::Render(format!(
                "{} exited with {}: {}",
                self.bin,
                output.status,
                tail.into_iter().rev().collect::<Vec<_>>().join(" | ")
            )));
        }

        let video = Self::output_path(script, output_name);
        if !video.exists() {
            return Err(PipelineError::Render(format!(
                "expected output not found at {}",
                video.display()
            )));
        }

        info!(video = %video.display(), "render finished");
        Ok(video)
    }
}
