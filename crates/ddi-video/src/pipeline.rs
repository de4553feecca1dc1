//! Video generation pipeline.
//!
//! Pipeline: validate → structure images → script → render → upload
//!
//! Every run works in its own temporary directory, removed when the run ends.

use std::fs;
use std::path::PathBuf;

use ddi_llm::TextGenerator;
use thiserror::Error;
use tracing::{error, info};

use crate::molecule::ImageSource;
use crate::payload::AnimationPayload;
use crate::renderer::Renderer;
use crate::requester::AnimationError;
use crate::script::ScriptWriter;
use crate::storage::ObjectStore;

/// Script file written for the renderer.
const SCRIPT_FILE: &str = "drug_interaction.py";

/// Video file name passed to the renderer.
const VIDEO_FILE: &str = "drug_interaction.mp4";

/// Pipeline errors, one per stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Structure image error: {0}")]
    Images(String),

    #[error("Script generation error: {0}")]
    Script(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Object key for a rendered pair.
pub fn video_key(payload: &AnimationPayload) -> String {
    format!("drug_videos/{}_interaction.mp4", payload.idempotency_key())
}

/// Produces an interaction video and returns its public URL.
pub struct VideoPipeline {
    images: Box<dyn ImageSource>,
    scripts: ScriptWriter<Box<dyn TextGenerator>>,
    renderer: Box<dyn Renderer>,
    store: Box<dyn ObjectStore>,
    work_dir: PathBuf,
}

impl VideoPipeline {
    pub fn new(
        images: Box<dyn ImageSource>,
        generator: Box<dyn TextGenerator>,
        renderer: Box<dyn Renderer>,
        store: Box<dyn ObjectStore>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            images,
            scripts: ScriptWriter::new(generator),
            renderer,
            store,
            work_dir: work_dir.into(),
        }
    }

    /// Run the whole pipeline for one payload.
    pub fn generate(&self, payload: &AnimationPayload) -> PipelineResult<String> {
        payload.validate_for_render().map_err(|e| match e {
            AnimationError::MissingField(field) => PipelineError::MissingField(field),
            other => PipelineError::Config(other.to_string()),
        })?;

        let key = video_key(payload);
        match self.run(payload, &key) {
            Ok(url) => {
                info!(key = %key, url = %url, "video generated");
                Ok(url)
            }
            Err(e) => {
                error!(key = %key, error = %e, "video generation failed");
                Err(e)
            }
        }
    }

    fn run(&self, payload: &AnimationPayload, key: &str) -> PipelineResult<String> {
        fs::create_dir_all(&self.work_dir)?;
        let job_dir = tempfile::Builder::new()
            .prefix("render-")
            .tempdir_in(&self.work_dir)?;

        let image1 = "drug1.png";
        let image2 = "drug2.png";
        self.images.fetch(&payload.smiles1, &job_dir.path().join(image1))?;
        self.images.fetch(&payload.smiles2, &job_dir.path().join(image2))?;

        let script = self.scripts.write_script(payload, image1, image2)?;
        let script_path = job_dir.path().join(SCRIPT_FILE);
        fs::write(&script_path, script)?;

        let video = self.renderer.render(&script_path, VIDEO_FILE)?;
        let url = self.store.put(key, &video)?;

        // Dropping the temp dir removes the local render as well
        job_dir.close()?;
        Ok(url)
    }
}
