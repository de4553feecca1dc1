//! Interaction animation.
//!
//! Two halves share the payload type:
//!
//! - [`requester`]: client used by the checker to ask for a video
//! - [`server`]: the video generation service behind that endpoint,
//!   running [`pipeline::VideoPipeline`] (images → script → render → upload)

pub mod jobs;
pub mod molecule;
pub mod payload;
pub mod pipeline;
pub mod renderer;
pub mod requester;
pub mod script;
pub mod server;
pub mod storage;

pub use jobs::{JobStart, JobState, JobTable};
pub use molecule::{ImageSource, MoleculeImageFetcher};
pub use payload::AnimationPayload;
pub use pipeline::{video_key, PipelineError, PipelineResult, VideoPipeline};
pub use renderer::{ManimRenderer, Renderer, DEFAULT_RENDER_TIMEOUT};
pub use requester::{AnimationError, AnimationOutcome, AnimationRequester, AnimationResult};
pub use script::ScriptWriter;
pub use server::{router, serve, AppState};
pub use storage::{HttpObjectStore, LocalObjectStore, ObjectStore};
