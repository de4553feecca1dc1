//! Molecule structure images.

use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use tracing::debug;
use url::Url;

use crate::pipeline::{PipelineError, PipelineResult};

/// Default PUG REST base URL.
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://pubchem.ncbi.nlm.nih.gov/rest/pug";

/// Writes a structure image for a SMILES string to a file.
pub trait ImageSource: Send + Sync {
    fn fetch(&self, smiles: &str, dest: &Path) -> PipelineResult<()>;
}

/// Fetches PNG depictions from PubChem.
pub struct MoleculeImageFetcher {
    client: HttpClient,
    base_url: Url,
}

impl MoleculeImageFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> PipelineResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| PipelineError::Config(format!("{}: {}", base_url, e)))?;
        let client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    /// `{base}/compound/smiles/PNG`
    pub fn png_url(&self) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["compound", "smiles", "PNG"]);
        }
        url
    }
}

impl ImageSource for MoleculeImageFetcher {
    fn fetch(&self, smiles: &str, dest: &Path) -> PipelineResult<()> {
        let url = self.png_url();
        debug!(%url, smiles, "fetching structure image");

        // SMILES may contain '/' and '#', so it goes in the form body
        let response = self
            .client
            .post(url)
            .form(&[("smiles", smiles)])
            .send()
            .map_err(|e| PipelineError::Images(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Images(format!(
                "status {} for {}",
                status.as_u16(),
                smiles
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| PipelineError::Images(e.to_string()))?;
        if bytes.is_empty() {
            return Err(PipelineError::Images(format!("empty image for {}", smiles)));
        }
        fs::write(dest, &bytes)?;
        Ok(())
    }
}
