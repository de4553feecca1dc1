//! PubChem PUG REST resolver.

use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{CompoundResolver, ResolverError, ResolverResult};

/// Default PUG REST base URL.
pub const DEFAULT_PUBCHEM_BASE_URL: &str = "https://pubchem.ncbi.nlm.nih.gov/rest/pug";

/// Property requested from PubChem.
const SMILES_PROPERTY: &str = "CanonicalSMILES";

/// Resolver that queries PubChem by compound name.
pub struct PubChemResolver {
    client: HttpClient,
    base_url: Url,
}

impl PubChemResolver {
    /// Create a resolver with a bounded request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> ResolverResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ResolverError::InvalidEndpoint(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ResolverError::InvalidEndpoint(base_url.to_string()));
        }

        let client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Build the property URL for a name; the name is one encoded path segment.
    pub fn property_url(&self, name: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["compound", "name"])
                .push(name.trim())
                .extend(["property", SMILES_PROPERTY, "JSON"]);
        }
        url
    }
}

impl CompoundResolver for PubChemResolver {
    fn resolve_identifier(&self, name: &str) -> ResolverResult<Option<String>> {
        if name.trim().is_empty() {
            return Ok(None);
        }

        let url = self.property_url(name);
        debug!(%url, "querying PubChem");

        let response = self.client.get(url).send()?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST {
            return Ok(None);
        }
        if status.is_server_error() {
            return Err(ResolverError::Status(status.as_u16()));
        }
        if !status.is_success() {
            return Ok(None);
        }

        let body = response.text()?;
        Ok(parse_property_table(&body))
    }
}

#[derive(Debug, Deserialize)]
struct PropertyResponse {
    #[serde(rename = "PropertyTable")]
    property_table: Option<PropertyTable>,
}

#[derive(Debug, Deserialize)]
struct PropertyTable {
    #[serde(rename = "Properties", default)]
    properties: Vec<CompoundProperties>,
}

#[derive(Debug, Deserialize)]
struct CompoundProperties {
    #[serde(rename = "CanonicalSMILES")]
    canonical_smiles: Option<String>,
    #[serde(rename = "ConnectivitySMILES")]
    connectivity_smiles: Option<String>,
    #[serde(rename = "SMILES")]
    smiles: Option<String>,
}

/// Extract the first canonical SMILES from a property table body.
///
/// Any unexpected shape is treated as "not found".
pub fn parse_property_table(body: &str) -> Option<String> {
    let response: PropertyResponse = serde_json::from_str(body).ok()?;
    let first = response.property_table?.properties.into_iter().next()?;
    first
        .canonical_smiles
        .or(first.connectivity_smiles)
        .or(first.smiles)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PubChemResolver {
        PubChemResolver::new(DEFAULT_PUBCHEM_BASE_URL, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_property_url_encodes_name() {
        let url = resolver().property_url(" acetylsalicylic acid/x ");
        assert_eq!(
            url.as_str(),
            "https://pubchem.ncbi.nlm.nih.gov/rest/pug/compound/name/acetylsalicylic%20acid%2Fx/property/CanonicalSMILES/JSON"
        );
    }

    #[test]
    fn test_parse_property_table() {
        let body = r#"{"PropertyTable":{"Properties":[{"CID":2244,"CanonicalSMILES":"CC(=O)OC1=CC=CC=C1C(=O)O"}]}}"#;
        assert_eq!(
            parse_property_table(body),
            Some("CC(=O)OC1=CC=CC=C1C(=O)O".to_string())
        );
    }

    #[test]
    fn test_parse_property_table_new_field_name() {
        let body = r#"{"PropertyTable":{"Properties":[{"CID":2244,"ConnectivitySMILES":"CC(=O)OC1=CC=CC=C1C(=O)O"}]}}"#;
        assert_eq!(
            parse_property_table(body),
            Some("CC(=O)OC1=CC=CC=C1C(=O)O".to_string())
        );
    }

    #[test]
    fn test_parse_property_table_malformed() {
        assert_eq!(parse_property_table("not json"), None);
        assert_eq!(parse_property_table(r#"{"Fault":{"Code":"PUGREST.NotFound"}}"#), None);
        assert_eq!(parse_property_table(r#"{"PropertyTable":{"Properties":[]}}"#), None);
        assert_eq!(parse_property_table(r#"{"PropertyTable":{"Properties":[{"CID":1}]}}"#), None);
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(PubChemResolver::new("not a url", Duration::from_secs(1)).is_err());
    }
}
