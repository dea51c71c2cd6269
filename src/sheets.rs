//! Read-only access to a Google Sheets worksheet using a service account key.

use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Url;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::YaalaError;

const SHEETS_API: &str = "https://sheets.googleapis.com/";
const SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: u64 = 3600;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Anything that can hand out all cells of a worksheet as strings, row by row.
pub trait SheetSource {
    fn fetch_rows(&self, spreadsheet_id: &str, worksheet: &str)
    -> Result<Vec<Vec<String>>, YaalaError>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, YaalaError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Session with the Sheets API. Built once at startup and handed to the loader.
pub struct SheetsClient {
    http: Client,
    key: ServiceAccountKey,
}

impl SheetsClient {
    pub fn new(key: ServiceAccountKey) -> Result<Self, YaalaError> {
        let http = Client::builder()
            .user_agent(concat!("yaala/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, key })
    }

    pub fn from_key_file(path: &Path) -> Result<Self, YaalaError> {
        debug!(path = %path.display(), "Reading service account key");
        Self::new(ServiceAccountKey::from_file(path)?)
    }

    fn assertion(&self, now: u64) -> Result<String, YaalaError> {
        let claims = Claims {
            iss: &self.key.client_email,
            scope: SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };
        let key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?;
        Ok(jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)?)
    }

    fn access_token(&self) -> Result<String, YaalaError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let assertion = self.assertion(now)?;
        let response: TokenResponse = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()?
            .error_for_status()?
            .json()?;
        debug!(account = %self.key.client_email, "Obtained access token");
        Ok(response.access_token)
    }
}

/// `values.get` URL for a whole worksheet. The sheet name is quoted so names
/// with spaces or non-latin characters are read as a range.
pub fn values_url(spreadsheet_id: &str, worksheet: &str) -> Result<Url, YaalaError> {
    let mut url = Url::parse(SHEETS_API)
        .map_err(|e| YaalaError::SourceUnavailable(format!("bad API url: {e}")))?;
    let range = format!("'{}'", worksheet.replace('\'', "''"));
    url.path_segments_mut()
        .map_err(|_| YaalaError::SourceUnavailable("bad API url".to_string()))?
        .extend(["v4", "spreadsheets", spreadsheet_id, "values", range.as_str()]);
    url.query_pairs_mut()
        .append_pair("majorDimension", "ROWS")
        .append_pair("valueRenderOption", "FORMATTED_VALUE");
    Ok(url)
}

impl SheetSource for SheetsClient {
    fn fetch_rows(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
    ) -> Result<Vec<Vec<String>>, YaalaError> {
        let url = values_url(spreadsheet_id, worksheet)?;
        let token = self.access_token()?;
        info!(%spreadsheet_id, %worksheet, "Fetching worksheet");
        let range: ValueRange = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()?
            .error_for_status()?
            .json()?;
        debug!(rows = range.values.len(), "Worksheet fetched");
        Ok(range.values)
    }
}
