use std::time::Duration;

use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value as Json;
use tracing::debug;

use narra_index::{AnswerGenerator, QueryEmbedder, ServiceError};

use crate::prompt::grounded_answer_prompt;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const EMBEDDING_MODEL: &str = "gemini-embedding-001";
const GENERATION_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Gemini API client for both collaborator roles (embed + generate).
///
/// - API key from `GEMINI_API_KEY`, falling back to `GOOGLE_API_KEY`.
/// - One request-scoped timeout on the HTTP client; an elapsed timeout
///   surfaces as [`ServiceError::Timeout`], never a retry.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    http: Client,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    content: Content<'a>,
}

#[derive(Serialize)]
struct BatchEmbedEntry<'a> {
    model: String,
    content: Content<'a>,
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<BatchEmbedEntry<'a>>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

impl GeminiClient {
    /// Construct from an explicit API key and base URL.
    pub fn new(api_key: String, base_url: Option<String>) -> Result<Self, ServiceError> {
        let mut base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if base_url.ends_with('/') {
            base_url.pop();
        }
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ServiceError::Unavailable(format!("build http client: {e}")))?;
        Ok(Self {
            base_url,
            api_key,
            http,
        })
    }

    /// Construct using the API key from the environment.
    pub fn from_env() -> Result<Self, ServiceError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .map_err(|_| {
                ServiceError::Unavailable(
                    "no Gemini API key found; set GEMINI_API_KEY or GOOGLE_API_KEY".to_string(),
                )
            })?;
        Self::new(api_key, None)
    }

    fn model_url(&self, model: &str, op: &str) -> String {
        format!("{}/models/{model}:{op}", self.base_url)
    }

    fn post_json(&self, url: &str, payload: &impl Serialize) -> Result<Json, ServiceError> {
        debug!(url, "gemini request");
        let resp = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(payload)
            .send()
            .map_err(map_transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(ServiceError::Unavailable(format!(
                "gemini HTTP {status}: {body}"
            )));
        }
        resp.json::<Json>()
            .map_err(|e| ServiceError::InvalidResponse(format!("decode failed: {e}")))
    }

    /// Embed every text in one batch call, preserving order.
    ///
    /// Ingestion path: the whole corpus goes up in a single request, the
    /// way the index is built offline.
    pub fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ServiceError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let payload = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|t| BatchEmbedEntry {
                    model: format!("models/{EMBEDDING_MODEL}"),
                    content: Content {
                        parts: vec![Part { text: t }],
                    },
                })
                .collect(),
        };
        let url = self.model_url(EMBEDDING_MODEL, "batchEmbedContents");
        let body = self.post_json(&url, &payload)?;
        let vectors = parse_batch_embeddings(&body)?;
        if vectors.len() != texts.len() {
            return Err(ServiceError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                vectors.len()
            )));
        }
        Ok(vectors)
    }
}

impl QueryEmbedder for GeminiClient {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
        let payload = EmbedRequest {
            content: Content {
                parts: vec![Part { text }],
            },
        };
        let url = self.model_url(EMBEDDING_MODEL, "embedContent");
        let body = self.post_json(&url, &payload)?;
        parse_embedding(&body)
    }
}

impl AnswerGenerator for GeminiClient {
    fn generate(&self, query: &str, narrative: &str) -> Result<String, ServiceError> {
        let prompt = grounded_answer_prompt(query, narrative);
        let payload = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
        };
        let url = self.model_url(GENERATION_MODEL, "generateContent");
        let body = self.post_json(&url, &payload)?;
        parse_generation(&body)
    }
}

fn map_transport_error(e: reqwest::Error) -> ServiceError {
    if e.is_timeout() {
        ServiceError::Timeout
    } else {
        ServiceError::Unavailable(format!("request failed: {e}"))
    }
}

fn vector_from_values(values: &Json) -> Result<Vec<f32>, ServiceError> {
    let arr = values
        .as_array()
        .ok_or_else(|| ServiceError::InvalidResponse("embedding values not an array".into()))?;
    let mut out = Vec::with_capacity(arr.len());
    for v in arr {
        let f = v
            .as_f64()
            .ok_or_else(|| ServiceError::InvalidResponse("non-numeric embedding value".into()))?;
        out.push(f as f32);
    }
    if out.is_empty() {
        return Err(ServiceError::InvalidResponse(
            "empty embedding vector".into(),
        ));
    }
    Ok(out)
}

/// `{"embedding": {"values": [...]}}`
fn parse_embedding(body: &Json) -> Result<Vec<f32>, ServiceError> {
    let values = body
        .pointer("/embedding/values")
        .ok_or_else(|| ServiceError::InvalidResponse("missing embedding.values".into()))?;
    vector_from_values(values)
}

/// `{"embeddings": [{"values": [...]}, ...]}`
fn parse_batch_embeddings(body: &Json) -> Result<Vec<Vec<f32>>, ServiceError> {
    let embeddings = body
        .get("embeddings")
        .and_then(Json::as_array)
        .ok_or_else(|| ServiceError::InvalidResponse("missing embeddings array".into()))?;
    embeddings
        .iter()
        .map(|e| {
            let values = e
                .get("values")
                .ok_or_else(|| ServiceError::InvalidResponse("embedding without values".into()))?;
            vector_from_values(values)
        })
        .collect()
}

/// First text part of the first candidate.
fn parse_generation(body: &Json) -> Result<String, ServiceError> {
    let text = body
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Json::as_str)
        .ok_or_else(|| ServiceError::InvalidResponse("no candidate text in response".into()))?;
    if text.trim().is_empty() {
        return Err(ServiceError::InvalidResponse(
            "candidate text is empty".into(),
        ));
    }
    Ok(text.to_string())
}
