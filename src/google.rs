use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::cleanup::CleanupRequest;
use crate::config::Config;
use crate::error::{AppError, AppResult};

/// The role both the prompt and the system instruction are sent under.
/// Vertex also accepts "model", which only matters for multi-turn chats.
pub const CONTENT_ROLE: &str = "user";

// Wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TranslateBody<'a> {
    source_language_code: &'a str,
    target_language_code: &'a str,
    contents: [&'a str; 1],
    mime_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateBody<'a> {
    contents: Content<'a>,
    system_instruction: Content<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

pub(crate) fn translate_body<'a>(config: &'a Config, html: &'a str) -> TranslateBody<'a> {
    TranslateBody {
        source_language_code: &config.source_lang,
        target_language_code: &config.target_lang,
        contents: [html],
        mime_type: "text/html",
    }
}

pub(crate) fn generate_body(request: &CleanupRequest) -> GenerateBody<'_> {
    GenerateBody {
        contents: Content {
            role: CONTENT_ROLE,
            parts: request
                .segments
                .iter()
                .map(|s| Part { text: s.as_str() })
                .collect(),
        },
        system_instruction: Content {
            role: CONTENT_ROLE,
            parts: vec![Part {
                text: &request.system_instruction,
            }],
        },
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error.message;
    }
    let body = body.trim();
    if body.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("HTTP {}: {}", status.as_u16(), body)
    }
}

fn parse_success<T: DeserializeOwned>(status: StatusCode, body: &str) -> AppResult<T> {
    if !status.is_success() {
        return Err(AppError::remote(error_message(status, body)));
    }
    serde_json::from_str(body).map_err(|e| AppError::remote(format!("unexpected response: {e}")))
}

pub fn parse_translate_response(status: StatusCode, body: &str) -> AppResult<String> {
    let parsed: TranslateResponse = parse_success(status, body)?;
    parsed
        .translations
        .into_iter()
        .next()
        .and_then(|t| t.translated_text)
        .ok_or_else(|| AppError::remote("response has no translatedText"))
}

pub fn parse_generate_response(status: StatusCode, body: &str) -> AppResult<String> {
    let parsed: GenerateResponse = parse_success(status, body)?;
    parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| AppError::remote("response has no candidate text"))
}

/// The two remote calls the form makes.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn translate(&self, project_id: &str, credential: &str, html: &str) -> AppResult<String>;

    async fn generate(
        &self,
        project_id: &str,
        credential: &str,
        request: &CleanupRequest,
    ) -> AppResult<String>;
}

pub struct GoogleClient {
    http: reqwest::Client,
    config: Config,
}

impl GoogleClient {
    pub fn new(config: Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()?;
        Ok(Self { http, config })
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        project_id: &str,
        credential: &str,
        body: &B,
    ) -> AppResult<(StatusCode, String)> {
        let resp = self
            .http
            .post(url)
            .bearer_auth(credential)
            .header("x-goog-user-project", project_id)
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .json(body)
            .send()
            .await?;
        let status = resp.status();
        let text = resp.text().await?;
        tracing::debug!(%url, status = status.as_u16(), bytes = text.len(), "response");
        Ok((status, text))
    }

    pub async fn translate_html(
        &self,
        project_id: &str,
        credential: &str,
        html: &str,
    ) -> AppResult<String> {
        let url = self.config.translate_endpoint(project_id);
        tracing::info!(chars = html.len(), from = %self.config.source_lang, to = %self.config.target_lang, "translateText");
        let body = translate_body(&self.config, html);
        let (status, text) = self.post(&url, project_id, credential, &body).await?;
        parse_translate_response(status, &text)
    }

    pub async fn generate_content(
        &self,
        project_id: &str,
        credential: &str,
        request: &CleanupRequest,
    ) -> AppResult<String> {
        let url = self.config.generate_endpoint(project_id);
        tracing::info!(segments = request.segments.len(), model = %self.config.vertex_model, "generateContent");
        let body = generate_body(request);
        let (status, text) = self.post(&url, project_id, credential, &body).await?;
        parse_generate_response(status, &text)
    }
}

#[async_trait]
impl Backend for GoogleClient {
    async fn translate(&self, project_id: &str, credential: &str, html: &str) -> AppResult<String> {
        self.translate_html(project_id, credential, html).await
    }

    async fn generate(
        &self,
        project_id: &str,
        credential: &str,
        request: &CleanupRequest,
    ) -> AppResult<String> {
        self.generate_content(project_id, credential, request).await
    }
}
