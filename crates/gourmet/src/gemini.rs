//! Gemini client: grounded web-search fallback and restaurant chat.
//!
//! Both operations call `POST {base}/v1beta/models/{model}:generateContent`
//! with the Google Search tool enabled. Search asks the model for a JSON
//! array of restaurants; the grounding metadata becomes source citations.

use async_trait::async_trait;
use mineruca_core::chat::{ChatMessage, ChatRole};
use mineruca_core::prefecture::split_address;
use mineruca_core::restaurant::SourceCitation;
use mineruca_core::search::{
    FallbackResult, ProviderError, RestaurantSearchProvider, SearchQuery, SearchResult,
};
use serde::{Deserialize, Serialize};

use crate::config::GourmetConfig;
use crate::error::{execute, GourmetError};

pub const PROVIDER_NAME: &str = "gemini";

const CHAT_SYSTEM_PROMPT: &str = "あなたはレストラン選びを手伝うアシスタントです。\
簡潔に日本語で答えてください。分からないことは推測せず、分からないと答えてください。";

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: serde_json::Value,
}

impl Content {
    fn text(role: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            role: role.map(String::from),
            parts: vec![Part {
                text: Some(text.into()),
            }],
        }
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    uri: String,
    #[serde(default)]
    title: String,
}

/// One restaurant as the model is asked to describe it.
#[derive(Debug, Deserialize)]
struct ModelRestaurant {
    name: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    prefecture: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    hours: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    genre: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, config: &GourmetConfig) -> Self {
        Self {
            client,
            base_url: config.gemini_base_url.clone(),
            model: config.gemini_model.clone(),
            api_key: config.gemini_api_key.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Ask the model to find restaurants for `query` using web search.
    pub async fn search_restaurants(
        &self,
        query: &SearchQuery,
    ) -> Result<Vec<SearchResult>, GourmetError> {
        let request = GenerateRequest {
            contents: vec![Content::text(Some("user"), build_search_prompt(query))],
            tools: vec![google_search_tool()],
            system_instruction: None,
        };
        let response = self.generate(&request).await?;
        parse_search_response(response)
    }

    /// Answer a chat message, optionally about a specific favorite.
    ///
    /// `history` should already be trimmed to the configured window.
    pub async fn chat(
        &self,
        history: &[ChatMessage],
        message: &str,
        context: Option<&str>,
    ) -> Result<String, GourmetError> {
        let mut system = CHAT_SYSTEM_PROMPT.to_string();
        if let Some(context) = context {
            system.push_str("\n\n以下のお店についての質問です。\n");
            system.push_str(context);
        }

        let mut contents: Vec<Content> = history
            .iter()
            .map(|m| {
                let role = match m.role {
                    ChatRole::User => "user",
                    ChatRole::Model => "model",
                };
                Content::text(Some(role), m.content.clone())
            })
            .collect();
        contents.push(Content::text(Some("user"), message.trim()));

        let request = GenerateRequest {
            contents,
            tools: vec![google_search_tool()],
            system_instruction: Some(Content::text(None, system)),
        };
        let response = self.generate(&request).await?;
        let reply = response_text(&response)?;
        if reply.trim().is_empty() {
            return Err(GourmetError::Parse("Empty reply from model".to_string()));
        }
        Ok(reply)
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, GourmetError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(GourmetError::NotConfigured("Gemini API"))?;

        let call = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", key)])
            .json(request);
        Ok(execute("gemini", call).await?.json().await?)
    }
}

#[async_trait]
impl RestaurantSearchProvider for GeminiClient {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, ProviderError> {
        self.search_restaurants(query)
            .await
            .map_err(|e| e.into_provider_error(PROVIDER_NAME))
    }
}

// ---------------------------------------------------------------------------
// Prompt and parsing
// ---------------------------------------------------------------------------

fn google_search_tool() -> Tool {
    Tool {
        google_search: serde_json::json!({}),
    }
}

fn build_search_prompt(query: &SearchQuery) -> String {
    let mut conditions = vec![format!("都道府県: {}", query.prefecture.trim())];
    if let Some(area) = query.area_name.as_deref().filter(|a| !a.trim().is_empty()) {
        conditions.push(format!("エリア: {}", area.trim()));
    }
    if let Some(genre) = query.genre_name.as_deref().filter(|g| !g.trim().is_empty()) {
        conditions.push(format!("ジャンル: {}", genre.trim()));
    }
    if let Some(keyword) = query.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
        conditions.push(format!("キーワード: {}", keyword.trim()));
    }

    format!(
        "次の条件に合う実在の飲食店をWeb検索で調べてください。\n{}\n\n\
         結果は次の形式のJSON配列のみで答えてください。説明文は不要です。\n\
         [{{\"name\": \"店名\", \"address\": \"都道府県から始まる住所\", \
         \"prefecture\": \"都道府県\", \"city\": \"市区町村\", \"hours\": \"営業時間\", \
         \"website\": \"公式サイトのURL\", \"genre\": \"ジャンル\"}}]\n\
         見つからない場合は [] と答えてください。",
        conditions.join("\n")
    )
}

/// Concatenate the text parts of the first candidate.
fn response_text(response: &GenerateResponse) -> Result<String, GourmetError> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        return Err(GourmetError::Provider(format!("Prompt blocked: {reason}")));
    }
    let candidate = response
        .candidates
        .first()
        .ok_or_else(|| GourmetError::Parse("No candidates in response".to_string()))?;
    Ok(candidate
        .content
        .as_ref()
        .map(|c| {
            c.parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default())
}

fn citations(response: &GenerateResponse) -> Vec<SourceCitation> {
    let mut out: Vec<SourceCitation> = Vec::new();
    let chunks = response
        .candidates
        .first()
        .and_then(|c| c.grounding_metadata.as_ref())
        .map(|m| m.grounding_chunks.as_slice())
        .unwrap_or_default();
    for web in chunks.iter().filter_map(|c| c.web.as_ref()) {
        if !out.iter().any(|s| s.uri == web.uri) {
            out.push(SourceCitation {
                uri: web.uri.clone(),
                title: web.title.clone(),
            });
        }
    }
    out
}

/// Pull the JSON array out of the model's reply.
///
/// Accepts a bare array, an array inside a fenced code block, or an array
/// surrounded by prose.
fn extract_json_array(text: &str) -> Option<&str> {
    let body = match text.find("```") {
        Some(start) => {
            let after = &text[start + 3..];
            let after = after.strip_prefix("json").unwrap_or(after);
            match after.find("```") {
                Some(end) => &after[..end],
                None => after,
            }
        }
        None => text,
    };
    let start = body.find('[')?;
    let end = body.rfind(']')?;
    (start < end).then(|| &body[start..=end])
}

fn parse_search_response(response: GenerateResponse) -> Result<Vec<SearchResult>, GourmetError> {
    let text = response_text(&response)?;
    let sources = citations(&response);

    let Some(json) = extract_json_array(&text) else {
        if text.contains("[]") || text.trim().is_empty() {
            return Ok(Vec::new());
        }
        return Err(GourmetError::Parse(
            "Model reply did not contain a JSON array".to_string(),
        ));
    };
    let items: Vec<ModelRestaurant> =
        serde_json::from_str(json).map_err(|e| GourmetError::Parse(e.to_string()))?;

    Ok(items
        .into_iter()
        .filter(|item| !item.name.trim().is_empty())
        .map(|item| {
            let (prefecture, city) = split_address(&item.address);
            SearchResult::Fallback(FallbackResult {
                name: item.name.trim().to_string(),
                address: item.address.trim().to_string(),
                prefecture: prefecture.or(non_blank(item.prefecture)),
                city: city.or(non_blank(item.city)),
                hours: item.hours.unwrap_or_default(),
                website: non_blank(item.website),
                genre: non_blank(item.genre),
                sources: sources.clone(),
            })
        })
        .collect())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
