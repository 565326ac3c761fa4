use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::search::{build_prompt, ComparisonResult, GroundingChunk, SearchFilters};

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    tools: Vec<Tool>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

// Serializes as `{}`; presence of the field enables live web search.
#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "groundingMetadata")]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GroundingMetadata {
    #[serde(rename = "groundingChunks", default)]
    grounding_chunks: Vec<GroundingChunk>,
}

/// Client for the Generative Language `generateContent` endpoint.
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn with_config(base_url: String, model: String, api_key: String) -> Self {
        GeminiClient {
            base_url,
            model,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Run one grounded product search. Any failure is fatal to this
    /// attempt; the caller surfaces it as a single error message.
    pub async fn search(&self, filters: &SearchFilters) -> Result<ComparisonResult> {
        let prompt = build_prompt(filters);
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
            generation_config: GenerationConfig { temperature: 0.1 },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to reach Gemini API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Gemini API returned {}: {}", status, body);
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to decode Gemini response")?;

        let candidate = parsed.candidates.into_iter().next();

        let summary: String = candidate
            .as_ref()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let sources = candidate
            .and_then(|c| c.grounding_metadata)
            .map(|m| m.grounding_chunks)
            .unwrap_or_default();

        let summary = if summary.is_empty() {
            "No results found.".to_string()
        } else {
            summary
        };

        Ok(ComparisonResult { summary, sources })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: "find me a phone" }],
            }],
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
            generation_config: GenerationConfig { temperature: 0.1 },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "find me a phone");
        assert_eq!(json["tools"][0]["google_search"], serde_json::json!({}));
        assert_eq!(json["generationConfig"]["temperature"], 0.1);
    }

    #[test]
    fn test_response_decodes_summary_and_sources() {
        let body = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "| A |\n" }, { "text": "done" }] },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "https://amazon.in/x", "title": "Listing" } },
                        { "retrievedContext": { "uri": "ignored" } }
                    ]
                }
            }]
        });

        let parsed: GenerateContentResponse = serde_json::from_value(body).unwrap();
        let candidate = &parsed.candidates[0];
        let text: String = candidate
            .content
            .as_ref()
            .unwrap()
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(text, "| A |\ndone");

        let chunks = &candidate.grounding_metadata.as_ref().unwrap().grounding_chunks;
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].web.is_some());
        assert!(chunks[1].web.is_none());
    }

    #[test]
    fn test_empty_candidates_decode() {
        let parsed: GenerateContentResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(parsed.candidates.is_empty());
    }
}
