//! Gemini REST TTS backend implementation for Stillvox

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use stillvox_tts::{
    next_request_id, AudioData, SynthesisBackend, TtsConfig, TtsError, TtsResult,
    GEMINI_SAMPLE_RATE,
};
use tracing::debug;


const API_KEY_HEADER: &str = "x-goog-api-key";
const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Gemini `generateContent` client requesting the AUDIO response modality.
///
/// Returns raw mono 16-bit PCM at 24 kHz, base64-encoded inside the JSON
/// response. One client is shared by all synthesis workers.
pub struct GeminiTtsBackend {
    http: reqwest::Client,
    config: TtsConfig,
}

impl GeminiTtsBackend {
    pub fn new(config: TtsConfig) -> TtsResult<Self> {
        if config.api_key.is_empty() {
            return Err(TtsError::Configuration(format!(
                "no API key configured; set the {} environment variable",
                API_KEY_ENV
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| TtsError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Build a backend from `GEMINI_API_KEY`, other settings defaulted.
    pub fn from_env() -> TtsResult<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            TtsError::Configuration(format!("{} environment variable not set", API_KEY_ENV))
        })?;
        Self::new(TtsConfig {
            api_key,
            ..TtsConfig::default()
        })
    }

    pub fn config(&self) -> &TtsConfig {
        &self.config
    }

    fn request_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

fn build_request(text: &str, voice: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![RequestContent {
            parts: vec![RequestPart {
                text: text.to_string(),
            }],
        }],
        generation_config: GenerationConfig {
            response_modalities: vec!["AUDIO".to_string()],
            speech_config: SpeechConfig {
                voice_config: VoiceConfig {
                    prebuilt_voice_config: PrebuiltVoiceConfig {
                        voice_name: voice.to_string(),
                    },
                },
            },
        },
    }
}

fn classify_status(status: StatusCode, body: &str) -> TtsError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            TtsError::Auth(format!("HTTP {}: {}", status, body))
        }
        StatusCode::TOO_MANY_REQUESTS => TtsError::Quota(format!("HTTP {}: {}", status, body)),
        _ => TtsError::SynthesisFailed(format!("HTTP {}: {}", status, body)),
    }
}

fn extract_audio(response: GenerateContentResponse) -> TtsResult<AudioData> {
    let inline = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .find_map(|p| p.inline_data)
        .ok_or_else(|| {
            TtsError::InvalidResponse("response carries no inline audio data".to_string())
        })?;

    let pcm = BASE64
        .decode(inline.data.as_bytes())
        .map_err(|e| TtsError::InvalidResponse(format!("bad base64 audio payload: {}", e)))?;
    if pcm.is_empty() {
        return Err(TtsError::InvalidResponse(
            "backend returned empty audio".to_string(),
        ));
    }

    Ok(AudioData {
        pcm,
        sample_rate: GEMINI_SAMPLE_RATE,
        channels: 1,
    })
}

#[async_trait]
impl SynthesisBackend for GeminiTtsBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn synthesize(&self, text: &str, voice: &str) -> TtsResult<AudioData> {
        if text.trim().is_empty() {
            return Err(TtsError::InvalidInput("empty text input".to_string()));
        }

        let request_id = next_request_id();
        debug!(
            request_id,
            voice,
            chars = text.len(),
            model = %self.config.model,
            "requesting synthesis"
        );

        let response = self
            .http
            .post(self.request_url())
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&build_request(text, voice))
            .send()
            .await
            .map_err(|e| TtsError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| TtsError::InvalidResponse(e.to_string()))?;
        let audio = extract_audio(parsed)?;

        debug!(
            request_id,
            bytes = audio.pcm.len(),
            seconds = audio.duration().as_secs_f64(),
            "synthesis complete"
        );
        Ok(audio)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
    speech_config: SpeechConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    #[allow(dead_code)]
    mime_type: String,
    data: String,
}
