//! Sidecar inference client
//!
//! POSTs decoded samples as JSON to a model server and reads back
//! `{"predictions": [{"label": ..., "score": ...}]}`. One instance serves one
//! modality.

use super::{ClassifyError, EmotionClassifier, LabelScore, Modality, Sample};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Request body sent to the sidecar
#[derive(Debug, Serialize)]
#[serde(tag = "modality", rename_all = "lowercase")]
enum ClassifyRequest<'a> {
    Face {
        width: u32,
        height: u32,
        /// Base64 of packed RGB8 pixels
        pixels_b64: String,
    },
    Voice {
        sample_rate: u32,
        samples: &'a [f32],
    },
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    #[serde(default)]
    predictions: Vec<LabelScore>,
}

/// Emotion classifier backed by an HTTP model server
pub struct HttpClassifier {
    http_client: reqwest::Client,
    endpoint: String,
    modality: Modality,
}

impl HttpClassifier {
    pub fn new(http_client: reqwest::Client, endpoint: impl Into<String>, modality: Modality) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
            modality,
        }
    }
}

#[async_trait]
impl EmotionClassifier for HttpClassifier {
    async fn classify(&self, sample: &Sample) -> Result<Vec<LabelScore>, ClassifyError> {
        if sample.modality() != self.modality {
            return Err(ClassifyError::UnsupportedModality(sample.modality()));
        }

        let body = match sample {
            Sample::Face(frame) => ClassifyRequest::Face {
                width: frame.width,
                height: frame.height,
                pixels_b64: base64::engine::general_purpose::STANDARD.encode(&frame.rgb),
            },
            Sample::Voice(clip) => ClassifyRequest::Voice {
                sample_rate: clip.sample_rate,
                samples: &clip.samples,
            },
        };

        tracing::debug!(
            modality = %self.modality,
            endpoint = %self.endpoint,
            "Invoking classifier sidecar"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClassifyError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClassifyError::Status(status.as_u16(), error_text));
        }

        let parsed: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| ClassifyError::Parse(e.to_string()))?;

        Ok(parsed.predictions)
    }
}
