//! JSON-over-HTTP binding for every collaborator.

use std::time::Duration;

use juror_types::{
    CapturedPhoto, EditionId, NationalId, OneTimeCode, PhoneNumber, Plate, PlateId,
    SessionToken, SubmissionReceipt, VoteDraft,
};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{
    ContentAnalyzer, GatewayError, OtpService, PlateLookup, SubmissionGateway, VoteRegistry,
};

/// HTTP client for the circuit backend.
///
/// Wraps `reqwest::Client` with the backend's base URL and provides one
/// typed method per collaborator call.
#[derive(Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChallengeRequest<'a> {
    national_id: &'a str,
}

#[derive(Serialize)]
struct CodeRequest {
    phone: String,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    phone: String,
    code: &'a str,
}

#[derive(Deserialize)]
struct VerifyResponse {
    token: String,
}

#[derive(Deserialize)]
struct VotedResponse {
    voted: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisRequest<'a> {
    width: u32,
    height: u32,
    preview: &'a str,
    pixels_hex: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest<'a> {
    presentation: f64,
    flavor: f64,
    experience: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
    photo: AnalysisRequest<'a>,
}

impl HttpGateway {
    /// Create a gateway targeting `base_url` (e.g. `http://127.0.0.1:8080`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| GatewayError::Unavailable(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, GatewayError> {
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), %body, "backend refused request");
        Err(classify_status(status, &body))
    }

    async fn json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }
}

/// Map a non-success status to an error. Client errors the backend uses to
/// say "no" become [`GatewayError::Rejected`] carrying the body text.
pub fn classify_status(status: StatusCode, body: &str) -> GatewayError {
    match status {
        StatusCode::BAD_REQUEST
        | StatusCode::UNAUTHORIZED
        | StatusCode::FORBIDDEN
        | StatusCode::CONFLICT
        | StatusCode::UNPROCESSABLE_ENTITY => {
            let reason = body.trim();
            if reason.is_empty() {
                GatewayError::Rejected(status.to_string())
            } else {
                GatewayError::Rejected(reason.to_string())
            }
        }
        other => GatewayError::Status(other.as_u16()),
    }
}

fn photo_body(photo: &CapturedPhoto) -> AnalysisRequest<'_> {
    AnalysisRequest {
        width: photo.width(),
        height: photo.height(),
        preview: photo.preview().as_str(),
        pixels_hex: hex::encode(photo.pixels()),
    }
}

impl OtpService for HttpGateway {
    async fn register_challenge(&self, id: &NationalId) -> Result<(), GatewayError> {
        let body = ChallengeRequest {
            national_id: id.as_str(),
        };
        self.send(self.http.post(self.url("/identity/challenge")).json(&body))
            .await?;
        Ok(())
    }

    async fn request_code(&self, phone: &PhoneNumber) -> Result<(), GatewayError> {
        let body = CodeRequest {
            phone: phone.e164(),
        };
        self.send(self.http.post(self.url("/identity/code")).json(&body))
            .await?;
        Ok(())
    }

    async fn verify_code(
        &self,
        phone: &PhoneNumber,
        code: &OneTimeCode,
    ) -> Result<SessionToken, GatewayError> {
        let body = VerifyRequest {
            phone: phone.e164(),
            code: code.as_str(),
        };
        let response = self
            .send(self.http.post(self.url("/identity/verify")).json(&body))
            .await?;
        let parsed: VerifyResponse = Self::json(response).await?;
        Ok(SessionToken::new(parsed.token))
    }
}

impl PlateLookup for HttpGateway {
    async fn fetch_plate(&self, plate: PlateId, edition: EditionId) -> Result<Plate, GatewayError> {
        let url = self.url(&format!("/editions/{edition}/plates/{plate}"));
        let response = self.send(self.http.get(url)).await?;
        Self::json(response).await
    }
}

impl VoteRegistry for HttpGateway {
    async fn has_voted(
        &self,
        plate: PlateId,
        edition: EditionId,
        token: Option<&SessionToken>,
    ) -> Result<bool, GatewayError> {
        let url = self.url(&format!("/editions/{edition}/plates/{plate}/vote"));
        let mut request = self.http.get(url);
        if let Some(token) = token {
            request = request.bearer_auth(token.expose());
        }
        let response = self.send(request).await?;
        let parsed: VotedResponse = Self::json(response).await?;
        Ok(parsed.voted)
    }
}

impl ContentAnalyzer for HttpGateway {
    async fn analyze(&self, photo: &CapturedPhoto) -> Result<(), GatewayError> {
        let body = photo_body(photo);
        self.send(self.http.post(self.url("/analysis")).json(&body))
            .await?;
        Ok(())
    }
}

impl SubmissionGateway for HttpGateway {
    async fn submit(&self, draft: &VoteDraft) -> Result<SubmissionReceipt, GatewayError> {
        let url = self.url(&format!(
            "/editions/{}/plates/{}/votes",
            draft.edition_id, draft.plate_id
        ));
        let body = SubmitRequest {
            presentation: draft.scores.presentation.value(),
            flavor: draft.scores.flavor.value(),
            experience: draft.scores.experience.value(),
            comment: draft.scores.comment.as_ref().map(|c| c.as_str()),
            photo: photo_body(&draft.photo),
        };
        let response = self
            .send(
                self.http
                    .post(url)
                    .bearer_auth(draft.session_token.expose())
                    .json(&body),
            )
            .await?;
        Self::json(response).await
    }
}
