//! HTTP adapter for the Directory backend
//!
//! Thin JSON client over the Directory's REST endpoints. Transport and
//! status failures are folded into `DirectoryError` here so the layers
//! above never see a `reqwest` type.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use fomo_core::ports::user_directory::{
    DirectoryAck, InviteVerdict, RegistrationReceipt, UserDirectoryPort,
};
use fomo_core::ports::DirectoryError;
use fomo_core::settings::DirectorySettings;
use fomo_core::user::{ReferralSummary, UserRecord};
use fomo_core::WalletAddress;

pub struct HttpUserDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUserDirectory {
    pub fn new(settings: &DirectorySettings) -> Result<Self, DirectoryError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| DirectoryError::Network(format!("build HTTP client failed: {}", e)))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, DirectoryError>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(%url, "directory GET");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode_response(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, DirectoryError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(%url, "directory POST");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode_response(response).await
    }
}

#[async_trait]
impl UserDirectoryPort for HttpUserDirectory {
    async fn lookup_user(
        &self,
        address: &WalletAddress,
    ) -> Result<Option<UserRecord>, DirectoryError> {
        let response: LookupResponse = self
            .get_json(&format!("user/{}", address.as_str()))
            .await?;
        if !response.exists {
            return Ok(None);
        }
        Ok(response.user)
    }

    async fn register_user(
        &self,
        address: &WalletAddress,
        invite_code: Option<&str>,
    ) -> Result<RegistrationReceipt, DirectoryError> {
        // The Directory expects an empty string, not an absent field, when
        // no code was supplied.
        let body = RegisterRequest {
            wallet_address: address.as_str(),
            invite_code: invite_code.unwrap_or(""),
        };
        self.post_json("user/register", &body).await
    }

    async fn verify_invite(&self, code: &str) -> Result<InviteVerdict, DirectoryError> {
        let body = VerifyInviteRequest { invite_code: code };
        self.post_json("invite/verify", &body).await
    }

    async fn link_social(
        &self,
        address: &WalletAddress,
        handle: &str,
    ) -> Result<DirectoryAck, DirectoryError> {
        let body = ConnectTwitterRequest {
            wallet_address: address.as_str(),
            twitter_username: handle,
        };
        self.post_json("twitter/connect", &body).await
    }

    async fn accept_terms(&self, address: &WalletAddress) -> Result<DirectoryAck, DirectoryError> {
        let body = AcceptTermsRequest {
            wallet_address: address.as_str(),
        };
        self.post_json("user/accept-terms", &body).await
    }

    async fn referral_summary(
        &self,
        address: &WalletAddress,
    ) -> Result<ReferralSummary, DirectoryError> {
        self.get_json(&format!("referrals/{}", address.as_str()))
            .await
    }
}

// ==================== wire types ====================

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    wallet_address: &'a str,
    invite_code: &'a str,
}

#[derive(Debug, Serialize)]
struct VerifyInviteRequest<'a> {
    invite_code: &'a str,
}

#[derive(Debug, Serialize)]
struct ConnectTwitterRequest<'a> {
    wallet_address: &'a str,
    twitter_username: &'a str,
}

#[derive(Debug, Serialize)]
struct AcceptTermsRequest<'a> {
    wallet_address: &'a str,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    exists: bool,
    user: Option<UserRecord>,
}

/// FastAPI error envelope.
#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: Option<String>,
}

// ==================== error mapping ====================

async fn decode_response<T>(response: reqwest::Response) -> Result<T, DirectoryError>
where
    T: DeserializeOwned,
{
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        let detail = response
            .json::<ErrorDetail>()
            .await
            .ok()
            .and_then(|e| e.detail);
        return Err(DirectoryError::Rejected { message: detail });
    }
    if !status.is_success() {
        return Err(map_status_code(status));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| DirectoryError::InvalidResponse(e.to_string()))
}

fn map_transport_error(error: reqwest::Error) -> DirectoryError {
    if error.is_timeout() {
        DirectoryError::Timeout
    } else if let Some(status) = error.status() {
        map_status_code(status)
    } else {
        DirectoryError::Network(error.to_string())
    }
}

fn map_status_code(code: StatusCode) -> DirectoryError {
    match code {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => DirectoryError::Timeout,
        _ if code.is_server_error() => DirectoryError::Server {
            status: code.as_u16(),
        },
        _ => DirectoryError::Network(format!("unexpected status: {}", code)),
    }
}
