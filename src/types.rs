use serde::Deserialize;

use crate::{OAuthError, ProviderRejection};

/// Options for a token request. The grant is selected by which
/// credential is present: `code` for the authorization code grant,
/// `username`/`password` for the resource owner password grant.
#[derive(Debug, Clone, Default)]
pub struct TokenRequest {
    pub code: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub scopes: Option<Vec<String>>,
    /// Accepted for compatibility; the crate does not implement a
    /// refresh flow, so this flag has no effect.
    pub auto_refresh: bool,
}

impl TokenRequest {
    pub fn authorization_code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }

    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            ..Self::default()
        }
    }

    pub fn with_scopes(mut self, scopes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.scopes = Some(scopes.into_iter().map(Into::into).collect());
        self
    }
}

/// Successful token grant per RFC 6749 section 5.1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub token_type: Option<String>,
    /// Granted scopes, split from the provider's space-delimited list.
    /// `None` when the provider omitted the field.
    pub scope: Option<Vec<String>>,
}

/// Raw token endpoint body. Success and error shapes share one struct
/// so the `error` field can be inspected before anything else; a body
/// carrying both an error code and a token is treated as an error.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenReply {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error_uri: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

impl TokenReply {
    pub(crate) fn into_result(self) -> Result<TokenResponse, OAuthError> {
        if let Some(code) = self.error {
            let rejection =
                ProviderRejection::new(self.error_description.unwrap_or_default(), self.error_uri);
            return Err(OAuthError::from_provider_code(&code, rejection));
        }
        let access_token = self.access_token.ok_or_else(|| {
            OAuthError::unexpected("token response carries neither an access token nor an error code")
        })?;
        Ok(TokenResponse {
            access_token,
            refresh_token: self.refresh_token,
            expires_in: self.expires_in,
            token_type: self.token_type,
            scope: self
                .scope
                .map(|raw| raw.split_whitespace().map(str::to_string).collect()),
        })
    }
}
