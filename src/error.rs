use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Details a provider attaches to an RFC 6749 section 5.2 error body.
///
/// Rendered as the human-readable description, with the documentation
/// uri appended in parentheses when the provider sent one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRejection {
    pub description: String,
    pub uri: Option<String>,
}

impl ProviderRejection {
    pub fn new(description: impl Into<String>, uri: Option<String>) -> Self {
        Self {
            description: description.into(),
            uri,
        }
    }
}

impl fmt::Display for ProviderRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)?;
        if let Some(uri) = &self.uri {
            write!(f, " ({uri})")?;
        }
        Ok(())
    }
}

/// Whether an error was caused by the caller or by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The API was misused; raised before any request is sent.
    Usage,
    /// The provider rejected the request or behaved unexpectedly.
    Provider,
}

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("a client id is required to build an authorization url")]
    ClientIdRequired,

    #[error("illegal parameters: {0}")]
    IllegalParameters(String),

    #[error("the implicit grant flow is not supported")]
    ImplicitGrantUnsupported,

    #[error("the resource owner password credentials grant is not implemented")]
    PasswordGrantUnimplemented,

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("state generation failed: {message}")]
    StateGeneration { message: String },

    #[error("invalid_request: {0}")]
    InvalidRequest(ProviderRejection),

    #[error("invalid_client: {0}")]
    InvalidClient(ProviderRejection),

    #[error("invalid_grant: {0}")]
    InvalidGrant(ProviderRejection),

    #[error("unauthorized_client: {0}")]
    UnauthorizedClient(ProviderRejection),

    #[error("unsupported_grant_type: {0}")]
    UnsupportedGrantType(ProviderRejection),

    #[error("invalid_scope: {0}")]
    InvalidScope(ProviderRejection),

    #[error("unexpected provider error: {message}")]
    UnexpectedProvider {
        message: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}

impl OAuthError {
    /// Maps a wire `error` code onto its variant. Codes outside the
    /// RFC 6749 section 5.2 registry become [`OAuthError::UnexpectedProvider`]
    /// with the offending code in the message.
    pub fn from_provider_code(code: &str, rejection: ProviderRejection) -> Self {
        match code {
            "invalid_request" => Self::InvalidRequest(rejection),
            "invalid_client" => Self::InvalidClient(rejection),
            "invalid_grant" => Self::InvalidGrant(rejection),
            "unauthorized_client" => Self::UnauthorizedClient(rejection),
            "unsupported_grant_type" => Self::UnsupportedGrantType(rejection),
            "invalid_scope" => Self::InvalidScope(rejection),
            other => Self::UnexpectedProvider {
                message: format!(
                    "provider returned unrecognized error code \"{other}\": {rejection}"
                ),
                source: None,
            },
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedProvider {
            message: message.into(),
            source: None,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::ClientIdRequired
            | Self::IllegalParameters(_)
            | Self::ImplicitGrantUnsupported
            | Self::PasswordGrantUnimplemented
            | Self::Url(_)
            | Self::StateGeneration { .. } => ErrorClass::Usage,
            Self::InvalidRequest(_)
            | Self::InvalidClient(_)
            | Self::InvalidGrant(_)
            | Self::UnauthorizedClient(_)
            | Self::UnsupportedGrantType(_)
            | Self::InvalidScope(_)
            | Self::UnexpectedProvider { .. } => ErrorClass::Provider,
        }
    }
}

impl From<reqwest::Error> for OAuthError {
    fn from(err: reqwest::Error) -> Self {
        Self::UnexpectedProvider {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorClass, OAuthError, ProviderRejection};

    fn rejection() -> ProviderRejection {
        ProviderRejection::new("fake failure", Some("https://wherever".to_string()))
    }

    #[test]
    fn maps_registered_codes_to_variants() {
        let cases = [
            "invalid_request",
            "invalid_client",
            "invalid_grant",
            "unauthorized_client",
            "unsupported_grant_type",
            "invalid_scope",
        ];
        for code in cases {
            let err = OAuthError::from_provider_code(code, rejection());
            assert!(
                err.to_string().starts_with(code),
                "{code} should render with its wire code"
            );
            assert_eq!(err.class(), ErrorClass::Provider);
        }
    }

    #[test]
    fn mapped_variant_message_carries_description_and_uri() {
        let err = OAuthError::from_provider_code("invalid_grant", rejection());
        assert!(matches!(err, OAuthError::InvalidGrant(_)));
        let message = err.to_string();
        assert!(message.contains("fake failure"));
        assert!(message.contains("https://wherever"));
    }

    #[test]
    fn rejection_without_uri_renders_description_only() {
        let rejection = ProviderRejection::new("fake failure", None);
        assert_eq!(rejection.to_string(), "fake failure");
    }

    #[test]
    fn unknown_code_becomes_unexpected_provider_error() {
        let err =
            OAuthError::from_provider_code("some_unlisted_code", ProviderRejection::new("x", None));
        assert!(matches!(err, OAuthError::UnexpectedProvider { .. }));
        assert!(err.to_string().contains("some_unlisted_code"));
    }

    #[test]
    fn usage_errors_classify_as_usage() {
        assert_eq!(OAuthError::ClientIdRequired.class(), ErrorClass::Usage);
        assert_eq!(
            OAuthError::IllegalParameters("both".to_string()).class(),
            ErrorClass::Usage
        );
        assert_eq!(
            OAuthError::ImplicitGrantUnsupported.class(),
            ErrorClass::Usage
        );
        assert_eq!(
            OAuthError::PasswordGrantUnimplemented.class(),
            ErrorClass::Usage
        );
    }
}
