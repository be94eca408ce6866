use std::time::Duration;

use reqwest::{
    Client,
    header::{ACCEPT, CONTENT_TYPE, USER_AGENT},
};
use tracing::{debug, warn};
use url::{Url, form_urlencoded};

use crate::types::TokenReply;
use crate::{OAuthError, TokenRequest, TokenResponse, state};

/// Sent with every token request so providers can identify the library.
const USER_AGENT_VALUE: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    " (+",
    env!("CARGO_PKG_REPOSITORY"),
    ")"
);

#[derive(Debug, Clone)]
pub struct OAuthClientConfig {
    pub authorize_endpoint: String,
    pub token_endpoint: String,
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub timeout: Option<Duration>,
}

impl OAuthClientConfig {
    pub fn new(authorize_endpoint: impl Into<String>, token_endpoint: impl Into<String>) -> Self {
        Self {
            authorize_endpoint: authorize_endpoint.into(),
            token_endpoint: token_endpoint.into(),
            client_id: None,
            redirect_uri: None,
            timeout: None,
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// OAuth 2.0 client for a single provider.
///
/// The only per-flow state is the anti-forgery `state` value, which is
/// regenerated on every authorization URL request. Methods that rewrite
/// it take `&mut self`, so overlapping authorization flows on a shared
/// client do not compile; use one client per flow.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: OAuthClientConfig,
    http: Client,
    state: String,
}

impl OAuthClient {
    pub fn new(config: OAuthClientConfig) -> Result<Self, OAuthError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self::with_http_client(config, http))
    }

    /// Uses a caller-supplied HTTP client instead of building one.
    pub fn with_http_client(config: OAuthClientConfig, http: Client) -> Self {
        Self {
            config,
            http,
            state: String::new(),
        }
    }

    pub fn config(&self) -> &OAuthClientConfig {
        &self.config
    }

    /// The state value appended to the most recent authorization URL.
    /// Empty until the first URL is built. Callers redirecting a user
    /// agent must persist this value to validate the callback.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Replaces the anti-forgery state with `explicit`, or with a fresh
    /// 32-character alphanumeric value when none is given.
    pub fn reset_state(&mut self, explicit: Option<String>) -> Result<&str, OAuthError> {
        self.state = match explicit {
            Some(state) => state,
            None => state::random_alphanumeric(state::STATE_LENGTH)?,
        };
        Ok(&self.state)
    }

    /// Builds the authorization code grant URL, resetting [`state`](Self::state)
    /// in the process.
    pub fn authorization_code_url(
        &mut self,
        scopes: Option<&[String]>,
    ) -> Result<String, OAuthError> {
        self.authorization_code_url_with_state(scopes, None)
    }

    /// Like [`authorization_code_url`](Self::authorization_code_url),
    /// but with a caller-chosen state value instead of a generated one.
    ///
    /// Query parameters are emitted in a fixed order, `state` always
    /// last: `response_type`, `client_id`, `redirect_uri` (if
    /// configured), `scope` (if given), `state`.
    pub fn authorization_code_url_with_state(
        &mut self,
        scopes: Option<&[String]>,
        state: Option<String>,
    ) -> Result<String, OAuthError> {
        let Some(client_id) = self.config.client_id.clone() else {
            return Err(OAuthError::ClientIdRequired);
        };
        let mut url = Url::parse(&self.config.authorize_endpoint)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("response_type", "code");
            pairs.append_pair("client_id", &client_id);
            if let Some(redirect_uri) = &self.config.redirect_uri {
                pairs.append_pair("redirect_uri", redirect_uri);
            }
            if let Some(scopes) = scopes {
                pairs.append_pair("scope", &scopes.join(" "));
            }
        }
        self.reset_state(state)?;
        url.query_pairs_mut().append_pair("state", &self.state);
        Ok(url.to_string())
    }

    /// The implicit grant is not supported; this always fails with
    /// [`OAuthError::ImplicitGrantUnsupported`].
    pub fn implicit_grant_url(&self, _scopes: Option<&[String]>) -> Result<String, OAuthError> {
        Err(OAuthError::ImplicitGrantUnsupported)
    }

    /// Exchanges an authorization code for tokens. Shorthand for
    /// [`request_token`](Self::request_token) with a code-only request.
    pub async fn exchange_code(
        &self,
        code: impl Into<String>,
    ) -> Result<TokenResponse, OAuthError> {
        self.request_token(TokenRequest::authorization_code(code))
            .await
    }

    /// Requests tokens from the token endpoint.
    ///
    /// The grant is selected by the credentials present on `request`;
    /// supplying both an authorization code and resource owner
    /// credentials, or neither, fails before any request is sent.
    /// Every failure after that is one of the typed provider errors,
    /// with [`OAuthError::UnexpectedProvider`] covering transport
    /// faults and malformed bodies.
    pub async fn request_token(&self, request: TokenRequest) -> Result<TokenResponse, OAuthError> {
        let payload = self.token_payload(&request)?;
        let endpoint = Url::parse(&self.config.token_endpoint)?;

        debug!(endpoint = %endpoint, "requesting token from provider");

        let response = self
            .http
            .post(endpoint)
            .header(ACCEPT, "application/json")
            .header(
                CONTENT_TYPE,
                "application/x-www-form-urlencoded; charset=utf-8",
            )
            .header(USER_AGENT, USER_AGENT_VALUE)
            .body(encode_form(&payload))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let reply: TokenReply = serde_json::from_str(&body).map_err(|err| {
            warn!(
                status = status.as_u16(),
                "token endpoint returned an unparseable body"
            );
            OAuthError::UnexpectedProvider {
                message: format!("unparseable token response (http {status}): {err}"),
                source: Some(Box::new(err)),
            }
        })?;

        match reply.into_result() {
            Ok(token) => Ok(token),
            Err(err) => {
                warn!(error = %err, "token endpoint rejected the request");
                Err(err)
            }
        }
    }

    fn token_payload(
        &self,
        request: &TokenRequest,
    ) -> Result<Vec<(&'static str, String)>, OAuthError> {
        match (&request.code, &request.username) {
            (Some(_), Some(_)) => Err(OAuthError::IllegalParameters(
                "provide an authorization code or resource owner credentials, not both".to_string(),
            )),
            (None, None) => Err(OAuthError::IllegalParameters(
                "an authorization code or resource owner credentials are required".to_string(),
            )),
            (Some(code), None) => {
                let mut payload = vec![
                    ("grant_type", "authorization_code".to_string()),
                    ("code", code.clone()),
                ];
                if let Some(client_id) = &self.config.client_id {
                    payload.push(("client_id", client_id.clone()));
                }
                if let Some(redirect_uri) = &self.config.redirect_uri {
                    payload.push(("redirect_uri", redirect_uri.clone()));
                }
                Ok(payload)
            }
            // No field mapping is defined for the password grant yet;
            // refuse rather than post an empty body.
            (None, Some(_)) => Err(OAuthError::PasswordGrantUnimplemented),
        }
    }
}

fn encode_form(payload: &[(&'static str, String)]) -> String {
    let mut form = form_urlencoded::Serializer::new(String::new());
    for (key, value) in payload {
        form.append_pair(key, value);
    }
    form.finish()
}
