use anyhow::anyhow;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
    basic::BasicClient,
};
use serde::Deserialize;
use tracing::{debug, warn};

use curricula_config::OAuthConfig;
use curricula_core::{AppError, AppFuture};

use super::{AuthorizationRequest, IdentityProvider, ProviderIdentity};

/// Client with auth URL, token URL and redirect URL set.
type ConfiguredClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

const SIGN_IN_FAILED: &str = "Sign-in could not be completed";

/// OpenID-style userinfo response.
#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    email: Option<String>,
}

/// Authorization-code + PKCE sign-in against an OAuth 2.0 provider.
pub struct OAuthIdentityProvider {
    config: OAuthConfig,
    http: reqwest::Client,
}

impl OAuthIdentityProvider {
    pub fn new(config: OAuthConfig) -> Result<Self, AppError> {
        // the token endpoint must not be followed through redirects
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(AppError::internal)?;

        if !config.is_configured() {
            warn!("OAUTH_CLIENT_ID or OAUTH_CLIENT_SECRET not set, sign-in is disabled");
        }

        Ok(Self { config, http })
    }

    fn client(&self) -> Result<ConfiguredClient, AppError> {
        if !self.config.is_configured() {
            return Err(AppError::internal(anyhow!(
                "OAuth client credentials are not configured"
            )));
        }

        let client = BasicClient::new(ClientId::new(self.config.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.config.client_secret.clone()))
            .set_auth_uri(AuthUrl::new(self.config.auth_url.clone()).map_err(AppError::internal)?)
            .set_token_uri(
                TokenUrl::new(self.config.token_url.clone()).map_err(AppError::internal)?,
            )
            .set_redirect_uri(
                RedirectUrl::new(self.config.redirect_url.clone()).map_err(AppError::internal)?,
            );

        Ok(client)
    }

    async fn fetch_user_info(&self, access_token: &str) -> Result<UserInfo, AppError> {
        let response = self
            .http
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| sign_in_failed("userinfo request failed", e))?
            .error_for_status()
            .map_err(|e| sign_in_failed("userinfo request rejected", e))?;

        response
            .json::<UserInfo>()
            .await
            .map_err(|e| sign_in_failed("userinfo response malformed", e))
    }
}

fn sign_in_failed(context: &str, err: impl std::fmt::Display) -> AppError {
    warn!(error = %err, "{context}");
    AppError::unauthenticated(SIGN_IN_FAILED)
}

impl IdentityProvider for OAuthIdentityProvider {
    fn authorization_request(&self) -> Result<AuthorizationRequest, AppError> {
        let client = self.client()?;
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut request = client
            .authorize_url(CsrfToken::new_random)
            .set_pkce_challenge(pkce_challenge);
        for scope in &self.config.scopes {
            request = request.add_scope(Scope::new(scope.clone()));
        }
        let (url, csrf_state) = request.url();

        Ok(AuthorizationRequest {
            url: url.to_string(),
            csrf_state: csrf_state.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
        })
    }

    fn exchange_code<'a>(
        &'a self,
        code: &'a str,
        pkce_verifier: &'a str,
    ) -> AppFuture<'a, ProviderIdentity> {
        Box::pin(async move {
            let client = self.client()?;

            let token = client
                .exchange_code(AuthorizationCode::new(code.to_string()))
                .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_string()))
                .request_async(&self.http)
                .await
                .map_err(|e| sign_in_failed("token exchange failed", e))?;

            debug!("Token exchange succeeded, fetching user info");
            let info = self.fetch_user_info(token.access_token().secret()).await?;

            let email = info
                .email
                .filter(|email| !email.is_empty())
                .ok_or_else(|| sign_in_failed("identity provider returned no email", &info.sub))?;

            Ok(ProviderIdentity {
                subject: info.sub,
                email,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(client_id: &str) -> OAuthConfig {
        OAuthConfig {
            client_id: client_id.to_string(),
            client_secret: if client_id.is_empty() { "" } else { "secret" }.to_string(),
            auth_url: "https://accounts.example.com/authorize".to_string(),
            token_url: "https://accounts.example.com/token".to_string(),
            userinfo_url: "https://accounts.example.com/userinfo".to_string(),
            redirect_url: "http://localhost:3000/auth/callback".to_string(),
            scopes: vec!["openid".to_string(), "email".to_string()],
        }
    }

    #[test]
    fn test_authorization_request_carries_pkce_and_state() {
        let provider = OAuthIdentityProvider::new(config("client-1")).unwrap();
        let request = provider.authorization_request().unwrap();

        assert!(request.url.starts_with("https://accounts.example.com/authorize?"));
        assert!(request.url.contains("client_id=client-1"));
        assert!(request.url.contains("code_challenge_method=S256"));
        assert!(request.url.contains(&format!("state={}", request.csrf_state)));
        assert!(!request.pkce_verifier.is_empty());
    }

    #[test]
    fn test_unconfigured_provider_refuses() {
        let provider = OAuthIdentityProvider::new(config("")).unwrap();
        assert!(provider.authorization_request().is_err());
    }
}
