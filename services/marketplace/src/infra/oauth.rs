use anyhow::Context as _;
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    RedirectUrl, Scope, TokenResponse, TokenUrl,
};

use crate::domain::repository::OAuthProvider;
use crate::domain::types::OAuthProfile;
use crate::error::MarketplaceError;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

type GoogleClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Google authorization-code flow.
#[derive(Clone)]
pub struct GoogleOAuth {
    client: GoogleClient,
    /// Client for the token exchange. Redirects are disabled to avoid SSRF.
    token_http: oauth2::reqwest::Client,
    profile_http: reqwest::Client,
}

impl GoogleOAuth {
    pub fn new(
        client_id: &str,
        client_secret: &str,
        redirect_url: &str,
        profile_http: reqwest::Client,
    ) -> anyhow::Result<Self> {
        let client = BasicClient::new(ClientId::new(client_id.to_owned()))
            .set_client_secret(ClientSecret::new(client_secret.to_owned()))
            .set_auth_uri(AuthUrl::new(GOOGLE_AUTH_URL.to_owned()).context("google auth url")?)
            .set_token_uri(TokenUrl::new(GOOGLE_TOKEN_URL.to_owned()).context("google token url")?)
            .set_redirect_uri(
                RedirectUrl::new(redirect_url.to_owned()).context("invalid GOOGLE_REDIRECT_URL")?,
            );
        let token_http = oauth2::reqwest::ClientBuilder::new()
            .redirect(oauth2::reqwest::redirect::Policy::none())
            .build()
            .context("build oauth http client")?;
        Ok(Self {
            client,
            token_http,
            profile_http,
        })
    }
}

impl OAuthProvider for GoogleOAuth {
    fn authorize_url(&self) -> (String, String) {
        let (url, csrf) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("openid".to_owned()))
            .add_scope(Scope::new("email".to_owned()))
            .add_scope(Scope::new("profile".to_owned()))
            .url();
        (url.to_string(), csrf.secret().to_owned())
    }

    async fn fetch_profile(&self, code: &str) -> Result<OAuthProfile, MarketplaceError> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_owned()))
            .request_async(&self.token_http)
            .await
            .context("exchange google authorization code")?;

        let profile = self
            .profile_http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(token.access_token().secret())
            .send()
            .await
            .context("fetch google profile")?
            .error_for_status()
            .context("google profile status")?
            .json::<OAuthProfile>()
            .await
            .context("decode google profile")?;
        Ok(profile)
    }
}
