use reqwest::Client;
use tracing::info;

use super::http_store::{build_client, send_json};
use crate::config::ClientConfig;
use crate::domain::account::{Account, Credentials, LoginForm, MessageResponse, TokenResponse};
use crate::domain::session::Session;
use crate::error::{Action, BrelloError, RemoteError, Result};

const EMAIL_NOT_CONFIRMED: &str = "Email not confirmed";

/// Account endpoints. None of them need a credential; `login` is where one comes from.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self { client: build_client(config)?, base_url: config.api_url.clone() })
    }

    /// Registers an inactive account; the server mails a confirmation link.
    pub async fn signup(&self, email: &str, password: &str) -> Result<Account> {
        let body = Credentials { email: email.to_string(), password: password.to_string() };
        let account: Account = send_json(self.client.post(format!("{}/users", self.base_url)).json(&body))
            .await
            .map_err(|e| BrelloError::request(Action::SignUp, e))?;
        info!(account_id = account.id, "account created");
        Ok(account)
    }

    pub async fn confirm_email(&self, token: &str) -> Result<String> {
        let response: MessageResponse = send_json(self.client.get(format!("{}/confirm/{}", self.base_url, token)))
            .await
            .map_err(|e| BrelloError::request(Action::ConfirmEmail, e))?;
        Ok(response.message)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let form = LoginForm { username: email.to_string(), password: password.to_string() };
        let token: TokenResponse = send_json(self.client.post(format!("{}/auth/token", self.base_url)).form(&form))
            .await
            .map_err(login_error)?;
        info!(email, "logged in");
        Ok(Session::signed_in(email, token.access_token))
    }
}

fn login_error(err: RemoteError) -> BrelloError {
    match &err {
        RemoteError::Status { status: 401, message } if message == EMAIL_NOT_CONFIRMED => BrelloError::EmailNotConfirmed,
        _ => BrelloError::request(Action::LogIn, err),
    }
}
