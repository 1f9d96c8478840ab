//! Zyxel admin interface client
//!
//! Login with the decrypted credentials, then scrape the DHCP host page for
//! the active device list. One session per run; nothing is cached.

use super::scraper::{extract_active_payload, parse_active_devices};
use super::session::extract_session_token;
use super::transport::{RouterResponse, RouterTransport};
use crate::crypto;
use crate::error::AppError;
use crate::models::{ActiveDevice, RouterCredentials, SessionToken};

pub const LOGIN_ENDPOINT: &str = "login.cgi";
pub const DEVICE_LIST_ENDPOINT: &str = "dhcpdhostentry.cmd";

pub struct ZyxelClient<T: RouterTransport> {
    transport: T,
    credentials: RouterCredentials,
    verbose: bool,
}

impl<T: RouterTransport> ZyxelClient<T> {
    pub fn new(transport: T, credentials: RouterCredentials, verbose: bool) -> Self {
        Self {
            transport,
            credentials,
            verbose,
        }
    }

    /// Log in and return the session key from the `SESSION` cookie
    pub async fn authenticate(&self) -> Result<SessionToken, AppError> {
        let creds = &self.credentials;
        let username = crypto::decrypt(&creds.encrypted_username, &creds.key)?;
        let password = crypto::decrypt(&creds.encrypted_password, &creds.key)?;
        if self.verbose {
            tracing::info!(
                "[Router] Found username: `{}`, password: `{}`",
                username,
                password
            );
        }

        let response = self
            .transport
            .post_form(
                LOGIN_ENDPOINT,
                &[
                    ("admin_username", username.as_str()),
                    ("admin_password", password.as_str()),
                ],
            )
            .await?;

        if response.set_cookies.is_empty() {
            return Err(AppError::Auth(format!(
                "No Set-Cookie header was found in login response to {}{}",
                self.transport.router_address(),
                self.verbose_detail(&response)
            )));
        }

        let token = extract_session_token(&response.set_cookies).ok_or_else(|| {
            AppError::Auth(format!(
                "Failed to get session key in login response to {}{}",
                self.transport.router_address(),
                self.verbose_detail(&response)
            ))
        })?;

        tracing::debug!("[Router] Logged in to {}", self.transport.router_address());
        Ok(SessionToken::new(token))
    }

    /// Fetch the DHCP host page and return the raw `activeusers` payload
    pub async fn fetch_active_payload(&self, token: &SessionToken) -> Result<String, AppError> {
        let response = self
            .transport
            .post_form(
                DEVICE_LIST_ENDPOINT,
                &[
                    ("action", "view"),
                    ("inactive", "0"),
                    ("sessionKey", token.as_str()),
                ],
            )
            .await?;

        match extract_active_payload(&response.body) {
            Some(payload) => Ok(payload.to_string()),
            None => Err(AppError::Scrape(format!(
                "Failed to find activeusers in device list from {}{}",
                self.transport.router_address(),
                if self.verbose {
                    format!(" in:\n\n{}", response.body)
                } else {
                    String::new()
                }
            ))),
        }
    }

    /// Full router side of a poll: login, fetch, parse
    pub async fn active_devices(&self) -> Result<Vec<ActiveDevice>, AppError> {
        let token = self.authenticate().await?;
        let payload = self.fetch_active_payload(&token).await?;
        let devices = parse_active_devices(&payload);
        tracing::debug!(
            "[Router] Parsed {} devices from {} bytes of payload",
            devices.len(),
            payload.len()
        );
        Ok(devices)
    }

    fn verbose_detail(&self, response: &RouterResponse) -> String {
        if self.verbose {
            format!(", got {}\n\n{}", response.status, response.body)
        } else {
            String::new()
        }
    }
}
