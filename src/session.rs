use log::{error, info};
use thiserror::Error;

use crate::api::{ApiError, MessagingApi};
use crate::app::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    name: String,
}

impl UserSession {
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("login rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Api(ApiError),

    #[error("failed to save session: {0}")]
    Persist(#[from] std::io::Error),
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err.server_message() {
            Some(message) => AuthError::Rejected(message),
            None => AuthError::Api(err),
        }
    }
}

/// Log `name` in against the server and persist it on success.
pub async fn login(
    api: &dyn MessagingApi,
    state: &mut AppState,
    name: &str,
) -> Result<UserSession, AuthError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuthError::EmptyName);
    }

    if let Err(e) = api.login(name).await {
        error!("Error logging in as {name}: {e}");
        return Err(e.into());
    }

    state.user_name = Some(name.to_string());
    state.save()?;
    info!("Logged in as {name}");
    Ok(UserSession { name: name.to_string() })
}

/// Session persisted by an earlier login, if any.
pub fn restore(state: &AppState) -> Option<UserSession> {
    state
        .user_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| UserSession { name: name.to_string() })
}

pub fn logout(state: &mut AppState) -> std::io::Result<()> {
    if let Some(name) = state.user_name.take() {
        info!("Logged out {name}");
    }
    state.save()
}
