use tokio::io::{AsyncBufRead, Lines};

use crate::api::MessagingApi;
use crate::app::AppState;
use crate::session::{self, AuthError, UserSession};

/// Ask for a display name until the server accepts one. `None` on end of input.
pub async fn show_login<R>(
    lines: &mut Lines<R>,
    api: &dyn MessagingApi,
    state: &mut AppState,
) -> anyhow::Result<Option<UserSession>>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        println!("Enter your name:");
        let Some(line) = lines.next_line().await? else {
            return Ok(None);
        };
        match session::login(api, state, &line).await {
            Ok(session) => {
                println!("Logged in as {}", session.name());
                return Ok(Some(session));
            }
            Err(AuthError::EmptyName) => println!("Please enter a name."),
            Err(e) => eprintln!("Login failed: {e}"),
        }
    }
}
