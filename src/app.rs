use anyhow::{bail, Context};
use directories::BaseDirs;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::client::DEFAULT_BASE_URL;
use crate::api::models::LegacyMessage;
use crate::api::{ApiClient, MessagingApi};
use crate::cli::{Cli, Command, LegacyCommand};
use crate::session;
use crate::store::ChatController;
use crate::ui::chat_view::ChatView;
use crate::ui::sidebar::Sidebar;

pub const BASE_URL_ENV: &str = "YASCHAT_BASE_URL";

/// Client-local settings and the persisted session name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppState {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_name: None,
            path: None,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toml_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join("yaschat.toml"))
    }

    /// Loads from the platform config dir. A missing or unreadable file yields defaults.
    pub fn load() -> Self {
        match Self::toml_path() {
            Some(path) => Self::load_from(&path),
            None => Self::new(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let mut state = match fs::read_to_string(path) {
            Ok(text) => toml::from_str::<AppState>(&text).unwrap_or_else(|e| {
                warn!("Ignoring malformed config {}: {e}", path.display());
                Self::new()
            }),
            Err(e) => {
                debug!("No config at {}: {e}", path.display());
                Self::new()
            }
        };
        state.path = Some(path.to_path_buf());
        state
    }

    /// Writes back to the file this state was loaded from, or the platform default.
    pub fn save(&self) -> std::io::Result<()> {
        let path = self
            .path
            .clone()
            .or_else(Self::toml_path)
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "No config dir"))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        fs::write(path, toml)
    }

    /// Server to use for this run: `flag`, then `YASCHAT_BASE_URL`, then the file.
    ///
    /// Nothing is written back, so a one-off flag never becomes the saved default.
    pub fn resolve_base_url(&self, flag: Option<&str>) -> String {
        self.resolve_base_url_from(flag, std::env::var(BASE_URL_ENV).ok())
    }

    fn resolve_base_url_from(&self, flag: Option<&str>, env: Option<String>) -> String {
        let url = flag
            .map(str::to_string)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| env.filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| self.base_url.clone());
        crate::utils::normalize_url(&url)
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut state = match &cli.config {
        Some(path) => AppState::load_from(path),
        None => AppState::load(),
    };
    let base_url = state.resolve_base_url(cli.base_url.as_deref());
    let client = Arc::new(
        ApiClient::new(&base_url).with_context(|| format!("invalid server url {base_url}"))?,
    );
    debug!("Using server {}", client.base_url);

    match cli.command.unwrap_or(Command::Shell) {
        Command::Login { name } => {
            let session = session::login(&*client, &mut state, &name).await?;
            println!("Logged in as {}", session.name());
        }
        Command::Logout => {
            session::logout(&mut state)?;
            println!("Logged out");
        }
        Command::Whoami => match session::restore(&state) {
            Some(session) => println!("{}", session.name()),
            None => println!("Not logged in"),
        },
        Command::Conversations => {
            let controller = logged_in(client, &state).await?;
            print_conversations(&controller);
        }
        Command::New { contact } => {
            let mut controller = logged_in(client, &state).await?;
            let conv = controller.create_conversation(&contact).await?;
            println!("Created conversation {}", conv.conversation_id);
        }
        Command::Messages { contact } => {
            let mut controller = logged_in(client, &state).await?;
            controller.select_contact(&contact).await?;
            print_selected(&controller);
        }
        Command::Send { contact, text } => {
            let mut controller = logged_in(client, &state).await?;
            controller.select_contact(&contact).await?;
            match controller.send_message(&text.join(" ")).await? {
                Some(message) => println!("Sent to {}", message.to_name),
                None => println!("Nothing to send"),
            }
        }
        Command::Legacy { command } => legacy(&*client, command).await?,
        Command::Shell => shell(client, &mut state).await?,
    }
    Ok(())
}

/// Controller for the persisted session with its conversations loaded.
async fn logged_in(api: Arc<dyn MessagingApi>, state: &AppState) -> anyhow::Result<ChatController> {
    let Some(session) = session::restore(state) else {
        bail!("not logged in, run `yaschat login <name>` first");
    };
    let mut controller = ChatController::new(api);
    controller.set_session(Some(session)).await?;
    Ok(controller)
}

async fn shell(client: Arc<ApiClient>, state: &mut AppState) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let session = match session::restore(state) {
        Some(session) => session,
        None => match crate::ui::login::show_login(&mut lines, &*client, state).await? {
            Some(session) => session,
            None => return Ok(()),
        },
    };

    let mut controller = ChatController::new(client);
    if let Err(e) = controller.set_session(Some(session)).await {
        eprintln!("Could not load conversations: {e}");
    }
    crate::ui::main_window::show_main_window(&mut lines, &mut controller).await
}

async fn legacy(client: &ApiClient, command: LegacyCommand) -> anyhow::Result<()> {
    match command {
        LegacyCommand::List { from, to } => {
            let messages = client.legacy_messages(&from, &to).await?;
            if messages.is_empty() {
                println!("No messages available");
            }
            for m in messages {
                println!("From: {}\nTo: {}\nSubject: {}\nMessage: {}\n", m.from, m.to, m.subject, m.content);
            }
        }
        LegacyCommand::Send { from, to, subject, text } => {
            let message = LegacyMessage { from, to, subject, content: text.join(" ") };
            if client.legacy_send(&message).await? {
                println!("Sent");
            } else {
                println!("From, to, subject and message are all required");
            }
        }
    }
    Ok(())
}

fn print_conversations(controller: &ChatController) {
    if let Some(session) = controller.session() {
        print!("{}", Sidebar::new(session.name(), controller.conversations()).render());
    }
}

fn print_selected(controller: &ChatController) {
    if let (Some(session), Some(conv)) = (controller.session(), controller.selected()) {
        print!("{}", ChatView::new(session.name(), conv, controller.messages()).render());
    }
}
