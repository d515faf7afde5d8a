use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;

/// Command line arguments for yaschat
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "yaschat: a terminal client for the yaschat messaging server.",
    long_about = "Log in with a display name, list your conversations and exchange messages.\n\n\
    Without a subcommand an interactive shell is started."
)]
pub struct Cli {
    /// Server to talk to, e.g. http://localhost:8080 (also YASCHAT_BASE_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Config file holding the server url and the logged-in name
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Log in with a display name
    Login { name: String },
    /// Forget the logged-in name
    Logout,
    /// Print the logged-in name
    Whoami,
    /// List your conversations
    Conversations,
    /// Start a conversation with a contact
    New { contact: String },
    /// Show the messages exchanged with a contact
    Messages { contact: String },
    /// Send a message to a contact
    Send {
        contact: String,
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Flat from/to message endpoints of the older server API
    Legacy {
        #[command(subcommand)]
        command: LegacyCommand,
    },
    /// Interactive chat shell (default)
    Shell,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum LegacyCommand {
    /// List messages between two users
    List {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Send a message with a subject
    Send {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        subject: String,
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
}
