use log::debug;
use tokio::io::{AsyncBufRead, Lines};
use tokio::sync::mpsc;

use crate::api::ApiError;
use crate::store::{ChatController, DeliveryStatus};
use crate::ui::chat_view::ChatView;
use crate::ui::sidebar::Sidebar;

const HELP: &str = "\
/list              show conversations
/open <contact>    open the conversation with <contact>
/new <contact>     start a conversation with <contact>
/refresh           reload conversations and the open conversation
/quit              leave
anything else is sent to the open conversation";

#[derive(Debug, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Open(String),
    New(String),
    Refresh,
    Help,
    Quit,
    Send(String),
    Unknown(String),
}

impl ShellCommand {
    pub fn parse(line: &str) -> Self {
        let Some(rest) = line.trim_start().strip_prefix('/') else {
            return ShellCommand::Send(line.to_string());
        };
        let (cmd, arg) = match rest.split_once(char::is_whitespace) {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (rest.trim(), ""),
        };
        match (cmd, arg) {
            ("list", _) => ShellCommand::List,
            ("refresh", _) => ShellCommand::Refresh,
            ("help", _) => ShellCommand::Help,
            ("quit" | "exit", _) => ShellCommand::Quit,
            ("open", a) if !a.is_empty() => ShellCommand::Open(a.to_string()),
            ("new", a) if !a.is_empty() => ShellCommand::New(a.to_string()),
            _ => ShellCommand::Unknown(line.trim().to_string()),
        }
    }
}

type Ack = (String, Result<(), ApiError>);

/// Interactive loop over `lines`. Sends are fired without waiting for each other.
pub async fn show_main_window<R>(lines: &mut Lines<R>, controller: &mut ChatController) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Ack>();
    print_sidebar(controller);
    println!("Type /help for commands.");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_line(controller, &tx, &line).await {
                    break;
                }
            }
            Some(ack) = rx.recv() => apply_ack(controller, ack),
        }
    }

    // Sends still in flight are acknowledged before leaving.
    drop(tx);
    while let Some(ack) = rx.recv().await {
        apply_ack(controller, ack);
    }
    Ok(())
}

fn apply_ack(controller: &mut ChatController, (id, result): Ack) {
    if controller.acknowledge(&id, &result) == Some(DeliveryStatus::Failed) {
        println!("! message not delivered");
    }
}

async fn handle_line(controller: &mut ChatController, tx: &mpsc::UnboundedSender<Ack>, line: &str) -> bool {
    match ShellCommand::parse(line) {
        ShellCommand::Quit => return false,
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::List => print_sidebar(controller),
        ShellCommand::Refresh => {
            if let Err(e) = controller.refresh_conversations().await {
                eprintln!("Could not load conversations: {e}");
            }
            if let Some(conv) = controller.selected().cloned() {
                if let Err(e) = controller.select_conversation(conv).await {
                    eprintln!("Could not load messages: {e}");
                }
            }
            print_sidebar(controller);
        }
        ShellCommand::Open(contact) => match controller.select_contact(&contact).await {
            Ok(()) => print_chat(controller),
            Err(e) => eprintln!("{e}"),
        },
        ShellCommand::New(contact) => match controller.create_conversation(&contact).await {
            Ok(conv) => {
                if let Err(e) = controller.select_conversation(conv).await {
                    eprintln!("Could not load messages: {e}");
                }
                print_chat(controller);
            }
            Err(e) => eprintln!("Could not create conversation: {e}"),
        },
        ShellCommand::Send(text) => match controller.queue_message(&text) {
            Ok(Some(outgoing)) => {
                if let Some(me) = controller.session().map(|s| s.name().to_string()) {
                    if let Some(entry) = controller.messages().last() {
                        println!("{}", ChatView::line(&me, entry));
                    }
                }
                let api = controller.api();
                crate::utils::run_async_to_main(tx.clone(), async move {
                    let result = api
                        .send_message(&outgoing.conversation_id, &outgoing.message)
                        .await;
                    (outgoing.message.id, result)
                });
            }
            Ok(None) => debug!("Ignoring blank message"),
            Err(e) => eprintln!("{e} (use /open <contact>)"),
        },
        ShellCommand::Unknown(cmd) => println!("Unknown command {cmd}. Type /help."),
    }
    true
}

fn print_sidebar(controller: &ChatController) {
    if let Some(session) = controller.session() {
        print!("{}", Sidebar::new(session.name(), controller.conversations()).render());
    }
}

fn print_chat(controller: &ChatController) {
    if let (Some(session), Some(conv)) = (controller.session(), controller.selected()) {
        print!("{}", ChatView::new(session.name(), conv, controller.messages()).render());
    }
}
