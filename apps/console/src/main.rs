use anyhow::Context;
use clap::{Parser, Subcommand};
use parley_config::load as load_config;
use parley_database::{ChatRoom, Message, MessageType};
use parley_runtime::{shutdown_signal, telemetry, CoreServices};
use tracing::info;

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Parley direct-messaging console")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a message from one user to another
    Send {
        from: String,
        to: String,
        message: String,
        /// Message type: text, image, or file
        #[arg(long, default_value = "text")]
        kind: String,
        /// Optional appointment annotation
        #[arg(long)]
        appointment: Option<String>,
    },
    /// Print the conversation between two users
    History {
        user_a: String,
        user_b: String,
        #[arg(long)]
        limit: Option<i64>,
    },
    /// List chat rooms for a user
    Rooms { user: String },
    /// Show unread counts for a user
    Unread {
        user: String,
        /// Restrict to messages from one counterpart
        #[arg(long)]
        from: Option<String>,
    },
    /// Mark a conversation as read
    MarkRead { reader: String, other: String },
    /// Follow a conversation live until Ctrl-C
    Watch { user_a: String, user_b: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    let cli = Cli::parse();
    let config = load_config().context("failed to load configuration")?;
    let services = CoreServices::initialise(&config)
        .await
        .context("failed to initialise messaging core")?;
    let messenger = services.messenger;

    match cli.command {
        Commands::Send {
            from,
            to,
            message,
            kind,
            appointment,
        } => {
            let sent = messenger
                .send(
                    &from,
                    &to,
                    &message,
                    MessageType::from(kind.as_str()),
                    appointment.as_deref(),
                )
                .await?;
            println!("sent {} at {}", sent.public_id, sent.created_at);
        }
        Commands::History { user_a, user_b, limit } => {
            let messages = messenger.get_conversation(&user_a, &user_b, limit).await?;
            if messages.is_empty() {
                println!("(no messages)");
            }
            for message in &messages {
                print_message(message);
            }
        }
        Commands::Rooms { user } => {
            let rooms = messenger.list_rooms_for_user(&user).await?;
            if rooms.is_empty() {
                println!("(no rooms)");
            }
            for room in &rooms {
                print_room(room, &user);
            }
        }
        Commands::Unread { user, from } => {
            match from {
                Some(other) => {
                    let count = messenger.unread_for_conversation(&user, &other).await?;
                    println!("{count} unread from {other}");
                }
                None => {
                    let count = messenger.unread_total(&user).await?;
                    println!("{count} unread in total");
                }
            }
        }
        Commands::MarkRead { reader, other } => {
            let changed = messenger.mark_read(&reader, &other).await?;
            println!("marked {changed} message(s) read");
        }
        Commands::Watch { user_a, user_b } => {
            info!(%user_a, %user_b, "watching conversation, Ctrl-C to stop");
            let handle = messenger
                .subscribe(&user_a, &user_b, |snapshot| {
                    println!("--- {} message(s) ---", snapshot.messages.len());
                    for message in &snapshot.messages {
                        print_message(message);
                    }
                })
                .await?;

            let poller = messenger.start_polling();
            shutdown_signal().await;
            handle.cancel();
            poller.abort();
        }
    }

    Ok(())
}

fn print_message(message: &Message) {
    let read_marker = if message.is_read { " " } else { "*" };
    println!(
        "{read_marker} [{}] {} -> {}: {}",
        message.created_at, message.sender_id, message.recipient_id, message.content
    );
}

fn print_room(room: &ChatRoom, viewer: &str) {
    let counterpart = room.counterpart(viewer).unwrap_or("?");
    match (&room.last_message, &room.last_message_at) {
        (Some(last), Some(at)) => println!("{counterpart}: \"{last}\" at {at}"),
        _ => println!("{counterpart}: (no messages yet)"),
    }
}
