use anyhow::{Context, Result};
use carechat::auth::AuthContext;
use carechat::cli_adapter::{self, CliCommand};
use carechat::config::{Config, LoggingConfig};
use carechat::controller::{ChatController, ChatSettings, SendOutcome, SendRejection};
use carechat::http_service::HttpConversationService;
use carechat::portal::PortalService;
use carechat::service::ConversationService;
use carechat::transcript;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::LinesStream;
use tracing::info;

#[derive(Parser)]
#[command(name = "carechat", version)]
#[command(about = "Terminal client for the AgentCare support chat", long_about = None)]
struct Cli {
    /// TOML config file; defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Conversation service base URL
        #[arg(long)]
        base_url: Option<String>,
        #[arg(long)]
        locale: Option<String>,
        /// Talk to the customer-portal assistant instead of the landing widget
        #[arg(long)]
        portal: bool,
    },
    /// Email the transcript of an existing session
    Email {
        #[arg(long)]
        session: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        base_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut cfg = Config::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Chat {
            base_url,
            locale,
            portal,
        } => {
            if let Some(url) = base_url {
                if portal {
                    cfg.portal.base_url = url;
                } else {
                    cfg.service.base_url = url;
                }
            }
            if let Some(locale) = locale {
                cfg.chat.locale = locale;
            }
            cfg.validate()?;
            init_tracing(&cfg.logging);

            if portal {
                let auth = AuthContext::from_config(&cfg.portal);
                info!(customer_id = auth.customer_id(), "starting portal chat");
                if let Some(line) = cli_adapter::render_welcome(auth.identity()) {
                    println!("{line}");
                }
                let service = PortalService::new(&cfg.portal, &cfg.service, auth)
                    .context("failed to build portal client")?;
                let mut settings = ChatSettings::from(&cfg.chat);
                settings.apology = cfg.portal.apology.clone();
                run_chat(ChatController::new(service, settings)).await
            } else {
                info!(base_url = %cfg.service.base_url, "starting widget chat");
                let service = HttpConversationService::new(&cfg.service)
                    .context("failed to build chat client")?;
                run_chat(ChatController::new(service, ChatSettings::from(&cfg.chat))).await
            }
        }
        Commands::Email {
            session,
            email,
            name,
            base_url,
        } => {
            if let Some(url) = base_url {
                cfg.service.base_url = url;
            }
            cfg.validate()?;
            init_tracing(&cfg.logging);

            let service = HttpConversationService::new(&cfg.service)
                .context("failed to build chat client")?;
            let sent_to = transcript::send_transcript(
                &service,
                &session,
                &email,
                name.as_deref(),
                &cfg.chat.transcript_default_name,
            )
            .await
            .with_context(|| format!("failed to email transcript of {session}"))?;
            println!("transcript of {session} sent to {sent_to}");
            Ok(())
        }
    }
}

fn init_tracing(cfg: &LoggingConfig) {
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.level.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: logging.level='{}' is not a valid tracing filter ({}); \
                     falling back to 'warn'",
                    cfg.level, e
                );
                tracing_subscriber::EnvFilter::new("warn")
            }
        },
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    if cfg.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

async fn run_chat<S: ConversationService>(chat: ChatController<S>) -> Result<()> {
    let snapshot = chat.open().await;
    let agent = agent_name(&chat).await;
    for message in &snapshot.messages {
        println!("{}", cli_adapter::render_message(message, &agent));
    }
    if let Some(line) = cli_adapter::render_suggestions(&snapshot.suggestions) {
        println!("{line}");
    }

    let mut lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());
    while let Some(line) = lines.next().await {
        let line = line.context("failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let command = match cli_adapter::parse_input(&line) {
            Ok(command) => command,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };

        match command {
            CliCommand::Say(text) => {
                let outcome = chat.send_message(&text).await;
                report(&chat, outcome).await;
            }
            CliCommand::Choose(index) => {
                let outcome = chat.choose_suggestion(index).await;
                report(&chat, outcome).await;
            }
            CliCommand::Confirm => match chat.confirm_registration().await {
                Some(message) => {
                    let agent = agent_name(&chat).await;
                    println!("{}", cli_adapter::render_message(&message, &agent));
                }
                None => eprintln!("no registration is waiting for confirmation"),
            },
            CliCommand::Dismiss => {
                if !chat.dismiss_registration().await {
                    eprintln!("no registration is waiting for confirmation");
                }
            }
            CliCommand::Email { address, name } => {
                match chat.email_transcript(&address, name.as_deref()).await {
                    Ok(()) => println!("transcript sent to {}", address.trim()),
                    Err(err) => eprintln!("{err}"),
                }
            }
            CliCommand::History => {
                let snapshot = chat.snapshot().await;
                match transcript::format_transcript(snapshot.session.as_ref(), &snapshot.messages)
                {
                    Some(text) => print!("{text}"),
                    None => eprintln!("no messages yet"),
                }
            }
            CliCommand::Quit => break,
        }
    }

    chat.close().await;
    Ok(())
}

async fn report<S: ConversationService>(chat: &ChatController<S>, outcome: SendOutcome) {
    match outcome {
        SendOutcome::Replied(turn) => {
            let agent = agent_name(chat).await;
            println!("{}", cli_adapter::render_message(&turn.reply, &agent));
            if let Some(line) = cli_adapter::render_suggestions(&turn.suggestions) {
                println!("{line}");
            }
            if let Some(draft) = &turn.registration {
                println!("{}", cli_adapter::render_registration(draft));
            }
        }
        SendOutcome::Failed(apology) => {
            let agent = agent_name(chat).await;
            println!("{}", cli_adapter::render_message(&apology, &agent));
        }
        SendOutcome::Rejected(reason) => eprintln!("{}", rejection_text(reason)),
    }
}

async fn agent_name<S: ConversationService>(chat: &ChatController<S>) -> String {
    chat.snapshot()
        .await
        .session
        .map(|s| s.agent_name)
        .unwrap_or_else(|| chat.settings().fallback_agent_name.clone())
}

fn rejection_text(reason: SendRejection) -> &'static str {
    match reason {
        SendRejection::Empty => "nothing to send",
        SendRejection::Busy => "still waiting for the previous reply",
        SendRejection::NotStarted => "the chat session has not started yet",
        SendRejection::RegistrationPending => {
            "a registration is waiting: type /confirm or /dismiss"
        }
        SendRejection::UnknownSuggestion => "no suggestion with that number",
        SendRejection::Discarded => "the session was closed before the reply arrived",
    }
}
