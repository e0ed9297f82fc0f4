use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use azure_email_adapter::email::{AddressInput, Attachment, Recipients};
use azure_email_adapter::{EmailAdapter, EmailConfig, SendEmailOptions, create_adapter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the email configuration file
    #[arg(short, long, default_value = "email.toml", global = true)]
    config: PathBuf,

    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send one email
    Send {
        /// Recipient address (repeatable)
        #[arg(long, required = true)]
        to: Vec<String>,

        #[arg(long)]
        cc: Vec<String>,

        #[arg(long)]
        bcc: Vec<String>,

        #[arg(long)]
        reply_to: Vec<String>,

        #[arg(short, long)]
        subject: Option<String>,

        /// Plain text body
        #[arg(long)]
        text: Option<String>,

        /// HTML body
        #[arg(long)]
        html: Option<String>,

        /// File to attach (repeatable)
        #[arg(long)]
        attach: Vec<PathBuf>,

        /// Submit the email without waiting for the service to finish with it
        #[arg(long)]
        no_wait: bool,
    },

    /// Load the configuration and build the adapter without sending anything
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Set up logging first
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = EmailConfig::load_from_file(&cli.config).await?;
    info!("Configuration loaded from: {:?}", cli.config);

    let adapter = create_adapter(&config)?;
    info!(
        "Using {} adapter, sending as {}",
        adapter.name(),
        adapter.default_from_address()
    );

    match cli.command {
        Commands::Check => {
            println!("Configuration OK");
        }
        Commands::Send {
            to,
            cc,
            bcc,
            reply_to,
            subject,
            text,
            html,
            attach,
            no_wait,
        } => {
            let mut attachments = Vec::new();
            for path in &attach {
                attachments.push(read_attachment(path).await?);
            }

            let message = SendEmailOptions {
                to: recipients(to),
                cc: recipients(cc),
                bcc: recipients(bcc),
                reply_to: recipients(reply_to),
                subject,
                text,
                html,
                attachments: (!attachments.is_empty()).then_some(attachments),
                ..Default::default()
            };

            let delivery = adapter.send_email(message).await?;
            if no_wait {
                println!("Email submitted");
                return Ok(());
            }

            let response = delivery.await?;
            println!("Email sent: {}", response.id);
        }
    }

    Ok(())
}

fn recipients(addresses: Vec<String>) -> Option<Recipients> {
    if addresses.is_empty() {
        return None;
    }
    Some(Recipients::Many(
        addresses.into_iter().map(AddressInput::from).collect(),
    ))
}

async fn read_attachment(path: &Path) -> Result<Attachment, Box<dyn std::error::Error>> {
    let content = tokio::fs::read(path).await?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| format!("Not a file: {}", path.display()))?;
    let content_type = mime_guess::from_path(path).first_or_octet_stream();

    Ok(Attachment::binary(filename, content).with_content_type(content_type.essence_str()))
}
