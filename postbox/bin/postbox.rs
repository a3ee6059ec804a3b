use std::{io::Write, path::PathBuf, sync::Arc};

use clap::Parser;
use postbox::{SendRequest, find_config_file};
use postbox_common::logging;
use postbox_delivery::{Mailer, Payload};
use postbox_smtp::SmtpTransport;

/// Send an HTML email through an SMTP submission server
#[derive(Parser, Debug)]
#[command(name = "postbox")]
#[command(about = "Send an HTML email through an SMTP submission server", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the request file (RON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the message that would be sent instead of sending it
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init();

    let path = find_config_file(cli.config)?;
    let request = SendRequest::load(&path)?;
    let connection = request.connection.clone();
    let message = request.into_message()?;

    if cli.dry_run {
        let payload = Payload::build(&message);
        std::io::stdout().write_all(payload.as_bytes())?;
        return Ok(());
    }

    let transport = Arc::new(SmtpTransport::init());
    let result = Mailer::new(Arc::clone(&transport))
        .send(message, &connection)
        .await;

    if let Ok(transport) = Arc::try_unwrap(transport) {
        transport.shutdown();
    }

    match result {
        Ok(()) => {
            println!("Message sent via {}", connection.server_address());
            Ok(())
        }
        Err(e) => anyhow::bail!("Delivery failed (code {}): {e}", e.code()),
    }
}
