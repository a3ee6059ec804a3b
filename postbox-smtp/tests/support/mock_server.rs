//! Scripted SMTP server for exercising the submission client.
//!
//! The server accepts any number of connections on a random local port,
//! answers every command from its configuration, and records what it saw so
//! tests can assert on the exact conversation:
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let server = MockSmtpServer::builder()
//!     .with_rcpt_to_response(550, "User unknown")
//!     .build()
//!     .await?;
//!
//! // connect to server.addr() ...
//!
//! server.shutdown();
//! # Ok(())
//! # }
//! ```

#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    sync::RwLock,
    time::timeout,
};

/// A command received by the mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmtpCommand {
    Ehlo(String),
    StartTls,
    /// The full AUTH line (or a continuation line during AUTH LOGIN).
    Auth(String),
    MailFrom(String),
    RcptTo(String),
    Data,
    /// Raw DATA content as received, still dot-stuffed, without the final `.` line.
    MessageContent(Vec<u8>),
    Quit,
    Other(String),
}

#[derive(Debug, Clone)]
pub struct SmtpResponse {
    pub code: u16,
    pub message: String,
}

impl SmtpResponse {
    fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        format!("{} {}\r\n", self.code, self.message).into_bytes()
    }
}

#[derive(Clone)]
struct MockServerConfig {
    greeting: SmtpResponse,
    ehlo_code: u16,
    capabilities: Vec<String>,
    starttls_response: SmtpResponse,
    auth_response: SmtpResponse,
    mail_from_response: SmtpResponse,
    rcpt_to_response: SmtpResponse,
    rejected_recipients: Vec<String>,
    data_response: SmtpResponse,
    data_end_response: SmtpResponse,
    quit_response: SmtpResponse,
    response_delay: Option<Duration>,
    hang_on_command: Option<usize>,
}

impl Default for MockServerConfig {
    fn default() -> Self {
        Self {
            greeting: SmtpResponse::new(220, "mock.example.com ESMTP ready"),
            ehlo_code: 250,
            capabilities: vec![
                "mock.example.com".to_string(),
                "SIZE 10000000".to_string(),
                "AUTH PLAIN LOGIN".to_string(),
            ],
            starttls_response: SmtpResponse::new(454, "TLS not available"),
            auth_response: SmtpResponse::new(235, "Authentication successful"),
            mail_from_response: SmtpResponse::new(250, "OK"),
            rcpt_to_response: SmtpResponse::new(250, "OK"),
            rejected_recipients: Vec::new(),
            data_response: SmtpResponse::new(354, "Start mail input; end with <CRLF>.<CRLF>"),
            data_end_response: SmtpResponse::new(250, "OK: Message accepted"),
            quit_response: SmtpResponse::new(221, "Bye"),
            response_delay: None,
            hang_on_command: None,
        }
    }
}

impl MockServerConfig {
    fn ehlo_bytes(&self) -> Vec<u8> {
        let last = self.capabilities.len().saturating_sub(1);
        self.capabilities
            .iter()
            .enumerate()
            .map(|(i, cap)| {
                let separator = if i == last { ' ' } else { '-' };
                format!("{}{separator}{cap}\r\n", self.ehlo_code)
            })
            .collect::<String>()
            .into_bytes()
    }
}

pub struct MockSmtpServer {
    addr: SocketAddr,
    commands_received: Arc<RwLock<Vec<SmtpCommand>>>,
    shutdown: Arc<AtomicBool>,
}

impl MockSmtpServer {
    #[must_use]
    pub fn builder() -> MockSmtpServerBuilder {
        MockSmtpServerBuilder {
            config: MockServerConfig::default(),
        }
    }

    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn commands(&self) -> Vec<SmtpCommand> {
        self.commands_received.read().await.clone()
    }

    /// The content of the first message received, if any.
    pub async fn message_content(&self) -> Option<Vec<u8>> {
        self.commands().await.into_iter().find_map(|c| match c {
            SmtpCommand::MessageContent(content) => Some(content),
            _ => None,
        })
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    #[allow(clippy::too_many_lines)]
    async fn handle_client(
        mut stream: TcpStream,
        config: Arc<MockServerConfig>,
        commands: Arc<RwLock<Vec<SmtpCommand>>>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let (reader, mut writer) = stream.split();
        let mut reader = BufReader::new(reader);
        let mut line = Vec::new();
        let mut count = 0;

        writer.write_all(&config.greeting.to_bytes()).await?;
        writer.flush().await?;

        loop {
            line.clear();
            let read = timeout(Duration::from_secs(10), reader.read_until(b'\n', &mut line)).await;
            let Ok(read) = read else {
                return Ok(());
            };
            if read? == 0 {
                return Ok(());
            }

            if config.hang_on_command == Some(count) {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                return Ok(());
            }
            count += 1;

            let cmd_line = String::from_utf8_lossy(&line).trim_end().to_string();
            let (verb, argument) = cmd_line
                .split_once(' ')
                .map_or((cmd_line.as_str(), ""), |(v, a)| (v, a));

            let (response, command) = match verb.to_uppercase().as_str() {
                "EHLO" => (config.ehlo_bytes(), SmtpCommand::Ehlo(argument.to_string())),
                "STARTTLS" => (config.starttls_response.to_bytes(), SmtpCommand::StartTls),
                "AUTH" if argument.eq_ignore_ascii_case("LOGIN") => {
                    commands.write().await.push(SmtpCommand::Auth(cmd_line.clone()));
                    // Username and password challenges.
                    for challenge in ["VXNlcm5hbWU6", "UGFzc3dvcmQ6"] {
                        writer
                            .write_all(format!("334 {challenge}\r\n").as_bytes())
                            .await?;
                        writer.flush().await?;
                        line.clear();
                        reader.read_until(b'\n', &mut line).await?;
                        let answer = String::from_utf8_lossy(&line).trim_end().to_string();
                        commands.write().await.push(SmtpCommand::Auth(answer));
                    }
                    writer.write_all(&config.auth_response.to_bytes()).await?;
                    writer.flush().await?;
                    continue;
                }
                "AUTH" => (
                    config.auth_response.to_bytes(),
                    SmtpCommand::Auth(cmd_line.clone()),
                ),
                "MAIL" => (
                    config.mail_from_response.to_bytes(),
                    SmtpCommand::MailFrom(argument.to_string()),
                ),
                "RCPT" => {
                    let rejected = config
                        .rejected_recipients
                        .iter()
                        .any(|r| argument.contains(r.as_str()));
                    let response = if rejected {
                        SmtpResponse::new(550, "User unknown").to_bytes()
                    } else {
                        config.rcpt_to_response.to_bytes()
                    };
                    (response, SmtpCommand::RcptTo(argument.to_string()))
                }
                "DATA" => (config.data_response.to_bytes(), SmtpCommand::Data),
                "QUIT" => {
                    commands.write().await.push(SmtpCommand::Quit);
                    writer.write_all(&config.quit_response.to_bytes()).await?;
                    writer.flush().await?;
                    return Ok(());
                }
                _ => (
                    SmtpResponse::new(500, "Unknown command").to_bytes(),
                    SmtpCommand::Other(cmd_line.clone()),
                ),
            };

            commands.write().await.push(command.clone());

            if let Some(delay) = config.response_delay {
                tokio::time::sleep(delay).await;
            }
            writer.write_all(&response).await?;
            writer.flush().await?;

            if command == SmtpCommand::Data && config.data_response.code == 354 {
                let mut content = Vec::new();
                loop {
                    line.clear();
                    if reader.read_until(b'\n', &mut line).await? == 0 {
                        return Ok(());
                    }
                    if line == b".\r\n" {
                        break;
                    }
                    content.extend_from_slice(&line);
                }
                commands
                    .write()
                    .await
                    .push(SmtpCommand::MessageContent(content));

                writer
                    .write_all(&config.data_end_response.to_bytes())
                    .await?;
                writer.flush().await?;
            }
        }
    }
}

pub struct MockSmtpServerBuilder {
    config: MockServerConfig,
}

impl MockSmtpServerBuilder {
    #[must_use]
    pub fn with_greeting(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.greeting = SmtpResponse::new(code, message);
        self
    }

    /// Replace the EHLO capability lines (the first entry is the greeting line).
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: &[&str]) -> Self {
        self.config.capabilities = capabilities.iter().map(ToString::to_string).collect();
        self
    }

    #[must_use]
    pub const fn with_ehlo_code(mut self, code: u16) -> Self {
        self.config.ehlo_code = code;
        self
    }

    #[must_use]
    pub fn with_starttls_response(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.starttls_response = SmtpResponse::new(code, message);
        self
    }

    #[must_use]
    pub fn with_auth_response(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.auth_response = SmtpResponse::new(code, message);
        self
    }

    #[must_use]
    pub fn with_mail_from_response(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.mail_from_response = SmtpResponse::new(code, message);
        self
    }

    #[must_use]
    pub fn with_rcpt_to_response(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.rcpt_to_response = SmtpResponse::new(code, message);
        self
    }

    /// Reject RCPT TO for this address with a 550.
    #[must_use]
    pub fn rejecting_recipient(mut self, address: impl Into<String>) -> Self {
        self.config.rejected_recipients.push(address.into());
        self
    }

    #[must_use]
    pub fn with_data_response(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.data_response = SmtpResponse::new(code, message);
        self
    }

    #[must_use]
    pub fn with_data_end_response(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.data_end_response = SmtpResponse::new(code, message);
        self
    }

    #[must_use]
    pub const fn with_response_delay(mut self, delay: Duration) -> Self {
        self.config.response_delay = Some(delay);
        self
    }

    /// Stop responding once the Nth command (0-indexed) arrives.
    #[must_use]
    pub const fn with_hang_on_command(mut self, index: usize) -> Self {
        self.config.hang_on_command = Some(index);
        self
    }

    /// Bind to a random local port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind.
    pub async fn build(self) -> Result<MockSmtpServer, std::io::Error> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let config = Arc::new(self.config);
        let commands = Arc::new(RwLock::new(Vec::new()));
        let shutdown = Arc::new(AtomicBool::new(false));

        let commands_clone = Arc::clone(&commands);
        let shutdown_clone = Arc::clone(&shutdown);

        tokio::spawn(async move {
            while !shutdown_clone.load(Ordering::Relaxed) {
                let accepted = timeout(Duration::from_millis(100), listener.accept()).await;

                if let Ok(Ok((stream, _peer))) = accepted {
                    let config = Arc::clone(&config);
                    let commands = Arc::clone(&commands_clone);

                    tokio::spawn(async move {
                        let _ = MockSmtpServer::handle_client(stream, config, commands).await;
                    });
                }
            }
        });

        Ok(MockSmtpServer {
            addr,
            commands_received: commands,
            shutdown,
        })
    }
}
