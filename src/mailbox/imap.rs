use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls;

use crate::error::MailboxError;

/// Per-command budget: the whole write and response read must fit in it.
pub const IMAP_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// Largest literal accepted from the server.
const MAX_LITERAL_BYTES: usize = 32 * 1024 * 1024;

/// Open an implicit-TLS connection and consume the server greeting.
pub async fn connect_tls(
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<ImapSession<TlsStream<TcpStream>>, MailboxError> {
    let endpoint = format!("{host}:{port}");
    let connection_error = |message: String| MailboxError::Connection {
        endpoint: endpoint.clone(),
        message,
    };

    let tls = tokio::time::timeout(timeout, async {
        let tcp = TcpStream::connect((host, port))
            .await
            .map_err(|e| connection_error(e.to_string()))?;

        let root_store: rustls::RootCertStore =
            webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect();
        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let connector = tokio_rustls::TlsConnector::from(Arc::new(tls_config));
        let domain = rustls::pki_types::ServerName::try_from(host.to_string())
            .map_err(|e| connection_error(format!("invalid server name: {e}")))?;
        connector
            .connect(domain, tcp)
            .await
            .map_err(|e| connection_error(format!("tls handshake: {e}")))
    })
    .await
    .map_err(|_| MailboxError::Timeout {
        operation: "imap connect",
        after: timeout,
    })??;

    ImapSession::handshake(tls, timeout).await
}

/// One untagged server response with any literals it carried.
#[derive(Debug, Default)]
struct Untagged {
    text: String,
    literals: Vec<Vec<u8>>,
}

/// Minimal IMAP4rev1 client: just the commands the agent needs.
pub struct ImapSession<S> {
    stream: BufReader<S>,
    next_tag: u32,
    timeout: Duration,
}

impl<S> ImapSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an established stream and read the `* OK` greeting.
    pub async fn handshake(stream: S, timeout: Duration) -> Result<Self, MailboxError> {
        let mut session = Self {
            stream: BufReader::new(stream),
            next_tag: 0,
            timeout,
        };

        let greeting = tokio::time::timeout(timeout, session.read_response_line())
            .await
            .map_err(|_| MailboxError::Timeout {
                operation: "imap greeting",
                after: timeout,
            })??;

        let text = greeting.text.trim_end();
        if text.starts_with("* OK") || text.starts_with("* PREAUTH") {
            Ok(session)
        } else {
            Err(MailboxError::Protocol(format!("unexpected greeting: {text}")))
        }
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), MailboxError> {
        let command = format!("LOGIN {} {}", quote(username)?, quote(password)?);
        match self.run("LOGIN", &command).await {
            Ok(_) => Ok(()),
            Err(MailboxError::Rejected { message, .. }) => Err(MailboxError::Auth(message)),
            Err(e) => Err(e),
        }
    }

    pub async fn select(&mut self, folder: &str) -> Result<(), MailboxError> {
        let command = format!("SELECT {}", quote(folder)?);
        self.run("SELECT", &command).await.map(|_| ())
    }

    /// UIDs of messages without `\Seen`, ascending.
    pub async fn search_unseen(&mut self) -> Result<Vec<String>, MailboxError> {
        let responses = self.run("UID SEARCH", "UID SEARCH UNSEEN").await?;
        let mut uids: Vec<u64> = responses
            .iter()
            .filter_map(|r| strip_prefix_ci(&r.text, "* SEARCH"))
            .flat_map(str::split_whitespace)
            .filter_map(|uid| uid.parse().ok())
            .collect();
        uids.sort_unstable();
        uids.dedup();
        Ok(uids.into_iter().map(|uid| uid.to_string()).collect())
    }

    /// Full message bytes via `BODY.PEEK[]`, leaving flags untouched.
    pub async fn fetch_message(&mut self, uid: &str) -> Result<Vec<u8>, MailboxError> {
        validate_uid(uid)?;
        let command = format!("UID FETCH {uid} (BODY.PEEK[])");
        let responses = self.run("UID FETCH", &command).await?;
        responses
            .into_iter()
            .filter(|r| r.text.to_ascii_uppercase().contains(" FETCH "))
            .find_map(|r| r.literals.into_iter().next())
            .ok_or_else(|| MailboxError::MissingMessage(uid.to_string()))
    }

    pub async fn mark_seen(&mut self, uid: &str) -> Result<(), MailboxError> {
        validate_uid(uid)?;
        let command = format!("UID STORE {uid} +FLAGS.SILENT (\\Seen)");
        self.run("UID STORE", &command).await.map(|_| ())
    }

    pub async fn logout(&mut self) -> Result<(), MailboxError> {
        self.run("LOGOUT", "LOGOUT").await.map(|_| ())
    }

    /// Send one tagged command and collect untagged responses up to its
    /// completion. `NO`/`BAD` become [`MailboxError::Rejected`].
    async fn run(&mut self, name: &str, command: &str) -> Result<Vec<Untagged>, MailboxError> {
        self.next_tag += 1;
        let tag = format!("a{}", self.next_tag);
        let timeout = self.timeout;

        tokio::time::timeout(timeout, self.exchange(name, &tag, command))
            .await
            .map_err(|_| MailboxError::Timeout {
                operation: "imap command",
                after: timeout,
            })?
    }

    async fn exchange(
        &mut self,
        name: &str,
        tag: &str,
        command: &str,
    ) -> Result<Vec<Untagged>, MailboxError> {
        let line = format!("{tag} {command}\r\n");
        let stream = self.stream.get_mut();
        stream.write_all(line.as_bytes()).await?;
        stream.flush().await?;

        let mut untagged = Vec::new();
        loop {
            let response = self.read_response_line().await?;
            let text = response.text.trim_end();

            if let Some(rest) = text.strip_prefix(tag).and_then(|r| r.strip_prefix(' ')) {
                let (status, message) = rest.split_once(' ').unwrap_or((rest, ""));
                return match status.to_ascii_uppercase().as_str() {
                    "OK" => Ok(untagged),
                    "NO" | "BAD" => Err(MailboxError::Rejected {
                        command: name.to_string(),
                        message: message.to_string(),
                    }),
                    other => Err(MailboxError::Protocol(format!(
                        "unexpected {name} status {other}"
                    ))),
                };
            }

            if text.starts_with("* BYE") && name != "LOGOUT" {
                return Err(MailboxError::Connection {
                    endpoint: "imap".into(),
                    message: text.to_string(),
                });
            }

            untagged.push(response);
        }
    }

    /// One logical response line, pulling in any `{n}` literals it announces.
    async fn read_response_line(&mut self) -> Result<Untagged, MailboxError> {
        let mut response = Untagged::default();
        loop {
            let mut raw = Vec::new();
            let n = self.stream.read_until(b'\n', &mut raw).await?;
            if n == 0 {
                return Err(MailboxError::Connection {
                    endpoint: "imap".into(),
                    message: "connection closed by server".into(),
                });
            }

            let chunk = String::from_utf8_lossy(&raw);
            let chunk = chunk.trim_end_matches(['\r', '\n']);
            response.text.push_str(chunk);

            let Some(size) = literal_size(chunk) else {
                return Ok(response);
            };
            if size > MAX_LITERAL_BYTES {
                return Err(MailboxError::Protocol(format!(
                    "literal of {size} bytes exceeds limit"
                )));
            }

            let mut literal = vec![0; size];
            self.stream.read_exact(&mut literal).await?;
            response.literals.push(literal);
        }
    }
}

/// `{123}` at the end of a line announces a literal of that many bytes.
fn literal_size(line: &str) -> Option<usize> {
    let open = line.rfind('{')?;
    let inner = line[open + 1..].strip_suffix('}')?;
    inner.parse().ok()
}

fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    text.get(..prefix.len())
        .filter(|head| head.eq_ignore_ascii_case(prefix))
        .map(|_| &text[prefix.len()..])
}

/// IMAP quoted string. Line breaks cannot be quoted.
fn quote(value: &str) -> Result<String, MailboxError> {
    if value.contains(['\r', '\n']) {
        return Err(MailboxError::Protocol(
            "line breaks are not allowed in IMAP arguments".into(),
        ));
    }
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    Ok(format!("\"{escaped}\""))
}

fn validate_uid(uid: &str) -> Result<(), MailboxError> {
    if !uid.is_empty() && uid.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(MailboxError::Protocol(format!("invalid uid {uid:?}")))
    }
}
