//! SSH connection and SFTP session bootstrap.

use russh::{client, Disconnect};
use russh_keys::key::PublicKey;
use russh_sftp::client::SftpSession;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Where and as whom to connect.
#[derive(Clone)]
pub struct ConnectOptions {
    pub user: String,
    pub password: String,
    /// Server address as `host:port`
    pub server: String,
    /// Maximum time to wait for an SFTP response, in seconds.
    /// The session default applies when unset.
    pub timeout: Option<u64>,
}

impl std::fmt::Debug for ConnectOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectOptions")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("server", &self.server)
            .field("timeout", &self.timeout)
            .finish()
    }
}

struct ClientHandler;

#[async_trait]
impl client::Handler for ClientHandler {
    type Error = Error;

    // host keys are not verified
    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        debug!(
            "accepting server key {}",
            server_public_key.fingerprint()
        );
        Ok(true)
    }
}

/// An authenticated SSH connection with its SFTP session.
pub struct Connection {
    ssh: client::Handle<ClientHandler>,
    sftp: SftpSession,
}

impl Connection {
    #[must_use]
    pub const fn sftp(&self) -> &SftpSession {
        &self.sftp
    }

    /// Closes the SFTP session, then the SSH connection.
    pub async fn close(self) -> Result<()> {
        if let Err(err) = self.sftp.close().await {
            warn!("closing sftp session: {err}");
        }

        self.ssh
            .disconnect(Disconnect::ByApplication, "", "English")
            .await?;
        Ok(())
    }
}

/// Connects with password authentication and starts the `sftp` subsystem.
pub async fn connect(options: &ConnectOptions) -> Result<Connection> {
    debug!("Establishing connection: {}@{}", options.user, options.server);

    let config = Arc::new(client::Config::default());
    let mut ssh = client::connect(config, options.server.as_str(), ClientHandler).await?;

    let authenticated = ssh
        .authenticate_password(options.user.as_str(), options.password.as_str())
        .await?;
    if !authenticated {
        return Err(Error::AuthRejected {
            user: options.user.clone(),
        });
    }

    let channel = ssh.channel_open_session().await?;
    channel.request_subsystem(true, "sftp").await?;

    let sftp = SftpSession::new(channel.into_stream())
        .await
        .map_err(Error::Session)?;
    if let Some(secs) = options.timeout {
        sftp.set_timeout(secs).await;
    }

    debug!("Connection successful");

    Ok(Connection { ssh, sftp })
}
