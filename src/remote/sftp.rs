use russh_sftp::{
    client::{error::Error, fs::File, SftpSession},
    protocol::StatusCode,
};

use super::{RemoteError, RemoteFs};
use crate::path::{is_implicit, remote_ancestors};

enum Existing {
    Directory,
    Missing,
}

async fn existing(session: &SftpSession, path: &str) -> Result<Existing, RemoteError> {
    match session.metadata(path).await {
        Ok(attrs) if attrs.is_dir() => Ok(Existing::Directory),
        Ok(_) => Err(RemoteError::NotADirectory(path.to_owned())),
        Err(Error::Status(status)) if status.status_code == StatusCode::NoSuchFile => {
            Ok(Existing::Missing)
        }
        Err(err) => Err(err.into()),
    }
}

#[async_trait]
impl RemoteFs for SftpSession {
    type File = File;

    async fn create_dir_all(&self, path: &str) -> Result<(), RemoteError> {
        if is_implicit(path) {
            return Ok(());
        }
        if let Existing::Directory = existing(self, path).await? {
            return Ok(());
        }

        for dir in remote_ancestors(path) {
            if let Existing::Directory = existing(self, dir).await? {
                continue;
            }

            trace!("mkdir {dir}");
            if let Err(err) = self.create_dir(dir).await {
                // someone else may have created it in between
                match existing(self, dir).await {
                    Ok(Existing::Directory) => {}
                    _ => return Err(err.into()),
                }
            }
        }

        Ok(())
    }

    async fn create_file(&self, path: &str) -> Result<Self::File, RemoteError> {
        Ok(self.create(path).await?)
    }

    async fn close(&self) -> Result<(), RemoteError> {
        Ok(SftpSession::close(self).await?)
    }
}
