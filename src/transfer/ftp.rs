//! FTP implementation of [`TransferClient`] on top of `suppaftp`.
//!
//! Plain FTP, blocking I/O, library default timeouts and passive mode.
//! Images are not text-safe, so the connection is switched to binary
//! (`TYPE I`) right after login and before any upload.

use super::{RemoteEntry, TransferClient, TransferError};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use suppaftp::FtpStream;
use suppaftp::types::FileType;

/// Stateless FTP client; every [`connect`](TransferClient::connect) opens a
/// fresh control connection.
#[derive(Debug, Default, Clone, Copy)]
pub struct FtpClient;

impl FtpClient {
    pub fn new() -> Self {
        Self
    }
}

/// Reduce a listing line to its last path segment.
///
/// Servers differ on whether `NLST <dir>` answers with bare names or full
/// paths; the gallery only cares about the file name.
fn entry_name(line: &str) -> Option<&str> {
    let name = line.trim_end_matches(['\r', '\n']).rsplit('/').next()?;
    match name {
        "" | "." | ".." => None,
        other => Some(other),
    }
}

impl TransferClient for FtpClient {
    type Connection = FtpStream;

    fn connect(&self, host: &str, port: u16) -> Result<FtpStream, TransferError> {
        FtpStream::connect((host, port)).map_err(|e| TransferError::ConnectionFailed {
            host: format!("{host}:{port}"),
            reason: e.to_string(),
        })
    }

    fn authenticate(
        &self,
        conn: &mut FtpStream,
        user: &str,
        password: &str,
    ) -> Result<(), TransferError> {
        let auth_failed = |e: suppaftp::FtpError| TransferError::AuthFailed {
            user: user.to_string(),
            reason: e.to_string(),
        };
        conn.login(user, password).map_err(auth_failed)?;
        conn.transfer_type(FileType::Binary).map_err(auth_failed)
    }

    fn store(
        &self,
        conn: &mut FtpStream,
        remote_path: &str,
        local_file: &Path,
    ) -> Result<(), TransferError> {
        let failed = |reason: String| TransferError::TransferFailed {
            path: remote_path.to_string(),
            reason,
        };
        let file = File::open(local_file)
            .map_err(|e| failed(format!("cannot read {}: {e}", local_file.display())))?;
        let mut reader = BufReader::new(file);
        conn.put_file(remote_path, &mut reader)
            .map_err(|e| failed(e.to_string()))?;
        Ok(())
    }

    fn list(
        &self,
        conn: &mut FtpStream,
        remote_dir: &str,
    ) -> Result<Vec<RemoteEntry>, TransferError> {
        let lines = conn
            .nlst(Some(remote_dir))
            .map_err(|e| TransferError::ListFailed {
                path: remote_dir.to_string(),
                reason: e.to_string(),
            })?;
        Ok(lines
            .iter()
            .filter_map(|line| entry_name(line))
            .map(RemoteEntry::new)
            .collect())
    }

    fn disconnect(&self, mut conn: FtpStream) -> Result<(), TransferError> {
        conn.quit()
            .map_err(|e| TransferError::DisconnectFailed(e.to_string()))
    }
}
