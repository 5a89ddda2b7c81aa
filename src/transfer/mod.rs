//! Remote file store access.
//!
//! [`TransferClient`] is the seam between the publisher and the wire
//! protocol. The production implementation is [`FtpClient`]; tests use a
//! recording mock.
//!
//! A [`Session`] is one authenticated connection scoped to a single logical
//! operation (upload one image, list the gallery, upload the manifest).
//! [`Session::run`] connects, logs in, runs the work and then disconnects
//! exactly once, whether login or the work succeeded or not. A disconnect the
//! server does not acknowledge comes back in [`SessionOutcome::close_error`]
//! next to the work's own result.

pub mod ftp;

use crate::config::Config;
use std::path::Path;
use thiserror::Error;

pub use ftp::FtpClient;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Cannot connect to {host}: {reason}")]
    ConnectionFailed { host: String, reason: String },
    #[error("Login failed for {user}: {reason}")]
    AuthFailed { user: String, reason: String },
    #[error("Upload to {path} failed: {reason}")]
    TransferFailed { path: String, reason: String },
    #[error("Cannot list {path}: {reason}")]
    ListFailed { path: String, reason: String },
    #[error("Disconnect failed: {0}")]
    DisconnectFailed(String),
}

/// One name returned by a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub file_name: String,
}

impl RemoteEntry {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

/// Connect / authenticate / store / list / disconnect against a remote store.
///
/// Each call is attempted once. Implementations must not retry.
pub trait TransferClient {
    type Connection;

    fn connect(&self, host: &str, port: u16) -> Result<Self::Connection, TransferError>;

    /// Log in and put the connection in binary transfer mode.
    fn authenticate(
        &self,
        conn: &mut Self::Connection,
        user: &str,
        password: &str,
    ) -> Result<(), TransferError>;

    /// Upload `local_file` to `remote_path`, overwriting it.
    fn store(
        &self,
        conn: &mut Self::Connection,
        remote_path: &str,
        local_file: &Path,
    ) -> Result<(), TransferError>;

    /// File names directly inside `remote_dir`, in server order.
    fn list(
        &self,
        conn: &mut Self::Connection,
        remote_dir: &str,
    ) -> Result<Vec<RemoteEntry>, TransferError>;

    fn disconnect(&self, conn: Self::Connection) -> Result<(), TransferError>;
}

/// What a [`Session::run`] produced.
#[derive(Debug)]
pub struct SessionOutcome<T> {
    /// Result of connecting, logging in and running the work.
    pub result: Result<T, TransferError>,
    /// Set when the disconnect failed. Independent of `result`.
    pub close_error: Option<TransferError>,
}

/// An authenticated connection that is always disconnected exactly once.
pub struct Session<'c, C: TransferClient> {
    client: &'c C,
    conn: Option<C::Connection>,
}

impl<'c, C: TransferClient> Session<'c, C> {
    /// Connect to the configured host, log in, run `work` and disconnect.
    ///
    /// Once connected, the connection is closed on every path: after a
    /// rejected login, after failed work and after successful work.
    pub fn run<T>(
        client: &'c C,
        config: &Config,
        work: impl FnOnce(&mut Self) -> Result<T, TransferError>,
    ) -> SessionOutcome<T> {
        let conn = match client.connect(&config.address, config.remote.port) {
            Ok(conn) => conn,
            Err(e) => {
                return SessionOutcome {
                    result: Err(e),
                    close_error: None,
                };
            }
        };
        let mut session = Self {
            client,
            conn: Some(conn),
        };
        let result = client
            .authenticate(session.conn_mut(), &config.user, &config.password)
            .and_then(|()| work(&mut session));
        let close_error = session.close().err();
        SessionOutcome {
            result,
            close_error,
        }
    }

    fn conn_mut(&mut self) -> &mut C::Connection {
        self.conn
            .as_mut()
            .expect("connection is held until the session is consumed")
    }

    pub fn store(&mut self, remote_path: &str, local_file: &Path) -> Result<(), TransferError> {
        let client = self.client;
        client.store(self.conn_mut(), remote_path, local_file)
    }

    pub fn list(&mut self, remote_dir: &str) -> Result<Vec<RemoteEntry>, TransferError> {
        let client = self.client;
        client.list(self.conn_mut(), remote_dir)
    }

    fn close(mut self) -> Result<(), TransferError> {
        match self.conn.take() {
            Some(conn) => self.client.disconnect(conn),
            None => Ok(()),
        }
    }
}

impl<C: TransferClient> Drop for Session<'_, C> {
    fn drop(&mut self) {
        // Only still holding a connection when `work` panicked.
        if let Some(conn) = self.conn.take() {
            let _ = self.client.disconnect(conn);
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::test_helpers::test_config;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Connect { id: u32, host: String },
        Authenticate { id: u32, user: String },
        Store { id: u32, remote_path: String },
        List { id: u32, remote_dir: String },
        Disconnect { id: u32 },
    }

    /// Transfer client that records every call and fails on request.
    ///
    /// Connections are plain ids so tests can check that each one opened is
    /// closed exactly once.
    #[derive(Default)]
    pub struct MockTransferClient {
        pub listing: Vec<String>,
        pub fail_connect: bool,
        pub fail_auth: bool,
        pub fail_list: bool,
        pub fail_disconnect: bool,
        pub fail_store: HashSet<String>,
        pub calls: Mutex<Vec<Call>>,
        pub next_id: Mutex<u32>,
    }

    impl MockTransferClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_listing(names: &[&str]) -> Self {
            Self {
                listing: names.iter().map(|n| n.to_string()).collect(),
                ..Self::default()
            }
        }

        pub fn get_calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub fn stored_paths(&self) -> Vec<String> {
            self.get_calls()
                .into_iter()
                .filter_map(|c| match c {
                    Call::Store { remote_path, .. } => Some(remote_path),
                    _ => None,
                })
                .collect()
        }

        pub fn connect_count(&self) -> usize {
            self.get_calls()
                .iter()
                .filter(|c| matches!(c, Call::Connect { .. }))
                .count()
        }

        /// Panics unless every opened connection was closed exactly once.
        pub fn assert_sessions_balanced(&self) {
            let calls = self.get_calls();
            let opened: Vec<u32> = calls
                .iter()
                .filter_map(|c| match c {
                    Call::Connect { id, .. } => Some(*id),
                    _ => None,
                })
                .collect();
            let mut closed: Vec<u32> = calls
                .iter()
                .filter_map(|c| match c {
                    Call::Disconnect { id } => Some(*id),
                    _ => None,
                })
                .collect();
            closed.sort_unstable();
            assert_eq!(opened, closed, "unbalanced sessions in {calls:?}");
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl TransferClient for MockTransferClient {
        type Connection = u32;

        fn connect(&self, host: &str, _port: u16) -> Result<u32, TransferError> {
            if self.fail_connect {
                return Err(TransferError::ConnectionFailed {
                    host: host.to_string(),
                    reason: "refused".to_string(),
                });
            }
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            let id = *next;
            self.record(Call::Connect {
                id,
                host: host.to_string(),
            });
            Ok(id)
        }

        fn authenticate(
            &self,
            conn: &mut u32,
            user: &str,
            _password: &str,
        ) -> Result<(), TransferError> {
            self.record(Call::Authenticate {
                id: *conn,
                user: user.to_string(),
            });
            if self.fail_auth {
                return Err(TransferError::AuthFailed {
                    user: user.to_string(),
                    reason: "530 Login incorrect".to_string(),
                });
            }
            Ok(())
        }

        fn store(
            &self,
            conn: &mut u32,
            remote_path: &str,
            local_file: &Path,
        ) -> Result<(), TransferError> {
            self.record(Call::Store {
                id: *conn,
                remote_path: remote_path.to_string(),
            });
            if self.fail_store.contains(remote_path) || !local_file.is_file() {
                return Err(TransferError::TransferFailed {
                    path: remote_path.to_string(),
                    reason: "553 Could not create file".to_string(),
                });
            }
            Ok(())
        }

        fn list(
            &self,
            conn: &mut u32,
            remote_dir: &str,
        ) -> Result<Vec<RemoteEntry>, TransferError> {
            self.record(Call::List {
                id: *conn,
                remote_dir: remote_dir.to_string(),
            });
            if self.fail_list {
                return Err(TransferError::ListFailed {
                    path: remote_dir.to_string(),
                    reason: "550 No such directory".to_string(),
                });
            }
            Ok(self.listing.iter().map(RemoteEntry::new).collect())
        }

        fn disconnect(&self, conn: u32) -> Result<(), TransferError> {
            self.record(Call::Disconnect { id: conn });
            if self.fail_disconnect {
                return Err(TransferError::DisconnectFailed(
                    "421 Service not available".to_string(),
                ));
            }
            Ok(())
        }
    }

    fn store_one(client: &MockTransferClient, local: &Path) -> SessionOutcome<()> {
        Session::run(client, &test_config(), |session| {
            session.store("/remote/a.jpg", local)
        })
    }

    #[test]
    fn run_authenticates_works_and_disconnects() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let client = MockTransferClient::new();

        let outcome = store_one(&client, tmp.path());

        assert!(outcome.result.is_ok());
        assert!(outcome.close_error.is_none());
        assert_eq!(
            client.get_calls(),
            vec![
                Call::Connect {
                    id: 1,
                    host: "ftp.test".to_string()
                },
                Call::Authenticate {
                    id: 1,
                    user: "tester".to_string()
                },
                Call::Store {
                    id: 1,
                    remote_path: "/remote/a.jpg".to_string()
                },
                Call::Disconnect { id: 1 },
            ]
        );
    }

    #[test]
    fn auth_failure_skips_work_and_disconnects_once() {
        let client = MockTransferClient {
            fail_auth: true,
            ..MockTransferClient::new()
        };

        let outcome = store_one(&client, Path::new("/does/not/exist.jpg"));

        assert!(matches!(outcome.result, Err(TransferError::AuthFailed { .. })));
        assert!(outcome.close_error.is_none());
        assert!(client.stored_paths().is_empty());
        client.assert_sessions_balanced();
    }

    #[test]
    fn auth_and_disconnect_failures_are_both_reported() {
        let client = MockTransferClient {
            fail_auth: true,
            fail_disconnect: true,
            ..MockTransferClient::new()
        };

        let outcome = store_one(&client, Path::new("/does/not/exist.jpg"));

        assert!(matches!(outcome.result, Err(TransferError::AuthFailed { .. })));
        assert!(matches!(
            outcome.close_error,
            Some(TransferError::DisconnectFailed(_))
        ));
        client.assert_sessions_balanced();
    }

    #[test]
    fn connect_failure_opens_nothing() {
        let client = MockTransferClient {
            fail_connect: true,
            ..MockTransferClient::new()
        };

        let outcome = store_one(&client, Path::new("/does/not/exist.jpg"));

        assert!(matches!(
            outcome.result,
            Err(TransferError::ConnectionFailed { .. })
        ));
        assert!(outcome.close_error.is_none());
        assert!(client.get_calls().is_empty());
    }

    #[test]
    fn store_failure_disconnects_once() {
        let client = MockTransferClient::new();

        let outcome = store_one(&client, Path::new("/does/not/exist.jpg"));

        assert!(matches!(
            outcome.result,
            Err(TransferError::TransferFailed { .. })
        ));
        client.assert_sessions_balanced();
    }

    #[test]
    fn disconnect_failure_keeps_successful_result() {
        let client = MockTransferClient {
            fail_disconnect: true,
            ..MockTransferClient::with_listing(&["a.jpg"])
        };

        let outcome = Session::run(&client, &test_config(), |session| {
            session.list("/public_html/img/gallery")
        });

        assert_eq!(outcome.result.unwrap(), vec![RemoteEntry::new("a.jpg")]);
        assert!(outcome.close_error.is_some());
    }

    #[test]
    fn panicking_work_still_disconnects() {
        let client = MockTransferClient::new();

        let caught = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            Session::run(&client, &test_config(), |_| -> Result<(), TransferError> {
                panic!("work blew up")
            })
        }));

        assert!(caught.is_err());
        client.assert_sessions_balanced();
    }

    #[test]
    fn list_passes_through_server_order() {
        let client = MockTransferClient::with_listing(&["b.png", "a.jpg"]);

        let outcome = Session::run(&client, &test_config(), |session| {
            session.list("/public_html/img/gallery")
        });

        assert_eq!(
            outcome.result.unwrap(),
            vec![RemoteEntry::new("b.png"), RemoteEntry::new("a.jpg")]
        );
        client.assert_sessions_balanced();
    }
}
