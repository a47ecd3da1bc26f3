//! Server errors.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Failure while binding or running the HTTP listener.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("server stopped unexpectedly: {0}")]
    Serve(#[source] io::Error),
}

impl ServerError {
    fn io_error(&self) -> &io::Error {
        match self {
            Self::Bind { source, .. } => source,
            Self::Serve(source) => source,
        }
    }

    /// Returns an operator hint for the common causes of this error.
    pub fn hint(&self) -> Option<&'static str> {
        let hint = match (self, self.io_error().kind()) {
            (Self::Bind { .. }, io::ErrorKind::AddrInUse) => {
                "another process is listening on this port; pick another PORT or stop it"
            }
            (Self::Bind { .. }, io::ErrorKind::PermissionDenied) => {
                "binding this port needs elevated privileges; use a PORT of 1024 or above"
            }
            (Self::Bind { .. }, io::ErrorKind::AddrNotAvailable) => {
                "HOST is not assigned to any local network interface"
            }
            (_, io::ErrorKind::TimedOut) => "consider raising REQUEST_TIMEOUT or SHUTDOWN_TIMEOUT",
            _ => return None,
        };

        Some(hint)
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, SocketAddrV4};

    use super::*;

    const ADDR: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 3000));

    #[test]
    fn port_in_use_has_a_hint() {
        let error = ServerError::Bind {
            addr: ADDR,
            source: io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
        };

        assert!(error.to_string().contains("127.0.0.1:3000"));
        assert!(error.hint().is_some_and(|hint| hint.contains("PORT")));
    }

    #[test]
    fn unclassified_errors_have_no_hint() {
        let error = ServerError::Serve(io::Error::other("boom"));
        assert!(error.hint().is_none());

        let error = ServerError::Bind {
            addr: ADDR,
            source: io::Error::other("boom"),
        };
        assert!(error.hint().is_none());
    }
}
