use std::fmt;
use std::io::{self, Read};

use crate::effects::Connection;
use crate::error::SystemIdError;

enum Lease {
    Held(Box<dyn Connection>),
    Released,
}

/// Byte stream that owns the connection it reads from.
///
/// The connection is let go exactly once, by whichever happens first:
///
/// - [`close`](Self::close): released back to the pool.
/// - a read error: aborted, then released. The error is re-raised tagged
///   with the base URI.
/// - drop without `close`: aborted, then released. Failures are logged and
///   swallowed.
///
/// Later triggers find the lease already gone and do nothing.
pub struct ManagedStream {
    inner: Box<dyn Read + Send>,
    lease: Lease,
    base_uri: String,
}

impl fmt::Debug for ManagedStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedStream")
            .field("base_uri", &self.base_uri)
            .field("released", &self.is_released())
            .finish_non_exhaustive()
    }
}

impl ManagedStream {
    pub fn new(
        inner: Box<dyn Read + Send>,
        connection: Box<dyn Connection>,
        base_uri: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            lease: Lease::Held(connection),
            base_uri: base_uri.into(),
        }
    }

    pub fn base_uri(&self) -> &str { &self.base_uri }

    pub fn is_released(&self) -> bool { matches!(self.lease, Lease::Released) }

    /// Finish with the stream and return its connection to the pool.
    /// Calling it again is a no-op.
    pub fn close(&mut self) {
        let Some(mut connection) = self.take_lease() else {
            return;
        };
        tracing::debug!(uri = %self.base_uri, "close: releasing connection");
        if let Err(e) = connection.release() {
            tracing::debug!(uri = %self.base_uri, error = %e, "close: release failed");
        }
    }

    fn discard(&mut self, trigger: &'static str) {
        let Some(mut connection) = self.take_lease() else {
            return;
        };
        tracing::debug!(uri = %self.base_uri, trigger, "aborting connection");
        if let Err(e) = connection.abort() {
            tracing::debug!(uri = %self.base_uri, trigger, error = %e, "abort failed");
        }
        if let Err(e) = connection.release() {
            tracing::debug!(uri = %self.base_uri, trigger, error = %e, "release failed");
        }
    }

    fn take_lease(&mut self) -> Option<Box<dyn Connection>> {
        match std::mem::replace(&mut self.lease, Lease::Released) {
            Lease::Held(connection) => {
                self.inner = Box::new(io::empty());
                Some(connection)
            }
            Lease::Released => None,
        }
    }
}

impl Read for ManagedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.is_released() {
            return Err(SystemIdError::released(&self.base_uri));
        }
        match self.inner.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Err(e),
            Err(e) => {
                self.discard("read error");
                Err(SystemIdError::locate(&self.base_uri, e))
            }
        }
    }
}

impl Drop for ManagedStream {
    fn drop(&mut self) { self.discard("dropped without close"); }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::StreamBoundError;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Release,
        Abort,
    }

    #[derive(Clone, Default)]
    struct Log(Arc<Mutex<Vec<Call>>>);

    impl Log {
        fn calls(&self) -> Vec<Call> { self.0.lock().unwrap().clone() }
    }

    struct FakeConnection {
        log: Log,
        fail: bool,
    }

    impl Connection for FakeConnection {
        fn release(&mut self) -> io::Result<()> {
            self.log.0.lock().unwrap().push(Call::Release);
            if self.fail { Err(io::Error::other("release exploded")) } else { Ok(()) }
        }

        fn abort(&mut self) -> io::Result<()> {
            self.log.0.lock().unwrap().push(Call::Abort);
            if self.fail { Err(io::Error::other("abort exploded")) } else { Ok(()) }
        }
    }

    struct Failing(io::ErrorKind);

    impl Read for Failing {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(self.0, "connection reset"))
        }
    }

    fn stream(inner: impl Read + Send + 'static, fail: bool) -> (ManagedStream, Log) {
        let log = Log::default();
        let connection = FakeConnection {
            log: log.clone(),
            fail,
        };
        (
            ManagedStream::new(Box::new(inner), Box::new(connection), "http://example.org/final"),
            log,
        )
    }

    #[test]
    fn close_releases_once() {
        let (mut s, log) = stream(Cursor::new(b"abc".to_vec()), false);
        let mut out = Vec::new();
        s.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"abc");

        s.close();
        s.close();
        s.close();
        drop(s);
        assert_eq!(log.calls(), vec![Call::Release]);
    }

    #[test]
    fn read_error_aborts_then_releases() {
        let (mut s, log) = stream(Failing(io::ErrorKind::ConnectionReset), false);
        let mut buf = [0u8; 8];

        let err = s.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        let located = err.get_ref().unwrap().downcast_ref::<SystemIdError>().unwrap();
        assert_eq!(located.system_id, "http://example.org/final");
        assert!(s.is_released());

        s.close();
        drop(s);
        assert_eq!(log.calls(), vec![Call::Abort, Call::Release]);
    }

    #[test]
    fn bound_errors_pass_through_unwrapped() {
        struct Bound;
        impl Read for Bound {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(StreamBoundError {
                    system_id: "http://example.org/big".into(),
                    limit: 5,
                }
                .into())
            }
        }

        let (mut s, log) = stream(Bound, false);
        let err = s.read(&mut [0u8; 4]).unwrap_err();
        assert!(err.get_ref().unwrap().is::<StreamBoundError>());
        assert_eq!(log.calls(), vec![Call::Abort, Call::Release]);
    }

    #[test]
    fn reads_after_release_fail() {
        let (mut s, _log) = stream(Cursor::new(b"abc".to_vec()), false);
        s.close();
        let err = s.read(&mut [0u8; 4]).unwrap_err();
        assert!(err.to_string().contains("http://example.org/final"));
    }

    #[test]
    fn drop_without_close_aborts() {
        let (mut s, log) = stream(Cursor::new(vec![0u8; 100]), false);
        let mut buf = [0u8; 10];
        s.read_exact(&mut buf).unwrap();
        drop(s);
        assert_eq!(log.calls(), vec![Call::Abort, Call::Release]);
    }

    #[test]
    fn drop_swallows_connection_failures() {
        let (s, log) = stream(Cursor::new(Vec::new()), true);
        drop(s);
        assert_eq!(log.calls(), vec![Call::Abort, Call::Release]);
    }

    #[test]
    fn interrupted_reads_keep_the_lease() {
        let (mut s, log) = stream(Failing(io::ErrorKind::Interrupted), false);
        let err = s.read(&mut [0u8; 4]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Interrupted);
        assert!(!s.is_released());

        s.close();
        assert_eq!(log.calls(), vec![Call::Release]);
    }
}
