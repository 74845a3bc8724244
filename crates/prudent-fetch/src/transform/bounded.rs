use std::io::{self, Read};

use crate::error::StreamBoundError;

/// Fails once more than `limit` bytes have come through.
///
/// Exactly `limit` bytes are delivered before the error; a stream of exactly
/// `limit` bytes ends normally.
#[derive(Debug)]
pub struct BoundedReader<R> {
    inner: R,
    limit: u64,
    count: u64,
    system_id: String,
    exceeded: bool,
}

impl<R: Read> BoundedReader<R> {
    pub fn new(inner: R, limit: u64, system_id: impl Into<String>) -> Self {
        Self {
            inner,
            limit,
            count: 0,
            system_id: system_id.into(),
            exceeded: false,
        }
    }

    pub fn count(&self) -> u64 { self.count }

    fn bound_error(&self) -> io::Error {
        StreamBoundError {
            system_id: self.system_id.clone(),
            limit: self.limit,
        }
        .into()
    }
}

impl<R: Read> Read for BoundedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.exceeded {
            return Err(self.bound_error());
        }
        if buf.is_empty() {
            return Ok(0);
        }

        if self.count < self.limit {
            let left = self.limit - self.count;
            let max = usize::try_from(left).map_or(buf.len(), |l| l.min(buf.len()));
            let n = self.inner.read(&mut buf[..max])?;
            self.count += n as u64;
            return Ok(n);
        }

        // At the limit: one more byte tells "ends here" apart from "goes on".
        let mut extra = [0u8; 1];
        match self.inner.read(&mut extra)? {
            0 => Ok(0),
            _ => {
                self.exceeded = true;
                Err(self.bound_error())
            }
        }
    }
}
