//! Request identifiers for outstanding asynchronous calls.

use std::fmt;

/// Tags one asynchronous request. A result is only applied if its id is the
/// one the session is still waiting for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic source of [`RequestId`]s for one session.
#[derive(Debug, Default)]
pub struct RequestSeq(u64);

impl RequestSeq {
    pub fn next(&mut self) -> RequestId {
        self.0 += 1;
        RequestId(self.0)
    }
}
