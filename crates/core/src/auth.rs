use std::fmt::{Display, Formatter};
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Identity of the caller issuing a request, carried for auditing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerContext {
    uid: u64,
    ip: Option<IpAddr>,
}

impl CallerContext {
    /// Creates a caller context from a forum user id and source address.
    #[must_use]
    pub fn new(uid: u64, ip: Option<IpAddr>) -> Self {
        Self { uid, ip }
    }

    /// Returns the acting user id. Guests use `0`.
    #[must_use]
    pub fn uid(&self) -> u64 {
        self.uid
    }

    /// Returns the source address, when known.
    #[must_use]
    pub fn ip(&self) -> Option<IpAddr> {
        self.ip
    }
}

impl Display for CallerContext {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self.ip {
            Some(ip) => write!(formatter, "uid:{}@{ip}", self.uid),
            None => write!(formatter, "uid:{}", self.uid),
        }
    }
}
