use std::borrow::Cow;
use std::time::Duration;

/// Controls how [`probe_address`](super::probe_address) drives the SMTP
/// handshake. Every network operation is bounded: DNS queries, the TCP
/// connect, and each command/reply round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    pub port: u16,
    /// Hostname announced in `HELO`; defaults to the target domain.
    pub helo_domain: Option<String>,
    pub dns_timeout: Duration,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            port: 25,
            helo_domain: None,
            dns_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(5),
            command_timeout: Duration::from_secs(5),
        }
    }
}

impl ProbeOptions {
    pub fn helo_name<'a>(&'a self, ascii_domain: &'a str) -> Cow<'a, str> {
        self.helo_domain
            .as_deref()
            .filter(|value| !value.is_empty())
            .map(Cow::Borrowed)
            .unwrap_or(Cow::Borrowed(ascii_domain))
    }
}
