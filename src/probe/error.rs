use std::io;

use thiserror::Error;

use super::types::ProbeStep;
use crate::mx::Error as MxError;

/// Errors raised inside one SMTP probe. None of them cross the
/// [`probe_address`](super::probe_address) boundary; they are classified
/// into an [`SmtpExchangeResult`](super::SmtpExchangeResult) detail.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("address '{address}' is not well-formed")]
    InvalidAddress { address: String },
    #[error(transparent)]
    Mx(#[from] MxError),
    #[error("no usable mail exchange for {domain}")]
    NoMailExchange { domain: String },
    #[error("no socket address resolved for {exchange}")]
    NoSocketAddress { exchange: String },
    #[error("connection to {exchange} failed: {source}")]
    Connect {
        exchange: String,
        #[source]
        source: io::Error,
    },
    #[error("I/O failure during {step}: {source}")]
    Io {
        step: ProbeStep,
        #[source]
        source: io::Error,
    },
    #[error("unexpected {code} reply during {step}")]
    UnexpectedReply { step: ProbeStep, code: u16 },
}
