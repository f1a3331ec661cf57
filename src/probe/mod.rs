//! SMTP probe client.
//!
//! Drives the bounded greeting/HELO/MAIL FROM/RCPT TO sequence against the
//! highest-priority mail exchange of the target domain and classifies the
//! final reply into an [`SmtpExchangeResult`]. No message is ever sent: the
//! dialogue stops after RCPT TO and the connection is closed.

mod error;
mod options;
mod session;
mod types;

pub use error::ProbeError;
pub use options::ProbeOptions;
pub use types::{ProbeStep, SmtpExchangeResult, SmtpReply};

use std::io;
use std::net::{SocketAddr, ToSocketAddrs};

use tracing::{debug, warn};

use crate::mx::{self, LookupMx};
use crate::syntax;

use session::SmtpSession;
use types::ProbeStep as Step;

const GREETING_CODES: &[u16] = &[220];
const HELO_CODES: &[u16] = &[250];
const MAIL_FROM_CODES: &[u16] = &[250];
// RCPT TO is unusual: the permanent-rejection codes are valid protocol
// outcomes here, they just mean the mailbox does not exist.
const RCPT_TO_CODES: &[u16] = &[250, 251, 550, 553, 554];
const RCPT_ACCEPT_CODES: &[u16] = &[250, 251];

/// Probe the mail exchange of `address`'s domain for recipient acceptance.
///
/// Always returns a result: transport errors, protocol mismatches, and
/// missing MX records are classified into a negative [`SmtpExchangeResult`]
/// with a diagnostic detail instead of propagating.
pub fn probe_address(address: &str, options: &ProbeOptions) -> SmtpExchangeResult {
    let resolver = match mx::bounded_resolver(options.dns_timeout) {
        Ok(resolver) => resolver,
        Err(err) => return SmtpExchangeResult::failed(err),
    };
    probe_with_resolver(address, options, &resolver)
}

pub(crate) fn probe_with_resolver<R: LookupMx>(
    address: &str,
    options: &ProbeOptions,
    resolver: &R,
) -> SmtpExchangeResult {
    match run_handshake(address, options, resolver) {
        Ok(reply) if RCPT_ACCEPT_CODES.contains(&reply.code) => SmtpExchangeResult::accepted(),
        Ok(_) => SmtpExchangeResult::rejected(),
        Err(err) => {
            warn!(address, error = %err, "smtp probe failed");
            classify_failure(err)
        }
    }
}

/// Resolution failure and an empty MX set read the same from outside: no
/// usable mail exchange. Everything else is an infrastructure failure.
fn classify_failure(err: ProbeError) -> SmtpExchangeResult {
    match err {
        ProbeError::NoMailExchange { .. } | ProbeError::Mx(mx::Error::Lookup { .. }) => {
            SmtpExchangeResult::no_mail_exchange()
        }
        other => SmtpExchangeResult::failed(other),
    }
}

/// `Connecting → AwaitingGreeting → SentHelo → SentMailFrom → SentRcptTo`;
/// the session drop at the end of this function is the single close, reached
/// on every exit path.
fn run_handshake<R: LookupMx>(
    address: &str,
    options: &ProbeOptions,
    resolver: &R,
) -> Result<SmtpReply, ProbeError> {
    let (_, domain) = syntax::split_address(address).ok_or_else(|| ProbeError::InvalidAddress {
        address: address.to_string(),
    })?;
    let ascii_domain = mx::normalize_domain(domain)?;

    let status = mx::resolve_with(resolver, &ascii_domain)?;
    let exchange = match status.records().first() {
        Some(record) => record.exchange.clone(),
        None => {
            return Err(ProbeError::NoMailExchange {
                domain: ascii_domain,
            });
        }
    };

    let addrs = resolve_socket_addrs(&exchange, options.port).map_err(|source| {
        ProbeError::Connect {
            exchange: exchange.clone(),
            source,
        }
    })?;
    if addrs.is_empty() {
        return Err(ProbeError::NoSocketAddress { exchange });
    }

    debug!(%exchange, port = options.port, "connecting to mail exchange");
    let mut session = SmtpSession::connect(&addrs, options.connect_timeout, options.command_timeout)
        .map_err(|source| ProbeError::Connect {
            exchange: exchange.clone(),
            source,
        })?;

    let greeting = read_step(&mut session, Step::Greeting, GREETING_CODES)?;
    debug!(code = greeting.code, "greeting received");

    let helo = options.helo_name(&ascii_domain);
    exchange_step(&mut session, Step::Helo, &format!("HELO {helo}"), HELO_CODES)?;
    exchange_step(
        &mut session,
        Step::MailFrom,
        &format!("MAIL FROM:<check@{ascii_domain}>"),
        MAIL_FROM_CODES,
    )?;
    let reply = exchange_step(
        &mut session,
        Step::RcptTo,
        &format!("RCPT TO:<{address}>"),
        RCPT_TO_CODES,
    )?;
    debug!(code = reply.code, "rcpt reply received");
    Ok(reply)
}

fn read_step(
    session: &mut SmtpSession,
    step: Step,
    expected: &[u16],
) -> Result<SmtpReply, ProbeError> {
    let reply = session
        .read_reply()
        .map_err(|source| ProbeError::Io { step, source })?;
    expect_code(step, reply, expected)
}

fn exchange_step(
    session: &mut SmtpSession,
    step: Step,
    command: &str,
    expected: &[u16],
) -> Result<SmtpReply, ProbeError> {
    session
        .send_command(command)
        .map_err(|source| ProbeError::Io { step, source })?;
    read_step(session, step, expected)
}

fn expect_code(step: Step, reply: SmtpReply, expected: &[u16]) -> Result<SmtpReply, ProbeError> {
    if expected.contains(&reply.code) {
        Ok(reply)
    } else {
        Err(ProbeError::UnexpectedReply {
            step,
            code: reply.code,
        })
    }
}

fn resolve_socket_addrs(exchange: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
    format!("{exchange}:{port}")
        .to_socket_addrs()
        .map(|iter| iter.collect())
}
