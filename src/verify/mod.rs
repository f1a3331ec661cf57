//! Verification orchestrator.
//!
//! Composes the shape check, the MX existence lookup, and the SMTP probe
//! into a single [`VerificationVerdict`]. Every failure mode of the
//! collaborators is downgraded into verdict fields; [`verify`] never raises
//! past its boundary.

mod options;
mod types;

pub use options::VerifyOptions;
pub use types::{DeliverabilityReport, VerificationVerdict};

use tracing::{debug, warn};

use crate::mx::{self, LookupMx, MxStatus};
use crate::probe::{self, SmtpExchangeResult};
use crate::syntax;

/// Verify `address` with default options.
pub fn verify(address: &str) -> VerificationVerdict {
    verify_with_options(address, &VerifyOptions::default())
}

/// Verify `address`: shape check, provider membership, MX existence, SMTP
/// probe. Always returns a verdict.
pub fn verify_with_options(address: &str, options: &VerifyOptions) -> VerificationVerdict {
    if !syntax::is_well_formed(address) {
        return VerificationVerdict::invalid_format();
    }
    match mx::bounded_resolver(options.probe.dns_timeout) {
        Ok(resolver) => verify_with_resolver(address, options, &resolver),
        Err(err) => {
            // the one fault that precedes any lookup; downgraded like any
            // other infrastructure failure
            warn!(error = %err, "resolver unavailable");
            match syntax::split_address(address) {
                Some((_, domain)) => {
                    compose(domain, options, false, SmtpExchangeResult::failed(err))
                }
                None => VerificationVerdict::invalid_format(),
            }
        }
    }
}

pub(crate) fn verify_with_resolver<R: LookupMx>(
    address: &str,
    options: &VerifyOptions,
    resolver: &R,
) -> VerificationVerdict {
    let (_, domain) = match syntax::split_address(address) {
        Some(parts) => parts,
        None => return VerificationVerdict::invalid_format(),
    };

    let has_mx_record = domain_has_mx(domain, resolver);
    // the probe runs even without MX records: it re-resolves and fails
    // cleanly, and its detail string distinguishes the failure modes
    let outcome = probe::probe_with_resolver(address, &options.probe, resolver);
    debug!(
        address,
        has_mx_record,
        accepted = outcome.accepted,
        "verification complete"
    );

    compose(domain, options, has_mx_record, outcome)
}

fn compose(
    domain: &str,
    options: &VerifyOptions,
    has_mx_record: bool,
    outcome: SmtpExchangeResult,
) -> VerificationVerdict {
    VerificationVerdict::Checked(DeliverabilityReport {
        is_valid: has_mx_record && outcome.accepted,
        domain: domain.to_string(),
        is_known_provider: options.is_known_provider(domain),
        has_mx_record,
        smtp_detail: outcome.detail,
    })
}

fn domain_has_mx<R: LookupMx>(domain: &str, resolver: &R) -> bool {
    let ascii = match mx::normalize_domain(domain) {
        Ok(ascii) => ascii,
        Err(_) => return false,
    };
    match mx::resolve_with(resolver, &ascii) {
        Ok(MxStatus::Records(_)) => true,
        Ok(MxStatus::NoRecords) => false,
        Err(err) => {
            warn!(domain, error = %err, "mx existence check failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mx::MxRecord;
    use crate::mx::tests::StubResolver;
    use std::io::{self, BufRead, BufReader, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;
    use trust_dns_resolver::error::ResolveError;

    fn spawn_mock_server(
        greeting: &'static str,
        script: Vec<(&'static str, &'static str)>,
    ) -> (u16, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let port = listener.local_addr().expect("addr").port();
        let (ready_tx, ready_rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            ready_tx.send(()).ok();
            if let Ok((mut stream, _)) = listener.accept() {
                let _ = handle_session(&mut stream, greeting, script);
            }
        });
        ready_rx.recv().expect("server ready");
        (port, handle)
    }

    fn handle_session(
        stream: &mut TcpStream,
        greeting: &str,
        script: Vec<(&'static str, &'static str)>,
    ) -> io::Result<()> {
        let mut reader = BufReader::new(stream.try_clone()?);
        stream.write_all(greeting.as_bytes())?;
        stream.flush()?;
        for (expected, response) in script {
            let mut line = String::new();
            reader.read_line(&mut line)?;
            assert!(
                line.starts_with(expected),
                "expected command starting with '{expected}', got '{line}'"
            );
            stream.write_all(response.as_bytes())?;
            stream.flush()?;
        }
        // the client must hang up after the scripted exchange; EOF here is
        // the observable single close
        let mut rest = String::new();
        let bytes = reader.read_line(&mut rest)?;
        assert_eq!(bytes, 0, "client should close after the last reply");
        Ok(())
    }

    fn loopback_resolver() -> StubResolver {
        StubResolver::new(|domain| {
            assert_eq!(domain, "example.com");
            Ok(vec![MxRecord::new(10, "127.0.0.1")])
        })
    }

    fn options_for(port: u16) -> VerifyOptions {
        let mut options = VerifyOptions::default();
        options.probe.port = port;
        options
    }

    fn checked(verdict: VerificationVerdict) -> DeliverabilityReport {
        match verdict {
            VerificationVerdict::Checked(report) => report,
            other => panic!("expected checked verdict, got {other:?}"),
        }
    }

    #[test]
    fn syntax_failure_short_circuits_without_lookup() {
        let resolver = StubResolver::new(|_| panic!("resolver must not be called"));
        let verdict =
            verify_with_resolver("not-an-address", &VerifyOptions::default(), &resolver);
        match verdict {
            VerificationVerdict::InvalidFormat { reason } => {
                assert_eq!(reason, "Invalid email format");
            }
            other => panic!("expected InvalidFormat, got {other:?}"),
        }
    }

    #[test]
    fn no_mx_records_invalidates_regardless_of_reachability() {
        let resolver = StubResolver::new(|_| Ok(Vec::new()));
        let verdict =
            verify_with_resolver("user@example.com", &VerifyOptions::default(), &resolver);
        let report = checked(verdict);
        assert!(!report.is_valid);
        assert!(!report.has_mx_record);
        assert_eq!(report.smtp_detail, "No MX records found");
        assert_eq!(report.domain, "example.com");
    }

    #[test]
    fn lookup_failure_counts_as_no_mail_exchange() {
        let resolver = StubResolver::new(|_| Err(ResolveError::from("simulated SERVFAIL")));
        let verdict =
            verify_with_resolver("user@example.com", &VerifyOptions::default(), &resolver);
        let report = checked(verdict);
        assert!(!report.is_valid);
        assert!(!report.has_mx_record);
        assert_eq!(report.smtp_detail, "No MX records found");
    }

    #[test]
    fn provider_membership_is_informational() {
        let resolver = StubResolver::new(|_| Ok(Vec::new()));
        let verdict =
            verify_with_resolver("user@Gmail.COM", &VerifyOptions::default(), &resolver);
        let report = checked(verdict);
        assert!(report.is_known_provider);
        assert!(!report.is_valid, "membership must not make an address valid");

        let resolver = StubResolver::new(|_| Ok(Vec::new()));
        let verdict =
            verify_with_resolver("user@example.com", &VerifyOptions::default(), &resolver);
        assert!(!checked(verdict).is_known_provider);
    }

    #[test]
    fn custom_provider_list_is_honored() {
        let resolver = StubResolver::new(|_| Ok(Vec::new()));
        let mut options = VerifyOptions::default();
        options.known_providers.push("corp.example".to_string());
        let verdict = verify_with_resolver("user@corp.example", &options, &resolver);
        assert!(checked(verdict).is_known_provider);
    }

    #[test]
    #[ignore = "requires loopback TCP binding"]
    fn accepting_exchange_yields_valid_verdict() {
        let (port, handle) = spawn_mock_server(
            "220 mock.smtp.test ESMTP\r\n",
            vec![
                ("HELO example.com", "250 mock.smtp.test\r\n"),
                ("MAIL FROM:<check@example.com>", "250 2.1.0 Ok\r\n"),
                ("RCPT TO:<user@example.com>", "250 2.1.5 Ok\r\n"),
            ],
        );
        // priority 10 (loopback) must be picked over priority 20 (unroutable)
        let resolver = StubResolver::new(|domain| {
            assert_eq!(domain, "example.com");
            Ok(vec![
                MxRecord::new(20, "192.0.2.1"),
                MxRecord::new(10, "127.0.0.1"),
            ])
        });
        let verdict = verify_with_resolver("user@example.com", &options_for(port), &resolver);
        let report = checked(verdict);
        assert!(report.is_valid);
        assert!(report.has_mx_record);
        assert_eq!(report.smtp_detail, "Email address exists");
        handle.join().expect("server thread");
    }

    #[test]
    #[ignore = "requires loopback TCP binding"]
    fn rejected_recipient_yields_invalid_verdict() {
        let (port, handle) = spawn_mock_server(
            "220 mock.smtp.test ESMTP\r\n",
            vec![
                ("HELO", "250 mock.smtp.test\r\n"),
                ("MAIL FROM:", "250 2.1.0 Ok\r\n"),
                ("RCPT TO:", "550 5.1.1 User unknown\r\n"),
            ],
        );
        let verdict =
            verify_with_resolver("user@example.com", &options_for(port), &loopback_resolver());
        let report = checked(verdict);
        assert!(!report.is_valid);
        assert!(report.has_mx_record, "550 is a protocol outcome, not a failure");
        assert_eq!(report.smtp_detail, "Email address does not exist");
        handle.join().expect("server thread");
    }

    #[test]
    #[ignore = "requires loopback TCP binding"]
    fn unexpected_code_mid_sequence_fails_probe() {
        let (port, handle) = spawn_mock_server(
            "220 mock.smtp.test ESMTP\r\n",
            vec![
                ("HELO", "250 mock.smtp.test\r\n"),
                ("MAIL FROM:", "421 try again later\r\n"),
            ],
        );
        let verdict =
            verify_with_resolver("user@example.com", &options_for(port), &loopback_resolver());
        let report = checked(verdict);
        assert!(!report.is_valid);
        assert!(
            report.smtp_detail.starts_with("SMTP check failed"),
            "{}",
            report.smtp_detail
        );
        handle.join().expect("server thread");
    }

    #[test]
    #[ignore = "requires loopback TCP binding"]
    fn silent_server_times_out_cleanly() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let port = listener.local_addr().expect("addr").port();
        let handle = thread::spawn(move || {
            // accept and never send the greeting
            if let Ok((stream, _)) = listener.accept() {
                thread::sleep(Duration::from_millis(500));
                drop(stream);
            }
        });

        let mut options = options_for(port);
        options.probe.command_timeout = Duration::from_millis(100);
        let verdict =
            verify_with_resolver("user@example.com", &options, &loopback_resolver());
        let report = checked(verdict);
        assert!(!report.is_valid);
        assert!(
            report.smtp_detail.starts_with("SMTP check failed"),
            "{}",
            report.smtp_detail
        );
        handle.join().expect("server thread");
    }
}
