#![forbid(unsafe_code)]
//! mailprobe — email deliverability probing (MX lookup + partial SMTP handshake)

pub mod mx;
pub mod probe;
pub mod syntax;
pub mod verify;

pub use mx::{Error as MxError, MxRecord, MxStatus, check_mx, has_mx_record};
pub use probe::{ProbeError, ProbeOptions, ProbeStep, SmtpExchangeResult, SmtpReply, probe_address};
pub use verify::{
    DeliverabilityReport, VerificationVerdict, VerifyOptions, verify, verify_with_options,
};
