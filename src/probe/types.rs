use std::fmt;

/// A raw SMTP reply: numeric status code plus message text.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub message: String,
}

/// Steps of the fixed probe sequence, used to attribute failures.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStep {
    Greeting,
    Helo,
    MailFrom,
    RcptTo,
}

impl fmt::Display for ProbeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Greeting => "greeting",
            Self::Helo => "HELO",
            Self::MailFrom => "MAIL FROM",
            Self::RcptTo => "RCPT TO",
        };
        f.write_str(name)
    }
}

/// Terminal judgment of one probe handshake.
///
/// `accepted` is true only when RCPT TO came back 250/251. The detail string
/// keeps deliberate rejection distinguishable from infrastructure failure
/// even though both map to a negative verdict.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpExchangeResult {
    pub accepted: bool,
    pub detail: String,
}

impl SmtpExchangeResult {
    pub(crate) fn accepted() -> Self {
        Self {
            accepted: true,
            detail: "Email address exists".to_string(),
        }
    }

    pub(crate) fn rejected() -> Self {
        Self {
            accepted: false,
            detail: "Email address does not exist".to_string(),
        }
    }

    pub(crate) fn no_mail_exchange() -> Self {
        Self {
            accepted: false,
            detail: "No MX records found".to_string(),
        }
    }

    pub(crate) fn failed(detail: impl fmt::Display) -> Self {
        Self {
            accepted: false,
            detail: format!("SMTP check failed: {detail}"),
        }
    }
}
