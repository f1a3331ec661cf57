use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use super::types::SmtpReply;

/// One live connection to a mail exchange. The session owns the socket for
/// the duration of a probe; dropping it closes the connection, which is how
/// every probe path releases the socket exactly once.
pub(crate) struct SmtpSession {
    stream: TcpStream,
    reader: BufReader<TcpStream>,
}

impl SmtpSession {
    /// Try each candidate address in turn; the first successful connect wins.
    pub(crate) fn connect(
        addrs: &[SocketAddr],
        connect_timeout: Duration,
        command_timeout: Duration,
    ) -> io::Result<Self> {
        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(addr, connect_timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(command_timeout))?;
                    stream.set_write_timeout(Some(command_timeout))?;
                    let reader = BufReader::new(stream.try_clone()?);
                    return Ok(Self { stream, reader });
                }
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "no socket address available",
            )
        }))
    }

    pub(crate) fn send_command(&mut self, command: &str) -> io::Result<()> {
        let mut line = command.as_bytes().to_vec();
        line.extend_from_slice(b"\r\n");
        self.stream.write_all(&line)?;
        self.stream.flush()
    }

    /// Read one full SMTP reply, consuming continuation lines.
    pub(crate) fn read_reply(&mut self) -> io::Result<SmtpReply> {
        let mut code = None;
        let mut message_lines = Vec::new();
        loop {
            let mut raw = String::new();
            let bytes = self.reader.read_line(&mut raw)?;
            if bytes == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed while reading reply",
                ));
            }

            let (line_code, continuation, text) = parse_reply_line(trim_crlf(&raw))?;
            if let Some(existing) = code {
                if existing != line_code {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("inconsistent SMTP reply codes: {existing} vs {line_code}"),
                    ));
                }
            } else {
                code = Some(line_code);
            }
            message_lines.push(text.to_string());
            if !continuation {
                break;
            }
        }
        Ok(SmtpReply {
            code: code.ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidData, "SMTP reply missing status code")
            })?,
            message: message_lines.join("\n"),
        })
    }
}

fn trim_crlf(raw: &str) -> &str {
    let line = raw.strip_suffix('\n').unwrap_or(raw);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Split `NNN[- ]text`: the status code is the first three characters; a `-`
/// in position four marks a continuation line.
pub(crate) fn parse_reply_line(line: &str) -> io::Result<(u16, bool, &str)> {
    let code_part = line.get(..3).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("invalid SMTP reply: '{line}'"),
        )
    })?;
    let code = code_part.parse::<u16>().map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("invalid SMTP status code: '{code_part}'"),
        )
    })?;
    let continuation = line.as_bytes().get(3).copied() == Some(b'-');
    let text = line.get(4..).unwrap_or("");
    Ok((code, continuation, text))
}
