use super::model::ParseError;

/// Number of fixed-position header tokens: time, level, type, session.
pub const HEADER_TOKENS: usize = 4;

/// Fixed-position fields of a log line plus the message tokens after them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header<'a> {
    pub time: &'a str,
    pub level: &'a str,
    pub kind: &'a str,
    pub session: &'a str,
    pub duration: Option<u64>,
    pub message: Vec<&'a str>,
}

/// Split a line into its header fields and message tokens.
///
/// Layout: `<time> <level> <type> <session> <message...> [<N>ms]`.
/// The session token is wrapped in a delimiter pair (`[conn5]`), which is
/// stripped. A trailing `<digits>ms` token becomes `duration` and is removed
/// from the message.
pub fn extract(line: &str) -> Result<Header<'_>, ParseError> {
    let mut tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < HEADER_TOKENS {
        return Err(ParseError::MalformedLine(tokens.len()));
    }

    let duration = if tokens.len() > HEADER_TOKENS {
        tokens.last().and_then(|t| parse_duration(t))
    } else {
        None
    };
    if duration.is_some() {
        tokens.pop();
    }

    let message = tokens.split_off(HEADER_TOKENS);

    Ok(Header {
        time: tokens[0],
        level: tokens[1],
        kind: tokens[2],
        session: strip_delimiters(tokens[3]),
        duration,
        message,
    })
}

/// `117ms` → `Some(117)`. Values past `u64::MAX` saturate.
fn parse_duration(token: &str) -> Option<u64> {
    let digits = token.strip_suffix("ms")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.parse().unwrap_or(u64::MAX))
}

/// Drop the first and last character, e.g. `[conn5]` → `conn5`.
fn strip_delimiters(token: &str) -> &str {
    let mut chars = token.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}
