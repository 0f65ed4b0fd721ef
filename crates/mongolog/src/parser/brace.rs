use super::cursor::TokenCursor;
use super::model::ParseError;

/// Capture the brace-balanced span starting at the cursor.
///
/// Returns `Ok(None)` without consuming anything when the next token is not
/// exactly `{`. Otherwise consumes through the matching close and returns the
/// tokens joined with single spaces. A closing `},` is rendered as `}`.
///
/// Only whole tokens count toward depth: `{`, `}` and `},`. Tokens such as
/// `{a:` or `[` are carried through untouched.
pub fn extract_span(cursor: &mut TokenCursor<'_>) -> Result<Option<String>, ParseError> {
    if cursor.peek() != Some("{") {
        return Ok(None);
    }

    let mut parts: Vec<&str> = Vec::new();
    let mut depth = 0usize;

    while let Some(token) = cursor.pop() {
        match token {
            "{" => depth += 1,
            "}" | "}," => depth -= 1,
            _ => {}
        }

        if depth == 0 {
            parts.push("}");
            return Ok(Some(parts.join(" ")));
        }
        parts.push(token);
    }

    Err(ParseError::UnterminatedBrace {
        depth,
        consumed: parts.len(),
    })
}
