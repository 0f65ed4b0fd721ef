/// Consumable view over the message tokens of one line.
///
/// Consumption only moves an offset; the token slice itself is never
/// mutated or copied. A single pushed-back token is supported so the
/// `locks:{` keyword can hand the brace extractor the `{` it expects.
#[derive(Debug, Clone)]
pub struct TokenCursor<'a> {
    tokens: &'a [&'a str],
    pos: usize,
    pushed: Option<&'a str>,
}

impl<'a> TokenCursor<'a> {
    pub fn new(tokens: &'a [&'a str]) -> Self {
        Self { tokens, pos: 0, pushed: None }
    }

    #[inline]
    pub fn peek(&self) -> Option<&'a str> {
        self.pushed.or_else(|| self.tokens.get(self.pos).copied())
    }

    #[inline]
    pub fn pop(&mut self) -> Option<&'a str> {
        if let Some(token) = self.pushed.take() {
            return Some(token);
        }
        let token = self.tokens.get(self.pos).copied()?;
        self.pos += 1;
        Some(token)
    }

    /// Put a token back in front of the stream.
    pub fn push_front(&mut self, token: &'a str) {
        debug_assert!(self.pushed.is_none(), "only one token of pushback");
        self.pushed = Some(token);
    }

    pub fn is_empty(&self) -> bool {
        self.peek().is_none()
    }

    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.pos + usize::from(self.pushed.is_some())
    }

    /// Join everything not yet consumed with single spaces.
    pub fn rest_joined(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(self.remaining());
        parts.extend(self.pushed);
        parts.extend_from_slice(&self.tokens[self.pos..]);
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_and_peek() {
        let tokens = ["a", "b"];
        let mut cursor = TokenCursor::new(&tokens);

        assert_eq!(cursor.peek(), Some("a"));
        assert_eq!(cursor.pop(), Some("a"));
        assert_eq!(cursor.peek(), Some("b"));
        assert_eq!(cursor.remaining(), 1);
        assert_eq!(cursor.pop(), Some("b"));
        assert_eq!(cursor.pop(), None);
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_push_front_is_popped_first() {
        let tokens = ["Global:", "}"];
        let mut cursor = TokenCursor::new(&tokens);
        cursor.push_front("{");

        assert_eq!(cursor.remaining(), 3);
        assert_eq!(cursor.peek(), Some("{"));
        assert_eq!(cursor.pop(), Some("{"));
        assert_eq!(cursor.pop(), Some("Global:"));
    }

    #[test]
    fn test_rest_joined() {
        let tokens = ["end", "connection", "127.0.0.1:5000"];
        let mut cursor = TokenCursor::new(&tokens);
        cursor.pop();
        assert_eq!(cursor.rest_joined(), "connection 127.0.0.1:5000");
    }

    #[test]
    fn test_empty_stream() {
        let tokens: [&str; 0] = [];
        let cursor = TokenCursor::new(&tokens);
        assert!(cursor.is_empty());
        assert_eq!(cursor.rest_joined(), "");
    }
}
