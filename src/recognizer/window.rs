use crate::token::Token;

/// Bounded FIFO of look-ahead tokens.
///
/// Pushing past capacity is a bug in the caller and panics.
#[derive(Debug, Clone)]
pub(crate) struct Window {
    tokens: Vec<Token>,
    capacity: usize,
}

impl Window {
    pub(crate) fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be positive");
        Self {
            tokens: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.tokens.len() == self.capacity
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn push(&mut self, token: Token) {
        assert!(
            !self.is_full(),
            "window overflow: capacity is {}",
            self.capacity
        );
        self.tokens.push(token);
    }

    /// The first `n` tokens.
    pub(crate) fn front(&self, n: usize) -> &[Token] {
        &self.tokens[..n]
    }

    pub(crate) fn pop_front(&mut self) -> Option<Token> {
        (!self.tokens.is_empty()).then(|| self.tokens.remove(0))
    }

    /// Drops the first `n` tokens.
    pub(crate) fn consume(&mut self, n: usize) {
        self.tokens.drain(..n);
    }
}
