//! Token stream adapter
//!
//! The engine pulls tokens through [`TokenSource`], one at a time, and
//! treats `None` as the end of the stream. [`TokenStream`] adapts any
//! iterator of tokens, such as the output of [`super::lexer::Lexer`].

use std::iter::Fuse;

use super::lexer::Token;

/// A pull-based source of tokens.
pub trait TokenSource {
    /// The next token, or `None` once the stream is exhausted.
    fn next_token(&mut self) -> Option<Token>;
}

/// Wraps an iterator of tokens. Once the iterator returns `None` it keeps
/// returning `None`.
pub struct TokenStream<I: Iterator<Item = Token>> {
    tokens: Fuse<I>,
}

impl<I: Iterator<Item = Token>> TokenStream<I> {
    pub fn new(tokens: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            tokens: tokens.into_iter().fuse(),
        }
    }
}

impl<I: Iterator<Item = Token>> TokenSource for TokenStream<I> {
    fn next_token(&mut self) -> Option<Token> {
        self.tokens.next()
    }
}

impl<S: TokenSource + ?Sized> TokenSource for &mut S {
    fn next_token(&mut self) -> Option<Token> {
        (**self).next_token()
    }
}
