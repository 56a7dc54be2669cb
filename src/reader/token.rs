//! Module for extracting csexp tokens from a byte buffer.

use crate::reader::{DecodeError, ReadResult};

/// A csexp token.
///
/// There is no whitespace or comment syntax; every byte belongs to a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    LParen,
    RParen,
    /// The payload of an atom, without its length header.
    Atom(&'a [u8]),
    /// End of the input buffer. Always the last token of a successful tokenization.
    End,
}

/// A token along with its starting position in the input buffer.
///
/// For atoms, the position is that of the length header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenOffset<'a> {
    pub token: Token<'a>,
    pub offset: usize,
}

impl<'a> From<TokenOffset<'a>> for Token<'a> {
    fn from(value: TokenOffset<'a>) -> Self {
        value.token
    }
}

/// Lazy iterator over the tokens in a buffer.
///
/// Yields `Token::End` once the input is exhausted, or a single error;
/// after either, the iterator is finished.
pub struct Tokenizer<'a> {
    input: &'a [u8],
    offset: usize,
    done: bool,
}

/// Split the input into its constituent tokens, lazily.
pub fn tokenize(input: &[u8]) -> Tokenizer<'_> {
    Tokenizer {
        input,
        offset: 0,
        done: false,
    }
}

mod regex {
    use regex::bytes::Regex;
    use std::sync::OnceLock;

    pub(super) fn atom_header() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            Regex::new(r#"\A([0-9]+):"#).expect("could not compile regex for atom header")
        })
    }
}

/// Interpret ASCII digits as a length.
/// Lengths that overflow are saturated; they can't fit in the buffer anyway.
fn parse_length(digits: &[u8]) -> usize {
    digits.iter().fold(0usize, |acc, d| {
        acc.saturating_mul(10).saturating_add(usize::from(d - b'0'))
    })
}

impl<'a> Tokenizer<'a> {
    /// Get the next token from the unread input, advancing past it.
    fn get_next_token(&mut self) -> ReadResult<Token<'a>> {
        let remainder = &self.input[self.offset..];
        let Some(&first) = remainder.first() else {
            return Ok(Token::End);
        };

        match first {
            b'(' => {
                self.offset += 1;
                return Ok(Token::LParen);
            }
            b')' => {
                self.offset += 1;
                return Ok(Token::RParen);
            }
            _ => (),
        }

        if let Some(header) = regex::atom_header().captures(remainder) {
            let header_len = header[0].len();
            let declared = parse_length(&header[1]);
            let payload = &remainder[header_len..];
            if declared > payload.len() {
                return Err(DecodeError::TruncatedAtom {
                    offset: self.offset,
                    declared,
                    available: payload.len(),
                });
            }
            self.offset += header_len + declared;
            return Ok(Token::Atom(&payload[..declared]));
        }

        Err(DecodeError::Lexical {
            offset: self.offset,
            message: "Expected expression.".to_owned(),
        })
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = ReadResult<TokenOffset<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let offset = self.offset;
        let next = self.get_next_token();
        self.done = !matches!(next, Ok(Token::LParen | Token::RParen | Token::Atom(_)));
        Some(next.map(|token| TokenOffset { token, offset }))
    }
}

impl std::iter::FusedIterator for Tokenizer<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &[u8]) -> ReadResult<Vec<Token<'_>>> {
        tokenize(input).map(|t| t.map(Token::from)).collect()
    }

    #[test]
    fn recognize_headers() {
        for header in ["0:", "3:", "007:", "1234567890:"] {
            let r = regex::atom_header();
            assert!(r.is_match(header.as_bytes()), "did not find header {}", header);
        }
        for not_header in [":", "3", "a3:", "-3:", " 3:", "3 :"] {
            let r = regex::atom_header();
            assert!(!r.is_match(not_header.as_bytes()), "found header in {}", not_header);
        }
    }

    #[test]
    fn tokenize_atoms() -> ReadResult<()> {
        let output = tokens(b"3:abc0:2:()04:\x00\xff:)")?;
        let want = &[
            Token::Atom(b"abc"),
            Token::Atom(b""),
            Token::Atom(b"()"),
            Token::Atom(b"\x00\xff:)"),
            Token::End,
        ];

        assert_eq!(output.len(), want.len());

        for ((i, got), want) in output.iter().enumerate().zip(want.iter()) {
            assert_eq!(got, want, "unexpected token in case {}", i);
        }
        Ok(())
    }

    #[test]
    fn tokenize_parens() -> ReadResult<()> {
        let output = tokens(b"(1:a(()))")?;
        let want = &[
            Token::LParen,
            Token::Atom(b"a"),
            Token::LParen,
            Token::LParen,
            Token::RParen,
            Token::RParen,
            Token::RParen,
            Token::End,
        ];

        assert_eq!(output.len(), want.len());

        for ((i, got), want) in output.iter().enumerate().zip(want.iter()) {
            assert_eq!(got, want, "unexpected token in case {}", i);
        }
        Ok(())
    }

    #[test]
    fn tokenize_unbalanced() -> ReadResult<()> {
        // Balance is the builder's problem, not the tokenizer's.
        let output = tokens(b")))()(")?;
        let want = &[
            Token::RParen,
            Token::RParen,
            Token::RParen,
            Token::LParen,
            Token::RParen,
            Token::LParen,
            Token::End,
        ];
        assert_eq!(&output, want);
        Ok(())
    }

    #[test]
    fn offsets() -> ReadResult<()> {
        let offsets: Vec<usize> = tokenize(b"(3:foo10:0123456789)")
            .map(|t| t.map(|t| t.offset))
            .collect::<ReadResult<_>>()?;
        assert_eq!(offsets, vec![0, 1, 6, 19, 20]);
        Ok(())
    }

    #[test]
    fn empty_input_is_end() -> ReadResult<()> {
        assert_eq!(tokens(b"")?, vec![Token::End]);
        Ok(())
    }

    #[test]
    fn error_on_unexpected_byte() {
        for (input, want_offset) in [(&b"x"[..], 0), (b"(3:abc x)", 6), (b"( 1:a)", 1), (b":", 0)] {
            match tokens(input) {
                Err(DecodeError::Lexical { offset, message }) => {
                    assert_eq!(offset, want_offset, "for input {:?}", input);
                    assert_eq!(message, "Expected expression.");
                }
                v => panic!("unexpected tokenize result: {v:?}"),
            }
        }
    }

    #[test]
    fn error_on_truncated_atom() {
        match tokens(b"(5:ab") {
            Err(DecodeError::TruncatedAtom {
                offset: 1,
                declared: 5,
                available: 2,
            }) => (),
            v => panic!("unexpected tokenize result: {v:?}"),
        }
    }

    #[test]
    fn error_on_overflowing_length() {
        match tokens(b"99999999999999999999999999999:a") {
            Err(DecodeError::TruncatedAtom {
                offset: 0,
                declared: usize::MAX,
                available: 1,
            }) => (),
            v => panic!("unexpected tokenize result: {v:?}"),
        }
    }

    #[test]
    fn stops_after_error() {
        let mut tokenizer = tokenize(b"(x)");
        assert_eq!(
            tokenizer.next(),
            Some(Ok(TokenOffset {
                token: Token::LParen,
                offset: 0
            }))
        );
        assert!(matches!(tokenizer.next(), Some(Err(_))));
        assert_eq!(tokenizer.next(), None);
    }

    #[test]
    fn stops_after_end() {
        let mut tokenizer = tokenize(b"0:");
        assert!(matches!(tokenizer.next(), Some(Ok(_))));
        assert_eq!(
            tokenizer.next(),
            Some(Ok(TokenOffset {
                token: Token::End,
                offset: 2
            }))
        );
        assert_eq!(tokenizer.next(), None);
    }
}
