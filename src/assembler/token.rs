//! Tokens and a tokenizer for a single line of assembly.

use logos::{Lexer, Logos};

use std::fmt;
use std::ops::Range;

pub type Span = Range<usize>;

/// Enumeration of all tokens of the assembly syntax. Comments are stripped before lexing.
#[derive(Logos, Debug, PartialEq, Clone)]
pub enum Token<'a> {
    /// Errorneous token that could not be interpreted as any of the other variants.
    #[error]
    #[regex(r"[ \t\r\f]+", logos::skip)]
    Error,

    /// A mnemonic, register name or label. Mnemonics of conditional branches carry their
    /// condition after a dot (`B.EQ`).
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z0-9_]+)?", Lexer::slice)]
    Identifier(&'a str),

    /// An integer literal, optionally prefixed with `#`. The value is parsed later so that
    /// malformed literals can be reported with their text.
    #[regex(r"#?[+-]?[0-9][0-9A-Za-z]*", Lexer::slice)]
    Number(&'a str),

    /// Token (`:`) that terminates a label definition.
    #[token(":")]
    LabelEnd,

    /// Token (`,`) that is used to separate operands of a single instruction.
    #[token(",")]
    ParameterSeparator,

    /// Token (`[`) that begins a memory operand.
    #[token("[")]
    AddressBegin,

    /// Token (`]`) that ends a memory operand.
    #[token("]")]
    AddressEnd,
}

impl<'t> fmt::Display for Token<'t> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Error => write!(f, "<error>"),
            Token::Identifier(ident) => write!(f, "{}", ident),
            Token::Number(num) => write!(f, "{}", num),
            Token::LabelEnd => write!(f, ":"),
            Token::ParameterSeparator => write!(f, ","),
            Token::AddressBegin => write!(f, "["),
            Token::AddressEnd => write!(f, "]"),
        }
    }
}

/// Splits `line` into tokens and their byte spans.
pub fn tokenize(line: &str) -> Vec<(Token, Span)> {
    Token::lexer(line).spanned().collect()
}

/// Splits an operand list into operands at the separators that are not enclosed in brackets,
/// so that `X1, [X2, #8]` produces two operands. Empty operands are dropped.
pub fn split_operands<'t, 'a>(tokens: &'t [(Token<'a>, Span)]) -> Vec<&'t [(Token<'a>, Span)]> {
    let mut operands = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, (token, _)) in tokens.iter().enumerate() {
        match token {
            Token::AddressBegin => depth += 1,
            Token::AddressEnd => depth = depth.saturating_sub(1),
            Token::ParameterSeparator if depth == 0 => {
                if i > start {
                    operands.push(&tokens[start..i]);
                }

                start = i + 1;
            },
            _ => (),
        }
    }

    if tokens.len() > start {
        operands.push(&tokens[start..]);
    }

    operands
}
