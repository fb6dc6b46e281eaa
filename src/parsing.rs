//! Low-level parsers for numeric literals, shared by the lexer and the assembler.

use std::convert::TryFrom;

use nom::{
    IResult,
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{digit1, hex_digit1, one_of},
    combinator::{all_consuming, map, map_opt, opt},
    sequence::{pair, preceded},
};

/// Parses the digits of a literal, returning them together with their radix.
fn magnitude(input: &str) -> IResult<&str, (&str, u32)> {
    alt((
        map(preceded(tag_no_case("0x"), hex_digit1), |digits| (digits, 16)),
        map(digit1, |digits| (digits, 10)),
    ))(input)
}

/// Parses an optionally signed decimal or `0x` prefixed hexadecimal integer literal that fits
/// into an `i64`.
pub fn take_i64(input: &str) -> IResult<&str, i64> {
    map_opt(
        pair(opt(one_of("+-")), magnitude),
        |(sign, (digits, radix))| {
            let magnitude = i128::from_str_radix(digits, radix).ok()?;

            let value = match sign {
                Some('-') => -magnitude,
                Some(_) | None => magnitude,
            };

            i64::try_from(value).ok()
        },
    )(input)
}

/// Parses a complete immediate operand, with an optional `#` prefix.
///
/// # Returns
/// `None` if the input is not exactly one integer literal.
pub fn immediate(input: &str) -> Option<i64> {
    let input = input.strip_prefix('#').unwrap_or(input);

    all_consuming(take_i64)(input)
        .ok()
        .map(|(_, value)| value)
}
