//! `winnow` grammar for the console language.
//!
//! Keywords are matched case-insensitively. Durations are an integer with an
//! optional `ms` or `s` suffix; unsuffixed values are already milliseconds.
//! A hard cut after each keyword that takes arguments keeps error offsets
//! pointing at the argument instead of rewinding to the start of the line.

use winnow::Parser;
use winnow::ascii::{Caseless, digit1, multispace0, multispace1};
use winnow::combinator::{alt, cut_err, opt, preceded};
use winnow::error::{ContextError, ErrMode};
use winnow::token::take_while;

use super::{Command, ParseError};
use crate::clock::Millis;

/// Parse one full console line into a [`Command`].
///
/// Surrounding whitespace is tolerated; anything else left over after a
/// complete command rejects the line.
pub fn parse(line: &str) -> Result<Command<'_>, ParseError> {
    (multispace0, command(), multispace0)
        .map(|(_, command, _)| command)
        .parse(line)
        .map_err(|err| ParseError::at(err.offset()))
}

fn command<'a>() -> impl Parser<&'a str, Command<'a>, ErrMode<ContextError>> {
    alt((
        tap(),
        run(),
        log_tail(),
        help(),
        Caseless("press").value(Command::Press),
        Caseless("release").value(Command::Release),
        Caseless("status").value(Command::Status),
        Caseless("dump").value(Command::Dump),
    ))
}

fn tap<'a>() -> impl Parser<&'a str, Command<'a>, ErrMode<ContextError>> {
    preceded(Caseless("tap"), cut_err(preceded(multispace1, duration())))
        .map(|hold| Command::Tap { hold })
}

fn run<'a>() -> impl Parser<&'a str, Command<'a>, ErrMode<ContextError>> {
    preceded(Caseless("run"), cut_err(preceded(multispace1, duration())))
        .map(|span| Command::Run { span })
}

fn log_tail<'a>() -> impl Parser<&'a str, Command<'a>, ErrMode<ContextError>> {
    preceded(
        Caseless("log"),
        opt(preceded(multispace1, digit1.parse_to::<usize>())),
    )
    .map(|limit| Command::Log { limit })
}

fn help<'a>() -> impl Parser<&'a str, Command<'a>, ErrMode<ContextError>> {
    preceded(Caseless("help"), opt(preceded(multispace1, topic())))
        .map(|topic| Command::Help { topic })
}

fn duration<'a>() -> impl Parser<&'a str, Millis, ErrMode<ContextError>> {
    (
        digit1.parse_to::<u32>(),
        opt(alt((
            Caseless("ms").value(1u32),
            Caseless("s").value(1_000u32),
        ))),
    )
        .map(|(count, scale)| Millis::new(count.saturating_mul(scale.unwrap_or(1))))
}

fn topic<'a>() -> impl Parser<&'a str, &'a str, ErrMode<ContextError>> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '-')
}
