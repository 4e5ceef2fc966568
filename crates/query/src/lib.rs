//! Interactive prompts. The prompt is printed to stderr and a line is read from stdin, until the
//! validator accepts the input. Closing stdin counts as an empty answer.
use std::fmt::Display;
use std::io::{self, stderr, stdin, BufRead, Write};
use std::str::FromStr;

/// Parses `input` as a `T` and hands it to `validator`.
pub fn parse<S, T: FromStr, F>(input: &str, validator: F) -> Result<S, String>
where
    F: Fn(T) -> Result<S, String>,
    <T as FromStr>::Err: Display,
{
    input
        .parse::<T>()
        .map_err(|err| err.to_string())
        .and_then(validator)
}

/// Asks for a value, using `default` if the answer is empty.
pub fn with_default<S, T: FromStr, F>(prompt: &str, default: &str, validator: F) -> S
where
    F: Fn(T) -> Result<S, String>,
    <T as FromStr>::Err: Display,
{
    let prompt = format!("{prompt} (default: {default})");
    interactive(&prompt, |x| {
        parse(if x.is_empty() { default } else { x }, &validator)
    })
}

fn interactive<S, F>(prompt: &str, validator: F) -> S
where
    F: Fn(&str) -> Result<S, String>,
{
    ask(prompt, &mut stdin().lock(), &mut stderr(), validator)
        .unwrap_or_else(|e| panic!("Error reading for prompt {prompt}: {e}"))
}

/// Prompts on `output` and reads from `input` until `validator` accepts a line. Fails if the
/// input ends without an acceptable answer.
pub fn ask<S, F>(
    prompt: &str,
    input: &mut impl BufRead,
    output: &mut impl Write,
    validator: F,
) -> io::Result<S>
where
    F: Fn(&str) -> Result<S, String>,
{
    loop {
        write!(output, "{prompt} : ")?;
        output.flush()?;

        let mut line = String::new();
        let eof = input.read_line(&mut line)? == 0;
        match validator(line.trim()) {
            Ok(res) => return Ok(res),
            Err(e) if eof => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("input closed: {e}"),
                ))
            }
            Err(e) => writeln!(output, "Invalid input: {e}. Try again")?,
        }
    }
}
