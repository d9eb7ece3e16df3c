use std::io::{self, BufRead, Write};

/// Asks `question` and waits for an answer line. Only an answer starting
/// with `y` counts as yes, anything else (including end of input) is no.
pub fn confirm<R: BufRead, W: Write>(
    question: &str,
    mut input: R,
    mut output: W,
) -> io::Result<bool> {
    write!(output, "{question} type 'y' or 'n': ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim_start().starts_with('y'))
}

pub fn confirm_on_terminal(question: &str) -> io::Result<bool> {
    confirm(question, io::stdin().lock(), io::stdout().lock())
}
