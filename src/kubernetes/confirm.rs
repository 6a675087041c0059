use std::io::{self, BufRead, Write};

const AFFIRMATION: &str = "yes";

/// Asks the operator a yes/no question.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> io::Result<bool>;
}

/// Line-based prompt. Only a case-insensitive "yes" confirms; end of input declines.
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl Prompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Confirm for Prompt<R, W> {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        write!(self.output, "\n{question} (yes/no): ")?;
        self.output.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(is_affirmative(&answer))
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case(AFFIRMATION)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("yes", true)]
    #[case("YES", true)]
    #[case("Yes\n", true)]
    #[case("  yEs \r\n", true)]
    #[case("y", false)]
    #[case("", false)]
    #[case("no", false)]
    #[case("yes please", false)]
    fn only_yes_is_affirmative(#[case] answer: &str, #[case] expected: bool) {
        assert_eq!(is_affirmative(answer), expected);
    }

    #[test]
    fn prompt_reads_one_line_per_question() {
        let mut output = Vec::new();
        let mut prompt = Prompt::new(Cursor::new("YES\ny\n"), &mut output);

        assert!(prompt.confirm("Delete a?").unwrap());
        assert!(!prompt.confirm("Delete b?").unwrap());
        assert!(!prompt.confirm("Delete c?").unwrap());
        drop(prompt);

        let output = String::from_utf8(output).unwrap();
        assert_eq!(
            output,
            "\nDelete a? (yes/no): \nDelete b? (yes/no): \nDelete c? (yes/no): "
        );
    }
}
