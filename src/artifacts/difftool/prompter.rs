use colored::Colorize;
use derive_new::new;
use std::io::{BufRead, Write};
use std::path::Path;

/// Asks before each tool launch
///
/// Reading end-of-input counts as consent, so piped runs behave like
/// prompt-less ones. Any answer other than `y` declines.
#[derive(new)]
pub struct Prompter<R: BufRead> {
    input: R,
}

impl<R: BufRead> Prompter<R> {
    pub fn confirm(
        &mut self,
        writer: &mut dyn Write,
        ordinal: usize,
        total: usize,
        path: &Path,
        tool_name: &str,
    ) -> anyhow::Result<bool> {
        writeln!(
            writer,
            "Viewing ({}/{}): '{}'",
            ordinal,
            total,
            path.display().to_string().bold()
        )?;
        write!(writer, "Launch '{tool_name}' [Y/n]? ")?;
        writer.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(true);
        }

        Ok(line.trim().eq_ignore_ascii_case("y"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Cursor;

    fn confirm_with(input: &str) -> (bool, String) {
        let mut prompter = Prompter::new(Cursor::new(input.as_bytes().to_vec()));
        let mut output = Vec::new();

        let launched = prompter
            .confirm(&mut output, 1, 3, Path::new("src/lib.rs"), "meld")
            .unwrap();

        (launched, String::from_utf8(output).unwrap())
    }

    #[rstest]
    #[case("y\n", true)]
    #[case("Y\n", true)]
    #[case("  y  \n", true)]
    #[case("n\n", false)]
    #[case("N\n", false)]
    #[case("yes\n", false)]
    #[case("\n", false)]
    #[case("anything\n", false)]
    fn test_only_an_explicit_y_launches(#[case] input: &str, #[case] expected: bool) {
        let (launched, _) = confirm_with(input);

        assert_eq!(launched, expected);
    }

    #[test]
    fn test_end_of_input_counts_as_consent() {
        let (launched, _) = confirm_with("");

        assert!(launched);
    }

    #[test]
    fn test_prompt_names_position_path_and_tool() {
        let (_, output) = confirm_with("y\n");

        assert!(output.contains("Viewing (1/3):"));
        assert!(output.contains("src/lib.rs"));
        assert!(output.ends_with("Launch 'meld' [Y/n]? "));
    }
}
