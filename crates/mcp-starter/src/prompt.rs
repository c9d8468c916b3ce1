//! Interactive prompting for template variables

use std::io::{self, BufRead, Write};
use std::sync::Mutex;

/// Asks the user for template variable values
pub trait Prompter {
    /// Ask for a free-form value; an empty answer keeps `default`
    fn ask(&self, key: &str, default: &str) -> io::Result<String>;

    /// Ask the user to pick one of `options`
    fn choose(&self, key: &str, options: &[&str], default: &str) -> io::Result<String>;
}

/// Line-based prompter over any reader/writer pair
pub struct StdinPrompter<R, W> {
    io: Mutex<(R, W)>,
}

impl StdinPrompter<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the terminal
    pub fn terminal() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> StdinPrompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            io: Mutex::new((reader, writer)),
        }
    }

    /// Print `prompt` and read one trimmed line; `None` at end of input
    fn read_answer(&self, prompt: &str) -> io::Result<Option<String>> {
        let mut guard = self
            .io
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "prompt lock poisoned"))?;
        let (reader, writer) = &mut *guard;

        write!(writer, "{}", prompt)?;
        writer.flush()?;

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn say(&self, text: &str) -> io::Result<()> {
        let mut guard = self
            .io
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "prompt lock poisoned"))?;
        writeln!(guard.1, "{}", text)
    }
}

impl<R: BufRead, W: Write> Prompter for StdinPrompter<R, W> {
    fn ask(&self, key: &str, default: &str) -> io::Result<String> {
        match self.read_answer(&format!("{} [{}]: ", key, default))? {
            Some(answer) if !answer.is_empty() => Ok(answer),
            _ => Ok(default.to_string()),
        }
    }

    fn choose(&self, key: &str, options: &[&str], default: &str) -> io::Result<String> {
        self.say(&format!("Select {}:", key))?;
        for (i, option) in options.iter().enumerate() {
            self.say(&format!("  {} - {}", i + 1, option))?;
        }

        let default_index = options.iter().position(|o| *o == default).unwrap_or(0) + 1;
        loop {
            let prompt = format!("Choose from 1..{} [{}]: ", options.len(), default_index);
            let answer = match self.read_answer(&prompt)? {
                None => return Ok(default.to_string()),
                Some(answer) if answer.is_empty() => return Ok(default.to_string()),
                Some(answer) => answer,
            };

            if let Ok(index) = answer.parse::<usize>() {
                if (1..=options.len()).contains(&index) {
                    return Ok(options[index - 1].to_string());
                }
            } else if let Some(option) = options.iter().find(|o| **o == answer) {
                return Ok(option.to_string());
            }

            self.say(&format!("Invalid choice: {}", answer))?;
        }
    }
}
