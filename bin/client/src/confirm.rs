use session::{Confirm, Quote};
use std::io::{self, BufRead, Write};

/// Asks on the terminal; `--yes` skips the question
pub struct StdinConfirm {
    pub assume_yes: bool,
}

impl Confirm for StdinConfirm {
    fn confirm(&self, quote: &Quote) -> bool {
        println!("{}", quote);
        if self.assume_yes {
            return true;
        }
        print!("Proceed? [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}
