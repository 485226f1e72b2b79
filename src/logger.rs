use chrono::Local;
use colored::Colorize;

/// Leveled terminal logger, built once from the run configuration and
/// handed to whoever needs it. Debug lines only appear in verbose mode.
#[derive(Debug, Clone)]
pub struct Logger {
    verbose: bool,
}

impl Logger {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn timestamp() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    pub fn debug(&self, msg: &str) {
        if self.verbose {
            println!(
                "{} - {} - {}",
                Self::timestamp(),
                "DEBUG".dimmed(),
                msg.dimmed()
            );
        }
    }

    pub fn info(&self, msg: &str) {
        println!("{} - INFO - {}", Self::timestamp(), msg);
    }

    pub fn warn(&self, msg: &str) {
        println!("{} - {} - {}", Self::timestamp(), "WARNING".yellow(), msg);
    }

    pub fn error(&self, msg: &str) {
        eprintln!("{} - {} - {}", Self::timestamp(), "ERROR".red(), msg);
    }
}
