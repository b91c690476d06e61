//! Terminal implementations of the host surfaces.

use std::env;
use std::io;

use chrono::Local;
use yansi::Paint;

use crate::host::{NamePrompt, Notifier, PromptOutcome, SuffixSource};

// Notice colors, picked to read well on dark terminals.
const INFO_RGB: (u8, u8, u8) = (148, 226, 213);
const WARN_RGB: (u8, u8, u8) = (249, 226, 175);

/// Notices on stderr, colored unless NO_COLOR is set.
pub struct TermNotifier {
    use_color: bool,
}

impl TermNotifier {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    pub fn from_env() -> Self {
        Self::new(env::var("NO_COLOR").is_err())
    }
}

impl Notifier for TermNotifier {
    fn info(&self, message: &str) {
        if self.use_color {
            let (r, g, b) = INFO_RGB;
            eprintln!("{}", Paint::rgb(message, r, g, b));
        } else {
            eprintln!("{message}");
        }
    }

    fn warn(&self, message: &str) {
        if self.use_color {
            let (r, g, b) = WARN_RGB;
            eprintln!("{}", Paint::rgb(message, r, g, b).bold());
        } else {
            eprintln!("{message}");
        }
    }
}

/// Line-oriented naming prompt on stdin/stderr. An empty line accepts the
/// seeded default; end of input backs out.
pub struct TermPrompt;

impl NamePrompt for TermPrompt {
    fn ask(&mut self, default_name: &str) -> PromptOutcome {
        eprint!("Note name [{default_name}]: ");
        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => return PromptOutcome::Cancelled,
            Ok(_) => {}
        }
        let name = line.trim();
        if name.is_empty() {
            PromptOutcome::Submitted(default_name.to_string())
        } else {
            PromptOutcome::Submitted(name.to_string())
        }
    }
}

/// Staging suffixes from the wall clock: base62-encoded local microseconds.
pub struct ClockSuffix;

impl SuffixSource for ClockSuffix {
    fn staging_suffix(&mut self) -> String {
        encode_base62(Local::now().timestamp_micros().max(0) as u64)
    }
}

fn encode_base62(num: u64) -> String {
    const ALPHABET: &[u8] =
        b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
    if num == 0 {
        return "0".to_string();
    }
    let base = ALPHABET.len() as u64;
    let mut n = num;
    let mut out = Vec::new();
    while n > 0 {
        out.push(ALPHABET[(n % base) as usize] as char);
        n /= base;
    }
    out.iter().rev().collect()
}
