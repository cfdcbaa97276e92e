//! Terminal output for the callfacts CLI.
//!
//! Every line is printed either with owo-colors styling or with a plain
//! `[TAG]` prefix when `--no-color` is given, so output stays greppable in
//! scripts and CI logs.

use owo_colors::OwoColorize;

/// Status lines share one layout; only the marker and color differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Ok,
    Info,
    Warn,
    Fail,
}

impl Tone {
    fn tag(self) -> &'static str {
        match self {
            Tone::Ok => "[OK]",
            Tone::Info => "[INFO]",
            Tone::Warn => "[WARN]",
            Tone::Fail => "[ERROR]",
        }
    }
}

/// Colored or plain console writer
pub struct Output {
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self { colored: true }
    }

    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Render one status line without printing it
    fn status_line(&self, tone: Tone, message: &str) -> String {
        if !self.colored {
            return format!("  {} {}", tone.tag(), message);
        }
        match tone {
            Tone::Ok => format!("  {} {}", "✓".green().bold(), message.green()),
            Tone::Info => format!("  {} {}", "•".blue(), message),
            Tone::Warn => format!("  {} {}", "!".yellow().bold(), message.yellow()),
            Tone::Fail => format!("  {} {}", "✗".red().bold(), message.red()),
        }
    }

    pub fn banner(&self) {
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!(
                "\n  {} {}  {}\n",
                "callfacts".bright_cyan().bold(),
                version.dimmed(),
                "decisions from meeting call logs".dimmed()
            );
        } else {
            println!("\n  callfacts {}  decisions from meeting call logs\n", version);
        }
    }

    pub fn success(&self, message: &str) {
        println!("{}", self.status_line(Tone::Ok, message));
    }

    pub fn info(&self, message: &str) {
        println!("{}", self.status_line(Tone::Info, message));
    }

    pub fn warning(&self, message: &str) {
        println!("{}", self.status_line(Tone::Warn, message));
    }

    /// Errors go to stderr so `ask` output can be piped
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.status_line(Tone::Fail, message));
    }

    /// A file written by `init`
    pub fn created(&self, kind: &str, path: &str) {
        if self.colored {
            println!("  {} {:<7} {}", "+".green().bold(), kind.dimmed(), path);
        } else {
            println!("  [CREATED] {} {}", kind, path);
        }
    }

    /// A file `init` left alone
    pub fn skipped(&self, path: &str, reason: &str) {
        if self.colored {
            println!("  {} {} ({})", "=".yellow(), path.dimmed(), reason);
        } else {
            println!("  [SKIPPED] {} ({})", path, reason);
        }
    }

    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    pub fn subheader(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.cyan());
        } else {
            println!("\n  --- {} ---", title);
        }
    }

    /// One configuration setting, padded so `config` output lines up
    pub fn kv(&self, key: &str, value: &str) {
        let key = format!("{:<22}", key);
        if self.colored {
            println!("    {} {}", key.dimmed(), value);
        } else {
            println!("    {} {}", key, value);
        }
    }

    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("  {}", message.dimmed().italic());
        } else {
            println!("  [TIP] {}", message);
        }
    }

    /// A shell command the user is expected to run next
    pub fn command(&self, cmd: &str) {
        if self.colored {
            println!("      {}", format!("$ {}", cmd).bright_cyan());
        } else {
            println!("      $ {}", cmd);
        }
    }

    pub fn complete(&self, message: &str) {
        println!();
        self.success(message);
    }

    /// Number facts for display, starting at 1
    pub fn numbered(facts: &[String]) -> Vec<String> {
        facts
            .iter()
            .enumerate()
            .map(|(i, fact)| format!("{}. {}", i + 1, fact))
            .collect()
    }

    /// Print the facts produced for a question
    pub fn facts(&self, facts: &[String]) {
        if facts.is_empty() {
            self.warning("No decisions found in the call logs");
            return;
        }
        for line in Self::numbered(facts) {
            println!("    {}", line);
        }
    }

    pub fn newline(&self) {
        println!();
    }
}
