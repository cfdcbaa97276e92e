//! Init command implementation
//!
//! Scaffolds a new callfacts project: `callfacts.toml`, `.env.example` and a
//! `.gitignore` when none exists.

use super::output::Output;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// Project already exists (callfacts.toml found)
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// LLM provider to configure (openai or ollama)
    pub provider: String,
    /// Host address for the server
    pub host: String,
    /// Port for the server
    pub port: u16,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing callfacts Project");

    if config.provider != "openai" && config.provider != "ollama" {
        output.error(&format!(
            "Unknown provider '{}' (expected openai or ollama)",
            config.provider
        ));
        return InitResult::Error(format!("unknown provider: {}", config.provider));
    }

    let base_path = &config.path;
    if !base_path.exists() {
        if let Err(e) = fs::create_dir_all(base_path) {
            output.error(&format!(
                "Failed to create {}: {}",
                base_path.display(),
                e
            ));
            return InitResult::Error(e.to_string());
        }
    }

    let config_path = base_path.join("callfacts.toml");
    if config_path.exists() && !config.force {
        output.warning("callfacts.toml already exists!");
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    output.subheader("Creating configuration files");

    let toml_content = generate_callfacts_toml(&config);
    if let Err(e) = write_file(&config_path, &toml_content, config.force) {
        output.error(&format!("Failed to create callfacts.toml: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", "callfacts.toml");

    let env_example_path = base_path.join(".env.example");
    if let Err(e) = write_file(&env_example_path, &generate_env_example(), config.force) {
        output.error(&format!("Failed to create .env.example: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("env", ".env.example");

    let gitignore_path = base_path.join(".gitignore");
    if gitignore_path.exists() {
        output.skipped(".gitignore", "already exists");
    } else if let Err(e) = write_file(&gitignore_path, generate_gitignore(), false) {
        output.warning(&format!("Failed to create .gitignore: {}", e));
    } else {
        output.created("file", ".gitignore");
    }

    output.complete("callfacts project initialized successfully!");

    output.header("Next Steps");
    output.newline();
    if config.provider == "openai" {
        output.info("1. Set your API key:");
        output.command("cp .env.example .env");
        output.command("# Edit .env and set OPENAI_API_KEY");
    } else {
        output.info("1. Start Ollama (if not running):");
        output.command("ollama serve");
        output.command("ollama pull llama3.2  # or your preferred model");
    }
    output.newline();

    output.info("2. Start the server:");
    output.command("callfacts-server");
    output.newline();

    output.hint(&format!(
        "Server will be available at http://{}:{}",
        config.host, config.port
    ));
    output.hint("OpenAPI document at /api-docs/openapi.json");

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(()); // Skip existing files unless force is true
    }
    fs::write(path, content)
}

fn generate_callfacts_toml(config: &InitConfig) -> String {
    let llm_section = if config.provider == "ollama" {
        r#"# Ollama - Local inference (no API key required)
[llm]
type = "ollama"
base_url = "http://localhost:11434"
model = "llama3.2"
"#
    } else {
        r#"# OpenAI API (set OPENAI_API_KEY in .env)
[llm]
type = "openai"
api_key_env = "OPENAI_API_KEY"
api_base = "https://api.openai.com/v1"
model = "gpt-4"
"#
    };

    format!(
        r#"# callfacts configuration
# [llm] and [fetch] changes apply to the next task while the server runs;
# [server] changes need a restart.

[server]
host = "{host}"
port = {port}
log_level = "info"
# "pretty" or "json"
log_format = "pretty"
# Serve a browser front-end from this directory at /
# static_dir = "static"

{llm_section}
[fetch]
# Call logs answered with a non-2xx status: "drop" skips them, "fail" fails the task
non_success = "drop"
"#,
        host = config.host,
        port = config.port,
        llm_section = llm_section,
    )
}

fn generate_env_example() -> String {
    r#"# callfacts environment
OPENAI_API_KEY=

# Override [server] host and port
# HOST=0.0.0.0
# PORT=8000

# Log filter, takes precedence over server.log_level
# RUST_LOG=callfacts=debug,tower_http=info
"#
    .to_string()
}

fn generate_gitignore() -> &'static str {
    "/target/\n.env\n.DS_Store\n"
}
