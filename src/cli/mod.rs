//! Command-line interface parsing and handling
//!
//! Flags override the configuration file for one run; `set`/`unset` edit the
//! file itself.

pub mod ask;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::warn;

use crate::cli::ask::run_ask;
use crate::core::chat_stream::TransportClient;
use crate::core::config::{Config, ConfigError};
use crate::core::session::RequestTemplate;
use crate::ui::chat_loop::{run_chat, ChatSettings};
use crate::ui::theme::Theme;
use crate::utils::logging::{init_tracing, LogTarget};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_SHA"),
    ", built ",
    env!("VERGEN_BUILD_DATE"),
    ", rustc ",
    env!("VERGEN_RUSTC_SEMVER"),
    ")"
);

#[derive(Parser)]
#[command(name = "nimchat")]
#[command(version = VERSION)]
#[command(about = "A terminal chat client for streaming completion endpoints")]
#[command(
    long_about = "nimchat sends one question at a time to an OpenAI-compatible chat completion \
endpoint and renders the streamed answer as it arrives, with bold text and fenced code \
blocks highlighted.\n\n\
The API key is read from the environment variable named by the 'api-key-env' setting \
(NIM_DS_API_KEY by default).\n\n\
Controls:\n\
  Type              Enter your question in the input field\n\
  Enter             Send the question\n\
  Esc               Stop the answer being streamed\n\
  Up/Down/PgUp/PgDn Scroll through the transcript\n\
  Home/End          Jump to the top or follow the newest output\n\
  Ctrl+C            Quit the application"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to request
    #[arg(short = 'm', long, global = true)]
    pub model: Option<String>,

    /// Chat completion endpoint URL
    #[arg(short = 'e', long, global = true)]
    pub endpoint: Option<String>,

    /// Sampling temperature (0-2)
    #[arg(short = 't', long, global = true)]
    pub temperature: Option<f32>,

    /// Nucleus sampling mass (0-1)
    #[arg(long, global = true)]
    pub top_p: Option<f32>,

    /// Maximum number of tokens in the answer
    #[arg(long, global = true)]
    pub max_tokens: Option<u32>,

    /// System prompt sent ahead of the question
    #[arg(short = 's', long, global = true)]
    pub system_prompt: Option<String>,

    /// Write diagnostic logs to this file
    #[arg(short = 'l', long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Ask one question and print the answer to stdout
    Ask {
        /// The question; multiple words are joined with spaces
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Set a configuration value, or show the configuration if no value is given
    Set {
        /// Configuration key to set
        key: Option<String>,
        /// Value to set for the key (multiple words are joined)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Option<Vec<String>>,
    },
    /// Unset a configuration value
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

impl Args {
    /// Applies command-line overrides on top of the loaded configuration.
    fn apply_overrides(&self, config: &mut Config) -> Result<(), ConfigError> {
        if let Some(model) = &self.model {
            config.set_value("model", model)?;
        }
        if let Some(endpoint) = &self.endpoint {
            config.set_value("endpoint", endpoint)?;
        }
        if let Some(temperature) = self.temperature {
            config.set_value("temperature", &temperature.to_string())?;
        }
        if let Some(top_p) = self.top_p {
            config.set_value("top-p", &top_p.to_string())?;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.set_value("max-tokens", &max_tokens.to_string())?;
        }
        if let Some(system_prompt) = &self.system_prompt {
            config.set_value("system-prompt", system_prompt)?;
        }
        Ok(())
    }
}

fn build_transport(config: &Config) -> TransportClient {
    let api_key = config.read_api_key().unwrap_or_else(|| {
        warn!(
            env = config.api_key_env_or_default(),
            "API key environment variable is not set; requests will be unauthenticated"
        );
        String::new()
    });
    TransportClient::new(
        reqwest::Client::new(),
        config.endpoint_or_default().to_string(),
        api_key,
    )
}

fn build_template(config: &Config) -> RequestTemplate {
    RequestTemplate {
        model: config.model_or_default().to_string(),
        system_prompt: config.system_prompt.clone(),
        params: config.decoding_params(),
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    match args.command {
        Some(Commands::Set { ref key, ref value }) => {
            let mut config = Config::load()?;
            let value = value.as_ref().map(|parts| parts.join(" "));
            match (key, value) {
                (Some(key), Some(value)) if !value.is_empty() => {
                    if let Err(e) = config.set_value(key, &value) {
                        eprintln!("❌ {e}");
                        std::process::exit(1);
                    }
                    config.save()?;
                    println!("✅ Set {key} to: {value}");
                }
                _ => config.print_all(),
            }
            Ok(())
        }
        Some(Commands::Unset { ref key }) => {
            let mut config = Config::load()?;
            if let Err(e) = config.unset_value(key) {
                eprintln!("❌ {e}");
                std::process::exit(1);
            }
            config.save()?;
            println!("✅ Unset {key}");
            Ok(())
        }
        Some(Commands::Ask { ref prompt }) => {
            let target = match &args.log_file {
                Some(path) => LogTarget::File(path),
                None => LogTarget::Stderr,
            };
            init_tracing(target, "warn")?;

            let mut config = Config::load()?;
            args.apply_overrides(&mut config)?;
            run_ask(prompt, build_transport(&config), build_template(&config)).await
        }
        Some(Commands::Chat) | None => {
            let target = match &args.log_file {
                Some(path) => LogTarget::File(path),
                None => LogTarget::Disabled,
            };
            init_tracing(target, "info")?;

            let mut config = Config::load()?;
            args.apply_overrides(&mut config)?;
            let settings = ChatSettings {
                transport: build_transport(&config),
                template: build_template(&config),
                poll_interval: config.poll_interval(),
                theme: Theme::from_name(config.theme_or_default()),
            };
            run_chat(settings).await
        }
    }
}
