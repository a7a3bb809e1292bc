use std::process;

use colored::Colorize;
use startval::{VecOptions, api};

#[derive(clap::Args)]
pub struct LlmConfigCommand {
    #[arg(
        short = 'O',
        long = "option",
        help = "Chat LLM setting, one of base_url, api_key or model, e.g. -O model:gpt-4"
    )]
    options: Vec<String>,

    #[arg(
        short = 'p',
        long = "protocol",
        default_value = "openai",
        help = "LLM provider's protocol"
    )]
    protocol: String,
}

impl LlmConfigCommand {
    pub async fn exec(&self) {
        if self.options.iter().any(|option| !option.contains(':')) {
            println!(
                "{}",
                format!(
                    "Options must be given as <key>:<value>, available keys: {}",
                    api::CONFIG_OPTION_KEYS.join("/")
                )
                .red()
            );
            process::exit(1);
        }

        let options_map = VecOptions(&self.options).into_map();
        match api::llm_config(&self.protocol, &options_map).await {
            Ok(outcome) => {
                let stored = &outcome.stored;
                println!(
                    "LLM configured: {} at {} (key {})",
                    stored.model.green(),
                    stored.base_url,
                    if stored.api_key.is_empty() {
                        "not stored".to_string()
                    } else {
                        stored.masked_api_key()
                    }
                );
                println!("Saved to {}", outcome.path.display());

                for name in outcome.env_overrides {
                    println!(
                        "{}",
                        format!("[W] {name} is set and takes precedence over the stored value")
                            .yellow()
                    );
                }
            }
            Err(err) => {
                println!("{}", err.to_string().red());
                process::exit(1);
            }
        }
    }
}
