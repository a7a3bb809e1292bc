use std::process;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use startval::{
    api,
    api::{EvaluateOptions, FallbackRange, Recommendation, ResponseFormat},
    error::StartvalError,
};
use tokio::time::Duration;

#[derive(clap::Args)]
pub struct EvaluateCommand {
    #[arg(
        long = "fallback",
        help = "Score range for unanswered categories, low (1-5) or full (1-10), the default value is low"
    )]
    fallback: Option<FallbackRange>,

    #[arg(
        short = 'f',
        long = "format",
        help = "Answer format requested from the LLM, lines or json, the default value is lines"
    )]
    format: Option<ResponseFormat>,

    #[arg(
        short = 'm',
        long = "manual",
        help = "Ask for categories the LLM did not answer"
    )]
    manual: bool,

    #[arg(long = "no-search", help = "Skip fetching search result snippets")]
    no_search: bool,

    #[arg(help = "Startup to evaluate, asked interactively when omitted")]
    company: Option<String>,
}

impl EvaluateCommand {
    pub async fn exec(&self) {
        let company = match &self.company {
            Some(company) => company.trim().to_string(),
            None => match dialoguer::Input::<String>::new()
                .with_prompt("Enter the startup name")
                .interact_text()
            {
                Ok(company) => company.trim().to_string(),
                Err(err) => {
                    println!("{}", err.to_string().red());
                    process::exit(1);
                }
            },
        };

        if company.is_empty() {
            println!("{}", "Startup name must not be empty".red());
            process::exit(1);
        }

        let options = EvaluateOptions {
            fallback: self.fallback.unwrap_or_default(),
            format: self.format.unwrap_or_default(),
            manual: self.manual,
            skip_search: self.no_search,
        };

        // The manual prompts need the terminal, so no spinner in that mode
        let spinner = if self.manual {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };
        if let Ok(style) = ProgressStyle::with_template("{msg} {spinner:.cyan} [{elapsed}]") {
            spinner.set_style(style);
        }
        spinner.set_message(format!("[{}]", company.cyan()));
        spinner.enable_steady_tick(Duration::from_millis(100));

        match api::evaluate(&company, &options).await {
            Ok(evaluation) => {
                spinner.finish_and_clear();

                if let Some(snippets) = &evaluation.snippets {
                    for snippet in snippets.iter().filter(|s| !s.is_empty()) {
                        println!("{}", format!("> {snippet}").bright_black());
                    }
                    println!();
                }

                let report = evaluation.report.render();
                match evaluation.report.recommendation {
                    Recommendation::Strong => println!("{}", report.green()),
                    Recommendation::Promising => println!("{}", report.yellow()),
                    Recommendation::HighRisk => println!("{}", report.red()),
                }
            }
            Err(err) => {
                spinner.finish_and_clear();
                println!("{}", err.to_string().red());

                if let StartvalError::Required("API_KEY_REQUIRED", _) = err {
                    println!(
                        "[I] Run `{}` or add OPENAI_API_KEY to a .env file",
                        "startval llm config -O api_key:<key>".green()
                    );
                }
                process::exit(1);
            }
        }
    }
}
