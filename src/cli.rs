use clap::Subcommand;

mod categories;
mod evaluate;
mod llm;

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Display all evaluation categories")]
    Categories(Box<categories::CategoriesCommand>),

    #[command(about = "Evaluate a startup")]
    #[clap(visible_aliases = &["eval"])]
    Evaluate(Box<evaluate::EvaluateCommand>),

    #[command(subcommand, about = "Configure or test the LLM provider")]
    Llm(llm::LlmCommand),
}
