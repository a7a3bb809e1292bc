use clap::Subcommand;

mod config;

#[derive(Subcommand)]
pub enum LlmCommand {
    #[command(about = "Configure LLM provider")]
    Config(Box<config::LlmConfigCommand>),

    #[command(about = "Test the configured LLM provider")]
    Test(Box<test::LlmTestCommand>),
}

impl LlmCommand {
    pub async fn exec(&self) {
        match self {
            LlmCommand::Config(cmd) => {
                cmd.exec().await;
            }
            LlmCommand::Test(cmd) => {
                cmd.exec().await;
            }
        }
    }
}
