use startval::api;
use strum::EnumMessage;
use tabled::settings::{Color, object::Columns};

#[derive(clap::Args)]
pub struct CategoriesCommand;

impl CategoriesCommand {
    pub async fn exec(&self) {
        let mut table_data: Vec<Vec<String>> = vec![];

        for category in api::categories().await {
            table_data.push(vec![
                category.label().to_string(),
                category.get_serializations().join("/"),
                category.question().to_string(),
            ]);
        }

        let mut table = tabled::builder::Builder::from_iter(&table_data).build();
        table.modify(Columns::first(), Color::FG_GREEN);
        println!("{table}");
    }
}
