use crate::config::Config;
use tracing::info;
use colored::*;
use figlet_rs::FIGfont;

pub fn print_config(config: &Config) {
    let json = serde_json::to_string_pretty(config).unwrap_or_default();

    info!("\n{}: \n{}", String::from("[CONFIG]").blue().underline(), json.magenta());
}

pub fn print_app_starting() {
    if let Ok(standard_font) = FIGfont::standard() {
        if let Some(figure) = standard_font.convert("TRI scanner") {
            info!("\n{}", figure);
        }
    }
}
