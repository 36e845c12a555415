use super::exit_codes;
use askdb_core::providers::gateway::{available_models, DEFAULT_MODEL};

pub fn cmd_models() -> anyhow::Result<i32> {
    for (id, description) in available_models() {
        let marker = if id == DEFAULT_MODEL { "*" } else { " " };
        println!("{} {:<24} {}", marker, id, description);
    }
    Ok(exit_codes::OK)
}
