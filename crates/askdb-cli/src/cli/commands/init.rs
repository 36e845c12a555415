use super::exit_codes;
use std::path::Path;

pub fn cmd_init(config: &Path) -> anyhow::Result<i32> {
    if config.exists() {
        eprintln!("note: {} already exists", config.display());
        return Ok(exit_codes::OK);
    }
    if let Some(parent) = config.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    askdb_core::config::write_sample_config(config)?;
    eprintln!("created {}", config.display());
    Ok(exit_codes::OK)
}
