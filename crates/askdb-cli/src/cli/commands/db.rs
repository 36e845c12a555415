use super::{exit_codes, Ctx};
use crate::cli::args::{DbArgs, DbSub};

pub fn cmd_db(ctx: &Ctx, args: DbArgs) -> anyhow::Result<i32> {
    let catalog = ctx.catalog();
    match args.cmd {
        DbSub::List => {
            let entries = catalog.list()?;
            if entries.is_empty() {
                eprintln!("no databases in {}", catalog.dir().display());
            }
            for e in entries {
                println!("{} {:<20} {} - {}", e.icon, e.key, e.name, e.description);
            }
        }
        DbSub::Add {
            key,
            name,
            description,
            icon,
        } => match catalog.add(&key, &name, &description, &icon) {
            Ok(entry) => eprintln!("created {}", entry.file.display()),
            Err(e) => {
                eprintln!("config error: {}", e);
                return Ok(exit_codes::CONFIG_ERROR);
            }
        },
        DbSub::Delete { key } => {
            if let Err(e) = catalog.delete(&key) {
                eprintln!("config error: {}", e);
                return Ok(exit_codes::CONFIG_ERROR);
            }
            let removed = ctx.assistant(false)?.clear_cache(Some(&key))?;
            eprintln!("deleted {} ({} cached analyses dropped)", key, removed);
        }
    }
    Ok(exit_codes::OK)
}
