use super::{exit_codes, Ctx};
use crate::cli::args::{CacheArgs, CacheSub};

pub fn cmd_cache(ctx: &Ctx, args: CacheArgs) -> anyhow::Result<i32> {
    match args.cmd {
        CacheSub::Clear { db } => {
            let removed = ctx.assistant(false)?.clear_cache(db.as_deref())?;
            match db {
                Some(db) => eprintln!("cleared {} cached analyses for {}", removed, db),
                None => eprintln!("cleared {} cached analyses", removed),
            }
        }
    }
    Ok(exit_codes::OK)
}
