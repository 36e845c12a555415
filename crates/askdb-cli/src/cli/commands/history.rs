use super::{exit_codes, Ctx};
use crate::cli::args::{HistoryArgs, HistorySub};

pub fn cmd_history(ctx: &Ctx, args: HistoryArgs) -> anyhow::Result<i32> {
    let store = ctx.history()?;
    match args.cmd {
        Some(HistorySub::Bookmark { id }) => {
            if !store.toggle_bookmark(id)? {
                eprintln!("config error: no history entry with id {}", id);
                return Ok(exit_codes::CONFIG_ERROR);
            }
            eprintln!("toggled bookmark on #{}", id);
        }
        None => {
            for e in store.list(args.db.as_deref(), args.limit)? {
                let mark = if e.is_bookmarked { "★" } else { " " };
                println!(
                    "{} #{:<4} {} [{}] {} ({} rows)\n       {}",
                    mark,
                    e.id,
                    e.executed_at,
                    e.db_name,
                    e.question,
                    e.result_rows,
                    e.sql_query.replace('\n', " ")
                );
            }
        }
    }
    Ok(exit_codes::OK)
}
