use super::{exit_codes, Ctx};
use crate::cli::args::ExecArgs;
use askdb_core::exec::execute;
use askdb_core::report::{self, console};

pub fn cmd_exec(ctx: &Ctx, args: ExecArgs) -> anyhow::Result<i32> {
    let Some(path) = ctx.resolve_db(&args.db)? else {
        return Ok(exit_codes::CONFIG_ERROR);
    };

    let result = execute(&path, &args.sql);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        console::print_table(&result, args.max_rows);
    }
    if !result.success {
        return Ok(exit_codes::SQL_FAILED);
    }

    if let Some(out) = &args.out {
        report::export(&result, out)?;
        eprintln!("wrote {}", out.display());
    }
    Ok(exit_codes::OK)
}
