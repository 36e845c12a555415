use super::{exit_codes, Ctx};
use crate::cli::args::AskArgs;
use askdb_core::report::{self, console};

const MAX_ROWS: usize = 100;

pub async fn cmd_ask(ctx: &Ctx, args: AskArgs) -> anyhow::Result<i32> {
    let question = args.question.trim();
    if question.is_empty() {
        eprintln!("config error: question must not be empty");
        return Ok(exit_codes::CONFIG_ERROR);
    }
    if args.out.is_some() && !args.execute {
        eprintln!("config error: --out requires --execute");
        return Ok(exit_codes::CONFIG_ERROR);
    }
    let Some(path) = ctx.resolve_db(&args.db)? else {
        return Ok(exit_codes::CONFIG_ERROR);
    };

    let model = ctx.model(args.model.as_deref());
    let assistant = ctx.assistant(args.execute)?;
    let outcome = assistant.ask(&path, question, &model, args.execute).await?;
    console::print_translation(&outcome.translation);

    let Some(result) = outcome.execution else {
        return Ok(exit_codes::OK);
    };
    println!();
    console::print_table(&result, MAX_ROWS);
    if !result.success {
        return Ok(exit_codes::SQL_FAILED);
    }
    if let Some(out) = &args.out {
        report::export(&result, out)?;
        eprintln!("wrote {}", out.display());
    }
    Ok(exit_codes::OK)
}
