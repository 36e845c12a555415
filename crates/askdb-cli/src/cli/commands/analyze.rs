use super::{exit_codes, Ctx};
use crate::cli::args::{AnalyzeArgs, DiagramArgs};

pub async fn cmd_explain(ctx: &Ctx, args: AnalyzeArgs) -> anyhow::Result<i32> {
    let Some(path) = ctx.resolve_db(&args.db)? else {
        return Ok(exit_codes::CONFIG_ERROR);
    };
    let model = ctx.model(args.model.as_deref());
    let generation = ctx.assistant(false)?.explain(&path, &model).await?;
    if generation.degraded {
        eprintln!("{}", generation.text);
    } else {
        println!("{}", generation.text);
    }
    Ok(exit_codes::OK)
}

pub async fn cmd_suggest(ctx: &Ctx, args: AnalyzeArgs) -> anyhow::Result<i32> {
    let Some(path) = ctx.resolve_db(&args.db)? else {
        return Ok(exit_codes::CONFIG_ERROR);
    };
    let model = ctx.model(args.model.as_deref());
    let items = ctx.assistant(false)?.suggest(&path, &model).await?;
    for (i, q) in items.iter().enumerate() {
        println!("{}. {}", i + 1, q);
    }
    Ok(exit_codes::OK)
}

pub fn cmd_diagram(ctx: &Ctx, args: DiagramArgs) -> anyhow::Result<i32> {
    let Some(path) = ctx.resolve_db(&args.db)? else {
        return Ok(exit_codes::CONFIG_ERROR);
    };
    println!("{}", ctx.assistant(false)?.diagram(&path)?);
    Ok(exit_codes::OK)
}
