// crates/wordlink-cli/src/commands/daily.rs
//
// `wordlink daily`: the pair every player gets today.

use chrono::NaiveDate;
use clap::Args;

use wordlink_game::find_daily_pair;

use crate::context::AppContext;
use crate::output::emit;

/// Daily pair command.
#[derive(Debug, Args)]
pub struct DailyCmd {
    /// Date as YYYY-MM-DD (default: today, local time).
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

/// Run the daily command.
pub async fn run(ctx: &AppContext, cmd: &DailyCmd) -> Result<(), Box<dyn std::error::Error>> {
    let date = cmd.date.unwrap_or_else(|| chrono::Local::now().date_naive());
    // The daily band ignores local difficulty so every player shares it.
    let band = ctx.config.difficulty.initial_band();

    let pair = find_daily_pair(&ctx.cache, band, date).await?;
    emit(ctx.format, &pair, || {
        format!("Daily pair for {}: {} -> {}", date, pair.start, pair.target)
    });
    Ok(())
}
