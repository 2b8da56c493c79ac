// crates/wordlink-cli/src/commands/hint.rs
//
// `wordlink hint --target T <chain...>`: suggest the next word for a chain.

use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use wordlink_game::{find_hint, recalculate_progress, HintRequest};

use crate::context::AppContext;
use crate::output::emit;

/// Hint command.
#[derive(Debug, Args)]
pub struct HintCmd {
    /// Target word of the game.
    #[arg(long)]
    pub target: String,

    /// Chain so far, start word first.
    #[arg(required = true, num_args = 1..)]
    pub chain: Vec<String>,
}

#[derive(Debug, Serialize)]
struct HintReport {
    previous_word: String,
    current_progress: f32,
    hint: Option<String>,
}

/// Run the hint command.
pub async fn run(ctx: &AppContext, cmd: &HintCmd) -> Result<(), Box<dyn std::error::Error>> {
    let chain: Vec<String> = cmd.chain.iter().map(|w| w.trim().to_lowercase()).collect();
    let target = cmd.target.trim().to_lowercase();
    let previous = chain.last().cloned().unwrap_or_default();

    let progresses = recalculate_progress(&ctx.cache, &chain, &target, &ctx.config.rules.scale).await?;
    let current_progress = progresses.last().copied().unwrap_or(0.0);

    let request = HintRequest {
        previous_word: &previous,
        target_word: &target,
        current_progress,
        used_words: &chain,
    };
    let mut rng = StdRng::from_entropy();
    let hint = find_hint(&ctx.cache, &request, &ctx.config.rules, &mut rng).await?;

    let report = HintReport {
        previous_word: previous.clone(),
        current_progress,
        hint,
    };
    emit(ctx.format, &report, || match &report.hint {
        Some(word) => format!("Try \"{}\" after \"{}\"", word, report.previous_word),
        None => format!(
            "No hint found after \"{}\". Try a different word!",
            report.previous_word
        ),
    });
    Ok(())
}
