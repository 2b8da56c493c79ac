// crates/wordlink-cli/src/commands/pair.rs
//
// `wordlink pair`: pick a random start/target pair.

use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;

use wordlink_game::{find_random_pair, Band};

use crate::context::AppContext;
use crate::output::emit;

/// Random pair command.
#[derive(Debug, Args)]
pub struct PairCmd {
    /// Lower similarity bound (defaults to the difficulty band).
    #[arg(long, allow_hyphen_values = true)]
    pub min: Option<f32>,

    /// Upper similarity bound (defaults to the difficulty band).
    #[arg(long, allow_hyphen_values = true)]
    pub max: Option<f32>,

    /// Seed for a reproducible pick.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Run the pair command.
pub async fn run(ctx: &AppContext, cmd: &PairCmd) -> Result<(), Box<dyn std::error::Error>> {
    let default_band = ctx.controller.band();
    let band = Band::new(
        cmd.min.unwrap_or(default_band.min),
        cmd.max.unwrap_or(default_band.max),
    );

    let mut rng = match cmd.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let pair = find_random_pair(&ctx.cache, band, &mut rng).await?;
    emit(ctx.format, &pair, || {
        format!(
            "{} -> {}  (similarity {:.3})",
            pair.start, pair.target, pair.similarity
        )
    });
    Ok(())
}
