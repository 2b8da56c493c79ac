// crates/wordlink-cli/src/commands/similarity.rs
//
// `wordlink similarity <a> <b>`: cosine similarity and progress between
// two words.

use clap::Args;
use serde::Serialize;

use wordlink_game::word_similarity;

use crate::context::AppContext;
use crate::output::emit;

/// Similarity command.
#[derive(Debug, Args)]
pub struct SimilarityCmd {
    /// First word.
    pub a: String,

    /// Second word (read as the target for progress).
    pub b: String,
}

#[derive(Debug, Serialize)]
struct SimilarityReport<'a> {
    a: &'a str,
    b: &'a str,
    similarity: f32,
    progress: f32,
    linked: bool,
    completes: bool,
}

/// Run the similarity command.
pub async fn run(ctx: &AppContext, cmd: &SimilarityCmd) -> Result<(), Box<dyn std::error::Error>> {
    let a = cmd.a.trim().to_lowercase();
    let b = cmd.b.trim().to_lowercase();
    let rules = &ctx.config.rules;

    let similarity = word_similarity(&ctx.cache, &a, &b).await?;
    let report = SimilarityReport {
        a: &a,
        b: &b,
        similarity,
        progress: rules.scale.progress(similarity),
        linked: similarity >= rules.adjacency_threshold,
        completes: similarity >= rules.completion_threshold,
    };

    emit(ctx.format, &report, || {
        format!(
            "{} ~ {}\n  Similarity: {:.4}\n  Progress:   {:.0}%\n  Linked:     {}\n  Completes:  {}",
            report.a,
            report.b,
            report.similarity,
            report.progress,
            if report.linked { "yes" } else { "no" },
            if report.completes { "yes" } else { "no" },
        )
    });
    Ok(())
}
