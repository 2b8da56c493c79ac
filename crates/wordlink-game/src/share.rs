// crates/wordlink-game/src/share.rs
//
// Plain-text summary of a finished chain: one row of colored squares per
// word, one square per letter, colored by the word's progress.

use wordlink_core::game::GameState;

fn progress_square(progress: f32) -> &'static str {
    if progress <= 20.0 {
        "\u{1F7E6}" // blue
    } else if progress <= 40.0 {
        "\u{1F7E9}" // green
    } else if progress <= 60.0 {
        "\u{1F7E7}" // orange
    } else if progress <= 80.0 {
        "\u{1F7E8}" // yellow
    } else {
        "\u{1F7E5}" // red
    }
}

/// Share text for `state`, linking back to `<base_url>/<start>/<target>`.
///
/// The last word of the chain always reads as 100% progress.
pub fn share_text(state: &GameState, base_url: &str) -> String {
    let steps = state.current_chain.len().saturating_sub(1);
    let start = state.start_word.to_uppercase();
    let target = state.target_word.to_uppercase();

    let mut out = format!("I Connected {} to {} in {} steps!\n\n", start, target, steps);
    out.push_str(&start);
    out.push('\n');

    for (i, word) in state.current_chain.iter().enumerate().skip(1) {
        let progress = if i == state.current_chain.len() - 1 {
            100.0
        } else {
            state.word_progresses.get(i - 1).copied().unwrap_or(0.0)
        };
        out.push_str(&progress_square(progress).repeat(word.chars().count()));
        out.push('\n');
    }

    out.push_str(&target);
    out.push_str("\n\n");
    out.push_str(&format!(
        "Play with these words: {}/{}/{}",
        base_url.trim_end_matches('/'),
        state.start_word,
        state.target_word
    ));
    out
}
