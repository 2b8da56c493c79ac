// crates/wordlink-cli/src/commands/play.rs
//
// `wordlink play`: interactive game in the terminal.
//
// Plain lines extend the chain. Lines starting with ':' are commands:
//   :edit N word   replace word N and drop everything after it
//   :undo          remove the last word
//   :hint          suggest and play a word
//   :new           start a new pair
//   :retry         restart the current pair
//   :share         print share text
//   :show          print the chain
//   :quit          leave
//
// Shards are prefetched in the background while the player thinks.

use std::io::Write;
use std::time::Duration;

use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, BufReader};

use wordlink_core::error::WordlinkError;
use wordlink_core::traits::RelatednessOracle;
use wordlink_game::{
    find_daily_pair, find_hint, find_random_pair, share_text, Band, ChainGame, HintRequest,
    Outcome, WordPair,
};
use wordlink_store::Prefetcher;

use crate::context::AppContext;
use crate::output::{chain_rows, emit, format_table};

/// Interactive play command.
#[derive(Debug, Args)]
pub struct PlayCmd {
    /// Start word (requires --target).
    #[arg(long, requires = "target")]
    pub start: Option<String>,

    /// Target word (requires --start).
    #[arg(long, requires = "start")]
    pub target: Option<String>,

    /// Play today's shared pair.
    #[arg(long, conflicts_with = "start")]
    pub daily: bool,

    /// Do not load shards in the background.
    #[arg(long)]
    pub no_prefetch: bool,
}

/// One line of player input.
#[derive(Debug, Clone, PartialEq)]
enum Input {
    Word(String),
    Edit(usize, String),
    Undo,
    Hint,
    New,
    Retry,
    Share,
    Show,
    Help,
    Quit,
}

fn parse_input(line: &str) -> Result<Input, String> {
    let line = line.trim();
    let Some(command) = line.strip_prefix(':') else {
        if line.is_empty() || line.contains(char::is_whitespace) {
            return Err("enter a single word, or :help".to_string());
        }
        return Ok(Input::Word(line.to_string()));
    };

    let mut parts = command.split_whitespace();
    let input = match parts.next().unwrap_or_default() {
        "edit" | "e" => {
            let index = parts
                .next()
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| "usage: :edit N word".to_string())?;
            let word = parts.next().ok_or_else(|| "usage: :edit N word".to_string())?;
            Input::Edit(index, word.to_string())
        }
        "undo" | "back" | "u" => Input::Undo,
        "hint" | "h" => Input::Hint,
        "new" | "n" => Input::New,
        "retry" | "r" => Input::Retry,
        "share" | "s" => Input::Share,
        "show" => Input::Show,
        "help" | "?" => Input::Help,
        "quit" | "q" | "exit" => Input::Quit,
        other => return Err(format!("unknown command :{} (try :help)", other)),
    };

    if parts.next().is_some() {
        return Err(format!("too many arguments for :{}", command));
    }
    Ok(input)
}

const HELP: &str = "\
Type a word to extend the chain. Commands:
  :edit N word   replace word N and drop everything after it
  :undo          remove the last word
  :hint          suggest and play a word
  :new           start a new pair
  :retry         restart the current pair
  :share         print share text
  :show          print the chain
  :quit          leave";

fn oracle_of(ctx: &AppContext) -> Option<&dyn RelatednessOracle> {
    ctx.oracle.as_ref().map(|o| o as &dyn RelatednessOracle)
}

async fn random_pair(ctx: &AppContext, band: Band) -> Result<WordPair, WordlinkError> {
    let mut rng = StdRng::from_entropy();
    find_random_pair(&ctx.cache, band, &mut rng).await
}

fn show(ctx: &AppContext, game: &ChainGame) {
    let state = game.state();
    emit(ctx.format, state, || {
        format!(
            "{} -> {}\n{}",
            state.start_word,
            state.target_word,
            format_table(&chain_rows(state))
        )
    });
}

/// Report the result of an extend or edit and feed the difficulty controller.
fn report_move(ctx: &AppContext, game: &ChainGame, result: Result<Outcome, WordlinkError>) {
    match result {
        Ok(Outcome::Accepted { progress }) => {
            println!("Accepted ({:.0}% of the way there)", progress);
            show(ctx, game);
        }
        Ok(Outcome::Completed { .. }) => {
            ctx.controller.on_game_completed();
            show(ctx, game);
            println!(
                "You reached \"{}\" in {} steps!",
                game.state().target_word,
                game.state().score
            );
            println!("Type :share to share, or :new for another pair.");
        }
        Err(WordlinkError::RejectedWord { word, previous }) => {
            ctx.controller.on_word_rejected();
            println!("\"{}\" is not related enough to \"{}\"", word, previous);
        }
        Err(WordlinkError::NoBaseform(word)) => {
            println!("\"{}\" is not in the word list", word);
        }
        Err(e) => println!("{}", e),
    }
}

/// Run the play command.
pub async fn run(ctx: &AppContext, cmd: &PlayCmd) -> Result<(), Box<dyn std::error::Error>> {
    let prefetch = if cmd.no_prefetch {
        None
    } else {
        Some(Prefetcher::spawn(
            ctx.cache.clone(),
            Duration::from_millis(ctx.config.prefetch_interval_ms),
        ))
    };

    println!("Loading word list...");
    ctx.cache.ensure_loaded().await?;

    let (start, target) = match (&cmd.start, &cmd.target) {
        (Some(start), Some(target)) => (start.clone(), target.clone()),
        _ if cmd.daily => {
            let today = chrono::Local::now().date_naive();
            let pair =
                find_daily_pair(&ctx.cache, ctx.config.difficulty.initial_band(), today).await?;
            (pair.start, pair.target)
        }
        _ => {
            let pair = random_pair(ctx, ctx.controller.band()).await?;
            (pair.start, pair.target)
        }
    };

    let mut game = ChainGame::new(&start, &target, ctx.config.rules);
    for word in [&game.state().start_word, &game.state().target_word] {
        if !ctx.cache.is_valid_word(word) {
            println!("Warning: \"{}\" is not in the word list", word);
        }
    }
    println!("{}", HELP);
    show(ctx, &game);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = match parse_input(&line) {
            Ok(input) => input,
            Err(msg) => {
                println!("{}", msg);
                continue;
            }
        };

        match input {
            Input::Word(word) => {
                let result = game.extend(&ctx.cache, oracle_of(ctx), &word).await;
                report_move(ctx, &game, result);
            }
            Input::Edit(index, word) => {
                let result = game.edit(&ctx.cache, oracle_of(ctx), index, &word).await;
                report_move(ctx, &game, result);
            }
            Input::Undo => match game.undo() {
                Ok(word) => {
                    ctx.controller.on_word_rejected();
                    println!("Removed \"{}\"", word);
                    show(ctx, &game);
                }
                Err(e) => println!("{}", e),
            },
            Input::Hint => {
                if game.state().is_complete {
                    println!("The chain is already complete.");
                    continue;
                }
                ctx.controller.on_hint_used();
                let state = game.state().clone();
                let request = HintRequest {
                    previous_word: state.last_word(),
                    target_word: &state.target_word,
                    current_progress: state.current_progress(),
                    used_words: &state.current_chain,
                };
                let mut rng = StdRng::from_entropy();
                match find_hint(&ctx.cache, &request, &ctx.config.rules, &mut rng).await {
                    Ok(Some(word)) => {
                        println!("Hint: {}", word);
                        let result = game.extend(&ctx.cache, oracle_of(ctx), &word).await;
                        report_move(ctx, &game, result);
                    }
                    Ok(None) => println!("Couldn't find a hint at this time. Try a different word!"),
                    Err(e) => println!("Error generating hint: {}", e),
                }
            }
            Input::New => {
                if !game.state().is_complete {
                    ctx.controller.on_new_game_without_completion();
                }
                match random_pair(ctx, ctx.controller.band()).await {
                    Ok(pair) => {
                        game.new_game(&pair.start, &pair.target);
                        show(ctx, &game);
                    }
                    Err(e) => println!("Failed to generate new words: {}", e),
                }
            }
            Input::Retry => {
                ctx.controller.on_new_game_without_completion();
                game.retry();
                show(ctx, &game);
            }
            Input::Share => println!("{}", share_text(game.state(), &ctx.config.share_url)),
            Input::Show => show(ctx, &game),
            Input::Help => println!("{}", HELP),
            Input::Quit => break,
        }
    }

    if let Some(handle) = prefetch {
        let loaded = handle.stop().await;
        tracing::info!("Prefetcher loaded {} shards this session", loaded);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_word() {
        assert_eq!(parse_input("  Kitten \n"), Ok(Input::Word("Kitten".to_string())));
        assert!(parse_input("two words").is_err());
        assert!(parse_input("   ").is_err());
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_input(":edit 2 puppy"), Ok(Input::Edit(2, "puppy".to_string())));
        assert_eq!(parse_input(":undo"), Ok(Input::Undo));
        assert_eq!(parse_input(":h"), Ok(Input::Hint));
        assert_eq!(parse_input(":new"), Ok(Input::New));
        assert_eq!(parse_input(":retry"), Ok(Input::Retry));
        assert_eq!(parse_input(":share"), Ok(Input::Share));
        assert_eq!(parse_input(":q"), Ok(Input::Quit));
    }

    #[test]
    fn test_parse_command_errors() {
        assert!(parse_input(":edit x puppy").is_err());
        assert!(parse_input(":edit 2").is_err());
        assert!(parse_input(":undo now").is_err());
        assert!(parse_input(":dance").is_err());
    }
}
