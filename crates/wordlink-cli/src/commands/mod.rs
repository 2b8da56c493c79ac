// crates/wordlink-cli/src/commands/mod.rs
//
// Command module declarations for the wordlink CLI.

pub mod daily;
pub mod hint;
pub mod pair;
pub mod play;
pub mod similarity;
