/// Lexitrain - Vocabulary Trainer Core
///
/// Core library providing adaptive review scheduling, study session
/// state machines, and multi-provider content generation (translations,
/// example sentences, answer verification, and illustrations) for a
/// foreign-language vocabulary trainer.
pub mod config;
pub mod core;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
