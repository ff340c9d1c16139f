//! Acknowledgment reaction classification.

use crate::models::chat::Reaction;

/// Reaction name prefixes that count as a thumbs-up.
///
/// Prefix matching also accepts skin-tone variants such as
/// `+1::skin-tone-4`.
pub const ACK_REACTION_PREFIXES: [&str; 3] = ["thumbsup", "+1", "thumbs_up"];

/// Whether a reaction name counts as an acknowledgment.
#[must_use]
pub fn is_acknowledgment(name: &str) -> bool {
    ACK_REACTION_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
}

/// First actor on the first qualifying reaction, in backend order.
///
/// A qualifying reaction with an empty actor list is passed over. Later
/// co-reactors are ignored.
#[must_use]
pub fn first_acknowledger(reactions: &[Reaction]) -> Option<&str> {
    reactions
        .iter()
        .filter(|reaction| is_acknowledgment(&reaction.name))
        .find_map(|reaction| reaction.actors.first())
        .map(String::as_str)
}
