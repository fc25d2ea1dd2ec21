/// Chess domain types and rules.
pub mod chess;
/// Wire envelopes and the command handler.
pub mod protocol;
/// Live participants of each game.
pub mod session;
/// Collaborators that resolve identities and persist games.
pub mod store;
