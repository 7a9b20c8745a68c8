//! Peer-to-peer replication of turn results
//!
//! The peer that owns a turn resolves it and ships a `RuleResult`; the other
//! peer applies it through `RuleEngine::apply_rule_result` instead of
//! resolving locally. Transport and threading live outside this crate.

pub mod rule_result;

pub use rule_result::{decode_rule_result, encode_rule_result, RuleResult};
