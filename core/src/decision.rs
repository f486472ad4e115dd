//! Verdicts derived from a `LookupResponse`.
//!
//! Both functions are total: they never fail and never touch the network.

use crate::types::{ActionType, LookupResponse, TokenType};

/// A token passes when it is unconsumed, its challenge (if any) was solved,
/// and the server issued it as the type the caller expects.
pub fn verify_token(lookup: &LookupResponse, token_type: TokenType) -> bool {
    !lookup.consumed && lookup.solved.unwrap_or(true) && lookup.token_type == token_type
}

/// `Block` for any token that fails `verify_token`; otherwise the action that
/// matches the visitor's risk level.
pub fn determine_action(lookup: &LookupResponse, token_type: TokenType) -> ActionType {
    if verify_token(lookup, token_type) {
        ActionType::from(lookup.risk_level())
    } else {
        ActionType::Block
    }
}
