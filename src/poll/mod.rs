pub mod catalog;
pub mod ledger;

pub use ledger::{VoteError, VoteLedger, VoteOption, VotePolicy, VoteTally};
