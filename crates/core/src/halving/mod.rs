//! Halving module - subsidy schedule and next-halving estimate from the chain tip.

mod halving_model;
mod halving_service;

pub use halving_model::{
    block_reward_at, HalvingSnapshot, HalvingStatus, AVERAGE_BLOCK_SECS, HALVING_INTERVAL_BLOCKS,
    INITIAL_SUBSIDY_SATS,
};
pub use halving_service::{HalvingService, HalvingServiceTrait};
