//! Scripts for deploying the NRGY token, the Axe NFT collections, and the
//! marketplace with its royalty manager.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod cli;
mod commands;
pub mod config;
pub mod constants;
pub mod errors;
pub mod plan;
pub mod plans;
pub mod provider;
mod proxy;
pub mod reporter;
pub mod sequencer;
mod solidity;
pub mod utils;
