//! Core library for the raydium-volume-bot project.
//!
//! The binary (`main.rs`) wires a [`dex::BotContext`] into an
//! [`bot::OrderScheduler`] and hands it to [`supervisor::supervise`].

pub mod bot;
pub mod config;
pub mod dex;
pub mod errors;
pub mod models;
pub mod supervisor;
pub mod utils;

#[cfg(test)]
mod testing;
