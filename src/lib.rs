//! sfapprove — approve or reject pending work items from the terminal.
//!
//! This library exposes the clients, the screen controller and the
//! terminal UI for integration testing. The binary entrypoint is in
//! `main.rs`.

pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod logging;
pub mod ui;
