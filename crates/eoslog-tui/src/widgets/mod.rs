//! Ratatui widgets for the eoslog TUI.

pub mod command_bar;
pub mod group_list;
pub mod help;
pub mod log_stream;
pub mod status_bar;
