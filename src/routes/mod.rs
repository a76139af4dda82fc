//! Route modules for the stash server

pub mod upload;
