//! Command entry points

pub mod interactive;
