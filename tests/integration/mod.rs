//! Integration tests for the twig version-control core

mod commit_history;
mod config_layering;
mod hasher_verification;
mod object_store;
mod stage_all;
mod test_utils;
