//! Caregiver Wellness - assessment scoring and pressure-zone profiles
//!
//! This crate scores caregiver wellness instruments, keeps a per-user
//! profile of six canonical pressure zones with an append-only score
//! history, and flags sharp stress increases for proactive follow-up.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
