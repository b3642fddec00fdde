//! `cheatcode` - key-sequence detector with a timed effect player
//!
//! Feed key tokens to a [`detector::Detector`]; when they spell out the
//! target sequence (the Konami code by default) it plays a short-lived
//! visual effect on a [`surface::Surface`] and removes it again once the
//! effect lifetime has passed.

pub mod cli;
pub mod config;
pub mod detector;
pub mod effect;
pub mod error;
pub mod matcher;
pub mod observability;
pub mod surface;
pub mod token;
