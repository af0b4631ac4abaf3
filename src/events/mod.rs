//! Event and message types exchanged between systems.
//!
//! Submodules:
//! - [`cards`] – awarded cards delivered for an opened pack
//! - [`pack`] – pack lifecycle messages and transition requests
//! - [`switchdebug`] – toggle the debug overlay on/off
//! - [`texture`] – texture worker commands/results and canvas notifications
pub mod cards;
pub mod pack;
pub mod switchdebug;
pub mod texture;
