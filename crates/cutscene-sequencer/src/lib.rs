//! Cutscene sequencing engine.
//!
//! Plays an ordered, category-filtered list of animated assets back to back,
//! decides when each one has finished without relying on a single
//! authoritative signal, and routes a player skip to the right downstream
//! action. Rendering is left to a [`core::PresentationContainer`]; gameplay
//! hand-off goes through a [`core::SessionController`].

pub mod core;
