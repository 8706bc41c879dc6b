//! TabSync — tab & navigation synchronization engine for dual-host browser shells.
//!
//! Keeps an ordered tab registry consistent with a content surface whose
//! location changes independently, across host environments that give every
//! tab its own rendering surface and environments that emulate tabs over a
//! single shared surface.

pub mod database;
pub mod engine;
pub mod hosts;
pub mod managers;
pub mod services;
pub mod surface;
pub mod types;
