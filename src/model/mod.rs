//! Model module containing GAN architecture components
//!
//! This module provides:
//! - Stage lists the networks are built from
//! - Generator network for creating synthetic digits
//! - Discriminator network for distinguishing real from fake
//! - GAN wrapper combining both networks

mod stack;
mod generator;
mod discriminator;
mod gan;

pub use stack::{Stack, Stage};
pub use generator::Generator;
pub use discriminator::Discriminator;
pub use gan::Gan;
