//! Particle subsystems
//!
//! Each kind lives in its own fixed-capacity pool. Impacts chain between
//! them: raindrops make ripples or splash bursts, splashes make ripples,
//! main lightning bolts fork branches.

pub mod lightning;
pub mod raindrop;
pub mod ripple;
pub mod splash;

pub use lightning::Lightning;
pub use raindrop::Rain;
pub use ripple::Ripples;
pub use splash::Splashes;
