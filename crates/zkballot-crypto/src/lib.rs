#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod commitment;
pub mod identity;
pub mod merkle;
pub mod poseidon;

pub use commitment::*;
pub use identity::*;
pub use merkle::*;
pub use poseidon::*;
