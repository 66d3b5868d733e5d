#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod address;
pub mod constants;
pub mod error;
pub mod field;
pub mod proposal;
pub mod record;
pub mod vote;

pub use address::*;
pub use constants::*;
pub use error::*;
pub use field::*;
pub use proposal::*;
pub use record::*;
pub use vote::*;
