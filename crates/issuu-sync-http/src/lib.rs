pub mod client;
pub mod signature;

pub use client::{Action, IssuuClient};
pub use signature::{SignedParams, sign};
