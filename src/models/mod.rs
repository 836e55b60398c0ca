//! Data models for the Farmstand platform.
//!
//! Wire types use camelCase to match the static front-end pages.

mod blog;
mod chat;
mod farm;
mod faq;
mod produce;
mod signup;

pub use blog::*;
pub use chat::*;
pub use farm::*;
pub use faq::*;
pub use produce::*;
pub use signup::*;
