//! Merchants and their owners

mod entity;
mod user;

pub use entity::Merchant;
pub use user::User;
