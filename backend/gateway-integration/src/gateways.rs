pub mod coinbase;
pub mod converge;
pub mod squareup;

pub use self::{coinbase::Coinbase, converge::Converge, squareup::Squareup};
