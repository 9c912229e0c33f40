pub mod record;
pub mod share;

pub use record::*;
pub use share::*;
