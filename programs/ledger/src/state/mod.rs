pub mod entries;
pub mod ledger;
pub mod position;

pub use entries::*;
pub use ledger::*;
pub use position::*;
