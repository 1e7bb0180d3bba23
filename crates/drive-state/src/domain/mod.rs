pub mod composite;
pub mod coordinator;
pub mod errors;
pub mod hash;
pub mod proof;
pub mod root_tree;
pub mod set;
pub mod snapshot;
pub mod transaction;
pub mod value_objects;

pub use composite::*;
pub use coordinator::*;
pub use errors::*;
pub use proof::*;
pub use root_tree::*;
pub use set::*;
pub use snapshot::*;
pub use transaction::*;
pub use value_objects::*;
