pub mod collection;
pub mod errors;
pub mod filters;
pub mod models;
pub mod scheduler;
pub mod session;
pub mod stats;
pub mod store;
pub mod transfer;

pub use collection::*;
pub use errors::*;
pub use filters::*;
pub use models::*;
pub use scheduler::*;
pub use session::*;
pub use stats::*;
pub use store::*;
pub use transfer::*;
