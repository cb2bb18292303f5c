//! Todo lists and items: the transactional writers and the service the
//! HTTP handlers call.

pub mod service;
pub mod writer;

pub use service::{TodoOperations, TodoService};
pub use writer::{ItemWriter, ListWriter};
