//! Message handling - matching incoming text against registered commands

pub mod dispatcher;

pub use dispatcher::{Dispatch, MessageDispatcher};
