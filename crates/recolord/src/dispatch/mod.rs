//! Request dispatch for the recolor protocol.
//!
//! Every inbound message is validated before any work happens. A message is
//! answered only when it is a JSON object whose `status` is `"run"` and whose
//! `data` is a batch of colors:
//!
//! ```json
//! {"status":"run","data":[{"r":1,"g":2,"b":3}],"job":"a-17"}
//! ```
//!
//! The reply carries `"status":"done"`, the recolored batch and every other
//! field of the request unchanged:
//!
//! ```json
//! {"status":"done","data":[{"r":200,"g":14,"b":77}],"job":"a-17"}
//! ```
//!
//! Anything else is logged and dropped without a reply; the connection stays
//! open for the next message.

mod errors;
mod handler;
mod request;
mod response;

pub use self::errors::RejectReason;
pub use self::handler::Dispatcher;
pub(crate) use self::handler::DispatchConnectionHandler;
pub use self::request::{ValidatedRequest, validate};

const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Status value that asks the service to recolor `data`.
pub const RUN_STATUS: &str = "run";
/// Status value stamped on successful replies.
pub const DONE_STATUS: &str = "done";
