//! Pipehat Core
//!
//! Engine for working with HL7 v2 messages: parsing the delimiter
//! hierarchy each message declares for itself, resolving position addresses
//! like `PID-3[1].1.2`, masking and updating values in place, and
//! re-serializing with an exact round trip. File discovery, filter
//! expressions, and the MLLP transport live here too; the CLI crate is a
//! thin shell over this one.

pub mod address;
pub mod discovery;
pub mod error;
pub mod filter;
pub mod mllp;
pub mod model;
pub mod result;

// Re-export commonly used types
pub use address::{Address, ItemPath, resolve};
pub use discovery::expand_paths;
pub use error::{ErrorKind, PipehatError};
pub use filter::Filter;
pub use mllp::{MllpClient, SendOptions, frame, unframe};
pub use model::{
    Component, Delimiters, Field, FieldItem, Message, NULL_VALUE, Node, SEGMENT_SEPARATOR,
    Segment, SubComponent, ValueChange,
};
pub use result::{Result, ResultExt};

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pipehat=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
