pub mod batch;
pub mod preview;
pub mod session_registry;

pub use batch::{find_images, BatchConverter, BatchError, BatchReport, FileOutcome};
pub use preview::PreviewSession;
pub use session_registry::{InMemorySessionRegistry, SessionHandle, SessionId, SessionRegistry};
