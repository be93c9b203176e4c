pub mod dispatcher;
pub mod uipath;

pub use dispatcher::{BookingFunctionClient, WorkflowDispatcher};
pub use uipath::UiPathClient;
