//! Headless classroom front end: hash routing, view state and data loading
//! against the classroom REST API.

pub mod alert;
pub mod api;
pub mod error;
pub mod history;
pub mod loader;
pub mod route;
pub mod router;
pub mod settings;
pub mod state;
pub mod view;

pub use alert::{Alert, AlertCategory, AlertContext};
pub use api::{ClassroomApi, HttpClassroomApi};
pub use error::{ClientError, ClientResult};
pub use route::{CourseTab, Route};
pub use router::{AssignmentDraft, Router, RouterStats};
pub use view::View;

#[derive(Debug, Clone)]
pub enum ClientEvent {
    RouteChanged(Route),
    ViewUpdated { generation: u64 },
    Alert(Alert),
}
