use shared::{
    domain::{Course, Role},
    protocol::{Assignment, User},
};

use crate::{alert::Alert, route::Route, view::View};

/// Everything the router owns. Only the router mutates it.
#[derive(Debug, Clone)]
pub struct AppState {
    pub session: Option<User>,
    pub courses: Vec<Course>,
    pub selected_course: Option<Course>,
    pub route: Route,
    pub view: View,
    /// Assignment list of the selected course as of the last view load.
    pub assignments: Vec<Assignment>,
    /// Bumped on every route application; loads started under an older value
    /// are discarded.
    pub generation: u64,
    pub last_alert: Option<Alert>,
}

impl AppState {
    pub fn new(courses: Vec<Course>) -> Self {
        Self {
            session: None,
            courses,
            selected_course: None,
            route: Route::Login,
            view: View::Login,
            assignments: Vec::new(),
            generation: 0,
            last_alert: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.session.as_ref().map(|user| user.role)
    }

    pub fn clear_session(&mut self) {
        self.session = None;
        self.selected_course = None;
        self.assignments.clear();
    }
}
