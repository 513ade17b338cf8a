//! Hash router and view controller.
//!
//! The router is the single writer of [`AppState`]. Fragment changes and load
//! results arrive as [`Intent`]s on one queue. Fragment writes made by the
//! router itself are tagged [`NavigationOrigin::Internal`] and dropped when
//! drained, so reflecting a view into the address bar never routes twice.

use std::sync::Arc;

use shared::{
    domain::{AssignmentId, Course, Role, SubmissionId},
    error::ErrorCode,
    protocol::{
        FileUpload, GradeRequest, LoginRequest, NewAssignment, NewSubmission, RegisterRequest,
    },
};
use tokio::{
    runtime::Handle,
    sync::{broadcast, mpsc},
};
use tracing::{debug, info, warn};

use crate::{
    alert::{Alert, AlertContext},
    api::ClassroomApi,
    error::{ClientError, ClientResult},
    history::{AddressBar, FragmentChange, NavigationOrigin},
    loader::{load_view, needs_load, LoadContext, LoadOutcome},
    route::{find_course, parse_fragment, resolve, CourseTab, Route},
    state::AppState,
    view::{CourseBanner, CoursePanel, CourseView, CreateForm, HomeView, ProfileBanner, View},
    ClientEvent,
};

#[derive(Debug)]
pub enum Intent {
    FragmentChanged(FragmentChange),
    Loaded {
        generation: u64,
        result: ClientResult<Option<LoadOutcome>>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterStats {
    pub routes_handled: u64,
    pub suppressed_changes: u64,
    pub stale_loads_dropped: u64,
}

/// Owns [`AppState`] and is its only writer. Course routes spawn their loads
/// on the current tokio runtime; without one the panel is marked failed.
pub struct Router {
    api: Arc<dyn ClassroomApi>,
    state: AppState,
    address_bar: AddressBar,
    intents_tx: mpsc::UnboundedSender<Intent>,
    intents_rx: mpsc::UnboundedReceiver<Intent>,
    inflight_loads: usize,
    events: broadcast::Sender<ClientEvent>,
    stats: RouterStats,
}

/// Assignment form fields as entered by a teacher.
#[derive(Debug, Clone, Default)]
pub struct AssignmentDraft {
    pub title: String,
    pub description: String,
    pub due_date: Option<String>,
    pub file: Option<FileUpload>,
}

impl Router {
    pub fn new(
        api: Arc<dyn ClassroomApi>,
        courses: Vec<Course>,
        initial_fragment: &str,
    ) -> Self {
        let (intents_tx, intents_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(256);
        Self {
            api,
            state: AppState::new(courses),
            address_bar: AddressBar::new(initial_fragment),
            intents_tx,
            intents_rx,
            inflight_loads: 0,
            events,
            stats: RouterStats::default(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> &View {
        &self.state.view
    }

    pub fn route(&self) -> &Route {
        &self.state.route
    }

    pub fn fragment(&self) -> &str {
        self.address_bar.fragment()
    }

    pub fn address_bar(&self) -> &AddressBar {
        &self.address_bar
    }

    pub fn stats(&self) -> RouterStats {
        self.stats
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Checks the backend session, then routes the initial fragment.
    pub async fn start(&mut self) {
        match self.api.session().await {
            Ok(user) => self.state.session = user,
            Err(err) => {
                warn!("router: session check failed, continuing unauthenticated: {err}");
                self.state.session = None;
            }
        }
        self.handle_route();
    }

    /// Resolves the current fragment and applies the resulting route.
    pub fn handle_route(&mut self) {
        self.stats.routes_handled += 1;
        let segments = parse_fragment(self.address_bar.fragment());
        let route = resolve(
            &segments,
            self.state.session.as_ref(),
            &self.state.courses,
        );
        self.apply_route(route);
    }

    /// Writes `path` into the address bar as a new history entry. The change
    /// event this produces is tagged internal and will not re-enter routing.
    pub fn navigate(&mut self, path: &str) {
        if let Some(change) = self.address_bar.push(path, NavigationOrigin::Internal) {
            debug!(fragment = %change.fragment, "router: reflected view into fragment");
            self.enqueue(Intent::FragmentChanged(change));
        }
    }

    /// A fragment typed into the address bar by the user.
    pub fn open_url(&mut self, fragment: &str) {
        if let Some(change) = self.address_bar.push(fragment, NavigationOrigin::External) {
            self.enqueue(Intent::FragmentChanged(change));
        }
    }

    pub fn back(&mut self) {
        if let Some(change) = self.address_bar.back() {
            self.enqueue(Intent::FragmentChanged(change));
        }
    }

    pub fn forward(&mut self) {
        if let Some(change) = self.address_bar.forward() {
            self.enqueue(Intent::FragmentChanged(change));
        }
    }

    /// Handles every intent already queued without waiting for loads.
    pub fn drain(&mut self) {
        while let Ok(intent) = self.intents_rx.try_recv() {
            self.handle_intent(intent);
        }
    }

    /// Handles intents until the queue is empty and no load is in flight.
    pub async fn settle(&mut self) {
        loop {
            self.drain();
            if self.inflight_loads == 0 {
                return;
            }
            match self.intents_rx.recv().await {
                Some(intent) => self.handle_intent(intent),
                None => return,
            }
        }
    }

    pub fn handle_intent(&mut self, intent: Intent) {
        match intent {
            Intent::FragmentChanged(change) => match change.origin {
                NavigationOrigin::Internal => {
                    self.stats.suppressed_changes += 1;
                    debug!(fragment = %change.fragment, "router: ignoring self-originated fragment change");
                }
                NavigationOrigin::External => {
                    if change.fragment != self.address_bar.fragment() {
                        // Superseded by a later write before this event was handled.
                        return;
                    }
                    self.handle_route();
                }
            },
            Intent::Loaded { generation, result } => {
                self.inflight_loads = self.inflight_loads.saturating_sub(1);
                if generation != self.state.generation {
                    self.stats.stale_loads_dropped += 1;
                    debug!(
                        generation,
                        current = self.state.generation,
                        "router: dropping load from superseded view"
                    );
                    return;
                }
                match result {
                    Ok(Some(outcome)) => self.apply_outcome(outcome),
                    Ok(None) => {}
                    Err(err) => self.fail_load(err),
                }
            }
        }
    }

    pub async fn login(&mut self, email: &str, password: &str, role: Role) -> ClientResult<()> {
        let request = LoginRequest {
            email: email.trim().to_ascii_lowercase(),
            password: password.trim().to_string(),
            role,
        };
        if request.email.is_empty() || request.password.is_empty() {
            return self.reject(
                AlertContext::Login,
                ClientError::validation("Please enter email and password"),
            );
        }

        match self.api.login(&request).await {
            Ok(user) => {
                info!(user_id = user.id.0, role = %user.role, "router: logged in");
                self.state.session = Some(user);
                self.navigate_to(Route::Home);
                Ok(())
            }
            Err(err) => self.reject(AlertContext::Login, err),
        }
    }

    pub async fn register(&mut self, name: &str, email: &str, password: &str) -> ClientResult<()> {
        let request = RegisterRequest {
            name: name.trim().to_string(),
            email: email.trim().to_ascii_lowercase(),
            password: password.trim().to_string(),
        };
        if request.name.is_empty() || request.email.is_empty() || request.password.is_empty() {
            return self.reject(
                AlertContext::Register,
                ClientError::validation("Name, email and password are required"),
            );
        }

        match self.api.register(&request).await {
            Ok(()) => {
                self.raise(Alert::info(
                    AlertContext::Register,
                    "Registered! Please login.",
                ));
                self.navigate_to(Route::Login);
                Ok(())
            }
            Err(err) => self.reject(AlertContext::Register, err),
        }
    }

    /// Ends the session locally even when the backend call fails.
    pub async fn logout(&mut self) {
        if let Err(err) = self.api.logout().await {
            warn!("router: logout request failed: {err}");
        }
        self.state.clear_session();
        info!("router: logged out");
        self.navigate_to(Route::Login);
    }

    pub fn show_register(&mut self) {
        self.navigate_to(Route::Register);
    }

    pub fn show_login(&mut self) {
        self.navigate_to(Route::Login);
    }

    pub fn go_home(&mut self) {
        self.navigate_to(Route::Home);
    }

    pub fn select_course(&mut self, code: &str) -> ClientResult<()> {
        self.require_session()?;
        let Some(course) = find_course(&self.state.courses, code) else {
            return Err(ClientError::validation(format!("Unknown course {code}")));
        };
        let route = Route::course(course.code.clone(), CourseTab::Dashboard);
        self.navigate_to(route);
        Ok(())
    }

    pub fn open_tab(&mut self, tab: CourseTab) -> ClientResult<()> {
        let role = self.require_session()?;
        if tab == CourseTab::Create && role != Role::Teacher {
            return Err(ClientError::Forbidden("Teacher only".to_string()));
        }
        let code = self.selected_code()?;
        self.navigate_to(Route::course(code, tab));
        Ok(())
    }

    pub fn open_assignment(&mut self, assignment_id: AssignmentId) -> ClientResult<()> {
        self.require_session()?;
        let code = self.selected_code()?;
        self.navigate_to(Route::AssignmentDetail {
            code,
            assignment_id,
        });
        Ok(())
    }

    pub async fn create_assignment(&mut self, draft: AssignmentDraft) -> ClientResult<()> {
        let context = AlertContext::CreateAssignment;
        let code = match self.require_teacher().and_then(|_| self.selected_code()) {
            Ok(code) => code,
            Err(err) => return self.reject(context, err),
        };
        let title = draft.title.trim().to_string();
        if title.is_empty() {
            return self.reject(context, ClientError::validation("Title required"));
        }

        let assignment = NewAssignment {
            course_code: code.clone(),
            title,
            description: draft.description.trim().to_string(),
            due_date: draft
                .due_date
                .map(|due| due.trim().to_string())
                .filter(|due| !due.is_empty()),
            file: draft.file,
        };
        match self.api.create_assignment(&assignment).await {
            Ok(()) => {
                self.raise(Alert::info(context, "Assignment created"));
                self.navigate_to(Route::course(code, CourseTab::Assignments));
                Ok(())
            }
            Err(err) => self.reject(context, err),
        }
    }

    pub async fn delete_assignment(&mut self, assignment_id: AssignmentId) -> ClientResult<()> {
        let context = AlertContext::DeleteAssignment;
        if let Err(err) = self.require_teacher() {
            return self.reject(context, err);
        }
        match self.api.delete_assignment(assignment_id).await {
            Ok(()) => {
                self.raise(Alert::info(context, "Assignment deleted"));
                self.state.assignments.retain(|a| a.id != assignment_id);
                match self.state.route.clone() {
                    Route::AssignmentDetail {
                        code,
                        assignment_id: open,
                    } if open == assignment_id => {
                        self.navigate_to(Route::course(code, CourseTab::Assignments));
                    }
                    _ => self.reload(),
                }
                Ok(())
            }
            Err(err) => self.reject(context, err),
        }
    }

    pub async fn grade_submission(
        &mut self,
        submission_id: SubmissionId,
        grade: &str,
        feedback: &str,
    ) -> ClientResult<()> {
        let context = AlertContext::GradeSubmission;
        if let Err(err) = self.require_teacher() {
            return self.reject(context, err);
        }
        let request = GradeRequest {
            grade: grade.trim().to_string(),
            feedback: feedback.trim().to_string(),
        };
        if request.grade.is_empty() {
            return self.reject(context, ClientError::validation("Grade required"));
        }
        match self.api.grade_submission(submission_id, &request).await {
            Ok(()) => {
                self.raise(Alert::info(context, "Grade saved"));
                self.reload();
                Ok(())
            }
            Err(err) => self.reject(context, err),
        }
    }

    /// Submits work for the assignment whose detail view is open.
    pub async fn submit_assignment_detail(
        &mut self,
        content: &str,
        file: Option<FileUpload>,
    ) -> ClientResult<()> {
        let context = AlertContext::Submit;
        match self.require_session() {
            Ok(Role::Student) => {}
            Ok(Role::Teacher) => {
                return self.reject(context, ClientError::Forbidden("Student only".to_string()))
            }
            Err(err) => return self.reject(context, err),
        }
        let Route::AssignmentDetail { assignment_id, .. } = self.state.route else {
            return self.reject(
                context,
                ClientError::validation("Open an assignment before submitting"),
            );
        };
        let content = content.trim().to_string();
        if content.is_empty() && file.is_none() {
            return self.reject(
                context,
                ClientError::validation("Please enter content or attach a file"),
            );
        }

        let submission = NewSubmission {
            assignment_id,
            content,
            file,
        };
        match self.api.submit(&submission).await {
            Ok(()) => {
                self.raise(Alert::info(context, "Submitted!"));
                self.reload();
                Ok(())
            }
            Err(err) => self.reject(context, err),
        }
    }

    /// Re-enters the current route, refreshing its data.
    pub fn reload(&mut self) {
        let route = self.state.route.clone();
        self.apply_route(route);
    }

    fn navigate_to(&mut self, route: Route) {
        self.navigate(&route.fragment());
        self.apply_route(route);
    }

    fn apply_route(&mut self, route: Route) {
        let canonical = route.fragment();
        if let Some(change) = self
            .address_bar
            .replace(&canonical, NavigationOrigin::Internal)
        {
            debug!(fragment = %change.fragment, "router: canonicalized fragment");
            self.enqueue(Intent::FragmentChanged(change));
        }

        self.state.generation += 1;
        let generation = self.state.generation;

        self.state.selected_course = route
            .course_code()
            .and_then(|code| find_course(&self.state.courses, code))
            .cloned();

        self.state.view = self.skeleton_view(&route);
        self.state.route = route.clone();
        info!(route = %route, generation, "router: applied route");
        let _ = self.events.send(ClientEvent::RouteChanged(route.clone()));

        if needs_load(&route) {
            self.spawn_load(route, generation);
        }
    }

    fn skeleton_view(&self, route: &Route) -> View {
        let (Some(user), true) = (&self.state.session, route.requires_session()) else {
            return match route {
                Route::Register => View::Register,
                _ => View::Login,
            };
        };
        let profile = ProfileBanner::from_user(user);

        let (Some(course), Some(tab)) = (&self.state.selected_course, route.tab()) else {
            return View::Home(HomeView {
                profile,
                courses: self.state.courses.clone(),
            });
        };

        let panel = match route {
            Route::CourseCreate { code } => CoursePanel::Create(CreateForm {
                course_code: code.clone(),
            }),
            _ => CoursePanel::Loading,
        };
        View::Course(CourseView {
            profile,
            banner: CourseBanner::from_course(course),
            tab,
            panel,
        })
    }

    fn spawn_load(&mut self, route: Route, generation: u64) {
        let (Some(user), Some(course)) = (
            self.state.session.clone(),
            self.state.selected_course.clone(),
        ) else {
            return;
        };
        let ctx = LoadContext {
            user,
            course,
            route,
        };
        let Ok(runtime) = Handle::try_current() else {
            self.fail_load(ClientError::NoRuntime);
            return;
        };
        let api = Arc::clone(&self.api);
        let tx = self.intents_tx.clone();
        self.inflight_loads += 1;
        runtime.spawn(async move {
            let result = load_view(api.as_ref(), &ctx).await;
            let _ = tx.send(Intent::Loaded { generation, result });
        });
    }

    fn apply_outcome(&mut self, outcome: LoadOutcome) {
        let panel = match outcome {
            LoadOutcome::Dashboard { assignments, panel } => {
                self.state.assignments = assignments;
                CoursePanel::Dashboard(panel)
            }
            LoadOutcome::Assignments { assignments, panel } => {
                self.state.assignments = assignments;
                CoursePanel::Assignments(panel)
            }
            LoadOutcome::Classlist(panel) => CoursePanel::Classlist(panel),
            LoadOutcome::AssignmentDetail { assignments, panel } => {
                self.state.assignments = assignments;
                CoursePanel::AssignmentDetail(panel)
            }
            LoadOutcome::AssignmentMissing {
                assignments,
                assignment_id,
            } => {
                self.state.assignments = assignments;
                self.raise(Alert::from_error(
                    AlertContext::LoadView,
                    &ClientError::Api {
                        status: 404,
                        code: ErrorCode::NotFound,
                        message: format!("assignment {assignment_id} not found"),
                    },
                ));
                if let Some(code) = self.state.route.course_code().map(str::to_string) {
                    self.apply_route(Route::course(code, CourseTab::Assignments));
                }
                return;
            }
        };

        if let View::Course(course_view) = &mut self.state.view {
            course_view.panel = panel;
        }
        let _ = self.events.send(ClientEvent::ViewUpdated {
            generation: self.state.generation,
        });
    }

    fn fail(&mut self, context: AlertContext, err: ClientError) {
        let alert = Alert::from_error(context, &err);
        let reauth = alert.requires_reauth(&err);
        warn!(context = ?context, "router: {err}");
        self.raise(alert);
        if reauth && self.state.is_authenticated() {
            self.state.clear_session();
            self.navigate_to(Route::Login);
        }
    }

    fn fail_load(&mut self, err: ClientError) {
        let alert = Alert::from_error(AlertContext::LoadView, &err);
        if let View::Course(course_view) = &mut self.state.view {
            course_view.panel = CoursePanel::Failed {
                message: alert.message().to_string(),
            };
        }
        self.fail(AlertContext::LoadView, err);
    }

    fn reject(&mut self, context: AlertContext, err: ClientError) -> ClientResult<()> {
        self.raise(Alert::from_error(context, &err));
        Err(err)
    }

    fn raise(&mut self, alert: Alert) {
        self.state.last_alert = Some(alert.clone());
        let _ = self.events.send(ClientEvent::Alert(alert));
    }

    fn enqueue(&self, intent: Intent) {
        // The receiver lives on `self`, so the send cannot fail.
        let _ = self.intents_tx.send(intent);
    }

    fn require_session(&self) -> ClientResult<Role> {
        self.state.role().ok_or(ClientError::NotAuthenticated)
    }

    fn require_teacher(&self) -> ClientResult<()> {
        match self.require_session()? {
            Role::Teacher => Ok(()),
            Role::Student => Err(ClientError::Forbidden("Teacher only".to_string())),
        }
    }

    fn selected_code(&self) -> ClientResult<String> {
        self.state
            .selected_course
            .as_ref()
            .map(|course| course.code.clone())
            .ok_or_else(|| ClientError::validation("Select a course first"))
    }
}

#[cfg(test)]
#[path = "tests/router_tests.rs"]
mod tests;
