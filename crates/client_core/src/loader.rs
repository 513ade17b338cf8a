//! View loaders. Each one fetches what its view needs and returns a payload;
//! none of them touch route state.

use shared::{
    domain::{AssignmentId, Course, Role},
    protocol::{Assignment, User},
};
use tracing::debug;

use crate::{
    api::ClassroomApi,
    error::ClientResult,
    route::Route,
    view::{AssignmentDetailPanel, AssignmentsPanel, ClasslistPanel, DashboardPanel},
};

/// What a loader is given: the session user, the selected course and the
/// route it is loading for.
#[derive(Debug, Clone)]
pub struct LoadContext {
    pub user: User,
    pub course: Course,
    pub route: Route,
}

#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Dashboard {
        assignments: Vec<Assignment>,
        panel: DashboardPanel,
    },
    Assignments {
        assignments: Vec<Assignment>,
        panel: AssignmentsPanel,
    },
    Classlist(ClasslistPanel),
    AssignmentDetail {
        assignments: Vec<Assignment>,
        panel: AssignmentDetailPanel,
    },
    /// The list loaded but did not contain the requested assignment.
    AssignmentMissing {
        assignments: Vec<Assignment>,
        assignment_id: AssignmentId,
    },
}

/// Whether entering `route` needs a fetch at all.
pub fn needs_load(route: &Route) -> bool {
    matches!(
        route,
        Route::CourseDashboard { .. }
            | Route::CourseAssignments { .. }
            | Route::CourseClasslist { .. }
            | Route::AssignmentDetail { .. }
    )
}

pub async fn load_view(
    api: &dyn ClassroomApi,
    ctx: &LoadContext,
) -> ClientResult<Option<LoadOutcome>> {
    let code = ctx.course.code.as_str();
    let role = ctx.user.role;

    let outcome = match &ctx.route {
        Route::CourseDashboard { .. } => {
            let (assignments, submissions) =
                futures::join!(api.list_assignments(Some(code)), api.list_submissions());
            let (assignments, submissions) = (assignments?, submissions?);
            let panel = DashboardPanel::build(role, &assignments, &submissions);
            LoadOutcome::Dashboard { assignments, panel }
        }
        Route::CourseAssignments { .. } => {
            let (assignments, submissions) =
                futures::join!(api.list_assignments(Some(code)), api.list_submissions());
            let (assignments, submissions) = (assignments?, submissions?);
            let panel = AssignmentsPanel::build(role, &assignments, &submissions);
            LoadOutcome::Assignments { assignments, panel }
        }
        Route::CourseClasslist { .. } => LoadOutcome::Classlist(ClasslistPanel {
            members: api.classlist().await?,
        }),
        Route::AssignmentDetail { assignment_id, .. } => {
            load_assignment_detail(api, code, role, *assignment_id).await?
        }
        Route::Login
        | Route::Register
        | Route::Home
        | Route::CourseCreate { .. } => return Ok(None),
    };

    Ok(Some(outcome))
}

/// The list is fetched first; the detail is only built from an assignment that
/// the list actually contains.
async fn load_assignment_detail(
    api: &dyn ClassroomApi,
    code: &str,
    role: Role,
    assignment_id: AssignmentId,
) -> ClientResult<LoadOutcome> {
    let assignments = api.list_assignments(Some(code)).await?;
    let Some(assignment) = assignments.iter().find(|a| a.id == assignment_id).cloned() else {
        debug!(
            course_code = code,
            assignment_id = assignment_id.0,
            "loader: assignment not in course list"
        );
        return Ok(LoadOutcome::AssignmentMissing {
            assignments,
            assignment_id,
        });
    };

    let submissions = match role {
        Role::Teacher => api.list_assignment_submissions(assignment_id).await?,
        Role::Student => api
            .list_submissions()
            .await?
            .into_iter()
            .filter(|s| s.assignment_id == assignment_id)
            .collect(),
    };

    Ok(LoadOutcome::AssignmentDetail {
        assignments,
        panel: AssignmentDetailPanel {
            assignment,
            viewer: role,
            submissions,
        },
    })
}
