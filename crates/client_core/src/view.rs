//! Typed view models, one per route variant. Exactly one [`View`] is shown at a
//! time; switching views replaces the whole value.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{
    domain::{AssignmentId, Course, Role},
    protocol::{Assignment, ClassMember, Submission, User},
};

use crate::route::CourseTab;

const RECENT_ASSIGNMENTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    Login,
    Register,
    Home(HomeView),
    Course(CourseView),
}

impl View {
    pub fn section(&self) -> &'static str {
        match self {
            View::Login => "login",
            View::Register => "register",
            View::Home(_) => "home",
            View::Course(_) => "course",
        }
    }

    pub fn as_course(&self) -> Option<&CourseView> {
        match self {
            View::Course(course) => Some(course),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileBanner {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub role_label: &'static str,
    pub initials: String,
}

impl ProfileBanner {
    pub fn from_user(user: &User) -> Self {
        let initials = user
            .name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect();
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            role_label: user.role.label(),
            initials,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseBanner {
    pub code: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub color: String,
    pub image: Option<String>,
}

impl CourseBanner {
    pub fn from_course(course: &Course) -> Self {
        let subtitle = match (course.section.is_empty(), course.term.is_empty()) {
            (false, false) => format!("Section {} · {}", course.section, course.term),
            (false, true) => format!("Section {}", course.section),
            (true, false) => course.term.clone(),
            (true, true) => String::new(),
        };
        Self {
            code: course.code.clone(),
            title: format!("{} · {}", course.code, course.name),
            subtitle,
            description: course.description.clone(),
            color: course.color.clone(),
            image: course.image.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeView {
    pub profile: ProfileBanner,
    pub courses: Vec<Course>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseView {
    pub profile: ProfileBanner,
    pub banner: CourseBanner,
    pub tab: CourseTab,
    pub panel: CoursePanel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "panel", rename_all = "snake_case")]
pub enum CoursePanel {
    Loading,
    Dashboard(DashboardPanel),
    Assignments(AssignmentsPanel),
    Classlist(ClasslistPanel),
    Create(CreateForm),
    AssignmentDetail(AssignmentDetailPanel),
    /// The load for this panel finished with an error.
    Failed {
        message: String,
    },
}

impl CoursePanel {
    /// Text shown in place of the panel body: the empty-state line for a
    /// panel without data, or the failure message.
    pub fn placeholder(&self) -> Option<&str> {
        match self {
            CoursePanel::Loading => Some("Loading..."),
            CoursePanel::Dashboard(panel) => panel.empty_message(),
            CoursePanel::Assignments(panel) => panel.empty_message(),
            CoursePanel::Classlist(panel) => panel.empty_message(),
            CoursePanel::AssignmentDetail(panel) => panel.empty_message(),
            CoursePanel::Create(_) => None,
            CoursePanel::Failed { message } => Some(message.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum DashboardSummary {
    Student {
        submitted: usize,
        graded: usize,
        pending: usize,
    },
    Teacher {
        submissions: usize,
        ungraded: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardPanel {
    pub assignment_count: usize,
    pub recent: Vec<Assignment>,
    pub summary: DashboardSummary,
}

impl DashboardPanel {
    pub fn build(role: Role, assignments: &[Assignment], submissions: &[Submission]) -> Self {
        let in_course = course_submissions(assignments, submissions);
        let summary = match role {
            Role::Student => {
                let submitted_ids: HashSet<AssignmentId> =
                    in_course.iter().map(|s| s.assignment_id).collect();
                DashboardSummary::Student {
                    submitted: submitted_ids.len(),
                    graded: in_course.iter().filter(|s| s.is_graded()).count(),
                    pending: assignments
                        .iter()
                        .filter(|a| !submitted_ids.contains(&a.id))
                        .count(),
                }
            }
            Role::Teacher => DashboardSummary::Teacher {
                submissions: in_course.len(),
                ungraded: in_course.iter().filter(|s| !s.is_graded()).count(),
            },
        };
        Self {
            assignment_count: assignments.len(),
            recent: assignments.iter().take(RECENT_ASSIGNMENTS).cloned().collect(),
            summary,
        }
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        self.recent.is_empty().then_some("No assignments yet.")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowStatus {
    NotSubmitted,
    Submitted { submitted_at: DateTime<Utc> },
    Graded { grade: String },
    Submissions { count: usize, ungraded: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentRow {
    pub assignment: Assignment,
    pub status: RowStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentsPanel {
    pub rows: Vec<AssignmentRow>,
}

impl AssignmentsPanel {
    pub fn build(role: Role, assignments: &[Assignment], submissions: &[Submission]) -> Self {
        let mut by_assignment: HashMap<AssignmentId, Vec<&Submission>> = HashMap::new();
        for submission in submissions {
            by_assignment
                .entry(submission.assignment_id)
                .or_default()
                .push(submission);
        }

        let rows = assignments
            .iter()
            .map(|assignment| {
                let mine = by_assignment
                    .get(&assignment.id)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                let status = match role {
                    Role::Teacher => RowStatus::Submissions {
                        count: mine.len(),
                        ungraded: mine.iter().filter(|s| !s.is_graded()).count(),
                    },
                    Role::Student => student_status(mine),
                };
                AssignmentRow {
                    assignment: assignment.clone(),
                    status,
                }
            })
            .collect();
        Self { rows }
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        self.rows.is_empty().then_some("No assignments yet.")
    }
}

/// A student's latest submission decides the row status.
fn student_status(submissions: &[&Submission]) -> RowStatus {
    let Some(latest) = submissions.iter().max_by_key(|s| (s.submitted_at, s.id)) else {
        return RowStatus::NotSubmitted;
    };
    match latest.grade.as_deref().map(str::trim) {
        Some(grade) if !grade.is_empty() => RowStatus::Graded {
            grade: grade.to_string(),
        },
        _ => RowStatus::Submitted {
            submitted_at: latest.submitted_at,
        },
    }
}

fn course_submissions<'a>(
    assignments: &[Assignment],
    submissions: &'a [Submission],
) -> Vec<&'a Submission> {
    let ids: HashSet<AssignmentId> = assignments.iter().map(|a| a.id).collect();
    submissions
        .iter()
        .filter(|s| ids.contains(&s.assignment_id))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClasslistPanel {
    pub members: Vec<ClassMember>,
}

impl ClasslistPanel {
    pub fn empty_message(&self) -> Option<&'static str> {
        self.members.is_empty().then_some("No students enrolled.")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateForm {
    pub course_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentDetailPanel {
    pub assignment: Assignment,
    pub viewer: Role,
    pub submissions: Vec<Submission>,
}

impl AssignmentDetailPanel {
    pub fn empty_message(&self) -> Option<&'static str> {
        if !self.submissions.is_empty() {
            return None;
        }
        Some(match self.viewer {
            Role::Student => "No submissions yet.",
            Role::Teacher => "No submissions to grade.",
        })
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
