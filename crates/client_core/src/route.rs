//! Fragment parsing and route resolution.
//!
//! A fragment such as `#/course/MATH10100/assignment/3` is split into path
//! segments and resolved against the session and the course catalog. The
//! resolution is total: every input maps to exactly one [`Route`].

use std::fmt;

use serde::Serialize;
use shared::{
    domain::{AssignmentId, Course, Role},
    protocol::User,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseTab {
    Dashboard,
    Assignments,
    Classlist,
    Create,
}

impl CourseTab {
    fn segment(self) -> Option<&'static str> {
        match self {
            CourseTab::Dashboard => None,
            CourseTab::Assignments => Some("assignments"),
            CourseTab::Classlist => Some("classlist"),
            CourseTab::Create => Some("create"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Route {
    Login,
    Register,
    Home,
    CourseDashboard { code: String },
    CourseAssignments { code: String },
    CourseClasslist { code: String },
    CourseCreate { code: String },
    AssignmentDetail { code: String, assignment_id: AssignmentId },
}

impl Route {
    pub fn course(code: impl Into<String>, tab: CourseTab) -> Self {
        let code = code.into();
        match tab {
            CourseTab::Dashboard => Route::CourseDashboard { code },
            CourseTab::Assignments => Route::CourseAssignments { code },
            CourseTab::Classlist => Route::CourseClasslist { code },
            CourseTab::Create => Route::CourseCreate { code },
        }
    }

    pub fn course_code(&self) -> Option<&str> {
        match self {
            Route::CourseDashboard { code }
            | Route::CourseAssignments { code }
            | Route::CourseClasslist { code }
            | Route::CourseCreate { code }
            | Route::AssignmentDetail { code, .. } => Some(code),
            Route::Login | Route::Register | Route::Home => None,
        }
    }

    /// The course sub-view this route shows. Assignment detail lives under the
    /// assignments tab.
    pub fn tab(&self) -> Option<CourseTab> {
        match self {
            Route::CourseDashboard { .. } => Some(CourseTab::Dashboard),
            Route::CourseAssignments { .. } | Route::AssignmentDetail { .. } => {
                Some(CourseTab::Assignments)
            }
            Route::CourseClasslist { .. } => Some(CourseTab::Classlist),
            Route::CourseCreate { .. } => Some(CourseTab::Create),
            Route::Login | Route::Register | Route::Home => None,
        }
    }

    pub fn requires_session(&self) -> bool {
        !matches!(self, Route::Login | Route::Register)
    }

    pub fn fragment(&self) -> String {
        match self {
            Route::Login => "#/login".to_string(),
            Route::Register => "#/register".to_string(),
            Route::Home => "#/home".to_string(),
            Route::AssignmentDetail {
                code,
                assignment_id,
            } => format!("#/course/{code}/assignment/{assignment_id}"),
            other => {
                let code = other.course_code().unwrap_or_default();
                match other.tab().and_then(CourseTab::segment) {
                    Some(segment) => format!("#/course/{code}/{segment}"),
                    None => format!("#/course/{code}"),
                }
            }
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fragment())
    }
}

/// Splits a fragment into its non-empty path segments. Accepts `#/a/b`, `#a/b`,
/// `/a/b` and `a/b`; any `?query` suffix is ignored.
pub fn parse_fragment(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('#').unwrap_or(trimmed);
    let path = trimmed.split('?').next().unwrap_or_default();
    path.split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolves parsed segments to a route given the current session and the
/// known courses.
pub fn resolve(segments: &[String], session: Option<&User>, catalog: &[Course]) -> Route {
    let first = segments.first().map(String::as_str);

    let Some(user) = session else {
        return match first {
            Some("register") => Route::Register,
            _ => Route::Login,
        };
    };

    if first != Some("course") {
        return Route::Home;
    }

    let Some(course) = segments
        .get(1)
        .and_then(|code| find_course(catalog, code))
    else {
        return Route::Home;
    };
    let code = course.code.clone();

    match segments.get(2).map(String::as_str) {
        None => Route::CourseDashboard { code },
        Some("assignments") => Route::CourseAssignments { code },
        Some("classlist") => Route::CourseClasslist { code },
        Some("create") if user.role == Role::Teacher => Route::CourseCreate { code },
        Some("assignment") => match segments.get(3).and_then(|raw| raw.parse::<i64>().ok()) {
            Some(id) if id > 0 => Route::AssignmentDetail {
                code,
                assignment_id: AssignmentId(id),
            },
            _ => Route::CourseAssignments { code },
        },
        Some(_) => Route::CourseDashboard { code },
    }
}

pub fn find_course<'a>(catalog: &'a [Course], code: &str) -> Option<&'a Course> {
    catalog
        .iter()
        .find(|course| course.code.eq_ignore_ascii_case(code))
}

#[cfg(test)]
#[path = "tests/route_tests.rs"]
mod tests;
