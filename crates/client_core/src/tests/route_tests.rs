use super::*;
use shared::domain::{default_catalog, UserId};

fn user(role: Role) -> User {
    User {
        id: UserId(4),
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        role,
    }
}

fn route_for(fragment: &str, session: Option<&User>) -> Route {
    resolve(&parse_fragment(fragment), session, &default_catalog())
}

#[test]
fn parses_fragment_variants() {
    assert_eq!(parse_fragment("#/course/MATH10100"), vec!["course", "MATH10100"]);
    assert_eq!(parse_fragment("#course//MATH10100/"), vec!["course", "MATH10100"]);
    assert_eq!(parse_fragment("/home?x=1"), vec!["home"]);
    assert!(parse_fragment("").is_empty());
    assert!(parse_fragment("#/").is_empty());
}

#[test]
fn unauthenticated_only_honors_register() {
    assert_eq!(route_for("", None), Route::Login);
    assert_eq!(route_for("#/register", None), Route::Register);
    assert_eq!(route_for("#/home", None), Route::Login);
    assert_eq!(route_for("#/course/MATH10100/assignments", None), Route::Login);
    assert_eq!(route_for("#/nonsense/1/2", None), Route::Login);
}

#[test]
fn unknown_fragments_fall_back_to_home_when_authenticated() {
    let student = user(Role::Student);
    for fragment in ["", "#/", "#/login", "#/register", "#/wat", "#/course", "#/course/NOPE101"] {
        assert_eq!(route_for(fragment, Some(&student)), Route::Home, "{fragment}");
    }
}

#[test]
fn resolves_course_subviews() {
    let teacher = user(Role::Teacher);
    let code = "MATH20200".to_string();
    assert_eq!(
        route_for("#/course/MATH20200", Some(&teacher)),
        Route::CourseDashboard { code: code.clone() }
    );
    assert_eq!(
        route_for("#/course/MATH20200/assignments", Some(&teacher)),
        Route::CourseAssignments { code: code.clone() }
    );
    assert_eq!(
        route_for("#/course/MATH20200/classlist", Some(&teacher)),
        Route::CourseClasslist { code: code.clone() }
    );
    assert_eq!(
        route_for("#/course/MATH20200/create", Some(&teacher)),
        Route::CourseCreate { code: code.clone() }
    );
    assert_eq!(
        route_for("#/course/MATH20200/assignment/3", Some(&teacher)),
        Route::AssignmentDetail {
            code: code.clone(),
            assignment_id: AssignmentId(3)
        }
    );
    assert_eq!(
        route_for("#/course/MATH20200/grades", Some(&teacher)),
        Route::CourseDashboard { code }
    );
}

#[test]
fn course_codes_match_case_insensitively_and_canonicalize() {
    let student = user(Role::Student);
    let route = route_for("#/course/math10100/assignments", Some(&student));
    assert_eq!(
        route,
        Route::CourseAssignments {
            code: "MATH10100".to_string()
        }
    );
    assert_eq!(route.fragment(), "#/course/MATH10100/assignments");
}

#[test]
fn students_cannot_open_create() {
    let student = user(Role::Student);
    assert_eq!(
        route_for("#/course/MATH10100/create", Some(&student)),
        Route::CourseDashboard {
            code: "MATH10100".to_string()
        }
    );
}

#[test]
fn malformed_assignment_id_falls_back_to_list() {
    let student = user(Role::Student);
    let expected = Route::CourseAssignments {
        code: "MATH10100".to_string(),
    };
    assert_eq!(route_for("#/course/MATH10100/assignment", Some(&student)), expected);
    assert_eq!(route_for("#/course/MATH10100/assignment/abc", Some(&student)), expected);
    assert_eq!(route_for("#/course/MATH10100/assignment/-2", Some(&student)), expected);
}

#[test]
fn fragments_round_trip_through_resolution() {
    let teacher = user(Role::Teacher);
    let routes = [
        Route::Home,
        Route::course("CS11000", CourseTab::Dashboard),
        Route::course("CS11000", CourseTab::Assignments),
        Route::course("CS11000", CourseTab::Classlist),
        Route::course("CS11000", CourseTab::Create),
        Route::AssignmentDetail {
            code: "CS11000".to_string(),
            assignment_id: AssignmentId(12),
        },
    ];
    for route in routes {
        assert_eq!(route_for(&route.fragment(), Some(&teacher)), route);
    }
    assert_eq!(route_for(&Route::Login.fragment(), None), Route::Login);
    assert_eq!(route_for(&Route::Register.fragment(), None), Route::Register);
}

#[test]
fn detail_route_belongs_to_assignments_tab() {
    let route = Route::AssignmentDetail {
        code: "PHYS10100".to_string(),
        assignment_id: AssignmentId(1),
    };
    assert_eq!(route.tab(), Some(CourseTab::Assignments));
    assert_eq!(route.course_code(), Some("PHYS10100"));
    assert!(route.requires_session());
    assert!(!Route::Register.requires_session());
}
