use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(CourseId);
id_newtype!(AssignmentId);
id_newtype!(SubmissionId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Teacher,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Teacher => "Teacher",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            other => Err(format!("role must be student or teacher, got '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Courses known to the front end when no catalog is configured.
pub fn default_catalog() -> Vec<Course> {
    let course = |id: i64, code: &str, name: &str, section: &str, color: &str, description: &str| {
        Course {
            id: CourseId(id),
            code: code.to_string(),
            name: name.to_string(),
            section: section.to_string(),
            term: "Fall 2025".to_string(),
            description: description.to_string(),
            color: color.to_string(),
            image: None,
        }
    };

    vec![
        course(
            1,
            "MATH10100",
            "Calculus I",
            "001",
            "#4f46e5",
            "Limits, derivatives and an introduction to integration.",
        ),
        course(
            2,
            "MATH20200",
            "Linear Algebra",
            "002",
            "#0ea5e9",
            "Vector spaces, linear maps, eigenvalues.",
        ),
        course(
            3,
            "PHYS10100",
            "Mechanics",
            "001",
            "#16a34a",
            "Kinematics, Newton's laws, energy and momentum.",
        ),
        course(
            4,
            "CS11000",
            "Introduction to Programming",
            "003",
            "#f97316",
            "Programming fundamentals with small weekly projects.",
        ),
    ]
}
