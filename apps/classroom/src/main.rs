use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    settings::{load_settings, SETTINGS_FILE},
    AssignmentDraft, ClientEvent, HttpClassroomApi, Router,
};
use shared::{
    domain::{AssignmentId, Role, SubmissionId},
    protocol::FileUpload,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Drive the classroom front end from the terminal")]
struct Cli {
    /// Settings file; defaults to ./classroom.toml.
    #[arg(long, default_value = SETTINGS_FILE)]
    config: PathBuf,
    /// Overrides the API base from settings and environment.
    #[arg(long)]
    api_base: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    password: Option<String>,
    #[arg(long, default_value = "student")]
    role: Role,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a fragment such as `#/course/MATH10100/assignments` and print the view.
    Show {
        #[arg(default_value = "#/home")]
        fragment: String,
    },
    /// Submit work for an assignment.
    Submit {
        course: String,
        assignment_id: i64,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Grade a submission.
    Grade {
        course: String,
        assignment_id: i64,
        submission_id: i64,
        grade: String,
        #[arg(long, default_value = "")]
        feedback: String,
    },
    /// Create an assignment in a course.
    Create {
        course: String,
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        due_date: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Delete an assignment.
    Delete { course: String, assignment_id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(&cli.config);
    if let Some(api_base) = &cli.api_base {
        settings.api_base = api_base.clone();
    }

    tracing::info!(api_base = %settings.api_base, courses = settings.courses.len(), "classroom: starting");
    let api = HttpClassroomApi::new(settings.api_base_url()?, settings.request_timeout)
        .context("failed to build http client")?;
    let mut router = Router::new(Arc::new(api), settings.courses.clone(), "");
    let mut events = router.subscribe_events();

    router.start().await;
    if let (Some(email), Some(password)) = (&cli.email, &cli.password) {
        if router.login(email, password, cli.role).await.is_err() {
            print_alerts(&mut events);
            bail!("login failed");
        }
    }
    if !router.state().is_authenticated() {
        bail!("not logged in; pass --email and --password");
    }
    router.settle().await;

    let outcome = match cli.command {
        Command::Show { fragment } => {
            router.open_url(&fragment);
            router.settle().await;
            Ok(())
        }
        Command::Submit {
            course,
            assignment_id,
            content,
            file,
        } => {
            open_detail(&mut router, &course, assignment_id).await?;
            let file = file.map(read_upload).transpose()?;
            router.submit_assignment_detail(&content, file).await
        }
        Command::Grade {
            course,
            assignment_id,
            submission_id,
            grade,
            feedback,
        } => {
            open_detail(&mut router, &course, assignment_id).await?;
            router
                .grade_submission(SubmissionId(submission_id), &grade, &feedback)
                .await
        }
        Command::Create {
            course,
            title,
            description,
            due_date,
            file,
        } => {
            router.select_course(&course)?;
            let file = file.map(read_upload).transpose()?;
            router
                .create_assignment(AssignmentDraft {
                    title,
                    description,
                    due_date,
                    file,
                })
                .await
        }
        Command::Delete {
            course,
            assignment_id,
        } => {
            router.select_course(&course)?;
            router.delete_assignment(AssignmentId(assignment_id)).await
        }
    };
    router.settle().await;

    print_alerts(&mut events);
    println!("fragment: {}", router.fragment());
    if let Some(note) = router
        .view()
        .as_course()
        .and_then(|course| course.panel.placeholder())
    {
        println!("{note}");
    }
    println!("{}", serde_json::to_string_pretty(router.view())?);

    outcome.map_err(Into::into)
}

async fn open_detail(router: &mut Router, course: &str, assignment_id: i64) -> Result<()> {
    router.select_course(course)?;
    router.open_assignment(AssignmentId(assignment_id))?;
    router.settle().await;
    if !matches!(router.route(), client_core::Route::AssignmentDetail { .. }) {
        bail!("assignment {assignment_id} is not in course {course}");
    }
    Ok(())
}

fn read_upload(path: PathBuf) -> Result<FileUpload> {
    let bytes =
        std::fs::read(&path).with_context(|| format!("failed to read '{}'", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .with_context(|| format!("'{}' has no file name", path.display()))?;
    let mime_type = mime_guess::from_path(&path)
        .first()
        .map(|mime| mime.essence_str().to_string());
    Ok(FileUpload {
        file_name,
        mime_type,
        bytes,
    })
}

fn print_alerts(events: &mut tokio::sync::broadcast::Receiver<ClientEvent>) {
    while let Ok(event) = events.try_recv() {
        if let ClientEvent::Alert(alert) = event {
            let level = if alert.is_error() { "error" } else { "info" };
            eprintln!("[{level}] {}", alert.message());
        }
    }
}
