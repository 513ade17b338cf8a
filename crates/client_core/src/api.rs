//! The classroom REST API as seen by the client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{AssignmentId, SubmissionId},
    protocol::{
        Assignment, ClassMember, FileUpload, GradeRequest, LoginRequest, LoginResponse,
        NewAssignment, NewSubmission, RegisterRequest, SessionResponse, Submission, User,
    },
};
use tracing::debug;
use url::Url;

use crate::error::{ClientError, ClientResult};

#[async_trait]
pub trait ClassroomApi: Send + Sync {
    /// Returns the logged-in user, or `None` when the backend has no session.
    async fn session(&self) -> ClientResult<Option<User>>;
    async fn login(&self, request: &LoginRequest) -> ClientResult<User>;
    async fn register(&self, request: &RegisterRequest) -> ClientResult<()>;
    async fn logout(&self) -> ClientResult<()>;
    async fn list_assignments(&self, course_code: Option<&str>) -> ClientResult<Vec<Assignment>>;
    async fn create_assignment(&self, assignment: &NewAssignment) -> ClientResult<()>;
    async fn delete_assignment(&self, assignment_id: AssignmentId) -> ClientResult<()>;
    async fn list_submissions(&self) -> ClientResult<Vec<Submission>>;
    async fn list_assignment_submissions(
        &self,
        assignment_id: AssignmentId,
    ) -> ClientResult<Vec<Submission>>;
    async fn submit(&self, submission: &NewSubmission) -> ClientResult<()>;
    async fn grade_submission(
        &self,
        submission_id: SubmissionId,
        request: &GradeRequest,
    ) -> ClientResult<()>;
    async fn classlist(&self) -> ClientResult<Vec<ClassMember>>;
}

/// `reqwest`-backed client. Keeps the backend's session cookie between calls.
pub struct HttpClassroomApi {
    http: Client,
    api_base: Url,
}

impl HttpClassroomApi {
    pub fn new(api_base: Url, request_timeout: Option<Duration>) -> ClientResult<Self> {
        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            api_base,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.api_base.as_str().trim_end_matches('/'))
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ClientError::api(status.as_u16(), &body));
    }
    serde_json::from_str(&body).map_err(|err| ClientError::Decode(err.to_string()))
}

async fn expect_success(response: Response) -> ClientResult<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::api(status.as_u16(), &body))
}

fn file_part(upload: &FileUpload) -> ClientResult<Part> {
    let part = Part::bytes(upload.bytes.clone()).file_name(upload.file_name.clone());
    match &upload.mime_type {
        Some(mime) => Ok(part.mime_str(mime)?),
        None => Ok(part),
    }
}

#[async_trait]
impl ClassroomApi for HttpClassroomApi {
    async fn session(&self) -> ClientResult<Option<User>> {
        let response = self.http.get(self.endpoint("session")).send().await?;
        let session: SessionResponse = read_json(response).await?;
        Ok(session.user.filter(|_| session.logged_in))
    }

    async fn login(&self, request: &LoginRequest) -> ClientResult<User> {
        let response = self
            .http
            .post(self.endpoint("login"))
            .json(request)
            .send()
            .await?;
        let body: LoginResponse = read_json(response).await?;
        Ok(body.user)
    }

    async fn register(&self, request: &RegisterRequest) -> ClientResult<()> {
        let response = self
            .http
            .post(self.endpoint("register"))
            .json(request)
            .send()
            .await?;
        expect_success(response).await
    }

    async fn logout(&self) -> ClientResult<()> {
        let response = self.http.post(self.endpoint("logout")).send().await?;
        expect_success(response).await
    }

    async fn list_assignments(&self, course_code: Option<&str>) -> ClientResult<Vec<Assignment>> {
        let mut request = self.http.get(self.endpoint("assignments"));
        if let Some(code) = course_code {
            request = request.query(&[("course_code", code)]);
        }
        let assignments: Vec<Assignment> = read_json(request.send().await?).await?;
        debug!(
            course_code = course_code.unwrap_or("*"),
            count = assignments.len(),
            "api: listed assignments"
        );
        Ok(assignments)
    }

    async fn create_assignment(&self, assignment: &NewAssignment) -> ClientResult<()> {
        let mut form = Form::new()
            .text("course_code", assignment.course_code.clone())
            .text("title", assignment.title.clone())
            .text("description", assignment.description.clone());
        if let Some(due_date) = &assignment.due_date {
            form = form.text("due_date", due_date.clone());
        }
        if let Some(file) = &assignment.file {
            form = form.part("file", file_part(file)?);
        }
        let response = self
            .http
            .post(self.endpoint("assignments"))
            .multipart(form)
            .send()
            .await?;
        expect_success(response).await
    }

    async fn delete_assignment(&self, assignment_id: AssignmentId) -> ClientResult<()> {
        let response = self
            .http
            .delete(self.endpoint(&format!("assignments/{assignment_id}")))
            .send()
            .await?;
        expect_success(response).await
    }

    async fn list_submissions(&self) -> ClientResult<Vec<Submission>> {
        let response = self.http.get(self.endpoint("submissions")).send().await?;
        read_json(response).await
    }

    async fn list_assignment_submissions(
        &self,
        assignment_id: AssignmentId,
    ) -> ClientResult<Vec<Submission>> {
        let response = self
            .http
            .get(self.endpoint(&format!("assignments/{assignment_id}/submissions")))
            .send()
            .await?;
        read_json(response).await
    }

    async fn submit(&self, submission: &NewSubmission) -> ClientResult<()> {
        let mut form = Form::new()
            .text("assignment_id", submission.assignment_id.to_string())
            .text("content", submission.content.clone());
        if let Some(file) = &submission.file {
            form = form.part("file", file_part(file)?);
        }
        let response = self
            .http
            .post(self.endpoint("submissions"))
            .multipart(form)
            .send()
            .await?;
        expect_success(response).await
    }

    async fn grade_submission(
        &self,
        submission_id: SubmissionId,
        request: &GradeRequest,
    ) -> ClientResult<()> {
        let response = self
            .http
            .patch(self.endpoint(&format!("submissions/{submission_id}")))
            .json(request)
            .send()
            .await?;
        expect_success(response).await
    }

    async fn classlist(&self) -> ClientResult<Vec<ClassMember>> {
        let response = self.http.get(self.endpoint("classlist")).send().await?;
        read_json(response).await
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
