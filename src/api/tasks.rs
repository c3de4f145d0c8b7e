use validator::Validate;

use super::{ApiClient, Operation};
use crate::error::ClientError;
use crate::models::task::TaskId;
use crate::models::{NewTask, Task, TaskPatch};
use crate::session::Credential;

impl ApiClient {
    /// `GET /tareas`. Returns the user's tasks in the order the service chose.
    pub async fn list_tasks(&self, credential: &Credential) -> Result<Vec<Task>, ClientError> {
        let builder = self
            .http
            .get(self.url("/tareas"))
            .bearer_auth(credential.as_str());
        let response = self.send(Operation::ListTasks, builder).await?;
        let tasks: Vec<Task> = response.json().await?;
        Ok(tasks)
    }

    /// `POST /tareas`. Empty content is rejected without sending anything.
    pub async fn create_task(
        &self,
        credential: &Credential,
        task: &NewTask,
    ) -> Result<(), ClientError> {
        task.validate()?;
        let builder = self
            .http
            .post(self.url("/tareas"))
            .bearer_auth(credential.as_str())
            .json(task);
        self.send(Operation::CreateTask, builder).await?;
        Ok(())
    }

    /// `PUT /tareas/{id}` with only the fields present in `patch`.
    pub async fn update_task(
        &self,
        credential: &Credential,
        id: TaskId,
        patch: &TaskPatch,
    ) -> Result<(), ClientError> {
        patch.validate()?;
        let builder = self
            .http
            .put(self.url(&format!("/tareas/{}", id)))
            .bearer_auth(credential.as_str())
            .json(patch);
        self.send(Operation::UpdateTask, builder).await?;
        Ok(())
    }

    /// `DELETE /tareas/{id}`. No body is sent.
    pub async fn delete_task(&self, credential: &Credential, id: TaskId) -> Result<(), ClientError> {
        let builder = self
            .http
            .delete(self.url(&format!("/tareas/{}", id)))
            .bearer_auth(credential.as_str());
        self.send(Operation::DeleteTask, builder).await?;
        Ok(())
    }
}
