//! # Sync Controller
//!
//! Orchestrates every user action against the remote service and keeps the
//! rendered view consistent with it.
//!
//! A mutation moves through `Idle -> Requesting -> RefreshPending -> Idle`.
//! A failed mutation stops in `Failed` with an error on the status line and the
//! previous rows left as they were. After a successful mutation the whole list
//! is fetched again and rendered from scratch; nothing is patched locally.
//!
//! Actions are not queued. Two commands dispatched concurrently each run their
//! own request/refresh cycle, and the rows always show the list returned by the
//! refresh that completed last. Interior state lives in a `RefCell` and is
//! never borrowed across an `.await`.

use std::cell::{Ref, RefCell};
use std::time::Duration;

use log::{debug, info, warn};

use crate::api::{ApiClient, Operation};
use crate::config::Config;
use crate::error::{ClientError, CONNECTION_ERROR_MESSAGE};
use crate::models::task::TaskId;
use crate::models::{LoginRequest, NewTask, RegisterRequest, SecurityAnswerRequest};
use crate::notify::{StatusLine, StatusMessage};
use crate::render::{Command, Control, TaskView};
use crate::session::{Credential, FileCredentialStore, Session, SessionGuard, View};

pub const REGISTERED_MESSAGE: &str = "Registration successful. Redirecting to login.";
pub const PASSWORD_RESET_MESSAGE: &str = "Password updated. Redirecting to login.";

/// Blocking yes/no question asked before destructive commands.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Answers "no" to every question.
#[derive(Debug, Default, Clone, Copy)]
pub struct Decline;

impl Confirm for Decline {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

/// How a user action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The request succeeded and, for mutations, the refreshed list was rendered.
    Completed,
    /// The request failed; an error is on the status line.
    Failed,
    /// The user declined the confirmation; nothing was sent.
    Cancelled,
    /// Input was invalid; nothing was sent.
    Rejected,
    /// The session was ended and the login view is current.
    LoggedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionPhase {
    Idle,
    Requesting,
    RefreshPending,
    Failed,
}

fn transition(operation: Operation, from: ActionPhase, to: ActionPhase) {
    debug!("{:?}: {:?} -> {:?}", operation, from, to);
}

/// Progress of the two-step password recovery form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecoveryStep {
    #[default]
    Username,
    Answer { question: String },
}

#[derive(Debug)]
struct PageState {
    view: View,
    tasks: TaskView,
    status: StatusLine,
    new_task_input: String,
    recovery: RecoveryStep,
}

pub struct SyncController {
    api: ApiClient,
    session: Session,
    confirm: Box<dyn Confirm>,
    redirect_delay: Duration,
    state: RefCell<PageState>,
}

impl SyncController {
    pub fn new(api: ApiClient, session: Session) -> Self {
        Self {
            api,
            session,
            confirm: Box::new(Decline),
            redirect_delay: Duration::from_millis(crate::config::DEFAULT_REDIRECT_DELAY_MS),
            state: RefCell::new(PageState {
                view: View::Index,
                tasks: TaskView::default(),
                status: StatusLine::default(),
                new_task_input: String::new(),
                recovery: RecoveryStep::default(),
            }),
        }
    }

    /// Controller backed by the configured service and session file.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ApiClient::from_config(config),
            Session::new(FileCredentialStore::new(config.session_file.clone())),
        )
        .with_redirect_delay(config.redirect_delay)
    }

    pub fn with_confirm(mut self, confirm: impl Confirm + 'static) -> Self {
        self.confirm = Box::new(confirm);
        self
    }

    pub fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current_view(&self) -> View {
        self.state.borrow().view
    }

    pub fn status(&self) -> Option<StatusMessage> {
        self.state.borrow().status.current().cloned()
    }

    /// The rendered rows. Drop the guard before awaiting another action.
    pub fn task_view(&self) -> Ref<'_, TaskView> {
        Ref::map(self.state.borrow(), |state| &state.tasks)
    }

    pub fn new_task_input(&self) -> String {
        self.state.borrow().new_task_input.clone()
    }

    pub fn set_new_task_input(&self, text: impl Into<String>) {
        self.state.borrow_mut().new_task_input = text.into();
    }

    pub fn recovery_step(&self) -> RecoveryStep {
        self.state.borrow().recovery.clone()
    }

    fn navigate(&self, view: View) {
        let mut state = self.state.borrow_mut();
        if state.view != view {
            info!("Navigating {:?} -> {:?}", state.view, view);
            if view != View::Tasks {
                state.tasks = TaskView::default();
            }
            if view == View::Recover {
                state.recovery = RecoveryStep::default();
            }
            state.view = view;
        }
    }

    fn show_error(&self, error: &ClientError, operation: Operation) {
        let text = error.user_message(operation.fallback_message());
        self.state.borrow_mut().status.error(text);
    }

    fn show_success(&self, text: &str) {
        self.state.borrow_mut().status.success(text);
    }

    fn credential(&self) -> Option<Credential> {
        match self.session.get() {
            Ok(credential) => credential,
            Err(e) => {
                warn!("Could not read session credential: {}", e);
                None
            }
        }
    }

    fn force_logout(&self) -> ActionOutcome {
        let view = SessionGuard::on_unauthorized(&self.session);
        self.navigate(view);
        ActionOutcome::LoggedOut
    }

    /// Loads `view` the way a page load would: the guard runs first, and the
    /// task view fetches its list only once the guard lets it through.
    pub async fn load(&self, view: View) -> View {
        if let Some(redirect) = SessionGuard::check_on_load(&self.session, view) {
            self.navigate(redirect);
            return redirect;
        }
        self.navigate(view);
        if view == View::Tasks {
            self.refresh().await;
        }
        self.current_view()
    }

    /// Fetches the task list and renders it, replacing every row.
    ///
    /// Any non-2xx response ends the session, whatever the status code or
    /// message. A missing response or an unreadable body keeps it.
    pub async fn refresh(&self) -> ActionOutcome {
        let Some(credential) = self.credential() else {
            return self.force_logout();
        };
        match self.api.list_tasks(&credential).await {
            Ok(tasks) => {
                // A concurrent refresh may have ended the session meanwhile.
                if self.credential().is_none() {
                    debug!("Session ended before the list arrived, not rendering");
                    return ActionOutcome::LoggedOut;
                }
                debug!("Rendering {} tasks", tasks.len());
                self.state.borrow_mut().tasks.render(tasks);
                ActionOutcome::Completed
            }
            Err(e @ (ClientError::Transport(_) | ClientError::Decode(_))) => {
                warn!("Task list unavailable ({}), keeping session", e);
                self.state
                    .borrow_mut()
                    .status
                    .error(CONNECTION_ERROR_MESSAGE);
                ActionOutcome::Failed
            }
            Err(e) => {
                warn!("Task list rejected ({}), ending session", e);
                self.force_logout()
            }
        }
    }

    /// Executes one command: confirmation, request, then a full refresh.
    pub async fn dispatch(&self, command: Command) -> ActionOutcome {
        let operation = match &command {
            Command::Create(_) => Operation::CreateTask,
            Command::Update { .. } => Operation::UpdateTask,
            Command::Delete { .. } => Operation::DeleteTask,
        };

        if let Err(e) = command.validate() {
            self.show_error(&e, operation);
            return ActionOutcome::Rejected;
        }
        if let Some(prompt) = command.confirmation_prompt() {
            if !self.confirm.confirm(prompt) {
                debug!("{:?} declined by user", operation);
                return ActionOutcome::Cancelled;
            }
        }
        let Some(credential) = self.credential() else {
            return self.force_logout();
        };

        transition(operation, ActionPhase::Idle, ActionPhase::Requesting);
        let result = match &command {
            Command::Create(task) => self.api.create_task(&credential, task).await,
            Command::Update { id, patch } => self.api.update_task(&credential, *id, patch).await,
            Command::Delete { id } => self.api.delete_task(&credential, *id).await,
        };

        if let Err(e) = result {
            transition(operation, ActionPhase::Requesting, ActionPhase::Failed);
            self.show_error(&e, operation);
            return ActionOutcome::Failed;
        }

        transition(operation, ActionPhase::Requesting, ActionPhase::RefreshPending);
        if let Command::Create(_) = command {
            self.state.borrow_mut().new_task_input.clear();
        }
        let outcome = self.refresh().await;
        let end = if outcome == ActionOutcome::Completed {
            ActionPhase::Idle
        } else {
            ActionPhase::Failed
        };
        transition(operation, ActionPhase::RefreshPending, end);
        outcome
    }

    /// Activates `control` on the rendered row for `id`.
    ///
    /// Returns `None` when no such row is rendered; ids are only meaningful
    /// once they have been listed.
    pub async fn activate(&self, id: TaskId, control: Control) -> Option<ActionOutcome> {
        let command = self.task_view().row(id).map(|row| row.activate(control))?;
        Some(self.dispatch(command).await)
    }

    /// Creates a task from the new-task input field.
    pub async fn create_task_from_input(&self) -> ActionOutcome {
        let content = self.new_task_input();
        self.dispatch(Command::Create(NewTask::new(content))).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> ActionOutcome {
        match self.api.register(request).await {
            Ok(()) => {
                self.show_success(REGISTERED_MESSAGE);
                self.navigate(View::Login);
                ActionOutcome::Completed
            }
            Err(e) => self.report_failure(&e, Operation::Register),
        }
    }

    /// Logs in and, on success, stores the credential and opens the task view.
    /// A rejected login leaves the credential store untouched.
    pub async fn login(&self, username: &str, password: &str) -> ActionOutcome {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        match self.api.login(&request).await {
            Ok(credential) => {
                if let Err(e) = self.session.set(&credential) {
                    self.state.borrow_mut().status.error(e.to_string());
                    return ActionOutcome::Failed;
                }
                match self.load(View::Tasks).await {
                    View::Tasks => ActionOutcome::Completed,
                    _ => ActionOutcome::LoggedOut,
                }
            }
            Err(e) => self.report_failure(&e, Operation::Login),
        }
    }

    pub fn logout(&self) {
        if let Err(e) = self.session.clear() {
            warn!("Could not clear session credential: {}", e);
        }
        self.navigate(View::Index);
    }

    /// First recovery step: shows the user's security question.
    pub async fn fetch_security_question(&self, username: &str) -> ActionOutcome {
        self.navigate(View::Recover);
        match self.api.fetch_security_question(username).await {
            Ok(question) => {
                self.state.borrow_mut().recovery = RecoveryStep::Answer { question };
                ActionOutcome::Completed
            }
            Err(e) => self.report_failure(&e, Operation::FetchSecurityQuestion),
        }
    }

    /// Second recovery step. On success the confirmation stays visible for the
    /// configured delay before the login view opens.
    pub async fn validate_security_answer(&self, request: &SecurityAnswerRequest) -> ActionOutcome {
        self.navigate(View::Recover);
        match self.api.validate_security_answer(request).await {
            Ok(()) => {
                self.show_success(PASSWORD_RESET_MESSAGE);
                tokio::time::sleep(self.redirect_delay).await;
                self.navigate(View::Login);
                ActionOutcome::Completed
            }
            Err(e) => self.report_failure(&e, Operation::ValidateSecurityAnswer),
        }
    }

    fn report_failure(&self, error: &ClientError, operation: Operation) -> ActionOutcome {
        self.show_error(error, operation);
        match error {
            ClientError::Validation(_) => ActionOutcome::Rejected,
            _ => ActionOutcome::Failed,
        }
    }
}
