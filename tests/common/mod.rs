#![allow(dead_code)]

//! In-process stand-in for the remote task service.
//!
//! Speaks the same routes and JSON shapes as the real service, issues JWTs with
//! a 30 minute expiry, records every request it sees, and can be told to fail
//! the next list or mutation with a chosen status and message.

use actix_cors::Cors;
use actix_web::dev::{Service as _, ServerHandle};
use actix_web::http::{header, StatusCode};
use actix_web::{delete, get, post, put, web, App, HttpRequest, HttpResponse, HttpServer};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::net::TcpListener;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use taskforge_client::models::task::TaskId;
use taskforge_client::models::{
    LoginRequest, NewTask, RegisterRequest, SecurityAnswerRequest, SecurityQuestionRequest, Task,
    TaskPatch,
};
use taskforge_client::{ApiClient, Credential, Session, SyncController};

const JWT_SECRET: &str = "fake-service-secret";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    usuario: String,
    exp: usize,
}

struct Account {
    password: String,
    question: String,
    answer: String,
}

struct StoredTask {
    owner: String,
    task: Task,
}

#[derive(Default)]
struct Inner {
    users: HashMap<String, Account>,
    tasks: Vec<StoredTask>,
    next_id: TaskId,
    requests: Vec<String>,
    updates: Vec<(TaskId, TaskPatch)>,
    list_failures: VecDeque<(u16, Option<String>)>,
    mutation_failures: VecDeque<(u16, Option<String>)>,
    garbled_lists: usize,
}

#[derive(Default)]
pub struct ServiceState {
    inner: Mutex<Inner>,
}

impl ServiceState {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }
}

fn token_with_offset(username: &str, minutes: i64) -> String {
    let exp = (chrono::Utc::now() + chrono::Duration::minutes(minutes)).timestamp() as usize;
    encode(
        &Header::default(),
        &Claims {
            usuario: username.to_string(),
            exp,
        },
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

fn failure(status: u16, message: Option<String>) -> HttpResponse {
    let body = match message {
        Some(message) => json!({ "message": message }),
        None => json!({}),
    };
    HttpResponse::build(StatusCode::from_u16(status).unwrap()).json(body)
}

fn message(status: StatusCode, text: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "message": text }))
}

/// Resolves the bearer token to a username, or the 401 the service would send.
fn authenticate(state: &ServiceState, req: &HttpRequest) -> Result<String, HttpResponse> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| message(StatusCode::UNAUTHORIZED, "Token is required!"))?;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(JWT_SECRET.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| message(StatusCode::UNAUTHORIZED, "Token is invalid!"))?
    .claims;

    if !state.lock().users.contains_key(&claims.usuario) {
        return Err(message(StatusCode::UNAUTHORIZED, "Token is invalid!"));
    }
    Ok(claims.usuario)
}

#[post("/registro")]
async fn register(state: web::Data<ServiceState>, body: web::Json<RegisterRequest>) -> HttpResponse {
    let body = body.into_inner();
    let mut inner = state.lock();
    if inner.users.contains_key(&body.username) {
        return message(StatusCode::BAD_REQUEST, "User already exists");
    }
    inner.users.insert(
        body.username,
        Account {
            password: body.password,
            question: body.security_question,
            answer: body.security_answer,
        },
    );
    message(StatusCode::CREATED, "User registered successfully")
}

#[post("/login")]
async fn login(state: web::Data<ServiceState>, body: web::Json<LoginRequest>) -> HttpResponse {
    let inner = state.lock();
    match inner.users.get(&body.username) {
        Some(account) if account.password == body.password => {
            HttpResponse::Ok().json(json!({ "token": token_with_offset(&body.username, 30) }))
        }
        _ => message(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}

#[post("/recuperar/preguntas")]
async fn security_question(
    state: web::Data<ServiceState>,
    body: web::Json<SecurityQuestionRequest>,
) -> HttpResponse {
    match state.lock().users.get(&body.username) {
        Some(account) => HttpResponse::Ok().json(json!({ "pregunta": account.question })),
        None => message(StatusCode::NOT_FOUND, "User not found"),
    }
}

#[post("/recuperar/validar")]
async fn security_answer(
    state: web::Data<ServiceState>,
    body: web::Json<SecurityAnswerRequest>,
) -> HttpResponse {
    let body = body.into_inner();
    let mut inner = state.lock();
    match inner.users.get_mut(&body.username) {
        None => message(StatusCode::NOT_FOUND, "User not found"),
        Some(account) if account.answer == body.answer => {
            account.password = body.new_password;
            message(StatusCode::OK, "Password updated successfully")
        }
        Some(_) => message(StatusCode::UNAUTHORIZED, "The security answer is incorrect"),
    }
}

#[get("/tareas")]
async fn list_tasks(state: web::Data<ServiceState>, req: HttpRequest) -> HttpResponse {
    if let Some((status, text)) = state.lock().list_failures.pop_front() {
        return failure(status, text);
    }
    {
        let mut inner = state.lock();
        if inner.garbled_lists > 0 {
            inner.garbled_lists -= 1;
            return HttpResponse::Ok().json(json!({ "not": "an array" }));
        }
    }
    let owner = match authenticate(&state, &req) {
        Ok(owner) => owner,
        Err(resp) => return resp,
    };
    let tasks: Vec<Task> = state
        .lock()
        .tasks
        .iter()
        .filter(|stored| stored.owner == owner)
        .map(|stored| stored.task.clone())
        .collect();
    HttpResponse::Ok().json(tasks)
}

fn mutation_guard(state: &ServiceState, req: &HttpRequest) -> Result<String, HttpResponse> {
    let owner = authenticate(state, req)?;
    if let Some((status, text)) = state.lock().mutation_failures.pop_front() {
        return Err(failure(status, text));
    }
    Ok(owner)
}

#[post("/tareas")]
async fn create_task(
    state: web::Data<ServiceState>,
    req: HttpRequest,
    body: web::Json<NewTask>,
) -> HttpResponse {
    let owner = match mutation_guard(&state, &req) {
        Ok(owner) => owner,
        Err(resp) => return resp,
    };
    if body.content.is_empty() {
        return message(StatusCode::BAD_REQUEST, "Task content is required");
    }
    let mut inner = state.lock();
    inner.next_id += 1;
    let id = inner.next_id;
    inner.tasks.push(StoredTask {
        owner,
        task: Task {
            id,
            content: body.into_inner().content,
            completed: false,
        },
    });
    HttpResponse::Created().json(json!({ "message": "Task created successfully", "id": id }))
}

#[put("/tareas/{id}")]
async fn update_task(
    state: web::Data<ServiceState>,
    req: HttpRequest,
    path: web::Path<TaskId>,
    body: web::Json<TaskPatch>,
) -> HttpResponse {
    let owner = match mutation_guard(&state, &req) {
        Ok(owner) => owner,
        Err(resp) => return resp,
    };
    let id = path.into_inner();
    let patch = body.into_inner();
    let mut inner = state.lock();
    inner.updates.push((id, patch.clone()));
    let Some(stored) = inner
        .tasks
        .iter_mut()
        .find(|stored| stored.task.id == id && stored.owner == owner)
    else {
        return message(StatusCode::NOT_FOUND, "Task not found or not authorized");
    };
    if let Some(content) = patch.content {
        stored.task.content = content;
    }
    if let Some(completed) = patch.completed {
        stored.task.completed = completed;
    }
    message(StatusCode::OK, "Task updated successfully")
}

#[delete("/tareas/{id}")]
async fn delete_task(
    state: web::Data<ServiceState>,
    req: HttpRequest,
    path: web::Path<TaskId>,
) -> HttpResponse {
    let owner = match mutation_guard(&state, &req) {
        Ok(owner) => owner,
        Err(resp) => return resp,
    };
    let id = path.into_inner();
    let mut inner = state.lock();
    let before = inner.tasks.len();
    inner
        .tasks
        .retain(|stored| !(stored.task.id == id && stored.owner == owner));
    if inner.tasks.len() == before {
        return message(StatusCode::NOT_FOUND, "Task not found or not authorized");
    }
    message(StatusCode::OK, "Task deleted successfully")
}

pub struct FakeService {
    pub base_url: String,
    state: web::Data<ServiceState>,
    handle: ServerHandle,
}

impl FakeService {
    pub async fn start() -> Self {
        let state = web::Data::new(ServiceState::default());
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();

        let app_state = state.clone();
        let server = HttpServer::new(move || {
            let log_state = app_state.clone();
            App::new()
                .app_data(app_state.clone())
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600),
                )
                .wrap_fn(move |req, srv| {
                    log_state
                        .lock()
                        .requests
                        .push(format!("{} {}", req.method(), req.path()));
                    srv.call(req)
                })
                .service(register)
                .service(login)
                .service(security_question)
                .service(security_answer)
                .service(list_tasks)
                .service(create_task)
                .service(update_task)
                .service(delete_task)
        })
        .workers(1)
        .listen(listener)
        .expect("Failed to listen on bound port")
        .run();

        let handle = server.handle();
        actix_rt::spawn(server);

        FakeService {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
            handle,
        }
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }

    pub fn api(&self) -> ApiClient {
        ApiClient::new(self.base_url.clone())
    }

    /// Controller with an in-memory session and no redirect delay.
    pub fn controller(&self) -> SyncController {
        SyncController::new(self.api(), Session::in_memory()).with_redirect_delay(Duration::ZERO)
    }

    /// Controller whose session already holds a valid token for `username`.
    pub fn controller_for(&self, username: &str) -> SyncController {
        let controller = self.controller();
        controller
            .session()
            .set(&Credential::new(self.token_for(username)))
            .unwrap();
        controller
    }

    pub fn seed_user(&self, username: &str, password: &str, question: &str, answer: &str) {
        self.state.lock().users.insert(
            username.to_string(),
            Account {
                password: password.to_string(),
                question: question.to_string(),
                answer: answer.to_string(),
            },
        );
    }

    pub fn seed_task(&self, username: &str, content: &str, completed: bool) -> TaskId {
        let mut inner = self.state.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.tasks.push(StoredTask {
            owner: username.to_string(),
            task: Task {
                id,
                content: content.to_string(),
                completed,
            },
        });
        id
    }

    pub fn token_for(&self, username: &str) -> String {
        token_with_offset(username, 30)
    }

    pub fn expired_token_for(&self, username: &str) -> String {
        token_with_offset(username, -120)
    }

    pub fn password_of(&self, username: &str) -> Option<String> {
        self.state
            .lock()
            .users
            .get(username)
            .map(|account| account.password.clone())
    }

    pub fn tasks_of(&self, username: &str) -> Vec<Task> {
        self.state
            .lock()
            .tasks
            .iter()
            .filter(|stored| stored.owner == username)
            .map(|stored| stored.task.clone())
            .collect()
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.lock().requests.clone()
    }

    pub fn count_requests(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|line| line.starts_with(prefix))
            .count()
    }

    pub fn updates(&self) -> Vec<(TaskId, TaskPatch)> {
        self.state.lock().updates.clone()
    }

    pub fn fail_next_list(&self, status: u16, text: Option<&str>) {
        self.state
            .lock()
            .list_failures
            .push_back((status, text.map(str::to_string)));
    }

    /// The next list read answers 200 with a body that is not a task list.
    pub fn garble_next_list(&self) {
        self.state.lock().garbled_lists += 1;
    }

    pub fn fail_next_mutation(&self, status: u16, text: Option<&str>) {
        self.state
            .lock()
            .mutation_failures
            .push_back((status, text.map(str::to_string)));
    }
}

/// An origin nothing listens on.
pub fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
