pub mod task;
pub mod user;

pub use task::{NewTask, Task, TaskPatch};
pub use user::{
    ErrorBody, LoginRequest, LoginResponse, RegisterRequest, SecurityAnswerRequest,
    SecurityQuestionRequest, SecurityQuestionResponse,
};
