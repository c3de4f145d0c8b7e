use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::debug;

use taskforge_client::config::Config;
use taskforge_client::models::task::TaskId;
use taskforge_client::models::{RegisterRequest, SecurityAnswerRequest, TaskPatch};
use taskforge_client::render::{Command, Control};
use taskforge_client::sync::{ActionOutcome, Confirm, RecoveryStep, SyncController};
use taskforge_client::View;

#[derive(Parser)]
#[command(name = "taskforge")]
#[command(version)]
#[command(about = "Command-line client for the TaskForge task service")]
struct Cli {
    /// Base URL of the task service (overrides TASKFORGE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Creates an account
    Register {
        username: String,
        password: String,
        /// Security question used for password recovery
        #[arg(long)]
        question: String,
        /// Answer to the security question
        #[arg(long)]
        answer: String,
    },
    /// Logs in and stores the session
    Login { username: String, password: String },
    /// Forgets the stored session
    Logout,
    /// Shows the task list
    List,
    /// Adds a task
    Add { content: String },
    /// Presses the Complete/Undo button of a task
    Toggle { id: TaskId },
    /// Sets the checkbox of a task
    Check {
        id: TaskId,
        /// Uncheck instead of check
        #[arg(long)]
        off: bool,
    },
    /// Replaces the content of a task
    Edit { id: TaskId, content: String },
    /// Deletes a task after confirmation
    Delete {
        id: TaskId,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Shows the security question of a user
    Question { username: String },
    /// Resets a password by answering the security question
    Reset {
        username: String,
        #[arg(long)]
        answer: String,
        #[arg(long)]
        new_password: String,
    },
}

/// Asks on the terminal, unless `--yes` was given.
struct TerminalPrompt {
    assume_yes: bool,
}

impl Confirm for TerminalPrompt {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

async fn open_tasks(controller: &SyncController) -> bool {
    controller.load(View::Tasks).await == View::Tasks
}

async fn run(controller: &SyncController, command: Commands) -> ActionOutcome {
    match command {
        Commands::Register {
            username,
            password,
            question,
            answer,
        } => {
            let request = RegisterRequest {
                username,
                password,
                security_question: question,
                security_answer: answer,
            };
            controller.register(&request).await
        }
        Commands::Login { username, password } => controller.login(&username, &password).await,
        Commands::Logout => {
            controller.logout();
            ActionOutcome::Completed
        }
        Commands::List => {
            if !open_tasks(controller).await {
                return ActionOutcome::LoggedOut;
            }
            ActionOutcome::Completed
        }
        Commands::Add { content } => {
            if !open_tasks(controller).await {
                return ActionOutcome::LoggedOut;
            }
            controller.set_new_task_input(content);
            controller.create_task_from_input().await
        }
        Commands::Toggle { id } => activate(controller, id, Control::CompleteButton).await,
        Commands::Check { id, off } => activate(controller, id, Control::Checkbox(!off)).await,
        Commands::Delete { id, .. } => activate(controller, id, Control::DeleteButton).await,
        Commands::Edit { id, content } => {
            if !open_tasks(controller).await {
                return ActionOutcome::LoggedOut;
            }
            if controller.task_view().row(id).is_none() {
                eprintln!("No task with id {}", id);
                return ActionOutcome::Rejected;
            }
            controller
                .dispatch(Command::Update {
                    id,
                    patch: TaskPatch::content(content),
                })
                .await
        }
        Commands::Question { username } => {
            let outcome = controller.fetch_security_question(&username).await;
            if let RecoveryStep::Answer { question } = controller.recovery_step() {
                println!("{}", question);
            }
            outcome
        }
        Commands::Reset {
            username,
            answer,
            new_password,
        } => {
            let request = SecurityAnswerRequest {
                username,
                answer,
                new_password,
            };
            controller.validate_security_answer(&request).await
        }
    }
}

async fn activate(controller: &SyncController, id: TaskId, control: Control) -> ActionOutcome {
    if !open_tasks(controller).await {
        return ActionOutcome::LoggedOut;
    }
    match controller.activate(id, control).await {
        Some(outcome) => outcome,
        None => {
            eprintln!("No task with id {}", id);
            ActionOutcome::Rejected
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(api_url) = cli.api_url {
        config = config.with_api_url(api_url);
    }
    debug!("Using task service at {}", config.api_url);

    let assume_yes = matches!(cli.command, Commands::Delete { yes: true, .. });
    let controller =
        SyncController::from_config(&config).with_confirm(TerminalPrompt { assume_yes });

    let outcome = run(&controller, cli.command).await;

    if controller.current_view() == View::Tasks {
        print!("{}", controller.task_view());
    }
    if let Some(status) = controller.status() {
        println!("{}", status);
    }
    match outcome {
        ActionOutcome::Completed | ActionOutcome::Cancelled => ExitCode::SUCCESS,
        ActionOutcome::LoggedOut => {
            eprintln!("Not logged in. Run `taskforge login <username> <password>`.");
            ExitCode::FAILURE
        }
        ActionOutcome::Failed | ActionOutcome::Rejected => ExitCode::FAILURE,
    }
}
