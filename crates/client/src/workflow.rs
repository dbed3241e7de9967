//! The three step form: create a user, add an exercise for them, then show
//! what was saved. Nothing in here touches the browser so the transitions
//! can be driven by any [`WorkflowApi`].

use shared::{
    api::payloads::{AddExercise, CreateUser, DurationInput, ExerciseLog, LogEntry, UserExercise},
    model::User,
    types::Uuid,
};
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    CreateUser,
    AddExercise,
    Summary,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::CreateUser, Step::AddExercise, Step::Summary];

    pub fn index(self) -> usize {
        match self {
            Step::CreateUser => 0,
            Step::AddExercise => 1,
            Step::Summary => 2,
        }
    }
}

/// Failure talking to the server. The message is what gets shown to the user
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("Request failed: {0}")]
    Network(String),
    #[error("Unexpected response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkflowError {
    #[error("Can't do that from the {actual:?} step")]
    WrongStep { expected: Step, actual: Step },
    #[error("No user has been created yet")]
    NoUser,
    #[error(transparent)]
    Api(#[from] ClientError),
}

#[allow(async_fn_in_trait)]
pub trait WorkflowApi {
    async fn create_user(&self, payload: &CreateUser) -> Result<User, ClientError>;

    async fn add_exercise(
        &self,
        user_id: &Uuid,
        payload: &AddExercise,
    ) -> Result<UserExercise, ClientError>;

    async fn fetch_log(&self, user_id: &Uuid) -> Result<ExerciseLog, ClientError>;
}

/// Raw values of the exercise inputs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExerciseForm {
    pub description: String,
    pub duration: String,
    pub date: String,
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

impl From<&ExerciseForm> for AddExercise {
    fn from(form: &ExerciseForm) -> Self {
        // Anything that isn't a plain integer is left for the server to judge
        let duration = non_blank(&form.duration).map(|duration| match duration.parse::<i64>() {
            Ok(minutes) => DurationInput::Whole(minutes),
            Err(_) => DurationInput::Text(duration),
        });

        AddExercise {
            description: non_blank(&form.description),
            duration,
            date: non_blank(&form.date),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workflow {
    step: Step,
    user_id: Option<Uuid>,
    last_entry: Option<LogEntry>,
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new()
    }
}

impl Workflow {
    pub fn new() -> Self {
        Self {
            step: Step::CreateUser,
            user_id: None,
            last_entry: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn user_id(&self) -> Option<&Uuid> {
        self.user_id.as_ref()
    }

    /// The entry shown on the summary step
    pub fn last_entry(&self) -> Option<&LogEntry> {
        self.last_entry.as_ref()
    }

    /// Progress indicator state. Every step up to the current one is active
    pub fn is_active(&self, step: Step) -> bool {
        step <= self.step
    }

    fn expect_step(&self, expected: Step) -> Result<(), WorkflowError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WorkflowError::WrongStep {
                expected,
                actual: self.step,
            })
        }
    }

    /// Creates the user and moves on to the exercise step. Stays put on error
    #[instrument(skip(self, api))]
    pub async fn create_user<A: WorkflowApi>(
        &mut self,
        api: &A,
        username: &str,
    ) -> Result<(), WorkflowError> {
        self.expect_step(Step::CreateUser)?;

        let user = api.create_user(&CreateUser::new(username)).await?;
        debug!(id = %user.id, "Created user");

        self.user_id = Some(user.id);
        self.step = Step::AddExercise;
        Ok(())
    }

    pub fn previous(&mut self) {
        if self.step == Step::AddExercise {
            self.step = Step::CreateUser;
        }
    }

    /// Saves the exercise then loads the log to show the latest entry. The
    /// summary step is reached as soon as the exercise is saved, a failure
    /// loading the log is still returned
    #[instrument(skip(self, api))]
    pub async fn submit<A: WorkflowApi>(
        &mut self,
        api: &A,
        form: &ExerciseForm,
    ) -> Result<(), WorkflowError> {
        self.expect_step(Step::AddExercise)?;
        let user_id = self.user_id.ok_or(WorkflowError::NoUser)?;

        api.add_exercise(&user_id, &AddExercise::from(form)).await?;
        self.step = Step::Summary;
        self.last_entry = None;

        let log = api.fetch_log(&user_id).await?;
        debug!(count = log.count, "Fetched log");
        self.last_entry = log.log.last().cloned();
        Ok(())
    }

    pub fn restart(&mut self) {
        *self = Self::new();
    }
}
