use gloo::net::http::{Request, Response};
use http::header::ACCEPT;
use serde::de::DeserializeOwned;
use shared::{
    api::{
        error::ErrorBody,
        payloads::{AddExercise, CreateUser, ExerciseLog, UserExercise},
        Object,
    },
    model::User,
    types::Uuid,
};
use tracing::{debug, warn};

use crate::workflow::{ClientError, WorkflowApi};

const APPLICATION_JSON: &str = "application/json";

/// Talks to the server the page was loaded from
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpApi;

impl From<gloo::net::Error> for ClientError {
    fn from(e: gloo::net::Error) -> Self {
        ClientError::Network(e.to_string())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    debug!(url = %response.url(), status = response.status());

    if response.ok() {
        return response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()));
    }

    let status = response.status();
    let message = match response.json::<ErrorBody>().await {
        Ok(ErrorBody { message, error }) => {
            if let Some(error) = error {
                warn!(status, %error, "Server error");
            }
            message
        }
        Err(_) => format!("{status} {}", response.status_text()),
    };
    Err(ClientError::Server { status, message })
}

impl WorkflowApi for HttpApi {
    async fn create_user(&self, payload: &CreateUser) -> Result<User, ClientError> {
        let response = Request::post(Object::Users.path())
            .header(ACCEPT.as_str(), APPLICATION_JSON)
            .json(payload)?
            .send()
            .await?;
        read_json(response).await
    }

    async fn add_exercise(
        &self,
        user_id: &Uuid,
        payload: &AddExercise,
    ) -> Result<UserExercise, ClientError> {
        let response = Request::post(&Object::UserExercises.path_for(user_id))
            .header(ACCEPT.as_str(), APPLICATION_JSON)
            .json(payload)?
            .send()
            .await?;
        read_json(response).await
    }

    async fn fetch_log(&self, user_id: &Uuid) -> Result<ExerciseLog, ClientError> {
        let response = Request::get(&Object::UserLogs.path_for(user_id))
            .header(ACCEPT.as_str(), APPLICATION_JSON)
            .send()
            .await?;
        read_json(response).await
    }
}
