use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::map::TileData;
use crate::types::Direction;

/// A square window of terrain centered on the bot, northernmost row first.
pub type View = Vec<Vec<TileData>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameOutcome {
    Won,
    Lost,
    Draw,
}

/// Successful answer to `register`.
#[derive(Debug)]
pub struct Registration {
    pub view: View,
    pub treasure: bool,
}

/// Server answer to a move command.
#[derive(Debug)]
pub enum MoveReply {
    View { view: View, treasure: bool },
    GameOver(GameOutcome),
}

/// The game server, as far as the bot is concerned: one registration, then
/// one move at a time. Implementations own transport and encoding.
#[allow(async_fn_in_trait)]
pub trait GameClient {
    fn player_name(&self) -> &str;

    async fn register(&mut self) -> Result<Registration>;

    async fn send_move(&mut self, direction: Direction) -> Result<MoveReply>;
}

/// The three response shapes the server produces, in the order serde
/// should try them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawResponse {
    Error { error: String },
    GameOver { result: GameOutcome },
    View { view: View, treasure: bool },
}

/// `GameClient` over the game's HTTP endpoints: form-encoded POSTs to
/// `/register/` and `/move/`, JSON responses.
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    player_name: String,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>, player_name: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            player_name: player_name.into(),
        }
    }

    async fn post(&self, path: &str, form: &[(&str, &str)]) -> Result<RawResponse> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {url}");
        let response = self
            .http
            .post(&url)
            .form(form)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<RawResponse>().await?)
    }
}

impl GameClient for RestClient {
    fn player_name(&self) -> &str {
        &self.player_name
    }

    async fn register(&mut self) -> Result<Registration> {
        let form = [("name", self.player_name.as_str())];
        match self.post("/register/", &form).await? {
            RawResponse::View { view, treasure } => Ok(Registration { view, treasure }),
            RawResponse::Error { error } => Err(Error::Server(error)),
            RawResponse::GameOver { .. } => {
                Err(Error::Server("game over before the first move".to_string()))
            }
        }
    }

    async fn send_move(&mut self, direction: Direction) -> Result<MoveReply> {
        let form = [
            ("name", self.player_name.as_str()),
            ("direction", direction.as_str()),
        ];
        match self.post("/move/", &form).await? {
            RawResponse::View { view, treasure } => Ok(MoveReply::View { view, treasure }),
            RawResponse::GameOver { result } => Ok(MoveReply::GameOver(result)),
            RawResponse::Error { error } => Err(Error::Server(error)),
        }
    }
}
