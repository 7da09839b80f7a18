//! REST implementation of [`RemoteStore`].
//!
//! Talks to a PostgREST-style table API (the hosted backend exposes
//! `habits`, `habit_completion_log` and `challenges` as REST
//! resources). The trait surface is synchronous; the client owns a
//! small current-thread runtime and blocks on it, so it works from a
//! plain CLI `main` without an ambient executor.

use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tokio::runtime::Runtime;

use super::{ChallengeRow, HabitRow, LogRow, RemoteStore};
use crate::error::RemoteError;

pub struct RestStore {
    base_url: String,
    api_key: String,
    client: Client,
    rt: Runtime,
}

impl RestStore {
    /// Build a client for the table API at `base_url` (no trailing
    /// slash), authenticating with `api_key`.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, RemoteError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| RemoteError::Runtime(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: Client::new(),
            rt,
        })
    }

    fn url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    fn send(&self, req: RequestBuilder) -> Result<Response, RemoteError> {
        let resp = self.rt.block_on(self.authed(req).send())?;
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            let message = self.rt.block_on(resp.text()).unwrap_or_default();
            Err(RemoteError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    fn read_json<T: DeserializeOwned>(&self, resp: Response) -> Result<T, RemoteError> {
        self.rt
            .block_on(resp.json())
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    /// POST a row and return the representation the server echoes back
    /// (it may have applied defaults, including a different id).
    fn create_row<T: Serialize + DeserializeOwned + Clone>(
        &self,
        table: &str,
        row: &T,
    ) -> Result<T, RemoteError> {
        let req = self
            .client
            .post(self.url(table))
            .header("Prefer", "return=representation")
            .json(row);
        let resp = self.send(req)?;
        if resp.status() == StatusCode::NO_CONTENT {
            return Ok(row.clone());
        }
        let mut rows: Vec<T> = self.read_json(resp)?;
        rows.pop()
            .ok_or_else(|| RemoteError::Decode("empty representation".to_string()))
    }

    fn list_rows<T: DeserializeOwned>(&self, table: &str, owner: &str) -> Result<Vec<T>, RemoteError> {
        let req = self
            .client
            .get(self.url(table))
            .query(&[("owner", format!("eq.{owner}"))]);
        let resp = self.send(req)?;
        self.read_json(resp)
    }
}

impl RemoteStore for RestStore {
    fn create_habit(&self, row: &HabitRow) -> Result<HabitRow, RemoteError> {
        self.create_row("habits", row)
    }

    fn list_habits(&self, owner: &str) -> Result<Vec<HabitRow>, RemoteError> {
        self.list_rows("habits", owner)
    }

    fn delete_habit(&self, id: &str) -> Result<(), RemoteError> {
        let req = self
            .client
            .delete(self.url("habits"))
            .query(&[("id", format!("eq.{id}"))]);
        self.send(req).map(|_| ())
    }

    fn insert_log(&self, row: &LogRow) -> Result<(), RemoteError> {
        let req = self.client.post(self.url("habit_completion_log")).json(row);
        self.send(req).map(|_| ())
    }

    fn delete_log(&self, habit_id: &str, date: NaiveDate) -> Result<(), RemoteError> {
        let req = self
            .client
            .delete(self.url("habit_completion_log"))
            .query(&[
                ("habit_id", format!("eq.{habit_id}")),
                ("date", format!("eq.{date}")),
            ]);
        self.send(req).map(|_| ())
    }

    fn list_logs(&self, owner: &str) -> Result<Vec<LogRow>, RemoteError> {
        self.list_rows("habit_completion_log", owner)
    }

    fn create_challenge(&self, row: &ChallengeRow) -> Result<ChallengeRow, RemoteError> {
        self.create_row("challenges", row)
    }

    fn update_challenge(&self, id: &str, status: &str, current_day: u8) -> Result<(), RemoteError> {
        let req = self
            .client
            .patch(self.url("challenges"))
            .query(&[("id", format!("eq.{id}"))])
            .json(&json!({ "status": status, "current_day": current_day }));
        self.send(req).map(|_| ())
    }

    fn active_challenge(&self, owner: &str) -> Result<Option<ChallengeRow>, RemoteError> {
        let req = self.client.get(self.url("challenges")).query(&[
            ("owner", format!("eq.{owner}")),
            ("status", "eq.active".to_string()),
        ]);
        let resp = self.send(req)?;
        let mut rows: Vec<ChallengeRow> = self.read_json(resp)?;
        Ok(rows.pop())
    }
}
