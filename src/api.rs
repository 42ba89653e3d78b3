//! Movies REST API client

use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ureq::Agent;

use crate::models::{Movie, FAVOURITES};

/// Marker the backend puts in the error body when an insert collides with an existing id
const DUPLICATE_MARKER: &str = "duplicate id";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("movie {id} is already in favourites")]
    Duplicate { id: String },
    #[error("invalid response: {0}")]
    Decode(String),
}

impl From<ureq::Error> for ApiError {
    fn from(e: ureq::Error) -> Self {
        ApiError::Network(e.to_string())
    }
}

/// Body of a list/detail fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MoviesPayload {
    List(Vec<Movie>),
    Single(Box<Movie>),
}

/// The three remote operations the views depend on.
///
/// Calls block; controllers run them on worker threads.
pub trait MovieGateway: Send + Sync {
    /// `path` is either `<category>` or `<category>/<movieId>`, each segment
    /// percent-encoded
    fn fetch_movies(&self, path: &str) -> Result<MoviesPayload, ApiError>;

    fn add_favourite(&self, movie: &Movie) -> Result<Movie, ApiError>;

    fn remove_favourite(&self, movie_id: &str) -> Result<Movie, ApiError>;

    fn fetch_category(&self, category: &str) -> Result<Vec<Movie>, ApiError> {
        match self.fetch_movies(&urlencoding::encode(category))? {
            MoviesPayload::List(movies) => Ok(movies),
            MoviesPayload::Single(_) => Err(ApiError::Decode(format!(
                "expected a list for /{}, got a single movie",
                category
            ))),
        }
    }

    fn fetch_movie(&self, category: &str, movie_id: &str) -> Result<Movie, ApiError> {
        let path = format!("{}/{}", urlencoding::encode(category), urlencoding::encode(movie_id));
        match self.fetch_movies(&path)? {
            MoviesPayload::Single(movie) => Ok(*movie),
            MoviesPayload::List(_) => Err(ApiError::Decode(format!(
                "expected a single movie for /{}/{}, got a list",
                category, movie_id
            ))),
        }
    }
}

pub struct MoviesClient {
    base_url: String,
    agent: Agent,
}

impl MoviesClient {
    /// `timeout` of `None` keeps ureq's own defaults
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Self {
        // Keep non-2xx responses readable so error bodies can be inspected
        let agent = Agent::config_builder()
            .timeout_global(timeout)
            .http_status_as_error(false)
            .build()
            .new_agent();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn read_response(
        path: &str,
        mut response: ureq::http::Response<ureq::Body>,
    ) -> Result<String, ApiError> {
        let status = response.status();
        let body = response.body_mut().read_to_string()?;

        if status.is_success() {
            return Ok(body);
        }

        debug!("{} -> HTTP {}", path, status.as_u16());
        if status.as_u16() == 404 {
            Err(ApiError::NotFound(path.to_string()))
        } else {
            Err(ApiError::Status { status: status.as_u16(), body })
        }
    }

    fn decode<T: for<'de> Deserialize<'de>>(path: &str, body: &str) -> Result<T, ApiError> {
        serde_json::from_str(body).map_err(|e| ApiError::Decode(format!("{}: {}", path, e)))
    }
}

impl MovieGateway for MoviesClient {
    fn fetch_movies(&self, path: &str) -> Result<MoviesPayload, ApiError> {
        let url = self.url(path);
        debug!("GET {}", url);

        let response = self.agent.get(&url).header("Accept", "application/json").call()?;
        let body = Self::read_response(path, response)?;
        Self::decode(path, &body)
    }

    fn add_favourite(&self, movie: &Movie) -> Result<Movie, ApiError> {
        let url = self.url(FAVOURITES);
        debug!("POST {} ({})", url, movie.id);

        let payload = serde_json::to_string(movie).map_err(|e| ApiError::Decode(e.to_string()))?;
        let response = self
            .agent
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(payload.as_bytes())?;

        match Self::read_response(FAVOURITES, response) {
            Ok(body) => Self::decode(FAVOURITES, &body),
            Err(ApiError::Status { body, .. }) if body.contains(DUPLICATE_MARKER) => {
                warn!("Favourite {} already exists", movie.id);
                Err(ApiError::Duplicate { id: movie.id.clone() })
            }
            Err(e) => Err(e),
        }
    }

    fn remove_favourite(&self, movie_id: &str) -> Result<Movie, ApiError> {
        let path = format!("{}/{}", FAVOURITES, urlencoding::encode(movie_id));
        let url = self.url(&path);
        debug!("DELETE {}", url);

        let response = self.agent.delete(&url).header("Accept", "application/json").call()?;
        let body = Self::read_response(&path, response)?;

        // json-server answers a delete with `{}`, other backends with 204 and no body
        if let Ok(movie) = serde_json::from_str::<Movie>(&body) {
            return Ok(movie);
        }
        let value: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
        Ok(Movie {
            id: value["id"].as_str().unwrap_or(movie_id).to_string(),
            title: value["title"].as_str().unwrap_or_default().to_string(),
            ..Movie::default()
        })
    }
}

/// Static location of a movie's `poster` file
pub fn poster_url(base_url: &str, poster: &str) -> String {
    format!(
        "{}/assets/images/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(poster)
    )
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
