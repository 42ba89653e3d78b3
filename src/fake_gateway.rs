//! In-memory gateway used by the controller tests

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use crate::api::{ApiError, MovieGateway, MoviesPayload};
use crate::models::{Movie, FAVOURITES};

#[derive(Default)]
pub struct FakeGateway {
    collections: Mutex<HashMap<String, Vec<Movie>>>,
    failing: Mutex<HashSet<String>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(self, category: &str, movies: Vec<Movie>) -> Self {
        self.collections
            .lock()
            .unwrap()
            .insert(category.to_string(), movies);
        self
    }

    /// Make every call whose path starts with `prefix` fail with a network error
    pub fn fail(&self, prefix: &str) {
        self.failing.lock().unwrap().insert(prefix.to_string());
    }

    /// Hold every call whose path starts with `prefix` for `delay` before answering
    pub fn delay(&self, prefix: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(prefix.to_string(), delay);
    }

    pub fn recover(&self, prefix: &str) {
        self.failing.lock().unwrap().remove(prefix);
    }

    /// Calls made so far, as `METHOD path`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn favourite_ids(&self) -> Vec<String> {
        self.collections
            .lock()
            .unwrap()
            .get(FAVOURITES)
            .map(|movies| movies.iter().map(|m| m.id.clone()).collect())
            .unwrap_or_default()
    }

    fn record(&self, call: String) -> Result<(), ApiError> {
        let path = call.split_once(' ').map(|(_, p)| p.to_string()).unwrap_or_default();
        self.calls.lock().unwrap().push(call);
        let delay = self
            .delays
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| path.starts_with(p.as_str()))
            .map(|(_, d)| *d);
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
        if self.failing.lock().unwrap().iter().any(|p| path.starts_with(p.as_str())) {
            return Err(ApiError::Network(format!("connection refused: {}", path)));
        }
        Ok(())
    }
}

impl MovieGateway for FakeGateway {
    fn fetch_movies(&self, path: &str) -> Result<MoviesPayload, ApiError> {
        self.record(format!("GET {}", path))?;
        let segments: Vec<String> = path
            .split('/')
            .map(|s| urlencoding::decode(s).map(|d| d.into_owned()).unwrap_or_else(|_| s.to_string()))
            .collect();
        let collections = self.collections.lock().unwrap();
        match segments.as_slice() {
            [category] => collections
                .get(category)
                .cloned()
                .map(MoviesPayload::List)
                .ok_or_else(|| ApiError::NotFound(path.to_string())),
            [category, id] => collections
                .get(category)
                .and_then(|movies| movies.iter().find(|m| &m.id == id))
                .cloned()
                .map(|m| MoviesPayload::Single(Box::new(m)))
                .ok_or_else(|| ApiError::NotFound(path.to_string())),
            _ => Err(ApiError::NotFound(path.to_string())),
        }
    }

    fn add_favourite(&self, movie: &Movie) -> Result<Movie, ApiError> {
        self.record(format!("POST {}", FAVOURITES))?;
        let mut collections = self.collections.lock().unwrap();
        let favourites = collections.entry(FAVOURITES.to_string()).or_default();
        if favourites.iter().any(|m| m.id == movie.id) {
            return Err(ApiError::Duplicate { id: movie.id.clone() });
        }
        favourites.push(movie.clone());
        Ok(movie.clone())
    }

    fn remove_favourite(&self, movie_id: &str) -> Result<Movie, ApiError> {
        let path = format!("{}/{}", FAVOURITES, movie_id);
        self.record(format!("DELETE {}", path))?;
        let mut collections = self.collections.lock().unwrap();
        let favourites = collections.entry(FAVOURITES.to_string()).or_default();
        match favourites.iter().position(|m| m.id == movie_id) {
            Some(pos) => Ok(favourites.remove(pos)),
            None => Err(ApiError::NotFound(path)),
        }
    }
}
