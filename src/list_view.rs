//! Category list view: fetch on category change, title search, favourites

use std::sync::Arc;

use log::{info, warn};

use crate::api::{ApiError, MovieGateway};
use crate::models::{filtered_indices, Movie, FAVOURITES};
use crate::notifications::NotificationQueue;
use crate::tasks::{Repaint, TaskRunner, Tagged};

const FETCH_FAILED: &str = "Error in fetching movies";
const ADDED: &str = "Movie added to favourites";
const ALREADY_ADDED: &str = "Movie already added in favourites";
const ADD_FAILED: &str = "Error in adding movie to favourites";
const REMOVED: &str = "Movie removed from favourites";
const REMOVE_FAILED: &str = "Error in removing movie from favourites";

/// Background task messages
enum ListTask {
    Fetched(Result<Vec<Movie>, ApiError>),
    Added {
        movie_id: String,
        result: Result<Movie, ApiError>,
    },
    /// Removal followed by a refetch of the category
    Removed {
        movie_id: String,
        result: Result<Vec<Movie>, ApiError>,
    },
}

pub struct ListViewController {
    gateway: Arc<dyn MovieGateway>,
    category: String,
    movies: Vec<Movie>,
    search: String,
    filtered: Vec<usize>,
    notifications: NotificationQueue,
    tasks: TaskRunner<ListTask>,
}

impl ListViewController {
    /// Create the view and start fetching `category`
    pub fn new(gateway: Arc<dyn MovieGateway>, category: &str, repaint: Repaint) -> Self {
        let mut view = Self {
            gateway,
            category: category.to_string(),
            movies: Vec::new(),
            search: String::new(),
            filtered: Vec::new(),
            notifications: NotificationQueue::new(),
            tasks: TaskRunner::new(repaint),
        };
        view.fetch();
        view
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn is_favourites_view(&self) -> bool {
        self.category == FAVOURITES
    }

    /// Switch category; returns false when it was already current
    pub fn set_category(&mut self, category: &str) -> bool {
        if self.category == category {
            return false;
        }
        self.category = category.to_string();
        self.fetch();
        true
    }

    pub fn reload(&mut self) {
        self.fetch();
    }

    fn fetch(&mut self) {
        self.tasks.advance();
        info!("Fetching movies for /{}", self.category);

        let gateway = Arc::clone(&self.gateway);
        let category = self.category.clone();
        self.tasks
            .spawn(move || ListTask::Fetched(gateway.fetch_category(&category)));
    }

    pub fn add_to_favourites(&mut self, movie: &Movie) {
        info!("Adding {} ({}) to favourites", movie.title, movie.id);

        let gateway = Arc::clone(&self.gateway);
        let movie = movie.clone();
        self.tasks.spawn_persistent(move || ListTask::Added {
            result: gateway.add_favourite(&movie),
            movie_id: movie.id,
        });
    }

    /// Only meaningful on the favourites list; returns false elsewhere
    pub fn remove_from_favourites(&mut self, movie_id: &str) -> bool {
        if !self.is_favourites_view() {
            warn!("Ignoring removal of {} outside /{}", movie_id, FAVOURITES);
            return false;
        }
        info!("Removing {} from favourites", movie_id);

        let gateway = Arc::clone(&self.gateway);
        let category = self.category.clone();
        let movie_id = movie_id.to_string();
        self.tasks.spawn_persistent(move || {
            let result = gateway
                .remove_favourite(&movie_id)
                .and_then(|_| gateway.fetch_category(&category));
            ListTask::Removed { movie_id, result }
        });
        true
    }

    /// Apply finished background work; returns how many results were handled
    pub fn poll(&mut self) -> usize {
        let mut handled = 0;
        while let Some(tagged) = self.tasks.try_next() {
            self.apply(tagged);
            handled += 1;
        }
        handled
    }

    #[cfg(test)]
    pub fn settle(&mut self) {
        while let Some(tagged) = self.tasks.wait_next(std::time::Duration::from_secs(5)) {
            self.apply(tagged);
        }
    }

    fn apply(&mut self, tagged: Tagged<ListTask>) {
        let current = self.tasks.is_current(tagged.generation);

        match tagged.result {
            ListTask::Fetched(_) if !current => {
                info!("Discarding stale movie list");
            }
            ListTask::Fetched(Ok(movies)) => {
                info!("Loaded {} movies for /{}", movies.len(), self.category);
                self.set_movies(movies);
            }
            ListTask::Fetched(Err(e)) => {
                warn!("Fetching /{} failed: {}", self.category, e);
                self.notifications.error(FETCH_FAILED);
                self.set_movies(Vec::new());
            }
            ListTask::Added { result: Ok(_), .. } => {
                self.notifications.success(ADDED);
            }
            ListTask::Added { movie_id, result: Err(ApiError::Duplicate { .. }) } => {
                info!("{} is already a favourite", movie_id);
                self.notifications.error(ALREADY_ADDED);
            }
            ListTask::Added { movie_id, result: Err(e) } => {
                warn!("Adding {} to favourites failed: {}", movie_id, e);
                self.notifications.error(ADD_FAILED);
            }
            ListTask::Removed { movie_id, result: Ok(movies) } => {
                info!("Removed {} from favourites", movie_id);
                // The refreshed list belongs to the category the removal started in
                if current {
                    self.set_movies(movies);
                }
                self.notifications.success(REMOVED);
            }
            ListTask::Removed { movie_id, result: Err(e) } => {
                warn!("Removing {} from favourites failed: {}", movie_id, e);
                self.notifications.error(REMOVE_FAILED);
            }
        }
    }

    fn set_movies(&mut self, movies: Vec<Movie>) {
        self.movies = movies;
        self.search.clear();
        self.refilter();
    }

    pub fn set_search(&mut self, search: &str) {
        if self.search != search {
            self.search = search.to_string();
            self.refilter();
        }
    }

    fn refilter(&mut self) {
        self.filtered = filtered_indices(&self.movies, &self.search);
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn filtered(&self) -> impl Iterator<Item = &Movie> {
        self.filtered.iter().map(|&i| &self.movies[i])
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn is_loading(&self) -> bool {
        self.tasks.is_busy()
    }

    /// Empty category and a search that matched nothing render the same way
    pub fn shows_no_data(&self) -> bool {
        !self.is_loading() && (self.movies.is_empty() || self.filtered.is_empty())
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationQueue {
        &mut self.notifications
    }
}

#[cfg(test)]
#[path = "list_view_tests.rs"]
mod tests;
