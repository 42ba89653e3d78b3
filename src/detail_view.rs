//! Single movie view with poster preview

use std::sync::Arc;

use log::{info, warn};

use crate::api::{ApiError, MovieGateway};
use crate::models::Movie;
use crate::navigation;
use crate::notifications::NotificationQueue;
use crate::tasks::{Repaint, TaskRunner, Tagged};

const FETCH_FAILED: &str = "Error in fetching movie details";

pub struct DetailViewController {
    gateway: Arc<dyn MovieGateway>,
    category: String,
    movie_id: String,
    movie: Option<Movie>,
    preview_open: bool,
    notifications: NotificationQueue,
    tasks: TaskRunner<Result<Movie, ApiError>>,
}

impl DetailViewController {
    pub fn new(
        gateway: Arc<dyn MovieGateway>,
        category: &str,
        movie_id: &str,
        repaint: Repaint,
    ) -> Self {
        let mut view = Self {
            gateway,
            category: category.to_string(),
            movie_id: movie_id.to_string(),
            movie: None,
            preview_open: false,
            notifications: NotificationQueue::new(),
            tasks: TaskRunner::new(repaint),
        };
        view.fetch();
        view
    }

    /// Point the view at another movie; returns false when nothing changed
    pub fn set_params(&mut self, category: &str, movie_id: &str) -> bool {
        if self.category == category && self.movie_id == movie_id {
            return false;
        }
        self.category = category.to_string();
        self.movie_id = movie_id.to_string();
        self.preview_open = false;
        self.fetch();
        true
    }

    fn fetch(&mut self) {
        self.tasks.advance();
        info!("Fetching movie /{}/{}", self.category, self.movie_id);

        let gateway = Arc::clone(&self.gateway);
        let category = self.category.clone();
        let movie_id = self.movie_id.clone();
        self.tasks
            .spawn(move || gateway.fetch_movie(&category, &movie_id));
    }

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

    fn apply(&mut self, tagged: Tagged<Result<Movie, ApiError>>) {
        if !self.tasks.is_current(tagged.generation) {
            info!("Discarding stale movie details");
            return;
        }
        match tagged.result {
            Ok(movie) => self.movie = Some(movie),
            Err(e) => {
                warn!("Fetching /{}/{} failed: {}", self.category, self.movie_id, e);
                self.notifications.error(FETCH_FAILED);
                self.movie = None;
            }
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn movie_id(&self) -> &str {
        &self.movie_id
    }

    pub fn movie(&self) -> Option<&Movie> {
        self.movie.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.tasks.is_busy()
    }

    pub fn shows_no_data(&self) -> bool {
        !self.is_loading() && self.movie.is_none()
    }

    pub fn preview_open(&self) -> bool {
        self.preview_open
    }

    pub fn open_preview(&mut self) {
        self.preview_open = true;
    }

    pub fn close_preview(&mut self) {
        self.preview_open = false;
    }

    /// Target of the "Go Back To List" link
    pub fn back_path(&self) -> String {
        navigation::list_path(&self.category)
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationQueue {
        &mut self.notifications
    }
}
