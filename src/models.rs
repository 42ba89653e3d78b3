//! Data models for Movies on the Tip

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Category whose list supports removal instead of addition
pub const FAVOURITES: &str = "favourites";

/// Movie record as served by the backend (camelCase JSON)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub ratings: Vec<f64>,
    #[serde(default)]
    pub poster: String,
    #[serde(default)]
    pub content_rating: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub storyline: String,
    #[serde(default)]
    pub actors: Vec<String>,
    // Some datasets serve this as a number
    #[serde(default, deserialize_with = "string_or_number")]
    pub imdb_rating: String,
    #[serde(default)]
    pub posterurl: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Positions of the movies whose title contains `search`, ignoring case.
/// An empty search keeps every movie.
pub fn filtered_indices(movies: &[Movie], search: &str) -> Vec<usize> {
    let needle = search.to_lowercase();
    movies
        .iter()
        .enumerate()
        .filter(|(_, m)| needle.is_empty() || m.title.to_lowercase().contains(&needle))
        .map(|(i, _)| i)
        .collect()
}

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationKind {
    Error,
    Success,
    #[default]
    Info,
}

impl NotificationKind {
    /// Icon name shown in the toast header
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationKind::Error => "x",
            NotificationKind::Success => "check",
            NotificationKind::Info => "info",
        }
    }

    /// Glyph rendered for the icon
    pub fn glyph(&self) -> &'static str {
        match self {
            NotificationKind::Error => "✖",
            NotificationKind::Success => "✔",
            NotificationKind::Info => "ℹ",
        }
    }

    pub fn default_title(&self) -> &'static str {
        match self {
            NotificationKind::Error => "Error",
            NotificationKind::Success => "Success",
            NotificationKind::Info => "Message",
        }
    }
}

/// User-facing transient message
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: Option<String>,
    pub body: String,
}

impl Notification {
    pub fn error(body: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Error, title: None, body: body.into() }
    }

    pub fn success(body: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Success, title: None, body: body.into() }
    }

    #[cfg(test)]
    pub fn info(body: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Info, title: None, body: body.into() }
    }

    #[cfg(test)]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Explicit title, or the kind's default
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(self.kind.default_title())
    }
}

#[cfg(test)]
pub(crate) fn sample_movie(id: &str, title: &str) -> Movie {
    Movie {
        id: id.to_string(),
        title: title.to_string(),
        year: "2018".to_string(),
        genres: vec!["Drama".to_string()],
        ratings: vec![7.0, 8.0],
        poster: format!("{}.jpg", id),
        content_rating: "PG-13".to_string(),
        duration: "PT120M".to_string(),
        release_date: "2018-02-14".to_string(),
        average_rating: 7.5,
        original_title: String::new(),
        storyline: "A story.".to_string(),
        actors: vec!["Someone".to_string()],
        imdb_rating: "7.1".to_string(),
        posterurl: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_backend_movie() {
        let json = r#"{
            "id": "1",
            "title": "Black Panther",
            "year": "2018",
            "genres": ["Action", "Adventure"],
            "ratings": [4, 10, 1],
            "poster": "MV5BMTg1.jpg",
            "contentRating": "15",
            "duration": "PT134M",
            "releaseDate": "2018-02-14",
            "averageRating": 0,
            "originalTitle": "",
            "storyline": "After the events of Captain America.",
            "actors": ["Chadwick Boseman", "Michael B. Jordan"],
            "imdbRating": 7.0,
            "posterurl": "https://images-na.ssl-images-amazon.com/images/M/MV5BMTg1.jpg"
        }"#;
        let movie: Movie = serde_json::from_str(json).unwrap();
        assert_eq!(movie.title, "Black Panther");
        assert_eq!(movie.content_rating, "15");
        assert_eq!(movie.ratings, vec![4.0, 10.0, 1.0]);
        assert_eq!(movie.imdb_rating, "7.0");
        assert_eq!(movie.actors.len(), 2);
    }

    #[test]
    fn test_decode_sparse_movie() {
        let movie: Movie = serde_json::from_str(r#"{"id":"x","title":"Sparse","imdbRating":""}"#).unwrap();
        assert!(movie.genres.is_empty());
        assert_eq!(movie.imdb_rating, "");
        assert_eq!(movie.average_rating, 0.0);
    }

    #[test]
    fn test_serialize_uses_backend_field_names() {
        let value = serde_json::to_value(sample_movie("m1", "Title")).unwrap();
        assert_eq!(value["contentRating"], "PG-13");
        assert_eq!(value["releaseDate"], "2018-02-14");
        assert_eq!(value["imdbRating"], "7.1");
        assert!(value.get("posterurl").is_some());
    }

    #[test]
    fn test_filter_by_title() {
        let movies = vec![
            sample_movie("1", "The Shape of Water"),
            sample_movie("2", "Black Panther"),
            sample_movie("3", "WATERWORLD"),
        ];
        assert_eq!(filtered_indices(&movies, "water"), vec![0, 2]);
        assert_eq!(filtered_indices(&movies, "").len(), 3);
        assert!(filtered_indices(&movies, "zz").is_empty());
    }

    #[test]
    fn test_filter_non_ascii() {
        let movies = vec![sample_movie("1", "Amélie"), sample_movie("2", "ÉTÉ")];
        assert_eq!(filtered_indices(&movies, "AMÉ"), vec![0]);
        assert_eq!(filtered_indices(&movies, "été"), vec![1]);
    }

    #[test]
    fn test_notification_titles_and_icons() {
        let n = Notification::error("boom");
        assert_eq!(n.display_title(), "Error");
        assert_eq!(n.kind.icon(), "x");
        assert_eq!(Notification::success("ok").display_title(), "Success");
        assert_eq!(Notification::success("ok").kind.icon(), "check");
        assert_eq!(Notification::info("fyi").display_title(), "Message");
        assert_eq!(Notification::info("fyi").kind.icon(), "info");
        assert_eq!(Notification::info("fyi").with_title("Heads up").display_title(), "Heads up");
    }
}
