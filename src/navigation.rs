//! Category tabs and path routing

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub path: &'static str,
}

/// Tabs in display order; the first one is the default route
pub const NAV_ITEMS: &[NavItem] = &[
    NavItem { label: "Movies in theaters", path: "/movies-in-theaters" },
    NavItem { label: "Coming soon", path: "/movies-coming" },
    NavItem { label: "Top rated Indian", path: "/top-rated-india" },
    NavItem { label: "Top rated movies", path: "/top-rated-movies" },
    NavItem { label: "Favourites", path: "/favourites" },
];

/// What the shell should show for a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    List { category: String },
    Detail { category: String, movie_id: String },
    Redirect(String),
}

impl Route {
    /// Canonical path of the route
    pub fn path(&self) -> String {
        match self {
            Route::List { category } => list_path(category),
            Route::Detail { category, movie_id } => detail_path(category, movie_id),
            Route::Redirect(to) => to.clone(),
        }
    }
}

pub fn default_path() -> &'static str {
    NAV_ITEMS[0].path
}

pub fn list_path(category: &str) -> String {
    format!("/{}", urlencoding::encode(category))
}

pub fn detail_path(category: &str, movie_id: &str) -> String {
    format!("/{}/{}", urlencoding::encode(category), urlencoding::encode(movie_id))
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// `/<category>` lists, `/<category>/<movieId>` shows details,
/// anything else goes to the default tab. Segments are percent-decoded.
pub fn resolve(path: &str) -> Route {
    let segments: Vec<String> = path
        .trim()
        .split('/')
        .filter(|s| !s.is_empty())
        .map(decode_segment)
        .collect();

    match segments.as_slice() {
        [category] => Route::List { category: category.clone() },
        [category, movie_id] => Route::Detail {
            category: category.clone(),
            movie_id: movie_id.clone(),
        },
        _ => Route::Redirect(default_path().to_string()),
    }
}

/// Tab highlighted for a category, if it has one
pub fn nav_item_for(category: &str) -> Option<&'static NavItem> {
    NAV_ITEMS.iter().find(|item| item.path.trim_start_matches('/') == category)
}
