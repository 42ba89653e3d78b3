//! Movies on the Tip
//! A desktop movie catalog with category lists, title search and favourites

// Hide console window on Windows release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

// Use mimalloc for faster memory allocation (Linux, macOS)
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::Parser;
use eframe::egui;
use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

mod api;
mod config;
mod detail_view;
mod list_view;
mod models;
mod navigation;
mod notifications;
mod tasks;

#[cfg(test)]
mod fake_gateway;

use api::{poster_url, MovieGateway, MoviesClient};
use config::{AppConfig, Args};
use detail_view::DetailViewController;
use list_view::ListViewController;
use models::{Movie, NotificationKind};
use navigation::{Route, NAV_ITEMS};
use notifications::{NotificationId, NotificationQueue};
use tasks::Repaint;

const CARD_WIDTH: f32 = 170.0;
const POSTER_SIZE: [f32; 2] = [150.0, 222.0];

/// Window icon: a film frame with a play triangle
fn load_icon() -> egui::IconData {
    let size: usize = 64;
    let mut rgba = vec![0u8; size * size * 4];

    for y in 0..size {
        for x in 0..size {
            let idx = (y * size + x) * 4;
            let nx = x as f32 / size as f32;
            let ny = y as f32 / size as f32;

            // Sprocket holes along the top and bottom strips
            let in_strip = ny < 0.18 || ny > 0.82;
            let in_hole = in_strip
                && ((nx * 8.0).fract() > 0.3 && (nx * 8.0).fract() < 0.7)
                && ((ny > 0.06 && ny < 0.12) || (ny > 0.88 && ny < 0.94));

            let in_play = {
                let px = nx - 0.38;
                let py = ny - 0.5;
                px >= 0.0 && px <= 0.28 && py.abs() <= (0.28 - px) * 0.6
            };

            let (r, g, b, a) = if in_hole {
                (0, 0, 0, 0)
            } else if in_strip {
                (30, 30, 36, 255)
            } else if in_play {
                (255, 255, 255, 255)
            } else {
                // Warm red gradient (#c0392b to #e67e22)
                let t = nx * 0.5 + ny * 0.5;
                (
                    (192.0 + (230.0 - 192.0) * t) as u8,
                    (57.0 + (126.0 - 57.0) * t) as u8,
                    (43.0 + (34.0 - 43.0) * t) as u8,
                    255,
                )
            };
            rgba[idx] = r;
            rgba[idx + 1] = g;
            rgba[idx + 2] = b;
            rgba[idx + 3] = a;
        }
    }

    egui::IconData {
        rgba,
        width: size as u32,
        height: size as u32,
    }
}

fn main() -> Result<(), eframe::Error> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_filter()))
        .filter_module("egui", log::LevelFilter::Warn)
        .filter_module("eframe", log::LevelFilter::Warn)
        .format_timestamp_millis()
        .init();

    let config = AppConfig::load();
    debug!("Command-line args: {:?}", args);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 760.0])
            .with_min_inner_size([640.0, 480.0])
            .with_icon(load_icon()),
        vsync: true,
        ..Default::default()
    };

    eframe::run_native(
        "Movies on the Tip",
        options,
        Box::new(move |cc| {
            // Posters are fetched by URL
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(MoviesApp::new(&cc.egui_ctx, &args, config)))
        }),
    )
}

/// The page currently on screen
enum View {
    List(ListViewController),
    Detail(DetailViewController),
}

impl View {
    fn poll(&mut self) {
        match self {
            View::List(view) => view.poll(),
            View::Detail(view) => view.poll(),
        };
    }

    fn notifications_mut(&mut self) -> &mut NotificationQueue {
        match self {
            View::List(view) => view.notifications_mut(),
            View::Detail(view) => view.notifications_mut(),
        }
    }

    fn category(&self) -> &str {
        match self {
            View::List(view) => view.category(),
            View::Detail(view) => view.category(),
        }
    }
}

/// UI interactions collected while drawing, applied afterwards
enum Action {
    Navigate(String),
    AddFavourite(Movie),
    RemoveFavourite(String),
    Refresh,
    Search(String),
    OpenPreview,
    ClosePreview,
    Dismiss(NotificationId),
}

struct MoviesApp {
    config: AppConfig,
    gateway: Arc<dyn MovieGateway>,
    base_url: String,
    path: String,
    view: Option<View>,
    repaint: Repaint,
}

impl MoviesApp {
    fn new(ctx: &egui::Context, args: &Args, config: AppConfig) -> Self {
        let base_url = config.effective_base_url(args);
        let timeout = config.request_timeout(args);
        info!("Movies backend: {} (timeout {:?})", base_url, timeout);

        apply_style(ctx, &config);

        let repaint_ctx = ctx.clone();
        let mut app = Self {
            gateway: Arc::new(MoviesClient::new(&base_url, timeout)),
            base_url,
            path: String::new(),
            view: None,
            repaint: Arc::new(move || repaint_ctx.request_repaint()),
            config: config.clone(),
        };
        app.navigate(&config.start_path(args));
        app
    }

    fn navigate(&mut self, path: &str) {
        let route = match navigation::resolve(path) {
            Route::Redirect(to) => {
                debug!("Redirecting {:?} to {}", path, to);
                navigation::resolve(&to)
            }
            route => route,
        };

        let new_path = route.path();
        if new_path != self.path {
            info!("Navigating to {}", new_path);
            self.path = new_path;
            self.config.last_path = self.path.clone();
            self.config.save();
        }

        match route {
            Route::List { category } => match &mut self.view {
                Some(View::List(view)) => {
                    view.set_category(&category);
                }
                _ => {
                    self.view = Some(View::List(ListViewController::new(
                        Arc::clone(&self.gateway),
                        &category,
                        Arc::clone(&self.repaint),
                    )));
                }
            },
            Route::Detail { category, movie_id } => match &mut self.view {
                Some(View::Detail(view)) => {
                    view.set_params(&category, &movie_id);
                }
                _ => {
                    self.view = Some(View::Detail(DetailViewController::new(
                        Arc::clone(&self.gateway),
                        &category,
                        &movie_id,
                        Arc::clone(&self.repaint),
                    )));
                }
            },
            Route::Redirect(to) => debug!("Ignoring nested redirect to {}", to),
        }
    }

    fn apply(&mut self, action: Action) {
        if let Action::Navigate(path) = &action {
            self.navigate(path);
            return;
        }
        let Some(view) = self.view.as_mut() else {
            return;
        };

        match (action, view) {
            (Action::AddFavourite(movie), View::List(view)) => view.add_to_favourites(&movie),
            (Action::RemoveFavourite(id), View::List(view)) => {
                view.remove_from_favourites(&id);
            }
            (Action::Refresh, View::List(view)) => view.reload(),
            (Action::Search(text), View::List(view)) => view.set_search(&text),
            (Action::OpenPreview, View::Detail(view)) => view.open_preview(),
            (Action::ClosePreview, View::Detail(view)) => view.close_preview(),
            (Action::Dismiss(id), view) => {
                view.notifications_mut().dismiss(id);
            }
            _ => {}
        }
    }

    fn show_nav_bar(&mut self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        let current = self.view.as_ref().map(|v| v.category().to_string()).unwrap_or_default();

        ui.horizontal(|ui| {
            ui.heading("Movies");
            ui.add_space(16.0);

            for item in NAV_ITEMS {
                let selected = item.path.trim_start_matches('/') == current;
                if ui.selectable_label(selected, item.label).clicked() {
                    actions.push(Action::Navigate(item.path.to_string()));
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let icon = if self.config.dark_mode { "☀" } else { "🌙" };
                if ui.button(icon).on_hover_text("Toggle dark mode").clicked() {
                    self.config.dark_mode = !self.config.dark_mode;
                    apply_style(ui.ctx(), &self.config);
                    self.config.save();
                }
            });
        });
    }

    fn show_list(&self, ui: &mut egui::Ui, view: &ListViewController, actions: &mut Vec<Action>) {
        if let Some(item) = navigation::nav_item_for(view.category()) {
            ui.heading(item.label);
            ui.add_space(4.0);
        }
        if view.is_loading() {
            show_loader(ui);
            return;
        }

        if !view.movies().is_empty() {
            let mut search = view.search().to_string();
            ui.horizontal(|ui| {
                ui.label("🔍");
                let response = ui.add(
                    egui::TextEdit::singleline(&mut search)
                        .hint_text("Search movies by title")
                        .desired_width(320.0),
                );
                if response.changed() {
                    actions.push(Action::Search(search.clone()));
                }
                if ui.button("⟳").on_hover_text("Reload").clicked() {
                    actions.push(Action::Refresh);
                }
            });
            ui.label(
                egui::RichText::new(format!("{} of {} movies", view.filtered_len(), view.movies().len()))
                    .small()
                    .weak(),
            );
            ui.add_space(8.0);

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        for movie in view.filtered() {
                            self.show_movie_card(ui, view, movie, actions);
                        }
                    });
                });
        }

        if view.shows_no_data() {
            show_no_data(ui);
        }
    }

    fn show_movie_card(
        &self,
        ui: &mut egui::Ui,
        view: &ListViewController,
        movie: &Movie,
        actions: &mut Vec<Action>,
    ) {
        egui::Frame::group(ui.style())
            .inner_margin(egui::Margin::same(8))
            .show(ui, |ui| {
                ui.set_width(CARD_WIDTH);
                ui.vertical_centered(|ui| {
                    ui.add(
                        egui::Image::from_uri(poster_url(&self.base_url, &movie.poster))
                            .fit_to_exact_size(POSTER_SIZE.into()),
                    );
                    ui.add(egui::Label::new(egui::RichText::new(&movie.title).strong()).truncate());

                    if ui.button("👁 View Details").clicked() {
                        actions.push(Action::Navigate(navigation::detail_path(
                            view.category(),
                            &movie.id,
                        )));
                    }
                    if view.is_favourites_view() {
                        if ui.button("✖ Remove From Favourites").clicked() {
                            actions.push(Action::RemoveFavourite(movie.id.clone()));
                        }
                    } else if ui.button("♥ Add To Favourites").clicked() {
                        actions.push(Action::AddFavourite(movie.clone()));
                    }
                });
            });
    }

    fn show_detail(&self, ui: &mut egui::Ui, view: &DetailViewController, actions: &mut Vec<Action>) {
        if view.is_loading() {
            show_loader(ui);
            return;
        }

        if ui.link("Go Back To List").clicked() {
            actions.push(Action::Navigate(view.back_path()));
        }
        ui.add_space(8.0);

        if view.shows_no_data() {
            show_no_data(ui);
            return;
        }
        let Some(movie) = view.movie() else {
            return;
        };
        let poster = poster_url(&self.base_url, &movie.poster);

        ui.horizontal_top(|ui| {
            ui.vertical(|ui| {
                ui.add(egui::Image::from_uri(poster.clone()).fit_to_exact_size(egui::vec2(240.0, 355.0)));
                if ui.button("👁 Preview").clicked() {
                    actions.push(Action::OpenPreview);
                }
            });
            ui.add_space(16.0);

            ui.vertical(|ui| {
                ui.heading(format!("{} ({})", movie.title, movie.year));
                ui.add_space(8.0);
                egui::Grid::new("movie_facts")
                    .num_columns(2)
                    .spacing([24.0, 8.0])
                    .striped(true)
                    .show(ui, |ui| {
                        let facts = [
                            ("Imdb Rating", movie.imdb_rating.clone()),
                            ("Content Rating", movie.content_rating.clone()),
                            ("Average Rating", movie.average_rating.to_string()),
                            ("Duration", movie.duration.clone()),
                            ("Genres", movie.genres.join(", ")),
                            ("Actors", movie.actors.join(", ")),
                            ("Release Date", movie.release_date.clone()),
                            ("Story Line", movie.storyline.clone()),
                        ];
                        for (label, value) in facts {
                            ui.label(egui::RichText::new(label).strong());
                            ui.add(egui::Label::new(value).wrap());
                            ui.end_row();
                        }
                    });
            });
        });

        if view.preview_open() {
            let mut open = true;
            egui::Window::new(movie.title.as_str())
                .id(egui::Id::new(("poster_preview", view.movie_id())))
                .open(&mut open)
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ui.ctx(), |ui| {
                    ui.add(egui::Image::from_uri(poster).max_height(600.0));
                });
            if !open {
                actions.push(Action::ClosePreview);
            }
        }
    }
}

fn show_loader(ui: &mut egui::Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(40.0);
        ui.spinner();
    });
}

fn show_no_data(ui: &mut egui::Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(40.0);
        ui.label(egui::RichText::new("No Data Found").size(18.0).weak());
    });
}

fn toast_color(kind: NotificationKind) -> egui::Color32 {
    match kind {
        NotificationKind::Error => egui::Color32::from_rgb(176, 42, 55),
        NotificationKind::Success => egui::Color32::from_rgb(25, 135, 84),
        NotificationKind::Info => egui::Color32::from_rgb(108, 117, 125),
    }
}

fn show_toasts(ctx: &egui::Context, queue: &NotificationQueue, actions: &mut Vec<Action>) {
    if queue.is_empty() {
        return;
    }

    egui::Area::new(egui::Id::new("notifications"))
        .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -12.0))
        .show(ctx, |ui| {
            for entry in queue.iter() {
                let notification = &entry.notification;
                egui::Frame::popup(ui.style())
                    .fill(toast_color(notification.kind))
                    .inner_margin(egui::Margin::same(10))
                    .show(ui, |ui| {
                        ui.set_width(280.0);
                        ui.horizontal(|ui| {
                            ui.label(egui::RichText::new(notification.kind.glyph()).color(egui::Color32::WHITE))
                                .on_hover_text(notification.kind.icon());
                            ui.label(
                                egui::RichText::new(notification.display_title())
                                    .strong()
                                    .color(egui::Color32::WHITE),
                            );
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                if ui.small_button("✖").clicked() {
                                    actions.push(Action::Dismiss(entry.id));
                                }
                            });
                        });
                        ui.label(egui::RichText::new(&notification.body).color(egui::Color32::WHITE));
                    });
                ui.add_space(6.0);
            }
        });
}

fn apply_style(ctx: &egui::Context, config: &AppConfig) {
    ctx.set_visuals(if config.dark_mode {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    });

    let size = config.font_size as f32;
    ctx.style_mut(|style| {
        for (text_style, font_id) in style.text_styles.iter_mut() {
            font_id.size = match text_style {
                egui::TextStyle::Heading => size * 1.45,
                egui::TextStyle::Small => size * 0.75,
                _ => size,
            };
        }
    });
}

impl eframe::App for MoviesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Process background task results (non-blocking)
        if let Some(view) = self.view.as_mut() {
            view.poll();

            let now = Instant::now();
            let queue = view.notifications_mut();
            queue.expire(now);
            if let Some(wait) = queue.next_expiry(now) {
                ctx.request_repaint_after(wait);
            }
        }

        let mut actions = Vec::new();

        egui::TopBottomPanel::top("nav").show(ctx, |ui| {
            ui.add_space(4.0);
            self.show_nav_bar(ui, &mut actions);
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| match &self.view {
            Some(View::List(view)) => self.show_list(ui, view, &mut actions),
            Some(View::Detail(view)) => self.show_detail(ui, view, &mut actions),
            None => show_loader(ui),
        });

        match &self.view {
            Some(View::List(view)) => show_toasts(ctx, view.notifications(), &mut actions),
            Some(View::Detail(view)) => show_toasts(ctx, view.notifications(), &mut actions),
            None => {}
        }

        for action in actions {
            self.apply(action);
        }
    }
}
