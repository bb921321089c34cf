use eframe::egui;
use egui::{Color32, CornerRadius, RichText, ScrollArea, Stroke, Ui, ViewportBuilder};
use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use hack_or_snooze::config::{ClientConfig, Opts};
use hack_or_snooze::db::Database;
use hack_or_snooze::views::{self, Listing, StoryRow};
use hack_or_snooze::worker::{spawn_job, Job, Outcome};
use hack_or_snooze::{AppState, HttpStoryApi, NewStory, StoryApi, StoryId};

fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}

fn open_database(config: &ClientConfig) -> Result<Database> {
    let path = config.database_path();
    match Database::open(&path) {
        Ok(db) => Ok(db),
        Err(e) => {
            // Still usable, just forgets the login on exit
            warn!(path = %path.display(), error = %e, "Falling back to in-memory credential store");
            Ok(Database::open_in_memory()?)
        }
    }
}

fn main() -> Result<()> {
    init_logging()?;

    let config = ClientConfig::from_opts(Opts::parse())?;
    info!(base_url = %config.base_url, "Starting");

    let api: Arc<dyn StoryApi> =
        Arc::new(HttpStoryApi::new(&config).context("Could not create the API client")?);
    let database = open_database(&config)?;

    let options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_inner_size([1000.0, 760.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Hack or Snooze"),
        ..Default::default()
    };

    eframe::run_native(
        "Hack or Snooze",
        options,
        Box::new(move |cc| {
            let mut app = HackOrSnoozeApp::new(api, database);

            if let Some(storage) = cc.storage {
                // Try to load saved theme preference
                if let Some(theme_str) = storage.get_string("is_dark_mode") {
                    if let Ok(is_dark_mode) = theme_str.parse::<bool>() {
                        app.set_dark_mode(is_dark_mode);
                    }
                }
            }

            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow!("UI error: {e}"))
}

struct AppTheme {
    background: Color32,
    card_background: Color32,
    text: Color32,
    secondary_text: Color32,
    highlight: Color32,
    separator: Color32,
    error_background: Color32,
    button_background: Color32,
    button_foreground: Color32,
    button_active_background: Color32,
    button_hover_background: Color32,
}

impl AppTheme {
    fn dark() -> Self {
        Self {
            background: Color32::from_rgb(18, 18, 18),
            card_background: Color32::from_rgb(30, 30, 30),
            text: Color32::from_rgb(240, 240, 240),
            secondary_text: Color32::from_rgb(180, 180, 180),
            highlight: Color32::from_rgb(255, 102, 0),
            separator: Color32::from_rgb(60, 60, 60),
            error_background: Color32::from_rgb(110, 30, 30),
            button_background: Color32::from_rgb(66, 66, 66),
            button_foreground: Color32::from_rgb(240, 240, 240),
            button_active_background: Color32::from_rgb(255, 102, 0),
            button_hover_background: Color32::from_rgb(80, 80, 80),
        }
    }

    fn light() -> Self {
        Self {
            background: Color32::from_rgb(245, 245, 245),
            card_background: Color32::from_rgb(255, 255, 255),
            text: Color32::from_rgb(20, 20, 20),
            secondary_text: Color32::from_rgb(90, 90, 90),
            highlight: Color32::from_rgb(235, 92, 0),
            separator: Color32::from_rgb(200, 200, 200),
            error_background: Color32::from_rgb(250, 215, 215),
            button_background: Color32::from_rgb(235, 235, 235),
            button_foreground: Color32::from_rgb(20, 20, 20),
            button_active_background: Color32::from_rgb(235, 92, 0),
            button_hover_background: Color32::from_rgb(210, 210, 210),
        }
    }

    fn apply_to_ctx(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();

        style.visuals.panel_fill = self.background;
        style.visuals.window_fill = self.card_background;
        style.visuals.window_stroke = Stroke::new(1.0, self.separator);
        style.visuals.widgets.noninteractive.bg_fill = self.card_background;
        style.visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, self.text);

        style.visuals.widgets.inactive.bg_fill = self.button_background;
        style.visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, self.button_foreground);
        style.visuals.widgets.active.bg_fill = self.button_active_background;
        style.visuals.widgets.active.fg_stroke = Stroke::new(1.0, self.button_foreground);
        style.visuals.widgets.hovered.bg_fill = self.button_hover_background;
        style.visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, self.button_foreground);

        style.visuals.selection.bg_fill = self.highlight;
        style.visuals.selection.stroke = Stroke::new(1.0, self.highlight);

        style.visuals.window_corner_radius = CornerRadius::same(8);
        style.visuals.widgets.inactive.corner_radius = CornerRadius::same(4);
        style.visuals.widgets.hovered.corner_radius = CornerRadius::same(4);
        style.visuals.widgets.active.corner_radius = CornerRadius::same(4);

        ctx.set_style(style);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    AllStories,
    Submit,
    Favorites,
    MyStories,
    Login,
    Profile,
}

#[derive(Default)]
struct LoginForm {
    username: String,
    password: String,
}

#[derive(Default)]
struct SignupForm {
    name: String,
    username: String,
    password: String,
}

#[derive(Default)]
struct StoryForm {
    author: String,
    title: String,
    url: String,
}

/// Something clicked on a story card, handled once the card is drawn.
enum RowAction {
    Open(String),
    Copy(String),
    ToggleFavorite(StoryId),
    Delete(StoryId),
}

/// What to do in the UI once an outcome has been applied successfully.
enum FollowUp {
    LoggedIn,
    StorySubmitted,
}

struct HackOrSnoozeApp {
    api: Arc<dyn StoryApi>,
    database: Database,
    state: AppState,
    theme: AppTheme,
    is_dark_mode: bool,
    page: Page,
    outcome_tx: Sender<Outcome>,
    outcome_rx: Receiver<Outcome>,
    in_flight: usize,
    loading_stories: bool,
    signing_in: bool,
    submitting_story: bool,
    pending_favorites: HashSet<StoryId>,
    pending_deletes: HashSet<StoryId>,
    error_message: Option<String>,
    login_form: LoginForm,
    signup_form: SignupForm,
    story_form: StoryForm,
}

impl HackOrSnoozeApp {
    fn new(api: Arc<dyn StoryApi>, database: Database) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel();

        let mut app = Self {
            api,
            database,
            state: AppState::default(),
            theme: AppTheme::dark(),
            is_dark_mode: true,
            page: Page::AllStories,
            outcome_tx,
            outcome_rx,
            in_flight: 0,
            loading_stories: false,
            signing_in: false,
            submitting_story: false,
            pending_favorites: HashSet::new(),
            pending_deletes: HashSet::new(),
            error_message: None,
            login_form: LoginForm::default(),
            signup_form: SignupForm::default(),
            story_form: StoryForm::default(),
        };

        // "Remember" the user from the last run, if any
        if let Some(job) = app.state.restore_job(&app.database) {
            app.dispatch(job);
        }

        app.load_stories();
        app
    }

    fn set_dark_mode(&mut self, is_dark_mode: bool) {
        self.is_dark_mode = is_dark_mode;
        self.theme = if is_dark_mode {
            AppTheme::dark()
        } else {
            AppTheme::light()
        };
    }

    fn toggle_theme(&mut self) {
        self.set_dark_mode(!self.is_dark_mode);
    }

    fn dispatch(&mut self, job: Job) {
        debug!(job = job.name(), "Dispatching job");
        self.in_flight += 1;
        spawn_job(self.api.clone(), job, self.outcome_tx.clone());
    }

    fn load_stories(&mut self) {
        if self.loading_stories {
            return;
        }
        self.loading_stories = true;
        self.dispatch(Job::LoadStories);
    }

    fn show_error(&mut self, message: String) {
        warn!(%message, "Showing error");
        self.error_message = Some(message);
    }

    fn show_page(&mut self, page: Page) {
        debug!(?page, "Switching page");
        if page == Page::Submit {
            self.story_form = StoryForm::default();
        }
        self.page = page;
    }

    /// Applies every outcome the workers have sent since the last frame.
    fn check_outcomes(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);

            let follow_up = match &outcome {
                Outcome::StoriesLoaded(_) => {
                    self.loading_stories = false;
                    None
                }
                Outcome::SignedIn(result) => {
                    self.signing_in = false;
                    result.is_ok().then_some(FollowUp::LoggedIn)
                }
                Outcome::StorySubmitted { result, .. } => {
                    self.submitting_story = false;
                    result.is_ok().then_some(FollowUp::StorySubmitted)
                }
                Outcome::StoryDeleted { story_id, .. } => {
                    self.pending_deletes.remove(story_id);
                    None
                }
                Outcome::FavoriteToggled { request, .. } => {
                    self.pending_favorites.remove(&request.story_id);
                    None
                }
                Outcome::Restored { .. } => None,
            };

            match self.state.apply(outcome, &self.database) {
                Ok(()) => match follow_up {
                    Some(FollowUp::LoggedIn) => {
                        self.login_form = LoginForm::default();
                        self.signup_form = SignupForm::default();
                        self.show_page(Page::AllStories);
                    }
                    Some(FollowUp::StorySubmitted) => {
                        self.story_form = StoryForm::default();
                        self.show_page(Page::AllStories);
                    }
                    None => {}
                },
                Err(e) => self.show_error(e.to_string()),
            }
        }
    }

    fn handle_row_action(&mut self, action: RowAction) {
        match action {
            RowAction::Open(url) => self.open_link(&url),
            RowAction::Copy(url) => self.copy_link(&url),
            RowAction::ToggleFavorite(story_id) => {
                if self.pending_favorites.contains(&story_id) {
                    debug!(%story_id, "Favorite toggle already in flight");
                    return;
                }
                match self.state.toggle_favorite_job(&story_id) {
                    Ok(job) => {
                        self.pending_favorites.insert(story_id);
                        self.dispatch(job);
                    }
                    Err(e) => self.show_error(e.to_string()),
                }
            }
            RowAction::Delete(story_id) => {
                if self.pending_deletes.contains(&story_id) {
                    return;
                }
                match self.state.delete_story_job(story_id.clone()) {
                    Ok(job) => {
                        self.pending_deletes.insert(story_id);
                        self.dispatch(job);
                    }
                    Err(e) => self.show_error(e.to_string()),
                }
            }
        }
    }

    fn open_link(&self, url: &str) {
        if let Err(e) = open::that(url) {
            warn!(url, error = %e, "Failed to open URL");
        }
    }

    fn copy_link(&self, url: &str) {
        match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(url.to_string())) {
            Ok(()) => debug!(url, "Copied link"),
            Err(e) => warn!(error = %e, "Failed to copy link"),
        }
    }

    fn logout(&mut self) {
        if let Err(e) = self.state.logout(&self.database) {
            self.show_error(e.to_string());
        }
        self.pending_favorites.clear();
        self.pending_deletes.clear();
        self.show_page(Page::AllStories);
    }

    fn submit_login(&mut self) {
        self.signing_in = true;
        self.dispatch(Job::Login {
            username: self.login_form.username.trim().to_string(),
            password: self.login_form.password.clone(),
        });
    }

    fn submit_signup(&mut self) {
        self.signing_in = true;
        self.dispatch(Job::Signup {
            username: self.signup_form.username.trim().to_string(),
            password: self.signup_form.password.clone(),
            name: self.signup_form.name.trim().to_string(),
        });
    }

    fn submit_story(&mut self) {
        let story = NewStory {
            title: self.story_form.title.trim().to_string(),
            author: self.story_form.author.trim().to_string(),
            url: self.story_form.url.trim().to_string(),
        };

        match self.state.submit_story_job(story) {
            Ok(job) => {
                self.submitting_story = true;
                self.dispatch(job);
            }
            Err(e) => self.show_error(e.to_string()),
        }
    }

    fn nav_button(&self, ui: &mut Ui, label: &str, active: bool) -> bool {
        let text = if active {
            RichText::new(label).size(15.0).color(self.theme.highlight).strong()
        } else {
            RichText::new(label).size(15.0).color(self.theme.secondary_text)
        };

        let response = ui.add(
            egui::Button::new(text)
                .fill(if active {
                    self.theme.card_background
                } else {
                    Color32::TRANSPARENT
                })
                .stroke(if active {
                    Stroke::new(2.0, self.theme.highlight)
                } else {
                    Stroke::NONE
                })
                .corner_radius(CornerRadius::same(6)),
        );

        if response.hovered() {
            ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::PointingHand);
        }
        response.clicked()
    }

    fn render_nav(&mut self, ui: &mut Ui) {
        let nav = views::nav(&self.state);

        ui.horizontal(|ui| {
            ui.label(
                RichText::new("Hack or Snooze")
                    .color(self.theme.highlight)
                    .size(20.0)
                    .strong(),
            );
            ui.add_space(12.0);

            if self.nav_button(ui, "All stories", self.page == Page::AllStories) {
                self.show_page(Page::AllStories);
            }

            if nav.show_user_links {
                if self.nav_button(ui, "Submit", self.page == Page::Submit) {
                    self.show_page(Page::Submit);
                }
                if self.nav_button(ui, "Favorites", self.page == Page::Favorites) {
                    self.show_page(Page::Favorites);
                }
                if self.nav_button(ui, "My stories", self.page == Page::MyStories) {
                    self.show_page(Page::MyStories);
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let theme_icon = if self.is_dark_mode { "☀" } else { "☾" };
                if ui.button(theme_icon).clicked() {
                    self.toggle_theme();
                }

                match &nav.logged_in_as {
                    Some(username) => {
                        if self.nav_button(ui, "Log out", false) {
                            self.logout();
                        }
                        if self.nav_button(ui, username, self.page == Page::Profile) {
                            self.show_page(Page::Profile);
                        }
                    }
                    None => {
                        if self.nav_button(ui, "Login / Signup", self.page == Page::Login) {
                            self.show_page(Page::Login);
                        }
                    }
                }

                if self.in_flight > 0 {
                    ui.spinner();
                }
            });
        });
    }

    fn render_error_banner(&mut self, ui: &mut Ui) {
        let Some(message) = self.error_message.clone() else {
            return;
        };

        egui::Frame::new()
            .fill(self.theme.error_background)
            .corner_radius(CornerRadius::same(6))
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(message).color(self.theme.text));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Dismiss").clicked() {
                            self.error_message = None;
                        }
                    });
                });
            });
        ui.add_space(6.0);
    }

    fn render_story_card(&self, ui: &mut Ui, row: &StoryRow, action: &mut Option<RowAction>) {
        egui::Frame::new()
            .fill(self.theme.card_background)
            .corner_radius(CornerRadius::same(8))
            .stroke(Stroke::new(1.0, self.theme.separator))
            .inner_margin(12.0)
            .outer_margin(egui::vec2(8.0, 6.0))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    if row.deletable {
                        if self.pending_deletes.contains(&row.id) {
                            ui.spinner();
                        } else if ui.button("Delete").clicked() {
                            *action = Some(RowAction::Delete(row.id.clone()));
                        }
                    }

                    // Star only when someone is logged in
                    if let Some(is_favorite) = row.favorite {
                        if self.pending_favorites.contains(&row.id) {
                            ui.spinner();
                        } else {
                            let star = if is_favorite {
                                RichText::new("★").color(self.theme.highlight).size(18.0)
                            } else {
                                RichText::new("☆").color(self.theme.secondary_text).size(18.0)
                            };
                            let star_btn = ui.add(egui::Button::new(star).frame(false));
                            if star_btn.clicked() {
                                *action = Some(RowAction::ToggleFavorite(row.id.clone()));
                            }
                        }
                    }

                    let title_label = ui.add(
                        egui::Label::new(
                            RichText::new(&row.title)
                                .color(self.theme.text)
                                .size(16.0)
                                .strong(),
                        )
                        .sense(egui::Sense::click()),
                    );
                    if title_label.clicked() && !row.url.is_empty() {
                        *action = Some(RowAction::Open(row.url.clone()));
                    }
                    if title_label.hovered() {
                        ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::PointingHand);
                    }

                    ui.label(
                        RichText::new(row.host_label())
                            .color(self.theme.secondary_text)
                            .italics(),
                    );
                });

                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(format!("by {}", row.author))
                            .color(self.theme.secondary_text)
                            .size(14.0),
                    );
                    ui.add_space(8.0);
                    ui.label(
                        RichText::new(format!("posted by {}", row.posted_by))
                            .color(self.theme.secondary_text)
                            .size(14.0),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("Copy link").clicked() {
                            *action = Some(RowAction::Copy(row.url.clone()));
                        }
                    });
                });
            });
    }

    fn render_story_list(&mut self, ui: &mut Ui, listing: Listing) {
        let rows = views::listing(&self.state, listing);

        if rows.is_empty() {
            let message = match listing {
                Listing::AllStories if self.loading_stories => "Loading stories...",
                Listing::AllStories => "No stories yet.",
                Listing::Favorites => "No favorites added!",
                Listing::OwnStories => "No stories added by user yet!",
            };
            ui.vertical_centered(|ui| {
                ui.add_space(20.0);
                ui.label(
                    RichText::new(message)
                        .color(self.theme.secondary_text)
                        .size(18.0)
                        .italics(),
                );
            });
            return;
        }

        let mut action = None;
        ScrollArea::vertical()
            .id_salt(listing_salt(listing))
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                for row in &rows {
                    self.render_story_card(ui, row, &mut action);
                }
            });

        if let Some(action) = action {
            self.handle_row_action(action);
        }
    }

    fn render_story_form(&mut self, ui: &mut Ui) {
        ui.heading("Submit a story");
        ui.add_space(6.0);

        egui::Grid::new("story_form")
            .num_columns(2)
            .spacing([8.0, 8.0])
            .show(ui, |ui| {
                ui.label("Author");
                ui.add(
                    egui::TextEdit::singleline(&mut self.story_form.author)
                        .hint_text("author name")
                        .desired_width(360.0),
                );
                ui.end_row();

                ui.label("Title");
                ui.add(
                    egui::TextEdit::singleline(&mut self.story_form.title)
                        .hint_text("story title")
                        .desired_width(360.0),
                );
                ui.end_row();

                ui.label("URL");
                ui.add(
                    egui::TextEdit::singleline(&mut self.story_form.url)
                        .hint_text("story url")
                        .desired_width(360.0),
                );
                ui.end_row();
            });

        let complete = [&self.story_form.author, &self.story_form.title, &self.story_form.url]
            .iter()
            .all(|field| !field.trim().is_empty());

        ui.horizontal(|ui| {
            if ui
                .add_enabled(complete && !self.submitting_story, egui::Button::new("Submit"))
                .clicked()
            {
                self.submit_story();
            }
            if self.submitting_story {
                ui.spinner();
            }
        });
        ui.separator();
    }

    fn render_login_page(&mut self, ui: &mut Ui) {
        ui.heading("Login");
        egui::Grid::new("login_form")
            .num_columns(2)
            .spacing([8.0, 8.0])
            .show(ui, |ui| {
                ui.label("Username");
                ui.add(egui::TextEdit::singleline(&mut self.login_form.username).desired_width(260.0));
                ui.end_row();

                ui.label("Password");
                ui.add(
                    egui::TextEdit::singleline(&mut self.login_form.password)
                        .password(true)
                        .desired_width(260.0),
                );
                ui.end_row();
            });

        let can_login = !self.signing_in
            && !self.login_form.username.trim().is_empty()
            && !self.login_form.password.is_empty();
        if ui.add_enabled(can_login, egui::Button::new("Login")).clicked() {
            self.submit_login();
        }

        ui.add_space(16.0);
        ui.separator();

        ui.heading("Create account");
        egui::Grid::new("signup_form")
            .num_columns(2)
            .spacing([8.0, 8.0])
            .show(ui, |ui| {
                ui.label("Name");
                ui.add(egui::TextEdit::singleline(&mut self.signup_form.name).desired_width(260.0));
                ui.end_row();

                ui.label("Username");
                ui.add(egui::TextEdit::singleline(&mut self.signup_form.username).desired_width(260.0));
                ui.end_row();

                ui.label("Password");
                ui.add(
                    egui::TextEdit::singleline(&mut self.signup_form.password)
                        .password(true)
                        .desired_width(260.0),
                );
                ui.end_row();
            });

        let can_signup = !self.signing_in
            && !self.signup_form.name.trim().is_empty()
            && !self.signup_form.username.trim().is_empty()
            && !self.signup_form.password.is_empty();
        if ui.add_enabled(can_signup, egui::Button::new("Create account")).clicked() {
            self.submit_signup();
        }

        if self.signing_in {
            ui.spinner();
        }
    }

    fn render_profile(&self, ui: &mut Ui) {
        let Some(profile) = views::profile(&self.state) else {
            ui.label("Not logged in.");
            return;
        };

        ui.heading("User Profile Info");
        ui.add_space(8.0);
        ui.label(RichText::new(format!("Name: {}", profile.name)).color(self.theme.text));
        ui.label(RichText::new(format!("Username: {}", profile.username)).color(self.theme.text));
        ui.label(
            RichText::new(format!("Account Created: {}", profile.created_label()))
                .color(self.theme.text),
        );
    }
}

fn listing_salt(listing: Listing) -> &'static str {
    match listing {
        Listing::AllStories => "all_stories",
        Listing::Favorites => "favorite_stories",
        Listing::OwnStories => "own_stories",
    }
}

impl eframe::App for HackOrSnoozeApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        storage.set_string("is_dark_mode", self.is_dark_mode.to_string());
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.theme.apply_to_ctx(ctx);

        self.check_outcomes();

        // Pages that need a user fall back once the user is gone
        let needs_user = matches!(
            self.page,
            Page::Submit | Page::Favorites | Page::MyStories | Page::Profile
        );
        if needs_user && !self.state.session.is_authenticated() {
            self.page = Page::AllStories;
        }

        egui::TopBottomPanel::top("nav_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            self.render_nav(ui);
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_error_banner(ui);

            match self.page {
                Page::AllStories => self.render_story_list(ui, Listing::AllStories),
                Page::Submit => {
                    self.render_story_form(ui);
                    self.render_story_list(ui, Listing::AllStories);
                }
                Page::Favorites => self.render_story_list(ui, Listing::Favorites),
                Page::MyStories => self.render_story_list(ui, Listing::OwnStories),
                Page::Login => self.render_login_page(ui),
                Page::Profile => self.render_profile(ui),
            }
        });

        // Keep polling while workers are busy
        if self.in_flight > 0 {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
