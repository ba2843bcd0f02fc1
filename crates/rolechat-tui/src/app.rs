use std::sync::Arc;
use ratatui::layout::Rect;
use ratatui::widgets::{ListState, Paragraph, Wrap};
use tokio::task::JoinHandle;
use crate::ui;
use rolechat_core::{
    templates_for, AIRole, ChatSession, Gate, GeminiClient, GenerationError, Generator, MessageId,
    Preferences, SettingsField, MODEL, ROLES,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    ApiKey,
    Roles,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Generation call running on a background task
pub struct ReplyTask {
    pub placeholder_id: MessageId,
    pub handle: JoinHandle<Result<String, GenerationError>>,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub prefs: Preferences,
    pub generator: Option<Arc<dyn Generator>>,
    pub status: Option<String>,

    // API key form
    pub api_key_input: String,
    pub api_key_cursor: usize,

    // Role selector
    pub role_state: ListState,

    // Chat state
    pub session: ChatSession,
    pub query_input: String,
    pub query_cursor: usize, // cursor position in query_input, in chars
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations
    pub chat_area: Option<Rect>,
    pub reply_task: Option<ReplyTask>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Settings panel
    pub show_settings: bool,
    pub settings_state: ListState,

    // Prompt template picker
    pub show_templates: bool,
    pub template_state: ListState,
}

impl App {
    pub fn new(prefs: Preferences) -> Self {
        let generator = prefs.api_key().map(connect);

        let mut role_state = ListState::default();
        let selected = prefs
            .selected_role()
            .and_then(|role| ROLES.iter().position(|r| r.id == role.id))
            .unwrap_or(0);
        role_state.select(Some(selected));

        let mut settings_state = ListState::default();
        settings_state.select(Some(0));

        let input_mode = match prefs.gate() {
            Gate::NeedsApiKey => InputMode::Editing,
            _ => InputMode::Normal,
        };

        Self {
            should_quit: false,
            input_mode,
            prefs,
            generator,
            status: None,

            api_key_input: String::new(),
            api_key_cursor: 0,

            role_state,

            session: ChatSession::new(),
            query_input: String::new(),
            query_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_area: None,
            reply_task: None,

            animation_frame: 0,

            show_settings: false,
            settings_state,

            show_templates: false,
            template_state: ListState::default(),
        }
    }

    pub fn screen(&self) -> Screen {
        match self.prefs.gate() {
            Gate::NeedsApiKey => Screen::ApiKey,
            Gate::NeedsRole => Screen::Roles,
            Gate::Chat(_) => Screen::Chat,
        }
    }

    pub fn active_role(&self) -> Option<&'static AIRole> {
        match self.prefs.gate() {
            Gate::Chat(role) => Some(role),
            _ => None,
        }
    }

    /// Remember the outcome of a preferences write for the footer
    fn record<T>(&mut self, result: anyhow::Result<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.status = None;
                Some(value)
            }
            Err(e) => {
                self.status = Some(format!("Could not save preferences: {}", e));
                None
            }
        }
    }

    // API key form
    pub fn submit_api_key(&mut self) {
        if self.api_key_input.trim().is_empty() {
            return;
        }
        let result = self.prefs.set_api_key(&self.api_key_input);
        self.record(result);
        self.generator = self.prefs.api_key().map(connect);
        self.api_key_input.clear();
        self.api_key_cursor = 0;
        self.input_mode = InputMode::Normal;
        tracing::info!("API key set");
    }

    /// Forget the key and the role; back to the key form
    pub fn sign_out(&mut self) {
        self.abandon_reply();
        self.session.reset();
        self.query_input.clear();
        self.query_cursor = 0;
        self.chat_scroll = 0;
        self.show_templates = false;
        let result = self.prefs.clear_api_key();
        self.record(result);
        self.generator = None;
        self.input_mode = InputMode::Editing;
        tracing::info!("signed out");
    }

    // Role selector
    pub fn role_nav_down(&mut self) {
        let len = ROLES.len();
        if len > 0 {
            let i = self.role_state.selected().unwrap_or(0);
            self.role_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn role_nav_up(&mut self) {
        let i = self.role_state.selected().unwrap_or(0);
        self.role_state.select(Some(i.saturating_sub(1)));
    }

    pub fn select_highlighted_role(&mut self) {
        let Some(role) = self.role_state.selected().and_then(|i| ROLES.get(i)) else {
            return;
        };
        let result = self.prefs.select_role(role.id);
        if self.record(result).is_some() {
            self.session.reset();
            self.chat_scroll = 0;
            self.template_state.select(None);
            self.input_mode = InputMode::Editing;
            tracing::info!(role = role.id, "role selected");
        }
    }

    pub fn change_role(&mut self) {
        self.abandon_reply();
        self.session.reset();
        self.chat_scroll = 0;
        self.show_templates = false;
        self.input_mode = InputMode::Normal;
        let result = self.prefs.clear_role();
        self.record(result);
    }

    // Chat
    pub fn submit_query(&mut self) {
        let Some(role) = self.active_role() else {
            return;
        };
        let Some(generator) = self.generator.clone() else {
            return;
        };
        let Some(turn) = self.session.begin_turn(&self.query_input, role) else {
            return;
        };

        self.query_input.clear();
        self.query_cursor = 0;
        self.input_mode = InputMode::Normal;

        // Scroll to bottom so "Thinking..." is visible
        self.scroll_chat_to_bottom();

        let config = self.prefs.generation_config();
        let history = turn.history;
        tracing::debug!(role = role.id, turns = history.len(), "submitting turn");
        let handle = tokio::spawn(async move { generator.generate(&history, MODEL, &config).await });

        self.reply_task = Some(ReplyTask {
            placeholder_id: turn.placeholder_id,
            handle,
        });
    }

    /// Collect a finished reply, if any, into the session log
    pub async fn poll_reply(&mut self) {
        let finished = self
            .reply_task
            .as_ref()
            .map(|task| task.handle.is_finished())
            .unwrap_or(false);
        if !finished {
            return;
        }
        let Some(task) = self.reply_task.take() else {
            return;
        };

        let outcome = match task.handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(GenerationError::Interrupted(e.to_string())),
        };
        self.session.finish_turn(task.placeholder_id, outcome);
        self.scroll_chat_to_bottom();
    }

    fn abandon_reply(&mut self) {
        if let Some(task) = self.reply_task.take() {
            task.handle.abort();
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.max_chat_scroll());
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_chat_to_bottom(&mut self) {
        self.chat_scroll = self.max_chat_scroll();
    }

    fn max_chat_scroll(&self) -> u16 {
        let visible_height = if self.chat_height > 0 { self.chat_height } else { 20 };
        self.chat_line_count().saturating_sub(visible_height)
    }

    /// Wrapped line count of the chat transcript, as the chat view renders it
    pub fn chat_line_count(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 { self.chat_width } else { 50 };
        let lines = ui::transcript_lines(self.session.messages(), self.animation_frame);
        let count = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .line_count(wrap_width);
        u16::try_from(count).unwrap_or(u16::MAX)
    }

    // Settings panel
    pub fn selected_setting(&self) -> SettingsField {
        let fields = SettingsField::all();
        self.settings_state
            .selected()
            .and_then(|i| fields.get(i).copied())
            .unwrap_or(SettingsField::Temperature)
    }

    pub fn settings_nav_down(&mut self) {
        let i = self.settings_state.selected().unwrap_or(0);
        self.settings_state.select(Some((i + 1).min(SettingsField::all().len() - 1)));
    }

    pub fn settings_nav_up(&mut self) {
        let i = self.settings_state.selected().unwrap_or(0);
        self.settings_state.select(Some(i.saturating_sub(1)));
    }

    pub fn adjust_setting(&mut self, steps: i32) {
        let field = self.selected_setting();
        let config = self.prefs.generation_config().adjust(field, steps);
        let result = self.prefs.set_generation_config(config);
        self.record(result);
    }

    // Prompt templates
    pub fn toggle_templates(&mut self) {
        let Some(role) = self.active_role() else {
            return;
        };
        if templates_for(role.id).is_empty() {
            return;
        }
        self.show_templates = !self.show_templates;
        if self.show_templates && self.template_state.selected().is_none() {
            self.template_state.select(Some(0));
        }
    }

    pub fn template_nav_down(&mut self) {
        let len = self.active_role().map(|r| templates_for(r.id).len()).unwrap_or(0);
        if len > 0 {
            let i = self.template_state.selected().unwrap_or(0);
            self.template_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn template_nav_up(&mut self) {
        let i = self.template_state.selected().unwrap_or(0);
        self.template_state.select(Some(i.saturating_sub(1)));
    }

    /// Replace the input with the highlighted template's prompt
    pub fn apply_template(&mut self) {
        let Some(role) = self.active_role() else {
            return;
        };
        let template = self
            .template_state
            .selected()
            .and_then(|i| templates_for(role.id).get(i));
        if let Some(template) = template {
            self.query_input = template.prompt.to_string();
            self.query_cursor = self.query_input.chars().count();
            self.show_templates = false;
            if !self.session.is_busy() {
                self.input_mode = InputMode::Editing;
            }
        }
    }
}

fn connect(api_key: &str) -> Arc<dyn Generator> {
    Arc::new(GeminiClient::new(api_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rolechat_core::{GenerationConfig, HistoryEntry, MessageRole};
    use std::time::Duration;

    struct EchoGenerator;

    #[async_trait]
    impl Generator for EchoGenerator {
        async fn generate(
            &self,
            history: &[HistoryEntry],
            _model: &str,
            _config: &GenerationConfig,
        ) -> Result<String, GenerationError> {
            let last = history.last().map(|h| h.text.clone()).unwrap_or_default();
            Ok(format!("echo: {}", last))
        }
    }

    fn chat_app(dir: &tempfile::TempDir) -> App {
        let mut prefs = Preferences::load_from(dir.path().join("config.json"));
        prefs.set_api_key("test-key").unwrap();
        prefs.select_role("general-assistant").unwrap();
        let mut app = App::new(prefs);
        app.generator = Some(Arc::new(EchoGenerator));
        app
    }

    async fn wait_for_reply(app: &mut App) {
        for _ in 0..100 {
            app.poll_reply().await;
            if app.reply_task.is_none() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("reply never arrived");
    }

    #[test]
    fn test_screen_follows_preferences() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences::load_from(dir.path().join("config.json"));
        let mut app = App::new(prefs);
        assert_eq!(app.screen(), Screen::ApiKey);
        assert_eq!(app.input_mode, InputMode::Editing);

        app.api_key_input = "  my-key ".into();
        app.submit_api_key();
        assert_eq!(app.screen(), Screen::Roles);
        assert!(app.generator.is_some());

        app.role_state.select(Some(1));
        app.select_highlighted_role();
        assert_eq!(app.screen(), Screen::Chat);
        assert_eq!(app.active_role().map(|r| r.id), Some(ROLES[1].id));
    }

    #[test]
    fn test_blank_api_key_does_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences::load_from(dir.path().join("config.json"));
        let mut app = App::new(prefs);
        app.api_key_input = "   ".into();
        app.submit_api_key();
        assert_eq!(app.screen(), Screen::ApiKey);
    }

    #[tokio::test]
    async fn test_submit_query_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = chat_app(&dir);

        app.query_input = "Hello".into();
        app.query_cursor = 5;
        app.submit_query();

        assert!(app.query_input.is_empty());
        assert!(app.session.is_busy());
        assert_eq!(app.session.messages().len(), 2);
        assert!(app.session.messages()[1].is_loading);

        wait_for_reply(&mut app).await;

        let log = app.session.messages();
        assert_eq!(log[1].role, MessageRole::Model);
        assert_eq!(log[1].content, "echo: Hello");
        assert!(!app.session.is_busy());
    }

    #[tokio::test]
    async fn test_submit_while_busy_keeps_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = chat_app(&dir);

        app.query_input = "first".into();
        app.submit_query();
        app.query_input = "second".into();
        app.submit_query();

        assert_eq!(app.session.messages().len(), 2);
        assert_eq!(app.query_input, "second");
        wait_for_reply(&mut app).await;
    }

    #[tokio::test]
    async fn test_sign_out_clears_role_and_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = chat_app(&dir);
        app.query_input = "Hello".into();
        app.submit_query();

        app.sign_out();
        assert_eq!(app.screen(), Screen::ApiKey);
        assert!(app.prefs.selected_role().is_none());
        assert!(app.session.messages().is_empty());
        assert!(app.reply_task.is_none());
        assert!(app.generator.is_none());
    }

    #[test]
    fn test_change_role_returns_to_selector() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = chat_app(&dir);
        app.change_role();
        assert_eq!(app.screen(), Screen::Roles);
        assert!(app.prefs.api_key().is_some());
    }

    #[test]
    fn test_apply_template_fills_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = chat_app(&dir);
        app.toggle_templates();
        assert!(app.show_templates);
        app.template_nav_down();
        app.apply_template();

        assert!(!app.show_templates);
        assert_eq!(app.query_input, templates_for("general-assistant")[1].prompt);
        assert_eq!(app.query_cursor, app.query_input.chars().count());
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[test]
    fn test_adjust_setting_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = chat_app(&dir);
        app.settings_nav_down(); // Top P
        app.settings_nav_down(); // Top K
        app.adjust_setting(-5);
        assert_eq!(app.prefs.generation_config().top_k, 35);

        let reloaded = Preferences::load_from(dir.path().join("config.json"));
        assert_eq!(reloaded.generation_config().top_k, 35);
    }

    #[test]
    fn test_line_count_follows_rendered_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = chat_app(&dir);
        let role = app.active_role().unwrap();
        let turn = app.session.begin_turn("Hi", role).unwrap();
        app.session
            .finish_turn(turn.placeholder_id, Ok("```rust\nfn main() {}\n```".into()));

        // "You:", "Hi", blank, "AI:", language tag, code line, blank
        assert_eq!(app.chat_line_count(), 7);
    }

    #[test]
    fn test_scroll_to_bottom_reaches_long_wrapped_reply() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = chat_app(&dir);
        app.chat_width = 20;
        app.chat_height = 5;
        let role = app.active_role().unwrap();
        let turn = app.session.begin_turn("Hi", role).unwrap();
        let reply = "lengthy ".repeat(30);
        app.session.finish_turn(turn.placeholder_id, Ok(reply));

        // 240 chars at width 20 is at least 12 rows even with perfect packing
        let count = app.chat_line_count();
        assert!(count >= 3 + 1 + 12 + 1);

        app.scroll_chat_to_bottom();
        assert_eq!(app.chat_scroll, count - app.chat_height);
    }
}
