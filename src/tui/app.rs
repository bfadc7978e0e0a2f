//! Main TUI application state and event loop.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::collections::HashMap;
use std::io;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::forms::{FormKind, FormState};
use super::input::{key_to_action, Action};
use super::route::Route;
use super::theme::Theme;
use super::ui;
use crate::api::types::{ConversationTurn, ModelParameters, MultiChatResponse};
use crate::api::Services;
use crate::bus::{self, NoticeLevel, SessionEvent};
use crate::config::Config;
use crate::error::ApiResult;
use crate::store::{
    conversation, ConversationStore, ImplStore, KeyStore, ModelStore, MoveDirection, PresetStore,
    ProviderStore, QuotaStore,
};

/// Active dialog type
#[derive(Debug, Clone, PartialEq)]
pub enum DialogKind {
    ConversationSelector,
    /// Multi-select picker for the implementations a chat message fans out to.
    ImplementationPicker,
    /// Single-select provider picker feeding the implementation form.
    ProviderPicker,
    PresetSelector,
    Confirm(ConfirmAction),
    Help,
}

/// Destructive action awaiting confirmation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmAction {
    DeleteProvider(Uuid),
    DeleteKey(Uuid),
    DeleteQuota { provider_id: Uuid, quota_id: Uuid },
    DeleteModel(Uuid),
    DeleteImplementation(Uuid),
    DeleteConversation(Uuid),
    DeleteTurn(Uuid),
    DeleteResponse { turn_id: Uuid, response_id: Uuid },
}

/// Item for selection dialogs
#[derive(Debug, Clone)]
pub struct SelectItem {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    /// Checked state in multi-select pickers.
    pub checked: bool,
}

/// Dialog state for selection and confirmation dialogs
#[derive(Debug, Clone)]
pub struct DialogState {
    pub kind: DialogKind,
    pub title: String,
    pub items: Vec<SelectItem>,
    pub selected_index: usize,
    pub search_query: String,
    pub filtered_indices: Vec<usize>,
    pub message: Option<String>,
}

impl DialogState {
    pub fn new(kind: DialogKind, title: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            items: Vec::new(),
            selected_index: 0,
            search_query: String::new(),
            filtered_indices: Vec::new(),
            message: None,
        }
    }

    pub fn with_items(mut self, items: Vec<SelectItem>) -> Self {
        self.filtered_indices = (0..items.len()).collect();
        self.items = items;
        self
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    pub fn update_filter(&mut self) {
        use fuzzy_matcher::FuzzyMatcher;

        if self.search_query.is_empty() {
            self.filtered_indices = (0..self.items.len()).collect();
        } else {
            let matcher = fuzzy_matcher::skim::SkimMatcherV2::default();

            // Score each item and filter
            let mut scored_items: Vec<(usize, i64)> = self
                .items
                .iter()
                .enumerate()
                .filter_map(|(idx, item)| {
                    let label_score = matcher.fuzzy_match(&item.label, &self.search_query);
                    let desc_score = item
                        .description
                        .as_ref()
                        .and_then(|d| matcher.fuzzy_match(d, &self.search_query));

                    let best_score = [label_score, desc_score].into_iter().flatten().max()?;
                    Some((idx, best_score))
                })
                .collect();

            // Sort by score (descending)
            scored_items.sort_by(|a, b| b.1.cmp(&a.1));

            self.filtered_indices = scored_items.into_iter().map(|(idx, _)| idx).collect();
        }
        self.selected_index = 0;
    }

    pub fn selected_item(&self) -> Option<&SelectItem> {
        self.filtered_indices
            .get(self.selected_index)
            .and_then(|&i| self.items.get(i))
    }

    pub fn selected_item_mut(&mut self) -> Option<&mut SelectItem> {
        let index = self.filtered_indices.get(self.selected_index).copied()?;
        self.items.get_mut(index)
    }

    pub fn move_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.selected_index + 1 < self.filtered_indices.len() {
            self.selected_index += 1;
        }
    }
}

/// Which pane has focus on a master-detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    List,
    Detail,
}

/// Application state
pub struct App {
    pub config: Config,
    pub services: Services,
    pub theme: Theme,
    pub route: Route,
    pub should_quit: bool,
    pub spinner_frame: usize,
    /// Last bus notice shown in the status bar.
    pub notice: Option<(NoticeLevel, String)>,
    /// Ticks since the notice appeared; it is dismissed after a few seconds.
    notice_ticks: u32,
    pub dialog: Option<DialogState>,
    pub form: Option<FormState>,

    // Providers page
    pub providers: ProviderStore,
    pub keys: KeyStore,
    pub quotas: QuotaStore,
    pub provider_index: usize,
    pub key_index: usize,
    pub provider_pane: Pane,

    // Models page
    pub models: ModelStore,
    pub implementations: ImplStore,
    pub model_index: usize,
    pub impl_index: usize,
    pub model_pane: Pane,

    // Chat page
    pub chat: ConversationStore,
    pub presets: PresetStore,
    pub chat_input: String,
    /// Implementations the next message fans out to.
    pub selected_impls: Vec<Uuid>,
    /// Display labels for the selected implementations.
    pub impl_labels: HashMap<Uuid, String>,
    pub parameters: ModelParameters,
    pub turn_index: usize,
    pub response_index: usize,

    bus_rx: broadcast::Receiver<SessionEvent>,
}

/// Application events produced by spawned tasks
#[derive(Debug)]
pub enum AppEvent {
    TurnsLoaded {
        generation: u64,
        result: ApiResult<Vec<ConversationTurn>>,
    },
    SendFinished {
        generation: u64,
        temp_id: String,
        result: ApiResult<MultiChatResponse>,
    },
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let services = Services::from_config(&config)?;
        let theme = Theme::from_name(config.theme.as_deref().unwrap_or("dark"));
        let parameters = config.parameters.clone().unwrap_or_default();
        let bus_rx = bus::global().subscribe();

        Ok(Self {
            config,
            services,
            theme,
            route: Route::Dashboard,
            should_quit: false,
            spinner_frame: 0,
            notice: None,
            notice_ticks: 0,
            dialog: None,
            form: None,
            providers: ProviderStore::default(),
            keys: KeyStore::default(),
            quotas: QuotaStore::default(),
            provider_index: 0,
            key_index: 0,
            provider_pane: Pane::List,
            models: ModelStore::default(),
            implementations: ImplStore::default(),
            model_index: 0,
            impl_index: 0,
            model_pane: Pane::List,
            chat: ConversationStore::default(),
            presets: PresetStore::default(),
            chat_input: String::new(),
            selected_impls: Vec::new(),
            impl_labels: HashMap::new(),
            parameters,
            turn_index: 0,
            response_index: 0,
            bus_rx,
        })
    }

    /// Fetch every collection once at startup. Returns the conversation to
    /// load turns for, if any.
    pub async fn initial_load(&mut self) -> Option<(u64, Uuid)> {
        let services = self.services.clone();
        self.providers.fetch(&services).await;
        self.models.fetch(&services).await;
        self.presets.fetch(&services).await;
        let generation = self.chat.fetch_conversations(&services).await?;
        let id = self.chat.selected?;
        Some((generation, id))
    }

    pub fn busy(&self) -> bool {
        self.providers.loading
            || self.keys.loading
            || self.models.loading
            || self.implementations.loading
            || self.presets.loading
            || self.chat.loading
            || self.chat.sending
    }

    pub fn selected_provider(&self) -> Option<&crate::api::types::Provider> {
        self.providers.providers.get(self.provider_index)
    }

    pub fn selected_model(&self) -> Option<&crate::api::types::Model> {
        self.models.models.get(self.model_index)
    }

    pub fn selected_turn(&self) -> Option<&crate::store::TurnState> {
        self.chat.turns.get(self.turn_index)
    }

    fn clamp_selections(&mut self) {
        self.provider_index = self
            .provider_index
            .min(self.providers.providers.len().saturating_sub(1));
        self.key_index = self.key_index.min(self.keys.keys.len().saturating_sub(1));
        self.model_index = self.model_index.min(self.models.models.len().saturating_sub(1));
        self.impl_index = self
            .impl_index
            .min(self.implementations.implementations.len().saturating_sub(1));
        self.turn_index = self.turn_index.min(self.chat.turns.len().saturating_sub(1));
    }

    fn notice(&self, level: NoticeLevel, message: impl Into<String>) {
        bus::global().notice(level, message);
    }

    /// Toggle one implementation in the fan-out set.
    pub fn toggle_implementation(&mut self, id: Uuid, label: String) {
        if let Some(position) = self.selected_impls.iter().position(|i| *i == id) {
            self.selected_impls.remove(position);
            self.impl_labels.remove(&id);
        } else {
            self.selected_impls.push(id);
            self.impl_labels.insert(id, label);
        }
    }

    // -- dialog openers ------------------------------------------------

    pub fn open_help(&mut self) {
        self.dialog = Some(
            DialogState::new(DialogKind::Help, "Keys").with_message(
                "Tab/Shift+Tab: switch page  1-6: jump to page\n\
                 Up/Down: select  Enter: open / submit\n\
                 a: add  e: edit  d: delete  r: refresh\n\
                 Ctrl+Up/Down: reorder keys and implementations\n\
                 Chat: Ctrl+L conversations  Ctrl+O models  Ctrl+P presets\n\
                 Chat: Ctrl+N new conversation  Ctrl+B select response\n\
                 Chat: Ctrl+Y copy response  Ctrl+X delete response\n\
                 Ctrl+C: quit",
            ),
        );
    }

    pub fn open_conversation_selector(&mut self) {
        let items: Vec<SelectItem> = self
            .chat
            .conversations
            .iter()
            .map(|c| SelectItem {
                id: c.id.to_string(),
                label: c.title.clone(),
                description: Some(c.updated_at.format("%Y-%m-%d %H:%M").to_string()),
                checked: self.chat.selected == Some(c.id),
            })
            .collect();
        self.dialog = Some(
            DialogState::new(DialogKind::ConversationSelector, "Conversations").with_items(items),
        );
    }

    /// Open the fan-out picker listing every implementation of every model.
    pub async fn open_implementation_picker(&mut self) {
        let mut items = Vec::new();
        let services = self.services.clone();
        for model in &self.models.models {
            let implementations = match services.implementations.get_all(model.id).await {
                Ok(implementations) => implementations,
                Err(e) => {
                    self.notice(NoticeLevel::Error, e.to_string());
                    continue;
                }
            };
            for implementation in implementations {
                let provider = self
                    .providers
                    .providers
                    .iter()
                    .find(|p| p.id == implementation.provider_id)
                    .map(|p| p.name.as_str())
                    .unwrap_or("?");
                let label = format!(
                    "{} · {} {}",
                    model.name, provider, implementation.provider_model_id
                );
                let description = if implementation.is_available {
                    implementation.context_window.map(|w| format!("{}k ctx", w / 1000))
                } else {
                    Some("unavailable".to_string())
                };
                items.push(SelectItem {
                    id: implementation.id.to_string(),
                    label,
                    description,
                    checked: self.selected_impls.contains(&implementation.id),
                });
            }
        }
        self.dialog = Some(
            DialogState::new(DialogKind::ImplementationPicker, "Fan-out Models")
                .with_items(items)
                .with_message("Space: toggle  Enter: done"),
        );
    }

    pub fn open_provider_picker(&mut self) {
        let items: Vec<SelectItem> = self
            .providers
            .providers
            .iter()
            .map(|p| SelectItem {
                id: p.id.to_string(),
                label: p.name.clone(),
                description: Some(p.base_url.clone()),
                checked: false,
            })
            .collect();
        self.dialog = Some(
            DialogState::new(DialogKind::ProviderPicker, "Select Provider").with_items(items),
        );
    }

    pub fn open_preset_selector(&mut self) {
        let items: Vec<SelectItem> = self
            .presets
            .presets
            .iter()
            .map(|p| SelectItem {
                id: p.id.to_string(),
                label: p.name.clone(),
                description: p.description.clone(),
                checked: false,
            })
            .collect();
        self.dialog = Some(
            DialogState::new(DialogKind::PresetSelector, "Parameter Presets").with_items(items),
        );
    }

    pub fn open_confirm(&mut self, action: ConfirmAction, message: &str) {
        self.dialog = Some(
            DialogState::new(DialogKind::Confirm(action), "Confirm").with_message(message),
        );
    }

    pub fn close_dialog(&mut self) {
        self.dialog = None;
    }

    /// Copy text to the clipboard via OSC 52 and the system clipboard.
    pub fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        self.copy_via_osc52(text)?;

        use arboard::Clipboard;
        if let Ok(mut clipboard) = Clipboard::new() {
            let _ = clipboard.set_text(text);
        }

        Ok(())
    }

    fn copy_via_osc52(&self, text: &str) -> Result<()> {
        use base64::Engine;
        let base64_text = base64::engine::general_purpose::STANDARD.encode(text);
        let osc52 = format!("\x1b]52;c;{}\x07", base64_text);

        // tmux needs the sequence wrapped
        let osc52_final = if std::env::var("TMUX").is_ok() {
            format!("\x1bPtmux;\x1b{}\x1b\\", osc52)
        } else {
            osc52
        };

        use std::io::Write;
        let mut stdout = std::io::stdout();
        stdout.write_all(osc52_final.as_bytes())?;
        stdout.flush()?;

        Ok(())
    }

    // -- key handling --------------------------------------------------

    async fn handle_key(&mut self, key: KeyEvent, event_tx: &mpsc::Sender<AppEvent>) {
        if self.dialog.is_some() {
            self.handle_dialog_key(key, event_tx).await;
            return;
        }
        if self.form.is_some() {
            self.handle_form_key(key, event_tx).await;
            return;
        }

        let action = key_to_action(key);
        match action {
            Action::Quit => {
                self.should_quit = true;
                return;
            }
            Action::NextRoute => {
                self.route = self.route.next();
                return;
            }
            Action::PrevRoute => {
                self.route = self.route.prev();
                return;
            }
            _ => {}
        }

        match self.route {
            Route::Chat => self.handle_chat_key(key, action, event_tx).await,
            Route::Providers => self.handle_providers_key(action).await,
            Route::Models => self.handle_models_key(action).await,
            _ => self.handle_plain_key(action),
        }
        self.clamp_selections();
    }

    /// Pages without their own bindings: digits jump, '?' opens help.
    fn handle_plain_key(&mut self, action: Action) {
        match action {
            Action::Char('?') => self.open_help(),
            Action::Char(c) => {
                if let Some(route) = Route::from_digit(c) {
                    self.route = route;
                }
            }
            _ => {}
        }
    }

    async fn handle_providers_key(&mut self, action: Action) {
        let services = self.services.clone();
        match action {
            Action::Up => match self.provider_pane {
                Pane::List => self.provider_index = self.provider_index.saturating_sub(1),
                Pane::Detail => self.key_index = self.key_index.saturating_sub(1),
            },
            Action::Down => match self.provider_pane {
                Pane::List => {
                    if self.provider_index + 1 < self.providers.providers.len() {
                        self.provider_index += 1;
                    }
                }
                Pane::Detail => {
                    if self.key_index + 1 < self.keys.keys.len() {
                        self.key_index += 1;
                    }
                }
            },
            Action::Left => self.provider_pane = Pane::List,
            Action::Right | Action::Submit => {
                if let Some(provider) = self.selected_provider() {
                    let id = provider.id;
                    self.keys.fetch(&services, id).await;
                    self.key_index = 0;
                    self.provider_pane = Pane::Detail;
                }
            }
            Action::MoveItemUp | Action::MoveItemDown => {
                if self.provider_pane == Pane::Detail {
                    let direction = if action == Action::MoveItemUp {
                        MoveDirection::Up
                    } else {
                        MoveDirection::Down
                    };
                    if let Some(key) = self.keys.keys.get(self.key_index) {
                        let key_id = key.id;
                        match self.keys.reorder(&services, key_id, direction).await {
                            Ok(true) => {
                                // Follow the moved key
                                if let Some(position) =
                                    self.keys.keys.iter().position(|k| k.id == key_id)
                                {
                                    self.key_index = position;
                                }
                            }
                            Ok(false) => {}
                            Err(e) => self.notice(NoticeLevel::Error, e.to_string()),
                        }
                    }
                }
            }
            Action::Char('a') => {
                self.form = Some(match self.provider_pane {
                    Pane::List => FormState::provider(None),
                    Pane::Detail => FormState::api_key(None),
                });
            }
            Action::Char('e') => match self.provider_pane {
                Pane::List => {
                    if let Some(provider) = self.selected_provider() {
                        self.form = Some(FormState::provider(Some(provider)));
                    }
                }
                Pane::Detail => {
                    if let Some(key) = self.keys.keys.get(self.key_index) {
                        self.form = Some(FormState::api_key(Some(key)));
                    }
                }
            },
            Action::Char('d') => match self.provider_pane {
                Pane::List => {
                    if let Some(provider) = self.selected_provider() {
                        let message = format!(
                            "Delete provider \"{}\" and all of its API keys?",
                            provider.name
                        );
                        self.open_confirm(ConfirmAction::DeleteProvider(provider.id), &message);
                    }
                }
                Pane::Detail => {
                    if let Some(key) = self.keys.keys.get(self.key_index) {
                        let message = format!("Delete API key \"{}\"?", key.alias);
                        self.open_confirm(ConfirmAction::DeleteKey(key.id), &message);
                    }
                }
            },
            Action::Char('q') => {
                if let Some(provider) = self.selected_provider() {
                    let per_model = matches!(
                        provider.free_quota_type,
                        Some(crate::api::types::FreeQuotaType::PerModelTokens)
                    );
                    self.form = Some(FormState::quota(provider.free_quota.as_ref(), per_model));
                }
            }
            Action::Char('x') => {
                if let Some(provider) = self.selected_provider() {
                    if let Some(quota) = &provider.free_quota {
                        let message = format!("Delete the free quota of \"{}\"?", provider.name);
                        let action = ConfirmAction::DeleteQuota {
                            provider_id: provider.id,
                            quota_id: quota.id,
                        };
                        self.open_confirm(action, &message);
                    }
                }
            }
            Action::Char('r') => {
                self.providers.fetch(&services).await;
                if self.provider_pane == Pane::Detail {
                    if let Some(provider) = self.selected_provider() {
                        let id = provider.id;
                        self.keys.fetch(&services, id).await;
                    }
                }
            }
            Action::Char('?') => self.open_help(),
            Action::Char(c) => {
                if let Some(route) = Route::from_digit(c) {
                    self.route = route;
                }
            }
            Action::Cancel => self.provider_pane = Pane::List,
            _ => {}
        }
    }

    async fn handle_models_key(&mut self, action: Action) {
        let services = self.services.clone();
        match action {
            Action::Up => match self.model_pane {
                Pane::List => self.model_index = self.model_index.saturating_sub(1),
                Pane::Detail => self.impl_index = self.impl_index.saturating_sub(1),
            },
            Action::Down => match self.model_pane {
                Pane::List => {
                    if self.model_index + 1 < self.models.models.len() {
                        self.model_index += 1;
                    }
                }
                Pane::Detail => {
                    if self.impl_index + 1 < self.implementations.implementations.len() {
                        self.impl_index += 1;
                    }
                }
            },
            Action::Left => self.model_pane = Pane::List,
            Action::Right | Action::Submit => {
                if let Some(model) = self.selected_model() {
                    let id = model.id;
                    self.implementations.fetch(&services, id).await;
                    self.impl_index = 0;
                    self.model_pane = Pane::Detail;
                }
            }
            Action::MoveItemUp | Action::MoveItemDown => {
                if self.model_pane == Pane::Detail {
                    let direction = if action == Action::MoveItemUp {
                        MoveDirection::Up
                    } else {
                        MoveDirection::Down
                    };
                    if let Some(implementation) =
                        self.implementations.implementations.get(self.impl_index)
                    {
                        let impl_id = implementation.id;
                        match self.implementations.reorder(&services, impl_id, direction).await {
                            Ok(true) => {
                                if let Some(position) = self
                                    .implementations
                                    .implementations
                                    .iter()
                                    .position(|i| i.id == impl_id)
                                {
                                    self.impl_index = position;
                                }
                            }
                            Ok(false) => {}
                            Err(e) => self.notice(NoticeLevel::Error, e.to_string()),
                        }
                    }
                }
            }
            Action::Char('a') => match self.model_pane {
                Pane::List => self.form = Some(FormState::model(None)),
                // Pick the provider first; the form opens with it filled in.
                Pane::Detail => self.open_provider_picker(),
            },
            Action::Char('e') => match self.model_pane {
                Pane::List => {
                    if let Some(model) = self.selected_model() {
                        self.form = Some(FormState::model(Some(model)));
                    }
                }
                Pane::Detail => {
                    if let Some(implementation) =
                        self.implementations.implementations.get(self.impl_index)
                    {
                        self.form = Some(FormState::implementation(Some(implementation)));
                    }
                }
            },
            Action::Char('d') => match self.model_pane {
                Pane::List => {
                    if let Some(model) = self.selected_model() {
                        let message = format!(
                            "Delete model \"{}\" and all of its implementations?",
                            model.name
                        );
                        self.open_confirm(ConfirmAction::DeleteModel(model.id), &message);
                    }
                }
                Pane::Detail => {
                    if let Some(implementation) =
                        self.implementations.implementations.get(self.impl_index)
                    {
                        let message = format!(
                            "Delete implementation \"{}\"?",
                            implementation.provider_model_id
                        );
                        self.open_confirm(
                            ConfirmAction::DeleteImplementation(implementation.id),
                            &message,
                        );
                    }
                }
            },
            Action::Char('r') => {
                self.models.fetch(&services).await;
                if self.model_pane == Pane::Detail {
                    if let Some(model) = self.selected_model() {
                        let id = model.id;
                        self.implementations.fetch(&services, id).await;
                    }
                }
            }
            Action::Char('?') => self.open_help(),
            Action::Char(c) => {
                if let Some(route) = Route::from_digit(c) {
                    self.route = route;
                }
            }
            Action::Cancel => self.model_pane = Pane::List,
            _ => {}
        }
    }

    async fn handle_chat_key(
        &mut self,
        key: KeyEvent,
        action: Action,
        event_tx: &mpsc::Sender<AppEvent>,
    ) {
        let services = self.services.clone();

        // Chat-page control chords, checked before plain actions because
        // letters go into the message editor.
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('n') => {
                    self.form = Some(FormState::conversation());
                    return;
                }
                KeyCode::Char('l') => {
                    self.open_conversation_selector();
                    return;
                }
                KeyCode::Char('o') => {
                    self.open_implementation_picker().await;
                    return;
                }
                KeyCode::Char('p') => {
                    self.open_preset_selector();
                    return;
                }
                KeyCode::Char('s') => {
                    self.form = Some(FormState::preset(&self.parameters));
                    return;
                }
                KeyCode::Char('b') => {
                    self.select_active_response(&services).await;
                    return;
                }
                KeyCode::Char('y') => {
                    self.copy_selected_response();
                    return;
                }
                KeyCode::Char('x') => {
                    self.confirm_delete_response();
                    return;
                }
                _ => {}
            }
        }

        match action {
            Action::Char(c) => self.chat_input.push(c),
            Action::Newline => self.chat_input.push('\n'),
            Action::Backspace => {
                self.chat_input.pop();
            }
            Action::ClearInput | Action::Cancel => self.chat_input.clear(),
            Action::Submit => self.spawn_send(event_tx),
            Action::Up => self.turn_index = self.turn_index.saturating_sub(1),
            Action::Down => {
                if self.turn_index + 1 < self.chat.turns.len() {
                    self.turn_index += 1;
                }
            }
            Action::Left => self.response_index = self.response_index.saturating_sub(1),
            Action::Right => {
                if let Some(crate::store::TurnState::Confirmed(turn)) = self.selected_turn() {
                    if self.response_index + 1 < turn.visible_responses().count() {
                        self.response_index += 1;
                    }
                }
            }
            Action::Delete => {
                if let Some(crate::store::TurnState::Confirmed(turn)) = self.selected_turn() {
                    let message = "Delete this turn? It stays in history as deleted.";
                    self.open_confirm(ConfirmAction::DeleteTurn(turn.id), message);
                }
            }
            _ => {}
        }
    }

    /// The response currently highlighted within the selected turn.
    fn selected_response(&self) -> Option<&crate::api::types::ModelResponse> {
        match self.selected_turn()? {
            crate::store::TurnState::Confirmed(turn) => {
                turn.visible_responses().nth(self.response_index)
            }
            crate::store::TurnState::Pending { .. } => None,
        }
    }

    async fn select_active_response(&mut self, services: &Services) {
        let Some((turn_id, response_id)) = self
            .selected_turn()
            .and_then(|t| match t {
                crate::store::TurnState::Confirmed(turn) => Some(turn.id),
                _ => None,
            })
            .zip(self.selected_response().map(|r| r.id))
        else {
            return;
        };
        match services.chat.select_response(turn_id, response_id).await {
            Ok(()) => {
                self.chat.apply_select_response(turn_id, response_id);
                self.notice(NoticeLevel::Success, "response selected as context");
            }
            Err(e) => self.notice(NoticeLevel::Error, e.to_string()),
        }
    }

    fn copy_selected_response(&mut self) {
        if let Some(response) = self.selected_response() {
            let content = response.content.clone();
            match self.copy_to_clipboard(&content) {
                Ok(()) => self.notice(NoticeLevel::Success, "response copied"),
                Err(e) => self.notice(NoticeLevel::Error, e.to_string()),
            }
        }
    }

    fn confirm_delete_response(&mut self) {
        let Some((turn_id, response_id)) = self
            .selected_turn()
            .and_then(|t| match t {
                crate::store::TurnState::Confirmed(turn) => Some(turn.id),
                _ => None,
            })
            .zip(self.selected_response().map(|r| r.id))
        else {
            return;
        };
        self.open_confirm(
            ConfirmAction::DeleteResponse {
                turn_id,
                response_id,
            },
            "Delete this response?",
        );
    }

    // -- async dispatch ------------------------------------------------

    /// Stage and dispatch a multi-model send. Validation failures surface as
    /// notices without touching the turn list.
    fn spawn_send(&mut self, event_tx: &mpsc::Sender<AppEvent>) {
        if self.chat_input.trim().is_empty() {
            return;
        }
        if self.selected_impls.is_empty() {
            self.notice(NoticeLevel::Error, "select at least one model (Ctrl+O)");
            return;
        }
        let Some((temp_id, request)) = self.chat.begin_send(
            &self.chat_input,
            &self.selected_impls,
            self.parameters.clone(),
        ) else {
            return;
        };

        self.chat_input.clear();
        self.turn_index = self.chat.turns.len().saturating_sub(1);
        self.response_index = 0;

        let generation = self.chat.generation;
        let services = self.services.clone();
        let tx = event_tx.clone();
        tokio::spawn(async move {
            let result = services.chat.send_multi(&request).await;
            let _ = tx
                .send(AppEvent::SendFinished {
                    generation,
                    temp_id,
                    result,
                })
                .await;
        });
    }

    pub fn spawn_load(
        &self,
        event_tx: &mpsc::Sender<AppEvent>,
        generation: u64,
        conversation_id: Uuid,
    ) {
        let services = self.services.clone();
        let tx = event_tx.clone();
        tokio::spawn(async move {
            let result = conversation::load_turns(&services, conversation_id).await;
            let _ = tx.send(AppEvent::TurnsLoaded { generation, result }).await;
        });
    }

    fn select_conversation(&mut self, id: Uuid, event_tx: &mpsc::Sender<AppEvent>) {
        let generation = self.chat.select(id);
        self.turn_index = 0;
        self.response_index = 0;
        bus::global().publish(SessionEvent::ConversationSelected { id: id.to_string() });
        self.spawn_load(event_tx, generation, id);
    }

    // -- dialog keys ---------------------------------------------------

    async fn handle_dialog_key(&mut self, key: KeyEvent, event_tx: &mpsc::Sender<AppEvent>) {
        let Some(dialog) = &mut self.dialog else {
            return;
        };

        if matches!(dialog.kind, DialogKind::Help) {
            self.dialog = None;
            return;
        }

        match key.code {
            KeyCode::Esc => self.dialog = None,
            KeyCode::Up => dialog.move_up(),
            KeyCode::Down => dialog.move_down(),
            KeyCode::Backspace => {
                dialog.search_query.pop();
                dialog.update_filter();
            }
            KeyCode::Char(' ') if dialog.kind == DialogKind::ImplementationPicker => {
                if let Some(item) = dialog.selected_item_mut() {
                    item.checked = !item.checked;
                    let id: Uuid = match item.id.parse() {
                        Ok(id) => id,
                        Err(_) => return,
                    };
                    let label = item.label.clone();
                    self.toggle_implementation(id, label);
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                dialog.search_query.push(c);
                dialog.update_filter();
            }
            KeyCode::Enter => self.commit_dialog(event_tx).await,
            _ => {}
        }
    }

    async fn commit_dialog(&mut self, event_tx: &mpsc::Sender<AppEvent>) {
        let Some(dialog) = self.dialog.take() else {
            return;
        };

        match dialog.kind {
            DialogKind::Help | DialogKind::ImplementationPicker => {}
            DialogKind::ConversationSelector => {
                if let Some(id) = dialog.selected_item().and_then(|i| i.id.parse().ok()) {
                    self.select_conversation(id, event_tx);
                }
            }
            DialogKind::ProviderPicker => {
                if let Some(item) = dialog.selected_item() {
                    let mut form = FormState::implementation(None);
                    if let Some(field) = form.fields.iter_mut().find(|f| f.key == "providerId") {
                        field.value = item.id.clone();
                    }
                    self.form = Some(form);
                }
            }
            DialogKind::PresetSelector => {
                if let Some(id) = dialog.selected_item().and_then(|i| i.id.parse().ok()) {
                    if let Some(parameters) = self.presets.select(id) {
                        self.parameters = parameters;
                        self.notice(NoticeLevel::Success, "preset applied");
                    }
                }
            }
            DialogKind::Confirm(action) => self.run_confirmed(action, event_tx).await,
        }
        self.clamp_selections();
    }

    async fn run_confirmed(&mut self, action: ConfirmAction, event_tx: &mpsc::Sender<AppEvent>) {
        let services = self.services.clone();
        let outcome = match action {
            ConfirmAction::DeleteProvider(id) => {
                self.providers.delete(&services, id).await.map(|_| "provider deleted")
            }
            ConfirmAction::DeleteKey(id) => {
                self.keys.delete(&services, id).await.map(|_| "API key deleted")
            }
            ConfirmAction::DeleteQuota { provider_id, quota_id } => {
                let result = self.quotas.delete(&services, provider_id, quota_id).await;
                if result.is_ok() {
                    let _ = self.providers.refresh_one(&services, provider_id).await;
                }
                result.map(|_| "free quota deleted")
            }
            ConfirmAction::DeleteModel(id) => {
                self.models.delete(&services, id).await.map(|_| "model deleted")
            }
            ConfirmAction::DeleteImplementation(id) => self
                .implementations
                .delete(&services, id)
                .await
                .map(|_| "implementation deleted"),
            ConfirmAction::DeleteConversation(id) => {
                match self.chat.delete_conversation(&services, id).await {
                    Ok(Some(generation)) => {
                        if let Some(selected) = self.chat.selected {
                            self.spawn_load(event_tx, generation, selected);
                        }
                        Ok("conversation deleted")
                    }
                    Ok(None) => Ok("conversation deleted"),
                    Err(e) => Err(e),
                }
            }
            ConfirmAction::DeleteTurn(turn_id) => {
                self.chat.delete_turn(&services, turn_id).await.map(|_| "turn deleted")
            }
            ConfirmAction::DeleteResponse {
                turn_id,
                response_id,
            } => match services.chat.delete_response(turn_id, response_id).await {
                Ok(()) => {
                    self.chat.apply_delete_response(turn_id, response_id);
                    self.response_index = 0;
                    Ok("response deleted")
                }
                Err(e) => Err(e),
            },
        };

        match outcome {
            Ok(message) => self.notice(NoticeLevel::Success, message),
            Err(e) => self.notice(NoticeLevel::Error, e.to_string()),
        }
    }

    // -- form keys -----------------------------------------------------

    async fn handle_form_key(&mut self, key: KeyEvent, event_tx: &mpsc::Sender<AppEvent>) {
        let Some(form) = &mut self.form else {
            return;
        };

        match key.code {
            KeyCode::Esc => self.form = None,
            KeyCode::Up => form.prev_field(),
            KeyCode::Down | KeyCode::Tab => form.next_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                form.insert_char(c)
            }
            KeyCode::Enter => self.submit_form(event_tx).await,
            _ => {}
        }
    }

    async fn submit_form(&mut self, event_tx: &mpsc::Sender<AppEvent>) {
        let Some(form) = self.form.take() else {
            return;
        };
        if let Err(messages) = form.validate() {
            let mut form = form;
            form.error = Some(messages.join("; "));
            self.form = Some(form);
            return;
        }

        match self.apply_form(&form, event_tx).await {
            Ok(message) => self.notice(NoticeLevel::Success, message),
            Err(message) => {
                let mut form = form;
                form.error = Some(message);
                self.form = Some(form);
            }
        }
        self.clamp_selections();
    }

    /// Perform the form's create or update. Returns the success notice, or
    /// the error message to re-open the form with.
    async fn apply_form(
        &mut self,
        form: &FormState,
        event_tx: &mpsc::Sender<AppEvent>,
    ) -> Result<&'static str, String> {
        let services = self.services.clone();

        match form.kind {
            FormKind::Provider => {
                let (draft, initial_key) = form.provider_draft()?;
                match form.editing {
                    Some(id) => {
                        self.providers
                            .update(&services, id, &draft)
                            .await
                            .map_err(|e| e.to_string())?;
                        Ok("provider updated")
                    }
                    None => {
                        self.providers
                            .create(&services, &draft, initial_key.as_ref())
                            .await
                            .map_err(|e| e.to_string())?;
                        Ok("provider created")
                    }
                }
            }
            FormKind::ApiKey => {
                let draft = form.api_key_draft();
                match form.editing {
                    Some(id) => {
                        self.keys
                            .update(&services, id, &draft)
                            .await
                            .map_err(|e| e.to_string())?;
                        Ok("API key updated")
                    }
                    None => {
                        self.keys
                            .create(&services, &draft)
                            .await
                            .map_err(|e| e.to_string())?;
                        Ok("API key created")
                    }
                }
            }
            FormKind::Quota => {
                let draft = form.quota_draft()?;
                let provider_id = self
                    .selected_provider()
                    .map(|p| p.id)
                    .ok_or_else(|| "no provider selected".to_string())?;
                self.quotas
                    .save(&services, provider_id, &draft, form.editing)
                    .await
                    .map_err(|e| e.to_string())?;
                let _ = self.providers.refresh_one(&services, provider_id).await;
                Ok("free quota saved")
            }
            FormKind::Model => {
                let draft = form.model_draft()?;
                match form.editing {
                    Some(id) => {
                        self.models
                            .update(&services, id, &draft)
                            .await
                            .map_err(|e| e.to_string())?;
                        Ok("model updated")
                    }
                    None => {
                        self.models
                            .create(&services, &draft)
                            .await
                            .map_err(|e| e.to_string())?;
                        Ok("model created")
                    }
                }
            }
            FormKind::Implementation => {
                let draft = form.implementation_draft()?;
                if self.implementations.model_id.is_none() {
                    if let Some(model) = self.selected_model() {
                        let id = model.id;
                        self.implementations.fetch(&services, id).await;
                    }
                }
                match form.editing {
                    Some(id) => {
                        self.implementations
                            .update(&services, id, &draft)
                            .await
                            .map_err(|e| e.to_string())?;
                        Ok("implementation updated")
                    }
                    None => {
                        self.implementations
                            .create(&services, &draft)
                            .await
                            .map_err(|e| e.to_string())?;
                        Ok("implementation created")
                    }
                }
            }
            FormKind::Conversation => {
                let draft = form.conversation_draft();
                let generation = self
                    .chat
                    .create_conversation(&services, &draft)
                    .await
                    .map_err(|e| e.to_string())?;
                if let Some(id) = self.chat.selected {
                    self.turn_index = 0;
                    self.response_index = 0;
                    self.spawn_load(event_tx, generation, id);
                }
                Ok("conversation created")
            }
            FormKind::Preset => {
                let draft = form.preset_draft()?;
                self.presets
                    .create(&services, &draft)
                    .await
                    .map_err(|e| e.to_string())?;
                Ok("preset saved")
            }
        }
    }

    // -- async events ----------------------------------------------------

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::TurnsLoaded { generation, result } => {
                self.chat.apply_load(generation, result);
                self.turn_index = self.chat.turns.len().saturating_sub(1);
                self.response_index = 0;
            }
            AppEvent::SendFinished {
                generation,
                temp_id,
                result,
            } => {
                self.chat.apply_send(generation, &temp_id, result);
                self.turn_index = self.chat.turns.len().saturating_sub(1);
                self.response_index = 0;
            }
        }
    }

    fn drain_bus(&mut self) {
        while let Ok(event) = self.bus_rx.try_recv() {
            match event {
                SessionEvent::Notice { level, message } => {
                    self.notice = Some((level, message));
                    self.notice_ticks = 0;
                }
                SessionEvent::ConversationSelected { .. } | SessionEvent::CollectionRefreshed { .. } => {}
            }
        }
    }

    /// Advance spinner and notice timers; called once per tick.
    pub fn tick(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
        if self.notice.is_some() {
            self.notice_ticks += 1;
            // 100ms tick rate, dismiss after five seconds
            if self.notice_ticks >= 50 {
                self.notice = None;
                self.notice_ticks = 0;
            }
        }
    }
}

/// Run the TUI application
pub async fn run(config: Config) -> Result<()> {
    if !atty::is(atty::Stream::Stdout) {
        anyhow::bail!(
            "This command requires a TTY (terminal). Use the list subcommands\n\
             for non-interactive usage, e.g.:\n  modelhub provider list"
        );
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config)?;

    // Event channel for async processing
    let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(100);

    if let Some((generation, conversation_id)) = app.initial_load().await {
        app.spawn_load(&event_tx, generation, conversation_id);
    }

    let result = run_app(&mut terminal, &mut app, event_tx, &mut event_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Main event loop
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    event_tx: mpsc::Sender<AppEvent>,
    event_rx: &mut mpsc::Receiver<AppEvent>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = std::time::Instant::now();

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key, &event_tx).await;
            }
        }

        // Process async events
        while let Ok(event) = event_rx.try_recv() {
            app.handle_app_event(event);
        }
        app.drain_bus();

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = std::time::Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(Config::default()).unwrap()
    }

    #[test]
    fn test_route_cycling() {
        let mut app = app();
        assert_eq!(app.route, Route::Dashboard);
        app.route = app.route.next();
        assert_eq!(app.route, Route::Providers);
        app.route = app.route.prev();
        assert_eq!(app.route, Route::Dashboard);
    }

    #[test]
    fn test_toggle_implementation() {
        let mut app = app();
        let id = Uuid::from_u128(9);
        app.toggle_implementation(id, "GPT-4 · OpenAI gpt-4o".to_string());
        assert_eq!(app.selected_impls, vec![id]);
        assert!(app.impl_labels.contains_key(&id));

        app.toggle_implementation(id, String::new());
        assert!(app.selected_impls.is_empty());
        assert!(app.impl_labels.is_empty());
    }

    #[test]
    fn test_dialog_fuzzy_filter() {
        let mut dialog = DialogState::new(DialogKind::ConversationSelector, "Conversations")
            .with_items(vec![
                SelectItem {
                    id: "1".to_string(),
                    label: "pricing experiments".to_string(),
                    description: None,
                    checked: false,
                },
                SelectItem {
                    id: "2".to_string(),
                    label: "latency check".to_string(),
                    description: None,
                    checked: false,
                },
            ]);

        dialog.search_query = "lat".to_string();
        dialog.update_filter();
        assert_eq!(dialog.filtered_indices, vec![1]);
        assert_eq!(dialog.selected_item().unwrap().label, "latency check");

        dialog.search_query.clear();
        dialog.update_filter();
        assert_eq!(dialog.filtered_indices.len(), 2);
    }

    #[tokio::test]
    async fn test_escape_cancels_confirm_without_calling_out() {
        let mut app = app();
        app.open_confirm(ConfirmAction::DeleteModel(Uuid::from_u128(3)), "Delete?");
        let (tx, _rx) = mpsc::channel(1);

        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        app.handle_dialog_key(esc, &tx).await;

        assert!(app.dialog.is_none());
        assert!(app.models.error.is_none());
    }

    #[tokio::test]
    async fn test_confirmed_provider_delete_issues_one_request() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        let id = Uuid::from_u128(21);
        Mock::given(method("DELETE"))
            .and(path(format!("/providers/{}", id)))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        // Collection refetch after the mutation succeeds.
        Mock::given(method("GET"))
            .and(path("/providers/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let config = Config {
            api_url: Some(server.uri()),
            ..Default::default()
        };
        let mut app = App::new(config).unwrap();
        app.open_confirm(ConfirmAction::DeleteProvider(id), "Delete?");
        let (tx, _rx) = mpsc::channel(1);

        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        app.handle_dialog_key(enter, &tx).await;

        assert!(app.dialog.is_none());
        assert!(app.providers.error.is_none());
        server.verify().await;
    }

    #[tokio::test]
    async fn test_empty_provider_form_reports_both_messages() {
        let mut app = app();
        app.form = Some(FormState::provider(None));
        let (tx, _rx) = mpsc::channel(1);
        app.submit_form(&tx).await;

        // The form stays open with every missing required field listed.
        let error = app.form.as_ref().and_then(|f| f.error.as_deref()).unwrap();
        assert!(error.contains("请输入提供商名称"));
        assert!(error.contains("请输入接口地址"));
    }

    #[test]
    fn test_notice_dismissed_after_timer() {
        let mut app = app();
        app.notice = Some((NoticeLevel::Info, "saved".to_string()));
        for _ in 0..49 {
            app.tick();
        }
        assert!(app.notice.is_some());
        app.tick();
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_confirm_dialog_carries_action() {
        let mut app = app();
        let id = Uuid::from_u128(4);
        app.open_confirm(ConfirmAction::DeleteProvider(id), "Delete?");
        match &app.dialog.as_ref().unwrap().kind {
            DialogKind::Confirm(ConfirmAction::DeleteProvider(got)) => assert_eq!(*got, id),
            other => panic!("unexpected dialog kind: {:?}", other),
        }
    }
}
