//! UI state and event loop
//!
//! The loop is strictly sequential: batch generation runs to completion in
//! place (with a progress frame drawn first), so there is no task juggling
//! and no cancellation. Matches how the generation pipeline itself works.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use std::time::Duration;

use super::render;
use crate::ai::CompletionApi;
use crate::compose::{default_address, mailto_link};
use crate::constants::POLL_TIMEOUT_MS;
use crate::customers::CustomerRecord;
use crate::generator::{GeneratedEmail, Generator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Browse,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Search,
    Recipient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing(EditTarget),
}

/// What the event loop should do after a key press.
enum AfterKey {
    Continue,
    Quit,
    Generate,
}

pub struct UiApp<C> {
    generator: Generator<C>,
    pub(super) customers: Vec<CustomerRecord>,
    pub(super) results: Vec<GeneratedEmail>,
    pub(super) recipients: Vec<String>,
    pub(super) selected: usize,
    pub(super) view: View,
    pub(super) input_mode: InputMode,
    pub(super) search_input: String,
    pub(super) search_hit: Option<usize>,
    pub(super) search_message: Option<String>,
    pub(super) recipient_input: String,
    pub(super) status: Option<String>,
    pub(super) error: Option<String>,
    recipient_domain: String,
}

impl<C: CompletionApi> UiApp<C> {
    pub fn new(
        generator: Generator<C>,
        customers: Vec<CustomerRecord>,
        recipient_domain: String,
    ) -> Self {
        Self {
            generator,
            customers,
            results: Vec::new(),
            recipients: Vec::new(),
            selected: 0,
            view: View::Browse,
            input_mode: InputMode::Normal,
            search_input: String::new(),
            search_hit: None,
            search_message: None,
            recipient_input: String::new(),
            status: Some("Press g to generate emails".to_string()),
            error: None,
            recipient_domain,
        }
    }

    pub fn is_live(&self) -> bool {
        self.generator.is_live()
    }

    /// Index of the result shown in the browse detail pane.
    pub(super) fn selected_index(&self) -> Option<usize> {
        if self.selected < self.results.len() {
            Some(self.selected)
        } else {
            None
        }
    }

    /// Index of the result the current view is focused on.
    fn active_index(&self) -> Option<usize> {
        match self.view {
            View::Browse => self.selected_index(),
            View::Search => self.search_hit,
        }
    }

    pub async fn run(mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            terminal.draw(|frame| render::render(frame, &self))?;

            if !event::poll(Duration::from_millis(POLL_TIMEOUT_MS))? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            self.error = None;
            match self.handle_key(key) {
                AfterKey::Quit => break,
                AfterKey::Generate => {
                    self.status = Some("Generating...".to_string());
                    terminal.draw(|frame| render::render(frame, &self))?;
                    self.generate_all().await;
                }
                AfterKey::Continue => {}
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> AfterKey {
        // Ctrl+C always quits, even while editing
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return AfterKey::Quit;
        }

        match self.input_mode {
            InputMode::Editing(target) => {
                self.handle_edit_key(key, target);
                AfterKey::Continue
            }
            InputMode::Normal => self.handle_normal_key(key),
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent, target: EditTarget) {
        let buffer = match target {
            EditTarget::Search => &mut self.search_input,
            EditTarget::Recipient => &mut self.recipient_input,
        };

        match key.code {
            KeyCode::Char(c) => buffer.push(c),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                match target {
                    EditTarget::Search => self.run_search(),
                    EditTarget::Recipient => self.commit_recipient(),
                }
            }
            _ => {}
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> AfterKey {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return AfterKey::Quit,
            KeyCode::Tab => self.toggle_view(),
            KeyCode::Char('g') => {
                if self.customers.is_empty() {
                    self.error = Some("No customer records to generate for".to_string());
                } else {
                    return AfterKey::Generate;
                }
            }
            KeyCode::Char('j') | KeyCode::Down if self.view == View::Browse => {
                if !self.customers.is_empty() {
                    self.selected = (self.selected + 1).min(self.customers.len() - 1);
                }
            }
            KeyCode::Char('k') | KeyCode::Up if self.view == View::Browse => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Char('e') if self.view == View::Browse => {
                if let Some(idx) = self.selected_index() {
                    self.recipient_input = self.recipients[idx].clone();
                    self.input_mode = InputMode::Editing(EditTarget::Recipient);
                } else {
                    self.error = Some("Generate emails first".to_string());
                }
            }
            KeyCode::Char('/') if self.view == View::Search => {
                self.input_mode = InputMode::Editing(EditTarget::Search);
            }
            KeyCode::Char('m') => self.open_mailto(),
            _ => {}
        }

        AfterKey::Continue
    }

    fn toggle_view(&mut self) {
        self.view = match self.view {
            View::Browse => {
                // Jump straight into the query input when it is still empty
                if self.search_input.is_empty() {
                    self.input_mode = InputMode::Editing(EditTarget::Search);
                }
                View::Search
            }
            View::Search => View::Browse,
        };
    }

    async fn generate_all(&mut self) {
        self.results = self.generator.generate_emails(&self.customers).await;
        self.recipients = self
            .results
            .iter()
            .map(|r| default_address(&r.customer_name, &self.recipient_domain))
            .collect();
        self.search_hit = None;
        self.search_message = None;

        let fallbacks = self.results.iter().filter(|r| r.used_fallback).count();
        self.status = Some(if fallbacks > 0 {
            format!(
                "Generated {} emails ({} with mock content)",
                self.results.len(),
                fallbacks
            )
        } else {
            format!("Generated {} emails", self.results.len())
        });
    }

    /// Exact case-insensitive match of the query against customer names.
    pub(super) fn run_search(&mut self) {
        self.search_hit = None;

        if self.results.is_empty() {
            self.search_message =
                Some("No emails generated yet. Press g in the Browse tab first.".to_string());
            return;
        }

        let query = self.search_input.trim();
        if query.is_empty() {
            self.search_message = Some("Type a customer name to search.".to_string());
            return;
        }

        match self
            .results
            .iter()
            .position(|r| r.customer_name.eq_ignore_ascii_case(query))
        {
            Some(idx) => {
                self.search_hit = Some(idx);
                self.search_message = None;
            }
            None => {
                self.search_message = Some(format!("No customer named \"{}\" found.", query));
            }
        }
    }

    fn commit_recipient(&mut self) {
        let Some(idx) = self.selected_index() else {
            return;
        };
        let address = self.recipient_input.trim();
        if address.is_empty() {
            self.error = Some("Recipient address cannot be empty".to_string());
            return;
        }
        self.recipients[idx] = address.to_string();
        self.status = Some(format!("Recipient set to {}", address));
    }

    fn open_mailto(&mut self) {
        let Some(idx) = self.active_index() else {
            self.error = Some("No generated email selected".to_string());
            return;
        };

        let result = &self.results[idx];
        let link = mailto_link(&self.recipients[idx], &result.subject, &result.body);

        match open::that(&link) {
            Ok(()) => {
                self.status = Some(format!("Opened mail client for {}", result.customer_name));
            }
            Err(e) => {
                tracing::warn!("Failed to open mailto link: {}", e);
                self.error = Some(format!("Failed to open mail client: {}", e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::OpenAiClient;
    use crate::customers::test_record;
    use crate::retry::RetryConfig;

    async fn app_with_results() -> UiApp<OpenAiClient> {
        let generator = Generator::new(None, RetryConfig::default());
        let customers = vec![
            test_record("Ana Perez", "Lima", "Shoes"),
            test_record("Ben Cole", "Leeds", "Socks"),
        ];
        let mut app = UiApp::new(generator, customers, "example.com".to_string());
        app.generate_all().await;
        app
    }

    #[tokio::test]
    async fn test_generate_fills_results_and_recipients() {
        let app = app_with_results().await;

        assert_eq!(app.results.len(), 2);
        assert_eq!(app.recipients, vec!["ana@example.com", "ben@example.com"]);
        assert!(app.status.unwrap().contains("2 with mock content"));
    }

    #[tokio::test]
    async fn test_search_exact_case_insensitive() {
        let mut app = app_with_results().await;

        app.search_input = "ana perez".to_string();
        app.run_search();
        assert_eq!(app.search_hit, Some(0));
        assert_eq!(app.search_message, None);

        // Partial names are not matches
        app.search_input = "Ana".to_string();
        app.run_search();
        assert_eq!(app.search_hit, None);
        assert!(app.search_message.unwrap().contains("\"Ana\""));
    }

    #[tokio::test]
    async fn test_search_before_generation() {
        let generator: Generator<OpenAiClient> = Generator::new(None, RetryConfig::default());
        let mut app = UiApp::new(
            generator,
            vec![test_record("Ana", "Lima", "")],
            "example.com".to_string(),
        );

        app.search_input = "Ana".to_string();
        app.run_search();
        assert_eq!(app.search_hit, None);
        assert!(app.search_message.unwrap().contains("No emails generated"));
    }

    #[tokio::test]
    async fn test_navigation_clamps_to_bounds() {
        let mut app = app_with_results().await;

        app.handle_normal_key(KeyEvent::from(KeyCode::Char('k')));
        assert_eq!(app.selected, 0);
        app.handle_normal_key(KeyEvent::from(KeyCode::Char('j')));
        app.handle_normal_key(KeyEvent::from(KeyCode::Char('j')));
        assert_eq!(app.selected, 1);
    }

    #[tokio::test]
    async fn test_recipient_edit_commit() {
        let mut app = app_with_results().await;

        app.recipient_input = " ana.perez@shop.test ".to_string();
        app.commit_recipient();
        assert_eq!(app.recipients[0], "ana.perez@shop.test");

        app.recipient_input = "   ".to_string();
        app.commit_recipient();
        assert_eq!(app.recipients[0], "ana.perez@shop.test");
        assert!(app.error.is_some());
    }
}
