use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{Frame, Terminal, backend::Backend};
use std::time::Duration;

use crate::generation_service::GenerationService;
use crate::language::Language;

pub mod form_state;

use form_state::FormState;

#[derive(Debug)]
pub enum AppState {
    Form(FormState),
    Quit,
}

pub trait State {
    fn handle_key_event(
        &mut self,
        key: KeyCode,
        modifiers: KeyModifiers,
    ) -> Result<Option<AppState>>;
    fn render(&self, f: &mut Frame);
    fn update(&mut self, generation_service: &mut GenerationService);
}

pub struct TuiApp {
    pub state: AppState,
    pub generation_service: GenerationService,
}

impl TuiApp {
    pub fn new(generation_service: GenerationService, default_language: Language) -> Self {
        Self {
            state: AppState::Form(FormState::new(default_language)),
            generation_service,
        }
    }

    pub fn handle_key_event(&mut self, key: KeyCode, modifiers: KeyModifiers) -> Result<()> {
        let new_state = match &mut self.state {
            AppState::Form(form_state) => form_state.handle_key_event(key, modifiers)?,
            AppState::Quit => None,
        };

        if let Some(new_state) = new_state {
            self.state = new_state;
        }

        Ok(())
    }

    pub fn render(&self, f: &mut Frame) {
        match &self.state {
            AppState::Form(form_state) => form_state.render(f),
            AppState::Quit => {}
        }
    }

    pub fn update(&mut self) {
        match &mut self.state {
            AppState::Form(form_state) => form_state.update(&mut self.generation_service),
            AppState::Quit => {}
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            // Send queued requests, collect finished ones
            self.update();

            terminal.draw(|f| self.render(f))?;

            if matches!(self.state, AppState::Quit) {
                break;
            }

            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key.code, key.modifiers)?;
                    }
                }
            }
        }
        Ok(())
    }
}
