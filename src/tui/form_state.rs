use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::generation_service::{GenerationResponse, GenerationService};
use crate::language::Language;
use crate::pipeline::{EMPTY_INPUT_MESSAGE, Outcome, PipelineOutput, ProductQuery};
use crate::tui::{AppState, State};

const PLACEHOLDER: &str = "Example: Rosehip Marmalade, keep it cold";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Generating,
    Warning(String),
    Error(String),
}

/// The single page: product text, output language and the last result.
#[derive(Debug)]
pub struct FormState {
    pub input: String,
    pub language: Language,
    pub status: Status,
    pub output: Option<PipelineOutput>,
    queued: Option<ProductQuery>,
    pending_request: Option<u64>,
}

impl FormState {
    pub fn new(language: Language) -> Self {
        Self {
            input: String::new(),
            language,
            status: Status::Idle,
            output: None,
            queued: None,
            pending_request: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.queued.is_some() || self.pending_request.is_some()
    }

    fn apply(&mut self) {
        if self.is_busy() {
            return;
        }
        if self.input.trim().is_empty() {
            self.status = Status::Warning(EMPTY_INPUT_MESSAGE.to_string());
            return;
        }

        self.queued = Some(ProductQuery::new(self.input.clone(), self.language));
        self.output = None;
        self.status = Status::Generating;
    }

    fn handle_response(&mut self, response: GenerationResponse) {
        if self.pending_request != Some(response.request_id()) {
            tracing::debug!("Ignoring stale response {}", response.request_id());
            return;
        }
        self.pending_request = None;

        match response {
            GenerationResponse::Finished { output, .. } => {
                self.status = match &output.outcome {
                    Outcome::Translated(_) => Status::Idle,
                    Outcome::Malformed(message) => Status::Error(message.to_string()),
                };
                self.output = Some(output);
            }
            GenerationResponse::Rejected { message, .. } => {
                self.status = Status::Warning(message);
            }
            GenerationResponse::Failed { message, .. } => {
                self.status = Status::Error(message);
            }
        }
    }
}

impl State for FormState {
    fn handle_key_event(
        &mut self,
        key: KeyCode,
        modifiers: KeyModifiers,
    ) -> Result<Option<AppState>> {
        match (key, modifiers) {
            (KeyCode::Char('q'), KeyModifiers::CONTROL) => return Ok(Some(AppState::Quit)),
            (KeyCode::Char('j'), KeyModifiers::CONTROL) => self.input.push('\n'),
            (KeyCode::Char(c), KeyModifiers::NONE) | (KeyCode::Char(c), KeyModifiers::SHIFT) => {
                self.input.push(c)
            }
            (KeyCode::Backspace, _) => {
                self.input.pop();
            }
            (KeyCode::Tab, _) => self.language = self.language.next(),
            (KeyCode::BackTab, _) => self.language = self.language.previous(),
            (KeyCode::Esc, _) => {
                if !self.is_busy() {
                    self.input.clear();
                    self.output = None;
                    self.status = Status::Idle;
                }
            }
            (KeyCode::Enter, _) => self.apply(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(5),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(f.area());

        let title = Paragraph::new("E-Commerce Text Generation")
            .style(Style::default().fg(Color::Cyan))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, chunks[0]);

        render_input(f, self, chunks[1]);
        render_language_selector(f, self, chunks[2]);
        render_status(f, self, chunks[3]);
        render_output(f, self, chunks[4]);

        let help = Paragraph::new(
            "Enter: Apply, Ctrl+J: New line, Tab/Shift+Tab: Language, Esc: Clear, Ctrl+Q: Quit",
        )
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(help, chunks[5]);
    }

    fn update(&mut self, generation_service: &mut GenerationService) {
        while let Some(response) = generation_service.try_recv_response() {
            self.handle_response(response);
        }

        if let Some(query) = self.queued.take() {
            match generation_service.request_generation(query) {
                Ok(request_id) => self.pending_request = Some(request_id),
                Err(e) => {
                    tracing::warn!("Failed to request generation: {}", e);
                    self.status = Status::Error(e.to_string());
                }
            }
        }
    }
}

fn render_input(f: &mut Frame, form: &FormState, area: Rect) {
    let input = if form.input.is_empty() {
        Paragraph::new(PLACEHOLDER).style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(form.input.as_str()).style(Style::default().fg(Color::Yellow))
    };

    let input = input.wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Enter product information:"),
    );
    f.render_widget(input, area);
}

fn render_language_selector(f: &mut Frame, form: &FormState, area: Rect) {
    let selected_style = Style::default().fg(Color::Yellow).bg(Color::Blue);
    let normal_style = Style::default().fg(Color::White);

    let spans: Vec<Span> = Language::ALL
        .iter()
        .flat_map(|language| {
            let style = if *language == form.language {
                selected_style
            } else {
                normal_style
            };
            [Span::styled(format!(" {} ", language.code()), style), Span::raw(" ")]
        })
        .collect();

    let selector = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Select Output Language"),
    );
    f.render_widget(selector, area);
}

fn render_status(f: &mut Frame, form: &FormState, area: Rect) {
    let (text, color) = match &form.status {
        Status::Idle => ("Ready".to_string(), Color::Green),
        Status::Generating => ("Generating response...".to_string(), Color::Cyan),
        Status::Warning(message) => (message.clone(), Color::Yellow),
        Status::Error(message) => (message.clone(), Color::Red),
    };

    let status = Paragraph::new(text)
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, area);
}

fn render_output(f: &mut Frame, form: &FormState, area: Rect) {
    let Some(output) = &form.output else {
        return;
    };

    let heading = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(Span::styled("JSON Format Answer:", heading)),
        Line::from(output.json_answer.as_str()),
    ];

    if let Outcome::Translated(record) = &output.outcome {
        lines.extend([
            Line::default(),
            Line::from(Span::styled("Product Title:", heading)),
            Line::from(record.title.as_str()),
            Line::default(),
            Line::from(Span::styled("Product Description:", heading)),
            Line::from(record.description.as_str()),
        ]);
    }

    let result = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Result"));
    f.render_widget(result, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ModelProvider;
    use crate::pipeline::Pipeline;
    use crate::prompt::EXAMPLES;
    use crate::record::MALFORMED_RESPONSE_MESSAGE;
    use crate::translation::Translator;
    use ratatui::{Terminal, backend::TestBackend};
    use std::time::Duration;

    struct EchoModel(&'static str);

    impl ModelProvider for EchoModel {
        async fn generate(&self, prompt: &str) -> Result<String> {
            Ok(format!("{prompt}{}", self.0))
        }
    }

    struct Uppercase;

    impl Translator for Uppercase {
        async fn translate(&self, text: &str, _target_language: Language) -> Result<String> {
            Ok(text.to_uppercase())
        }
    }

    fn type_text(form: &mut FormState, text: &str) {
        for c in text.chars() {
            form.handle_key_event(KeyCode::Char(c), KeyModifiers::NONE).unwrap();
        }
    }

    async fn settle(form: &mut FormState, service: &mut GenerationService) {
        form.update(service);
        for _ in 0..200 {
            if !form.is_busy() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
            form.update(service);
        }
        panic!("generation did not finish");
    }

    fn rendered_text(form: &FormState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|f| form.render(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_typing_and_language_cycling() {
        let mut form = FormState::new(Language::En);
        type_text(&mut form, "Tea");
        form.handle_key_event(KeyCode::Backspace, KeyModifiers::NONE).unwrap();
        form.handle_key_event(KeyCode::Tab, KeyModifiers::NONE).unwrap();
        form.handle_key_event(KeyCode::Tab, KeyModifiers::NONE).unwrap();
        form.handle_key_event(KeyCode::BackTab, KeyModifiers::SHIFT).unwrap();

        assert_eq!(form.input, "Te");
        assert_eq!(form.language, Language::Es);
    }

    #[test]
    fn test_empty_input_warns_without_queueing() {
        let mut form = FormState::new(Language::En);
        type_text(&mut form, "   ");
        form.handle_key_event(KeyCode::Enter, KeyModifiers::NONE).unwrap();

        assert!(!form.is_busy());
        assert_eq!(form.status, Status::Warning(EMPTY_INPUT_MESSAGE.to_string()));
    }

    #[test]
    fn test_ctrl_q_quits() {
        let mut form = FormState::new(Language::En);
        let next = form
            .handle_key_event(KeyCode::Char('q'), KeyModifiers::CONTROL)
            .unwrap();
        assert!(matches!(next, Some(AppState::Quit)));
    }

    #[tokio::test]
    async fn test_apply_shows_translated_listing() -> Result<()> {
        let mut service = GenerationService::new(Pipeline::new(EchoModel(EXAMPLES[0].answer), Uppercase))?;
        let mut form = FormState::new(Language::Tr);
        type_text(&mut form, "Rosehip Marmalade, keep it cold");

        form.handle_key_event(KeyCode::Enter, KeyModifiers::NONE)?;
        assert_eq!(form.status, Status::Generating);
        // a second trigger while busy is ignored
        form.handle_key_event(KeyCode::Enter, KeyModifiers::NONE)?;

        settle(&mut form, &mut service).await;

        assert_eq!(form.status, Status::Idle);
        let output = form.output.as_ref().unwrap();
        assert_eq!(output.json_answer, EXAMPLES[0].answer);

        let screen = rendered_text(&form);
        assert!(screen.contains("Product Title:"));
        assert!(screen.contains("ROSEHIP MARMALADE"));
        assert!(service.try_recv_response().is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_answer_shows_json_and_error() -> Result<()> {
        let mut service = GenerationService::new(Pipeline::new(EchoModel("{\"title\": 1}"), Uppercase))?;
        let mut form = FormState::new(Language::En);
        type_text(&mut form, "widget");

        form.handle_key_event(KeyCode::Enter, KeyModifiers::NONE)?;
        settle(&mut form, &mut service).await;

        assert_eq!(form.status, Status::Error(MALFORMED_RESPONSE_MESSAGE.to_string()));
        let screen = rendered_text(&form);
        assert!(screen.contains("JSON Format Answer:"));
        assert!(screen.contains("{\"title\": 1}"));
        assert!(!screen.contains("Product Title:"));

        Ok(())
    }
}
