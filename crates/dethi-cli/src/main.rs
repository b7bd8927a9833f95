use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use dethi_config::Config;
use dethi_engine::parsing::inline::{InlineToken, TableRow, parse_inline};
use dethi_engine::{
    AssetMap, Cmd, FormulaSource, ParsedExam, Question, QuestionType, RawDocument, io,
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block as Panel, Borders, List, ListItem, ListState, Paragraph},
};
use std::{env, io::stdout, path::PathBuf, process};

struct App {
    path: PathBuf,
    doc: RawDocument,
    assets: AssetMap,
    parsed: ParsedExam,
    question_lines: Vec<usize>,
    list_state: ListState,
    answer_idx: usize,
    edit_buffer: Option<String>,
    dirty: bool,
    status: String,
}

impl App {
    fn new(path: PathBuf, asset_suffix: &str) -> Result<Self> {
        let content = io::read_exam(&path)?;
        let assets = io::read_asset_map(&io::asset_map_path(&path, asset_suffix))?;
        let doc = RawDocument::from_bytes(content.as_bytes())?;
        let parsed = doc.parse();
        let question_lines = parsed.questions().map(|q| q.source_line).collect::<Vec<_>>();

        let mut app = Self {
            path,
            doc,
            assets,
            parsed,
            question_lines,
            list_state: ListState::default(),
            answer_idx: 0,
            edit_buffer: None,
            dirty: false,
            status: String::new(),
        };
        if !app.question_lines.is_empty() {
            app.list_state.select(Some(0));
        }
        Ok(app)
    }

    fn selected_question(&self) -> Option<&Question> {
        let idx = self.list_state.selected()?;
        self.parsed.questions().nth(idx)
    }

    fn next_question(&mut self) {
        if self.question_lines.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1) % self.question_lines.len(),
            None => 0,
        };
        self.list_state.select(Some(i));
        self.answer_idx = 0;
    }

    fn previous_question(&mut self) {
        if self.question_lines.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.question_lines.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
        self.answer_idx = 0;
    }

    fn next_answer(&mut self) {
        if let Some(q) = self.selected_question()
            && !q.answers.is_empty()
        {
            self.answer_idx = (self.answer_idx + 1) % q.answers.len();
        }
    }

    fn previous_answer(&mut self) {
        if let Some(q) = self.selected_question()
            && !q.answers.is_empty()
        {
            self.answer_idx = if self.answer_idx == 0 {
                q.answers.len() - 1
            } else {
                self.answer_idx - 1
            };
        }
    }

    /// Activates the selected answer: toggles it, or opens the edit buffer
    /// for a short-answer question.
    fn activate(&mut self) {
        let Some(q) = self.selected_question() else {
            return;
        };
        match q.kind {
            QuestionType::MultipleChoice => {
                if let Some(answer) = q.answers.get(self.answer_idx) {
                    let cmd = Cmd::ToggleChoice {
                        question_line: q.source_line,
                        letter: answer.letter,
                    };
                    self.apply(cmd);
                }
            }
            QuestionType::TrueFalse => {
                if let Some(answer) = q.answers.get(self.answer_idx) {
                    let cmd = Cmd::ToggleAssertion {
                        line: answer.line,
                        letter: answer.letter,
                    };
                    self.apply(cmd);
                }
            }
            QuestionType::ShortAnswer => {
                self.edit_buffer = Some(q.written_answer.clone().unwrap_or_default());
            }
        }
    }

    fn commit_edit(&mut self) {
        if let (Some(text), Some(q)) = (self.edit_buffer.take(), self.selected_question()) {
            let cmd = Cmd::SetWrittenAnswer {
                question_line: q.source_line,
                text,
            };
            self.apply(cmd);
        }
    }

    /// Applies a command and re-runs the forward parse. The scan is linear,
    /// so re-parsing on every edit is cheaper than patching the block list.
    fn apply(&mut self, cmd: Cmd) {
        let (next, _patch) = self.doc.apply(&cmd);
        // Deletions report no inserted ranges, so compare content.
        if next.text() != self.doc.text() {
            self.dirty = true;
        }
        self.doc = next;
        self.parsed = self.doc.parse();
        self.question_lines = self.parsed.questions().map(|q| q.source_line).collect();
        self.status.clear();
    }

    fn save(&mut self) {
        match io::write_exam(&self.path, &self.doc.text()) {
            Ok(()) => {
                self.dirty = false;
                self.status = format!("Đã lưu {}", self.path.display());
            }
            Err(e) => {
                self.status = format!("Lỗi khi lưu: {e}");
            }
        }
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <exam-file>", args[0]);
        eprintln!("Relative paths are resolved against the configured exams folder.");
        process::exit(1);
    }

    let (path, asset_suffix) = resolve_exam_path(&args[1]);
    if !path.exists() {
        eprintln!("Error: exam file '{}' not found", path.display());
        process::exit(1);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(path, &asset_suffix)?;
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// A bare file name is looked up in the configured exams folder; anything
/// else is used as given. The config also supplies the sidecar suffix.
fn resolve_exam_path(arg: &str) -> (PathBuf, String) {
    let direct = PathBuf::from(arg);
    match Config::load() {
        Ok(Some(config)) => {
            let path = if direct.exists() || direct.is_absolute() {
                direct
            } else {
                config.exams_path.join(arg)
            };
            (path, config.asset_suffix)
        }
        _ => (direct, "assets.json".to_string()),
    }
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    <B as ratatui::backend::Backend>::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            // Short-answer edit mode captures all keys first.
            if app.edit_buffer.is_some() {
                match key.code {
                    KeyCode::Enter => app.commit_edit(),
                    KeyCode::Esc => app.edit_buffer = None,
                    KeyCode::Backspace => {
                        if let Some(buffer) = app.edit_buffer.as_mut() {
                            buffer.pop();
                        }
                    }
                    KeyCode::Char(c) => {
                        if let Some(buffer) = app.edit_buffer.as_mut() {
                            buffer.push(c);
                        }
                    }
                    _ => {}
                }
                continue;
            }

            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next_question(),
                KeyCode::Up | KeyCode::Char('k') => app.previous_question(),
                KeyCode::Right | KeyCode::Tab => app.next_answer(),
                KeyCode::Left => app.previous_answer(),
                KeyCode::Enter | KeyCode::Char(' ') => app.activate(),
                KeyCode::Char('s') => app.save(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)].as_ref())
        .split(f.area());

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)].as_ref())
        .split(outer[0]);

    // Question list panel
    let items: Vec<ListItem> = app
        .parsed
        .questions()
        .map(|q| {
            let marker = match q.kind {
                QuestionType::MultipleChoice => q
                    .answers
                    .iter()
                    .find(|a| a.is_correct)
                    .map(|a| format!(" [{}]", a.letter))
                    .unwrap_or_default(),
                QuestionType::TrueFalse => {
                    let marked = q.answers.iter().filter(|a| a.is_correct).count();
                    format!(" [{}/{}]", marked, q.answers.len())
                }
                QuestionType::ShortAnswer => q
                    .written_answer
                    .as_ref()
                    .map(|v| format!(" [{v}]"))
                    .unwrap_or_default(),
            };
            ListItem::new(Line::from(format!("Câu {}{}", q.index, marker)))
        })
        .collect();

    let title = format!(
        "Câu hỏi ({}){}",
        app.question_lines.len(),
        if app.dirty { " *" } else { "" }
    );
    let list = List::new(items)
        .block(Panel::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));
    f.render_stateful_widget(list, chunks[0], &mut app.list_state);

    // Detail panel
    let detail = match app.selected_question() {
        Some(q) => render_question(q, app.answer_idx, app.edit_buffer.as_deref(), &app.assets),
        None => vec![Line::from("Không tìm thấy câu hỏi nào trong đề.")],
    };
    let detail_title = app
        .selected_question()
        .map(|q| format!("Câu {} (dòng {})", q.index, q.source_line))
        .unwrap_or_else(|| "Nội dung".to_string());
    let content = Paragraph::new(detail)
        .block(Panel::default().borders(Borders::ALL).title(detail_title))
        .wrap(ratatui::widgets::Wrap { trim: false });
    f.render_widget(content, chunks[1]);

    // Help + status footer
    let help = Line::from(vec![
        Span::raw("q: Thoát | "),
        Span::raw("↑/↓: Chọn câu | "),
        Span::raw("←/→: Chọn đáp án | "),
        Span::raw("Enter: Đánh dấu/Sửa | "),
        Span::raw("s: Lưu"),
    ]);
    let status = Line::from(Span::styled(
        app.status.clone(),
        Style::default().fg(Color::Green),
    ));
    f.render_widget(Paragraph::new(vec![help, status]), outer[1]);
}

fn render_question<'a>(
    q: &'a Question,
    answer_idx: usize,
    edit_buffer: Option<&'a str>,
    assets: &AssetMap,
) -> Vec<Line<'a>> {
    let mut lines = Vec::new();

    for content in &q.content {
        if let Some(cells) = TableRow::cells(content) {
            lines.push(Line::from(Span::styled(
                format!("│ {} │", cells.join(" │ ")),
                Style::default().fg(Color::Blue),
            )));
        } else {
            lines.push(render_inline(content, assets));
        }
    }
    lines.push(Line::from(""));

    match q.kind {
        QuestionType::ShortAnswer => {
            let value = match edit_buffer {
                Some(buffer) => format!("Đáp án: {buffer}▏"),
                None => match &q.written_answer {
                    Some(v) => format!("Đáp án: {v}"),
                    None => "Đáp án: (chưa có, Enter để nhập)".to_string(),
                },
            };
            lines.push(Line::from(Span::styled(
                value,
                Style::default().add_modifier(Modifier::BOLD),
            )));
        }
        QuestionType::MultipleChoice | QuestionType::TrueFalse => {
            for (i, answer) in q.answers.iter().enumerate() {
                let mark = if answer.is_correct { "✓" } else { " " };
                let mut style = if answer.is_correct {
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                if i == answer_idx {
                    style = style.bg(Color::DarkGray);
                }
                let mut spans = vec![Span::styled(
                    format!("{mark} {}{} ", answer.letter, delimiter_for(q.kind)),
                    style,
                )];
                spans.extend(inline_spans(&answer.content, assets, style));
                lines.push(Line::from(spans));
            }
        }
    }

    lines
}

fn delimiter_for(kind: QuestionType) -> char {
    match kind {
        QuestionType::TrueFalse => ')',
        _ => '.',
    }
}

fn render_inline<'a>(text: &'a str, assets: &AssetMap) -> Line<'a> {
    Line::from(inline_spans(text, assets, Style::default()))
}

/// Converts inline tokens to styled spans, resolving asset references with
/// visible fallbacks: a missing id renders a placeholder, never an error.
fn inline_spans<'a>(text: &'a str, assets: &AssetMap, base: Style) -> Vec<Span<'a>> {
    parse_inline(text)
        .into_iter()
        .map(|token| match token {
            InlineToken::Text(t) => Span::styled(t, base),
            InlineToken::Bold(t) => Span::styled(t, base.add_modifier(Modifier::BOLD)),
            InlineToken::Image { id } => {
                if assets.image_src(&id).is_some() {
                    Span::styled(format!("[hình {id}]"), base.fg(Color::Yellow))
                } else {
                    Span::styled(format!("[thiếu hình {id}]"), base.fg(Color::Red))
                }
            }
            InlineToken::Formula { id } => match assets.formula(&id) {
                FormulaSource::Latex(latex) => {
                    Span::styled(latex, base.fg(Color::Cyan).add_modifier(Modifier::ITALIC))
                }
                FormulaSource::Image(_) => {
                    Span::styled(format!("[công thức {id}]"), base.fg(Color::Yellow))
                }
                FormulaSource::Badge(id) => {
                    Span::styled(format!("({id})"), base.fg(Color::Magenta))
                }
            },
        })
        .collect()
}
