use std::error::Error;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use legalrag::{
    Answer, AnswerEngine, Config, OllamaEmbedder, OpenAiGenerator, index_corpus, snippet,
    strip_markup,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Margin};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

const SNIPPET_CHARS: usize = 350;

const GREETING: &str = "Legal assistant online. Ask about the Bharatiya Nyaya Sanhita, \
the IPC, the Evidence Act, or any other Indian law; answers cite the applicable sections.";

#[derive(Parser)]
#[command(name = "legalcli", version, about = "Question answering over Indian legal documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask a single question and print the answer with its sources.
    Ask {
        /// The question, as free text.
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,
    },
    /// Embed the document corpus and persist the collection.
    Index {
        /// Directory to index instead of the configured source directory.
        dir: Option<String>,
    },
    /// Interactive chat session over the indexed collection.
    Chat,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let cli = Cli::parse();
    let cfg = Config::from_env();

    let result = match cli.command {
        Command::Ask { question } => run_ask(&cfg, &question.join(" ")),
        Command::Index { dir } => run_index(&cfg, dir.as_deref()),
        Command::Chat => run_chat(&cfg),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn open_engine(cfg: &Config) -> legalrag::Result<AnswerEngine> {
    let embedder = Arc::new(OllamaEmbedder::from_config(cfg));
    let generator = Arc::new(OpenAiGenerator::from_config(cfg));
    AnswerEngine::open(cfg, embedder, generator)
}

fn run_ask(cfg: &Config, question: &str) -> Result<(), Box<dyn Error>> {
    let engine = open_engine(cfg)?;

    println!("\nLegal query: {question}");
    let answer = engine.answer(question)?;

    println!("\n=== ANSWER ===\n");
    println!("{}", answer.text);

    println!("\n=== SOURCES ===\n");
    if answer.sources.is_empty() {
        println!("No source documents returned.");
        return Ok(());
    }
    for (i, source) in answer.sources.iter().enumerate() {
        println!("{}. {} (page {})", i + 1, source.source, source.page);
        println!("   \"{}...\"", snippet(&source.text, SNIPPET_CHARS));
        println!();
    }
    Ok(())
}

fn run_index(cfg: &Config, dir: Option<&str>) -> Result<(), Box<dyn Error>> {
    let embedder = OllamaEmbedder::from_config(cfg);
    let count = index_corpus(cfg, &embedder, dir)?;
    println!(
        "Indexed {count} chunks into collection '{}' at {}",
        cfg.collection, cfg.persist_dir
    );
    Ok(())
}

fn run_chat(cfg: &Config) -> Result<(), Box<dyn Error>> {
    // Open the engine before touching the terminal so startup errors print
    // like any other CLI failure.
    let engine = Arc::new(open_engine(cfg)?);
    let runtime = tokio::runtime::Runtime::new()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(engine);
    let res = runtime.block_on(run_app(&mut terminal, &mut app));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.map_err(Into::into)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
    User,
    Agent,
}

struct ChatMessage {
    role: Role,
    content: String,
}

struct App {
    input: String,
    cursor: usize,
    history: Vec<ChatMessage>,
    engine: Arc<AnswerEngine>,
    scroll: usize,
    content_len: usize,
    view_height: usize,
    auto_scroll: bool,
    is_loading: bool,
    spinner_idx: usize,
}

impl App {
    fn new(engine: Arc<AnswerEngine>) -> Self {
        Self {
            input: String::new(),
            cursor: 0,
            history: vec![ChatMessage { role: Role::Agent, content: GREETING.to_string() }],
            engine,
            scroll: 0,
            content_len: 0,
            view_height: 0,
            auto_scroll: true,
            is_loading: false,
            spinner_idx: 0,
        }
    }

    fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor, c);
        self.cursor += 1;
    }

    fn delete_char(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        self.input.remove(self.cursor);
    }

    fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    fn move_right(&mut self) {
        if self.cursor < self.input.len() {
            self.cursor += 1;
        }
    }

    fn submit(&mut self, tx: mpsc::UnboundedSender<Result<Answer, String>>) {
        if self.input.trim().is_empty() || self.is_loading {
            return;
        }

        let question = self.input.trim().to_string();
        self.history.push(ChatMessage { role: Role::User, content: question.clone() });
        self.is_loading = true;
        self.auto_scroll = true;

        let engine = self.engine.clone();
        tokio::task::spawn_blocking(move || {
            let result = engine.answer(&question).map_err(|err| err.to_string());
            let _ = tx.send(result);
        });

        self.input.clear();
        self.cursor = 0;
    }

    fn receive(&mut self, result: Result<Answer, String>) {
        self.is_loading = false;
        let content = match result {
            // History keeps the cleaned answer; the raw markup is gone.
            Ok(answer) => {
                let mut content = strip_markup(&answer.text);
                content.push_str(&sources_note(&answer));
                content
            }
            Err(err) => format!("Error: {err}"),
        };
        self.history.push(ChatMessage { role: Role::Agent, content });
        self.auto_scroll = true;
    }

    fn scroll_up(&mut self, by: usize) {
        self.scroll = self.scroll.saturating_sub(by);
    }

    fn scroll_down(&mut self, by: usize) {
        let max_scroll = self.content_len.saturating_sub(self.view_height);
        self.scroll = (self.scroll + by).min(max_scroll);
    }

    fn scroll_to_start(&mut self) {
        self.scroll = 0;
    }

    fn scroll_to_end(&mut self) {
        self.scroll = self.content_len.saturating_sub(self.view_height);
    }

    fn history_text(&self) -> String {
        let mut blocks: Vec<String> = self
            .history
            .iter()
            .map(|msg| {
                let label = match msg.role {
                    Role::User => "You",
                    Role::Agent => "Agent",
                };
                format!("{label}:\n{}", msg.content)
            })
            .collect();
        if self.is_loading {
            blocks.push("Agent:\nThinking...".to_string());
        }
        blocks.join("\n\n")
    }
}

fn sources_note(answer: &Answer) -> String {
    if answer.sources.is_empty() {
        return String::new();
    }
    let mut note = String::from("\n\nSources:\n");
    for (i, source) in answer.sources.iter().enumerate() {
        note.push_str(&format!("{}. {} (page {})\n", i + 1, source.source, source.page));
    }
    note.trim_end().to_string()
}

fn inner_width(area: ratatui::layout::Rect) -> usize {
    area.width.saturating_sub(2) as usize
}

fn inner_height(area: ratatui::layout::Rect) -> usize {
    area.height.saturating_sub(2) as usize
}

fn truncate_input(input: &str, cursor: usize, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    let len = input.len();
    if len <= max_width {
        return input.to_string();
    }
    let cursor = cursor.min(len);
    let mut start = cursor.saturating_sub(max_width / 2);
    if start + max_width > len {
        start = len - max_width;
    }
    input[start..start + max_width].to_string()
}

fn line_count(text: &str) -> usize {
    let count = text.lines().count();
    if count == 0 { 1 } else { count }
}

fn cursor_x_in_view(input: &str, cursor: usize, max_width: usize) -> usize {
    if max_width == 0 {
        return 0;
    }
    let len = input.len();
    if len <= max_width {
        return cursor.min(len);
    }
    let cursor = cursor.min(len);
    let mut start = cursor.saturating_sub(max_width / 2);
    if start + max_width > len {
        start = len - max_width;
    }
    cursor.saturating_sub(start).min(max_width)
}

fn draw_ui(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    let spinner = ["|", "/", "-", "\\"];

    terminal.draw(|frame| {
        let title_style = Style::default().fg(Color::Black).add_modifier(Modifier::BOLD);
        let history_border = Style::default().fg(Color::Black);
        let input_border = Style::default().fg(Color::DarkGray);
        let help_border = Style::default().fg(Color::DarkGray);
        let history_text_style = Style::default().fg(Color::Blue);
        let help_text_style = Style::default().fg(Color::DarkGray);
        let input_text_style = Style::default().fg(Color::DarkGray);

        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(8),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(area);

        let history_title = if app.is_loading {
            format!("Conversation {}", spinner[app.spinner_idx])
        } else {
            "Conversation".to_string()
        };
        let history_block = Block::bordered()
            .title(history_title)
            .title_style(title_style)
            .border_style(history_border);

        let history_text = app.history_text();
        app.content_len = line_count(&history_text);
        app.view_height = inner_height(chunks[0]);
        let max_scroll = app.content_len.saturating_sub(app.view_height);
        if app.auto_scroll {
            app.scroll = max_scroll;
            app.auto_scroll = false;
        } else if app.scroll > max_scroll {
            app.scroll = max_scroll;
        }

        let history = Paragraph::new(history_text)
            .style(history_text_style)
            .scroll((app.scroll as u16, 0))
            .wrap(Wrap { trim: true })
            .block(history_block);
        frame.render_widget(history, chunks[0]);

        let mut scrollbar_state = ScrollbarState::new(app.content_len).position(app.scroll);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .track_style(Style::default().fg(Color::DarkGray))
            .thumb_style(Style::default().fg(Color::Blue));
        frame.render_stateful_widget(
            scrollbar,
            chunks[0].inner(Margin { vertical: 1, horizontal: 0 }),
            &mut scrollbar_state,
        );

        let input_block = Block::bordered()
            .title("Question")
            .title_style(title_style)
            .border_style(input_border);
        let input_view = truncate_input(&app.input, app.cursor, inner_width(chunks[1]));
        let input = Paragraph::new(input_view)
            .style(input_text_style)
            .block(input_block)
            .wrap(Wrap { trim: false });
        frame.render_widget(input, chunks[1]);

        let cursor_x = cursor_x_in_view(&app.input, app.cursor, inner_width(chunks[1]));
        let x = chunks[1].x + 1 + cursor_x as u16;
        let y = chunks[1].y + 1;
        frame.set_cursor_position((x, y));

        let help_block = Block::bordered()
            .title("Controls")
            .title_style(title_style)
            .border_style(help_border);
        let help = Paragraph::new(
            "Enter: Ask | Up/Down/PgUp/PgDn/Home/End: Scroll | Esc/Ctrl+C: Quit",
        )
        .style(help_text_style)
        .wrap(Wrap { trim: true })
        .block(help_block);
        frame.render_widget(help, chunks[2]);
    })?;

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> io::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Result<Answer, String>>();
    let mut events = EventStream::new();
    let mut spinner_tick = tokio::time::interval(Duration::from_millis(100));
    spinner_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    draw_ui(terminal, app)?;

    loop {
        tokio::select! {
            _ = spinner_tick.tick() => {
                if app.is_loading {
                    app.spinner_idx = (app.spinner_idx + 1) % 4;
                    draw_ui(terminal, app)?;
                }
            }
            maybe_result = rx.recv() => {
                if let Some(result) = maybe_result {
                    app.receive(result);
                    draw_ui(terminal, app)?;
                }
            }
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        match key.code {
                            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
                            KeyCode::Esc => return Ok(()),
                            KeyCode::Enter => app.submit(tx.clone()),
                            KeyCode::Up => app.scroll_up(1),
                            KeyCode::Down => app.scroll_down(1),
                            KeyCode::PageUp => app.scroll_up(app.view_height.max(1)),
                            KeyCode::PageDown => app.scroll_down(app.view_height.max(1)),
                            KeyCode::Home => app.scroll_to_start(),
                            KeyCode::End => app.scroll_to_end(),
                            KeyCode::Left => app.move_left(),
                            KeyCode::Right => app.move_right(),
                            KeyCode::Backspace => app.delete_char(),
                            KeyCode::Char(ch) => app.insert_char(ch),
                            _ => {}
                        }
                        draw_ui(terminal, app)?;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) => {}
                    None => return Ok(()),
                }
            }
        }
    }
}
