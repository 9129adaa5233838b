pub mod ui;

use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use gomi_quiz::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    dictionary::DictionarySource,
    item::CHOICES,
    logging,
    quiz::QuizSession,
    runtime::{spawn_fetch, CrosstermEventSource, FixedTicker, QuizEvent, Runner},
    session::Phase,
    share::{BrowserSharer, Sharer},
    source::{HttpQuestionSource, QuestionSource},
    view::{QuizView, ViewScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

const TICK_RATE_MS: u64 = 100;

/// timed waste-sorting quiz for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A timed waste-sorting quiz: sort as many items into the right bin as you can before the clock runs out, then review every answer and share your score."
)]
pub struct Cli {
    /// quiz server to fetch questions from
    #[clap(long)]
    server: Option<String>,

    /// maximum number of questions per session
    #[clap(short = 'n', long)]
    limit: Option<usize>,

    /// number of seconds on the clock
    #[clap(short = 's', long)]
    time: Option<i64>,

    /// read questions from a dictionary CSV instead of the server
    #[clap(short = 'd', long, conflicts_with = "offline")]
    dictionary: Option<PathBuf>,

    /// use the bundled dictionary and never touch the network
    #[clap(long)]
    offline: bool,

    /// page address to embed in share links
    #[clap(long)]
    share_url: Option<String>,

    /// log filter used when RUST_LOG is unset
    #[clap(long)]
    log_level: Option<String>,

    /// write the effective settings back to the config file
    #[clap(long)]
    save_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SourceKind {
    Server,
    Dictionary,
    Bundled,
}

impl Cli {
    /// Overlay command line values on top of the stored configuration
    fn apply(&self, cfg: &mut Config) {
        if let Some(server) = &self.server {
            cfg.server_url = server.clone();
        }
        if let Some(limit) = self.limit {
            cfg.question_limit = limit;
        }
        if let Some(time) = self.time {
            cfg.time_limit_secs = time;
        }
        if let Some(path) = &self.dictionary {
            cfg.dictionary_path = Some(path.clone());
        }
        if let Some(url) = &self.share_url {
            cfg.share_url = Some(url.clone());
        }
        if let Some(level) = &self.log_level {
            cfg.log_level = level.clone();
        }
    }

    fn source_kind(&self, cfg: &Config) -> SourceKind {
        if self.offline {
            SourceKind::Bundled
        } else if cfg.dictionary_path.is_some() {
            SourceKind::Dictionary
        } else {
            SourceKind::Server
        }
    }
}

fn build_source(kind: SourceKind, cfg: &Config) -> Result<Arc<dyn QuestionSource>, Box<dyn Error>> {
    let source: Arc<dyn QuestionSource> = match (kind, cfg.dictionary_path.as_ref()) {
        (SourceKind::Dictionary, Some(path)) => Arc::new(DictionarySource::from_path(path)),
        (SourceKind::Bundled, _) | (SourceKind::Dictionary, None) => {
            Arc::new(DictionarySource::bundled())
        }
        (SourceKind::Server, _) => Arc::new(HttpQuestionSource::new(
            cfg.server_url.clone(),
            cfg.request_timeout(),
        )?),
    };
    Ok(source)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub session: QuizSession<QuizView>,
    pub config: Config,
    pub source_kind: SourceKind,
    source: Arc<dyn QuestionSource>,
    sharer: Box<dyn Sharer>,
}

impl App {
    pub fn new(
        config: Config,
        source_kind: SourceKind,
        source: Arc<dyn QuestionSource>,
        sharer: Box<dyn Sharer>,
    ) -> Self {
        Self {
            session: QuizSession::new(config.session_config(), QuizView::default()),
            config,
            source_kind,
            source,
            sharer,
        }
    }

    pub fn view(&self) -> &QuizView {
        self.session.sink()
    }

    pub fn share_available(&self) -> bool {
        self.sharer.is_available()
    }

    /// Kick off a new session; questions arrive later as `QuizEvent::Loaded`.
    pub fn start(&mut self, tx: std::sync::mpsc::Sender<QuizEvent>) {
        let ticket = self.session.begin_start();
        tracing::info!(source = %self.source_kind, limit = ticket.limit, "starting quiz");
        spawn_fetch(Arc::clone(&self.source), ticket, tx);
    }

    pub fn share(&self) {
        if !self.sharer.is_available() {
            return;
        }
        let Some(url) = self
            .session
            .share_link(&self.config.title, self.config.page_url())
        else {
            return;
        };
        if let Err(err) = self.sharer.share(&url) {
            tracing::warn!(error = %err, "could not open share link");
        }
    }

    pub fn on_event(
        &mut self,
        event: QuizEvent,
        now: Instant,
        tx: &std::sync::mpsc::Sender<QuizEvent>,
    ) -> Flow {
        // deadlines first, so a key press never lands after the clock ran out
        self.session.poll(now);

        match event {
            QuizEvent::Tick | QuizEvent::Resize => Flow::Continue,
            QuizEvent::Loaded { ticket, result } => {
                if let Err(err) = self.session.finish_start(ticket, result, now) {
                    tracing::error!(error = %err, "session could not start");
                }
                Flow::Continue
            }
            QuizEvent::Key(key) => self.on_key(key, now, tx),
        }
    }

    fn on_key(
        &mut self,
        key: KeyEvent,
        now: Instant,
        tx: &std::sync::mpsc::Sender<QuizEvent>,
    ) -> Flow {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Flow::Quit;
        }

        match self.view().screen() {
            ViewScreen::Intro => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    self.start(tx.clone());
                }
            }
            ViewScreen::Loading => {}
            ViewScreen::Question => match key.code {
                KeyCode::Left | KeyCode::Char('h') => self.session.sink_mut().select_previous(),
                KeyCode::Right | KeyCode::Char('l') => self.session.sink_mut().select_next(),
                KeyCode::Enter | KeyCode::Char(' ') => {
                    let choice = self.view().selected_choice();
                    self.session.answer(choice, now);
                }
                KeyCode::Char(c) => {
                    if let Some(idx) = c.to_digit(10).and_then(|d| (d as usize).checked_sub(1)) {
                        if let Some(choice) = CHOICES.get(idx) {
                            self.session.sink_mut().selected = idx;
                            self.session.answer(choice, now);
                        }
                    }
                }
                _ => {}
            },
            ViewScreen::Summary => match key.code {
                KeyCode::Char('r') => self.session.reset(),
                KeyCode::Char('t') => self.share(),
                KeyCode::Up | KeyCode::Char('k') => self.session.sink_mut().scroll_up(1),
                KeyCode::Down | KeyCode::Char('j') => self.session.sink_mut().scroll_down(1),
                KeyCode::PageUp => self.session.sink_mut().scroll_up(10),
                KeyCode::PageDown => self.session.sink_mut().scroll_down(10),
                KeyCode::Home => self.session.sink_mut().summary_scroll = 0,
                _ => {}
            },
        }
        Flow::Continue
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let loaded = store.try_load();
    let mut config = match &loaded {
        Ok(Some(cfg)) => cfg.clone(),
        _ => Config::default(),
    };
    cli.apply(&mut config);

    let log_dir = AppDirs::state_dir().unwrap_or_else(|| PathBuf::from("."));
    let _log_guard = logging::init(&log_dir, &config.log_level)?;
    let config_path = store.path().display();
    match loaded {
        Ok(Some(_)) => tracing::info!(path = %config_path, "config loaded"),
        Ok(None) => tracing::debug!(path = %config_path, "no config file, using defaults"),
        Err(err) => tracing::warn!(path = %config_path, error = %err, "ignoring unreadable config"),
    }
    tracing::info!(config = ?config, "gomi-quiz starting");

    if cli.save_config {
        store.save(&config)?;
    }

    let kind = cli.source_kind(&config);
    let source = build_source(kind, &config)?;
    let mut app = App::new(config, kind, source, Box::new(BrowserSharer));

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn redraw<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let area = terminal.draw(|f| ui::draw(app, f))?.area;
    app.session
        .sink_mut()
        .set_summary_viewport(ui::summary_table::table_height(area));
    Ok(())
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let tx = runner.sender();

    redraw(terminal, app)?;

    loop {
        let event = runner.step();
        let needs_redraw = match &event {
            QuizEvent::Tick => app.session.phase() == Phase::Running,
            _ => true,
        };

        if app.on_event(event, Instant::now(), &tx) == Flow::Quit {
            break;
        }

        if needs_redraw {
            redraw(terminal, app)?;
        }
    }

    tracing::info!("gomi-quiz exiting");
    Ok(())
}
