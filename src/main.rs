mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
};
use wfhtrack::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    feedback::{FeedbackPlayer, SilentPlayer, TerminalBell},
    logging,
    rate::PayPeriod,
    runtime::{
        AppEvent, AppEventSource, CrosstermEventSource, FixedTicker, Runner, Ticker,
        FRAME_INTERVAL_RANGE,
    },
    session::{SessionConfig, SessionController},
};

/// watch your pay tick up in real time while you work
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Turns your salary into a live earnings counter that ticks once per second while you work, with a shower of coins every time another ten units land in your pocket."
)]
pub struct Cli {
    /// salary amount, quoted per pay period
    #[clap(short = 's', long)]
    salary: Option<String>,

    /// how often the salary is paid
    #[clap(short = 'p', long, value_enum)]
    period: Option<PayPeriod>,

    /// currency symbol shown in front of amounts
    #[clap(short = 'c', long)]
    currency: Option<String>,

    /// start with the coin animation switched off
    #[clap(long)]
    no_animation: bool,

    /// never ring the terminal bell on coin drops
    #[clap(long)]
    mute: bool,

    /// milliseconds between redraws
    #[clap(long, value_parser = clap::value_parser!(u64).range(FRAME_INTERVAL_RANGE))]
    frame_ms: Option<u64>,

    /// preferences file to use instead of the default location
    #[clap(long)]
    config: Option<PathBuf>,

    /// write the effective preferences back to the config file
    #[clap(long)]
    save_config: bool,

    /// log filter for the log file (RUST_LOG takes precedence)
    #[clap(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    /// Command line values win over whatever the config file says
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(salary) = &self.salary {
            config.salary = Some(salary.clone());
        }
        if let Some(period) = self.period {
            config.pay_period = period;
        }
        if let Some(currency) = &self.currency {
            config.currency_symbol = currency.clone();
        }
        if self.no_animation {
            config.animation = false;
        }
        if self.mute {
            config.sound = false;
        }
        if let Some(frame_ms) = self.frame_ms {
            config.frame_ms = frame_ms;
        }
        config
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ExitType {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub session: SessionController,
    pub currency_symbol: String,
}

impl App {
    pub fn new(config: &Config, player: Box<dyn FeedbackPlayer>) -> Self {
        Self {
            session: SessionController::new(SessionConfig::from(config)).with_player(player),
            currency_symbol: config.currency_symbol.clone(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> ExitType {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => return ExitType::Quit,
                KeyCode::Char('u') => self.session.clear_salary_input(),
                _ => {}
            }
            return ExitType::Continue;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return ExitType::Quit,
            KeyCode::Char(' ') | KeyCode::Enter => self.session.toggle(),
            KeyCode::Char('r') => self.session.reset(),
            KeyCode::Char('a') => self.session.toggle_feedback(),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Char('p') => {
                self.session.cycle_pay_period()
            }
            KeyCode::Backspace => self.session.pop_salary_char(),
            KeyCode::Char(c) => {
                self.session.push_salary_char(c);
            }
            _ => {}
        }
        ExitType::Continue
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    // runs without a subscriber if the log file can't be opened
    if let Some(path) = AppDirs::log_path() {
        if let Err(err) = logging::init_file_logging(&path, &cli.log_level) {
            eprintln!("wfhtrack: logging disabled ({}): {err}", path.display());
        }
    }

    let store = cli.config_store();
    let config = cli.apply_to(store.load());
    if cli.save_config {
        store.save(&config)?;
        tracing::info!(path = %store.path().display(), "saved preferences");
    }

    let player: Box<dyn FeedbackPlayer> = if config.sound {
        Box::new(TerminalBell::stdout())
    } else {
        Box::new(SilentPlayer)
    };
    let mut app = App::new(&config, player);
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(config.frame_interval()),
    );

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    tracing::info!(total = app.session.total(), "exiting");
    result
}

fn start_tui<B: Backend, E: AppEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    let size = terminal.size()?;
    app.session.set_viewport_width(size.width);
    terminal.draw(|f| ui(app, f))?;

    loop {
        let input_changed = match runner.step() {
            AppEvent::Tick => false,
            AppEvent::Resize(width, _) => {
                app.session.set_viewport_width(width);
                true
            }
            AppEvent::Key(key) => {
                if app.on_key(key) == ExitType::Quit {
                    break;
                }
                true
            }
        };

        let report = app.session.poll();

        // coins animate between ticks, so keep drawing while any are alive
        if input_changed || report.changed() || app.session.active_cue_count() > 0 {
            terminal.draw(|f| ui(app, f))?;
        }
    }

    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    f.render_widget(&*app, f.area());
}
