use std::fs::OpenOptions;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use colored::Colorize;
use crossterm::{
    event::{self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use flume::{Receiver, Sender};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color as TColor, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use tokio::runtime::Runtime;
use tracing::info;
use tracing_subscriber::EnvFilter;

use uno_duel::config::Config;
use uno_duel::error::UnoError;
use uno_duel::game::computer::Computer;
use uno_duel::game::deck::{seeded_rng, Dealer, Deck};
use uno_duel::game::save::SaveStore;
use uno_duel::game::{
    CardView, Color as UColor, Command, GameEvent as GE, Input, Opponent, Phase, Sequencer, Side,
    UnoCard,
};
use uno_duel::ports::bus::{ChannelHandler, EventBus, TracingLogger};
use uno_duel::protocol::{transport, PeerLink, RemoteOpponent};

#[derive(Parser, Debug)]
#[command(name = "uno", about = "Two-player Uno against the computer or over the network")]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
    /// Name shown to a network opponent.
    #[arg(long, global = true)]
    name: Option<String>,
    /// JSON config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Ignore any saved round.
    #[arg(long, global = true)]
    new: bool,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Play against the computer.
    Computer,
    /// Host a game and wait for a friend.
    Host { port: Option<u16> },
    /// Join a hosted game at `host:port`.
    Join { addr: String },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum UiMode {
    #[default]
    Normal,
    ColorPick {
        card_index: usize,
    },
    DrawnCardPlayable {
        card_index: usize,
    },
    Chat,
}

#[derive(Default)]
struct AppState {
    cursor: usize,
    mode: UiMode,
    color_pick_index: usize,
    chat: String,
    log: Vec<String>,
    input_hint: String,
}

impl AppState {
    fn push_log<S: Into<String>>(&mut self, s: S) {
        self.log.push(s.into());
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(name) = &cli.name {
        config.name = name.clone();
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if cli.new {
        config.resume = false;
    }
    init_logging(&config)?;

    let (cmd_tx, cmd_rx) = flume::unbounded::<Command>();
    let (ev_tx, ev_rx) = flume::unbounded::<GE>();
    let mut bus = EventBus::new();
    bus.register_handler(Box::new(TracingLogger));
    bus.register_handler(Box::new(ChannelHandler::new(ev_tx)));

    let runtime = Runtime::new()?;
    let mut app = AppState {
        input_hint: "←/→ select\nEnter play\nD draw\nK keep drawn card\nT chat\nQ quit".into(),
        ..AppState::default()
    };
    let deck = Deck::new(seeded_rng(config.seed), config.max_power_diff);
    let rng = seeded_rng(config.seed.map(|s| s.wrapping_add(1)));
    let opponent: Box<dyn Opponent> = match &cli.mode {
        Mode::Computer => {
            let store = SaveStore::new(&config.save_dir, "computer");
            let dealer = Dealer::new(deck, Some(store), config.resume);
            Box::new(Computer::new(dealer, rng, config.ai.clone()))
        }
        Mode::Host { port } => {
            let port = port.unwrap_or(config.net.port);
            let link = PeerLink::new(config.net.clone(), &config.name);
            let store = SaveStore::new(&config.save_dir, "server");
            let dealer = Dealer::new(deck, Some(store), config.resume);
            // the opponent enables its replies before any line can arrive
            let opponent = RemoteOpponent::server(link.clone(), dealer, rng);
            let listener = runtime.block_on(transport::listen(port))?;
            spawn_transport(
                &runtime,
                transport::run_server(listener, link, cmd_tx.clone()),
                cmd_tx.clone(),
            );
            app.push_log(format!("waiting for an opponent on port {}", port));
            Box::new(opponent)
        }
        Mode::Join { addr } => {
            let link = PeerLink::new(config.net.clone(), &config.name);
            let opponent = RemoteOpponent::client(link.clone());
            spawn_transport(
                &runtime,
                transport::run_client(addr.clone(), link, cmd_tx.clone()),
                cmd_tx.clone(),
            );
            app.push_log(format!("connecting to {}", addr));
            Box::new(opponent)
        }
    };

    let mut seq = Sequencer::new(opponent, cmd_rx, bus, config.timing.clone());
    if matches!(cli.mode, Mode::Computer) {
        // a failure here is kept by the sequencer and reported below
        let _ = seq.begin(Instant::now());
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let result = run_app(&mut terminal, &mut app, &mut seq, &cmd_tx, &ev_rx, &config);
    seq.shutdown();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    runtime.shutdown_timeout(Duration::from_millis(500));
    result?;

    if let Some(e) = seq.fatal() {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
    info!("bye");
    Ok(())
}

fn init_logging(config: &Config) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.save_dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.save_dir.join("uno.log"))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn spawn_transport<F>(runtime: &Runtime, task: F, commands: Sender<Command>)
where
    F: Future<Output = Result<(), UnoError>> + Send + 'static,
{
    runtime.spawn(async move {
        if let Err(e) = task.await {
            let _ = commands.send(Command::Fatal(e));
        }
    });
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    seq: &mut Sequencer,
    tx: &Sender<Command>,
    events: &Receiver<GE>,
    config: &Config,
) -> io::Result<()> {
    let tick = config.timing.tick();
    let redraw = Duration::from_millis(50);
    let mut last_draw: Option<Instant> = None;
    loop {
        let now = Instant::now();
        let alive = seq.tick(now).is_ok();
        while let Ok(event) = events.try_recv() {
            handle_event(app, &event);
        }
        if !alive {
            return Ok(());
        }
        if last_draw.map_or(true, |t| now.duration_since(t) >= redraw) {
            terminal.draw(|f| ui(f, app, seq, now))?;
            last_draw = Some(now);
        }
        if event::poll(tick)? {
            if let CEvent::Key(key) = event::read()? {
                if should_quit(key, app, seq, tx) {
                    return Ok(());
                }
            }
        }
    }
}

// ---------------- keys ----------------
fn should_quit(key: KeyEvent, app: &mut AppState, seq: &Sequencer, tx: &Sender<Command>) -> bool {
    let is_nav = matches!(
        key.code,
        KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down
    );
    let allow = if is_nav {
        matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat)
    } else {
        matches!(key.kind, KeyEventKind::Press)
    };
    if !allow {
        return false;
    }
    match app.mode {
        UiMode::Normal => {
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                return true;
            }
            handle_key_normal(key, app, seq, tx);
        }
        UiMode::ColorPick { card_index } => handle_key_colorpick(key, app, tx, card_index),
        UiMode::DrawnCardPlayable { card_index } => {
            handle_key_drawn_playable(key, app, seq, tx, card_index)
        }
        UiMode::Chat => handle_key_chat(key, app, tx),
    }
    false
}

fn send_input(tx: &Sender<Command>, input: Input) {
    tx.send(Command::Input(input)).ok();
}

fn handle_key_normal(key: KeyEvent, app: &mut AppState, seq: &Sequencer, tx: &Sender<Command>) {
    let hand_len = seq.player().display_order().len();
    match key.code {
        KeyCode::Left | KeyCode::Up => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right | KeyCode::Down => {
            app.cursor = app.cursor.saturating_add(1).min(hand_len.saturating_sub(1));
        }
        KeyCode::Enter => {
            if let Some(&card_index) = seq.player().display_order().get(app.cursor) {
                play_card_with_color_resolution(app, seq, tx, card_index);
            }
        }
        KeyCode::Char('d') => send_input(tx, Input::Draw),
        KeyCode::Char('k') => send_input(tx, Input::KeepDrawn),
        KeyCode::Char('t') => {
            app.chat.clear();
            app.mode = UiMode::Chat;
        }
        _ => {}
    }
}

fn handle_key_colorpick(key: KeyEvent, app: &mut AppState, tx: &Sender<Command>, card_index: usize) {
    match key.code {
        KeyCode::Esc => app.mode = UiMode::Normal,
        KeyCode::Left | KeyCode::Up => {
            app.color_pick_index = (app.color_pick_index + 3) % 4;
        }
        KeyCode::Right | KeyCode::Down => {
            app.color_pick_index = (app.color_pick_index + 1) % 4;
        }
        KeyCode::Char(c) => {
            if let Some(color) = UColor::from_code(c) {
                app.color_pick_index = color.to_u8() as usize;
            }
        }
        KeyCode::Enter => {
            let color = UColor::ALL[app.color_pick_index % 4];
            send_input(
                tx,
                Input::Play {
                    index: card_index,
                    color: Some(color),
                },
            );
            app.mode = UiMode::Normal;
        }
        _ => {}
    }
}

fn handle_key_drawn_playable(
    key: KeyEvent,
    app: &mut AppState,
    seq: &Sequencer,
    tx: &Sender<Command>,
    card_index: usize,
) {
    match key.code {
        KeyCode::Enter => {
            app.mode = UiMode::Normal;
            play_card_with_color_resolution(app, seq, tx, card_index);
        }
        KeyCode::Esc | KeyCode::Char('k') => {
            send_input(tx, Input::KeepDrawn);
            app.mode = UiMode::Normal;
        }
        _ => {}
    }
}

fn handle_key_chat(key: KeyEvent, app: &mut AppState, tx: &Sender<Command>) {
    match key.code {
        KeyCode::Esc => app.mode = UiMode::Normal,
        KeyCode::Enter => {
            let text = std::mem::take(&mut app.chat);
            if !text.trim().is_empty() {
                send_input(tx, Input::Chat(text));
            }
            app.mode = UiMode::Normal;
        }
        KeyCode::Backspace => {
            app.chat.pop();
        }
        KeyCode::Char(c) => app.chat.push(c),
        _ => {}
    }
}

fn play_card_with_color_resolution(
    app: &mut AppState,
    seq: &Sequencer,
    tx: &Sender<Command>,
    card_index: usize,
) {
    let Some(card) = seq.state().player.get(card_index).and_then(|v| v.card) else {
        return;
    };
    if card.is_wild() && card.color().is_none() {
        app.color_pick_index = 0;
        app.mode = UiMode::ColorPick { card_index };
    } else {
        send_input(
            tx,
            Input::Play {
                index: card_index,
                color: None,
            },
        );
    }
}

// ---------------- events ----------------
fn handle_event(app: &mut AppState, event: &GE) {
    match event {
        GE::DrawnCardPlayable { index } => {
            app.mode = UiMode::DrawnCardPlayable { card_index: *index };
        }
        GE::RoundStarted { .. } | GE::TurnFinished { .. } => {
            if app.mode != UiMode::Chat {
                app.mode = UiMode::Normal;
            }
        }
        GE::CardDealt { .. } | GE::TopCardChanged { .. } => return,
        _ => {}
    }
    app.push_log(event.to_string());
}

// ---------------- drawing ----------------
fn map_color(c: Option<UColor>) -> TColor {
    match c {
        Some(UColor::RED) => TColor::Red,
        Some(UColor::GREEN) => TColor::Green,
        Some(UColor::BLUE) => TColor::Blue,
        Some(UColor::YELLOW) => TColor::Yellow,
        None => TColor::White,
    }
}

fn card_line(view: &CardView, selected: bool) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    if selected {
        spans.push(Span::styled(
            "▶ ",
            Style::default()
                .fg(TColor::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
    } else {
        spans.push(Span::raw("  "));
    }
    match view.card.filter(|_| view.face_up) {
        Some(card) => {
            let mut style = Style::default().fg(map_color(card.color()));
            if selected || view.highlighted {
                style = style.add_modifier(Modifier::BOLD);
            }
            if view.highlighted {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            spans.push(Span::styled(card.to_string(), style));
        }
        None => spans.push(Span::styled("[UNO]", Style::default().fg(TColor::DarkGray))),
    }
    Line::from(spans)
}

fn top_line(card: &UnoCard) -> Line<'static> {
    Line::from(Span::styled(
        card.to_string(),
        Style::default()
            .fg(map_color(card.color()))
            .add_modifier(Modifier::BOLD),
    ))
}

fn ui(f: &mut ratatui::Frame<'_>, app: &AppState, seq: &Sequencer, now: Instant) {
    let size = f.size();
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(8),
        ])
        .split(size);
    draw_status(f, v[0], seq, now);
    draw_main(f, v[1], app, seq);
    draw_log(f, v[2], app);
    match app.mode {
        UiMode::ColorPick { .. } => draw_color_picker_popup(f, size, app),
        UiMode::DrawnCardPlayable { .. } => draw_drawn_playable_popup(f, size),
        UiMode::Chat => draw_chat_popup(f, size, app),
        UiMode::Normal => {}
    }
}

fn draw_status(f: &mut ratatui::Frame<'_>, area: Rect, seq: &Sequencer, now: Instant) {
    let state = seq.state();
    let phase = match state.phase {
        Phase::Waiting => "waiting for the opponent".to_string(),
        Phase::Dealing => "dealing".to_string(),
        Phase::InProgress => match state.turn {
            Side::Player => "your turn".to_string(),
            Side::Opponent => format!("{}'s turn", seq.opponent_name()),
        },
        Phase::RoundOver { winner, .. } => {
            let who = match winner {
                Side::Player => "you win".to_string(),
                Side::Opponent => format!("{} wins", seq.opponent_name()),
            };
            format!("{}, next round in {}s", who, seq.countdown(now).unwrap_or(0))
        }
    };
    let suspended = if seq.is_suspended() { " | reconnecting..." } else { "" };
    let title = format!(
        "UNO | vs {} | deck: {} | {}{}",
        seq.opponent_name(),
        seq.cards_in_deck(),
        phase,
        suspended
    );
    let para = Paragraph::new(title).block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(para, area);
}

fn draw_main(f: &mut ratatui::Frame<'_>, area: Rect, app: &AppState, seq: &Sequencer) {
    let state = seq.state();
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(34),
            Constraint::Percentage(33),
        ])
        .split(area);
    // opponent
    let opponent_lines: Vec<Line> = state
        .opponent
        .cards()
        .iter()
        .map(|v| card_line(v, false))
        .collect();
    let opponent = Paragraph::new(Text::from(opponent_lines)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("{} ({})", seq.opponent_name(), state.opponent.len())),
    );
    f.render_widget(opponent, cols[0]);
    // table
    let mut lines = vec![Line::from("Top card:")];
    match &state.top_card() {
        None => lines.push(Line::from("-")),
        Some(c) => lines.push(top_line(c)),
    };
    lines.push(Line::from(""));
    for hint in app.input_hint.lines() {
        lines.push(Line::from(hint.to_string()));
    }
    let desk = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("Table"));
    f.render_widget(desk, cols[1]);
    // hand in display order
    let hand_lines: Vec<Line> = seq
        .player()
        .display_order()
        .iter()
        .enumerate()
        .filter_map(|(pos, &idx)| state.player.get(idx).map(|v| card_line(v, pos == app.cursor)))
        .collect();
    let hand = Paragraph::new(Text::from(hand_lines)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Your hand ({})", state.player.len())),
    );
    f.render_widget(hand, cols[2]);
}

fn draw_log(f: &mut ratatui::Frame<'_>, area: Rect, app: &AppState) {
    let lines: Vec<Line> = app
        .log
        .iter()
        .rev()
        .take(area.height.saturating_sub(2) as usize)
        .cloned()
        .map(Line::from)
        .collect();
    let para =
        Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL).title("Log"));
    f.render_widget(para, area);
}

// ---------------- pop-ups ----------------
fn draw_color_picker_popup(f: &mut ratatui::Frame<'_>, area: Rect, app: &AppState) {
    let popup = centered_rect(40, 30, area);
    let mut lines: Vec<Line> = vec![Line::from(
        "Pick a color (←/→ or R/Y/G/B, Enter confirm, Esc cancel)",
    )];
    let spans: Vec<Span> = UColor::ALL
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let style = if i == app.color_pick_index {
                Style::default()
                    .fg(map_color(Some(*c)))
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(map_color(Some(*c)))
            };
            Span::styled(format!(" {} ", c.name()), style)
        })
        .collect();
    lines.push(Line::from(spans));
    let block = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("Color"));
    f.render_widget(block, popup);
}

fn draw_drawn_playable_popup(f: &mut ratatui::Frame<'_>, area: Rect) {
    let popup = centered_rect(50, 20, area);
    let lines = vec![Line::from(
        "The card you drew can be played (Enter play / K or Esc keep)",
    )];
    let block = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("Drawn card"));
    f.render_widget(block, popup);
}

fn draw_chat_popup(f: &mut ratatui::Frame<'_>, area: Rect, app: &AppState) {
    let popup = centered_rect(60, 20, area);
    let lines = vec![Line::from(format!("> {}", app.chat))];
    let block = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("Chat (Enter send, Esc cancel)"));
    f.render_widget(block, popup);
}

fn centered_rect(pct_x: u16, pct_y: u16, r: Rect) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - pct_y) / 2),
            Constraint::Percentage(pct_y),
            Constraint::Percentage((100 - pct_y) / 2),
        ])
        .split(r);
    let horz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - pct_x) / 2),
            Constraint::Percentage(pct_x),
            Constraint::Percentage((100 - pct_x) / 2),
        ])
        .split(vert[1]);
    horz[1]
}
