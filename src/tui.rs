use std::io::Stdout;
use std::time::Duration;

use anyhow::Result;
use brello::application::{BoardWorkspace, DragGesture, DropOutcome, DropSlot};
use brello::domain::{Board, BoardId, ListId, TaskId};
use brello::infrastructure::HttpRemoteStore;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use tracing::{info, warn};

type Term = Terminal<CrosstermBackend<Stdout>>;

pub async fn run(store: HttpRemoteStore) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut app = App::new(BoardWorkspace::new(store));
    let res = app.run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Screen {
    Boards,
    Board,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Prompt {
    NewBoard,
    RenameBoard(BoardId),
    ShareBoard(BoardId),
    DeleteBoard(BoardId),
    NewList,
    RenameList(ListId),
    DeleteList(ListId),
    NewTask(ListId),
    EditTask(TaskId),
}

impl Prompt {
    fn label(self) -> &'static str {
        match self {
            Prompt::NewBoard => "New board title",
            Prompt::RenameBoard(_) => "Board title",
            Prompt::ShareBoard(_) => "Share with email",
            Prompt::DeleteBoard(_) => "Delete this board? type y",
            Prompt::NewList => "New list title",
            Prompt::RenameList(_) => "List title",
            Prompt::DeleteList(_) => "Delete this list and its tasks? type y",
            Prompt::NewTask(_) => "New task (title | description)",
            Prompt::EditTask(_) => "Task (title | description)",
        }
    }
}

struct Input {
    prompt: Prompt,
    text: String,
}

enum Notice {
    Info(String),
    Error(String),
}

struct App {
    workspace: BoardWorkspace<HttpRemoteStore>,
    screen: Screen,
    board_cursor: usize,
    column: usize,
    row: usize,
    input: Option<Input>,
    notice: Option<Notice>,
    quit: bool,
}

impl App {
    fn new(workspace: BoardWorkspace<HttpRemoteStore>) -> Self {
        Self { workspace, screen: Screen::Boards, board_cursor: 0, column: 0, row: 0, input: None, notice: None, quit: false }
    }

    async fn run(&mut self, terminal: &mut Term) -> Result<()> {
        let loaded = self.workspace.load_boards().await.map(|_| ());
        self.report(loaded);
        let tick_rate = Duration::from_millis(200);

        while !self.quit {
            self.draw(terminal)?;
            if !event::poll(tick_rate)? {
                continue;
            }
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if self.input.is_some() {
                    self.on_input_key(key).await;
                } else {
                    self.notice = None;
                    match self.screen {
                        Screen::Boards => self.on_boards_key(key, terminal).await?,
                        Screen::Board => self.on_board_key(key).await,
                    }
                }
            }
        }
        Ok(())
    }

    fn draw(&self, terminal: &mut Term) -> Result<()> {
        terminal.draw(|f| self.ui(f))?;
        Ok(())
    }

    fn report<T>(&mut self, result: brello::Result<T>) {
        if let Err(err) = result {
            warn!(error = %err, "action failed");
            self.notice = Some(Notice::Error(err.to_string()));
        }
    }

    fn selected_board(&self) -> Option<&Board> {
        self.workspace.boards().get(self.board_cursor)
    }

    fn selected_list(&self) -> Option<ListId> {
        self.workspace.columns().get(self.column).map(|c| c.id())
    }

    fn selected_task(&self) -> Option<TaskId> {
        self.workspace.columns().get(self.column).and_then(|c| c.tasks().get(self.row)).map(|t| t.id)
    }

    fn clamp_cursor(&mut self) {
        let boards = self.workspace.boards().len();
        self.board_cursor = self.board_cursor.min(boards.saturating_sub(1));
        let columns = self.workspace.columns();
        self.column = self.column.min(columns.len().saturating_sub(1));
        let rows = columns.get(self.column).map_or(0, |c| c.len());
        self.row = self.row.min(rows.saturating_sub(1));
    }

    fn follow(&mut self, task: TaskId) {
        let state = self.workspace.state();
        if let Some((list, index)) = state.locate(task) {
            if let Some(column) = state.columns().iter().position(|c| c.id() == list) {
                self.column = column;
                self.row = index;
            }
        }
    }

    fn ask(&mut self, prompt: Prompt, text: String) {
        self.input = Some(Input { prompt, text });
    }

    async fn on_boards_key(&mut self, key: KeyEvent, terminal: &mut Term) -> Result<()> {
        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Char('x') => {
                self.workspace.store_mut().sign_out();
                info!("signed out");
                self.quit = true;
            }
            KeyCode::Up => self.board_cursor = self.board_cursor.saturating_sub(1),
            KeyCode::Down => {
                if self.board_cursor + 1 < self.workspace.boards().len() {
                    self.board_cursor += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(board) = self.selected_board().cloned() {
                    self.screen = Screen::Board;
                    self.column = 0;
                    self.row = 0;
                    self.workspace.begin_select(board);
                    self.draw(terminal)?;
                    let selected = self.workspace.finish_select().await;
                    self.report(selected);
                }
            }
            KeyCode::Char('n') => self.ask(Prompt::NewBoard, String::new()),
            KeyCode::Char('e') => {
                if let Some(board) = self.selected_board() {
                    let prompt = Prompt::RenameBoard(board.id);
                    let title = board.title.clone();
                    self.ask(prompt, title);
                }
            }
            KeyCode::Char('s') => {
                if let Some(board) = self.selected_board() {
                    let prompt = Prompt::ShareBoard(board.id);
                    self.ask(prompt, String::new());
                }
            }
            KeyCode::Char('d') => {
                if let Some(board) = self.selected_board() {
                    let prompt = Prompt::DeleteBoard(board.id);
                    self.ask(prompt, String::new());
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn on_board_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.screen = Screen::Boards;
                let loaded = self.workspace.load_boards().await.map(|_| ());
                self.report(loaded);
            }
            KeyCode::Left => {
                self.column = self.column.saturating_sub(1);
                self.row = 0;
            }
            KeyCode::Right => {
                self.column += 1;
                self.row = 0;
            }
            KeyCode::Up => self.row = self.row.saturating_sub(1),
            KeyCode::Down => self.row += 1,
            KeyCode::Char('J') => self.drag_within(1).await,
            KeyCode::Char('K') => self.drag_within(-1).await,
            KeyCode::Char('H') => self.drag_across(-1).await,
            KeyCode::Char('L') => self.drag_across(1).await,
            KeyCode::Char('r') => {
                let refreshed = self.workspace.refresh().await;
                self.report(refreshed);
            }
            KeyCode::Char('N') => self.ask(Prompt::NewList, String::new()),
            KeyCode::Char('E') => {
                if let Some(column) = self.workspace.columns().get(self.column) {
                    let prompt = Prompt::RenameList(column.id());
                    let title = column.list.title.clone();
                    self.ask(prompt, title);
                }
            }
            KeyCode::Char('D') => {
                if let Some(list) = self.selected_list() {
                    self.ask(Prompt::DeleteList(list), String::new());
                }
            }
            KeyCode::Char('n') => {
                if let Some(list) = self.selected_list() {
                    self.ask(Prompt::NewTask(list), String::new());
                }
            }
            KeyCode::Char('e') => {
                if let Some(task) = self.selected_task().and_then(|id| self.workspace.state().task(id)) {
                    let text = match &task.description {
                        Some(description) => format!("{} | {}", task.title, description),
                        None => task.title.clone(),
                    };
                    let prompt = Prompt::EditTask(task.id);
                    self.ask(prompt, text);
                }
            }
            KeyCode::Char('d') => {
                if let Some(task) = self.selected_task() {
                    let deleted = self.workspace.delete_task(task).await;
                    self.report(deleted);
                }
            }
            _ => {}
        }
        self.clamp_cursor();
    }

    async fn drag_within(&mut self, step: isize) {
        let (Some(list), Some(task)) = (self.selected_list(), self.selected_task()) else {
            return;
        };
        let Some(to) = self.row.checked_add_signed(step) else {
            return;
        };
        let len = self.workspace.columns()[self.column].len();
        if to >= len {
            return;
        }
        let gesture = DragGesture::new(task, DropSlot::new(list, self.row), Some(DropSlot::new(list, to)));
        self.commit_drop(task, gesture).await;
    }

    async fn drag_across(&mut self, step: isize) {
        let (Some(list), Some(task)) = (self.selected_list(), self.selected_task()) else {
            return;
        };
        let Some(target) = self.column.checked_add_signed(step) else {
            return;
        };
        let Some(destination) = self.workspace.columns().get(target) else {
            return;
        };
        let slot = DropSlot::new(destination.id(), self.row.min(destination.len()));
        let gesture = DragGesture::new(task, DropSlot::new(list, self.row), Some(slot));
        self.commit_drop(task, gesture).await;
    }

    async fn commit_drop(&mut self, task: TaskId, gesture: DragGesture) {
        match self.workspace.drop_task(gesture).await {
            Ok(DropOutcome::Persisted) => self.follow(task),
            Ok(DropOutcome::Unchanged) => {}
            Err(err) => self.report::<()>(Err(err)),
        }
    }

    async fn on_input_key(&mut self, key: KeyEvent) {
        let Some(input) = self.input.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.input = None,
            KeyCode::Backspace => {
                input.text.pop();
            }
            KeyCode::Char(c) => input.text.push(c),
            KeyCode::Enter => {
                if let Some(input) = self.input.take() {
                    self.submit(input).await;
                    self.clamp_cursor();
                }
            }
            _ => {}
        }
    }

    async fn submit(&mut self, input: Input) {
        let text = input.text.trim();
        let confirmed = text.eq_ignore_ascii_case("y");
        match input.prompt {
            Prompt::NewBoard if !text.is_empty() => {
                let created = self.workspace.create_board(text, brello::domain::board::DEFAULT_BACKGROUND_COLOR).await;
                if created.is_ok() {
                    self.board_cursor = self.workspace.boards().len().saturating_sub(1);
                }
                self.report(created);
            }
            Prompt::RenameBoard(id) if !text.is_empty() => {
                let color = self
                    .workspace
                    .boards()
                    .iter()
                    .find(|b| b.id == id)
                    .map(|b| b.background_color.clone())
                    .unwrap_or_else(|| brello::domain::board::DEFAULT_BACKGROUND_COLOR.to_string());
                let edited = self.workspace.edit_board(id, text, &color).await;
                self.report(edited);
            }
            Prompt::ShareBoard(id) if !text.is_empty() => {
                match self.workspace.share_board(id, text).await {
                    Ok(()) => self.notice = Some(Notice::Info(format!("Shared with {text}"))),
                    Err(err) => self.report::<()>(Err(err)),
                }
            }
            Prompt::DeleteBoard(id) if confirmed => {
                let deleted = self.workspace.delete_board(id).await;
                self.report(deleted);
            }
            Prompt::NewList if !text.is_empty() => {
                let created = self.workspace.create_list(text).await;
                if created.is_ok() {
                    self.column = self.workspace.columns().len().saturating_sub(1);
                    self.row = 0;
                }
                self.report(created);
            }
            Prompt::RenameList(id) if !text.is_empty() => {
                let edited = self.workspace.edit_list(id, text).await;
                self.report(edited);
            }
            Prompt::DeleteList(id) if confirmed => {
                let deleted = self.workspace.delete_list(id).await;
                self.report(deleted);
            }
            Prompt::NewTask(list) => {
                let (title, description) = split_task_text(text);
                if !title.is_empty() {
                    match self.workspace.create_task(list, title, description).await {
                        Ok(task) => self.follow(task.id),
                        Err(err) => self.report::<()>(Err(err)),
                    }
                }
            }
            Prompt::EditTask(id) => {
                let (title, description) = split_task_text(text);
                if !title.is_empty() {
                    let edited = self.workspace.edit_task(id, title, description).await;
                    self.report(edited);
                }
            }
            _ => {}
        }
    }

    fn ui(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(3)])
            .split(f.size());

        let (title, help) = match self.screen {
            Screen::Boards => ("boards".to_string(), "Enter: open  n: new  e: rename  s: share  d: delete  x: log out  q: quit"),
            Screen::Board => (
                self.workspace.selected_board().map_or_else(String::new, |b| b.title.clone()),
                "arrows: move  J/K: drag  H/L: drag to list  n/N: new task/list  e/E: edit  d/D: delete  r: refresh  Esc: back",
            ),
        };
        let accent = self
            .workspace
            .selected_board()
            .filter(|_| self.screen == Screen::Board)
            .and_then(|b| hex_color(&b.background_color))
            .unwrap_or(Color::Cyan);
        let header = Paragraph::new(help)
            .block(Block::default().borders(Borders::ALL).title(title).border_style(Style::default().fg(accent)));
        f.render_widget(header, chunks[0]);

        match self.screen {
            Screen::Boards => self.render_boards(f, chunks[1]),
            Screen::Board => self.render_board(f, chunks[1], accent),
        }

        let footer = match (&self.input, &self.notice) {
            (Some(input), _) => Paragraph::new(format!("{}: {}_", input.prompt.label(), input.text))
                .block(Block::default().borders(Borders::ALL).title("input")),
            (None, Some(Notice::Error(message))) => Paragraph::new(message.as_str())
                .style(Style::default().fg(Color::Red))
                .block(Block::default().borders(Borders::ALL).title("error")),
            (None, Some(Notice::Info(message))) => {
                Paragraph::new(message.as_str()).block(Block::default().borders(Borders::ALL).title("info"))
            }
            (None, None) => Paragraph::new("").block(Block::default().borders(Borders::ALL)),
        };
        f.render_widget(footer, chunks[2]);
    }

    fn render_boards(&self, f: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .workspace
            .boards()
            .iter()
            .map(|b| {
                let color = hex_color(&b.background_color).unwrap_or(Color::Reset);
                ListItem::new(b.title.clone()).style(Style::default().fg(color))
            })
            .collect();
        let mut state = ListState::default();
        if !self.workspace.boards().is_empty() {
            state.select(Some(self.board_cursor));
        }
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("your boards"))
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
            .highlight_symbol(">> ");
        f.render_stateful_widget(list, area, &mut state);
    }

    fn render_board(&self, f: &mut Frame, area: Rect, accent: Color) {
        if self.workspace.is_loading() {
            f.render_widget(Paragraph::new("Loading...").block(Block::default().borders(Borders::ALL)), area);
            return;
        }
        let columns = self.workspace.columns();
        if columns.is_empty() {
            let empty = Paragraph::new("No lists yet. Press N to add one.").block(Block::default().borders(Borders::ALL));
            f.render_widget(empty, area);
            return;
        }
        let constraints: Vec<Constraint> = columns.iter().map(|_| Constraint::Ratio(1, columns.len() as u32)).collect();
        let areas = Layout::default().direction(Direction::Horizontal).constraints(constraints).split(area);

        for (index, column) in columns.iter().enumerate() {
            let focused = index == self.column;
            let items: Vec<ListItem> = column
                .tasks()
                .iter()
                .map(|t| match &t.description {
                    Some(description) if !description.is_empty() => ListItem::new(format!("{}\n  {}", t.title, description)),
                    _ => ListItem::new(t.title.clone()),
                })
                .collect();
            let mut state = ListState::default();
            if focused && !column.is_empty() {
                state.select(Some(self.row));
            }
            let border = if focused { Style::default().fg(accent) } else { Style::default() };
            let list = List::new(items)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(format!("{} ({})", column.list.title, column.len()))
                        .border_style(border),
                )
                .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
                .highlight_symbol("> ");
            f.render_stateful_widget(list, areas[index], &mut state);
        }
    }
}

/// `title | description`; the description part is optional.
fn split_task_text(text: &str) -> (&str, Option<&str>) {
    match text.split_once('|') {
        Some((title, description)) => {
            let description = description.trim();
            (title.trim(), (!description.is_empty()).then_some(description))
        }
        None => (text.trim(), None),
    }
}

fn hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}
