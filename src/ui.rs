use crate::api::TaskStore;
use crate::app::{App, Focus, InputMode};
use crate::collection::{completed_tasks, tasks_for_tab};
use crate::form::TaskForm;
use crate::models::{Priority, Tab, Task};
use crossterm::event::{self, Event as CEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

const EMPTY_VIEW: &str = "No data to display";

fn percent_of(total: u16, percent: u16) -> u16 {
    (u32::from(total) * u32::from(percent) / 100) as u16
}

fn centered_rect_absolute(width: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length((r.height.saturating_sub(height)) / 2),
                Constraint::Length(height),
                Constraint::Length((r.height.saturating_sub(height) + 1) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Length((r.width.saturating_sub(width)) / 2),
                Constraint::Length(width),
                Constraint::Length((r.width.saturating_sub(width) + 1) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::LightRed,
        Priority::Low => Color::Yellow,
        Priority::None => Color::DarkGray,
    }
}

pub fn format_deadline(task: &Task) -> String {
    if task.deadline.trim().is_empty() {
        return "No deadline".to_string();
    }
    match task.deadline_date() {
        Some(date) => date.format("%a %b %d %Y").to_string(),
        None => task.deadline.clone(),
    }
}

fn task_row(task: &Task) -> ListItem<'static> {
    let (checkbox, title_style) = if task.is_completed() {
        (
            "[x] ",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::CROSSED_OUT),
        )
    } else {
        ("[ ] ", Style::default().add_modifier(Modifier::BOLD))
    };
    ListItem::new(Line::from(vec![
        Span::raw(checkbox),
        Span::styled(task.title.clone(), title_style),
        Span::raw("  "),
        Span::styled(format_deadline(task), Style::default().fg(Color::Gray)),
        Span::raw("  "),
        Span::styled("■", Style::default().fg(priority_color(task.priority))),
    ]))
}

fn section_block(title: String, focused: bool) -> Block<'static> {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title)
}

fn task_list(tasks: &[&Task], block: Block<'static>) -> List<'static> {
    if tasks.is_empty() {
        return List::new(vec![ListItem::new(Span::styled(
            EMPTY_VIEW,
            Style::default().fg(Color::DarkGray),
        ))])
        .block(block);
    }
    let items: Vec<ListItem> = tasks.iter().map(|task| task_row(task)).collect();
    List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ")
}

fn detail_lines(task: &Task) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines: Vec<Line<'static>> = vec![
        Line::from(vec![
            Span::styled("Title: ", bold),
            Span::raw(task.title.clone()),
        ]),
        Line::from(vec![
            Span::styled("Status: ", bold),
            Span::raw(if task.is_completed() {
                "Completed"
            } else {
                "Pending"
            }),
        ]),
        Line::from(vec![
            Span::styled("Priority: ", bold),
            Span::styled(
                task.priority.label(),
                Style::default().fg(priority_color(task.priority)),
            ),
        ]),
        Line::from(vec![
            Span::styled("Deadline: ", bold),
            Span::raw(format_deadline(task)),
        ]),
        Line::from(Span::styled("Description: ", bold)),
    ];

    if task.description.trim().is_empty() {
        lines.push(Line::from(Span::raw("No description")));
    } else {
        lines.extend(
            task.description
                .lines()
                .map(|line| Line::from(Span::raw(line.to_string()))),
        );
    }
    lines
}

fn form_lines(form: &TaskForm, inserting: bool) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for field in TaskForm::fields() {
        let active = field == form.active;
        let marker = if active { "> " } else { "  " };
        let label_style = if active {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("{}:", field.label()), label_style),
        ]));

        let mut value = form.value_of(field);
        if active && inserting {
            value.push('_');
        }
        if field.is_text() {
            for line in value.split('\n') {
                lines.push(Line::from(Span::raw(format!("    {}", line))));
            }
        } else {
            lines.push(Line::from(vec![
                Span::raw("    < "),
                Span::styled(value, Style::default().fg(priority_color(form.priority))),
                Span::raw(" >"),
            ]));
        }
    }
    lines
}

fn get_legend(input_mode: &InputMode) -> Text<'static> {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Red));
    match input_mode {
        InputMode::Normal => Text::from(Line::from(vec![
            key(" q "),
            Span::raw(": Quit "),
            key(" j/k "),
            Span::raw(": Down/Up "),
            key(" h/l "),
            Span::raw(": Tab "),
            key(" Tab "),
            Span::raw(": Pending/Completed "),
            key(" Space "),
            Span::raw(": Toggle Done "),
            key(" a "),
            Span::raw(": Add Task "),
            key(" e "),
            Span::raw(": Edit "),
            key(" d "),
            Span::raw(": Delete "),
            key(" r "),
            Span::raw(": Reload "),
        ])),
        InputMode::Editing => Text::from(Line::from(vec![
            key(" i "),
            Span::raw(": Insert "),
            key(" Tab "),
            Span::raw(": Next Field "),
            key(" h/l "),
            Span::raw(": Priority "),
            key(" Enter "),
            Span::raw(": Save "),
            key(" Esc "),
            Span::raw(": Cancel "),
        ])),
        InputMode::Insert => Text::from(Line::from(vec![
            key(" Esc "),
            Span::raw(": Stop Typing "),
            Span::raw("(!high @tomorrow in the title set priority and deadline)"),
        ])),
        InputMode::ConfirmDelete => Text::from(Line::from(vec![
            key(" y "),
            Span::raw(": Delete "),
            key(" n "),
            Span::raw(": Keep "),
        ])),
    }
}

fn calculate_wrapped_lines(text: &str, max_width: u16) -> usize {
    if max_width == 0 {
        return 0;
    }
    let mut line_count = 0;
    for line in text.split('\n') {
        let line_width = line.chars().count();
        line_count += std::cmp::max(1, line_width.div_ceil(max_width as usize));
    }
    line_count
}

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.area();

    // Header, body, status line, footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(2),
            ]
            .as_ref(),
        )
        .split(size);

    let header_chunk = chunks[0];
    let body_chunk = chunks[1];
    let status_chunk = chunks[2];
    let footer_chunk = chunks[3];

    // Tab bar with per-tab counts
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .map(|tab| {
            let count = tasks_for_tab(&app.tasks, *tab, app.today).len();
            Line::from(format!(" {} ({}) ", tab.label(), count))
        })
        .collect();
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title("To-Do"))
        .select(app.tab.index())
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, header_chunk);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)].as_ref())
        .split(body_chunk);
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
        .split(columns[0]);

    // Left panel: pending tasks for the tab, then completed tasks
    let pending = tasks_for_tab(&app.tasks, app.tab, app.today);
    let pending_widget = task_list(
        &pending,
        section_block(
            format!("Tasks: {}", app.tab.label()),
            app.focus == Focus::Pending,
        ),
    );
    let completed = completed_tasks(&app.tasks);
    let completed_widget = task_list(
        &completed,
        section_block(
            format!("Completed ({})", completed.len()),
            app.focus == Focus::Completed,
        ),
    );
    f.render_stateful_widget(pending_widget, sections[0], &mut app.pending_state);
    f.render_stateful_widget(completed_widget, sections[1], &mut app.completed_state);

    // Right panel: Task details
    let detail_block = Block::default().borders(Borders::ALL).title("Task Details");
    let detail = match app.selected_task() {
        Some(task) => Paragraph::new(detail_lines(task)),
        None => Paragraph::new("Select a task to see its details"),
    };
    f.render_widget(
        detail.block(detail_block).wrap(Wrap { trim: true }),
        columns[1],
    );

    match app.input_mode {
        InputMode::Normal => {}
        InputMode::Editing | InputMode::Insert => {
            let inserting = app.input_mode == InputMode::Insert;
            let popup_width = percent_of(size.width, 60).max(30).min(size.width);
            let inner_width = popup_width.saturating_sub(6);

            let value_lines: usize = TaskForm::fields()
                .iter()
                .filter(|field| field.is_text())
                .map(|field| calculate_wrapped_lines(&app.form.value_of(*field), inner_width))
                .sum();
            // label line per field, one line for priority, borders
            let required_height = (value_lines + 4 + 1 + 2) as u16;
            let popup_height = std::cmp::min(required_height, body_chunk.height);

            let popup_area = centered_rect_absolute(popup_width, popup_height, body_chunk);

            let title = match (app.form.is_editing(), inserting) {
                (true, true) => "Task Details: editing (insert)",
                (true, false) => "Task Details: editing",
                (false, true) => "Task Details: new (insert)",
                (false, false) => "Task Details: new",
            };
            let popup_block = Block::default()
                .title(title)
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Green));

            let input = Paragraph::new(form_lines(&app.form, inserting))
                .style(Style::default().fg(Color::White))
                .block(popup_block)
                .wrap(Wrap { trim: false });

            f.render_widget(Clear, popup_area);
            f.render_widget(input, popup_area);
        }
        InputMode::ConfirmDelete => {
            let title = app
                .selected_task()
                .map(|task| task.title.clone())
                .unwrap_or_default();
            let popup_area = centered_rect_absolute(
                percent_of(size.width, 50).max(20).min(size.width),
                3,
                body_chunk,
            );
            let confirm = Paragraph::new(format!("Delete \"{}\"? (y/n)", title))
                .block(
                    Block::default()
                        .title("Delete Task")
                        .borders(Borders::ALL)
                        .style(Style::default().fg(Color::Red)),
                )
                .wrap(Wrap { trim: true });
            f.render_widget(Clear, popup_area);
            f.render_widget(confirm, popup_area);
        }
    }

    if let Some(status) = &app.status {
        let status_line = Paragraph::new(status.as_str()).style(Style::default().fg(Color::Yellow));
        f.render_widget(status_line, status_chunk);
    }

    // Render the legend in the footer
    let legend = Paragraph::new(get_legend(&app.input_mode))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(legend, footer_chunk);
}

pub async fn run_app<B: Backend, S: TaskStore + ?Sized>(
    terminal: &mut Terminal<B>,
    mut app: App,
    store: &S,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, &mut app))?;

        // Handle input
        if event::poll(Duration::from_millis(100))? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let should_quit = app.handle_input(key, store).await;
                if should_quit {
                    return Ok(());
                }
            }
        }
    }
}
