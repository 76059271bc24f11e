//! View rendering for the browse and search screens

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
};

use super::app::{EditTarget, InputMode, UiApp, View};
use super::theme::Theme;
use super::widgets::{error_bar, help_bar, truncate_string};
use crate::ai::CompletionApi;
use crate::constants::{MIN_SPLIT_VIEW_WIDTH, TABLE_PANE_WIDTH};
use crate::generator::GeneratedEmail;

pub fn render<C: CompletionApi>(frame: &mut Frame, app: &UiApp<C>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Status bar
            Constraint::Min(0),    // Main view
            Constraint::Length(1), // Help bar
        ])
        .split(frame.area());

    render_status_bar(frame, chunks[0], app);

    match app.view {
        View::Browse => render_browse(frame, chunks[1], app),
        View::Search => render_search(frame, chunks[1], app),
    }

    if let Some(ref error) = app.error {
        error_bar(frame, chunks[2], error);
    } else {
        help_bar(frame, chunks[2], help_hints(app));
    }
}

fn help_hints<C: CompletionApi>(app: &UiApp<C>) -> &'static [(&'static str, &'static str)] {
    match app.input_mode {
        InputMode::Editing(EditTarget::Search) => &[("Enter", "search"), ("Esc", "cancel")][..],
        InputMode::Editing(EditTarget::Recipient) => &[("Enter", "save"), ("Esc", "cancel")][..],
        InputMode::Normal => match app.view {
            View::Browse => &[
                ("j/k", "nav"),
                ("g", "generate"),
                ("e", "recipient"),
                ("m", "mail"),
                ("Tab", "search"),
                ("q", "quit"),
            ][..],
            View::Search => &[
                ("/", "edit query"),
                ("m", "mail"),
                ("Tab", "browse"),
                ("q", "quit"),
            ][..],
        },
    }
}

fn render_status_bar<C: CompletionApi>(frame: &mut Frame, area: Rect, app: &UiApp<C>) {
    let mode = if app.is_live() {
        "live"
    } else {
        "offline (mock content)"
    };
    let mut text = format!(" mailgen │ {} customers │ {} ", app.customers.len(), mode);
    if let Some(ref status) = app.status {
        text.push_str(&format!("│ {} ", status));
    }

    let paragraph = Paragraph::new(text).style(Theme::status_bar());
    frame.render_widget(paragraph, area);
}

fn render_browse<C: CompletionApi>(frame: &mut Frame, area: Rect, app: &UiApp<C>) {
    if area.width < MIN_SPLIT_VIEW_WIDTH {
        render_customer_table(frame, area, app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(TABLE_PANE_WIDTH), Constraint::Min(0)])
        .split(area);

    render_customer_table(frame, chunks[0], app);
    render_detail(frame, chunks[1], app, app.selected_index(), true);
}

fn render_customer_table<C: CompletionApi>(frame: &mut Frame, area: Rect, app: &UiApp<C>) {
    let block = Block::default()
        .title(" Customers ")
        .borders(Borders::ALL)
        .border_style(Theme::border());

    if app.customers.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let msg = Paragraph::new("No customer records loaded.").style(Theme::text_muted());
        frame.render_widget(msg, inner);
        return;
    }

    let name_width = 16;
    let city_width = 10;

    let header = Row::new(vec![
        Cell::from("Name"),
        Cell::from("City"),
        Cell::from("Subject"),
    ])
    .style(Theme::title());

    let rows: Vec<Row> = app
        .customers
        .iter()
        .enumerate()
        .map(|(idx, customer)| {
            let subject = match app.results.get(idx) {
                Some(result) if result.used_fallback => format!("{} *", result.subject),
                Some(result) => result.subject.clone(),
                None => "-".to_string(),
            };
            let style = if idx == app.selected {
                Theme::selected()
            } else {
                Theme::text()
            };
            Row::new(vec![
                Cell::from(truncate_string(&customer.name, name_width)),
                Cell::from(truncate_string(&customer.city, city_width)),
                Cell::from(truncate_string(&subject, 20)),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(name_width as u16),
            Constraint::Length(city_width as u16),
            Constraint::Min(0),
        ],
    )
    .header(header)
    .block(block);

    let mut state = TableState::default().with_selected(Some(app.selected));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_detail<C: CompletionApi>(
    frame: &mut Frame,
    area: Rect,
    app: &UiApp<C>,
    index: Option<usize>,
    editable: bool,
) {
    let block = Block::default()
        .title(" Email ")
        .borders(Borders::ALL)
        .border_style(Theme::border());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(index) = index else {
        let msg = Paragraph::new("No emails yet. Press g to generate for all customers.")
            .style(Theme::text_muted())
            .wrap(Wrap { trim: true });
        frame.render_widget(msg, inner);
        return;
    };
    let result: &GeneratedEmail = &app.results[index];

    let recipient = if editable && matches!(app.input_mode, InputMode::Editing(EditTarget::Recipient))
    {
        format!("{}█", app.recipient_input)
    } else {
        app.recipients[index].clone()
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Customer: ", Theme::title()),
            Span::styled(
                format!("{} ({})", result.customer_name, result.city),
                Theme::text(),
            ),
        ]),
        Line::from(vec![
            Span::styled("To: ", Theme::title()),
            Span::styled(recipient, Theme::accent()),
        ]),
        Line::default(),
        Line::from(vec![
            Span::styled("Subject: ", Theme::title()),
            Span::styled(result.subject.clone(), Theme::text()),
        ]),
        Line::default(),
        Line::from(Span::styled(result.body.clone(), Theme::text())),
        Line::default(),
        Line::from(vec![
            Span::styled("Notification: ", Theme::title()),
            Span::styled(result.notification.clone(), Theme::text()),
        ]),
    ];

    if result.used_fallback {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "* mock content (live generation unavailable or failed)",
            Theme::warning(),
        )));
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, inner);
}

fn render_search<C: CompletionApi>(frame: &mut Frame, area: Rect, app: &UiApp<C>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let editing = matches!(app.input_mode, InputMode::Editing(EditTarget::Search));
    let query = if editing {
        format!("{}█", app.search_input)
    } else {
        app.search_input.clone()
    };

    let input = Paragraph::new(query).style(Theme::text()).block(
        Block::default()
            .title(" Search customer by name ")
            .borders(Borders::ALL)
            .border_style(if editing {
                Theme::title()
            } else {
                Theme::border()
            }),
    );
    frame.render_widget(input, chunks[0]);

    if let Some(ref message) = app.search_message {
        let msg = Paragraph::new(message.as_str())
            .style(Theme::warning())
            .wrap(Wrap { trim: true });
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border());
        let inner = block.inner(chunks[1]);
        frame.render_widget(block, chunks[1]);
        frame.render_widget(msg, inner);
    } else {
        render_detail(frame, chunks[1], app, app.search_hit, false);
    }
}
