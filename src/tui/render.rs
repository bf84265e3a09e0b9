use super::charts::render_chart;
use super::state::{ControlFocus, Page, PendingDelete, UiState};
use crate::aggregation::plan_for_project;
use crate::app::AppContext;
use crate::forms::{AllocationField, FieldKind, TransactionField};
use crate::operations::notification::ActiveNotification;
use crate::report::{ControlRow, PlanRow, summary_lines};
use crate::store::RecordStore;
use ratatui::{
    prelude::{Alignment, Color, Constraint, Direction, Layout, Rect, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};
use rust_decimal::Decimal;

pub fn draw<S: RecordStore>(frame: &mut ratatui::Frame, ctx: &AppContext<S>, state: &mut UiState, source: &str) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(3)])
        .split(area);

    render_header(frame, chunks[0], ctx, state, source);
    match state.page {
        Page::Allocations => render_allocation_form(frame, chunks[1], state),
        Page::BudgetPlan => render_plan_table(frame, chunks[1], &ctx.views().plan_rows, &mut state.plan_table),
        Page::BudgetControl => render_budget_control(frame, chunks[1], ctx, state),
        Page::Dashboard => render_dashboard(frame, chunks[1], ctx),
    }
    render_footer(frame, chunks[2], state);

    if let Some(pending) = &state.confirm {
        render_confirm_modal(frame, area, pending);
    }
    if let Some(active) = &state.notification {
        render_notification(frame, area, active);
    }
}

fn render_header<S: RecordStore>(frame: &mut ratatui::Frame, area: Rect, ctx: &AppContext<S>, state: &UiState, source: &str) {
    let mut spans = vec![
        Span::styled("Budget Control", Style::default().fg(Color::Cyan).bold()),
        Span::raw("  "),
    ];
    for (idx, page) in Page::ALL.iter().enumerate() {
        let label = format!(" F{} {} ", idx + 1, page.title());
        if *page == state.page {
            spans.push(Span::styled(label, Style::default().bg(Color::Cyan).fg(Color::Black).bold()));
        } else {
            spans.push(Span::raw(label));
        }
    }
    spans.push(Span::raw("  |  "));
    spans.push(Span::raw(format!(
        "Allocations: {}  Entries: {}",
        ctx.allocations().len(),
        ctx.transactions().len()
    )));
    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(source.to_string(), Style::default().fg(Color::DarkGray)));

    let block = Block::default().borders(Borders::ALL);
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block).alignment(Alignment::Left), area);
}

fn render_footer(frame: &mut ratatui::Frame, area: Rect, state: &UiState) {
    let hint = if state.confirm.is_some() {
        "y/Enter confirm  n/Esc cancel"
    } else if state.notification.is_some() {
        "Any key to dismiss"
    } else {
        match state.page {
            Page::Allocations => "Tab/↑/↓ field  ←/→ choose  Enter save  Esc clear  F1-F4 views  Ctrl+Q quit",
            Page::BudgetControl if state.control_focus == ControlFocus::Form => {
                "Tab/↑/↓ field  ←/→ choose  Enter save  Esc clear  Tab past last field: table  Ctrl+Q quit"
            }
            Page::BudgetPlan | Page::BudgetControl => "↑/↓ move  e edit  d delete  1-4/F1-F4 views  Tab/Esc form  q exit",
            Page::Dashboard => "1-4/F1-F4 views  q exit",
        }
    };

    let block = Block::default().borders(Borders::ALL);
    frame.render_widget(
        Paragraph::new(hint)
            .block(block)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true }),
        area,
    );
}

/// One `label: value` line, highlighted when focused.
fn field_line(label: &str, value: String, kind: FieldKind, focused: bool) -> Line<'static> {
    let value = match kind {
        FieldKind::Select if focused => format!("◀ {} ▶", value),
        FieldKind::ReadOnly => value,
        FieldKind::Text | FieldKind::Amount if focused => format!("{}_", value),
        _ => value,
    };
    let marker = if focused { "➤ " } else { "  " };
    let value_style = match kind {
        FieldKind::ReadOnly => Style::default().fg(Color::DarkGray),
        _ if focused => Style::default().fg(Color::Yellow).bold(),
        _ => Style::default().fg(Color::White),
    };
    Line::from(vec![
        Span::raw(marker),
        Span::styled(format!("{:<18}", label), Style::default().bold()),
        Span::styled(value, value_style),
    ])
}

fn render_allocation_form(frame: &mut ratatui::Frame, area: Rect, state: &UiState) {
    let form = &state.allocation_form;
    let lines: Vec<Line> = AllocationField::ALL
        .iter()
        .enumerate()
        .map(|(idx, field)| field_line(field.label(), form.display(*field), field.kind(), idx == state.allocation_focus))
        .collect();

    let block = Block::default().title(form.title()).borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_budget_control<S: RecordStore>(frame: &mut ratatui::Frame, area: Rect, ctx: &AppContext<S>, state: &mut UiState) {
    let form_height = TransactionField::ALL.len() as u16 + 3;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(form_height), Constraint::Min(4)])
        .split(area);

    let form = &state.transaction_form;
    let form_focused = state.control_focus == ControlFocus::Form;
    let mut lines: Vec<Line> = TransactionField::ALL
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            field_line(
                field.label(),
                form.display(*field),
                field.kind(),
                form_focused && idx == state.transaction_focus,
            )
        })
        .collect();
    let plan = form
        .project_name
        .as_deref()
        .and_then(|name| plan_for_project(ctx.allocations(), name))
        .unwrap_or("-");
    lines.push(Line::from(Span::styled(
        format!("  {:<18}{}", "Plan", plan),
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default().title(form.title()).borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), chunks[0]);

    render_control_table(frame, chunks[1], &ctx.views().control_rows, &mut state.control_table, !form_focused);
}

fn amount_cell(text: String, value: Decimal) -> Cell<'static> {
    if value < Decimal::ZERO {
        Cell::from(text).style(Style::default().fg(Color::Red))
    } else {
        Cell::from(text)
    }
}

fn header_row(headers: &[&'static str]) -> Row<'static> {
    Row::new(headers.iter().map(|h| Cell::from(*h).style(Style::default().bold()))).style(Style::default().fg(Color::White))
}

fn render_plan_table(frame: &mut ratatui::Frame, area: Rect, rows: &[PlanRow], table_state: &mut TableState) {
    let block = Block::default().title("Budget plan").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let body = rows.iter().map(|row| {
        let [plan, output, main_activity, project, department, project_code, budget_code, budget, used, remaining] =
            row.cells();
        Row::new([
            Cell::from(plan),
            Cell::from(output),
            Cell::from(main_activity),
            Cell::from(project),
            Cell::from(department),
            Cell::from(project_code),
            Cell::from(budget_code),
            Cell::from(budget),
            Cell::from(used),
            amount_cell(remaining, row.remaining),
        ])
    });

    let widths = [
        Constraint::Fill(2),
        Constraint::Fill(2),
        Constraint::Fill(2),
        Constraint::Fill(2),
        Constraint::Length(6),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Length(16),
        Constraint::Length(16),
        Constraint::Length(16),
    ];

    let table = Table::new(body, widths)
        .header(header_row(&PlanRow::HEADERS))
        .row_highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White).bold())
        .highlight_symbol("➤ ")
        .column_spacing(1);
    frame.render_stateful_widget(table, inner, table_state);

    if rows.is_empty() {
        render_empty(frame, inner, "No allocations yet");
    }
}

fn render_control_table(
    frame: &mut ratatui::Frame,
    area: Rect,
    rows: &[ControlRow],
    table_state: &mut TableState,
    focused: bool,
) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title("Budget control")
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let body = rows.iter().map(|row| {
        let [project, activity, department, committed, used, category, remaining, recorded] = row.cells();
        Row::new([
            Cell::from(project),
            Cell::from(activity),
            Cell::from(department),
            Cell::from(committed),
            Cell::from(used),
            Cell::from(category),
            amount_cell(remaining, row.remaining),
            Cell::from(recorded),
        ])
    });

    let widths = [
        Constraint::Fill(2),
        Constraint::Fill(2),
        Constraint::Length(6),
        Constraint::Length(16),
        Constraint::Length(16),
        Constraint::Fill(1),
        Constraint::Length(16),
        Constraint::Length(16),
    ];

    let highlight = if focused {
        Style::default().bg(Color::DarkGray).fg(Color::White).bold()
    } else {
        Style::default()
    };
    let table = Table::new(body, widths)
        .header(header_row(&ControlRow::HEADERS))
        .row_highlight_style(highlight)
        .highlight_symbol("➤ ")
        .column_spacing(1);
    frame.render_stateful_widget(table, inner, table_state);

    if rows.is_empty() {
        render_empty(frame, inner, "No budget control entries yet");
    }
}

fn render_empty(frame: &mut ratatui::Frame, area: Rect, message: &str) {
    let empty = Paragraph::new(message.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(empty, area);
}

fn render_dashboard<S: RecordStore>(frame: &mut ratatui::Frame, area: Rect, ctx: &AppContext<S>) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let lines: Vec<Line> = summary_lines(ctx.summary()).into_iter().map(Line::from).collect();
    let block = Block::default().title("Summary").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), columns[0]);

    let charts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(35),
            Constraint::Percentage(35),
        ])
        .split(columns[1]);

    let views = ctx.views();
    render_chart(frame, charts[0], &views.total_chart);
    render_chart(frame, charts[1], &views.department_chart);
    render_chart(frame, charts[2], &views.plan_chart);
}

fn render_confirm_modal(frame: &mut ratatui::Frame, area: Rect, pending: &PendingDelete) {
    let popup_area = modal_rect(area, 60, 25);
    frame.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from(vec![Span::styled("Confirm delete", Style::default().fg(Color::Red).bold())]),
        Line::from(""),
        Line::from(format!("Delete {}?", pending.label)),
        Line::from(""),
        Line::from(Span::styled("y/Enter delete  n/Esc keep", Style::default().fg(Color::DarkGray))),
    ];

    let block = Block::default().borders(Borders::ALL).title("Delete");
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        popup_area,
    );
}

fn render_notification(frame: &mut ratatui::Frame, area: Rect, active: &ActiveNotification) {
    let popup_area = modal_rect(area, 50, 20);
    frame.render_widget(Clear, popup_area);

    let notification = &active.notification;
    let (title, color) = if notification.is_success() {
        ("Success", Color::Green)
    } else {
        ("Error", Color::Red)
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(notification.message.clone(), Style::default().fg(color).bold())),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        popup_area,
    );
}

/// Box of the given share of `area`, centred within it.
fn modal_rect(area: Rect, width_pct: u16, height_pct: u16) -> Rect {
    let scale = |len: u16, pct: u16| (u32::from(len) * u32::from(pct.min(100)) / 100) as u16;
    let width = scale(area.width, width_pct);
    let height = scale(area.height, height_pct);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
