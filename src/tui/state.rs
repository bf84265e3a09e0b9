use crate::app::AppContext;
use crate::forms::{AllocationField, AllocationForm, FieldKind, TransactionField, TransactionForm};
use crate::models::record::find_by_id;
use crate::operations::lifecycle;
use crate::operations::notification::{ActiveNotification, Notification};
use crate::store::{Collection, RecordStore};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::widgets::TableState;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Allocations,
    BudgetPlan,
    BudgetControl,
    Dashboard,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Allocations, Page::BudgetPlan, Page::BudgetControl, Page::Dashboard];

    pub fn title(self) -> &'static str {
        match self {
            Page::Allocations => "Allocations",
            Page::BudgetPlan => "Budget plan",
            Page::BudgetControl => "Budget control",
            Page::Dashboard => "Dashboard",
        }
    }

    fn from_number(n: u8) -> Option<Self> {
        Self::ALL.get(usize::from(n).checked_sub(1)?).copied()
    }
}

/// Where keystrokes go on the budget control page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFocus {
    Form,
    Table,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingDelete {
    pub collection: Collection,
    pub id: String,
    pub label: String,
}

/// Common editing surface of the two entry forms.
trait EntryForm {
    type Field: Copy + PartialEq + 'static;

    fn fields() -> &'static [Self::Field];
    fn kind(field: Self::Field) -> FieldKind;
    fn text_mut(&mut self, field: Self::Field) -> Option<&mut String>;
    fn cycle(&mut self, field: Self::Field, step: isize, projects: &[String]);
    fn leave(&mut self, field: Self::Field);
}

impl EntryForm for AllocationForm {
    type Field = AllocationField;

    fn fields() -> &'static [AllocationField] {
        &AllocationField::ALL
    }

    fn kind(field: AllocationField) -> FieldKind {
        field.kind()
    }

    fn text_mut(&mut self, field: AllocationField) -> Option<&mut String> {
        AllocationForm::text_mut(self, field)
    }

    fn cycle(&mut self, field: AllocationField, step: isize, _projects: &[String]) {
        AllocationForm::cycle(self, field, step)
    }

    fn leave(&mut self, field: AllocationField) {
        AllocationForm::leave(self, field)
    }
}

impl EntryForm for TransactionForm {
    type Field = TransactionField;

    fn fields() -> &'static [TransactionField] {
        &TransactionField::ALL
    }

    fn kind(field: TransactionField) -> FieldKind {
        field.kind()
    }

    fn text_mut(&mut self, field: TransactionField) -> Option<&mut String> {
        TransactionForm::text_mut(self, field)
    }

    fn cycle(&mut self, field: TransactionField, step: isize, projects: &[String]) {
        TransactionForm::cycle(self, field, step, projects)
    }

    fn leave(&mut self, field: TransactionField) {
        TransactionForm::leave(self, field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormAction {
    Stay,
    Submit,
    Reset,
    /// Tab pressed on the last editable field.
    PastEnd,
}

fn editable_positions<F: EntryForm>() -> Vec<usize> {
    F::fields()
        .iter()
        .enumerate()
        .filter(|(_, field)| F::kind(**field) != FieldKind::ReadOnly)
        .map(|(idx, _)| idx)
        .collect()
}

fn move_focus<F: EntryForm>(form: &mut F, focus: &mut usize, step: isize) -> bool {
    let positions = editable_positions::<F>();
    let current = positions.iter().position(|p| *p == *focus).unwrap_or(0) as isize;
    let next = current + step;
    if next < 0 || next >= positions.len() as isize {
        return false;
    }
    form.leave(F::fields()[*focus]);
    *focus = positions[next as usize];
    true
}

fn edit_form<F: EntryForm>(form: &mut F, focus: &mut usize, key: KeyEvent, projects: &[String]) -> FormAction {
    let field = F::fields()[*focus];
    match key.code {
        KeyCode::Enter => {
            form.leave(field);
            return FormAction::Submit;
        }
        KeyCode::Esc => return FormAction::Reset,
        KeyCode::Tab | KeyCode::Down => {
            if !move_focus(form, focus, 1) && key.code == KeyCode::Tab {
                form.leave(field);
                return FormAction::PastEnd;
            }
        }
        KeyCode::BackTab | KeyCode::Up => {
            move_focus(form, focus, -1);
        }
        KeyCode::Left if F::kind(field) == FieldKind::Select => form.cycle(field, -1, projects),
        KeyCode::Right if F::kind(field) == FieldKind::Select => form.cycle(field, 1, projects),
        KeyCode::Backspace => {
            if let Some(text) = form.text_mut(field) {
                text.pop();
            }
        }
        KeyCode::Char(ch) => {
            if let Some(text) = form.text_mut(field) {
                text.push(ch);
            }
        }
        _ => {}
    }
    FormAction::Stay
}

pub struct UiState {
    pub page: Page,
    pub allocation_form: AllocationForm,
    pub allocation_focus: usize,
    pub transaction_form: TransactionForm,
    pub transaction_focus: usize,
    pub control_focus: ControlFocus,
    pub plan_table: TableState,
    pub control_table: TableState,
    pub confirm: Option<PendingDelete>,
    pub notification: Option<ActiveNotification>,
    notification_ttl: Duration,
}

impl UiState {
    pub fn new(notification_ttl: Duration) -> Self {
        Self {
            page: Page::Allocations,
            allocation_form: AllocationForm::default(),
            allocation_focus: 0,
            transaction_form: TransactionForm::default(),
            transaction_focus: 0,
            control_focus: ControlFocus::Form,
            plan_table: TableState::default(),
            control_table: TableState::default(),
            confirm: None,
            notification: None,
            notification_ttl,
        }
    }

    /// Keeps table selections inside the current row counts.
    pub fn sync_tables<S: RecordStore>(&mut self, ctx: &AppContext<S>) {
        clamp_selection(&mut self.plan_table, ctx.views().plan_rows.len());
        clamp_selection(&mut self.control_table, ctx.views().control_rows.len());
    }

    pub fn expire_notification(&mut self, now: Instant) {
        if self.notification.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.notification = None;
        }
    }

    fn notify(&mut self, notification: Notification, now: Instant) {
        self.notification = Some(ActiveNotification::new(notification, self.notification_ttl, now));
    }

    pub fn table_has_focus(&self) -> bool {
        match self.page {
            Page::Allocations => false,
            Page::BudgetControl => self.control_focus == ControlFocus::Table,
            Page::BudgetPlan | Page::Dashboard => true,
        }
    }

    /// Returns true when the user asked to quit.
    pub fn handle_key<S: RecordStore>(&mut self, ctx: &mut AppContext<S>, key: KeyEvent, now: Instant) -> bool {
        // key-up is reported as its own event on some platforms
        if key.kind == KeyEventKind::Release {
            return false;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
        {
            return true;
        }

        if self.notification.take().is_some() {
            return false;
        }

        if let Some(pending) = self.confirm.take() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    let notification = match pending.collection {
                        Collection::Allocations => lifecycle::delete_allocation(ctx.store_mut(), &pending.id),
                        Collection::Transactions => lifecycle::delete_transaction(ctx.store_mut(), &pending.id),
                    };
                    self.notify(notification, now);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {}
                _ => self.confirm = Some(pending),
            }
            return false;
        }

        if let KeyCode::F(n) = key.code {
            if let Some(page) = Page::from_number(n) {
                self.page = page;
            }
            return false;
        }

        if self.table_has_focus() {
            match key.code {
                KeyCode::Char('q') => return true,
                KeyCode::Char(ch @ '1'..='4') => {
                    if let Some(page) = Page::from_number(ch as u8 - b'0') {
                        self.page = page;
                    }
                    return false;
                }
                _ => {}
            }
        }

        match self.page {
            Page::Allocations => self.handle_allocation_form(ctx, key, now),
            Page::BudgetPlan => self.handle_plan_table(ctx, key, now),
            Page::BudgetControl => match self.control_focus {
                ControlFocus::Form => self.handle_transaction_form(ctx, key, now),
                ControlFocus::Table => self.handle_control_table(ctx, key, now),
            },
            Page::Dashboard => {}
        }
        false
    }

    fn handle_allocation_form<S: RecordStore>(&mut self, ctx: &mut AppContext<S>, key: KeyEvent, now: Instant) {
        match edit_form(&mut self.allocation_form, &mut self.allocation_focus, key, &[]) {
            FormAction::Submit => {
                let notification = lifecycle::save_allocation(ctx.store_mut(), &self.allocation_form);
                if notification.is_success() {
                    self.allocation_form = AllocationForm::default();
                    self.allocation_focus = 0;
                }
                self.notify(notification, now);
            }
            FormAction::Reset => {
                self.allocation_form = AllocationForm::default();
                self.allocation_focus = 0;
            }
            FormAction::PastEnd | FormAction::Stay => {}
        }
    }

    fn handle_transaction_form<S: RecordStore>(&mut self, ctx: &mut AppContext<S>, key: KeyEvent, now: Instant) {
        let projects = ctx.projects().to_vec();
        match edit_form(&mut self.transaction_form, &mut self.transaction_focus, key, &projects) {
            FormAction::Submit => {
                let notification = lifecycle::save_transaction(ctx.store_mut(), &self.transaction_form);
                if notification.is_success() {
                    self.transaction_form = TransactionForm::default();
                    self.transaction_focus = 0;
                }
                self.notify(notification, now);
            }
            FormAction::Reset => {
                self.transaction_form = TransactionForm::default();
                self.transaction_focus = 0;
            }
            FormAction::PastEnd => self.control_focus = ControlFocus::Table,
            FormAction::Stay => {}
        }
    }

    fn handle_plan_table<S: RecordStore>(&mut self, ctx: &AppContext<S>, key: KeyEvent, now: Instant) {
        let rows = &ctx.views().plan_rows;
        match key.code {
            KeyCode::Up => move_selection(&mut self.plan_table, rows.len(), -1),
            KeyCode::Down => move_selection(&mut self.plan_table, rows.len(), 1),
            KeyCode::Char('e') => {
                let Some(row) = self.plan_table.selected().and_then(|i| rows.get(i)) else {
                    return;
                };
                match find_by_id(ctx.allocations(), &row.id) {
                    Some(record) => {
                        self.allocation_form = AllocationForm::from_record(record);
                        self.allocation_focus = 0;
                        self.page = Page::Allocations;
                    }
                    None => self.notify(Notification::error("Allocation no longer exists"), now),
                }
            }
            KeyCode::Char('d') => {
                if let Some(row) = self.plan_table.selected().and_then(|i| rows.get(i)) {
                    self.confirm = Some(PendingDelete {
                        collection: Collection::Allocations,
                        id: row.id.clone(),
                        label: format!("allocation '{}'", row.project_name),
                    });
                }
            }
            _ => {}
        }
    }

    fn handle_control_table<S: RecordStore>(&mut self, ctx: &AppContext<S>, key: KeyEvent, now: Instant) {
        let rows = &ctx.views().control_rows;
        match key.code {
            KeyCode::Up => move_selection(&mut self.control_table, rows.len(), -1),
            KeyCode::Down => move_selection(&mut self.control_table, rows.len(), 1),
            KeyCode::Tab | KeyCode::Esc => {
                self.control_focus = ControlFocus::Form;
                self.transaction_focus = 0;
            }
            KeyCode::Char('e') => {
                let Some(row) = self.control_table.selected().and_then(|i| rows.get(i)) else {
                    return;
                };
                match find_by_id(ctx.transactions(), &row.id) {
                    Some(record) => {
                        self.transaction_form = TransactionForm::from_record(record);
                        self.transaction_focus = 0;
                        self.control_focus = ControlFocus::Form;
                    }
                    None => self.notify(Notification::error("Budget control entry no longer exists"), now),
                }
            }
            KeyCode::Char('d') => {
                if let Some(row) = self.control_table.selected().and_then(|i| rows.get(i)) {
                    self.confirm = Some(PendingDelete {
                        collection: Collection::Transactions,
                        id: row.id.clone(),
                        label: format!("entry '{}' for {}", row.activity, row.project_name),
                    });
                }
            }
            _ => {}
        }
    }
}

fn clamp_selection(table: &mut TableState, len: usize) {
    if len == 0 {
        table.select(None);
    } else {
        let selected = table.selected().unwrap_or(0).min(len - 1);
        table.select(Some(selected));
    }
}

fn move_selection(table: &mut TableState, len: usize, delta: isize) {
    if len == 0 {
        table.select(None);
        return;
    }
    let current = table.selected().unwrap_or(0) as isize;
    let next = (current + delta).clamp(0, len as isize - 1) as usize;
    table.select(Some(next));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::department::Department;
    use crate::store::SqliteStore;
    use crossterm::event::KeyEventState;
    use rust_decimal::Decimal;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn type_text<S: RecordStore>(state: &mut UiState, ctx: &mut AppContext<S>, text: &str, now: Instant) {
        for ch in text.chars() {
            state.handle_key(ctx, press(KeyCode::Char(ch)), now);
        }
    }

    /// Fills the allocation form through the keyboard and submits it.
    fn enter_allocation<S: RecordStore>(state: &mut UiState, ctx: &mut AppContext<S>, project: &str, budget: &str) {
        let now = Instant::now();
        state.notification = None;
        for field in AllocationField::ALL {
            match field {
                AllocationField::Department => {
                    state.handle_key(ctx, press(KeyCode::Right), now);
                }
                AllocationField::Budget => type_text(state, ctx, budget, now),
                AllocationField::ProjectName => type_text(state, ctx, project, now),
                _ => type_text(state, ctx, "x", now),
            }
            state.handle_key(ctx, press(KeyCode::Down), now);
        }
        state.handle_key(ctx, press(KeyCode::Enter), now);
    }

    fn setup() -> (UiState, AppContext<SqliteStore>) {
        let ctx = AppContext::new(SqliteStore::in_memory().unwrap()).unwrap();
        (UiState::new(Duration::from_secs(3)), ctx)
    }

    #[test]
    fn test_allocation_entry_through_keyboard() {
        let (mut state, mut ctx) = setup();
        enter_allocation(&mut state, &mut ctx, "Clinic", "12500");

        let notification = state.notification.as_ref().unwrap();
        assert!(notification.notification.is_success());
        assert_eq!(state.allocation_form, AllocationForm::default());

        ctx.pump_snapshots();
        assert_eq!(ctx.allocations().len(), 1);
        assert_eq!(ctx.allocations()[0].data.project_name, "Clinic");
        assert_eq!(ctx.allocations()[0].data.budget, Decimal::new(12500, 0));
        assert_eq!(ctx.allocations()[0].data.department, Department::Ps);
    }

    #[test]
    fn test_invalid_submit_keeps_form() {
        let (mut state, mut ctx) = setup();
        let now = Instant::now();
        type_text(&mut state, &mut ctx, "Only a plan", now);
        state.handle_key(&mut ctx, press(KeyCode::Enter), now);

        let notification = state.notification.as_ref().unwrap();
        assert!(!notification.notification.is_success());
        assert_eq!(state.allocation_form.plan, "Only a plan");
    }

    #[test]
    fn test_any_key_dismisses_notification() {
        let (mut state, mut ctx) = setup();
        let now = Instant::now();
        state.notify(Notification::success("Saved"), now);

        state.handle_key(&mut ctx, press(KeyCode::Char('a')), now);
        assert!(state.notification.is_none());
        // the dismissing key is not typed into the form
        assert_eq!(state.allocation_form.plan, "");
    }

    #[test]
    fn test_notification_expires() {
        let (mut state, _ctx) = setup();
        let now = Instant::now();
        state.notify(Notification::error("Failed"), now);

        state.expire_notification(now + Duration::from_secs(1));
        assert!(state.notification.is_some());
        state.expire_notification(now + Duration::from_secs(3));
        assert!(state.notification.is_none());
    }

    #[test]
    fn test_edit_from_plan_table_prefills_form() {
        let (mut state, mut ctx) = setup();
        enter_allocation(&mut state, &mut ctx, "Clinic", "12500");
        state.notification = None;
        ctx.pump_snapshots();
        state.sync_tables(&ctx);

        let now = Instant::now();
        state.handle_key(&mut ctx, press(KeyCode::F(2)), now);
        state.handle_key(&mut ctx, press(KeyCode::Char('e')), now);

        assert_eq!(state.page, Page::Allocations);
        assert_eq!(state.allocation_form.project_name, "Clinic");
        assert_eq!(state.allocation_form.budget, "12,500.00");
        assert_eq!(state.allocation_form.editing_id.as_deref(), Some(ctx.allocations()[0].id.as_str()));
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let (mut state, mut ctx) = setup();
        enter_allocation(&mut state, &mut ctx, "Clinic", "100");
        enter_allocation(&mut state, &mut ctx, "School", "200");
        state.notification = None;
        ctx.pump_snapshots();
        state.sync_tables(&ctx);

        let now = Instant::now();
        state.handle_key(&mut ctx, press(KeyCode::F(2)), now);
        state.handle_key(&mut ctx, press(KeyCode::Char('d')), now);
        assert!(state.confirm.is_some());

        state.handle_key(&mut ctx, press(KeyCode::Char('n')), now);
        assert!(state.confirm.is_none());
        ctx.pump_snapshots();
        assert_eq!(ctx.allocations().len(), 2);

        state.handle_key(&mut ctx, press(KeyCode::Char('d')), now);
        state.handle_key(&mut ctx, press(KeyCode::Char('y')), now);
        assert!(state.notification.as_ref().unwrap().notification.is_success());
        ctx.pump_snapshots();
        state.sync_tables(&ctx);
        assert_eq!(ctx.allocations().len(), 1);
        assert_eq!(ctx.allocations()[0].data.project_name, "School");
        assert_eq!(state.plan_table.selected(), Some(0));
    }

    #[test]
    fn test_transaction_form_uses_project_options() {
        let (mut state, mut ctx) = setup();
        enter_allocation(&mut state, &mut ctx, "Clinic", "1000");
        state.notification = None;
        ctx.pump_snapshots();

        let now = Instant::now();
        state.handle_key(&mut ctx, press(KeyCode::F(3)), now);
        state.handle_key(&mut ctx, press(KeyCode::Right), now);
        assert_eq!(state.transaction_form.project_name.as_deref(), Some("Clinic"));

        state.handle_key(&mut ctx, press(KeyCode::Tab), now);
        type_text(&mut state, &mut ctx, "Printing", now);
        state.handle_key(&mut ctx, press(KeyCode::Tab), now);
        state.handle_key(&mut ctx, press(KeyCode::Right), now);
        state.handle_key(&mut ctx, press(KeyCode::Tab), now);
        type_text(&mut state, &mut ctx, "400", now);
        state.handle_key(&mut ctx, press(KeyCode::Tab), now);
        type_text(&mut state, &mut ctx, "150", now);
        state.handle_key(&mut ctx, press(KeyCode::Tab), now);
        assert_eq!(state.transaction_form.actual_used, "150.00");
        state.handle_key(&mut ctx, press(KeyCode::Right), now);
        assert_eq!(state.transaction_form.remaining(), Decimal::new(250, 0));

        state.handle_key(&mut ctx, press(KeyCode::Enter), now);
        assert!(state.notification.as_ref().unwrap().notification.is_success());

        ctx.pump_snapshots();
        assert_eq!(ctx.transactions().len(), 1);
        assert_eq!(ctx.views().plan_rows[0].remaining, Decimal::new(850, 0));
        assert_eq!(ctx.transactions()[0].data.remaining, Decimal::new(250, 0));
    }

    #[test]
    fn test_tab_past_last_field_focuses_table() {
        let (mut state, mut ctx) = setup();
        let now = Instant::now();
        state.handle_key(&mut ctx, press(KeyCode::F(3)), now);
        // six editable fields, Remaining is skipped
        for _ in 0..6 {
            state.handle_key(&mut ctx, press(KeyCode::Tab), now);
        }
        assert_eq!(state.control_focus, ControlFocus::Table);

        // digits switch pages while the table has focus
        state.handle_key(&mut ctx, press(KeyCode::Char('4')), now);
        assert_eq!(state.page, Page::Dashboard);
    }

    #[test]
    fn test_quit_keys() {
        let (mut state, mut ctx) = setup();
        let now = Instant::now();
        // typed into the allocation form, not a quit
        assert!(!state.handle_key(&mut ctx, press(KeyCode::Char('q')), now));
        assert_eq!(state.allocation_form.plan, "q");

        let ctrl_q = KeyEvent {
            modifiers: KeyModifiers::CONTROL,
            ..press(KeyCode::Char('q'))
        };
        assert!(state.handle_key(&mut ctx, ctrl_q, now));

        state.page = Page::Dashboard;
        assert!(state.handle_key(&mut ctx, press(KeyCode::Char('q')), now));
    }

    #[test]
    fn test_release_events_ignored() {
        let (mut state, mut ctx) = setup();
        let release = KeyEvent {
            kind: KeyEventKind::Release,
            ..press(KeyCode::Char('a'))
        };
        state.handle_key(&mut ctx, release, Instant::now());
        assert_eq!(state.allocation_form.plan, "");
    }
}
