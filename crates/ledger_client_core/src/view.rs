//! Dashboard view state: active screen, search text, modal visibility.
//! Plain value updated through [`ViewState::apply`]; nothing global.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Dashboard,
    Accounts,
    Transactions,
    Reports,
}

impl View {
    pub const ALL: [View; 4] = [View::Dashboard, View::Accounts, View::Transactions, View::Reports];

    pub fn title(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Accounts => "Chart of Accounts",
            View::Transactions => "Transactions",
            View::Reports => "Reports",
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            View::Dashboard => "Welcome back! Here's your financial overview.",
            View::Accounts => "Manage your chart of accounts",
            View::Transactions => "Record and manage transactions",
            View::Reports => "Generate financial reports",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewAction {
    Navigate(View),
    Search(String),
    OpenNewTransaction,
    CloseNewTransaction,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
    pub view: View,
    pub search: String,
    pub show_new_transaction_modal: bool,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search text is shared across screens and survives navigation.
    pub fn apply(self, action: ViewAction) -> Self {
        match action {
            ViewAction::Navigate(view) => Self { view, ..self },
            ViewAction::Search(search) => Self { search, ..self },
            ViewAction::OpenNewTransaction => Self {
                show_new_transaction_modal: true,
                ..self
            },
            ViewAction::CloseNewTransaction => Self {
                show_new_transaction_modal: false,
                ..self
            },
        }
    }
}

/// Report placeholders offered on the reports screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportKind {
    TrialBalance,
    IncomeStatement,
    BalanceSheet,
    CashFlowStatement,
    AgedReceivables,
    AgedPayables,
}

impl ReportKind {
    pub const ALL: [ReportKind; 6] = [
        ReportKind::TrialBalance,
        ReportKind::IncomeStatement,
        ReportKind::BalanceSheet,
        ReportKind::CashFlowStatement,
        ReportKind::AgedReceivables,
        ReportKind::AgedPayables,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::TrialBalance => "Trial Balance",
            ReportKind::IncomeStatement => "Income Statement",
            ReportKind::BalanceSheet => "Balance Sheet",
            ReportKind::CashFlowStatement => "Cash Flow Statement",
            ReportKind::AgedReceivables => "Aged Receivables",
            ReportKind::AgedPayables => "Aged Payables",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ReportKind::TrialBalance => "Summary of all account balances",
            ReportKind::IncomeStatement => "Revenue and expenses for the period",
            ReportKind::BalanceSheet => "Assets, liabilities, and equity snapshot",
            ReportKind::CashFlowStatement => "Cash inflows and outflows",
            ReportKind::AgedReceivables => "Outstanding customer invoices by age",
            ReportKind::AgedPayables => "Outstanding supplier bills by age",
        }
    }
}
