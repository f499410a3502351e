//! Interactive console driving one signed-in session.
//!
//! Every entered line counts as key-down activity. When the session ends
//! without a command (idle timeout, provider sign-out) the console stops.

use clap::Args;
use dialoguer::{Input, Password};
use serde::Serialize;
use tabled::Tabled;

use clubdesk_auth::SessionManager;
use clubdesk_auth::rbac::{Capability, Section};
use clubdesk_backend::Backend;
use clubdesk_core::config::AppConfig;
use clubdesk_core::error::{AppError, ErrorKind};
use clubdesk_core::result::AppResult;
use clubdesk_core::types::{MemberId, UserId};
use clubdesk_entity::audit::AuditLogEntry;
use clubdesk_entity::contract::{Contract, ContractType};
use clubdesk_entity::finance::{LedgerEntry, format_currency};
use clubdesk_entity::member::{Member, MemberType};
use clubdesk_entity::session::{ActivitySignal, SessionPhase};
use clubdesk_entity::user::UserProfile;
use clubdesk_service::audit::service::DEFAULT_LIMIT;
use clubdesk_service::{
    ActorContext, AuditService, ContractService, FinanceService, MemberService, UserAdminService,
};

use crate::output::{self, OutputFormat};

const SIGN_IN_ATTEMPTS: usize = 3;

const HELP: &str = "\
Commands:
  whoami                      show the signed-in account
  can <capability>            check a capability, e.g. 'can record-finance'
  sections                    menu sections visible to your role
  passwd                      change your password
  users                       list users (admin)
  block <user-id> [reason]    block an account (admin)
  unblock <user-id>           unblock an account (admin)
  members <player|staff>      list players or staff
  member <member-id>          a member's payment history (finance)
  contracts [player|staff]    list contracts
  summary                     finance dashboard totals
  audit                       recent changes (admin)
  logout                      sign out and exit
  quit                        exit, keeping the provider session";

/// Arguments for the console command
#[derive(Debug, Args)]
pub struct ConsoleArgs {
    /// Email to sign in with; prompted for when omitted
    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    id: String,
    email: String,
    name: String,
    role: String,
    status: String,
    reason: String,
}

impl From<&UserProfile> for UserRow {
    fn from(p: &UserProfile) -> Self {
        Self {
            id: p.id.to_string(),
            email: p.email.clone().unwrap_or_default(),
            name: p.full_name.clone().unwrap_or_default(),
            role: p.role.map_or_else(|| "none".to_string(), |r| r.to_string()),
            status: if p.is_active { "active" } else { "blocked" }.to_string(),
            reason: p.blocked_reason.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct MemberRow {
    id: String,
    name: String,
    role: String,
    phone: String,
    born: String,
    salary: String,
}

impl From<&Member> for MemberRow {
    fn from(m: &Member) -> Self {
        Self {
            id: m.id.to_string(),
            name: m.full_name.clone(),
            role: m.role.clone(),
            phone: m.phone.clone(),
            born: m.date_of_birth.to_string(),
            salary: format_currency(m.monthly_salary),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct PaymentRow {
    date: String,
    kind: String,
    amount: String,
    notes: String,
}

impl From<&LedgerEntry> for PaymentRow {
    fn from(e: &LedgerEntry) -> Self {
        Self {
            date: e.date.to_string(),
            kind: e.category.to_string(),
            amount: format_currency(e.amount),
            notes: e.notes.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct AuditRow {
    when: String,
    table: String,
    action: String,
    by: String,
    change: String,
}

impl From<&AuditLogEntry> for AuditRow {
    fn from(e: &AuditLogEntry) -> Self {
        Self {
            when: e.changed_at.format("%Y-%m-%d %H:%M").to_string(),
            table: e.table_name.clone(),
            action: e.action.to_string(),
            by: e.actor_name().to_string(),
            change: e.summary(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct ContractRow {
    number: String,
    #[tabled(rename = "type")]
    contract_type: String,
    position: String,
    start: String,
    end: String,
    allowance: String,
    status: String,
}

impl From<&Contract> for ContractRow {
    fn from(c: &Contract) -> Self {
        Self {
            number: c.contract_no.clone(),
            contract_type: c.contract_type.to_string(),
            position: c.position_title.clone().unwrap_or_default(),
            start: c.start_date.to_string(),
            end: c.end_date.to_string(),
            allowance: format_currency(c.monthly_allowance),
            status: c.status.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SummaryView {
    salaries: String,
    extra_payments: String,
    match_expenses: String,
    other_expenses: String,
    total_expenses: String,
    income: String,
    net_balance: String,
}

enum Flow {
    Continue,
    Exit,
}

struct Console {
    session: SessionManager,
    users: UserAdminService,
    members: MemberService,
    contracts: ContractService,
    finance: FinanceService,
    audit: AuditService,
    format: OutputFormat,
}

/// Execute the console command
pub async fn execute(
    args: &ConsoleArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let backend = Backend::from_config(&config.backend)?;
    let session = SessionManager::new(
        backend.credentials.clone(),
        backend.profiles.clone(),
        &config.auth,
        &config.session,
    );
    let console = Console {
        users: UserAdminService::new(backend.profiles.clone(), session.password_policy().clone()),
        members: MemberService::new(backend.members.clone(), backend.ledger.clone()),
        contracts: ContractService::new(backend.contracts.clone()),
        finance: FinanceService::new(backend.ledger.clone()),
        audit: AuditService::new(backend.audit.clone()),
        session,
        format,
    };

    let snapshot = console.session.initialize().await;
    if !snapshot.is_authenticated() {
        console.sign_in(args.email.clone()).await?;
    }

    let result = console.run().await;
    console.session.shutdown().await;
    result
}

impl Console {
    async fn sign_in(&self, email: Option<String>) -> AppResult<()> {
        let email = match email {
            Some(email) => email,
            None => prompt_line("Email".to_string()).await?,
        };

        for attempt in 1..=SIGN_IN_ATTEMPTS {
            let password = prompt_secret("Password").await?;
            match self.session.sign_in(&email, &password).await {
                Ok(_) => return Ok(()),
                Err(e) if e.is(ErrorKind::InvalidCredentials) && attempt < SIGN_IN_ATTEMPTS => {
                    output::print_error(&e.message);
                }
                Err(e) => return Err(e),
            }
        }
        Err(AppError::invalid_credentials("Too many failed sign-in attempts"))
    }

    async fn run(&self) -> AppResult<()> {
        let snapshot = self.session.snapshot();
        let name = snapshot.full_name.as_deref().unwrap_or("there");
        output::print_success(&format!("Welcome, {name}. Type 'help' for commands."));

        let mut states = self.session.subscribe();
        loop {
            let line = tokio::select! {
                line = prompt_line("clubdesk".to_string()) => line?,
                _ = states.wait_for(|s| s.phase == SessionPhase::Anonymous) => {
                    output::print_warning("Your session has ended. Press Enter to exit.");
                    return Ok(());
                }
            };

            self.session.record_activity(ActivitySignal::KeyDown).await;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if self.session.recheck().await.phase == SessionPhase::Anonymous {
                output::print_warning("Your session has ended.");
                return Ok(());
            }

            match self.dispatch(line).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => return Ok(()),
                Err(e) => output::print_error(&e.to_string()),
            }
        }
    }

    async fn dispatch(&self, line: &str) -> AppResult<Flow> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(Flow::Continue);
        };
        let args: Vec<&str> = words.collect();

        match command {
            "help" => println!("{HELP}"),
            "whoami" => self.whoami().await?,
            "can" => {
                let capability: Capability = required(&args, "can <capability>")?.parse()?;
                let verdict = if self.session.can(capability) { "allowed" } else { "denied" };
                println!("{capability}: {verdict}");
            }
            "sections" => {
                for section in Section::visible_to(self.session.snapshot().role) {
                    println!("  {}", section.label());
                }
            }
            "passwd" => {
                let new_password = prompt_secret("New password").await?;
                let confirmation = prompt_secret("Confirm new password").await?;
                self.session
                    .change_password(&new_password, &confirmation)
                    .await?;
                output::print_success("Password changed");
            }
            "users" => {
                let ctx = ActorContext::current(&self.session)?;
                let users = self.users.list_users(&ctx).await?;
                let rows: Vec<UserRow> = users.iter().map(UserRow::from).collect();
                output::print_list(&rows, self.format);
            }
            "block" => {
                let ctx = ActorContext::current(&self.session)?;
                let user_id = parse_user_id(required(&args, "block <user-id> [reason]")?)?;
                let reason = args[1..].join(" ");
                self.users
                    .block_user(&ctx, user_id, Some(reason.as_str()))
                    .await?;
                output::print_success(&format!("User {user_id} blocked"));
            }
            "unblock" => {
                let ctx = ActorContext::current(&self.session)?;
                let user_id = parse_user_id(required(&args, "unblock <user-id>")?)?;
                self.users.unblock_user(&ctx, user_id).await?;
                output::print_success(&format!("User {user_id} unblocked"));
            }
            "members" => {
                let ctx = ActorContext::current(&self.session)?;
                let member_type: MemberType = required(&args, "members <player|staff>")?.parse()?;
                let members = self.members.list(&ctx, member_type).await?;
                let rows: Vec<MemberRow> = members.iter().map(MemberRow::from).collect();
                output::print_list(&rows, self.format);
            }
            "member" => {
                let ctx = ActorContext::current(&self.session)?;
                let member_id = parse_member_id(required(&args, "member <member-id>")?)?;
                let history = self.members.payments(&ctx, member_id).await?;
                output::print_kv("name", &history.member.full_name);
                output::print_kv("role", &history.member.role);
                output::print_kv("salaries", &format_currency(history.total_salaries()));
                output::print_kv("extras", &format_currency(history.total_extras()));
                output::print_kv("total cost", &format_currency(history.total_cost()));
                let rows: Vec<PaymentRow> = history
                    .salary_payments
                    .iter()
                    .chain(&history.extra_payments)
                    .map(PaymentRow::from)
                    .collect();
                output::print_list(&rows, self.format);
            }
            "contracts" => {
                let ctx = ActorContext::current(&self.session)?;
                let filter = args
                    .first()
                    .map(|t| t.parse::<ContractType>())
                    .transpose()?;
                let contracts = self.contracts.list(&ctx, filter).await?;
                let rows: Vec<ContractRow> = contracts.iter().map(ContractRow::from).collect();
                output::print_list(&rows, self.format);
            }
            "summary" => {
                let ctx = ActorContext::current(&self.session)?;
                let summary = self.finance.summary(&ctx).await?;
                let view = SummaryView {
                    salaries: format_currency(summary.total_salaries),
                    extra_payments: format_currency(summary.total_extra_payments),
                    match_expenses: format_currency(summary.total_match_expenses),
                    other_expenses: format_currency(summary.total_other_expenses),
                    total_expenses: format_currency(summary.total_expenses()),
                    income: format_currency(summary.total_income),
                    net_balance: format_currency(summary.net_balance()),
                };
                output::print_item(&view, self.format);
            }
            "audit" => {
                let ctx = ActorContext::current(&self.session)?;
                let entries = self.audit.list(&ctx, DEFAULT_LIMIT).await?;
                let rows: Vec<AuditRow> = entries.iter().map(AuditRow::from).collect();
                output::print_list(&rows, self.format);
            }
            "logout" => {
                self.session.sign_out().await;
                output::print_success("Signed out");
                return Ok(Flow::Exit);
            }
            "quit" | "exit" => return Ok(Flow::Exit),
            other => {
                return Err(AppError::validation(format!(
                    "Unknown command '{other}'. Type 'help' for commands."
                )));
            }
        }
        Ok(Flow::Continue)
    }

    async fn whoami(&self) -> AppResult<()> {
        let ctx = ActorContext::current(&self.session)?;
        let idle = self
            .session
            .idle_for()
            .await
            .map_or_else(|| "-".to_string(), |d| format!("{}s", d.as_secs()));

        output::print_kv("email", &ctx.email);
        output::print_kv("name", ctx.display_name());
        output::print_kv(
            "role",
            &ctx.role.map_or_else(|| "none".to_string(), |r| r.label().to_string()),
        );
        output::print_kv("idle", &idle);
        Ok(())
    }
}

fn required<'a>(args: &[&'a str], usage: &str) -> AppResult<&'a str> {
    args.first()
        .copied()
        .ok_or_else(|| AppError::validation(format!("Usage: {usage}")))
}

fn parse_user_id(raw: &str) -> AppResult<UserId> {
    raw.parse()
        .map_err(|e| AppError::with_source(ErrorKind::Validation, format!("Invalid user id '{raw}'"), e))
}

fn parse_member_id(raw: &str) -> AppResult<MemberId> {
    raw.parse().map_err(|e| {
        AppError::with_source(ErrorKind::Validation, format!("Invalid member id '{raw}'"), e)
    })
}

async fn prompt_line(prompt: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
    })
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Internal, "Input task failed", e))?
    .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to read input", e))
}

async fn prompt_secret(prompt: &'static str) -> AppResult<String> {
    tokio::task::spawn_blocking(move || Password::new().with_prompt(prompt).interact())
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Input task failed", e))?
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to read password", e))
}
