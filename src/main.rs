//! Bizdesk CLI
//!
//! Command-line front end for the business desk backend:
//! - Log in and out, manage the profile
//! - Tasks, schedules and the month/week calendar
//! - Customers and their documents
//! - Expenses, summaries, CSV export and recurring costs

use anyhow::{bail, Context};
use bizdesk::calendar::{self, render_month, render_week, CalendarMonth};
use bizdesk::client::{ApiClient, ClientError};
use bizdesk::config::{generate_default_config, Config};
use bizdesk::model::*;
use bizdesk::session::{FileTokenStore, Session};
use bizdesk::state::{Applied, CalendarView, Dashboard, TaskBoard, ViewMode};
use chrono::{Datelike, NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "bizdesk")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tasks, customers, schedules and expenses from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend base URL (overrides the config file)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Config file (default: search the standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the token
    Login {
        username: String,
        /// Password (prompted if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Log out and forget the token
    Logout,

    /// Create an account and log in
    Register {
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
    },

    /// Show the logged-in user
    Whoami,

    /// Update profile fields
    Profile(ProfileArgs),

    /// Change the password
    Password,

    /// Overview: task stats, today's agenda, overdue tasks
    Dashboard {
        /// Day to show (default: today)
        #[arg(short, long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },

    /// Task management
    #[command(subcommand)]
    Tasks(TaskCommand),

    /// Month grid, or a week with --week
    Calendar {
        /// Month to show (YYYY-MM, default: current)
        #[arg(short, long)]
        month: Option<CalendarMonth>,
        /// Show the week containing --date instead of the month
        #[arg(short, long)]
        week: bool,
        /// Focus date for the week view (default: today)
        #[arg(short, long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },

    /// Schedules and tasks of one day
    Day {
        /// Date (YYYY-MM-DD, default: today)
        #[arg(value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },

    /// Schedule management
    #[command(subcommand)]
    Schedules(ScheduleCommand),

    /// Customer management
    #[command(subcommand)]
    Customers(CustomerCommand),

    /// Customer documents
    #[command(subcommand)]
    Documents(DocumentCommand),

    /// Expense tracking
    #[command(subcommand)]
    Expenses(ExpenseCommand),

    /// Recurring expenses
    #[command(subcommand)]
    Recurring(RecurringCommand),

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct ProfileArgs {
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    position: Option<String>,
    #[arg(long)]
    phone: Option<String>,
}

#[derive(Subcommand)]
pub enum TaskCommand {
    /// List tasks
    List {
        /// Only tasks with this status (todo, in_progress, done)
        #[arg(short, long)]
        status: Option<TaskStatus>,
    },
    /// Create a task
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// low, medium, high
        #[arg(short, long, default_value = "medium")]
        priority: TaskPriority,
        /// Due date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        due: Option<NaiveDate>,
    },
    /// Flip a task between done and not done
    Toggle { id: Id },
    /// Delete a task
    Delete { id: Id },
    /// Open tasks past their due date
    Overdue,
    /// Completion statistics
    Stats {
        #[arg(short, long)]
        year: Option<i32>,
        /// Month number (1-12); omit for the whole year
        #[arg(short, long)]
        month: Option<u32>,
    },
}

#[derive(Subcommand)]
pub enum ScheduleCommand {
    /// List schedules in a date range
    List {
        #[arg(long, value_parser = parse_date_arg)]
        from: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date_arg)]
        to: Option<NaiveDate>,
    },
    /// Create a schedule
    Add {
        title: String,
        #[arg(value_parser = parse_date_arg)]
        date: NaiveDate,
        /// Start time (HH:MM); omit for an all-day entry
        #[arg(long, value_parser = parse_time_arg)]
        start: Option<NaiveTime>,
        /// End time (HH:MM)
        #[arg(long, value_parser = parse_time_arg)]
        end: Option<NaiveTime>,
        /// blue, green, red, yellow, purple, pink, gray
        #[arg(short, long, default_value = "blue")]
        color: ScheduleColor,
        #[arg(short, long, default_value = "")]
        location: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Linked customer id
        #[arg(long)]
        customer: Option<Id>,
    },
    /// Delete a schedule
    Delete { id: Id },
}

#[derive(Subcommand)]
pub enum CustomerCommand {
    /// List customers
    List {
        /// Match name, company, email or phone
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one customer with documents
    Show { id: Id },
    /// Create a customer
    Add {
        name: String,
        #[arg(long, default_value = "")]
        company: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Delete a customer
    Delete { id: Id },
    /// Upload business card images
    UploadCard {
        id: Id,
        #[arg(long)]
        front: Option<PathBuf>,
        #[arg(long)]
        back: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum DocumentCommand {
    /// List a customer's documents
    List { customer: Id },
    /// Upload a document
    Upload {
        customer: Id,
        file: PathBuf,
        /// Title (default: file name)
        #[arg(short, long)]
        title: Option<String>,
        /// estimate, proposal, invoice, contract, web_data, photo, other
        #[arg(short, long, default_value = "other")]
        category: DocumentCategory,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Delete a document
    Delete { id: Id },
}

#[derive(Subcommand)]
pub enum ExpenseCommand {
    /// List expenses
    List(ExpenseFilterArgs),
    /// Record an expense
    Add {
        amount: u64,
        description: String,
        /// Date (default: today)
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
        /// personal or business
        #[arg(short = 't', long = "type", default_value = "personal")]
        expense_type: ExpenseType,
        #[arg(long)]
        category: Option<Id>,
        #[arg(long)]
        method: Option<Id>,
        #[arg(long, default_value = "")]
        memo: String,
        /// Receipt image to attach
        #[arg(long)]
        receipt: Option<PathBuf>,
    },
    /// Delete an expense
    Delete { id: Id },
    /// Monthly totals by category and payment method
    Summary {
        #[arg(short, long)]
        month: Option<CalendarMonth>,
    },
    /// Month-by-month totals for a year
    Yearly {
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// Export expenses as CSV
    Export {
        #[command(flatten)]
        filter: ExpenseFilterArgs,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Expense categories
    #[command(subcommand)]
    Categories(SettingCommand),
    /// Payment methods
    #[command(subcommand)]
    Methods(SettingCommand),
}

#[derive(Args)]
pub struct ExpenseFilterArgs {
    /// Month (YYYY-MM); omit for all
    #[arg(short, long)]
    month: Option<CalendarMonth>,
    /// personal or business
    #[arg(short = 't', long = "type")]
    expense_type: Option<ExpenseType>,
    #[arg(long)]
    category: Option<Id>,
    #[arg(long)]
    method: Option<Id>,
}

impl ExpenseFilterArgs {
    fn to_filter(&self) -> ExpenseFilter {
        let mut filter = match self.month {
            Some(month) => ExpenseFilter::month(month.year(), month.month()),
            None => ExpenseFilter::default(),
        };
        filter.expense_type = self.expense_type;
        filter.category = self.category;
        filter.payment_method = self.method;
        filter
    }
}

#[derive(Subcommand)]
pub enum SettingCommand {
    List,
    Add {
        name: String,
        #[arg(long)]
        icon: Option<String>,
        /// Categories only
        #[arg(long)]
        color: Option<String>,
    },
    Delete { id: Id },
}

#[derive(Subcommand)]
pub enum RecurringCommand {
    List,
    Add {
        name: String,
        amount: u64,
        /// Day of month the expense is booked on (1-31)
        #[arg(short, long, default_value = "1")]
        day: u32,
        #[arg(short = 't', long = "type", default_value = "personal")]
        expense_type: ExpenseType,
        /// monthly or yearly
        #[arg(long, default_value = "monthly")]
        frequency: Frequency,
        #[arg(long)]
        category: Option<Id>,
        #[arg(long)]
        method: Option<Id>,
    },
    Delete { id: Id },
    /// Create this month's expenses from active recurring ones
    Generate {
        #[arg(short, long)]
        month: Option<CalendarMonth>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let (mut config, skipped) = Config::resolve(cli.config.as_deref())?;
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    init_logging(&config);
    for e in &skipped {
        tracing::warn!("Skipped config file: {}", e);
    }

    let store = Arc::new(FileTokenStore::new(&config.session.token_path));
    let session = Session::new(store);
    let client = ApiClient::new(config.client_config(), session)?;
    tracing::debug!(base_url = %client.base_url(), "Client ready");

    let out = Output { format: cli.format };
    let today = calendar::today();

    match cli.command {
        Commands::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt("Password")?,
            };
            let user = client.login(&username, &password).await?;
            println!("Logged in as {}", user.display_name());
        }

        Commands::Logout => {
            client.logout().await?;
            println!("Logged out");
        }

        Commands::Register {
            username,
            email,
            first_name,
            last_name,
        } => {
            let password = prompt("Password")?;
            let password_confirm = prompt("Confirm password")?;
            let request = RegisterRequest {
                username,
                email,
                password,
                password_confirm,
                first_name,
                last_name,
            };
            let user = client.register(&request).await?;
            println!("Registered and logged in as {}", user.username);
        }

        Commands::Whoami => {
            let state = client.init_auth().await;
            match state.user {
                Some(user) if state.is_authenticated => out.emit(&user, |u| print_user(u))?,
                _ => bail!("Not logged in"),
            }
        }

        Commands::Profile(args) => {
            require_login(&client).await?;
            let update = UserUpdate {
                email: args.email,
                first_name: args.first_name,
                last_name: args.last_name,
                department: args.department,
                position: args.position,
                phone: args.phone,
            };
            if update.is_empty() {
                bail!("Nothing to update; pass at least one field");
            }
            let user = client.update_user(&update).await?;
            out.emit(&user, |u| print_user(u))?;
        }

        Commands::Password => {
            require_login(&client).await?;
            let current = prompt("Current password")?;
            let new = prompt("New password")?;
            client.change_password(&current, &new).await?;
            println!("Password changed");
        }

        Commands::Dashboard { date } => {
            require_login(&client).await?;
            let mut dashboard = Dashboard::new(Arc::new(client.clone()), date.unwrap_or(today));
            dashboard.load_all().await;
            print_dashboard(&dashboard);
        }

        Commands::Tasks(command) => {
            require_login(&client).await?;
            run_tasks(&client, command, &out).await?;
        }

        Commands::Calendar { month, week, date } => {
            require_login(&client).await?;
            let focus = date.unwrap_or(today);
            let mut view = CalendarView::new(today, config.calendar.stale_results);

            let ticket = if week {
                view.set_mode(ViewMode::Week);
                view.go_to_week(focus)
            } else {
                view.go_to(month.unwrap_or_else(|| CalendarMonth::containing(focus)))
            };

            if let Applied::Failed(message) = view.apply(ticket.run(&client).await) {
                bail!(message);
            }

            match (out.format, view.mode()) {
                (OutputFormat::Json, _) => {
                    let window = CalendarWindow {
                        schedules: view.schedules().to_vec(),
                        tasks: view.tasks().to_vec(),
                    };
                    println!("{}", serde_json::to_string_pretty(&window)?);
                }
                (OutputFormat::Table, ViewMode::Week) => {
                    print!("{}", render_week(&view.week(), view.buckets(), today));
                }
                (OutputFormat::Table, ViewMode::Month) => {
                    let grid = view.grid();
                    print!(
                        "{}",
                        render_month(&grid, view.buckets(), config.calendar.preview_limit)
                    );
                }
            }
        }

        Commands::Day { date } => {
            require_login(&client).await?;
            let agenda = client.daily_agenda(date.unwrap_or(today)).await?;
            out.emit(&agenda, print_agenda)?;
        }

        Commands::Schedules(command) => {
            require_login(&client).await?;
            run_schedules(&client, command, &out).await?;
        }

        Commands::Customers(command) => {
            require_login(&client).await?;
            run_customers(&client, command, &out).await?;
        }

        Commands::Documents(command) => {
            require_login(&client).await?;
            run_documents(&client, command, &out).await?;
        }

        Commands::Expenses(command) => {
            require_login(&client).await?;
            run_expenses(&client, command, &out, today).await?;
        }

        Commands::Recurring(command) => {
            require_login(&client).await?;
            run_recurring(&client, command, &out, today).await?;
        }

        Commands::Config { output } => write_config(output.as_ref())?,
    }

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bizdesk={}", config.logging.level)));
    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn write_config(output: Option<&PathBuf>) -> anyhow::Result<()> {
    let config = generate_default_config();

    match output {
        Some(path) => {
            // Create parent directory if needed
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &config)?;
            println!("Config written to {:?}", path);
        }
        None => {
            print!("{}", config);
        }
    }
    Ok(())
}

/// Fail early when no token is stored
async fn require_login(client: &ApiClient) -> Result<(), ClientError> {
    if client.session().token().await.is_none() {
        return Err(ClientError::NotAuthenticated);
    }
    Ok(())
}

fn prompt(label: &str) -> anyhow::Result<String> {
    eprint!("{}: ", label);
    std::io::stderr().flush()?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    calendar::parse_date(s).map_err(|e| e.to_string())
}

fn parse_time_arg(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").map_err(|_| format!("Invalid time '{}' (expected HH:MM)", s))
}

struct Output {
    format: OutputFormat,
}

impl Output {
    fn emit<T: Serialize + ?Sized>(&self, value: &T, table: impl FnOnce(&T)) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Table => table(value),
        }
        Ok(())
    }
}

// ============================================
// Command groups
// ============================================

async fn run_tasks(client: &ApiClient, command: TaskCommand, out: &Output) -> anyhow::Result<()> {
    let mut board = TaskBoard::new(Arc::new(client.clone()));

    match command {
        TaskCommand::List { status } => {
            board.load().await?;
            let tasks: Vec<Task> = match status {
                Some(status) => board.with_status(status).cloned().collect(),
                None => board.tasks().to_vec(),
            };
            out.emit(tasks.as_slice(), print_tasks)?;
        }
        TaskCommand::Add {
            title,
            description,
            priority,
            due,
        } => {
            let mut draft = TaskDraft::new(title).description(description).priority(priority);
            if let Some(due) = due {
                draft = draft.due(due);
            }
            let task = board.create(&draft).await?;
            out.emit(&task, |t| println!("Created task {}: {}", t.id, t.title))?;
        }
        TaskCommand::Toggle { id } => {
            board.load().await?;
            let task = board.toggle(id).await?;
            out.emit(&task, |t| println!("Task {} is now {}", t.id, t.status))?;
        }
        TaskCommand::Delete { id } => {
            board.delete(id).await?;
            println!("Deleted task {}", id);
        }
        TaskCommand::Overdue => {
            let tasks = client.overdue_tasks().await?;
            out.emit(tasks.as_slice(), print_tasks)?;
        }
        TaskCommand::Stats { year, month } => {
            let year = year.unwrap_or_else(|| calendar::today().year());
            match month {
                Some(month) => {
                    let stats = client.monthly_task_stats(year, month).await?;
                    out.emit(&stats, |s| {
                        println!("{}-{:02}", s.year, s.month);
                        println!("  Total:       {}", s.total);
                        println!("  Done:        {}", s.done);
                        println!("  In progress: {}", s.in_progress);
                        println!("  Todo:        {}", s.todo);
                        println!("  Completion:  {:.1}%", s.completion_rate);
                    })?;
                }
                None => {
                    let stats = client.yearly_task_stats(year).await?;
                    out.emit(&stats, |s| {
                        println!("{:<8} {:>6} {:>6} {:>8}", "Month", "Total", "Done", "Rate");
                        println!("{}", "-".repeat(31));
                        for row in &s.data {
                            println!(
                                "{:<8} {:>6} {:>6} {:>7.1}%",
                                format!("{}-{:02}", s.year, row.month),
                                row.total,
                                row.done,
                                row.completion_rate
                            );
                        }
                    })?;
                }
            }
        }
    }
    Ok(())
}

async fn run_schedules(
    client: &ApiClient,
    command: ScheduleCommand,
    out: &Output,
) -> anyhow::Result<()> {
    match command {
        ScheduleCommand::List { from, to } => {
            let schedules = client.list_schedules(from, to).await?;
            out.emit(schedules.as_slice(), print_schedules)?;
        }
        ScheduleCommand::Add {
            title,
            date,
            start,
            end,
            color,
            location,
            description,
            customer,
        } => {
            let mut draft = ScheduleDraft::new(title, date)
                .color(color)
                .location(location)
                .description(description);
            if let Some(start) = start {
                draft = draft.between(start, end);
            }
            if let Some(customer) = customer {
                draft = draft.customer(customer);
            }
            let schedule = client.create_schedule(&draft).await?;
            out.emit(&schedule, |s| {
                println!("Created schedule {} on {}: {}", s.id, s.date, s.title)
            })?;
        }
        ScheduleCommand::Delete { id } => {
            client.delete_schedule(id).await?;
            println!("Deleted schedule {}", id);
        }
    }
    Ok(())
}

async fn run_customers(
    client: &ApiClient,
    command: CustomerCommand,
    out: &Output,
) -> anyhow::Result<()> {
    match command {
        CustomerCommand::List { search } => {
            let customers = client.list_customers(search.as_deref()).await?;
            out.emit(customers.as_slice(), |customers| {
                if customers.is_empty() {
                    println!("No customers found.");
                    return;
                }
                println!(
                    "{:<6} {:<24} {:<24} {:<28} {:>5}",
                    "ID", "Name", "Company", "Email", "Docs"
                );
                println!("{}", "-".repeat(91));
                for c in customers {
                    println!(
                        "{:<6} {:<24} {:<24} {:<28} {:>5}",
                        c.id, c.name, c.company_name, c.email, c.document_count
                    );
                }
            })?;
        }
        CustomerCommand::Show { id } => {
            let customer = client.get_customer(id).await?;
            out.emit(&customer, print_customer)?;
        }
        CustomerCommand::Add {
            name,
            company,
            email,
            phone,
            notes,
        } => {
            let draft = CustomerDraft {
                company_name: company,
                email,
                phone,
                notes,
                ..CustomerDraft::new(name)
            };
            let customer = client.create_customer(&draft).await?;
            out.emit(&customer, |c| println!("Created customer {}: {}", c.id, c.label()))?;
        }
        CustomerCommand::Delete { id } => {
            client.delete_customer(id).await?;
            println!("Deleted customer {}", id);
        }
        CustomerCommand::UploadCard { id, front, back } => {
            let customer = client
                .upload_business_card(id, &BusinessCardUpload { front, back })
                .await?;
            out.emit(&customer, |c| println!("Business card updated for {}", c.label()))?;
        }
    }
    Ok(())
}

async fn run_documents(
    client: &ApiClient,
    command: DocumentCommand,
    out: &Output,
) -> anyhow::Result<()> {
    match command {
        DocumentCommand::List { customer } => {
            let documents = client.list_documents(customer).await?;
            out.emit(documents.as_slice(), print_documents)?;
        }
        DocumentCommand::Upload {
            customer,
            file,
            title,
            category,
            description,
        } => {
            let title = match title {
                Some(title) => title,
                None => file
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .context("Cannot derive a title from the file path; pass --title")?,
            };
            let upload = DocumentUpload {
                customer,
                category,
                title,
                file,
                description,
            };
            let document = client.upload_document(&upload).await?;
            out.emit(&document, |d| println!("Uploaded document {}: {}", d.id, d.title))?;
        }
        DocumentCommand::Delete { id } => {
            client.delete_document(id).await?;
            println!("Deleted document {}", id);
        }
    }
    Ok(())
}

async fn run_expenses(
    client: &ApiClient,
    command: ExpenseCommand,
    out: &Output,
    today: NaiveDate,
) -> anyhow::Result<()> {
    match command {
        ExpenseCommand::List(filter) => {
            let expenses = client.list_expenses(&filter.to_filter()).await?;
            out.emit(expenses.as_slice(), print_expenses)?;
        }
        ExpenseCommand::Add {
            amount,
            description,
            date,
            expense_type,
            category,
            method,
            memo,
            receipt,
        } => {
            let draft = ExpenseDraft {
                expense_type,
                category,
                payment_method: method,
                memo,
                receipt_image: receipt,
                ..ExpenseDraft::new(date.unwrap_or(today), amount, description)
            };
            let expense = client.create_expense(&draft).await?;
            out.emit(&expense, |e| {
                println!("Recorded expense {}: {} ({})", e.id, e.amount, e.description)
            })?;
        }
        ExpenseCommand::Delete { id } => {
            client.delete_expense(id).await?;
            println!("Deleted expense {}", id);
        }
        ExpenseCommand::Summary { month } => {
            let month = month.unwrap_or_else(|| CalendarMonth::containing(today));
            let summary = client.expense_summary(month.year(), month.month()).await?;
            out.emit(&summary, print_expense_summary)?;
        }
        ExpenseCommand::Yearly { year } => {
            let summary = client
                .expense_yearly_summary(year.unwrap_or_else(|| today.year()))
                .await?;
            out.emit(&summary, |s| {
                println!("{:<8} {:>12} {:>12} {:>12}", "Month", "Total", "Personal", "Business");
                println!("{}", "-".repeat(47));
                for row in &s.monthly_data {
                    println!(
                        "{:<8} {:>12} {:>12} {:>12}",
                        format!("{}-{:02}", s.year, row.month),
                        row.total,
                        row.personal_total,
                        row.business_total
                    );
                }
                println!("{}", "-".repeat(47));
                println!(
                    "{:<8} {:>12} {:>12} {:>12}",
                    s.year, s.year_total, s.year_personal_total, s.year_business_total
                );
            })?;
        }
        ExpenseCommand::Export { filter, output } => {
            let expenses = client.export_expenses(&filter.to_filter()).await?;
            match output {
                Some(path) => {
                    let file = std::fs::File::create(&path)
                        .with_context(|| format!("Cannot create {:?}", path))?;
                    write_expenses_csv(file, &expenses)?;
                    println!("Exported {} expenses to {:?}", expenses.len(), path);
                }
                None => write_expenses_csv(std::io::stdout(), &expenses)?,
            }
        }
        ExpenseCommand::Categories(command) => match command {
            SettingCommand::List => {
                let categories = client.list_expense_categories().await?;
                out.emit(categories.as_slice(), |categories| {
                    println!("{:<6} {:<4} {:<20} {:<10} {:>5}", "ID", "", "Name", "Color", "Order");
                    println!("{}", "-".repeat(49));
                    for c in categories {
                        println!(
                            "{:<6} {:<4} {:<20} {:<10} {:>5}",
                            c.id, c.icon, c.name, c.color, c.sort_order
                        );
                    }
                })?;
            }
            SettingCommand::Add { name, icon, color } => {
                let mut draft = CategoryDraft::new(name);
                if let Some(icon) = icon {
                    draft.icon = icon;
                }
                if let Some(color) = color {
                    draft.color = color;
                }
                let category = client.create_expense_category(&draft).await?;
                out.emit(&category, |c| println!("Created category {}: {}", c.id, c.name))?;
            }
            SettingCommand::Delete { id } => {
                client.delete_expense_category(id).await?;
                println!("Deleted category {}", id);
            }
        },
        ExpenseCommand::Methods(command) => match command {
            SettingCommand::List => {
                let methods = client.list_payment_methods().await?;
                out.emit(methods.as_slice(), |methods| {
                    println!("{:<6} {:<4} {:<20} {:>5}", "ID", "", "Name", "Order");
                    println!("{}", "-".repeat(38));
                    for m in methods {
                        println!("{:<6} {:<4} {:<20} {:>5}", m.id, m.icon, m.name, m.sort_order);
                    }
                })?;
            }
            SettingCommand::Add { name, icon, color } => {
                if color.is_some() {
                    bail!("Payment methods have no color");
                }
                let mut draft = PaymentMethodDraft::new(name);
                if let Some(icon) = icon {
                    draft.icon = icon;
                }
                let method = client.create_payment_method(&draft).await?;
                out.emit(&method, |m| println!("Created payment method {}: {}", m.id, m.name))?;
            }
            SettingCommand::Delete { id } => {
                client.delete_payment_method(id).await?;
                println!("Deleted payment method {}", id);
            }
        },
    }
    Ok(())
}

async fn run_recurring(
    client: &ApiClient,
    command: RecurringCommand,
    out: &Output,
    today: NaiveDate,
) -> anyhow::Result<()> {
    match command {
        RecurringCommand::List => {
            let recurring = client.list_recurring_expenses().await?;
            out.emit(recurring.as_slice(), |items| {
                println!(
                    "{:<6} {:<24} {:>10} {:<9} {:<8} {:>4} {:<6}",
                    "ID", "Name", "Amount", "Type", "Every", "Day", "Active"
                );
                println!("{}", "-".repeat(75));
                for r in items {
                    println!(
                        "{:<6} {:<24} {:>10} {:<9} {:<8} {:>4} {:<6}",
                        r.id,
                        r.name,
                        r.amount,
                        r.expense_type,
                        r.frequency,
                        r.day_of_month,
                        if r.is_active { "yes" } else { "no" }
                    );
                }
            })?;
        }
        RecurringCommand::Add {
            name,
            amount,
            day,
            expense_type,
            frequency,
            category,
            method,
        } => {
            let draft = RecurringDraft {
                expense_type,
                frequency,
                category,
                payment_method: method,
                ..RecurringDraft::new(name, amount, day)
            };
            let recurring = client.create_recurring_expense(&draft).await?;
            out.emit(&recurring, |r| println!("Created recurring expense {}: {}", r.id, r.name))?;
        }
        RecurringCommand::Delete { id } => {
            client.delete_recurring_expense(id).await?;
            println!("Deleted recurring expense {}", id);
        }
        RecurringCommand::Generate { month } => {
            let month = month.unwrap_or_else(|| CalendarMonth::containing(today));
            let result = client
                .generate_recurring_expenses(month.year(), month.month())
                .await?;
            out.emit(result.created.as_slice(), |created| {
                println!("Generated {} expenses for {}", created.len(), month);
                for e in created {
                    println!("  {} {:>10} {}", e.date, e.amount, e.description);
                }
            })?;
        }
    }
    Ok(())
}

// ============================================
// Table output
// ============================================

fn print_user(user: &User) {
    println!("{} ({})", user.display_name(), user.username);
    if !user.email.is_empty() {
        println!("  Email:      {}", user.email);
    }
    if !user.department.is_empty() {
        println!("  Department: {}", user.department);
    }
    if !user.position.is_empty() {
        println!("  Position:   {}", user.position);
    }
    if !user.phone.is_empty() {
        println!("  Phone:      {}", user.phone);
    }
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }

    println!(
        "{:<6} {:<12} {:<8} {:<12} {}",
        "ID", "Status", "Priority", "Due", "Title"
    );
    println!("{}", "-".repeat(70));

    let today = calendar::today();
    for task in tasks {
        let due = task
            .due_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        let overdue = if task.is_overdue(today) { " (overdue)" } else { "" };
        println!(
            "{:<6} {:<12} {:<8} {:<12} {}{}",
            task.id, task.status, task.priority, due, task.title, overdue
        );
    }
}

fn print_schedules(schedules: &[Schedule]) {
    if schedules.is_empty() {
        println!("No schedules.");
        return;
    }

    println!("{:<6} {:<12} {:<12} {:<8} {}", "ID", "Date", "Time", "Color", "Title");
    println!("{}", "-".repeat(70));
    for s in schedules {
        let time = match s.time_label() {
            label if label.is_empty() => "all day".to_string(),
            label => label,
        };
        println!("{:<6} {:<12} {:<12} {:<8} {}", s.id, s.date, time, s.color, s.title);
    }
}

fn print_agenda(agenda: &DailyAgenda) {
    println!("{}", agenda.date.format("%A, %Y-%m-%d"));
    println!();
    println!("Schedules:");
    if agenda.schedules.is_empty() {
        println!("  -");
    }
    for s in &agenda.schedules {
        let time = match s.time_label() {
            label if label.is_empty() => "all day".to_string(),
            label => label,
        };
        let place = if s.location.is_empty() {
            String::new()
        } else {
            format!(" @ {}", s.location)
        };
        println!("  {:<12} {}{}", time, s.title, place);
    }
    println!();
    println!("Tasks due:");
    if agenda.tasks.is_empty() {
        println!("  -");
    }
    for t in &agenda.tasks {
        let mark = if t.is_done() { "[x]" } else { "[ ]" };
        println!("  {} {} ({})", mark, t.title, t.priority);
    }
}

fn print_dashboard(dashboard: &Dashboard) {
    use bizdesk::state::DashboardPart;

    if let Some(stats) = dashboard.monthly() {
        println!(
            "This month: {}/{} tasks done ({:.1}%), {} in progress, {} todo",
            stats.done, stats.total, stats.completion_rate, stats.in_progress, stats.todo
        );
    }
    if let Some(stats) = dashboard.yearly() {
        let total: u32 = stats.data.iter().map(|m| m.total).sum();
        let done: u32 = stats.data.iter().map(|m| m.done).sum();
        println!("This year:  {}/{} tasks done", done, total);
    }
    println!();

    if let Some(agenda) = dashboard.daily() {
        print_agenda(agenda);
        println!();
    }

    println!("Overdue:");
    if dashboard.overdue().is_empty() {
        println!("  -");
    }
    for task in dashboard.overdue() {
        let due = task.due_date.map(|d| d.to_string()).unwrap_or_default();
        println!("  {} {} (due {})", task.id, task.title, due);
    }

    for part in DashboardPart::ALL {
        if let Some(error) = dashboard.error(part) {
            eprintln!("Warning: {:?}: {}", part, error);
        }
    }
}

fn print_customer(customer: &Customer) {
    println!("{}", customer.label());
    let fields = [
        ("Kana", &customer.name_kana),
        ("Department", &customer.department),
        ("Position", &customer.position),
        ("Email", &customer.email),
        ("Phone", &customer.phone),
        ("Mobile", &customer.mobile),
        ("Fax", &customer.fax),
        ("Postal code", &customer.postal_code),
        ("Address", &customer.address),
        ("Website", &customer.website),
        ("Notes", &customer.notes),
    ];
    for (label, value) in fields {
        if !value.is_empty() {
            println!("  {:<12} {}", format!("{}:", label), value);
        }
    }
    if let Some(url) = &customer.business_card_front_url {
        println!("  {:<12} {}", "Card front:", url);
    }
    if let Some(url) = &customer.business_card_back_url {
        println!("  {:<12} {}", "Card back:", url);
    }
    println!();
    print_documents(&customer.documents);
}

fn print_documents(documents: &[Document]) {
    if documents.is_empty() {
        println!("No documents.");
        return;
    }

    println!("{:<6} {:<10} {:<28} {:>10} {}", "ID", "Category", "Title", "Size", "File");
    println!("{}", "-".repeat(80));
    for d in documents {
        println!(
            "{:<6} {:<10} {:<28} {:>10} {}",
            d.id,
            d.category,
            d.title,
            format_size(d.file_size),
            d.filename
        );
    }
}

fn print_expenses(expenses: &[Expense]) {
    if expenses.is_empty() {
        println!("No expenses.");
        return;
    }

    println!(
        "{:<6} {:<12} {:>10} {:<9} {:<16} {:<16} {}",
        "ID", "Date", "Amount", "Type", "Category", "Method", "Description"
    );
    println!("{}", "-".repeat(90));

    let mut total = 0;
    for e in expenses {
        total += e.amount;
        println!(
            "{:<6} {:<12} {:>10} {:<9} {:<16} {:<16} {}",
            e.id,
            e.date,
            e.amount,
            e.expense_type,
            e.category_name.as_deref().unwrap_or("-"),
            e.payment_method_name.as_deref().unwrap_or("-"),
            e.description
        );
    }
    println!("{}", "-".repeat(90));
    println!("{:<19} {:>10}", "Total", total);
}

fn print_expense_summary(summary: &ExpenseSummary) {
    println!("{}-{:02}", summary.year, summary.month);
    println!("  Total:    {:>10}", summary.total);
    println!("  Personal: {:>10}", summary.personal_total);
    println!("  Business: {:>10}", summary.business_total);

    println!();
    println!("By category:");
    for c in &summary.by_category {
        println!("  {} {:<20} {:>10}", c.icon, c.name, c.total);
    }

    println!();
    println!("By payment method:");
    for m in &summary.by_payment_method {
        println!("  {} {:<20} {:>10}", m.icon, m.name, m.total);
    }
}

fn write_expenses_csv<W: std::io::Write>(writer: W, expenses: &[Expense]) -> anyhow::Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record([
        "date",
        "amount",
        "expense_type",
        "category",
        "payment_method",
        "description",
        "memo",
    ])?;
    for e in expenses {
        out.write_record([
            format_date(e.date),
            e.amount.to_string(),
            e.expense_type.to_string(),
            e.category_name.clone().unwrap_or_default(),
            e.payment_method_name.clone().unwrap_or_default(),
            e.description.clone(),
            e.memo.clone(),
        ])?;
    }
    out.flush()?;
    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(json: serde_json::Value) -> Expense {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_expenses_csv_columns_and_blank_optionals() {
        let expenses = vec![
            expense(serde_json::json!({
                "id": 1,
                "date": "2024-03-05",
                "amount": 1200,
                "expense_type": "business",
                "category_name": "Travel",
                "payment_method_name": "Card",
                "description": "Taxi, airport",
                "memo": "client visit"
            })),
            expense(serde_json::json!({
                "id": 2,
                "date": "2024-03-09",
                "amount": 450,
                "expense_type": "personal",
                "description": "Coffee"
            })),
        ];

        let mut buf = Vec::new();
        write_expenses_csv(&mut buf, &expenses).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "date,amount,expense_type,category,payment_method,description,memo",
                "2024-03-05,1200,business,Travel,Card,\"Taxi, airport\",client visit",
                "2024-03-09,450,personal,,,Coffee,",
            ]
        );
    }

    #[test]
    fn test_expenses_csv_header_only_when_empty() {
        let mut buf = Vec::new();
        write_expenses_csv(&mut buf, &[]).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "date,amount,expense_type,category,payment_method,description,memo\n"
        );
    }
}
