use anyhow::Context;
use aws_config::{BehaviorVersion, Region};
use clap::{Args, Parser, Subcommand};
use push_report::{
    AthenaEngine, MetricKind, QueryResult, ReportError, ReportOutcome, ReportSettings,
    StsIdentityProvider, login, write_default_config,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "push-report",
    version,
    about = "Query push metrics from Athena and write the CSV export plus the dashboard workbook"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Messages sent as push (dashboard cell D6)
    MessagesSent(RunArgs),
    /// Sessions opened by a push (dashboard cell D4)
    SessionsOpened(RunArgs),
    /// Write the documented default date config file
    InitConfig {
        #[arg(long, env = "PUSH_REPORT_CONFIG_FILE", default_value = "config_fechas.txt")]
        config_file: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Run aws-azure-login for the given profile
    Login {
        #[arg(long, env = "PUSH_REPORT_PROFILE", default_value = "default")]
        profile: String,
        /// Configure the profile instead of logging in
        #[arg(long)]
        configure: bool,
    },
}

#[derive(Args)]
struct RunArgs {
    #[arg(long, env = "PUSH_REPORT_CONFIG_FILE")]
    config_file: Option<PathBuf>,
    #[arg(long, env = "PUSH_REPORT_OUTPUT_FOLDER")]
    output_folder: Option<PathBuf>,
    #[arg(long, env = "PUSH_REPORT_REGION")]
    region: Option<String>,
    #[arg(long, env = "PUSH_REPORT_WORKGROUP")]
    workgroup: Option<String>,
    #[arg(long, env = "PUSH_REPORT_DATABASE")]
    database: Option<String>,
    #[arg(long, env = "PUSH_REPORT_CATALOG")]
    catalog: Option<String>,
    /// S3 URI for query results when the workgroup does not set one
    #[arg(long, env = "PUSH_REPORT_OUTPUT_LOCATION")]
    output_location: Option<String>,
    #[arg(long, env = "PUSH_REPORT_REQUIRED_ROLE")]
    required_role: Option<String>,
    #[arg(long, env = "PUSH_REPORT_PROFILE")]
    profile: Option<String>,
    /// Warn instead of failing when the caller is not using the required role
    #[arg(long)]
    allow_any_role: bool,
    /// Query status poll interval in milliseconds
    #[arg(long, env = "PUSH_REPORT_POLL_MS")]
    poll_ms: Option<u64>,
    /// Print a JSON summary instead of the text report
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    fn settings(&self) -> ReportSettings {
        let defaults = ReportSettings::default();
        ReportSettings {
            region: self.region.clone().unwrap_or(defaults.region),
            workgroup: self.workgroup.clone().unwrap_or(defaults.workgroup),
            database: self.database.clone().unwrap_or(defaults.database),
            catalog: self.catalog.clone().unwrap_or(defaults.catalog),
            output_location: self.output_location.clone().or(defaults.output_location),
            output_folder: self.output_folder.clone().unwrap_or(defaults.output_folder),
            config_file: self.config_file.clone().unwrap_or(defaults.config_file),
            required_role: self.required_role.clone().unwrap_or(defaults.required_role),
            profile: self.profile.clone().unwrap_or(defaults.profile),
            enforce_role: !self.allow_any_role,
            poll_interval: self
                .poll_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn banner(metric: MetricKind, settings: &ReportSettings) {
    println!("{}", "=".repeat(60));
    println!("{} - ATHENA QUERY", metric.title().to_uppercase());
    println!("{}", "=".repeat(60));
    println!("Date config      : {}", settings.config_file.display());
    println!("Required role    : {}", settings.required_role);
    println!("Region           : {}", settings.region);
    println!("Workgroup        : {}", settings.workgroup);
    println!("Database         : {}", settings.database);
    println!("Tables           : {}", metric.source_tables().join(", "));
    println!(
        "Output           : CSV + new Dashboard workbook (cell {})",
        metric.dashboard_cell()
    );
    println!("{}", "=".repeat(60));
}

fn render_result_as_text_table(result: &QueryResult) -> String {
    let names = result.column_names();
    let rows = result.text_rows();

    let mut widths: Vec<usize> = names.iter().map(|n| n.chars().count()).collect();
    for row in &rows {
        for (ci, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            if len > widths[ci] {
                widths[ci] = len;
            }
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_line = |cells: &[String]| {
        let mut line = String::from("|");
        for (ci, cell) in cells.iter().enumerate() {
            let pad = widths[ci].saturating_sub(cell.chars().count());
            line.push(' ');
            line.push_str(cell);
            line.push_str(&" ".repeat(pad));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_line(&names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        out.push_str(&render_line(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out
}

fn print_outcome(outcome: &ReportOutcome) {
    let value = outcome.extraction.value;
    println!();
    println!("{}", "=".repeat(60));
    println!("RESULT - {}", outcome.period.label().to_uppercase());
    println!("{}", "=".repeat(60));
    println!("Period start     : {}", outcome.period.start_iso());
    println!("Period end       : {}", outcome.period.end_iso());
    println!("{}", render_result_as_text_table(&outcome.result));
    if !outcome.extraction.matched {
        println!(
            "WhatsAppTemplate not found; categories present: {}",
            outcome.extraction.categories.join(", ")
        );
    }
    println!("{}: {}", outcome.metric.title(), value);
    println!("{}", "=".repeat(60));
    println!();
    println!("Files written:");
    println!(
        "  [CSV]   {} ({} bytes)",
        outcome.files.csv.path.display(),
        outcome.files.csv.bytes
    );
    println!(
        "  [EXCEL] {} ({} bytes)",
        outcome.files.xlsx.path.display(),
        outcome.files.xlsx.bytes
    );
    println!(
        "          sheet {} cell {} = {}",
        push_report::output::SHEET_NAME,
        outcome.metric.dashboard_cell(),
        value
    );
    if outcome.config_synthesized {
        println!();
        println!("The date config file was missing and has been created with defaults.");
    }
    println!();
    println!("To report another period edit the date config file and run again.");
}

fn print_failure(err: &ReportError) {
    eprintln!();
    eprintln!("[ERROR] {}", err.kind());
    eprintln!("    {err}");
    eprintln!();
    eprintln!("What to do:");
    for step in err.remediation() {
        eprintln!("    {step}");
    }
}

async fn run_report(metric: MetricKind, args: RunArgs) -> anyhow::Result<ExitCode> {
    let settings = args.settings();
    if !args.json {
        banner(metric, &settings);
    }

    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(settings.region.clone()))
        .profile_name(&settings.profile)
        .load()
        .await;
    let engine = AthenaEngine::new(&sdk_config, settings.poll_interval);
    let identity = StsIdentityProvider::new(&sdk_config);

    match push_report::run(metric, &settings, &engine, &identity).await {
        Ok(outcome) => {
            if args.json {
                println!("{}", outcome.to_json()?);
            } else {
                print_outcome(&outcome);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            print_failure(&err);
            Ok(ExitCode::FAILURE)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::MessagesSent(args) => run_report(MetricKind::MessagesSent, args).await,
        Command::SessionsOpened(args) => run_report(MetricKind::SessionsOpenedByPush, args).await,
        Command::InitConfig { config_file, force } => init_config(config_file, force),
        Command::Login { profile, configure } => run_login(&profile, configure),
    };

    match outcome {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_config(path: PathBuf, force: bool) -> anyhow::Result<ExitCode> {
    if path.exists() && !force {
        println!(
            "{} already exists; pass --force to overwrite it.",
            path.display()
        );
        return Ok(ExitCode::FAILURE);
    }
    write_default_config(&path).with_context(|| format!("writing {}", path.display()))?;
    println!("Date config written to {}.", path.display());
    Ok(ExitCode::SUCCESS)
}

fn run_login(profile: &str, configure: bool) -> anyhow::Result<ExitCode> {
    match login::run_login(profile, configure) {
        Ok(status) if status.success() => Ok(ExitCode::SUCCESS),
        Ok(status) => {
            eprintln!("{} exited with {status}", login::LOGIN_TOOL);
            Ok(ExitCode::FAILURE)
        }
        Err(err) => {
            print_failure(&err);
            Ok(ExitCode::FAILURE)
        }
    }
}
