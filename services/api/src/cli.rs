use crate::commands::{
    run_applications, run_audit_log, run_criteria, run_shortlist, run_submit, ApplicationsArgs,
    CriteriaArgs, SubmitArgs,
};
use crate::server;
use admission_ai::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Admission AI",
    about = "Run the admission pipeline service or operate on the admission dataset from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Submit one application and run it through every pipeline stage
    Submit(SubmitArgs),
    /// Import eligibility thresholds from a criteria document
    Criteria(CriteriaArgs),
    /// List stored applications, optionally exporting a CSV summary
    Applications(ApplicationsArgs),
    /// Shortlist validated applicants by exam rank against university capacity
    Shortlist,
    /// Print the director audit log
    AuditLog,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Submit(args) => run_submit(args),
        Command::Criteria(args) => run_criteria(args),
        Command::Applications(args) => run_applications(args),
        Command::Shortlist => run_shortlist(),
        Command::AuditLog => run_audit_log(),
    }
}
