//! Audit log CLI commands
//!
//! Implements the read-only inspection commands over the audit log.

use clap::Subcommand;

use crate::audit::AuditLog;
use crate::display::record::{format_record_details, format_record_list};
use crate::error::{AuditError, AuditResult};
use crate::services::PageArgs;
use crate::session::CallerContext;
use crate::storage::SortSpec;

/// Audit log subcommands
#[derive(Subcommand)]
pub enum LogCommands {
    /// List audit records
    List {
        /// Maximum number of records (0 = configured default)
        #[arg(short, long, default_value = "0")]
        limit: usize,
        /// Only records whose collection or document ID contains this text
        #[arg(short, long)]
        search: Option<String>,
        /// Sort keys, e.g. "createdAt:desc,docId"
        #[arg(long, default_value = "createdAt:desc")]
        sort: String,
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Count audit records
    Count {
        /// Only records whose collection or document ID contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one audit record with its changes
    Show {
        /// Record ID (full UUID or log-xxxxxxxx)
        record: String,
    },
}

/// Handle an audit log command
pub fn handle_log_command(
    log: &AuditLog,
    caller: &dyn CallerContext,
    cmd: LogCommands,
) -> AuditResult<()> {
    let service = log.query();

    match cmd {
        LogCommands::List {
            limit,
            search,
            sort,
            json,
        } => {
            let sort: SortSpec = sort.parse()?;
            let mut args = PageArgs::new(sort, limit);
            if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
                args = args.with_search(search);
            }

            let records = service.list_page(caller, &args)?.into_records();

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                println!("{}", format_record_list(&records).trim_end());
            }
        }
        LogCommands::Count { search } => {
            let count = service.count(caller, search.as_deref())?;
            println!("{}", count);
        }
        LogCommands::Show { record } => {
            let found = service
                .find_record(caller, &record)?
                .ok_or_else(|| AuditError::record_not_found(record.clone()))?;
            print!("{}", format_record_details(&found));
        }
    }

    Ok(())
}
