//! Command-line surface.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use sentrihawk_core::dashboard::{GuardFilter, TenantFilter};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(
  name = "sentrihawk",
  version,
  about = "Front-desk visitor and package ledger"
)]
pub struct Cli {
  /// Path to a TOML config file (default: ./sentrihawk.toml if present).
  #[arg(short, long, value_name = "FILE", global = true)]
  pub config: Option<PathBuf>,

  /// Print results as JSON instead of tables.
  #[arg(long, global = true)]
  pub json: bool,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Load the built-in starter visitors. Existing ids are skipped.
  Seed,

  /// Import visitors from a console JSON export.
  Import { file: PathBuf },

  /// List every visitor in creation order.
  List,

  /// Show one visitor's profile and visit log.
  Show { id: Uuid },

  /// Check a visitor in at the front desk.
  Register(RegisterArgs),

  /// Admit an expected visitor.
  Arrive { id: Uuid },

  /// Sign a visitor out.
  SignOut { id: Uuid },

  /// Pre-register an anonymous VIP.
  GhostPass(GhostPassArgs),

  /// Guard or tenant dashboard.
  #[command(subcommand)]
  Dashboard(DashboardCommand),

  /// Visitors who came in on a given day.
  History {
    /// Defaults to today.
    #[arg(long)]
    date:   Option<NaiveDate>,
    /// Matches name, phone or company.
    #[arg(long, default_value = "")]
    search: String,
  },

  /// Log, collect and list packages.
  #[command(subcommand)]
  Package(PackageCommand),
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
  #[arg(long)]
  pub name:        String,
  /// The tenant being visited.
  #[arg(long)]
  pub destination: String,
  #[arg(long)]
  pub document_id: Option<String>,
  #[arg(long)]
  pub phone:       Option<String>,
  #[arg(long)]
  pub company:     Option<String>,
  /// Vehicle registration number.
  #[arg(long)]
  pub vrn:         Option<String>,
}

#[derive(Args, Debug)]
pub struct GhostPassArgs {
  /// The guest's real name; guards only ever see "VIP GUEST".
  #[arg(long)]
  pub name:        String,
  #[arg(long)]
  pub company:     Option<String>,
  /// Defaults to the session's tenant.
  #[arg(long)]
  pub destination: Option<String>,
}

/// Dashboard views.
#[derive(Subcommand, Debug)]
pub enum DashboardCommand {
  /// Building-wide view for the front desk.
  Guard {
    #[arg(long, default_value_t = GuardFilter::All)]
    filter: GuardFilter,
  },
  /// One tenant's visitors.
  Tenant {
    #[arg(long, default_value_t = TenantFilter::All)]
    filter: TenantFilter,
    /// Overrides the configured tenant id.
    #[arg(long)]
    tenant: Option<String>,
  },
}

/// Front-desk package ledger.
#[derive(Subcommand, Debug)]
pub enum PackageCommand {
  /// Record a delivery.
  Log {
    #[arg(long)]
    courier:     String,
    #[arg(long)]
    details:     String,
    #[arg(long)]
    destination: String,
  },
  /// Hand a package over.
  Collect {
    id:     Uuid,
    /// The employee signing for it.
    #[arg(long)]
    by:     String,
    #[arg(long)]
    tenant: String,
  },
  /// Packages still at the desk.
  Awaiting,
  /// Packages already handed over.
  Collected,
}
