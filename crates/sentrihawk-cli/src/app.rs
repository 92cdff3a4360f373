//! Command dispatch against the visitor and package stores.

use std::process::ExitCode;

use anyhow::{Context as _, bail};
use chrono::Local;
use sentrihawk_core::{
  Error as CoreError,
  dashboard, history,
  legacy::{default_visitors, parse_export},
  lifecycle::{GhostPass, Registration},
  package::{CollectPackage, NewPackage},
  session::{Role, Session},
  store::{PackageStore, VisitorStore},
  visitor::{Audience, Visitor},
};
use sentrihawk_store_sqlite::{Error as StoreError, SqliteStore};
use serde::Serialize;

use crate::{
  cli::{Command, DashboardCommand, PackageCommand},
  config::AppConfig,
  render,
};

/// Exit status for refused entry.
const ACCESS_DENIED_EXIT: u8 = 2;

pub struct App {
  pub store:  SqliteStore,
  pub config: AppConfig,
  pub json:   bool,
}

fn audience(role: Role) -> Audience {
  match role {
    Role::Tenant => Audience::Tenant,
    Role::Guard | Role::HeadOfSecurity => Audience::Guard,
  }
}

impl App {
  fn audience(&self) -> Audience { audience(self.config.role) }

  /// `value` as pretty JSON in `--json` mode, the rendered text otherwise.
  fn output<T: Serialize>(
    &self,
    value: &T,
    text: impl FnOnce() -> String,
  ) -> anyhow::Result<String> {
    if self.json {
      Ok(format!("{}\n", serde_json::to_string_pretty(value)?))
    } else {
      Ok(text())
    }
  }

  /// A single visitor, redacted for the session's audience.
  fn visitor_output(&self, visitor: &Visitor) -> anyhow::Result<String> {
    let audience = self.audience();
    let visible = visitor.redacted(audience);
    self.output(&visible, || render::profile(visitor, audience))
  }

  pub async fn run(&self, command: Command) -> anyhow::Result<ExitCode> {
    match self.dispatch(command).await {
      Ok(out) => {
        print!("{out}");
        Ok(ExitCode::SUCCESS)
      }
      Err(e) => match e.downcast_ref::<StoreError>() {
        Some(StoreError::Core(CoreError::AccessDenied { reason })) => {
          println!("{}", render::silent_alarm(reason));
          Ok(ExitCode::from(ACCESS_DENIED_EXIT))
        }
        _ => Err(e),
      },
    }
  }

  /// Execute `command` and return what should be printed.
  pub(crate) async fn dispatch(&self, command: Command) -> anyhow::Result<String> {
    match command {
      Command::Seed => {
        let visitors = default_visitors(Local::now())?;
        let (added, skipped) = self.import_all(visitors).await?;
        Ok(format!("seeded {added} visitors ({skipped} already present)\n"))
      }

      Command::Import { file } => {
        let json = std::fs::read_to_string(&file)
          .with_context(|| format!("reading {}", file.display()))?;
        let visitors = parse_export(&json, Local::now())
          .with_context(|| format!("parsing {}", file.display()))?;
        let (added, skipped) = self.import_all(visitors).await?;
        Ok(format!("imported {added} visitors ({skipped} duplicates skipped)\n"))
      }

      Command::List => {
        let audience = self.audience();
        let visitors: Vec<Visitor> = self
          .store
          .list()
          .await?
          .iter()
          .map(|v| v.redacted(audience))
          .collect();
        self.output(&visitors, || render::visitor_list(&visitors, audience))
      }

      Command::Show { id } => {
        let visitor = self.store.find(id).await?;
        self.visitor_output(&visitor)
      }

      Command::Register(args) => {
        let visitor = self
          .store
          .register(Registration {
            name:        args.name,
            document_id: args.document_id,
            phone:       args.phone,
            company:     args.company,
            vrn:         args.vrn,
            destination: args.destination,
          })
          .await?;
        self.visitor_output(&visitor)
      }

      Command::Arrive { id } => {
        let visitor = self.store.mark_arrived(id).await?;
        self.visitor_output(&visitor)
      }

      Command::SignOut { id } => {
        let visitor = self.store.sign_out(id).await?;
        self.visitor_output(&visitor)
      }

      Command::GhostPass(args) => {
        let session = self.config.session(None);
        let visitor = self
          .store
          .issue_ghost_pass(GhostPass {
            real_name:   args.name,
            company:     args.company,
            destination: args.destination.or(session.tenant_id),
          })
          .await?;
        self.visitor_output(&visitor)
      }

      Command::Dashboard(DashboardCommand::Guard { filter }) => {
        if self.config.role == Role::Tenant {
          bail!("the guard dashboard is not available to tenant sessions");
        }
        let visitors = self.store.list().await?;
        let dash = dashboard::guard_dashboard(&visitors, filter);
        self.output(&dash, || render::guard_dashboard(&dash))
      }

      Command::Dashboard(DashboardCommand::Tenant { filter, tenant }) => {
        let session: Session = self.config.session(tenant.as_deref());
        let visitors = self.store.list().await?;
        let dash = dashboard::tenant_dashboard(&visitors, &session, filter)
          .context("tenant dashboard needs a tenant id (--tenant or tenant_id)")?;
        self.output(&dash, || render::tenant_dashboard(&dash))
      }

      Command::History { date, search } => {
        let date = date.unwrap_or_else(|| Local::now().date_naive());
        let visitors = self.store.list().await?;
        let entries = history::visitors_on(&visitors, date, &search);
        self.output(&entries, || render::history(&entries))
      }

      Command::Package(cmd) => self.package(cmd).await,
    }
  }

  async fn package(&self, command: PackageCommand) -> anyhow::Result<String> {
    match command {
      PackageCommand::Log { courier, details, destination } => {
        let package = self
          .store
          .log_package(NewPackage { courier, details, destination })
          .await?;
        let one = [package];
        self.output(&one[0], || render::packages(&one))
      }
      PackageCommand::Collect { id, by, tenant } => {
        let package = self
          .store
          .mark_collected(id, CollectPackage { collected_by: by, tenant })
          .await?;
        let one = [package];
        self.output(&one[0], || render::packages(&one))
      }
      PackageCommand::Awaiting => {
        let packages = self.store.list_awaiting().await?;
        self.output(&packages, || render::packages(&packages))
      }
      PackageCommand::Collected => {
        let packages = self.store.list_collected().await?;
        self.output(&packages, || render::packages(&packages))
      }
    }
  }

  /// Import visitors one by one, skipping ids that already exist.
  async fn import_all(
    &self,
    visitors: Vec<Visitor>,
  ) -> anyhow::Result<(usize, usize)> {
    let (mut added, mut skipped) = (0, 0);
    for visitor in visitors {
      match self.store.import_visitor(visitor).await {
        Ok(_) => added += 1,
        Err(StoreError::Core(CoreError::DuplicateVisitor(id))) => {
          tracing::warn!(visitor_id = %id, "skipping visitor already in the ledger");
          skipped += 1;
        }
        Err(e) => return Err(e.into()),
      }
    }
    Ok((added, skipped))
  }
}
