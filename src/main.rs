//! Salon Desk - front-desk scheduling, attendance and payroll.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use salon_desk as app;
use serde::Serialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

use app::attendance::AttendanceService;
use app::clock::{Clock, SystemClock};
use app::config::{AppConfig, ConfigLoadResult, LoggingConfig};
use app::db;
use app::export;
use app::models::{
    AppointmentSource, CreateService, CreateStaff, GenderRestriction, StaffRole, UpdateService, YearMonth,
};
use app::payroll::PayrollService;
use app::schedule::{BookingRequest, BookingService};
use app::store::{DEMO_SERVICE_ID, DEMO_STYLIST_ID, MemoryStore, SalonStore};

/// Salon front-desk scheduling, attendance and payroll.
#[derive(Parser)]
#[command(name = "salon-desk", version)]
struct Cli {
    /// Use config.toml from current directory (dev mode)
    #[arg(long, global = true)]
    dev: bool,

    /// Run against a throwaway in-memory store seeded with a demo stylist and service
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Create the database schema
    InitDb,
    /// Add a catalogue service
    AddService {
        name: String,
        #[arg(long, default_value = "General")]
        category: String,
        #[arg(long)]
        price_cents: i64,
        #[arg(long)]
        duration: u32,
    },
    /// List catalogue services
    ListServices {
        /// Include soft-deleted services
        #[arg(long)]
        all: bool,
    },
    /// Change a service's price, duration or availability
    UpdateService {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price_cents: Option<i64>,
        #[arg(long)]
        duration: Option<u32>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Soft-delete a service so it can no longer be booked
    DeleteService { id: Uuid },
    /// Restore a soft-deleted service
    RestoreService { id: Uuid },
    /// Add a staff member
    AddStaff {
        name: String,
        #[arg(long, default_value = "stylist")]
        role: StaffRole,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Stop a staff member from taking bookings or punching in
    DeactivateStaff { id: Uuid },
    /// Let a deactivated staff member work again
    ActivateStaff { id: Uuid },
    /// Show a stylist's slots for a service on a date
    Slots {
        #[arg(long)]
        stylist: Option<Uuid>,
        #[arg(long)]
        service: Option<Uuid>,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Book an appointment
    Book {
        #[arg(long)]
        stylist: Option<Uuid>,
        #[arg(long)]
        service: Option<Uuid>,
        #[arg(long)]
        date: NaiveDate,
        /// Start time, HH:MM
        #[arg(long, value_parser = parse_hhmm)]
        time: NaiveTime,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Record as a customer self-booking (starts pending)
        #[arg(long)]
        frontend: bool,
    },
    /// Cancel an appointment
    Cancel { id: Uuid },
    /// Confirm a pending appointment
    Confirm { id: Uuid },
    /// Mark a confirmed appointment completed
    Complete { id: Uuid },
    /// Punch in for today
    PunchIn { staff: Uuid },
    /// Punch out for today
    PunchOut { staff: Uuid },
    /// Show today's punch record
    PunchStatus { staff: Uuid },
    /// Soft-delete a day's punch record
    DeletePunch {
        staff: Uuid,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Monthly hours and commission (all active staff when --staff is omitted)
    Summary {
        /// Month, YYYY-MM
        month: YearMonth,
        #[arg(long)]
        staff: Option<Uuid>,
    },
    /// Export a month's payroll to Excel
    Export {
        /// Month, YYYY-MM
        month: YearMonth,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn parse_hhmm(value: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(value, "%H:%M")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Determine config path based on mode
    let config_path = if cli.dev {
        PathBuf::from("config.toml")
    } else {
        AppConfig::default_path()
    };

    if let Command::InitConfig { force } = cli.command {
        init_tracing(&LoggingConfig::default());
        if config_path.exists() && !force {
            bail!("{} already exists (use --force to overwrite)", config_path.display());
        }
        AppConfig::default().save(&config_path)?;
        tracing::info!(path = %config_path.display(), "Default config written");
        return Ok(());
    }

    let config = match AppConfig::try_load(&config_path) {
        ConfigLoadResult::Loaded(config) => config,
        ConfigLoadResult::Missing if cli.memory => AppConfig::default(),
        ConfigLoadResult::Missing => {
            bail!("No config at {} (run `salon-desk init-config`)", config_path.display())
        }
        ConfigLoadResult::Invalid(e) => bail!("Config invalid at {}: {e}", config_path.display()),
    };

    let _guard = init_tracing(&config.logging);
    tracing::info!(path = %config_path.display(), memory = cli.memory, "Salon Desk starting");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store: Arc<dyn SalonStore> = if cli.memory {
        Arc::new(MemoryStore::with_demo_catalogue(clock.now()))
    } else {
        let conn = db::connect(&config.database.connection_string())
            .await
            .context("Failed to connect to database")?;
        db::test_connection(&conn).await.context("Database did not answer")?;
        if let Ok(version) = db::get_version(&conn).await {
            tracing::info!("PostgreSQL: {}", version);
        }
        if let Command::InitDb = cli.command {
            db::apply_schema(&conn).await.context("Failed to apply schema")?;
            let counts = db::get_table_counts(&conn).await?;
            tracing::info!(
                staff = counts.staff,
                appointments = counts.appointments,
                attendance = counts.attendance_records,
                visits = counts.visits,
                "Schema ready"
            );
            return Ok(());
        }
        Arc::new(db::PgStore::new(conn))
    };

    let demo = cli.memory;
    let stylist_or_demo = |id: Option<Uuid>| resolve(id, demo, DEMO_STYLIST_ID, "--stylist");
    let service_or_demo = |id: Option<Uuid>| resolve(id, demo, DEMO_SERVICE_ID, "--service");

    let booking = BookingService::new(store.clone(), clock.clone(), config.schedule.policy())
        .with_retry_policy(config.retry.policy());
    let attendance = AttendanceService::new(store.clone(), clock.clone());
    let payroll = PayrollService::new(store.clone(), config.commission.rate_percent)
        .with_retry_policy(config.retry.policy());

    match cli.command {
        Command::InitConfig { .. } => {}
        Command::InitDb => tracing::warn!("init-db has nothing to do in memory mode"),
        Command::AddService {
            name,
            category,
            price_cents,
            duration,
        } => {
            let service = store
                .create_service(CreateService {
                    name,
                    category,
                    price_cents,
                    duration_minutes: duration,
                    gender: GenderRestriction::Any,
                })
                .await?;
            print_json(&service)?;
        }
        Command::ListServices { all } => print_json(&store.list_services(all).await?)?,
        Command::UpdateService {
            id,
            name,
            price_cents,
            duration,
            active,
        } => {
            let update = UpdateService {
                name,
                price_cents,
                duration_minutes: duration,
                is_active: active,
                ..Default::default()
            };
            match store.update_service(id, update).await? {
                Some(service) => print_json(&service)?,
                None => bail!("Service {id} not found"),
            }
        }
        Command::DeleteService { id } => {
            if !store.set_service_deleted(id, Some(clock.now())).await? {
                bail!("Service {id} not found");
            }
            tracing::info!(service_id = %id, "Service deleted");
        }
        Command::RestoreService { id } => {
            if !store.set_service_deleted(id, None).await? {
                bail!("Service {id} not found");
            }
            tracing::info!(service_id = %id, "Service restored");
        }
        Command::AddStaff {
            name,
            role,
            phone,
            email,
        } => {
            let staff = store
                .create_staff(
                    CreateStaff {
                        full_name: name,
                        role,
                        phone,
                        email,
                    },
                    clock.now(),
                )
                .await?;
            print_json(&staff)?;
        }
        Command::DeactivateStaff { id } => set_staff_active(store.as_ref(), id, false).await?,
        Command::ActivateStaff { id } => set_staff_active(store.as_ref(), id, true).await?,
        Command::Slots { stylist, service, date } => {
            let day = booking
                .available_slots(stylist_or_demo(stylist)?, date, service_or_demo(service)?)
                .await?;
            print_json(&day)?;
        }
        Command::Book {
            stylist,
            service,
            date,
            time,
            name,
            phone,
            email,
            notes,
            frontend,
        } => {
            let request = BookingRequest {
                customer_name: name,
                customer_phone: phone,
                customer_email: email,
                service_id: service_or_demo(service)?,
                stylist_id: stylist_or_demo(stylist)?,
                date,
                start_time: time,
                source: if frontend {
                    AppointmentSource::Frontend
                } else {
                    AppointmentSource::Admin
                },
                notes,
            };
            match booking.book(request).await {
                Ok(appointment) => print_json(&appointment)?,
                Err(app::AppError::SlotUnavailable {
                    message,
                    suggestion: Some(alt),
                }) => bail!("{message} (next available: {})", alt.format("%H:%M")),
                Err(e) => return Err(e.into()),
            }
        }
        Command::Cancel { id } => print_json(&booking.cancel(id).await?)?,
        Command::Confirm { id } => print_json(&booking.confirm(id).await?)?,
        Command::Complete { id } => print_json(&booking.complete(id).await?)?,
        Command::PunchIn { staff } => print_json(&attendance.punch_in(staff).await?)?,
        Command::PunchOut { staff } => print_json(&attendance.punch_out(staff).await?)?,
        Command::PunchStatus { staff } => match attendance.today(staff).await? {
            Some(record) => print_json(&record)?,
            None => println!("Not punched in today"),
        },
        Command::DeletePunch { staff, date } => {
            attendance.delete_record(staff, date).await?;
            println!("Deleted attendance for {date}");
        }
        Command::Summary { month, staff } => match staff {
            Some(staff) => print_json(&payroll.monthly_summary(staff, month).await?)?,
            None => {
                let summaries: Vec<_> = payroll
                    .all_summaries(month)
                    .await?
                    .into_iter()
                    .map(|(_, summary)| summary)
                    .collect();
                print_json(&summaries)?;
            }
        },
        Command::Export { month, out } => {
            let summaries = payroll.all_summaries(month).await?;
            let mut records = Vec::with_capacity(summaries.len());
            for (staff, _) in &summaries {
                records.push((staff.clone(), store.list_punch_records(staff.id, month).await?));
            }

            let path = out.unwrap_or_else(|| PathBuf::from(export::generate_export_filename(month)));
            export::export_payroll_to_excel(month, &summaries, &records, &path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), rows = summaries.len(), "Payroll exported");
            println!("{}", path.display());
        }
    }

    Ok(())
}

/// Initialize stderr logging plus an optional daily file.
///
/// The returned guard flushes the file writer on drop.
fn init_tracing(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match &logging.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "salon-desk.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}

async fn set_staff_active(store: &dyn SalonStore, id: Uuid, active: bool) -> anyhow::Result<()> {
    match store.set_staff_active(id, active).await? {
        Some(staff) => {
            tracing::info!(staff_id = %id, active, "Staff availability changed");
            print_json(&staff)
        }
        None => bail!("Staff {id} not found"),
    }
}

fn resolve(id: Option<Uuid>, demo: bool, fallback: Uuid, flag: &str) -> anyhow::Result<Uuid> {
    match id {
        Some(id) => Ok(id),
        None if demo => Ok(fallback),
        None => bail!("{flag} is required"),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
