use anyhow::Context;
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use autocare::config::AppConfig;
use autocare::models::{availability, HolidayPeriod, PreBillRequest, Role};
use autocare::services::ai::recommendation;
use autocare::services::lookup::{self, Lookup};
use autocare::services::session::BOOKING_ROLES;
use autocare::services::{billing, catalog, slots::SlotEngine};
use autocare::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "autocare", about = "Service-center booking client")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and remember the session
    Login { username: String, password: String },
    /// Create an account (does not sign in)
    Register {
        username: String,
        password: String,
        #[arg(long, default_value = "USER")]
        role: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the current session
    Whoami,
    /// List vehicle types
    VehicleTypes,
    /// List vehicle makes
    Makes,
    /// List models of a make
    Models { make: String },
    /// List predefined services for a make/model
    Services { make: String, model: String },
    /// Show bookable slots on a date
    Slots {
        date: NaiveDate,
        make: String,
        model: String,
        #[arg(long = "service", required = true)]
        services: Vec<String>,
    },
    /// Find the customer record for a vehicle ID or chassis number
    Lookup { identifier: String },
    /// Typeahead over known vehicles
    Suggest { query: String },
    /// Book an appointment end to end
    Book(BookArgs),
    /// Manage holidays (admin)
    #[command(subcommand)]
    Holidays(HolidayCommand),
    /// Estimate a bill
    PreBill {
        make: String,
        model: String,
        #[arg(long = "service")]
        services: Vec<String>,
        #[arg(long, default_value = "0")]
        parts_cost: Decimal,
    },
    /// Print the receipt of a service record (cashier)
    Receipt { record_id: i64 },
    /// Service history of the signed-in user
    History,
    /// Appointments of the signed-in user
    Appointments,
    /// Ask for maintenance advice on a vehicle
    Recommend { make: String, model: String, year: i32 },
}

#[derive(Debug, clap::Args)]
struct BookArgs {
    vehicle_id: String,
    #[arg(long)]
    make: String,
    #[arg(long)]
    model: String,
    #[arg(long)]
    year: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    nic: Option<String>,
    #[arg(long = "service", required = true)]
    services: Vec<String>,
    #[arg(long)]
    date: NaiveDate,
    /// Slot start time, HH:MM
    #[arg(long)]
    slot: String,
}

#[derive(Debug, Subcommand)]
enum HolidayCommand {
    List,
    Add {
        date: NaiveDate,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env();
    let state = AppState::from_config(config)?;

    run(&state, args.command).await
}

async fn run(state: &AppState, command: Command) -> anyhow::Result<()> {
    let backend = state.backend();
    let token = state.session.current().token().map(str::to_string);
    let token = token.as_deref();

    match command {
        Command::Login { username, password } => {
            let session = state.session.login(&username, &password).await?;
            println!(
                "Signed in as {} ({}), landing page {}",
                session.username().unwrap_or_default(),
                session.role().as_str(),
                session.role().landing_path()
            );
        }
        Command::Register {
            username,
            password,
            role,
        } => {
            let role = Role::parse(&role).with_context(|| format!("unknown role {role}"))?;
            state.session.register(&username, &password, role).await?;
            println!("Registered {username}. Sign in to continue.");
        }
        Command::Logout => {
            state.session.logout();
            println!("Signed out.");
        }
        Command::Whoami => {
            let session = state.session.current();
            match session.username() {
                Some(name) => println!("{name} ({})", session.role().as_str()),
                None => println!("guest"),
            }
        }
        Command::VehicleTypes => {
            for vehicle_type in state.api.vehicle_types().await? {
                println!("{}", vehicle_type.name);
            }
        }
        Command::Makes => {
            for make in catalog::makes(backend.as_ref()).await? {
                println!("{}", make.name);
            }
        }
        Command::Models { make } => {
            for model in catalog::models(backend.as_ref(), &make).await? {
                println!("{}", model.name);
            }
        }
        Command::Services { make, model } => {
            for service in catalog::list_services(backend.as_ref(), &make, &model).await? {
                println!(
                    "{:<30} {:>8} {:>4} min",
                    service.description, service.fee, service.duration_minutes
                );
            }
        }
        Command::Slots {
            date,
            make,
            model,
            services,
        } => {
            let mut engine = SlotEngine::new(backend);
            let slots = engine
                .available_slots(Some(date), &services, &make, &model)
                .await?;
            if slots.is_empty() {
                println!("No available time slots found for the selected date and services.");
            }
            for slot in slots {
                println!("{}", slot.label());
            }
        }
        Command::Lookup { identifier } => {
            state.session.require_role(&[Role::Cashier, Role::Admin])?;
            match lookup::find(backend.as_ref(), &identifier, token).await? {
                Lookup::Found(record) => println!(
                    "{} {} {} ({}), owner {} NIC {} phone {}",
                    record.vehicle.vehicle_id,
                    record.vehicle.make,
                    record.vehicle.model,
                    record.vehicle.year,
                    record.customer.name,
                    record.customer.nic_no,
                    record.customer.phone_no
                ),
                Lookup::NotFound => println!("No record for {identifier}."),
            }
        }
        Command::Suggest { query } => {
            state.session.require_role(&[Role::Cashier, Role::Admin])?;
            let suggestions = state.suggestions();
            suggestions.search(&query, token).await?;
            for vehicle in suggestions.current() {
                println!("{} {} {}", vehicle.vehicle_id, vehicle.make, vehicle.model);
            }
        }
        Command::Book(book) => book_appointment(state, book).await?,
        Command::Holidays(cmd) => manage_holidays(state, cmd).await?,
        Command::PreBill {
            make,
            model,
            services,
            parts_cost,
        } => {
            let req = PreBillRequest {
                make,
                model,
                selected_service_descriptions: services,
                custom_items: vec![],
                estimated_parts_cost: parts_cost,
            };
            let estimate = billing::pre_bill(&state.api, &req, token).await?;
            for line in &estimate.service_breakdown {
                println!("{:<30} {:>10}", line.description, line.cost);
            }
            println!("{:<30} {:>10}", "Parts", estimate.parts_cost_estimate);
            println!("{:<30} {:>10}", "Estimated total", estimate.estimated_total);
        }
        Command::Receipt { record_id } => {
            state.session.require_role(&[Role::Cashier, Role::Admin])?;
            println!("{}", billing::receipt(&state.api, record_id, token).await?);
        }
        Command::History => {
            for record in billing::history(&state.api, token).await? {
                println!(
                    "#{} {} {} {}",
                    record.id.unwrap_or_default(),
                    record.vehicle_id.as_deref().unwrap_or("-"),
                    record
                        .service_date_time
                        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_default(),
                    record.total_cost
                );
            }
        }
        Command::Appointments => {
            for appt in billing::appointments(&state.api, token).await? {
                println!(
                    "{} {} {} {}",
                    appt.date,
                    appt.start_time.format("%H:%M"),
                    appt.vehicle_identifier.as_deref().unwrap_or("-"),
                    appt.status.map(|s| s.as_str()).unwrap_or("-")
                );
            }
        }
        Command::Recommend { make, model, year } => {
            let current_year = Local::now().year();
            let advice =
                recommendation::recommend(state.llm.as_ref(), &make, &model, year, current_year)
                    .await?;
            println!("{}", advice.recommendations);
        }
    }

    Ok(())
}

async fn book_appointment(state: &AppState, args: BookArgs) -> anyhow::Result<()> {
    state.session.require_role(BOOKING_ROLES)?;
    let mut workflow = state.workflow();

    workflow.set_vehicle_identifier(&args.vehicle_id)?;
    workflow.set_make(&args.make)?;
    workflow.set_model(&args.model)?;
    workflow.set_year(&args.year)?;
    workflow.next().await?;
    if let Some(error) = &workflow.steps().lookup.error {
        tracing::warn!(error = %error, "continuing without existing record");
    }

    if workflow.customer_locked() {
        println!(
            "Existing customer: {} (NIC {})",
            workflow.draft().customer_name,
            workflow.draft().customer_nic
        );
    } else {
        let missing = || anyhow::anyhow!("new customer: --name, --address, --phone and --nic are required");
        workflow.set_customer_name(args.name.as_deref().ok_or_else(missing)?)?;
        workflow.set_customer_address(args.address.as_deref().ok_or_else(missing)?)?;
        workflow.set_customer_phone(args.phone.as_deref().ok_or_else(missing)?)?;
        workflow.set_customer_nic(args.nic.as_deref().ok_or_else(missing)?)?;
    }
    workflow.next().await?;

    if let Some(error) = &workflow.steps().catalog.error {
        anyhow::bail!("{error}");
    }
    for service in &args.services {
        workflow.toggle_service(service)?;
    }
    workflow.next().await?;

    workflow.select_date(args.date).await?;
    let start = availability::parse_time(&args.slot)?;
    let slot = workflow
        .visible_slots()
        .into_iter()
        .find(|s| s.start_time == start)
        .with_context(|| format!("no available slot starting at {} on {}", args.slot, args.date))?;
    workflow.select_slot(slot)?;
    workflow.next().await?;

    println!(
        "Paying advance fee of {} and booking {} at {}...",
        workflow.advance_fee(),
        args.date,
        slot.label()
    );
    let appointment = workflow.submit().await?;
    if let Some(message) = state.announcements.current() {
        println!("{message}");
    }
    if let Some(id) = appointment.id {
        println!("Appointment #{id}");
    }
    Ok(())
}

async fn manage_holidays(state: &AppState, cmd: HolidayCommand) -> anyhow::Result<()> {
    let admin = state.holiday_admin();
    match cmd {
        HolidayCommand::List => {
            for holiday in admin.list().await? {
                let window = match (holiday.start_time, holiday.end_time) {
                    (Some(start), Some(end)) => {
                        format!("{}-{}", start.format("%H:%M"), end.format("%H:%M"))
                    }
                    _ => "all day".to_string(),
                };
                println!(
                    "#{} {} {} {}",
                    holiday.id.unwrap_or_default(),
                    holiday.date,
                    window,
                    holiday.description.unwrap_or_default()
                );
            }
        }
        HolidayCommand::Add {
            date,
            start,
            end,
            description,
        } => {
            let holiday = HolidayPeriod {
                id: None,
                date,
                start_time: start.as_deref().map(availability::parse_time).transpose()?,
                end_time: end.as_deref().map(availability::parse_time).transpose()?,
                description,
            };
            let created = admin.create(&holiday).await?;
            println!("Created holiday #{}", created.id.unwrap_or_default());
        }
        HolidayCommand::Delete { id } => {
            admin.delete(id).await?;
            println!("Deleted holiday #{id}");
        }
    }
    Ok(())
}
