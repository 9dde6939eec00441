use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use villalux::booking::{self, BookingDesk, DashboardSummary, PriceQuote};
use villalux::catalog::{self, VillaForm};
use villalux::config::{self, VillaluxConfig};
use villalux::crm::{lead_timeline, AnalyticsReport, Insights};
use villalux::dataset::Dataset;
use villalux::models::{BookingStatus, LeadStatus, PaymentStatus, SearchFilters, Villa};
use villalux::output::{json as json_out, table};
use villalux::search::{self, filters::LeadFilter};
use villalux::voice::{AgentEvent, VoiceAgent};

const DATA_ENV: &str = "VILLALUX_DATA";

#[derive(Parser)]
#[command(
    name = "villalux",
    version,
    about = "VillaLux — villa catalog, bookings, lead CRM and AI voice agent"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Dataset file (.json, .yaml, .toml) instead of the built-in data [env: VILLALUX_DATA]
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Path to config file (default: ~/.villalux/config.toml)
    #[arg(long = "config", global = true, env = "VILLALUX_CONFIG")]
    config_file: Option<PathBuf>,

    /// Log state changes to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search active villas (all villas with --all)
    Villas {
        /// City, location or country (partial match)
        #[arg(long)]
        city: Option<String>,

        /// Requested check-in (YYYY-MM-DD)
        #[arg(long)]
        check_in: Option<NaiveDate>,

        /// Requested check-out (YYYY-MM-DD)
        #[arg(long)]
        check_out: Option<NaiveDate>,

        /// Number of guests
        #[arg(long)]
        guests: Option<u32>,

        /// Minimum nightly price
        #[arg(long)]
        min_price: Option<u64>,

        /// Maximum nightly price
        #[arg(long)]
        max_price: Option<u64>,

        /// Required amenity (repeatable)
        #[arg(long = "amenity")]
        amenities: Vec<String>,

        /// Admin view: every villa regardless of status, no filters
        #[arg(long)]
        all: bool,
    },

    /// Show villa details, with a price quote when dates are given
    Villa {
        /// Villa ID
        id: String,

        #[arg(long)]
        check_in: Option<NaiveDate>,

        #[arg(long)]
        check_out: Option<NaiveDate>,
    },

    /// Add a villa to the catalog
    VillaAdd {
        #[command(flatten)]
        fields: VillaFields,

        /// Owner recorded on the new villa
        #[arg(long, default_value = "admin")]
        owner: String,
    },

    /// Edit a villa; omitted fields keep their current value
    VillaEdit {
        /// Villa ID
        id: String,

        #[command(flatten)]
        fields: VillaFields,
    },

    /// Delete a villa (its bookings are left alone)
    VillaDelete {
        /// Villa ID
        id: String,
    },

    /// Switch a villa between active and inactive
    VillaToggle {
        /// Villa ID
        id: String,
    },

    /// Book a villa
    Book {
        /// Villa ID
        villa_id: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        check_in: NaiveDate,

        #[arg(long)]
        check_out: NaiveDate,

        /// Number of guests (default from config)
        #[arg(long)]
        guests: Option<u32>,

        #[arg(long)]
        requests: Option<String>,
    },

    /// List bookings, optionally for a calendar day or date range
    Bookings {
        /// Bookings whose stay includes this day
        #[arg(long, conflicts_with_all = ["from", "to"])]
        on: Option<NaiveDate>,

        /// Range start (YYYY-MM-DD), used with --to
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,

        /// Range end (YYYY-MM-DD), used with --from
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },

    /// Set a booking's status (pending, confirmed, cancelled, completed)
    BookingStatus {
        /// Booking ID
        id: String,
        status: BookingStatus,
    },

    /// Set a booking's payment status (pending, paid, refunded)
    PaymentStatus {
        /// Booking ID
        id: String,
        status: PaymentStatus,
    },

    /// Admin overview
    Dashboard,

    /// List leads
    Leads {
        /// Match name, email or villa interest
        #[arg(long)]
        search: Option<String>,

        /// hot, warm, cold, booked or lost
        #[arg(long)]
        status: Option<LeadStatus>,

        #[arg(long)]
        min_score: Option<u8>,
    },

    /// Show a lead with its activity timeline
    Lead {
        /// Lead ID
        id: String,
    },

    /// AI insights tab
    Insights,

    /// Analytics tab
    Analytics,

    /// Call a lead with the AI voice agent
    Call {
        /// Lead ID
        lead_id: String,

        /// Keep dialing hot leads from the queue after each completed call
        #[arg(long)]
        auto: bool,

        /// Playback speed multiplier
        #[arg(long, default_value = "1.0")]
        speed: f64,

        /// Hang up the active call after this many seconds
        #[arg(long)]
        hangup_after: Option<u64>,
    },

    /// Show the voice agent's call queue
    Queue,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Fields of the admin villa form.
#[derive(Args)]
struct VillaFields {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    location: Option<String>,

    #[arg(long)]
    city: Option<String>,

    #[arg(long)]
    country: Option<String>,

    /// Nightly price in dollars
    #[arg(long)]
    price: Option<u64>,

    #[arg(long)]
    max_guests: Option<u32>,

    #[arg(long)]
    bedrooms: Option<u32>,

    #[arg(long)]
    bathrooms: Option<u32>,

    /// Comma-separated amenities
    #[arg(long)]
    amenities: Option<String>,

    /// Comma-separated image URLs
    #[arg(long)]
    images: Option<String>,
}

impl VillaFields {
    fn apply_to(self, form: &mut VillaForm) {
        if let Some(v) = self.name {
            form.name = v;
        }
        if let Some(v) = self.description {
            form.description = v;
        }
        if let Some(v) = self.location {
            form.location = v;
        }
        if let Some(v) = self.city {
            form.city = v;
        }
        if let Some(v) = self.country {
            form.country = v;
        }
        if let Some(v) = self.price {
            form.price_per_night = v;
        }
        if let Some(v) = self.max_guests {
            form.max_guests = v;
        }
        if let Some(v) = self.bedrooms {
            form.bedrooms = v;
        }
        if let Some(v) = self.bathrooms {
            form.bathrooms = v;
        }
        if let Some(v) = self.amenities {
            form.amenities = v;
        }
        if let Some(v) = self.images {
            form.images = v;
        }
    }
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a commented config template if none exists
    Init,
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let json_output = cli.json;
    let config_file = match cli.config_file {
        Some(path) => path,
        None => config::config_path()?,
    };

    if let Commands::Config { action } = &cli.command {
        return run_config(action, &config_file, json_output);
    }

    let config = VillaluxConfig::load_from(&config_file)?;
    let mut dataset = load_dataset(cli.data.as_deref(), &config)?;

    match cli.command {
        Commands::Villas {
            city,
            check_in,
            check_out,
            guests,
            min_price,
            max_price,
            amenities,
            all,
        } => {
            let villas: Vec<&Villa> = if all {
                dataset.villas.iter().collect()
            } else {
                let filters = SearchFilters {
                    city,
                    check_in,
                    check_out,
                    guests,
                    min_price,
                    max_price,
                    amenities,
                };
                search::search_villas(&dataset, &filters)
            };
            if json_output {
                json_out::print_json(&serde_json::json!({
                    "total": villas.len(),
                    "villas": villas,
                }))?;
            } else {
                table::print_villa_list(&villas);
            }
        }

        Commands::Villa {
            id,
            check_in,
            check_out,
        } => {
            let villa = dataset
                .villa(&id)
                .with_context(|| format!("Villa not found: {id}"))?;

            let stay = match (check_in, check_out) {
                (Some(ci), Some(co)) => {
                    if co < ci {
                        bail!("Check-out {co} is before check-in {ci}");
                    }
                    let filters = SearchFilters {
                        check_in: Some(ci),
                        check_out: Some(co),
                        ..SearchFilters::default()
                    };
                    let quote = PriceQuote::for_stay(
                        villa.price_per_night,
                        booking::nights(ci, co),
                        &config.booking,
                    );
                    Some((quote, filters.is_free(&villa.id, &dataset.bookings)))
                }
                (None, None) => None,
                _ => bail!("Give both --check-in and --check-out for a price quote"),
            };

            if json_output {
                json_out::print_json(&serde_json::json!({
                    "villa": villa,
                    "quote": stay.as_ref().map(|(q, _)| q),
                    "available": stay.as_ref().map(|(_, free)| free),
                }))?;
            } else {
                table::print_villa_detail(villa, stay.as_ref().map(|(q, _)| q));
                if let Some((_, free)) = stay {
                    let note = if free {
                        "Available for these dates."
                    } else {
                        "Already booked for these dates."
                    };
                    println!("\n{note}");
                }
            }
        }

        Commands::VillaAdd { fields, owner } => {
            let mut form = VillaForm::default();
            fields.apply_to(&mut form);
            let id = catalog::add_villa(&mut dataset.villas, &form, &owner, Utc::now())?;
            print_villa_change(&dataset, &id, "Added", json_output)?;
        }

        Commands::VillaEdit { id, fields } => {
            let villa = dataset
                .villa(&id)
                .with_context(|| format!("Villa not found: {id}"))?;
            let mut form = VillaForm::from_villa(villa);
            fields.apply_to(&mut form);
            catalog::edit_villa(&mut dataset.villas, &id, &form, Utc::now())?;
            print_villa_change(&dataset, &id, "Updated", json_output)?;
        }

        Commands::VillaDelete { id } => {
            let removed = catalog::delete_villa(&mut dataset.villas, &id)?;
            if json_output {
                json_out::print_json(&serde_json::json!({
                    "deleted": removed,
                    "villas": dataset.villas,
                }))?;
            } else {
                println!("Deleted: {} ({})\n", removed.name, removed.id);
                let remaining: Vec<&Villa> = dataset.villas.iter().collect();
                table::print_villa_list(&remaining);
            }
        }

        Commands::VillaToggle { id } => {
            let status = catalog::toggle_status(&mut dataset.villas, &id)?;
            if json_output {
                json_out::print_json(&serde_json::json!({
                    "id": id,
                    "status": status,
                    "villas": dataset.villas,
                }))?;
            } else {
                println!("Villa {id} is now {status}\n");
                let villas: Vec<&Villa> = dataset.villas.iter().collect();
                table::print_villa_list(&villas);
            }
        }

        Commands::Book {
            villa_id,
            name,
            email,
            phone,
            check_in,
            check_out,
            guests,
            requests,
        } => {
            let villa = dataset
                .villa(&villa_id)
                .cloned()
                .with_context(|| format!("Villa not found: {villa_id}"))?;
            let desk = BookingDesk::new(&villa, &config.booking);

            let mut form = desk.blank_form();
            form.guest_name = name;
            form.guest_email = email;
            form.guest_phone = phone;
            form.check_in = Some(check_in);
            form.check_out = Some(check_out);
            form.special_requests = requests;
            if let Some(g) = guests {
                form.guests = g;
            }

            let request = desk.submit(&form, |r| {
                debug!("Booking submitted for {} at {}", r.guest_name, r.villa_id);
            })?;
            let quote = desk.quote(request.check_in, request.check_out);
            let id = dataset.record_booking(&request, Utc::now())?;
            let booking = dataset
                .booking(&id)
                .with_context(|| format!("Booking not found: {id}"))?;

            if json_output {
                json_out::print_json(&serde_json::json!({
                    "quote": quote,
                    "booking": booking,
                }))?;
            } else {
                println!("Booking request for {}\n", villa.name);
                table::print_quote(&quote);
                println!();
                table::print_booking_list(&[booking]);
            }
        }

        Commands::Bookings { on, from, to } => {
            let bookings = match (on, from, to) {
                (Some(day), _, _) => booking::bookings_on(&dataset.bookings, day),
                (None, Some(from), Some(to)) => {
                    if to < from {
                        bail!("--to {to} is before --from {from}");
                    }
                    booking::bookings_between(&dataset.bookings, from, to)
                }
                _ => dataset.bookings.iter().collect(),
            };
            if json_output {
                json_out::print_json(&serde_json::json!({
                    "total": bookings.len(),
                    "bookings": bookings,
                }))?;
            } else {
                table::print_booking_list(&bookings);
            }
        }

        Commands::BookingStatus { id, status } => {
            dataset.set_booking_status(&id, status, Utc::now())?;
            print_booking(&dataset, &id, json_output)?;
        }

        Commands::PaymentStatus { id, status } => {
            dataset.set_payment_status(&id, status, Utc::now())?;
            print_booking(&dataset, &id, json_output)?;
        }

        Commands::Dashboard => {
            let summary = DashboardSummary::from_dataset(&dataset);
            if json_output {
                json_out::print_json(&summary)?;
            } else {
                table::print_dashboard(&summary);
            }
        }

        Commands::Leads {
            search: query,
            status,
            min_score,
        } => {
            let filter = LeadFilter {
                query,
                status,
                min_score,
            };
            let leads = search::filter_leads(&dataset.leads, &filter);
            if json_output {
                json_out::print_json(&serde_json::json!({
                    "total": leads.len(),
                    "leads": leads,
                }))?;
            } else {
                table::print_lead_list(&leads);
            }
        }

        Commands::Lead { id } => {
            let lead = dataset
                .lead(&id)
                .with_context(|| format!("Lead not found: {id}"))?;
            let timeline = lead_timeline(lead);
            if json_output {
                json_out::print_json(&serde_json::json!({
                    "lead": lead,
                    "timeline": timeline,
                }))?;
            } else {
                table::print_lead_detail(lead, &timeline);
            }
        }

        Commands::Insights => {
            let insights = Insights::from_leads(&dataset.leads);
            if json_output {
                json_out::print_json(&insights)?;
            } else {
                table::print_insights(&insights);
            }
        }

        Commands::Analytics => {
            let report = AnalyticsReport::new(dataset.analytics.as_ref());
            if json_output {
                json_out::print_json(&report)?;
            } else {
                table::print_analytics(&report);
            }
        }

        Commands::Call {
            lead_id,
            auto,
            speed,
            hangup_after,
        } => {
            if !(speed.is_finite() && speed > 0.0) {
                bail!("--speed must be a positive number, got {speed}");
            }
            run_call(
                &mut dataset,
                &config,
                &lead_id,
                auto,
                speed,
                hangup_after.map(Duration::from_secs),
                json_output,
            )?;
        }

        Commands::Queue => {
            let agent = VoiceAgent::new(config.voice.clone(), dataset.leads.clone());
            let leads: Vec<_> = agent
                .queue()
                .iter()
                .filter_map(|id| dataset.lead(id))
                .collect();
            if json_output {
                json_out::print_json(&serde_json::json!({
                    "status": agent.status(),
                    "queue": leads,
                }))?;
            } else {
                println!("Agent: {}\n", agent.status());
                table::print_queue(&leads);
            }
        }

        // Handled before the dataset is loaded.
        Commands::Config { .. } => {}
    }

    Ok(())
}

fn load_dataset(cli_data: Option<&Path>, config: &VillaluxConfig) -> Result<Dataset> {
    match config::resolve_data_path(cli_data, DATA_ENV, config) {
        Some(path) => Dataset::load(&path)
            .with_context(|| format!("Failed to load dataset: {}", path.display())),
        None => Ok(Dataset::mock()),
    }
}

fn run_config(action: &ConfigAction, path: &Path, json_output: bool) -> Result<()> {
    match action {
        ConfigAction::Init => {
            if config::init_config(path)? {
                println!("Created config: {}", path.display());
            } else {
                println!("Config already exists: {}", path.display());
            }
        }
        ConfigAction::Show => {
            let config = VillaluxConfig::load_from(path)?;
            if json_output {
                json_out::print_json(&config)?;
            } else {
                println!("# {}", path.display());
                print!("{}", config.display()?);
            }
        }
        ConfigAction::Path => println!("{}", path.display()),
    }
    Ok(())
}

fn print_villa_change(dataset: &Dataset, id: &str, action: &str, json_output: bool) -> Result<()> {
    let villa = dataset
        .villa(id)
        .with_context(|| format!("Villa not found: {id}"))?;
    if json_output {
        json_out::print_json(&serde_json::json!({
            "villa": villa,
            "villas": dataset.villas,
        }))?;
    } else {
        println!("{action}: {} ({})\n", villa.name, villa.id);
        table::print_villa_detail(villa, None);
        println!();
        let villas: Vec<&Villa> = dataset.villas.iter().collect();
        table::print_villa_list(&villas);
    }
    Ok(())
}

fn print_booking(dataset: &Dataset, id: &str, json_output: bool) -> Result<()> {
    let booking = dataset
        .booking(id)
        .with_context(|| format!("Booking not found: {id}"))?;
    if json_output {
        json_out::print_json(booking)?;
    } else {
        table::print_booking_list(&[booking]);
    }
    Ok(())
}

/// Drive the voice agent against wall time. Each virtual tick sleeps
/// `tick / speed`; finished calls are attached to their leads.
fn run_call(
    dataset: &mut Dataset,
    config: &VillaluxConfig,
    lead_id: &str,
    auto: bool,
    speed: f64,
    hangup_after: Option<Duration>,
    json_output: bool,
) -> Result<()> {
    let mut agent = VoiceAgent::new(config.voice.clone(), dataset.leads.clone());
    agent.set_auto_mode(auto);
    agent.start_call(lead_id)?;

    let step = Duration::from_secs(config.voice.tick_secs.max(1));
    let pause = step.div_f64(speed);

    loop {
        let mut events = agent.advance(step);

        if let Some(limit) = hangup_after {
            if agent.now() >= limit && agent.active().is_some() {
                agent.end_call()?;
                events.extend(agent.take_events());
            }
        }

        for event in &events {
            if !json_output {
                table::print_call_event(event);
            }
            if matches!(event, AgentEvent::Completed(_) | AgentEvent::Failed { .. }) {
                if let Some(session) = agent.history().last() {
                    dataset.record_call(session, Utc::now())?;
                    if !json_output {
                        table::print_call_summary(session);
                    }
                }
            }
        }

        let hung_up = hangup_after.is_some_and(|limit| agent.now() >= limit);
        if agent.active().is_none() && (hung_up || agent.next_due().is_none()) {
            break;
        }
        std::thread::sleep(pause);
    }

    if json_output {
        let calls: Vec<_> = agent
            .history()
            .iter()
            .map(|s| {
                serde_json::json!({
                    "session": s,
                    "lead": dataset.lead(&s.lead_id),
                })
            })
            .collect();
        json_out::print_json(&serde_json::json!({
            "calls": calls,
            "queue": agent.queue(),
        }))?;
    }
    Ok(())
}
