//! CLI interface for pinlog.
//!
//! Each subcommand is one user intent: the app is loaded from storage, the
//! intent runs, and the resulting list or map move is printed. Workouts are
//! addressed by full id or unambiguous prefix (e.g. `a3b`).

mod format;
mod terminal;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::app::{App, EditForm, MapSettings, WorkoutForm};
use crate::config::Config;
use crate::lookup::HttpLookup;
use crate::model::{ActivityType, Coords, Workout, WorkoutId};
use crate::order::SortKey;
use crate::storage::Storage;

use format::format_view_header;
use terminal::{TerminalMap, TerminalView};

type CliApp = App<Storage, TerminalMap, TerminalView, HttpLookup>;

/// Pinlog: log runs and rides as pins on a map.
#[derive(Debug, Parser)]
#[command(name = "pinlog", version, after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// More diagnostic output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only report errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow:
  1. pinlog add running --at 38.72,-9.14 --distance 5 --duration 25 --cadence 150
     → prints the workout ID (e.g. a3b0fc12-...)
  2. pinlog add cycling --at 38.75,-9.2 --distance 20 --duration 60 --elevation -10
  3. pinlog filter running
  4. pinlog sort date
  5. pinlog select a3b
  6. pinlog show-all

Location and weather are looked up when a workout is logged. Set
weather-api-key in ~/.pinlog/config.toml to get weather."#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log a new workout at a point on the map. Prints the workout ID.
    Add {
        #[command(subcommand)]
        workout: AddCommand,
    },

    /// List workouts, honouring the current filter and sort.
    List,

    /// Change a workout's metrics. Omitted values are kept.
    Edit {
        /// Workout ID: full ID or unambiguous prefix.
        id: String,

        /// Distance in kilometres.
        #[arg(long)]
        distance: Option<f64>,

        /// Duration in minutes.
        #[arg(long)]
        duration: Option<f64>,

        /// Cadence (running) or elevation gain (cycling).
        #[arg(long, allow_negative_numbers = true)]
        value: Option<f64>,
    },

    /// Delete a workout and its pin.
    Delete {
        /// Workout ID: full ID or unambiguous prefix.
        id: String,
    },

    /// Centre the map on a workout.
    Select {
        /// Workout ID: full ID or unambiguous prefix.
        id: String,
    },

    /// Fit the map to every workout.
    ShowAll,

    /// Sort the list. Repeating a key flips its direction.
    Sort {
        #[arg(value_enum)]
        key: SortArg,
    },

    /// Show only one type of workout. Repeating it shows everything again.
    Filter {
        #[arg(value_enum)]
        kind: FilterArg,
    },

    /// Delete every workout and forget the list settings.
    Reset {
        /// Confirm. Nothing is deleted without it.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum AddCommand {
    /// A run, with cadence in steps per minute.
    Running {
        /// Where: `LAT,LNG`.
        #[arg(long, allow_hyphen_values = true)]
        at: Coords,

        /// Distance in kilometres.
        #[arg(long)]
        distance: f64,

        /// Duration in minutes.
        #[arg(long)]
        duration: f64,

        /// Steps per minute.
        #[arg(long)]
        cadence: f64,
    },

    /// A ride, with elevation gain in metres.
    Cycling {
        /// Where: `LAT,LNG`.
        #[arg(long, allow_hyphen_values = true)]
        at: Coords,

        /// Distance in kilometres.
        #[arg(long)]
        distance: f64,

        /// Duration in minutes.
        #[arg(long)]
        duration: f64,

        /// Elevation gain in metres. May be zero or negative.
        #[arg(long, allow_negative_numbers = true)]
        elevation: f64,
    },
}

impl AddCommand {
    fn to_form(&self) -> (Coords, WorkoutForm) {
        match *self {
            Self::Running {
                at,
                distance,
                duration,
                cadence,
            } => (
                at,
                WorkoutForm {
                    activity: ActivityType::Running,
                    distance_km: distance,
                    duration_min: duration,
                    value: cadence,
                },
            ),
            Self::Cycling {
                at,
                distance,
                duration,
                elevation,
            } => (
                at,
                WorkoutForm {
                    activity: ActivityType::Cycling,
                    distance_km: distance,
                    duration_min: duration,
                    value: elevation,
                },
            ),
        }
    }
}

/// CLI-facing sort key; `off` clears sorting.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    Date,
    Distance,
    Duration,
    Off,
}

impl SortArg {
    fn to_domain(self) -> Option<SortKey> {
        match self {
            Self::Date => Some(SortKey::Date),
            Self::Distance => Some(SortKey::Distance),
            Self::Duration => Some(SortKey::Duration),
            Self::Off => None,
        }
    }
}

/// CLI-facing type filter; `off` shows everything.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FilterArg {
    Running,
    Cycling,
    Off,
}

impl FilterArg {
    fn to_domain(self) -> Option<ActivityType> {
        match self {
            Self::Running => Some(ActivityType::Running),
            Self::Cycling => Some(ActivityType::Cycling),
            Self::Off => None,
        }
    }
}

/// Run a parsed command, returning an error message on failure.
pub fn run(cli: Cli, config: &Config, storage: Storage) -> Result<(), String> {
    let mut lookup = HttpLookup::new(
        config.lookup_timeout(),
        config.geocode_auth.clone(),
        config.weather_api_key.clone(),
    )
    .map_err(|e| format!("failed to set up lookups: {e}"))?;
    if let Some(url) = &config.geocode_url {
        lookup = lookup.with_geocode_url(url);
    }
    if let Some(url) = &config.weather_url {
        lookup = lookup.with_weather_url(url);
    }

    let settings = MapSettings {
        zoom: config.map_zoom,
        fit_padding: config.fit_padding,
    };
    let mut app = App::start(
        storage,
        TerminalMap::default(),
        TerminalView::default(),
        lookup,
        settings,
    )
    .map_err(|e| format!("failed to load workouts: {e}"))?;

    match cli.command {
        Command::Add { workout } => cmd_add(&mut app, &workout),
        Command::List => {
            print_list(&app);
            Ok(())
        }
        Command::Edit {
            id,
            distance,
            duration,
            value,
        } => cmd_edit(&mut app, &id, distance, duration, value),
        Command::Delete { id } => cmd_delete(&mut app, &id),
        Command::Select { id } => cmd_select(&mut app, &id),
        Command::ShowAll => {
            if app.on_show_all() {
                print_camera(&app);
            }
            Ok(())
        }
        Command::Sort { key } => {
            let changed = app
                .on_sort_requested(key.to_domain())
                .map_err(|e| format!("failed to save sort: {e}"))?;
            if changed {
                print_list(&app);
            }
            Ok(())
        }
        Command::Filter { kind } => {
            let changed = app
                .on_filter_requested(kind.to_domain())
                .map_err(|e| format!("failed to save filter: {e}"))?;
            if changed {
                print_list(&app);
            }
            Ok(())
        }
        Command::Reset { yes } => cmd_reset(&mut app, yes),
    }
}

fn cmd_add(app: &mut CliApp, workout: &AddCommand) -> Result<(), String> {
    let (at, form) = workout.to_form();
    app.on_map_clicked(at);

    let id = app
        .on_create_submitted(&form)
        .map_err(|e| format!("failed to save workout: {e}"))?
        .ok_or("workout not logged")?;

    println!("{id}");
    Ok(())
}

fn cmd_edit(
    app: &mut CliApp,
    reference: &str,
    distance: Option<f64>,
    duration: Option<f64>,
    value: Option<f64>,
) -> Result<(), String> {
    if distance.is_none() && duration.is_none() && value.is_none() {
        return Err("nothing to change: pass --distance, --duration or --value".to_string());
    }

    let current = resolve_workout(app, reference)?;
    let id = current.id().clone();
    let form = EditForm {
        distance_km: distance.unwrap_or(current.distance_km()),
        duration_min: duration.unwrap_or(current.duration_min()),
        value: value.unwrap_or(current.value()),
    };

    let edited = app
        .on_edit_submitted(&id, &form)
        .map_err(|e| format!("failed to save workout: {e}"))?;
    if !edited {
        return Err(format!("workout {} not changed", id.short()));
    }

    print_list(app);
    Ok(())
}

fn cmd_delete(app: &mut CliApp, reference: &str) -> Result<(), String> {
    let id = resolve_workout(app, reference)?.id().clone();

    app.on_delete_confirmed(&id)
        .map_err(|e| format!("failed to delete workout: {e}"))?;

    eprintln!("Workout {} deleted", id.short());
    Ok(())
}

fn cmd_select(app: &mut CliApp, reference: &str) -> Result<(), String> {
    let id = resolve_workout(app, reference)?.id().clone();

    app.on_record_selected(&id)
        .map_err(|e| format!("failed to save workout: {e}"))?;

    print_camera(app);
    if let Some(workout) = app.repository().find_by_id(&id) {
        println!("{}", format::format_workout(workout));
    }
    Ok(())
}

fn cmd_reset(app: &mut CliApp, yes: bool) -> Result<(), String> {
    if !yes {
        return Err(format!(
            "this deletes all {} workouts; rerun with --yes to confirm",
            app.repository().len()
        ));
    }

    app.on_reset_all()
        .map_err(|e| format!("failed to reset: {e}"))?;

    eprintln!(
        "All workouts deleted from {}",
        app.repository().store().root().display()
    );
    Ok(())
}

fn print_list(app: &CliApp) {
    let view = app.view();
    if !view.actions_enabled() {
        println!("No workouts");
        return;
    }

    println!(
        "{}",
        format_view_header(
            app.view_state(),
            app.map().pin_count(),
            app.repository().len()
        )
    );
    for entry in view.entries() {
        println!();
        println!("{entry}");
    }
}

fn print_camera(app: &CliApp) {
    if let Some(camera) = app.map().camera() {
        println!("{camera}");
    }
}

/// Resolve a workout reference (full ID or unambiguous prefix) to a workout.
fn resolve_workout<'a>(app: &'a CliApp, reference: &str) -> Result<&'a Workout, String> {
    let repo = app.repository();

    // Try the full ID first.
    if let Some(workout) = repo.find_by_id(&WorkoutId::from(reference)) {
        return Ok(workout);
    }

    let matches: Vec<&Workout> = repo
        .workouts()
        .iter()
        .filter(|w| w.id().as_str().starts_with(reference))
        .collect();

    match matches.as_slice() {
        [] => Err(format!("no workout matching '{reference}'")),
        [workout] => Ok(*workout),
        _ => {
            let ids: Vec<&str> = matches.iter().map(|w| w.id().short()).collect();
            Err(format!(
                "'{reference}' is ambiguous: matches {} workouts: {}",
                matches.len(),
                ids.join(", ")
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_with_negative_coordinates_and_elevation() {
        let cli = Cli::try_parse_from([
            "pinlog",
            "add",
            "cycling",
            "--at",
            "-33.86,151.21",
            "--distance",
            "20",
            "--duration",
            "60",
            "--elevation",
            "-10",
        ])
        .unwrap();

        let Command::Add { workout } = cli.command else {
            panic!("expected add");
        };
        let (at, form) = workout.to_form();
        assert_eq!(at, Coords::new(-33.86, 151.21));
        assert_eq!(form.activity, ActivityType::Cycling);
        assert_eq!(form.value, -10.0);
    }

    #[test]
    fn rejects_malformed_coordinates() {
        let result = Cli::try_parse_from([
            "pinlog",
            "add",
            "running",
            "--at",
            "north",
            "--distance",
            "5",
            "--duration",
            "25",
            "--cadence",
            "150",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_sort_and_filter_off() {
        let cli = Cli::try_parse_from(["pinlog", "sort", "off"]).unwrap();
        assert!(matches!(cli.command, Command::Sort { key: SortArg::Off }));

        let cli = Cli::try_parse_from(["pinlog", "filter", "cycling"]).unwrap();
        let Command::Filter { kind } = cli.command else {
            panic!("expected filter");
        };
        assert_eq!(kind.to_domain(), Some(ActivityType::Cycling));
    }

    #[test]
    fn verbosity_flags_are_global() {
        let cli = Cli::try_parse_from(["pinlog", "list", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);

        assert!(Cli::try_parse_from(["pinlog", "-q", "-v", "list"]).is_err());
    }

    #[test]
    fn sort_arg_maps_to_keys() {
        assert_eq!(SortArg::Date.to_domain(), Some(SortKey::Date));
        assert_eq!(SortArg::Off.to_domain(), None);
    }
}
