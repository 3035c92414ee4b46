use std::io::{self, BufRead};

use log::{trace, warn};

use trip_planner::planner::{ActiveField, PlannerInput, TripPlanner};
use trip_planner::services::directions::GoogleMapsDirections;
use trip_planner::services::geocoding::GoogleMapsResolver;
use trip_planner::services::location::FixedLocation;
use trip_planner::services::Coordinate;
use trip_planner::{DisplayCommand, GenericError};

// Jakarta city centre, used when TRIP_PLANNER_HOME is not set.
const DEFAULT_HOME: Coordinate = Coordinate {
    lat: -6.1754,
    lng: 106.8272,
};

#[tokio::main]
async fn main() -> Result<(), GenericError> {
    env_logger::builder()
        .filter_module("trip_planner", log::LevelFilter::Trace)
        .init();
    trace!("Logger init with level TRACE.");

    let places = GoogleMapsResolver::new()?;
    let routes = GoogleMapsDirections::new()?;
    let home = home_coordinate();

    let (planner, handle, mut display) = TripPlanner::new(places, routes, FixedLocation(home));
    tokio::spawn(planner.run());
    tokio::spawn(async move {
        while let Some(command) = display.recv().await {
            render(command);
        }
    });

    print_help();
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match parse_command(line.trim()) {
            Some(Command::Input(input)) => handle.send(input),
            Some(Command::Help) => print_help(),
            Some(Command::Quit) => break,
            None => {
                if !line.trim().is_empty() {
                    println!("Unrecognised command. Type \"help\" for the list.");
                }
            }
        }
    }

    Ok(())
}

fn home_coordinate() -> Coordinate {
    let Ok(raw) = dotenv::var("TRIP_PLANNER_HOME") else {
        return DEFAULT_HOME;
    };
    match parse_coordinate(&raw) {
        Some(coordinate) => coordinate,
        None => {
            warn!("TRIP_PLANNER_HOME is not \"lat,lng\"; using the default.");
            DEFAULT_HOME
        }
    }
}

fn parse_coordinate(raw: &str) -> Option<Coordinate> {
    let (lat, lng) = raw.split_once(',')?;
    Some(Coordinate::new(
        lat.trim().parse().ok()?,
        lng.trim().parse().ok()?,
    ))
}

enum Command {
    Input(PlannerInput),
    Help,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let (verb, rest) = match line.split_once(' ') {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    match verb {
        "start" if !rest.is_empty() => Some(Command::Input(PlannerInput::Submit(
            ActiveField::Start,
            rest.to_string(),
        ))),
        "dest" if !rest.is_empty() => Some(Command::Input(PlannerInput::Submit(
            ActiveField::Destination,
            rest.to_string(),
        ))),
        "pick" => {
            let number: usize = rest.parse().ok()?;
            Some(Command::Input(PlannerInput::SelectEntry(
                number.checked_sub(1)?,
            )))
        }
        "drag" => {
            let coordinate = parse_coordinate(&rest.replace(' ', ","))?;
            Some(Command::Input(PlannerInput::MapRecentered(coordinate)))
        }
        "reset" => Some(Command::Input(PlannerInput::Reset)),
        "help" => Some(Command::Help),
        "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

fn print_help() {
    println!("Commands:");
    println!("  start <text>     search a start address");
    println!("  dest <text>      search a destination address");
    println!("  pick <n>         select suggestion n from the list");
    println!("  drag <lat> <lng> recentre the map");
    println!("  reset            clear the trip");
    println!("  quit             leave");
}

fn render(command: DisplayCommand) {
    match command {
        DisplayCommand::SetRegion(center) => {
            println!("[map] centred on ({:.4}, {:.4})", center.lat, center.lng);
        }
        DisplayCommand::SetStartFieldText(text) => println!("[start field] {text}"),
        DisplayCommand::SetDestinationFieldText(text) => println!("[dest field] {text}"),
        DisplayCommand::SetSuggestions(labels) => {
            if labels.is_empty() {
                println!("[suggestions] (none)");
            } else {
                for (number, label) in labels.iter().enumerate() {
                    println!("[suggestions] {}. {label}", number + 1);
                }
            }
        }
        DisplayCommand::SetPins { start, destination } => {
            println!(
                "[map] pins at ({:.4}, {:.4}) and ({:.4}, {:.4})",
                start.lat, start.lng, destination.lat, destination.lng
            );
        }
        DisplayCommand::ShowRoute {
            polyline,
            distance_label,
            price_label,
        } => {
            println!(
                "[map] route with {} points | {distance_label} | Rp {price_label}",
                polyline.len()
            );
        }
        DisplayCommand::ClearRoute => println!("[map] route cleared | 0.0 KM | Rp 0"),
    }
}
