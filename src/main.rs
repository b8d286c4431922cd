/* 3rd party libraries */
use clap::{Arg, Command};
use crossbeam_channel as cbc;
use log::info;
use std::io::BufRead;
use std::sync::Arc;
use std::thread::Builder;

/* Custom libraries */
use secure_elevator::config;
use secure_elevator::simulation::{OutputFormat, Presenter, Simulation};
use secure_elevator::unwrap_or_exit;
use secure_elevator::{AccessPolicy, ElevatorCore, ElevatorEvent};

/* Main */
fn main() {
    let matches = Command::new("secure-elevator")
        .about("Simulates agents sharing one security-tiered elevator")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .takes_value(true)
                .default_value("config.toml")
                .help("Path to the TOML configuration file"),
        )
        .arg(
            Arg::new("requests")
                .long("requests")
                .short('n')
                .takes_value(true)
                .help("Rides per agent before it stops, 0 to run until Enter is pressed"),
        )
        .arg(Arg::new("json").long("json").help("Print events as JSON lines"))
        .get_matches();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Load the configuration
    let config_path = matches.value_of("config").unwrap_or("config.toml");
    let mut config = unwrap_or_exit!(config::load_config(config_path), "Failed to load configuration");
    if let Some(requests) = matches.value_of("requests") {
        config.simulation.requests_per_agent = unwrap_or_exit!(requests.parse::<u32>(), "Invalid --requests");
    }
    let format = if matches.is_present("json") {
        OutputFormat::Json
    } else {
        OutputFormat::Log
    };

    // Initialize channels
    let (event_tx, event_rx) = cbc::unbounded::<ElevatorEvent>();

    // Create the elevator
    let policy = AccessPolicy::from(&config.access);
    let core = Arc::new(ElevatorCore::with_events(&config.elevator, policy, event_tx));

    // Start the presenter
    let presenter = Presenter::new(event_rx, format);
    let presenter_thread = unwrap_or_exit!(
        Builder::new().name("presenter".into()).spawn(move || presenter.run()),
        "Failed to start presenter"
    );

    // Start the agents
    let simulation = unwrap_or_exit!(
        Simulation::start(&config.simulation, Arc::clone(&core)),
        "Failed to start agents"
    );
    info!("Started {} agents", simulation.agent_count());

    let rides = if config.simulation.requests_per_agent == 0 {
        info!("Press Enter to stop");
        let mut line = String::new();
        let _ = std::io::stdin().lock().read_line(&mut line);
        simulation.stop()
    } else {
        simulation.wait()
    };
    info!("Rides per agent: {:?}", rides);

    // Dropping the last core handle closes the event channel
    drop(core);
    if presenter_thread.join().is_err() {
        log::error!("Presenter thread panicked");
        std::process::exit(1);
    }
}
