use clap::Parser;
use log::info;
use mtur::types::{DEFAULT_MAX_STEPS, DEFAULT_START_STATE};
use mtur::{
    Compilation, Machine, MachineConfig, Outcome, ProgramLoader, Step, TemplateManager, MAX_TAPES,
};
use std::error::Error;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

/// Accept states used when neither the template nor the command line names one.
const CONVENTIONAL_ACCEPT_STATES: [&str; 3] = ["accept", "q_accept", "halt"];

const MAX_WINDOW: i64 = 1000;

/// A multi-tape Turing machine simulator.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  mtur-cli --template unary-addition
  mtur-cli --program copy.tm --tapes 2 --input abc --accept q1
  cat copy.tm | mtur-cli --tapes 2 --input abc --debug")]
struct Cli {
    /// The program file to execute. Program text can also be piped via stdin.
    #[clap(short, long, conflicts_with = "template")]
    program: Option<PathBuf>,

    /// Run a bundled template by id or name
    #[clap(short, long)]
    template: Option<String>,

    /// List the bundled templates and exit
    #[clap(long)]
    list_templates: bool,

    /// The input of each tape, in order. Missing inputs leave the tape blank.
    #[clap(short, long)]
    input: Vec<String>,

    /// Number of tapes (1 to 3)
    #[clap(long)]
    tapes: Option<usize>,

    /// The start state
    #[clap(long, default_value = DEFAULT_START_STATE)]
    start: String,

    /// An accept state. Can be given several times.
    #[clap(short, long)]
    accept: Vec<String>,

    /// The step ceiling
    #[clap(long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// Number of cells shown on each side of a head (0 to 1000)
    #[clap(short, long, default_value_t = 10, value_parser = clap::value_parser!(i64).range(0..=MAX_WINDOW))]
    window: i64,

    /// Print each step of the execution
    #[clap(short = 'd', long)]
    debug: bool,

    /// Print the final machine report as JSON
    #[clap(long)]
    json: bool,
}

/// A compiled program together with the defaults its source implies.
struct LoadedProgram {
    compilation: Compilation,
    tapes: Option<usize>,
    accept_states: Vec<String>,
    inputs: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if cli.list_templates {
        for id in TemplateManager::list_ids() {
            let Ok(template) = TemplateManager::get(id) else {
                continue;
            };
            println!(
                "{:<20} {} tape(s)  {}",
                template.id, template.tapes, template.description
            );
        }
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(Outcome::Accepted) => ExitCode::SUCCESS,
        Ok(Outcome::Halted) => ExitCode::from(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<Outcome, Box<dyn Error>> {
    let program = load_program(cli)?;

    for diagnostic in &program.compilation.diagnostics {
        eprintln!("warning: {}", diagnostic);
    }

    let tapes = cli.tapes.or(program.tapes).unwrap_or(MAX_TAPES);
    let accept_states = if !cli.accept.is_empty() {
        cli.accept.clone()
    } else if !program.accept_states.is_empty() {
        program.accept_states
    } else {
        CONVENTIONAL_ACCEPT_STATES.map(String::from).to_vec()
    };

    let config = MachineConfig {
        start_state: cli.start.clone(),
        tapes,
        max_steps: cli.max_steps,
        accept_states,
        ..MachineConfig::default()
    };
    let mut machine = Machine::with_config(&config)?;
    machine.load(&program.compilation.transitions);
    info!(
        "{} transitions over {} states",
        machine.transition_count(),
        machine.states().len()
    );

    let mut inputs = if cli.input.is_empty() {
        program.inputs
    } else {
        cli.input.clone()
    };
    if inputs.len() < tapes {
        inputs.resize(tapes, String::new());
    }
    machine.initialize_tapes(inputs.as_slice())?;

    let outcome = if cli.debug {
        trace_run(&mut machine, cli.window)?
    } else {
        machine.run()?
    };

    print!("{}", machine.visualize(cli.window));
    match outcome {
        Outcome::Accepted => println!(
            "ACCEPTED in state {} after {} steps",
            machine.current_state(),
            machine.step_count()
        ),
        Outcome::Halted => println!(
            "HALTED in state {} after {} steps (no transition)",
            machine.current_state(),
            machine.step_count()
        ),
    }

    if cli.json {
        let report = serde_json::json!({
            "outcome": outcome,
            "state": machine.current_state(),
            "steps": machine.step_count(),
            "tapes": machine.tape_statistics(),
            "diagnostics": program.compilation.diagnostics,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(outcome)
}

/// Loads the program from a template, a file or stdin, in that order.
fn load_program(cli: &Cli) -> Result<LoadedProgram, Box<dyn Error>> {
    if let Some(key) = &cli.template {
        let template = TemplateManager::get(key).map_err(|e| {
            format!(
                "{}. Available templates: {}",
                e,
                TemplateManager::list_ids().join(", ")
            )
        })?;
        return Ok(LoadedProgram {
            compilation: template.compile(),
            tapes: Some(template.tapes),
            accept_states: vec![template.accept_state.to_string()],
            inputs: template.sample_input.iter().map(|s| s.to_string()).collect(),
        });
    }

    let compilation = if let Some(path) = &cli.program {
        ProgramLoader::load_program(path)?
    } else if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        ProgramLoader::load_program_from_string(&buffer)?
    } else {
        return Err("No program given: use --program, --template or pipe program text".into());
    };

    Ok(LoadedProgram {
        compilation,
        tapes: None,
        accept_states: Vec::new(),
        inputs: Vec::new(),
    })
}

/// Runs the machine one step at a time, printing the machine after every step.
fn trace_run(machine: &mut Machine, window: i64) -> Result<Outcome, Box<dyn Error>> {
    let print_state = |machine: &Machine| {
        println!("{}", machine);
        print!("{}", machine.visualize(window));
    };

    print_state(machine);

    loop {
        if machine.is_accept_state() {
            println!("\nMachine accepted.");
            return Ok(Outcome::Accepted);
        }
        match machine.step()? {
            Step::Continue => print_state(machine),
            Step::Halt => {
                println!("\nMachine halted.");
                return Ok(Outcome::Halted);
            }
        }
    }
}
