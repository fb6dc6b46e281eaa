use clap::{App, Arg, ArgMatches};
use slog::{o, Discard, Drain, Logger};
use slog_term::{FullFormat, TermDecorator};

use legv8::{
    assembler::{Parser, Program},
    config::Config,
    cpu::{Cpu, RunOutcome},
    error::{ParseError, StepError},
    event::Event,
    instruction::Register,
    parsing,
};

enum Error {
    Parse(ParseError),
    Execution(StepError),
    Argument(String),
    IO(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::IO(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Error {
        Error::Parse(e)
    }
}

impl From<StepError> for Error {
    fn from(e: StepError) -> Error {
        Error::Execution(e)
    }
}

fn parse_arguments() -> ArgMatches<'static> {
    App::new("legv8run")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Utility for assembling and executing LEGv8 programs")
        .arg(Arg::with_name("source")
             .help("File containing LEGv8 assembly")
             .value_name("SOURCE")
             .required(true)
             .index(1))
        .arg(Arg::with_name("max-instructions")
             .help("Stop after executing this many instructions")
             .short("n")
             .long("max-instructions")
             .value_name("COUNT")
             .takes_value(true))
        .arg(Arg::with_name("memory")
             .help("Size of the memory in bytes")
             .short("m")
             .long("memory")
             .value_name("BYTES")
             .takes_value(true))
        .arg(Arg::with_name("trace")
             .help("Print every executed instruction and its effects")
             .short("t")
             .long("trace"))
        .arg(Arg::with_name("verbose")
             .help("Log the assembler and the CPU to the terminal")
             .short("v")
             .long("verbose"))
        .get_matches()
}

fn main() {
    let args = parse_arguments();

    let result = run(&args);

    match result {
        Ok(()) => (),
        Err(Error::IO(io)) => eprintln!("IO error: {}", io),
        Err(Error::Argument(message)) => eprintln!("{}", message),
        Err(Error::Execution(error)) => eprintln!("Execution error: {}", error),
        Err(Error::Parse(error)) => {
            eprintln!("Parse error:");

            for line_error in error.errors() {
                eprintln!("  {}", line_error);
            }
        },
    }
}

fn create_logger(verbose: bool) -> Logger {
    if !verbose {
        return Logger::root(Discard, o!());
    }

    let decorator = TermDecorator::new().build();
    let drain = FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    Logger::root(drain, o!())
}

/// Reads a non-negative integer option, accepting the same literals as the assembler.
fn number_option(args: &ArgMatches, name: &str, default: u64) -> Result<u64, Error> {
    let value = match args.value_of(name) {
        Some(value) => value,
        None => return Ok(default),
    };

    match parsing::immediate(value) {
        Some(number) if number >= 0 => Ok(number as u64),
        _ => Err(Error::Argument(format!("invalid value for --{}: {}", name, value))),
    }
}

fn trace_listener(program: Program) -> impl Fn(&Event) {
    move |event: &Event| match event {
        Event::Step { line, pc } => {
            let text = program.instructions()
                .iter()
                .find(|instruction| instruction.line == *line)
                .map(ToString::to_string)
                .unwrap_or_default();

            println!("{:>5}  {:<28} -> 0x{:04x}", line, text, pc);
        },
        Event::RegisterChange { register, value } => {
            println!("{:>7}{} = {}", "", register, value);
        },
        Event::MemoryChange { address, access, value } => {
            println!("{:>7}[0x{:04x}] {} {}", "", address, access, value);
        },
        Event::Halted { pc } => println!("halted at 0x{:04x}", pc),
    }
}

fn print_state(cpu: &Cpu) {
    let state = cpu.get_state();

    println!(
        "pc = 0x{:04x}, {} instructions, {} cycles",
        state.pc,
        state.instruction_count,
        state.cycle_count,
    );

    println!("flags: {}", state.flags);

    for (index, value) in state.registers.iter().enumerate() {
        if *value == 0 {
            continue;
        }

        let register = match Register::new(index) {
            Some(register) => register,
            None => continue,
        };

        match register.alias() {
            Some(alias) => println!("{:>3} ({:>3}) = {} (0x{:x})", register, alias, value, value),
            None => println!("{:>3}       = {} (0x{:x})", register, value, value),
        }
    }

    let used = cpu.memory.get_used_addresses();

    if let (Some(&first), Some(&last)) = (used.first(), used.last()) {
        println!("memory:");

        for (address, word) in cpu.memory.dump(first, last - first + 1) {
            println!("  [0x{:04x}] {} (0x{:08x})", address, word, word);
        }
    }
}

fn run(args: &ArgMatches) -> Result<(), Error> {
    let file_path = args.value_of("source").unwrap();
    let source = std::fs::read_to_string(file_path)?;

    let defaults = Config::default();
    let config = Config::default()
        .memory_capacity(number_option(args, "memory", defaults.memory_capacity)?)
        .instruction_limit(number_option(args, "max-instructions", defaults.instruction_limit)?);

    let logger = create_logger(args.is_present("verbose"))
        .new(o!("source" => file_path.to_string()));

    let program = Parser::with_logger(logger.clone()).parse(&source)?;

    let mut cpu = Cpu::with_config(config);
    cpu.set_logger(logger);

    if args.is_present("trace") {
        cpu.add_listener(trace_listener(program.clone()));
    }

    let summary = cpu.run(&program)?;

    if summary.outcome == RunOutcome::LimitReached {
        eprintln!("Stopped after {} instructions, the program did not finish", summary.steps);
    }

    print_state(&cpu);

    Ok(())
}
