use sim_lib::cpu::Policy;
use sim_lib::error::SimulatorResult;
use sim_lib::flags::DebugLevelArg;
use sim_lib::flags::SimArgs;
use sim_lib::run_wrapper;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> SimulatorResult<()> {
    let args = SimArgs::from_env_or_exit();

    tracing_subscriber::fmt()
        .with_max_level(args.debug_level.tracing_level())
        .with_writer(std::io::stderr)
        .init();

    let policy = Policy {
        mode: args.mode.into(),
        step: args.debug_level == DebugLevelArg::Debug,
    };

    run_wrapper::run(&args.memory_image, &args.output_file, policy)
}
