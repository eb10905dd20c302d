use anyhow::{anyhow, Context};
use std::io::Read;
use std::path::PathBuf;
use structopt::StructOpt;
use tile_alloc::{InstructionPolicy, MachineDescription, Tile};
use tracing_subscriber::EnvFilter;

mod plan;

#[derive(Debug, StructOpt)]
#[structopt(name = "drasm")]
/// Replay a placement plan against a single tile and print where
/// each instruction, array and register lands.
struct Opt {
    /// Read the tile capacities from this `key = value` description
    #[structopt(long = "machine", parse(from_os_str))]
    machine: Option<PathBuf>,

    /// Number of instruction slots per tile
    #[structopt(long = "code-mem-depth")]
    code_mem_depth: Option<usize>,

    /// Number of data memory words per tile
    #[structopt(long = "data-mem-depth")]
    data_mem_depth: Option<usize>,

    /// Number of registers per tile
    #[structopt(long = "register-count")]
    register_count: Option<usize>,

    /// Instruction placement: positional or cycle-ordered
    #[structopt(long = "policy", default_value = "cycle-ordered")]
    policy: InstructionPolicy,

    /// The plan to replay.  Read from stdin if omitted.
    #[structopt(parse(from_os_str))]
    plan: Option<PathBuf>,
}

impl Opt {
    fn machine(&self) -> anyhow::Result<MachineDescription> {
        let file = match &self.machine {
            Some(path) => Some(
                std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?
                    .parse::<MachineDescription>()
                    .with_context(|| format!("parsing {}", path.display()))?,
            ),
            None => None,
        };
        resolve_machine(
            file,
            self.code_mem_depth,
            self.data_mem_depth,
            self.register_count,
        )
    }

    fn plan_text(&self) -> anyhow::Result<String> {
        match &self.plan {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display())),
            None => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .context("reading plan from stdin")?;
                Ok(text)
            }
        }
    }
}

/// Combine the machine file with the capacity flags.  Flags win; a
/// capacity that neither supplies is an error.
fn resolve_machine(
    file: Option<MachineDescription>,
    code_mem_depth: Option<usize>,
    data_mem_depth: Option<usize>,
    register_count: Option<usize>,
) -> anyhow::Result<MachineDescription> {
    let code_mem_depth = code_mem_depth
        .or_else(|| file.map(|m| m.code_mem_depth))
        .ok_or_else(|| anyhow!("missing code_mem_depth: pass --code-mem-depth or --machine"))?;
    let data_mem_depth = data_mem_depth
        .or_else(|| file.map(|m| m.data_mem_depth))
        .ok_or_else(|| anyhow!("missing data_mem_depth: pass --data-mem-depth or --machine"))?;
    let register_count = register_count
        .or_else(|| file.map(|m| m.register_count))
        .ok_or_else(|| anyhow!("missing register_count: pass --register-count or --machine"))?;
    Ok(MachineDescription::new(
        code_mem_depth,
        data_mem_depth,
        register_count,
    ))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(opt: &Opt) -> anyhow::Result<()> {
    let machine = opt.machine()?;
    let plan = plan::parse_plan(&opt.plan_text()?)?;
    tracing::info!(?machine, policy = %opt.policy, requests = plan.len(), "replaying plan");

    let mut tile = Tile::new(&machine, opt.policy);
    for placement in plan::replay(&mut tile, &plan)? {
        println!("{}", placement);
    }
    Ok(())
}

fn main() {
    init_tracing();
    let opt = Opt::from_args();
    if let Err(err) = run(&opt) {
        for item in err.chain() {
            eprintln!("drasm: {}", item);
        }
        std::process::exit(1);
    }
}
