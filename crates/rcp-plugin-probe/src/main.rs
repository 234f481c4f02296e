mod probe_config;
mod smoke;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, warn};
use rcp_plugin::entry_points::{Availability, EntryPoint};
use rcp_plugin::host::{AnyModule, LibrarySymbols, discover};

use probe_config::{MemoryOrderSetting, SystemSetting};
use smoke::{SmokeEvent, SmokeOptions};

#[derive(Parser)]
#[command(version, about = "Inspect and exercise RCP plugin libraries")]
struct Args {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Path to the probe config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the capability record and exported entry points of a plugin
    Info {
        /// Path to the plugin library
        library: PathBuf,
    },

    /// Discover every plugin library in one or more directories
    Scan {
        /// Directories to search; defaults to `plugin_dirs` from the config
        dirs: Vec<PathBuf>,
    },

    /// Initialize a plugin and drive it for a number of frames
    Smoke {
        /// Path to the plugin library
        library: PathBuf,

        /// Number of frames to run
        #[arg(long)]
        ticks: Option<u32>,

        /// Memory order to request
        #[arg(long, value_enum)]
        memory_order: Option<MemoryOrderSetting>,

        /// TV system reported to audio plugins
        #[arg(long, value_enum)]
        system: Option<SystemSetting>,

        /// Big-endian ROM image whose header is shown to the plugin
        #[arg(long)]
        rom: Option<PathBuf>,
    },
}

const LIBRARY_EXTENSIONS: [&str; 3] = ["dll", "so", "dylib"];

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config_path = args
        .config
        .unwrap_or_else(probe_config::default_probe_config_path);
    let config = probe_config::load_from_file(&config_path);

    let ok = match args.command {
        Command::Info { library } => info(&library),
        Command::Scan { dirs } => {
            let dirs = if dirs.is_empty() {
                config.plugin_dirs.clone()
            } else {
                dirs
            };
            scan(&dirs)
        }
        Command::Smoke {
            library,
            ticks,
            memory_order,
            system,
            rom,
        } => {
            let rom_header = match rom.map(|path| read_rom(&path)).transpose() {
                Ok(header) => header,
                Err(e) => {
                    error!("{e}");
                    return ExitCode::FAILURE;
                }
            };
            let opts = SmokeOptions {
                ticks: ticks.unwrap_or(config.smoke_ticks),
                memory_order: memory_order.unwrap_or(config.memory_order).order(),
                system: system.unwrap_or(config.system_type).system_type(),
                rom_header,
            };
            run_smoke(&library, opts)
        }
    };

    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn read_rom(path: &Path) -> Result<Vec<u8>, String> {
    std::fs::read(path).map_err(|e| format!("Failed to read ROM {}: {e}", path.display()))
}

fn open(path: &Path) -> Option<AnyModule> {
    // Loading runs the library's initializers; the user asked for this file.
    match unsafe { AnyModule::open(path) } {
        Ok(module) => Some(module),
        Err(e) => {
            error!("{}: {e}", path.display());
            None
        }
    }
}

fn info(path: &Path) -> bool {
    let Some(module) = open(path) else {
        return false;
    };
    let info = module.info();
    let shape = module.shape();
    println!("{}", path.display());
    println!("  name:     {}", info.name);
    println!("  category: {}", info.category);
    println!("  version:  {} ({shape})", info.version);
    if info.category.advertises_memory_modes() {
        println!(
            "  memory:   normal={} swapped={}",
            info.memory.normal, info.memory.swapped
        );
    }

    let source = match &module {
        AnyModule::Audio(m) => m.source(),
        AnyModule::Gfx(m) => m.source(),
        AnyModule::Controller(m) => m.source(),
    };
    for entry in EntryPoint::ALL {
        let availability = entry.availability(shape);
        if availability == Availability::Absent {
            continue;
        }
        let exported = source.lookup(entry.symbol()).is_some();
        let mark = match (availability, exported) {
            (_, true) => "yes",
            (Availability::Optional, false) => "no (optional)",
            _ => "MISSING",
        };
        println!("  {:<20} {mark}", entry.name());
    }
    true
}

fn is_library(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| LIBRARY_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

fn scan(dirs: &[PathBuf]) -> bool {
    if dirs.is_empty() {
        error!("No plugin directories given and none configured");
        return false;
    }

    let mut found = 0usize;
    for dir in dirs {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot read {}: {e}", dir.display());
                continue;
            }
        };
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_library(path))
            .collect();
        paths.sort();

        for path in paths {
            let library = match unsafe { LibrarySymbols::open(&path) } {
                Ok(library) => library,
                Err(e) => {
                    warn!("{e}");
                    continue;
                }
            };
            match discover(&library) {
                Ok(d) => {
                    found += 1;
                    println!(
                        "{:<10} {:<6} {:<40} {}",
                        d.info.category.name(),
                        d.info.version.to_string(),
                        d.info.name,
                        path.display()
                    );
                }
                Err(e) => warn!("{}: {e}", path.display()),
            }
        }
    }
    println!("{found} plugin(s) found");
    true
}

fn run_smoke(path: &Path, opts: SmokeOptions) -> bool {
    let Some(module) = open(path) else {
        return false;
    };
    println!("{}: {}", path.display(), module.info());

    let (handle, events) = smoke::spawn(module, opts);
    let mut ok = false;
    for event in events.iter() {
        match event {
            SmokeEvent::Initialized { order } => println!("initialized ({order:?} memory)"),
            SmokeEvent::Tick { tick, detail } => println!("  [{tick:>4}] {detail}"),
            SmokeEvent::Finished { ticks, interrupts } => {
                println!("finished {ticks} tick(s), {interrupts} interrupt request(s)");
                ok = true;
            }
            SmokeEvent::Failed(e) => error!("smoke test failed: {e}"),
        }
    }
    if handle.join().is_err() {
        error!("smoke worker panicked");
        return false;
    }
    ok
}
