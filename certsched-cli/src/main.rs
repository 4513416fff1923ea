//! certsched CLI - inspect and transform certificate schedules from the command line.

use clap::{Parser, Subcommand, ValueEnum};
use certsched::{
    bulk_infill, calculate_phase_balance, detect_three_pole_groups, format_boards_for_form_data,
    ingest_proposals, migrate_to_multi_board, CircuitProposal, InfillMode, Schedule,
};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "certsched")]
#[command(about = "Schedule of Test Results engine for EICR/EIC certificates", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show boards, circuits and completion for a schedule file
    Status {
        /// Path to a form-data JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Ingest AI circuit proposals into a schedule
    Ingest {
        /// Path to a form-data JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Path to a JSON array of circuit proposals
        #[arg(value_name = "PROPOSALS")]
        proposals: PathBuf,

        /// Restrict blank-slot filling to one board id
        #[arg(long)]
        board: Option<String>,

        /// Write the updated schedule back (to FILE, or --output)
        #[arg(short, long)]
        write: bool,

        /// Write the updated schedule to this path instead of FILE
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short = 'F', long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Apply one value to the fillable fields of every circuit
    Infill {
        /// Path to a form-data JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// The value to write
        #[arg(value_name = "VALUE")]
        value: String,

        /// Overwrite policy
        #[arg(short, long, value_enum, default_value = "empty")]
        mode: FillMode,

        /// Write the updated schedule back (to FILE, or --output)
        #[arg(short, long)]
        write: bool,

        /// Write the updated schedule to this path instead of FILE
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report three-phase load balance for a schedule
    Balance {
        /// Path to a form-data JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Exit with error code when imbalance exceeds the threshold
        #[arg(long)]
        fail_on_imbalance: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for scripting
    Json,
}

#[derive(Clone, ValueEnum)]
enum FillMode {
    /// Overwrite every fillable field
    All,
    /// Fill only empty fields
    Empty,
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Status { file, format } => handle_status(&file, format),
        Commands::Ingest {
            file,
            proposals,
            board,
            write,
            output,
            format,
        } => handle_ingest(&file, &proposals, board.as_deref(), write, output, format),
        Commands::Infill {
            file,
            value,
            mode,
            write,
            output,
        } => handle_infill(&file, &value, mode, write, output),
        Commands::Balance {
            file,
            format,
            fail_on_imbalance,
        } => handle_balance(&file, format, fail_on_imbalance),
    };

    process::exit(exit_code);
}

fn load_schedule(file: &Path) -> Result<Schedule, String> {
    let raw = fs::read_to_string(file).map_err(|e| format!("{}: {e}", file.display()))?;
    let form_data: Value =
        serde_json::from_str(&raw).map_err(|e| format!("{}: {e}", file.display()))?;
    let (boards, circuits) = migrate_to_multi_board(&form_data).map_err(|e| e.to_string())?;
    if circuits.is_empty() {
        let mut schedule = Schedule::default();
        schedule.boards = boards;
        Ok(schedule)
    } else {
        Ok(Schedule::from_parts(circuits, boards))
    }
}

fn save_schedule(schedule: &Schedule, path: &Path) -> Result<(), String> {
    let mut form = serde_json::Map::new();
    form.extend(format_boards_for_form_data(&schedule.boards));
    form.insert(
        "scheduleOfTests".to_string(),
        serde_json::to_value(&schedule.circuits).map_err(|e| e.to_string())?,
    );
    let text = serde_json::to_string_pretty(&Value::Object(form)).map_err(|e| e.to_string())?;
    fs::write(path, text).map_err(|e| format!("{}: {e}", path.display()))
}

fn handle_status(file: &Path, format: OutputFormat) -> i32 {
    let schedule = match load_schedule(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };
    let stats = schedule.completion_stats();

    match format {
        OutputFormat::Json => {
            let boards: Vec<Value> = schedule
                .boards_ordered()
                .iter()
                .map(|b| {
                    json!({
                        "id": b.id,
                        "name": b.name,
                        "circuits": schedule.circuits_for_board(&b.id).len(),
                    })
                })
                .collect();
            let out = json!({
                "boards": boards,
                "total": stats.total,
                "completed": stats.completed,
                "pending": stats.pending,
                "percent": stats.percent,
            });
            println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        }
        OutputFormat::Human => {
            println!("Schedule: {}", file.display());
            for board in schedule.boards_ordered() {
                let circuits = schedule.circuits_for_board(&board.id);
                println!("\n  {} ({} circuits)", board.name, circuits.len());
                for circuit in circuits {
                    let state = if circuit.is_complete() {
                        "complete"
                    } else if circuit.is_blank() {
                        "blank"
                    } else {
                        "pending"
                    };
                    let description = if circuit.circuit_description.is_empty() {
                        "-"
                    } else {
                        &circuit.circuit_description
                    };
                    println!(
                        "    {:<4} {:<30} {}",
                        circuit.circuit_designation, description, state
                    );
                }
            }
            println!(
                "\n  {} of {} complete ({}%)",
                stats.completed, stats.total, stats.percent
            );
        }
    }
    0
}

fn handle_ingest(
    file: &Path,
    proposals_path: &Path,
    board: Option<&str>,
    write: bool,
    output: Option<PathBuf>,
    format: OutputFormat,
) -> i32 {
    let mut schedule = match load_schedule(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };
    let proposals: Vec<CircuitProposal> = match fs::read_to_string(proposals_path)
        .map_err(|e| format!("{}: {e}", proposals_path.display()))
        .and_then(|raw| serde_json::from_str(&raw).map_err(|e| e.to_string()))
    {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    if let Some(board_id) = board {
        if schedule.board(board_id).is_none() {
            eprintln!("Error: board '{board_id}' not found");
            return 1;
        }
    }

    let summary = ingest_proposals(&mut schedule, &proposals, board);

    match format {
        OutputFormat::Json => {
            let out = json!({
                "filled": summary.filled,
                "appended": summary.appended,
                "circuits": schedule.circuits.len(),
            });
            println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        }
        OutputFormat::Human => {
            println!(
                "Ingested {} proposals: {} blank rows filled, {} circuits appended",
                proposals.len(),
                summary.filled,
                summary.appended
            );
        }
    }

    if write {
        let target = output.unwrap_or_else(|| file.to_path_buf());
        if let Err(e) = save_schedule(&schedule, &target) {
            eprintln!("Error: {e}");
            return 1;
        }
    }
    0
}

fn handle_infill(
    file: &Path,
    value: &str,
    mode: FillMode,
    write: bool,
    output: Option<PathBuf>,
) -> i32 {
    let mut schedule = match load_schedule(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };
    let mode = match mode {
        FillMode::All => InfillMode::All,
        FillMode::Empty => InfillMode::EmptyOnly,
    };
    let writes = bulk_infill(&mut schedule, value, mode);
    println!(
        "Wrote \"{value}\" to {writes} fields across {} circuits",
        schedule.circuits.len()
    );

    if write {
        let target = output.unwrap_or_else(|| file.to_path_buf());
        if let Err(e) = save_schedule(&schedule, &target) {
            eprintln!("Error: {e}");
            return 1;
        }
    }
    0
}

fn handle_balance(file: &Path, format: OutputFormat, fail_on_imbalance: bool) -> i32 {
    let schedule = match load_schedule(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };
    let balance = calculate_phase_balance(&schedule.circuits);
    let groups = detect_three_pole_groups(&schedule.circuits);

    match format {
        OutputFormat::Json => {
            let out = json!({
                "balance": balance,
                "groups": groups,
            });
            println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        }
        OutputFormat::Human => {
            println!(
                "Phase loads: L1 {:.1}A  L2 {:.1}A  L3 {:.1}A",
                balance.l1, balance.l2, balance.l3
            );
            match balance.imbalance_percent {
                Some(percent) => println!(
                    "Imbalance: {percent:.1}% ({})",
                    if balance.is_compliant {
                        "compliant"
                    } else {
                        "exceeds 10% threshold"
                    }
                ),
                None => println!("Imbalance: no load recorded"),
            }
            println!("Estimated neutral current: {:.1}A", balance.neutral_current);
            if let Some(warning) = &balance.warning {
                println!("Warning: {warning}");
            }
            if !groups.is_empty() {
                println!("\n3-pole groups:");
                for group in &groups {
                    println!(
                        "  {} ({}A) ways {}-{}-{}",
                        group.label, group.rating, group.positions[0], group.positions[1],
                        group.positions[2]
                    );
                }
            }
        }
    }

    if fail_on_imbalance && !balance.is_compliant {
        return 1;
    }
    0
}
