use clap::Parser;
use elide_js::ast::Node;
use elide_js::{eliminate_vars_in_program, Outcome};
use std::fs::File;
use std::io::stdin;
use std::io::stdout;
use std::io::Read;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(
  name = "elide-js",
  about = "Redundant local-variable elimination over JavaScript-style ASTs"
)]
struct Cli {
  /// JSON-serialized program AST; omit for stdin.
  #[arg(short, long)]
  input: Option<PathBuf>,

  /// Output destination for the rewritten AST; omit for stdout.
  #[arg(short, long)]
  output: Option<PathBuf>,
}

fn exit_with_error(message: impl Into<String>) -> ! {
  eprintln!("error: {}", message.into());
  process::exit(1);
}

fn main() {
  let args = Cli::parse();

  let mut input = String::new();
  let mut input_file: Box<dyn Read> = match args.input.as_ref() {
    Some(p) => match File::open(p) {
      Ok(f) => Box::new(f),
      Err(err) => exit_with_error(format!("failed to open {}: {err}", p.display())),
    },
    None => Box::new(stdin()),
  };
  if let Err(err) = input_file.read_to_string(&mut input) {
    exit_with_error(format!("failed to read input: {err}"));
  }

  let mut program: Node = match serde_json::from_str(&input) {
    Ok(program) => program,
    Err(err) => exit_with_error(format!("input is not a valid AST: {err}")),
  };

  let reports = eliminate_vars_in_program(&mut program);
  for (index, report) in reports.iter().enumerate() {
    let name = report.name.as_deref().unwrap_or("<anonymous>");
    match report.outcome {
      Outcome::Eliminated(count) => eprintln!("function {index} ({name}): eliminated {count}"),
      Outcome::Skipped => eprintln!("function {index} ({name}): skipped"),
    }
  }

  let write_result = match args.output.as_ref() {
    Some(p) => match File::create(p) {
      Ok(f) => serde_json::to_writer(f, &program),
      Err(err) => exit_with_error(format!("failed to create {}: {err}", p.display())),
    },
    None => serde_json::to_writer(stdout(), &program),
  };
  if let Err(err) = write_result {
    exit_with_error(format!("failed to write output: {err}"));
  }
}
