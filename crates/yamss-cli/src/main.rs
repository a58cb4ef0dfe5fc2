use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use yamss_config::build_runner;

fn usage() {
    eprintln!("usage: yamss <config.json> [--output DIR]");
    eprintln!("       yamss - [--output DIR]   (reads the config document from stdin)");
}

/// Reads a config document, builds a runner from it, and runs it start to
/// finish. Mirrors `original_source/src/yamss.cpp`'s `main()`: every error
/// is caught, reported as `ERROR: <message>` on stderr, and the process
/// still exits 0 -- matching the upstream convention exactly rather than
/// adopting a conventional nonzero-on-failure CLI.
fn run(args: &[String]) -> Result<(), String> {
    let mut positional = Vec::new();
    let mut output_dir = PathBuf::from("yamss-output");
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--output" => {
                let dir = iter.next().ok_or("--output requires a directory argument")?;
                output_dir = PathBuf::from(dir);
            }
            other => positional.push(other.to_string()),
        }
    }

    let source = positional.first().ok_or("missing config document argument")?;
    let document = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| e.to_string())?;
        buf
    } else {
        std::fs::read_to_string(source).map_err(|e| format!("{source}: {e}"))?
    };

    let config: yamss_config::RunnerConfig =
        serde_json::from_str(&document).map_err(|e| e.to_string())?;
    let mut runner = build_runner(&config, &output_dir).map_err(|e| e.to_string())?;

    runner.initialize().map_err(|e| e.to_string())?;
    runner.run().map_err(|e| e.to_string())?;
    runner.finalize().map_err(|e| e.to_string())?;

    for file in runner.files() {
        println!("wrote {file}");
    }
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        usage();
        return ExitCode::SUCCESS;
    }
    if let Err(message) = run(&args) {
        eprintln!("ERROR: {message}");
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_argument_is_reported_not_panicked() {
        let result = run(&["--output".to_string(), "/tmp/out".to_string()]);
        assert!(result.is_err());
    }

    #[test]
    fn unreadable_path_is_reported_as_an_error() {
        let result = run(&["/no/such/path.json".to_string()]);
        assert!(result.is_err());
    }
}
