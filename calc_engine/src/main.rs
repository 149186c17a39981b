use calc_engine::config::runtime::{parse_log_level, LogLevel, RuntimeConfig};
use calc_engine::pipeline::{
    self, ArithmeticRequest, CalculationOutput, PipelineError, PipelineResult, ScientificRequest,
};
use calc_engine::utils::SourceMap;
use calc_engine::{batch, logging, session};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Evaluate(String),
    Function { name: String, value: f64 },
    Request(String),
    Keys(String),
    Batch(PathBuf),
    ConfigInfo,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    command: Command,
    config_path: Option<PathBuf>,
    log_level: Option<LogLevel>,
    json: bool,
    pretty: bool,
    threads: Option<usize>,
    sequential: bool,
    fail_fast: bool,
    progress: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("calc_engine");

    let options = match parse_args(&args[1.min(args.len())..]) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("Usage: {} <expression> [options]", program);
            eprintln!("       {} --help", program);
            std::process::exit(2);
        }
    };

    if options.command == Command::Help {
        print_help(program);
        return Ok(());
    }

    let runtime = load_runtime_config(&options)?;

    logging::config::init_runtime_preferences(runtime.logging.clone())?;
    logging::init_global_logging()?;
    pipeline::validate_pipeline()?;

    let exit_code = match &options.command {
        Command::Evaluate(expression) => run_expression(expression, &runtime),
        Command::Function { name, value } => run_function(name, *value, &runtime),
        Command::Request(body) => run_request(body, &runtime),
        Command::Keys(keys) => run_keys(keys, &runtime),
        Command::Batch(path) => run_batch(path, &runtime),
        Command::ConfigInfo => {
            print_config_info(&runtime)?;
            0
        }
        Command::Help => 0,
    };

    if exit_code != 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}

fn parse_args(args: &[String]) -> Result<CliOptions, String> {
    let mut command = None;
    let mut options = CliOptions {
        command: Command::Help,
        config_path: None,
        log_level: None,
        json: false,
        pretty: false,
        threads: None,
        sequential: false,
        fail_fast: false,
        progress: false,
    };

    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "--help" | "-h" => return Ok(options),
            "--config-info" => set_command(&mut command, Command::ConfigInfo)?,
            "--function" => {
                let name = value_of(args, i, arg)?;
                let raw_value = args
                    .get(i + 2)
                    .ok_or_else(|| "--function requires a name and a value".to_string())?;
                let value = raw_value
                    .parse::<f64>()
                    .map_err(|_| format!("Invalid function value '{}'", raw_value))?;
                set_command(
                    &mut command,
                    Command::Function {
                        name: name.to_string(),
                        value,
                    },
                )?;
                i += 2;
            }
            "--request" => {
                set_command(&mut command, Command::Request(value_of(args, i, arg)?.to_string()))?;
                i += 1;
            }
            "--keys" => {
                set_command(&mut command, Command::Keys(value_of(args, i, arg)?.to_string()))?;
                i += 1;
            }
            "--batch" => {
                set_command(&mut command, Command::Batch(PathBuf::from(value_of(args, i, arg)?)))?;
                i += 1;
            }
            "--config" => {
                options.config_path = Some(PathBuf::from(value_of(args, i, arg)?));
                i += 1;
            }
            "--log-level" => {
                let raw = value_of(args, i, arg)?;
                options.log_level =
                    Some(parse_log_level(raw).ok_or_else(|| format!("Invalid log level '{}'", raw))?);
                i += 1;
            }
            "--threads" => {
                let raw = value_of(args, i, arg)?;
                let threads = raw
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid thread count '{}'", raw))?;
                options.threads = Some(threads);
                i += 1;
            }
            "--json" => options.json = true,
            "--pretty" => {
                options.json = true;
                options.pretty = true;
            }
            "--sequential" => options.sequential = true,
            "--fail-fast" => options.fail_fast = true,
            "--progress" => options.progress = true,
            _ if arg.starts_with("--") => return Err(format!("Unknown option '{}'", arg)),
            // `-5+3` is an expression, not a flag
            _ => set_command(&mut command, Command::Evaluate(arg.to_string()))?,
        }
        i += 1;
    }

    options.command =
        command.ok_or_else(|| "Missing expression, --function, --request, --keys or --batch".to_string())?;
    Ok(options)
}

fn set_command(slot: &mut Option<Command>, next: Command) -> Result<(), String> {
    if slot.is_some() {
        return Err("Only one calculation may be given per invocation".to_string());
    }
    *slot = Some(next);
    Ok(())
}

fn value_of<'a>(args: &'a [String], index: usize, flag: &str) -> Result<&'a str, String> {
    args.get(index + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires a value", flag))
}

fn load_runtime_config(options: &CliOptions) -> Result<RuntimeConfig, Box<dyn std::error::Error>> {
    let mut runtime = match &options.config_path {
        Some(path) => RuntimeConfig::from_file(path)?,
        None => RuntimeConfig::default(),
    };

    if let Some(level) = options.log_level {
        runtime.logging.min_log_level = level;
    }
    if options.json {
        runtime.output.json_output = true;
    }
    if options.pretty {
        runtime.output.pretty_json = true;
    }
    if let Some(threads) = options.threads {
        runtime.batch.max_threads = threads;
    }
    if options.sequential {
        runtime.batch.max_threads = 1;
    }
    if options.fail_fast {
        runtime.batch.fail_fast = true;
    }
    if options.progress {
        runtime.batch.progress_reporting = true;
    }

    Ok(runtime)
}

fn print_help(program_name: &str) {
    println!("Calculator Engine v{}", env!("CARGO_PKG_VERSION"));
    println!("Safe arithmetic evaluation and scientific functions");
    println!();
    println!("USAGE:");
    println!("    {} <expression> [options]", program_name);
    println!("    {} --function <name> <value> [options]", program_name);
    println!("    {} --request '<json body>'", program_name);
    println!("    {} --keys <keypad sequence>", program_name);
    println!("    {} --batch <file> [options]", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --help              Show this help message");
    println!("    --json              Print results as JSON bodies");
    println!("    --pretty            Pretty-print JSON output (implies --json)");
    println!("    --config FILE       Load runtime preferences from a TOML file");
    println!("    --log-level LEVEL   error, warn, info or debug");
    println!("    --config-info       Show limits and effective preferences");
    println!();
    println!("BATCH OPTIONS:");
    println!("    --threads N         Worker threads (0 = available parallelism)");
    println!("    --sequential        Evaluate lines one at a time");
    println!("    --fail-fast         Stop at the first failing line");
    println!("    --progress          Report progress on stderr");
    println!();
    println!("KEYPAD:");
    println!("    0-9 . + - * / ( ) =   digits, operators and equals");
    println!("    c e <                 clear, clear entry, backspace");
    println!();
    println!("EXAMPLES:");
    println!("    {} '2+3*4'", program_name);
    println!("    {} --function sin 30", program_name);
    println!(
        "    {} --request '{{\"expression\": \"(2+3)*4\"}}'",
        program_name
    );
    println!("    {} --keys '12+3='", program_name);
    println!("    {} --batch expressions.txt --threads 4", program_name);
    println!();

    let pipeline_info = pipeline::get_pipeline_info();
    println!("PIPELINE CAPABILITIES:");
    for line in pipeline_info.report().lines() {
        println!("    {}", line);
    }
}

fn print_config_info(runtime: &RuntimeConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", pipeline::get_pipeline_info().report());
    println!();
    println!("{}", batch::get_batch_info().summary());
    println!();
    println!("{}", logging::config::get_config_summary());
    println!();
    println!("Effective runtime preferences:");
    println!("{}", runtime.to_toml_string()?);
    Ok(())
}

fn emit(outcome: &Result<PipelineResult, PipelineError>, source: Option<&str>, runtime: &RuntimeConfig) -> i32 {
    if runtime.output.json_output {
        let output = CalculationOutput::from(outcome);
        match output.to_json(runtime.output.pretty_json) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: cannot serialize output: {}", e);
                return 1;
            }
        }
        return if output.is_success() { 0 } else { 1 };
    }

    match outcome {
        Ok(result) => {
            println!("{}", result.rendered);
            0
        }
        Err(error) => {
            print_detailed_error(error, source);
            1
        }
    }
}

fn print_detailed_error(error: &PipelineError, source: Option<&str>) {
    match (error.span(), source) {
        (Some(span), Some(source)) => {
            let source_map = SourceMap::new(source);
            eprint!("{}", source_map.format_error(&span, &error.user_message()));
            eprintln!("  = note: {} [{}]", error, error.error_code());
        }
        _ => {
            eprintln!("error: {}", error.user_message());
            eprintln!("  = note: {} [{}]", error, error.error_code());
        }
    }
}

fn run_expression(expression: &str, runtime: &RuntimeConfig) -> i32 {
    let outcome = pipeline::calculate_with_config(
        &ArithmeticRequest {
            expression: expression.to_string(),
        },
        runtime,
    );
    emit(&outcome, Some(expression), runtime)
}

fn run_function(name: &str, value: f64, runtime: &RuntimeConfig) -> i32 {
    let outcome = pipeline::scientific_with_config(
        &ScientificRequest {
            function: name.to_string(),
            value,
        },
        runtime,
    );
    emit(&outcome, None, runtime)
}

fn run_request(body: &str, runtime: &RuntimeConfig) -> i32 {
    let response = pipeline::handle_json_request(body, runtime);
    match response.body.to_json(runtime.output.pretty_json) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: cannot serialize response: {}", e);
            return 1;
        }
    }
    if response.status == 200 {
        0
    } else {
        1
    }
}

fn run_keys(keys: &str, runtime: &RuntimeConfig) -> i32 {
    let actions = match session::parse_keys(keys) {
        Ok(actions) => actions,
        Err(key) => {
            eprintln!("error: unsupported key '{}'", key);
            return 2;
        }
    };

    let state = session::run(actions);

    if runtime.output.json_output {
        let json = if runtime.output.pretty_json {
            serde_json::to_string_pretty(&state)
        } else {
            serde_json::to_string(&state)
        };
        return match json {
            Ok(json) => {
                println!("{}", json);
                0
            }
            Err(e) => {
                eprintln!("Error: cannot serialize session: {}", e);
                1
            }
        };
    }

    match &state.error {
        Some(message) => {
            eprintln!("error: {}", message);
            1
        }
        None => {
            println!("{}", state.display);
            0
        }
    }
}

fn run_batch(path: &Path, runtime: &RuntimeConfig) -> i32 {
    let results = match batch::process_file(path, runtime) {
        Ok(results) => results,
        Err(error) => {
            eprintln!("error: {} [{}]", error, error.error_code());
            logging::print_cargo_style_summary();
            return 1;
        }
    };

    let outputs = results.outputs();
    if runtime.output.json_output {
        let lines: Vec<serde_json::Value> = outputs
            .iter()
            .map(|(line, output)| serde_json::json!({ "line": line, "output": output }))
            .collect();
        let json = if runtime.output.pretty_json {
            serde_json::to_string_pretty(&lines)
        } else {
            serde_json::to_string(&lines)
        };
        match json {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: cannot serialize batch output: {}", e);
                return 1;
            }
        }
    } else {
        for (line, output) in &outputs {
            match output {
                CalculationOutput::Success { result } => println!("{}: {}", line, result),
                CalculationOutput::Failure { error } => println!("{}: error: {}", line, error),
            }
        }
    }

    eprintln!("{}", results.summary());
    logging::print_cargo_style_summary();

    if results.failure_count() > 0 {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_expression() {
        let options = parse_args(&args(&["2+3*4", "--json"])).unwrap();
        assert_eq!(options.command, Command::Evaluate("2+3*4".to_string()));
        assert!(options.json);
        assert!(!options.pretty);

        let options = parse_args(&args(&["-5+3"])).unwrap();
        assert_eq!(options.command, Command::Evaluate("-5+3".to_string()));
    }

    #[test]
    fn test_parse_function_and_batch_options() {
        let options = parse_args(&args(&["--function", "sqrt", "16", "--pretty"])).unwrap();
        assert_eq!(
            options.command,
            Command::Function {
                name: "sqrt".to_string(),
                value: 16.0
            }
        );
        assert!(options.json && options.pretty);

        let options = parse_args(&args(&[
            "--batch",
            "lines.txt",
            "--threads",
            "4",
            "--fail-fast",
            "--log-level",
            "debug",
        ]))
        .unwrap();
        assert_eq!(options.command, Command::Batch(PathBuf::from("lines.txt")));
        assert_eq!(options.threads, Some(4));
        assert!(options.fail_fast);
        assert_eq!(options.log_level, Some(LogLevel::Debug));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["--threads", "many", "1+1"])).is_err());
        assert!(parse_args(&args(&["--function", "sin"])).is_err());
        assert!(parse_args(&args(&["--unknown"])).is_err());
        assert!(parse_args(&args(&["1+1", "2+2"])).is_err());
        assert_eq!(
            parse_args(&args(&["--help"])).unwrap().command,
            Command::Help
        );
    }

    #[test]
    fn test_runtime_overrides() {
        let options = parse_args(&args(&["1+1", "--sequential", "--json"])).unwrap();
        let runtime = load_runtime_config(&options).unwrap();
        assert_eq!(runtime.batch.max_threads, 1);
        assert!(runtime.output.json_output);
    }
}
