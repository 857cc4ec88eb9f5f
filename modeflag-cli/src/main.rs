mod config;
mod logger;

use std::process;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use modeflag_lib::{
    FlagSet, LogMessage, Logger, Mode, ModeFlag, ModeGate, Policy, Severity, SettableEnum,
    TracingLogger,
};
use serde_json::json;

use crate::config::ModeflagConfig;
use crate::logger::StderrLogger;

#[derive(Parser, Debug)]
#[command(name = "modeflag")]
#[command(version)]
#[command(about = "Mode flags and mode-gated logging", long_about = None)]
struct Args {
    /// Mode to run in; must be one of the configured allowed modes
    #[arg(short = 'm', long = "mode", global = true)]
    mode: Option<String>,

    /// Path to config file
    #[arg(short = 'c', long = "config", default_value = "modeflag.toml", global = true)]
    config: String,

    /// Tracing filter for the tool's own diagnostics
    #[arg(long = "log-level", default_value = "warn", global = true)]
    log_level: String,

    /// Print JSON instead of text
    #[arg(long = "json", global = true)]
    json: bool,

    #[command(subcommand)]
    cmd: Command,
}

/// Severity names accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SeverityArg {
    Info,
    Error,
    #[value(alias = "warn")]
    Warning,
    Debug,
    Critical,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Info => Severity::Info,
            SeverityArg::Error => Severity::Error,
            SeverityArg::Warning => Severity::Warning,
            SeverityArg::Debug => Severity::Debug,
            SeverityArg::Critical => Severity::Critical,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a starter modeflag.toml
    Init,
    /// Show the active mode and its predicates
    Show,
    /// Print the mode flag usage line
    Usage,
    /// Print the effective policy table
    Policy,
    /// Report whether each severity is forwarded in the active mode
    Check {
        #[arg(required = true, ignore_case = true)]
        severities: Vec<SeverityArg>,
    },
    /// Send one message through the mode gate
    Log {
        #[arg(ignore_case = true)]
        severity: SeverityArg,

        header: String,

        details: Vec<String>,

        #[arg(short = 's', long = "subheader")]
        subheader: Option<String>,

        /// Forward to tracing instead of writing to stderr directly
        #[arg(long = "tracing")]
        tracing: bool,
    },
    /// Parse raw `-m value` style arguments with the built-in flag set.
    /// Put them after `--` so they are not taken as this tool's own options.
    Parse {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

const INIT_CONFIG: &str = r#"# Mode flag configuration
[mode]
default = "dev"
allowed = ["dev", "prod", "debug", "migrate"]

# Severities forwarded per mode. Rows listed here replace the built-in
# row for that mode; modes without a row forward nothing.
[policy]
migrate = ["info", "error", "warning", "critical"]
"#;

/// Everything the commands need, built once at startup.
struct Runtime {
    mode: ModeFlag,
    policy: Policy,
    json: bool,
}

fn run_init(path: &str) {
    if std::path::Path::new(path).exists() {
        eprintln!("{} already exists", path);
        process::exit(1);
    }
    std::fs::write(path, INIT_CONFIG).unwrap_or_else(|e| {
        eprintln!("Failed to create {}: {}", path, e);
        process::exit(1);
    });
    println!("Created {}", path);
}

fn run_show(rt: &Runtime) {
    let flag = rt.mode.as_flag();
    if rt.json {
        let predicates: serde_json::Map<String, serde_json::Value> = flag
            .allowed()
            .iter()
            .map(|tag| (tag.clone(), json!(rt.mode.is(&Mode::new(tag.as_str())))))
            .collect();
        let out = json!({
            "mode": rt.mode.value(),
            "default": flag.default_value(),
            "allowed": flag.allowed(),
            "set": flag.is_set(),
            "predicates": predicates,
        });
        println!("{}", out);
        return;
    }
    println!("mode: {}", rt.mode);
    println!("default: {}", flag.default_value());
    println!("allowed: {}", flag.allowed().join(", "));
    for tag in flag.allowed() {
        println!("  is {}: {}", tag, rt.mode.is(&Mode::new(tag.as_str())));
    }
}

fn run_usage(rt: &Runtime) {
    println!("-{}\t{}", SettableEnum::name(&rt.mode), SettableEnum::usage(&rt.mode));
}

fn run_policy(rt: &Runtime) {
    let rows = rt.policy.rows();
    if rt.json {
        let table: serde_json::Map<String, serde_json::Value> = rows
            .iter()
            .map(|(mode, row)| {
                let enabled: Vec<&str> = Severity::ALL
                    .iter()
                    .zip(row.iter())
                    .filter(|(_, on)| **on)
                    .map(|(s, _)| s.as_str())
                    .collect();
                (mode.to_string(), json!(enabled))
            })
            .collect();
        println!("{}", serde_json::Value::Object(table));
        return;
    }
    let header: Vec<String> = Severity::ALL
        .iter()
        .map(|s| format!("{:>9}", s.as_str()))
        .collect();
    println!("{:<10}{}", "mode", header.join(""));
    for (mode, row) in rows {
        let cells: Vec<String> = row
            .iter()
            .map(|on| format!("{:>9}", if *on { "yes" } else { "no" }))
            .collect();
        let marker = if rt.mode.is(&mode) { "*" } else { "" };
        println!("{:<10}{}", format!("{}{}", mode, marker), cells.join(""));
    }
}

fn run_check(rt: &Runtime, severities: &[Severity]) {
    let gate = ModeGate::new(&rt.mode, &rt.policy, TracingLogger);
    for severity in severities {
        let forwarded = gate.should_log(*severity);
        if rt.json {
            println!(
                "{}",
                json!({ "mode": rt.mode.value(), "severity": severity.as_str(), "forwarded": forwarded })
            );
        } else {
            let verdict = if forwarded { "forwarded" } else { "suppressed" };
            println!("{} in {} mode: {}", severity, rt.mode, verdict);
        }
    }
}

fn run_log(
    rt: &Runtime,
    severity: Severity,
    header: &str,
    details: &[String],
    subheader: Option<&str>,
    use_tracing: bool,
) {
    let logger: Box<dyn Logger> = if use_tracing {
        Box::new(TracingLogger)
    } else {
        Box::new(StderrLogger::new(rt.json))
    };
    let gate = ModeGate::new(&rt.mode, &rt.policy, logger);
    gate.mode_flag_set();

    let mut message = LogMessage::new(severity, header).with_details(details);
    if let Some(sub) = subheader {
        message = message.with_subheader(sub);
    }
    if !gate.should_log(severity) {
        tracing::info!(%severity, mode = %rt.mode, "message suppressed");
    }
    gate.log(Some(&message));
}

fn run_parse(rt: &Runtime, args: &[String]) {
    let mut mode = rt.mode.clone();
    let mut set = FlagSet::new("modeflag parse");
    if let Err(e) = set.register(&mut mode) {
        eprintln!("{}", e);
        process::exit(1);
    }
    let rest = match set.parse(args) {
        Ok(rest) => rest,
        Err(e) => {
            eprintln!("{}", e);
            eprint!("{}", set.usage());
            process::exit(2);
        }
    };
    drop(set);

    if rt.json {
        println!("{}", json!({ "mode": mode.value(), "args": rest }));
    } else {
        println!("mode: {}", mode);
        println!("args: {}", rest.join(" "));
    }
}

/// Loads config and applies `--mode`. Invalid values are reported the way
/// clap reports any other bad argument.
fn build_runtime(args: &Args) -> Runtime {
    let config = ModeflagConfig::load(&args.config);

    let mut mode = config.mode_flag().unwrap_or_else(|e| {
        eprintln!("Invalid [mode] in {}: {}", args.config, e);
        process::exit(1);
    });
    let policy = config.policy();

    if let Some(ref value) = args.mode {
        if let Err(e) = mode.set(value) {
            Args::command()
                .error(ErrorKind::InvalidValue, format!("{e} for '--mode <MODE>'"))
                .exit();
        }
    }

    Runtime {
        mode,
        policy,
        json: args.json,
    }
}

fn main() {
    let cli = Args::parse();
    logger::init_tracing(&cli.log_level, cli.json);

    if let Command::Init = cli.cmd {
        run_init(&cli.config);
        return;
    }

    let rt = build_runtime(&cli);
    match cli.cmd {
        Command::Init => {}
        Command::Show => run_show(&rt),
        Command::Usage => run_usage(&rt),
        Command::Policy => run_policy(&rt),
        Command::Check { severities } => {
            let severities: Vec<Severity> = severities.into_iter().map(Severity::from).collect();
            run_check(&rt, &severities)
        }
        Command::Log {
            severity,
            header,
            details,
            subheader,
            tracing,
        } => run_log(
            &rt,
            severity.into(),
            &header,
            &details,
            subheader.as_deref(),
            tracing,
        ),
        Command::Parse { args } => run_parse(&rt, &args),
    }
}
