use clap::{Arg, ArgAction, Command};
use serde_json::{Map, Value, json};
use std::path::PathBuf;
use transjson::{
    BackendRegistry, LanguageStatus, MockMode, MockTranslator, Orchestrator, OutcomeStatus,
    TranslationRequest, TranslatorConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("transjson")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translate the string values of a JSON file into multiple languages")
        .arg(
            Arg::new("input")
                .help("JSON file with the source strings")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .short('t')
                .help("Target language codes (e.g., es fr de or es,fr,de)")
                .required(true)
                .num_args(1..)
                .value_delimiter(',')
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("from")
                .long("from")
                .short('f')
                .help("Source language code (default: auto)")
                .default_value("auto"),
        )
        .arg(
            Arg::new("module")
                .long("module")
                .short('m')
                .help("Translation backend to try first (google, google2, command)"),
        )
        .arg(
            Arg::new("name")
                .long("name")
                .short('n')
                .help("Output file prefix: <name>.<lang>.json")
                .default_value("myApp"),
        )
        .arg(
            Arg::new("fallback")
                .long("fallback")
                .help("Let the other backends take over when the module gives up (yes/no)"),
        )
        .arg(
            Arg::new("concurrencylimit")
                .long("concurrencylimit")
                .short('c')
                .help("Maximum number of translations in flight")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("retry")
                .long("retry")
                .short('r')
                .help("Attempts per backend for each string")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("minimum-completeness")
                .long("minimum-completeness")
                .help("Required fraction of translated strings per language (0.0-1.0)")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("failure-policy")
                .long("failure-policy")
                .help("What to do with strings that could not be translated (fallback/strict)"),
        )
        .arg(
            Arg::new("out-dir")
                .long("out-dir")
                .short('o')
                .help("Directory for the translated files")
                .default_value("."),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .help("Use mock translator instead of a real backend")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Show per-key details and debug logs")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let input_path = PathBuf::from(get_string(&matches, "input")?);
    let name = get_string(&matches, "name")?;
    let out_dir = PathBuf::from(get_string(&matches, "out-dir")?);

    let contents = tokio::fs::read_to_string(&input_path)
        .await
        .map_err(|e| format!("Failed to read {}: {}", input_path.display(), e))?;
    let data: Value = serde_json::from_str(&contents)
        .map_err(|e| format!("{} is not valid JSON: {}", input_path.display(), e))?;

    let request = TranslationRequest::from_value(&request_body(&matches, data))?;

    let config = TranslatorConfig::from_env()?;
    let orchestrator = if matches.get_flag("mock") {
        let registry =
            BackendRegistry::new().register("mock", MockTranslator::new(MockMode::Suffix));
        Orchestrator::new(config.with_default_module("mock"), registry)?
    } else {
        Orchestrator::from_config(config)?
    };

    if verbose {
        println!("📝 Source: {} ({} keys)", input_path.display(), request.data.len());
        println!("🌍 {} → {}", request.from, request.to_languages.join(", "));
        println!("🔌 Backends: {}", orchestrator.available_modules().join(", "));
        println!();
    }

    let outcome = orchestrator.translate(&request).await?;

    tokio::fs::create_dir_all(&out_dir).await?;
    for code in &request.to_languages {
        let Some(report) = outcome.report(code) else {
            continue;
        };

        match outcome.language(code) {
            Some(translated) => {
                let path = out_dir.join(format!("{}.{}.json", name, code));
                let mut pretty = serde_json::to_string_pretty(translated)?;
                pretty.push('\n');
                tokio::fs::write(&path, pretty).await?;

                let icon = if report.status == LanguageStatus::Complete {
                    "✅"
                } else {
                    "⚠️ "
                };
                println!(
                    "{} {}: {} translated, {} kept in source language → {}",
                    icon,
                    code,
                    report.translated,
                    report.fallback,
                    path.display()
                );
            }
            None => {
                println!(
                    "❌ {}: failed ({:.0}% complete), no file written",
                    code,
                    report.completeness * 100.0
                );
            }
        }

        if verbose {
            for (key, key_report) in &report.keys {
                println!(
                    "   {} {:?} attempts={} backend={} {}",
                    key,
                    key_report.status,
                    key_report.attempts,
                    key_report.backend.as_deref().unwrap_or("-"),
                    key_report.error.as_deref().unwrap_or("")
                );
            }
        }
    }

    if outcome.status() == OutcomeStatus::Failed {
        eprintln!("❌ No language could be translated");
        for hint in outcome.summary.suggestions(&orchestrator.available_modules()) {
            eprintln!("   - {}", hint);
        }
        return Err("All translations failed".into());
    }

    Ok(())
}

fn get_string(matches: &clap::ArgMatches, id: &str) -> Result<String, String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .ok_or_else(|| format!("missing --{}", id))
}

/// Build the same body shape the HTTP endpoint accepts
fn request_body(matches: &clap::ArgMatches, data: Value) -> Value {
    let mut body = Map::new();
    body.insert("data".to_string(), data);

    let languages: Vec<String> = matches
        .get_many::<String>("to")
        .map(|values| values.map(|v| v.trim().to_string()).collect())
        .unwrap_or_default();
    body.insert("toLanguages".to_string(), json!(languages));

    if let Some(from) = matches.get_one::<String>("from") {
        body.insert("from".to_string(), json!(from));
    }
    if let Some(module) = matches.get_one::<String>("module") {
        body.insert("module".to_string(), json!(module));
    }
    if let Some(fallback) = matches.get_one::<String>("fallback") {
        body.insert("fallback".to_string(), json!(fallback));
    }
    if let Some(limit) = matches.get_one::<u64>("concurrencylimit") {
        body.insert("concurrencylimit".to_string(), json!(limit));
    }
    if let Some(retry) = matches.get_one::<u64>("retry") {
        body.insert("retryAttempts".to_string(), json!(retry));
    }
    if let Some(ratio) = matches.get_one::<f64>("minimum-completeness") {
        body.insert("minimumCompleteness".to_string(), json!(ratio));
    }
    if let Some(policy) = matches.get_one::<String>("failure-policy") {
        body.insert("failurePolicy".to_string(), json!(policy));
    }

    Value::Object(body)
}
