//! External CLI backend driven through staged files
//!
//! Each call gets its own uniquely named staging directory under the
//! configured root. The source text is written to `input.json` as
//! `{"text": ...}`, the program runs with the staging directory as its
//! working directory, and the translation is read back from
//! `{name}.{to}.json`. The directory is a [`tempfile::TempDir`], so it is
//! removed whether the call succeeds, fails, times out, or is dropped.

use crate::error::{TranslateError, TranslateResult};
use crate::translator::MachineTranslator;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::{debug, warn};

const INPUT_FILE: &str = "input.json";

/// Program and argument template for a file-exchange translation tool
///
/// Arguments may contain `{input}`, `{from}`, `{to}`, `{name}` and `{dir}`.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Output files are expected at `{name}.{to}.json`
    pub name: String,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            name: "translation".to_string(),
        }
    }

    /// Argument layout of the `jsontt` JSON translator CLI
    pub fn jsontt(program: &str) -> Self {
        Self::new(
            program,
            [
                "{input}",
                "--module",
                "google2",
                "-f",
                "{from}",
                "--to",
                "{to}",
                "--name",
                "{name}",
                "--fallback",
                "no",
            ],
        )
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn render_args(&self, input: &Path, dir: &Path, from: &str, to: &str) -> Vec<String> {
        let input = input.to_string_lossy();
        let dir = dir.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{input}", &input)
                    .replace("{dir}", &dir)
                    .replace("{from}", from)
                    .replace("{to}", to)
                    .replace("{name}", &self.name)
            })
            .collect()
    }

    fn output_file(&self, to: &str) -> String {
        format!("{}.{}.json", self.name, to)
    }
}

#[derive(Debug, Clone)]
pub struct CommandTranslator {
    spec: CommandSpec,
    staging_root: PathBuf,
}

impl CommandTranslator {
    pub fn new(spec: CommandSpec, staging_root: impl Into<PathBuf>) -> Self {
        Self {
            spec,
            staging_root: staging_root.into(),
        }
    }

    async fn run_staged(&self, staging: &Path, text: &str, from: &str, to: &str) -> TranslateResult<String> {
        let input = staging.join(INPUT_FILE);
        let payload = serde_json::to_vec_pretty(&json!({ "text": text }))?;
        tokio::fs::write(&input, payload).await?;

        let args = self.spec.render_args(&input, staging, from, to);
        debug!("Running {} {:?} in {}", self.spec.program, args, staging.display());

        let output = tokio::process::Command::new(&self.spec.program)
            .args(&args)
            .current_dir(staging)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                TranslateError::ProcessError(format!("failed to start {}: {}", self.spec.program, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TranslateError::ProcessError(format!(
                "{} exited with {}: {}",
                self.spec.program,
                output.status,
                stderr.trim()
            )));
        }

        let output_path = staging.join(self.spec.output_file(to));
        let contents = tokio::fs::read_to_string(&output_path).await.map_err(|_| {
            TranslateError::ProcessError(format!(
                "{} did not produce {}",
                self.spec.program,
                output_path.display()
            ))
        })?;

        let parsed: Value = serde_json::from_str(&contents)?;
        parsed
            .get("text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                TranslateError::TranslationError(format!(
                    "{} has no string 'text' field",
                    output_path.display()
                ))
            })
    }
}

#[async_trait]
impl MachineTranslator for CommandTranslator {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> TranslateResult<String> {
        let staging = tempfile::Builder::new()
            .prefix("translate-")
            .tempdir_in(&self.staging_root)?;

        let result = self
            .run_staged(staging.path(), text, source_locale, target_locale)
            .await;

        if let Err(e) = staging.close() {
            warn!("Failed to remove staging directory: {}", e);
        }

        result
    }

    fn provider_name(&self) -> &str {
        &self.spec.program
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    fn staging_entries(root: &Path) -> usize {
        std::fs::read_dir(root).unwrap().count()
    }

    fn shell(script: &str) -> CommandSpec {
        CommandSpec::new("sh", ["-c", script, "{name}", "{to}", "{from}"])
    }

    #[test]
    fn test_render_args() {
        let spec = CommandSpec::jsontt("jsontt").with_name("myApp");
        let args = spec.render_args(Path::new("/tmp/x/input.json"), Path::new("/tmp/x"), "auto", "es");
        assert_eq!(args[0], "/tmp/x/input.json");
        assert_eq!(args[4], "auto");
        assert_eq!(args[6], "es");
        assert_eq!(args[8], "myApp");
        assert_eq!(spec.output_file("es"), "myApp.es.json");
    }

    #[tokio::test]
    async fn test_translate_and_cleanup() {
        let root = tempfile::tempdir().unwrap();
        let translator = CommandTranslator::new(
            shell(r#"sed 's/hello/hola/' input.json > "$0.$1.json""#),
            root.path(),
        );

        let result = translator.translate("hello", "auto", "es").await.unwrap();
        assert_eq!(result, "hola");
        assert_eq!(staging_entries(root.path()), 0);
    }

    #[tokio::test]
    async fn test_process_failure_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let translator = CommandTranslator::new(shell("echo boom >&2; exit 3"), root.path());

        match translator.translate("hello", "auto", "es").await {
            Err(TranslateError::ProcessError(msg)) => assert!(msg.contains("boom")),
            other => panic!("Expected ProcessError, got {:?}", other),
        }
        assert_eq!(staging_entries(root.path()), 0);
    }

    #[tokio::test]
    async fn test_missing_output_file() {
        let root = tempfile::tempdir().unwrap();
        let translator = CommandTranslator::new(shell("true"), root.path());

        match translator.translate("hello", "auto", "es").await {
            Err(TranslateError::ProcessError(msg)) => assert!(msg.contains("did not produce")),
            other => panic!("Expected ProcessError, got {:?}", other),
        }
        assert_eq!(staging_entries(root.path()), 0);
    }

    #[tokio::test]
    async fn test_malformed_output_file() {
        let root = tempfile::tempdir().unwrap();
        let translator =
            CommandTranslator::new(shell(r#"echo 'not json' > "$0.$1.json""#), root.path());

        assert!(translator.translate("hello", "auto", "es").await.is_err());
        assert_eq!(staging_entries(root.path()), 0);
    }

    #[tokio::test]
    async fn test_cancelled_call_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let translator = CommandTranslator::new(shell("sleep 5"), root.path());

        let result = tokio::time::timeout(
            Duration::from_millis(200),
            translator.translate("hello", "auto", "es"),
        )
        .await;
        assert!(result.is_err());
        assert_eq!(staging_entries(root.path()), 0);
    }

    #[tokio::test]
    async fn test_concurrent_calls_do_not_collide() {
        let root = tempfile::tempdir().unwrap();
        let translator = CommandTranslator::new(
            shell(r#"sed "s/\"text\": \"/\"text\": \"$1:/" input.json > "$0.$1.json""#),
            root.path(),
        );

        let (es, fr) = tokio::join!(
            translator.translate("hello", "auto", "es"),
            translator.translate("hello", "auto", "fr"),
        );
        assert_eq!(es.unwrap(), "es:hello");
        assert_eq!(fr.unwrap(), "fr:hello");
        assert_eq!(staging_entries(root.path()), 0);
    }
}
