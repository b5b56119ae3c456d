//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use crossadmit_core::config::{load_config, workspace_config_path, write_default_config};
use crossadmit_core::gateway::{GatewayState, run_gateway};
use crossadmit_core::{
    Comparison, CrossAdmitConfig, JsonFileStore, MajorBreakdown, NewSubmission, Submission,
    SubmissionStore, build_report, compute_comparison, compute_major_stats, find_comparison_by_id,
    ingest, list_submissions_for_pair,
};
use std::path::Path;

/// Handle a CLI subcommand.
pub async fn handle_command(
    command: Commands,
    workspace: &Path,
    store_override: Option<&Path>,
) -> anyhow::Result<()> {
    match command {
        Commands::Register {
            admitted,
            registered,
            majors,
            registered_major,
        } => {
            let (config, mut store) = open_store(workspace, store_override)?;
            let new = NewSubmission {
                admitted_universities: admitted,
                registered_university: registered,
                admitted_majors: majors.into_iter().collect(),
                registered_major,
            };
            let submission = ingest::accept(new, &config.ingest)?;
            let id = submission.id.clone();
            store.append(submission)?;
            println!("Registration complete: {}", id);
            Ok(())
        }
        Commands::Comparisons { limit, json } => {
            let (_, store) = open_store(workspace, store_override)?;
            let mut report = build_report(&store.load_all()?);
            if let Some(limit) = limit {
                report.comparisons.truncate(limit);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if report.comparisons.is_empty() {
                println!(
                    "No comparisons yet ({} submissions).",
                    report.total_submissions
                );
            } else {
                println!(
                    "{} comparisons from {} submissions:\n",
                    report.comparisons.len(),
                    report.total_submissions
                );
                for comparison in &report.comparisons {
                    println!("{}", format_comparison_row(comparison));
                }
            }
            Ok(())
        }
        Commands::Compare {
            university1,
            university2,
            json,
        } => {
            let (_, store) = open_store(workspace, store_override)?;
            let submissions = store.load_all()?;
            let Some(comparison) = compute_comparison(&submissions, &university1, &university2)
            else {
                anyhow::bail!(
                    "No submissions were admitted to both '{}' and '{}'",
                    university1,
                    university2
                );
            };
            print_comparison(&comparison, json)
        }
        Commands::Show { id, json } => {
            let (_, store) = open_store(workspace, store_override)?;
            let submissions = store.load_all()?;
            let Some(comparison) = find_comparison_by_id(&submissions, &id) else {
                anyhow::bail!("Comparison not found: {}", id);
            };
            print_comparison(&comparison, json)
        }
        Commands::Majors {
            university1,
            university2,
            json,
        } => {
            let (_, store) = open_store(workspace, store_override)?;
            let submissions = store.load_all()?;
            let Some(breakdown) = compute_major_stats(&submissions, &university1, &university2)
            else {
                anyhow::bail!(
                    "Major statistics not found for '{}' and '{}'",
                    university1,
                    university2
                );
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&breakdown)?);
            } else {
                let (first, second) = if university1 <= university2 {
                    (&university1, &university2)
                } else {
                    (&university2, &university1)
                };
                print!("{}", format_major_breakdown(first, second, &breakdown));
            }
            Ok(())
        }
        Commands::Submissions {
            university1,
            university2,
            json,
        } => {
            let (_, store) = open_store(workspace, store_override)?;
            let submissions = store.load_all()?;
            let listed = list_submissions_for_pair(&submissions, &university1, &university2);
            if json {
                println!("{}", serde_json::to_string_pretty(&listed)?);
            } else if listed.is_empty() {
                println!("No submissions admitted to both.");
            } else {
                for submission in &listed {
                    println!("{}", format_submission(submission));
                }
            }
            Ok(())
        }
        Commands::Serve { host, port } => {
            let (config, store) = open_store(workspace, store_override)?;
            let mut server = config.server.clone();
            if let Some(host) = host {
                server.host = host;
            }
            if let Some(port) = port {
                server.port = port;
            }
            let gw = GatewayState::new(Box::new(store), config.ingest.clone()).shared();
            println!("CrossAdmit API on http://{} (Ctrl-C to stop)", server.bind_addr());
            run_gateway(gw, &server).await?;
            Ok(())
        }
        Commands::Config { action } => handle_config(action, workspace).await,
    }
}

/// Load configuration and open the submission store it points at.
fn open_store(
    workspace: &Path,
    store_override: Option<&Path>,
) -> anyhow::Result<(CrossAdmitConfig, JsonFileStore)> {
    let config = load_config(Some(workspace), None)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    let store_path = store_override
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.store.resolve(workspace));
    tracing::debug!(store = %store_path.display(), "Using submission store");
    Ok((config, JsonFileStore::new(store_path)))
}

async fn handle_config(action: ConfigAction, workspace: &Path) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            match write_default_config(workspace)? {
                Some(path) => println!("Created default configuration at: {}", path.display()),
                None => println!(
                    "Configuration file already exists at: {}",
                    workspace_config_path(workspace).display()
                ),
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config: CrossAdmitConfig = load_config(Some(workspace), None)
                .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
            let toml_str = toml::to_string_pretty(&config)?;
            println!("{}", toml_str);
            Ok(())
        }
    }
}

/// Parse a `UNIVERSITY=MAJOR` argument.
pub fn parse_major(arg: &str) -> Result<(String, String), String> {
    let (university, major) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected UNIVERSITY=MAJOR, got '{}'", arg))?;
    let (university, major) = (university.trim(), major.trim());
    if university.is_empty() || major.is_empty() {
        return Err(format!("expected UNIVERSITY=MAJOR, got '{}'", arg));
    }
    Ok((university.to_string(), major.to_string()))
}

fn print_comparison(comparison: &Comparison, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(comparison)?);
    } else {
        print!("{}", format_comparison(comparison));
        if let Some(breakdown) = &comparison.major_stats {
            println!();
            print!(
                "{}",
                format_major_breakdown(&comparison.university1, &comparison.university2, breakdown)
            );
        }
    }
    Ok(())
}

fn format_comparison_row(c: &Comparison) -> String {
    format!(
        "  {:<40} {:>5}  {:>3}% / {:>3}%  [{}]",
        format!("{} vs {}", c.university1, c.university2),
        c.total_admitted,
        c.percentage1,
        c.percentage2,
        c.id
    )
}

fn format_comparison(c: &Comparison) -> String {
    let mut out = format!(
        "{} vs {} ({})\nAdmitted to both: {}\n",
        c.university1, c.university2, c.id, c.total_admitted
    );
    for (name, chose, pct, ci) in [
        (
            &c.university1,
            c.chose_university1,
            c.percentage1,
            c.confidence_interval1,
        ),
        (
            &c.university2,
            c.chose_university2,
            c.percentage2,
            c.confidence_interval2,
        ),
    ] {
        out.push_str(&format!(
            "  {}: {} chose ({}%, 95% CI {:.1}..{:.1})\n",
            name, chose, pct, ci.min, ci.max
        ));
    }
    out
}

fn format_major_breakdown(university1: &str, university2: &str, b: &MajorBreakdown) -> String {
    let mut out = String::new();
    for (name, stats) in [(university1, &b.university1), (university2, &b.university2)] {
        out.push_str(&format!("Majors at {}:\n", name));
        for s in stats {
            out.push_str(&format!(
                "  {:<30} {}/{} ({}%)\n",
                s.major, s.chose, s.total, s.percentage
            ));
        }
    }
    if !b.major_matches.is_empty() {
        out.push_str("Major matchups:\n");
        for m in &b.major_matches {
            out.push_str(&format!(
                "  {} vs {}: {} admitted, {}% / {}%\n",
                m.major1, m.major2, m.total, m.percentage1, m.percentage2
            ));
        }
    }
    out
}

fn format_submission(s: &Submission) -> String {
    format!(
        "{}  {}  admitted: {}  registered: {}",
        s.created_at.format("%Y-%m-%d %H:%M"),
        s.id,
        s.admitted_universities.join(", "),
        s.registered_university
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn register(admitted: &[&str], registered: &str) -> Commands {
        Commands::Register {
            admitted: admitted.iter().map(|s| s.to_string()).collect(),
            registered: registered.into(),
            majors: Vec::new(),
            registered_major: None,
        }
    }

    #[test]
    fn test_parse_major() {
        assert_eq!(
            parse_major("KAIST = Physics").unwrap(),
            ("KAIST".to_string(), "Physics".to_string())
        );
        assert!(parse_major("KAIST").is_err());
        assert!(parse_major("=Physics").is_err());
        assert!(parse_major("KAIST=").is_err());
    }

    #[tokio::test]
    async fn test_config_init_creates_file() {
        let dir = TempDir::new().unwrap();
        let workspace = dir.path();

        let command = Commands::Config {
            action: ConfigAction::Init,
        };
        handle_command(command, workspace, None).await.unwrap();

        let config_path = workspace.join(".crossadmit").join("config.toml");
        assert!(config_path.exists());

        let content = std::fs::read_to_string(&config_path).unwrap();
        let parsed: CrossAdmitConfig = toml::from_str(&content).unwrap();
        assert_eq!(parsed, CrossAdmitConfig::default());
    }

    #[tokio::test]
    async fn test_config_init_idempotent() {
        let dir = TempDir::new().unwrap();
        let workspace = dir.path();

        for _ in 0..2 {
            let command = Commands::Config {
                action: ConfigAction::Init,
            };
            handle_command(command, workspace, None).await.unwrap();
        }
        assert!(workspace.join(".crossadmit").join("config.toml").exists());
    }

    #[tokio::test]
    async fn test_register_appends_to_store() {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("subs.json");

        handle_command(register(&["A", "B"], "A"), dir.path(), Some(&store))
            .await
            .unwrap();
        handle_command(register(&["B", "C"], "C"), dir.path(), Some(&store))
            .await
            .unwrap();

        let stored = JsonFileStore::new(&store).load_all().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].registered_university, "A");
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_submission() {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("subs.json");

        let result = handle_command(register(&["A"], "A"), dir.path(), Some(&store)).await;
        assert!(result.is_err());
        assert!(!store.exists());
    }

    #[tokio::test]
    async fn test_compare_unknown_pair_errors() {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("subs.json");
        handle_command(register(&["A", "B"], "A"), dir.path(), Some(&store))
            .await
            .unwrap();

        let command = Commands::Compare {
            university1: "A".into(),
            university2: "C".into(),
            json: false,
        };
        assert!(handle_command(command, dir.path(), Some(&store)).await.is_err());

        let command = Commands::Show {
            id: "a-vs-b".into(),
            json: true,
        };
        handle_command(command, dir.path(), Some(&store)).await.unwrap();
    }

    #[test]
    fn test_format_comparison() {
        let submissions = vec![Submission {
            id: "1".into(),
            admitted_universities: vec!["A".into(), "B".into()],
            registered_university: "A".into(),
            admitted_majors: Default::default(),
            registered_major: None,
            created_at: chrono::Utc::now(),
        }];
        let c = compute_comparison(&submissions, "A", "B").unwrap();
        let text = format_comparison(&c);
        assert!(text.starts_with("A vs B (a-vs-b)\n"));
        assert!(text.contains("A: 1 chose (100%, 95% CI 100.0..100.0)"));
        assert!(text.contains("B: 0 chose (0%, 95% CI 0.0..0.0)"));
    }
}
