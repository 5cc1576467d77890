#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
//! Integration tests for the `install` command.
//!
//! Each test builds a canonical tree and three host roots in a temporary
//! directory, runs the installer over them and inspects both the report and
//! what landed on disk.

mod common;

use std::fs;

use common::Fixture;
use kitt_cli::matrix::{self, HostId, Kind};
use kitt_cli::report::Outcome;

const DEBUG_HEADER: &str = "description: Find the root cause\ntools: [Read, Grep, Bash]\n";

fn outcome<'a>(
    report: &'a kitt_cli::report::InstallReport,
    host: HostId,
    name: &str,
) -> &'a Outcome {
    &report
        .host(host)
        .expect("host in report")
        .entries
        .iter()
        .find(|e| e.name == name)
        .expect("entry in report")
        .outcome
}

// ---------------------------------------------------------------------------
// Snapshot: capability matrix
// ---------------------------------------------------------------------------

/// Any change to which host supports what is a deliberate snapshot update.
#[test]
fn capability_matrix() {
    insta::assert_snapshot!("capability_matrix", matrix::render_table());
}

// ---------------------------------------------------------------------------
// Idempotence and determinism
// ---------------------------------------------------------------------------

#[test]
fn second_install_is_a_no_op() {
    let fx = Fixture::new();
    fx.write(Kind::Command, "kitt-debug", DEBUG_HEADER, "Find the bug.\n");
    fx.write(Kind::Agent, "kitt-reviewer", "description: Reviews\n", "Review it.\n");
    fx.write(Kind::Skill, "kitt-demo", "description: Demo\n", "Demo.\n");

    let first = fx.install(false);
    assert!(!first.has_failures());
    assert!(first.writes() > 0);
    let tree = fx.home_tree();

    let second = fx.install(false);
    assert_eq!(second.writes(), 0);
    assert!(second.hosts.iter().all(|h| h.changed() == 0 && h.removed.is_empty()));
    assert_eq!(fx.home_tree(), tree);
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let a = Fixture::new();
    let b = Fixture::new();
    for fx in [&a, &b] {
        fx.write(Kind::Command, "kitt-debug", DEBUG_HEADER, "Find the bug.\n");
        fx.write(Kind::Command, "kitt-plan", "", "Plan it.\n");
        fx.write(Kind::Agent, "kitt-reviewer", "description: Reviews\n", "Review.\n");
    }

    let sequential = a.install_with(false, false);
    let parallel = b.install_with(false, true);

    let strip = |r: &kitt_cli::report::InstallReport| -> Vec<(HostId, String)> {
        r.hosts.iter().map(|h| (h.host, h.summary())).collect()
    };
    assert_eq!(strip(&sequential), strip(&parallel));

    // Converted files are byte-identical; only symlink targets differ by root.
    let files = |fx: &Fixture| {
        fx.home_tree()
            .into_iter()
            .filter(|(_, v)| !v.starts_with("-> "))
            .collect::<Vec<_>>()
    };
    assert_eq!(files(&a), files(&b));
}

// ---------------------------------------------------------------------------
// Host output
// ---------------------------------------------------------------------------

#[test]
fn command_lands_on_claude_and_gemini_only() {
    let fx = Fixture::new();
    let source = fx.write(Kind::Command, "kitt-debug", DEBUG_HEADER, "Find the bug.\n");
    let report = fx.install(false);

    let claude = fx.root(HostId::Claude).join("commands/kitt-debug.md");
    assert_eq!(
        fs::read_link(&claude).unwrap(),
        dunce::canonicalize(&source).unwrap()
    );

    let gemini = fs::read_to_string(fx.root(HostId::Gemini).join("commands/kitt-debug.toml"))
        .unwrap();
    let parsed: toml::Value = toml::from_str(&gemini).unwrap();
    assert_eq!(parsed["description"].as_str(), Some("Find the root cause"));
    assert_eq!(parsed["prompt"].as_str(), Some("Find the bug.\n"));

    assert_eq!(
        outcome(&report, HostId::Copilot, "kitt-debug"),
        &Outcome::Skipped {
            reason: "unsupported-kind: command".to_string()
        }
    );
    assert!(!fx.root(HostId::Copilot).join("commands").exists());
}

#[test]
fn gemini_reports_dropped_tools() {
    let fx = Fixture::new();
    fx.write(Kind::Command, "kitt-debug", DEBUG_HEADER, "Find the bug.\n");
    let report = fx.install(false);

    let Outcome::Installed { dropped, .. } = outcome(&report, HostId::Gemini, "kitt-debug") else {
        panic!("expected installed");
    };
    assert_eq!(dropped, &vec!["tools".to_string()]);
}

#[test]
fn copilot_agent_has_mapped_tools_and_verbatim_body() {
    let fx = Fixture::new();
    fx.write(
        Kind::Agent,
        "kitt-reviewer",
        "description: Reviews diffs\ntools: [Read, Grep, Glob, Bash]\n",
        "Review the diff.\n\nBe terse.\n",
    );
    fx.install(false);

    let content =
        fs::read_to_string(fx.root(HostId::Copilot).join("agents/kitt-reviewer.agent.md"))
            .unwrap();
    assert!(content.starts_with("---\nname: kitt-reviewer\ndescription: Reviews diffs\n"));
    assert!(content.contains("- read\n- search\n- shell\n"));
    assert!(content.ends_with("---\n\nReview the diff.\n\nBe terse.\n"));
}

// ---------------------------------------------------------------------------
// Skills
// ---------------------------------------------------------------------------

#[test]
fn skill_installs_on_claude_and_is_skipped_elsewhere() {
    let fx = Fixture::new();
    fx.write(Kind::Skill, "kitt-demo", "description: Demo skill\n", "Demo.\n");
    let report = fx.install(false);

    let link = fx.root(HostId::Claude).join("skills/kitt-demo");
    assert_eq!(
        fs::read_link(&link).unwrap(),
        dunce::canonicalize(fx.source().join("skills/kitt-demo")).unwrap()
    );
    assert!(link.join("SKILL.md").is_file());

    for host in [HostId::Gemini, HostId::Copilot] {
        assert_eq!(
            outcome(&report, host, "kitt-demo"),
            &Outcome::Skipped {
                reason: "unsupported-kind: skill".to_string()
            }
        );
        assert!(!fx.root(host).join("skills").exists());
    }
    assert!(!report.has_failures());
}

#[test]
fn renamed_skill_replaces_the_old_link() {
    let fx = Fixture::new();
    fx.write(Kind::Skill, "kitt-demo", "", "Demo.\n");
    fx.install(false);

    fx.remove(Kind::Skill, "kitt-demo");
    fx.write(Kind::Skill, "kitt-demo2", "", "Demo.\n");
    let report = fx.install(false);

    let skills = fx.root(HostId::Claude).join("skills");
    assert!(fs::symlink_metadata(skills.join("kitt-demo")).is_err());
    assert!(skills.join("kitt-demo2").join("SKILL.md").is_file());
    assert_eq!(
        report.host(HostId::Claude).unwrap().removed,
        vec![skills.join("kitt-demo")]
    );
    // Removing a link never touches the canonical tree.
    assert!(fx.source().join("skills/kitt-demo2/SKILL.md").is_file());
}

// ---------------------------------------------------------------------------
// Capability filtering
// ---------------------------------------------------------------------------

#[test]
fn missing_capability_skips_only_that_host() {
    let fx = Fixture::new();
    fx.write(
        Kind::Agent,
        "kitt-hooks",
        "required-capabilities: [manage-hooks]\n",
        "Edit hooks.\n",
    );
    let report = fx.install(false);

    assert!(matches!(
        outcome(&report, HostId::Claude, "kitt-hooks"),
        Outcome::Installed { changed: true, .. }
    ));
    assert_eq!(
        outcome(&report, HostId::Copilot, "kitt-hooks"),
        &Outcome::Skipped {
            reason: "unsupported-capability: manage-hooks".to_string()
        }
    );
    assert!(
        !fx.root(HostId::Copilot)
            .join("agents/kitt-hooks.agent.md")
            .exists()
    );
}

#[test]
fn gaining_a_requirement_removes_the_installed_artifact() {
    let fx = Fixture::new();
    fx.write(Kind::Agent, "kitt-helper", "", "Help.\n");
    fx.install(false);
    let artifact = fx.root(HostId::Copilot).join("agents/kitt-helper.agent.md");
    assert!(artifact.exists());

    fx.write(
        Kind::Agent,
        "kitt-helper",
        "required-capabilities: [invoke-skill-tool]\n",
        "Help.\n",
    );
    let report = fx.install(false);
    assert!(!artifact.exists());
    assert_eq!(report.host(HostId::Copilot).unwrap().removed, vec![artifact]);
}

// ---------------------------------------------------------------------------
// Orphans and namespace safety
// ---------------------------------------------------------------------------

#[test]
fn deleted_resource_is_removed_everywhere() {
    let fx = Fixture::new();
    fx.write(Kind::Command, "kitt-old", "", "Old.\n");
    fx.write(Kind::Command, "kitt-keep", "", "Keep.\n");
    fx.install(false);

    fx.remove(Kind::Command, "kitt-old");
    let report = fx.install(false);

    for host in [HostId::Claude, HostId::Gemini] {
        let host_report = report.host(host).unwrap();
        assert_eq!(host_report.removed.len(), 1);
        assert_eq!(host_report.installed(), 1);
    }
    assert!(
        fs::symlink_metadata(fx.root(HostId::Claude).join("commands/kitt-old.md")).is_err()
    );
    assert!(!fx.root(HostId::Gemini).join("commands/kitt-old.toml").exists());
    assert!(fx.root(HostId::Gemini).join("commands/kitt-keep.toml").exists());
}

#[test]
fn broken_edit_keeps_installed_artifacts() {
    let fx = Fixture::new();
    fx.write(Kind::Command, "kitt-debug", DEBUG_HEADER, "Find the bug.\n");
    fx.install(false);
    let link = fx.root(HostId::Claude).join("commands/kitt-debug.md");
    let toml = fx.root(HostId::Gemini).join("commands/kitt-debug.toml");
    let before = fs::read_to_string(&toml).unwrap();

    fx.write(Kind::Command, "kitt-debug", "description: [oops\n", "Find the bug.\n");
    let report = fx.install(false);

    assert_eq!(report.rejected.len(), 1);
    assert!(report.has_failures());
    assert!(report.hosts.iter().all(|h| h.removed.is_empty()));
    assert!(fs::symlink_metadata(&link).unwrap().is_symlink());
    assert_eq!(fs::read_to_string(&toml).unwrap(), before);
}

#[test]
fn unprefixed_user_files_are_never_touched() {
    let fx = Fixture::new();
    let commands = fx.root(HostId::Gemini).join("commands");
    fs::create_dir_all(&commands).unwrap();
    fs::write(commands.join("notes.toml"), "prompt = \"mine\"\n").unwrap();
    fs::write(commands.join("kitt.toml"), "prompt = \"also mine\"\n").unwrap();
    fs::write(commands.join("kitt-stale.toml"), "prompt = \"old\"\n").unwrap();

    let report = fx.install(false);

    assert_eq!(
        fs::read_to_string(commands.join("notes.toml")).unwrap(),
        "prompt = \"mine\"\n"
    );
    assert!(commands.join("kitt.toml").exists());
    assert!(!commands.join("kitt-stale.toml").exists());
    assert_eq!(
        report.host(HostId::Gemini).unwrap().removed,
        vec![commands.join("kitt-stale.toml")]
    );
}

#[test]
fn hand_edited_artifact_is_restored() {
    let fx = Fixture::new();
    fx.write(Kind::Command, "kitt-debug", DEBUG_HEADER, "Find the bug.\n");
    fx.install(false);
    let path = fx.root(HostId::Gemini).join("commands/kitt-debug.toml");
    let expected = fs::read_to_string(&path).unwrap();
    fs::write(&path, "prompt = \"edited\"\n").unwrap();

    let report = fx.install(false);
    assert_eq!(fs::read_to_string(&path).unwrap(), expected);
    assert_eq!(report.host(HostId::Gemini).unwrap().changed(), 1);
    assert_eq!(report.host(HostId::Claude).unwrap().changed(), 0);
}

// ---------------------------------------------------------------------------
// Dry run and failures
// ---------------------------------------------------------------------------

#[test]
fn dry_run_reports_changes_without_writing() {
    let fx = Fixture::new();
    fx.write(Kind::Command, "kitt-debug", DEBUG_HEADER, "Find the bug.\n");
    let stale = fx.root(HostId::Gemini).join("commands/kitt-stale.toml");
    fs::create_dir_all(stale.parent().unwrap()).unwrap();
    fs::write(&stale, "x").unwrap();

    let report = fx.install(true);
    assert_eq!(report.writes(), 0);
    assert_eq!(report.host(HostId::Gemini).unwrap().changed(), 1);
    assert_eq!(report.host(HostId::Gemini).unwrap().removed, vec![stale.clone()]);
    assert!(stale.exists());
    assert!(!fx.root(HostId::Claude).exists());
}

#[test]
fn relative_source_tree_links_resolve() {
    let fx = Fixture::new_relative();
    assert!(fx.source().is_relative());
    let source = fx.write(Kind::Command, "kitt-debug", DEBUG_HEADER, "Find the bug.\n");

    let report = fx.install(false);
    assert!(!report.has_failures());
    let link = fx.root(HostId::Claude).join("commands/kitt-debug.md");
    let target = fs::read_link(&link).unwrap();
    assert!(target.is_absolute());
    assert!(link.exists());
    assert_eq!(target, dunce::canonicalize(&source).unwrap());

    let again = fx.install(false);
    assert_eq!(again.writes(), 0);
}

#[test]
fn rejected_source_file_fails_the_run_but_installs_the_rest() {
    let fx = Fixture::new();
    fx.write(Kind::Command, "kitt-debug", DEBUG_HEADER, "Find the bug.\n");
    fx.write(Kind::Command, "debug", "", "No prefix.\n");

    let report = fx.install(false);
    assert_eq!(report.rejected.len(), 1);
    assert!(report.rejected[0].reason.contains("kitt-"));
    assert!(report.has_failures());
    assert!(
        fx.root(HostId::Gemini)
            .join("commands/kitt-debug.toml")
            .exists()
    );
}

#[cfg(unix)]
#[test]
fn failed_write_does_not_block_orphan_removal() {
    use std::os::unix::fs::PermissionsExt;

    let fx = Fixture::new();
    fx.write(Kind::Command, "kitt-a", "", "A.\n");
    let commands = fx.root(HostId::Gemini).join("commands");
    let locked = commands.join("kitt-a.toml/locked");
    fs::create_dir_all(&locked).unwrap();
    fs::write(locked.join("file"), "x").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();
    let orphan = commands.join("kitt-old.toml");
    fs::write(&orphan, "prompt = \"old\"\n").unwrap();

    // Permission bits do not bind root.
    if fs::write(locked.join("write-check"), "").is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let report = fx.install(false);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let gemini = report.host(HostId::Gemini).unwrap();
    assert!(matches!(
        outcome(&report, HostId::Gemini, "kitt-a"),
        Outcome::Failed { .. }
    ));
    assert_eq!(gemini.removed, vec![orphan.clone()]);
    assert!(!orphan.exists());
    assert!(!report.host(HostId::Claude).unwrap().has_failures());
}

#[cfg(unix)]
#[test]
fn unwritable_host_root_fails_that_host_only() {
    use std::os::unix::fs::PermissionsExt;

    let fx = Fixture::new();
    fx.write(Kind::Command, "kitt-debug", DEBUG_HEADER, "Find the bug.\n");
    fx.write(Kind::Skill, "kitt-demo", "", "Demo.\n");
    let claude = fx.root(HostId::Claude);
    fs::create_dir_all(&claude).unwrap();
    fs::set_permissions(&claude, fs::Permissions::from_mode(0o555)).unwrap();

    // Permission bits do not bind root.
    if fs::write(claude.join("write-check"), "").is_ok() {
        return;
    }

    let report = fx.install(false);
    fs::set_permissions(&claude, fs::Permissions::from_mode(0o755)).unwrap();

    let claude_report = report.host(HostId::Claude).unwrap();
    assert_eq!(claude_report.failed(), 2);
    assert!(claude_report.entries.iter().all(|e| match &e.outcome {
        Outcome::Failed { reason } => reason.contains("Permission denied"),
        _ => false,
    }));
    assert!(!report.host(HostId::Gemini).unwrap().has_failures());
    assert!(report.has_failures());
}

// ---------------------------------------------------------------------------
// Concurrent runs
// ---------------------------------------------------------------------------

#[test]
fn overlapping_installs_on_one_root_all_succeed() {
    let fx = Fixture::new();
    for name in ["kitt-a", "kitt-b", "kitt-c"] {
        fx.write(Kind::Command, name, "description: x\n", "Body.\n");
        fx.write(Kind::Agent, name, "description: x\n", "Body.\n");
    }

    let reports: Vec<_> = std::thread::scope(|s| {
        let runs: Vec<_> = (0..4).map(|_| s.spawn(|| fx.install(false))).collect();
        runs.into_iter().map(|r| r.join().unwrap()).collect()
    });

    for report in &reports {
        assert!(!report.has_failures(), "{report:?}");
    }
    let tree = fx.home_tree();
    assert!(tree.keys().all(|p| !p.to_string_lossy().ends_with(".kitt_tmp")));
    assert_eq!(fx.install(false).writes(), 0);
}
