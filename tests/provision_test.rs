//! End-to-end provisioning tests.
//!
//! Drive the full state machine over a scripted process runner and a mock
//! artifact server, so every transition is observable without touching the
//! real system.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use httpmock::prelude::*;
use outfitter::error::OutfitterError;
use outfitter::locate::LocationOrigin;
use outfitter::platform::PlatformFamily;
use outfitter::process::{ProcessRequest, ProcessResult, ProcessRunner};
use outfitter::profile::ToolProfile;
use outfitter::provision::{Provisioner, ProvisionStage};
use outfitter::version::ToolVersion;
use tempfile::TempDir;

/// Runner driven by a closure; records every request it receives.
struct ScriptedRunner<F> {
    calls: Mutex<Vec<ProcessRequest>>,
    script: F,
}

impl<F> ScriptedRunner<F>
where
    F: Fn(&ProcessRequest) -> outfitter::Result<ProcessResult>,
{
    fn new(script: F) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            script,
        }
    }

    fn commands(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.command.clone())
            .collect()
    }
}

impl<F> ProcessRunner for ScriptedRunner<F>
where
    F: Fn(&ProcessRequest) -> outfitter::Result<ProcessResult>,
{
    fn run(&self, request: &ProcessRequest) -> outfitter::Result<ProcessResult> {
        self.calls.lock().unwrap().push(request.clone());
        (self.script)(request)
    }
}

fn ok_stdout(stdout: &str) -> outfitter::Result<ProcessResult> {
    Ok(ProcessResult::success(
        stdout.to_string(),
        String::new(),
        Duration::from_millis(1),
    ))
}

fn create_fake_binary(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, "#!/bin/sh\n").unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }
}

/// Profile that discovers through one controlled directory, using the
/// well-known-directory strategy so the live PATH never interferes.
fn profile_in(tool: &str, install_dir: &Path) -> ToolProfile {
    ToolProfile::new(tool)
        .with_windows_extension("cmd")
        .with_windows_search_dirs(vec![install_dir.to_path_buf()])
}

fn is_probe(request: &ProcessRequest) -> bool {
    request.args == vec!["--version".to_string()]
}

#[test]
fn compatible_install_reaches_ready_without_downloader_or_installer() {
    let temp = TempDir::new().unwrap();
    let binary = temp.path().join("tool-ready.cmd");
    create_fake_binary(&binary);

    let profile = profile_in("tool-ready", temp.path());
    let runner = ScriptedRunner::new(|request| {
        assert!(is_probe(request), "only the version probe may run");
        ok_stdout("v1.0.0")
    });

    let provisioner = Provisioner::new(&profile, PlatformFamily::Windows, &runner);
    // Tool is at exactly the minimum: no download, no install.
    let outcome = provisioner.ensure(&ToolVersion::new(1, 0, 0)).unwrap();

    assert!(!outcome.installed);
    assert_eq!(outcome.version, ToolVersion::new(1, 0, 0));
    assert_eq!(outcome.location.path, binary);
    assert_eq!(outcome.location.origin, LocationOrigin::WellKnownDirectory);
    assert_eq!(runner.commands().len(), 1);
}

#[test]
fn absent_tool_downloads_installs_and_reverifies() {
    let server = MockServer::start();
    let artifact = server.mock(|when, then| {
        when.method(GET).path("/tool-absent.msi");
        then.status(200).body("INSTALLER BYTES");
    });

    let temp = TempDir::new().unwrap();
    let install_dir = temp.path().join("install");
    fs::create_dir_all(&install_dir).unwrap();
    let staging = temp.path().join("staging");
    fs::create_dir_all(&staging).unwrap();

    let profile = profile_in("tool-absent", &install_dir).with_artifact_url(
        PlatformFamily::Windows,
        server.url("/tool-absent.msi"),
    );

    let binary = install_dir.join("tool-absent.cmd");
    let binary_for_script = binary.clone();
    let runner = ScriptedRunner::new(move |request| {
        if request.command == "msiexec" {
            assert!(request.args.contains(&"/qn".to_string()));
            create_fake_binary(&binary_for_script);
            return ok_stdout("");
        }
        assert!(is_probe(request));
        ok_stdout("v2.0.0")
    });

    let provisioner = Provisioner::new(&profile, PlatformFamily::Windows, &runner)
        .with_download_dir(staging.clone());
    let outcome = provisioner.ensure(&ToolVersion::new(1, 5, 0)).unwrap();

    artifact.assert();
    assert!(outcome.installed);
    assert_eq!(outcome.version, ToolVersion::new(2, 0, 0));
    assert_eq!(outcome.location.path, binary);

    // Install first, then the re-verification probe; never a probe before,
    // because the tool did not exist.
    let commands = runner.commands();
    assert_eq!(commands.len(), 2);
    assert_eq!(commands[0], "msiexec");
    assert!(commands[1].ends_with("tool-absent.cmd"));

    // The artifact was attempt-scoped and is gone.
    let leftovers: Vec<_> = fs::read_dir(&staging).unwrap().collect();
    assert!(leftovers.is_empty());
}

#[test]
fn outdated_tool_is_reinstalled() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/tool-outdated.msi");
        then.status(200).body("INSTALLER BYTES");
    });

    let temp = TempDir::new().unwrap();
    let binary = temp.path().join("tool-outdated.cmd");
    create_fake_binary(&binary);

    let profile = profile_in("tool-outdated", temp.path()).with_artifact_url(
        PlatformFamily::Windows,
        server.url("/tool-outdated.msi"),
    );

    let upgraded = AtomicBool::new(false);
    let runner = ScriptedRunner::new(move |request| {
        if request.command == "msiexec" {
            upgraded.store(true, Ordering::SeqCst);
            return ok_stdout("");
        }
        if upgraded.load(Ordering::SeqCst) {
            ok_stdout("v2.0.0")
        } else {
            ok_stdout("v0.9.0")
        }
    });

    let provisioner = Provisioner::new(&profile, PlatformFamily::Windows, &runner);
    let outcome = provisioner.ensure(&ToolVersion::new(1, 0, 0)).unwrap();

    assert!(outcome.installed);
    assert_eq!(outcome.version, ToolVersion::new(2, 0, 0));
    let commands = runner.commands();
    assert_eq!(commands.len(), 3);
    assert_eq!(commands[1], "msiexec");
}

#[test]
fn unparsable_version_is_treated_as_incompatible_not_fatal() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/tool-garbled.msi");
        then.status(200).body("INSTALLER BYTES");
    });

    let temp = TempDir::new().unwrap();
    create_fake_binary(&temp.path().join("tool-garbled.cmd"));

    let profile = profile_in("tool-garbled", temp.path()).with_artifact_url(
        PlatformFamily::Windows,
        server.url("/tool-garbled.msi"),
    );

    let upgraded = AtomicBool::new(false);
    let runner = ScriptedRunner::new(move |request| {
        if request.command == "msiexec" {
            upgraded.store(true, Ordering::SeqCst);
            return ok_stdout("");
        }
        if upgraded.load(Ordering::SeqCst) {
            ok_stdout("v2.0.0")
        } else {
            ok_stdout("garbage")
        }
    });

    let provisioner = Provisioner::new(&profile, PlatformFamily::Windows, &runner);
    let outcome = provisioner.ensure(&ToolVersion::new(1, 0, 0)).unwrap();
    assert!(outcome.installed);
}

#[test]
fn failed_download_is_terminal_and_leaves_no_artifact() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/tool-no-artifact.msi");
        then.status(404);
    });

    let temp = TempDir::new().unwrap();
    let install_dir = temp.path().join("install");
    fs::create_dir_all(&install_dir).unwrap();
    let staging = temp.path().join("staging");
    fs::create_dir_all(&staging).unwrap();

    let profile = profile_in("tool-no-artifact", &install_dir).with_artifact_url(
        PlatformFamily::Windows,
        server.url("/tool-no-artifact.msi"),
    );

    let runner = ScriptedRunner::new(|_request| {
        panic!("no process may run when the download fails");
    });

    let provisioner = Provisioner::new(&profile, PlatformFamily::Windows, &runner)
        .with_download_dir(staging.clone());
    let err = provisioner.ensure(&ToolVersion::new(1, 0, 0)).unwrap_err();

    assert_eq!(err.stage(), Some(ProvisionStage::Downloading));
    match err.root() {
        OutfitterError::Download { status, .. } => assert_eq!(*status, 404),
        other => panic!("Expected Download error, got {other:?}"),
    }
    let leftovers: Vec<_> = fs::read_dir(&staging).unwrap().collect();
    assert!(leftovers.is_empty());
}

#[test]
fn installer_failure_is_an_install_error_tagged_with_its_stage() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/tool-badinstall.msi");
        then.status(200).body("INSTALLER BYTES");
    });

    let temp = TempDir::new().unwrap();
    let install_dir = temp.path().join("install");
    fs::create_dir_all(&install_dir).unwrap();

    let profile = profile_in("tool-badinstall", &install_dir).with_artifact_url(
        PlatformFamily::Windows,
        server.url("/tool-badinstall.msi"),
    );

    let runner = ScriptedRunner::new(|request| {
        assert_eq!(request.command, "msiexec");
        Err(OutfitterError::Process {
            command: request.display(),
            exit_code: Some(1603),
            stderr: "fatal error during installation".into(),
        })
    });

    let provisioner = Provisioner::new(&profile, PlatformFamily::Windows, &runner);
    let err = provisioner.ensure(&ToolVersion::new(1, 0, 0)).unwrap_err();

    assert_eq!(err.stage(), Some(ProvisionStage::Installing));
    assert!(matches!(err.root(), OutfitterError::Install { .. }));
}

#[test]
fn declined_elevation_is_a_permission_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/tool-noelevate.deb");
        then.status(200).body("PACKAGE BYTES");
    });

    // Linux family: PATH-only discovery finds nothing for this name, so the
    // attempt goes straight to download and an elevated package install.
    let profile = ToolProfile::new("outfitter-test-tool-noelevate").with_artifact_url(
        PlatformFamily::Linux,
        server.url("/tool-noelevate.deb"),
    );

    let runner = ScriptedRunner::new(|request| {
        assert_eq!(request.command, "apt-get");
        assert!(request.elevated);
        Err(OutfitterError::Process {
            command: request.display(),
            exit_code: Some(1),
            stderr: "sudo: a password is required".into(),
        })
    });

    let provisioner = Provisioner::new(&profile, PlatformFamily::Linux, &runner);
    let err = provisioner.ensure(&ToolVersion::new(1, 0, 0)).unwrap_err();

    assert_eq!(err.stage(), Some(ProvisionStage::Installing));
    assert!(matches!(err.root(), OutfitterError::Permission { .. }));
}

#[test]
fn silent_installer_success_without_a_binary_is_a_verification_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/tool-phantom.msi");
        then.status(200).body("INSTALLER BYTES");
    });

    let temp = TempDir::new().unwrap();
    let install_dir = temp.path().join("install");
    fs::create_dir_all(&install_dir).unwrap();

    let profile = profile_in("tool-phantom", &install_dir).with_artifact_url(
        PlatformFamily::Windows,
        server.url("/tool-phantom.msi"),
    );

    // Installer reports success but never creates the binary.
    let runner = ScriptedRunner::new(|_request| ok_stdout(""));

    let provisioner = Provisioner::new(&profile, PlatformFamily::Windows, &runner);
    let err = provisioner.ensure(&ToolVersion::new(1, 0, 0)).unwrap_err();

    assert_eq!(err.stage(), Some(ProvisionStage::Verifying));
    assert!(
        matches!(err.root(), OutfitterError::PostInstallVerification { .. }),
        "verification shortfall must not surface as an install error"
    );
}

#[test]
fn still_outdated_after_install_is_a_verification_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/tool-stale.msi");
        then.status(200).body("INSTALLER BYTES");
    });

    let temp = TempDir::new().unwrap();
    let binary = temp.path().join("tool-stale.cmd");
    create_fake_binary(&binary);

    let profile = profile_in("tool-stale", temp.path())
        .with_artifact_url(PlatformFamily::Windows, server.url("/tool-stale.msi"));

    // The installer "succeeds" but the probed version never improves.
    let runner = ScriptedRunner::new(|request| {
        if request.command == "msiexec" {
            ok_stdout("")
        } else {
            ok_stdout("v0.9.0")
        }
    });

    let provisioner = Provisioner::new(&profile, PlatformFamily::Windows, &runner);
    let err = provisioner.ensure(&ToolVersion::new(1, 0, 0)).unwrap_err();

    assert_eq!(err.stage(), Some(ProvisionStage::Verifying));
    match err.root() {
        OutfitterError::PostInstallVerification { message, .. } => {
            assert!(message.contains("0.9.0"));
        }
        other => panic!("Expected PostInstallVerification, got {other:?}"),
    }
}

#[test]
fn concurrent_ensure_for_the_same_tool_is_rejected() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/tool-concurrent.msi");
        then.status(200).body("INSTALLER BYTES");
    });

    let temp = TempDir::new().unwrap();
    let install_dir = temp.path().join("install");
    fs::create_dir_all(&install_dir).unwrap();

    let profile = profile_in("tool-concurrent", &install_dir).with_artifact_url(
        PlatformFamily::Windows,
        server.url("/tool-concurrent.msi"),
    );

    let entered_install = AtomicBool::new(false);
    let release_install = AtomicBool::new(false);
    let binary = install_dir.join("tool-concurrent.cmd");

    let binary_for_script = binary.clone();
    let entered = &entered_install;
    let release = &release_install;
    let runner = ScriptedRunner::new(move |request| {
        if request.command == "msiexec" {
            entered.store(true, Ordering::SeqCst);
            while !release.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(5));
            }
            create_fake_binary(&binary_for_script);
            return ok_stdout("");
        }
        ok_stdout("v2.0.0")
    });

    thread::scope(|scope| {
        let first = scope.spawn(|| {
            let provisioner = Provisioner::new(&profile, PlatformFamily::Windows, &runner);
            provisioner.ensure(&ToolVersion::new(1, 0, 0))
        });

        while !entered_install.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(5));
        }

        // The first attempt is parked inside the installer; a second attempt
        // for the same tool must be rejected, never run a second installer.
        let provisioner = Provisioner::new(&profile, PlatformFamily::Windows, &runner);
        let err = provisioner.ensure(&ToolVersion::new(1, 0, 0)).unwrap_err();
        assert!(matches!(err, OutfitterError::InProgress { .. }));

        release_install.store(true, Ordering::SeqCst);
        let outcome = first.join().unwrap().unwrap();
        assert!(outcome.installed);
    });

    let installer_runs = runner
        .calls
        .lock()
        .unwrap()
        .iter()
        .filter(|r| r.command == "msiexec")
        .count();
    assert_eq!(installer_runs, 1);
}

#[test]
fn missing_artifact_url_fails_before_downloading() {
    let temp = TempDir::new().unwrap();
    let install_dir = temp.path().join("install");
    fs::create_dir_all(&install_dir).unwrap();

    // No artifact URL published for any family.
    let profile = profile_in("tool-nourl", &install_dir);
    let runner = ScriptedRunner::new(|_request| panic!("nothing to run"));

    let provisioner = Provisioner::new(&profile, PlatformFamily::Windows, &runner);
    let err = provisioner.ensure(&ToolVersion::new(1, 0, 0)).unwrap_err();

    assert_eq!(err.stage(), Some(ProvisionStage::Downloading));
    assert!(matches!(err.root(), OutfitterError::Install { .. }));
}

#[test]
fn outcome_paths_are_absolute() {
    let temp = TempDir::new().unwrap();
    let binary = temp.path().join("tool-abs.cmd");
    create_fake_binary(&binary);

    let profile = profile_in("tool-abs", temp.path());
    let runner = ScriptedRunner::new(|_request| ok_stdout("v1.0.0"));

    let provisioner = Provisioner::new(&profile, PlatformFamily::Windows, &runner);
    let outcome = provisioner.ensure(&ToolVersion::new(1, 0, 0)).unwrap();
    assert_eq!(outcome.location.path, PathBuf::from(&binary));
    assert!(outcome.location.path.is_absolute());
}
