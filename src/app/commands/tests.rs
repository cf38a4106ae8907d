use super::*;

use crate::app::error::{ERR_NO_DEVICE, ERR_VALIDATION};
use crate::app::testing::ScriptedBridge;

fn quiet_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.retry.delay_ms = 0;
    config.retry.settle_delay_ms = 0;
    config
}

#[test]
fn resolve_trace_id_keeps_caller_value() {
    assert_eq!(resolve_trace_id(Some("abc".to_string())), "abc");
    let generated = resolve_trace_id(Some("  ".to_string()));
    assert!(Uuid::parse_str(&generated).is_ok());
}

#[test]
fn requested_serial_prefers_override_over_config() {
    let mut config = AppConfig::default();
    config.adb.serial = "from-config".to_string();
    let bridge = BridgeOptions {
        serial: Some("from-cli".to_string()),
        ..BridgeOptions::default()
    };
    assert_eq!(requested_serial(&config, &bridge).as_deref(), Some("from-cli"));
    assert_eq!(
        requested_serial(&config, &BridgeOptions::default()).as_deref(),
        Some("from-config")
    );
    config.adb.serial = " ".to_string();
    assert_eq!(requested_serial(&config, &BridgeOptions::default()), None);
}

#[test]
fn resolve_output_dir_falls_back_in_order() {
    let mut config = AppConfig::default();
    assert_eq!(
        resolve_output_dir(None, &config),
        PathBuf::from(DEFAULT_OUTPUT_DIR)
    );
    config.output_path = "/tmp/configured".to_string();
    assert_eq!(
        resolve_output_dir(Some(String::new()), &config),
        PathBuf::from("/tmp/configured")
    );
    assert_eq!(
        resolve_output_dir(Some("/tmp/cli".to_string()), &config),
        PathBuf::from("/tmp/cli")
    );
}

#[test]
fn probe_settings_override_settle_delay() {
    let config = AppConfig::default();
    assert_eq!(
        probe_settings(&config, None).settle_delay,
        Duration::from_millis(1000)
    );
    assert_eq!(probe_settings(&config, Some(0)).settle_delay, Duration::ZERO);
}

#[test]
fn check_text_rejects_empty_pattern_before_touching_adb() {
    let mut config = quiet_config();
    config.adb.command_path = "/this/path/should/not/exist/adb".to_string();
    let request = CheckTextRequest {
        pattern: "   ".to_string(),
        trace_id: Some("trace-empty".to_string()),
        ..CheckTextRequest::default()
    };
    let err = check_text(request, &config, &CancelToken::new()).expect_err("empty pattern");
    assert_eq!(err.code, ERR_VALIDATION);
    assert_eq!(err.trace_id, "trace-empty");
    assert!(err.error.contains("pattern"));
}

#[test]
fn check_text_rejects_missing_adb_binary() {
    let mut config = quiet_config();
    config.adb.command_path = "/this/path/should/not/exist/adb".to_string();
    let request = CheckTextRequest {
        pattern: "Login".to_string(),
        ..CheckTextRequest::default()
    };
    let err = check_text(request, &config, &CancelToken::new()).expect_err("no adb");
    assert_eq!(err.code, ERR_VALIDATION);
    assert!(err.error.to_lowercase().contains("not found"));
}

#[test]
fn check_text_inner_reports_found_snapshot() {
    let bridge = ScriptedBridge::new(|line| match line {
        "shell cat /sdcard/window_dump.xml" => Ok("<node text=\"Login\"/>".to_string()),
        _ => Ok(String::new()),
    });
    let settings = probe_settings(&quiet_config(), Some(0));
    let report = check_text_inner(
        &bridge,
        &settings,
        "login",
        3,
        0,
        &CancelToken::new(),
        "trace",
    )
    .expect("report");
    assert!(report.found);
    assert_eq!(report.attempts, 1);
    assert_eq!(report.snapshot.as_deref(), Some("<node text=\"Login\"/>"));
}

#[cfg(unix)]
mod fake_adb {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    /// Writes an executable stand-in for adb that logs its arguments and serves a fixed
    /// device listing and dump.
    fn install(dir: &Path, listing: &str, dump: &str) -> (String, PathBuf) {
        let log = dir.join("calls.log");
        let script = dir.join("adb");
        let body = format!(
            r#"#!/bin/sh
echo "$*" >> "{log}"
if [ "$1" = "-s" ]; then shift 2; fi
case "$*" in
  "devices -l") printf '{listing}' ;;
  "shell uiautomator dump") echo "UI hierchary dumped to: /sdcard/window_dump.xml" ;;
  "shell cat /sdcard/window_dump.xml") printf '%s\n' '{dump}' ;;
  "shell cat "*) echo "cat: No such file or directory" >&2; exit 1 ;;
  *) exit 0 ;;
esac
"#,
            log = log.display(),
        );
        fs::write(&script, body).expect("write fake adb");
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).expect("chmod");
        (script.to_string_lossy().to_string(), log)
    }

    fn config_for(program: String) -> AppConfig {
        let mut config = quiet_config();
        config.adb.command_path = program;
        config
    }

    #[test]
    fn check_text_end_to_end_through_real_runner() {
        let tmp = tempfile::tempdir().expect("tmp");
        let (program, log) = install(
            tmp.path(),
            "List of devices attached\\nemulator-5554 device model:Pixel_7\\n",
            "<hierarchy><node text=\"Login\"/></hierarchy>",
        );
        let request = CheckTextRequest {
            pattern: "LOGIN".to_string(),
            max_attempts: Some(2),
            delay_ms: Some(0),
            settle_delay_ms: Some(0),
            ..CheckTextRequest::default()
        };

        let response =
            check_text(request, &config_for(program), &CancelToken::new()).expect("check");
        assert!(response.data.found);
        assert_eq!(response.data.attempts, 1);

        let calls = fs::read_to_string(log).expect("log");
        assert!(calls.lines().next().unwrap_or_default().starts_with("devices -l"));
        assert!(calls.contains("-s emulator-5554 shell uiautomator dump"));
        assert!(calls.contains("-s emulator-5554 shell am force-stop com.android.commands.uiautomator"));
    }

    #[test]
    fn check_text_without_devices_fails_before_any_capture() {
        let tmp = tempfile::tempdir().expect("tmp");
        let (program, log) = install(tmp.path(), "List of devices attached\\n\\n", "");
        let request = CheckTextRequest {
            pattern: "Login".to_string(),
            ..CheckTextRequest::default()
        };

        let err = check_text(request, &config_for(program), &CancelToken::new())
            .expect_err("no device");
        assert_eq!(err.code, ERR_NO_DEVICE);
        let calls = fs::read_to_string(log).expect("log");
        assert!(!calls.contains("uiautomator"));
    }

    #[test]
    fn find_writable_path_uses_first_candidate() {
        let tmp = tempfile::tempdir().expect("tmp");
        let (program, _log) = install(
            tmp.path(),
            "List of devices attached\\nemulator-5554 device\\n",
            "",
        );
        let response = find_writable_path(&config_for(program), &BridgeOptions::default(), None)
            .expect("writable");
        assert_eq!(response.data, "/sdcard");
    }
}
