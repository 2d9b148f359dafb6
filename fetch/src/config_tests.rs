//! Tests for configuration layering.

use super::*;
use crate::dirs::MockBaseDirs;
use rstest::{fixture, rstest};
use std::path::PathBuf;

#[derive(Debug, Clone)]
struct TestBaseDirs {
    config_dir: Option<PathBuf>,
    current_dir: Option<PathBuf>,
}

impl BaseDirs for TestBaseDirs {
    fn config_dir(&self) -> Option<PathBuf> {
        self.config_dir.clone()
    }

    fn current_dir(&self) -> Option<PathBuf> {
        self.current_dir.clone()
    }
}

#[fixture]
fn dirs() -> TestBaseDirs {
    TestBaseDirs {
        config_dir: None,
        current_dir: Some(PathBuf::from("/work")),
    }
}

fn utf8(path: &std::path::Path) -> Utf8PathBuf {
    Utf8PathBuf::try_from(path.to_path_buf()).expect("UTF-8 path")
}

#[rstest]
fn defaults_apply_when_nothing_is_configured(dirs: TestBaseDirs) {
    let settings = Settings::resolve(
        &ConfigOverrides::default(),
        None,
        &FileConfig::default(),
        &dirs,
    )
    .expect("resolve");

    assert_eq!(settings.source.as_str(), DEFAULT_SOURCE);
    assert_eq!(settings.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
    assert_eq!(settings.output_dir, Utf8PathBuf::from("/work"));
}

#[rstest]
#[case::flag_wins(Some("https://flag.test/r"), Some("https://env.test/r"), "https://flag.test/r")]
#[case::env_beats_file(None, Some("https://env.test/r"), "https://env.test/r")]
#[case::blank_env_ignored(None, Some("  "), "https://file.test/r")]
#[case::file_beats_default(None, None, "https://file.test/r")]
fn source_layers_in_priority_order(
    dirs: TestBaseDirs,
    #[case] flag: Option<&str>,
    #[case] env: Option<&str>,
    #[case] expected: &str,
) {
    let overrides = ConfigOverrides {
        source: flag,
        ..ConfigOverrides::default()
    };
    let file = FileConfig {
        source: Some("https://file.test/r".to_owned()),
        connect_timeout_secs: None,
    };

    let settings = Settings::resolve(&overrides, env, &file, &dirs).expect("resolve");
    assert_eq!(settings.source.as_str(), expected);
}

#[rstest]
fn plain_path_source_becomes_directory_url(dirs: TestBaseDirs) {
    let overrides = ConfigOverrides {
        source: Some("mirror/releases"),
        ..ConfigOverrides::default()
    };

    let settings =
        Settings::resolve(&overrides, None, &FileConfig::default(), &dirs).expect("resolve");

    assert_eq!(settings.source.scheme(), "file");
    assert!(
        settings.source.path().ends_with("/work/mirror/releases/"),
        "got {}",
        settings.source
    );
}

#[rstest]
#[case::ftp("ftp://example.test/releases")]
#[case::garbage("http://[::1")]
fn rejects_unusable_sources(dirs: TestBaseDirs, #[case] source: &str) {
    let overrides = ConfigOverrides {
        source: Some(source),
        ..ConfigOverrides::default()
    };

    let err = Settings::resolve(&overrides, None, &FileConfig::default(), &dirs)
        .expect_err("invalid source");
    assert!(matches!(err, ConfigError::InvalidSource { .. }), "got {err:?}");
}

#[rstest]
fn zero_timeout_is_rejected(dirs: TestBaseDirs) {
    let file = FileConfig {
        source: None,
        connect_timeout_secs: Some(0),
    };

    let err = Settings::resolve(&ConfigOverrides::default(), None, &file, &dirs)
        .expect_err("zero timeout");
    assert!(matches!(err, ConfigError::ZeroTimeout));
}

#[rstest]
fn explicit_output_skips_current_dir() {
    let mut dirs = MockBaseDirs::new();
    dirs.expect_current_dir().never();
    let output = Utf8PathBuf::from("/srv/sources");
    let overrides = ConfigOverrides {
        output: Some(&output),
        ..ConfigOverrides::default()
    };

    let settings =
        Settings::resolve(&overrides, None, &FileConfig::default(), &dirs).expect("resolve");
    assert_eq!(settings.output_dir, output);
}

#[test]
fn missing_current_dir_is_reported() {
    let dirs = TestBaseDirs {
        config_dir: None,
        current_dir: None,
    };

    let err = Settings::resolve(&ConfigOverrides::default(), None, &FileConfig::default(), &dirs)
        .expect_err("no cwd");
    assert!(matches!(err, ConfigError::InvalidPath { .. }));
}

#[test]
fn file_config_rejects_unknown_keys() {
    let err = FileConfig::parse("sauce = \"x\"", Utf8Path::new("config.toml"))
        .expect_err("unknown key");
    assert!(err.to_string().contains("config.toml"));
}

#[test]
fn load_reads_default_file_from_config_dir() {
    let temp = tempfile::tempdir().expect("temp dir");
    std::fs::write(
        temp.path().join(CONFIG_FILE_NAME),
        "source = \"https://mirror.test/releases\"\nconnect_timeout_secs = 7\n",
    )
    .expect("write config");
    let dirs = TestBaseDirs {
        config_dir: Some(temp.path().to_path_buf()),
        current_dir: Some(temp.path().to_path_buf()),
    };

    let file = FileConfig::load(None, &dirs).expect("load");
    assert_eq!(file.source.as_deref(), Some("https://mirror.test/releases"));
    assert_eq!(file.connect_timeout_secs, Some(7));
}

#[test]
fn load_without_default_file_is_empty() {
    let temp = tempfile::tempdir().expect("temp dir");
    let dirs = TestBaseDirs {
        config_dir: Some(temp.path().join("absent")),
        current_dir: None,
    };

    let file = FileConfig::load(None, &dirs).expect("load");
    assert_eq!(file, FileConfig::default());
}

#[rstest]
fn explicit_missing_file_is_an_error(dirs: TestBaseDirs) {
    let temp = tempfile::tempdir().expect("temp dir");
    let path = utf8(&temp.path().join("nope.toml"));

    let err = FileConfig::load(Some(&path), &dirs).expect_err("missing file");
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[rstest]
fn settings_load_honours_environment(dirs: TestBaseDirs) {
    let settings = temp_env::with_var(SOURCE_ENV, Some("https://env.test/releases"), || {
        Settings::load(&ConfigOverrides::default(), &dirs)
    })
    .expect("load");

    assert_eq!(settings.source.as_str(), "https://env.test/releases");
}
