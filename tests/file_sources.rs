use std::fs;
use std::path::PathBuf;

use paramdb::settings::Settings;
use paramdb::store::resolve_path;
use paramdb::{ErrorKind, LoadOptions, Overwrite, Store};

// Each test works in its own directory so they can run in parallel.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("paramdb_{name}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("scratch dir");
    dir
}

#[test]
fn read_file_with_prefix_and_policy() {
    let dir = scratch_dir("read_file");
    let path = dir.join("detector.dat");
    fs::write(&path, "gain 2.5 adc/pe\n=geo= id x\n1 0.5\n").unwrap();

    let mut store = Store::new();
    let options = LoadOptions { prefix: Some("det".into()), ..LoadOptions::default() };
    assert_eq!(store.read_file(&path, &options).unwrap(), 2);
    assert_eq!(store.num_value("det.gain").unwrap(), 2.5);
    assert_eq!(store.str_value("det.gain").unwrap(), "adc/pe");
    assert!(store.has_table("geo"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_file_is_a_resource_error() {
    let dir = scratch_dir("missing");
    let mut store = Store::new();
    let err = store
        .read_file(dir.join("absent.dat"), &LoadOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Resource);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn paths_relative_to_environment_variable() {
    let dir = scratch_dir("env_path");
    fs::write(dir.join("base.dat"), "answer 42\n").unwrap();
    // SAFETY: the variable name is only used by this test
    unsafe { std::env::set_var("PARAMDB_TEST_ENV_PATH", &dir) };

    assert_eq!(resolve_path("PARAMDB_TEST_ENV_PATH").unwrap(), dir);
    let mut store = Store::new();
    let options = LoadOptions {
        env_path: Some("PARAMDB_TEST_ENV_PATH".into()),
        ..LoadOptions::default()
    };
    store.read_file("base.dat", &options).unwrap();
    assert_eq!(store.num_value("answer").unwrap(), 42.0);

    store
        .write_text_file("dump.dat", Some("PARAMDB_TEST_ENV_PATH"))
        .unwrap();
    assert_eq!(fs::read_to_string(dir.join("dump.dat")).unwrap(), "answer 42\n");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn undefined_environment_variable() {
    assert_eq!(
        resolve_path("PARAMDB_TEST_NEVER_DEFINED").unwrap_err().kind(),
        ErrorKind::Resource
    );
    assert_eq!(resolve_path("").unwrap_err().kind(), ErrorKind::Resource);
    let mut store = Store::new();
    let options = LoadOptions {
        env_path: Some("PARAMDB_TEST_NEVER_DEFINED".into()),
        ..LoadOptions::default()
    };
    assert_eq!(
        store.read_file("x.dat", &options).unwrap_err().kind(),
        ErrorKind::Resource
    );
}

#[test]
fn unwritable_output_is_a_resource_error() {
    let dir = scratch_dir("unwritable");
    let store = Store::new();
    let err = store
        .write_text_file(dir.join("no_such_dir").join("out.dat"), None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Resource);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn settings_from_toml() {
    let settings = Settings::from_toml(
        r#"
        output = "merged.dat"

        [[sources]]
        path = "a.dat"

        [[sources]]
        path = "b.dat"
        prefix = "b"
        overwrite = "override"
        "#,
    )
    .unwrap();
    assert_eq!(settings.log_filter, "info");
    assert_eq!(settings.output.as_deref(), Some("merged.dat"));
    assert_eq!(settings.sources.len(), 2);
    assert_eq!(settings.sources[0].overwrite, Overwrite::Keep);
    assert_eq!(settings.sources[1].overwrite, Overwrite::Override);
    assert_eq!(settings.sources[1].options().prefix.as_deref(), Some("b"));
}

#[test]
fn bad_settings_are_config_errors() {
    let err = Settings::from_toml("[[sources]]\nprefix = \"no path\"\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn settings_load_sources_in_order() {
    let dir = scratch_dir("settings");
    fs::write(dir.join("a.dat"), "x 1\ny 1\n").unwrap();
    fs::write(dir.join("b.dat"), "x 2\nz 2\n").unwrap();
    let text = format!(
        "[[sources]]\npath = {a:?}\n\n[[sources]]\npath = {b:?}\noverwrite = \"override\"\n",
        a = dir.join("a.dat").display().to_string(),
        b = dir.join("b.dat").display().to_string(),
    );
    let settings = Settings::from_toml(&text).unwrap();

    let mut store = Store::new();
    assert_eq!(settings.load_sources(&mut store).unwrap(), 4);
    assert_eq!(store.keys(), ["x", "y", "z"]);
    assert_eq!(store.num_value("x").unwrap(), 2.0);

    let _ = fs::remove_dir_all(&dir);
}
