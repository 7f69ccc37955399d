use std::path::Path;

use assert_cmd::Command;
use assert_fs::prelude::*;
use indoc::indoc;
use predicates::prelude::*;

use bzlpip_wheel::WheelBuilder;

/// A `bzlpip` command isolated from the caller's environment and configuration.
fn bzlpip(cwd: &Path) -> Command {
    let mut command = Command::cargo_bin("bzlpip").unwrap();
    command
        .current_dir(cwd)
        .env_remove("BZLPIP_PREFIX")
        .env_remove("BZLPIP_PYTHON")
        .env_remove("BZLPIP_PYTHON_VERSION")
        .env_remove("BZLPIP_CONFIG_FILE")
        .env_remove("BZLPIP_NO_CONFIG")
        .env_remove("RUST_LOG");
    command
}

fn sample() -> WheelBuilder {
    WheelBuilder::new("sample", "1.0")
        .file("sample/__init__.py", "")
        .requires_dist("Six>=1.16")
        .requires_dist("PySocks; extra == \"socks\"")
}

#[test]
fn extract() {
    let root = assert_fs::TempDir::new().unwrap();
    let wheel = sample().write(root.path()).unwrap();

    bzlpip(root.path())
        .arg("extract")
        .arg(&wheel)
        .args(["--python-version", "3.11", "--no-config"])
        .assert()
        .success()
        .stdout("//pypi__sample\n");

    root.child("pypi__sample/BUILD.bazel")
        .assert(predicate::str::contains(r#"deps = ["//pypi__six"],"#));
    assert!(!wheel.exists());
}

#[test]
fn extract_into_directory() {
    let root = assert_fs::TempDir::new().unwrap();
    let downloads = assert_fs::TempDir::new().unwrap();
    let wheel = sample().write(downloads.path()).unwrap();

    bzlpip(downloads.path())
        .arg("extract")
        .arg(&wheel)
        .arg("--directory")
        .arg(root.path())
        .args(["--python-version", "3.11", "--no-config"])
        .assert()
        .success()
        .stdout("//pypi__sample\n");

    root.child("pypi__sample/sample/__init__.py")
        .assert(predicate::path::is_file());
}

#[test]
fn extract_incremental() {
    let root = assert_fs::TempDir::new().unwrap();
    let wheel = sample().write(root.path()).unwrap();

    bzlpip(root.path())
        .arg("extract")
        .arg(&wheel)
        .args(["--incremental", "--python-version", "3.11", "--no-config"])
        .assert()
        .success()
        .stdout("//.\n");

    root.child("BUILD.bazel")
        .assert(predicate::str::contains(r#"deps = ["@pypi__six//:pkg"],"#));
    assert!(wheel.exists());
}

#[test]
fn extract_with_options() {
    let root = assert_fs::TempDir::new().unwrap();
    let wheel = sample().write(root.path()).unwrap();

    bzlpip(root.path())
        .arg("extract")
        .arg(&wheel)
        .args([
            "--prefix",
            "deps_",
            "--extra",
            "sample[socks]",
            "--pip-data-exclude",
            "**/tests/**",
            "--python-version",
            "3.11",
            "--no-config",
        ])
        .assert()
        .success()
        .stdout("//deps_sample\n");

    let build = root.child("deps_sample/BUILD.bazel");
    build.assert(predicate::str::contains(
        r#"deps = ["//deps_pysocks","//deps_six"],"#,
    ));
    build.assert(predicate::str::contains(r#""WORKSPACE", "**/tests/**"]"#));
}

#[test]
fn extract_environment_variables() {
    let root = assert_fs::TempDir::new().unwrap();
    let wheel = sample().write(root.path()).unwrap();

    bzlpip(root.path())
        .arg("extract")
        .arg(&wheel)
        .env("BZLPIP_PREFIX", "env_")
        .env("BZLPIP_PYTHON_VERSION", "3.12")
        .env("BZLPIP_NO_CONFIG", "1")
        .assert()
        .success()
        .stdout("//env_sample\n");
}

#[test]
fn extract_configuration_file() {
    let root = assert_fs::TempDir::new().unwrap();
    root.child("bzlpip.toml")
        .write_str(indoc! {r#"
            prefix = "cfg_"
            pip-data-exclude = ["**/*.md"]
            python-version = "3.11"
        "#})
        .unwrap();

    let wheel = sample().write(root.path()).unwrap();
    bzlpip(root.path())
        .arg("extract")
        .arg(&wheel)
        .assert()
        .success()
        .stdout("//cfg_sample\n");
    root.child("cfg_sample/BUILD.bazel")
        .assert(predicate::str::contains(r#""WORKSPACE", "**/*.md"]"#));

    // The command line takes precedence over the file.
    let wheel = WheelBuilder::new("other", "1.0").write(root.path()).unwrap();
    bzlpip(root.path())
        .arg("extract")
        .arg(&wheel)
        .args(["--prefix", "cli_"])
        .assert()
        .success()
        .stdout("//cli_other\n");
}

#[test]
fn extract_invalid_configuration_file() {
    let root = assert_fs::TempDir::new().unwrap();
    let config = root.child("custom.toml");
    config.write_str("unknown-key = true\n").unwrap();
    let wheel = sample().write(root.path()).unwrap();

    bzlpip(root.path())
        .arg("extract")
        .arg(&wheel)
        .arg("--config-file")
        .arg(config.path())
        .args(["--python-version", "3.11"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: Failed to parse:"));
}

#[test]
fn extract_already_extracted() {
    let root = assert_fs::TempDir::new().unwrap();
    let wheel = sample().write(root.path()).unwrap();
    root.child("pypi__sample").create_dir_all().unwrap();

    bzlpip(root.path())
        .arg("extract")
        .arg(&wheel)
        .args(["--python-version", "3.11", "--no-config"])
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("error: Failed to extract wheel:"))
        .stderr(predicate::str::contains(
            "Caused by: The package directory already exists:",
        ));

    assert!(wheel.exists());
}

#[test]
fn extract_quiet() {
    let root = assert_fs::TempDir::new().unwrap();
    let wheel = sample().write(root.path()).unwrap();

    bzlpip(root.path())
        .arg("extract")
        .arg(&wheel)
        .args(["--quiet", "--python-version", "3.11", "--no-config"])
        .assert()
        .success()
        .stdout("");

    root.child("pypi__sample/BUILD.bazel")
        .assert(predicate::path::is_file());
}

#[test]
fn requirements() {
    let root = assert_fs::TempDir::new().unwrap();

    let output = bzlpip(root.path())
        .args(["requirements", "--repo", "@pip", "//pypi__six", "//pypi__numpy"])
        .output()
        .unwrap();
    assert!(output.status.success());

    insta::assert_snapshot!(String::from_utf8_lossy(&output.stdout), @r#"
    all_requirements = ["@pip//pypi__numpy","@pip//pypi__six"]

    all_whl_requirements = ["@pip//pypi__numpy:whl","@pip//pypi__six:whl"]

    def requirement(name):
       name_key = name.replace("-", "_").replace(".", "_").lower()
       return "@pip//pypi__" + name_key

    def whl_requirement(name):
        return requirement(name) + ":whl"

    def install_deps():
        fail("install_deps() only works if you are creating an incremental repo. Did you mean to use pip_install_incremental()?")
    "#);
}

#[test]
fn requirements_output_file() {
    let root = assert_fs::TempDir::new().unwrap();

    bzlpip(root.path())
        .args([
            "requirements",
            "--repo",
            "@pip",
            "--output",
            "requirements.bzl",
            "//pypi__six",
        ])
        .assert()
        .success()
        .stdout("");

    root.child("requirements.bzl").assert(predicate::str::starts_with(
        "all_requirements = [\"@pip//pypi__six\"]\n",
    ));
}

#[test]
fn extract_namespace_flag_overrides_configuration() {
    let root = assert_fs::TempDir::new().unwrap();
    root.child("bzlpip.toml")
        .write_str(indoc! {r#"
            enable-implicit-namespace-pkgs = true
            python-version = "3.11"
        "#})
        .unwrap();
    let builder = WheelBuilder::new("google-cloud-storage", "2.14.0")
        .file("google/cloud/storage/client.py", "");

    let wheel = builder.write(root.path()).unwrap();
    bzlpip(root.path())
        .arg("extract")
        .arg(&wheel)
        .assert()
        .success();
    root.child("pypi__google_cloud_storage/google/__init__.py")
        .assert(predicate::path::missing());

    let wheel = builder.write(root.path()).unwrap();
    bzlpip(root.path())
        .arg("extract")
        .arg(&wheel)
        .args(["--prefix", "compat_", "--no-enable-implicit-namespace-pkgs"])
        .assert()
        .success()
        .stdout("//compat_google_cloud_storage\n");
    root.child("compat_google_cloud_storage/google/__init__.py")
        .assert(predicate::str::contains("pkgutil"));
}
