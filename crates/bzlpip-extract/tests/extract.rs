use std::collections::BTreeMap;

use anyhow::Result;
use assert_fs::prelude::*;
use predicates::prelude::*;

use bzlpip_extract::{Error, ExtractMode, ExtractOptions, extract_wheel};
use bzlpip_normalize::DistributionName;
use bzlpip_wheel::{MarkerEnvironment, PythonVersion, WheelBuilder, synthetic_markers};

fn markers() -> MarkerEnvironment {
    synthetic_markers(PythonVersion {
        major: 3,
        minor: 11,
    })
    .unwrap()
}

fn sample() -> WheelBuilder {
    WheelBuilder::new("sample", "1.0")
        .file("sample/__init__.py", "")
        .file("sample/data.json", "{}")
}

#[test]
fn standalone() -> Result<()> {
    let root = assert_fs::TempDir::new()?;
    let downloads = assert_fs::TempDir::new()?;
    let wheel = sample().write(downloads.path())?;

    let options = ExtractOptions::new(root.path(), markers());
    let address = extract_wheel(&wheel, &options)?;

    assert_eq!(address.to_string(), "//pypi__sample");
    let package = root.child("pypi__sample");
    package
        .child("BUILD.bazel")
        .assert(predicate::str::contains(r#"name = "pypi__sample","#));
    package
        .child("sample/__init__.py")
        .assert(predicate::path::is_file());
    // The copy backs the `whl` target; the original is gone.
    package
        .child("sample-1.0-py3-none-any.whl")
        .assert(predicate::path::is_file());
    assert!(!wheel.exists());

    Ok(())
}

#[test]
fn standalone_dependencies() -> Result<()> {
    let root = assert_fs::TempDir::new()?;
    let wheel = sample()
        .requires_dist("Six>=1.10")
        .requires_dist("numpy")
        .requires_dist("six; python_version >= \"3\"")
        .write(root.path())?;

    let options = ExtractOptions::new(root.path(), markers());
    extract_wheel(&wheel, &options)?;

    let contents = fs_err::read_to_string(root.child("pypi__sample/BUILD.bazel").path())?;
    insta::assert_snapshot!(contents, @r#"
    package(default_visibility = ["//visibility:public"])

    load("@rules_python//python:defs.bzl", "py_library")

    filegroup(
        name = "whl",
        srcs = glob(["*.whl"]),
        data = ["//pypi__numpy:whl","//pypi__six:whl"],
    )

    py_library(
        name = "pypi__sample",
        srcs = glob(["**/*.py"], allow_empty = True),
        data = glob(["**/*"], exclude=["*.whl", "**/*.py", "**/* *", "BUILD.bazel", "WORKSPACE"]),
        # This makes this directory a top-level in the python import
        # search path for anything that depends on this.
        imports = ["."],
        deps = ["//pypi__numpy","//pypi__six"],
    )
    "#);

    Ok(())
}

#[test]
fn incremental() -> Result<()> {
    let root = assert_fs::TempDir::new()?;
    let wheel = sample().requires_dist("typing.extensions").write(root.path())?;

    let mut options = ExtractOptions::new(root.path(), markers());
    options.mode = ExtractMode::Incremental;
    options.prefix = "pip_deps_".to_string();
    options.data_exclude = vec!["**/tests/**".to_string()];
    let address = extract_wheel(&wheel, &options)?;

    assert_eq!(address.to_string(), "//.");
    assert!(wheel.exists());
    root.child("sample/__init__.py")
        .assert(predicate::path::is_file());
    root.child("pip_deps_sample").assert(predicate::path::missing());

    let build = root.child("BUILD.bazel");
    build.assert(predicate::str::contains(r#"name = "pkg","#));
    build.assert(predicate::str::contains(
        r#"deps = ["@pip_deps_typing_extensions//:pkg"],"#,
    ));
    build.assert(predicate::str::contains(
        r#"data = ["@pip_deps_typing_extensions//:whl"],"#,
    ));
    build.assert(predicate::str::contains(r#""WORKSPACE", "**/tests/**"]"#));

    Ok(())
}

#[test]
fn extras_are_keyed_by_exact_name() -> Result<()> {
    let builder = sample()
        .requires_dist("idna")
        .requires_dist("PySocks; extra == \"socks\"");

    // Matching name: the extra is active.
    let root = assert_fs::TempDir::new()?;
    let wheel = builder.write(root.path())?;
    let mut options = ExtractOptions::new(root.path(), markers());
    options.extras = BTreeMap::from([(
        DistributionName::from("sample"),
        vec!["socks".to_string()],
    )]);
    extract_wheel(&wheel, &options)?;
    root.child("pypi__sample/BUILD.bazel").assert(predicate::str::contains(
        r#"deps = ["//pypi__idna","//pypi__pysocks"],"#,
    ));

    // A differently spelled name doesn't match.
    let root = assert_fs::TempDir::new()?;
    let wheel = builder.write(root.path())?;
    let mut options = ExtractOptions::new(root.path(), markers());
    options.extras = BTreeMap::from([(
        DistributionName::from("Sample"),
        vec!["socks".to_string()],
    )]);
    extract_wheel(&wheel, &options)?;
    root.child("pypi__sample/BUILD.bazel")
        .assert(predicate::str::contains(r#"deps = ["//pypi__idna"],"#));

    Ok(())
}

#[test]
fn unknown_extras_are_ignored() -> Result<()> {
    let root = assert_fs::TempDir::new()?;
    let wheel = sample().requires_dist("idna").write(root.path())?;

    let mut options = ExtractOptions::new(root.path(), markers());
    options.extras = BTreeMap::from([(
        DistributionName::from("sample"),
        vec!["does-not-exist".to_string()],
    )]);
    extract_wheel(&wheel, &options)?;
    root.child("pypi__sample/BUILD.bazel")
        .assert(predicate::str::contains(r#"deps = ["//pypi__idna"],"#));

    Ok(())
}

#[test]
fn no_dependencies() -> Result<()> {
    let root = assert_fs::TempDir::new()?;
    let wheel = sample().write(root.path())?;

    let options = ExtractOptions::new(root.path(), markers());
    extract_wheel(&wheel, &options)?;

    let build = root.child("pypi__sample/BUILD.bazel");
    build.assert(predicate::str::contains("    data = [],\n"));
    build.assert(predicate::str::contains("    deps = [],\n"));

    Ok(())
}

#[test]
fn namespace_packages() -> Result<()> {
    let builder = WheelBuilder::new("google-cloud-storage", "2.14.0")
        .file("google/cloud/storage/__init__.py", "")
        .file("google/cloud/storage/client.py", "");

    let root = assert_fs::TempDir::new()?;
    let wheel = builder.write(root.path())?;
    let options = ExtractOptions::new(root.path(), markers());
    let address = extract_wheel(&wheel, &options)?;
    assert_eq!(address.to_string(), "//pypi__google_cloud_storage");

    let package = root.child("pypi__google_cloud_storage");
    package
        .child("google/__init__.py")
        .assert(predicate::str::contains("pkgutil"));
    package
        .child("google/cloud/__init__.py")
        .assert(predicate::str::contains("pkgutil"));

    // Native namespace packages are kept when compatibility is disabled.
    let root = assert_fs::TempDir::new()?;
    let wheel = builder.write(root.path())?;
    let mut options = ExtractOptions::new(root.path(), markers());
    options.namespace_pkg_compatibility = false;
    extract_wheel(&wheel, &options)?;

    let package = root.child("pypi__google_cloud_storage");
    package
        .child("google/__init__.py")
        .assert(predicate::path::missing());

    Ok(())
}

#[test]
fn platform_wheel_purelib() -> Result<()> {
    let root = assert_fs::TempDir::new()?;
    let wheel = WheelBuilder::new("native", "2.0")
        .root_is_purelib(Some(false))
        .file("native/_speedups.so", "")
        .file("native-2.0.data/purelib/native/__init__.py", "")
        .file("native-2.0.data/purelib/native/helpers.py", "")
        .write(root.path())?;

    let options = ExtractOptions::new(root.path(), markers());
    extract_wheel(&wheel, &options)?;

    let package = root.child("pypi__native");
    package
        .child("native/helpers.py")
        .assert(predicate::path::is_file());
    package
        .child("native/_speedups.so")
        .assert(predicate::path::is_file());
    package
        .child("native-2.0.data/purelib")
        .assert(predicate::path::missing());

    Ok(())
}

#[test]
fn already_extracted() -> Result<()> {
    let root = assert_fs::TempDir::new()?;
    let wheel = sample().write(root.path())?;
    root.child("pypi__sample/keep.txt").write_str("keep")?;

    let options = ExtractOptions::new(root.path(), markers());
    let err = extract_wheel(&wheel, &options).unwrap_err();
    assert!(matches!(err, Error::AlreadyExtracted(_)), "{err}");

    // Nothing is touched.
    root.child("pypi__sample/keep.txt").assert("keep");
    root.child("pypi__sample/BUILD.bazel")
        .assert(predicate::path::missing());
    assert!(wheel.exists());

    Ok(())
}

#[test]
fn failure_removes_package_directory() -> Result<()> {
    let root = assert_fs::TempDir::new()?;
    let wheel = sample().root_is_purelib(None).write(root.path())?;

    let options = ExtractOptions::new(root.path(), markers());
    let err = extract_wheel(&wheel, &options).unwrap_err();
    assert!(
        matches!(
            err,
            Error::Layout(bzlpip_layout::Error::Wheel(
                bzlpip_wheel::Error::MissingRootIsPurelib(_)
            ))
        ),
        "{err}"
    );

    root.child("pypi__sample").assert(predicate::path::missing());
    assert!(wheel.exists());

    Ok(())
}

#[test]
fn repeatable() -> Result<()> {
    let first = assert_fs::TempDir::new()?;
    let second = assert_fs::TempDir::new()?;
    let builder = sample().requires_dist("numpy").requires_dist("Six");

    for root in [&first, &second] {
        let wheel = builder.write(root.path())?;
        extract_wheel(&wheel, &ExtractOptions::new(root.path(), markers()))?;
    }

    assert_eq!(
        fs_err::read_to_string(first.child("pypi__sample/BUILD.bazel").path())?,
        fs_err::read_to_string(second.child("pypi__sample/BUILD.bazel").path())?,
    );

    Ok(())
}

#[test]
fn compiled_only_wheel() -> Result<()> {
    let root = assert_fs::TempDir::new()?;
    let wheel = WheelBuilder::new("speedups", "0.3")
        .root_is_purelib(Some(false))
        .file("speedups/_ext.so", "")
        .write(root.path())?;

    let options = ExtractOptions::new(root.path(), markers());
    extract_wheel(&wheel, &options)?;

    let package = root.child("pypi__speedups");
    package
        .child("speedups/_ext.so")
        .assert(predicate::path::is_file());
    package.child("BUILD.bazel").assert(predicate::str::contains(
        r#"srcs = glob(["**/*.py"], allow_empty = True),"#,
    ));
    // A directory holding only an extension module is a namespace package too.
    package
        .child("speedups/__init__.py")
        .assert(predicate::str::contains("pkgutil"));

    Ok(())
}

#[test]
fn incremental_leaves_bin_alone() -> Result<()> {
    let root = assert_fs::TempDir::new()?;
    let wheel = WheelBuilder::new("tools", "1.0")
        .file("tools/cli/main.py", "")
        .file("bin/nested/helper.py", "")
        .file("bin/run.py", "")
        .write(root.path())?;

    let mut options = ExtractOptions::new(root.path(), markers());
    options.mode = ExtractMode::Incremental;
    extract_wheel(&wheel, &options)?;

    root.child("tools/__init__.py")
        .assert(predicate::str::contains("pkgutil"));
    root.child("tools/cli/__init__.py")
        .assert(predicate::str::contains("pkgutil"));
    root.child("bin/__init__.py")
        .assert(predicate::path::missing());
    root.child("bin/nested/__init__.py")
        .assert(predicate::path::missing());
    root.child("bin/nested/helper.py")
        .assert(predicate::path::is_file());

    Ok(())
}

#[test]
fn dependency_labels_follow_requirement_spelling() -> Result<()> {
    let root = assert_fs::TempDir::new()?;
    let wheel = sample().requires_dist("foo__bar>=1").write(root.path())?;

    let options = ExtractOptions::new(root.path(), markers());
    extract_wheel(&wheel, &options)?;

    // `foo__bar` extracts into `pypi__foo__bar`, so the label must not collapse the
    // underscores.
    root.child("pypi__sample/BUILD.bazel").assert(predicate::str::contains(
        r#"deps = ["//pypi__foo__bar"],"#,
    ));
    let dependency = WheelBuilder::new("foo__bar", "1.0").write(root.path())?;
    assert_eq!(
        extract_wheel(&dependency, &options)?.to_string(),
        "//pypi__foo__bar"
    );

    Ok(())
}
