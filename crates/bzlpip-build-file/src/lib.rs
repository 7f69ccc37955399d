//! Render the Bazel files that describe extracted wheels.

use indoc::formatdoc;

use bzlpip_normalize::{Label, WHEEL_FILE_LABEL};

/// Patterns that are never part of a package's `data`: the wheel itself, sources (which are
/// already `srcs`), paths Bazel can't represent, and Bazel's own files.
const DATA_EXCLUDE: &[&str] = &["*.whl", "**/*.py", "**/* *", "BUILD.bazel", "WORKSPACE"];

/// Render the `BUILD.bazel` file for an unpacked wheel.
///
/// `name` is the name of the `py_library` target; `dependencies` and `whl_file_deps` are the
/// quoted labels of the library and wheel targets this package depends on. Sources may be
/// empty, since wheels that contain only compiled extensions are valid.
pub fn generate_build_file_contents(
    name: &str,
    dependencies: &[Label],
    whl_file_deps: &[Label],
    data_exclude: &[String],
) -> String {
    let data_exclude = json_array(
        DATA_EXCLUDE
            .iter()
            .copied()
            .chain(data_exclude.iter().map(String::as_str)),
    );
    let dependencies = join_labels(dependencies);
    let whl_file_deps = join_labels(whl_file_deps);

    formatdoc! {r#"
        package(default_visibility = ["//visibility:public"])

        load("@rules_python//python:defs.bzl", "py_library")

        filegroup(
            name = "{WHEEL_FILE_LABEL}",
            srcs = glob(["*.whl"]),
            data = [{whl_file_deps}],
        )

        py_library(
            name = "{name}",
            srcs = glob(["**/*.py"], allow_empty = True),
            data = glob(["**/*"], exclude={data_exclude}),
            # This makes this directory a top-level in the python import
            # search path for anything that depends on this.
            imports = ["."],
            deps = [{dependencies}],
        )
    "#}
}

/// Render the `requirements.bzl` file of a pip repository.
///
/// `targets` are the quoted, repository-qualified addresses of every extracted package
/// (e.g., `"@pip//pypi__six"`).
pub fn generate_requirements_file_contents(repo_name: &str, targets: &[Label]) -> String {
    let mut targets = targets.to_vec();
    targets.sort();

    let requirement_labels = join_labels(&targets);
    let whl_requirement_labels = targets
        .iter()
        .map(|target| {
            Label::quoted(&format!(
                "{}:{WHEEL_FILE_LABEL}",
                target.as_str().trim_matches('"')
            ))
        })
        .collect::<Vec<_>>();
    let whl_requirement_labels = join_labels(&whl_requirement_labels);

    formatdoc! {r#"
        all_requirements = [{requirement_labels}]

        all_whl_requirements = [{whl_requirement_labels}]

        def requirement(name):
           name_key = name.replace("-", "_").replace(".", "_").lower()
           return "{repo_name}//pypi__" + name_key

        def whl_requirement(name):
            return requirement(name) + ":whl"

        def install_deps():
            fail("install_deps() only works if you are creating an incremental repo. Did you mean to use pip_install_incremental()?")
    "#}
}

fn join_labels(labels: &[Label]) -> String {
    labels
        .iter()
        .map(Label::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Render strings as a JSON array, separating elements with `", "`.
fn json_array<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let items = items
        .map(|item| serde_json::Value::from(item).to_string())
        .collect::<Vec<_>>();
    format!("[{}]", items.join(", "))
}
