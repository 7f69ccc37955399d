use crate::{CanonicalLabel, DistributionName, Label, PY_LIBRARY_LABEL, WHEEL_FILE_LABEL};

/// How packages address each other in generated build files.
pub trait LabelStyle {
    /// The prefix prepended to every canonical label.
    fn prefix(&self) -> &str;

    /// The label of the library target for a package.
    fn library(&self, label: &CanonicalLabel) -> Label;

    /// The label of the raw wheel `filegroup` for a package.
    fn wheel_file(&self, label: &CanonicalLabel) -> Label;

    /// The name given to a package's own `py_library` target.
    fn target_name(&self, label: &CanonicalLabel) -> String;

    fn canonical(&self, name: &DistributionName) -> CanonicalLabel {
        name.sanitize(self.prefix())
    }

    fn library_label(&self, name: &DistributionName) -> Label {
        self.library(&self.canonical(name))
    }

    fn wheel_file_label(&self, name: &DistributionName) -> Label {
        self.wheel_file(&self.canonical(name))
    }
}

/// Every package is a top-level directory of a single shared repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatLabels {
    pub prefix: String,
}

impl LabelStyle for FlatLabels {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn library(&self, label: &CanonicalLabel) -> Label {
        Label::quoted(&format!("//{label}"))
    }

    fn wheel_file(&self, label: &CanonicalLabel) -> Label {
        Label::quoted(&format!("//{label}:{WHEEL_FILE_LABEL}"))
    }

    fn target_name(&self, label: &CanonicalLabel) -> String {
        label.to_string()
    }
}

/// Every package is its own external repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLabels {
    pub prefix: String,
}

impl LabelStyle for RepositoryLabels {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn library(&self, label: &CanonicalLabel) -> Label {
        Label::quoted(&format!("@{label}//:{PY_LIBRARY_LABEL}"))
    }

    fn wheel_file(&self, label: &CanonicalLabel) -> Label {
        Label::quoted(&format!("@{label}//:{WHEEL_FILE_LABEL}"))
    }

    fn target_name(&self, _label: &CanonicalLabel) -> String {
        PY_LIBRARY_LABEL.to_string()
    }
}
