use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::Error;

/// Builds minimal wheel archives for tests.
#[derive(Debug, Clone)]
pub struct WheelBuilder {
    name: String,
    version: String,
    requires_dist: Vec<String>,
    root_is_purelib: Option<bool>,
    metadata: bool,
    files: Vec<(String, Vec<u8>)>,
}

impl WheelBuilder {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            requires_dist: Vec::new(),
            root_is_purelib: Some(true),
            metadata: true,
            files: Vec::new(),
        }
    }

    #[must_use]
    pub fn requires_dist(mut self, requirement: &str) -> Self {
        self.requires_dist.push(requirement.to_string());
        self
    }

    /// Set `Root-Is-Purelib`, or omit the key entirely with `None`.
    #[must_use]
    pub fn root_is_purelib(mut self, root_is_purelib: Option<bool>) -> Self {
        self.root_is_purelib = root_is_purelib;
        self
    }

    /// Leave out the `METADATA` file.
    #[must_use]
    pub fn without_metadata(mut self) -> Self {
        self.metadata = false;
        self
    }

    #[must_use]
    pub fn file(mut self, path: &str, contents: impl AsRef<[u8]>) -> Self {
        self.files
            .push((path.to_string(), contents.as_ref().to_vec()));
        self
    }

    /// The `{distribution}-{version}` prefix of the `.dist-info` and `.data` directories.
    pub fn dist_info_prefix(&self) -> String {
        format!("{}-{}", self.name.replace(['-', '.'], "_"), self.version)
    }

    pub fn filename(&self) -> String {
        format!("{}-py3-none-any.whl", self.dist_info_prefix())
    }

    /// Write the archive into `directory`, returning its path.
    pub fn write(&self, directory: &Path) -> Result<PathBuf, Error> {
        let path = directory.join(self.filename());
        let mut writer = ZipWriter::new(fs_err::File::create(&path)?);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        for (name, contents) in &self.files {
            writer.start_file(name.as_str(), options)?;
            writer.write_all(contents)?;
        }

        let dist_info = format!("{}.dist-info", self.dist_info_prefix());
        if self.metadata {
            let mut metadata = format!(
                "Metadata-Version: 2.1\nName: {}\nVersion: {}\n",
                self.name, self.version
            );
            for requirement in &self.requires_dist {
                metadata.push_str(&format!("Requires-Dist: {requirement}\n"));
            }
            writer.start_file(format!("{dist_info}/METADATA"), options)?;
            writer.write_all(metadata.as_bytes())?;
        }

        let mut wheel = String::from("Wheel-Version: 1.0\nGenerator: bzlpip\n");
        if let Some(root_is_purelib) = self.root_is_purelib {
            wheel.push_str(&format!("Root-Is-Purelib: {root_is_purelib}\n"));
        }
        wheel.push_str("Tag: py3-none-any\n");
        writer.start_file(format!("{dist_info}/WHEEL"), options)?;
        writer.write_all(wheel.as_bytes())?;

        writer.finish()?;
        Ok(path)
    }
}
