use std::str::FromStr;

use mailparse::MailHeaderMap;
use pep440_rs::Version;

use crate::Error;

/// The subset of the core metadata (`METADATA`) needed to describe a wheel.
///
/// See: <https://packaging.python.org/en/latest/specifications/core-metadata/>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub name: String,
    pub version: Version,
    /// The raw `Requires-Dist` entries, in file order.
    pub requires_dist: Vec<String>,
}

impl Metadata {
    /// Parse the `METADATA` file of a wheel.
    pub fn parse(content: &[u8]) -> Result<Self, Error> {
        let (headers, _) = mailparse::parse_headers(content)
            .map_err(|err| Error::MailParse("METADATA", err))?;

        let name = headers
            .get_first_value("Name")
            .ok_or(Error::FieldNotFound("Name"))?;
        let version = headers
            .get_first_value("Version")
            .ok_or(Error::FieldNotFound("Version"))?;
        let version = Version::from_str(version.trim())
            .map_err(|err| Error::InvalidVersion(version.clone(), err.to_string()))?;
        let requires_dist = headers
            .get_all_values("Requires-Dist")
            .into_iter()
            .map(|requires_dist| requires_dist.trim().to_string())
            .collect();

        Ok(Self {
            name: name.trim().to_string(),
            version,
            requires_dist,
        })
    }
}
