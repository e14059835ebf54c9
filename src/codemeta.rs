//! CodeMeta (`codemeta.json`) to Citation File Format (`CITATION.cff`).
//!
//! Only the terms needed to build a citation are read; everything else in
//! the CodeMeta document is ignored.
//!
//! ```
//! use chrono::NaiveDate;
//! use datatools::codemeta::Codemeta;
//!
//! let codemeta: Codemeta = serde_json::from_str(r#"{
//!     "name": "datatools",
//!     "author": [{
//!         "@id": "https://orcid.org/0000-0003-0900-6903",
//!         "@type": "Person",
//!         "givenName": "Robert",
//!         "familyName": "Doiel"
//!     }],
//!     "datePublished": "2021-07-15"
//! }"#).unwrap();
//!
//! let cff = codemeta.to_cff_with_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
//! assert!(cff.contains("   - family-names: Doiel\n"));
//! assert!(cff.ends_with("date-released: 2021-07-15\n"));
//! ```

use std::{fs, io, path::Path};

use chrono::{Local, NaiveDate};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ORCID_PREFIX: &str = "https://orcid.org/";
const DOI_PREFIX: &str = "https://doi.org/";

#[derive(Error, Debug)]
pub enum CodemetaError {
    #[error("unable to parse codemeta: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// An author, contributor or funder.
///
/// Persons use the given/family names, organisations use `name`. The id of
/// a person is expected to be an ORCID URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonOrOrganization {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "givenName", skip_serializing_if = "String::is_empty")]
    pub given_name: String,
    #[serde(rename = "familyName", skip_serializing_if = "String::is_empty")]
    pub family_name: String,
    pub affiliation: String,
    pub email: String,
}

impl PersonOrOrganization {
    /// A citable author has both names and an ORCID.
    fn is_citable(&self) -> bool {
        !self.family_name.is_empty()
            && !self.given_name.is_empty()
            && self.id.starts_with(ORCID_PREFIX)
    }
}

/// The CodeMeta terms read from `codemeta.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Codemeta {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "@type")]
    pub kind: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "codeRepository")]
    pub code_repository: String,
    #[serde(rename = "issueTracker")]
    pub issue_tracker: String,
    pub license: String,
    pub version: String,
    pub author: Vec<PersonOrOrganization>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contributor: Vec<PersonOrOrganization>,
    #[serde(rename = "developmentStatus")]
    pub development_status: String,
    #[serde(rename = "downloadUrl")]
    pub download_url: String,
    pub keywords: Vec<String>,
    #[serde(rename = "dateCreated", skip_serializing_if = "String::is_empty")]
    pub date_created: String,
    #[serde(rename = "dateModified", skip_serializing_if = "String::is_empty")]
    pub date_modified: String,
    #[serde(rename = "datePublished", skip_serializing_if = "String::is_empty")]
    pub date_published: String,
    /// Usually the DOI, as a `https://doi.org/` URL.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub identifier: String,
}

impl Codemeta {
    /// Renders the citation, using today's date when no publication date
    /// is recorded.
    pub fn to_cff(&self) -> String {
        self.to_cff_with_date(Local::now().date_naive())
    }

    pub fn to_cff_with_date(&self, today: NaiveDate) -> String {
        let mut cff = String::from(
            "cff-version: 1.1.0\nmessage: \"If you use this software, please cite it as below.\"\n",
        );
        if !self.name.is_empty() {
            cff.push_str(&format!("title: {}\n", yaml_scalar(&self.name)));
        }
        if !self.version.is_empty() {
            cff.push_str(&format!("version: {}\n", yaml_scalar(&self.version)));
        }

        cff.push_str("authors:\n");
        for person in &self.author {
            if !person.is_citable() {
                warn!(
                    "Skipping author {:?}: missing family name, given name or ORCID",
                    person.id
                );
                continue;
            }
            cff.push_str(&format!(
                "   - family-names: {}\n     given-names: {}\n     orcid: {}\n",
                yaml_scalar(&person.family_name),
                yaml_scalar(&person.given_name),
                person.id
            ));
        }

        if let Some(doi) = normalize_doi(&self.identifier) {
            cff.push_str(&format!("doi: {doi}\n"));
        }

        if self.date_published.is_empty() {
            cff.push_str(&format!("date-released: {}\n", today.format("%Y-%m-%d")));
        } else {
            cff.push_str(&format!(
                "date-released: {}\n",
                yaml_scalar(&self.date_published)
            ));
        }
        cff
    }
}

/// Extracts the bare `10.` DOI from a `https://doi.org/` URL.
fn normalize_doi(identifier: &str) -> Option<&str> {
    identifier
        .strip_prefix(DOI_PREFIX)
        .map(|doi| doi.trim_matches('/'))
        .filter(|doi| doi.starts_with("10.") && doi.contains('/'))
}

/// Quotes a value when YAML would otherwise misread it.
fn yaml_scalar(value: &str) -> String {
    let plain = !value.is_empty()
        && !value.contains(": ")
        && !value.contains(" #")
        && !value.starts_with(|c: char| "-?:,[]{}#&*!|>'\"%@`".contains(c) || c.is_whitespace())
        && !value.ends_with(char::is_whitespace);
    if plain {
        value.to_string()
    } else {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

/// Parses a CodeMeta document and renders its citation.
pub fn codemeta_to_cff(json: &str) -> Result<String, CodemetaError> {
    let codemeta: Codemeta = serde_json::from_str(json)?;
    Ok(codemeta.to_cff())
}

/// Reads `codemeta_path` and writes the citation to `citation_path`.
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
    codemeta_path: P,
    citation_path: Q,
) -> Result<(), CodemetaError> {
    let json = fs::read_to_string(codemeta_path.as_ref())?;
    let cff = codemeta_to_cff(&json)?;
    info!(
        "Writing {} from {}",
        citation_path.as_ref().display(),
        codemeta_path.as_ref().display()
    );
    fs::write(citation_path, cff)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;
    use tempfile::tempdir;

    use super::{Codemeta, CodemetaError, codemeta_to_cff, convert_file, normalize_doi};

    const CODEMETA: &str = r#"{
        "@context": "https://doi.org/10.5063/schema/codemeta-2.0",
        "@type": "SoftwareSourceCode",
        "name": "datatools",
        "version": "0.0.26",
        "author": [
            {
                "@id": "https://orcid.org/0000-0003-0900-6903",
                "@type": "Person",
                "givenName": "Robert",
                "familyName": "Doiel",
                "affiliation": "Caltech Library",
                "email": "rsdoiel@caltech.edu"
            },
            {
                "@id": "",
                "@type": "Organization",
                "name": "Caltech Library"
            }
        ],
        "identifier": "https://doi.org/10.22002/D1.1234",
        "keywords": ["csv", "json"]
    }"#;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    #[test]
    fn citation_lists_citable_authors_only() {
        let codemeta: Codemeta = serde_json::from_str(CODEMETA).unwrap();
        let cff = codemeta.to_cff_with_date(today());

        assert_eq!(
            cff,
            "cff-version: 1.1.0
message: \"If you use this software, please cite it as below.\"
title: datatools
version: 0.0.26
authors:
   - family-names: Doiel
     given-names: Robert
     orcid: https://orcid.org/0000-0003-0900-6903
doi: 10.22002/D1.1234
date-released: 2024-05-17
"
        );
    }

    #[test]
    fn published_date_wins_over_today() {
        let codemeta = Codemeta {
            date_published: "2021-07-15".to_string(),
            ..Codemeta::default()
        };
        assert!(
            codemeta
                .to_cff_with_date(today())
                .ends_with("authors:\ndate-released: 2021-07-15\n")
        );
    }

    #[test]
    fn doi_must_be_a_doi_url() {
        assert_eq!(normalize_doi("https://doi.org/10.1000/182"), Some("10.1000/182"));
        assert_eq!(normalize_doi("10.1000/182"), None);
        assert_eq!(normalize_doi("https://doi.org/not-a-doi"), None);
    }

    #[test]
    fn awkward_names_are_quoted() {
        let codemeta = Codemeta {
            name: "tools: data".to_string(),
            ..Codemeta::default()
        };
        assert!(
            codemeta
                .to_cff_with_date(today())
                .contains("title: \"tools: data\"\n")
        );
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            codemeta_to_cff("{ not json"),
            Err(CodemetaError::Json(_))
        ));
    }

    #[test]
    fn file_conversion_writes_citation() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("codemeta.json");
        let target = dir.path().join("CITATION.cff");
        fs::write(&source, CODEMETA).unwrap();

        convert_file(&source, &target).unwrap();
        let cff = fs::read_to_string(&target).unwrap();
        assert!(cff.starts_with("cff-version: 1.1.0\n"));
        assert!(cff.contains("doi: 10.22002/D1.1234\n"));
    }
}
