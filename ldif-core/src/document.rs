//! Fully parsed LDIF documents.
//!
//! # Example
//!
//! ```
//! use ldif_core::LdifDocument;
//!
//! let doc = LdifDocument::parse("dn: cn=a,dc=x\nobjectClass: top\n\n");
//!
//! for record in doc.records() {
//!     println!("{:?} ({})", record.dn_value(), record.kind().name());
//! }
//! assert_eq!(doc.to_raw_string(), "dn: cn=a,dc=x\nobjectClass: top\n\n");
//! ```

use std::fmt;
use std::io::Read;

use crate::container::LdifContainer;
use crate::enumeration::LdifEnumeration;
use crate::error::Result;
use crate::options::ScannerOptions;
use crate::record::LdifRecord;

/// All containers of a document in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LdifDocument {
    containers: Vec<LdifContainer>,
}

impl LdifDocument {
    /// Parse a complete document from text.
    pub fn parse(text: &str) -> Self {
        // byte slices never fail to read
        let containers = LdifEnumeration::new(text.as_bytes())
            .filter_map(|c| c.ok())
            .collect();
        Self { containers }
    }

    /// Parse a complete document from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ScannerOptions::default())
    }

    pub fn from_reader_with_options<R: Read>(reader: R, options: ScannerOptions) -> Result<Self> {
        let containers = LdifEnumeration::with_options(reader, options).collect::<Result<Vec<_>>>()?;
        Ok(Self { containers })
    }

    pub fn containers(&self) -> &[LdifContainer] {
        &self.containers
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LdifContainer> {
        self.containers.iter()
    }

    /// Records only, skipping comments, separators and invalid lines.
    pub fn records(&self) -> impl Iterator<Item = &LdifRecord> {
        self.containers.iter().filter_map(LdifContainer::as_record)
    }

    /// Number of containers, the EOF container included.
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn last_container(&self) -> Option<&LdifContainer> {
        self.containers.last()
    }

    /// The container covering `offset`.
    ///
    /// At a boundary the container starting there wins; the end of input
    /// maps to the EOF container.
    pub fn container_at(&self, offset: usize) -> Option<&LdifContainer> {
        let idx = self.containers.partition_point(|c| c.offset() <= offset);
        let container = self.containers.get(idx.checked_sub(1)?)?;
        let covers = offset < container.end() || (container.is_empty() && container.offset() == offset);
        covers.then_some(container)
    }

    /// Every container is valid.
    pub fn is_valid(&self) -> bool {
        self.containers.iter().all(LdifContainer::is_valid)
    }

    /// The first record is a content record.
    pub fn is_content_type(&self) -> bool {
        self.records().next().map_or(false, LdifRecord::is_content_record)
    }

    /// The first record is a change record.
    pub fn is_change_type(&self) -> bool {
        self.records().next().map_or(false, LdifRecord::is_change_record)
    }

    /// Rebuild the source text.
    pub fn to_raw_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LdifDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for container in &self.containers {
            fmt::Display::fmt(container, f)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a LdifDocument {
    type Item = &'a LdifContainer;
    type IntoIter = std::slice::Iter<'a, LdifContainer>;

    fn into_iter(self) -> Self::IntoIter {
        self.containers.iter()
    }
}
