//! Format catalog service
//!
//! Holds the ordered set of formats a run carves for. The order is part of
//! the contract: formats are processed, and recovery indices handed out, in
//! catalog order.

use crate::domain::entities::{CatalogError, FormatId, FormatSpec};

/// Ordered table of [`FormatSpec`]s
///
/// # Example
///
/// ```
/// use carvex::domain::entities::FormatId;
/// use carvex::domain::services::FormatCatalog;
///
/// let catalog = FormatCatalog::standard();
/// let ids: Vec<_> = catalog.all_format_ids().collect();
/// assert_eq!(ids.first(), Some(&FormatId::Jpeg));
/// assert_eq!(catalog.specs_for(FormatId::Png).unwrap().id(), FormatId::Png);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatCatalog {
    specs: Vec<FormatSpec>,
}

impl FormatCatalog {
    /// JPEG, PNG, GIF, BMP and WEBP with the full signature table
    pub fn standard() -> Self {
        Self {
            specs: FormatId::ALL.iter().map(FormatId::builtin_spec).collect(),
        }
    }

    /// JPEG and PNG only, with JFIF/Exif JPEG openers
    pub fn minimal() -> Self {
        Self {
            specs: FormatId::ALL
                .iter()
                .filter_map(FormatId::minimal_spec)
                .collect(),
        }
    }

    /// Looks up the spec of a format in this catalog
    pub fn specs_for(&self, format: FormatId) -> Option<&FormatSpec> {
        self.specs.iter().find(|spec| spec.id() == format)
    }

    /// Format ids in catalog order
    pub fn all_format_ids(&self) -> impl Iterator<Item = FormatId> + '_ {
        self.specs.iter().map(FormatSpec::id)
    }

    /// Specs in catalog order
    pub fn specs(&self) -> &[FormatSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Keeps only the given formats; an empty filter keeps everything
    pub fn restricted_to(mut self, formats: &[FormatId]) -> Self {
        if !formats.is_empty() {
            self.specs.retain(|spec| formats.contains(&spec.id()));
        }
        self
    }

    /// Replaces the size cap of one format
    pub fn with_max_object_size(
        mut self,
        format: FormatId,
        max_object_size: u64,
    ) -> Result<Self, CatalogError> {
        let slot = self
            .specs
            .iter_mut()
            .find(|spec| spec.id() == format)
            .ok_or(CatalogError::NotInCatalog(format))?;
        *slot = slot.with_max_object_size(max_object_size)?;
        Ok(self)
    }
}

impl Default for FormatCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_order_is_fixed() {
        let ids: Vec<_> = FormatCatalog::standard().all_format_ids().collect();
        assert_eq!(
            ids,
            vec![
                FormatId::Jpeg,
                FormatId::Png,
                FormatId::Gif,
                FormatId::Bmp,
                FormatId::WebP
            ]
        );
    }

    #[test]
    fn minimal_has_two_formats() {
        let catalog = FormatCatalog::minimal();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.specs_for(FormatId::Gif).is_none());
    }

    #[test]
    fn restriction_preserves_catalog_order() {
        let ids: Vec<_> = FormatCatalog::standard()
            .restricted_to(&[FormatId::WebP, FormatId::Jpeg])
            .all_format_ids()
            .collect();
        assert_eq!(ids, vec![FormatId::Jpeg, FormatId::WebP]);
    }

    #[test]
    fn override_requires_member_format() {
        let catalog = FormatCatalog::minimal();
        assert_eq!(
            catalog.clone().with_max_object_size(FormatId::Bmp, 10),
            Err(CatalogError::NotInCatalog(FormatId::Bmp))
        );
        let catalog = catalog.with_max_object_size(FormatId::Png, 4096).unwrap();
        assert_eq!(
            catalog.specs_for(FormatId::Png).unwrap().max_object_size(),
            4096
        );
    }
}
