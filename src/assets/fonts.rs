use std::path::Path;
use std::sync::Arc;

use usvg::fontdb;

use crate::foundation::error::{CompositorError, CompositorResult};

/// A font face resolved from a [`FontBook`].
#[derive(Clone, Debug)]
pub struct ResolvedFont {
    /// Family name of the resolved face.
    pub family: String,
    /// Raw font file bytes (may be a collection).
    pub bytes: Arc<Vec<u8>>,
    /// Face index inside `bytes`.
    pub index: u32,
    /// `false` when the requested family was not found and a fallback face was used.
    pub exact: bool,
}

/// Font database used to resolve watermark font families to font bytes.
pub struct FontBook {
    db: fontdb::Database,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.db.len())
            .finish()
    }
}

impl Default for FontBook {
    fn default() -> Self {
        Self::empty()
    }
}

impl FontBook {
    /// A book with no faces.
    pub fn empty() -> Self {
        Self {
            db: fontdb::Database::new(),
        }
    }

    /// A book preloaded with the platform's installed fonts.
    pub fn with_system_fonts() -> Self {
        let mut book = Self::empty();
        book.db.load_system_fonts();
        book
    }

    /// Register fonts from raw font file bytes.
    pub fn load_font_data(&mut self, bytes: Vec<u8>) {
        self.db.load_font_data(bytes);
    }

    /// Register every font file found (recursively) under `dir`.
    pub fn load_fonts_dir(&mut self, dir: impl AsRef<Path>) {
        self.db.load_fonts_dir(dir);
    }

    /// Number of loaded faces.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// `true` when no face is loaded.
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Resolve a family name: exact family, then generic sans-serif, then any face.
    pub fn resolve(&self, family: &str) -> CompositorResult<ResolvedFont> {
        let family = family.trim();
        let exact = if family.is_empty() {
            None
        } else {
            self.query(&[family_query(family)])
        };
        let (id, is_exact) = match exact {
            Some(id) => (id, true),
            None => {
                let fallback = self
                    .query(&[fontdb::Family::SansSerif])
                    .or_else(|| self.db.faces().next().map(|f| f.id))
                    .ok_or_else(|| {
                        CompositorError::font_unavailable(format!(
                            "no font face available for family '{family}'"
                        ))
                    })?;
                tracing::warn!(requested = family, "font family not found, using fallback");
                (fallback, false)
            }
        };

        let resolved_family = self
            .db
            .face(id)
            .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_else(|| family.to_string());
        let (bytes, index) = self
            .db
            .with_face_data(id, |data, index| (data.to_vec(), index))
            .ok_or_else(|| {
                CompositorError::font_unavailable(format!(
                    "font data for '{resolved_family}' could not be loaded"
                ))
            })?;

        Ok(ResolvedFont {
            family: resolved_family,
            bytes: Arc::new(bytes),
            index,
            exact: is_exact,
        })
    }

    fn query(&self, families: &[fontdb::Family<'_>]) -> Option<fontdb::ID> {
        self.db.query(&fontdb::Query {
            families,
            ..fontdb::Query::default()
        })
    }
}

/// CSS generic family keywords map onto fontdb's generic families.
fn family_query(family: &str) -> fontdb::Family<'_> {
    match family.to_ascii_lowercase().as_str() {
        "sans-serif" | "sans" => fontdb::Family::SansSerif,
        "serif" => fontdb::Family::Serif,
        "monospace" => fontdb::Family::Monospace,
        "cursive" => fontdb::Family::Cursive,
        "fantasy" => fontdb::Family::Fantasy,
        _ => fontdb::Family::Name(family),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
