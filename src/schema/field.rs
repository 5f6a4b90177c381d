//! Field descriptors
//!
//! Each field in an index definition emits its name (plus optional alias),
//! a type keyword, and a type-specific suffix. Boolean attributes map to
//! exactly one keyword token each, in a fixed order, and default-equal
//! values never reach the wire.

use crate::args::{Arg, Emit};
use crate::schema::vector::VectorAlgorithm;

/// Text field weight when none is given.
pub const DEFAULT_TEXT_WEIGHT: f64 = 1.0;

/// Tag field separator when none is given.
pub const DEFAULT_TAG_SEPARATOR: char = ',';

/// One field of an index definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Text(TextField),
    Tag(TagField),
    Numeric(NumericField),
    Geo(GeoField),
    GeoShape(GeoShapeField),
    Vector(VectorField),
}

impl Field {
    /// Field name as stored in the source document.
    pub fn name(&self) -> &str {
        match self {
            Field::Text(f) => &f.name,
            Field::Tag(f) => &f.name,
            Field::Numeric(f) => &f.name,
            Field::Geo(f) => &f.name,
            Field::GeoShape(f) => &f.name,
            Field::Vector(f) => &f.name,
        }
    }
}

impl Emit for Field {
    fn num_args(&self) -> usize {
        match self {
            Field::Text(f) => f.num_args(),
            Field::Tag(f) => f.num_args(),
            Field::Numeric(f) => f.num_args(),
            Field::Geo(f) => f.num_args(),
            Field::GeoShape(f) => f.num_args(),
            Field::Vector(f) => f.num_args(),
        }
    }

    fn write_args(&self, out: &mut Vec<Arg>) {
        match self {
            Field::Text(f) => f.write_args(out),
            Field::Tag(f) => f.write_args(out),
            Field::Numeric(f) => f.write_args(out),
            Field::Geo(f) => f.write_args(out),
            Field::GeoShape(f) => f.write_args(out),
            Field::Vector(f) => f.write_args(out),
        }
    }
}

/// `name [AS alias]` prefix shared by every field type.
fn prefix_len(alias: &Option<String>) -> usize {
    1 + if alias.is_some() { 2 } else { 0 }
}

fn write_prefix(out: &mut Vec<Arg>, name: &str, alias: &Option<String>) {
    out.push(name.into());
    if let Some(alias) = alias {
        out.push("AS".into());
        out.push(alias.as_str().into());
    }
}

/// Count the set flags; each emits one keyword token.
fn flag_len(flags: &[bool]) -> usize {
    flags.iter().filter(|f| **f).count()
}

// =============================================================================
// Text
// =============================================================================

/// Full-text field.
#[derive(Debug, Clone, PartialEq)]
pub struct TextField {
    name: String,
    alias: Option<String>,
    weight: f64,
    no_stem: bool,
    phonetic: Option<String>,
    with_suffix_trie: bool,
    unf: bool,
    no_index: bool,
    index_missing: bool,
    index_empty: bool,
    sortable: bool,
}

impl TextField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            weight: DEFAULT_TEXT_WEIGHT,
            no_stem: false,
            phonetic: None,
            with_suffix_trie: false,
            unf: false,
            no_index: false,
            index_missing: false,
            index_empty: false,
            sortable: false,
        }
    }

    /// Expose the field under a different attribute name.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Relevance weight. The default weight stays off the wire.
    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Disable stemming for this field.
    pub fn no_stem(mut self) -> Self {
        self.no_stem = true;
        self
    }

    /// Phonetic matcher name, e.g. `dm:en`.
    pub fn phonetic(mut self, matcher: impl Into<String>) -> Self {
        self.phonetic = Some(matcher.into());
        self
    }

    /// Build a suffix trie for contains/suffix queries.
    pub fn with_suffix_trie(mut self) -> Self {
        self.with_suffix_trie = true;
        self
    }

    /// Keep the unnormalized form for sorting.
    pub fn unf(mut self) -> Self {
        self.unf = true;
        self
    }

    /// Store without indexing.
    pub fn no_index(mut self) -> Self {
        self.no_index = true;
        self
    }

    /// Index documents missing this field.
    pub fn index_missing(mut self) -> Self {
        self.index_missing = true;
        self
    }

    /// Index documents with an empty value here.
    pub fn index_empty(mut self) -> Self {
        self.index_empty = true;
        self
    }

    /// Allow sorting results by this field.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }
}

impl Emit for TextField {
    fn num_args(&self) -> usize {
        prefix_len(&self.alias)
            + 1
            + if self.weight != DEFAULT_TEXT_WEIGHT { 2 } else { 0 }
            + if self.phonetic.is_some() { 2 } else { 0 }
            + flag_len(&[
                self.no_stem,
                self.with_suffix_trie,
                self.unf,
                self.no_index,
                self.index_missing,
                self.index_empty,
                self.sortable,
            ])
    }

    fn write_args(&self, out: &mut Vec<Arg>) {
        write_prefix(out, &self.name, &self.alias);
        out.push("TEXT".into());
        if self.weight != DEFAULT_TEXT_WEIGHT {
            out.push("WEIGHT".into());
            out.push(self.weight.into());
        }
        if self.no_stem {
            out.push("NOSTEM".into());
        }
        if let Some(matcher) = &self.phonetic {
            out.push("PHONETIC".into());
            out.push(matcher.as_str().into());
        }
        if self.with_suffix_trie {
            out.push("WITHSUFFIXTRIE".into());
        }
        if self.unf {
            out.push("UNF".into());
        }
        if self.no_index {
            out.push("NOINDEX".into());
        }
        if self.index_missing {
            out.push("INDEXMISSING".into());
        }
        if self.index_empty {
            out.push("INDEXEMPTY".into());
        }
        if self.sortable {
            out.push("SORTABLE".into());
        }
    }
}

impl From<TextField> for Field {
    fn from(f: TextField) -> Self {
        Field::Text(f)
    }
}

// =============================================================================
// Tag
// =============================================================================

/// Exact-match tag field.
#[derive(Debug, Clone, PartialEq)]
pub struct TagField {
    name: String,
    alias: Option<String>,
    separator: char,
    case_sensitive: bool,
    with_suffix_trie: bool,
    unf: bool,
    no_index: bool,
    index_missing: bool,
    index_empty: bool,
    sortable: bool,
}

impl TagField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            separator: DEFAULT_TAG_SEPARATOR,
            case_sensitive: false,
            with_suffix_trie: false,
            unf: false,
            no_index: false,
            index_missing: false,
            index_empty: false,
            sortable: false,
        }
    }

    /// Expose the field under a different attribute name.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Tag separator. The default comma stays off the wire.
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Match tags case-sensitively.
    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    /// Build a suffix trie for contains/suffix queries.
    pub fn with_suffix_trie(mut self) -> Self {
        self.with_suffix_trie = true;
        self
    }

    /// Keep the unnormalized form for sorting.
    pub fn unf(mut self) -> Self {
        self.unf = true;
        self
    }

    /// Store without indexing.
    pub fn no_index(mut self) -> Self {
        self.no_index = true;
        self
    }

    /// Index documents missing this field.
    pub fn index_missing(mut self) -> Self {
        self.index_missing = true;
        self
    }

    /// Index documents with an empty value here.
    pub fn index_empty(mut self) -> Self {
        self.index_empty = true;
        self
    }

    /// Allow sorting results by this field.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }
}

impl Emit for TagField {
    fn num_args(&self) -> usize {
        prefix_len(&self.alias)
            + 1
            + if self.separator != DEFAULT_TAG_SEPARATOR { 2 } else { 0 }
            + flag_len(&[
                self.case_sensitive,
                self.with_suffix_trie,
                self.unf,
                self.no_index,
                self.index_missing,
                self.index_empty,
                self.sortable,
            ])
    }

    fn write_args(&self, out: &mut Vec<Arg>) {
        write_prefix(out, &self.name, &self.alias);
        out.push("TAG".into());
        if self.separator != DEFAULT_TAG_SEPARATOR {
            out.push("SEPARATOR".into());
            out.push(self.separator.to_string().into());
        }
        if self.case_sensitive {
            out.push("CASESENSITIVE".into());
        }
        if self.with_suffix_trie {
            out.push("WITHSUFFIXTRIE".into());
        }
        if self.unf {
            out.push("UNF".into());
        }
        if self.no_index {
            out.push("NOINDEX".into());
        }
        if self.index_missing {
            out.push("INDEXMISSING".into());
        }
        if self.index_empty {
            out.push("INDEXEMPTY".into());
        }
        if self.sortable {
            out.push("SORTABLE".into());
        }
    }
}

impl From<TagField> for Field {
    fn from(f: TagField) -> Self {
        Field::Tag(f)
    }
}

// =============================================================================
// Numeric / Geo
// =============================================================================

/// Numeric range field.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericField {
    name: String,
    alias: Option<String>,
    no_index: bool,
    index_missing: bool,
    sortable: bool,
}

impl NumericField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            no_index: false,
            index_missing: false,
            sortable: false,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn no_index(mut self) -> Self {
        self.no_index = true;
        self
    }

    pub fn index_missing(mut self) -> Self {
        self.index_missing = true;
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }
}

impl Emit for NumericField {
    fn num_args(&self) -> usize {
        prefix_len(&self.alias)
            + 1
            + flag_len(&[self.no_index, self.index_missing, self.sortable])
    }

    fn write_args(&self, out: &mut Vec<Arg>) {
        write_prefix(out, &self.name, &self.alias);
        out.push("NUMERIC".into());
        if self.no_index {
            out.push("NOINDEX".into());
        }
        if self.index_missing {
            out.push("INDEXMISSING".into());
        }
        if self.sortable {
            out.push("SORTABLE".into());
        }
    }
}

impl From<NumericField> for Field {
    fn from(f: NumericField) -> Self {
        Field::Numeric(f)
    }
}

/// Geographic point field.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoField {
    name: String,
    alias: Option<String>,
    no_index: bool,
    index_missing: bool,
    sortable: bool,
}

impl GeoField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            no_index: false,
            index_missing: false,
            sortable: false,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn no_index(mut self) -> Self {
        self.no_index = true;
        self
    }

    pub fn index_missing(mut self) -> Self {
        self.index_missing = true;
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }
}

impl Emit for GeoField {
    fn num_args(&self) -> usize {
        prefix_len(&self.alias)
            + 1
            + flag_len(&[self.no_index, self.index_missing, self.sortable])
    }

    fn write_args(&self, out: &mut Vec<Arg>) {
        write_prefix(out, &self.name, &self.alias);
        out.push("GEO".into());
        if self.no_index {
            out.push("NOINDEX".into());
        }
        if self.index_missing {
            out.push("INDEXMISSING".into());
        }
        if self.sortable {
            out.push("SORTABLE".into());
        }
    }
}

impl From<GeoField> for Field {
    fn from(f: GeoField) -> Self {
        Field::Geo(f)
    }
}

// =============================================================================
// Geo shape
// =============================================================================

/// Coordinate system of a geo-shape field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordSystem {
    /// Cartesian X/Y coordinates
    Flat,

    /// Geographic lon/lat coordinates
    Spherical,
}

impl CoordSystem {
    fn wire_name(self) -> &'static str {
        match self {
            CoordSystem::Flat => "FLAT",
            CoordSystem::Spherical => "SPHERICAL",
        }
    }
}

/// Polygon/shape field.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoShapeField {
    name: String,
    alias: Option<String>,
    coord_system: CoordSystem,
    no_index: bool,
    index_missing: bool,
    sortable: bool,
}

impl GeoShapeField {
    /// Defaults to spherical (geographic) coordinates.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            coord_system: CoordSystem::Spherical,
            no_index: false,
            index_missing: false,
            sortable: false,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn coord_system(mut self, coord_system: CoordSystem) -> Self {
        self.coord_system = coord_system;
        self
    }

    pub fn no_index(mut self) -> Self {
        self.no_index = true;
        self
    }

    pub fn index_missing(mut self) -> Self {
        self.index_missing = true;
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }
}

impl Emit for GeoShapeField {
    fn num_args(&self) -> usize {
        // The coordinate-system tag is always present.
        prefix_len(&self.alias)
            + 2
            + flag_len(&[self.no_index, self.index_missing, self.sortable])
    }

    fn write_args(&self, out: &mut Vec<Arg>) {
        write_prefix(out, &self.name, &self.alias);
        out.push("GEOSHAPE".into());
        out.push(self.coord_system.wire_name().into());
        if self.no_index {
            out.push("NOINDEX".into());
        }
        if self.index_missing {
            out.push("INDEXMISSING".into());
        }
        if self.sortable {
            out.push("SORTABLE".into());
        }
    }
}

impl From<GeoShapeField> for Field {
    fn from(f: GeoShapeField) -> Self {
        Field::GeoShape(f)
    }
}

// =============================================================================
// Vector
// =============================================================================

/// Vector similarity field.
///
/// The algorithm contributes the structured attribute pairs; free-form
/// attributes land after them and count toward the same attribute total.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorField {
    name: String,
    alias: Option<String>,
    algorithm: VectorAlgorithm,
    extra_attrs: Vec<(String, Arg)>,
}

impl VectorField {
    pub fn new(name: impl Into<String>, algorithm: VectorAlgorithm) -> Self {
        Self {
            name: name.into(),
            alias: None,
            algorithm,
            extra_attrs: Vec::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Append a free-form attribute pair after the structured ones.
    ///
    /// Escape hatch for server attributes this crate does not model.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.extra_attrs.push((key.into(), value.into()));
        self
    }
}

impl Emit for VectorField {
    fn num_args(&self) -> usize {
        // Prefix, VECTOR keyword, algorithm tag, attribute count token,
        // then the attributes themselves.
        prefix_len(&self.alias) + 3 + self.algorithm.num_attr_args() + 2 * self.extra_attrs.len()
    }

    fn write_args(&self, out: &mut Vec<Arg>) {
        write_prefix(out, &self.name, &self.alias);
        out.push("VECTOR".into());
        out.push(self.algorithm.wire_name().into());
        let attr_count = self.algorithm.num_attr_args() + 2 * self.extra_attrs.len();
        out.push(attr_count.into());
        self.algorithm.write_attr_args(out);
        for (key, value) in &self.extra_attrs {
            out.push(key.as_str().into());
            out.push(value.clone());
        }
    }
}

impl From<VectorField> for Field {
    fn from(f: VectorField) -> Self {
        Field::Vector(f)
    }
}
