//! Well-known ODF namespaces, element names and attribute names

/// ODF XML namespaces
pub mod namespaces {
    /// Office namespace
    pub const OFFICE: &str = "urn:oasis:names:tc:opendocument:xmlns:office:1.0";
    /// Style namespace
    pub const STYLE: &str = "urn:oasis:names:tc:opendocument:xmlns:style:1.0";
    /// Text namespace
    pub const TEXT: &str = "urn:oasis:names:tc:opendocument:xmlns:text:1.0";
    /// Table namespace
    pub const TABLE: &str = "urn:oasis:names:tc:opendocument:xmlns:table:1.0";
    /// Drawing namespace
    pub const DRAW: &str = "urn:oasis:names:tc:opendocument:xmlns:drawing:1.0";
    /// FO (Formatting Objects) namespace
    pub const FO: &str = "urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0";
    /// XLink namespace
    pub const XLINK: &str = "http://www.w3.org/1999/xlink";
    /// Dublin Core namespace (for metadata)
    pub const DC: &str = "http://purl.org/dc/elements/1.1/";
    /// Meta namespace
    pub const META: &str = "urn:oasis:names:tc:opendocument:xmlns:meta:1.0";
    /// Data style namespace
    pub const NUMBER: &str = "urn:oasis:names:tc:opendocument:xmlns:datastyle:1.0";
    /// SVG namespace
    pub const SVG: &str = "urn:oasis:names:tc:opendocument:xmlns:svg-compatible:1.0";
    /// Chart namespace
    pub const CHART: &str = "urn:oasis:names:tc:opendocument:xmlns:chart:1.0";
    /// 3D namespace
    pub const DR3D: &str = "urn:oasis:names:tc:opendocument:xmlns:dr3d:1.0";
    /// MathML namespace
    pub const MATH: &str = "http://www.w3.org/1998/Math/MathML";
    /// Form namespace
    pub const FORM: &str = "urn:oasis:names:tc:opendocument:xmlns:form:1.0";
    /// Script namespace
    pub const SCRIPT: &str = "urn:oasis:names:tc:opendocument:xmlns:script:1.0";
    /// Settings (config) namespace
    pub const CONFIG: &str = "urn:oasis:names:tc:opendocument:xmlns:config:1.0";
    /// OpenOffice.org extension namespace
    pub const OOO: &str = "http://openoffice.org/2004/office";
    /// OpenOffice.org Writer extension namespace
    pub const OOOW: &str = "http://openoffice.org/2004/writer";
    /// LibreOffice extension namespace
    pub const LOEXT: &str = "urn:org:documentfoundation:names:experimental:office:xmlns:loext:1.0";
    /// Package manifest namespace
    pub const MANIFEST: &str = "urn:oasis:names:tc:opendocument:xmlns:manifest:1.0";
}

/// Conventional prefix for each well-known namespace, in declaration order
pub const STANDARD_PREFIXES: &[(&str, &str)] = &[
    ("office", namespaces::OFFICE),
    ("style", namespaces::STYLE),
    ("text", namespaces::TEXT),
    ("table", namespaces::TABLE),
    ("draw", namespaces::DRAW),
    ("fo", namespaces::FO),
    ("xlink", namespaces::XLINK),
    ("dc", namespaces::DC),
    ("meta", namespaces::META),
    ("number", namespaces::NUMBER),
    ("svg", namespaces::SVG),
    ("chart", namespaces::CHART),
    ("dr3d", namespaces::DR3D),
    ("math", namespaces::MATH),
    ("form", namespaces::FORM),
    ("script", namespaces::SCRIPT),
    ("config", namespaces::CONFIG),
    ("ooo", namespaces::OOO),
    ("ooow", namespaces::OOOW),
    ("loext", namespaces::LOEXT),
];

/// Conventional prefix for a namespace URI, if it is one of the well-known ones
pub fn standard_prefix(uri: &str) -> Option<&'static str> {
    STANDARD_PREFIXES
        .iter()
        .find(|(_, ns)| *ns == uri)
        .map(|(prefix, _)| *prefix)
}

/// Common element names in ODF
pub mod elements {
    // Package part roots
    pub const DOCUMENT_CONTENT: &str = "document-content";
    pub const DOCUMENT_STYLES: &str = "document-styles";
    pub const DOCUMENT_META: &str = "document-meta";
    pub const DOCUMENT_SETTINGS: &str = "document-settings";

    // Section containers (office namespace)
    pub const META: &str = "meta";
    pub const FONT_FACE_DECLS: &str = "font-face-decls";
    pub const STYLES: &str = "styles";
    pub const AUTOMATIC_STYLES: &str = "automatic-styles";
    pub const MASTER_STYLES: &str = "master-styles";
    pub const SCRIPTS: &str = "scripts";
    pub const SETTINGS: &str = "settings";
    pub const BODY: &str = "body";
    pub const TEXT_ELEM: &str = "text";

    // Text elements
    pub const P: &str = "p";
    pub const H: &str = "h";
    pub const SPAN: &str = "span";
    pub const S: &str = "s"; // Spaces
    pub const TAB: &str = "tab";
    pub const LINE_BREAK: &str = "line-break";
    pub const NOTE: &str = "note";

    // Drawing and annotation elements
    pub const FRAME: &str = "frame";
    pub const ANNOTATION: &str = "annotation";

    // Style elements
    pub const STYLE: &str = "style";
    pub const PARAGRAPH_PROPERTIES: &str = "paragraph-properties";
    pub const FONT_FACE: &str = "font-face";
}

/// Common attribute names in ODF
pub mod attributes {
    pub const NAME: &str = "name";
    pub const FAMILY: &str = "family";
    pub const STYLE_NAME: &str = "style-name";
    pub const PARENT_STYLE_NAME: &str = "parent-style-name";
    pub const BREAK_BEFORE: &str = "break-before";
    pub const VERSION: &str = "version";

    // Space count
    pub const C: &str = "c";
}
