//! Direction correction for right-to-left text.
//!
//! Terminals print characters in logical order, so Hebrew labels and data come
//! out mirrored. A `Shaper` turns a logical string into its visual order before
//! it is handed to the UI.

/// Text shaping capability injected into the model.
pub type Shaper = fn(&str) -> String;

#[cfg_attr(feature = "bidi", allow(dead_code))]
pub fn identity(text: &str) -> String {
    text.to_string()
}

#[cfg(feature = "bidi")]
pub fn bidi_display(text: &str) -> String {
    use unicode_bidi::BidiInfo;

    let info = BidiInfo::new(text, None);
    if !info.has_rtl() {
        return text.to_string();
    }
    info.paragraphs
        .iter()
        .map(|para| info.reorder_line(para, para.range.clone()))
        .collect()
}

/// Best shaper this build has, plain pass-through without the `bidi` feature.
pub fn default_shaper() -> Shaper {
    #[cfg(feature = "bidi")]
    {
        bidi_display
    }
    #[cfg(not(feature = "bidi"))]
    {
        identity
    }
}
