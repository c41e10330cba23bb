use std::sync::OnceLock;

use regex::Regex;

/// Hardware identity read from a device's unique device identifier text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Udi {
    pub model_number: String,
    pub hardware_revision: String,
    pub serial_number: String,
}

// Product code starting with `CP-`, then `V` + digits, then the serial. Tokens are separated by
// dashes or any whitespace, line breaks included.
const UDI_GRAMMAR: &str = r"(CP-\S+?)[\s-]+(V\d+)[\s-]+([A-Za-z0-9]+)";

fn grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    GRAMMAR.get_or_init(|| Regex::new(UDI_GRAMMAR).expect("UDI grammar is a valid regex"))
}

impl Udi {
    /// Best-effort extraction. Returns `None` when the text does not follow the grammar; whatever
    /// surrounds the three tokens is ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = grammar().captures(text)?;
        Some(Self {
            model_number: caps[1].to_string(),
            hardware_revision: caps[2].to_string(),
            serial_number: caps[3].to_string(),
        })
    }
}
